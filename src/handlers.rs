// region:    --- Imports
use crate::auction::commands::{handle_patch_auction, PatchError};
use crate::auction::events::SystemEvent;
use crate::auction::model::{Auction, AuctionPatch, AuctionValidationError, NewAuction};
use crate::bidding::commands::{self, CommandError};
use crate::bidding::evaluation::BidRejection;
use crate::bidding::model::{sort_newest_first, Bid, BuyNowCommand, PlaceBidCommand};
use crate::catalog::model::{Item, ItemPatch, NewItem, Watchlist, WatchlistKey};
use crate::money::option_cents_string;
use crate::store::{SharedStore, StoreError};
use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
use uuid::Uuid;

// endregion: --- Imports

// region:    --- Router

/// 라우터 설정
pub fn routes(store: SharedStore) -> Router {
    // 브라우저 클라이언트를 위한 cors 설정
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/items", post(handle_create_item).get(handle_list_items))
        .route(
            "/items/:id",
            get(handle_get_item)
                .patch(handle_patch_item)
                .delete(handle_delete_item),
        )
        .route(
            "/auctions",
            post(handle_create_auction).get(handle_list_auctions),
        )
        .route(
            "/auctions/:id",
            get(handle_get_auction)
                .patch(handle_patch_auction_route)
                .delete(handle_delete_auction),
        )
        .route("/auctions/:id/buy-now", post(handle_buy_now))
        .route("/bids", post(handle_place_bid))
        .route("/bids/auction/:id", get(handle_list_bids_for_auction))
        .route("/bids/:id", get(handle_get_bid))
        .route("/watchlists", post(handle_add_watchlist))
        .route(
            "/watchlists/:user_id/:auction_id",
            axum::routing::delete(handle_remove_watchlist),
        )
        .route("/watchlists/user/:user_id", get(handle_list_watchlists))
        .route(
            "/system-events/:entity_type/:entity_id",
            get(handle_list_system_events),
        )
        .layer(cors)
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .with_state(store)
}

// endregion: --- Router

// region:    --- Error Response

/// 에러 응답 본문
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub status: u16,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(
        with = "option_cents_string",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub required_minimum: Option<i64>,
}

#[derive(Debug)]
pub enum ApiError {
    Rejected(BidRejection),
    BadRequest(String),
    NotFound(&'static str),
    Conflict(String),
    Internal(String),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(what) => ApiError::NotFound(what),
            StoreError::Conflict => ApiError::Conflict(e.to_string()),
            StoreError::InUse(_) => ApiError::Conflict(e.to_string()),
            StoreError::Database(e) => {
                error!("{:<12} --> 저장소 오류: {:?}", "Handler", e);
                ApiError::Internal("storage failure".to_string())
            }
        }
    }
}

impl From<CommandError> for ApiError {
    fn from(e: CommandError) -> Self {
        match e {
            CommandError::Rejected(rejection) => ApiError::Rejected(rejection),
            CommandError::Store(e) => e.into(),
            CommandError::RetriesExhausted => ApiError::Conflict(e.to_string()),
        }
    }
}

impl From<PatchError> for ApiError {
    fn from(e: PatchError) -> Self {
        match e {
            PatchError::Transition(_) => ApiError::Conflict(e.to_string()),
            PatchError::Invalid(e) => e.into(),
            PatchError::Store(e) => e.into(),
            PatchError::RetriesExhausted => ApiError::Conflict(e.to_string()),
        }
    }
}

impl From<AuctionValidationError> for ApiError {
    fn from(e: AuctionValidationError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, code, required_minimum) = match self {
            ApiError::Rejected(rejection) => (
                StatusCode::BAD_REQUEST,
                rejection.to_string(),
                Some(rejection.code().to_string()),
                rejection.required_minimum(),
            ),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message, None, None),
            ApiError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                format!("{} not found", what),
                None,
                None,
            ),
            ApiError::Conflict(message) => (
                StatusCode::CONFLICT,
                message,
                Some("CONFLICT".to_string()),
                None,
            ),
            ApiError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, message, None, None)
            }
        };
        let body = ErrorBody {
            status: status.as_u16(),
            message,
            code,
            required_minimum,
        };
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Debug, Serialize, Deserialize)]
pub struct Deleted {
    pub id: Uuid,
}

// endregion: --- Error Response

// region:    --- Item Handlers

/// 상품 등록
pub async fn handle_create_item(
    State(store): State<SharedStore>,
    Json(req): Json<NewItem>,
) -> Result<(StatusCode, Json<Item>), ApiError> {
    info!("{:<12} --> 상품 등록: {:?}", "Handler", req.title);
    if req.title.trim().is_empty() {
        return Err(ApiError::BadRequest("title must not be empty".to_string()));
    }
    let item = store
        .create_item(req.into_item(Uuid::new_v4(), Utc::now()))
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// 모든 상품 조회
pub async fn handle_list_items(
    State(store): State<SharedStore>,
) -> ApiResult<Vec<Item>> {
    info!("{:<12} --> 모든 상품 조회", "HandlerQuery");
    Ok(Json(store.list_items().await?))
}

/// 상품 조회
pub async fn handle_get_item(
    State(store): State<SharedStore>,
    Path(id): Path<Uuid>,
) -> ApiResult<Item> {
    info!("{:<12} --> 상품 조회 id: {}", "HandlerQuery", id);
    Ok(Json(store.get_item(id).await?))
}

/// 상품 수정
pub async fn handle_patch_item(
    State(store): State<SharedStore>,
    Path(id): Path<Uuid>,
    Json(patch): Json<ItemPatch>,
) -> ApiResult<Item> {
    info!("{:<12} --> 상품 수정 id: {}", "Handler", id);
    let mut item = store.get_item(id).await?;
    patch.apply(&mut item, Utc::now());
    Ok(Json(store.update_item(item).await?))
}

/// 상품 삭제
pub async fn handle_delete_item(
    State(store): State<SharedStore>,
    Path(id): Path<Uuid>,
) -> ApiResult<Deleted> {
    info!("{:<12} --> 상품 삭제 id: {}", "Handler", id);
    store.delete_item(id).await?;
    Ok(Json(Deleted { id }))
}

// endregion: --- Item Handlers

// region:    --- Auction Handlers

/// 경매 등록
pub async fn handle_create_auction(
    State(store): State<SharedStore>,
    Json(req): Json<NewAuction>,
) -> Result<(StatusCode, Json<Auction>), ApiError> {
    info!("{:<12} --> 경매 등록 item: {}", "Handler", req.item_id);
    let auction = req.into_auction(Uuid::new_v4(), Utc::now())?;
    let auction = store.create_auction(auction).await?;
    Ok((StatusCode::CREATED, Json(auction)))
}

/// 모든 경매 조회
pub async fn handle_list_auctions(
    State(store): State<SharedStore>,
) -> ApiResult<Vec<Auction>> {
    info!("{:<12} --> 모든 경매 조회", "HandlerQuery");
    Ok(Json(store.list_auctions().await?))
}

/// 경매 상태 조회
pub async fn handle_get_auction(
    State(store): State<SharedStore>,
    Path(id): Path<Uuid>,
) -> ApiResult<Auction> {
    info!("{:<12} --> 경매 상태 조회 id: {}", "HandlerQuery", id);
    Ok(Json(store.get_auction(id).await?))
}

/// 경매 수정 (상태 전이 포함)
pub async fn handle_patch_auction_route(
    State(store): State<SharedStore>,
    Path(id): Path<Uuid>,
    Json(patch): Json<AuctionPatch>,
) -> ApiResult<Auction> {
    Ok(Json(
        handle_patch_auction(store.as_ref(), id, &patch, Utc::now()).await?,
    ))
}

/// 경매 삭제
pub async fn handle_delete_auction(
    State(store): State<SharedStore>,
    Path(id): Path<Uuid>,
) -> ApiResult<Deleted> {
    info!("{:<12} --> 경매 삭제 id: {}", "Handler", id);
    store.delete_auction(id).await?;
    Ok(Json(Deleted { id }))
}

/// 즉시 구매 요청 처리
pub async fn handle_buy_now(
    State(store): State<SharedStore>,
    Path(id): Path<Uuid>,
    Json(cmd): Json<BuyNowCommand>,
) -> Result<(StatusCode, Json<Bid>), ApiError> {
    let placed = commands::handle_buy_now(store.as_ref(), id, &cmd, Utc::now).await?;
    Ok((StatusCode::CREATED, Json(placed.bid)))
}

// endregion: --- Auction Handlers

// region:    --- Bid Handlers

/// 입찰 요청 처리
pub async fn handle_place_bid(
    State(store): State<SharedStore>,
    Json(cmd): Json<PlaceBidCommand>,
) -> Result<(StatusCode, Json<Bid>), ApiError> {
    let placed = commands::handle_place_bid(store.as_ref(), &cmd, Utc::now).await?;
    Ok((StatusCode::CREATED, Json(placed.bid)))
}

/// 입찰 이력 조회
pub async fn handle_list_bids_for_auction(
    State(store): State<SharedStore>,
    Path(auction_id): Path<Uuid>,
) -> ApiResult<Vec<Bid>> {
    info!("{:<12} --> 입찰 이력 조회 id: {}", "HandlerQuery", auction_id);
    let mut bids = store.list_bids_for_auction(auction_id).await?;
    sort_newest_first(&mut bids);
    Ok(Json(bids))
}

/// 입찰 조회
pub async fn handle_get_bid(
    State(store): State<SharedStore>,
    Path(id): Path<Uuid>,
) -> ApiResult<Bid> {
    info!("{:<12} --> 입찰 조회 id: {}", "HandlerQuery", id);
    Ok(Json(store.get_bid(id).await?))
}

// endregion: --- Bid Handlers

// region:    --- Watchlist & Event Handlers

/// 관심 목록 추가
pub async fn handle_add_watchlist(
    State(store): State<SharedStore>,
    Json(key): Json<WatchlistKey>,
) -> Result<(StatusCode, Json<Watchlist>), ApiError> {
    info!("{:<12} --> 관심 목록 추가: {:?}", "Handler", key);
    let entry = Watchlist {
        user_id: key.user_id,
        auction_id: key.auction_id,
        created_at: Utc::now(),
    };
    Ok((StatusCode::CREATED, Json(store.add_watchlist(entry).await?)))
}

/// 관심 목록 삭제
pub async fn handle_remove_watchlist(
    State(store): State<SharedStore>,
    Path((user_id, auction_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<WatchlistKey> {
    info!(
        "{:<12} --> 관심 목록 삭제: user={}, auction={}",
        "Handler", user_id, auction_id
    );
    store.remove_watchlist(user_id, auction_id).await?;
    Ok(Json(WatchlistKey {
        user_id,
        auction_id,
    }))
}

/// 사용자 관심 목록 조회
pub async fn handle_list_watchlists(
    State(store): State<SharedStore>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Vec<Watchlist>> {
    info!("{:<12} --> 관심 목록 조회 user: {}", "HandlerQuery", user_id);
    Ok(Json(store.list_watchlists_for_user(user_id).await?))
}

/// 감사 기록 조회
pub async fn handle_list_system_events(
    State(store): State<SharedStore>,
    Path((entity_type, entity_id)): Path<(String, Uuid)>,
) -> ApiResult<Vec<SystemEvent>> {
    info!(
        "{:<12} --> 감사 기록 조회: {}/{}",
        "HandlerQuery", entity_type, entity_id
    );
    let entity_type = entity_type.to_uppercase();
    Ok(Json(
        store.list_system_events(&entity_type, entity_id).await?,
    ))
}

// endregion: --- Watchlist & Event Handlers
