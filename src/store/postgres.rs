// region:    --- Imports
use super::queries;
use super::{AuctionStore, StoreError};
use crate::auction::events::SystemEvent;
use crate::auction::model::{Auction, AuctionStatus};
use crate::bidding::model::Bid;
use crate::catalog::model::{Item, Watchlist};
use crate::database::DatabaseManager;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Postgres, Row, Transaction};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

// endregion: --- Imports

// region:    --- Rows
#[derive(sqlx::FromRow)]
struct AuctionRow {
    id: Uuid,
    item_id: Uuid,
    currency: String,
    start_price_cents: i64,
    min_increment_cents: i64,
    reserve_price_cents: Option<i64>,
    buy_now_price_cents: Option<i64>,
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
    status: String,
    auto_extend_seconds: i64,
    max_extensions: i32,
    extensions_used: i32,
    current_price_cents: Option<i64>,
    version: i64,
    created_at: DateTime<Utc>,
}

impl TryFrom<AuctionRow> for Auction {
    type Error = StoreError;

    fn try_from(row: AuctionRow) -> Result<Self, Self::Error> {
        let status: AuctionStatus = row.status.parse().map_err(|_| {
            StoreError::Database(sqlx::Error::Protocol(format!(
                "unknown auction status: {}",
                row.status
            )))
        })?;
        Ok(Auction {
            id: row.id,
            item_id: row.item_id,
            currency: row.currency,
            start_price_cents: row.start_price_cents,
            min_increment_cents: row.min_increment_cents,
            reserve_price_cents: row.reserve_price_cents,
            buy_now_price_cents: row.buy_now_price_cents,
            starts_at: row.starts_at,
            ends_at: row.ends_at,
            status,
            auto_extend_seconds: row.auto_extend_seconds,
            max_extensions: row.max_extensions,
            extensions_used: row.extensions_used,
            current_price_cents: row.current_price_cents,
            version: row.version,
            created_at: row.created_at,
        })
    }
}
// endregion: --- Rows

// region:    --- Transaction Helpers

/// 버전 비교 후 교체. 버전이 다르면 Conflict.
async fn swap_auction(
    tx: &mut Transaction<'_, Postgres>,
    auction: &Auction,
) -> Result<Auction, StoreError> {
    let version = sqlx::query_scalar::<_, i64>(queries::SWAP_AUCTION)
        .bind(auction.id)
        .bind(auction.item_id)
        .bind(&auction.currency)
        .bind(auction.start_price_cents)
        .bind(auction.min_increment_cents)
        .bind(auction.reserve_price_cents)
        .bind(auction.buy_now_price_cents)
        .bind(auction.starts_at)
        .bind(auction.ends_at)
        .bind(auction.status.as_str())
        .bind(auction.auto_extend_seconds)
        .bind(auction.max_extensions)
        .bind(auction.extensions_used)
        .bind(auction.current_price_cents)
        .bind(auction.created_at)
        .bind(auction.version)
        .fetch_optional(&mut **tx)
        .await?;

    match version {
        Some(version) => Ok(Auction {
            version,
            ..auction.clone()
        }),
        None => {
            let found: bool = sqlx::query(queries::AUCTION_EXISTS)
                .bind(auction.id)
                .fetch_one(&mut **tx)
                .await?
                .get("found");
            if found {
                warn!(
                    "{:<12} --> 버전 충돌: auction={}, version={}",
                    "Store", auction.id, auction.version
                );
                Err(StoreError::Conflict)
            } else {
                Err(StoreError::NotFound("auction"))
            }
        }
    }
}

async fn insert_events(
    tx: &mut Transaction<'_, Postgres>,
    events: &[SystemEvent],
) -> Result<(), StoreError> {
    for event in events {
        sqlx::query(queries::INSERT_SYSTEM_EVENT)
            .bind(event.id)
            .bind(event.actor_user_id)
            .bind(&event.action)
            .bind(&event.entity_type)
            .bind(event.entity_id)
            .bind(&event.meta)
            .bind(event.created_at)
            .execute(&mut **tx)
            .await?;
    }
    Ok(())
}

// endregion: --- Transaction Helpers

// region:    --- Postgres Store
/// PostgreSQL 저장소
pub struct PostgresStore {
    db_manager: Arc<DatabaseManager>,
}

impl PostgresStore {
    pub fn new(db_manager: Arc<DatabaseManager>) -> Self {
        Self { db_manager }
    }
}

#[async_trait]
impl AuctionStore for PostgresStore {
    async fn create_item(&self, item: Item) -> Result<Item, StoreError> {
        info!("{:<12} --> 상품 등록 id: {}", "Store", item.id);
        sqlx::query(queries::INSERT_ITEM)
            .bind(item.id)
            .bind(item.seller_id)
            .bind(&item.title)
            .bind(&item.description)
            .bind(&item.images)
            .bind(item.category_id)
            .bind(item.created_at)
            .bind(item.updated_at)
            .execute(self.db_manager.pool())
            .await?;
        Ok(item)
    }

    async fn list_items(&self) -> Result<Vec<Item>, StoreError> {
        Ok(sqlx::query_as::<_, Item>(queries::GET_ALL_ITEMS)
            .fetch_all(self.db_manager.pool())
            .await?)
    }

    async fn get_item(&self, id: Uuid) -> Result<Item, StoreError> {
        sqlx::query_as::<_, Item>(queries::GET_ITEM)
            .bind(id)
            .fetch_optional(self.db_manager.pool())
            .await?
            .ok_or(StoreError::NotFound("item"))
    }

    async fn update_item(&self, item: Item) -> Result<Item, StoreError> {
        let result = sqlx::query(queries::UPDATE_ITEM)
            .bind(item.id)
            .bind(item.seller_id)
            .bind(&item.title)
            .bind(&item.description)
            .bind(&item.images)
            .bind(item.category_id)
            .bind(item.updated_at)
            .execute(self.db_manager.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("item"));
        }
        Ok(item)
    }

    async fn delete_item(&self, id: Uuid) -> Result<(), StoreError> {
        self.db_manager
            .transaction(|tx| {
                Box::pin(async move {
                    let referenced: bool = sqlx::query(queries::ITEM_HAS_AUCTIONS)
                        .bind(id)
                        .fetch_one(&mut **tx)
                        .await?
                        .get("referenced");
                    if referenced {
                        return Err(StoreError::InUse("item"));
                    }
                    let result = sqlx::query(queries::DELETE_ITEM)
                        .bind(id)
                        .execute(&mut **tx)
                        .await?;
                    if result.rows_affected() == 0 {
                        return Err(StoreError::NotFound("item"));
                    }
                    Ok(())
                })
            })
            .await
    }

    async fn create_auction(&self, auction: Auction) -> Result<Auction, StoreError> {
        info!("{:<12} --> 경매 등록 id: {}", "Store", auction.id);
        // 상품 존재 확인 (외래 키 위반보다 명확한 에러)
        self.get_item(auction.item_id).await?;
        sqlx::query(queries::INSERT_AUCTION)
            .bind(auction.id)
            .bind(auction.item_id)
            .bind(&auction.currency)
            .bind(auction.start_price_cents)
            .bind(auction.min_increment_cents)
            .bind(auction.reserve_price_cents)
            .bind(auction.buy_now_price_cents)
            .bind(auction.starts_at)
            .bind(auction.ends_at)
            .bind(auction.status.as_str())
            .bind(auction.auto_extend_seconds)
            .bind(auction.max_extensions)
            .bind(auction.extensions_used)
            .bind(auction.current_price_cents)
            .bind(auction.version)
            .bind(auction.created_at)
            .execute(self.db_manager.pool())
            .await?;
        Ok(auction)
    }

    async fn list_auctions(&self) -> Result<Vec<Auction>, StoreError> {
        sqlx::query_as::<_, AuctionRow>(queries::GET_ALL_AUCTIONS)
            .fetch_all(self.db_manager.pool())
            .await?
            .into_iter()
            .map(Auction::try_from)
            .collect()
    }

    async fn get_auction(&self, id: Uuid) -> Result<Auction, StoreError> {
        sqlx::query_as::<_, AuctionRow>(queries::GET_AUCTION)
            .bind(id)
            .fetch_optional(self.db_manager.pool())
            .await?
            .ok_or(StoreError::NotFound("auction"))
            .and_then(Auction::try_from)
    }

    async fn update_auction(
        &self,
        auction: Auction,
        events: Vec<SystemEvent>,
    ) -> Result<Auction, StoreError> {
        self.db_manager
            .transaction(move |tx| {
                Box::pin(async move {
                    let updated = swap_auction(tx, &auction).await?;
                    insert_events(tx, &events).await?;
                    Ok(updated)
                })
            })
            .await
    }

    async fn delete_auction(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query(queries::DELETE_AUCTION)
            .bind(id)
            .execute(self.db_manager.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("auction"));
        }
        Ok(())
    }

    async fn commit_bid(
        &self,
        auction: Auction,
        bid: Bid,
        events: Vec<SystemEvent>,
    ) -> Result<Auction, StoreError> {
        self.db_manager
            .transaction(move |tx| {
                Box::pin(async move {
                    let updated = swap_auction(tx, &auction).await?;
                    sqlx::query(queries::INSERT_BID)
                        .bind(bid.id)
                        .bind(bid.auction_id)
                        .bind(bid.user_id)
                        .bind(bid.amount_cents)
                        .bind(bid.created_at)
                        .bind(bid.is_proxy)
                        .execute(&mut **tx)
                        .await?;
                    insert_events(tx, &events).await?;
                    info!(
                        "{:<12} --> 입찰 커밋: auction={}, price={:?}",
                        "Store", updated.id, updated.current_price_cents
                    );
                    Ok(updated)
                })
            })
            .await
    }

    async fn list_bids_for_auction(&self, auction_id: Uuid) -> Result<Vec<Bid>, StoreError> {
        self.get_auction(auction_id).await?;
        Ok(sqlx::query_as::<_, Bid>(queries::GET_AUCTION_BIDS)
            .bind(auction_id)
            .fetch_all(self.db_manager.pool())
            .await?)
    }

    async fn get_bid(&self, id: Uuid) -> Result<Bid, StoreError> {
        sqlx::query_as::<_, Bid>(queries::GET_BID)
            .bind(id)
            .fetch_optional(self.db_manager.pool())
            .await?
            .ok_or(StoreError::NotFound("bid"))
    }

    async fn add_watchlist(&self, entry: Watchlist) -> Result<Watchlist, StoreError> {
        self.get_auction(entry.auction_id).await?;
        Ok(sqlx::query_as::<_, Watchlist>(queries::UPSERT_WATCHLIST)
            .bind(entry.user_id)
            .bind(entry.auction_id)
            .bind(entry.created_at)
            .fetch_one(self.db_manager.pool())
            .await?)
    }

    async fn remove_watchlist(&self, user_id: Uuid, auction_id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query(queries::DELETE_WATCHLIST)
            .bind(user_id)
            .bind(auction_id)
            .execute(self.db_manager.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("watchlist"));
        }
        Ok(())
    }

    async fn list_watchlists_for_user(&self, user_id: Uuid) -> Result<Vec<Watchlist>, StoreError> {
        Ok(sqlx::query_as::<_, Watchlist>(queries::GET_USER_WATCHLISTS)
            .bind(user_id)
            .fetch_all(self.db_manager.pool())
            .await?)
    }

    async fn list_system_events(
        &self,
        entity_type: &str,
        entity_id: Uuid,
    ) -> Result<Vec<SystemEvent>, StoreError> {
        Ok(sqlx::query_as::<_, SystemEvent>(queries::GET_SYSTEM_EVENTS)
            .bind(entity_type)
            .bind(entity_id)
            .fetch_all(self.db_manager.pool())
            .await?)
    }
}
// endregion: --- Postgres Store
