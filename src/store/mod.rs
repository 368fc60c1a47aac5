/// 경매 저장소
/// 경매, 입찰, 상품, 관심 목록, 감사 기록을 소유한다.
/// 경매 변경은 읽을 때의 `version` 을 기준으로 한 비교 후 교체(CAS)로만 커밋된다.
// region:    --- Imports
use crate::auction::events::SystemEvent;
use crate::auction::model::Auction;
use crate::bidding::model::Bid;
use crate::catalog::model::{Item, Watchlist};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

// endregion: --- Imports

pub mod memory;
pub mod postgres;
mod queries;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

// region:    --- Store Error
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("version conflict")]
    Conflict,
    #[error("{0} is still referenced")]
    InUse(&'static str),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}
// endregion: --- Store Error

// region:    --- Store Trait
/// 저장소 트레이트
#[async_trait]
pub trait AuctionStore: Send + Sync {
    // 상품
    async fn create_item(&self, item: Item) -> Result<Item, StoreError>;
    async fn list_items(&self) -> Result<Vec<Item>, StoreError>;
    async fn get_item(&self, id: Uuid) -> Result<Item, StoreError>;
    async fn update_item(&self, item: Item) -> Result<Item, StoreError>;
    async fn delete_item(&self, id: Uuid) -> Result<(), StoreError>;

    // 경매
    async fn create_auction(&self, auction: Auction) -> Result<Auction, StoreError>;
    async fn list_auctions(&self) -> Result<Vec<Auction>, StoreError>;
    async fn get_auction(&self, id: Uuid) -> Result<Auction, StoreError>;
    /// `auction.version` 이 저장된 버전과 같을 때만 교체하고 버전을 1 올린다.
    async fn update_auction(
        &self,
        auction: Auction,
        events: Vec<SystemEvent>,
    ) -> Result<Auction, StoreError>;
    async fn delete_auction(&self, id: Uuid) -> Result<(), StoreError>;

    // 입찰
    /// 입찰 기록, 경매 변경, 감사 기록을 하나의 원자적 커밋으로 저장 (CAS)
    async fn commit_bid(
        &self,
        auction: Auction,
        bid: Bid,
        events: Vec<SystemEvent>,
    ) -> Result<Auction, StoreError>;
    async fn list_bids_for_auction(&self, auction_id: Uuid) -> Result<Vec<Bid>, StoreError>;
    async fn get_bid(&self, id: Uuid) -> Result<Bid, StoreError>;

    // 관심 목록
    async fn add_watchlist(&self, entry: Watchlist) -> Result<Watchlist, StoreError>;
    async fn remove_watchlist(&self, user_id: Uuid, auction_id: Uuid) -> Result<(), StoreError>;
    async fn list_watchlists_for_user(&self, user_id: Uuid) -> Result<Vec<Watchlist>, StoreError>;

    // 감사 기록
    async fn list_system_events(
        &self,
        entity_type: &str,
        entity_id: Uuid,
    ) -> Result<Vec<SystemEvent>, StoreError>;
}

pub type SharedStore = Arc<dyn AuctionStore>;
// endregion: --- Store Trait
