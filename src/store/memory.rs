// region:    --- Imports
use super::{AuctionStore, SharedStore, StoreError};
use crate::auction::events::SystemEvent;
use crate::auction::model::Auction;
use crate::bidding::model::Bid;
use crate::catalog::model::{Item, Watchlist};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

// endregion: --- Imports

#[derive(Default)]
struct Tables {
    items: HashMap<Uuid, Item>,
    auctions: HashMap<Uuid, Auction>,
    bids: HashMap<Uuid, Bid>,
    watchlists: BTreeMap<(Uuid, Uuid), Watchlist>,
    events: Vec<SystemEvent>,
}

impl Tables {
    /// 저장된 버전과 비교 후 교체
    fn swap_auction(&mut self, mut auction: Auction) -> Result<Auction, StoreError> {
        let stored = self
            .auctions
            .get_mut(&auction.id)
            .ok_or(StoreError::NotFound("auction"))?;
        if stored.version != auction.version {
            return Err(StoreError::Conflict);
        }
        auction.version += 1;
        *stored = auction.clone();
        Ok(auction)
    }
}

/// 프로세스 내 저장소. 하나의 락 아래에서 읽기-비교-쓰기를 수행한다.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_shared() -> SharedStore {
        Arc::new(Self::new())
    }
}

#[async_trait]
impl AuctionStore for MemoryStore {
    async fn create_item(&self, item: Item) -> Result<Item, StoreError> {
        self.tables.write().await.items.insert(item.id, item.clone());
        Ok(item)
    }

    async fn list_items(&self) -> Result<Vec<Item>, StoreError> {
        let mut items: Vec<Item> = self.tables.read().await.items.values().cloned().collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn get_item(&self, id: Uuid) -> Result<Item, StoreError> {
        self.tables
            .read()
            .await
            .items
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound("item"))
    }

    async fn update_item(&self, item: Item) -> Result<Item, StoreError> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .items
            .get_mut(&item.id)
            .ok_or(StoreError::NotFound("item"))?;
        *stored = item.clone();
        Ok(item)
    }

    async fn delete_item(&self, id: Uuid) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if tables.auctions.values().any(|a| a.item_id == id) {
            return Err(StoreError::InUse("item"));
        }
        tables
            .items
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound("item"))
    }

    async fn create_auction(&self, auction: Auction) -> Result<Auction, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.items.contains_key(&auction.item_id) {
            return Err(StoreError::NotFound("item"));
        }
        tables.auctions.insert(auction.id, auction.clone());
        Ok(auction)
    }

    async fn list_auctions(&self) -> Result<Vec<Auction>, StoreError> {
        let mut auctions: Vec<Auction> =
            self.tables.read().await.auctions.values().cloned().collect();
        auctions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(auctions)
    }

    async fn get_auction(&self, id: Uuid) -> Result<Auction, StoreError> {
        self.tables
            .read()
            .await
            .auctions
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound("auction"))
    }

    async fn update_auction(
        &self,
        auction: Auction,
        events: Vec<SystemEvent>,
    ) -> Result<Auction, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.items.contains_key(&auction.item_id) {
            return Err(StoreError::NotFound("item"));
        }
        let updated = tables.swap_auction(auction)?;
        tables.events.extend(events);
        Ok(updated)
    }

    async fn delete_auction(&self, id: Uuid) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        tables
            .auctions
            .remove(&id)
            .ok_or(StoreError::NotFound("auction"))?;
        tables.bids.retain(|_, bid| bid.auction_id != id);
        tables.watchlists.retain(|(_, auction_id), _| *auction_id != id);
        Ok(())
    }

    async fn commit_bid(
        &self,
        auction: Auction,
        bid: Bid,
        events: Vec<SystemEvent>,
    ) -> Result<Auction, StoreError> {
        let mut tables = self.tables.write().await;
        let updated = tables.swap_auction(auction)?;
        debug!(
            "{:<12} --> 입찰 커밋: auction={}, version={}",
            "Store", updated.id, updated.version
        );
        tables.bids.insert(bid.id, bid);
        tables.events.extend(events);
        Ok(updated)
    }

    async fn list_bids_for_auction(&self, auction_id: Uuid) -> Result<Vec<Bid>, StoreError> {
        let tables = self.tables.read().await;
        if !tables.auctions.contains_key(&auction_id) {
            return Err(StoreError::NotFound("auction"));
        }
        Ok(tables
            .bids
            .values()
            .filter(|bid| bid.auction_id == auction_id)
            .cloned()
            .collect())
    }

    async fn get_bid(&self, id: Uuid) -> Result<Bid, StoreError> {
        self.tables
            .read()
            .await
            .bids
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound("bid"))
    }

    async fn add_watchlist(&self, entry: Watchlist) -> Result<Watchlist, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.auctions.contains_key(&entry.auction_id) {
            return Err(StoreError::NotFound("auction"));
        }
        // 이미 있으면 기존 항목 유지
        Ok(tables
            .watchlists
            .entry((entry.user_id, entry.auction_id))
            .or_insert(entry)
            .clone())
    }

    async fn remove_watchlist(&self, user_id: Uuid, auction_id: Uuid) -> Result<(), StoreError> {
        self.tables
            .write()
            .await
            .watchlists
            .remove(&(user_id, auction_id))
            .map(|_| ())
            .ok_or(StoreError::NotFound("watchlist"))
    }

    async fn list_watchlists_for_user(&self, user_id: Uuid) -> Result<Vec<Watchlist>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .watchlists
            .values()
            .filter(|w| w.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_system_events(
        &self,
        entity_type: &str,
        entity_id: Uuid,
    ) -> Result<Vec<SystemEvent>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .events
            .iter()
            .filter(|e| e.entity_type == entity_type && e.entity_id == entity_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auction::model::AuctionStatus;
    use chrono::{Duration, Utc};

    async fn seeded() -> (MemoryStore, Auction) {
        let store = MemoryStore::new();
        let now = Utc::now();
        let item = store
            .create_item(Item {
                id: Uuid::new_v4(),
                seller_id: Uuid::new_v4(),
                title: "Lamp".to_string(),
                description: None,
                images: None,
                category_id: None,
                created_at: now,
                updated_at: None,
            })
            .await
            .unwrap();
        let auction = store
            .create_auction(Auction {
                id: Uuid::new_v4(),
                item_id: item.id,
                currency: "VND".to_string(),
                start_price_cents: 10000,
                min_increment_cents: 500,
                reserve_price_cents: None,
                buy_now_price_cents: None,
                starts_at: now,
                ends_at: now + Duration::hours(1),
                status: AuctionStatus::Live,
                auto_extend_seconds: 0,
                max_extensions: 0,
                extensions_used: 0,
                current_price_cents: None,
                version: 0,
                created_at: now,
            })
            .await
            .unwrap();
        (store, auction)
    }

    fn bid_for(auction: &Auction, amount: i64) -> Bid {
        Bid {
            id: Uuid::new_v4(),
            auction_id: auction.id,
            user_id: Uuid::new_v4(),
            amount_cents: amount,
            created_at: Utc::now(),
            is_proxy: false,
        }
    }

    #[tokio::test]
    async fn stale_version_is_rejected() {
        let (store, auction) = seeded().await;

        let mut first = auction.clone();
        first.current_price_cents = Some(10500);
        let committed = store
            .commit_bid(first, bid_for(&auction, 10500), vec![])
            .await
            .unwrap();
        assert_eq!(committed.version, 1);

        let mut stale = auction.clone();
        stale.current_price_cents = Some(10600);
        let err = store
            .commit_bid(stale, bid_for(&auction, 10600), vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict));

        let bids = store.list_bids_for_auction(auction.id).await.unwrap();
        assert_eq!(bids.len(), 1);
        assert_eq!(
            store.get_auction(auction.id).await.unwrap().current_price_cents,
            Some(10500)
        );
    }

    #[tokio::test]
    async fn item_with_auction_cannot_be_deleted() {
        let (store, auction) = seeded().await;
        assert!(matches!(
            store.delete_item(auction.item_id).await,
            Err(StoreError::InUse("item"))
        ));
        store.delete_auction(auction.id).await.unwrap();
        store.delete_item(auction.item_id).await.unwrap();
    }

    #[tokio::test]
    async fn watchlist_is_idempotent() {
        let (store, auction) = seeded().await;
        let user = Uuid::new_v4();
        let entry = Watchlist {
            user_id: user,
            auction_id: auction.id,
            created_at: Utc::now(),
        };
        let first = store.add_watchlist(entry.clone()).await.unwrap();
        let mut again = entry.clone();
        again.created_at = Utc::now() + Duration::seconds(5);
        assert_eq!(store.add_watchlist(again).await.unwrap(), first);
        assert_eq!(store.list_watchlists_for_user(user).await.unwrap().len(), 1);

        store.remove_watchlist(user, auction.id).await.unwrap();
        assert!(matches!(
            store.remove_watchlist(user, auction.id).await,
            Err(StoreError::NotFound("watchlist"))
        ));
    }
}
