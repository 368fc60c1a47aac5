/// 경매 관리 커맨드 (관리자 수정, 상태 전이)
// region:    --- Imports
use super::events::{AuctionEvent, SystemEvent};
use super::lifecycle::InvalidTransition;
use super::model::{Auction, AuctionPatch, AuctionStatus, AuctionValidationError};
use crate::store::{AuctionStore, StoreError};
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

// endregion: --- Imports

const MAX_RETRIES: u32 = 10;

#[derive(Debug, Error)]
pub enum PatchError {
    #[error(transparent)]
    Transition(#[from] InvalidTransition),
    #[error(transparent)]
    Invalid(#[from] AuctionValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("max retries exceeded")]
    RetriesExhausted,
}

/// 경매 수정. 상태 변경은 전이 규칙을 따르고, 종료된 경매는 필드도 바꿀 수 없다.
pub async fn handle_patch_auction(
    store: &dyn AuctionStore,
    id: Uuid,
    patch: &AuctionPatch,
    now: DateTime<Utc>,
) -> Result<Auction, PatchError> {
    info!("{:<12} --> 경매 수정 id: {}, {:?}", "Command", id, patch);

    for _ in 0..MAX_RETRIES {
        let current = store.get_auction(id).await?;
        let (updated, events) = apply_patch(&current, patch, now)?;
        match store.update_auction(updated, events).await {
            Ok(auction) => return Ok(auction),
            Err(StoreError::Conflict) => {
                warn!("{:<12} --> 경매 수정 버전 충돌: 재시도", "Command");
            }
            Err(e) => return Err(e.into()),
        }
    }
    Err(PatchError::RetriesExhausted)
}

fn apply_patch(
    current: &Auction,
    patch: &AuctionPatch,
    now: DateTime<Utc>,
) -> Result<(Auction, Vec<SystemEvent>), PatchError> {
    let next_status = match patch.status {
        Some(next) => current.status.transition(next)?,
        None => current.status,
    };
    if current.status.is_terminal() && has_field_changes(patch) {
        return Err(InvalidTransition {
            from: current.status,
            to: next_status,
        }
        .into());
    }

    let mut updated = current.clone();
    patch.apply_fields(&mut updated);
    updated.status = next_status;
    updated.validate()?;

    let mut events = Vec::new();
    if next_status != current.status {
        events.push(SystemEvent::for_auction(
            current.id,
            &AuctionEvent::StatusChanged {
                from: current.status,
                to: next_status,
            },
            now,
        ));
    }
    Ok((updated, events))
}

fn has_field_changes(patch: &AuctionPatch) -> bool {
    AuctionPatch {
        status: None,
        ..patch.clone()
    } != AuctionPatch::default()
}

/// 시간 기반 상태 전이 (스케줄러용)
pub async fn apply_status(
    store: &dyn AuctionStore,
    auction: Auction,
    next: AuctionStatus,
    now: DateTime<Utc>,
) -> Result<Auction, PatchError> {
    let (updated, events) = apply_patch(&auction, &AuctionPatch::status(next), now)?;
    Ok(store.update_auction(updated, events).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::model::Item;
    use crate::store::MemoryStore;
    use chrono::Duration;

    async fn pending_auction(store: &MemoryStore) -> Auction {
        let now = Utc::now();
        let item = store
            .create_item(Item {
                id: Uuid::new_v4(),
                seller_id: Uuid::new_v4(),
                title: "Vase".to_string(),
                description: Some("Blue".to_string()),
                images: None,
                category_id: None,
                created_at: now,
                updated_at: None,
            })
            .await
            .unwrap();
        store
            .create_auction(Auction {
                id: Uuid::new_v4(),
                item_id: item.id,
                currency: "VND".to_string(),
                start_price_cents: 1000,
                min_increment_cents: 100,
                reserve_price_cents: None,
                buy_now_price_cents: None,
                starts_at: now + Duration::hours(1),
                ends_at: now + Duration::hours(2),
                status: AuctionStatus::Pending,
                auto_extend_seconds: 0,
                max_extensions: 0,
                extensions_used: 0,
                current_price_cents: None,
                version: 0,
                created_at: now,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn activates_and_records_status_change() {
        let store = MemoryStore::new();
        let auction = pending_auction(&store).await;
        let live = handle_patch_auction(
            &store,
            auction.id,
            &AuctionPatch::status(AuctionStatus::Live),
            Utc::now(),
        )
        .await
        .unwrap();
        assert_eq!(live.status, AuctionStatus::Live);
        assert_eq!(live.version, 1);

        let events = store
            .list_system_events("AUCTION", auction.id)
            .await
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].action, "STATUS_CHANGED");
        assert_eq!(events[0].meta["to"], "LIVE");
    }

    #[tokio::test]
    async fn terminal_auction_cannot_change() {
        let store = MemoryStore::new();
        let auction = pending_auction(&store).await;
        handle_patch_auction(
            &store,
            auction.id,
            &AuctionPatch::status(AuctionStatus::Cancelled),
            Utc::now(),
        )
        .await
        .unwrap();

        let err = handle_patch_auction(
            &store,
            auction.id,
            &AuctionPatch::status(AuctionStatus::Live),
            Utc::now(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, PatchError::Transition(_)));

        let edit = AuctionPatch {
            min_increment_cents: Some(5),
            ..Default::default()
        };
        let err = handle_patch_auction(&store, auction.id, &edit, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, PatchError::Transition(_)));
    }

    #[tokio::test]
    async fn field_edit_is_validated() {
        let store = MemoryStore::new();
        let auction = pending_auction(&store).await;
        let edit = AuctionPatch {
            ends_at: Some(auction.starts_at - Duration::minutes(1)),
            ..Default::default()
        };
        let err = handle_patch_auction(&store, auction.id, &edit, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PatchError::Invalid(AuctionValidationError::EmptyWindow)
        ));
    }
}
