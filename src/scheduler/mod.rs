/// 경매 상태 업데이트 스케줄러
/// 시작 시각이 지난 PENDING 경매는 LIVE 로, 마감 시각이 지난 LIVE 경매는 ENDED 로 전이한다.
/// 전이는 버전 비교 후 커밋되며, 충돌한 경매는 다음 주기에 다시 확인한다.
// region:    --- Imports
use crate::auction::commands::{apply_status, PatchError};
use crate::auction::lifecycle::scheduled_transition;
use crate::auction::model::Auction;
use crate::store::{SharedStore, StoreError};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration};
use tracing::{debug, error, info};

// endregion: --- Imports

// region:    --- Auction Scheduler
/// 경매 상태 업데이트 스케줄러
pub struct AuctionScheduler {
    store: SharedStore,
    period: Duration,
}

impl AuctionScheduler {
    pub fn new(store: SharedStore, period: Duration) -> Self {
        Self { store, period }
    }

    /// 경매 상태 업데이트 스케줄러 시작
    pub fn start(&self) -> JoinHandle<()> {
        let store = Arc::clone(&self.store);
        let period = self.period;
        tokio::spawn(async move {
            let mut interval = interval(period);
            loop {
                interval.tick().await;
                if let Err(e) = Self::update_auction_statuses(&store, Utc::now()).await {
                    error!(
                        "{:<12} --> 경매 상태 업데이트 중 오류 발생: {:?}",
                        "Scheduler", e
                    );
                }
            }
        })
    }

    /// 경매 상태 업데이트. 전이한 경매 수를 반환한다.
    pub async fn update_auction_statuses(
        store: &SharedStore,
        now: DateTime<Utc>,
    ) -> Result<usize, StoreError> {
        let mut moved = 0;
        for auction in store.list_auctions().await? {
            if Self::advance_auction(store, auction, now).await? {
                moved += 1;
            }
        }

        debug!(
            "{:<12} --> 경매 상태가 성공적으로 업데이트되었습니다. ({}건)",
            "Scheduler", moved
        );

        Ok(moved)
    }

    /// 경매 하나의 시간 기반 전이. 충돌하거나 그 사이 삭제된 경매는 건너뛴다.
    async fn advance_auction(
        store: &SharedStore,
        auction: Auction,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let Some(next) = scheduled_transition(&auction, now) else {
            return Ok(false);
        };
        let (id, from) = (auction.id, auction.status);
        match apply_status(store.as_ref(), auction, next, now).await {
            Ok(_) => {
                info!(
                    "{:<12} --> 경매 상태 변경: {} {} -> {}",
                    "Scheduler", id, from, next
                );
                Ok(true)
            }
            Err(PatchError::Store(StoreError::Conflict)) => {
                debug!("{:<12} --> 버전 충돌, 다음 주기에 재시도: {}", "Scheduler", id);
                Ok(false)
            }
            Err(PatchError::Store(StoreError::NotFound(_))) => {
                debug!("{:<12} --> 이미 삭제된 경매: {}", "Scheduler", id);
                Ok(false)
            }
            Err(PatchError::Store(e)) => Err(e),
            Err(e) => {
                error!("{:<12} --> 상태 전이 실패 {}: {}", "Scheduler", id, e);
                Ok(false)
            }
        }
    }
}
// endregion: --- Auction Scheduler
