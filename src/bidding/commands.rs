/// 입찰 관련 커맨드 처리
/// 1. 입찰
/// 2. 즉시 구매
/// 최신 경매를 읽어 평가하고, 읽은 버전 기준으로 커밋한다. 버전 충돌이면 다시 읽어 재평가한다.
// region:    --- Imports
use super::evaluation::{evaluate_bid, evaluate_buy_now, validate_amount, BidEvaluation, BidRejection};
use super::model::{Bid, BuyNowCommand, PlaceBidCommand};
use crate::auction::events::SystemEvent;
use crate::auction::model::Auction;
use crate::store::{AuctionStore, StoreError};
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

// endregion: --- Imports

// 최대 재시도 횟수
pub const MAX_RETRIES: u32 = 100;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Rejected(#[from] BidRejection),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("max retries exceeded")]
    RetriesExhausted,
}

/// 커밋된 입찰과 갱신된 경매
#[derive(Debug, Clone)]
pub struct PlacedBid {
    pub bid: Bid,
    pub auction: Auction,
}

// region:    --- Commands

/// 1. 입찰
/// `clock` 은 시도마다 호출되어 평가 시각과 입찰 시각을 정한다.
pub async fn handle_place_bid<C>(
    store: &dyn AuctionStore,
    cmd: &PlaceBidCommand,
    clock: C,
) -> Result<PlacedBid, CommandError>
where
    C: Fn() -> DateTime<Utc>,
{
    info!("{:<12} --> 입찰 요청 처리 시작: {:?}", "Command", cmd);
    let amount = validate_amount(&cmd.amount_cents)?;
    let is_proxy = cmd.is_proxy.unwrap_or(false);

    commit_with_retry(store, cmd.auction_id, cmd.user_id, is_proxy, clock, |auction, now| {
        evaluate_bid(auction, amount, now)
    })
    .await
}

/// 2. 즉시 구매(낙찰)
pub async fn handle_buy_now<C>(
    store: &dyn AuctionStore,
    auction_id: Uuid,
    cmd: &BuyNowCommand,
    clock: C,
) -> Result<PlacedBid, CommandError>
where
    C: Fn() -> DateTime<Utc>,
{
    info!(
        "{:<12} --> 즉시 구매 요청 처리 시작: auction={}, {:?}",
        "Command", auction_id, cmd
    );
    commit_with_retry(store, auction_id, cmd.user_id, false, clock, evaluate_buy_now).await
}

// endregion: --- Commands

/// 읽기-평가-커밋 루프
/// 충돌 후 재시도는 새 시각으로 재평가하므로, 늦게 커밋된 입찰이 더 이른 시각을 갖지 않는다.
async fn commit_with_retry<C, F>(
    store: &dyn AuctionStore,
    auction_id: Uuid,
    user_id: Uuid,
    is_proxy: bool,
    clock: C,
    evaluate: F,
) -> Result<PlacedBid, CommandError>
where
    C: Fn() -> DateTime<Utc>,
    F: Fn(&Auction, DateTime<Utc>) -> Result<BidEvaluation, BidRejection>,
{
    let mut retries = 0;

    while retries < MAX_RETRIES {
        let auction = store.get_auction(auction_id).await?;
        let now = clock();
        let evaluation = evaluate(&auction, now)?;

        let mut draft = evaluation.bid;
        draft.is_proxy = is_proxy;
        let bid = draft.into_bid(Uuid::new_v4(), user_id);
        let events = evaluation
            .events(&bid)
            .iter()
            .map(|event| SystemEvent::for_auction(auction_id, event, now))
            .collect();

        let mut updated = auction;
        evaluation.apply_to(&mut updated);

        match store.commit_bid(updated, bid.clone(), events).await {
            Ok(auction) => {
                info!(
                    "{:<12} --> 입찰 성공: auction={}, 현재 가격 {}",
                    "Command", auction_id, bid.amount_cents
                );
                return Ok(PlacedBid { bid, auction });
            }
            Err(StoreError::Conflict) => {
                warn!(
                    "{:<12} --> 낙관적 업데이트로 인한 버전 충돌: 재시도",
                    "Command"
                );
                retries += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(CommandError::RetriesExhausted)
}
