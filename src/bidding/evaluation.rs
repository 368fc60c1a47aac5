/// 입찰 평가
/// 경매의 현재 상태와 제안 금액만으로 입찰 수락 여부와 결과 상태를 계산하는 순수 함수 모음.
/// 저장은 하지 않는다. 호출자가 입찰과 경매 변경을 원자적으로 커밋해야 한다.
// region:    --- Imports
use super::model::Bid;
use crate::auction::events::AuctionEvent;
use crate::auction::model::{Auction, AuctionStatus};
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

// endregion: --- Imports

// region:    --- Rejections

/// 사용자가 고칠 수 있는 입찰 거절 사유
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BidRejection {
    #[error("auction is not live")]
    AuctionNotLive,
    #[error("auction has ended")]
    AuctionEnded,
    #[error("bid must be at least {required_minimum}")]
    BidTooLow { required_minimum: i64 },
    #[error("bid amount must be a non-negative whole number of minor units")]
    InvalidAmount,
    #[error("buy now is not available for this auction")]
    BuyNowUnavailable,
}

impl BidRejection {
    pub fn code(&self) -> &'static str {
        match self {
            BidRejection::AuctionNotLive => "AUCTION_NOT_LIVE",
            BidRejection::AuctionEnded => "AUCTION_ENDED",
            BidRejection::BidTooLow { .. } => "BID_TOO_LOW",
            BidRejection::InvalidAmount => "INVALID_AMOUNT",
            BidRejection::BuyNowUnavailable => "BUY_NOW_UNAVAILABLE",
        }
    }

    pub fn required_minimum(&self) -> Option<i64> {
        match self {
            BidRejection::BidTooLow { required_minimum } => Some(*required_minimum),
            _ => None,
        }
    }

    /// 에러 응답의 code 로부터 복원
    pub fn from_code(code: &str, required_minimum: Option<i64>) -> Option<Self> {
        match code {
            "AUCTION_NOT_LIVE" => Some(BidRejection::AuctionNotLive),
            "AUCTION_ENDED" => Some(BidRejection::AuctionEnded),
            "BID_TOO_LOW" => Some(BidRejection::BidTooLow {
                required_minimum: required_minimum.unwrap_or(0),
            }),
            "INVALID_AMOUNT" => Some(BidRejection::InvalidAmount),
            "BUY_NOW_UNAVAILABLE" => Some(BidRejection::BuyNowUnavailable),
            _ => None,
        }
    }
}

// endregion: --- Rejections

// region:    --- Evaluation Result

/// 아직 식별자와 입찰자가 정해지지 않은 입찰
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BidDraft {
    pub auction_id: Uuid,
    pub amount_cents: i64,
    pub created_at: DateTime<Utc>,
    pub is_proxy: bool,
}

impl BidDraft {
    pub fn into_bid(self, id: Uuid, user_id: Uuid) -> Bid {
        Bid {
            id,
            auction_id: self.auction_id,
            user_id,
            amount_cents: self.amount_cents,
            created_at: self.created_at,
            is_proxy: self.is_proxy,
        }
    }
}

/// 수락된 입찰과 그에 따른 경매 변경분
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BidEvaluation {
    pub bid: BidDraft,
    pub current_price_cents: i64,
    pub ends_at: DateTime<Utc>,
    pub extensions_used: i32,
    pub extended: bool,
    pub closes_auction: bool,
}

impl BidEvaluation {
    /// 변경분을 경매에 반영 (버전은 저장소가 올린다)
    pub fn apply_to(&self, auction: &mut Auction) {
        auction.current_price_cents = Some(self.current_price_cents);
        auction.ends_at = self.ends_at;
        auction.extensions_used = self.extensions_used;
        if self.closes_auction {
            auction.status = AuctionStatus::Ended;
        }
    }

    /// 커밋과 함께 기록할 감사 이벤트
    pub fn events(&self, bid: &Bid) -> Vec<AuctionEvent> {
        let mut events = Vec::with_capacity(2);
        if self.closes_auction {
            events.push(AuctionEvent::BuyNowExecuted {
                bid_id: bid.id,
                buyer_id: bid.user_id,
                price_cents: bid.amount_cents,
            });
            events.push(AuctionEvent::StatusChanged {
                from: AuctionStatus::Live,
                to: AuctionStatus::Ended,
            });
        } else {
            events.push(AuctionEvent::BidPlaced {
                bid_id: bid.id,
                bidder_id: bid.user_id,
                amount_cents: bid.amount_cents,
                is_proxy: bid.is_proxy,
            });
        }
        if self.extended {
            events.push(AuctionEvent::AuctionExtended {
                ends_at: self.ends_at,
                extensions_used: self.extensions_used,
            });
        }
        events
    }
}

// endregion: --- Evaluation Result

// region:    --- Evaluation

/// 입찰 가능 상태 검증: LIVE 이고 now 가 [startsAt, endsAt) 안에 있어야 한다.
fn ensure_open(auction: &Auction, now: DateTime<Utc>) -> Result<(), BidRejection> {
    if auction.status != AuctionStatus::Live {
        return Err(BidRejection::AuctionNotLive);
    }
    if now >= auction.ends_at {
        return Err(BidRejection::AuctionEnded);
    }
    if now < auction.starts_at {
        return Err(BidRejection::AuctionNotLive);
    }
    Ok(())
}

/// 입찰 평가
pub fn evaluate_bid(
    auction: &Auction,
    proposed_amount: i64,
    now: DateTime<Utc>,
) -> Result<BidEvaluation, BidRejection> {
    ensure_open(auction, now)?;
    if proposed_amount < 0 {
        return Err(BidRejection::InvalidAmount);
    }

    let required_minimum = auction.required_minimum_cents();
    if proposed_amount < required_minimum {
        return Err(BidRejection::BidTooLow { required_minimum });
    }

    let (ends_at, extensions_used, extended) = match auto_extension(auction, now) {
        Some((ends_at, used)) => (ends_at, used, true),
        None => (auction.ends_at, auction.extensions_used, false),
    };

    Ok(BidEvaluation {
        bid: BidDraft {
            auction_id: auction.id,
            amount_cents: proposed_amount,
            created_at: now,
            is_proxy: false,
        },
        current_price_cents: proposed_amount,
        ends_at,
        extensions_used,
        extended,
        closes_auction: false,
    })
}

/// 스나이핑 방지 자동 연장
/// 마감까지 남은 시간이 autoExtendSeconds 이하이고 연장 횟수가 남아 있으면 그만큼 마감을 미룬다.
pub fn auto_extension(auction: &Auction, now: DateTime<Utc>) -> Option<(DateTime<Utc>, i32)> {
    if auction.auto_extend_seconds <= 0 || auction.extensions_used >= auction.max_extensions {
        return None;
    }
    let window = Duration::try_seconds(auction.auto_extend_seconds)?;
    if auction.ends_at - now > window {
        return None;
    }
    // 표현 범위를 넘는 마감 시각이면 연장하지 않는다
    let ends_at = auction.ends_at.checked_add_signed(window)?;
    Some((ends_at, auction.extensions_used + 1))
}

/// 즉시 구매 평가: 즉시 구매가로 입찰을 기록하고 경매를 종료한다.
pub fn evaluate_buy_now(auction: &Auction, now: DateTime<Utc>) -> Result<BidEvaluation, BidRejection> {
    ensure_open(auction, now)?;
    let price = match auction.buy_now_price_cents {
        Some(price) if auction.current_price_cents.map_or(true, |current| current < price) => price,
        _ => return Err(BidRejection::BuyNowUnavailable),
    };

    Ok(BidEvaluation {
        bid: BidDraft {
            auction_id: auction.id,
            amount_cents: price,
            created_at: now,
            is_proxy: false,
        },
        current_price_cents: price,
        ends_at: auction.ends_at,
        extensions_used: auction.extensions_used,
        extended: false,
        closes_auction: true,
    })
}

/// 외부에서 받은 금액 값 검증 (숫자 또는 10진수 문자열)
/// 음수, 소수, 비유한수, 범위 밖의 값은 InvalidAmount.
pub fn validate_amount(raw: &Value) -> Result<i64, BidRejection> {
    let amount = match raw {
        Value::Number(n) => match n.as_i64() {
            Some(v) => Some(v),
            None if n.is_u64() => None,
            None => n.as_f64().and_then(whole_f64),
        },
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(whole_f64))
        }
        _ => None,
    };
    amount
        .filter(|v| *v >= 0)
        .ok_or(BidRejection::InvalidAmount)
}

fn whole_f64(v: f64) -> Option<i64> {
    (v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64).then_some(v as i64)
}

// endregion: --- Evaluation
