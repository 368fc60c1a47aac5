/// 경매 상태 전이 규칙
/// PENDING -> LIVE -> {ENDED, CANCELLED}, PENDING -> CANCELLED
/// ENDED, CANCELLED 는 종료 상태이며 더 이상 전이하지 않는다.
// region:    --- Imports
use super::model::{Auction, AuctionStatus};
use chrono::{DateTime, Utc};
use thiserror::Error;

// endregion: --- Imports

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot move auction from {from} to {to}")]
pub struct InvalidTransition {
    pub from: AuctionStatus,
    pub to: AuctionStatus,
}

impl AuctionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AuctionStatus::Ended | AuctionStatus::Cancelled)
    }

    pub fn can_transition_to(&self, next: AuctionStatus) -> bool {
        use AuctionStatus::*;
        matches!(
            (self, next),
            (Pending, Live) | (Pending, Cancelled) | (Live, Ended) | (Live, Cancelled)
        )
    }

    /// 전이 검증. 같은 상태로의 요청은 아무 것도 바꾸지 않으므로 허용한다.
    pub fn transition(self, next: AuctionStatus) -> Result<AuctionStatus, InvalidTransition> {
        if self == next || self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(InvalidTransition {
                from: self,
                to: next,
            })
        }
    }
}

/// 스케줄러가 적용할 시간 기반 전이
/// 시작 시각이 지난 PENDING 은 LIVE, 종료 시각이 지난 LIVE 는 ENDED.
pub fn scheduled_transition(auction: &Auction, now: DateTime<Utc>) -> Option<AuctionStatus> {
    match auction.status {
        AuctionStatus::Pending if now >= auction.ends_at => None,
        AuctionStatus::Pending if now >= auction.starts_at => Some(AuctionStatus::Live),
        AuctionStatus::Live if now >= auction.ends_at => Some(AuctionStatus::Ended),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uuid::Uuid;

    fn auction(status: AuctionStatus, starts_in: i64, ends_in: i64, now: DateTime<Utc>) -> Auction {
        Auction {
            id: Uuid::new_v4(),
            item_id: Uuid::new_v4(),
            currency: "VND".to_string(),
            start_price_cents: 10000,
            min_increment_cents: 500,
            reserve_price_cents: None,
            buy_now_price_cents: None,
            starts_at: now + Duration::seconds(starts_in),
            ends_at: now + Duration::seconds(ends_in),
            status,
            auto_extend_seconds: 0,
            max_extensions: 0,
            extensions_used: 0,
            current_price_cents: None,
            version: 0,
            created_at: now,
        }
    }

    #[test]
    fn terminal_states_never_move() {
        use AuctionStatus::*;
        for terminal in [Ended, Cancelled] {
            assert!(terminal.is_terminal());
            for next in [Pending, Live, Ended, Cancelled] {
                if next != terminal {
                    assert!(terminal.transition(next).is_err());
                }
            }
        }
    }

    #[test]
    fn forward_transitions() {
        use AuctionStatus::*;
        assert_eq!(Pending.transition(Live), Ok(Live));
        assert_eq!(Pending.transition(Cancelled), Ok(Cancelled));
        assert_eq!(Live.transition(Ended), Ok(Ended));
        assert_eq!(Live.transition(Cancelled), Ok(Cancelled));
        assert_eq!(
            Live.transition(Pending),
            Err(InvalidTransition {
                from: Live,
                to: Pending
            })
        );
        assert!(Pending.transition(Ended).is_err());
    }

    #[test]
    fn schedule_activates_and_ends() {
        let now = Utc::now();
        assert_eq!(
            scheduled_transition(&auction(AuctionStatus::Pending, -1, 60, now), now),
            Some(AuctionStatus::Live)
        );
        assert_eq!(
            scheduled_transition(&auction(AuctionStatus::Pending, 10, 60, now), now),
            None
        );
        assert_eq!(
            scheduled_transition(&auction(AuctionStatus::Live, -60, 0, now), now),
            Some(AuctionStatus::Ended)
        );
        assert_eq!(
            scheduled_transition(&auction(AuctionStatus::Live, -60, 1, now), now),
            None
        );
        assert_eq!(
            scheduled_transition(&auction(AuctionStatus::Cancelled, -60, -1, now), now),
            None
        );
    }
}
