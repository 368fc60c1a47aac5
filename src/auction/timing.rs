// region:    --- Imports
use super::model::AuctionStatus;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

// endregion: --- Imports

// region:    --- Time Remaining

/// 남은 시간 (일/시/분, 내림)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum TimeRemaining {
    Ended,
    Remaining { days: i64, hours: i64, minutes: i64 },
}

/// 종료 시각까지 남은 시간 계산. 두 시각만의 순수 함수라 폴링마다 다시 호출해도 된다.
pub fn time_remaining(ends_at: DateTime<Utc>, now: DateTime<Utc>) -> TimeRemaining {
    let diff = ends_at - now;
    if diff <= chrono::Duration::zero() {
        return TimeRemaining::Ended;
    }
    let total_minutes = diff.num_minutes();
    TimeRemaining::Remaining {
        days: total_minutes / (60 * 24),
        hours: (total_minutes / 60) % 24,
        minutes: total_minutes % 60,
    }
}

impl fmt::Display for TimeRemaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            TimeRemaining::Ended => f.write_str("Ended"),
            TimeRemaining::Remaining {
                days,
                hours,
                minutes,
            } if days > 0 => write!(f, "{}d {}h {}m", days, hours, minutes),
            TimeRemaining::Remaining { hours, minutes, .. } if hours > 0 => {
                write!(f, "{}h {}m", hours, minutes)
            }
            TimeRemaining::Remaining { minutes, .. } => write!(f, "{}m", minutes),
        }
    }
}

// endregion: --- Time Remaining

// region:    --- Status Label

/// 상태 표시 분류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusCategory {
    Active,
    Upcoming,
    Closed,
    Cancelled,
    Neutral,
}

impl StatusCategory {
    pub fn tone(&self) -> &'static str {
        match self {
            StatusCategory::Active => "green",
            StatusCategory::Upcoming => "yellow",
            StatusCategory::Cancelled => "red",
            StatusCategory::Closed | StatusCategory::Neutral => "gray",
        }
    }
}

pub fn status_label(status: AuctionStatus) -> StatusCategory {
    match status {
        AuctionStatus::Live => StatusCategory::Active,
        AuctionStatus::Pending => StatusCategory::Upcoming,
        AuctionStatus::Ended => StatusCategory::Closed,
        AuctionStatus::Cancelled => StatusCategory::Cancelled,
    }
}

/// 외부에서 받은 원시 상태 문자열용. 알 수 없는 값은 Neutral.
pub fn status_label_str(raw: &str) -> StatusCategory {
    raw.parse::<AuctionStatus>()
        .map(status_label)
        .unwrap_or(StatusCategory::Neutral)
}

// endregion: --- Status Label

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn ended_at_or_after_deadline() {
        assert_eq!(time_remaining(t0(), t0()), TimeRemaining::Ended);
        assert_eq!(
            time_remaining(t0(), t0() + Duration::seconds(1)),
            TimeRemaining::Ended
        );
        assert_eq!(time_remaining(t0(), t0()).to_string(), "Ended");
    }

    #[test]
    fn formats_by_magnitude_with_floor() {
        let now = t0();
        let r = time_remaining(now + Duration::seconds(2 * 86400 + 3 * 3600 + 4 * 60 + 59), now);
        assert_eq!(
            r,
            TimeRemaining::Remaining {
                days: 2,
                hours: 3,
                minutes: 4
            }
        );
        assert_eq!(r.to_string(), "2d 3h 4m");
        assert_eq!(
            time_remaining(now + Duration::minutes(125), now).to_string(),
            "2h 5m"
        );
        assert_eq!(
            time_remaining(now + Duration::seconds(59), now).to_string(),
            "0m"
        );
        assert_eq!(
            time_remaining(now + Duration::days(1), now).to_string(),
            "1d 0h 0m"
        );
    }

    #[test]
    fn deterministic_for_same_inputs() {
        let end = t0() + Duration::minutes(90);
        assert_eq!(time_remaining(end, t0()), time_remaining(end, t0()));
    }

    #[test]
    fn status_labels_cover_every_status() {
        assert_eq!(status_label(AuctionStatus::Live), StatusCategory::Active);
        assert_eq!(status_label(AuctionStatus::Pending), StatusCategory::Upcoming);
        assert_eq!(status_label(AuctionStatus::Ended), StatusCategory::Closed);
        assert_eq!(status_label(AuctionStatus::Cancelled).tone(), "red");
        assert_eq!(status_label_str("ARCHIVED"), StatusCategory::Neutral);
        assert_eq!(status_label_str("LIVE"), StatusCategory::Active);
    }
}
