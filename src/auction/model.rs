use crate::money::{
    self, cents_string, option_cents_string, option_strict_cents_string, strict_cents_string,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// 경매 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuctionStatus {
    Pending,
    Live,
    Ended,
    Cancelled,
}

impl AuctionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuctionStatus::Pending => "PENDING",
            AuctionStatus::Live => "LIVE",
            AuctionStatus::Ended => "ENDED",
            AuctionStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for AuctionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl FromStr for AuctionStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(AuctionStatus::Pending),
            "LIVE" => Ok(AuctionStatus::Live),
            "ENDED" => Ok(AuctionStatus::Ended),
            "CANCELLED" => Ok(AuctionStatus::Cancelled),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

// 경매 모델
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Auction {
    pub id: Uuid,
    pub item_id: Uuid,
    pub currency: String,
    #[serde(with = "cents_string")]
    pub start_price_cents: i64,
    #[serde(with = "cents_string")]
    pub min_increment_cents: i64,
    #[serde(with = "option_cents_string", default)]
    pub reserve_price_cents: Option<i64>,
    #[serde(with = "option_cents_string", default)]
    pub buy_now_price_cents: Option<i64>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub status: AuctionStatus,
    pub auto_extend_seconds: i64,
    pub max_extensions: i32,
    #[serde(default)]
    pub extensions_used: i32,
    #[serde(
        with = "option_cents_string",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub current_price_cents: Option<i64>,
    /// 낙관적 동시성 제어용 버전 (커밋마다 1 증가)
    #[serde(default)]
    pub version: i64,
    pub created_at: DateTime<Utc>,
}

impl Auction {
    /// 다음 입찰의 기준 가격 (현재가, 입찰이 없으면 시작가)
    pub fn baseline_cents(&self) -> i64 {
        self.current_price_cents.unwrap_or(self.start_price_cents)
    }

    /// 최소 입찰 가능 금액
    pub fn required_minimum_cents(&self) -> i64 {
        self.baseline_cents()
            .saturating_add(self.min_increment_cents)
    }

    /// 최저 낙찰가 충족 여부 (최저 낙찰가가 없으면 항상 충족)
    pub fn reserve_met(&self) -> bool {
        match (self.reserve_price_cents, self.current_price_cents) {
            (None, _) => true,
            (Some(reserve), Some(current)) => current >= reserve,
            (Some(_), None) => false,
        }
    }

    pub fn display_price(&self) -> String {
        money::format_cents(self.baseline_cents(), &self.currency)
    }
}

// 경매 생성 요청
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAuction {
    pub item_id: Uuid,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(with = "strict_cents_string")]
    pub start_price_cents: i64,
    #[serde(with = "strict_cents_string")]
    pub min_increment_cents: i64,
    #[serde(with = "option_strict_cents_string", default)]
    pub reserve_price_cents: Option<i64>,
    #[serde(with = "option_strict_cents_string", default)]
    pub buy_now_price_cents: Option<i64>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    #[serde(default)]
    pub status: Option<AuctionStatus>,
    #[serde(default)]
    pub auto_extend_seconds: Option<i64>,
    #[serde(default)]
    pub max_extensions: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuctionValidationError {
    #[error("endsAt must be after startsAt")]
    EmptyWindow,
    #[error("{0} must not be negative")]
    Negative(&'static str),
    #[error("{0} must not exceed {1}")]
    TooLarge(&'static str, i64),
}

/// 자동 연장 1회 최대 길이 (7일)
pub const MAX_AUTO_EXTEND_SECONDS: i64 = 7 * 24 * 60 * 60;

impl NewAuction {
    /// 기본값을 채워 경매 레코드 생성
    pub fn into_auction(
        self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Auction, AuctionValidationError> {
        let auction = Auction {
            id,
            item_id: self.item_id,
            currency: self
                .currency
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| money::DEFAULT_CURRENCY.to_string()),
            start_price_cents: self.start_price_cents,
            min_increment_cents: self.min_increment_cents,
            reserve_price_cents: self.reserve_price_cents,
            buy_now_price_cents: self.buy_now_price_cents,
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            status: self.status.unwrap_or(AuctionStatus::Pending),
            auto_extend_seconds: self.auto_extend_seconds.unwrap_or(0),
            max_extensions: self.max_extensions.unwrap_or(0),
            extensions_used: 0,
            current_price_cents: None,
            version: 0,
            created_at: now,
        };
        auction.validate()?;
        Ok(auction)
    }
}

impl Auction {
    pub fn validate(&self) -> Result<(), AuctionValidationError> {
        if self.ends_at <= self.starts_at {
            return Err(AuctionValidationError::EmptyWindow);
        }
        let amounts = [
            ("startPriceCents", Some(self.start_price_cents)),
            ("minIncrementCents", Some(self.min_increment_cents)),
            ("reservePriceCents", self.reserve_price_cents),
            ("buyNowPriceCents", self.buy_now_price_cents),
        ];
        for (name, value) in amounts {
            if value.is_some_and(|v| v < 0) {
                return Err(AuctionValidationError::Negative(name));
            }
        }
        if self.auto_extend_seconds < 0 {
            return Err(AuctionValidationError::Negative("autoExtendSeconds"));
        }
        if self.auto_extend_seconds > MAX_AUTO_EXTEND_SECONDS {
            return Err(AuctionValidationError::TooLarge(
                "autoExtendSeconds",
                MAX_AUTO_EXTEND_SECONDS,
            ));
        }
        if self.max_extensions < 0 {
            return Err(AuctionValidationError::Negative("maxExtensions"));
        }
        Ok(())
    }
}

// 경매 수정 요청 (관리자용)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(
        with = "option_strict_cents_string",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub start_price_cents: Option<i64>,
    #[serde(
        with = "option_strict_cents_string",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub min_increment_cents: Option<i64>,
    #[serde(
        with = "option_strict_cents_string",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub reserve_price_cents: Option<i64>,
    #[serde(
        with = "option_strict_cents_string",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub buy_now_price_cents: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AuctionStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_extend_seconds: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_extensions: Option<i32>,
}

impl AuctionPatch {
    pub fn status(status: AuctionStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// 상태를 제외한 필드 변경을 적용 (상태 전이는 lifecycle에서 검증)
    pub fn apply_fields(&self, auction: &mut Auction) {
        if let Some(item_id) = self.item_id {
            auction.item_id = item_id;
        }
        if let Some(currency) = &self.currency {
            auction.currency = currency.clone();
        }
        if let Some(v) = self.start_price_cents {
            auction.start_price_cents = v;
        }
        if let Some(v) = self.min_increment_cents {
            auction.min_increment_cents = v;
        }
        if self.reserve_price_cents.is_some() {
            auction.reserve_price_cents = self.reserve_price_cents;
        }
        if self.buy_now_price_cents.is_some() {
            auction.buy_now_price_cents = self.buy_now_price_cents;
        }
        if let Some(v) = self.starts_at {
            auction.starts_at = v;
        }
        if let Some(v) = self.ends_at {
            auction.ends_at = v;
        }
        if let Some(v) = self.auto_extend_seconds {
            auction.auto_extend_seconds = v;
        }
        if let Some(v) = self.max_extensions {
            auction.max_extensions = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn new_auction() -> NewAuction {
        let now = Utc::now();
        NewAuction {
            item_id: Uuid::new_v4(),
            currency: None,
            start_price_cents: 10000,
            min_increment_cents: 500,
            reserve_price_cents: Some(20000),
            buy_now_price_cents: None,
            starts_at: now,
            ends_at: now + Duration::hours(1),
            status: None,
            auto_extend_seconds: None,
            max_extensions: None,
        }
    }

    #[test]
    fn new_auction_gets_defaults() {
        let auction = new_auction()
            .into_auction(Uuid::new_v4(), Utc::now())
            .unwrap();
        assert_eq!(auction.currency, "VND");
        assert_eq!(auction.status, AuctionStatus::Pending);
        assert_eq!(auction.auto_extend_seconds, 0);
        assert_eq!(auction.baseline_cents(), 10000);
        assert_eq!(auction.required_minimum_cents(), 10500);
        assert!(!auction.reserve_met());
    }

    #[test]
    fn rejects_inverted_window_and_negative_amounts() {
        let mut req = new_auction();
        req.ends_at = req.starts_at;
        assert_eq!(
            req.into_auction(Uuid::new_v4(), Utc::now()).unwrap_err(),
            AuctionValidationError::EmptyWindow
        );

        let mut req = new_auction();
        req.min_increment_cents = -1;
        assert_eq!(
            req.into_auction(Uuid::new_v4(), Utc::now()).unwrap_err(),
            AuctionValidationError::Negative("minIncrementCents")
        );

        let mut req = new_auction();
        req.auto_extend_seconds = Some(10_000_000_000_000);
        req.max_extensions = Some(1);
        assert_eq!(
            req.into_auction(Uuid::new_v4(), Utc::now()).unwrap_err(),
            AuctionValidationError::TooLarge("autoExtendSeconds", MAX_AUTO_EXTEND_SECONDS)
        );

        let mut req = new_auction();
        req.auto_extend_seconds = Some(MAX_AUTO_EXTEND_SECONDS);
        assert!(req.into_auction(Uuid::new_v4(), Utc::now()).is_ok());
    }

    #[test]
    fn malformed_money_in_requests_is_rejected() {
        let now = Utc::now();
        let body = serde_json::json!({
            "itemId": Uuid::new_v4(),
            "startPriceCents": "10000",
            "minIncrementCents": "abc",
            "buyNowPriceCents": "12.50",
            "startsAt": now,
            "endsAt": now + Duration::hours(1)
        });
        assert!(serde_json::from_value::<NewAuction>(body).is_err());

        let body = serde_json::json!({
            "itemId": Uuid::new_v4(),
            "startPriceCents": 10000,
            "minIncrementCents": "500",
            "buyNowPriceCents": null,
            "startsAt": now,
            "endsAt": now + Duration::hours(1)
        });
        let parsed: NewAuction = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.min_increment_cents, 500);
        assert_eq!(parsed.buy_now_price_cents, None);

        assert!(serde_json::from_value::<AuctionPatch>(
            serde_json::json!({ "buyNowPriceCents": "12.50" })
        )
        .is_err());
        assert!(serde_json::from_value::<AuctionPatch>(
            serde_json::json!({ "minIncrementCents": 18446744073709551615u64 })
        )
        .is_err());
        let patch: AuctionPatch =
            serde_json::from_value(serde_json::json!({ "reservePriceCents": "20000" })).unwrap();
        assert_eq!(patch.reserve_price_cents, Some(20000));
    }

    #[test]
    fn serializes_money_as_strings_and_omits_missing_current_price() {
        let auction = new_auction()
            .into_auction(Uuid::new_v4(), Utc::now())
            .unwrap();
        let json = serde_json::to_value(&auction).unwrap();
        assert_eq!(json["startPriceCents"], "10000");
        assert_eq!(json["status"], "PENDING");
        assert!(json.get("currentPriceCents").is_none());

        let back: Auction = serde_json::from_value(json).unwrap();
        assert_eq!(back, auction);
    }
}
