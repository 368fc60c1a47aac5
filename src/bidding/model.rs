use crate::money::cents_string;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// 입찰 모델 (생성 후 불변)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Bid {
    pub id: Uuid,
    pub auction_id: Uuid,
    pub user_id: Uuid,
    #[serde(with = "cents_string")]
    pub amount_cents: i64,
    pub created_at: DateTime<Utc>,
    pub is_proxy: bool,
}

/// 입찰 명령
/// `amount_cents` 는 검증 전의 원시 JSON 값 (숫자 또는 문자열)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceBidCommand {
    pub auction_id: Uuid,
    pub user_id: Uuid,
    pub amount_cents: serde_json::Value,
    #[serde(default)]
    pub is_proxy: Option<bool>,
}

/// 즉시 구매 명령
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyNowCommand {
    pub user_id: Uuid,
}

/// 최신순 정렬 (createdAt 내림차순)
pub fn sort_newest_first(bids: &mut [Bid]) {
    bids.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
