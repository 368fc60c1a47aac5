use super::model::AuctionStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const AUCTION_ENTITY: &str = "AUCTION";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuctionEvent {
    // 입찰 이벤트
    BidPlaced {
        bid_id: Uuid,
        bidder_id: Uuid,
        amount_cents: i64,
        is_proxy: bool,
    },
    // 마감 연장 이벤트
    AuctionExtended {
        ends_at: DateTime<Utc>,
        extensions_used: i32,
    },
    // 즉시 구매 이벤트
    BuyNowExecuted {
        bid_id: Uuid,
        buyer_id: Uuid,
        price_cents: i64,
    },
    // 상태 변경 이벤트
    StatusChanged {
        from: AuctionStatus,
        to: AuctionStatus,
    },
}

impl AuctionEvent {
    pub fn action(&self) -> &'static str {
        match self {
            AuctionEvent::BidPlaced { .. } => "BID_PLACED",
            AuctionEvent::AuctionExtended { .. } => "AUCTION_EXTENDED",
            AuctionEvent::BuyNowExecuted { .. } => "BUY_NOW_EXECUTED",
            AuctionEvent::StatusChanged { .. } => "STATUS_CHANGED",
        }
    }

    pub fn actor(&self) -> Option<Uuid> {
        match self {
            AuctionEvent::BidPlaced { bidder_id, .. } => Some(*bidder_id),
            AuctionEvent::BuyNowExecuted { buyer_id, .. } => Some(*buyer_id),
            _ => None,
        }
    }
}

/// 감사 기록(system event) 모델
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SystemEvent {
    pub id: Uuid,
    pub actor_user_id: Option<Uuid>,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Uuid,
    pub meta: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl SystemEvent {
    pub fn for_auction(auction_id: Uuid, event: &AuctionEvent, at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            actor_user_id: event.actor(),
            action: event.action().to_string(),
            entity_type: AUCTION_ENTITY.to_string(),
            entity_id: auction_id,
            meta: serde_json::to_value(event).unwrap_or(serde_json::Value::Null),
            created_at: at,
        }
    }
}
