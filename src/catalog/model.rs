use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// 상품 모델
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub images: Option<serde_json::Value>,
    pub category_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

// 상품 등록 요청
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    pub seller_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub images: Option<serde_json::Value>,
    #[serde(default)]
    pub category_id: Option<Uuid>,
}

impl NewItem {
    pub fn into_item(self, id: Uuid, now: DateTime<Utc>) -> Item {
        Item {
            id,
            seller_id: self.seller_id,
            title: self.title,
            description: self.description,
            images: self.images,
            category_id: self.category_id,
            created_at: now,
            updated_at: None,
        }
    }
}

// 상품 수정 요청
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPatch {
    #[serde(default)]
    pub seller_id: Option<Uuid>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub images: Option<serde_json::Value>,
    #[serde(default)]
    pub category_id: Option<Uuid>,
}

impl ItemPatch {
    pub fn apply(self, item: &mut Item, now: DateTime<Utc>) {
        if let Some(seller_id) = self.seller_id {
            item.seller_id = seller_id;
        }
        if let Some(title) = self.title {
            item.title = title;
        }
        if self.description.is_some() {
            item.description = self.description;
        }
        if self.images.is_some() {
            item.images = self.images;
        }
        if self.category_id.is_some() {
            item.category_id = self.category_id;
        }
        item.updated_at = Some(now);
    }
}

// 관심 목록 모델
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Watchlist {
    pub user_id: Uuid,
    pub auction_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistKey {
    pub user_id: Uuid,
    pub auction_id: Uuid,
}
