/// REST 클라이언트
/// 백엔드의 요청/응답 계약을 타입으로 감싼다.
/// 입찰 제출 결과는 "입찰이 거절됨"(BidRejection)과 "요청 실패, 재시도 가능"을 구분해 돌려준다.
// region:    --- Imports
use crate::auction::model::{Auction, AuctionPatch};
use crate::bidding::evaluation::{evaluate_bid, BidRejection};
use crate::bidding::model::{sort_newest_first, Bid, BuyNowCommand, PlaceBidCommand};
use crate::config::Config;
use crate::handlers::ErrorBody;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

// endregion: --- Imports

#[derive(Debug, Error)]
pub enum ClientError {
    /// 사용자가 고칠 수 있는 도메인 거절
    #[error(transparent)]
    Rejected(BidRejection),
    #[error("request failed with status {status}: {message}")]
    Status { status: StatusCode, message: String },
    #[error(transparent)]
    Request(#[from] reqwest::Error),
}

impl ClientError {
    /// 다시 시도해 볼 만한 실패인지 (도메인 거절은 아님)
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Rejected(_) => false,
            ClientError::Status { status, .. } => {
                status.is_server_error()
                    || *status == StatusCode::CONFLICT
                    || *status == StatusCode::REQUEST_TIMEOUT
                    || *status == StatusCode::TOO_MANY_REQUESTS
            }
            ClientError::Request(_) => true,
        }
    }

    pub fn rejection(&self) -> Option<BidRejection> {
        match self {
            ClientError::Rejected(rejection) => Some(*rejection),
            _ => None,
        }
    }
}

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// API_URL 설정값 사용
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.api_url.clone())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// 요청 전송 후 응답 본문 해석. 4xx 응답의 도메인 에러 코드는 Rejected 로 복원한다.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let error = serde_json::from_str::<ErrorBody>(&body).ok();
        if let Some(rejection) = error
            .as_ref()
            .filter(|_| status.is_client_error())
            .and_then(|e| {
                e.code
                    .as_deref()
                    .and_then(|code| BidRejection::from_code(code, e.required_minimum))
            })
        {
            return Err(ClientError::Rejected(rejection));
        }
        warn!("{:<12} --> 요청 실패: status={}", "Client", status);
        Err(ClientError::Status {
            status,
            message: error.map(|e| e.message).unwrap_or(body),
        })
    }

    pub async fn get_auction(&self, id: Uuid) -> Result<Auction, ClientError> {
        self.send(self.http.get(self.url(&format!("/auctions/{}", id))))
            .await
    }

    pub async fn list_auctions(&self) -> Result<Vec<Auction>, ClientError> {
        self.send(self.http.get(self.url("/auctions"))).await
    }

    pub async fn patch_auction(&self, id: Uuid, patch: &AuctionPatch) -> Result<Auction, ClientError> {
        self.send(
            self.http
                .patch(self.url(&format!("/auctions/{}", id)))
                .json(patch),
        )
        .await
    }

    /// 입찰 이력 (최신순)
    pub async fn list_bids_for_auction(&self, auction_id: Uuid) -> Result<Vec<Bid>, ClientError> {
        let mut bids: Vec<Bid> = self
            .send(
                self.http
                    .get(self.url(&format!("/bids/auction/{}", auction_id))),
            )
            .await?;
        sort_newest_first(&mut bids);
        Ok(bids)
    }

    pub async fn get_bid(&self, id: Uuid) -> Result<Bid, ClientError> {
        self.send(self.http.get(self.url(&format!("/bids/{}", id))))
            .await
    }

    pub async fn place_bid(&self, cmd: &PlaceBidCommand) -> Result<Bid, ClientError> {
        info!(
            "{:<12} --> 입찰 전송: auction={}, amount={}",
            "Client", cmd.auction_id, cmd.amount_cents
        );
        self.send(self.http.post(self.url("/bids")).json(cmd)).await
    }

    pub async fn buy_now(&self, auction_id: Uuid, user_id: Uuid) -> Result<Bid, ClientError> {
        self.send(
            self.http
                .post(self.url(&format!("/auctions/{}/buy-now", auction_id)))
                .json(&BuyNowCommand { user_id }),
        )
        .await
    }

    /// 입찰 제출
    /// 손에 든 경매 스냅샷으로 먼저 평가해 명백한 거절은 요청 없이 돌려주고, 최종 판단은 서버가 한다.
    pub async fn submit_bid(
        &self,
        auction: &Auction,
        user_id: Uuid,
        amount_cents: i64,
        now: DateTime<Utc>,
    ) -> Result<Bid, ClientError> {
        evaluate_bid(auction, amount_cents, now).map_err(ClientError::Rejected)?;
        self.place_bid(&PlaceBidCommand {
            auction_id: auction.id,
            user_id,
            amount_cents: serde_json::Value::from(amount_cents),
            is_proxy: None,
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        assert!(!ClientError::Rejected(BidRejection::AuctionEnded).is_retryable());
        assert!(ClientError::Status {
            status: StatusCode::BAD_GATEWAY,
            message: String::new()
        }
        .is_retryable());
        assert!(ClientError::Status {
            status: StatusCode::CONFLICT,
            message: String::new()
        }
        .is_retryable());
        assert!(!ClientError::Status {
            status: StatusCode::NOT_FOUND,
            message: String::new()
        }
        .is_retryable());
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = ApiClient::new("http://localhost:3000/");
        assert_eq!(client.url("/bids"), "http://localhost:3000/bids");

        let client = ApiClient::from_config(&Config::default());
        assert_eq!(client.url("/auctions"), "http://localhost:3000/auctions");
    }
}
