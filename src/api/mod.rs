//! REST client for the PaperTrade backend
//!
//! One shared `reqwest` client over the backend routes. Non-2xx
//! responses surface the body's `detail` field verbatim; transport
//! failures map to [`AppError::Http`]. Nothing here retries.

pub mod types;

use crate::config::ApiConfig;
use crate::error::{AppError, Result};
use crate::feed::QuoteSource;
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use types::*;
use urlencoding::encode;

/// Typed client for the backend REST interface.
pub struct ApiClient {
    client: Client,
    config: ApiConfig,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to create HTTP client"),
            config,
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Quotes & market data
    // ------------------------------------------------------------------

    /// `GET /quotes?symbols=A,B,C`
    pub async fn quotes(&self, symbols: &[String]) -> Result<Vec<Quote>> {
        let path = format!("/quotes?symbols={}", symbols.join(","));
        self.get_json(&path).await
    }

    /// `GET /historical?symbol=X&period=1mo`
    pub async fn historical(&self, symbol: &str, period: &str) -> Result<Vec<HistoricalBar>> {
        let path = format!("/historical?symbol={}&period={}", encode(symbol), encode(period));
        self.get_json(&path).await
    }

    /// `GET /search?q=...`
    pub async fn search(&self, query: &str) -> Result<Vec<SymbolMatch>> {
        let path = format!("/search?q={}", encode(query));
        self.get_json(&path).await
    }

    // ------------------------------------------------------------------
    // Watchlist
    // ------------------------------------------------------------------

    pub async fn watchlist(&self, username: &str) -> Result<Vec<String>> {
        self.get_json(&format!("/watchlist/{}", encode(username))).await
    }

    pub async fn add_to_watchlist(&self, username: &str, symbol: &str) -> Result<()> {
        let body = WatchlistEntry { symbol: symbol.to_string() };
        let response = self
            .client
            .post(self.config.endpoint(&format!("/watchlist/{}", encode(username))))
            .json(&body)
            .send()
            .await?;
        Self::check(response).await
    }

    pub async fn remove_from_watchlist(&self, username: &str, symbol: &str) -> Result<()> {
        let body = WatchlistEntry { symbol: symbol.to_string() };
        let response = self
            .client
            .delete(self.config.endpoint(&format!("/watchlist/{}", encode(username))))
            .json(&body)
            .send()
            .await?;
        Self::check(response).await
    }

    // ------------------------------------------------------------------
    // Orders
    // ------------------------------------------------------------------

    /// `POST /orders`
    pub async fn place_order(&self, ticket: &OrderTicket) -> Result<PlaceOrderResponse> {
        self.post_json("/orders", ticket).await
    }

    /// `POST /orders/sell/preview`
    ///
    /// Returns the HTTP status alongside the parsed body: a 409 is a
    /// precheck outcome (short sell needs confirmation), not an error.
    pub async fn sell_preview(
        &self,
        request: &SellPreviewRequest,
    ) -> Result<(u16, SellPreviewResponse)> {
        let response = self
            .client
            .post(self.config.endpoint("/orders/sell/preview"))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() || status == StatusCode::CONFLICT {
            let body = response.json::<SellPreviewResponse>().await.unwrap_or_default();
            return Ok((status.as_u16(), body));
        }
        Err(Self::error_from(response).await)
    }

    pub async fn open_orders(&self, username: &str) -> Result<Vec<OpenOrder>> {
        self.get_json(&format!("/orders/{}", encode(username))).await
    }

    pub async fn positions(&self, username: &str) -> Result<Vec<PositionRow>> {
        self.get_json(&format!("/orders/positions/{}", encode(username))).await
    }

    /// `PUT /orders/modify/{id}`
    pub async fn modify_order(&self, order_id: i64, request: &ModifyOrderRequest) -> Result<()> {
        let response = self
            .client
            .put(self.config.endpoint(&format!("/orders/modify/{order_id}")))
            .json(request)
            .send()
            .await?;
        Self::check(response).await
    }

    /// `DELETE /orders/cancel/{id}`
    pub async fn cancel_order(&self, order_id: i64) -> Result<()> {
        let response = self
            .client
            .delete(self.config.endpoint(&format!("/orders/cancel/{order_id}")))
            .send()
            .await?;
        Self::check(response).await
    }

    pub async fn trade_history(&self, username: &str) -> Result<Vec<HistoryRow>> {
        self.get_json(&format!("/orders/history/{}", encode(username))).await
    }

    // ------------------------------------------------------------------
    // Portfolio & funds
    // ------------------------------------------------------------------

    pub async fn portfolio(&self, username: &str) -> Result<Portfolio> {
        self.get_json(&format!("/portfolio/{}", encode(username))).await
    }

    pub async fn available_funds(&self, username: &str) -> Result<FundsSnapshot> {
        self.get_json(&format!("/funds/available/{}", encode(username))).await
    }

    pub async fn add_funds(&self, transfer: &FundsTransfer) -> Result<()> {
        let response = self
            .client
            .post(self.config.endpoint("/funds/add"))
            .json(transfer)
            .send()
            .await?;
        Self::check(response).await
    }

    pub async fn withdraw_funds(&self, transfer: &FundsTransfer) -> Result<()> {
        let response = self
            .client
            .post(self.config.endpoint("/funds/withdraw"))
            .json(transfer)
            .send()
            .await?;
        Self::check(response).await
    }

    // ------------------------------------------------------------------
    // Auth
    // ------------------------------------------------------------------

    pub async fn login(&self, credentials: &Credentials) -> Result<AuthResponse> {
        self.post_json("/auth/login", credentials).await
    }

    pub async fn register(&self, credentials: &Credentials) -> Result<AuthResponse> {
        self.post_json("/auth/register", credentials).await
    }

    // ------------------------------------------------------------------
    // Private Helper Methods
    // ------------------------------------------------------------------

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.client.get(self.config.endpoint(path)).send().await?;
        Self::parse(response).await
    }

    async fn post_json<B: serde::Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let response = self
            .client
            .post(self.config.endpoint(path))
            .json(body)
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T> {
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        Ok(response.json().await?)
    }

    async fn check(response: Response) -> Result<()> {
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        Ok(())
    }

    async fn error_from(response: Response) -> AppError {
        #[derive(Deserialize)]
        struct ErrorBody {
            #[serde(default)]
            detail: Option<String>,
        }

        let status = response.status().as_u16();
        let detail = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.detail)
            .unwrap_or_else(|| format!("HTTP {status}"));

        AppError::Api { status, detail }
    }
}

#[async_trait]
impl QuoteSource for ApiClient {
    async fn fetch(&self, symbols: &[String]) -> Result<Vec<Quote>> {
        self.quotes(symbols).await
    }
}
