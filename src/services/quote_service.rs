//! Quotes Service
//!
//! One-shot quote and historical-data reads. Recurring consumption
//! goes through the shared feed instead.

use crate::api::types::{HistoricalBar, Quote};
use crate::error::{AppError, Result};
use crate::state::AppState;
use tracing::info;

/// Quotes service for business logic
pub struct QuoteService;

impl QuoteService {
    /// Get quotes for one or more symbols
    pub async fn quotes(state: &AppState, symbols: &[String]) -> Result<Vec<Quote>> {
        info!("QuoteService::quotes - {} symbols", symbols.len());
        state.api.quotes(symbols).await
    }

    /// Get a single quote
    pub async fn quote(state: &AppState, symbol: &str) -> Result<Quote> {
        let quotes = Self::quotes(state, &[symbol.trim().to_uppercase()]).await?;
        quotes
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("Quote not found for {symbol}")))
    }

    /// Finite live price for a symbol, if the backend has one.
    pub async fn live_price(state: &AppState, symbol: &str) -> Result<Option<f64>> {
        let quotes = state.api.quotes(&[symbol.trim().to_uppercase()]).await?;
        Ok(quotes
            .first()
            .and_then(|quote| quote.price)
            .filter(|price| price.is_finite()))
    }

    /// Daily closes for a symbol over a backend-understood period
    /// (`"1mo"` and friends).
    pub async fn historical(
        state: &AppState,
        symbol: &str,
        period: &str,
    ) -> Result<Vec<HistoricalBar>> {
        info!("QuoteService::historical - {} {}", symbol, period);
        state.api.historical(symbol, period).await
    }
}
