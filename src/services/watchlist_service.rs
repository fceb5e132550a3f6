//! Watchlist Service
//!
//! Watchlist membership and the search box that feeds it. Mutations
//! re-read the list from the backend rather than patching locally.

use crate::api::types::SymbolMatch;
use crate::error::Result;
use crate::state::AppState;
use tracing::info;

/// Watchlist service for business logic
pub struct WatchlistService;

impl WatchlistService {
    /// Watchlist symbols for the logged-in user.
    pub async fn watchlist(state: &AppState) -> Result<Vec<String>> {
        let username = state.session.username()?;
        state.api.watchlist(&username).await
    }

    /// Add a symbol, returning the refreshed list.
    pub async fn add(state: &AppState, symbol: &str) -> Result<Vec<String>> {
        let username = state.session.username()?;
        info!("WatchlistService::add - {}", symbol);
        state
            .api
            .add_to_watchlist(&username, &symbol.trim().to_uppercase())
            .await?;
        state.api.watchlist(&username).await
    }

    /// Remove a symbol, returning the refreshed list.
    pub async fn remove(state: &AppState, symbol: &str) -> Result<Vec<String>> {
        let username = state.session.username()?;
        info!("WatchlistService::remove - {}", symbol);
        state
            .api
            .remove_from_watchlist(&username, &symbol.trim().to_uppercase())
            .await?;
        state.api.watchlist(&username).await
    }

    /// Search suggestions for the add box.
    pub async fn search(state: &AppState, query: &str) -> Result<Vec<SymbolMatch>> {
        state.api.search(query).await
    }
}
