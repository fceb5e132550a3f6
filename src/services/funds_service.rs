//! Funds Service
//!
//! Funds ledger reads and the add/withdraw flows. Amount input passes
//! the same positive-finite gate as order quantities, with grouping
//! commas tolerated ("1,00,000").

use crate::api::types::{FundsSnapshot, FundsTransfer};
use crate::error::{AppError, Result};
use crate::services::parse_positive;
use crate::state::AppState;
use tracing::info;

/// Funds service for business logic
pub struct FundsService;

impl FundsService {
    /// Current funds for the logged-in user.
    pub async fn available(state: &AppState) -> Result<FundsSnapshot> {
        let username = state.session.username()?;
        state.api.available_funds(&username).await
    }

    /// Add funds, returning the refreshed snapshot.
    pub async fn add(state: &AppState, amount_input: &str) -> Result<FundsSnapshot> {
        let username = state.session.username()?;
        let amount = parse_amount(amount_input)?;
        info!("FundsService::add - {}", amount);

        state
            .api
            .add_funds(&FundsTransfer { username, amount })
            .await?;
        Self::available(state).await
    }

    /// Withdraw funds, returning the refreshed snapshot.
    pub async fn withdraw(state: &AppState, amount_input: &str) -> Result<FundsSnapshot> {
        let username = state.session.username()?;
        let amount = parse_amount(amount_input)?;
        info!("FundsService::withdraw - {}", amount);

        state
            .api
            .withdraw_funds(&FundsTransfer { username, amount })
            .await?;
        Self::available(state).await
    }
}

/// Strip grouping commas, then require a finite amount > 0.
fn parse_amount(input: &str) -> Result<f64> {
    parse_positive(&input.replace(',', ""))
        .ok_or_else(|| AppError::Validation("Enter a valid amount.".to_string()))
}
