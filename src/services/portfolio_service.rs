//! Portfolio Service
//!
//! Portfolio and realized-history reads, plus the join of open
//! holdings against a live snapshot for display P&L.

use crate::api::types::{HistoryRow, HoldingRow, Portfolio};
use crate::error::Result;
use crate::feed::QuoteSnapshot;
use crate::pnl::{self, Pnl};
use crate::state::AppState;
use chrono::NaiveDate;
use tracing::info;

/// An open holding joined with live data.
#[derive(Debug, Clone)]
pub struct HoldingView {
    pub holding: HoldingRow,
    pub live_price: Option<f64>,
    pub pnl: Pnl,
}

/// Portfolio service for business logic
pub struct PortfolioService;

impl PortfolioService {
    /// Open holdings and closed lots for the logged-in user.
    pub async fn portfolio(state: &AppState) -> Result<Portfolio> {
        let username = state.session.username()?;
        info!("PortfolioService::portfolio - {}", username);
        state.api.portfolio(&username).await
    }

    /// Join open holdings against the live snapshot.
    ///
    /// A holding with no quote yet falls back to its server-reported
    /// current price; with neither, the P&L is the zero result rather
    /// than a NaN row.
    pub fn with_live_pnl(open: &[HoldingRow], snapshot: &QuoteSnapshot) -> Vec<HoldingView> {
        open.iter()
            .map(|row| {
                let live = snapshot
                    .live_price(&row.symbol)
                    .or(row.current_price.filter(|price| price.is_finite()));
                let pnl = pnl::unrealized(
                    row.entry().unwrap_or(0.0),
                    live,
                    row.qty.unwrap_or(0.0),
                    row.side(),
                );
                HoldingView {
                    holding: row.clone(),
                    live_price: live,
                    pnl,
                }
            })
            .collect()
    }

    /// Realized trade history for the logged-in user.
    pub async fn trade_history(state: &AppState) -> Result<Vec<HistoryRow>> {
        let username = state.session.username()?;
        state.api.trade_history(&username).await
    }

    /// Client-side date-range filter over history rows. Rows whose
    /// timestamp does not parse stay visible.
    pub fn filter_history(
        rows: Vec<HistoryRow>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Vec<HistoryRow> {
        rows.into_iter()
            .filter(|row| match row_date(row) {
                Some(date) => {
                    from.map_or(true, |start| date >= start)
                        && to.map_or(true, |end| date <= end)
                }
                None => true,
            })
            .collect()
    }
}

fn row_date(row: &HistoryRow) -> Option<NaiveDate> {
    let raw = row.time.as_deref()?;
    NaiveDate::parse_from_str(raw.get(..10)?, "%Y-%m-%d").ok()
}
