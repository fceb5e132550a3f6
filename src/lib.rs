//! PaperTrade Client
//!
//! Client engine for the PaperTrade simulated stock-trading product:
//! typed REST access to the backend, shared live-quote polling,
//! unrealized P&L arithmetic, order validation and outcome
//! classification, the sell-ownership precheck, and session state.
//!
//! The crate is presentation-free. An embedding UI (desktop shell, TUI,
//! another frontend) constructs an [`state::AppState`] and drives the
//! [`services`] layer; the logic every view needs lives here exactly
//! once.

pub mod api;
pub mod config;
pub mod error;
pub mod feed;
pub mod pnl;
pub mod services;
pub mod state;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging for embedding applications.
///
/// Honors `RUST_LOG`; defaults to debug-level output for this crate.
/// Call at most once per process.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "papertrade_client=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
