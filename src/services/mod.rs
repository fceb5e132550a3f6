//! Services Layer
//!
//! Business logic between an embedding UI and the REST boundary. Each
//! service mirrors a backend route group; views call services, never
//! the API client directly.
//!
//! # Services
//!
//! - `AuthService` - login/register, session open/close
//! - `OrderService` - validate, place, modify, cancel; orders/positions reads
//! - `SellPrecheck` - sell-ownership precheck state machine
//! - `QuoteService` - one-shot quotes and historical closes
//! - `PortfolioService` - portfolio reads and the live-P&L join
//! - `FundsService` - funds reads, add/withdraw
//! - `WatchlistService` - watchlist membership and symbol search

pub mod auth_service;
pub mod funds_service;
pub mod order_service;
pub mod portfolio_service;
pub mod quote_service;
pub mod sell_precheck;
pub mod watchlist_service;

// Re-export commonly used types and services
pub use auth_service::AuthService;
pub use funds_service::FundsService;
pub use order_service::{
    check_sell_quantity, OrderIntent, OrderOutcome, OrderService, OrderView, PlacedOrder,
};
pub use portfolio_service::{HoldingView, PortfolioService};
pub use quote_service::QuoteService;
pub use sell_precheck::{PrecheckState, SellPrecheck};
pub use watchlist_service::WatchlistService;

/// Parse user numeric input: accepted only when finite and strictly
/// positive. Empty and non-numeric input both read as absent.
pub(crate) fn parse_positive(input: &str) -> Option<f64> {
    let value: f64 = input.trim().parse().ok()?;
    (value.is_finite() && value > 0.0).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_positive_gates_user_input() {
        assert_eq!(parse_positive("10"), Some(10.0));
        assert_eq!(parse_positive(" 2.5 "), Some(2.5));
        assert_eq!(parse_positive("0"), None);
        assert_eq!(parse_positive("-5"), None);
        assert_eq!(parse_positive("abc"), None);
        assert_eq!(parse_positive(""), None);
        assert_eq!(parse_positive("inf"), None);
        assert_eq!(parse_positive("NaN"), None);
    }
}
