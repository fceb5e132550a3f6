//! Backend wire types
//!
//! Shapes at the REST boundary, kept byte-compatible with the backend.
//! Numeric fields the backend may omit or null stay `Option` through to
//! the caller; nothing is silently defaulted to zero during decode.

use serde::{Deserialize, Serialize};

/// Order/position direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Display verb for UI copy ("Buy successfully" / "Sell successfully").
    pub fn verb(&self) -> &'static str {
        match self {
            Side::Buy => "Buy",
            Side::Sell => "Sell",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// Trading segment: intraday closes same day, delivery is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Segment {
    Intraday,
    Delivery,
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Segment::Intraday => write!(f, "intraday"),
            Segment::Delivery => write!(f, "delivery"),
        }
    }
}

/// Exchange a symbol trades on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Exchange {
    Nse,
    Bse,
}

/// How the order is priced: at the live price or at the user's price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderMode {
    Market,
    Limit,
}

/// Live price snapshot for one symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub change: Option<f64>,
    #[serde(default)]
    pub pct_change: Option<f64>,
    #[serde(default)]
    pub open: Option<f64>,
    #[serde(rename = "dayHigh", default)]
    pub day_high: Option<f64>,
    #[serde(rename = "dayLow", default)]
    pub day_low: Option<f64>,
    #[serde(default)]
    pub exchange: Option<String>,
}

/// Order-creation payload for `POST /orders`.
///
/// `price` is serialized as `null` for market orders; the backend fills
/// in the live price. Stoploss and target are omitted entirely when
/// absent.
#[derive(Debug, Clone, Serialize)]
pub struct OrderTicket {
    pub username: String,
    pub script: String,
    pub order_type: Side,
    pub qty: f64,
    pub price: Option<f64>,
    pub exchange: Exchange,
    pub segment: Segment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stoploss: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<f64>,
}

/// Backend response to order creation.
///
/// The backend has shipped several shapes; all three signals are
/// accepted and any of them may be absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaceOrderResponse {
    #[serde(default)]
    pub triggered: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Payload for `PUT /orders/modify/{id}`. Sends the whole form; fields
/// the user left blank go as `null`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ModifyOrderRequest {
    pub script: Option<String>,
    pub qty: Option<f64>,
    pub price: Option<f64>,
    pub trigger_price: Option<f64>,
    pub stop_loss: Option<f64>,
    pub target: Option<f64>,
}

/// A resting or filled order as returned by `GET /orders/{username}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenOrder {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
    pub script: String,
    pub order_type: Side,
    #[serde(default)]
    pub qty: Option<f64>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub trigger_price: Option<f64>,
    #[serde(default)]
    pub exchange: Option<String>,
    #[serde(default)]
    pub segment: Option<String>,
    #[serde(default)]
    pub stoploss: Option<f64>,
    #[serde(default)]
    pub target: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub status_msg: Option<String>,
    #[serde(default)]
    pub datetime: Option<String>,
}

/// An open position as returned by `GET /orders/positions/{username}`.
///
/// Field names vary across backend revisions (`symbol`/`script`,
/// `type`/`order_type`, `avg_price`/`entry_price`); aliases absorb the
/// variation so callers see one contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionRow {
    #[serde(alias = "script")]
    pub symbol: String,
    #[serde(default)]
    pub qty: Option<f64>,
    #[serde(default)]
    pub avg_price: Option<f64>,
    #[serde(default)]
    pub entry_price: Option<f64>,
    #[serde(default)]
    pub stoploss: Option<f64>,
    #[serde(default)]
    pub target: Option<f64>,
    #[serde(default)]
    pub segment: Option<String>,
    #[serde(rename = "type", alias = "order_type", default)]
    pub kind: Option<String>,
}

impl PositionRow {
    /// Entry price for P&L, preferring `entry_price` over `avg_price`.
    pub fn entry(&self) -> Option<f64> {
        self.entry_price.or(self.avg_price)
    }

    /// Anything not explicitly marked SELL reads as a long position.
    pub fn side(&self) -> Side {
        match self.kind.as_deref() {
            Some(kind) if kind.eq_ignore_ascii_case("SELL") => Side::Sell,
            _ => Side::Buy,
        }
    }
}

/// An open portfolio holding from `GET /portfolio/{username}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldingRow {
    #[serde(alias = "script")]
    pub symbol: String,
    #[serde(default)]
    pub qty: Option<f64>,
    #[serde(default)]
    pub avg_price: Option<f64>,
    #[serde(default)]
    pub entry_price: Option<f64>,
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub segment: Option<String>,
    #[serde(rename = "type", alias = "order_type", default)]
    pub kind: Option<String>,
}

impl HoldingRow {
    pub fn entry(&self) -> Option<f64> {
        self.entry_price.or(self.avg_price)
    }

    pub fn side(&self) -> Side {
        match self.kind.as_deref() {
            Some(kind) if kind.eq_ignore_ascii_case("SELL") => Side::Sell,
            _ => Side::Buy,
        }
    }
}

/// A closed (fully exited) portfolio lot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClosedLot {
    #[serde(default, alias = "script")]
    pub symbol: String,
    #[serde(default)]
    pub qty: Option<f64>,
    #[serde(default)]
    pub buy_price: Option<f64>,
    #[serde(default)]
    pub sell_price: Option<f64>,
    #[serde(default)]
    pub pnl: Option<f64>,
    #[serde(default)]
    pub sell_date: Option<String>,
}

/// Portfolio payload: open holdings plus closed lots. Either list may
/// be missing from older backend revisions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Portfolio {
    #[serde(default)]
    pub open: Vec<HoldingRow>,
    #[serde(default)]
    pub closed: Vec<ClosedLot>,
}

/// Realized trade history row (FIFO lot aggregation done server-side).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRow {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub buy_qty: Option<f64>,
    #[serde(default)]
    pub buy_price: Option<f64>,
    #[serde(default)]
    pub remaining_qty: Option<f64>,
    #[serde(default)]
    pub is_closed: Option<bool>,
    #[serde(default)]
    pub pnl: Option<f64>,
    #[serde(default)]
    pub sell_qty: Option<f64>,
    #[serde(default)]
    pub sell_avg_price: Option<f64>,
    #[serde(default)]
    pub sell_date: Option<String>,
    #[serde(default)]
    pub invested_value: Option<f64>,
}

/// One daily close from `GET /historical`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoricalBar {
    pub date: String,
    pub close: f64,
}

/// Search suggestion from `GET /search`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolMatch {
    pub symbol: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
}

/// Funds ledger snapshot for a username.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FundsSnapshot {
    #[serde(default)]
    pub total_funds: Option<f64>,
    #[serde(default)]
    pub available_funds: Option<f64>,
}

impl FundsSnapshot {
    /// Display total; missing reads as zero (display-level only).
    pub fn total(&self) -> f64 {
        self.total_funds.unwrap_or(0.0)
    }

    /// Display available; missing reads as zero (display-level only).
    pub fn available(&self) -> f64 {
        self.available_funds.unwrap_or(0.0)
    }
}

/// Body for `POST /funds/add` and `POST /funds/withdraw`.
#[derive(Debug, Clone, Serialize)]
pub struct FundsTransfer {
    pub username: String,
    pub amount: f64,
}

/// Body for watchlist add/remove.
#[derive(Debug, Clone, Serialize)]
pub struct WatchlistEntry {
    pub symbol: String,
}

/// Sell-ownership precheck request for `POST /orders/sell/preview`.
#[derive(Debug, Clone, Serialize)]
pub struct SellPreviewRequest {
    pub username: String,
    pub script: String,
    pub order_type: Side,
    pub qty: f64,
    pub segment: Segment,
    pub allow_short: bool,
}

/// Sell-ownership precheck response body. Every field is optional; the
/// precheck classifies conservatively over whatever is present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SellPreviewResponse {
    #[serde(default)]
    pub ok: Option<bool>,
    #[serde(default)]
    pub needs_confirmation: Option<bool>,
    #[serde(default)]
    pub owned_qty: Option<f64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

/// Credentials for `POST /auth/login` and `POST /auth/register`.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Auth endpoint response; a 2xx status is the primary success signal.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_row_absorbs_field_aliases() {
        let row: PositionRow =
            serde_json::from_str(r#"{"script":"TCS","order_type":"SELL","qty":5}"#).unwrap();
        assert_eq!(row.symbol, "TCS");
        assert_eq!(row.side(), Side::Sell);
        assert_eq!(row.qty, Some(5.0));
        assert_eq!(row.entry(), None);

        let row: PositionRow =
            serde_json::from_str(r#"{"symbol":"INFY","type":"BUY","avg_price":1500.5}"#).unwrap();
        assert_eq!(row.side(), Side::Buy);
        assert_eq!(row.entry(), Some(1500.5));
    }

    #[test]
    fn missing_numerics_stay_none() {
        let quote: Quote = serde_json::from_str(r#"{"symbol":"TCS"}"#).unwrap();
        assert_eq!(quote.price, None);
        assert_eq!(quote.change, None);

        let funds: FundsSnapshot = serde_json::from_str("{}").unwrap();
        assert_eq!(funds.total_funds, None);
        assert_eq!(funds.total(), 0.0);
    }

    #[test]
    fn market_order_serializes_null_price() {
        let ticket = OrderTicket {
            username: "ravi".to_string(),
            script: "TCS".to_string(),
            order_type: Side::Buy,
            qty: 10.0,
            price: None,
            exchange: Exchange::Nse,
            segment: Segment::Intraday,
            stoploss: None,
            target: None,
        };
        let json = serde_json::to_value(&ticket).unwrap();
        assert!(json.get("price").unwrap().is_null());
        assert_eq!(json.get("order_type").unwrap(), "BUY");
        assert_eq!(json.get("segment").unwrap(), "intraday");
        assert_eq!(json.get("exchange").unwrap(), "NSE");
        assert!(json.get("stoploss").is_none());
    }

    #[test]
    fn portfolio_tolerates_missing_lists() {
        let portfolio: Portfolio = serde_json::from_str(r#"{"open":[]}"#).unwrap();
        assert!(portfolio.open.is_empty());
        assert!(portfolio.closed.is_empty());
    }
}
