//! Order Service
//!
//! Validates order form state, submits it, and classifies the backend's
//! answer for the UI. Also covers modify/cancel and the open-order and
//! position reads.

use crate::api::types::{
    Exchange, ModifyOrderRequest, OpenOrder, OrderMode, OrderTicket, PlaceOrderResponse,
    PositionRow, Segment, Side,
};
use crate::error::{AppError, Result};
use crate::feed::QuoteSnapshot;
use crate::pnl::{self, Pnl};
use crate::services::parse_positive;
use crate::state::AppState;
use serde::Serialize;
use tracing::info;

/// Raw order form state, exactly as a UI captures it. Numeric fields
/// stay strings until [`OrderIntent::build`] validates them.
#[derive(Debug, Clone)]
pub struct OrderIntent {
    pub symbol: String,
    pub side: Side,
    pub qty: String,
    pub mode: OrderMode,
    pub price: String,
    pub exchange: Exchange,
    pub segment: Segment,
    pub stoploss: String,
    pub target: String,
}

impl OrderIntent {
    /// Validate the form and build the wire payload.
    ///
    /// Every gate runs client-side; nothing reaches the network until
    /// all of them pass. Market orders send a `null` price for the
    /// backend to fill from the live quote. Stoploss/target are
    /// optional and dropped when they do not parse.
    pub fn build(&self, username: &str) -> Result<OrderTicket> {
        if username.trim().is_empty() {
            return Err(AppError::Auth(
                "Please login again (username missing)".to_string(),
            ));
        }

        let symbol = self.symbol.trim();
        if symbol.is_empty() {
            return Err(AppError::Validation("Invalid symbol".to_string()));
        }

        let qty = parse_positive(&self.qty).ok_or_else(|| {
            AppError::Validation("Please enter a valid quantity (> 0)".to_string())
        })?;

        let price = match self.mode {
            OrderMode::Limit => Some(parse_positive(&self.price).ok_or_else(|| {
                AppError::Validation("Please enter a valid limit price".to_string())
            })?),
            OrderMode::Market => None,
        };

        Ok(OrderTicket {
            username: username.to_string(),
            script: symbol.to_uppercase(),
            order_type: self.side,
            qty,
            price,
            exchange: self.exchange,
            segment: self.segment,
            stoploss: parse_positive(&self.stoploss),
            target: parse_positive(&self.target),
        })
    }
}

/// How the backend disposed of a submitted order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderOutcome {
    /// Executed immediately (`triggered`, `EXECUTED`, or `filled`).
    Filled,
    /// Explicitly resting as an open order (`PLACED`).
    Queued,
    /// Accepted with no recognizable disposition; treated as resting.
    Processed,
}

impl OrderOutcome {
    /// Classify a creation response. Accepts every shape the backend
    /// has shipped and never fails; unknown responses are `Processed`.
    pub fn classify(response: &PlaceOrderResponse) -> Self {
        let filled = response.triggered == Some(true)
            || response
                .message
                .as_deref()
                .is_some_and(|m| m.eq_ignore_ascii_case("EXECUTED"))
            || response
                .status
                .as_deref()
                .is_some_and(|s| s.eq_ignore_ascii_case("filled"));
        if filled {
            return OrderOutcome::Filled;
        }

        if response
            .message
            .as_deref()
            .is_some_and(|m| m.eq_ignore_ascii_case("PLACED"))
        {
            return OrderOutcome::Queued;
        }

        OrderOutcome::Processed
    }

    /// Navigation and UI copy branch on exactly this split.
    pub fn is_filled(&self) -> bool {
        matches!(self, OrderOutcome::Filled)
    }

    /// Success-dialog copy for the outcome.
    pub fn ui_message(&self, side: Side) -> String {
        if self.is_filled() {
            format!("{} successfully", side.verb())
        } else {
            "Order is placed".to_string()
        }
    }
}

/// Result of placing an order
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub outcome: OrderOutcome,
    pub response: PlaceOrderResponse,
}

/// An open order joined with live data.
#[derive(Debug, Clone)]
pub struct OrderView {
    pub order: OpenOrder,
    pub live_price: Option<f64>,
    pub pnl: Pnl,
}

/// Reject a sell that exceeds the known owned quantity.
///
/// The guard is advisory (the backend enforces the position check); an
/// unknown owned quantity passes.
pub fn check_sell_quantity(qty: f64, available: Option<f64>) -> Result<()> {
    if let Some(available) = available {
        if qty > available {
            return Err(AppError::Validation(format!(
                "Not enough quantity to sell. Available: {available}"
            )));
        }
    }
    Ok(())
}

/// Order service for business logic
pub struct OrderService;

impl OrderService {
    /// Validate, submit, and classify an order.
    pub async fn place_order(state: &AppState, intent: &OrderIntent) -> Result<PlacedOrder> {
        let username = state.session.username()?;
        let ticket = intent.build(&username)?;
        info!(
            "OrderService::place_order - {} {} x{}",
            ticket.order_type, ticket.script, ticket.qty
        );

        let response = state.api.place_order(&ticket).await?;
        Ok(PlacedOrder {
            outcome: OrderOutcome::classify(&response),
            response,
        })
    }

    /// Place a sell after checking the owned quantity for the symbol.
    pub async fn place_sell_order(state: &AppState, intent: &OrderIntent) -> Result<PlacedOrder> {
        let username = state.session.username()?;
        let ticket = intent.build(&username)?;

        let available = Self::owned_qty(state, &ticket.script).await?;
        check_sell_quantity(ticket.qty, Some(available))?;

        info!(
            "OrderService::place_sell_order - {} x{} (available {})",
            ticket.script, ticket.qty, available
        );

        let response = state.api.place_order(&ticket).await?;
        Ok(PlacedOrder {
            outcome: OrderOutcome::classify(&response),
            response,
        })
    }

    /// Open orders for the logged-in user.
    pub async fn open_orders(state: &AppState) -> Result<Vec<OpenOrder>> {
        let username = state.session.username()?;
        state.api.open_orders(&username).await
    }

    /// Open positions for the logged-in user.
    pub async fn positions(state: &AppState) -> Result<Vec<PositionRow>> {
        let username = state.session.username()?;
        state.api.positions(&username).await
    }

    /// Long quantity held for one symbol, for the sell form's guard.
    /// A symbol with no long position reads as zero.
    pub async fn owned_qty(state: &AppState, symbol: &str) -> Result<f64> {
        let positions = Self::positions(state).await?;
        Ok(positions
            .iter()
            .find(|row| row.symbol.eq_ignore_ascii_case(symbol) && row.side() != Side::Sell)
            .and_then(|row| row.qty)
            .unwrap_or(0.0))
    }

    /// Join open orders against the live snapshot.
    ///
    /// A SELL row uses the short sign convention; the order's own price
    /// stands in until a quote arrives. Rows without usable numbers get
    /// the zero P&L, never NaN.
    pub fn with_live_pnl(orders: &[OpenOrder], snapshot: &QuoteSnapshot) -> Vec<OrderView> {
        orders
            .iter()
            .map(|order| {
                let live = snapshot
                    .live_price(&order.script)
                    .or(order.price.filter(|price| price.is_finite()));
                let pnl = pnl::unrealized(
                    order.price.unwrap_or(0.0),
                    live,
                    order.qty.unwrap_or(0.0),
                    order.order_type,
                );
                OrderView {
                    order: order.clone(),
                    live_price: live,
                    pnl,
                }
            })
            .collect()
    }

    /// Modify a resting order.
    pub async fn modify_order(
        state: &AppState,
        order_id: i64,
        request: &ModifyOrderRequest,
    ) -> Result<()> {
        info!("OrderService::modify_order - {}", order_id);
        state.api.modify_order(order_id, request).await
    }

    /// Cancel a resting order.
    pub async fn cancel_order(state: &AppState, order_id: i64) -> Result<()> {
        info!("OrderService::cancel_order - {}", order_id);
        state.api.cancel_order(order_id).await
    }
}
