//! Sell-ownership precheck
//!
//! Before navigating to the sell form, the backend is asked whether the
//! user actually holds the scrip. Selling a scrip the user does not
//! hold is a short sell and must be confirmed explicitly; the preview
//! call places no order.

use crate::api::types::{Segment, SellPreviewRequest, SellPreviewResponse, Side};
use crate::error::Result;
use crate::state::AppState;
use tracing::info;

/// Confirmation prompt used when the backend does not supply one.
const CONFIRM_FALLBACK: &str = "You do not own this stock. Sell anyway as a short sell?";

/// Where a sell attempt currently stands.
#[derive(Debug, Clone, PartialEq)]
pub enum PrecheckState {
    Idle,
    /// Preview request in flight.
    Checking,
    /// User holds the scrip; go straight to the sell form.
    DirectSell,
    /// Short sell: block on a confirmation dialog with this message.
    NeedsConfirmation { message: String },
    /// User confirmed; navigate with `allow_short` set.
    Proceed { allow_short: bool },
}

/// Sell-ownership precheck state machine.
///
/// One instance per sell attempt. A transport failure during the check
/// resets to `Idle` with nothing retained; the caller surfaces the
/// error and the user re-triggers.
#[derive(Debug)]
pub struct SellPrecheck {
    state: PrecheckState,
}

impl SellPrecheck {
    pub fn new() -> Self {
        Self {
            state: PrecheckState::Idle,
        }
    }

    pub fn state(&self) -> &PrecheckState {
        &self.state
    }

    /// Run the preview for a sell of `qty` units of `symbol`.
    ///
    /// Ends in `DirectSell` or `NeedsConfirmation`; on any error the
    /// machine is back at `Idle`.
    pub async fn run(
        &mut self,
        state: &AppState,
        symbol: &str,
        qty: f64,
        segment: Segment,
    ) -> Result<&PrecheckState> {
        self.state = PrecheckState::Checking;

        let outcome = async {
            let username = state.session.username()?;
            let request = SellPreviewRequest {
                username,
                script: symbol.trim().to_uppercase(),
                order_type: Side::Sell,
                qty,
                segment,
                allow_short: false,
            };
            info!("SellPrecheck::run - {} x{}", request.script, request.qty);
            state.api.sell_preview(&request).await
        }
        .await;

        match outcome {
            Ok((status, body)) => {
                self.state = Self::classify(status, &body);
                Ok(&self.state)
            }
            Err(err) => {
                self.state = PrecheckState::Idle;
                Err(err)
            }
        }
    }

    /// Classify a preview response.
    ///
    /// Direct sell requires an affirmative response AND a positive
    /// owned quantity; a 200 with zero owned quantity is a short sell
    /// and must not fast-path past the confirmation.
    pub fn classify(status: u16, body: &SellPreviewResponse) -> PrecheckState {
        let owned = body.owned_qty.unwrap_or(0.0);
        let flagged = status == 409
            || body.ok == Some(false)
            || body.needs_confirmation == Some(true)
            || body
                .code
                .as_deref()
                .is_some_and(|code| code.eq_ignore_ascii_case("needs_confirmation"));

        if !flagged && owned > 0.0 {
            return PrecheckState::DirectSell;
        }

        let message = body
            .message
            .clone()
            .or_else(|| body.detail.clone())
            .unwrap_or_else(|| CONFIRM_FALLBACK.to_string());
        PrecheckState::NeedsConfirmation { message }
    }

    /// User accepted the short-sell dialog.
    pub fn confirm(&mut self) -> &PrecheckState {
        if matches!(self.state, PrecheckState::NeedsConfirmation { .. }) {
            self.state = PrecheckState::Proceed { allow_short: true };
        }
        &self.state
    }

    /// User declined the short-sell dialog; back to `Idle`, no
    /// navigation.
    pub fn decline(&mut self) -> &PrecheckState {
        if matches!(self.state, PrecheckState::NeedsConfirmation { .. }) {
            self.state = PrecheckState::Idle;
        }
        &self.state
    }

    /// Navigation flag: `Some(allow_short)` once a route is decided.
    pub fn route(&self) -> Option<bool> {
        match self.state {
            PrecheckState::DirectSell => Some(false),
            PrecheckState::Proceed { allow_short } => Some(allow_short),
            _ => None,
        }
    }
}

impl Default for SellPrecheck {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(ok: Option<bool>, owned: Option<f64>) -> SellPreviewResponse {
        SellPreviewResponse {
            ok,
            owned_qty: owned,
            ..Default::default()
        }
    }

    #[test]
    fn owned_shares_sell_directly() {
        let state = SellPrecheck::classify(200, &body(Some(true), Some(12.0)));
        assert_eq!(state, PrecheckState::DirectSell);
    }

    #[test]
    fn ok_with_zero_owned_still_needs_confirmation() {
        // A naive res.ok check would wrongly fast-path here.
        let state = SellPrecheck::classify(200, &body(Some(true), Some(0.0)));
        assert!(matches!(state, PrecheckState::NeedsConfirmation { .. }));
    }

    #[test]
    fn missing_owned_qty_needs_confirmation() {
        let state = SellPrecheck::classify(200, &body(Some(true), None));
        assert!(matches!(state, PrecheckState::NeedsConfirmation { .. }));
    }

    #[test]
    fn conflict_status_needs_confirmation_with_server_message() {
        let mut response = body(None, Some(5.0));
        response.detail = Some("Short selling requires confirmation".to_string());
        let state = SellPrecheck::classify(409, &response);
        assert_eq!(
            state,
            PrecheckState::NeedsConfirmation {
                message: "Short selling requires confirmation".to_string()
            }
        );
    }

    #[test]
    fn explicit_flag_and_code_need_confirmation() {
        let mut response = body(Some(true), Some(5.0));
        response.needs_confirmation = Some(true);
        assert!(matches!(
            SellPrecheck::classify(200, &response),
            PrecheckState::NeedsConfirmation { .. }
        ));

        let mut response = body(Some(true), Some(5.0));
        response.code = Some("NEEDS_CONFIRMATION".to_string());
        assert!(matches!(
            SellPrecheck::classify(200, &response),
            PrecheckState::NeedsConfirmation { .. }
        ));
    }

    #[test]
    fn fallback_message_when_server_is_silent() {
        let state = SellPrecheck::classify(200, &body(None, Some(0.0)));
        assert_eq!(
            state,
            PrecheckState::NeedsConfirmation {
                message: CONFIRM_FALLBACK.to_string()
            }
        );
    }

    #[test]
    fn confirm_routes_to_short_sell() {
        let mut precheck = SellPrecheck::new();
        precheck.state = SellPrecheck::classify(200, &body(None, Some(0.0)));
        assert_eq!(precheck.route(), None);

        precheck.confirm();
        assert_eq!(
            precheck.state(),
            &PrecheckState::Proceed { allow_short: true }
        );
        assert_eq!(precheck.route(), Some(true));
    }

    #[test]
    fn decline_returns_to_idle_without_navigation() {
        let mut precheck = SellPrecheck::new();
        precheck.state = SellPrecheck::classify(200, &body(None, Some(0.0)));

        precheck.decline();
        assert_eq!(precheck.state(), &PrecheckState::Idle);
        assert_eq!(precheck.route(), None);
    }

    #[test]
    fn confirm_outside_the_dialog_is_ignored() {
        let mut precheck = SellPrecheck::new();
        precheck.confirm();
        assert_eq!(precheck.state(), &PrecheckState::Idle);

        precheck.state = PrecheckState::DirectSell;
        precheck.confirm();
        assert_eq!(precheck.state(), &PrecheckState::DirectSell);
        assert_eq!(precheck.route(), Some(false));
    }
}
