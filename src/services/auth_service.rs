//! Auth Service
//!
//! Session establishment against the backend auth endpoints. A 2xx
//! response is the success signal; an explicit `success: false` in the
//! body overrides it.

use crate::api::types::Credentials;
use crate::error::{AppError, Result};
use crate::state::{AppState, Session};
use tracing::info;

/// Auth service for business logic
pub struct AuthService;

impl AuthService {
    /// Log in and open the session.
    pub async fn login(state: &AppState, username: &str, password: &str) -> Result<Session> {
        let credentials = validate(username, password)?;
        info!("AuthService::login - {}", credentials.username);

        let response = state.api.login(&credentials).await?;
        if response.success == Some(false) {
            return Err(AppError::Auth(
                response.message.unwrap_or_else(|| "Login failed".to_string()),
            ));
        }

        Ok(state.session.open(&credentials.username))
    }

    /// Register a new account and open the session.
    pub async fn register(state: &AppState, username: &str, password: &str) -> Result<Session> {
        let credentials = validate(username, password)?;
        info!("AuthService::register - {}", credentials.username);

        let response = state.api.register(&credentials).await?;
        if response.success == Some(false) {
            return Err(AppError::Auth(
                response
                    .message
                    .unwrap_or_else(|| "Registration failed".to_string()),
            ));
        }

        Ok(state.session.open(&credentials.username))
    }

    /// Close the session. Purely local; the backend keeps no session.
    pub fn logout(state: &AppState) {
        state.session.close();
    }
}

fn validate(username: &str, password: &str) -> Result<Credentials> {
    let username = username.trim();
    if username.is_empty() {
        return Err(AppError::Validation("Enter a username.".to_string()));
    }
    if password.is_empty() {
        return Err(AppError::Validation("Enter a password.".to_string()));
    }
    Ok(Credentials {
        username: username.to_string(),
        password: password.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_credentials_never_reach_the_network() {
        assert!(matches!(validate("", "secret"), Err(AppError::Validation(_))));
        assert!(matches!(validate("   ", "secret"), Err(AppError::Validation(_))));
        assert!(matches!(validate("ravi", ""), Err(AppError::Validation(_))));

        let credentials = validate("  ravi ", "secret").unwrap();
        assert_eq!(credentials.username, "ravi");
    }
}
