//! Login and logout

use crate::api::{error_message, ApiClient};
use crate::error::{ClinicError, Result};
use crate::models::{Credentials, LoginResponse, UserInfo};
use crate::session::{ClearReason, Session};

/// Establishes and ends sessions.
#[derive(Debug, Clone)]
pub struct AuthClient {
    api: ApiClient,
}

impl AuthClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Exchanges credentials for a token and stores the resulting session.
    ///
    /// The call goes to `{base_url}/auth/login`, outside the versioned
    /// prefix, and deliberately bypasses the 401 handling of
    /// [`ApiClient::execute`]: a rejected login is not an expired session.
    ///
    /// # Errors
    ///
    /// [`ClinicError::Authentication`] with the server's message (or
    /// `"Login failed"`) when the credentials are refused,
    /// [`ClinicError::Network`] when the server is unreachable,
    /// [`ClinicError::MalformedResponse`] when a success body lacks the token
    /// or user.
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse> {
        let url = self.api.config().login_url();
        tracing::debug!("POST {} as {}", url, credentials.email);

        let response = self
            .api
            .http()
            .post(&url)
            .json(credentials)
            .send()
            .await
            .map_err(|e| ClinicError::Network(format!("POST {} failed: {}", url, e)))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ClinicError::Network(format!("failed to read login response: {}", e)))?;

        if !status.is_success() {
            let message = error_message(&body).unwrap_or_else(|| "Login failed".to_string());
            tracing::info!("Login refused for {}: {}", credentials.email, message);
            return Err(ClinicError::Authentication(message).into());
        }

        let login: LoginResponse = serde_json::from_slice(&body)
            .map_err(|e| ClinicError::MalformedResponse(format!("login response: {}", e)))?;

        self.api.session().establish(Session {
            token: login.token.clone(),
            user: login.user.clone(),
        })?;

        Ok(login)
    }

    /// Drops the stored session. Purely local; the backend keeps no state.
    pub fn logout(&self) -> Result<()> {
        self.api.session().clear(ClearReason::Logout)
    }

    /// Whether a non-expired token is stored.
    pub fn is_authenticated(&self) -> bool {
        self.api.session().is_authenticated()
    }

    /// The profile stored at login.
    pub fn current_user(&self) -> Result<Option<UserInfo>> {
        self.api.session().user()
    }
}
