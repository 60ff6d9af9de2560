//! Authenticated access to the clinic REST API
//!
//! [`ApiClient`] is the single chokepoint for calls that need a session. It
//! attaches the stored bearer token, defaults the content type to JSON, and
//! reacts to `401 Unauthorized` by clearing the session and emitting
//! [`SessionEvent::Expired`](crate::session::SessionEvent::Expired). The
//! rejected response is swallowed: [`ApiClient::execute`] returns `Ok(None)`.
//!
//! The resource clients in the submodules build on it and never talk to the
//! transport directly. The only exception is login in [`auth`], which by
//! definition runs without a session.

pub mod auth;
pub mod issues;
pub mod patients;
pub mod treatments;
pub mod users;

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ApiConfig;
use crate::error::{ClinicError, Result};
use crate::session::{ClearReason, SessionContext};

pub use auth::AuthClient;
pub use issues::IssuesClient;
pub use patients::PatientsClient;
pub use treatments::TreatmentsClient;
pub use users::UsersClient;

/// A request waiting to go through [`ApiClient::execute`].
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    url: String,
    body: Option<Vec<u8>>,
    headers: Vec<(String, String)>,
    query: Vec<(String, String)>,
}

impl ApiRequest {
    /// Request against an absolute URL.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            body: None,
            headers: Vec::new(),
            query: Vec::new(),
        }
    }

    /// Serializes `body` as the JSON payload.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        self.body = Some(serde_json::to_vec(body)?);
        Ok(self)
    }

    /// Adds a header. Caller headers win over the wrapper's defaults.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Appends a query parameter.
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Target URL, without query string.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }
}

/// Authenticated request wrapper shared by every resource client.
///
/// Cloning is cheap: the connection pool and the session are shared.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: Arc<ApiConfig>,
    session: Arc<SessionContext>,
}

impl ApiClient {
    /// Builds a client for `config`, reading credentials from `session`.
    ///
    /// No network I/O happens here.
    ///
    /// # Errors
    ///
    /// Returns [`ClinicError::Http`] if the TLS backend cannot be initialised.
    pub fn new(config: ApiConfig, session: Arc<SessionContext>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(ClinicError::Http)?;

        Ok(Self {
            http,
            config: Arc::new(config),
            session,
        })
    }

    /// The injected API configuration.
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// The session this client authenticates with.
    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    /// Raw transport, for the unauthenticated login call only.
    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Absolute URL for a path under the versioned prefix.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.versioned_base(),
            path.trim_start_matches('/')
        )
    }

    /// Starts a request for a path under the versioned prefix.
    pub fn request(&self, method: Method, path: &str) -> ApiRequest {
        ApiRequest::new(method, self.url(path))
    }

    /// Sends `request` with session credentials attached.
    ///
    /// Returns `Ok(None)` when the server answered 401: the session has been
    /// cleared and subscribers notified. Every other status is handed back
    /// untouched; checking it is the caller's job.
    ///
    /// # Errors
    ///
    /// [`ClinicError::Network`] when no response was received,
    /// [`ClinicError::Validation`] for header names or values that are not
    /// valid HTTP.
    pub async fn execute(&self, request: ApiRequest) -> Result<Option<Response>> {
        let headers = self.headers_for(&request)?;

        tracing::debug!("{} {}", request.method, request.url);

        let mut builder = self
            .http
            .request(request.method.clone(), &request.url)
            .headers(headers);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| {
            ClinicError::Network(format!("{} {} failed: {}", request.method, request.url, e))
        })?;

        if response.status() == StatusCode::UNAUTHORIZED {
            tracing::warn!(
                "{} {} returned 401, ending session",
                request.method,
                request.url
            );
            self.session.clear(ClearReason::Unauthorized)?;
            return Ok(None);
        }

        Ok(Some(response))
    }

    fn headers_for(&self, request: &ApiRequest) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = self.session.token()? {
            let value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
                ClinicError::Validation("stored token is not a valid header value".into())
            })?;
            headers.insert(AUTHORIZATION, value);
        }

        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| ClinicError::Validation(format!("invalid header name: {}", name)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|_| ClinicError::Validation(format!("invalid value for header {}", name)))?;
            headers.insert(name, value);
        }

        Ok(headers)
    }
}

// ---------------------------------------------------------------------------
// Response handling shared by the resource clients
// ---------------------------------------------------------------------------

/// Turns the wrapper's "session ended" outcome into an error.
pub(crate) fn require(response: Option<Response>) -> Result<Response> {
    response.ok_or_else(|| ClinicError::SessionEnded.into())
}

/// Extracts the server's message from an error body.
///
/// Accepts `{"error": "..."}` and bare JSON strings, which is what the
/// backend's handlers return.
pub(crate) fn error_message(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    let message = match &value {
        serde_json::Value::String(message) => message.as_str(),
        serde_json::Value::Object(map) => map.get("error")?.as_str()?,
        _ => return None,
    };
    let message = message.trim();
    (!message.is_empty()).then(|| message.to_string())
}

fn status_text(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16()))
}

/// Consumes a non-success response into [`ClinicError::Api`].
pub(crate) async fn api_error(response: Response) -> anyhow::Error {
    let status = response.status();
    let body = response.bytes().await.unwrap_or_default();
    let message = error_message(&body).unwrap_or_else(|| status_text(status));
    tracing::debug!("API error {}: {}", status, message);
    ClinicError::Api {
        status: status.as_u16(),
        message,
    }
    .into()
}

/// Checks the status and decodes a JSON success body as-is.
pub(crate) async fn decode<T: DeserializeOwned>(response: Option<Response>) -> Result<T> {
    let response = require(response)?;
    if !response.status().is_success() {
        return Err(api_error(response).await);
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| ClinicError::Network(format!("failed to read response body: {}", e)))?;

    serde_json::from_slice(&body).map_err(|e| ClinicError::MalformedResponse(e.to_string()).into())
}

/// Checks the status of a call whose body is irrelevant (deletes).
pub(crate) async fn expect_success(response: Option<Response>) -> Result<bool> {
    let response = require(response)?;
    if !response.status().is_success() {
        return Err(api_error(response).await);
    }
    Ok(true)
}
