//! Entry point bundling every resource client over one session
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use clinic::{ApiConfig, ClinicClient, SessionContext};
//! use clinic::models::Credentials;
//!
//! # async fn example() -> clinic::Result<()> {
//! let session = Arc::new(SessionContext::in_memory());
//! let client = ClinicClient::new(ApiConfig::default(), session)?;
//!
//! client
//!     .auth()
//!     .login(&Credentials {
//!         email: "admin@clinic.test".into(),
//!         password: "secret".into(),
//!     })
//!     .await?;
//!
//! let list = client.patients().list().await?;
//! println!("{} patients", list.count);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use crate::api::{ApiClient, AuthClient, IssuesClient, PatientsClient, TreatmentsClient, UsersClient};
use crate::config::ApiConfig;
use crate::error::Result;
use crate::session::SessionContext;

/// All resource clients sharing one [`ApiClient`] and session.
#[derive(Debug, Clone)]
pub struct ClinicClient {
    api: ApiClient,
}

impl ClinicClient {
    /// Builds the client. No network I/O happens here.
    pub fn new(config: ApiConfig, session: Arc<SessionContext>) -> Result<Self> {
        Ok(Self {
            api: ApiClient::new(config, session)?,
        })
    }

    /// The underlying request wrapper, for calls not covered below.
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// The shared session.
    pub fn session(&self) -> &Arc<SessionContext> {
        self.api.session()
    }

    pub fn auth(&self) -> AuthClient {
        AuthClient::new(self.api.clone())
    }

    pub fn patients(&self) -> PatientsClient {
        PatientsClient::new(self.api.clone())
    }

    pub fn treatments(&self) -> TreatmentsClient {
        TreatmentsClient::new(self.api.clone())
    }

    pub fn users(&self) -> UsersClient {
        UsersClient::new(self.api.clone())
    }

    pub fn issues(&self) -> IssuesClient {
        IssuesClient::new(self.api.clone())
    }
}
