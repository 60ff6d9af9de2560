//! Bug and feature reports, relayed by the backend to GitHub

use reqwest::Method;

use crate::api::{decode, ApiClient};
use crate::error::Result;
use crate::models::{IssueCreated, IssueReport};

/// Client for `/github/issues`.
#[derive(Debug, Clone)]
pub struct IssuesClient {
    api: ApiClient,
}

impl IssuesClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// `POST /github/issues`
    ///
    /// Blank titles and descriptions are rejected before sending.
    pub async fn create(&self, report: &IssueReport) -> Result<IssueCreated> {
        report.validate()?;
        let request = self.api.request(Method::POST, "github/issues").json(report)?;
        let created: IssueCreated = decode(self.api.execute(request).await?).await?;
        if let Some(url) = &created.html_url {
            tracing::info!("Issue reported: {}", url);
        }
        Ok(created)
    }
}
