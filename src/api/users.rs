//! Admin-managed user accounts

use reqwest::Method;

use crate::api::{decode, expect_success, ApiClient};
use crate::error::{ClinicError, Result};
use crate::models::{Message, NewUser, PasswordChange, UserInfo, UserUpdate};

/// Client for `/users`.
#[derive(Debug, Clone)]
pub struct UsersClient {
    api: ApiClient,
}

impl UsersClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// `GET /users`
    pub async fn list(&self) -> Result<Vec<UserInfo>> {
        let request = self.api.request(Method::GET, "users");
        decode(self.api.execute(request).await?).await
    }

    /// `POST /users`
    ///
    /// Name, email and password are checked locally first.
    pub async fn create(&self, user: &NewUser) -> Result<UserInfo> {
        user.validate()?;
        let request = self.api.request(Method::POST, "users").json(user)?;
        decode(self.api.execute(request).await?).await
    }

    /// `PUT /users/{id}`. Does not touch the password.
    pub async fn update(&self, id: &str, changes: &UserUpdate) -> Result<UserInfo> {
        let request = self
            .api
            .request(Method::PUT, &format!("users/{}", id))
            .json(changes)?;
        decode(self.api.execute(request).await?).await
    }

    /// `PUT /users/{id}/password`
    pub async fn change_password(&self, id: &str, change: &PasswordChange) -> Result<Message> {
        if change.new_password.is_empty() {
            return Err(ClinicError::Validation("new password is required".into()).into());
        }
        let request = self
            .api
            .request(Method::PUT, &format!("users/{}/password", id))
            .json(change)?;
        decode(self.api.execute(request).await?).await
    }

    /// `DELETE /users/{id}`. Returns `true` on success.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let request = self.api.request(Method::DELETE, &format!("users/{}", id));
        expect_success(self.api.execute(request).await?).await
    }

    /// The logged-in user, from the session rather than the server.
    pub fn current(&self) -> Result<Option<UserInfo>> {
        self.api.session().user()
    }
}
