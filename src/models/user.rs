//! User accounts, login payloads and generic message bodies

use serde::{Deserialize, Serialize};

/// Public profile of an account. Passwords never appear here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Body of `POST /auth/login`.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Successful login: the token and the profile it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserInfo,
}

/// Body of `POST /users`.
#[derive(Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("name", &self.name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl NewUser {
    /// Checks the fields the backend requires. Passwords are taken as typed,
    /// so only an empty one is rejected.
    pub fn validate(&self) -> crate::Result<()> {
        for (field, value) in [("name", &self.name), ("email", &self.email)] {
            if value.trim().is_empty() {
                return Err(crate::ClinicError::Validation(format!("{} is required", field)).into());
            }
        }
        if self.password.is_empty() {
            return Err(crate::ClinicError::Validation("password is required".into()).into());
        }
        Ok(())
    }
}

/// Body of `PUT /users/{id}`. Passwords change through [`PasswordChange`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Body of `PUT /users/{id}/password`.
#[derive(Clone, Serialize, Deserialize)]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

impl std::fmt::Debug for PasswordChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PasswordChange { .. }")
    }
}

/// `{ "message": "..." }` acknowledgement bodies.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(name: &str, email: &str, password: &str) -> NewUser {
        NewUser {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn test_new_user_validate() {
        assert!(new_user("Rina", "rina@clinic.test", "pw").validate().is_ok());

        for (user, field) in [
            (new_user(" ", "rina@clinic.test", "pw"), "name"),
            (new_user("Rina", "", "pw"), "email"),
            (new_user("Rina", "rina@clinic.test", ""), "password"),
        ] {
            let err = user.validate().unwrap_err();
            assert!(
                err.to_string().contains(field),
                "expected {} in {}",
                field,
                err
            );
        }
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let creds = Credentials {
            email: "admin@clinic.test".into(),
            password: "hunter2".into(),
        };
        let debug = format!("{:?}", creds);
        assert!(debug.contains("admin@clinic.test"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_password_change_debug_hides_both_passwords() {
        let change = PasswordChange {
            current_password: "old-secret".into(),
            new_password: "new-secret".into(),
        };
        let debug = format!("{:?}", change);
        assert!(!debug.contains("secret"));
    }
}
