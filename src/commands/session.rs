//! Login, logout and session inspection

use colored::Colorize;

use crate::client::ClinicClient;
use crate::error::{ClinicError, Result};
use crate::models::Credentials;
use crate::session::guard;

/// Logs in and stores the session.
pub async fn login(client: &ClinicClient, email: String, password: Option<String>) -> Result<()> {
    let password = password.ok_or_else(|| {
        ClinicError::Validation("password required: pass --password or set CLINIC_PASSWORD".into())
    })?;

    let response = client.auth().login(&Credentials { email, password }).await?;
    println!(
        "{}",
        format!("Logged in as {} <{}>", response.user.name, response.user.email).green()
    );
    Ok(())
}

/// Clears the stored session.
pub fn logout(client: &ClinicClient) -> Result<()> {
    client.auth().logout()?;
    println!("{}", "Logged out".green());
    Ok(())
}

/// Prints the stored user and token expiry.
pub fn whoami(client: &ClinicClient) -> Result<()> {
    let session = client.session();
    let Some(user) = session.user()? else {
        println!("{}", "Not logged in".yellow());
        return Ok(());
    };

    println!("{} <{}> (id {})", user.name, user.email, user.id);

    let expiry = session.token()?.as_deref().and_then(guard::token_expiry);
    match (session.is_authenticated(), expiry) {
        (true, Some(at)) => println!("Session valid until {}", at.to_rfc3339()),
        (false, Some(at)) => println!("{}", format!("Session expired at {}", at.to_rfc3339()).red()),
        (_, None) => println!("{}", "Stored token is unreadable; log in again".red()),
    }
    Ok(())
}
