/*!
Command handlers for the CLI

This module provides the handlers invoked by the CLI entrypoint. Each
submodule covers one resource:

- `session`: login, logout, whoami
- `patients`: patient files, toggling and export
- `treatments`: treatments per patient
- `users`: account administration
- `issues`: issue reporting

Handlers stay thin: they build request payloads from arguments, call the
library clients, and render results as tables or JSON. The CLI is also the
host application for session events; see [`report_session_events`].
*/

use std::sync::Arc;

use colored::Colorize;
use tokio::sync::broadcast;

use crate::client::ClinicClient;
use crate::config::Config;
use crate::error::{ClinicError, Result};
use crate::session::{SessionContext, SessionEvent};

pub mod issues;
pub mod patients;
pub mod session;
pub mod treatments;
pub mod users;

/// Opens the configured session store and builds a client over it.
pub fn connect(config: &Config) -> Result<ClinicClient> {
    let store = config.session.open_store()?;
    let session = Arc::new(SessionContext::new(store));
    ClinicClient::new(config.api.clone(), session)
}

/// Fails early when no usable session is stored.
///
/// Sending a request with an expired token would only bounce off a 401.
pub fn require_session(client: &ClinicClient) -> Result<()> {
    if client.session().is_authenticated() {
        Ok(())
    } else {
        Err(ClinicError::Authentication(
            "not logged in or session expired; run `clinic login`".to_string(),
        )
        .into())
    }
}

/// Drains session events emitted while a command ran and tells the user
/// what happened.
pub fn report_session_events(rx: &mut broadcast::Receiver<SessionEvent>) {
    loop {
        match rx.try_recv() {
            Ok(SessionEvent::Expired) => {
                eprintln!(
                    "{}",
                    "Your session has expired. Run `clinic login` to sign in again.".yellow()
                );
            }
            Ok(SessionEvent::LoggedIn(_)) | Ok(SessionEvent::LoggedOut) => {}
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                tracing::debug!("Skipped {} session events", skipped);
            }
            Err(_) => break,
        }
    }
}

/// Prints `value` as pretty JSON.
pub(crate) fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(ClinicError::Serialization)?;
    println!("{}", json);
    Ok(())
}

/// Case-insensitive substring match; `None` matches everything.
pub(crate) fn matches_filter(haystack: &str, needle: Option<&str>) -> bool {
    match needle.map(str::trim) {
        None | Some("") => true,
        Some(needle) => haystack.to_lowercase().contains(&needle.to_lowercase()),
    }
}
