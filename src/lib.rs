//! Clinic - client library for the clinic patient and treatment API
//!
//! This library talks to the clinic backend on behalf of a host application
//! (the bundled `clinic` CLI, or any GUI/TUI embedding it).
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `session`: session lifecycle, token expiry checks and persistence
//! - `api`: the authenticated request wrapper and per-resource clients
//! - `models`: wire types for patients, treatments, users and issue reports
//! - `client`: [`ClinicClient`], bundling the resource clients
//! - `config`: configuration management and validation
//! - `error`: error types and result aliases
//! - `cli` / `commands`: command-line interface definition and handlers
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use clinic::{ClinicClient, Config, SessionContext};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     config.validate()?;
//!
//!     let session = Arc::new(SessionContext::new(config.session.open_store()?));
//!     let client = ClinicClient::new(config.api.clone(), session)?;
//!     if client.session().is_authenticated() {
//!         let patients = client.patients().list().await?;
//!         println!("{} patients", patients.count);
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod session;

// Re-export commonly used types
pub use client::ClinicClient;
pub use config::{ApiConfig, Config};
pub use error::{ClinicError, Result};
pub use session::{Session, SessionContext, SessionEvent};
