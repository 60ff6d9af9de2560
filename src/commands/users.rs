//! Account administration commands

use colored::Colorize;
use prettytable::{cell, row, Table};

use crate::cli::UserCommand;
use crate::client::ClinicClient;
use crate::commands::print_json;
use crate::error::{ClinicError, Result};
use crate::models::{NewUser, PasswordChange, UserUpdate};

fn required(value: Option<String>, what: &str, env: &str) -> Result<String> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ClinicError::Validation(format!("{} required (flag or {})", what, env)).into())
}

/// Runs a user subcommand.
pub async fn run(client: &ClinicClient, command: UserCommand) -> Result<()> {
    let users = client.users();

    match command {
        UserCommand::List { json } => {
            let list = users.list().await?;
            if json {
                print_json(&list)?;
            } else {
                let me = users.current()?.map(|u| u.id);
                let mut table = Table::new();
                table.add_row(row!["ID", "Name", "Email", ""]);
                for user in &list {
                    let marker = if me.as_deref() == Some(user.id.as_str()) {
                        "(you)"
                    } else {
                        ""
                    };
                    table.add_row(row![user.id, user.name, user.email, marker]);
                }
                table.printstd();
            }
        }
        UserCommand::Add {
            name,
            email,
            password,
        } => {
            let password = required(password, "password", "CLINIC_NEW_PASSWORD")?;
            let created = users
                .create(&NewUser {
                    name,
                    email,
                    password,
                })
                .await?;
            println!(
                "{}",
                format!("Created {} <{}>", created.name, created.email).green()
            );
        }
        UserCommand::Update { id, name, email } => {
            if name.is_none() && email.is_none() {
                return Err(ClinicError::Validation("nothing to update".into()).into());
            }
            let updated = users.update(&id, &UserUpdate { name, email }).await?;
            println!("{}", format!("Updated {}", updated.email).green());
        }
        UserCommand::Password {
            id,
            current,
            new_password,
        } => {
            let change = PasswordChange {
                current_password: required(current, "current password", "CLINIC_CURRENT_PASSWORD")?,
                new_password: required(new_password, "new password", "CLINIC_NEW_PASSWORD")?,
            };
            let ack = users.change_password(&id, &change).await?;
            let message = if ack.message.is_empty() {
                "Password changed"
            } else {
                ack.message.as_str()
            };
            println!("{}", message.green());
        }
        UserCommand::Delete { id } => {
            if users.current()?.is_some_and(|u| u.id == id) {
                return Err(
                    ClinicError::Validation("refusing to delete the logged-in account".into())
                        .into(),
                );
            }
            users.delete(&id).await?;
            println!("{}", format!("Deleted user {}", id).green());
        }
    }

    Ok(())
}
