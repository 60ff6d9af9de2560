//! Issue reporting command

use colored::Colorize;

use crate::cli::IssueCommand;
use crate::client::ClinicClient;
use crate::error::Result;
use crate::models::IssueReport;

/// Runs an issue subcommand.
pub async fn run(client: &ClinicClient, command: IssueCommand) -> Result<()> {
    match command {
        IssueCommand::Report {
            title,
            description,
            issue_type,
            priority,
        } => {
            let created = client
                .issues()
                .create(&IssueReport {
                    title,
                    description,
                    issue_type,
                    priority,
                })
                .await?;

            let headline = if created.message.is_empty() {
                "Issue created"
            } else {
                created.message.as_str()
            };
            println!("{}", headline.green());
            if let Some(number) = created.issue_number {
                println!("  #{}", number);
            }
            if let Some(url) = &created.html_url {
                println!("  {}", url);
            }
        }
    }
    Ok(())
}
