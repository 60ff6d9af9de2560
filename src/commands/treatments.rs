//! Treatment commands

use colored::Colorize;
use prettytable::{cell, row, Table};

use crate::cli::TreatmentCommand;
use crate::client::ClinicClient;
use crate::commands::{matches_filter, print_json};
use crate::error::{ClinicError, Result};
use crate::models::{NewTreatment, Treatment, TreatmentUpdate};

/// Runs a treatment subcommand.
pub async fn run(client: &ClinicClient, command: TreatmentCommand) -> Result<()> {
    let treatments = client.treatments();

    match command {
        TreatmentCommand::List {
            patient,
            search,
            json,
        } => {
            let mut list = match patient {
                Some(patient_id) => treatments.list_for_patient(patient_id).await?,
                None => treatments.list_all().await?,
            };
            list.retain(|t| matches_filter(&t.summary, search.as_deref()));
            sort_newest_first(&mut list);

            if json {
                print_json(&list)?;
            } else {
                print_treatments_table(&list);
            }
        }
        TreatmentCommand::Show {
            patient_id,
            treatment_id,
            json,
        } => {
            let treatment = treatments.get(patient_id, treatment_id).await?;
            if json {
                print_json(&treatment)?;
            } else {
                println!("{}", treatment.date.format("%Y-%m-%d").to_string().bold());
                println!("{}", treatment.summary);
            }
        }
        TreatmentCommand::Add {
            patient_id,
            summary,
            date,
        } => {
            let created = treatments
                .create(patient_id, &NewTreatment { summary, date })
                .await?;
            println!("{}", format!("Recorded treatment {}", created.id).green());
        }
        TreatmentCommand::Update {
            patient_id,
            treatment_id,
            summary,
            date,
        } => {
            if summary.is_none() && date.is_none() {
                return Err(ClinicError::Validation("nothing to update".into()).into());
            }
            let updated = treatments
                .update(patient_id, treatment_id, &TreatmentUpdate { summary, date })
                .await?;
            println!("{}", format!("Updated treatment {}", updated.id).green());
        }
        TreatmentCommand::Delete {
            patient_id,
            treatment_id,
        } => {
            treatments.delete(patient_id, treatment_id).await?;
            println!("{}", format!("Deleted treatment {}", treatment_id).green());
        }
    }

    Ok(())
}

/// Most recent treatment first.
pub fn sort_newest_first(treatments: &mut [Treatment]) {
    treatments.sort_by(|a, b| b.date.cmp(&a.date));
}

fn print_treatments_table(treatments: &[Treatment]) {
    let mut table = Table::new();
    table.add_row(row!["ID", "Patient", "Date", "Summary"]);
    for t in treatments {
        table.add_row(row![t.id, t.patient_id, t.date.format("%Y-%m-%d"), t.summary]);
    }
    table.printstd();
}
