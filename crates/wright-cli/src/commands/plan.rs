//! Plan command - validate a manifest and print the deployment order.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use wright_deploy::manifest::DeployManifest;
use wright_deploy::plan::DeployPlan;

use crate::{Config, OutputFormat};

/// Arguments for the plan command.
#[derive(Debug, Args)]
pub struct PlanArgs {
    /// Path to the deployment manifest (JSON).
    #[arg(long, short = 'f')]
    pub manifest: PathBuf,
}

/// Execute the plan command.
///
/// # Errors
///
/// Returns an error if the manifest is unreadable or fails validation
/// (duplicate names, unknown or self references, cycles).
pub fn execute(args: &PlanArgs, config: &Config) -> Result<()> {
    let manifest = DeployManifest::from_path(&args.manifest)
        .with_context(|| format!("Failed to load manifest {}", args.manifest.display()))?;
    let plan = manifest.into_plan().context("Manifest failed validation")?;

    match config.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&plan).context("Failed to serialize plan")?
            );
        }
        OutputFormat::Text => print_text(&plan),
        OutputFormat::Table => print_table(&plan),
    }

    Ok(())
}

fn print_text(plan: &DeployPlan) {
    println!("Deployment order ({} units):", plan.len());
    println!();
    for (position, unit) in plan.units.iter().enumerate() {
        let deps = unit.dependencies();
        if deps.is_empty() {
            println!("  {}. {}", position + 1, unit.name);
        } else {
            println!("  {}. {} (after {})", position + 1, unit.name, deps.join(", "));
        }
    }
}

fn print_table(plan: &DeployPlan) {
    use tabled::{Table, Tabled};

    #[derive(Tabled)]
    struct Row {
        #[tabled(rename = "#")]
        position: usize,
        #[tabled(rename = "Unit")]
        unit: String,
        #[tabled(rename = "Depends On")]
        depends_on: String,
    }

    let rows: Vec<Row> = plan
        .units
        .iter()
        .enumerate()
        .map(|(position, unit)| Row {
            position: position + 1,
            unit: unit.name.clone(),
            depends_on: unit.dependencies().join(", "),
        })
        .collect();

    println!("{}", Table::new(rows));
}
