//! Deploy command - execute a manifest against a node.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Args;
use tokio_util::sync::CancellationToken;

use wright_core::Address;
use wright_deploy::artifact::DirArtifacts;
use wright_deploy::events::{DeployEvent, EventSink, TracingSink};
use wright_deploy::executor::Executor;
use wright_deploy::manifest::{DeployManifest, DeploymentRecord};
use wright_deploy::run::{DeploymentRun, RunState};

use crate::client::RpcChainClient;
use crate::{Config, OutputFormat};

/// Arguments for the deploy command.
#[derive(Debug, Args)]
pub struct DeployArgs {
    /// Path to the deployment manifest (JSON).
    #[arg(long, short = 'f')]
    pub manifest: PathBuf,

    /// Directory of compiled build artifacts (`<Unit>.json`).
    #[arg(long, default_value = "build/contracts")]
    pub artifacts: PathBuf,

    /// Sending account (defaults to the node's first account).
    #[arg(long)]
    pub sender: Option<Address>,

    /// Gas limit per deployment transaction.
    #[arg(long)]
    pub gas: Option<u64>,

    /// Seconds to wait for each transaction receipt.
    #[arg(long, default_value_t = 120)]
    pub receipt_timeout: u64,

    /// Write the deployment record (JSON) to this path.
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

/// Execute the deploy command.
///
/// # Errors
///
/// Returns an error (non-zero exit) if the manifest fails validation, the
/// node's network id does not match, or the run does not succeed.
pub async fn execute(args: DeployArgs, config: &Config) -> Result<()> {
    let manifest = DeployManifest::from_path(&args.manifest)
        .with_context(|| format!("Failed to load manifest {}", args.manifest.display()))?;

    let network = config.network(manifest.network_id);
    let plan = DeployManifest {
        network_id: network.network_id,
        units: manifest.units,
    }
    .into_plan()
    .context("Manifest failed validation")?;

    let artifacts = Arc::new(DirArtifacts::new(&args.artifacts));
    let mut client = RpcChainClient::new(&network, artifacts)?
        .with_receipt_timeout(Duration::from_secs(args.receipt_timeout));
    if let Some(sender) = args.sender {
        client = client.with_sender(sender);
    }
    if let Some(gas) = args.gas {
        client = client.with_gas(gas);
    }

    let reported = client
        .network_version()
        .await
        .with_context(|| format!("Failed to query network id from {}", network.endpoint()))?;
    if !network.network_id.matches(reported) {
        bail!(
            "node at {} reports network id {reported}, expected {}",
            network.endpoint(),
            network.network_id
        );
    }

    // Ctrl-C halts after the in-flight deployment completes.
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("interrupt received; finishing the in-flight deployment");
                cancel.cancel();
            }
        });
    }

    let executor = Executor::new(Arc::new(client)).with_cancellation(cancel);
    let mut sink = progress_sink(&config.format);
    let run = executor.execute(&plan, sink.as_mut()).await?;

    let record = DeploymentRecord::from_run(&run);
    if let Some(path) = &args.output {
        std::fs::write(path, record.to_json_pretty()?)
            .with_context(|| format!("Failed to write deployment record to {}", path.display()))?;
    }

    report(&run, &record, config)?;

    match run.state {
        RunState::Succeeded => Ok(()),
        RunState::Failed => {
            let failure = run.failure.as_ref();
            bail!(
                "deployment failed at '{}': {}",
                failure.map_or("<unknown>", |f| f.unit.as_str()),
                failure.map_or("<no cause recorded>", |f| f.message.as_str())
            )
        }
        RunState::Cancelled => bail!(
            "deployment cancelled after {} of {} units",
            run.registry().deployed().len(),
            plan.len()
        ),
        RunState::Pending | RunState::Running => bail!("run ended in non-terminal state"),
    }
}

fn progress_sink(format: &OutputFormat) -> Box<dyn EventSink> {
    match format {
        // Keep stdout clean for machine-readable output.
        OutputFormat::Json => Box::new(TracingSink),
        OutputFormat::Text | OutputFormat::Table => Box::new(PrintSink),
    }
}

/// Sink printing one progress line per unit, in deployment order.
struct PrintSink;

impl EventSink for PrintSink {
    fn push(&mut self, event: DeployEvent) {
        match event {
            DeployEvent::RunStarted { unit_count, .. } => {
                println!("Deploying {unit_count} units...");
                println!();
            }
            DeployEvent::UnitDeployed { unit, address, .. } => {
                println!("  {unit}: {address}");
            }
            DeployEvent::UnitFailed { unit, message, .. } => {
                println!("  {unit}: FAILED ({message})");
            }
            DeployEvent::RunCompleted { .. } => println!(),
        }
    }
}

fn report(run: &DeploymentRun, record: &DeploymentRecord, config: &Config) -> Result<()> {
    match config.format {
        OutputFormat::Json => {
            println!("{}", record.to_json_pretty()?);
        }
        OutputFormat::Text => {
            match run.state {
                RunState::Succeeded => println!("Deployment succeeded!"),
                RunState::Failed => println!("Deployment failed."),
                _ => println!("Deployment did not complete."),
            }
            println!();
            println!("  Run ID:      {}", run.id);
            println!("  Network:     {}", run.network_id);
            println!("  Deployed:    {} of {}", run.registry().deployed().len(), record.units.len());
        }
        OutputFormat::Table => {
            use tabled::{Table, Tabled};

            #[derive(Tabled)]
            struct Row {
                #[tabled(rename = "Unit")]
                unit: String,
                #[tabled(rename = "Status")]
                status: String,
                #[tabled(rename = "Address")]
                address: String,
            }

            let rows: Vec<Row> = record
                .units
                .iter()
                .map(|unit| Row {
                    unit: unit.unit.clone(),
                    status: unit.status.to_string(),
                    address: unit
                        .address
                        .map(|a| a.to_string())
                        .unwrap_or_else(|| "-".into()),
                })
                .collect();

            println!("{}", Table::new(rows));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wright_deploy::client::StaticClient;
    use wright_deploy::descriptor::UnitDescriptor;
    use wright_deploy::plan::PlanBuilder;

    #[tokio::test]
    async fn report_covers_every_format() {
        let plan = PlanBuilder::new()
            .add_unit(UnitDescriptor::new("RoleController"))
            .build()
            .unwrap();
        let executor = Executor::new(Arc::new(StaticClient::new()));
        let mut sink = progress_sink(&OutputFormat::Json);
        let run = executor.execute(&plan, sink.as_mut()).await.unwrap();
        let record = DeploymentRecord::from_run(&run);

        for format in [OutputFormat::Text, OutputFormat::Json, OutputFormat::Table] {
            let config = Config {
                host: "127.0.0.1".into(),
                port: 8545,
                network_id: None,
                format,
            };
            report(&run, &record, &config).unwrap();
        }
    }

    #[test]
    fn print_sink_handles_every_event() {
        use wright_core::RunId;

        let mut sink = PrintSink;
        let run_id = RunId::generate();
        sink.push(DeployEvent::RunStarted {
            run_id,
            plan_id: "plan".into(),
            unit_count: 1,
        });
        sink.push(DeployEvent::UnitFailed {
            run_id,
            unit: "DTFactory".into(),
            message: "reverted".into(),
        });
        sink.push(DeployEvent::RunCompleted {
            run_id,
            state: RunState::Failed,
        });
    }
}
