//! # wright-cli
//!
//! Command-line interface for Wright deployments.
//!
//! ## Commands
//!
//! - `wright plan` - Validate a manifest and print the deployment order
//! - `wright deploy` - Deploy a manifest against a node
//!
//! ## Configuration
//!
//! The CLI uses environment variables or command-line flags for settings:
//!
//! - `WRIGHT_HOST` - Node host (default: `127.0.0.1`)
//! - `WRIGHT_PORT` - Node RPC port (default: `8545`)
//! - `WRIGHT_NETWORK_ID` - Expected network id (`*` accepts any)

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]
// CLI uses print! macros intentionally
#![allow(clippy::print_stdout)]
#![allow(clippy::print_stderr)]

pub mod abi;
pub mod client;
pub mod commands;

use clap::{Parser, Subcommand};

use wright_core::{NetworkConfig, NetworkId};

/// Wright CLI - dependency-ordered contract deployment.
#[derive(Debug, Parser)]
#[command(name = "wright")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Node host name or IP.
    #[arg(long, env = "WRIGHT_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Node RPC port.
    #[arg(long, env = "WRIGHT_PORT", default_value_t = 8545)]
    pub port: u16,

    /// Expected network id (`*` accepts any). Overrides the manifest.
    #[arg(long, env = "WRIGHT_NETWORK_ID")]
    pub network_id: Option<NetworkId>,

    /// Output format.
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Get the effective configuration.
    #[must_use]
    pub fn config(&self) -> Config {
        Config {
            host: self.host.clone(),
            port: self.port,
            network_id: self.network_id,
            format: self.format.clone(),
        }
    }
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Validate a manifest and print the deployment order.
    Plan(commands::plan::PlanArgs),
    /// Deploy a manifest against a node.
    Deploy(commands::deploy::DeployArgs),
}

/// Output format.
#[derive(Debug, Clone, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// Table output.
    Table,
}

/// CLI configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Node host name or IP.
    pub host: String,
    /// Node RPC port.
    pub port: u16,
    /// Network id override from flags/env, if given.
    pub network_id: Option<NetworkId>,
    /// Output format.
    pub format: OutputFormat,
}

impl Config {
    /// Returns the network configuration, falling back to the manifest's
    /// network id when no override was given.
    #[must_use]
    pub fn network(&self, manifest_network_id: NetworkId) -> NetworkConfig {
        NetworkConfig::new(self.host.clone(), self.port)
            .with_network_id(self.network_id.unwrap_or(manifest_network_id))
    }
}
