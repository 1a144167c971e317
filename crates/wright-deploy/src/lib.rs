//! # wright-deploy
//!
//! Dependency-ordered deployment orchestration.
//!
//! This crate turns a set of unit descriptors into a validated, ordered
//! deployment plan and executes it against an injected network client:
//!
//! - **Validation**: Duplicate names, unknown references, self-references,
//!   and dependency cycles are all rejected before anything is submitted
//! - **Deterministic Scheduling**: Topological order with declaration-order
//!   tie-breaking; the same descriptor set always deploys the same way
//! - **Address Propagation**: Each unit's deployed address feeds the
//!   constructor arguments of its dependents
//! - **Fail-Fast Execution**: The first failed deploy halts the run with an
//!   accurate partial registry; later units are never attempted
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use wright_deploy::client::StaticClient;
//! use wright_deploy::descriptor::{ArgSpec, UnitDescriptor};
//! use wright_deploy::error::Result;
//! use wright_deploy::events::InMemorySink;
//! use wright_deploy::executor::Executor;
//! use wright_deploy::plan::PlanBuilder;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<()> {
//! let plan = PlanBuilder::new()
//!     .add_unit(UnitDescriptor::new("RoleController"))
//!     .add_unit(
//!         UnitDescriptor::new("AssetProvider").with_arg(ArgSpec::reference("RoleController")),
//!     )
//!     .build()?;
//!
//! let executor = Executor::new(Arc::new(StaticClient::new()));
//! let mut sink = InMemorySink::new();
//! let run = executor.execute(&plan, &mut sink).await?;
//! println!("{}", run.state);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub(crate) mod dag;

pub mod artifact;
pub mod client;
pub mod descriptor;
pub mod error;
pub mod events;
pub mod executor;
pub mod manifest;
pub mod metrics;
pub mod plan;
pub mod registry;
pub mod run;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::artifact::{ArtifactError, ArtifactStore, ContractArtifact, DirArtifacts};
    pub use crate::client::{ChainClient, ChainError, FailingClient, RecordingClient, StaticClient};
    pub use crate::descriptor::{ArgSpec, ArgValue, UnitDescriptor};
    pub use crate::error::{Error, Result};
    pub use crate::events::{DeployEvent, EventSink, InMemorySink, TracingSink};
    pub use crate::executor::Executor;
    pub use crate::manifest::{DeployManifest, DeploymentRecord};
    pub use crate::metrics::DeployMetrics;
    pub use crate::plan::{DeployPlan, PlanBuilder};
    pub use crate::registry::{DeploymentRegistry, UnitRecord, UnitStatus};
    pub use crate::run::{DeploymentRun, RunFailure, RunState};
}
