//! Error types for the deployment orchestration domain.

use crate::artifact::ArtifactError;
use crate::client::ChainError;

/// The result type used throughout wright-deploy.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in orchestration operations.
///
/// Everything except [`Error::Network`] and [`Error::Artifact`] is
/// structural: detected before or during scheduling, never retried, and
/// fatal to the run before any transaction is issued.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Two unit descriptors share a name.
    #[error("duplicate unit name: {unit}")]
    DuplicateUnit {
        /// The name that appears more than once.
        unit: String,
    },

    /// A constructor argument references a unit that is not in the
    /// descriptor set.
    #[error("unit '{unit}' references unknown unit '{target}'")]
    UnknownReference {
        /// The unit whose arguments contain the bad reference.
        unit: String,
        /// The missing reference target.
        target: String,
    },

    /// A unit's constructor arguments reference the unit itself.
    #[error("unit '{unit}' references itself")]
    SelfReference {
        /// The self-referencing unit.
        unit: String,
    },

    /// A cycle was detected in the dependency graph.
    #[error("cycle detected in dependency graph: {}", cycle.join(" -> "))]
    CycleDetected {
        /// One concrete cycle, as a closed path of unit names.
        cycle: Vec<String>,
    },

    /// A unit was not found in the plan or registry.
    #[error("unit not found: {unit}")]
    UnitNotFound {
        /// The unit name that was not found.
        unit: String,
    },

    /// A unit was deployed twice within one run.
    #[error("unit '{unit}' already deployed")]
    DuplicateDeployment {
        /// The already-deployed unit.
        unit: String,
    },

    /// Argument resolution found an undeployed dependency.
    ///
    /// The deployment order guarantees every reference target is deployed
    /// before its dependents; hitting this is an internal bug, not an input
    /// error.
    #[error(
        "ordering invariant violated: unit '{unit}' resolved before its dependency '{missing}'"
    )]
    OrderingInvariant {
        /// The unit whose arguments were being resolved.
        unit: String,
        /// The dependency that was not yet deployed.
        missing: String,
    },

    /// An invalid state transition was attempted.
    #[error("invalid state transition: {from} -> {to} ({reason})")]
    InvalidStateTransition {
        /// The current state.
        from: String,
        /// The attempted target state.
        to: String,
        /// The reason the transition is invalid.
        reason: String,
    },

    /// A DAG node was not found (internal graph operation error).
    #[error("DAG node not found: {node}")]
    DagNodeNotFound {
        /// The node identifier (index or value).
        node: String,
    },

    /// The network client failed to deploy a unit.
    #[error("deployment of '{unit}' failed")]
    Network {
        /// The unit whose deploy call failed.
        unit: String,
        /// The underlying client failure.
        #[source]
        source: ChainError,
    },

    /// An artifact could not be loaded.
    #[error("artifact for '{unit}' unavailable")]
    Artifact {
        /// The unit whose artifact was requested.
        unit: String,
        /// The underlying store failure.
        #[source]
        source: ArtifactError,
    },

    /// A manifest could not be read or parsed.
    #[error("manifest error: {message}")]
    Manifest {
        /// Description of the failure.
        message: String,
    },

    /// A serialization error occurred.
    #[error("serialization error: {message}")]
    Serialization {
        /// Description of the failure.
        message: String,
    },
}
