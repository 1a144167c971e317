//! Deployment manifest input and deployment record output.
//!
//! A [`DeployManifest`] is the operator-authored JSON description of a
//! descriptor set; a [`DeploymentRecord`] is the serializable summary of a
//! finished run that callers may persist as the deployment's record of
//! truth.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use wright_core::{NetworkId, RunId};

use crate::descriptor::UnitDescriptor;
use crate::error::{Error, Result};
use crate::plan::{DeployPlan, PlanBuilder};
use crate::registry::UnitRecord;
use crate::run::{DeploymentRun, RunFailure, RunState};

/// Operator-authored description of what to deploy.
///
/// ```json
/// {
///   "networkId": "*",
///   "units": [
///     { "name": "RoleController" },
///     { "name": "AssetProvider", "args": [{ "ref": "RoleController" }] }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployManifest {
    /// Target network identifier.
    #[serde(default)]
    pub network_id: NetworkId,
    /// Unit descriptors in declaration order.
    pub units: Vec<UnitDescriptor>,
}

impl DeployManifest {
    /// Parses a manifest from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Manifest`] on malformed JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Manifest {
            message: format!("malformed manifest JSON: {e}"),
        })
    }

    /// Reads and parses a manifest file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Manifest`] if the file is unreadable or malformed.
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::Manifest {
            message: format!("failed to read {}: {e}", path.display()),
        })?;
        Self::from_json(&contents)
    }

    /// Builds the validated deployment plan for this manifest.
    ///
    /// # Errors
    ///
    /// Propagates plan validation failures (duplicate names, unknown or
    /// self references, cycles).
    pub fn into_plan(self) -> Result<DeployPlan> {
        PlanBuilder::new()
            .with_network_id(self.network_id)
            .add_units(self.units)
            .build()
    }
}

/// Serializable summary of a finished run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    /// The run this record describes.
    pub run_id: RunId,
    /// The executed plan.
    pub plan_id: String,
    /// Target network identifier.
    pub network_id: NetworkId,
    /// Terminal state of the run.
    pub state: RunState,
    /// When the run completed, if it reached a terminal state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Per-unit outcomes in deployment order.
    pub units: Vec<UnitRecord>,
    /// Failure details, present for failed runs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<RunFailure>,
}

impl DeploymentRecord {
    /// Builds a record from a run.
    #[must_use]
    pub fn from_run(run: &DeploymentRun) -> Self {
        Self {
            run_id: run.id,
            plan_id: run.plan_id.clone(),
            network_id: run.network_id,
            state: run.state,
            completed_at: run.completed_at,
            units: run.registry().records().to_vec(),
            failure: run.failure.clone(),
        }
    }

    /// Serializes the record as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] if encoding fails.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Serialization {
            message: format!("failed to serialize deployment record: {e}"),
        })
    }
}
