//! The deployment result registry.
//!
//! Single source of truth for what a run has deployed: a write-once map
//! from unit name to deployed address, with a per-unit status machine.
//!
//! State machine per unit: `Pending -> Deployed` (terminal success) or
//! `Pending -> Failed` (terminal failure). No transitions out of terminal
//! states.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use wright_core::Address;

use crate::error::{Error, Result};
use crate::plan::DeployPlan;

/// Deployment status of a single unit within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnitStatus {
    /// Not yet attempted.
    Pending,
    /// Deployed; the address is recorded and immutable.
    Deployed,
    /// The deploy call failed.
    Failed,
}

impl UnitStatus {
    /// Returns true if this is a terminal status.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Deployed | Self::Failed)
    }

    /// Returns true if the transition from self to target is valid.
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::Deployed | Self::Failed)
        )
    }
}

impl std::fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Deployed => write!(f, "DEPLOYED"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

/// One unit's entry in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitRecord {
    /// Unit name.
    pub unit: String,
    /// Current status.
    pub status: UnitStatus,
    /// Deployed address, present once status is `Deployed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
}

/// Write-once mapping from unit name to deployed address.
///
/// Owned exclusively by the executor during a run; read-only afterwards.
/// Entries iterate in deployment order. Serializes as the plain record
/// list; the name index is rebuilt on deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "Vec<UnitRecord>", into = "Vec<UnitRecord>")]
pub struct DeploymentRegistry {
    records: Vec<UnitRecord>,
    index: HashMap<String, usize>,
}

impl From<Vec<UnitRecord>> for DeploymentRegistry {
    fn from(records: Vec<UnitRecord>) -> Self {
        let index = records
            .iter()
            .enumerate()
            .map(|(pos, record)| (record.unit.clone(), pos))
            .collect();
        Self { records, index }
    }
}

impl From<DeploymentRegistry> for Vec<UnitRecord> {
    fn from(registry: DeploymentRegistry) -> Self {
        registry.records
    }
}

impl DeploymentRegistry {
    /// Creates a registry with one `Pending` entry per plan unit, in
    /// deployment order.
    #[must_use]
    pub fn from_plan(plan: &DeployPlan) -> Self {
        plan.units
            .iter()
            .map(|unit| UnitRecord {
                unit: unit.name.clone(),
                status: UnitStatus::Pending,
                address: None,
            })
            .collect::<Vec<_>>()
            .into()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the registry has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns all entries in deployment order.
    #[must_use]
    pub fn records(&self) -> &[UnitRecord] {
        &self.records
    }

    /// Returns a unit's current status.
    #[must_use]
    pub fn status(&self, unit: &str) -> Option<UnitStatus> {
        self.get(unit).map(|record| record.status)
    }

    /// Returns a unit's deployed address, if it has one.
    #[must_use]
    pub fn address(&self, unit: &str) -> Option<&Address> {
        self.get(unit).and_then(|record| record.address.as_ref())
    }

    /// Returns `(name, address)` pairs for deployed units, in deployment
    /// order.
    #[must_use]
    pub fn deployed(&self) -> Vec<(&str, &Address)> {
        self.records
            .iter()
            .filter_map(|record| {
                record
                    .address
                    .as_ref()
                    .map(|address| (record.unit.as_str(), address))
            })
            .collect()
    }

    /// Records a successful deployment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnitNotFound`] for an unknown unit,
    /// [`Error::DuplicateDeployment`] if the unit is already deployed, and
    /// [`Error::InvalidStateTransition`] if the unit already failed.
    pub fn record_deployed(&mut self, unit: &str, address: Address) -> Result<()> {
        let record = self.get_mut(unit)?;
        match record.status {
            UnitStatus::Deployed => {
                return Err(Error::DuplicateDeployment { unit: unit.into() });
            }
            UnitStatus::Failed => {
                return Err(invalid_transition(record.status, UnitStatus::Deployed));
            }
            UnitStatus::Pending => {}
        }
        record.status = UnitStatus::Deployed;
        record.address = Some(address);
        Ok(())
    }

    /// Records a failed deployment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnitNotFound`] for an unknown unit and
    /// [`Error::InvalidStateTransition`] if the unit is already terminal.
    pub fn record_failed(&mut self, unit: &str) -> Result<()> {
        let record = self.get_mut(unit)?;
        if !record.status.can_transition_to(UnitStatus::Failed) {
            return Err(invalid_transition(record.status, UnitStatus::Failed));
        }
        record.status = UnitStatus::Failed;
        Ok(())
    }

    fn get(&self, unit: &str) -> Option<&UnitRecord> {
        self.index.get(unit).and_then(|&pos| self.records.get(pos))
    }

    fn get_mut(&mut self, unit: &str) -> Result<&mut UnitRecord> {
        let pos = *self
            .index
            .get(unit)
            .ok_or_else(|| Error::UnitNotFound { unit: unit.into() })?;
        self.records
            .get_mut(pos)
            .ok_or_else(|| Error::UnitNotFound { unit: unit.into() })
    }
}

fn invalid_transition(from: UnitStatus, to: UnitStatus) -> Error {
    Error::InvalidStateTransition {
        from: from.to_string(),
        to: to.to_string(),
        reason: "unit status is terminal".into(),
    }
}
