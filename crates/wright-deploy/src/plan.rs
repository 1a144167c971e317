//! Deterministic deployment planning.
//!
//! A [`DeployPlan`] specifies exactly which units will deploy and in what
//! order. Plans are:
//!
//! - **Deterministic**: The same descriptor set always produces the same
//!   order (declaration order breaks ties between independent units)
//! - **Validated**: Unknown references, self-references, duplicate names,
//!   and cycles are all rejected before any transaction is issued
//! - **Serializable**: Can be inspected and compared without deploying

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use wright_core::NetworkId;

use crate::dag::Dag;
use crate::descriptor::UnitDescriptor;
use crate::error::{Error, Result};

/// Dependency edge in the plan graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyEdge {
    /// The unit that must deploy first.
    pub dependency: String,
    /// The unit whose constructor needs the dependency's address.
    pub dependent: String,
}

/// A validated, ordered deployment plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployPlan {
    /// Unique plan identifier.
    pub plan_id: String,
    /// Target network identifier.
    pub network_id: NetworkId,
    /// Plan creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Units in deployment order.
    pub units: Vec<UnitDescriptor>,
    /// Dependency edges, in declaration order of the dependent.
    pub edges: Vec<DependencyEdge>,
}

impl DeployPlan {
    /// Returns the number of units in the plan.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Returns true if the plan has no units.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Returns the descriptor for a unit name.
    #[must_use]
    pub fn unit(&self, name: &str) -> Option<&UnitDescriptor> {
        self.units.iter().find(|u| u.name == name)
    }

    /// Returns unit names in deployment order.
    #[must_use]
    pub fn order(&self) -> Vec<&str> {
        self.units.iter().map(|u| u.name.as_str()).collect()
    }

    /// Returns the units with no dependencies.
    #[must_use]
    pub fn root_units(&self) -> Vec<&UnitDescriptor> {
        self.units
            .iter()
            .filter(|u| u.dependencies().is_empty())
            .collect()
    }
}

/// Builder for creating deployment plans.
#[derive(Debug, Default)]
pub struct PlanBuilder {
    network_id: NetworkId,
    units: Vec<UnitDescriptor>,
}

impl PlanBuilder {
    /// Creates a new plan builder targeting any network.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the target network identifier.
    #[must_use]
    pub const fn with_network_id(mut self, network_id: NetworkId) -> Self {
        self.network_id = network_id;
        self
    }

    /// Adds a unit descriptor. Declaration order is significant: it breaks
    /// ties between units with no relative dependency constraint.
    #[must_use]
    pub fn add_unit(mut self, unit: UnitDescriptor) -> Self {
        self.units.push(unit);
        self
    }

    /// Adds several unit descriptors, preserving their order.
    #[must_use]
    pub fn add_units(mut self, units: impl IntoIterator<Item = UnitDescriptor>) -> Self {
        self.units.extend(units);
        self
    }

    /// Builds the plan, validating the descriptor set and computing the
    /// deployment order.
    ///
    /// # Errors
    ///
    /// Returns an error if unit names collide, a reference targets an
    /// unknown unit or the unit itself, or the dependency graph contains a
    /// cycle. All of these abort before any side effect.
    #[tracing::instrument(skip(self), fields(unit_count = self.units.len()))]
    pub fn build(self) -> Result<DeployPlan> {
        let index_by_name = index_units_by_name(&self.units)?;
        validate_references(&self.units, &index_by_name)?;

        let ordered_names = deployment_order(&self.units)?;
        let units = units_in_order(self.units, &ordered_names);
        let edges = collect_edges(&units);

        Ok(DeployPlan {
            plan_id: ulid::Ulid::new().to_string(),
            network_id: self.network_id,
            created_at: Utc::now(),
            units,
            edges,
        })
    }
}

fn index_units_by_name(units: &[UnitDescriptor]) -> Result<HashMap<&str, usize>> {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(units.len());
    for (pos, unit) in units.iter().enumerate() {
        if index.insert(unit.name.as_str(), pos).is_some() {
            return Err(Error::DuplicateUnit {
                unit: unit.name.clone(),
            });
        }
    }
    Ok(index)
}

fn validate_references(
    units: &[UnitDescriptor],
    index_by_name: &HashMap<&str, usize>,
) -> Result<()> {
    for unit in units {
        for target in unit.dependencies() {
            if target == unit.name {
                return Err(Error::SelfReference {
                    unit: unit.name.clone(),
                });
            }
            if !index_by_name.contains_key(target) {
                return Err(Error::UnknownReference {
                    unit: unit.name.clone(),
                    target: target.to_string(),
                });
            }
        }
    }
    Ok(())
}

fn deployment_order(units: &[UnitDescriptor]) -> Result<Vec<String>> {
    let mut dag: Dag<String> = Dag::new();
    for unit in units {
        dag.add_node(unit.name.clone());
    }
    for unit in units {
        let dependent = dag
            .get_index(&unit.name)
            .ok_or_else(|| Error::DagNodeNotFound {
                node: unit.name.clone(),
            })?;
        for target in unit.dependencies() {
            let dependency =
                dag.get_index(&target.to_string())
                    .ok_or_else(|| Error::DagNodeNotFound {
                        node: target.to_string(),
                    })?;
            dag.add_edge(dependency, dependent)?;
        }
    }
    dag.toposort()
}

fn units_in_order(units: Vec<UnitDescriptor>, ordered_names: &[String]) -> Vec<UnitDescriptor> {
    let mut by_name: HashMap<String, UnitDescriptor> = units
        .into_iter()
        .map(|unit| (unit.name.clone(), unit))
        .collect();
    ordered_names
        .iter()
        .filter_map(|name| by_name.remove(name))
        .collect()
}

fn collect_edges(units: &[UnitDescriptor]) -> Vec<DependencyEdge> {
    units
        .iter()
        .flat_map(|unit| {
            unit.dependencies()
                .into_iter()
                .map(|target| DependencyEdge {
                    dependency: target.to_string(),
                    dependent: unit.name.clone(),
                })
                .collect::<Vec<_>>()
        })
        .collect()
}
