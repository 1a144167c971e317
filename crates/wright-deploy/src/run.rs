//! Deployment run tracking.
//!
//! A [`DeploymentRun`] binds one plan to one registry and one outcome. It
//! is created when the executor starts, mutated only by the executor, and
//! terminal at the first failure, at cancellation, or after the last unit
//! deploys.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use wright_core::{NetworkId, RunId};

use crate::error::{Error, Result};
use crate::plan::DeployPlan;
use crate::registry::DeploymentRegistry;

/// Run state machine states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunState {
    /// Created, waiting to start.
    Pending,
    /// Actively deploying units.
    Running,
    /// All units deployed.
    Succeeded,
    /// A unit's deploy call failed; remaining units were never attempted.
    Failed,
    /// Cancelled between units; remaining units were never attempted.
    Cancelled,
}

impl RunState {
    /// Returns true if this is a terminal state.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }

    /// Returns true if the transition from self to target is valid.
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        match self {
            Self::Pending => matches!(target, Self::Running | Self::Cancelled),
            Self::Running => matches!(target, Self::Succeeded | Self::Failed | Self::Cancelled),
            Self::Succeeded | Self::Failed | Self::Cancelled => false,
        }
    }

    /// Returns the state name as a static string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Running => "RUNNING",
            Self::Succeeded => "SUCCEEDED",
            Self::Failed => "FAILED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::Pending
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Details of a failed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunFailure {
    /// The unit whose deploy call failed.
    pub unit: String,
    /// Human-readable cause.
    pub message: String,
    /// Whether the underlying failure looked transient (a retry by the
    /// caller might succeed).
    pub transient: bool,
}

/// A single execution of a deployment plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRun {
    /// Unique run identifier.
    pub id: RunId,
    /// Plan being executed.
    pub plan_id: String,
    /// Target network identifier.
    pub network_id: NetworkId,
    /// Current state of the run.
    pub state: RunState,
    /// When the run was created.
    pub created_at: DateTime<Utc>,
    /// When the run started executing (if started).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    /// When the run completed (if completed).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Failure details, present when state is `Failed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<RunFailure>,
    registry: DeploymentRegistry,
}

impl DeploymentRun {
    /// Creates a pending run for a plan.
    #[must_use]
    pub fn from_plan(plan: &DeployPlan) -> Self {
        Self {
            id: RunId::generate(),
            plan_id: plan.plan_id.clone(),
            network_id: plan.network_id,
            state: RunState::Pending,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            failure: None,
            registry: DeploymentRegistry::from_plan(plan),
        }
    }

    /// Returns the registry (partial until the run is terminal).
    #[must_use]
    pub fn registry(&self) -> &DeploymentRegistry {
        &self.registry
    }

    /// Returns the registry for mutation.
    ///
    /// Only the executor should call this while the run is live.
    pub fn registry_mut(&mut self) -> &mut DeploymentRegistry {
        &mut self.registry
    }

    /// Returns true if the run is in a terminal state.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Transitions to a new state, stamping timestamps.
    ///
    /// # Errors
    ///
    /// Returns an error if the transition is invalid.
    #[tracing::instrument(skip(self), fields(run_id = %self.id, from = %self.state, to = %target))]
    pub fn transition_to(&mut self, target: RunState) -> Result<()> {
        if !self.state.can_transition_to(target) {
            return Err(Error::InvalidStateTransition {
                from: self.state.to_string(),
                to: target.to_string(),
                reason: "invalid run state transition".into(),
            });
        }

        let now = Utc::now();
        match target {
            RunState::Running => self.started_at = Some(now),
            RunState::Succeeded | RunState::Failed | RunState::Cancelled => {
                self.completed_at = Some(now);
            }
            RunState::Pending => {}
        }

        self.state = target;
        Ok(())
    }

    /// Records a failure and moves the run to `Failed`.
    ///
    /// # Errors
    ///
    /// Returns an error if the run cannot transition to `Failed`.
    pub fn fail(&mut self, failure: RunFailure) -> Result<()> {
        self.transition_to(RunState::Failed)?;
        self.failure = Some(failure);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::UnitDescriptor;
    use crate::plan::PlanBuilder;
    use crate::registry::UnitStatus;

    fn run() -> DeploymentRun {
        let plan = PlanBuilder::new()
            .add_unit(UnitDescriptor::new("a"))
            .build()
            .unwrap();
        DeploymentRun::from_plan(&plan)
    }

    #[test]
    fn run_starts_pending_with_pending_registry() {
        let run = run();
        assert_eq!(run.state, RunState::Pending);
        assert_eq!(run.registry().status("a"), Some(UnitStatus::Pending));
        assert!(run.started_at.is_none());
    }

    #[test]
    fn happy_path_transitions_stamp_timestamps() {
        let mut run = run();
        run.transition_to(RunState::Running).unwrap();
        assert!(run.started_at.is_some());
        run.transition_to(RunState::Succeeded).unwrap();
        assert!(run.completed_at.is_some());
        assert!(run.is_terminal());
    }

    #[test]
    fn terminal_states_admit_no_transitions() {
        let mut run = run();
        run.transition_to(RunState::Running).unwrap();
        run.transition_to(RunState::Succeeded).unwrap();
        assert!(matches!(
            run.transition_to(RunState::Failed),
            Err(Error::InvalidStateTransition { .. })
        ));
    }

    #[test]
    fn pending_run_can_be_cancelled_directly() {
        let mut run = run();
        run.transition_to(RunState::Cancelled).unwrap();
        assert_eq!(run.state, RunState::Cancelled);
    }

    #[test]
    fn pending_run_cannot_skip_to_succeeded() {
        let mut run = run();
        assert!(matches!(
            run.transition_to(RunState::Succeeded),
            Err(Error::InvalidStateTransition { .. })
        ));
    }

    #[test]
    fn fail_records_the_failed_unit() {
        let mut run = run();
        run.transition_to(RunState::Running).unwrap();
        run.fail(RunFailure {
            unit: "a".into(),
            message: "insufficient funds".into(),
            transient: false,
        })
        .unwrap();

        assert_eq!(run.state, RunState::Failed);
        assert_eq!(run.failure.as_ref().map(|f| f.unit.as_str()), Some("a"));
    }

    #[test]
    fn run_serde_round_trip() {
        let run = run();
        let json = serde_json::to_string(&run).unwrap();
        let back: DeploymentRun = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, run.id);
        assert_eq!(back.state, run.state);
        assert_eq!(back.registry().len(), 1);
    }
}
