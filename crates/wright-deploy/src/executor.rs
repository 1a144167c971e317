//! Sequential, fail-fast deployment execution.
//!
//! The executor walks a plan in order, resolves each unit's constructor
//! arguments against the registry, and submits one deploy call at a time
//! through the injected [`ChainClient`]. Units deploy strictly
//! sequentially: a unit's arguments may need the previous unit's address,
//! and sequential submission keeps progress output deterministic and load
//! on the node bounded.
//!
//! On the first failed deploy call the run halts; units after the failed
//! one are never submitted. Cancellation is honored between units only:
//! a submitted transaction cannot be recalled, so the in-flight call always
//! runs to completion first.

use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use wright_core::observability::deploy_span;

use crate::client::ChainClient;
use crate::descriptor::{ArgSpec, ArgValue, UnitDescriptor};
use crate::error::{Error, Result};
use crate::events::{DeployEvent, EventSink};
use crate::metrics::DeployMetrics;
use crate::plan::DeployPlan;
use crate::registry::{DeploymentRegistry, UnitStatus};
use crate::run::{DeploymentRun, RunFailure, RunState};

/// Executes deployment plans against a network client.
pub struct Executor {
    client: Arc<dyn ChainClient>,
    cancel: CancellationToken,
    metrics: DeployMetrics,
}

impl Executor {
    /// Creates an executor over the given client.
    #[must_use]
    pub fn new(client: Arc<dyn ChainClient>) -> Self {
        Self {
            client,
            cancel: CancellationToken::new(),
            metrics: DeployMetrics::new(),
        }
    }

    /// Installs an external cancellation token.
    ///
    /// Cancellation takes effect before the next unit's deploy call; the
    /// in-flight call, if any, completes or fails first.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Executes the plan and returns the completed run.
    ///
    /// The run is `Succeeded`, `Failed` (with the failed unit, its cause,
    /// and the partial registry), or `Cancelled`. One deploy transaction is
    /// issued per unit, in plan order; no unit is submitted twice and no
    /// retries happen here.
    ///
    /// # Errors
    ///
    /// Returns an error only for internal invariant violations (an
    /// undeployed dependency during argument resolution, a duplicate
    /// registry write). These are bugs, not deployment failures.
    #[tracing::instrument(skip_all, fields(plan_id = %plan.plan_id, unit_count = plan.len()))]
    pub async fn execute(
        &self,
        plan: &DeployPlan,
        sink: &mut dyn EventSink,
    ) -> Result<DeploymentRun> {
        let mut run = DeploymentRun::from_plan(plan);
        self.metrics.run_started();
        let outcome = self.drive(plan, &mut run, sink).await;
        self.metrics.run_finished();
        outcome?;
        Ok(run)
    }

    async fn drive(
        &self,
        plan: &DeployPlan,
        run: &mut DeploymentRun,
        sink: &mut dyn EventSink,
    ) -> Result<()> {
        if self.cancel.is_cancelled() {
            return self.complete(run, sink, RunState::Cancelled);
        }

        run.transition_to(RunState::Running)?;
        sink.push(DeployEvent::RunStarted {
            run_id: run.id,
            plan_id: plan.plan_id.clone(),
            unit_count: plan.len(),
        });

        for unit in &plan.units {
            if self.cancel.is_cancelled() {
                tracing::info!(unit = %unit.name, "cancellation observed, halting before unit");
                return self.complete(run, sink, RunState::Cancelled);
            }

            let args = resolve_args(unit, run.registry())?;
            let started = Instant::now();
            let span = deploy_span("deploy_unit", &run.id.to_string(), &unit.name);

            match self.client.deploy(&unit.name, &args).instrument(span).await {
                Ok(address) => {
                    self.metrics
                        .record_unit("deployed", started.elapsed().as_secs_f64());
                    run.registry_mut().record_deployed(&unit.name, address)?;
                    sink.push(DeployEvent::UnitDeployed {
                        run_id: run.id,
                        unit: unit.name.clone(),
                        address,
                    });
                }
                Err(cause) => {
                    self.metrics
                        .record_unit("failed", started.elapsed().as_secs_f64());
                    run.registry_mut().record_failed(&unit.name)?;
                    sink.push(DeployEvent::UnitFailed {
                        run_id: run.id,
                        unit: unit.name.clone(),
                        message: cause.to_string(),
                    });
                    run.fail(RunFailure {
                        unit: unit.name.clone(),
                        message: cause.to_string(),
                        transient: cause.is_transient(),
                    })?;
                    self.emit_terminal(run, sink);
                    return Ok(());
                }
            }
        }

        self.complete(run, sink, RunState::Succeeded)
    }

    fn complete(
        &self,
        run: &mut DeploymentRun,
        sink: &mut dyn EventSink,
        target: RunState,
    ) -> Result<()> {
        run.transition_to(target)?;
        self.emit_terminal(run, sink);
        Ok(())
    }

    fn emit_terminal(&self, run: &DeploymentRun, sink: &mut dyn EventSink) {
        self.metrics.record_run(run.state.as_str());
        sink.push(DeployEvent::RunCompleted {
            run_id: run.id,
            state: run.state,
        });
    }
}

/// Resolves a unit's argument specs against the registry.
///
/// Literals pass through; references resolve to the target's deployed
/// address. The plan order guarantees every target is already deployed, so
/// a miss is an internal bug, not an input error.
fn resolve_args(unit: &UnitDescriptor, registry: &DeploymentRegistry) -> Result<Vec<ArgValue>> {
    unit.args
        .iter()
        .map(|spec| match spec {
            ArgSpec::Literal { value } => Ok(value.clone()),
            ArgSpec::Reference { unit: target } => {
                let deployed = registry.status(target) == Some(UnitStatus::Deployed);
                match registry.address(target) {
                    Some(address) if deployed => Ok(ArgValue::Address(*address)),
                    _ => Err(Error::OrderingInvariant {
                        unit: unit.name.clone(),
                        missing: target.clone(),
                    }),
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ArgSpec;
    use crate::plan::PlanBuilder;
    use wright_core::Address;

    fn addr(last: u8) -> Address {
        let mut bytes = [0u8; 20];
        bytes[19] = last;
        Address::from_bytes(bytes)
    }

    fn two_unit_plan() -> DeployPlan {
        PlanBuilder::new()
            .add_unit(UnitDescriptor::new("a"))
            .add_unit(UnitDescriptor::new("b").with_arg(ArgSpec::reference("a")))
            .build()
            .unwrap()
    }

    #[test]
    fn literals_pass_through_resolution() {
        let plan = PlanBuilder::new()
            .add_unit(UnitDescriptor::new("solo").with_arg(ArgSpec::literal(ArgValue::Uint(9))))
            .build()
            .unwrap();
        let registry = DeploymentRegistry::from_plan(&plan);

        let args = resolve_args(plan.unit("solo").unwrap(), &registry).unwrap();
        assert_eq!(args, vec![ArgValue::Uint(9)]);
    }

    #[test]
    fn references_resolve_to_deployed_addresses() {
        let plan = two_unit_plan();
        let mut registry = DeploymentRegistry::from_plan(&plan);
        registry.record_deployed("a", addr(7)).unwrap();

        let args = resolve_args(plan.unit("b").unwrap(), &registry).unwrap();
        assert_eq!(args, vec![ArgValue::Address(addr(7))]);
    }

    #[test]
    fn unresolved_reference_is_an_ordering_invariant_violation() {
        let plan = two_unit_plan();
        let registry = DeploymentRegistry::from_plan(&plan);

        let result = resolve_args(plan.unit("b").unwrap(), &registry);
        match result {
            Err(Error::OrderingInvariant { unit, missing }) => {
                assert_eq!(unit, "b");
                assert_eq!(missing, "a");
            }
            other => panic!("expected OrderingInvariant, got {other:?}"),
        }
    }
}
