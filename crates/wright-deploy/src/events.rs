//! Progress events emitted during a run.
//!
//! The executor pushes one event per lifecycle step into an [`EventSink`].
//! Sinks are observation only: they cannot alter the orchestration outcome,
//! and a slow or broken sink must not change what gets deployed.

use serde::{Deserialize, Serialize};

use wright_core::{Address, RunId};

use crate::run::RunState;

/// A progress notification from the executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DeployEvent {
    /// The run moved to `Running`.
    #[serde(rename_all = "camelCase")]
    RunStarted {
        /// The run that started.
        run_id: RunId,
        /// The plan being executed.
        plan_id: String,
        /// How many units the plan contains.
        unit_count: usize,
    },
    /// A unit deployed successfully.
    #[serde(rename_all = "camelCase")]
    UnitDeployed {
        /// The run this belongs to.
        run_id: RunId,
        /// The deployed unit.
        unit: String,
        /// Its address.
        address: Address,
    },
    /// A unit's deploy call failed.
    #[serde(rename_all = "camelCase")]
    UnitFailed {
        /// The run this belongs to.
        run_id: RunId,
        /// The failed unit.
        unit: String,
        /// Human-readable cause.
        message: String,
    },
    /// The run reached a terminal state.
    #[serde(rename_all = "camelCase")]
    RunCompleted {
        /// The run that completed.
        run_id: RunId,
        /// The terminal state.
        state: RunState,
    },
}

impl DeployEvent {
    /// Returns the unit name this event concerns, if any.
    #[must_use]
    pub fn unit(&self) -> Option<&str> {
        match self {
            Self::UnitDeployed { unit, .. } | Self::UnitFailed { unit, .. } => Some(unit),
            Self::RunStarted { .. } | Self::RunCompleted { .. } => None,
        }
    }
}

/// A sink for progress events.
pub trait EventSink {
    /// Records an event.
    fn push(&mut self, event: DeployEvent);
}

/// In-memory sink for collecting events in tests and embedders.
#[derive(Debug, Default)]
pub struct InMemorySink {
    events: Vec<DeployEvent>,
}

impl InMemorySink {
    /// Creates a new empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected events in emission order.
    #[must_use]
    pub fn events(&self) -> &[DeployEvent] {
        &self.events
    }

    /// Drains the sink, returning all events in emission order.
    pub fn drain(&mut self) -> Vec<DeployEvent> {
        std::mem::take(&mut self.events)
    }
}

impl EventSink for InMemorySink {
    fn push(&mut self, event: DeployEvent) {
        self.events.push(event);
    }
}

/// Sink that forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn push(&mut self, event: DeployEvent) {
        match &event {
            DeployEvent::RunStarted {
                run_id,
                plan_id,
                unit_count,
            } => {
                tracing::info!(run_id = %run_id, plan_id = %plan_id, unit_count, "run started");
            }
            DeployEvent::UnitDeployed {
                run_id,
                unit,
                address,
            } => {
                tracing::info!(run_id = %run_id, unit = %unit, address = %address, "unit deployed");
            }
            DeployEvent::UnitFailed {
                run_id,
                unit,
                message,
            } => {
                tracing::error!(run_id = %run_id, unit = %unit, cause = %message, "unit failed");
            }
            DeployEvent::RunCompleted { run_id, state } => {
                tracing::info!(run_id = %run_id, state = %state, "run completed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr() -> Address {
        let mut bytes = [0u8; 20];
        bytes[19] = 1;
        Address::from_bytes(bytes)
    }

    #[test]
    fn in_memory_sink_keeps_emission_order() {
        let run_id = RunId::generate();
        let mut sink = InMemorySink::new();
        sink.push(DeployEvent::RunStarted {
            run_id,
            plan_id: "plan".into(),
            unit_count: 1,
        });
        sink.push(DeployEvent::UnitDeployed {
            run_id,
            unit: "a".into(),
            address: addr(),
        });

        assert_eq!(sink.events().len(), 2);
        let drained = sink.drain();
        assert_eq!(drained.len(), 2);
        assert!(sink.events().is_empty());
    }

    #[test]
    fn unit_accessor_covers_unit_events_only() {
        let run_id = RunId::generate();
        let deployed = DeployEvent::UnitDeployed {
            run_id,
            unit: "a".into(),
            address: addr(),
        };
        let completed = DeployEvent::RunCompleted {
            run_id,
            state: RunState::Succeeded,
        };
        assert_eq!(deployed.unit(), Some("a"));
        assert_eq!(completed.unit(), None);
    }

    #[test]
    fn event_serde_tags_by_type() {
        let event = DeployEvent::UnitFailed {
            run_id: RunId::generate(),
            unit: "DTFactory".into(),
            message: "reverted".into(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"unitFailed\""));
        let back: DeployEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
