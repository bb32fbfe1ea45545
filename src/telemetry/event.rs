use serde::{Deserialize, Serialize};

use crate::intent::classifier::{ClassificationSource, Fallback};
use crate::intent::types::Intent;
use crate::planner::types::{PlannerAction, RiskLevel};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TelemetryEvent {
    Classified {
        intent: Intent,
        source: ClassificationSource,
        fallback: Option<Fallback>,
        latency_ms: u64,
    },

    Decision {
        action: PlannerAction,
        risk: RiskLevel,
    },

    Persistence(PersistenceEventKind),

    Dispatch(DispatchOutcome),

    InvariantViolation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PersistenceEventKind {
    Restored,
    StartedEmpty,
    LoadFailed,
    SaveFailed,
    Cleared,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispatchOutcome {
    Succeeded,
    Failed,
    /// User answered "no" to a confirmation.
    Declined,
}
