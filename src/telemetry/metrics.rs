use std::collections::VecDeque;

use super::event::{DispatchOutcome, PersistenceEventKind, TelemetryEvent};
use crate::intent::classifier::{ClassificationSource, Fallback};
use crate::planner::types::PlannerAction;

#[derive(Debug, Clone, Default)]
pub struct TelemetrySnapshot {
    pub classification: ClassificationStats,
    pub decisions: DecisionStats,
    pub persistence: PersistenceStats,
    pub dispatch: DispatchStats,
    pub invariant_violations: u64,
}

#[derive(Debug, Clone, Default)]
pub struct ClassificationStats {
    pub total: u64,
    pub fast_path: u64,
    pub local: u64,
    pub remote: u64,
    pub unknown: u64,
    pub avg_latency_ms: f64,
    pub max_latency_ms: u64,
    pub fallbacks: FallbackStats,
}

/// Why turns stayed local, so "no data", parse failures and network failures can be told apart.
#[derive(Debug, Clone, Default)]
pub struct FallbackStats {
    pub not_configured: u64,
    pub network: u64,
    pub status: u64,
    pub timeout: u64,
    pub cancelled: u64,
    pub parse: u64,
    pub empty: u64,
    pub not_confident: u64,
}

#[derive(Debug, Clone, Default)]
pub struct DecisionStats {
    pub executed: u64,
    pub clarifications: u64,
    pub confirmations: u64,
    pub offers: u64,
    pub high_risk: u64,
}

#[derive(Debug, Clone, Default)]
pub struct PersistenceStats {
    pub restored: u64,
    pub started_empty: u64,
    pub load_failures: u64,
    pub save_failures: u64,
    pub clears: u64,
}

#[derive(Debug, Clone, Default)]
pub struct DispatchStats {
    pub succeeded: u64,
    pub failed: u64,
    pub declined: u64,
}

pub fn compute_snapshot(events: &VecDeque<TelemetryEvent>) -> TelemetrySnapshot {
    let mut snap = TelemetrySnapshot::default();
    let mut total_latency: u64 = 0;

    for event in events {
        match event {
            TelemetryEvent::Classified { intent, source, fallback, latency_ms } => {
                let stats = &mut snap.classification;
                stats.total += 1;
                total_latency += latency_ms;
                stats.max_latency_ms = stats.max_latency_ms.max(*latency_ms);
                match source {
                    ClassificationSource::FastPath => stats.fast_path += 1,
                    ClassificationSource::Local => stats.local += 1,
                    ClassificationSource::Remote => stats.remote += 1,
                }
                if *intent == crate::intent::types::Intent::Unknown {
                    stats.unknown += 1;
                }
                if let Some(reason) = fallback {
                    let f = &mut stats.fallbacks;
                    match reason {
                        Fallback::NotConfigured => f.not_configured += 1,
                        Fallback::Network => f.network += 1,
                        Fallback::Status(_) => f.status += 1,
                        Fallback::Timeout => f.timeout += 1,
                        Fallback::Cancelled => f.cancelled += 1,
                        Fallback::Parse => f.parse += 1,
                        Fallback::Empty => f.empty += 1,
                        Fallback::NotConfident => f.not_confident += 1,
                    }
                }
            }
            TelemetryEvent::Decision { action, risk } => {
                match action {
                    PlannerAction::ExecuteTool => snap.decisions.executed += 1,
                    PlannerAction::AskClarification => snap.decisions.clarifications += 1,
                    PlannerAction::ConfirmDestructive => snap.decisions.confirmations += 1,
                    PlannerAction::OfferToBuild => snap.decisions.offers += 1,
                }
                if risk.requires_confirmation() {
                    snap.decisions.high_risk += 1;
                }
            }
            TelemetryEvent::Persistence(kind) => match kind {
                PersistenceEventKind::Restored => snap.persistence.restored += 1,
                PersistenceEventKind::StartedEmpty => snap.persistence.started_empty += 1,
                PersistenceEventKind::LoadFailed => snap.persistence.load_failures += 1,
                PersistenceEventKind::SaveFailed => snap.persistence.save_failures += 1,
                PersistenceEventKind::Cleared => snap.persistence.clears += 1,
            },
            TelemetryEvent::Dispatch(outcome) => match outcome {
                DispatchOutcome::Succeeded => snap.dispatch.succeeded += 1,
                DispatchOutcome::Failed => snap.dispatch.failed += 1,
                DispatchOutcome::Declined => snap.dispatch.declined += 1,
            },
            TelemetryEvent::InvariantViolation => snap.invariant_violations += 1,
        }
    }

    if snap.classification.total > 0 {
        snap.classification.avg_latency_ms = total_latency as f64 / snap.classification.total as f64;
    }

    snap
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::types::Intent;
    use crate::planner::types::RiskLevel;

    #[test]
    fn test_snapshot_aggregates() {
        let events: VecDeque<TelemetryEvent> = vec![
            TelemetryEvent::Classified {
                intent: Intent::PlayMusic,
                source: ClassificationSource::FastPath,
                fallback: None,
                latency_ms: 2,
            },
            TelemetryEvent::Classified {
                intent: Intent::Unknown,
                source: ClassificationSource::Local,
                fallback: Some(Fallback::Timeout),
                latency_ms: 10,
            },
            TelemetryEvent::Decision { action: PlannerAction::ConfirmDestructive, risk: RiskLevel::Critical },
            TelemetryEvent::Persistence(PersistenceEventKind::SaveFailed),
            TelemetryEvent::InvariantViolation,
        ]
        .into();

        let snap = compute_snapshot(&events);
        assert_eq!(snap.classification.total, 2);
        assert_eq!(snap.classification.unknown, 1);
        assert_eq!(snap.classification.fallbacks.timeout, 1);
        assert_eq!(snap.classification.max_latency_ms, 10);
        assert!((snap.classification.avg_latency_ms - 6.0).abs() < f64::EPSILON);
        assert_eq!(snap.decisions.confirmations, 1);
        assert_eq!(snap.decisions.high_risk, 1);
        assert_eq!(snap.persistence.save_failures, 1);
        assert_eq!(snap.invariant_violations, 1);
    }

    #[test]
    fn test_empty_snapshot() {
        let snap = compute_snapshot(&VecDeque::new());
        assert_eq!(snap.classification.total, 0);
        assert_eq!(snap.classification.avg_latency_ms, 0.0);
    }
}
