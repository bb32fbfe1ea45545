use std::sync::Mutex as StdMutex;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::context::{ContextError, ContextStore};
use crate::intent::classifier::{Classification, IntentClassifier};
use crate::planner::{Planner, PlannerAction, PlannerDecision, PlannerError};
use crate::services::credentials::CredentialProvider;
use crate::services::dispatch::ToolDispatcher;
use crate::telemetry::{DispatchOutcome, PersistenceEventKind, TelemetryEvent, TelemetryRecorder, TelemetrySnapshot};

#[derive(Debug, Error)]
pub enum SessionError {
    /// The turn failed; context memory may already hold this turn's entry.
    #[error("planner produced an invalid decision: {0}")]
    Invariant(#[from] PlannerError),
    #[error("{0:?} decisions cannot be dispatched without confirmation")]
    NotDispatchable(PlannerAction),
}

/// Result of one Classify-then-Plan turn.
#[derive(Debug, Clone)]
pub struct Turn {
    pub classification: Classification,
    pub decision: PlannerDecision,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    pub tool: String,
    pub succeeded: bool,
    pub outcome: String,
}

/// One conversation. Owns its context memory; turns are serialized on it.
pub struct Session {
    id: Uuid,
    context: Mutex<ContextStore>,
    classifier: IntentClassifier,
    planner: Planner,
    telemetry: StdMutex<TelemetryRecorder>,
}

impl Session {
    pub fn new(context: ContextStore, classifier: IntentClassifier, planner: Planner) -> Self {
        Self {
            id: Uuid::new_v4(),
            context: Mutex::new(context),
            classifier,
            planner,
            telemetry: StdMutex::new(TelemetryRecorder::new()),
        }
    }

    /// Loads context from `config.context_path` (soft-fail) and wires the classifier.
    pub fn from_config(config: &Config, credentials: &dyn CredentialProvider) -> Self {
        let planner = Planner::new();
        let classifier = IntentClassifier::from_config(config, planner.registry(), credentials);

        let (context, load_event) = match ContextStore::load(&config.context_path, config.history_capacity, config.persisted_history) {
            Ok(store) => (store, PersistenceEventKind::Restored),
            Err(ContextError::NoData(_)) => (
                ContextStore::new(&config.context_path, config.history_capacity, config.persisted_history),
                PersistenceEventKind::StartedEmpty,
            ),
            Err(e) => {
                warn!(error = %e, "context load failed, starting fresh");
                (
                    ContextStore::new(&config.context_path, config.history_capacity, config.persisted_history),
                    PersistenceEventKind::LoadFailed,
                )
            }
        };

        let session = Self::new(context, classifier, planner);
        session.record(TelemetryEvent::Persistence(load_event));
        info!(session = %session.id, remote = session.classifier.has_remote(), "session started");
        session
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Classifies and plans one message. The context lock is held for the whole turn.
    pub async fn handle(&self, text: &str, cancel: &CancellationToken) -> Result<Turn, SessionError> {
        let mut context = self.context.lock().await;
        let started = Instant::now();

        let classification = self.classifier.classify(text, &mut context, cancel).await;
        self.record(TelemetryEvent::Classified {
            intent: classification.result.intent,
            source: classification.source,
            fallback: classification.fallback,
            latency_ms: started.elapsed().as_millis() as u64,
        });
        if classification.context_save_failed {
            self.record(TelemetryEvent::Persistence(PersistenceEventKind::SaveFailed));
        }

        let decision = self.planner.plan(&classification.result, &context);
        if let Err(e) = decision.validate(&classification.result, &self.planner.registry()) {
            self.record(TelemetryEvent::InvariantViolation);
            return Err(SessionError::Invariant(e));
        }
        self.record(TelemetryEvent::Decision { action: decision.action, risk: decision.risk });

        Ok(Turn { classification, decision })
    }

    /// Hands a decision to the dispatcher and remembers the outcome.
    ///
    /// `ConfirmDestructive` decisions need `confirmed = true`; clarifications
    /// and build offers are never dispatchable.
    pub async fn execute(
        &self,
        decision: &PlannerDecision,
        dispatcher: &dyn ToolDispatcher,
        confirmed: bool,
    ) -> Result<DispatchReport, SessionError> {
        let allowed = match decision.action {
            PlannerAction::ExecuteTool => true,
            PlannerAction::ConfirmDestructive => confirmed,
            _ => false,
        };
        let tool = match (&decision.tool, allowed) {
            (Some(tool), true) => tool.clone(),
            _ => return Err(SessionError::NotDispatchable(decision.action)),
        };

        let report = match dispatcher.dispatch(&tool, &decision.parameters).await {
            Ok(outcome) => {
                self.record(TelemetryEvent::Dispatch(DispatchOutcome::Succeeded));
                DispatchReport { tool, succeeded: true, outcome }
            }
            Err(e) => {
                warn!(tool = %tool, error = %e, "dispatch failed");
                self.record(TelemetryEvent::Dispatch(DispatchOutcome::Failed));
                let outcome = format!("{} failed: {}", tool, e);
                DispatchReport { tool, succeeded: false, outcome }
            }
        };
        self.record_outcome(&report.outcome).await;
        Ok(report)
    }

    /// The user said no to a confirmation.
    pub async fn decline(&self, decision: &PlannerDecision) {
        self.record(TelemetryEvent::Dispatch(DispatchOutcome::Declined));
        let tool = decision.tool.as_deref().unwrap_or("action");
        self.record_outcome(&format!("{} declined by user", tool)).await;
    }

    pub async fn record_outcome(&self, outcome: &str) {
        let mut context = self.context.lock().await;
        if let Err(e) = context.update_last_outcome(outcome) {
            warn!(error = %e, "could not persist outcome");
            self.record(TelemetryEvent::Persistence(PersistenceEventKind::SaveFailed));
        }
    }

    pub async fn clear_context(&self) {
        let mut context = self.context.lock().await;
        match context.clear() {
            Ok(()) => self.record(TelemetryEvent::Persistence(PersistenceEventKind::Cleared)),
            Err(e) => {
                warn!(error = %e, "could not persist cleared context");
                self.record(TelemetryEvent::Persistence(PersistenceEventKind::SaveFailed));
            }
        }
    }

    /// Read access to context memory under the session lock.
    pub async fn with_context<R>(&self, f: impl FnOnce(&ContextStore) -> R) -> R {
        let context = self.context.lock().await;
        f(&context)
    }

    pub fn telemetry(&self) -> TelemetrySnapshot {
        self.telemetry
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .snapshot()
    }

    fn record(&self, event: TelemetryEvent) {
        self.telemetry
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .record(event);
    }
}
