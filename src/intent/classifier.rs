use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::entities::extract;
use super::normalize::normalize;
use super::patterns;
use super::remote;
use super::types::{Entities, Intent, IntentResult};
use crate::capability::CapabilityRegistry;
use crate::config::Config;
use crate::context::{ContextEntry, ContextStore};
use crate::services::credentials::CredentialProvider;
use crate::services::llm::{CompletionBackend, LlmClient, LlmError};

/// Where the final result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassificationSource {
    /// Local score cleared the threshold; no network call.
    FastPath,
    /// Local heuristics, after the remote step was skipped or rejected.
    Local,
    Remote,
}

/// Why the remote step did not produce the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fallback {
    NotConfigured,
    Network,
    Status(u16),
    Timeout,
    Cancelled,
    Parse,
    Empty,
    NotConfident,
}

impl From<&LlmError> for Fallback {
    fn from(e: &LlmError) -> Self {
        match e {
            LlmError::Network(_) => Fallback::Network,
            LlmError::Status { status, .. } => Fallback::Status(*status),
            LlmError::Decode(_) => Fallback::Parse,
            LlmError::Empty => Fallback::Empty,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Classification {
    pub result: IntentResult,
    pub source: ClassificationSource,
    pub fallback: Option<Fallback>,
    /// Input after normalization and reference resolution.
    pub resolved_text: String,
    /// The turn was remembered but the snapshot file could not be written.
    pub context_save_failed: bool,
}

/// Text to [`IntentResult`]: normalize, resolve references, score locally,
/// escalate to the remote classifier when local confidence is low.
///
/// Never fails. Every remote problem degrades to the local result.
pub struct IntentClassifier {
    registry: Arc<CapabilityRegistry>,
    remote: Option<Arc<dyn CompletionBackend>>,
    fast_path_threshold: f32,
    remote_timeout: Duration,
}

impl IntentClassifier {
    pub fn new(registry: Arc<CapabilityRegistry>, fast_path_threshold: f32, remote_timeout: Duration) -> Self {
        Self {
            registry,
            remote: None,
            fast_path_threshold,
            remote_timeout,
        }
    }

    /// Wires the HTTP client only when the provider has a key.
    pub fn from_config(config: &Config, registry: Arc<CapabilityRegistry>, credentials: &dyn CredentialProvider) -> Self {
        let classifier = Self::new(registry, config.fast_path_threshold, config.remote.timeout());
        match credentials.api_key() {
            Some(key) => classifier.with_remote(Arc::new(LlmClient::new(key, &config.remote))),
            None => {
                info!("no remote credential, classifying locally only");
                classifier
            }
        }
    }

    pub fn with_remote(mut self, backend: Arc<dyn CompletionBackend>) -> Self {
        self.remote = Some(backend);
        self
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Steps 1-3 without side effects. Returns the resolved text and the local result.
    pub fn classify_local(&self, text: &str, context: &ContextStore) -> (String, IntentResult) {
        let normalized = normalize(text);
        let resolved = context.resolve_reference(&normalized);
        let result = self.local_result(&resolved);
        (resolved, result)
    }

    pub async fn classify(&self, text: &str, context: &mut ContextStore, cancel: &CancellationToken) -> Classification {
        let (resolved, local) = self.classify_local(text, context);
        debug!(intent = local.intent.tag(), confidence = local.confidence, "local classification");

        let (result, source, fallback) = if local.confidence >= self.fast_path_threshold {
            (local, ClassificationSource::FastPath, None)
        } else {
            match self.classify_remote(text, &resolved, context, cancel).await {
                Ok(remote) if remote.confidence > local.confidence => (remote, ClassificationSource::Remote, None),
                Ok(_) => (local, ClassificationSource::Local, Some(Fallback::NotConfident)),
                Err(reason) => (local, ClassificationSource::Local, Some(reason)),
            }
        };

        let context_save_failed = match context.add_entry(self.entry_for(text, &result)) {
            Ok(()) => false,
            Err(e) => {
                warn!(error = %e, "could not persist context");
                true
            }
        };

        Classification {
            result,
            source,
            fallback,
            resolved_text: resolved,
            context_save_failed,
        }
    }

    async fn classify_remote(
        &self,
        original: &str,
        resolved: &str,
        context: &ContextStore,
        cancel: &CancellationToken,
    ) -> Result<IntentResult, Fallback> {
        let backend = self.remote.as_ref().ok_or(Fallback::NotConfigured)?;
        let prompt = remote::build_user_prompt(original, resolved, &context.context_summary());

        let text = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("remote classification cancelled");
                return Err(Fallback::Cancelled);
            }
            outcome = tokio::time::timeout(self.remote_timeout, backend.complete(remote::SYSTEM_PROMPT, &prompt)) => {
                match outcome {
                    Err(_) => {
                        warn!(timeout = ?self.remote_timeout, "remote classification timed out");
                        return Err(Fallback::Timeout);
                    }
                    Ok(Err(e)) => {
                        warn!(error = %e, "remote classification failed");
                        return Err(Fallback::from(&e));
                    }
                    Ok(Ok(text)) => text,
                }
            }
        };

        let mut result = remote::parse_response(&text).map_err(|e| {
            warn!(error = %e, "remote classification was not valid JSON");
            Fallback::Parse
        })?;

        // Local safety rules still apply to remote answers.
        if needs_confirmation(result.intent, &result.entities) && !result.needs_confirmation {
            result = IntentResult::new(
                result.intent,
                result.confidence,
                result.entities,
                result.inferred_goal,
                true,
                result.missing_capability,
            );
        }
        Ok(result)
    }

    fn local_result(&self, resolved: &str) -> IntentResult {
        // Substituted referents keep their stored case; patterns are lowercase.
        let best = patterns::score(&resolved.to_lowercase());
        if best.intent == Intent::Unknown {
            return IntentResult::unknown();
        }
        let entities = extract(best.intent, resolved).into_entities();
        let goal = inferred_goal(best.intent, &entities);
        let confirm = needs_confirmation(best.intent, &entities);
        let missing = self.missing_capability(best.intent);
        IntentResult::new(best.intent, best.confidence, entities, goal, confirm, missing)
    }

    fn missing_capability(&self, intent: Intent) -> Option<String> {
        match self.registry.get(intent) {
            Some(module) if module.implemented => None,
            Some(module) => Some(format!("{} is not available yet", module.description)),
            None => Some(format!("no capability registered for {}", intent)),
        }
    }

    fn entry_for(&self, text: &str, result: &IntentResult) -> ContextEntry {
        let mut entry = ContextEntry::new(text);
        if let Some(module) = self.registry.get(result.intent) {
            entry = entry.with_feature(module.category.as_str());
        }
        let entities = &result.entities;
        match result.intent {
            Intent::OpenFolder | Intent::ScanFolder => {
                if let Some(target) = entities.get("target") {
                    entry = entry.with_folder(target);
                }
            }
            Intent::FileOperation => {
                if let Some(target) = entities.get("target") {
                    entry = entry.with_file(target);
                }
                if let Some(dest) = entities.get("destination") {
                    entry = entry.with_folder(dest);
                }
            }
            Intent::WebSearch => {
                if let Some(query) = entities.get("query") {
                    entry = entry.with_search_query(query);
                }
            }
            Intent::PlayMusic => {
                if let Some(query) = entities.get("query") {
                    entry = entry.with_music_query(query);
                }
            }
            _ => {}
        }
        if let Some(app) = entities.get("app") {
            entry = entry.with_app(app);
        }
        entry.with_intent(result.clone())
    }
}

fn needs_confirmation(intent: Intent, entities: &Entities) -> bool {
    match (intent, entities.get("action")) {
        (Intent::PowerControl, Some("shutdown" | "restart")) => true,
        (Intent::FileOperation, Some("delete")) => true,
        _ => false,
    }
}

fn inferred_goal(intent: Intent, entities: &Entities) -> String {
    let subject = ["query", "app", "target", "action"]
        .iter()
        .find_map(|k| entities.get(k));
    let verb = match intent {
        Intent::PowerControl => "control power",
        Intent::VolumeControl => "adjust volume",
        Intent::MediaControl => "control playback",
        Intent::PlayMusic => "play music",
        Intent::Screenshot => "take a screenshot",
        Intent::OpenFolder => "open a folder",
        Intent::ScanFolder => "scan a folder",
        Intent::FileOperation => "manage files",
        Intent::CloseApp => "close an app",
        Intent::InstallApp => "install an app",
        Intent::OpenApp => "open an app",
        Intent::Weather => "check the weather",
        Intent::WebSearch => "search the web",
        Intent::SystemControl => "change a system setting",
        Intent::Reminder => "set a reminder",
        Intent::SendEmail => "send an email",
        Intent::CalendarEvent => "add a calendar event",
        Intent::Unknown => "unknown",
    };
    match subject {
        Some(s) => format!("{}: {}", verb, s),
        None => verb.to_string(),
    }
}
