use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

use super::risk::risk_for;
use super::tables::{clarification_for, generic_clarification, guidance_for, required_parameters, tool_for};
use super::types::{PlannerAction, PlannerDecision, RiskLevel};
use crate::capability::CapabilityRegistry;
use crate::context::ContextStore;
use crate::intent::types::{Intent, IntentResult};

const MIN_CONFIDENCE: f32 = 0.5;

/// Turns an [`IntentResult`] into a gated decision. Holds no per-call state.
pub struct Planner {
    registry: Arc<CapabilityRegistry>,
}

impl Planner {
    /// Builds the capability registry. It is read-only from here on.
    pub fn new() -> Self {
        Self::with_registry(CapabilityRegistry::builtin())
    }

    pub fn with_registry(registry: CapabilityRegistry) -> Self {
        Self { registry: Arc::new(registry) }
    }

    /// Shared handle for the classifier.
    pub fn registry(&self) -> Arc<CapabilityRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn plan(&self, result: &IntentResult, context: &ContextStore) -> PlannerDecision {
        let intent = result.intent;
        let risk = risk_for(intent, result.entities.get("action"));
        let implemented = self.registry.is_implemented(intent);

        // The confirmation gate runs before the confidence check: a recognised
        // destructive command is confirmed, never guessed at or re-asked.
        if intent != Intent::Unknown && implemented && (result.needs_confirmation || risk.requires_confirmation()) {
            return self.confirm(result, risk, context);
        }

        // An unimplemented intent always gets the build offer, whatever its confidence.
        if intent != Intent::Unknown && !implemented {
            return self.offer_to_build(result, risk);
        }

        if result.confidence < MIN_CONFIDENCE || intent == Intent::Unknown {
            let question = match clarification_for(intent) {
                Some(q) if intent != Intent::Unknown => q.to_string(),
                _ => generic_clarification(context.last_active_feature()),
            };
            let mut decision = PlannerDecision::new(
                intent,
                PlannerAction::AskClarification,
                risk,
                format!("confidence {:.2} is too low to act on {}", result.confidence, intent),
            );
            decision.clarification = Some(question);
            return decision;
        }

        let missing = missing_parameters(intent, result, context);
        if !missing.is_empty() {
            let question = clarification_for(intent)
                .map(str::to_string)
                .unwrap_or_else(|| format!("I need a bit more detail: {}.", missing.join(", ")));
            let mut decision = PlannerDecision::new(
                intent,
                PlannerAction::AskClarification,
                risk,
                format!("{} is missing {}", intent, missing.join(", ")),
            );
            decision.clarification = Some(question);
            return decision;
        }

        let mut decision = PlannerDecision::new(
            intent,
            PlannerAction::ExecuteTool,
            risk,
            format!("{} at {:?} risk with confidence {:.2}", intent, risk, result.confidence),
        );
        decision.tool = tool_for(intent).map(str::to_string);
        decision.parameters = parameters(intent, result, context);
        debug!(intent = intent.tag(), tool = ?decision.tool, "execute");
        decision
    }

    fn confirm(&self, result: &IntentResult, risk: RiskLevel, context: &ContextStore) -> PlannerDecision {
        let intent = result.intent;
        let reason = if result.needs_confirmation {
            "flagged as destructive"
        } else {
            "risk requires explicit confirmation"
        };
        let mut decision = PlannerDecision::new(
            intent,
            PlannerAction::ConfirmDestructive,
            risk,
            format!("{} at {:?} risk, {}", intent, risk, reason),
        );
        decision.tool = tool_for(intent).map(str::to_string);
        decision.parameters = parameters(intent, result, context);
        decision
    }

    fn offer_to_build(&self, result: &IntentResult, risk: RiskLevel) -> PlannerDecision {
        let intent = result.intent;
        let (fallback, steps) = guidance_for(intent);
        let plan = self
            .registry
            .get(intent)
            .and_then(|m| m.build_plan.clone())
            .or_else(|| result.missing_capability.clone())
            .unwrap_or_else(|| format!("no module registered for {}", intent));

        let mut decision = PlannerDecision::new(
            intent,
            PlannerAction::OfferToBuild,
            risk,
            format!("{} is not implemented; build plan: {}", intent, plan),
        );
        decision.fallback_path = Some(fallback.to_string());
        decision.guidance_steps = steps.iter().map(|s| s.to_string()).collect();
        decision
    }
}

impl Default for Planner {
    fn default() -> Self {
        Self::new()
    }
}

/// Required slots neither present in the entities nor fillable from context.
fn missing_parameters(intent: Intent, result: &IntentResult, context: &ContextStore) -> Vec<&'static str> {
    required_parameters(intent)
        .iter()
        .copied()
        .filter(|key| !result.entities.contains(key))
        .filter(|key| context_default(intent, key, context).is_none())
        .collect()
}

/// Context value that may stand in for a missing slot, with the parameter name it is sent under.
fn context_default<'a>(intent: Intent, key: &str, context: &'a ContextStore) -> Option<(&'static str, &'a str)> {
    match (intent, key) {
        (Intent::OpenFolder | Intent::ScanFolder, "target") => {
            context.last_referenced_folder().map(|f| ("contextFolder", f))
        }
        (Intent::OpenApp | Intent::CloseApp | Intent::InstallApp, "app") => {
            context.last_referenced_app().map(|a| ("contextApp", a))
        }
        _ => None,
    }
}

fn parameters(intent: Intent, result: &IntentResult, context: &ContextStore) -> Map<String, Value> {
    let mut params: Map<String, Value> = result
        .entities
        .iter()
        .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
        .collect();

    for key in ["target", "app"] {
        if result.entities.contains(key) {
            continue;
        }
        if let Some((name, value)) = context_default(intent, key, context) {
            params.insert(name.to_string(), Value::String(value.to_string()));
        }
    }
    params
}
