use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::capability::CapabilityRegistry;
use crate::intent::types::{Intent, IntentResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlannerAction {
    ExecuteTool,
    AskClarification,
    ConfirmDestructive,
    OfferToBuild,
}

/// Ordered: `None < Low < Medium < High < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn requires_confirmation(&self) -> bool {
        *self >= RiskLevel::High
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerDecision {
    pub intent: Intent,
    pub action: PlannerAction,
    pub risk: RiskLevel,
    pub tool: Option<String>,
    pub parameters: Map<String, Value>,
    pub clarification: Option<String>,
    pub reasoning: String,
    pub guidance_steps: Vec<String>,
    pub fallback_path: Option<String>,
}

impl PlannerDecision {
    pub(crate) fn new(intent: Intent, action: PlannerAction, risk: RiskLevel, reasoning: String) -> Self {
        Self {
            intent,
            action,
            risk,
            tool: None,
            parameters: Map::new(),
            clarification: None,
            reasoning,
            guidance_steps: Vec::new(),
            fallback_path: None,
        }
    }

    /// Checks the gating invariants against the result the decision was made from.
    pub fn validate(&self, result: &IntentResult, registry: &CapabilityRegistry) -> Result<(), PlannerError> {
        match self.action {
            PlannerAction::ExecuteTool => {
                if result.needs_confirmation || self.risk.requires_confirmation() {
                    return Err(PlannerError::UngatedExecution { intent: self.intent, risk: self.risk });
                }
                if self.tool.is_none() {
                    return Err(PlannerError::MissingTool(self.intent));
                }
            }
            PlannerAction::ConfirmDestructive => {
                if self.tool.is_none() {
                    return Err(PlannerError::MissingTool(self.intent));
                }
            }
            PlannerAction::OfferToBuild => {
                if registry.is_implemented(self.intent) {
                    return Err(PlannerError::OfferForImplemented(self.intent));
                }
            }
            PlannerAction::AskClarification => {
                if self.clarification.as_deref().map_or(true, |q| q.trim().is_empty()) {
                    return Err(PlannerError::EmptyQuestion(self.intent));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlannerError {
    #[error("{intent} would execute at {risk:?} risk without confirmation")]
    UngatedExecution { intent: Intent, risk: RiskLevel },
    #[error("{0} decision carries no tool")]
    MissingTool(Intent),
    #[error("offered to build {0}, which is already implemented")]
    OfferForImplemented(Intent),
    #[error("clarification for {0} has no question")]
    EmptyQuestion(Intent),
}
