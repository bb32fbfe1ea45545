use serde::{Deserialize, Serialize};
use crate::intent::types::Intent;

/// Broad grouping used for the "active feature" tag in context memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityCategory {
    Media,
    Apps,
    Files,
    Web,
    System,
    Productivity,
}

impl CapabilityCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            CapabilityCategory::Media => "media",
            CapabilityCategory::Apps => "apps",
            CapabilityCategory::Files => "files",
            CapabilityCategory::Web => "web",
            CapabilityCategory::System => "system",
            CapabilityCategory::Productivity => "productivity",
        }
    }
}

/// A named automation. Unimplemented modules carry the plan for building them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityModule {
    pub intent: Intent,
    pub category: CapabilityCategory,
    pub description: String,
    pub implemented: bool,
    pub build_plan: Option<String>,
}

impl CapabilityModule {
    pub fn implemented(intent: Intent, category: CapabilityCategory, description: &str) -> Self {
        Self {
            intent,
            category,
            description: description.to_string(),
            implemented: true,
            build_plan: None,
        }
    }

    pub fn planned(intent: Intent, category: CapabilityCategory, description: &str, build_plan: &str) -> Self {
        Self {
            intent,
            category,
            description: description.to_string(),
            implemented: false,
            build_plan: Some(build_plan.to_string()),
        }
    }
}
