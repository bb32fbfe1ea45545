use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Confidence never leaves this range, local or remote.
pub const MAX_CONFIDENCE: f32 = 0.95;

/// Closed vocabulary of user goals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    PowerControl,
    VolumeControl,
    MediaControl,
    PlayMusic,
    Screenshot,
    ScanFolder,
    FileOperation,
    OpenFolder,
    CloseApp,
    InstallApp,
    OpenApp,
    Weather,
    WebSearch,
    SystemControl,
    Reminder,
    SendEmail,
    CalendarEvent,
    #[default]
    Unknown,
}

impl Intent {
    /// Every classifiable intent in registration order. Local scoring breaks ties by this order.
    pub const ALL: [Intent; 17] = [
        Intent::PowerControl,
        Intent::VolumeControl,
        Intent::MediaControl,
        Intent::PlayMusic,
        Intent::Screenshot,
        Intent::ScanFolder,
        Intent::FileOperation,
        Intent::OpenFolder,
        Intent::CloseApp,
        Intent::InstallApp,
        Intent::OpenApp,
        Intent::Weather,
        Intent::WebSearch,
        Intent::SystemControl,
        Intent::Reminder,
        Intent::SendEmail,
        Intent::CalendarEvent,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            Intent::PowerControl => "power_control",
            Intent::VolumeControl => "volume_control",
            Intent::MediaControl => "media_control",
            Intent::PlayMusic => "play_music",
            Intent::Screenshot => "screenshot",
            Intent::OpenFolder => "open_folder",
            Intent::ScanFolder => "scan_folder",
            Intent::FileOperation => "file_operation",
            Intent::CloseApp => "close_app",
            Intent::InstallApp => "install_app",
            Intent::OpenApp => "open_app",
            Intent::WebSearch => "web_search",
            Intent::Weather => "weather",
            Intent::SystemControl => "system_control",
            Intent::Reminder => "reminder",
            Intent::SendEmail => "send_email",
            Intent::CalendarEvent => "calendar_event",
            Intent::Unknown => "unknown",
        }
    }

    /// Lenient parse for tags coming from outside (remote classifier, old snapshots).
    pub fn from_tag(tag: &str) -> Intent {
        let tag = tag.trim().to_lowercase();
        Intent::ALL
            .iter()
            .copied()
            .find(|i| i.tag() == tag)
            .unwrap_or(Intent::Unknown)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// What the classifier thinks should happen next. The planner makes the real call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlannedAction {
    Execute,
    #[default]
    Clarify,
    Confirm,
    Guide,
}

impl PlannedAction {
    pub fn derive(confidence: f32, needs_confirmation: bool, missing_capability: Option<&str>) -> Self {
        if needs_confirmation {
            PlannedAction::Confirm
        } else if missing_capability.is_some() {
            PlannedAction::Guide
        } else if confidence < 0.5 {
            PlannedAction::Clarify
        } else if confidence >= 0.7 {
            PlannedAction::Execute
        } else {
            PlannedAction::Guide
        }
    }
}

/// Named slot values. Empty values are never stored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entities(BTreeMap<String, String>);

impl Entities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return;
        }
        self.0.insert(key.to_string(), trimmed.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for Entities {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut entities = Entities::new();
        for (k, v) in iter {
            entities.insert(k.as_ref(), v);
        }
        entities
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentResult {
    pub intent: Intent,
    pub confidence: f32,
    pub entities: Entities,
    pub inferred_goal: String,
    pub needs_confirmation: bool,
    pub planned_action: PlannedAction,
    pub missing_capability: Option<String>,
}

impl IntentResult {
    /// Builds a result and derives `planned_action`. Confidence is clamped.
    pub fn new(
        intent: Intent,
        confidence: f32,
        entities: Entities,
        inferred_goal: String,
        needs_confirmation: bool,
        missing_capability: Option<String>,
    ) -> Self {
        let confidence = clamp_confidence(confidence);
        let missing_capability = missing_capability.filter(|m| !m.trim().is_empty());
        let planned_action = PlannedAction::derive(confidence, needs_confirmation, missing_capability.as_deref());
        Self {
            intent,
            confidence,
            entities,
            inferred_goal,
            needs_confirmation,
            planned_action,
            missing_capability,
        }
    }

    pub fn unknown() -> Self {
        Self::new(Intent::Unknown, 0.0, Entities::new(), String::new(), false, None)
    }
}

impl Default for IntentResult {
    fn default() -> Self {
        Self::unknown()
    }
}

pub fn clamp_confidence(confidence: f32) -> f32 {
    if confidence.is_nan() {
        return 0.0;
    }
    confidence.clamp(0.0, MAX_CONFIDENCE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planned_action_order() {
        assert_eq!(PlannedAction::derive(0.9, true, Some("x")), PlannedAction::Confirm);
        assert_eq!(PlannedAction::derive(0.9, false, Some("x")), PlannedAction::Guide);
        assert_eq!(PlannedAction::derive(0.3, false, None), PlannedAction::Clarify);
        assert_eq!(PlannedAction::derive(0.7, false, None), PlannedAction::Execute);
        assert_eq!(PlannedAction::derive(0.6, false, None), PlannedAction::Guide);
    }

    #[test]
    fn test_entities_drop_empty() {
        let mut entities = Entities::new();
        entities.insert("query", "   ");
        entities.insert("app", "spotify");
        assert_eq!(entities.len(), 1);
        assert_eq!(entities.get("app"), Some("spotify"));
    }

    #[test]
    fn test_tag_round_trip() {
        for intent in Intent::ALL {
            assert_eq!(Intent::from_tag(intent.tag()), intent);
        }
        assert_eq!(Intent::from_tag("make_coffee"), Intent::Unknown);
        let json = serde_json::to_string(&Intent::PlayMusic).unwrap();
        assert_eq!(json, "\"play_music\"");
    }

    #[test]
    fn test_confidence_clamped() {
        let result = IntentResult::new(Intent::Weather, 3.0, Entities::new(), String::new(), false, None);
        assert_eq!(result.confidence, MAX_CONFIDENCE);
        assert_eq!(clamp_confidence(-1.0), 0.0);
        assert_eq!(clamp_confidence(f32::NAN), 0.0);
    }
}
