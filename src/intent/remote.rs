//! Remote classification contract: prompt in, strict JSON out.

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

use super::types::{Entities, Intent, IntentResult};

pub const SYSTEM_PROMPT: &str = r#"You classify commands for a desktop assistant.
Reply with ONE JSON object and nothing else:
{
  "intent": "<one of: power_control, volume_control, media_control, play_music, screenshot, scan_folder, file_operation, open_folder, close_app, install_app, open_app, weather, web_search, system_control, reminder, send_email, calendar_event, unknown>",
  "entities": {"query": null, "app": null, "action": null, "target": null, "platform": null},
  "confidence": 0.0,
  "inferred_goal": "short description of what the user wants",
  "needs_confirmation": false,
  "missing_capability": null
}
Set needs_confirmation for anything destructive or that powers the machine off.
Use null for entities you cannot find. Confidence is between 0 and 1."#;

pub fn build_user_prompt(original: &str, normalized: &str, context_summary: &str) -> String {
    format!(
        "CONTEXT:\n{}\n\nORIGINAL INPUT:\n{}\n\nNORMALIZED INPUT:\n{}\n\nClassify this command as JSON:",
        context_summary, original, normalized
    )
}

/// Drops a surrounding ``` or ```json fence if there is one.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Skip the language tag line.
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

#[derive(Debug, Deserialize)]
struct RemoteClassification {
    intent: String,
    #[serde(default)]
    entities: HashMap<String, Value>,
    confidence: f32,
    #[serde(default)]
    inferred_goal: Option<String>,
    #[serde(default)]
    needs_confirmation: bool,
    #[serde(default)]
    missing_capability: Option<String>,
}

/// Parses a completion into an [`IntentResult`]. Any deviation from the contract is an error.
pub fn parse_response(text: &str) -> Result<IntentResult, serde_json::Error> {
    let raw: RemoteClassification = serde_json::from_str(strip_code_fences(text))?;

    // Remote entities stay an open map; only non-empty strings survive.
    let entities: Entities = raw
        .entities
        .iter()
        .filter_map(|(k, v)| v.as_str().map(|s| (k.as_str(), s.to_string())))
        .collect();

    Ok(IntentResult::new(
        Intent::from_tag(&raw.intent),
        raw.confidence,
        entities,
        raw.inferred_goal.unwrap_or_default(),
        raw.needs_confirmation,
        raw.missing_capability,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::types::{PlannedAction, MAX_CONFIDENCE};

    #[test]
    fn test_strip_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("  {}  "), "{}");
    }

    #[test]
    fn test_parse_full_response() {
        let text = r#"```json
{"intent": "play_music", "entities": {"query": "jazz", "app": null, "platform": ""}, "confidence": 0.99,
 "inferred_goal": "listen to jazz", "needs_confirmation": false, "missing_capability": null}
```"#;
        let result = parse_response(text).unwrap();
        assert_eq!(result.intent, Intent::PlayMusic);
        assert_eq!(result.entities.get("query"), Some("jazz"));
        assert_eq!(result.entities.len(), 1);
        assert_eq!(result.confidence, MAX_CONFIDENCE);
        assert_eq!(result.planned_action, PlannedAction::Execute);
    }

    #[test]
    fn test_parse_rejects_prose() {
        assert!(parse_response("Sure! The intent is play_music.").is_err());
        assert!(parse_response(r#"{"entities": {}}"#).is_err(), "intent and confidence are required");
    }

    #[test]
    fn test_unknown_tag_maps_to_unknown() {
        let result = parse_response(r#"{"intent": "order_pizza", "confidence": 0.9}"#).unwrap();
        assert_eq!(result.intent, Intent::Unknown);
    }
}
