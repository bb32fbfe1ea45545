//! Anaphora resolution and the context digest handed to the remote classifier.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::store::ContextStore;
use crate::intent::types::Intent;

static FILE_REF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:the\s+)?(?:same|that)\s+file\b").expect("file reference pattern is valid")
});

static APP_REF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:the\s+)?(?:same|that)\s+(?:app|application|program)\b").expect("app reference pattern is valid")
});

static FOLDER_REF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:(?:the\s+)?(?:same|that)\s+(?:folder|directory|location)|(in|to|from|into|open|go|put|save|send|drop|it|them)\s+there)\b")
        .expect("folder reference pattern is valid")
});

static AGAIN_REF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:again|repeat)\b").expect("repeat pattern is valid")
});

static PRONOUN_REF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:(open|play|close|do|launch|start|run|search|find|delete|remove|show|scan|move|rename|copy|install|quit|kill)\s+(?:it|that|this)(\s+(?:folder|directory|location|file|app|application|program))?|the\s+same\s+one)\b",
    )
    .expect("pronoun pattern is valid")
});

impl ContextStore {
    /// Replaces deictic phrases with what they point at.
    ///
    /// Each phrase family is applied once, specific families first. A phrase
    /// with nothing to point at is left as written, so text without any of
    /// these phrases comes back unchanged.
    pub fn resolve_reference(&self, text: &str) -> String {
        let state = &self.state;
        let mut resolved = text.to_string();

        if let Some(file) = &state.last_referenced_file {
            resolved = FILE_REF.replace_all(&resolved, regex::NoExpand(file.as_str())).into_owned();
        }
        if let Some(app) = &state.last_referenced_app {
            resolved = APP_REF.replace_all(&resolved, regex::NoExpand(app.as_str())).into_owned();
        }
        if let Some(folder) = &state.last_referenced_folder {
            resolved = FOLDER_REF
                .replace_all(&resolved, |caps: &Captures| match caps.get(1).map(|m| m.as_str()) {
                    // "put it there" places the object in the folder
                    Some(object) if object.eq_ignore_ascii_case("it") || object.eq_ignore_ascii_case("them") => {
                        format!("{} in {}", object, folder)
                    }
                    Some(word) => format!("{} {}", word, folder),
                    None => folder.clone(),
                })
                .into_owned();
        }
        if AGAIN_REF.is_match(&resolved) {
            if let Some(repeated) = self.repeat_last_command() {
                resolved = repeated;
            }
        }
        if let Some(entity) = self.last_referenced_entity() {
            resolved = PRONOUN_REF
                .replace_all(&resolved, |caps: &Captures| {
                    // "open that folder" with no known folder stays as written
                    if caps.get(2).is_some() {
                        return caps[0].to_string();
                    }
                    match caps.get(1) {
                        Some(verb) => format!("{} {}", verb.as_str(), entity),
                        None => entity.clone(),
                    }
                })
                .into_owned();
        }

        resolved
    }

    /// `"<intent> <entity>"` rebuilt from the last classified turn.
    ///
    /// Plain text concatenation of the intent tag and the entity.
    fn repeat_last_command(&self) -> Option<String> {
        let intent = self
            .entries()
            .rev()
            .filter_map(|e| e.intent_result.as_ref())
            .map(|r| r.intent)
            .find(|i| *i != Intent::Unknown)?;
        let verb = intent.tag().to_string();
        Some(match self.last_referenced_entity() {
            Some(entity) => format!("{} {}", verb, entity),
            None => verb,
        })
    }

    /// Latest turn's `query`, `app`, `target` first, then the scalar fields
    /// file, folder, app, music query, search query.
    pub fn last_referenced_entity(&self) -> Option<String> {
        let from_turn = self.last_entry().and_then(|entry| {
            let entities = &entry.intent_result.as_ref()?.entities;
            ["query", "app", "target"]
                .iter()
                .find_map(|key| entities.get(key).map(str::to_string))
        });
        if from_turn.is_some() {
            return from_turn;
        }

        let state = &self.state;
        [
            &state.last_referenced_file,
            &state.last_referenced_folder,
            &state.last_referenced_app,
            &state.last_music_query,
            &state.last_search_query,
        ]
        .into_iter()
        .find_map(|v| v.clone())
    }

    pub fn context_summary(&self) -> String {
        let state = &self.state;
        let mut lines = Vec::new();
        let fields = [
            ("Active feature", &state.last_active_feature),
            ("Last file", &state.last_referenced_file),
            ("Last folder", &state.last_referenced_folder),
            ("Last app", &state.last_referenced_app),
            ("Last music", &state.last_music_query),
            ("Last outcome", &state.last_action_outcome),
        ];
        for (label, value) in fields {
            if let Some(v) = value {
                lines.push(format!("{}: {}", label, v));
            }
        }

        let recent: Vec<&str> = self
            .entries()
            .rev()
            .take(3)
            .map(|e| e.user_input.as_str())
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        if !recent.is_empty() {
            lines.push(format!("Recent inputs: {}", recent.join(" | ")));
        }

        if lines.is_empty() {
            "No prior context.".to_string()
        } else {
            lines.join("\n")
        }
    }

    pub fn last_active_feature(&self) -> Option<&str> {
        self.state.last_active_feature.as_deref()
    }

    pub fn last_referenced_folder(&self) -> Option<&str> {
        self.state.last_referenced_folder.as_deref()
    }

    pub fn last_referenced_app(&self) -> Option<&str> {
        self.state.last_referenced_app.as_deref()
    }
}
