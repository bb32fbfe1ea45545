use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::intent::types::IntentResult;

/// One turn. Only `last_outcome` may change after the entry is appended.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContextEntry {
    pub timestamp_ms: u64,
    pub user_input: String,
    #[serde(default)]
    pub active_feature: Option<String>,
    /// Most recent last.
    #[serde(default)]
    pub referenced_files: Vec<String>,
    #[serde(default)]
    pub referenced_folders: Vec<String>,
    #[serde(default)]
    pub referenced_apps: Vec<String>,
    #[serde(default)]
    pub search_query: Option<String>,
    #[serde(default)]
    pub music_query: Option<String>,
    #[serde(default)]
    pub scan_result: Option<String>,
    #[serde(default)]
    pub last_outcome: Option<String>,
    #[serde(default)]
    pub intent_result: Option<IntentResult>,
}

impl ContextEntry {
    pub fn new(user_input: impl Into<String>) -> Self {
        Self {
            timestamp_ms: now_ms(),
            user_input: user_input.into(),
            ..Default::default()
        }
    }

    pub fn with_feature(mut self, feature: impl Into<String>) -> Self {
        self.active_feature = Some(feature.into());
        self
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.referenced_files.push(file.into());
        self
    }

    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        self.referenced_folders.push(folder.into());
        self
    }

    pub fn with_app(mut self, app: impl Into<String>) -> Self {
        self.referenced_apps.push(app.into());
        self
    }

    pub fn with_search_query(mut self, query: impl Into<String>) -> Self {
        self.search_query = Some(query.into());
        self
    }

    pub fn with_music_query(mut self, query: impl Into<String>) -> Self {
        self.music_query = Some(query.into());
        self
    }

    pub fn with_outcome(mut self, outcome: impl Into<String>) -> Self {
        self.last_outcome = Some(outcome.into());
        self
    }

    pub fn with_intent(mut self, result: IntentResult) -> Self {
        self.intent_result = Some(result);
        self
    }
}

/// In-memory aggregate. Scalars track the latest non-empty value seen across all entries.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContextState {
    pub entries: VecDeque<ContextEntry>,
    pub last_active_feature: Option<String>,
    pub last_referenced_file: Option<String>,
    pub last_referenced_folder: Option<String>,
    pub last_referenced_app: Option<String>,
    pub last_scan_result: Option<String>,
    pub last_search_query: Option<String>,
    pub last_music_query: Option<String>,
    pub last_action_outcome: Option<String>,
}

impl ContextState {
    /// Folds an entry's non-empty values into the scalar fields.
    pub fn absorb(&mut self, entry: &ContextEntry) {
        set_if_present(&mut self.last_active_feature, entry.active_feature.as_deref());
        set_if_present(&mut self.last_referenced_file, entry.referenced_files.last().map(String::as_str));
        set_if_present(&mut self.last_referenced_folder, entry.referenced_folders.last().map(String::as_str));
        set_if_present(&mut self.last_referenced_app, entry.referenced_apps.last().map(String::as_str));
        set_if_present(&mut self.last_search_query, entry.search_query.as_deref());
        set_if_present(&mut self.last_music_query, entry.music_query.as_deref());
        set_if_present(&mut self.last_scan_result, entry.scan_result.as_deref());
        set_if_present(&mut self.last_action_outcome, entry.last_outcome.as_deref());
    }

    pub fn to_snapshot(&self, max_history: usize) -> ContextSnapshot {
        let skip = self.entries.len().saturating_sub(max_history);
        ContextSnapshot {
            history: self.entries.iter().skip(skip).cloned().collect(),
            last_active_feature: self.last_active_feature.clone(),
            last_referenced_file: self.last_referenced_file.clone(),
            last_referenced_folder: self.last_referenced_folder.clone(),
            last_referenced_app: self.last_referenced_app.clone(),
            last_scan_result: self.last_scan_result.clone(),
            last_search_query: self.last_search_query.clone(),
            last_music_query: self.last_music_query.clone(),
            last_action_outcome: self.last_action_outcome.clone(),
        }
    }

    /// Scalars come from the snapshot as written, not recomputed from the truncated history.
    pub fn from_snapshot(snapshot: ContextSnapshot, capacity: usize) -> Self {
        let skip = snapshot.history.len().saturating_sub(capacity);
        Self {
            entries: snapshot.history.into_iter().skip(skip).collect(),
            last_active_feature: snapshot.last_active_feature,
            last_referenced_file: snapshot.last_referenced_file,
            last_referenced_folder: snapshot.last_referenced_folder,
            last_referenced_app: snapshot.last_referenced_app,
            last_scan_result: snapshot.last_scan_result,
            last_search_query: snapshot.last_search_query,
            last_music_query: snapshot.last_music_query,
            last_action_outcome: snapshot.last_action_outcome,
        }
    }
}

/// On-disk shape. Field names are part of the file format.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContextSnapshot {
    #[serde(default)]
    pub history: Vec<ContextEntry>,
    #[serde(default)]
    pub last_active_feature: Option<String>,
    #[serde(default)]
    pub last_referenced_file: Option<String>,
    #[serde(default)]
    pub last_referenced_folder: Option<String>,
    #[serde(default)]
    pub last_referenced_app: Option<String>,
    #[serde(default)]
    pub last_scan_result: Option<String>,
    #[serde(default)]
    pub last_search_query: Option<String>,
    #[serde(default)]
    pub last_music_query: Option<String>,
    #[serde(default)]
    pub last_action_outcome: Option<String>,
}

fn set_if_present(slot: &mut Option<String>, value: Option<&str>) {
    if let Some(v) = value {
        if !v.trim().is_empty() {
            *slot = Some(v.to_string());
        }
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
