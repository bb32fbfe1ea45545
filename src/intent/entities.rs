//! Per-intent slot extraction.
//!
//! Local extraction yields a tagged [`Extracted`] value per intent family and is
//! flattened into [`Entities`] at the boundary. Empty slots never reach the map.

use once_cell::sync::Lazy;
use regex::Regex;

use super::types::{Entities, Intent};

const PLATFORMS: &[&str] = &[
    "youtube music", "apple music", "amazon music", "spotify", "youtube", "soundcloud",
    "deezer", "tidal", "pandora", "google", "bing", "duckduckgo", "chrome", "firefox", "edge",
];

static PLATFORM_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    let alternatives = PLATFORMS.join("|");
    Regex::new(&format!(r"(?i)^(.*?)\s+(?:on|in|using|with)\s+({})$", alternatives))
        .expect("platform suffix pattern is valid")
});

static PATH_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(?:[a-z]:\\[^\s"']*|~?/[^\s"']+)"#).expect("path pattern is valid")
});

static VOLUME_LEVEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{1,3})\s*(?:%|percent)?\b").expect("volume level pattern is valid")
});

/// Known folder names and the canonical target they map to.
const FOLDERS: &[(&str, &str)] = &[
    ("downloads", "downloads"),
    ("download", "downloads"),
    ("documents", "documents"),
    ("document", "documents"),
    ("docs", "documents"),
    ("desktop", "desktop"),
    ("pictures", "pictures"),
    ("photos", "pictures"),
    ("videos", "videos"),
    ("movies", "videos"),
    ("music", "music"),
    ("home", "home"),
];

/// Slots found in one utterance, shaped by intent family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extracted {
    Query { query: Option<String>, platform: Option<String> },
    App { app: Option<String> },
    Folder { target: Option<String> },
    Action { action: Option<String>, target: Option<String>, level: Option<String> },
    File { action: Option<String>, target: Option<String>, destination: Option<String> },
    Location { target: Option<String> },
    Nothing,
}

impl Extracted {
    pub fn into_entities(self) -> Entities {
        let mut entities = Entities::new();
        let mut put = |key: &str, value: Option<String>| {
            if let Some(v) = value {
                entities.insert(key, v);
            }
        };
        match self {
            Extracted::Query { query, platform } => {
                put("query", query);
                put("platform", platform);
            }
            Extracted::App { app } => put("app", app),
            Extracted::Folder { target } => put("target", target),
            Extracted::Action { action, target, level } => {
                put("action", action);
                put("target", target);
                put("level", level);
            }
            Extracted::File { action, target, destination } => {
                put("action", action);
                put("target", target);
                put("destination", destination);
            }
            Extracted::Location { target } => put("target", target),
            Extracted::Nothing => {}
        }
        entities
    }
}

pub fn extract(intent: Intent, text: &str) -> Extracted {
    let lower = text.to_lowercase();
    match intent {
        Intent::PlayMusic => {
            let (query, platform) = split_platform(after_keyword(text, &["play_music", "listen to", "put on", "play"]));
            Extracted::Query { query: query.and_then(strip_music_filler), platform }
        }
        Intent::WebSearch => {
            let raw = after_keyword(text, &["web_search", "search for", "search", "look for", "find"])
                .or_else(|| from_keyword(text, &["who is", "what is"]));
            let (query, platform) = split_platform(raw);
            Extracted::Query { query, platform }
        }
        Intent::Reminder | Intent::SendEmail | Intent::CalendarEvent => {
            let query = after_keyword(text, &["remind me to", "remind me", "send_email", "calendar_event", "schedule a meeting", "send a message to", "send mail", "email", "reminder", "meeting", "calendar"]);
            Extracted::Query { query, platform: None }
        }
        Intent::OpenApp => Extracted::App { app: after_keyword(text, &["open_app", "launch", "open", "start", "run"]).and_then(clean_app) },
        Intent::CloseApp => Extracted::App { app: after_keyword(text, &["close_app", "terminate", "close", "quit", "exit", "kill"]).and_then(clean_app) },
        Intent::InstallApp => Extracted::App { app: after_keyword(text, &["install_app", "download and install", "install", "set up"]).and_then(clean_app) },
        Intent::OpenFolder | Intent::ScanFolder => Extracted::Folder { target: folder_target(text) },
        Intent::FileOperation => extract_file(text, &lower),
        Intent::PowerControl => Extracted::Action { action: power_action(&lower), target: None, level: None },
        Intent::MediaControl => Extracted::Action { action: media_action(&lower), target: None, level: None },
        Intent::VolumeControl => {
            let level = VOLUME_LEVEL.captures(&lower).map(|c| c[1].to_string());
            let action = volume_action(&lower).or_else(|| level.as_ref().map(|_| "set".to_string()));
            Extracted::Action { action, target: None, level }
        }
        Intent::SystemControl => Extracted::Action {
            action: toggle_action(&lower),
            target: first_present(&lower, &["wifi", "bluetooth", "brightness", "dark mode", "airplane mode", "night light", "do not disturb"]),
            level: None,
        },
        Intent::Weather => Extracted::Location { target: after_keyword(text, &["in", "for", "at"]) },
        Intent::Screenshot | Intent::Unknown => Extracted::Nothing,
    }
}

/// Text after the first keyword (in list order) that occurs on a word boundary.
fn after_keyword(text: &str, keywords: &[&str]) -> Option<String> {
    keywords.iter().find_map(|kw| {
        find_word(text, kw).map(|pos| text[pos + kw.len()..].trim().to_string())
    })
    .filter(|s| !s.is_empty())
}

/// Text starting at the keyword, keyword included.
fn from_keyword(text: &str, keywords: &[&str]) -> Option<String> {
    keywords.iter().find_map(|kw| find_word(text, kw).map(|pos| text[pos..].trim().to_string()))
}

fn find_word(text: &str, word: &str) -> Option<usize> {
    let lower = text.to_lowercase();
    // Lowercasing can shift byte offsets for some scripts; only trust ASCII-preserving inputs.
    if lower.len() != text.len() {
        return None;
    }
    let bytes = lower.as_bytes();
    let mut start = 0;
    while let Some(found) = lower[start..].find(word) {
        let pos = start + found;
        let end = pos + word.len();
        let left_ok = pos == 0 || !is_word_byte(bytes[pos - 1]);
        let right_ok = end == bytes.len() || !is_word_byte(bytes[end]);
        if left_ok && right_ok {
            return Some(pos);
        }
        start = pos + 1;
    }
    None
}

/// Underscore counts as a word character so "play" does not match inside "play_music".
fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn split_platform(raw: Option<String>) -> (Option<String>, Option<String>) {
    let Some(raw) = raw else { return (None, None) };
    match PLATFORM_SUFFIX.captures(&raw) {
        Some(caps) => (Some(caps[1].trim().to_string()), Some(caps[2].to_lowercase())),
        None => (Some(raw), None),
    }
}

fn strip_music_filler(query: String) -> Option<String> {
    let mut q = query.trim();
    for filler in ["some ", "me ", "the song ", "the "] {
        if let Some(rest) = q.strip_prefix(filler) {
            q = rest.trim_start();
        }
    }
    for filler in ["music by ", "songs by ", "music ", "songs "] {
        if let Some(rest) = q.strip_prefix(filler) {
            q = rest.trim_start();
        }
    }
    match q {
        "" | "music" | "songs" | "a song" | "something" => None,
        other => Some(other.to_string()),
    }
}

fn clean_app(raw: String) -> Option<String> {
    let mut app = raw.trim();
    if let Some(rest) = app.strip_prefix("the ") {
        app = rest;
    }
    for suffix in [" application", " app", " program"] {
        if let Some(rest) = app.strip_suffix(suffix) {
            app = rest;
        }
    }
    let app = app.trim();
    (!app.is_empty()).then(|| app.to_string())
}

fn folder_target(text: &str) -> Option<String> {
    let lower = text.to_lowercase();
    let tokens: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();
    for (name, canonical) in FOLDERS {
        if tokens.contains(name) {
            return Some(canonical.to_string());
        }
    }
    PATH_SHAPE.find(text).map(|m| m.as_str().to_string())
}

fn extract_file(text: &str, lower: &str) -> Extracted {
    let action = if contains_any(lower, &["delete", "remove"]) {
        Some("delete")
    } else if lower.contains("rename") {
        Some("rename")
    } else if lower.contains("move") {
        Some("move")
    } else if contains_any(lower, &["copy", "duplicate"]) {
        Some("copy")
    } else {
        None
    };

    let (subject, destination) = match after_keyword(text, &["delete", "remove", "rename", "move", "copy", "duplicate"]) {
        Some(rest) => match rest.to_lowercase().find(" to ") {
            Some(idx) => (Some(rest[..idx].to_string()), Some(rest[idx + 4..].trim().to_string())),
            None => (Some(rest), None),
        },
        None => (None, None),
    };

    let target = subject
        .map(|s| {
            let mut s = s.trim();
            for filler in ["the ", "my ", "file ", "files ", "folder "] {
                if let Some(rest) = s.strip_prefix(filler) {
                    s = rest.trim_start();
                }
            }
            s.to_string()
        })
        .filter(|s| !s.is_empty() && s != "file" && s != "files")
        .or_else(|| folder_target(text));

    Extracted::File {
        action: action.map(str::to_string),
        target,
        destination: destination.and_then(|d| folder_target(&d).or(Some(d))),
    }
}

fn power_action(lower: &str) -> Option<String> {
    let action = if contains_any(lower, &["restart", "reboot"]) {
        "restart"
    } else if contains_any(lower, &["shutdown", "shut down", "power off", "turn off"]) {
        "shutdown"
    } else if lower.contains("sleep") {
        "sleep"
    } else if lower.contains("lock") {
        "lock"
    } else if lower.contains("log off") {
        "logoff"
    } else {
        return None;
    };
    Some(action.to_string())
}

fn media_action(lower: &str) -> Option<String> {
    let action = if lower.contains("pause") {
        "pause"
    } else if lower.contains("resume") {
        "resume"
    } else if contains_any(lower, &["next", "skip"]) {
        "next"
    } else if lower.contains("previous") {
        "previous"
    } else if lower.contains("stop") {
        "stop"
    } else {
        return None;
    };
    Some(action.to_string())
}

fn volume_action(lower: &str) -> Option<String> {
    let action = if lower.contains("unmute") {
        "unmute"
    } else if lower.contains("mute") {
        "mute"
    } else if lower.contains("max") {
        "max"
    } else if contains_any(lower, &[" up", "louder", "increase", "raise"]) {
        "up"
    } else if contains_any(lower, &[" down", "quieter", "lower", "decrease"]) {
        "down"
    } else {
        return None;
    };
    Some(action.to_string())
}

fn toggle_action(lower: &str) -> Option<String> {
    let action = if contains_any(lower, &["turn on", "enable", "switch on"]) {
        "on"
    } else if contains_any(lower, &["turn off", "disable", "switch off"]) {
        "off"
    } else if contains_any(lower, &["increase", "raise", " up"]) {
        "up"
    } else if contains_any(lower, &["decrease", "lower", "dim", " down"]) {
        "down"
    } else if lower.contains("toggle") {
        "toggle"
    } else {
        return None;
    };
    Some(action.to_string())
}

fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| text.contains(n))
}

fn first_present(text: &str, needles: &[&str]) -> Option<String> {
    needles.iter().find(|n| text.contains(*n)).map(|n| n.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entities(intent: Intent, text: &str) -> Entities {
        extract(intent, text).into_entities()
    }

    #[test]
    fn test_music_query_with_platform() {
        let e = entities(Intent::PlayMusic, "play lofi beats on spotify");
        assert_eq!(e.get("query"), Some("lofi beats"));
        assert_eq!(e.get("platform"), Some("spotify"));
    }

    #[test]
    fn test_bare_play_music_has_no_query() {
        assert!(entities(Intent::PlayMusic, "play music").get("query").is_none());
        assert_eq!(entities(Intent::PlayMusic, "play some music by daft punk").get("query"), Some("daft punk"));
    }

    #[test]
    fn test_search_query() {
        let e = entities(Intent::WebSearch, "search for rust tutorials using duckduckgo");
        assert_eq!(e.get("query"), Some("rust tutorials"));
        assert_eq!(e.get("platform"), Some("duckduckgo"));
        assert_eq!(entities(Intent::WebSearch, "who is ada lovelace").get("query"), Some("who is ada lovelace"));
    }

    #[test]
    fn test_app_names() {
        assert_eq!(entities(Intent::OpenApp, "open the spotify app").get("app"), Some("spotify"));
        assert_eq!(entities(Intent::CloseApp, "close chrome").get("app"), Some("chrome"));
        assert!(entities(Intent::OpenApp, "open").is_empty());
    }

    #[test]
    fn test_folder_lookup_and_path() {
        assert_eq!(entities(Intent::OpenFolder, "open downloads").get("target"), Some("downloads"));
        assert_eq!(entities(Intent::OpenFolder, "open Downloads").get("target"), Some("downloads"));
        assert_eq!(entities(Intent::ScanFolder, "scan ~/projects/nexus").get("target"), Some("~/projects/nexus"));
        assert_eq!(entities(Intent::OpenFolder, r"open c:\users\me").get("target"), Some(r"c:\users\me"));
    }

    #[test]
    fn test_file_operations() {
        let e = entities(Intent::FileOperation, "move report.pdf to documents");
        assert_eq!(e.get("action"), Some("move"));
        assert_eq!(e.get("target"), Some("report.pdf"));
        assert_eq!(e.get("destination"), Some("documents"));

        let e = entities(Intent::FileOperation, "delete the file notes.txt");
        assert_eq!(e.get("action"), Some("delete"));
        assert_eq!(e.get("target"), Some("notes.txt"));
    }

    #[test]
    fn test_repeated_command_tags() {
        assert_eq!(entities(Intent::PlayMusic, "play_music lofi").get("query"), Some("lofi"));
        assert_eq!(entities(Intent::WebSearch, "web_search rust tutorials").get("query"), Some("rust tutorials"));
        assert_eq!(entities(Intent::CloseApp, "close_app chrome").get("app"), Some("chrome"));
        assert_eq!(entities(Intent::OpenFolder, "open_folder downloads").get("target"), Some("downloads"));
    }

    #[test]
    fn test_closed_vocabulary_actions() {
        assert_eq!(entities(Intent::PowerControl, "shut down the pc").get("action"), Some("shutdown"));
        assert_eq!(entities(Intent::PowerControl, "reboot").get("action"), Some("restart"));
        assert_eq!(entities(Intent::MediaControl, "skip this song").get("action"), Some("next"));
        assert_eq!(entities(Intent::VolumeControl, "unmute").get("action"), Some("unmute"));
        let e = entities(Intent::VolumeControl, "volume 40%");
        assert_eq!(e.get("action"), Some("set"));
        assert_eq!(e.get("level"), Some("40"));
    }
}
