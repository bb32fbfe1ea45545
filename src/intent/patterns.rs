//! Local keyword scoring.

use once_cell::sync::Lazy;
use tracing::debug;

use super::normalize::token_count;
use super::types::{clamp_confidence, Intent};

const BASE_SCORE: f32 = 0.6;
const EDGE_BONUS: f32 = 0.15;
const EXTRA_HIT_BONUS: f32 = 0.05;
const EXTRA_HIT_CAP: f32 = 0.15;
const SHORT_INPUT_BONUS: f32 = 0.1;
const SHORT_INPUT_TOKENS: usize = 4;

/// Keyword patterns per intent, in registration order.
pub static PATTERNS: Lazy<Vec<(Intent, Vec<&'static str>)>> = Lazy::new(|| {
    Intent::ALL.iter().map(|&intent| (intent, patterns_for(intent))).collect()
});

fn patterns_for(intent: Intent) -> Vec<&'static str> {
    match intent {
        Intent::PowerControl => vec![
            "shutdown", "shut down", "restart", "reboot", "power off",
            "turn off the computer", "turn off my computer", "sleep",
            "lock the computer", "lock my computer", "lock the screen", "lock screen", "log off",
        ],
        Intent::VolumeControl => vec!["volume", "mute", "unmute", "louder", "quieter", "sound up", "sound down"],
        Intent::MediaControl => vec![
            "pause", "resume", "next song", "next track", "skip", "previous song",
            "previous track", "stop music", "stop the music",
        ],
        Intent::PlayMusic => vec!["play", "put on", "listen to", "music", "song"],
        Intent::Screenshot => vec!["screenshot", "screen shot", "capture the screen", "capture screen", "print screen", "snip"],
        Intent::OpenFolder => vec![
            "open downloads", "open documents", "open desktop", "open pictures", "open videos",
            "open folder", "open the folder", "open directory", "show folder", "go to",
            "downloads", "documents", "desktop", "pictures", "folder", "directory",
        ],
        Intent::ScanFolder => vec!["scan", "analyze folder", "analyse folder", "what's in", "whats in", "list files", "show files", "how big is"],
        Intent::FileOperation => vec!["delete", "remove file", "move", "rename", "copy", "duplicate", "file", "files"],
        Intent::CloseApp => vec!["close", "quit", "exit", "kill", "terminate"],
        Intent::InstallApp => vec!["install", "download and install", "set up"],
        Intent::OpenApp => vec!["open", "launch", "start", "run"],
        Intent::Weather => vec!["weather", "temperature", "forecast", "is it raining", "will it rain"],
        Intent::WebSearch => vec!["search", "search for", "look for", "find", "who is", "what is"],
        Intent::SystemControl => vec!["wifi", "bluetooth", "brightness", "dark mode", "airplane mode", "night light", "do not disturb"],
        Intent::Reminder => vec!["remind me", "reminder", "set an alarm", "alarm", "timer"],
        Intent::SendEmail => vec!["email", "send mail", "send a message to"],
        Intent::CalendarEvent => vec!["calendar", "schedule a meeting", "meeting", "appointment"],
        Intent::Unknown => vec![],
    }
}

/// Best local match for a normalized input.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalScore {
    pub intent: Intent,
    pub confidence: f32,
    pub matched: Vec<&'static str>,
}

impl LocalScore {
    pub fn none() -> Self {
        Self { intent: Intent::Unknown, confidence: 0.0, matched: Vec::new() }
    }
}

/// Score one pattern list against the input. `None` when nothing matches.
pub fn score_patterns(text: &str, patterns: &[&'static str]) -> Option<(f32, Vec<&'static str>)> {
    let mut matched: Vec<&'static str> = Vec::new();
    for &pattern in patterns {
        if text.contains(pattern) && !matched.contains(&pattern) {
            matched.push(pattern);
        }
    }
    if matched.is_empty() {
        return None;
    }

    let mut score = BASE_SCORE;
    if matched.iter().any(|p| text.starts_with(p) || text.ends_with(p)) {
        score += EDGE_BONUS;
    }
    let extra = (matched.len() - 1) as f32;
    score += (EXTRA_HIT_BONUS * extra).min(EXTRA_HIT_CAP);
    if token_count(text) <= SHORT_INPUT_TOKENS {
        score += SHORT_INPUT_BONUS;
    }

    Some((clamp_confidence(score), matched))
}

/// Scores every category and keeps the strictly best one; ties go to the earlier category.
pub fn score(text: &str) -> LocalScore {
    let mut best = LocalScore::none();
    for (intent, patterns) in PATTERNS.iter() {
        if let Some((confidence, matched)) = score_patterns(text, patterns) {
            debug!(intent = intent.tag(), confidence, hits = matched.len(), "local pattern hit");
            if confidence > best.confidence {
                best = LocalScore { intent: *intent, confidence, matched };
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_match_is_unknown() {
        let s = score("tell me a story about dragons");
        assert_eq!(s.intent, Intent::Unknown);
        assert_eq!(s.confidence, 0.0);
    }

    #[test]
    fn test_edge_and_short_bonus() {
        let (confidence, _) = score_patterns("play lofi", &["play"]).unwrap();
        assert!((confidence - 0.85).abs() < 1e-5);
    }

    #[test]
    fn test_extra_hits_capped() {
        let text = "a b one two three four five c";
        let (confidence, matched) = score_patterns(text, &["one", "two", "three", "four", "five"]).unwrap();
        assert_eq!(matched.len(), 5);
        // base + capped extras, no edge bonus, long input
        assert!((confidence - 0.75).abs() < 1e-5);
    }

    #[test]
    fn test_tie_goes_to_first_registered() {
        // "restart" also contains the open_app keyword "start"
        let s = score("restart");
        assert_eq!(s.intent, Intent::PowerControl);
    }

    #[test]
    fn test_weather_beats_generic_question() {
        assert_eq!(score("what is the weather").intent, Intent::Weather);
    }
}
