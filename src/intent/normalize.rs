//! Text canonicalization ahead of scoring.
//!
//! Two immutable tables: a per-token typo map and a phrase-level slang map.
//! Slang is rewritten in a single left-to-right pass; at each position the
//! longest phrase wins, so "turn it all the way up" beats "turn it up".

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;

static TYPOS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("oepn", "open"),
        ("opne", "open"),
        ("opn", "open"),
        ("lauch", "launch"),
        ("luanch", "launch"),
        ("clsoe", "close"),
        ("colse", "close"),
        ("dwonloads", "downloads"),
        ("donwloads", "downloads"),
        ("downlaods", "downloads"),
        ("downloasd", "downloads"),
        ("documetns", "documents"),
        ("docuemnts", "documents"),
        ("dekstop", "desktop"),
        ("desktp", "desktop"),
        ("picutres", "pictures"),
        ("plya", "play"),
        ("paly", "play"),
        ("musci", "music"),
        ("muisc", "music"),
        ("serach", "search"),
        ("saerch", "search"),
        ("seach", "search"),
        ("shutdwon", "shutdown"),
        ("shtudown", "shutdown"),
        ("restrat", "restart"),
        ("rebot", "reboot"),
        ("voluem", "volume"),
        ("volme", "volume"),
        ("screnshot", "screenshot"),
        ("scrennshot", "screenshot"),
        ("screeshot", "screenshot"),
        ("delte", "delete"),
        ("deleet", "delete"),
        ("reanme", "rename"),
        ("chorme", "chrome"),
        ("crome", "chrome"),
        ("spotfy", "spotify"),
        ("sptoify", "spotify"),
        ("youtbue", "youtube"),
        ("yotube", "youtube"),
        ("wether", "weather"),
        ("weahter", "weather"),
        ("remidner", "reminder"),
        ("calender", "calendar"),
        ("emial", "email"),
        ("teh", "the"),
        ("fodler", "folder"),
        ("flie", "file"),
        ("instal", "install"),
        ("wifii", "wifi"),
    ])
});

static SLANG: Lazy<Vec<(&'static str, &'static str)>> = Lazy::new(|| {
    let mut table = vec![
        ("turn it all the way up", "volume max"),
        ("turn it up", "volume up"),
        ("turn it down", "volume down"),
        ("crank it up", "volume up"),
        ("crank it", "volume up"),
        ("shut up", "mute"),
        ("kill the music", "stop music"),
        ("kill the tunes", "stop music"),
        ("put on some tunes", "play music"),
        ("bump some", "play"),
        ("throw on", "play"),
        ("spin up", "open"),
        ("fire up", "open"),
        ("boot up", "open"),
        ("pull up", "open"),
        ("get rid of", "delete"),
        ("nuke", "delete"),
        ("trash", "delete"),
        ("snap the screen", "take a screenshot"),
        ("grab the screen", "take a screenshot"),
        ("screen grab", "screenshot"),
        ("look up", "search for"),
        ("what's it like outside", "weather"),
        ("whats it like outside", "weather"),
        ("nite nite", "sleep"),
        ("power down", "shutdown"),
        ("gimme", "give me"),
        ("wanna", "want to"),
        ("gonna", "going to"),
        ("pls", "please"),
        ("plz", "please"),
        ("rn", "right now"),
        ("vol", "volume"),
        ("dl", "download"),
    ];
    // Longest phrase first; stable sort keeps authoring order among equal lengths.
    table.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    table
});

/// Every slang phrase as one alternation, longest first, anchored on word boundaries.
static SLANG_PATTERN: Lazy<Regex> = Lazy::new(|| {
    let alternatives: Vec<String> = SLANG.iter().map(|(phrase, _)| regex::escape(phrase)).collect();
    Regex::new(&format!(r"\b(?:{})\b", alternatives.join("|"))).expect("slang pattern is valid")
});

/// Lowercase, collapse whitespace, fix typos token by token, then rewrite slang.
pub fn normalize(text: &str) -> String {
    let tokens: Vec<String> = text
        .to_lowercase()
        .split_whitespace()
        .map(|token| match TYPOS.get(token) {
            Some(canonical) => canonical.to_string(),
            None => token.to_string(),
        })
        .collect();

    apply_slang(&tokens.join(" "))
}

fn apply_slang(text: &str) -> String {
    SLANG_PATTERN
        .replace_all(text, |caps: &Captures| {
            let found = &caps[0];
            SLANG
                .iter()
                .find(|(phrase, _)| *phrase == found)
                .map_or(found, |(_, replacement)| *replacement)
                .to_string()
        })
        .into_owned()
}

pub fn token_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typo_tokens() {
        assert_eq!(normalize("Oepn   Dwonloads"), "open downloads");
        assert_eq!(normalize("plya musci"), "play music");
    }

    #[test]
    fn test_slang_longest_first() {
        assert_eq!(normalize("turn it all the way up"), "volume max");
        assert_eq!(normalize("turn it up"), "volume up");
    }

    #[test]
    fn test_slang_word_boundaries() {
        // "rn" inside a word must not be rewritten
        assert_eq!(normalize("open the turn list"), "open the turn list");
        assert_eq!(normalize("nuke the old logs"), "delete the old logs");
        assert_eq!(normalize("do it rn"), "do it right now");
    }

    #[test]
    fn test_slang_repeated_back_to_back() {
        assert_eq!(normalize("vol vol up"), "volume volume up");
        assert_eq!(normalize("pls pls pls"), "please please please");
    }

    #[test]
    fn test_slang_is_single_pass() {
        // "look up" becomes "search for"; the output is not rewritten again.
        assert_eq!(normalize("look up vol settings"), "search for volume settings");
    }

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(normalize("what is the weather"), "what is the weather");
    }
}
