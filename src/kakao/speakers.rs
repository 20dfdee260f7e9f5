// src/kakao/speakers.rs

use std::collections::HashSet;

use super::parser::ParsedMessage;

/// Distinct speakers in order of first appearance.
pub fn extract_speakers(messages: &[ParsedMessage]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut speakers = Vec::new();

    for message in messages {
        if seen.insert(message.speaker.as_str()) {
            speakers.push(message.speaker.clone());
        }
    }

    speakers
}

/// Exact-match lookup for the user-confirmed persona speaker.
pub fn contains_speaker(speakers: &[String], name: &str) -> bool {
    speakers.iter().any(|s| s == name)
}
