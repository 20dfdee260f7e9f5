// src/chat/session.rs
// Session lifecycle and the per-session system prompt

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ChatError;
use crate::persona::{ConversationSample, SampleRole};

const COUNTERPART_LABEL: &str = "상대방";

/// INIT -> ACTIVE -> ENDED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SessionStatus {
    Init,
    Active,
    Ended,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Init => "INIT",
            SessionStatus::Active => "ACTIVE",
            SessionStatus::Ended => "ENDED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "INIT" => Some(SessionStatus::Init),
            "ACTIVE" => Some(SessionStatus::Active),
            "ENDED" => Some(SessionStatus::Ended),
            _ => None,
        }
    }

    pub fn start(self) -> Result<SessionStatus, ChatError> {
        match self {
            SessionStatus::Init => Ok(SessionStatus::Active),
            from => Err(ChatError::InvalidTransition {
                from,
                to: SessionStatus::Active,
            }),
        }
    }

    pub fn end(self) -> Result<SessionStatus, ChatError> {
        match self {
            SessionStatus::Active => Ok(SessionStatus::Ended),
            from => Err(ChatError::InvalidTransition {
                from,
                to: SessionStatus::Ended,
            }),
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// System prompt fixed at session start: role line, memo, trait, recent
/// samples, instructions. Empty sections are left out.
pub fn build_system_prompt(
    persona_name: &str,
    memo: Option<&str>,
    trait_text: Option<&str>,
    samples: &[ConversationSample],
) -> String {
    let mut prompt = format!("당신은 '{}'입니다.\n\n", persona_name);

    if let Some(memo) = memo.filter(|m| !m.trim().is_empty()) {
        prompt.push_str("=== 성향 및 특징 ===\n");
        prompt.push_str(memo);
        prompt.push_str("\n\n");
    }

    if let Some(trait_text) = trait_text.filter(|t| !t.trim().is_empty()) {
        prompt.push_str("=== 페르소나 지침 ===\n");
        prompt.push_str(trait_text.trim_end());
        prompt.push_str("\n\n");
    }

    if !samples.is_empty() {
        prompt.push_str("=== 실제 대화 예시 ===\n");
        prompt.push_str("다음은 당신의 실제 대화 스타일입니다. 이를 참고하여 응답하세요.\n\n");
        for sample in samples {
            let speaker = match sample.sample_role() {
                SampleRole::Persona => persona_name,
                SampleRole::User => COUNTERPART_LABEL,
            };
            prompt.push_str(speaker);
            prompt.push_str(": ");
            prompt.push_str(&sample.message);
            prompt.push('\n');
        }
        prompt.push('\n');
    }

    prompt.push_str("=== 중요 지시사항 ===\n");
    prompt.push_str("- 위 대화 스타일과 성향을 바탕으로 자연스럽게 응답하세요.\n");
    prompt.push_str("- 일관된 성격과 말투를 유지하세요.\n");
    prompt.push_str(&format!("- '{}'의 입장에서 대화하세요.\n", persona_name));

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(id: i64, role: &str, message: &str) -> ConversationSample {
        ConversationSample {
            id,
            persona_id: 1,
            role: role.to_string(),
            message: message.to_string(),
            created_at: 0,
        }
    }

    #[test]
    fn test_transitions() {
        assert_eq!(SessionStatus::Init.start().unwrap(), SessionStatus::Active);
        assert_eq!(SessionStatus::Active.end().unwrap(), SessionStatus::Ended);

        assert!(SessionStatus::Active.start().is_err());
        assert!(SessionStatus::Ended.start().is_err());
        assert!(SessionStatus::Init.end().is_err());
        assert!(SessionStatus::Ended.end().is_err());
    }

    #[test]
    fn test_status_text() {
        for status in [SessionStatus::Init, SessionStatus::Active, SessionStatus::Ended] {
            assert_eq!(SessionStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(SessionStatus::parse("active"), None);
        assert_eq!(serde_json::to_string(&SessionStatus::Active).unwrap(), "\"ACTIVE\"");
    }

    #[test]
    fn test_prompt_with_all_sections() {
        let samples = vec![sample(1, "PERSONA", "밥 먹었니?"), sample(2, "USER", "응 먹었어")];
        let prompt = build_system_prompt("엄마", Some("걱정이 많음"), Some("# Role\n엄마"), &samples);

        assert!(prompt.starts_with("당신은 '엄마'입니다.\n\n=== 성향 및 특징 ===\n걱정이 많음\n\n"));
        assert!(prompt.contains("=== 페르소나 지침 ===\n# Role\n엄마\n\n"));
        assert!(prompt.contains("엄마: 밥 먹었니?\n상대방: 응 먹었어\n\n=== 중요 지시사항 ===\n"));
        assert!(prompt.ends_with("- '엄마'의 입장에서 대화하세요.\n"));
    }

    #[test]
    fn test_prompt_skips_empty_sections() {
        let prompt = build_system_prompt("지훈", Some("   "), None, &[]);

        assert!(!prompt.contains("성향 및 특징"));
        assert!(!prompt.contains("페르소나 지침"));
        assert!(!prompt.contains("실제 대화 예시"));
        assert!(prompt.contains("=== 중요 지시사항 ==="));
    }
}
