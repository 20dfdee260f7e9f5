// src/kakao/parser.rs
// Line-oriented parser for KakaoTalk "export chat" text files

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::io::BufRead;
use thiserror::Error;

/// Android export line: "2024년 1월 15일 오전 10:23, 홍길동 : 안녕"
pub const ANDROID_LINE_PATTERN: &str =
    r"^(\d{4}년 \d{1,2}월 \d{1,2}일 (?:오전|오후) \d{1,2}:\d{2}), (.+?) : (.+)$";

/// iOS export line: "2024-01-15 10:23:45 홍길동 : 안녕"
pub const IOS_LINE_PATTERN: &str = r"^(\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}) (.+?) : (.+)$";

/// Substrings marking join/leave/invite notices and export metadata
pub const DEFAULT_SYSTEM_KEYWORDS: &[&str] = &[
    "님이 들어왔습니다",
    "님이 나갔습니다",
    "님을 초대했습니다",
    "저장한 날짜",
    "채팅방 멤버",
];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to read export: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid line pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// One recognized chat line. `sent_at` keeps the raw timestamp text of whichever
/// export format produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedMessage {
    pub speaker: String,
    pub content: String,
    pub sent_at: String,
}

impl ParsedMessage {
    pub fn new(
        speaker: impl Into<String>,
        content: impl Into<String>,
        sent_at: impl Into<String>,
    ) -> Self {
        Self {
            speaker: speaker.into(),
            content: content.into(),
            sent_at: sent_at.into(),
        }
    }
}

/// Patterns and notice keywords the parser is built from.
///
/// Each pattern must expose three capture groups: timestamp, speaker, content.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    pub line_patterns: Vec<String>,
    pub system_keywords: Vec<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            line_patterns: vec![
                ANDROID_LINE_PATTERN.to_string(),
                IOS_LINE_PATTERN.to_string(),
            ],
            system_keywords: DEFAULT_SYSTEM_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect(),
        }
    }
}

/// Stateless KakaoTalk export parser. Cheap to share behind an `Arc`.
#[derive(Debug, Clone)]
pub struct KakaoParser {
    line_patterns: Vec<Regex>,
    system_keywords: Vec<String>,
}

impl KakaoParser {
    pub fn new(config: ParserConfig) -> Result<Self, ParseError> {
        let line_patterns = config
            .line_patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            line_patterns,
            system_keywords: config.system_keywords,
        })
    }

    /// Parse a whole export. Lines that match no pattern are dropped; a
    /// non-UTF-8 line aborts the parse.
    pub fn parse<R: BufRead>(&self, reader: R) -> Result<Vec<ParsedMessage>, ParseError> {
        let mut messages = Vec::new();

        for line in reader.lines() {
            let line = line?;
            if let Some(message) = self.parse_line(&line) {
                messages.push(message);
            }
        }

        Ok(messages)
    }

    /// Parse an uploaded file body. A leading UTF-8 byte order mark (written by
    /// some iOS exports) is dropped so the first line still matches.
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<Vec<ParsedMessage>, ParseError> {
        self.parse(bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes))
    }

    /// Parse a single raw line (untrimmed).
    pub fn parse_line(&self, raw: &str) -> Option<ParsedMessage> {
        let line = raw.trim();
        if line.is_empty() || self.is_system_notice(line) {
            return None;
        }

        self.line_patterns.iter().find_map(|pattern| {
            pattern
                .captures(line)
                .map(|caps| ParsedMessage::new(&caps[2], &caps[3], &caps[1]))
        })
    }

    pub fn is_system_notice(&self, line: &str) -> bool {
        self.system_keywords.iter().any(|k| line.contains(k.as_str()))
    }
}
