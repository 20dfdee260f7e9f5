// src/kakao/mod.rs
// KakaoTalk export parsing: message lines and speaker extraction

pub mod parser;
pub mod speakers;

pub use parser::{KakaoParser, ParseError, ParsedMessage, ParserConfig};
pub use speakers::{contains_speaker, extract_speakers};
