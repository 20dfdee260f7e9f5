// src/persona/traits.rs
// Trait synthesis: turn an imported conversation into a persona style guide

use std::sync::Arc;
use tracing::{info, warn};

use crate::kakao::ParsedMessage;
use crate::llm::{LlmError, TextGenerator};

const MISSING: &str = "정보 없음";

/// Inputs for one analysis call
#[derive(Debug, Clone, Copy)]
pub struct TraitRequest<'a> {
    pub persona_name: &'a str,
    pub user_name: &'a str,
    pub relationship: Option<&'a str>,
    pub memo: Option<&'a str>,
    pub speaker_name: &'a str,
    pub messages: &'a [ParsedMessage],
}

/// Where the stored trait text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraitSource {
    Generated,
    Fallback,
}

#[derive(Clone)]
pub struct TraitSynthesizer {
    generator: Arc<dyn TextGenerator>,
    sample_cap: usize,
}

impl TraitSynthesizer {
    pub fn new(generator: Arc<dyn TextGenerator>, sample_cap: usize) -> Self {
        Self {
            generator,
            sample_cap,
        }
    }

    pub async fn synthesize(&self, request: &TraitRequest<'_>) -> Result<String, LlmError> {
        info!(
            persona = request.persona_name,
            speaker = request.speaker_name,
            provider = self.generator.name(),
            "Generating persona trait"
        );

        let instruction = build_analysis_instruction(request.user_name, request.relationship);
        let prompt = build_analysis_prompt(request, self.sample_cap);

        self.generator.generate(&instruction, &[], &prompt).await
    }

    /// Never fails: any generation error is logged and replaced by `fallback_trait`.
    pub async fn synthesize_or_fallback(&self, request: &TraitRequest<'_>) -> (String, TraitSource) {
        match self.synthesize(request).await {
            Ok(text) => (text, TraitSource::Generated),
            Err(e) => {
                warn!(
                    persona = request.persona_name,
                    "Trait generation failed, using fallback: {}", e
                );
                (
                    fallback_trait(request.persona_name, request.relationship),
                    TraitSource::Fallback,
                )
            }
        }
    }
}

/// Fixed analyst instruction. Only the user's name and the relationship vary.
pub fn build_analysis_instruction(user_name: &str, relationship: Option<&str>) -> String {
    let relationship = relationship.unwrap_or(MISSING);

    format!(
        "당신은 전문적인 언어 분석가이자 캐릭터 디자이너입니다. \
제공된 카카오톡 대화 데이터와 메타데이터를 분석하여, 해당 인물의 말투, 성격, 특징을 포함한 페르소나 지침서(Trait)를 작성해야 합니다.\n\n\
특히 다음 사항에 집중하세요:\n\
1. 호칭 분석: 페르소나가 사용자를 어떻게 부르는지 대화 데이터에서 찾아내세요. (예: '~형님', '형', '~씨', '~아(야)', '아들' 등)\n\
2. 관계 기반 문체: 사용자와의 관계({relationship})에 따른 예의의 정도와 친밀함을 반영하세요.\n\
3. 이름 사용 규칙: 성을 붙이는지, 이름만 부르는지, 별명을 쓰는지 파악하세요.\n\n\
작성 형식은 반드시 다음 형식을 따라야 합니다:\n\
# Role\n[인물의 역할, 별명, 연령대, 성격 요약]\n\
# Style & Tone\n\
- 호칭: [사용자를 부르는 구체적인 호칭 규칙. 예: '이름만 부르고 뒤에 형님을 붙임', '성을 떼고 이름만 부름' 등]\n\
- 문체: [말투의 특징, 종결 어미, 이모티콘 사용 여부 등]\n\
- 리액션: [상대방의 말에 반응하는 방식]\n\
- 성격: [핵심적인 성격적 특징]\n\
# Context (User Specifics)\n\
- 사용자 이름: {user_name}\n\
- 관계: {relationship}\n\
- 대화 배경: [사용자와의 관계 및 현재 상황]\n\
# Constraints\n\
- 사용자를 부를 때는 반드시 분석된 호칭 규칙을 따르십시오.\n\
- AI임을 드러내지 말고 실제 사람처럼 자연스럽게 대화하십시오."
    )
}

/// Request block: persona metadata followed by the first `sample_cap` messages
/// rendered as `speaker: content`.
pub fn build_analysis_prompt(request: &TraitRequest<'_>, sample_cap: usize) -> String {
    let sample = request
        .messages
        .iter()
        .take(sample_cap)
        .map(|m| format!("{}: {}", m.speaker, m.content))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "다음 정보를 바탕으로 페르소나 지침서를 작성해줘.\n\n\
[기본 정보]\n\
- 페르소나 이름: {}\n\
- 사용자 이름(나): {}\n\
- 사용자와의 관계: {}\n\
- 메모/특이사항: {}\n\
- 분석 대상 화자 이름: {}\n\n\
[대화 데이터 샘플]\n{}",
        request.persona_name,
        request.user_name,
        request.relationship.unwrap_or(MISSING),
        request.memo.unwrap_or(MISSING),
        request.speaker_name,
        sample
    )
}

pub fn fallback_trait(persona_name: &str, relationship: Option<&str>) -> String {
    format!(
        "# Role\n당신은 {}입니다.\n# Style & Tone\n- 호칭: 사용자\n- 문체: 자연스러운 말투\n# Context\n{}와의 관계\n# Constraints\n친절하게 대답하세요.",
        persona_name,
        relationship.unwrap_or("사용자")
    )
}
