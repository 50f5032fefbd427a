//! 응답 스키마와 파싱·검증
//!
//! 외부 서비스의 JSON 출력은 형태를 신뢰하지 않는다. 모든 응답은 여기서
//! 도메인 타입으로 변환되며, 계약을 어기면 `GenerationError` 가 된다.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use std::collections::HashSet;
use tracing::warn;

use crate::error::GenerationError;
use crate::models::catalog::MAX_PARAGRAPH_CHARS;
use crate::models::{
    new_id, GeneratedContent, GenerationOptions, Paragraph, Question, QuestionFormat,
    QuestionType, VocabularyItem,
};
use crate::services::placeholder;

/// 문제 하나의 스키마
pub fn question_item_schema() -> JsonValue {
    let type_labels: Vec<&str> = QuestionType::ALL.iter().map(|t| t.label()).collect();
    json!({
        "type": "OBJECT",
        "properties": {
            "questionText": { "type": "STRING", "description": "문제의 질문 내용" },
            "questionType": { "type": "STRING", "enum": type_labels, "description": "문제의 사고 유형" },
            "options": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "5개의 선택지 배열"
            },
            "correctAnswer": { "type": "STRING", "description": "정답에 해당하는 선택지 내용" }
        },
        "required": ["questionText", "questionType", "options", "correctAnswer"]
    })
}

/// 전체 생성 응답 스키마
pub fn full_generation_schema() -> JsonValue {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING" },
            "paragraphs": { "type": "ARRAY", "items": { "type": "STRING" } },
            "questions": { "type": "ARRAY", "items": question_item_schema() },
            "vocabulary": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "word": { "type": "STRING" },
                        "definition": { "type": "STRING" },
                        "example": { "type": "STRING" }
                    },
                    "required": ["word", "definition", "example"]
                }
            }
        },
        "required": ["title", "paragraphs", "questions", "vocabulary"]
    })
}

/// 문제 재생성 응답 스키마
pub fn question_regeneration_schema() -> JsonValue {
    json!({
        "type": "OBJECT",
        "properties": {
            "newQuestion": question_item_schema(),
            "updatedParagraphs": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "수정되었거나 수정되지 않은 전체 본문 문단들의 배열"
            }
        },
        "required": ["newQuestion", "updatedParagraphs"]
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionPayload {
    pub question_text: String,
    pub question_type: String,
    #[serde(default)]
    pub options: Vec<String>,
    pub correct_answer: String,
}

#[derive(Debug, Deserialize)]
pub struct FullGenerationPayload {
    pub title: String,
    pub paragraphs: Vec<String>,
    #[serde(default)]
    pub questions: Vec<QuestionPayload>,
    #[serde(default)]
    pub vocabulary: Vec<VocabularyItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRegenerationPayload {
    pub new_question: QuestionPayload,
    pub updated_paragraphs: Vec<String>,
}

/// 응답 텍스트에서 JSON 객체 부분만 잘라낸다. (코드 블록 감싸기 등 허용)
pub fn extract_json(text: &str) -> &str {
    let trimmed = text.trim();
    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => trimmed,
    }
}

/// JSON 응답 파싱
pub fn parse_json<T: DeserializeOwned>(text: &str) -> Result<T, GenerationError> {
    Ok(serde_json::from_str(extract_json(text))?)
}

/// 원 숫자(①~⑤)
pub fn circled_ordinal(index: usize) -> char {
    char::from_u32(0x2460 + index as u32).unwrap_or('•')
}

/// 정답 문자열을 선택지 중 하나로 맞춘다.
///
/// 정확히 일치, 원 숫자 접두어 제거 후 일치, 원 숫자 하나(①), 1부터 시작하는 번호 순으로 시도한다.
fn normalize_answer(options: &[String], raw: &str) -> Option<String> {
    let raw = raw.trim();
    if let Some(exact) = options.iter().find(|o| o.as_str() == raw) {
        return Some(exact.clone());
    }

    let stripped = raw
        .trim_start_matches(|c: char| ('\u{2460}'..='\u{2473}').contains(&c))
        .trim();
    if let Some(found) = options.iter().find(|o| o.as_str() == stripped) {
        return Some(found.clone());
    }

    // 원 숫자만 있으면 번호로 본다
    let mut chars = raw.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        let n = (c as u32).wrapping_sub(0x2460) as usize;
        if n < options.len() {
            return Some(options[n].clone());
        }
    }

    raw.parse::<usize>()
        .ok()
        .filter(|n| (1..=options.len()).contains(n))
        .map(|n| options[n - 1].clone())
}

/// 문제 하나를 검증하고 새 식별자를 붙인다.
pub fn validate_question(payload: QuestionPayload) -> Result<Question, GenerationError> {
    let question_text = payload.question_text.trim().to_string();
    if question_text.is_empty() {
        return Err(GenerationError::invalid("문제 내용이 비어 있습니다"));
    }

    let question_type = QuestionType::from_label(&payload.question_type).ok_or_else(|| {
        GenerationError::invalid(format!(
            "알 수 없는 문제 유형: '{}'",
            payload.question_type
        ))
    })?;

    let options: Vec<String> = payload
        .options
        .iter()
        .map(|o| o.trim().to_string())
        .collect();
    if options.len() != Question::OPTION_COUNT {
        return Err(GenerationError::invalid(format!(
            "선택지가 {}개입니다 ({}개 필요)",
            options.len(),
            Question::OPTION_COUNT
        )));
    }
    if options.iter().any(|o| o.is_empty()) {
        return Err(GenerationError::invalid("빈 선택지가 있습니다"));
    }
    let distinct: HashSet<&str> = options.iter().map(String::as_str).collect();
    if distinct.len() != options.len() {
        return Err(GenerationError::invalid("중복된 선택지가 있습니다"));
    }

    let correct_answer = normalize_answer(&options, &payload.correct_answer).ok_or_else(|| {
        GenerationError::invalid(format!(
            "정답 '{}' 이(가) 선택지에 없습니다",
            payload.correct_answer
        ))
    })?;

    Ok(Question {
        id: new_id(),
        question_text,
        format: QuestionFormat::MultipleChoice,
        question_type,
        options,
        correct_answer,
    })
}

fn clean_paragraphs(raw: Vec<String>) -> Result<Vec<String>, GenerationError> {
    let paragraphs: Vec<String> = raw.into_iter().map(|p| p.trim().to_string()).collect();
    if paragraphs.iter().any(|p| p.is_empty()) {
        return Err(GenerationError::invalid("빈 문단이 있습니다"));
    }
    Ok(paragraphs)
}

/// 표시 규약 확인
///
/// - 각 참조가 본문과 맞고, 서로 다른 문제가 같은 표시를 참조하지 않는다
/// - 본문의 모든 표시는 어떤 문제가 참조한다
/// - 표시는 첫 등장 순으로 ㉠부터 배정된다
fn check_markers(questions: &[Question], paragraphs: &[Paragraph]) -> Result<(), GenerationError> {
    let mut used = HashSet::new();
    for (i, question) in questions.iter().enumerate() {
        let marker = placeholder::check_marker_reference(question, paragraphs)
            .map_err(|reason| GenerationError::invalid(format!("{}번 문제: {}", i + 1, reason)))?;
        if let Some(marker) = marker {
            if !used.insert(marker) {
                return Err(GenerationError::invalid(format!(
                    "{} 표시를 두 문제가 함께 참조합니다",
                    placeholder::marker_token(marker)
                )));
            }
        }
    }

    if let Some(stray) = placeholder::markers_in_use(paragraphs)
        .into_iter()
        .find(|m| !used.contains(m))
    {
        return Err(GenerationError::invalid(format!(
            "본문의 {} 표시를 참조하는 문제가 없습니다",
            placeholder::marker_token(stray)
        )));
    }

    placeholder::check_assignment_order(paragraphs).map_err(GenerationError::invalid)
}

/// 전체 생성 응답을 검증하고 `GeneratedContent` 로 변환한다.
pub fn parse_full_generation(
    text: &str,
    options: &GenerationOptions,
) -> Result<GeneratedContent, GenerationError> {
    let payload: FullGenerationPayload = parse_json(text)?;

    let title = payload.title.trim().to_string();
    if title.is_empty() {
        return Err(GenerationError::invalid("제목이 비어 있습니다"));
    }

    let texts = clean_paragraphs(payload.paragraphs)?;
    if texts.len() != options.num_paragraphs as usize {
        return Err(GenerationError::invalid(format!(
            "문단이 {}개입니다 ({}개 요청)",
            texts.len(),
            options.num_paragraphs
        )));
    }
    for (i, text) in texts.iter().enumerate() {
        let len = text.chars().count();
        if len > MAX_PARAGRAPH_CHARS {
            warn!("{}번 문단이 {}자로 권장 길이를 넘습니다", i + 1, len);
        }
    }
    let paragraphs: Vec<Paragraph> = texts.into_iter().map(Paragraph::new).collect();

    if payload.questions.len() != options.num_questions as usize {
        return Err(GenerationError::invalid(format!(
            "문제가 {}개입니다 ({}개 요청)",
            payload.questions.len(),
            options.num_questions
        )));
    }
    let questions = payload
        .questions
        .into_iter()
        .map(validate_question)
        .collect::<Result<Vec<_>, _>>()?;

    if !questions.is_empty() && !questions.iter().any(|q| q.question_type.is_required_kind()) {
        return Err(GenerationError::invalid(
            "적용·연결어·빈칸 추론 유형 문제가 하나도 없습니다",
        ));
    }
    check_markers(&questions, &paragraphs)?;

    let mut seen = HashSet::new();
    let vocabulary = payload
        .vocabulary
        .into_iter()
        .filter(|v| !v.word.trim().is_empty())
        .filter(|v| {
            let fresh = seen.insert(v.word.trim().to_string());
            if !fresh {
                warn!("중복 어휘 '{}' 제외", v.word);
            }
            fresh
        })
        .collect();

    Ok(GeneratedContent {
        title,
        paragraphs,
        questions,
        vocabulary,
    })
}

/// 문제 재생성 응답을 검증한다. 새 문제와 (정리된) 전체 문단 텍스트를 돌려준다.
pub fn parse_question_regeneration(
    text: &str,
) -> Result<(Question, Vec<String>), GenerationError> {
    let payload: QuestionRegenerationPayload = parse_json(text)?;
    let question = validate_question(payload.new_question)?;
    let paragraphs = clean_paragraphs(payload.updated_paragraphs)?;
    Ok((question, paragraphs))
}
