use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::question_type::QuestionType;

/// 새 식별자를 발급한다. 식별자는 불투명한 문자열로만 취급한다.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// 본문 문단
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    pub id: String,
    pub content: String,
}

impl Paragraph {
    /// 새 식별자를 가진 문단 생성
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            content: content.into(),
        }
    }
}

/// 문제 형식 (현재는 객관식만 지원)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuestionFormat {
    #[default]
    MultipleChoice,
}

/// 독해 문제
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub id: String,
    /// 지시문. `<보기>...</보기>` 블록을 하나 포함할 수 있다.
    pub question_text: String,
    pub format: QuestionFormat,
    pub question_type: QuestionType,
    /// 객관식 선택지 (항상 5개)
    pub options: Vec<String>,
    /// `options` 중 하나
    pub correct_answer: String,
}

impl Question {
    /// 객관식 선택지 개수
    pub const OPTION_COUNT: usize = 5;

    /// 식별자를 제외한 내용이 같은가
    pub fn same_content(&self, other: &Question) -> bool {
        self.question_text == other.question_text
            && self.format == other.format
            && self.question_type == other.question_type
            && self.options == other.options
            && self.correct_answer == other.correct_answer
    }
}

/// 어휘 항목
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyItem {
    pub word: String,
    pub definition: String,
    pub example: String,
}

/// 한 번의 생성 결과 전체
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GeneratedContent {
    pub title: String,
    pub paragraphs: Vec<Paragraph>,
    pub questions: Vec<Question>,
    pub vocabulary: Vec<VocabularyItem>,
}

impl GeneratedContent {
    /// 문단을 빈 줄로 이은 전체 지문
    pub fn passage(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| p.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// 문단 식별자 위치
    pub fn paragraph_index(&self, id: &str) -> Option<usize> {
        self.paragraphs.iter().position(|p| p.id == id)
    }

    /// 문제 식별자 위치
    pub fn question_index(&self, id: &str) -> Option<usize> {
        self.questions.iter().position(|q| q.id == id)
    }
}
