//! 문서 배치 (렌더링 전 단계)
//!
//! `GeneratedContent` 를 문서 블록 목록으로 펼친다. 같은 입력은 항상 같은 목록이 된다.

use regex::Regex;

use crate::models::GeneratedContent;
use crate::services::schema::circled_ordinal;

/// 예시 블록 여는 표시
pub const EXAMPLE_OPEN: &str = "<보기>";
/// 예시 블록 닫는 표시
pub const EXAMPLE_CLOSE: &str = "</보기>";

pub const VOCABULARY_HEADING: &str = "어휘 학습";
pub const QUESTION_HEADING: &str = "독해 문제";

/// 문서 블록
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportBlock {
    /// 문서 제목
    Title(String),
    /// 본문 한 줄
    Body(String),
    /// 절 제목
    SectionHeading(String),
    /// 굵은 단어 + ": 뜻"
    VocabularyEntry { word: String, definition: String },
    /// 기울임 예문 줄 ("예) ...")
    VocabularyExample(String),
    /// 문제 지시문. 줄마다 줄바꿈으로 이어 한 단락에 굵게 쓴다.
    QuestionLead(Vec<String>),
    /// 테두리와 음영이 있는 예시 상자
    ExampleBox(Vec<String>),
    /// 선택지 한 줄
    Choice(String),
    /// 정답 줄
    Answer(String),
    /// 빈 단락
    Blank,
}

/// 문제 지시문과 예시 블록
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionParts {
    pub lead: String,
    pub example: Option<String>,
}

/// 지시문에서 예시 블록을 떼어낸다.
///
/// 예시 블록이 여러 개면 줄바꿈으로 합친다. 짝이 맞지 않는 표시는 지시문에서 지운다.
pub fn split_example_block(pattern: &Regex, text: &str) -> QuestionParts {
    let examples: Vec<&str> = pattern
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .collect();

    let lead = pattern
        .replace_all(text, "")
        .replace(EXAMPLE_OPEN, "")
        .replace(EXAMPLE_CLOSE, "")
        .trim()
        .to_string();

    QuestionParts {
        lead,
        example: (!examples.is_empty()).then(|| examples.join("\n")),
    }
}

/// 내용 전체를 블록 목록으로 배치
pub fn build_blocks(pattern: &Regex, content: &GeneratedContent) -> Vec<ExportBlock> {
    let mut blocks = vec![ExportBlock::Title(content.title.clone())];

    for paragraph in &content.paragraphs {
        blocks.extend(
            paragraph
                .content
                .split('\n')
                .map(|line| ExportBlock::Body(line.to_string())),
        );
    }

    if !content.vocabulary.is_empty() {
        blocks.push(ExportBlock::SectionHeading(VOCABULARY_HEADING.to_string()));
        for item in &content.vocabulary {
            blocks.push(ExportBlock::VocabularyEntry {
                word: item.word.clone(),
                definition: item.definition.clone(),
            });
            blocks.push(ExportBlock::VocabularyExample(format!("예) {}", item.example)));
        }
    }

    if !content.questions.is_empty() {
        blocks.push(ExportBlock::SectionHeading(QUESTION_HEADING.to_string()));
        for (i, question) in content.questions.iter().enumerate() {
            let parts = split_example_block(pattern, &question.question_text);
            let heading = format!("{}. [{}] {}", i + 1, question.question_type, parts.lead);
            blocks.push(ExportBlock::QuestionLead(
                heading.split('\n').map(str::to_string).collect(),
            ));

            if let Some(example) = parts.example {
                blocks.push(ExportBlock::ExampleBox(
                    example.split('\n').map(str::to_string).collect(),
                ));
            }

            for (n, option) in question.options.iter().enumerate() {
                blocks.push(ExportBlock::Choice(format!(
                    "   {} {}",
                    circled_ordinal(n),
                    option
                )));
            }
            blocks.push(ExportBlock::Answer(format!(
                "   정답: {}",
                question.correct_answer
            )));
            blocks.push(ExportBlock::Blank);
        }
    }

    blocks
}

/// 제목을 파일 이름으로 쓸 수 있게 바꾼다. 공백·기호 연속은 `_` 하나가 된다.
pub fn sanitize_file_name(unsafe_run: &Regex, title: &str) -> String {
    let stem = unsafe_run.replace_all(title.trim(), "_");
    if stem.chars().any(|c| c != '_') {
        format!("{}.docx", stem)
    } else {
        "읽기자료.docx".to_string()
    }
}
