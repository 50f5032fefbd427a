//! 문서 내보내기
//!
//! 배치(`layout`)와 렌더링(`docx`)을 나누어, 배치 결과만으로 내용을 검사할 수 있게 한다.
//! 내보내기는 저장된 내용을 읽기만 한다.

pub mod docx;
pub mod layout;

use regex::Regex;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};

use crate::error::ExportError;
use crate::models::GeneratedContent;

pub use layout::{ExportBlock, QuestionParts, EXAMPLE_CLOSE, EXAMPLE_OPEN};

/// 내보내기 결과물
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// 내보내기 조립기
pub struct ExportAssembler {
    example_block: Regex,
    unsafe_name_run: Regex,
}

impl ExportAssembler {
    pub fn new() -> Result<Self, ExportError> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| ExportError::Assembly {
                reason: format!("정규식 컴파일 실패: {}", e),
            })
        };
        Ok(Self {
            example_block: compile(r"(?s)<보기>(.*?)</보기>")?,
            unsafe_name_run: compile(r"[\s\W]+")?,
        })
    }

    /// 문제 지시문과 예시 블록 분리
    pub fn split_question(&self, question_text: &str) -> QuestionParts {
        layout::split_example_block(&self.example_block, question_text)
    }

    /// 문서 블록 목록
    pub fn layout(&self, content: &GeneratedContent) -> Vec<ExportBlock> {
        layout::build_blocks(&self.example_block, content)
    }

    /// 제목에서 만든 파일 이름
    pub fn file_name(&self, title: &str) -> String {
        layout::sanitize_file_name(&self.unsafe_name_run, title)
    }

    /// 내용을 DOCX 결과물로 만든다.
    pub fn export(&self, content: &GeneratedContent) -> Result<ExportArtifact, ExportError> {
        if content.title.trim().is_empty() && content.paragraphs.is_empty() {
            return Err(ExportError::Assembly {
                reason: "내보낼 내용이 없습니다".to_string(),
            });
        }

        let blocks = self.layout(content);
        let bytes = docx::render(&blocks).map_err(|e| {
            warn!("DOCX 생성 실패: {}", e);
            e
        })?;

        Ok(ExportArtifact {
            file_name: self.file_name(&content.title),
            bytes,
        })
    }
}

/// 결과물을 디렉터리에 쓴다. 디렉터리가 없으면 만든다.
pub async fn write_artifact(artifact: &ExportArtifact, dir: &Path) -> Result<PathBuf, ExportError> {
    fs::create_dir_all(dir)
        .await
        .map_err(|source| ExportError::WriteFailed {
            path: dir.display().to_string(),
            source,
        })?;

    let path = dir.join(&artifact.file_name);
    fs::write(&path, &artifact.bytes)
        .await
        .map_err(|source| ExportError::WriteFailed {
            path: path.display().to_string(),
            source,
        })?;

    info!("💾 문서 저장: {} ({} bytes)", path.display(), artifact.bytes.len());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Paragraph, Question, QuestionFormat, QuestionType, VocabularyItem};

    fn assembler() -> ExportAssembler {
        ExportAssembler::new().unwrap()
    }

    fn content() -> GeneratedContent {
        GeneratedContent {
            title: "불을 뿜는 산, 화산!".into(),
            paragraphs: vec![
                Paragraph::new("화산은 땅속 마그마가 분출한 곳이다.\n용암이 흐른다."),
                Paragraph::new("마그마가 식으면 (㉠) 암석이 된다."),
            ],
            questions: vec![Question {
                id: "q1".into(),
                question_text: "아래 상황을 가장 잘 설명하는 것은?\n<보기>\n화산 근처 흙에서 작물이 잘 자랐다.\n</보기>".into(),
                format: QuestionFormat::MultipleChoice,
                question_type: QuestionType::Application,
                options: vec!["가".into(), "나".into(), "다".into(), "라".into(), "마".into()],
                correct_answer: "다".into(),
            }],
            vocabulary: vec![VocabularyItem {
                word: "마그마".into(),
                definition: "땅속에서 녹은 암석".into(),
                example: "마그마가 솟아올랐다.".into(),
            }],
        }
    }

    #[test]
    fn test_split_question_separates_example_block() {
        let parts = assembler().split_question("다음 상황을 보고 답하시오.\n<보기>\n첫 줄\n둘째 줄\n</보기>");
        assert_eq!(parts.lead, "다음 상황을 보고 답하시오.");
        assert_eq!(parts.example.as_deref(), Some("첫 줄\n둘째 줄"));

        let plain = assembler().split_question("화산은 무엇인가?");
        assert_eq!(plain.lead, "화산은 무엇인가?");
        assert_eq!(plain.example, None);
    }

    #[test]
    fn test_split_question_drops_unpaired_delimiters() {
        let parts = assembler().split_question("<보기>의 상황을 설명하시오");
        assert!(!parts.lead.contains(EXAMPLE_OPEN));
        assert_eq!(parts.example, None);
    }

    #[test]
    fn test_layout_order() {
        let blocks = assembler().layout(&content());
        assert_eq!(
            blocks,
            vec![
                ExportBlock::Title("불을 뿜는 산, 화산!".into()),
                ExportBlock::Body("화산은 땅속 마그마가 분출한 곳이다.".into()),
                ExportBlock::Body("용암이 흐른다.".into()),
                ExportBlock::Body("마그마가 식으면 (㉠) 암석이 된다.".into()),
                ExportBlock::SectionHeading("어휘 학습".into()),
                ExportBlock::VocabularyEntry {
                    word: "마그마".into(),
                    definition: "땅속에서 녹은 암석".into(),
                },
                ExportBlock::VocabularyExample("예) 마그마가 솟아올랐다.".into()),
                ExportBlock::SectionHeading("독해 문제".into()),
                ExportBlock::QuestionLead(vec!["1. [적용] 아래 상황을 가장 잘 설명하는 것은?".into()]),
                ExportBlock::ExampleBox(vec!["화산 근처 흙에서 작물이 잘 자랐다.".into()]),
                ExportBlock::Choice("   ① 가".into()),
                ExportBlock::Choice("   ② 나".into()),
                ExportBlock::Choice("   ③ 다".into()),
                ExportBlock::Choice("   ④ 라".into()),
                ExportBlock::Choice("   ⑤ 마".into()),
                ExportBlock::Answer("   정답: 다".into()),
                ExportBlock::Blank,
            ]
        );
    }

    #[test]
    fn test_empty_sections_are_omitted() {
        let mut content = content();
        content.vocabulary.clear();
        content.questions.clear();
        let blocks = assembler().layout(&content);
        assert!(!blocks
            .iter()
            .any(|b| matches!(b, ExportBlock::SectionHeading(_))));
    }

    #[test]
    fn test_file_name_sanitizing() {
        let a = assembler();
        assert_eq!(a.file_name("불을 뿜는 산, 화산!"), "불을_뿜는_산_화산_.docx");
        assert_eq!(a.file_name("  물의   순환 "), "물의_순환.docx");
        assert_eq!(a.file_name("?!"), "읽기자료.docx");
    }

    #[test]
    fn test_export_is_idempotent() {
        let a = assembler();
        let first = a.export(&content()).unwrap();
        let second = a.export(&content()).unwrap();
        assert_eq!(first, second);
        assert!(first.bytes.starts_with(b"PK"));
        assert_eq!(first.file_name, "불을_뿜는_산_화산_.docx");
    }

    #[test]
    fn test_export_rejects_empty_content() {
        assert!(matches!(
            assembler().export(&GeneratedContent::default()),
            Err(ExportError::Assembly { .. })
        ));
    }

    #[tokio::test]
    async fn test_write_artifact_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out");
        let artifact = ExportArtifact {
            file_name: "a.docx".into(),
            bytes: b"PK".to_vec(),
        };

        let path = write_artifact(&artifact, &target).await.unwrap();
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"PK");
    }
}
