//! 부분 재생성 결과를 기존 문단 목록에 합치는 규칙
//!
//! 내용이 바뀐 위치만 새 식별자를 받는다. 바뀌지 않은 위치는 원래 식별자를 유지한다.

use crate::error::GenerationError;
use crate::models::content::Paragraph;

/// `original` 과 같은 길이의 `updated` 텍스트를 합친다.
///
/// # 반환
/// (합쳐진 문단 목록, 내용이 바뀐 위치 목록)
pub fn merge_paragraphs(
    original: &[Paragraph],
    updated: Vec<String>,
) -> Result<(Vec<Paragraph>, Vec<usize>), GenerationError> {
    if original.len() != updated.len() {
        return Err(GenerationError::invalid(format!(
            "문단 수가 일치하지 않습니다 (기존 {}개, 응답 {}개)",
            original.len(),
            updated.len()
        )));
    }

    let mut changed = Vec::new();
    let merged: Vec<Paragraph> = original
        .iter()
        .zip(updated)
        .enumerate()
        .map(|(i, (orig, text))| {
            if orig.content == text {
                orig.clone()
            } else {
                changed.push(i);
                Paragraph::new(text)
            }
        })
        .collect();

    Ok((merged, changed))
}
