//! 빈칸 표시(㉠, ㉡ …) 규약
//!
//! 연결어·빈칸 추론 문제는 본문에 `(㉠)` 형태의 괄호 표시를 둔다.
//! - 표시 문자는 고정된 순서의 집합에서 첫 등장 순으로 배정한다
//! - 문제 지시문이 참조하는 표시는 본문 전체에 정확히 한 번, 괄호 안에 나타나야 한다

use crate::models::{Paragraph, Question, QuestionType};

/// 표시 문자 (배정 순서)
pub const PLACEHOLDER_CHARS: [char; 5] = ['㉠', '㉡', '㉢', '㉣', '㉤'];

/// 본문에 들어가는 표시 토큰 `(㉠)`
pub fn marker_token(marker: char) -> String {
    format!("({})", marker)
}

/// 텍스트가 참조하는 표시. 고정 순서대로 훑어 처음 발견한 것을 돌려준다.
pub fn referenced_marker(text: &str) -> Option<char> {
    PLACEHOLDER_CHARS
        .into_iter()
        .find(|m| text.contains(&marker_token(*m)))
}

/// 문단 전체에서 표시 토큰이 나타나는 횟수
pub fn count_marker(paragraphs: &[Paragraph], marker: char) -> usize {
    let token = marker_token(marker);
    paragraphs
        .iter()
        .map(|p| p.content.matches(token.as_str()).count())
        .sum()
}

/// 한 텍스트 안에서 표시 토큰이 나타나는 횟수
pub fn count_marker_in(text: &str, marker: char) -> usize {
    text.matches(marker_token(marker).as_str()).count()
}

/// 본문에 쓰이고 있는 표시 (고정 순서)
pub fn markers_in_use(paragraphs: &[Paragraph]) -> Vec<char> {
    PLACEHOLDER_CHARS
        .into_iter()
        .filter(|m| count_marker(paragraphs, *m) > 0)
        .collect()
}

/// 본문에 아직 쓰이지 않은 첫 번째 표시
pub fn next_free_marker(paragraphs: &[Paragraph]) -> Option<char> {
    PLACEHOLDER_CHARS
        .into_iter()
        .find(|m| count_marker(paragraphs, *m) == 0)
}

/// 본문에 쓰인 표시를 처음 나타나는 순서대로 돌려준다.
pub fn markers_by_first_appearance(paragraphs: &[Paragraph]) -> Vec<char> {
    let passage = paragraphs
        .iter()
        .map(|p| p.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");
    let mut found: Vec<(usize, char)> = PLACEHOLDER_CHARS
        .into_iter()
        .filter_map(|m| passage.find(&marker_token(m)).map(|pos| (pos, m)))
        .collect();
    found.sort_unstable();
    found.into_iter().map(|(_, m)| m).collect()
}

/// 표시가 첫 등장 순으로 ㉠부터 빠짐없이 배정되었는지 확인한다.
pub fn check_assignment_order(paragraphs: &[Paragraph]) -> Result<(), String> {
    let order = markers_by_first_appearance(paragraphs);
    if order.iter().zip(PLACEHOLDER_CHARS).all(|(m, expected)| *m == expected) {
        return Ok(());
    }
    let tokens: Vec<String> = order.iter().map(|m| marker_token(*m)).collect();
    Err(format!(
        "표시가 첫 등장 순서대로 배정되지 않았습니다: {}",
        tokens.join(", ")
    ))
}

/// 문제 유형 변경에 따른 표시 변화
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MarkerPlan {
    /// 새 문제가 그대로 쓰는 기존 표시
    pub kept: Option<char>,
    /// 지문에서 빠져야 하는 기존 표시
    pub removed: Option<char>,
    /// 지문에 새로 들어가야 하는 표시
    pub added: Option<char>,
}

impl MarkerPlan {
    /// 문제와 현재 본문, 새 유형으로 표시 변화를 정한다.
    ///
    /// 새로 넣는 표시는 아직 쓰이지 않은 첫 번째 표시다.
    pub fn for_change(question: &Question, paragraphs: &[Paragraph], new_type: QuestionType) -> Self {
        let old = question
            .question_type
            .requires_marker()
            .then(|| referenced_marker(&question.question_text))
            .flatten();
        match (old, new_type.requires_marker()) {
            (Some(m), true) => Self {
                kept: Some(m),
                ..Default::default()
            },
            (Some(m), false) => Self {
                removed: Some(m),
                ..Default::default()
            },
            (None, true) => Self {
                added: next_free_marker(paragraphs),
                ..Default::default()
            },
            (None, false) => Self::default(),
        }
    }

    /// 새 문제가 참조해야 하는 표시
    pub fn target(&self) -> Option<char> {
        self.kept.or(self.added)
    }

    /// 변경 뒤 본문에 있어야 하는 표시 (고정 순서)
    pub fn expected_after(&self, before: &[char]) -> Vec<char> {
        PLACEHOLDER_CHARS
            .into_iter()
            .filter(|m| {
                (before.contains(m) && Some(*m) != self.removed) || Some(*m) == self.added
            })
            .collect()
    }
}

/// 표시 토큰이 들어 있는 문단 위치
pub fn paragraph_with_marker(paragraphs: &[Paragraph], marker: char) -> Option<usize> {
    let token = marker_token(marker);
    paragraphs.iter().position(|p| p.content.contains(&token))
}

/// 표시 토큰을 다른 텍스트로 바꾼다.
pub fn substitute_marker(text: &str, marker: char, replacement: &str) -> String {
    text.replace(&marker_token(marker), replacement)
}

/// 문제가 표시 규약을 지키는지 확인한다.
///
/// 표시가 필요한 유형이면 지시문이 표시를 참조해야 하고, 그 표시는 본문에
/// 정확히 한 번 나타나야 한다. 참조한 표시를 돌려준다.
pub fn check_marker_reference(
    question: &Question,
    paragraphs: &[Paragraph],
) -> Result<Option<char>, String> {
    if !question.question_type.requires_marker() {
        return Ok(None);
    }

    let marker = referenced_marker(&question.question_text).ok_or_else(|| {
        format!(
            "'{}' 문제가 빈칸 표시를 참조하지 않습니다",
            question.question_type
        )
    })?;

    match count_marker(paragraphs, marker) {
        1 => Ok(Some(marker)),
        0 => Err(format!("본문에 {} 표시가 없습니다", marker_token(marker))),
        n => Err(format!(
            "본문에 {} 표시가 {}번 나타납니다",
            marker_token(marker),
            n
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{QuestionFormat, QuestionType};

    fn paragraphs(texts: &[&str]) -> Vec<Paragraph> {
        texts.iter().map(|t| Paragraph::new(*t)).collect()
    }

    fn question(question_type: QuestionType, text: &str) -> Question {
        Question {
            id: "q".into(),
            question_text: text.into(),
            format: QuestionFormat::MultipleChoice,
            question_type,
            options: vec!["가".into(), "나".into(), "다".into(), "라".into(), "마".into()],
            correct_answer: "가".into(),
        }
    }

    #[test]
    fn test_referenced_marker_requires_parentheses() {
        assert_eq!(referenced_marker("(㉡)에 들어갈 말은?"), Some('㉡'));
        assert_eq!(referenced_marker("㉠에 들어갈 말은?"), None);
        assert_eq!(referenced_marker("(㉢)와 (㉠)"), Some('㉠'));
    }

    #[test]
    fn test_next_free_marker_follows_fixed_order() {
        let ps = paragraphs(&["용암이 (㉠) 흘러", "화산재가 (㉢) 쌓인다"]);
        assert_eq!(markers_in_use(&ps), vec!['㉠', '㉢']);
        assert_eq!(next_free_marker(&ps), Some('㉡'));

        let full = paragraphs(&["(㉠)(㉡)(㉢)(㉣)(㉤)"]);
        assert_eq!(next_free_marker(&full), None);
    }

    #[test]
    fn test_substitute_and_locate() {
        let ps = paragraphs(&["첫 문단", "마그마가 식으면 (㉠) 암석이 된다"]);
        assert_eq!(paragraph_with_marker(&ps, '㉠'), Some(1));
        assert_eq!(
            substitute_marker(&ps[1].content, '㉠', "결국"),
            "마그마가 식으면 결국 암석이 된다"
        );
    }

    #[test]
    fn test_check_marker_reference() {
        let ps = paragraphs(&["화산은 (㉠) 위험하다"]);

        let ok = question(QuestionType::Conjunctive, "(㉠)에 들어갈 말은?");
        assert_eq!(check_marker_reference(&ok, &ps), Ok(Some('㉠')));

        let missing = question(QuestionType::FillInBlank, "(㉡)에 들어갈 말은?");
        assert!(check_marker_reference(&missing, &ps).is_err());

        let unreferenced = question(QuestionType::FillInBlank, "빈칸에 들어갈 말은?");
        assert!(check_marker_reference(&unreferenced, &ps).is_err());

        let doubled = paragraphs(&["(㉠) 그리고 (㉠)"]);
        assert!(check_marker_reference(&ok, &doubled).is_err());

        let factual = question(QuestionType::Factual, "화산은 무엇인가?");
        assert_eq!(check_marker_reference(&factual, &ps), Ok(None));
    }

    #[test]
    fn test_assignment_order_by_first_appearance() {
        let ordered = paragraphs(&["용암이 (㉠) 흐른다", "화산재가 (㉡) 쌓인다"]);
        assert_eq!(markers_by_first_appearance(&ordered), vec!['㉠', '㉡']);
        assert!(check_assignment_order(&ordered).is_ok());

        let swapped = paragraphs(&["용암이 (㉡) 흐른다", "화산재가 (㉠) 쌓인다"]);
        assert_eq!(markers_by_first_appearance(&swapped), vec!['㉡', '㉠']);
        assert!(check_assignment_order(&swapped).is_err());

        let gap = paragraphs(&["용암이 (㉠) 흐른다", "화산재가 (㉢) 쌓인다"]);
        assert!(check_assignment_order(&gap).is_err());

        assert!(check_assignment_order(&paragraphs(&["표시 없음"])).is_ok());
    }

    #[test]
    fn test_marker_plan_for_type_changes() {
        let ps = paragraphs(&["용암이 (㉠) 흐른다", "화산재가 쌓인다"]);
        let conjunctive = question(QuestionType::Conjunctive, "(㉠)에 들어갈 말은?");
        let factual = question(QuestionType::Factual, "화산은 무엇인가?");

        let away = MarkerPlan::for_change(&conjunctive, &ps, QuestionType::Factual);
        assert_eq!(away.removed, Some('㉠'));
        assert_eq!(away.target(), None);
        assert_eq!(away.expected_after(&['㉠']), Vec::<char>::new());

        let keep = MarkerPlan::for_change(&conjunctive, &ps, QuestionType::FillInBlank);
        assert_eq!(keep.target(), Some('㉠'));
        assert_eq!(keep.expected_after(&['㉠']), vec!['㉠']);

        let toward = MarkerPlan::for_change(&factual, &ps, QuestionType::FillInBlank);
        assert_eq!(toward.added, Some('㉡'));
        assert_eq!(toward.expected_after(&['㉠']), vec!['㉠', '㉡']);

        let none = MarkerPlan::for_change(&factual, &ps, QuestionType::Critical);
        assert_eq!(none, MarkerPlan::default());
    }
}
