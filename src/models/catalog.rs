//! 주제 분류, 단락 규칙, 학년/난이도 표
//!
//! 화면 선택지와 프롬프트가 함께 쓰는 고정 데이터

use phf::phf_map;

/// 대분류 → 소분류 목록 (표시 순서 유지)
///
/// 소분류가 대분류와 같은 이름이면 주제는 대분류 하나로 구성된다.
/// 소분류가 없는 대분류는 직접 입력만 가능하다.
pub static TOPIC_CATEGORIES: &[(&str, &[&str])] = &[
    ("과학", &["과학", "물리", "화학", "생명", "지구과학"]),
    ("사회", &["사회", "경제", "정치", "지리", "문화"]),
    ("역사", &["한국사", "세계사", "문화유산"]),
    ("인물", &["과학자", "예술가", "위인"]),
    ("예술", &["음악", "미술", "체육"]),
    ("기술", &["컴퓨터", "발명", "미래 기술"]),
    ("환경", &["환경", "기후", "생태계"]),
    ("자유 주제", &[]),
];

/// 대분류별 단락 내용 생성 규칙
pub static PARAGRAPH_RULES: phf::Map<&'static str, &'static str> = phf_map! {
    "과학" => "    *   과학 원리나 현상을 '정의 → 원리/과정 → 실생활 예시' 순서로 설명합니다.\n    *   검증된 과학적 사실만 다루며, 수치는 초등학생이 이해할 수 있는 비유와 함께 제시합니다.",
    "사회" => "    *   사회 개념을 정의한 뒤, 학생 주변에서 볼 수 있는 구체적 사례로 설명합니다.\n    *   특정 입장을 강요하지 않고 여러 관점을 균형 있게 소개합니다.",
    "역사" => "    *   사건을 시간 순서(배경 → 전개 → 결과 → 의의)로 서술합니다.\n    *   연도와 인물 이름은 정확하게 쓰고, 확인되지 않은 일화는 포함하지 않습니다.",
    "인물" => "    *   인물의 생애를 시간 순서로 소개하고, 대표 업적과 그 업적이 오늘날에 주는 영향을 설명합니다.\n    *   지나친 미화나 도덕적 교훈 위주의 서술을 피합니다.",
    "예술" => "    *   작품이나 활동의 특징을 감각적 표현과 함께 설명하고, 역사적 배경을 짧게 덧붙입니다.\n    *   전문 용어는 처음 나올 때 쉬운 말로 풀어 줍니다.",
    "기술" => "    *   기술이 해결하는 문제 → 작동 원리 → 활용 사례 → 앞으로의 변화 순서로 설명합니다.\n    *   작동 원리는 단계별로 나누어 서술합니다.",
    "환경" => "    *   환경 문제의 현상 → 원인 → 영향 → 해결 노력 순서로 설명합니다.\n    *   공포를 조장하는 표현 대신 사실과 자료 중심으로 서술합니다.",
};

/// 대분류에 규칙이 없을 때 쓰는 규칙
pub const DEFAULT_PARAGRAPH_RULE: &str = "일반적인 설명문 단락 생성 규칙을 따르세요.";

/// 문단 하나의 최대 글자 수
pub const MAX_PARAGRAPH_CHARS: usize = 250;

/// 학년 선택지
pub const GRADES: [(u32, &str); 6] = [
    (1, "1학년"),
    (2, "2학년"),
    (3, "3학년"),
    (4, "4학년"),
    (5, "5학년"),
    (6, "6학년"),
];

/// 난이도 선택지
pub const DIFFICULTIES: [(u32, &str); 3] = [(1, "쉬움"), (2, "보통"), (3, "어려움")];

/// 난이도(행) × 학년(열)별 전체 글 분량
const LENGTH_HINTS: [[&str; 6]; 3] = [
    ["300~400자", "350~450자", "400~500자", "450~600자", "500~650자", "550~700자"],
    ["400~500자", "450~600자", "500~700자", "600~800자", "700~900자", "800~1000자"],
    ["500~600자", "600~750자", "700~900자", "800~1000자", "900~1100자", "1000~1200자"],
];

/// 모든 대분류 이름
pub fn main_categories() -> impl Iterator<Item = &'static str> {
    TOPIC_CATEGORIES.iter().map(|(main, _)| *main)
}

/// 대분류의 소분류 목록. 알 수 없는 대분류면 `None`.
pub fn sub_categories(main: &str) -> Option<&'static [&'static str]> {
    TOPIC_CATEGORIES
        .iter()
        .find(|(name, _)| *name == main)
        .map(|(_, subs)| *subs)
}

/// 대분류에 맞는 단락 규칙 (없으면 일반 규칙)
pub fn paragraph_rule(main_topic: &str) -> &'static str {
    PARAGRAPH_RULES
        .get(main_topic)
        .copied()
        .unwrap_or(DEFAULT_PARAGRAPH_RULE)
}

/// 난이도·학년에 맞는 글 분량 안내. 범위를 벗어난 값은 가장 가까운 칸을 쓴다.
pub fn length_hint(difficulty: u32, grade: u32) -> &'static str {
    let row = (difficulty.clamp(1, 3) - 1) as usize;
    let col = (grade.clamp(1, 6) - 1) as usize;
    LENGTH_HINTS[row][col]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraph_rule_falls_back_to_default() {
        assert!(paragraph_rule("과학").contains("과학 원리"));
        assert_eq!(paragraph_rule("자유 주제"), DEFAULT_PARAGRAPH_RULE);
        assert_eq!(paragraph_rule("화산"), DEFAULT_PARAGRAPH_RULE);
    }

    #[test]
    fn test_sub_categories_lookup() {
        assert_eq!(sub_categories("자유 주제"), Some(&[][..]));
        assert_eq!(sub_categories("없는 분류"), None);
        assert_eq!(main_categories().next(), Some("과학"));
    }

    #[test]
    fn test_length_hint_saturates() {
        assert_eq!(length_hint(1, 1), "300~400자");
        assert_eq!(length_hint(3, 6), "1000~1200자");
        assert_eq!(length_hint(0, 99), length_hint(1, 6));
    }
}
