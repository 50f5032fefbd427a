use std::ops::RangeInclusive;

/// 소분류 선택지의 "직접 입력" 표시 이름
pub const DIRECT_INPUT_LABEL: &str = "직접 입력";

/// 허용 문단 수
pub const PARAGRAPH_RANGE: RangeInclusive<u32> = 3..=7;
/// 허용 문제 수
pub const QUESTION_RANGE: RangeInclusive<u32> = 0..=10;

/// 소분류 선택 상태
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubTopic {
    /// 목록에 있는 소분류
    Named(String),
    /// 직접 입력 (자유 텍스트 사용)
    DirectInput,
}

impl SubTopic {
    pub fn is_direct_input(&self) -> bool {
        matches!(self, SubTopic::DirectInput)
    }
}

/// 생성 요청 파라미터
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOptions {
    pub topic: String,
    pub grade: u32,
    pub num_paragraphs: u32,
    pub num_questions: u32,
    pub difficulty: u32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            topic: String::new(),
            grade: 3,
            num_paragraphs: 4,
            num_questions: 3,
            difficulty: 1,
        }
    }
}

impl GenerationOptions {
    /// 주제의 대분류 부분 (`"{대분류} - {소분류}"` 의 앞부분)
    pub fn main_topic(&self) -> &str {
        self.topic.split(" - ").next().unwrap_or_default()
    }
}

/// 주제 문자열을 구성한다.
///
/// - 직접 입력이면 자유 텍스트
/// - 소분류가 대분류와 같으면 대분류만
/// - 그 외에는 `"{대분류} - {소분류}"`
pub fn compose_topic(main: &str, sub: &SubTopic, custom: &str) -> String {
    match sub {
        SubTopic::DirectInput => custom.to_string(),
        SubTopic::Named(name) if name == main => main.to_string(),
        SubTopic::Named(name) => format!("{} - {}", main, name),
    }
}

/// 2단계 주제 선택 상태
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicSelection {
    pub main: String,
    pub sub: SubTopic,
    pub custom: String,
}

impl TopicSelection {
    pub fn topic(&self) -> String {
        compose_topic(&self.main, &self.sub, &self.custom)
    }
}

/// 문단 수를 허용 범위로 제한
pub fn clamp_paragraphs(n: u32) -> u32 {
    n.clamp(*PARAGRAPH_RANGE.start(), *PARAGRAPH_RANGE.end())
}

/// 문제 수를 허용 범위로 제한
pub fn clamp_questions(n: u32) -> u32 {
    n.clamp(*QUESTION_RANGE.start(), *QUESTION_RANGE.end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_topic_rules() {
        assert_eq!(
            compose_topic("과학", &SubTopic::DirectInput, "화산"),
            "화산"
        );
        assert_eq!(
            compose_topic("과학", &SubTopic::Named("과학".into()), "무시됨"),
            "과학"
        );
        assert_eq!(
            compose_topic("과학", &SubTopic::Named("지구과학".into()), ""),
            "과학 - 지구과학"
        );
    }

    #[test]
    fn test_main_topic_extraction() {
        let mut options = GenerationOptions {
            topic: "과학 - 지구과학".into(),
            ..Default::default()
        };
        assert_eq!(options.main_topic(), "과학");
        options.topic = "화산".into();
        assert_eq!(options.main_topic(), "화산");
    }

    #[test]
    fn test_count_clamping() {
        assert_eq!(clamp_paragraphs(0), 3);
        assert_eq!(clamp_paragraphs(5), 5);
        assert_eq!(clamp_paragraphs(12), 7);
        assert_eq!(clamp_questions(0), 0);
        assert_eq!(clamp_questions(11), 10);
    }
}
