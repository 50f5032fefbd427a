/// 문제의 사고 유형 (7가지)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuestionType {
    /// 사실적 사고
    Factual,
    /// 추론적 사고
    Inferential,
    /// 비판적 사고
    Critical,
    /// 창의적 사고
    Creative,
    /// 적용
    Application,
    /// 연결어
    Conjunctive,
    /// 빈칸 추론
    FillInBlank,
}

impl QuestionType {
    /// 화면/프롬프트에 쓰이는 순서
    pub const ALL: [QuestionType; 7] = [
        QuestionType::Factual,
        QuestionType::Inferential,
        QuestionType::Critical,
        QuestionType::Creative,
        QuestionType::Application,
        QuestionType::Conjunctive,
        QuestionType::FillInBlank,
    ];

    /// 한국어 표준 이름
    pub fn label(self) -> &'static str {
        match self {
            QuestionType::Factual => "사실적 사고",
            QuestionType::Inferential => "추론적 사고",
            QuestionType::Critical => "비판적 사고",
            QuestionType::Creative => "창의적 사고",
            QuestionType::Application => "적용",
            QuestionType::Conjunctive => "연결어",
            QuestionType::FillInBlank => "빈칸 추론",
        }
    }

    /// 외부 서비스가 돌려준 유형 문자열을 해석한다.
    ///
    /// 공백 차이("빈칸추론")와 '전이'(= 적용) 표기를 허용하고, 그 외에는 `None`.
    pub fn from_label(s: &str) -> Option<Self> {
        let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        if compact == "전이" {
            return Some(QuestionType::Application);
        }
        Self::ALL
            .into_iter()
            .find(|t| t.label().replace(' ', "") == compact)
    }

    /// 본문에 괄호 표시(㉠ 등)가 필요한 유형인가
    pub fn requires_marker(self) -> bool {
        matches!(self, QuestionType::Conjunctive | QuestionType::FillInBlank)
    }

    /// 전체 생성 시 최소 한 문제는 포함해야 하는 유형인가
    pub fn is_required_kind(self) -> bool {
        matches!(
            self,
            QuestionType::Application | QuestionType::Conjunctive | QuestionType::FillInBlank
        )
    }
}

impl std::fmt::Display for QuestionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
