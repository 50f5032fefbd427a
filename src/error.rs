use thiserror::Error;

/// 애플리케이션 오류 타입
#[derive(Debug, Error)]
pub enum AppError {
    /// 생성 서비스 오류
    #[error("생성 오류: {0}")]
    Generation(#[from] GenerationError),
    /// 문서 내보내기 오류
    #[error("내보내기 오류: {0}")]
    Export(#[from] ExportError),
    /// 설정 오류
    #[error("설정 오류: {0}")]
    Config(#[from] ConfigError),
    /// 세션 상태 오류
    #[error("세션 오류: {0}")]
    Session(#[from] SessionError),
}

/// 생성 서비스(LLM) 호출 오류
///
/// 호출 자체가 실패했거나, 응답이 스키마/형태 검증을 통과하지 못한 경우.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// 네트워크 요청 실패
    #[error("LLM API 호출 실패 (모델: {model}): {source}")]
    RequestFailed {
        model: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 서비스가 오류 상태 코드를 반환
    #[error("LLM API 오류 응답 (상태 코드: {status}): {body}")]
    BadStatus { status: u16, body: String },
    /// 응답 본문이 비어 있음
    #[error("LLM 응답 내용이 비어 있음 (모델: {model})")]
    EmptyResponse { model: String },
    /// JSON 파싱 실패
    #[error("응답 JSON 파싱 실패: {source}")]
    MalformedJson {
        #[from]
        source: serde_json::Error,
    },
    /// 응답이 계약을 위반함
    #[error("응답 검증 실패: {reason}")]
    InvalidPayload { reason: String },
}

impl GenerationError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        GenerationError::InvalidPayload {
            reason: reason.into(),
        }
    }

    pub fn request_failed(
        model: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        GenerationError::RequestFailed {
            model: model.into(),
            source: Box::new(source),
        }
    }
}

/// 문서 내보내기 오류
#[derive(Debug, Error)]
pub enum ExportError {
    /// 문서 조립 실패
    #[error("문서 조립 실패: {reason}")]
    Assembly { reason: String },
    /// 문서 직렬화 실패
    #[error("문서 직렬화 실패: {reason}")]
    Serialization { reason: String },
    /// 파일 쓰기 실패
    #[error("파일 쓰기 실패 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 설정 오류
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 서비스 자격 증명이 없음
    #[error("환경 변수 {var_name} 가 설정되지 않았습니다")]
    MissingCredential { var_name: String },
    /// 환경 변수 파싱 실패
    #[error("환경 변수 {var_name} 파싱 실패: 값 '{value}' 을(를) {expected_type} 으로 변환할 수 없습니다")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
}

/// 세션 상태 오류
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// 아직 생성된 콘텐츠가 없음
    #[error("생성된 콘텐츠가 없습니다")]
    NoContent,
    /// 인덱스 범위 초과
    #[error("인덱스 {index} 가 범위를 벗어났습니다 (길이: {len})")]
    IndexOutOfRange { index: usize, len: usize },
    /// 직접 입력 주제가 비어 있음
    #[error("주제를 입력해 주세요")]
    EmptyTopic,
    /// 알 수 없는 대분류
    #[error("알 수 없는 주제 분류: {name}")]
    UnknownCategory { name: String },
    /// 알 수 없는 소분류
    #[error("알 수 없는 하위 주제: {name}")]
    UnknownSubCategory { name: String },
}

// ========== Result 타입 별칭 ==========

/// 애플리케이션 결과 타입
pub type AppResult<T> = Result<T, AppError>;
