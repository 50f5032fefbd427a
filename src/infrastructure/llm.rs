//! 생성 서비스 경계
//!
//! 요청은 {모델, 프롬프트, 시스템 지시, 응답 스키마, 웹 검색 여부},
//! 응답은 {텍스트, 근거 출처 목록}. 응답 형태는 신뢰하지 않으며 호출 측에서 검증한다.

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::error::GenerationError;

/// 생성 요청
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub model: String,
    pub prompt: String,
    pub system_instruction: Option<String>,
    /// 구조화 출력 스키마. 있으면 JSON 응답을 요청한다.
    pub response_schema: Option<JsonValue>,
    /// 웹 검색 근거 사용 여부
    pub web_search: bool,
}

impl GenerationRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            system_instruction: None,
            response_schema: None,
            web_search: false,
        }
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn with_schema(mut self, schema: JsonValue) -> Self {
        self.response_schema = Some(schema);
        self
    }

    pub fn with_web_search(mut self) -> Self {
        self.web_search = true;
        self
    }
}

/// 웹 검색 근거 출처
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Citation {
    pub uri: String,
    pub title: String,
}

/// 생성 응답
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationResponse {
    pub text: String,
    pub citations: Vec<Citation>,
}

impl GenerationResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            citations: Vec::new(),
        }
    }
}

/// 텍스트 생성 서비스
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// 요청 하나를 보내고 응답을 받는다.
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, GenerationError>;

    /// 서비스 이름 (로그용)
    fn provider_name(&self) -> &str;
}
