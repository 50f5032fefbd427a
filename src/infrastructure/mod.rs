//! 기반 계층 (Infrastructure)
//!
//! 외부 생성 서비스와의 요청/응답만 담당한다. 프롬프트 내용이나 응답 검증은 알지 못한다.

pub mod gemini;
pub mod llm;
pub mod openai_compat;

use std::sync::Arc;

use crate::config::{Config, LlmProvider};
use crate::error::GenerationError;

pub use gemini::GeminiClient;
pub use llm::{Citation, GenerationRequest, GenerationResponse, TextGenerator};
pub use openai_compat::OpenAiCompatClient;

/// 설정에 맞는 생성 서비스 클라이언트를 만든다.
pub fn build_generator(config: &Config) -> Result<Arc<dyn TextGenerator>, GenerationError> {
    let generator: Arc<dyn TextGenerator> = match config.llm_provider {
        LlmProvider::Gemini => Arc::new(GeminiClient::new(config)?),
        LlmProvider::OpenAiCompatible => Arc::new(OpenAiCompatClient::new(config)),
    };
    Ok(generator)
}
