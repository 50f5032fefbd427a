//! OpenAI 호환 API 클라이언트
//!
//! ## 기술 스택
//! - `async-openai` crate 로 chat completions 호출
//! - 사용자 지정 API 주소와 모델 지원
//!
//! 응답 스키마는 시스템 메시지에 지시로 덧붙인다. 웹 검색 근거는 지원하지 않으므로
//! 출처 목록은 항상 비어 있다.

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::GenerationError;
use crate::infrastructure::llm::{GenerationRequest, GenerationResponse, TextGenerator};

/// OpenAI 호환 클라이언트
pub struct OpenAiCompatClient {
    client: Client<OpenAIConfig>,
}

impl OpenAiCompatClient {
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
        }
    }
}

/// 시스템 지시와 스키마 지시를 합친다.
fn system_message(request: &GenerationRequest) -> Option<String> {
    let schema_note = request.response_schema.as_ref().map(|schema| {
        format!(
            "응답은 다음 JSON 스키마를 따르는 JSON 객체 하나만 출력하세요. 코드 블록이나 설명을 덧붙이지 마세요.\n{}",
            serde_json::to_string_pretty(schema).unwrap_or_default()
        )
    });

    match (&request.system_instruction, schema_note) {
        (Some(instruction), Some(note)) => Some(format!("{}\n\n{}", instruction, note)),
        (Some(instruction), None) => Some(instruction.clone()),
        (None, note) => note,
    }
}

#[async_trait]
impl TextGenerator for OpenAiCompatClient {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, GenerationError> {
        debug!("OpenAI 호환 API 호출, 모델: {}", request.model);
        if request.web_search {
            debug!("웹 검색 근거는 OpenAI 호환 API 에서 지원하지 않아 생략합니다");
        }

        let model = request.model.clone();
        let to_error = |e: async_openai::error::OpenAIError| {
            GenerationError::request_failed(model.clone(), e)
        };

        let mut messages = Vec::new();

        if let Some(sys_msg) = system_message(&request) {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg)
                .build()
                .map_err(to_error)?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(request.prompt.as_str())
            .build()
            .map_err(to_error)?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(&request.model)
            .messages(messages)
            .temperature(0.7)
            .build()
            .map_err(to_error)?;

        let response = self.client.chat().create(chat_request).await.map_err(|e| {
            warn!("OpenAI 호환 API 호출 실패: {}", e);
            to_error(e)
        })?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| GenerationError::EmptyResponse {
                model: request.model.clone(),
            })?;

        debug!("OpenAI 호환 API 호출 성공");
        Ok(GenerationResponse::text(content.trim()))
    }

    fn provider_name(&self) -> &str {
        "openai-compatible"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schema_is_appended_to_system_message() {
        let request = GenerationRequest::new("m", "p")
            .with_system_instruction("지시")
            .with_schema(json!({ "type": "OBJECT" }));
        let message = system_message(&request).unwrap();
        assert!(message.starts_with("지시"));
        assert!(message.contains("\"type\": \"OBJECT\""));
    }

    #[test]
    fn test_no_system_message_for_plain_request() {
        assert_eq!(system_message(&GenerationRequest::new("m", "p")), None);
    }
}
