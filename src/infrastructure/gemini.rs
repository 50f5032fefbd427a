//! Gemini generateContent 클라이언트
//!
//! 시스템 지시, JSON 응답 스키마, google_search 도구를 지원하며
//! 응답의 groundingMetadata 에서 출처를 꺼낸다.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::GenerationError;
use crate::infrastructure::llm::{Citation, GenerationRequest, GenerationResponse, TextGenerator};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Gemini REST 클라이언트
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(Duration::from_secs(config.llm_timeout_secs))
            .build()
            .map_err(|e| GenerationError::request_failed(&config.llm_model_name, e))?;

        Ok(Self {
            client,
            api_key: config.llm_api_key.clone(),
            base_url: config.llm_api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }
}

/// 요청 본문 구성
fn build_body(request: &GenerationRequest) -> JsonValue {
    let mut body = json!({
        "contents": [{
            "role": "user",
            "parts": [{ "text": request.prompt }],
        }],
    });

    if let Some(instruction) = &request.system_instruction {
        body["systemInstruction"] = json!({ "parts": [{ "text": instruction }] });
    }

    if let Some(schema) = &request.response_schema {
        body["generationConfig"] = json!({
            "responseMimeType": "application/json",
            "responseSchema": schema,
        });
    }

    if request.web_search {
        body["tools"] = json!([{ "google_search": {} }]);
    }

    body
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    web: Option<WebSource>,
}

#[derive(Debug, Deserialize)]
struct WebSource {
    uri: Option<String>,
    title: Option<String>,
}

/// 응답 본문을 텍스트와 출처로 변환
fn parse_response(body: GeminiResponse, model: &str) -> Result<GenerationResponse, GenerationError> {
    let candidate = body
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| GenerationError::EmptyResponse {
            model: model.to_string(),
        })?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(GenerationError::EmptyResponse {
            model: model.to_string(),
        });
    }

    let citations = candidate
        .grounding_metadata
        .map(|meta| {
            meta.grounding_chunks
                .into_iter()
                .filter_map(|chunk| chunk.web)
                .filter_map(|web| match (web.uri, web.title) {
                    (Some(uri), Some(title)) if !uri.is_empty() && !title.is_empty() => {
                        Some(Citation { uri, title })
                    }
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(GenerationResponse { text, citations })
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, GenerationError> {
        debug!(
            "Gemini 호출, 모델: {}, 프롬프트 {} 자, 스키마: {}, 웹 검색: {}",
            request.model,
            request.prompt.chars().count(),
            request.response_schema.is_some(),
            request.web_search
        );

        let response = self
            .client
            .post(self.endpoint(&request.model))
            .header("x-goog-api-key", &self.api_key)
            .json(&build_body(&request))
            .send()
            .await
            .map_err(|e| {
                warn!("Gemini 요청 실패: {}", e);
                GenerationError::request_failed(&request.model, e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "알 수 없는 오류".to_string());
            warn!("Gemini 오류 응답 ({}): {}", status, body);
            return Err(GenerationError::BadStatus {
                status: status.as_u16(),
                body,
            });
        }

        let body: GeminiResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::request_failed(&request.model, e))?;

        debug!("Gemini 호출 성공");
        parse_response(body, &request.model)
    }

    fn provider_name(&self) -> &str {
        "gemini"
    }
}
