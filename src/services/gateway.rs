//! 생성 게이트웨이 - 업무 능력 계층
//!
//! 외부 생성 서비스에 대한 네 가지 요청을 담당한다.
//! - 요청마다 프롬프트를 조립하고 응답을 검증해서 도메인 타입으로 돌려준다
//! - 저장된 내용을 직접 바꾸지 않는다 (되쓰기는 `ContentStore` 의 일)

use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::GenerationError;
use crate::infrastructure::{build_generator, Citation, GenerationRequest, TextGenerator};
use crate::models::catalog::MAX_PARAGRAPH_CHARS;
use crate::models::{
    merge_paragraphs, GeneratedContent, GenerationOptions, Paragraph, Question, QuestionType,
};
use crate::services::{placeholder, prompts, schema};

/// 문제 유형 변경 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionRegeneration {
    /// 새 문제 (새 식별자)
    pub question: Question,
    /// 전체 문단. 내용이 바뀐 위치만 새 식별자를 가진다.
    pub paragraphs: Vec<Paragraph>,
    /// 내용이 바뀐 문단 위치
    pub changed: Vec<usize>,
}

/// 생성 게이트웨이
///
/// 세션 시작 시 한 번 만들어 필요한 곳에 넘겨준다.
#[derive(Clone)]
pub struct GenerationGateway {
    generator: Arc<dyn TextGenerator>,
    model: String,
}

impl GenerationGateway {
    pub fn new(generator: Arc<dyn TextGenerator>, model: impl Into<String>) -> Self {
        Self {
            generator,
            model: model.into(),
        }
    }

    /// 설정의 공급자와 모델로 게이트웨이 생성
    pub fn from_config(config: &Config) -> Result<Self, GenerationError> {
        Ok(Self::new(build_generator(config)?, &config.llm_model_name))
    }

    pub fn provider_name(&self) -> &str {
        self.generator.provider_name()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// 지문, 문제, 어휘를 한 번에 생성한다.
    pub async fn generate_full(
        &self,
        options: &GenerationOptions,
    ) -> Result<GeneratedContent, GenerationError> {
        info!(
            "📝 전체 생성 요청: 주제 '{}', {}학년, 문단 {}개, 문제 {}개",
            options.topic, options.grade, options.num_paragraphs, options.num_questions
        );

        let request = GenerationRequest::new(&self.model, prompts::full_generation(options))
            .with_system_instruction(prompts::SYSTEM_INSTRUCTION)
            .with_schema(schema::full_generation_schema());
        let response = self.generator.generate(request).await?;

        let content = schema::parse_full_generation(&response.text, options).map_err(|e| {
            warn!("전체 생성 응답 검증 실패: {}", e);
            e
        })?;

        debug!("전체 생성 완료: '{}'", content.title);
        Ok(content)
    }

    /// 문단 하나를 앞뒤 흐름에 맞게 다시 쓴다.
    ///
    /// 원래 문단의 괄호 표시는 모두 한 번씩 남아 있어야 하고, 새 표시는 허용하지 않는다.
    pub async fn regenerate_paragraph(
        &self,
        options: &GenerationOptions,
        paragraphs: &[Paragraph],
        index: usize,
    ) -> Result<Paragraph, GenerationError> {
        let original = paragraphs.get(index).ok_or_else(|| {
            GenerationError::invalid(format!(
                "문단 위치 {} 이(가) 범위를 벗어났습니다 (문단 {}개)",
                index,
                paragraphs.len()
            ))
        })?;
        debug!("문단 {} 재작성 요청", index + 1);

        let request = GenerationRequest::new(
            &self.model,
            prompts::paragraph_regeneration(options, paragraphs, index),
        );
        let response = self.generator.generate(request).await?;

        let text = response.text.trim();
        if text.is_empty() {
            return Err(GenerationError::EmptyResponse {
                model: self.model.clone(),
            });
        }

        let len = text.chars().count();
        if len > MAX_PARAGRAPH_CHARS {
            return Err(GenerationError::invalid(format!(
                "재작성된 문단이 {}자로 {}자를 넘습니다",
                len, MAX_PARAGRAPH_CHARS
            )));
        }

        for marker in placeholder::PLACEHOLDER_CHARS {
            let before = placeholder::count_marker_in(&original.content, marker);
            let after = placeholder::count_marker_in(text, marker);
            if before > 0 && after != 1 {
                return Err(GenerationError::invalid(format!(
                    "재작성된 문단에서 {} 표시가 {}번 나타납니다",
                    placeholder::marker_token(marker),
                    after
                )));
            }
            if before == 0 && after > 0 {
                return Err(GenerationError::invalid(format!(
                    "재작성된 문단에 원래 없던 {} 표시가 있습니다",
                    placeholder::marker_token(marker)
                )));
            }
        }

        Ok(Paragraph::new(text))
    }

    /// 문단 팩트체크. 웹 검색 근거가 있으면 참고 자료 목록을 덧붙인다.
    pub async fn fact_check_paragraph(&self, content: &str) -> Result<String, GenerationError> {
        debug!("팩트체크 요청: {}", crate::utils::truncate_text(content, 30));

        let request =
            GenerationRequest::new(&self.model, prompts::fact_check(content)).with_web_search();
        let response = self.generator.generate(request).await?;

        let body = response.text.trim();
        if body.is_empty() {
            return Err(GenerationError::EmptyResponse {
                model: self.model.clone(),
            });
        }

        Ok(append_citations(body, &response.citations))
    }

    /// 문제를 새 유형으로 다시 만들고, 필요하면 지문의 괄호 표시를 넣거나 뺀다.
    pub async fn regenerate_question(
        &self,
        content: &GeneratedContent,
        index: usize,
        new_type: QuestionType,
    ) -> Result<QuestionRegeneration, GenerationError> {
        let old = content.questions.get(index).ok_or_else(|| {
            GenerationError::invalid(format!(
                "문제 위치 {} 이(가) 범위를 벗어났습니다 (문제 {}개)",
                index,
                content.questions.len()
            ))
        })?;
        info!(
            "🔄 {}번 문제 유형 변경 요청: {} → {}",
            index + 1,
            old.question_type,
            new_type
        );

        let request = GenerationRequest::new(
            &self.model,
            prompts::question_regeneration(content, index, new_type),
        )
        .with_schema(schema::question_regeneration_schema());
        let response = self.generator.generate(request).await?;

        let (mut question, mut texts) = schema::parse_question_regeneration(&response.text)?;

        if question.question_type != new_type {
            warn!(
                "요청 유형 {} 대신 {} 이(가) 반환되어 요청 유형으로 고정합니다",
                new_type, question.question_type
            );
            question.question_type = new_type;
        }

        let plan = placeholder::MarkerPlan::for_change(old, &content.paragraphs, new_type);

        // 표시가 필요 없는 유형으로 바뀌었는데 이전 표시가 남아 있으면 원래 답으로 채운다
        if let Some(marker) = plan.removed {
            for text in texts.iter_mut() {
                if placeholder::count_marker_in(text, marker) > 0 {
                    debug!(
                        "남은 {} 표시를 '{}' 로 대체",
                        placeholder::marker_token(marker),
                        old.correct_answer
                    );
                    *text = placeholder::substitute_marker(text, marker, &old.correct_answer);
                }
            }
        }

        let (paragraphs, changed) = merge_paragraphs(&content.paragraphs, texts)?;

        let expected = plan.expected_after(&placeholder::markers_in_use(&content.paragraphs));
        let actual = placeholder::markers_in_use(&paragraphs);
        if actual != expected {
            let tokens = |markers: &[char]| {
                markers
                    .iter()
                    .map(|m| placeholder::marker_token(*m))
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            return Err(GenerationError::invalid(format!(
                "본문 표시가 [{}] 여야 하는데 [{}] 입니다",
                tokens(&expected),
                tokens(&actual)
            )));
        }

        let new_marker = placeholder::check_marker_reference(&question, &paragraphs)
            .map_err(GenerationError::invalid)?;
        if let (Some(found), Some(target)) = (new_marker, plan.target()) {
            if found != target {
                return Err(GenerationError::invalid(format!(
                    "새 문제는 {} 표시를 참조해야 하는데 {} 를 참조합니다",
                    placeholder::marker_token(target),
                    placeholder::marker_token(found)
                )));
            }
        }

        let mut used_by_others = HashSet::new();
        for (i, other) in content.questions.iter().enumerate() {
            if i == index {
                continue;
            }
            let marker = placeholder::check_marker_reference(other, &paragraphs).map_err(|reason| {
                GenerationError::invalid(format!("{}번 문제의 표시가 훼손되었습니다: {}", i + 1, reason))
            })?;
            used_by_others.extend(marker);
        }
        if let Some(marker) = new_marker.filter(|m| used_by_others.contains(m)) {
            return Err(GenerationError::invalid(format!(
                "{} 표시는 이미 다른 문제가 사용 중입니다",
                placeholder::marker_token(marker)
            )));
        }

        debug!("{}번 문제 재생성 완료, 바뀐 문단: {:?}", index + 1, changed);
        Ok(QuestionRegeneration {
            question,
            paragraphs,
            changed,
        })
    }
}

/// 출처를 주소 기준으로 중복 제거해 번호 목록으로 덧붙인다.
pub fn append_citations(body: &str, citations: &[Citation]) -> String {
    let mut seen = HashSet::new();
    let unique: Vec<&Citation> = citations
        .iter()
        .filter(|c| seen.insert(c.uri.as_str()))
        .collect();

    if unique.is_empty() {
        return body.to_string();
    }

    let mut report = format!("{}\n\n---\n**참고 자료:**\n", body);
    for (i, citation) in unique.iter().enumerate() {
        report.push_str(&format!("{}. {} ({})\n", i + 1, citation.title, citation.uri));
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::GenerationResponse;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// 미리 정한 응답을 차례로 돌려주는 생성기
    struct ScriptedGenerator {
        responses: Mutex<VecDeque<Result<GenerationResponse, GenerationError>>>,
        requests: Mutex<Vec<GenerationRequest>>,
    }

    impl ScriptedGenerator {
        fn new(responses: Vec<Result<GenerationResponse, GenerationError>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(
            &self,
            request: GenerationRequest,
        ) -> Result<GenerationResponse, GenerationError> {
            self.requests.lock().unwrap().push(request);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(GenerationError::invalid("응답 없음")))
        }

        fn provider_name(&self) -> &str {
            "scripted"
        }
    }

    fn gateway(
        responses: Vec<Result<GenerationResponse, GenerationError>>,
    ) -> (GenerationGateway, Arc<ScriptedGenerator>) {
        let generator = ScriptedGenerator::new(responses);
        (GenerationGateway::new(generator.clone(), "test-model"), generator)
    }

    fn question(question_type: QuestionType, text: &str, answer: &str) -> Question {
        Question {
            id: crate::models::new_id(),
            question_text: text.into(),
            format: Default::default(),
            question_type,
            options: vec![
                "결국".into(),
                "하지만".into(),
                "예를 들어".into(),
                "또한".into(),
                "왜냐하면".into(),
            ],
            correct_answer: answer.into(),
        }
    }

    fn content() -> GeneratedContent {
        GeneratedContent {
            title: "화산".into(),
            paragraphs: vec![
                Paragraph::new("화산은 땅속 마그마가 분출한 곳이다."),
                Paragraph::new("마그마가 식으면 (㉠) 암석이 된다."),
                Paragraph::new("화산재는 땅을 기름지게 한다."),
            ],
            questions: vec![
                question(QuestionType::Conjunctive, "(㉠)에 들어갈 말로 알맞은 것은?", "결국"),
                question(QuestionType::Factual, "화산은 무엇인가?", "하지만"),
            ],
            vocabulary: vec![],
        }
    }

    fn question_json(question_type: &str, text: &str) -> serde_json::Value {
        json!({
            "questionText": text,
            "questionType": question_type,
            "options": ["가", "나", "다", "라", "마"],
            "correctAnswer": "가"
        })
    }

    #[tokio::test]
    async fn test_generate_full_sends_schema_and_system_instruction() {
        let body = json!({
            "title": "화산",
            "paragraphs": ["가", "나 (㉠)", "다"],
            "questions": [question_json("연결어", "(㉠)에 알맞은 말은?")],
            "vocabulary": []
        });
        let (gateway, generator) = gateway(vec![Ok(GenerationResponse::text(body.to_string()))]);
        let options = GenerationOptions {
            topic: "화산".into(),
            num_paragraphs: 3,
            num_questions: 1,
            ..Default::default()
        };

        let content = gateway.generate_full(&options).await.unwrap();
        assert_eq!(content.paragraphs.len(), 3);

        let requests = generator.requests.lock().unwrap();
        assert_eq!(requests[0].model, "test-model");
        assert!(requests[0].response_schema.is_some());
        assert!(requests[0].system_instruction.is_some());
        assert!(!requests[0].web_search);
    }

    #[tokio::test]
    async fn test_regenerate_paragraph_validates_markers_and_length() {
        let content = content();
        let options = GenerationOptions::default();

        let (gateway, _) = gateway(vec![
            Ok(GenerationResponse::text("  식은 마그마는 (㉠) 단단한 암석이 된다.  ")),
            Ok(GenerationResponse::text("식은 마그마는 단단한 암석이 된다.")),
            Ok(GenerationResponse::text("가".repeat(MAX_PARAGRAPH_CHARS + 1))),
            Ok(GenerationResponse::text("화산은 (㉡) 분출한다.")),
        ]);

        let ok = gateway
            .regenerate_paragraph(&options, &content.paragraphs, 1)
            .await
            .unwrap();
        assert_eq!(ok.content, "식은 마그마는 (㉠) 단단한 암석이 된다.");
        assert_ne!(ok.id, content.paragraphs[1].id);

        assert!(gateway.regenerate_paragraph(&options, &content.paragraphs, 1).await.is_err());
        assert!(gateway.regenerate_paragraph(&options, &content.paragraphs, 0).await.is_err());
        assert!(gateway.regenerate_paragraph(&options, &content.paragraphs, 0).await.is_err());
        assert!(gateway.regenerate_paragraph(&options, &content.paragraphs, 9).await.is_err());
    }

    #[tokio::test]
    async fn test_fact_check_appends_unique_citations() {
        let response = GenerationResponse {
            text: "[최종 요약] 검증 결과, 사실에 부합합니다.".into(),
            citations: vec![
                Citation { uri: "https://a.example".into(), title: "A".into() },
                Citation { uri: "https://b.example".into(), title: "B".into() },
                Citation { uri: "https://a.example".into(), title: "A 다시".into() },
            ],
        };
        let (gateway, generator) = gateway(vec![Ok(response)]);

        let report = gateway.fact_check_paragraph("화산은 산이다.").await.unwrap();
        assert_eq!(
            report,
            "[최종 요약] 검증 결과, 사실에 부합합니다.\n\n---\n**참고 자료:**\n1. A (https://a.example)\n2. B (https://b.example)\n"
        );
        assert!(generator.requests.lock().unwrap()[0].web_search);
    }

    #[test]
    fn test_append_citations_without_sources() {
        assert_eq!(append_citations("요약", &[]), "요약");
    }

    #[tokio::test]
    async fn test_regenerate_question_removes_marker_and_keeps_ids() {
        let original = content();
        let body = json!({
            "newQuestion": question_json("사실적 사고", "마그마가 식으면 무엇이 되는가?"),
            "updatedParagraphs": [
                "화산은 땅속 마그마가 분출한 곳이다.",
                "마그마가 식으면 결국 암석이 된다.",
                "화산재는 땅을 기름지게 한다."
            ]
        });
        let (gateway, _) = gateway(vec![Ok(GenerationResponse::text(body.to_string()))]);

        let result = gateway
            .regenerate_question(&original, 0, QuestionType::Factual)
            .await
            .unwrap();
        assert_eq!(result.changed, vec![1]);
        assert_eq!(result.paragraphs[0].id, original.paragraphs[0].id);
        assert_ne!(result.paragraphs[1].id, original.paragraphs[1].id);
        assert_eq!(placeholder::count_marker(&result.paragraphs, '㉠'), 0);
    }

    #[tokio::test]
    async fn test_regenerate_question_substitutes_leftover_marker() {
        let original = content();
        let body = json!({
            "newQuestion": question_json("추론적 사고", "화산재가 땅에 주는 영향은?"),
            "updatedParagraphs": original.paragraphs.iter().map(|p| p.content.clone()).collect::<Vec<_>>()
        });
        let (gateway, _) = gateway(vec![Ok(GenerationResponse::text(body.to_string()))]);

        let result = gateway
            .regenerate_question(&original, 0, QuestionType::Inferential)
            .await
            .unwrap();
        assert_eq!(result.paragraphs[1].content, "마그마가 식으면 결국 암석이 된다.");
        assert_eq!(result.changed, vec![1]);
    }

    #[tokio::test]
    async fn test_regenerate_question_rejects_bad_marker_use() {
        let original = content();
        let reuse = json!({
            "newQuestion": question_json("빈칸 추론", "(㉠)에 알맞은 말은?"),
            "updatedParagraphs": original.paragraphs.iter().map(|p| p.content.clone()).collect::<Vec<_>>()
        });
        let short = json!({
            "newQuestion": question_json("빈칸 추론", "(㉡)에 알맞은 말은?"),
            "updatedParagraphs": ["화산은 (㉡) 분출한 곳이다."]
        });
        let (gateway, _) = gateway(vec![
            Ok(GenerationResponse::text(reuse.to_string())),
            Ok(GenerationResponse::text(short.to_string())),
        ]);

        assert!(gateway
            .regenerate_question(&original, 1, QuestionType::FillInBlank)
            .await
            .is_err());
        assert!(gateway
            .regenerate_question(&original, 1, QuestionType::FillInBlank)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_regenerate_question_requires_next_free_marker_only() {
        let original = content();
        let with_paragraphs = |marker: &str, first: &str, third: &str| {
            json!({
                "newQuestion": question_json("빈칸 추론", &format!("({})에 알맞은 말은?", marker)),
                "updatedParagraphs": [first, original.paragraphs[1].content, third]
            })
            .to_string()
        };
        let first = original.paragraphs[0].content.as_str();
        let (gateway, _) = gateway(vec![
            // ㉡ 차례인데 ㉢ 을 넣음
            Ok(GenerationResponse::text(with_paragraphs("㉢", first, "화산재는 (㉢) 땅을 기름지게 한다."))),
            // ㉡ 과 함께 아무도 쓰지 않는 ㉤ 을 넣음
            Ok(GenerationResponse::text(with_paragraphs(
                "㉡",
                "화산은 (㉤) 마그마가 분출한 곳이다.",
                "화산재는 (㉡) 땅을 기름지게 한다.",
            ))),
            Ok(GenerationResponse::text(with_paragraphs("㉡", first, "화산재는 (㉡) 땅을 기름지게 한다."))),
        ]);

        let out_of_order = gateway
            .regenerate_question(&original, 1, QuestionType::FillInBlank)
            .await
            .unwrap_err();
        assert!(out_of_order.to_string().contains("(㉢)"));

        let stray = gateway
            .regenerate_question(&original, 1, QuestionType::FillInBlank)
            .await
            .unwrap_err();
        assert!(stray.to_string().contains("(㉤)"));

        let result = gateway
            .regenerate_question(&original, 1, QuestionType::FillInBlank)
            .await
            .unwrap();
        assert_eq!(placeholder::markers_in_use(&result.paragraphs), vec!['㉠', '㉡']);
        assert_eq!(result.changed, vec![2]);
    }

    #[tokio::test]
    async fn test_regenerate_question_forces_requested_type() {
        let original = content();
        let body = json!({
            "newQuestion": question_json("사실적 사고", "화산 주변에서 볼 수 있는 것은?"),
            "updatedParagraphs": original.paragraphs.iter().map(|p| p.content.clone()).collect::<Vec<_>>()
        });
        let (gateway, _) = gateway(vec![Ok(GenerationResponse::text(body.to_string()))]);

        let result = gateway
            .regenerate_question(&original, 1, QuestionType::Critical)
            .await
            .unwrap();
        assert_eq!(result.question.question_type, QuestionType::Critical);
        assert!(result.changed.is_empty());
    }
}
