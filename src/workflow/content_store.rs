//! 생성 결과 저장소 - 흐름 계층
//!
//! 마지막 생성 결과와 요소별 진행 상태를 가진다.
//!
//! 모든 요청은 `begin_*` 으로 시작해 `finish_*` 로 끝난다.
//! - `begin_*`: 진행 표시를 올리고, 요청에 필요한 스냅샷과 티켓을 돌려준다
//! - `finish_*`: 결과와 관계없이 진행 표시를 내리고, 성공한 결과만 되쓴다
//!
//! 같은 요소에 대한 요청이 겹치면 나중에 끝난 응답이 이긴다.
//! 전체 생성으로 내용이 교체된 뒤 도착한 부분 응답은 버린다.

use std::collections::HashMap;
use std::fmt::Display;
use tracing::{debug, info, warn};

use crate::error::{AppError, GenerationError, SessionError};
use crate::models::{GeneratedContent, Paragraph, QuestionType};
use crate::services::QuestionRegeneration;

/// 진행 상태 키 (요소 식별자 기준)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PendingKey {
    Generate,
    Paragraph(String),
    FactCheck(String),
    Question(String),
}

/// 진행 중인 요청 하나
#[derive(Debug, Clone)]
pub struct RequestTicket {
    key: PendingKey,
    /// 요청 시점의 내용 세대
    epoch: u64,
    /// 대상 위치 (전체 생성은 0)
    index: usize,
    /// 팩트체크 대상 문단 원문
    original: Option<String>,
}

impl RequestTicket {
    pub fn key(&self) -> &PendingKey {
        &self.key
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl Display for RequestTicket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.key {
            PendingKey::Generate => write!(f, "[전체 생성 세대#{}]", self.epoch),
            PendingKey::Paragraph(_) => write!(f, "[문단#{} 세대#{}]", self.index + 1, self.epoch),
            PendingKey::FactCheck(_) => write!(f, "[팩트체크 문단#{}]", self.index + 1),
            PendingKey::Question(_) => write!(f, "[문제#{} 세대#{}]", self.index + 1, self.epoch),
        }
    }
}

/// 되쓰기 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteBack {
    /// 내용이 바뀌어 반영됨
    Applied,
    /// 내용이 같아 식별자를 유지함
    Unchanged,
    /// 내용이 교체된 뒤 도착해 버림
    Discarded,
}

/// 팩트체크 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactCheckReport {
    pub title: String,
    pub original_paragraph: String,
    pub body: String,
}

/// 문제 재생성 요청에 필요한 스냅샷
#[derive(Debug, Clone)]
pub struct QuestionRequest {
    pub content: GeneratedContent,
    pub index: usize,
    pub new_type: QuestionType,
}

/// 생성 결과 저장소
#[derive(Debug, Default)]
pub struct ContentStore {
    content: Option<GeneratedContent>,
    /// 전체 생성이 반영될 때마다 증가
    epoch: u64,
    pending: HashMap<PendingKey, usize>,
    /// 문제 식별자별 변경 희망 유형
    type_choices: HashMap<String, QuestionType>,
    show_answers: bool,
}

impl ContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(&self) -> Option<&GeneratedContent> {
        self.content.as_ref()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn is_pending(&self, key: &PendingKey) -> bool {
        self.pending.contains_key(key)
    }

    pub fn is_generating(&self) -> bool {
        self.is_pending(&PendingKey::Generate)
    }

    /// 진행 중인 요청 수
    pub fn pending_count(&self) -> usize {
        self.pending.values().sum()
    }

    pub fn show_answers(&self) -> bool {
        self.show_answers
    }

    /// 정답 표시 전환. 바뀐 값을 돌려준다.
    pub fn toggle_answers(&mut self) -> bool {
        self.show_answers = !self.show_answers;
        self.show_answers
    }

    fn loaded(&self) -> Result<&GeneratedContent, SessionError> {
        self.content.as_ref().ok_or(SessionError::NoContent)
    }

    fn mark(&mut self, key: PendingKey, index: usize, original: Option<String>) -> RequestTicket {
        *self.pending.entry(key.clone()).or_insert(0) += 1;
        RequestTicket {
            key,
            epoch: self.epoch,
            index,
            original,
        }
    }

    fn clear(&mut self, ticket: &RequestTicket) {
        if let Some(count) = self.pending.get_mut(&ticket.key) {
            *count -= 1;
            if *count == 0 {
                self.pending.remove(&ticket.key);
            }
        }
    }

    /// 요청 이후 전체 생성으로 내용이 교체되었는가
    fn is_stale(&self, ticket: &RequestTicket) -> bool {
        ticket.epoch != self.epoch
    }

    fn discard_stale(ticket: &RequestTicket) -> WriteBack {
        warn!("⚠️ {} 내용이 교체된 뒤 도착한 응답을 버립니다", ticket);
        WriteBack::Discarded
    }

    fn settle<T>(&mut self, ticket: &RequestTicket, result: Result<T, GenerationError>) -> Result<T, AppError> {
        self.clear(ticket);
        result.map_err(|e| {
            warn!("❌ {} 요청 실패: {}", ticket, e);
            AppError::from(e)
        })
    }

    // ========== 전체 생성 ==========

    pub fn begin_generate(&mut self) -> RequestTicket {
        self.mark(PendingKey::Generate, 0, None)
    }

    /// 성공하면 내용을 통째로 교체하고 정답 표시를 숨긴다. 실패하면 이전 내용이 그대로 남는다.
    pub fn finish_generate(
        &mut self,
        ticket: RequestTicket,
        result: Result<GeneratedContent, GenerationError>,
    ) -> Result<(), AppError> {
        let content = self.settle(&ticket, result)?;
        info!(
            "✅ 새 내용 반영: '{}' (문단 {}개, 문제 {}개)",
            content.title,
            content.paragraphs.len(),
            content.questions.len()
        );
        self.content = Some(content);
        self.epoch += 1;
        self.show_answers = false;
        self.type_choices.clear();
        Ok(())
    }

    // ========== 문단 재작성 ==========

    /// 대상 문단 표시를 올리고 현재 문단 목록을 돌려준다.
    pub fn begin_paragraph(
        &mut self,
        index: usize,
    ) -> Result<(RequestTicket, Vec<Paragraph>), SessionError> {
        let paragraphs = self.loaded()?.paragraphs.clone();
        let id = paragraphs
            .get(index)
            .map(|p| p.id.clone())
            .ok_or(SessionError::IndexOutOfRange {
                index,
                len: paragraphs.len(),
            })?;
        let ticket = self.mark(PendingKey::Paragraph(id), index, None);
        Ok((ticket, paragraphs))
    }

    /// 해당 위치에만 되쓴다. 내용이 같으면 기존 식별자를 유지한다.
    pub fn finish_paragraph(
        &mut self,
        ticket: RequestTicket,
        result: Result<Paragraph, GenerationError>,
    ) -> Result<WriteBack, AppError> {
        let paragraph = self.settle(&ticket, result)?;
        if self.is_stale(&ticket) {
            return Ok(Self::discard_stale(&ticket));
        }

        let Some(slot) = self
            .content
            .as_mut()
            .and_then(|c| c.paragraphs.get_mut(ticket.index))
        else {
            return Ok(WriteBack::Discarded);
        };

        if slot.content == paragraph.content {
            debug!("{} 내용이 같아 식별자를 유지합니다", ticket);
            return Ok(WriteBack::Unchanged);
        }

        *slot = paragraph;
        info!("✅ {} 재작성 반영", ticket);
        Ok(WriteBack::Applied)
    }

    // ========== 팩트체크 ==========

    /// 대상 문단 표시를 올리고 문단 원문을 돌려준다.
    pub fn begin_fact_check(&mut self, index: usize) -> Result<(RequestTicket, String), SessionError> {
        let paragraphs = &self.loaded()?.paragraphs;
        let paragraph = paragraphs
            .get(index)
            .cloned()
            .ok_or(SessionError::IndexOutOfRange {
                index,
                len: paragraphs.len(),
            })?;
        let ticket = self.mark(
            PendingKey::FactCheck(paragraph.id),
            index,
            Some(paragraph.content.clone()),
        );
        Ok((ticket, paragraph.content))
    }

    /// 팩트체크는 내용을 바꾸지 않는다.
    pub fn finish_fact_check(
        &mut self,
        ticket: RequestTicket,
        result: Result<String, GenerationError>,
    ) -> Result<FactCheckReport, AppError> {
        let body = self.settle(&ticket, result)?;
        Ok(FactCheckReport {
            title: format!("문단 {} 팩트체크 결과", ticket.index + 1),
            original_paragraph: ticket.original.unwrap_or_default(),
            body,
        })
    }

    // ========== 문제 유형 변경 ==========

    /// 문제의 변경 희망 유형 지정
    pub fn select_question_type(
        &mut self,
        index: usize,
        question_type: QuestionType,
    ) -> Result<(), SessionError> {
        let questions = &self.loaded()?.questions;
        let id = questions
            .get(index)
            .map(|q| q.id.clone())
            .ok_or(SessionError::IndexOutOfRange {
                index,
                len: questions.len(),
            })?;
        self.type_choices.insert(id, question_type);
        Ok(())
    }

    /// 변경 희망 유형. 지정하지 않았으면 현재 유형.
    pub fn question_type_choice(&self, index: usize) -> Option<QuestionType> {
        let question = self.content.as_ref()?.questions.get(index)?;
        Some(
            self.type_choices
                .get(&question.id)
                .copied()
                .unwrap_or(question.question_type),
        )
    }

    /// 대상 문제 표시를 올리고 현재 내용 스냅샷을 돌려준다.
    pub fn begin_question(&mut self, index: usize) -> Result<(RequestTicket, QuestionRequest), SessionError> {
        let content = self.loaded()?.clone();
        let id = content
            .questions
            .get(index)
            .map(|q| q.id.clone())
            .ok_or(SessionError::IndexOutOfRange {
                index,
                len: content.questions.len(),
            })?;
        let new_type = self
            .question_type_choice(index)
            .ok_or(SessionError::NoContent)?;
        let ticket = self.mark(PendingKey::Question(id), index, None);
        Ok((
            ticket,
            QuestionRequest {
                content,
                index,
                new_type,
            },
        ))
    }

    /// 문제와, 재생성으로 내용이 바뀐 문단 위치만 되쓴다.
    pub fn finish_question(
        &mut self,
        ticket: RequestTicket,
        result: Result<QuestionRegeneration, GenerationError>,
    ) -> Result<WriteBack, AppError> {
        let regeneration = self.settle(&ticket, result)?;
        if self.is_stale(&ticket) {
            return Ok(Self::discard_stale(&ticket));
        }

        let Some(content) = self.content.as_mut() else {
            return Ok(WriteBack::Discarded);
        };
        if ticket.index >= content.questions.len()
            || regeneration.paragraphs.len() != content.paragraphs.len()
        {
            return Ok(WriteBack::Discarded);
        }

        let mut applied = false;

        let slot = &mut content.questions[ticket.index];
        if slot.same_content(&regeneration.question) {
            debug!("{} 문제 내용이 같아 식별자를 유지합니다", ticket);
        } else {
            self.type_choices.remove(&slot.id);
            *slot = regeneration.question;
            applied = true;
        }

        for index in regeneration.changed {
            if let Some(paragraph) = regeneration.paragraphs.get(index) {
                if content.paragraphs[index].content != paragraph.content {
                    content.paragraphs[index] = paragraph.clone();
                    applied = true;
                }
            }
        }

        if applied {
            info!("✅ {} 유형 변경 반영", ticket);
            Ok(WriteBack::Applied)
        } else {
            Ok(WriteBack::Unchanged)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Question, QuestionFormat};

    fn question(question_type: QuestionType, text: &str) -> Question {
        Question {
            id: crate::models::new_id(),
            question_text: text.into(),
            format: QuestionFormat::MultipleChoice,
            question_type,
            options: vec!["가".into(), "나".into(), "다".into(), "라".into(), "마".into()],
            correct_answer: "가".into(),
        }
    }

    fn content() -> GeneratedContent {
        GeneratedContent {
            title: "화산".into(),
            paragraphs: vec![
                Paragraph::new("첫째 문단"),
                Paragraph::new("둘째 문단 (㉠)"),
                Paragraph::new("셋째 문단"),
                Paragraph::new("넷째 문단"),
            ],
            questions: vec![
                question(QuestionType::Conjunctive, "(㉠)에 알맞은 말은?"),
                question(QuestionType::Factual, "화산은 무엇인가?"),
            ],
            vocabulary: vec![],
        }
    }

    fn loaded_store() -> ContentStore {
        let mut store = ContentStore::new();
        let ticket = store.begin_generate();
        store.finish_generate(ticket, Ok(content())).unwrap();
        store
    }

    fn failure() -> GenerationError {
        GenerationError::invalid("테스트 실패")
    }

    #[test]
    fn test_operations_require_content() {
        let mut store = ContentStore::new();
        assert_eq!(store.begin_paragraph(0).unwrap_err(), SessionError::NoContent);
        assert_eq!(store.begin_fact_check(0).unwrap_err(), SessionError::NoContent);
        assert_eq!(store.begin_question(0).unwrap_err(), SessionError::NoContent);
        assert_eq!(store.pending_count(), 0);
    }

    #[test]
    fn test_index_out_of_range() {
        let mut store = loaded_store();
        assert_eq!(
            store.begin_paragraph(4).unwrap_err(),
            SessionError::IndexOutOfRange { index: 4, len: 4 }
        );
        assert!(store.select_question_type(2, QuestionType::Critical).is_err());
    }

    #[test]
    fn test_failed_generation_keeps_previous_content() {
        let mut store = loaded_store();
        let before = store.content().cloned();

        let ticket = store.begin_generate();
        assert!(store.is_generating());
        assert!(store.finish_generate(ticket, Err(failure())).is_err());

        assert!(!store.is_generating());
        assert_eq!(store.content().cloned(), before);
        assert_eq!(store.epoch(), 1);
    }

    #[test]
    fn test_generation_resets_answers_and_choices() {
        let mut store = loaded_store();
        store.toggle_answers();
        store.select_question_type(1, QuestionType::Critical).unwrap();
        assert_eq!(store.question_type_choice(1), Some(QuestionType::Critical));

        let ticket = store.begin_generate();
        store.finish_generate(ticket, Ok(content())).unwrap();
        assert!(!store.show_answers());
        assert_eq!(store.question_type_choice(1), Some(QuestionType::Factual));
    }

    #[test]
    fn test_paragraph_write_back_touches_only_target() {
        let mut store = loaded_store();
        let before = store.content().cloned().unwrap();

        let (ticket, snapshot) = store.begin_paragraph(1).unwrap();
        assert_eq!(snapshot, before.paragraphs);
        assert!(store.is_pending(&PendingKey::Paragraph(before.paragraphs[1].id.clone())));

        let result = store
            .finish_paragraph(ticket, Ok(Paragraph::new("새 둘째 문단 (㉠)")))
            .unwrap();
        assert_eq!(result, WriteBack::Applied);
        assert_eq!(store.pending_count(), 0);

        let after = store.content().unwrap();
        assert_eq!(after.paragraphs.len(), 4);
        assert_ne!(after.paragraphs[1].id, before.paragraphs[1].id);
        for i in [0, 2, 3] {
            assert_eq!(after.paragraphs[i], before.paragraphs[i]);
        }
    }

    #[test]
    fn test_identical_paragraph_keeps_id() {
        let mut store = loaded_store();
        let old_id = store.content().unwrap().paragraphs[2].id.clone();

        let (ticket, _) = store.begin_paragraph(2).unwrap();
        let result = store
            .finish_paragraph(ticket, Ok(Paragraph::new("셋째 문단")))
            .unwrap();
        assert_eq!(result, WriteBack::Unchanged);
        assert_eq!(store.content().unwrap().paragraphs[2].id, old_id);
    }

    #[test]
    fn test_same_entity_last_response_wins() {
        let mut store = loaded_store();
        let (first, _) = store.begin_paragraph(0).unwrap();
        let (second, _) = store.begin_paragraph(0).unwrap();
        assert_eq!(store.pending_count(), 2);

        store
            .finish_paragraph(second, Ok(Paragraph::new("두 번째 요청")))
            .unwrap();
        assert_eq!(store.pending_count(), 1);
        store
            .finish_paragraph(first, Ok(Paragraph::new("첫 번째 요청")))
            .unwrap();

        assert_eq!(store.pending_count(), 0);
        assert_eq!(store.content().unwrap().paragraphs[0].content, "첫 번째 요청");
    }

    #[test]
    fn test_response_after_regeneration_is_discarded() {
        let mut store = loaded_store();
        let (ticket, _) = store.begin_paragraph(0).unwrap();

        let generate = store.begin_generate();
        store.finish_generate(generate, Ok(content())).unwrap();

        let result = store
            .finish_paragraph(ticket, Ok(Paragraph::new("늦은 응답")))
            .unwrap();
        assert_eq!(result, WriteBack::Discarded);
        assert_eq!(store.content().unwrap().paragraphs[0].content, "첫째 문단");
        assert_eq!(store.pending_count(), 0);
    }

    #[test]
    fn test_staleness_follows_epoch_only() {
        let mut store = loaded_store();
        let (ticket, _) = store.begin_paragraph(1).unwrap();
        assert!(!store.is_stale(&ticket));
        assert!(!store.is_stale(&ticket));

        let generate = store.begin_generate();
        store.finish_generate(generate, Ok(content())).unwrap();
        assert!(store.is_stale(&ticket));
        assert_eq!(store.pending_count(), 1);
    }

    #[test]
    fn test_failed_paragraph_clears_pending() {
        let mut store = loaded_store();
        let before = store.content().cloned();
        let (ticket, _) = store.begin_paragraph(3).unwrap();

        assert!(store.finish_paragraph(ticket, Err(failure())).is_err());
        assert_eq!(store.pending_count(), 0);
        assert_eq!(store.content().cloned(), before);
    }

    #[test]
    fn test_fact_check_report() {
        let mut store = loaded_store();
        let (ticket, original) = store.begin_fact_check(1).unwrap();
        assert_eq!(original, "둘째 문단 (㉠)");

        let report = store
            .finish_fact_check(ticket, Ok("[최종 요약] 문제 없음".into()))
            .unwrap();
        assert_eq!(report.title, "문단 2 팩트체크 결과");
        assert_eq!(report.original_paragraph, "둘째 문단 (㉠)");
        assert_eq!(store.pending_count(), 0);
    }

    #[test]
    fn test_question_write_back() {
        let mut store = loaded_store();
        store.select_question_type(0, QuestionType::Factual).unwrap();
        let before = store.content().cloned().unwrap();

        let (ticket, request) = store.begin_question(0).unwrap();
        assert_eq!(request.new_type, QuestionType::Factual);

        let mut paragraphs = before.paragraphs.clone();
        paragraphs[1] = Paragraph::new("둘째 문단 결국");
        let regeneration = QuestionRegeneration {
            question: question(QuestionType::Factual, "둘째 문단의 내용은?"),
            paragraphs,
            changed: vec![1],
        };

        let result = store.finish_question(ticket, Ok(regeneration)).unwrap();
        assert_eq!(result, WriteBack::Applied);

        let after = store.content().unwrap();
        assert_eq!(after.questions[0].question_type, QuestionType::Factual);
        assert_ne!(after.questions[0].id, before.questions[0].id);
        assert_eq!(after.questions[1], before.questions[1]);
        assert_eq!(after.paragraphs[0], before.paragraphs[0]);
        assert_eq!(after.paragraphs[1].content, "둘째 문단 결국");
        assert_eq!(store.question_type_choice(0), Some(QuestionType::Factual));
    }

    #[test]
    fn test_identical_question_keeps_id() {
        let mut store = loaded_store();
        let before = store.content().cloned().unwrap();
        let (ticket, _) = store.begin_question(1).unwrap();

        let mut same = before.questions[1].clone();
        same.id = crate::models::new_id();
        let regeneration = QuestionRegeneration {
            question: same,
            paragraphs: before.paragraphs.clone(),
            changed: vec![],
        };

        let result = store.finish_question(ticket, Ok(regeneration)).unwrap();
        assert_eq!(result, WriteBack::Unchanged);
        assert_eq!(store.content().unwrap().questions[1].id, before.questions[1].id);
    }

    #[test]
    fn test_toggle_answers() {
        let mut store = ContentStore::new();
        assert!(!store.show_answers());
        assert!(store.toggle_answers());
        assert!(!store.toggle_answers());
    }
}
