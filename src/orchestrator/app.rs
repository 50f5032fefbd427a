//! 애플리케이션 - 편성 계층
//!
//! ## 책임
//!
//! 1. **초기화**: 설정으로 게이트웨이와 내보내기 조립기를 한 번 만든다
//! 2. **요청 진행**: 모든 작업을 `begin → 게이트웨이 호출 → finish` 순서로 진행한다
//! 3. **동시 요청**: 항목별 요청을 `dispatch` 로 시작하고 `complete` 로 반영한다.
//!    서로 다른 항목의 요청은 동시에 진행되고, 끝나는 순서대로 반영된다
//! 4. **내보내기**: 현재 내용을 문서로 만들어 내보내기 디렉터리에 쓴다
//!
//! 오류는 호출한 작업에서 돌려줄 뿐, 세션을 끝내지 않는다.

use futures::future::{BoxFuture, FutureExt};
use futures::stream::{FuturesUnordered, StreamExt};
use std::future::Future;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AppResult, GenerationError, SessionError};
use crate::models::{load_session_preset, GeneratedContent, Paragraph, QuestionType};
use crate::services::export::write_artifact;
use crate::services::{ExportArtifact, ExportAssembler, GenerationGateway, QuestionRegeneration};
use crate::utils::logging::{log_generation_summary, log_startup};
use crate::workflow::{ContentStore, FactCheckReport, OptionsController, RequestTicket, WriteBack};

/// 항목별 요청 (위치 기준)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemRequest {
    /// 문단 재작성
    Paragraph(usize),
    /// 문단 팩트체크
    FactCheck(usize),
    /// 문제 유형 변경
    Question(usize),
}

impl ItemRequest {
    pub fn index(&self) -> usize {
        match *self {
            ItemRequest::Paragraph(i) | ItemRequest::FactCheck(i) | ItemRequest::Question(i) => i,
        }
    }
}

/// 아직 반영하지 않은 응답
#[derive(Debug)]
pub enum Completion {
    Paragraph(RequestTicket, Result<Paragraph, GenerationError>),
    FactCheck(RequestTicket, Result<String, GenerationError>),
    Question(RequestTicket, Result<QuestionRegeneration, GenerationError>),
}

/// 반영 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// 문단 또는 문제 되쓰기
    Written(WriteBack),
    /// 팩트체크 보고서 (내용은 바뀌지 않음)
    Report(FactCheckReport),
}

/// 애플리케이션 주 구조체
pub struct App {
    config: Config,
    gateway: GenerationGateway,
    assembler: ExportAssembler,
    options: OptionsController,
    store: ContentStore,
}

impl App {
    /// 설정의 공급자로 게이트웨이를 만들어 초기화
    pub fn initialize(config: Config) -> AppResult<Self> {
        let gateway = GenerationGateway::from_config(&config)?;
        Self::with_gateway(config, gateway)
    }

    /// 이미 만든 게이트웨이로 초기화
    pub fn with_gateway(config: Config, gateway: GenerationGateway) -> AppResult<Self> {
        log_startup(&config);
        info!("🔌 생성 서비스 연결: {}", gateway.provider_name());

        Ok(Self {
            config,
            gateway,
            assembler: ExportAssembler::new()?,
            options: OptionsController::new(),
            store: ContentStore::new(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn options(&self) -> &OptionsController {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut OptionsController {
        &mut self.options
    }

    pub fn store(&self) -> &ContentStore {
        &self.store
    }

    pub fn content(&self) -> Option<&GeneratedContent> {
        self.store.content()
    }

    /// 현재 옵션으로 전체 생성. 실패하면 이전 내용이 그대로 남는다.
    pub async fn generate(&mut self) -> AppResult<&GeneratedContent> {
        self.options.ensure_can_generate()?;
        let options = self.options.options().clone();

        let ticket = self.store.begin_generate();
        let result = self.gateway.generate_full(&options).await;
        self.store.finish_generate(ticket, result)?;

        let content = self.store.content().ok_or(SessionError::NoContent)?;
        log_generation_summary(content);
        Ok(content)
    }

    // ========== 항목별 요청 시작 ==========
    //
    // 저장소에 표시를 올리고, 게이트웨이 복제본만 쥔 미래 값을 돌려준다.
    // 돌려받은 미래 값은 `App` 을 빌리지 않으므로 여러 개를 동시에 기다릴 수 있다.

    fn begin_paragraph(
        &mut self,
        index: usize,
    ) -> AppResult<impl Future<Output = (RequestTicket, Result<Paragraph, GenerationError>)> + Send + 'static>
    {
        let (ticket, paragraphs) = self.store.begin_paragraph(index)?;
        let options = self.options.options().clone();
        let gateway = self.gateway.clone();
        Ok(async move {
            let result = gateway
                .regenerate_paragraph(&options, &paragraphs, index)
                .await;
            (ticket, result)
        })
    }

    fn begin_fact_check(
        &mut self,
        index: usize,
    ) -> AppResult<impl Future<Output = (RequestTicket, Result<String, GenerationError>)> + Send + 'static>
    {
        let (ticket, paragraph) = self.store.begin_fact_check(index)?;
        let gateway = self.gateway.clone();
        Ok(async move {
            let result = gateway.fact_check_paragraph(&paragraph).await;
            (ticket, result)
        })
    }

    fn begin_question(
        &mut self,
        index: usize,
    ) -> AppResult<
        impl Future<Output = (RequestTicket, Result<QuestionRegeneration, GenerationError>)>
            + Send
            + 'static,
    > {
        let (ticket, request) = self.store.begin_question(index)?;
        let gateway = self.gateway.clone();
        Ok(async move {
            let result = gateway
                .regenerate_question(&request.content, request.index, request.new_type)
                .await;
            (ticket, result)
        })
    }

    /// 항목별 요청을 시작한다. 돌려받은 미래 값의 결과는 [`App::complete`] 로 반영한다.
    pub fn dispatch(&mut self, request: ItemRequest) -> AppResult<BoxFuture<'static, Completion>> {
        Ok(match request {
            ItemRequest::Paragraph(index) => self
                .begin_paragraph(index)?
                .map(|(ticket, result)| Completion::Paragraph(ticket, result))
                .boxed(),
            ItemRequest::FactCheck(index) => self
                .begin_fact_check(index)?
                .map(|(ticket, result)| Completion::FactCheck(ticket, result))
                .boxed(),
            ItemRequest::Question(index) => self
                .begin_question(index)?
                .map(|(ticket, result)| Completion::Question(ticket, result))
                .boxed(),
        })
    }

    /// 도착한 응답을 반영한다. 진행 표시는 성공과 실패 모두 내려간다.
    pub fn complete(&mut self, completion: Completion) -> AppResult<ItemOutcome> {
        match completion {
            Completion::Paragraph(ticket, result) => self
                .store
                .finish_paragraph(ticket, result)
                .map(ItemOutcome::Written),
            Completion::FactCheck(ticket, result) => self
                .store
                .finish_fact_check(ticket, result)
                .map(ItemOutcome::Report),
            Completion::Question(ticket, result) => self
                .store
                .finish_question(ticket, result)
                .map(ItemOutcome::Written),
        }
    }

    /// 종류가 섞인 항목별 요청을 동시에 보내고 끝나는 순서대로 반영한다.
    pub async fn run_concurrently(
        &mut self,
        requests: &[ItemRequest],
    ) -> Vec<(ItemRequest, AppResult<ItemOutcome>)> {
        let mut outcomes = Vec::with_capacity(requests.len());
        let mut in_flight = FuturesUnordered::new();

        for &request in requests {
            match self.dispatch(request) {
                Ok(pending) => in_flight.push(pending.map(move |completion| (request, completion))),
                Err(e) => outcomes.push((request, Err(e))),
            }
        }
        debug!("동시 요청 {}건 진행 중", in_flight.len());

        while let Some((request, completion)) = in_flight.next().await {
            outcomes.push((request, self.complete(completion)));
        }

        let failed = outcomes.iter().filter(|(_, r)| r.is_err()).count();
        if failed > 0 {
            warn!("⚠️ 요청 {}건 중 {}건 실패", outcomes.len(), failed);
        }
        outcomes
    }

    // ========== 항목별 작업 ==========

    /// 문단 하나 재작성
    pub async fn regenerate_paragraph(&mut self, index: usize) -> AppResult<WriteBack> {
        let (ticket, result) = self.begin_paragraph(index)?.await;
        self.store.finish_paragraph(ticket, result)
    }

    /// 여러 문단을 동시에 재작성한다. 응답은 끝난 순서대로 반영된다.
    ///
    /// 같은 위치가 여러 번 들어 있으면 나중에 끝난 응답이 남는다.
    pub async fn regenerate_paragraphs(
        &mut self,
        indices: &[usize],
    ) -> Vec<(usize, AppResult<WriteBack>)> {
        let mut outcomes = Vec::with_capacity(indices.len());
        let mut in_flight = FuturesUnordered::new();

        for &index in indices {
            match self.begin_paragraph(index) {
                Ok(pending) => in_flight.push(pending),
                Err(e) => outcomes.push((index, Err(e))),
            }
        }

        while let Some((ticket, result)) = in_flight.next().await {
            let index = ticket.index();
            outcomes.push((index, self.store.finish_paragraph(ticket, result)));
        }

        let failed = outcomes.iter().filter(|(_, r)| r.is_err()).count();
        if failed > 0 {
            warn!("⚠️ 문단 재작성 {}건 중 {}건 실패", outcomes.len(), failed);
        }
        outcomes
    }

    /// 문단 팩트체크
    pub async fn fact_check(&mut self, index: usize) -> AppResult<FactCheckReport> {
        let (ticket, result) = self.begin_fact_check(index)?.await;
        self.store.finish_fact_check(ticket, result)
    }

    /// 문제의 변경 희망 유형 지정
    pub fn select_question_type(&mut self, index: usize, question_type: QuestionType) -> AppResult<()> {
        Ok(self.store.select_question_type(index, question_type)?)
    }

    /// 지정한 유형(없으면 현재 유형)으로 문제 재생성
    pub async fn regenerate_question(&mut self, index: usize) -> AppResult<WriteBack> {
        let (ticket, result) = self.begin_question(index)?.await;
        self.store.finish_question(ticket, result)
    }

    /// 정답 표시 전환
    pub fn toggle_answers(&mut self) -> bool {
        self.store.toggle_answers()
    }

    /// 현재 내용을 문서로 만든다. 저장된 내용은 바뀌지 않는다.
    pub fn export(&self) -> AppResult<ExportArtifact> {
        let content = self.store.content().ok_or(SessionError::NoContent)?;
        Ok(self.assembler.export(content)?)
    }

    /// 문서를 만들어 지정한 디렉터리에 쓴다.
    pub async fn export_to(&self, dir: &Path) -> AppResult<PathBuf> {
        let artifact = self.export()?;
        Ok(write_artifact(&artifact, dir).await?)
    }

    /// 프리셋을 적용하고 한 번 생성한 뒤 내보내기 디렉터리에 문서를 쓴다.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        if let Some(preset_file) = self.config.preset_file.clone() {
            let preset = load_session_preset(Path::new(&preset_file)).await?;
            self.options.apply_preset(&preset)?;
        }

        info!("📝 주제: '{}'", self.options.options().topic);
        self.generate().await?;

        let export_dir = PathBuf::from(&self.config.export_dir);
        let path = self.export_to(&export_dir).await?;
        info!("🎉 완료: {}", path.display());

        Ok(())
    }
}
