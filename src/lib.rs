//! # 문해력 교실
//!
//! 주제, 학년, 난이도를 받아 초등학생용 설명문과 독해 문제, 어휘 목록을 생성하고
//! 문단·문제 단위로 다시 만든 뒤 DOCX 문서로 내보내는 라이브러리
//!
//! ## 구조
//!
//! 네 계층으로 나뉜다.
//!
//! ### ① 기반 계층 (Infrastructure)
//! - `infrastructure/` - 외부 생성 서비스와의 요청/응답만 담당
//! - `TextGenerator` - Gemini / OpenAI 호환 구현
//!
//! ### ② 업무 능력 계층 (Services)
//! - `GenerationGateway` - 전체 생성, 문단 재작성, 팩트체크, 문제 유형 변경
//! - `placeholder` - 빈칸 표시 (㉠, ㉡ …) 규약
//! - `ExportAssembler` - 문서 배치와 DOCX 렌더링
//!
//! ### ③ 흐름 계층 (Workflow)
//! - `OptionsController` - 생성 옵션
//! - `ContentStore` - 생성 결과, 진행 상태, 되쓰기
//!
//! ### ④ 편성 계층 (Orchestration)
//! - `App` - 세션 하나의 작업 순서 조율

pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 자주 쓰는 타입 재노출
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::TextGenerator;
pub use models::{GeneratedContent, GenerationOptions, Paragraph, Question, QuestionType};
pub use orchestrator::{App, ItemOutcome, ItemRequest};
pub use services::{ExportAssembler, GenerationGateway};
pub use workflow::{ContentStore, OptionsController};
