//! 업무 능력 계층 (Services)
//!
//! - `gateway`: 생성 서비스 요청 네 가지
//! - `prompts` / `schema`: 요청 조립과 응답 검증
//! - `placeholder`: 빈칸 표시 규약
//! - `export`: 문서 내보내기

pub mod export;
pub mod gateway;
pub mod placeholder;
pub mod prompts;
pub mod schema;

pub use export::{ExportArtifact, ExportAssembler, ExportBlock};
pub use gateway::{GenerationGateway, QuestionRegeneration};
