//! 편성 계층 (Orchestration Layer)
//!
//! ## 책임
//!
//! 세션 하나의 수명 동안 게이트웨이, 옵션, 저장소를 소유하고 작업 순서를 조율한다.
//!
//! ## 계층 관계
//!
//! ```text
//! orchestrator::App (세션)
//!     ↓
//! workflow (OptionsController / ContentStore)
//!     ↓
//! services (gateway / export / placeholder)
//!     ↓
//! infrastructure (TextGenerator: Gemini / OpenAI 호환)
//! ```
//!
//! 편성 계층은 업무 판단을 하지 않는다. 검증은 services, 되쓰기 규칙은 workflow 에 있다.

pub mod app;

pub use app::{App, Completion, ItemOutcome, ItemRequest};
