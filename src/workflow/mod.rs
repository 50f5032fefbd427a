pub mod content_store;
pub mod options_controller;

pub use content_store::{
    ContentStore, FactCheckReport, PendingKey, QuestionRequest, RequestTicket, WriteBack,
};
pub use options_controller::OptionsController;
