pub mod catalog;
pub mod content;
pub mod loaders;
pub mod merge;
pub mod options;
pub mod question_type;

pub use content::{new_id, GeneratedContent, Paragraph, Question, QuestionFormat, VocabularyItem};
pub use loaders::{load_session_preset, SessionPreset};
pub use merge::merge_paragraphs;
pub use options::{compose_topic, GenerationOptions, SubTopic, TopicSelection, DIRECT_INPUT_LABEL};
pub use question_type::QuestionType;
