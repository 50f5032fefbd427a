//! 생성 옵션 관리 - 흐름 계층
//!
//! 2단계 주제 선택(대분류/소분류/직접 입력)과 학년, 난이도, 문단·문제 수를 관리한다.
//! 주제 문자열은 항상 현재 선택 상태로부터 다시 구성된다.

use tracing::debug;

use crate::error::SessionError;
use crate::models::catalog;
use crate::models::options::{clamp_paragraphs, clamp_questions};
use crate::models::{GenerationOptions, SessionPreset, SubTopic, TopicSelection, DIRECT_INPUT_LABEL};

/// 옵션 관리자
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionsController {
    selection: TopicSelection,
    options: GenerationOptions,
}

impl Default for OptionsController {
    fn default() -> Self {
        let main = catalog::main_categories().next().unwrap_or_default();
        let selection = TopicSelection {
            main: main.to_string(),
            sub: first_sub_topic(main),
            custom: String::new(),
        };
        let options = GenerationOptions {
            topic: selection.topic(),
            ..Default::default()
        };
        Self { selection, options }
    }
}

/// 대분류의 첫 번째 소분류 (없으면 직접 입력)
fn first_sub_topic(main: &str) -> SubTopic {
    catalog::sub_categories(main)
        .and_then(|subs| subs.first())
        .map(|sub| SubTopic::Named(sub.to_string()))
        .unwrap_or(SubTopic::DirectInput)
}

impl OptionsController {
    pub fn new() -> Self {
        Self::default()
    }

    /// 현재 생성 옵션
    pub fn options(&self) -> &GenerationOptions {
        &self.options
    }

    /// 현재 주제 선택 상태
    pub fn selection(&self) -> &TopicSelection {
        &self.selection
    }

    fn recompose_topic(&mut self) {
        self.options.topic = self.selection.topic();
        debug!("주제 변경: '{}'", self.options.topic);
    }

    /// 대분류 변경. 소분류는 첫 항목(없으면 직접 입력)으로, 직접 입력 텍스트는 비운다.
    pub fn set_main_category(&mut self, main: &str) -> Result<(), SessionError> {
        if catalog::sub_categories(main).is_none() {
            return Err(SessionError::UnknownCategory {
                name: main.to_string(),
            });
        }
        self.selection = TopicSelection {
            main: main.to_string(),
            sub: first_sub_topic(main),
            custom: String::new(),
        };
        self.recompose_topic();
        Ok(())
    }

    /// 소분류 변경. `"직접 입력"` 이면 직접 입력 텍스트가 주제가 된다.
    /// 목록의 소분류를 고르면 직접 입력 텍스트는 비운다.
    pub fn set_sub_category(&mut self, label: &str) -> Result<(), SessionError> {
        if label == DIRECT_INPUT_LABEL {
            self.selection.sub = SubTopic::DirectInput;
        } else {
            let known = catalog::sub_categories(&self.selection.main)
                .is_some_and(|subs| subs.contains(&label));
            if !known {
                return Err(SessionError::UnknownSubCategory {
                    name: label.to_string(),
                });
            }
            self.selection.sub = SubTopic::Named(label.to_string());
            self.selection.custom.clear();
        }
        self.recompose_topic();
        Ok(())
    }

    /// 직접 입력 텍스트 변경. 직접 입력 상태일 때만 주제에 반영된다.
    pub fn set_custom_topic(&mut self, text: &str) {
        self.selection.custom = text.to_string();
        self.recompose_topic();
    }

    pub fn set_grade(&mut self, grade: u32) {
        let (min, max) = (catalog::GRADES[0].0, catalog::GRADES[catalog::GRADES.len() - 1].0);
        self.options.grade = grade.clamp(min, max);
    }

    pub fn set_difficulty(&mut self, difficulty: u32) {
        let (min, max) = (
            catalog::DIFFICULTIES[0].0,
            catalog::DIFFICULTIES[catalog::DIFFICULTIES.len() - 1].0,
        );
        self.options.difficulty = difficulty.clamp(min, max);
    }

    /// 문단 수 (3~7 로 제한)
    pub fn set_num_paragraphs(&mut self, n: u32) {
        self.options.num_paragraphs = clamp_paragraphs(n);
    }

    /// 문제 수 (0~10 으로 제한)
    pub fn set_num_questions(&mut self, n: u32) {
        self.options.num_questions = clamp_questions(n);
    }

    /// 직접 입력 상태에서 텍스트가 비어 있으면 생성할 수 없다.
    pub fn can_generate(&self) -> bool {
        self.ensure_can_generate().is_ok()
    }

    pub fn ensure_can_generate(&self) -> Result<(), SessionError> {
        if self.options.topic.trim().is_empty() {
            return Err(SessionError::EmptyTopic);
        }
        Ok(())
    }

    /// 프리셋을 순서대로 적용한다. (대분류 → 소분류 → 직접 입력 → 숫자 옵션)
    pub fn apply_preset(&mut self, preset: &SessionPreset) -> Result<(), SessionError> {
        self.set_main_category(&preset.main_category)?;
        if let Some(sub) = &preset.sub_category {
            self.set_sub_category(sub)?;
        }
        if let Some(custom) = &preset.custom_topic {
            self.set_custom_topic(custom);
        }
        if let Some(grade) = preset.grade {
            self.set_grade(grade);
        }
        if let Some(difficulty) = preset.difficulty {
            self.set_difficulty(difficulty);
        }
        if let Some(n) = preset.num_paragraphs {
            self.set_num_paragraphs(n);
        }
        if let Some(n) = preset.num_questions {
            self.set_num_questions(n);
        }
        Ok(())
    }
}
