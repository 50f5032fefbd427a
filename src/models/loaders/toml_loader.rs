use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tokio::fs;

/// 세션 시작 시 적용할 생성 옵션 프리셋
///
/// ```toml
/// main_category = "과학"
/// sub_category = "직접 입력"
/// custom_topic = "화산"
/// grade = 4
/// difficulty = 2
/// num_paragraphs = 4
/// num_questions = 3
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SessionPreset {
    pub main_category: String,
    /// 생략하면 대분류의 첫 번째 소분류
    #[serde(default)]
    pub sub_category: Option<String>,
    #[serde(default)]
    pub custom_topic: Option<String>,
    #[serde(default)]
    pub grade: Option<u32>,
    #[serde(default)]
    pub difficulty: Option<u32>,
    #[serde(default)]
    pub num_paragraphs: Option<u32>,
    #[serde(default)]
    pub num_questions: Option<u32>,
}

/// TOML 파일에서 프리셋을 읽는다.
pub async fn load_session_preset(toml_file_path: &Path) -> Result<SessionPreset> {
    let content = fs::read_to_string(toml_file_path)
        .await
        .with_context(|| format!("프리셋 파일을 읽을 수 없습니다: {}", toml_file_path.display()))?;

    let preset: SessionPreset = toml::from_str(&content)
        .with_context(|| format!("프리셋 파일을 해석할 수 없습니다: {}", toml_file_path.display()))?;

    tracing::info!(
        "프리셋 로드: {} / {}",
        preset.main_category,
        preset.sub_category.as_deref().unwrap_or("-")
    );

    Ok(preset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_preset_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preset.toml");
        tokio::fs::write(
            &path,
            "main_category = \"과학\"\nsub_category = \"직접 입력\"\ncustom_topic = \"화산\"\ngrade = 4\n",
        )
        .await
        .unwrap();

        let preset = load_session_preset(&path).await.unwrap();
        assert_eq!(preset.main_category, "과학");
        assert_eq!(preset.custom_topic.as_deref(), Some("화산"));
        assert_eq!(preset.grade, Some(4));
        assert_eq!(preset.num_questions, None);
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let err = load_session_preset(Path::new("/nonexistent/preset.toml"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("프리셋 파일을 읽을 수 없습니다"));
    }
}
