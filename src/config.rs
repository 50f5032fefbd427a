use std::str::FromStr;

use crate::error::ConfigError;

/// 자격 증명 환경 변수 (우선순위 순)
const API_KEY_VARS: [&str; 2] = ["LLM_API_KEY", "API_KEY"];

/// 생성 서비스 종류
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LlmProvider {
    /// Gemini generateContent API (스키마, 웹 검색 근거 지원)
    Gemini,
    /// OpenAI 호환 chat completions API
    OpenAiCompatible,
}

impl LlmProvider {
    pub fn default_base_url(self) -> &'static str {
        match self {
            LlmProvider::Gemini => "https://generativelanguage.googleapis.com/v1beta",
            LlmProvider::OpenAiCompatible => "https://api.openai.com/v1",
        }
    }
}

impl FromStr for LlmProvider {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(LlmProvider::Gemini),
            "openai" | "openai-compatible" => Ok(LlmProvider::OpenAiCompatible),
            _ => Err(()),
        }
    }
}

/// 프로그램 설정
#[derive(Clone, Debug)]
pub struct Config {
    // --- LLM 설정 ---
    pub llm_provider: LlmProvider,
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    /// 전송 계층 타임아웃 (초)
    pub llm_timeout_secs: u64,
    // --- 세션 / 출력 ---
    /// 내보낸 문서를 저장할 디렉터리
    pub export_dir: String,
    /// 세션 프리셋 TOML 파일 (선택)
    pub preset_file: Option<String>,
    /// 상세 로그 출력 여부
    pub verbose_logging: bool,
}

impl Config {
    /// 자격 증명을 제외한 기본값
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        let provider = LlmProvider::Gemini;
        Self {
            llm_provider: provider,
            llm_api_key: api_key.into(),
            llm_api_base_url: provider.default_base_url().to_string(),
            llm_model_name: "gemini-2.5-flash".to_string(),
            llm_timeout_secs: 120,
            export_dir: "output_docx".to_string(),
            preset_file: None,
            verbose_logging: false,
        }
    }

    /// 환경 변수에서 설정을 읽는다. 자격 증명이 없으면 실패한다.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 임의의 조회 함수로 설정을 구성한다.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = API_KEY_VARS
            .iter()
            .filter_map(|name| lookup(name))
            .map(|v| v.trim().to_string())
            .find(|v| !v.is_empty())
            .ok_or_else(|| ConfigError::MissingCredential {
                var_name: API_KEY_VARS[0].to_string(),
            })?;

        let default = Self::with_api_key(api_key);

        let llm_provider = match lookup("LLM_PROVIDER") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: "LLM_PROVIDER".to_string(),
                value: raw.clone(),
                expected_type: "gemini | openai".to_string(),
            })?,
            None => default.llm_provider,
        };

        Ok(Self {
            llm_provider,
            llm_api_base_url: lookup("LLM_API_BASE_URL")
                .unwrap_or_else(|| llm_provider.default_base_url().to_string()),
            llm_model_name: lookup("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            llm_timeout_secs: parse_var(&lookup, "LLM_TIMEOUT_SECS", "u64")?
                .unwrap_or(default.llm_timeout_secs),
            export_dir: lookup("EXPORT_DIR").unwrap_or(default.export_dir),
            preset_file: lookup("PRESET_FILE").filter(|v| !v.trim().is_empty()),
            verbose_logging: parse_var(&lookup, "VERBOSE_LOGGING", "bool")?
                .unwrap_or(default.verbose_logging),
            llm_api_key: default.llm_api_key,
        })
    }
}

fn parse_var<F, T>(lookup: &F, var_name: &str, expected_type: &str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var_name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value: raw,
                expected_type: expected_type.to_string(),
            }),
    }
}
