/// 로그 유틸리티 모듈
///
/// 로그 초기화와 출력 보조 함수
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::models::GeneratedContent;

/// tracing 구독자를 초기화한다. `RUST_LOG` 가 설정되어 있으면 그 값을 따른다.
///
/// 이미 초기화된 경우(테스트 등) 조용히 무시한다.
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 프로그램 시작 정보 기록
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 문해력 교실 시작");
    info!(
        "시작 시각: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!(
        "🤖 생성 서비스: {:?} / 모델: {}",
        config.llm_provider, config.llm_model_name
    );
    info!("📁 내보내기 디렉터리: {}", config.export_dir);
    info!("{}", "=".repeat(60));
}

/// 생성 결과 요약 기록
pub fn log_generation_summary(content: &GeneratedContent) {
    info!("\n{}", "─".repeat(60));
    info!("📖 제목: {}", content.title);
    info!(
        "📊 문단 {}개 / 문제 {}개 / 어휘 {}개",
        content.paragraphs.len(),
        content.questions.len(),
        content.vocabulary.len()
    );
    for (i, paragraph) in content.paragraphs.iter().enumerate() {
        info!("  {}. {}", i + 1, truncate_text(&paragraph.content, 40));
    }
    for (i, question) in content.questions.iter().enumerate() {
        info!(
            "  Q{}. [{}] {}",
            i + 1,
            question.question_type,
            truncate_text(&question.question_text, 40)
        );
    }
    info!("{}", "─".repeat(60));
}

/// 로그 표시용으로 긴 텍스트를 자른다.
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
