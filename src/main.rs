use anyhow::Result;
use tracing::error;

use literacy_classroom::utils::logging;
use literacy_classroom::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 설정 로드 (자격 증명이 없으면 종료)
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            logging::init(false);
            error!("❌ {}", e);
            return Err(e.into());
        }
    };

    // 로그 초기화
    logging::init(config.verbose_logging);

    // 초기화 후 실행
    App::initialize(config)?.run().await?;

    Ok(())
}
