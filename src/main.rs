use dotenvy::dotenv;
use tracing::info;

mod config;
mod errors;
mod handlers;
mod llm;
mod server;
mod state;
mod storage;
mod utils;

use config::Config;
use state::AppState;
use utils::logging::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let config = Config::load()?;
    let _guards = init_logging(&config.log_level);

    info!(
        "Starting newsify: model={} api={} uploads={} stylesheet={}",
        config.openai_model,
        config.openai_base_url,
        config.upload_dir.display(),
        config.stylesheet_path.display()
    );

    tokio::fs::create_dir_all(&config.upload_dir).await?;

    server::serve(AppState::new(config)).await
}
