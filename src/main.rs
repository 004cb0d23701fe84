use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use verblack_api::ai::StoryAI;
use verblack_api::logging;
use verblack_api::server::{AppState, router};
use verblack_api::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init().context("Failed to install logger")?;

    let settings = Settings::load();
    let state = if settings.gemini_api_key.is_some() {
        AppState {
            ai: Some(Arc::new(StoryAI::new(&settings)?)),
        }
    } else {
        log::warn!("GEMINI_API_KEY not set; /api/story will answer 500");
        AppState::default()
    };

    let listener = TcpListener::bind(&settings.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", settings.bind_addr))?;
    log::info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;

    Ok(())
}
