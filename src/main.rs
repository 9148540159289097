use std::sync::Arc;

mod app;
mod config;
mod metrics;
mod pipeline;
mod state;
mod telemetry;
mod users;

use crate::{config::AppConfig, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Arc::new(AppConfig::from_env()?);
    let _log_guards = telemetry::init(&config.log)?;

    let app_state = AppState::init(config).await?;
    let addr = app_state.config.addr()?;

    let app = app::build_app(app_state);
    app::serve(app, addr).await
}
