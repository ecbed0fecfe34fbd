//src/main.rs

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use payroll_engine::{build_router, config::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_target(false)
        .compact()
        .init();

    // Opens the store and runs the migrations; nothing is served on failure.
    let app_state = AppState::new().await?;
    let addr = app_state.config.bind_addr.clone();

    let app = build_router(app_state);

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("🚀 Payroll engine listening on {}", listener.local_addr()?);
    tracing::info!("API docs at http://{}/swagger-ui", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
