use burnmeter::{app, db, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "burnmeter=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let app_state = AppState::init().await?;

    // Never serve against a half-migrated schema.
    if let Err(e) = db::migrate(&app_state.db).await {
        tracing::error!(error = %format!("{e:#}"), "Database maintenance in progress. Please try again later.");
        return Err(e);
    }

    if !app_state.scoring.is_available() {
        tracing::warn!("assessments are disabled until a model artifact is available");
    }

    app::serve(app::build_app(app_state)).await
}
