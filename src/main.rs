mod app;
mod auth;
mod config;
mod error;
mod llm;
mod menu;
mod plans;
mod profiles;
mod recipes;
mod retry;
mod shopping;
mod state;
mod storage;
mod text;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "menusemanal=debug,axum=info,tower_http=info".to_string());
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

    let (app_state, pool) = state::AppState::init().await?;

    if let Some(pool) = &pool {
        if let Err(e) = sqlx::migrate!("./migrations").run(pool).await {
            tracing::warn!(error = %e, "migrations failed; continuing");
        }
    }

    let app = app::build_app(app_state);
    app::serve(app).await
}
