use anyhow::Context;
use axum::{extract::State, response::IntoResponse, routing::get, routing::post, Router};
use clap::Parser;
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use keepsake::middleware::require_session;
use keepsake::{config::AppConfig, handlers, views, AppState};

#[derive(Parser)]
#[command(name = "keepsake")]
#[command(about = "Session-authenticated todo-list and secrets web service")]
#[command(version)]
struct Cli {
    #[arg(long, help = "Port to listen on (overrides PORT)")]
    port: Option<u16>,

    #[arg(long, help = "Address to bind (overrides BIND_ADDR)")]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up SESSION_SECRET, MONGODB_URL, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::from_env().context("invalid configuration")?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(bind) = cli.bind {
        config.server.bind = bind;
    }

    let state = AppState::new(config).await.context("store client setup")?;
    state.store.startup_probe().await;

    let bind_addr = format!("{}:{}", state.config.server.bind, state.config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    tracing::info!("keepsake listening on http://{bind_addr}");

    let store = state.store.clone();
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server")?;

    store.close().await;
    Ok(())
}

fn app(state: AppState) -> Router {
    // User-scoped routes live behind the session gate; no handler in here
    // ever sees an unauthenticated request.
    let gated = Router::new()
        .route("/list", get(handlers::list::view))
        .route("/add", post(handlers::list::add))
        .route("/delete", post(handlers::list::delete))
        .route(
            "/submit",
            get(handlers::secrets::submit_form).post(handlers::secrets::submit),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    Router::new()
        // Public
        .route("/", get(home))
        .route("/health", get(health))
        .route("/secrets", get(handlers::secrets::wall))
        // Session acquisition
        .route(
            "/register",
            get(handlers::auth::register_form).post(handlers::auth::register_submit),
        )
        .route(
            "/login",
            get(handlers::auth::login_form).post(handlers::auth::login_submit),
        )
        .route("/logout", get(handlers::auth::logout))
        .route("/auth/google", get(handlers::auth::google_start))
        .route("/auth/google/callback", get(handlers::auth::google_callback))
        .merge(gated)
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn home() -> impl IntoResponse {
    views::home()
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(()) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "status": "ok",
                "timestamp": now,
                "store": "ok"
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "status": "degraded",
                "timestamp": now,
                "store_error": e.to_string()
            })),
        ),
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::warn!("could not listen for shutdown signal");
        return;
    }
    tracing::info!("shutdown signal received");
}
