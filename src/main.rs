use axum::{Router, routing};
use salthook::handlers::{handle_webhook, root};
use salthook::logging::setup_logging;
use salthook::salt::SaltCaller;
use salthook::{AppState, HookConfig};
use std::sync::Arc;
use tracing::{info, warn};

const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8888";

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    // Missing SALT_STATE is a startup failure, not a per-request one.
    let config = match HookConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    setup_logging();

    let bind_address =
        std::env::var("BIND_ADDRESS").unwrap_or_else(|_| DEFAULT_BIND_ADDRESS.to_string());

    info!("Applying state '{}' for accepted webhooks", config.salt_state);
    if !config.has_secret() {
        warn!("GITHOOK_SECRET is empty; signed senders must use an empty secret");
    }
    if config.allow_unsigned {
        warn!("Requests without a signature or token header will be accepted");
    }

    let state = Arc::new(AppState {
        config,
        runner: Arc::new(SaltCaller::new()),
    });

    let app = Router::new()
        .route("/", routing::get(root))
        .route("/webhook", routing::post(handle_webhook))
        .with_state(state);

    info!("Listening on {}", bind_address);
    let listener = tokio::net::TcpListener::bind(&bind_address).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
