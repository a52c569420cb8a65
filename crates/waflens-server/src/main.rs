use std::sync::Arc;

use tracing::{info, warn};
use waflens_auth::{IdentityProvider, Session, StubIdentity};
use waflens_core::Store;
use waflens_server::config::{ai_settings_from_env, ServerConfig};
use waflens_server::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env()?;
    let store = Arc::new(Store::open(&config.data_dir));
    if waflens_core::seed_pillars(&store)? {
        info!(data_dir = %config.data_dir.display(), "seeded pillar directory");
    }

    let ai = ai_settings_from_env(store.read_settings());
    if !waflens_core::ai_configured(&ai) {
        warn!("AI provider not configured; advisory endpoints will refuse requests");
    }

    let identity = dev_identity(&config);
    let state = AppState::new(store, identity, ai);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!(bind = %config.bind, "waflens-server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await?;

    Ok(())
}

/// Local-development identity: a stub backend honoring WAFLENS_DEV_TOKEN.
/// A hosted identity provider implementation plugs in here instead.
fn dev_identity(config: &ServerConfig) -> Option<Arc<dyn IdentityProvider>> {
    let token = config.dev_token.as_deref()?;
    let identity = StubIdentity::new();
    identity.grant_token(
        token,
        Session {
            user_id: "dev-user".to_string(),
            display_name: "Dev User".to_string(),
            email: "dev@localhost".to_string(),
            photo_url: None,
        },
    );
    warn!("dev token auth enabled; do not use in production");
    Some(Arc::new(identity))
}
