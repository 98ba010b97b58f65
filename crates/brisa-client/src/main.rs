mod screens;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use brisa_client::api::ApiClient;
use brisa_client::auth::session::{AuthSession, TokenStore};
use brisa_client::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("brisa_client=info")),
        )
        .init();

    let config = Config::from_env();
    tracing::info!("brisa back-office client, API at {}", config.api_base_url);

    let store = TokenStore::new(&config.token_path);
    let mut api = ApiClient::new(&config);

    // Resolve the session before any screen renders.
    let mut session = AuthSession::new();
    session.restore(&store);
    if let Some(token) = session.token() {
        api.set_token(token);
    }
    session.ensure_user_id(&api).await;

    let mut app = screens::App {
        api,
        session,
        store,
    };
    screens::run(&mut app).await.context("terminal session failed")?;

    Ok(())
}
