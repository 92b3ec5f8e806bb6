use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod config;
mod ebay;
mod estimate;
mod refresh;
mod routes;
mod store;

use config::Config;
use ebay::EbayClient;
use routes::AppState;
use store::WatchStore;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("watch_server=info,tower_http=warn")),
        )
        .with_target(true)
        .init();

    if let Err(err) = run().await {
        error!("{err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;

    let store = WatchStore::load(&config.store_path)?;
    info!(
        path = %config.store_path.display(),
        watches = store.len(),
        "watch store loaded"
    );
    let store = Arc::new(RwLock::new(store));

    match &config.ebay_app_id {
        Some(app_id) => {
            let client = EbayClient::new(app_id.clone(), config.ebay_api_url.clone());
            let refresh_store = store.clone();
            let every = config.refresh_every;
            tokio::spawn(async move {
                refresh::run_refresh(refresh_store, client, every).await;
            });
            info!(every_secs = every.as_secs(), "ebay refresh enabled");
        }
        None => info!("EBAY_APP_ID not set, serving stored sales only"),
    }

    let app = routes::router(AppState { store }, Some(&config.site_root));

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(
        "watch board listening on http://{} (site root: {})",
        config.bind_addr,
        config.site_root.display()
    );
    axum::serve(listener, app).await?;
    Ok(())
}
