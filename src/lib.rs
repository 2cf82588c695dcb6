pub mod api;
pub mod catalog;
pub mod cli;
pub mod console;
pub mod models;
pub mod session;

use api::{ new_client, ApiConfig };
use cli::Args;
use log::info;
use session::refresh::spawn_history_refresh;
use session::{ Session, SessionClient };
use std::error::Error;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("API Base URL: {}", args.api_base_url);
    info!("Request Timeout: {:?}", args.request_timeout());
    info!("Wallet Address: {}", args.user_address.as_deref().unwrap_or("(not set)"));
    info!("Model Id: {}", args.model_id);
    info!("Export Directory: {}", args.export_dir.display());
    match args.refresh_interval() {
        Some(interval) => info!("History Refresh: every {:?}", interval),
        None => info!("History Refresh: manual"),
    }
    info!("-------------------------");

    let config = ApiConfig::new(&args.api_base_url, args.request_timeout())?;
    let api = new_client(&config)?;

    let session = Session::new(args.user_address.clone().unwrap_or_default(), args.model_id);
    let mut client = SessionClient::new(api, session);
    client.select_model(args.model_id)?;
    let client = Arc::new(Mutex::new(client));

    let shutdown = CancellationToken::new();
    let refresher = args
        .refresh_interval()
        .map(|interval| spawn_history_refresh(client.clone(), interval, shutdown.clone()));

    let result = console::run(client, args.export_dir.clone()).await;

    shutdown.cancel();
    if let Some(handle) = refresher {
        handle.await?;
    }
    result?;
    Ok(())
}
