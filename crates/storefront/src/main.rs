//! Command-line storefront.
//!
//! Loads the catalog feeds, restores the signed-in identity and runs one
//! command against the resulting state.

use std::sync::Arc;

use clap::Parser;
use record_store::SheetClient;
use storefront::cli::{self, Args};
use storefront::identity::FileIdentityStore;
use storefront::{AppState, Config};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = Config::from_env()?;
    info!(store = %config.store.base_url, "Starting storefront");

    let store = Arc::new(SheetClient::new(config.store.clone())?);
    let identity = Arc::new(FileIdentityStore::new(&config.identity_path));

    let catalog = catalog::feed::load_with_client(store.http_client(), &config.feeds).await;

    let mut state = AppState::new(store, identity);
    state.set_catalog(catalog).await;
    state.restore_session().await;

    match cli::execute(&mut state, args.command).await {
        Ok(output) => {
            print!("{}", output);
            if !output.ends_with('\n') {
                println!();
            }
            Ok(())
        }
        Err(e) => {
            match state.notice() {
                Some(notice) => eprintln!("{}", notice.text),
                None => eprintln!("{}", e),
            }
            std::process::exit(1);
        }
    }
}
