use std::sync::Arc;

use clap::Parser;
use tracing::info;

use reactivities_client::cli::{self, Cli};
use reactivities_client::config::ClientConfig;
use reactivities_client::http::HttpActivitiesClient;
use reactivities_store::ActivityStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    reactivities_client::init_tracing();

    let config = ClientConfig::from_env();
    info!(api = %config.api_url, user = %config.user.username, "Loaded configuration");

    let remote = Arc::new(HttpActivitiesClient::new(&config)?);
    let store = Arc::new(ActivityStore::new(remote, config.user));

    cli::run(store, args.command).await
}
