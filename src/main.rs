use tracing::info;

use stowage::store::RemoteStore;
use stowage::{format_size, Config, StoreClient};

#[tokio::main]
async fn main() {
    let config = Config::load_with_env("config.toml").unwrap_or_else(|e| {
        eprintln!("config.toml not usable ({e}); falling back to defaults");
        Config::default()
    });

    if let Err(e) = stowage::logging::init(&config.logging) {
        eprintln!("log file unavailable ({e}); logging to console only");
        stowage::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = run(&config).await {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

/// List the store root, the smallest useful round trip.
async fn run(config: &Config) -> stowage::Result<()> {
    config.validate()?;
    info!(backend = %config.api.base_url, "listing store root");

    let client = StoreClient::from_config(config)?;
    let listing = client.list_directory("").await?;

    for folder in &listing.subfolders {
        println!("{folder}/");
    }
    for file in &listing.files {
        println!("{}  {}", file.name, format_size(file.size));
    }
    if listing.is_empty() {
        println!("(root is empty)");
    }

    Ok(())
}
