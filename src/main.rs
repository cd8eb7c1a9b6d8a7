use tracing::info;

use modhost::{Config, WebServer};

const CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() {
    // Load configuration
    let mut config = match Config::load(CONFIG_PATH) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {CONFIG_PATH}: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };

    // Initialize logging
    if let Err(e) = modhost::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        modhost::logging::init_console_only(&config.logging.level);
    }

    for warning in config.apply_env_overrides() {
        tracing::warn!("{}", warning);
    }

    if let Err(e) = config.validate() {
        tracing::error!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    info!("modhost - Modpack file host");
    info!(
        "Storing modpacks in {} (uploads staged in {})",
        config.storage.modpacks_path, config.storage.temp_path
    );

    let server = match WebServer::new(&config) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to initialize server: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run().await {
        tracing::error!("Web server error: {}", e);
        std::process::exit(1);
    }
}
