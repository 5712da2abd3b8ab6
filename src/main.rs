use std::path::Path;

use tracing::{error, info, warn};

use vinnodrive::{Config, Database, WebServer};

const CONFIG_PATH: &str = "config.toml";

/// Load the configuration along with warnings to log once logging is up.
fn load_config() -> (Config, Vec<String>) {
    if Path::new(CONFIG_PATH).exists() {
        match Config::load_with_env(CONFIG_PATH) {
            Ok(loaded) => return loaded,
            Err(e) => {
                eprintln!("Failed to load {CONFIG_PATH}: {e}");
                eprintln!("Using default configuration.");
            }
        }
    }

    let mut config = Config::default();
    let warnings = config.apply_env_overrides();
    (config, warnings)
}

#[tokio::main]
async fn main() {
    let (config, config_warnings) = load_config();

    // Initialize logging
    if let Err(e) = vinnodrive::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        vinnodrive::logging::init_console_only(&config.logging.level);
    }

    info!("VinnoDrive - Your Intelligent File Storage");
    for warning in &config_warnings {
        warn!("{}", warning);
    }

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    let db = match Database::open(&config.database.url).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to open metadata store: {}", e);
            std::process::exit(1);
        }
    };
    info!("Connected to metadata store");

    let server = match WebServer::new(&config, db) {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to create web server: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run().await {
        error!("Web server error: {}", e);
        std::process::exit(1);
    }
}
