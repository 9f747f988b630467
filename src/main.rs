use std::env;

use config::{Config, ConfigError, Environment, File};
use dotenvy::dotenv;

use visa_intake::models::config::ServerConfig;

/// Layers `config/default.yaml`, the optional `config/<APP_ENV>.yaml` profile
/// and `APP_*` environment variables, later sources winning.
fn load_config(profile: &str) -> Result<ServerConfig, ConfigError> {
    Config::builder()
        .add_source(File::with_name("config/default"))
        .add_source(File::with_name(&format!("config/{profile}")).required(false))
        .add_source(Environment::with_prefix("APP"))
        .build()?
        .try_deserialize()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let profile = env::var("APP_ENV").unwrap_or_else(|_| "local".into());
    let server_config = match load_config(&profile) {
        Ok(server_config) => server_config,
        Err(err) => {
            log::error!("Error loading {profile} configuration: {err}");
            std::process::exit(1);
        }
    };
    log::info!(
        "Loaded {profile} configuration, database at {}",
        server_config.database_url
    );

    visa_intake::run(server_config).await
}
