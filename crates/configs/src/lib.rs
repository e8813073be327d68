//! # configs
//!
//! Layered configuration: compiled defaults, an optional `config/default`
//! file, then environment variables with a `BREWLOG__` prefix (double
//! underscore as the section separator, e.g. `BREWLOG__SERVER__PORT`).
//! Secrets never leave `SecretString` except at the point of use.

use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Load(#[from] config::ConfigError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HS256 key for session tokens.
    pub jwt_secret: SecretString,
    pub token_ttl_hours: i64,
    /// Key for the forensic IP fingerprint HMAC.
    pub ip_hash_key: SecretString,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
}

const DEV_SECRET: &str = "dev-secret-change-me";

impl AppConfig {
    /// Loads `.env`, the optional config file, and the environment.
    pub fn load() -> Result<AppConfig, ConfigError> {
        dotenvy::dotenv().ok();

        let raw = config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("database.url", "sqlite:brewlog.db")?
            .set_default("auth.jwt_secret", DEV_SECRET)?
            .set_default("auth.token_ttl_hours", 168)?
            .set_default("auth.ip_hash_key", DEV_SECRET)?
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::Environment::with_prefix("BREWLOG").separator("__"))
            .build()?;

        let parsed: AppConfig = raw.try_deserialize()?;
        if parsed.server.port == 0 {
            warn!("server.port is 0; the OS will pick an ephemeral port");
        }
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn defaults_parse() {
        let config = AppConfig::load().unwrap();
        assert!(!config.database.url.is_empty());
        assert!(config.auth.token_ttl_hours > 0);
        assert!(!config.auth.jwt_secret.expose_secret().is_empty());
    }
}
