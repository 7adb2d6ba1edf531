use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// JWT lifetime in seconds.
    pub token_ttl_secs: i64,
    /// Whether the session cookie is marked `Secure`. Disable for local HTTP.
    pub cookie_secure: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// "s3" or "filesystem".
    pub backend: String,
    pub bucket: String,
    pub region: String,
    /// Root directory for the filesystem backend.
    pub base_dir: String,
    /// URL prefix for objects served by the filesystem backend.
    pub public_base_url: String,
    pub max_file_size: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.allow_origins", vec!["*".to_string()])?
            .set_default("server.cors.max_age", 3600)?
            .set_default("auth.token_ttl_secs", 3600)?
            .set_default("auth.cookie_secure", true)?
            .set_default("storage.backend", "s3")?
            .set_default("storage.bucket", "")?
            .set_default("storage.region", "us-east-1")?
            .set_default("storage.base_dir", "./data/assets")?
            .set_default("storage.public_base_url", "http://localhost:3000/assets")?
            // 10 MiB upload ceiling.
            .set_default("storage.max_file_size", 10 * 1024 * 1024)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., JOBPORTAL__AUTH__JWT_SECRET)
            .add_source(Environment::with_prefix("JOBPORTAL").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
