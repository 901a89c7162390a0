use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;

use domain::services::PublicationLimits;
use persistence::db::PoolSettings;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
    pub jwt: JwtConfig,
    pub storage: StorageConfig,
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

impl DatabaseConfig {
    pub fn pool_settings(&self) -> PoolSettings {
        PoolSettings {
            url: self.url.clone(),
            max_connections: self.max_connections,
            min_connections: self.min_connections,
            connect_timeout_secs: self.connect_timeout_secs,
            idle_timeout_secs: self.idle_timeout_secs,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Requests per minute per client address; 0 disables the limiter.
    #[serde(default = "default_rate_limit")]
    pub rate_limit_per_minute: u32,

    /// Password attempts per minute per wish and client address.
    #[serde(default = "default_unlock_attempts")]
    pub unlock_attempts_per_minute: u32,

    /// Only enable behind TLS termination.
    #[serde(default)]
    pub hsts_enabled: bool,
}

#[derive(Clone, Deserialize)]
pub struct JwtConfig {
    /// HS256 signing secret.
    pub secret: String,

    #[serde(default = "default_token_expiry")]
    pub token_expiry_secs: i64,

    #[serde(default = "default_leeway")]
    pub leeway_secs: u64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[REDACTED]")
            .field("token_expiry_secs", &self.token_expiry_secs)
            .field("leeway_secs", &self.leeway_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory uploaded media is written to.
    #[serde(default = "default_media_dir")]
    pub media_dir: PathBuf,

    /// URL prefix the media directory is served under.
    #[serde(default = "default_public_url_prefix")]
    pub public_url_prefix: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Region for accounts that sign up without one.
    #[serde(default = "default_region")]
    pub default_region: String,

    #[serde(default = "default_free_max_slides")]
    pub free_max_slides: usize,

    #[serde(default = "default_premium_max_slides")]
    pub premium_max_slides: usize,

    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: usize,

    #[serde(default = "default_max_music_bytes")]
    pub max_music_bytes: usize,

    #[serde(default = "default_max_insert_attempts")]
    pub max_insert_attempts: u32,

    #[serde(default = "default_comments_page_size")]
    pub comments_page_size: i64,

    #[serde(default = "default_comment_feed_capacity")]
    pub comment_feed_capacity: usize,
}

impl LimitsConfig {
    pub fn publication(&self) -> PublicationLimits {
        PublicationLimits {
            free_max_slides: self.free_max_slides,
            premium_max_slides: self.premium_max_slides,
            max_image_bytes: self.max_image_bytes,
            max_music_bytes: self.max_music_bytes,
            max_insert_attempts: self.max_insert_attempts,
        }
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    30
}
fn default_max_body_size() -> usize {
    104_857_600
}
fn default_max_connections() -> u32 {
    20
}
fn default_min_connections() -> u32 {
    2
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_idle_timeout() -> u64 {
    600
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_rate_limit() -> u32 {
    300
}
fn default_unlock_attempts() -> u32 {
    5
}
fn default_token_expiry() -> i64 {
    604_800
}
fn default_leeway() -> u64 {
    30
}
fn default_media_dir() -> PathBuf {
    PathBuf::from("./data/media")
}
fn default_public_url_prefix() -> String {
    "/media".to_string()
}
fn default_region() -> String {
    "AS".to_string()
}
fn default_free_max_slides() -> usize {
    3
}
fn default_premium_max_slides() -> usize {
    10
}
fn default_max_image_bytes() -> usize {
    5 * 1024 * 1024
}
fn default_max_music_bytes() -> usize {
    10 * 1024 * 1024
}
fn default_max_insert_attempts() -> u32 {
    3
}
fn default_comments_page_size() -> i64 {
    200
}
fn default_comment_feed_capacity() -> usize {
    256
}

/// Minimum HS256 secret length in bytes.
const MIN_JWT_SECRET_LEN: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml
    /// 2. config/local.toml (optional)
    /// 3. `BW__SECTION__KEY` environment variables
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("BW")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("security.cors_origins")
                    .try_parsing(true),
            )
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Build a configuration from embedded defaults plus overrides, without
    /// touching the file system.
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [server]
            host = "127.0.0.1"
            port = 8080
            request_timeout_secs = 30
            max_body_size = 104857600

            [database]
            url = ""
            max_connections = 5
            min_connections = 1
            connect_timeout_secs = 10
            idle_timeout_secs = 600

            [logging]
            level = "info"
            format = "pretty"

            [security]
            cors_origins = []
            rate_limit_per_minute = 0
            unlock_attempts_per_minute = 5
            hsts_enabled = false

            [jwt]
            secret = "test-secret-that-is-at-least-32-bytes-long"
            token_expiry_secs = 3600
            leeway_secs = 5

            [storage]
            media_dir = "./target/test-media"
            public_url_prefix = "/media"

            [limits]
            default_region = "AS"
            free_max_slides = 3
            premium_max_slides = 10
            max_image_bytes = 5242880
            max_music_bytes = 10485760
            max_insert_attempts = 3
            comments_page_size = 200
            comment_feed_capacity = 64
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.database.url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "BW__DATABASE__URL environment variable must be set".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Server port cannot be 0".to_string(),
            ));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigValidationError::InvalidValue(
                "min_connections cannot exceed max_connections".to_string(),
            ));
        }

        if self.jwt.secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigValidationError::InvalidValue(format!(
                "jwt.secret must be at least {} bytes (set BW__JWT__SECRET)",
                MIN_JWT_SECRET_LEN
            )));
        }

        if shared::validation::validate_region(&self.limits.default_region).is_err() {
            return Err(ConfigValidationError::InvalidValue(
                "limits.default_region must be 2-8 uppercase letters or digits".to_string(),
            ));
        }

        if self.limits.free_max_slides == 0
            || self.limits.free_max_slides > self.limits.premium_max_slides
        {
            return Err(ConfigValidationError::InvalidValue(
                "free_max_slides must be between 1 and premium_max_slides".to_string(),
            ));
        }

        let prefix = &self.storage.public_url_prefix;
        if !prefix.starts_with('/') || prefix.len() < 2 || prefix.ends_with('/') {
            return Err(ConfigValidationError::InvalidValue(
                "storage.public_url_prefix must look like /media".to_string(),
            ));
        }

        self.socket_addr()?;
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigValidationError> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|_| {
                ConfigValidationError::InvalidValue(format!(
                    "Invalid socket address {}:{}",
                    self.server.host, self.server.port
                ))
            })
    }
}
