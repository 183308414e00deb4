use std::net::SocketAddr;
use std::time::Duration;

use folio_auth::AuthConfig;
use folio_db_postgres::PostgresConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    /// Redis configuration
    #[serde(default)]
    pub redis: RedisConfig,
    /// Token secrets and lifetimes
    #[serde(default)]
    pub auth: AuthConfig,
    /// Read-through cache lifetimes
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        // Server validations
        if self.server.port == 0 {
            return Err("server.port must be > 0".into());
        }
        if self.server.body_limit_bytes == 0 {
            return Err("server.body_limit_bytes must be > 0".into());
        }
        // Logging validation
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        // Storage validation
        if self.storage.backend == StorageBackend::Postgres {
            let pg = &self.storage.postgres;
            if pg.url.is_none() && pg.host.is_empty() {
                return Err("storage.postgres requires either 'url' or 'host' to be set".into());
            }
            if pg.url.is_none() && pg.database.is_empty() {
                return Err("storage.postgres.database must not be empty".into());
            }
            if pg.pool_size == 0 {
                return Err("storage.postgres.pool_size must be > 0".into());
            }
        }
        if self.redis.enabled && self.redis.url.is_empty() {
            return Err("redis.enabled=true requires redis.url".into());
        }
        // Cache validation
        if self.cache.audit_log_page_size == 0 {
            return Err("cache.audit_log_page_size must be > 0".into());
        }
        if self.cache.profile_ttl.is_zero()
            || self.cache.projects_ttl.is_zero()
            || self.cache.audit_logs_ttl.is_zero()
        {
            return Err("cache ttls must be > 0".into());
        }
        // Auth validation
        self.auth
            .validate()
            .map_err(|e| format!("auth config error: {e}"))?;
        Ok(())
    }

    pub fn addr(&self) -> SocketAddr {
        use std::net::{IpAddr, Ipv4Addr};
        let ip: IpAddr = self
            .server
            .host
            .parse()
            .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        SocketAddr::new(ip, self.server.port)
    }
}

/// Deployment environment. Development exposes internal error details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    #[default]
    Production,
}

impl Environment {
    pub fn is_development(self) -> bool {
        self == Environment::Development
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub environment: Environment,
    #[serde(default = "default_body_limit_bytes")]
    pub body_limit_bytes: usize,
    /// Allowed browser origin. Any origin is allowed when unset.
    #[serde(default)]
    pub cors_origin: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: Environment::default(),
            body_limit_bytes: default_body_limit_bytes(),
            cors_origin: None,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_body_limit_bytes() -> usize {
    10 * 1024 * 1024
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Postgres,
    /// Process-local storage. Data is lost on restart.
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    #[serde(default)]
    pub postgres: PostgresStorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostgresStorageConfig {
    /// Full connection URL. Takes precedence over the individual fields.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_pg_host")]
    pub host: String,
    #[serde(default = "default_pg_port")]
    pub port: u16,
    #[serde(default = "default_pg_user")]
    pub user: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "default_pg_database")]
    pub database: String,
    #[serde(default = "default_pg_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_pg_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default)]
    pub idle_timeout_ms: Option<u64>,
    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

impl Default for PostgresStorageConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: default_pg_host(),
            port: default_pg_port(),
            user: default_pg_user(),
            password: None,
            database: default_pg_database(),
            pool_size: default_pg_pool_size(),
            connect_timeout_ms: default_pg_connect_timeout_ms(),
            idle_timeout_ms: None,
            run_migrations: true,
        }
    }
}

impl PostgresStorageConfig {
    pub fn connection_url(&self) -> String {
        if let Some(url) = &self.url {
            return url.clone();
        }
        match &self.password {
            Some(password) => format!(
                "postgres://{}:{}@{}:{}/{}",
                self.user, password, self.host, self.port, self.database
            ),
            None => format!(
                "postgres://{}@{}:{}/{}",
                self.user, self.host, self.port, self.database
            ),
        }
    }

    /// Converts to the pool settings of the PostgreSQL backend.
    pub fn to_backend_config(&self) -> PostgresConfig {
        let mut config = PostgresConfig::new(self.connection_url())
            .with_pool_size(self.pool_size)
            .with_run_migrations(self.run_migrations);
        config.connect_timeout_ms = self.connect_timeout_ms;
        if self.idle_timeout_ms.is_some() {
            config.idle_timeout_ms = self.idle_timeout_ms;
        }
        config
    }
}

fn default_pg_host() -> String {
    "localhost".to_string()
}

fn default_pg_port() -> u16 {
    5432
}

fn default_pg_user() -> String {
    "postgres".to_string()
}

fn default_pg_database() -> String {
    "folio".to_string()
}

fn default_pg_pool_size() -> u32 {
    10
}

fn default_pg_connect_timeout_ms() -> u64 {
    5000
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Redis connection settings. When disabled or unreachable the server keeps
/// sessions and cached reads in process memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_redis_url")]
    pub url: String,
    #[serde(default = "default_redis_pool_size")]
    pub pool_size: usize,
    #[serde(default = "default_redis_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: default_redis_url(),
            pool_size: default_redis_pool_size(),
            timeout_ms: default_redis_timeout_ms(),
        }
    }
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_redis_pool_size() -> usize {
    10
}

fn default_redis_timeout_ms() -> u64 {
    5000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_profile_ttl", with = "humantime_serde")]
    pub profile_ttl: Duration,
    #[serde(default = "default_projects_ttl", with = "humantime_serde")]
    pub projects_ttl: Duration,
    #[serde(default = "default_audit_logs_ttl", with = "humantime_serde")]
    pub audit_logs_ttl: Duration,
    /// Number of newest entries served by the audit log endpoint.
    #[serde(default = "default_audit_log_page_size")]
    pub audit_log_page_size: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            profile_ttl: default_profile_ttl(),
            projects_ttl: default_projects_ttl(),
            audit_logs_ttl: default_audit_logs_ttl(),
            audit_log_page_size: default_audit_log_page_size(),
        }
    }
}

fn default_profile_ttl() -> Duration {
    Duration::from_secs(24 * 60 * 60)
}

fn default_projects_ttl() -> Duration {
    Duration::from_secs(30 * 60)
}

fn default_audit_logs_ttl() -> Duration {
    Duration::from_secs(5 * 60)
}

fn default_audit_log_page_size() -> usize {
    50
}

pub mod loader {
    use super::AppConfig;
    use config::{Config, Environment, File};
    use std::path::PathBuf;

    /// Default configuration file looked up when no path is given.
    pub const DEFAULT_CONFIG_PATH: &str = "folio.toml";

    pub fn load_config(path: Option<&str>) -> Result<AppConfig, String> {
        let pathbuf = PathBuf::from(path.unwrap_or(DEFAULT_CONFIG_PATH));
        let mut builder = Config::builder();
        if pathbuf.exists() {
            builder = builder.add_source(File::from(pathbuf));
        }
        // Environment variable overrides, e.g., FOLIO__SERVER__PORT=9090
        builder = builder.add_source(
            Environment::with_prefix("FOLIO")
                .try_parsing(true)
                .separator("__"),
        );
        let cfg = builder
            .build()
            .map_err(|e| format!("config build error: {e}"))?;
        let merged: AppConfig = cfg
            .try_deserialize()
            .map_err(|e| format!("config deserialize error: {e}"))?;
        merged.validate()?;
        Ok(merged)
    }
}
