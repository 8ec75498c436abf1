use std::time::Duration;

use anyhow::{anyhow, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080, worker_threads: Some(4) }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default)]
    pub sqlx_logging: bool,
    /// Run pending migrations at startup.
    #[serde(default = "default_true")]
    pub auto_migrate: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            max_lifetime_secs: default_max_lifetime(),
            acquire_timeout_secs: default_acquire_timeout(),
            sqlx_logging: false,
            auto_migrate: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret used to sign session cookies.
    #[serde(default)]
    pub session_secret: String,
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: i64,
    #[serde(default)]
    pub secure_cookie: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_secret: String::new(),
            cookie_name: default_cookie_name(),
            session_ttl_hours: default_session_ttl_hours(),
            secure_cookie: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CorsConfig {
    /// Allowed origins; empty means permissive (development).
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 2 }
fn default_connect_timeout() -> u64 { 30 }
fn default_idle_timeout() -> u64 { 600 }
fn default_max_lifetime() -> u64 { 3600 }
fn default_acquire_timeout() -> u64 { 30 }
fn default_true() -> bool { true }
fn default_cookie_name() -> String { "session_token".into() }
fn default_session_ttl_hours() -> i64 { 24 * 7 }

const DEV_SESSION_SECRET: &str = "dev-secret-change-me";

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    load_from_str(&content)
}

pub fn load_from_str(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load `config.toml` (or `CONFIG_PATH`), falling back to defaults when the
    /// file is missing, then overlay the environment and validate.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default().unwrap_or_default();
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.apply_env(|key| std::env::var(key).ok());
        self.server.normalize()?;
        self.database.validate()?;
        self.auth.normalize()?;
        Ok(())
    }

    /// Overlay values from the environment. Env wins only where the file left a
    /// value empty, except `SERVER_HOST`/`SERVER_PORT` which always win.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(host) = lookup("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("SERVER_PORT").and_then(|p| p.parse::<u16>().ok()) {
            self.server.port = port;
        }
        if self.database.url.trim().is_empty() {
            if let Some(url) = lookup("DATABASE_URL") {
                self.database.url = url;
            }
        }
        if self.auth.session_secret.trim().is_empty() {
            if let Some(secret) = lookup("SESSION_SECRET") {
                self.auth.session_secret = secret;
            }
        }
        if self.cors.allowed_origins.is_empty() {
            if let Some(origins) = lookup("CORS_ORIGINS") {
                self.cors.allowed_origins = origins
                    .split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(str::to_string)
                    .collect();
            }
        }
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }
}

impl DatabaseConfig {
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!("database.url is empty; set it in config.toml or DATABASE_URL"));
        }
        let lower = self.url.to_lowercase();
        let supported = ["postgresql://", "postgres://", "sqlite:"];
        if !supported.iter().any(|p| lower.starts_with(p)) {
            return Err(anyhow!("database.url must start with postgres://, postgresql:// or sqlite:"));
        }
        if self.min_connections == 0 {
            return Err(anyhow!("database.min_connections must be >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections must be >= min_connections"));
        }
        if self.connect_timeout_secs == 0 || self.acquire_timeout_secs == 0 {
            return Err(anyhow!("database timeouts must be positive"));
        }
        Ok(())
    }

    /// In-memory SQLite on a single connection; used by tests.
    pub fn in_memory() -> Self {
        Self { url: "sqlite::memory:".into(), max_connections: 1, min_connections: 1, ..Self::default() }
    }

    pub fn connect_timeout(&self) -> Duration { Duration::from_secs(self.connect_timeout_secs) }
    pub fn acquire_timeout(&self) -> Duration { Duration::from_secs(self.acquire_timeout_secs) }
    pub fn idle_timeout(&self) -> Duration { Duration::from_secs(self.idle_timeout_secs) }
    pub fn max_lifetime(&self) -> Duration { Duration::from_secs(self.max_lifetime_secs) }
}

impl AuthConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.session_secret.trim().is_empty() {
            self.session_secret = DEV_SESSION_SECRET.to_string();
        }
        if self.cookie_name.trim().is_empty() {
            self.cookie_name = default_cookie_name();
        }
        if self.session_ttl_hours <= 0 {
            return Err(anyhow!("auth.session_ttl_hours must be positive"));
        }
        Ok(())
    }

    pub fn uses_dev_secret(&self) -> bool { self.session_secret == DEV_SESSION_SECRET }

    /// Settings for tests: fixed secret, one-hour sessions.
    pub fn for_tests() -> Self {
        Self { session_secret: "test-secret".into(), session_ttl_hours: 1, ..Self::default() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn parses_full_file() {
        let cfg = load_from_str(
            r#"
            [server]
            host = "0.0.0.0"
            port = 9000

            [database]
            url = "postgres://u:p@localhost/backoffice"
            max_connections = 20

            [auth]
            session_secret = "s3cret"
            session_ttl_hours = 2

            [cors]
            allowed_origins = ["http://localhost:3000"]
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.database.max_connections, 20);
        assert_eq!(cfg.database.min_connections, 2);
        assert!(cfg.database.auto_migrate);
        assert_eq!(cfg.auth.cookie_name, "session_token");
        assert_eq!(cfg.cors.allowed_origins, vec!["http://localhost:3000".to_string()]);
    }

    #[test]
    fn env_fills_missing_values() {
        let mut cfg = AppConfig::default();
        cfg.apply_env(env(&[
            ("DATABASE_URL", "postgres://localhost/x"),
            ("SERVER_PORT", "8181"),
            ("CORS_ORIGINS", "http://a.test, http://b.test,"),
        ]));
        assert_eq!(cfg.database.url, "postgres://localhost/x");
        assert_eq!(cfg.server.port, 8181);
        assert_eq!(cfg.cors.allowed_origins.len(), 2);
    }

    #[test]
    fn file_database_url_wins_over_env() {
        let mut cfg = AppConfig::default();
        cfg.database.url = "sqlite::memory:".into();
        cfg.apply_env(env(&[("DATABASE_URL", "postgres://elsewhere/x")]));
        assert_eq!(cfg.database.url, "sqlite::memory:");
    }

    #[test]
    fn database_validation() {
        assert!(DatabaseConfig::default().validate().is_err());
        assert!(DatabaseConfig::in_memory().validate().is_ok());
        let bad_scheme = DatabaseConfig { url: "mysql://x".into(), ..DatabaseConfig::default() };
        assert!(bad_scheme.validate().is_err());
        let bad_pool = DatabaseConfig { max_connections: 1, min_connections: 2, ..DatabaseConfig::in_memory() };
        assert!(bad_pool.validate().is_err());
    }

    #[test]
    fn auth_falls_back_to_dev_secret() {
        let mut auth = AuthConfig::default();
        auth.normalize().unwrap();
        assert!(auth.uses_dev_secret());
        let mut bad = AuthConfig { session_ttl_hours: 0, ..AuthConfig::for_tests() };
        assert!(bad.normalize().is_err());
    }
}
