use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

/// Session secret used when none is configured outside production.
pub const DEVELOPMENT_SESSION_SECRET: &str = "storefront-development-secret-change-me";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub max_json_body_bytes: usize,
    pub max_image_bytes: usize,
    pub upload_timeout_secs: u64,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub session_secret: String,
    pub session_cookie_name: String,
    pub session_max_age_days: i64,
    pub secure_cookies: bool,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    pub login_max_attempts: u32,
    pub login_window_secs: u64,
    pub bcrypt_cost: u32,
    pub rehash_legacy_passwords: bool,
    pub security_headers: bool,
    pub hsts: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("SESSION_SECRET must be set in {0:?}")]
    MissingSessionSecret(Environment),

    #[error("bcrypt cost {0} is outside the supported range 4..=31")]
    InvalidBcryptCost(u32),
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    /// Refuses configurations that would be unsafe to serve with.
    pub fn check(&self) -> Result<(), ConfigError> {
        if self.environment != Environment::Development
            && (self.security.session_secret.is_empty()
                || self.security.session_secret == DEVELOPMENT_SESSION_SECRET)
        {
            return Err(ConfigError::MissingSessionSecret(self.environment));
        }
        if !(4..=31).contains(&self.security.bcrypt_cost) {
            return Err(ConfigError::InvalidBcryptCost(self.security.bcrypt_cost));
        }
        Ok(())
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("HOST") {
            self.server.host = v;
        }
        if let Some(port) = env::var("STOREFRONT_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.server.port = port;
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_RUN_MIGRATIONS") {
            self.database.run_migrations = v.parse().unwrap_or(self.database.run_migrations);
        }

        // API overrides
        if let Ok(v) = env::var("API_MAX_JSON_BODY_BYTES") {
            self.api.max_json_body_bytes = v.parse().unwrap_or(self.api.max_json_body_bytes);
        }
        if let Ok(v) = env::var("API_MAX_IMAGE_BYTES") {
            self.api.max_image_bytes = v.parse().unwrap_or(self.api.max_image_bytes);
        }
        if let Ok(v) = env::var("API_UPLOAD_TIMEOUT_SECS") {
            self.api.upload_timeout_secs = v.parse().unwrap_or(self.api.upload_timeout_secs);
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }

        // Security overrides
        if let Ok(v) = env::var("SESSION_SECRET") {
            self.security.session_secret = v;
        }
        if let Ok(v) = env::var("KEY_SESSION") {
            if !v.trim().is_empty() {
                self.security.session_cookie_name = v;
            }
        }
        if let Ok(v) = env::var("SESSION_MAX_AGE_DAYS") {
            self.security.session_max_age_days = v.parse().unwrap_or(self.security.session_max_age_days);
        }
        if let Ok(v) = env::var("SECURITY_SECURE_COOKIES") {
            self.security.secure_cookies = v.parse().unwrap_or(self.security.secure_cookies);
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Ok(v) = env::var("LOGIN_MAX_ATTEMPTS") {
            self.security.login_max_attempts = v.parse().unwrap_or(self.security.login_max_attempts);
        }
        if let Ok(v) = env::var("LOGIN_WINDOW_SECS") {
            self.security.login_window_secs = v.parse().unwrap_or(self.security.login_window_secs);
        }
        if let Ok(v) = env::var("BCRYPT_COST") {
            self.security.bcrypt_cost = v.parse().unwrap_or(self.security.bcrypt_cost);
        }
        if let Ok(v) = env::var("SECURITY_REHASH_LEGACY_PASSWORDS") {
            self.security.rehash_legacy_passwords = v.parse().unwrap_or(self.security.rehash_legacy_passwords);
        }
        if let Ok(v) = env::var("SECURITY_HEADERS") {
            self.security.security_headers = v.parse().unwrap_or(self.security.security_headers);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: "sqlite://storefront.db?mode=rwc".to_string(),
                max_connections: 5,
                connection_timeout: 30,
                run_migrations: true,
            },
            api: ApiConfig {
                max_json_body_bytes: 10 * 1024, // 10KB
                max_image_bytes: 5 * 1024 * 1024, // 5MB
                upload_timeout_secs: 10,
                enable_request_logging: true,
            },
            security: SecurityConfig {
                session_secret: DEVELOPMENT_SESSION_SECRET.to_string(),
                session_cookie_name: "admin_session".to_string(),
                session_max_age_days: 365 * 10,
                secure_cookies: false,
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                login_max_attempts: 5,
                login_window_secs: 15 * 60,
                bcrypt_cost: 10,
                rehash_legacy_passwords: true,
                security_headers: true,
                hsts: false,
            },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: "sqlite://storefront.db?mode=rwc".to_string(),
                max_connections: 10,
                connection_timeout: 10,
                run_migrations: true,
            },
            api: ApiConfig {
                max_json_body_bytes: 10 * 1024,
                max_image_bytes: 5 * 1024 * 1024,
                upload_timeout_secs: 10,
                enable_request_logging: true,
            },
            security: SecurityConfig {
                session_secret: String::new(),
                session_cookie_name: "admin_session".to_string(),
                session_max_age_days: 365 * 10,
                secure_cookies: true,
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
                login_max_attempts: 5,
                login_window_secs: 15 * 60,
                bcrypt_cost: 10,
                rehash_legacy_passwords: true,
                security_headers: true,
                hsts: false,
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: "sqlite://storefront.db?mode=rwc".to_string(),
                max_connections: 20,
                connection_timeout: 5,
                run_migrations: false,
            },
            api: ApiConfig {
                max_json_body_bytes: 10 * 1024,
                max_image_bytes: 5 * 1024 * 1024,
                upload_timeout_secs: 10,
                enable_request_logging: false,
            },
            security: SecurityConfig {
                session_secret: String::new(),
                session_cookie_name: "admin_session".to_string(),
                session_max_age_days: 365 * 10,
                secure_cookies: true,
                enable_cors: false,
                cors_origins: Vec::new(),
                login_max_attempts: 5,
                login_window_secs: 15 * 60,
                bcrypt_cost: 12,
                rehash_legacy_passwords: true,
                security_headers: true,
                hsts: true,
            },
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
