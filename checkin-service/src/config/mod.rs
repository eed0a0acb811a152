use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

#[derive(Debug, Clone)]
pub struct CheckinConfig {
    pub common: core_config::Config,
    pub environment: Environment,
    pub service_name: String,
    pub service_version: String,
    pub log_level: String,
    pub token: TokenConfig,
    pub security: SecurityConfig,
    pub ledger: LedgerConfig,
    pub geo: GeoConfig,
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Dev,
    Prod,
}

#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Validity window of an issued access token, in seconds.
    pub ttl_seconds: i64,
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub admin_api_key: Secret<String>,
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct LedgerConfig {
    pub enabled: bool,
    pub base_url: String,
    pub api_token: Secret<String>,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct GeoConfig {
    pub enabled: bool,
    pub base_url: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub checkin_attempts: u32,
    pub checkin_window_seconds: u64,
    pub global_ip_limit: u32,
    pub global_ip_window_seconds: u64,
}

impl CheckinConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;

        let env_str = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string());
        let environment: Environment = env_str
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;

        let is_prod = environment == Environment::Prod;

        let config = CheckinConfig {
            common: common_config,
            environment,
            service_name: get_env("SERVICE_NAME", Some("checkin-service"), is_prod)?,
            service_version: get_env("SERVICE_VERSION", Some(env!("CARGO_PKG_VERSION")), is_prod)?,
            log_level: get_env("LOG_LEVEL", Some("info"), is_prod)?,
            token: TokenConfig {
                ttl_seconds: get_env("TOKEN_TTL_SECONDS", Some("60"), is_prod)?
                    .parse()
                    .map_err(|e: std::num::ParseIntError| {
                        AppError::ConfigError(anyhow::anyhow!(e.to_string()))
                    })?,
            },
            security: SecurityConfig {
                admin_api_key: Secret::new(get_env("ADMIN_API_KEY", None, true)?),
                allowed_origins: get_env(
                    "ALLOWED_ORIGINS",
                    Some("http://localhost:3000"),
                    is_prod,
                )?
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            },
            ledger: LedgerConfig {
                enabled: get_env("LEDGER_ENABLED", Some("false"), is_prod)?
                    .parse()
                    .unwrap_or(false),
                base_url: get_env("LEDGER_BASE_URL", Some(""), is_prod)?,
                api_token: Secret::new(get_env("LEDGER_API_TOKEN", Some(""), is_prod)?),
                timeout_seconds: get_env("LEDGER_TIMEOUT_SECONDS", Some("10"), is_prod)?
                    .parse()
                    .unwrap_or(10),
            },
            geo: GeoConfig {
                enabled: get_env("GEO_ENABLED", Some("false"), is_prod)?
                    .parse()
                    .unwrap_or(false),
                base_url: get_env("GEO_BASE_URL", Some("http://ip-api.com"), is_prod)?,
                timeout_seconds: get_env("GEO_TIMEOUT_SECONDS", Some("2"), is_prod)?
                    .parse()
                    .unwrap_or(2),
            },
            rate_limit: RateLimitConfig {
                checkin_attempts: get_env("RATE_LIMIT_CHECKIN_ATTEMPTS", Some("10"), is_prod)?
                    .parse()
                    .unwrap_or(10),
                checkin_window_seconds: get_env(
                    "RATE_LIMIT_CHECKIN_WINDOW_SECONDS",
                    Some("60"),
                    is_prod,
                )?
                .parse()
                .unwrap_or(60),
                global_ip_limit: get_env("RATE_LIMIT_GLOBAL_IP_LIMIT", Some("100"), is_prod)?
                    .parse()
                    .unwrap_or(100),
                global_ip_window_seconds: get_env(
                    "RATE_LIMIT_GLOBAL_IP_WINDOW_SECONDS",
                    Some("60"),
                    is_prod,
                )?
                .parse()
                .unwrap_or(60),
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.common.port == 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "PORT must be greater than 0"
            )));
        }

        if self.token.ttl_seconds <= 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "TOKEN_TTL_SECONDS must be positive"
            )));
        }

        if self.ledger.enabled && self.ledger.base_url.is_empty() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "LEDGER_BASE_URL is required when LEDGER_ENABLED=true"
            )));
        }

        if self.environment == Environment::Prod {
            if self.security.allowed_origins.iter().any(|o| o == "*") {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "Wildcard CORS origin not allowed in production"
                )));
            }

            if !self.ledger.enabled {
                tracing::warn!(
                    "Remote ledger disabled in production - accepted check-ins will not survive a restart"
                );
            }
        }

        Ok(())
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required in production but not set",
                    key
                ))))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required but not set",
                    key
                ))))
            }
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" => Ok(Environment::Dev),
            "prod" => Ok(Environment::Prod),
            _ => Err(format!("Invalid environment: {}", s)),
        }
    }
}
