//! Service configuration
//!
//! All settings are read once at startup through the `config` crate and then
//! split into the per-component configuration structs handed to constructors.

use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use std::time::Duration;

use crate::{
    bootstrap::BootstrapConfig, jwt::JwtConfig, password::PasswordConfig,
    rate_limiter::RateLimiterConfig,
};

/// Everything the request-serving components need
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub jwt: JwtConfig,
    pub password: PasswordConfig,
    pub request_timeout: Duration,
    pub rate_limiter: RateLimiterConfig,
}

/// Flat view of the environment
///
/// # Environment Variables
/// - `JWT_SECRET`: access-token signing secret (required)
/// - `JWT_REFRESH_SECRET`: refresh-token signing secret, must differ (required)
/// - `JWT_EXPIRE`: access-token lifetime (default: `15m`)
/// - `JWT_REFRESH_EXPIRE`: refresh-token lifetime (default: `7d`)
/// - `PASSWORD_HASH_COST`: Argon2 time cost (default: 2)
/// - `ADMIN_EMAIL`: bootstrap admin email (default: `admin@test-agency.com`)
/// - `ADMIN_INITIAL_PASSWORD`: bootstrap admin password (bootstrap skipped when unset)
/// - `REQUEST_TIMEOUT_SECS`: bound on store lookups and hashing (default: 5)
/// - `SERVER_HOST` / `SERVER_PORT`: listen address (default: `0.0.0.0:3000`)
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub jwt_secret: String,
    pub jwt_refresh_secret: String,
    pub jwt_expire: String,
    pub jwt_refresh_expire: String,
    pub password_hash_cost: u32,
    pub admin_email: String,
    pub admin_initial_password: Option<String>,
    pub request_timeout_secs: u64,
    pub server_host: String,
    pub server_port: u16,
}

impl Settings {
    /// Load settings from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_environment(Environment::default())
    }

    /// Load settings from an explicit environment source
    pub fn from_environment(environment: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("jwt_expire", "15m")?
            .set_default("jwt_refresh_expire", "7d")?
            .set_default("password_hash_cost", 2_i64)?
            .set_default("admin_email", "admin@test-agency.com")?
            .set_default("request_timeout_secs", 5_i64)?
            .set_default("server_host", "0.0.0.0")?
            .set_default("server_port", 3000_i64)?
            .add_source(environment)
            .build()?
            .try_deserialize()
    }

    pub fn service_config(&self) -> Result<ServiceConfig, ConfigError> {
        Ok(ServiceConfig {
            jwt: self.jwt_config()?,
            password: self.password_config(),
            request_timeout: self.request_timeout(),
            rate_limiter: RateLimiterConfig::default(),
        })
    }

    /// Token signing configuration
    pub fn jwt_config(&self) -> Result<JwtConfig, ConfigError> {
        let access_token_expiry = parse_duration(&self.jwt_expire)
            .map_err(|e| ConfigError::Message(format!("JWT_EXPIRE: {}", e)))?;
        let refresh_token_expiry = parse_duration(&self.jwt_refresh_expire)
            .map_err(|e| ConfigError::Message(format!("JWT_REFRESH_EXPIRE: {}", e)))?;

        let config = JwtConfig {
            access_secret: self.jwt_secret.clone(),
            refresh_secret: self.jwt_refresh_secret.clone(),
            access_token_expiry: access_token_expiry.as_secs(),
            refresh_token_expiry: refresh_token_expiry.as_secs(),
        };
        config.validate().map_err(ConfigError::Message)?;
        Ok(config)
    }

    pub fn password_config(&self) -> PasswordConfig {
        PasswordConfig {
            cost: self.password_hash_cost,
        }
    }

    pub fn bootstrap_config(&self) -> BootstrapConfig {
        BootstrapConfig {
            admin_email: self.admin_email.clone(),
            admin_password: self
                .admin_initial_password
                .clone()
                .filter(|password| !password.is_empty()),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

/// Parse a lifetime such as `900`, `45s`, `15m`, `12h` or `7d`
pub fn parse_duration(value: &str) -> Result<Duration, String> {
    let value = value.trim();
    let split = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    let (digits, unit) = value.split_at(split);

    let amount: u64 = digits
        .parse()
        .map_err(|_| format!("invalid duration '{}'", value))?;

    let multiplier = match unit {
        "" | "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "d" => 24 * 60 * 60,
        _ => return Err(format!("unknown duration unit in '{}'", value)),
    };

    if amount == 0 {
        return Err(format!("duration '{}' must be positive", value));
    }

    amount
        .checked_mul(multiplier)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration '{}' is too large", value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;

    fn environment(vars: &[(&str, &str)]) -> Environment {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::default().source(Some(source))
    }

    #[test]
    fn test_parse_duration_units() {
        assert_eq!(parse_duration("900").unwrap(), Duration::from_secs(900));
        assert_eq!(parse_duration("45s").unwrap(), Duration::from_secs(45));
        assert_eq!(parse_duration("15m").unwrap(), Duration::from_secs(900));
        assert_eq!(parse_duration("12h").unwrap(), Duration::from_secs(43_200));
        assert_eq!(parse_duration("7d").unwrap(), Duration::from_secs(604_800));
    }

    #[test]
    fn test_parse_duration_rejects_garbage() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("m").is_err());
        assert!(parse_duration("10w").is_err());
        assert!(parse_duration("0").is_err());
    }

    #[test]
    fn test_settings_defaults() {
        let settings = Settings::from_environment(environment(&[
            ("JWT_SECRET", "access-secret"),
            ("JWT_REFRESH_SECRET", "refresh-secret"),
        ]))
        .unwrap();

        assert_eq!(settings.password_hash_cost, 2);
        assert_eq!(settings.admin_email, "admin@test-agency.com");
        assert_eq!(settings.bind_address(), "0.0.0.0:3000");
        assert_eq!(settings.request_timeout(), Duration::from_secs(5));
        assert!(settings.bootstrap_config().admin_password.is_none());

        let jwt = settings.jwt_config().unwrap();
        assert_eq!(jwt.access_token_expiry, 900);
        assert_eq!(jwt.refresh_token_expiry, 604_800);
    }

    #[test]
    fn test_settings_custom_values() {
        let settings = Settings::from_environment(environment(&[
            ("JWT_SECRET", "access-secret"),
            ("JWT_REFRESH_SECRET", "refresh-secret"),
            ("JWT_EXPIRE", "30m"),
            ("JWT_REFRESH_EXPIRE", "1d"),
            ("PASSWORD_HASH_COST", "4"),
            ("ADMIN_INITIAL_PASSWORD", "Sup3r!Secret"),
            ("SERVER_PORT", "8080"),
        ]))
        .unwrap();

        let jwt = settings.jwt_config().unwrap();
        assert_eq!(jwt.access_token_expiry, 1800);
        assert_eq!(jwt.refresh_token_expiry, 86_400);
        assert_eq!(settings.password_config().cost, 4);
        assert_eq!(
            settings.bootstrap_config().admin_password.as_deref(),
            Some("Sup3r!Secret")
        );
        assert_eq!(settings.bind_address(), "0.0.0.0:8080");
    }

    #[test]
    fn test_numeric_looking_secrets_are_kept_verbatim() {
        let settings = Settings::from_environment(environment(&[
            ("JWT_SECRET", "000123"),
            ("JWT_REFRESH_SECRET", "1e3"),
            ("ADMIN_INITIAL_PASSWORD", "00012345678"),
            ("REQUEST_TIMEOUT_SECS", "7"),
        ]))
        .unwrap();

        assert_eq!(settings.jwt_secret, "000123");
        assert_eq!(settings.jwt_refresh_secret, "1e3");
        assert_eq!(
            settings.bootstrap_config().admin_password.as_deref(),
            Some("00012345678")
        );
        assert_eq!(settings.request_timeout(), Duration::from_secs(7));

        let jwt = settings.jwt_config().unwrap();
        assert_eq!(jwt.access_secret, "000123");
        assert_eq!(jwt.refresh_secret, "1e3");
    }

    #[test]
    fn test_settings_require_secrets() {
        let result = Settings::from_environment(environment(&[("JWT_SECRET", "only-one")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_jwt_config_rejects_shared_secret() {
        let settings = Settings::from_environment(environment(&[
            ("JWT_SECRET", "same-secret"),
            ("JWT_REFRESH_SECRET", "same-secret"),
        ]))
        .unwrap();

        assert!(settings.jwt_config().is_err());
    }

    #[test]
    #[serial]
    fn test_settings_from_process_env() {
        unsafe {
            std::env::set_var("JWT_SECRET", "process-access");
            std::env::set_var("JWT_REFRESH_SECRET", "process-refresh");
            std::env::set_var("JWT_EXPIRE", "5m");
        }

        let settings = Settings::from_env().unwrap();
        assert_eq!(settings.jwt_secret, "process-access");
        assert_eq!(settings.jwt_config().unwrap().access_token_expiry, 300);

        unsafe {
            std::env::remove_var("JWT_SECRET");
            std::env::remove_var("JWT_REFRESH_SECRET");
            std::env::remove_var("JWT_EXPIRE");
        }
    }
}
