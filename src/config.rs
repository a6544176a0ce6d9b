use rust_decimal::Decimal;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
    pub test_before_acquire: bool,
}

/// Settings for validating tokens from the hosted auth service
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub audience: String,
}

/// Payment gateway settings and premium plan prices
#[derive(Debug, Clone)]
pub struct PaymentConfig {
    pub secret_key: String,
    pub base_url: String,
    pub callback_url: Option<String>,
    pub currency: String,
    pub monthly_price: Decimal,
    pub yearly_price: Decimal,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub payment: PaymentConfig,
    pub log_level: String,
    pub log_format: String,
    pub http_port: u16,
    pub ws_port: Option<u16>,
    pub environment: String,
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    lookup(key).and_then(|s| s.parse::<T>().ok()).unwrap_or(default)
}

impl DatabaseConfig {
    /// Create database config from environment variables
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create database config from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let url = lookup("DATABASE_URL").ok_or("DATABASE_URL environment variable is required")?;

        let max_connections = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10u32);
        let acquire_timeout_secs = parse_or(&lookup, "DATABASE_ACQUIRE_TIMEOUT_SECS", 30u64);
        // 10 and 30 minutes
        let idle_timeout_secs = parse_or(&lookup, "DATABASE_IDLE_TIMEOUT_SECS", 600u64);
        let max_lifetime_secs = parse_or(&lookup, "DATABASE_MAX_LIFETIME_SECS", 1800u64);
        let test_before_acquire = parse_or(&lookup, "DATABASE_TEST_BEFORE_ACQUIRE", true);

        // Validate configuration
        if max_connections == 0 {
            return Err("DATABASE_MAX_CONNECTIONS must be greater than 0".to_string());
        }

        if acquire_timeout_secs == 0 {
            return Err("DATABASE_ACQUIRE_TIMEOUT_SECS must be greater than 0".to_string());
        }

        Ok(Self {
            url,
            max_connections,
            acquire_timeout_secs,
            idle_timeout_secs,
            max_lifetime_secs,
            test_before_acquire,
        })
    }

    /// Get acquire timeout as Duration
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    /// Get idle timeout as Duration
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    /// Get max lifetime as Duration
    pub fn max_lifetime(&self) -> Duration {
        Duration::from_secs(self.max_lifetime_secs)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/rankme".to_string(),
            max_connections: 10,
            acquire_timeout_secs: 30,
            idle_timeout_secs: 600,
            max_lifetime_secs: 1800,
            test_before_acquire: true,
        }
    }
}

impl JwtConfig {
    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or("JWT_SECRET environment variable is required")?;
        let audience = lookup("JWT_AUDIENCE").unwrap_or_else(|| "authenticated".to_string());

        Ok(Self { secret, audience })
    }
}

impl PaymentConfig {
    fn from_lookup(
        lookup: &impl Fn(&str) -> Option<String>,
        production: bool,
    ) -> Result<Self, String> {
        let secret_key = lookup("PAYSTACK_SECRET_KEY").unwrap_or_default();
        if production && secret_key.is_empty() {
            return Err("PAYSTACK_SECRET_KEY is required in production".to_string());
        }

        let monthly_price = Self::price(lookup, "PREMIUM_MONTHLY_PRICE", Decimal::new(200_000, 2))?;
        let yearly_price = Self::price(lookup, "PREMIUM_YEARLY_PRICE", Decimal::new(2_000_000, 2))?;

        Ok(Self {
            secret_key,
            base_url: lookup("PAYSTACK_BASE_URL")
                .unwrap_or_else(|| "https://api.paystack.co".to_string())
                .trim_end_matches('/')
                .to_string(),
            callback_url: lookup("PAYMENT_CALLBACK_URL").filter(|s| !s.is_empty()),
            currency: lookup("PAYMENT_CURRENCY")
                .unwrap_or_else(|| "NGN".to_string())
                .to_uppercase(),
            monthly_price,
            yearly_price,
        })
    }

    fn price(
        lookup: &impl Fn(&str) -> Option<String>,
        key: &str,
        default: Decimal,
    ) -> Result<Decimal, String> {
        let price = match lookup(key) {
            Some(raw) => {
                Decimal::from_str(raw.trim()).map_err(|e| format!("Invalid {}: {}", key, e))?
            }
            None => default,
        };
        if price <= Decimal::ZERO {
            return Err(format!("{} must be greater than 0", key));
        }
        Ok(price)
    }

    /// Whether gateway calls can be made at all
    pub fn is_configured(&self) -> bool {
        !self.secret_key.is_empty()
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            secret_key: String::new(),
            base_url: "https://api.paystack.co".to_string(),
            callback_url: None,
            currency: "NGN".to_string(),
            monthly_price: Decimal::new(200_000, 2),
            yearly_price: Decimal::new(2_000_000, 2),
        }
    }
}

impl AppConfig {
    /// Create application config from environment variables
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create application config from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let database = DatabaseConfig::from_lookup(&lookup)?;
        let jwt = JwtConfig::from_lookup(&lookup)?;

        let log_level = lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string());
        let log_format = lookup("LOG_FORMAT").unwrap_or_else(|| "pretty".to_string());
        let http_port = parse_or(&lookup, "HTTP_PORT", 8080u16);
        let ws_port = lookup("WS_PORT").and_then(|s| s.parse::<u16>().ok());
        let environment = lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string());

        // Validate log level
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&log_level.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid LOG_LEVEL: {}. Must be one of: {:?}",
                log_level, valid_log_levels
            ));
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&log_format.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid LOG_FORMAT: {}. Must be one of: {:?}",
                log_format, valid_log_formats
            ));
        }

        // Validate environment
        let valid_environments = ["development", "staging", "production"];
        if !valid_environments.contains(&environment.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid ENVIRONMENT: {}. Must be one of: {:?}",
                environment, valid_environments
            ));
        }

        if ws_port.is_some() && ws_port == Some(http_port) {
            return Err("WS_PORT must differ from HTTP_PORT".to_string());
        }

        let environment = environment.to_lowercase();
        let payment = PaymentConfig::from_lookup(&lookup, environment == "production")?;

        Ok(Self {
            database,
            jwt,
            payment,
            log_level: log_level.to_lowercase(),
            log_format: log_format.to_lowercase(),
            http_port,
            ws_port,
            environment,
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Whether logs should be emitted as JSON lines
    pub fn json_logs(&self) -> bool {
        self.log_format == "json"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            jwt: JwtConfig {
                secret: "development-secret".to_string(),
                audience: "authenticated".to_string(),
            },
            payment: PaymentConfig::default(),
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            http_port: 8080,
            ws_port: None,
            environment: "development".to_string(),
        }
    }
}
