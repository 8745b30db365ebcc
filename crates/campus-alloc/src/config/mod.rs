use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::workflows::allocation::AllocationPolicy;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub pipeline: PipelineConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            pipeline: PipelineConfig::from_env()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Knobs for the allocation pipeline shared by the CLI and HTTP service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub policy: AllocationPolicy,
    pub default_verdict: bool,
    pub bursary_seed: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            policy: AllocationPolicy::Parity,
            default_verdict: false,
            bursary_seed: None,
        }
    }
}

impl PipelineConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let policy = match env::var("ALLOC_POLICY") {
            Ok(value) => match AllocationPolicy::from_name(&value) {
                Some(policy) => policy,
                None => return Err(ConfigError::InvalidPolicy { value }),
            },
            Err(_) => AllocationPolicy::Parity,
        };

        let default_verdict = match env::var("ALLOC_DEFAULT_VERDICT") {
            Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => return Err(ConfigError::InvalidVerdict { value }),
            },
            Err(_) => false,
        };

        let bursary_seed = match env::var("ALLOC_BURSARY_SEED") {
            Ok(value) => match value.trim().parse::<u64>() {
                Ok(seed) => Some(seed),
                Err(_) => return Err(ConfigError::InvalidSeed { value }),
            },
            Err(_) => None,
        };

        Ok(Self {
            policy,
            default_verdict,
            bursary_seed,
        })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidPolicy { value: String },
    InvalidVerdict { value: String },
    InvalidSeed { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidPolicy { value } => write!(
                f,
                "ALLOC_POLICY '{}' is not one of: {}",
                value,
                AllocationPolicy::names().join(", ")
            ),
            ConfigError::InvalidVerdict { value } => {
                write!(f, "ALLOC_DEFAULT_VERDICT '{value}' must be true or false")
            }
            ConfigError::InvalidSeed { value } => {
                write!(f, "ALLOC_BURSARY_SEED '{value}' must be a valid u64")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidPolicy { .. }
            | ConfigError::InvalidVerdict { .. }
            | ConfigError::InvalidSeed { .. } => None,
        }
    }
}
