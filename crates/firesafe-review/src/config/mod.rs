use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::workflows::review::evaluation::EvaluationConfig;

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

/// Which drawing analyzer backs automated evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyzerKind {
    /// No analysis; every evaluation sees zero findings.
    None,
    /// File-name keyword heuristics.
    Heuristic,
    /// Probabilistic code checks against the building profile.
    Simulated,
}

impl AnalyzerKind {
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" | "noop" => Ok(Self::None),
            "heuristic" | "keywords" => Ok(Self::Heuristic),
            "simulated" | "simulation" => Ok(Self::Simulated),
            other => Err(ConfigError::UnknownAnalyzer(other.to_string())),
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub review: ReviewConfig,
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

        let data_dir = env::var("FIRESAFE_DATA_DIR")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);
        let analyzer = match env::var("FIRESAFE_ANALYZER") {
            Ok(value) => AnalyzerKind::parse(&value)?,
            Err(_) => AnalyzerKind::Heuristic,
        };
        let simulation_seed = match env::var("FIRESAFE_SIMULATION_SEED") {
            Ok(value) => Some(
                value
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidSeed)?,
            ),
            Err(_) => None,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            review: ReviewConfig {
                data_dir,
                analyzer,
                simulation_seed,
                evaluation: EvaluationConfig::default(),
            },
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

/// Storage, analyzer and scoring settings for the review workflow.
#[derive(Debug, Clone)]
pub struct ReviewConfig {
    /// Directory for the JSON project and notification files; in-memory when unset.
    pub data_dir: Option<PathBuf>,
    pub analyzer: AnalyzerKind,
    pub simulation_seed: Option<u64>,
    pub evaluation: EvaluationConfig,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            analyzer: AnalyzerKind::Heuristic,
            simulation_seed: None,
            evaluation: EvaluationConfig::default(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    UnknownAnalyzer(String),
    InvalidSeed,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::UnknownAnalyzer(value) => write!(
                f,
                "FIRESAFE_ANALYZER must be one of none, heuristic, simulated (got '{value}')"
            ),
            ConfigError::InvalidSeed => write!(f, "FIRESAFE_SIMULATION_SEED must be a valid u64"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::UnknownAnalyzer(_)
            | ConfigError::InvalidSeed => None,
        }
    }
}
