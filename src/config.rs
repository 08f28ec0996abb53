//! Application configuration loaded from environment variables.

use std::env;
use std::time::Duration;

use secrecy::SecretString;

/// Development default values - NEVER use in production.
pub mod defaults {
    pub const DEV_HOST: &str = "127.0.0.1";
    pub const DEV_PORT: u16 = 8080;
    pub const PIPEDRIVE_BASE_URL: &str = "https://api.pipedrive.com/v1";
    pub const GITHUB_API_URL: &str = "https://api.github.com";
    pub const GIST_EMBED_URL: &str = "https://gist.github.com";
    /// Organization name that marks a CRM deal as a tracking record.
    pub const TRACKING_ORG: &str = "gist-sync";
    pub const HTTP_TIMEOUT_SECS: u64 = 30;
}

/// Runtime environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Parse environment from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Some(Self::Development),
            "production" | "prod" => Some(Self::Production),
            _ => None,
        }
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

/// Pipedrive CRM connection settings.
#[derive(Debug, Clone)]
pub struct CrmSettings {
    /// API base URL, including the version segment (e.g. `.../v1`)
    pub base_url: String,
    /// API token sent as the `api_token` query parameter
    pub api_token: Option<SecretString>,
}

/// GitHub gist API connection settings.
#[derive(Debug, Clone)]
pub struct GistSettings {
    /// REST API base URL
    pub api_url: String,
    /// Optional personal access token (unauthenticated calls are rate limited harder)
    pub api_token: Option<SecretString>,
}

/// Settings shared by the sync services at request time.
#[derive(Debug, Clone)]
pub struct SyncSettings {
    /// Sentinel organization name marking tracked deals
    pub tracking_org: String,
    /// Base URL for gist embed scripts in the digest page
    pub gist_embed_url: String,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            tracking_org: defaults::TRACKING_ORG.to_string(),
            gist_embed_url: defaults::GIST_EMBED_URL.to_string(),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Runtime environment
    pub environment: Environment,
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Timeout applied to every outbound request
    pub http_timeout: Duration,
    pub crm: CrmSettings,
    pub gists: GistSettings,
    pub sync: SyncSettings,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `RUST_ENV`: Environment (development/production) - REQUIRED
    /// - `GCS_HOST`: Server host (default: 127.0.0.1)
    /// - `GCS_PORT`: Server port (default: 8080)
    /// - `PIPEDRIVE_API_TOKEN`: CRM API token (required in production)
    /// - `PIPEDRIVE_BASE_URL`: CRM API base URL
    /// - `GITHUB_API_TOKEN`: GitHub token for gist listing (optional)
    /// - `GITHUB_API_URL`: GitHub REST API base URL
    /// - `GCS_GIST_EMBED_URL`: Base URL for gist embed scripts
    /// - `GCS_TRACKING_ORG`: Sentinel organization name (default: gist-sync)
    /// - `GCS_HTTP_TIMEOUT_SECS`: Outbound request timeout in seconds (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        let env_str = env::var("RUST_ENV").map_err(|_| ConfigError::MissingEnvVar("RUST_ENV"))?;

        let environment = Environment::parse(&env_str).ok_or(ConfigError::InvalidValue(
            "RUST_ENV must be 'development' or 'production'",
        ))?;

        let host = env::var("GCS_HOST").unwrap_or_else(|_| defaults::DEV_HOST.to_string());

        let port = env::var("GCS_PORT")
            .unwrap_or_else(|_| defaults::DEV_PORT.to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidValue("GCS_PORT must be a valid port number"))?;

        let http_timeout_secs = env::var("GCS_HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|_| defaults::HTTP_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidValue("GCS_HTTP_TIMEOUT_SECS must be a valid number"))?;

        let crm = CrmSettings {
            base_url: env::var("PIPEDRIVE_BASE_URL")
                .unwrap_or_else(|_| defaults::PIPEDRIVE_BASE_URL.to_string()),
            api_token: non_empty_var("PIPEDRIVE_API_TOKEN").map(SecretString::from),
        };

        let gists = GistSettings {
            api_url: env::var("GITHUB_API_URL")
                .unwrap_or_else(|_| defaults::GITHUB_API_URL.to_string()),
            api_token: non_empty_var("GITHUB_API_TOKEN").map(SecretString::from),
        };

        let sync = SyncSettings {
            tracking_org: non_empty_var("GCS_TRACKING_ORG")
                .unwrap_or_else(|| defaults::TRACKING_ORG.to_string()),
            gist_embed_url: env::var("GCS_GIST_EMBED_URL")
                .unwrap_or_else(|_| defaults::GIST_EMBED_URL.to_string()),
        };

        let config = Config {
            environment,
            host,
            port,
            http_timeout: Duration::from_secs(http_timeout_secs),
            crm,
            gists,
            sync,
        };

        if environment.is_production() {
            config.validate_production()?;
        }

        Ok(config)
    }

    /// Validate that production configuration has credentials and secure upstreams.
    fn validate_production(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.crm.api_token.is_none() {
            errors.push("PIPEDRIVE_API_TOKEN must be set in production.".to_string());
        }

        for (name, url) in [
            ("PIPEDRIVE_BASE_URL", &self.crm.base_url),
            ("GITHUB_API_URL", &self.gists.api_url),
            ("GCS_GIST_EMBED_URL", &self.sync.gist_embed_url),
        ] {
            if !url.starts_with("https://") {
                errors.push(format!("{} must be an https:// URL (got '{}').", name, url));
            }
        }

        if !errors.is_empty() {
            return Err(ConfigError::ProductionValidation(errors));
        }

        Ok(())
    }

    /// Get the server bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn is_development(&self) -> bool {
        self.environment.is_development()
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(&'static str),

    #[error("Production configuration validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    ProductionValidation(Vec<String>),
}
