//! API configuration

use serde::Deserialize;

use domain_consent::DEFAULT_VALIDITY_MONTHS;

/// API configuration
///
/// Every field can be set through an `API_`-prefixed environment variable,
/// e.g. `API_DOCUMENT_ROOT`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    /// JWT secret for authentication
    pub jwt_secret: String,
    pub jwt_expiration_secs: u64,
    pub database_url: String,
    pub log_level: String,
    /// Directory signed consent documents are written to
    pub document_root: String,
    /// How long a newly registered consent stays valid
    pub consent_validity_months: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            jwt_secret: "change-me-in-production".to_string(),
            jwt_expiration_secs: 3600,
            database_url: "postgres://localhost/listings".to_string(),
            log_level: "info".to_string(),
            document_root: "./data/documents".to_string(),
            consent_validity_months: DEFAULT_VALIDITY_MONTHS,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from environment
    ///
    /// Unset variables keep their defaults; a variable that is set but
    /// malformed is an error.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::load(config::Environment::with_prefix("API"))
    }

    fn load(environment: config::Environment) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(environment)
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
