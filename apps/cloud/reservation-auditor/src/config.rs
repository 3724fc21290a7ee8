//! Configuration for the reservation auditor

use core_config::{
    ConfigError, FromEnv, env_bool, env_list, env_optional, env_or_default, env_parse,
};
use domain_reservations::{CategorySet, DEFAULT_REGION_CONCURRENCY};
use serde::{Serialize, Serializer};
use std::fmt;

use crate::render::OutputFormat;

#[derive(Debug, Clone, Serialize)]
pub struct Config {
    pub environment: String,
    /// Categories whose extractors run
    pub categories: CategorySet,
    /// Regions to audit, in the order given
    pub regions: Vec<String>,
    pub output: OutputFormat,
    /// Hide rows with neither waste nor exposure
    pub mismatched_only: bool,
    /// Regions extracted concurrently per category
    pub max_concurrency: usize,
    pub aws: AwsConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct AwsConfig {
    /// Region used to bootstrap the SDK; extraction clients are re-scoped per region
    pub bootstrap_region: String,
    pub profile: Option<String>,
    /// Explicit keys, otherwise the default credential chain is used
    pub credentials: Option<StaticCredentials>,
}

#[derive(Clone, Serialize)]
pub struct StaticCredentials {
    pub access_key_id: String,
    #[serde(serialize_with = "redacted")]
    pub secret_access_key: String,
    #[serde(serialize_with = "redacted_opt")]
    pub session_token: Option<String>,
}

impl fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[redacted]")
            .field("session_token", &self.session_token.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

fn redacted<S: Serializer>(_: &str, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str("[redacted]")
}

fn redacted_opt<S: Serializer>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(_) => serializer.serialize_str("[redacted]"),
        None => serializer.serialize_none(),
    }
}

fn default_regions() -> Vec<String> {
    vec!["us-east-1".to_string()]
}

impl FromEnv for Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self, ConfigError> {
        let categories = match env_list("AUDIT_CATEGORIES") {
            Some(names) => {
                CategorySet::from_names(&names).map_err(|e| ConfigError::InvalidValue {
                    key: "AUDIT_CATEGORIES".to_string(),
                    details: e.to_string(),
                })?
            }
            None => CategorySet::all(),
        };

        let regions = env_list("AWS_REGIONS").unwrap_or_else(default_regions);

        let bootstrap_region = env_optional("AWS_REGION")
            .or_else(|| regions.first().cloned())
            .unwrap_or_else(|| "us-east-1".to_string());

        let credentials = match (
            env_optional("AWS_ACCESS_KEY_ID"),
            env_optional("AWS_SECRET_ACCESS_KEY"),
        ) {
            (Some(access_key_id), Some(secret_access_key)) => Some(StaticCredentials {
                access_key_id,
                secret_access_key,
                session_token: env_optional("AWS_SESSION_TOKEN"),
            }),
            (None, None) => None,
            (Some(_), None) => {
                return Err(ConfigError::MissingEnvVar("AWS_SECRET_ACCESS_KEY".to_string()));
            }
            (None, Some(_)) => {
                return Err(ConfigError::MissingEnvVar("AWS_ACCESS_KEY_ID".to_string()));
            }
        };

        let config = Config {
            environment: env_or_default("APP_ENV", "development"),
            categories,
            regions,
            output: env_parse("AUDIT_OUTPUT", OutputFormat::Table)?,
            mismatched_only: env_bool("AUDIT_MISMATCHED_ONLY", false)?,
            max_concurrency: env_parse("AUDIT_MAX_CONCURRENCY", DEFAULT_REGION_CONCURRENCY)?,
            aws: AwsConfig {
                bootstrap_region,
                profile: env_optional("AWS_PROFILE"),
                credentials,
            },
        };

        config.validate()?;
        Ok(config)
    }
}

impl Config {
    /// Apply command line overrides on top of the environment.
    pub fn with_overrides(
        mut self,
        categories: Option<CategorySet>,
        regions: Option<Vec<String>>,
        output: Option<OutputFormat>,
        mismatched_only: bool,
    ) -> Result<Self, ConfigError> {
        if let Some(categories) = categories {
            self.categories = categories;
        }
        if let Some(regions) = regions {
            self.regions = core_config::split_list(&regions.join(","));
        }
        if let Some(output) = output {
            self.output = output;
        }
        self.mismatched_only |= mismatched_only;

        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.categories.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "AUDIT_CATEGORIES".to_string(),
                details: "at least one category is required".to_string(),
            });
        }
        if self.regions.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "AWS_REGIONS".to_string(),
                details: "at least one region is required".to_string(),
            });
        }
        if self.max_concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                key: "AUDIT_MAX_CONCURRENCY".to_string(),
                details: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
