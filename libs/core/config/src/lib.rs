pub mod tracing;

use std::env;
use std::str::FromStr;
use thiserror::Error;

/// Configuration error type
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable '{0}' is required but not set")]
    MissingEnvVar(String),

    #[error("Failed to parse environment variable '{key}': {details}")]
    ParseError { key: String, details: String },

    #[error("Invalid value for '{key}': {details}")]
    InvalidValue { key: String, details: String },
}

/// Application environment, selects log format
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Environment {
    Development, // Human readable logs
    Production,  // JSON logs for aggregation
}

impl Environment {
    pub fn from_env() -> Self {
        let app_env = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        if app_env.eq_ignore_ascii_case("production") {
            Environment::Production
        } else {
            Environment::Development
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

/// Trait for configuration that can be loaded from environment variables
pub trait FromEnv: Sized {
    fn from_env() -> Result<Self, ConfigError>;
}

/// Helper to load and parse environment variable with a default value
pub fn env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Optional variable, `None` when unset or blank
pub fn env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Comma separated list. Items are trimmed, blanks and repeats dropped,
/// first-seen order kept. `None` when the variable is unset.
pub fn env_list(key: &str) -> Option<Vec<String>> {
    env::var(key).ok().map(|value| split_list(&value))
}

/// Split a comma separated list the same way [`env_list`] does.
pub fn split_list(value: &str) -> Vec<String> {
    let mut items: Vec<String> = Vec::new();
    for item in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !items.iter().any(|existing| existing == item) {
            items.push(item.to_string());
        }
    }
    items
}

/// Parse a variable with `FromStr`, falling back to `default` when unset.
pub fn env_parse<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::ParseError {
            key: key.to_string(),
            details: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

/// Boolean flag accepting `true/false/1/0/yes/no/on/off`.
pub fn env_bool(key: &str, default: bool) -> Result<bool, ConfigError> {
    match env::var(key) {
        Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            other => Err(ConfigError::ParseError {
                key: key.to_string(),
                details: format!("'{other}' is not a boolean"),
            }),
        },
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_defaults_to_development() {
        temp_env::with_var_unset("APP_ENV", || {
            let env = Environment::from_env();
            assert_eq!(env, Environment::Development);
            assert!(!env.is_production());
        });
    }

    #[test]
    fn test_environment_production_case_insensitive() {
        temp_env::with_var("APP_ENV", Some("PRODUCTION"), || {
            let env = Environment::from_env();
            assert_eq!(env, Environment::Production);
        });

        temp_env::with_var("APP_ENV", Some("staging"), || {
            let env = Environment::from_env();
            assert_eq!(env, Environment::Development);
        });
    }

    #[test]
    fn test_env_or_default() {
        temp_env::with_var("AUDIT_TEST_VAR", Some("test_value"), || {
            assert_eq!(env_or_default("AUDIT_TEST_VAR", "default"), "test_value");
        });

        temp_env::with_var_unset("AUDIT_MISSING_VAR", || {
            assert_eq!(env_or_default("AUDIT_MISSING_VAR", "default"), "default");
        });
    }

    #[test]
    fn test_env_optional_blank_is_none() {
        temp_env::with_var("AUDIT_BLANK", Some("   "), || {
            assert_eq!(env_optional("AUDIT_BLANK"), None);
        });
        temp_env::with_var("AUDIT_SET", Some("value"), || {
            assert_eq!(env_optional("AUDIT_SET"), Some("value".to_string()));
        });
    }

    #[test]
    fn test_env_list_trims_and_dedupes() {
        temp_env::with_var("AUDIT_REGIONS", Some(" us-west-2, us-east-1,,us-west-2 "), || {
            assert_eq!(
                env_list("AUDIT_REGIONS"),
                Some(vec!["us-west-2".to_string(), "us-east-1".to_string()])
            );
        });

        temp_env::with_var_unset("AUDIT_REGIONS", || {
            assert_eq!(env_list("AUDIT_REGIONS"), None);
        });
    }

    #[test]
    fn test_env_parse() {
        temp_env::with_var("AUDIT_CONCURRENCY", Some("8"), || {
            assert_eq!(env_parse("AUDIT_CONCURRENCY", 4usize).unwrap(), 8);
        });

        temp_env::with_var("AUDIT_CONCURRENCY", Some("many"), || {
            let err = env_parse("AUDIT_CONCURRENCY", 4usize).unwrap_err();
            assert!(matches!(err, ConfigError::ParseError { .. }));
        });

        temp_env::with_var_unset("AUDIT_CONCURRENCY", || {
            assert_eq!(env_parse("AUDIT_CONCURRENCY", 4usize).unwrap(), 4);
        });
    }

    #[test]
    fn test_env_bool() {
        temp_env::with_var("AUDIT_FLAG", Some("Yes"), || {
            assert!(env_bool("AUDIT_FLAG", false).unwrap());
        });
        temp_env::with_var("AUDIT_FLAG", Some("off"), || {
            assert!(!env_bool("AUDIT_FLAG", true).unwrap());
        });
        temp_env::with_var("AUDIT_FLAG", Some("maybe"), || {
            assert!(env_bool("AUDIT_FLAG", true).is_err());
        });
    }
}
