//! Validator session configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default CSS-style class handed to the error presenter.
pub const DEFAULT_ERROR_CLASS: &str = "validation-error error";

/// What to do with a named field the value source does not know about.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingFieldPolicy {
    /// Validate it as an empty string.
    Empty,
    /// Leave it out of the pass; it never produces a violation.
    #[default]
    Skip,
    /// Abort the pass with [`ConfigError::UnresolvedField`].
    Error,
}

impl MissingFieldPolicy {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "empty" => Some(Self::Empty),
            "skip" => Some(Self::Skip),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

/// Per-session settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Drive the attached presenter after each pass (default: `false`).
    pub show_validation_errors: bool,
    /// Class passed to the presenter for each marked field.
    pub error_class: String,
    /// Handling of names the value source cannot resolve.
    pub missing_field: MissingFieldPolicy,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            show_validation_errors: false,
            error_class: DEFAULT_ERROR_CLASS.to_string(),
            missing_field: MissingFieldPolicy::Skip,
        }
    }
}

impl ValidatorConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                  |
    /// |---------------------------|--------------------------|
    /// | `FORMCHECK_SHOW_ERRORS`   | `false`                  |
    /// | `FORMCHECK_ERROR_CLASS`   | `validation-error error` |
    /// | `FORMCHECK_MISSING_FIELD` | `skip`                   |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env), reading through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup("FORMCHECK_SHOW_ERRORS") {
            config.show_validation_errors = parse_flag(&raw).ok_or(ConfigError::InvalidSetting {
                key: "FORMCHECK_SHOW_ERRORS",
                value: raw,
            })?;
        }

        if let Some(raw) = lookup("FORMCHECK_ERROR_CLASS") {
            let class = raw.trim();
            if !class.is_empty() {
                config.error_class = class.to_string();
            }
        }

        if let Some(raw) = lookup("FORMCHECK_MISSING_FIELD") {
            config.missing_field =
                MissingFieldPolicy::parse(&raw).ok_or(ConfigError::InvalidSetting {
                    key: "FORMCHECK_MISSING_FIELD",
                    value: raw,
                })?;
        }

        Ok(config)
    }
}

fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
