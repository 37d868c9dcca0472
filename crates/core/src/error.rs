/// Configuration-tier failures.
///
/// These abort a validation pass entirely. A field whose value breaks one of
/// its rules is never reported through this type; see
/// [`FieldViolation`](crate::validation::rules::FieldViolation).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Unknown rule: {0}")]
    UnknownRule(String),

    #[error("Malformed rule `{token}`: {reason}")]
    Syntax { token: String, reason: &'static str },

    #[error("Invalid regex flag '{flag}' in rule `{token}`")]
    RegexFlag { token: String, flag: char },

    #[error("Invalid pattern /{pattern}/: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Rule {rule} takes {expected} parameter(s), got {found}")]
    ParamCount {
        rule: String,
        expected: usize,
        found: usize,
    },

    #[error("Rule {rule}: parameter `{param}` must be {expected}")]
    InvalidParam {
        rule: String,
        param: String,
        expected: &'static str,
    },

    #[error("Field {field} has no rules")]
    EmptyRuleList { field: String },

    #[error("Field #{index} needs a name or a literal value")]
    MissingFieldIdentity { index: usize },

    #[error("Field not found in value source: {0}")]
    UnresolvedField(String),

    #[error("Invalid setting {key}={value}")]
    InvalidSetting { key: &'static str, value: String },

    #[error("Invalid field definition: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_unknown_rule() {
        let err = ConfigError::UnknownRule("fooBar".to_string());
        assert_eq!(err.to_string(), "Unknown rule: fooBar");
    }

    #[test]
    fn display_param_count() {
        let err = ConfigError::ParamCount {
            rule: "minLength".to_string(),
            expected: 1,
            found: 0,
        };
        assert_eq!(
            err.to_string(),
            "Rule minLength takes 1 parameter(s), got 0"
        );
    }

    #[test]
    fn invalid_pattern_exposes_source() {
        let source = regex::Regex::new("(").unwrap_err();
        let err = ConfigError::InvalidPattern {
            pattern: "(".to_string(),
            source,
        };
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().starts_with("Invalid pattern /(/:"));
    }
}
