//! Field definition and violation types.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One rule token or an ordered list of them.
///
/// Deserializes from either a JSON string or an array of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleList {
    One(String),
    Many(Vec<String>),
}

impl RuleList {
    /// The tokens in declared order.
    pub fn tokens(&self) -> &[String] {
        match self {
            Self::One(token) => std::slice::from_ref(token),
            Self::Many(tokens) => tokens,
        }
    }
}

impl From<&str> for RuleList {
    fn from(token: &str) -> Self {
        Self::One(token.to_string())
    }
}

impl From<String> for RuleList {
    fn from(token: String) -> Self {
        Self::One(token)
    }
}

impl From<Vec<String>> for RuleList {
    fn from(tokens: Vec<String>) -> Self {
        Self::Many(tokens)
    }
}

impl From<Vec<&str>> for RuleList {
    fn from(tokens: Vec<&str>) -> Self {
        Self::Many(tokens.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for RuleList {
    fn from(tokens: [&str; N]) -> Self {
        Self::Many(tokens.iter().map(|t| t.to_string()).collect())
    }
}

/// A field to validate: either a name resolved through the value source or a
/// literal value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    #[serde(default)]
    pub name: Option<String>,
    /// Literal value; takes precedence over the value source.
    #[serde(default, deserialize_with = "literal_value")]
    pub value: Option<String>,
    pub rules: RuleList,
    #[serde(default)]
    pub label: Option<String>,
    /// Overrides the rule's message template. `%s` is replaced by the label.
    #[serde(default)]
    pub message: Option<String>,
}

impl FieldSpec {
    /// A field whose value comes from the value source.
    pub fn named(name: impl Into<String>, rules: impl Into<RuleList>) -> Self {
        Self {
            name: Some(name.into()),
            value: None,
            rules: rules.into(),
            label: None,
            message: None,
        }
    }

    /// A field validated against a fixed value.
    pub fn literal(value: impl Into<String>, rules: impl Into<RuleList>) -> Self {
        Self {
            name: None,
            value: Some(value.into()),
            rules: rules.into(),
            label: None,
            message: None,
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Name used in logs and configuration errors.
    pub(crate) fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<literal>")
    }
}

/// Accepts strings, numbers and booleans for a literal `value`.
fn literal_value<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(Value::Bool(true)) => Some("checked".to_string()),
        Some(Value::Bool(false)) => Some(String::new()),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(other) => {
            return Err(serde::de::Error::custom(format!(
                "literal value must be a string, number or boolean, got {other}"
            )))
        }
    })
}

/// One field definition or a list of them, as accepted by
/// [`Validator::new`](super::session::Validator::new).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FieldSet {
    One(FieldSpec),
    Many(Vec<FieldSpec>),
}

impl From<FieldSpec> for FieldSet {
    fn from(spec: FieldSpec) -> Self {
        Self::One(spec)
    }
}

impl From<Vec<FieldSpec>> for FieldSet {
    fn from(specs: Vec<FieldSpec>) -> Self {
        Self::Many(specs)
    }
}

impl From<FieldSet> for Vec<FieldSpec> {
    fn from(set: FieldSet) -> Self {
        match set {
            FieldSet::One(spec) => vec![spec],
            FieldSet::Many(specs) => specs,
        }
    }
}

/// A field that failed one of its rules.
///
/// At most one per field: the first failing rule in declared order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub id: String,
    pub name: String,
    pub class: String,
    pub message: String,
    pub label: String,
    /// Name of the rule that failed.
    pub rule: String,
}
