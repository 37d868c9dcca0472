//! The validation session: compiles a set of field definitions and checks
//! them against their current values in one pass.

use super::catalog::{RuleCatalog, RuleDefinition};
use super::evaluator::{compile_rules, first_violation, CompiledRule};
use super::present::ErrorPresenter;
use super::rules::{FieldSet, FieldSpec, FieldViolation};
use super::source::{ElementInfo, FieldValue, NoSource, ValueSource};
use crate::config::{MissingFieldPolicy, ValidatorConfig};
use crate::error::ConfigError;

/// Validates an ordered set of fields.
///
/// The session borrows its collaborators and keeps no state between calls, so
/// [`validate`](Self::validate) re-reads current values every time.
pub struct Validator<'a> {
    fields: Vec<FieldSpec>,
    source: &'a dyn ValueSource,
    presenter: Option<&'a dyn ErrorPresenter>,
    config: ValidatorConfig,
}

impl std::fmt::Debug for Validator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field("fields", &self.fields)
            .field("has_presenter", &self.presenter.is_some())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Validator<'static> {
    /// Session over one field or a list of fields, with no value source.
    pub fn new(fields: impl Into<FieldSet>) -> Self {
        Self {
            fields: fields.into().into(),
            source: &NoSource,
            presenter: None,
            config: ValidatorConfig::default(),
        }
    }

    /// Session from a JSON field definition (an object or an array of objects).
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let set: FieldSet = serde_json::from_str(json)?;
        Ok(Self::new(set))
    }
}

impl<'a> Validator<'a> {
    /// Resolve named fields through `source`.
    pub fn with_source<'b>(self, source: &'b dyn ValueSource) -> Validator<'b>
    where
        'a: 'b,
    {
        Validator {
            fields: self.fields,
            source,
            presenter: self.presenter,
            config: self.config,
        }
    }

    /// Hand violations to `presenter` when presentation is enabled.
    pub fn with_presenter<'b>(self, presenter: &'b dyn ErrorPresenter) -> Validator<'b>
    where
        'a: 'b,
    {
        Validator {
            fields: self.fields,
            source: self.source,
            presenter: Some(presenter),
            config: self.config,
        }
    }

    pub fn with_config(mut self, config: ValidatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn show_validation_errors(mut self, show: bool) -> Self {
        self.config.show_validation_errors = show;
        self
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Catalog entry for `name`.
    pub fn get_rule(&self, name: &str) -> Result<&'static RuleDefinition, ConfigError> {
        RuleCatalog::builtin().lookup(name)
    }

    /// Run every field's rules against its current value.
    ///
    /// Returns one violation per failing field, in field order. Any
    /// configuration problem aborts the whole pass and nothing is presented.
    pub fn validate(&self) -> Result<Vec<FieldViolation>, ConfigError> {
        let violations = self.run().inspect_err(|err| {
            tracing::warn!(error = %err, "Validation aborted by configuration error");
        })?;

        tracing::debug!(
            fields = self.fields.len(),
            violations = violations.len(),
            "Validation pass complete"
        );

        if self.config.show_validation_errors {
            if let Some(presenter) = self.presenter {
                presenter.clear();
                for violation in &violations {
                    presenter.present(violation, &self.config.error_class);
                }
            }
        }

        Ok(violations)
    }

    fn run(&self) -> Result<Vec<FieldViolation>, ConfigError> {
        let catalog = RuleCatalog::builtin();
        let compiled = self
            .fields
            .iter()
            .enumerate()
            .map(|(index, field)| {
                if field.name.is_none() && field.value.is_none() {
                    return Err(ConfigError::MissingFieldIdentity { index });
                }
                compile_rules(field, catalog)
            })
            .collect::<Result<Vec<Vec<CompiledRule>>, _>>()?;

        let fields = SessionFields {
            fields: &self.fields,
            source: self.source,
        };

        let mut violations = Vec::new();
        for (field, rules) in self.fields.iter().zip(&compiled) {
            let Some(value) = self.resolve_value(field)? else {
                tracing::debug!(field = field.display_name(), "Skipping unresolved field");
                continue;
            };
            let element = self.element_for(field);
            if let Some(violation) = first_violation(field, &value, element.as_ref(), rules, &fields)
            {
                violations.push(violation);
            }
        }
        Ok(violations)
    }

    /// Literal value first, then the value source under the missing-field policy.
    /// `None` means the field is skipped.
    fn resolve_value(&self, field: &FieldSpec) -> Result<Option<String>, ConfigError> {
        if let Some(value) = &field.value {
            return Ok(Some(value.clone()));
        }
        let Some(name) = field.name.as_deref() else {
            return Ok(Some(String::new()));
        };
        match self.source.resolve(name) {
            Some(value) => Ok(Some(value.into_text())),
            None => match self.config.missing_field {
                MissingFieldPolicy::Empty => Ok(Some(String::new())),
                MissingFieldPolicy::Skip => Ok(None),
                MissingFieldPolicy::Error => Err(ConfigError::UnresolvedField(name.to_string())),
            },
        }
    }

    fn element_for(&self, field: &FieldSpec) -> Option<ElementInfo> {
        if field.value.is_some() {
            return None;
        }
        field
            .name
            .as_deref()
            .and_then(|name| self.source.element(name))
    }
}

/// What cross-field rules see: the session's literal fields, then the source.
struct SessionFields<'s> {
    fields: &'s [FieldSpec],
    source: &'s dyn ValueSource,
}

impl ValueSource for SessionFields<'_> {
    fn resolve(&self, name: &str) -> Option<FieldValue> {
        self.fields
            .iter()
            .find(|f| f.name.as_deref() == Some(name) && f.value.is_some())
            .and_then(|f| f.value.clone())
            .map(FieldValue::Text)
            .or_else(|| self.source.resolve(name))
    }

    fn element(&self, name: &str) -> Option<ElementInfo> {
        self.source.element(name)
    }
}
