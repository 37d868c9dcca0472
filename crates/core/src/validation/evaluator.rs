//! Field evaluator: pure logic, no document access.
//!
//! Rules of a field run in declared order and evaluation stops at the first
//! failure, so a field yields at most one [`FieldViolation`].

use super::catalog::{RuleCatalog, RuleDefinition, RuleInput};
use super::parser::{parse_rule, ParsedRule};
use super::rules::{FieldSpec, FieldViolation};
use super::source::{ElementInfo, ValueSource};
use crate::error::ConfigError;

/// Label used for a literal field that has neither a label nor a name.
pub const FALLBACK_LABEL: &str = "value";

/// A parsed token bound to its catalog definition, with parameters checked.
#[derive(Debug, Clone)]
pub(crate) struct CompiledRule {
    definition: &'static RuleDefinition,
    parsed: ParsedRule,
}

/// Parse, look up and parameter-check every token of a field.
pub(crate) fn compile_rules(
    spec: &FieldSpec,
    catalog: &RuleCatalog,
) -> Result<Vec<CompiledRule>, ConfigError> {
    let tokens = spec.rules.tokens();
    if tokens.is_empty() {
        return Err(ConfigError::EmptyRuleList {
            field: spec.display_name().to_string(),
        });
    }

    tokens
        .iter()
        .map(|token| {
            let parsed = parse_rule(token)?;
            let definition = catalog.lookup(&parsed.name)?;
            definition.check_params(&parsed)?;
            Ok(CompiledRule { definition, parsed })
        })
        .collect()
}

/// Evaluate one field against `value`.
///
/// Returns the violation for the first failing rule, or `None` if every rule
/// passes. `source` supplies element metadata and the other fields for
/// cross-field rules.
pub fn evaluate_field(
    spec: &FieldSpec,
    value: &str,
    source: &dyn ValueSource,
) -> Result<Option<FieldViolation>, ConfigError> {
    let rules = compile_rules(spec, RuleCatalog::builtin())?;
    let element = spec.name.as_deref().and_then(|name| source.element(name));
    Ok(first_violation(spec, value, element.as_ref(), &rules, source))
}

pub(crate) fn first_violation(
    spec: &FieldSpec,
    value: &str,
    element: Option<&ElementInfo>,
    rules: &[CompiledRule],
    fields: &dyn ValueSource,
) -> Option<FieldViolation> {
    let failed = rules.iter().find(|rule| {
        let input = RuleInput {
            value,
            params: &rule.parsed.params,
            raw_params: &rule.parsed.raw_params,
            pattern: rule.parsed.pattern.as_ref(),
            fields,
        };
        !rule.definition.test(&input)
    })?;

    tracing::trace!(
        field = spec.display_name(),
        rule = failed.definition.name,
        "Rule failed"
    );

    let label = resolve_label(spec, element);
    let template = spec.message.as_deref().unwrap_or(failed.definition.message);
    let message = format_message(template, &label, &failed.parsed.params);
    Some(violation(spec, element, label, message, failed.definition.name))
}

/// `spec.label`, then the element's UI label, then the field name.
pub fn resolve_label(spec: &FieldSpec, element: Option<&ElementInfo>) -> String {
    spec.label
        .as_deref()
        .or_else(|| element.and_then(|e| e.label.as_deref()))
        .or(spec.name.as_deref())
        .unwrap_or(FALLBACK_LABEL)
        .to_string()
}

/// Substitute the label for `%s` and parameters for `{0}`, `{1}`, ...
pub fn format_message(template: &str, label: &str, params: &[String]) -> String {
    let mut message = template.replacen("%s", label, 1);
    for (i, param) in params.iter().enumerate() {
        message = message.replace(&format!("{{{i}}}"), param);
    }
    message
}

fn violation(
    spec: &FieldSpec,
    element: Option<&ElementInfo>,
    label: String,
    message: String,
    rule: &str,
) -> FieldViolation {
    let name = spec.name.clone().unwrap_or_default();
    FieldViolation {
        id: element.map_or_else(|| name.clone(), |e| e.id.clone()),
        class: element.map(|e| e.class.clone()).unwrap_or_default(),
        name,
        message,
        label,
        rule: rule.to_string(),
    }
}
