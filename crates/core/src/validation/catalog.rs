//! Built-in rule catalog.
//!
//! A closed, process-wide table from rule name to predicate, message template
//! and description. Every predicate works on the string form of a field's
//! value; an empty value never satisfies a rule.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;
use validator::{ValidateEmail, ValidateIp};

use super::parser::{ParsedRule, CUSTOM};
use super::source::ValueSource;
use crate::error::ConfigError;

/// Everything a predicate can look at.
pub struct RuleInput<'a> {
    pub value: &'a str,
    pub params: &'a [String],
    pub raw_params: &'a str,
    pub pattern: Option<&'a Regex>,
    /// Other fields of the session, for cross-field rules.
    pub fields: &'a dyn ValueSource,
}

impl RuleInput<'_> {
    fn param(&self) -> &str {
        self.params.first().map(String::as_str).unwrap_or_default()
    }

    fn length_param(&self) -> Option<usize> {
        self.param().parse().ok()
    }

    fn number_param(&self) -> Option<f64> {
        parse_number(self.param())
    }
}

pub type Predicate = fn(&RuleInput<'_>) -> bool;

/// Shape of a rule's bracketed argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    None,
    /// Non-negative integer.
    Length,
    Number,
    Text,
    /// Name of another field.
    Field,
    /// `/body/flags` regex literal.
    Pattern,
}

impl ParamKind {
    fn arity(self) -> usize {
        match self {
            Self::None => 0,
            _ => 1,
        }
    }
}

/// A built-in rule.
#[derive(Debug, Clone, Copy)]
pub struct RuleDefinition {
    pub name: &'static str,
    /// Message template; `%s` is the field label, `{0}` the first parameter.
    pub message: &'static str,
    pub description: &'static str,
    pub param: ParamKind,
    pub predicate: Predicate,
}

impl RuleDefinition {
    /// Reject parameter lists the predicate cannot work with.
    pub fn check_params(&self, parsed: &ParsedRule) -> Result<(), ConfigError> {
        let expected = self.param.arity();
        if parsed.params.len() != expected {
            return Err(ConfigError::ParamCount {
                rule: self.name.to_string(),
                expected,
                found: parsed.params.len(),
            });
        }

        let Some(param) = parsed.params.first() else {
            return Ok(());
        };
        let invalid = |expected| ConfigError::InvalidParam {
            rule: self.name.to_string(),
            param: param.clone(),
            expected,
        };
        match self.param {
            ParamKind::Length if param.parse::<usize>().is_err() => {
                Err(invalid("a non-negative integer"))
            }
            ParamKind::Number if parse_number(param).is_none() => Err(invalid("a finite number")),
            ParamKind::Text | ParamKind::Field if param.is_empty() => {
                Err(invalid("a non-empty string"))
            }
            ParamKind::Pattern if parsed.pattern.is_none() => Err(invalid("a /pattern/")),
            _ => Ok(()),
        }
    }

    /// Run the predicate. Empty values always fail.
    pub fn test(&self, input: &RuleInput<'_>) -> bool {
        !input.value.is_empty() && (self.predicate)(input)
    }
}

/// Lookup table over the built-in rules.
#[derive(Debug)]
pub struct RuleCatalog {
    rules: HashMap<&'static str, &'static RuleDefinition>,
}

static CATALOG: LazyLock<RuleCatalog> = LazyLock::new(|| RuleCatalog {
    rules: BUILTIN_RULES.iter().map(|rule| (rule.name, rule)).collect(),
});

impl RuleCatalog {
    /// The process-wide catalog of built-in rules.
    pub fn builtin() -> &'static RuleCatalog {
        &CATALOG
    }

    pub fn lookup(&self, name: &str) -> Result<&'static RuleDefinition, ConfigError> {
        self.rules
            .get(name)
            .copied()
            .ok_or_else(|| ConfigError::UnknownRule(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// All rules in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &'static RuleDefinition> {
        BUILTIN_RULES.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Rule table
// ---------------------------------------------------------------------------

const fn rule(
    name: &'static str,
    message: &'static str,
    description: &'static str,
    param: ParamKind,
    predicate: Predicate,
) -> RuleDefinition {
    RuleDefinition {
        name,
        message,
        description,
        param,
        predicate,
    }
}

#[rustfmt::skip]
static BUILTIN_RULES: &[RuleDefinition] = &[
    rule("required", "The %s field is required.", "must not be empty", ParamKind::None, required),
    rule("matches", "The %s field does not match the {0} field.", "must match another field", ParamKind::Field, matches_field),
    rule("url", "The %s field must contain a valid URL.", "must be an absolute URL", ParamKind::None, url),
    rule("email", "The %s field must contain a valid email address.", "must be an email address", ParamKind::None, email),
    rule("emails", "The %s field must contain all valid email addresses.", "must be a comma-separated list of email addresses", ParamKind::None, emails),
    rule("minLength", "The %s field must be at least {0} characters in length.", "must have a minimum length", ParamKind::Length, min_length),
    rule("maxLength", "The %s field must not exceed {0} characters in length.", "must have a maximum length", ParamKind::Length, max_length),
    rule("exactLength", "The %s field must be exactly {0} characters in length.", "must have an exact length", ParamKind::Length, exact_length),
    rule("greaterThan", "The %s field must contain a number greater than {0}.", "must be a number greater than a bound", ParamKind::Number, greater_than),
    rule("lessThan", "The %s field must contain a number less than {0}.", "must be a number less than a bound", ParamKind::Number, less_than),
    rule("equals", "The %s field must equal {0}.", "must equal a fixed value", ParamKind::Text, equals),
    rule("alpha", "The %s field must only contain alphabetical characters.", "letters only", ParamKind::None, alpha),
    rule("alphaNumeric", "The %s field must only contain alpha-numeric characters.", "letters and digits only", ParamKind::None, alpha_numeric),
    rule("alphaDash", "The %s field must only contain alpha-numeric characters, underscores, and dashes.", "letters, digits, underscores and dashes only", ParamKind::None, alpha_dash),
    rule("numeric", "The %s field must contain only numbers.", "must be a number", ParamKind::None, numeric),
    rule("integer", "The %s field must contain an integer.", "must be an integer", ParamKind::None, integer),
    rule("decimal", "The %s field must contain a decimal number.", "must be a decimal number", ParamKind::None, decimal),
    rule("ip", "The %s field must contain a valid IP.", "must be an IPv4 or IPv6 address", ParamKind::None, ip),
    rule("base64", "The %s field must contain a base64 string.", "must be base64 encoded", ParamKind::None, base64),
    rule("cvc", "The %s field must contain a valid security code.", "must be a 3 or 4 digit card security code", ParamKind::None, cvc),
    rule("creditCard", "The %s field must contain a valid credit card number.", "must be a credit card number", ParamKind::None, credit_card),
    rule("phone", "The %s field must contain a valid phone number.", "must be a phone number", ParamKind::None, phone),
    rule("hasNumber", "The %s field must contain at least one number.", "must contain a digit", ParamKind::None, has_number),
    rule("hasUpper", "The %s field must contain at least one uppercase letter.", "must contain an uppercase letter", ParamKind::None, has_upper),
    rule("hasLower", "The %s field must contain at least one lowercase letter.", "must contain a lowercase letter", ParamKind::None, has_lower),
    rule(CUSTOM, "The %s field is not in the correct format.", "must match a regular expression", ParamKind::Pattern, custom),
];

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

static ALPHA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z]+$").expect("valid regex"));
static ALPHA_NUMERIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9]+$").expect("valid regex"));
static ALPHA_DASH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_\-]+$").expect("valid regex"));
static NUMERIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-+]?[0-9]+(?:\.[0-9]+)?$").expect("valid regex"));
static INTEGER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-+]?[0-9]+$").expect("valid regex"));
static DECIMAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-+]?[0-9]*\.?[0-9]+$").expect("valid regex"));
static BASE64_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[A-Za-z0-9+/]{4})*(?:[A-Za-z0-9+/]{2}==|[A-Za-z0-9+/]{3}=)?$")
        .expect("valid regex")
});
static CVC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{3,4}$").expect("valid regex"));
static CARD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+(?:[ \-][0-9]+)*$").expect("valid regex"));
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9 ().\-]+$").expect("valid regex"));

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

fn required(input: &RuleInput<'_>) -> bool {
    !input.value.is_empty()
}

fn matches_field(input: &RuleInput<'_>) -> bool {
    input
        .fields
        .resolve(input.param())
        .is_some_and(|other| other.into_text() == input.value)
}

/// Schemes a form may link to.
const URL_SCHEMES: &[&str] = &["http", "https", "ftp"];

/// Absolute web URL: a known scheme and a non-empty host.
fn url(input: &RuleInput<'_>) -> bool {
    Url::parse(input.value).is_ok_and(|parsed| {
        URL_SCHEMES.contains(&parsed.scheme())
            && parsed.host_str().is_some_and(|host| !host.is_empty())
    })
}

fn email(input: &RuleInput<'_>) -> bool {
    input.value.validate_email()
}

fn emails(input: &RuleInput<'_>) -> bool {
    input.value.split(',').all(|address| {
        let address = address.trim();
        !address.is_empty() && address.validate_email()
    })
}

fn min_length(input: &RuleInput<'_>) -> bool {
    input
        .length_param()
        .is_some_and(|min| input.value.chars().count() >= min)
}

fn max_length(input: &RuleInput<'_>) -> bool {
    input
        .length_param()
        .is_some_and(|max| input.value.chars().count() <= max)
}

fn exact_length(input: &RuleInput<'_>) -> bool {
    input
        .length_param()
        .is_some_and(|len| input.value.chars().count() == len)
}

/// Finite decimal numbers only; `inf`, `infinity` and `NaN` are not numbers.
fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

fn greater_than(input: &RuleInput<'_>) -> bool {
    match (parse_number(input.value), input.number_param()) {
        (Some(value), Some(bound)) => value > bound,
        _ => false,
    }
}

fn less_than(input: &RuleInput<'_>) -> bool {
    match (parse_number(input.value), input.number_param()) {
        (Some(value), Some(bound)) => value < bound,
        _ => false,
    }
}

fn equals(input: &RuleInput<'_>) -> bool {
    input.value == input.param()
}

fn alpha(input: &RuleInput<'_>) -> bool {
    ALPHA_RE.is_match(input.value)
}

fn alpha_numeric(input: &RuleInput<'_>) -> bool {
    ALPHA_NUMERIC_RE.is_match(input.value)
}

fn alpha_dash(input: &RuleInput<'_>) -> bool {
    ALPHA_DASH_RE.is_match(input.value)
}

fn numeric(input: &RuleInput<'_>) -> bool {
    NUMERIC_RE.is_match(input.value)
}

fn integer(input: &RuleInput<'_>) -> bool {
    INTEGER_RE.is_match(input.value)
}

fn decimal(input: &RuleInput<'_>) -> bool {
    DECIMAL_RE.is_match(input.value)
}

fn ip(input: &RuleInput<'_>) -> bool {
    input.value.validate_ip()
}

fn base64(input: &RuleInput<'_>) -> bool {
    BASE64_RE.is_match(input.value)
}

fn cvc(input: &RuleInput<'_>) -> bool {
    CVC_RE.is_match(input.value)
}

fn credit_card(input: &RuleInput<'_>) -> bool {
    if !CARD_RE.is_match(input.value) {
        return false;
    }
    let digits: Vec<u32> = input
        .value
        .chars()
        .filter_map(|c| c.to_digit(10))
        .collect();
    (13..=19).contains(&digits.len()) && luhn(&digits)
}

/// Luhn mod-10 checksum over a digit sequence.
fn luhn(digits: &[u32]) -> bool {
    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                d
            }
        })
        .sum();
    sum % 10 == 0
}

fn phone(input: &RuleInput<'_>) -> bool {
    let digits = input.value.chars().filter(char::is_ascii_digit).count();
    PHONE_RE.is_match(input.value) && (7..=15).contains(&digits)
}

fn has_number(input: &RuleInput<'_>) -> bool {
    input.value.chars().any(|c| c.is_ascii_digit())
}

fn has_upper(input: &RuleInput<'_>) -> bool {
    input.value.chars().any(char::is_uppercase)
}

fn has_lower(input: &RuleInput<'_>) -> bool {
    input.value.chars().any(char::is_lowercase)
}

fn custom(input: &RuleInput<'_>) -> bool {
    input
        .pattern
        .is_some_and(|pattern| pattern.is_match(input.value))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::validation::parser::parse_rule;
    use crate::validation::source::{FormElement, MemoryForm, NoSource};

    fn check_with(token: &str, value: &str, fields: &dyn ValueSource) -> bool {
        let parsed = parse_rule(token).unwrap();
        let definition = RuleCatalog::builtin().lookup(&parsed.name).unwrap();
        definition.check_params(&parsed).unwrap();
        definition.test(&RuleInput {
            value,
            params: &parsed.params,
            raw_params: &parsed.raw_params,
            pattern: parsed.pattern.as_ref(),
            fields,
        })
    }

    fn check(token: &str, value: &str) -> bool {
        check_with(token, value, &NoSource)
    }

    /// (token, valid example, invalid example)
    const CASES: &[(&str, &str, &str)] = &[
        ("required", "required", ""),
        ("url", "https://www.apple.com", "invalid-url"),
        ("email", "testing@surveyplanet.com", "invalid-email"),
        (
            "emails",
            "testing1@surveyplanet.com,testing2@surveyplanet.com",
            "invalid1-email,invalid2-email",
        ),
        ("minLength[2]", "Mauris non congue volutpat.", "A"),
        ("maxLength[20]", "Nulla at odio", "Donec ut mauris nisl donec"),
        ("exactLength[20]", "Nullam cursus fringi", "Suspendisse faucibus blandit auctor"),
        ("greaterThan[20]", "21", "20"),
        ("equals[20]", "20", "s"),
        ("lessThan[20]", "2", "20"),
        ("alpha", "abc", "123"),
        ("alphaNumeric", "abc123", "abc(123)"),
        ("alphaDash", "_abc-123", "#abc-123"),
        ("numeric", "3", "invalid3"),
        ("integer", "-3", "invalid"),
        ("decimal", ".3", "invalid3"),
        ("ip", "8.8.8.8", "invalid-ip"),
        ("base64", "U29tZVN0cmluZ09idmlvdXNseU5vdEJhc2U2NEVuY29kZWQ=", "in"),
        ("cvc", "123", "invalid-cvc"),
        ("creditCard", "4242-4242-4242-4242", "invalid-cc"),
        ("phone", "5558889999", "invalid-phone"),
        ("hasNumber", "hell0", "no-number"),
        ("hasUpper", "Hello", "no-upper"),
        ("hasLower", "HELLo", "NO-LOWER"),
        ("custom[/[a-z]/m]", "abcdefg", "123"),
    ];

    #[test]
    fn every_rule_accepts_valid_and_rejects_invalid() {
        for (token, valid, invalid) in CASES {
            assert!(check(token, valid), "{token} should accept {valid:?}");
            assert!(!check(token, invalid), "{token} should reject {invalid:?}");
        }
    }

    #[test]
    fn cases_cover_the_whole_catalog() {
        let catalog = RuleCatalog::builtin();
        for definition in catalog.iter() {
            let covered = definition.name == "matches"
                || CASES
                    .iter()
                    .any(|(token, _, _)| parse_rule(token).unwrap().name == definition.name);
            assert!(covered, "no example for {}", definition.name);
        }
    }

    #[test]
    fn matches_reads_the_other_field() {
        let form = MemoryForm::new().with(FormElement::text("password", "hunter2"));
        assert!(check_with("matches[password]", "hunter2", &form));
        assert!(!check_with("matches[password]", "hunter3", &form));
        assert!(!check_with("matches[missing]", "hunter2", &form));
    }

    #[test]
    fn empty_value_fails_every_rule() {
        for (token, _, _) in CASES {
            assert!(!check(token, ""), "{token} should reject an empty value");
        }
    }

    #[test]
    fn numeric_rules_reject_non_numbers() {
        assert!(!check("greaterThan[1]", "abc"));
        assert!(!check("lessThan[1]", "NaN"));
        assert!(!check("greaterThan[20]", "inf"));
        assert!(!check("greaterThan[20]", "infinity"));
        assert!(!check("lessThan[20]", "-inf"));
        assert!(!check("lessThan[20]", "1e999"));
        assert!(check("greaterThan[-1.5]", "-1"));
    }

    #[test]
    fn url_requires_web_scheme_and_host() {
        assert!(check("url", "http://localhost:8080/path?q=1"));
        assert!(check("url", "ftp://files.example.com/a.txt"));
        assert!(!check("url", "abc:def"));
        assert!(!check("url", "javascript:alert(1)"));
        assert!(!check("url", "mailto:someone@example.com"));
        assert!(!check("url", "www.apple.com"));
    }

    #[test]
    fn lengths_count_characters_not_bytes() {
        assert!(check("exactLength[3]", "äöü"));
        assert!(check("maxLength[2]", "日本"));
        assert!(check("exactLength[1]", "😀"));
    }

    #[test]
    fn credit_card_requires_luhn() {
        assert!(check("creditCard", "4242 4242 4242 4242"));
        assert!(check("creditCard", "4242424242424242"));
        assert!(!check("creditCard", "4242-4242-4242-4241"));
        assert!(!check("creditCard", "4242--4242-4242-4242"));
        assert!(!check("creditCard", "1234"));
    }

    #[test]
    fn phone_tolerates_punctuation() {
        assert!(check("phone", "+1 (555) 888-9999"));
        assert!(check("phone", "555.888.9999"));
        assert!(!check("phone", "12345"));
    }

    #[test]
    fn ip_accepts_v6() {
        assert!(check("ip", "::1"));
        assert!(check("ip", "2001:db8::ff00:42:8329"));
        assert!(!check("ip", "256.1.1.1"));
    }

    #[test]
    fn lookup_returns_named_definition_with_placeholder() {
        let catalog = RuleCatalog::builtin();
        assert_eq!(catalog.len(), 26);
        for definition in catalog.iter() {
            let found = catalog.lookup(definition.name).unwrap();
            assert_eq!(found.name, definition.name);
            assert_eq!(found.message.matches("%s").count(), 1, "{}", found.name);
        }
        assert!(catalog.contains(CUSTOM));
    }

    #[test]
    fn required_definition_text() {
        let rule = RuleCatalog::builtin().lookup("required").unwrap();
        assert_eq!(rule.message, "The %s field is required.");
        assert_eq!(rule.description, "must not be empty");
    }

    #[test]
    fn unknown_rule_fails_closed() {
        assert_matches!(
            RuleCatalog::builtin().lookup("isPrime"),
            Err(ConfigError::UnknownRule(name)) if name == "isPrime"
        );
    }

    #[test]
    fn param_checks() {
        let catalog = RuleCatalog::builtin();
        let check_params = |token: &str| {
            let parsed = parse_rule(token).unwrap();
            catalog.lookup(&parsed.name).unwrap().check_params(&parsed)
        };

        assert!(check_params("minLength[3]").is_ok());
        assert_matches!(
            check_params("minLength"),
            Err(ConfigError::ParamCount { expected: 1, found: 0, .. })
        );
        assert_matches!(
            check_params("required[1]"),
            Err(ConfigError::ParamCount { expected: 0, found: 1, .. })
        );
        assert_matches!(
            check_params("minLength[-1]"),
            Err(ConfigError::InvalidParam { .. })
        );
        assert_matches!(
            check_params("greaterThan[ten]"),
            Err(ConfigError::InvalidParam { .. })
        );
        assert_matches!(
            check_params("greaterThan[inf]"),
            Err(ConfigError::InvalidParam { .. })
        );
        assert_matches!(
            check_params("lessThan[-infinity]"),
            Err(ConfigError::InvalidParam { .. })
        );
        assert_matches!(check_params("equals[]"), Err(ConfigError::InvalidParam { .. }));
        assert_matches!(
            check_params("maxLength[1,2]"),
            Err(ConfigError::ParamCount { found: 2, .. })
        );
    }
}
