//! Rule-based validation for flat name/value fields.
//!
//! Each field carries one or more rule tokens (`required`, `minLength[2]`,
//! `custom[/^[0-9]{5}$/]`, ...). A [`Validator`] checks every field against its
//! current value and returns at most one [`FieldViolation`] per field, in field
//! order.
//!
//! ```
//! use formcheck_core::{FieldSpec, Validator};
//!
//! let validator = Validator::new(vec![
//!     FieldSpec::literal("tester@tester.test", ["required", "email"]),
//!     FieldSpec::literal("not a valid ip", ["ip", "minLength[15]"]),
//! ]);
//!
//! let violations = validator.validate().unwrap();
//! assert_eq!(violations.len(), 1);
//! assert_eq!(violations[0].rule, "ip");
//! ```

pub mod config;
pub mod error;
pub mod validation;

pub use config::{MissingFieldPolicy, ValidatorConfig};
pub use error::ConfigError;
pub use validation::catalog::{ParamKind, RuleCatalog, RuleDefinition};
pub use validation::evaluator::evaluate_field;
pub use validation::parser::{parse_rule, ParsedRule};
pub use validation::present::{ErrorPresenter, PresentedError, RecordingPresenter, TracingPresenter};
pub use validation::rules::{FieldSet, FieldSpec, FieldViolation, RuleList};
pub use validation::session::Validator;
pub use validation::source::{
    Control, ElementInfo, FieldValue, FormElement, MemoryForm, NoSource, ValueSource,
};
