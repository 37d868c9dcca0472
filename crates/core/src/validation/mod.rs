//! Rule-based field validation engine.
//!
//! Provides the rule catalog, the rule token parser, the per-field evaluator
//! and the validation session, plus the value-source and presentation
//! capabilities the session is wired to. Nothing here touches a real
//! document; callers plug in their own [`source::ValueSource`] and
//! [`present::ErrorPresenter`].

pub mod catalog;
pub mod evaluator;
pub mod parser;
pub mod present;
pub mod rules;
pub mod session;
pub mod source;
