//! Rule token grammar.
//!
//! ```text
//! token   := name ( "[" params "]" )?
//! params  := param ( "," param )*        for every rule but `custom`
//!          | "/" body "/" flags           for `custom`
//! ```
//!
//! The `custom` argument is never comma-split, so patterns such as
//! `custom[/^[0-9]{2,4}$/]` keep their commas and brackets.

use regex::{Regex, RegexBuilder};

use crate::error::ConfigError;

/// Name of the rule whose argument is a regex literal.
pub const CUSTOM: &str = "custom";

/// A rule token split into its name and parameters.
#[derive(Debug, Clone)]
pub struct ParsedRule {
    pub name: String,
    /// Trimmed parameters in order. For `custom`, the single regex literal.
    pub params: Vec<String>,
    /// Bracket content exactly as written (empty without brackets).
    pub raw_params: String,
    /// Compiled pattern of a `custom` rule.
    pub pattern: Option<Regex>,
}

/// Parse a single rule token such as `minLength[2]` or `custom[/[a-z]/i]`.
pub fn parse_rule(token: &str) -> Result<ParsedRule, ConfigError> {
    let token = token.trim();
    let syntax = |reason| ConfigError::Syntax {
        token: token.to_string(),
        reason,
    };

    if token.is_empty() {
        return Err(syntax("empty rule token"));
    }

    let (name, raw) = match token.find('[') {
        Some(open) => {
            if !token.ends_with(']') {
                return Err(syntax("unbalanced brackets"));
            }
            (&token[..open], Some(&token[open + 1..token.len() - 1]))
        }
        None if token.contains(']') => return Err(syntax("unbalanced brackets")),
        None => (token, None),
    };

    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(syntax("invalid rule name"));
    }

    if name == CUSTOM {
        let literal = raw
            .map(str::trim)
            .ok_or_else(|| syntax("custom rule requires a /pattern/ argument"))?;
        let pattern = compile_literal(token, literal)?;
        return Ok(ParsedRule {
            name: name.to_string(),
            params: vec![literal.to_string()],
            raw_params: raw.unwrap_or_default().to_string(),
            pattern: Some(pattern),
        });
    }

    let params = match raw {
        None => Vec::new(),
        Some(raw) if raw.contains(['[', ']']) => return Err(syntax("unbalanced brackets")),
        Some(raw) => raw.split(',').map(|p| p.trim().to_string()).collect(),
    };

    Ok(ParsedRule {
        name: name.to_string(),
        params,
        raw_params: raw.unwrap_or_default().to_string(),
        pattern: None,
    })
}

/// Compile a `/body/flags` literal.
fn compile_literal(token: &str, literal: &str) -> Result<Regex, ConfigError> {
    let close = literal.rfind('/').filter(|&i| i > 0);
    let (body, flags) = match (literal.starts_with('/'), close) {
        (true, Some(close)) => (&literal[1..close], &literal[close + 1..]),
        _ => {
            return Err(ConfigError::Syntax {
                token: token.to_string(),
                reason: "custom pattern must be written as /pattern/flags",
            })
        }
    };

    let mut seen = String::new();
    let mut sticky = false;
    let (mut case_insensitive, mut multi_line, mut dot_all) = (false, false, false);
    for flag in flags.chars() {
        if seen.contains(flag) {
            return Err(ConfigError::RegexFlag {
                token: token.to_string(),
                flag,
            });
        }
        seen.push(flag);
        match flag {
            'i' => case_insensitive = true,
            'm' => multi_line = true,
            's' => dot_all = true,
            'y' => sticky = true,
            // global matching has no meaning for a single test; unicode is always on
            'g' | 'u' => {}
            _ => {
                return Err(ConfigError::RegexFlag {
                    token: token.to_string(),
                    flag,
                })
            }
        }
    }

    let source = if sticky {
        format!(r"\A(?:{body})")
    } else {
        body.to_string()
    };

    RegexBuilder::new(&source)
        .case_insensitive(case_insensitive)
        .multi_line(multi_line)
        .dot_matches_new_line(dot_all)
        .build()
        .map_err(|source| ConfigError::InvalidPattern {
            pattern: body.to_string(),
            source,
        })
}
