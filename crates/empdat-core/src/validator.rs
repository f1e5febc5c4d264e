//! Field validators.
//!
//! A validator rule is either a built-in named rule (`phone`, `alpha`,
//! `notnull`) or an ad-hoc regular expression (or a list of them, all
//! of which must match). Validators are a collaborator for callers
//! that want to pre-check a field before submission; the diff and
//! authorization paths never invoke them.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{EmpdatError, EmpdatResult};
use crate::value::Value;

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\+\d{1,2}\s)?\(?\d{3}\)?[\s.-]\d{3}[\s.-]\d{4}$").unwrap());

static ALPHA_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z]+$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidatorRule {
    /// One of the built-in named rules.
    Named(String),
    /// A single regular expression the value's text must match.
    Pattern(String),
    /// Several regular expressions, all of which must match.
    AllOf(Vec<String>),
}

impl ValidatorRule {
    pub fn named(name: impl Into<String>) -> Self {
        ValidatorRule::Named(name.into())
    }

    pub fn pattern(pattern: impl Into<String>) -> Self {
        ValidatorRule::Pattern(pattern.into())
    }
}

/// Validates a value against a rule. `Ok(false)` means the value is
/// invalid; `Err` means the rule itself is broken (unknown name, bad
/// regex).
pub fn validate(rule: &ValidatorRule, value: &Value) -> EmpdatResult<bool> {
    match rule {
        ValidatorRule::Named(name) => match name.as_str() {
            "phone" => Ok(matches_text(&PHONE_RE, value)),
            "alpha" => Ok(matches_text(&ALPHA_RE, value)),
            "notnull" => Ok(!value.is_null()),
            other => Err(EmpdatError::Validator(format!(
                "validator type does not exist: {other}"
            ))),
        },
        ValidatorRule::Pattern(pattern) => {
            let re = compile(pattern)?;
            Ok(matches_text(&re, value))
        }
        ValidatorRule::AllOf(patterns) => {
            for pattern in patterns {
                let re = compile(pattern)?;
                if !matches_text(&re, value) {
                    return Ok(false);
                }
            }
            Ok(true)
        }
    }
}

fn compile(pattern: &str) -> EmpdatResult<Regex> {
    Regex::new(pattern).map_err(|e| EmpdatError::Validator(e.to_string()))
}

// Regex rules apply to text; any other variant fails them.
fn matches_text(re: &Regex, value: &Value) -> bool {
    value.as_text().is_some_and(|s| re.is_match(s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_rule() {
        let rule = ValidatorRule::named("phone");
        assert!(validate(&rule, &"555-867-5309".into()).unwrap());
        assert!(validate(&rule, &"+1 (555) 867-5309".into()).unwrap());
        assert!(!validate(&rule, &"5558675309".into()).unwrap());
        assert!(!validate(&rule, &Value::Int(5558675309)).unwrap());
    }

    #[test]
    fn alpha_rule() {
        let rule = ValidatorRule::named("alpha");
        assert!(validate(&rule, &"Doe".into()).unwrap());
        assert!(!validate(&rule, &"Doe Jr.".into()).unwrap());
    }

    #[test]
    fn notnull_rule_accepts_any_non_null() {
        let rule = ValidatorRule::named("notnull");
        assert!(validate(&rule, &Value::Int(0)).unwrap());
        assert!(!validate(&rule, &Value::Null).unwrap());
    }

    #[test]
    fn unknown_named_rule_is_an_error() {
        assert!(validate(&ValidatorRule::named("ssn"), &"x".into()).is_err());
    }

    #[test]
    fn all_of_requires_every_pattern() {
        let rule = ValidatorRule::AllOf(vec![r"^\d+$".into(), r"^.{4}$".into()]);
        assert!(validate(&rule, &"1234".into()).unwrap());
        assert!(!validate(&rule, &"123".into()).unwrap());
    }
}
