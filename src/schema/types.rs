//! Payload contract definitions
//!
//! A contract is a list of field rules checked in order; the first failing
//! rule names the offending field.

use serde_json::Value;

/// What a single payload field must satisfy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldCheck {
    /// String with at least one non-whitespace character
    NonEmptyString,
    /// Non-empty string drawn from a fixed set
    OneOf(&'static [&'static str]),
    /// Absent, null, or a string
    OptionalString,
    /// Any JSON number, integer or floating point
    Number,
    /// Any JSON number >= 0
    NonNegativeNumber,
}

/// Failure of one field check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckFailure {
    /// Value has the wrong type or is empty; carries the expectation
    Expected(&'static str),
    /// String outside the allowed set
    UnknownValue(String),
}

impl CheckFailure {
    /// Completes the sentence "<field> ..."
    pub fn reason(&self) -> String {
        match self {
            CheckFailure::Expected(what) => format!("must be {}", what),
            CheckFailure::UnknownValue(v) => format!("has unknown value {:?}", v),
        }
    }
}

impl FieldCheck {
    /// Checks a field value; `None` means the field is absent.
    pub fn check(&self, value: Option<&Value>) -> Result<(), CheckFailure> {
        match self {
            FieldCheck::NonEmptyString => match value {
                Some(Value::String(s)) if !s.trim().is_empty() => Ok(()),
                _ => Err(CheckFailure::Expected("a non-empty string")),
            },
            FieldCheck::OneOf(allowed) => match value {
                Some(Value::String(s)) if !s.is_empty() => {
                    if allowed.contains(&s.as_str()) {
                        Ok(())
                    } else {
                        Err(CheckFailure::UnknownValue(s.clone()))
                    }
                }
                _ => Err(CheckFailure::Expected("a non-empty string")),
            },
            FieldCheck::OptionalString => match value {
                None | Some(Value::Null) | Some(Value::String(_)) => Ok(()),
                _ => Err(CheckFailure::Expected("a string")),
            },
            FieldCheck::Number => match value {
                Some(Value::Number(_)) => Ok(()),
                _ => Err(CheckFailure::Expected("numeric")),
            },
            FieldCheck::NonNegativeNumber => match value {
                Some(Value::Number(n)) if is_non_negative(n) => Ok(()),
                _ => Err(CheckFailure::Expected("a non-negative number")),
            },
        }
    }
}

fn is_non_negative(n: &serde_json::Number) -> bool {
    if n.is_u64() {
        return true;
    }
    if let Some(i) = n.as_i64() {
        return i >= 0;
    }
    n.as_f64().map(|f| f >= 0.0).unwrap_or(false)
}

/// One named field and its check
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: &'static str,
    pub check: FieldCheck,
}

impl FieldRule {
    pub const fn new(field: &'static str, check: FieldCheck) -> Self {
        Self { field, check }
    }
}

/// A payload contract for one `(namespace, type)` pair
#[derive(Debug, Clone, Copy)]
pub struct Contract {
    pub namespace: &'static str,
    pub kind: &'static str,
    pub rules: &'static [FieldRule],
}

impl Contract {
    /// Subject used in validation messages, e.g. `clavain/dispatch`
    pub fn subject(&self) -> String {
        format!("{}/{}", self.namespace, self.kind)
    }

    /// First failing rule, if any
    pub fn first_violation(
        &self,
        payload: &serde_json::Map<String, Value>,
    ) -> Option<(&'static str, CheckFailure)> {
        self.rules.iter().find_map(|rule| {
            rule.check
                .check(payload.get(rule.field))
                .err()
                .map(|failure| (rule.field, failure))
        })
    }
}
