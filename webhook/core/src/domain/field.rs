// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Field-level validation errors.
//!
//! An `ErrorList` is an ordered list of `(field path, offending value, detail)`
//! entries. An empty list means the object is valid.

use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Reason attached to every cause produced by this crate
pub const FIELD_VALUE_INVALID: &str = "FieldValueInvalid";

/// Dotted path to a field, e.g. `spec.nodePools`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    pub fn new(root: &str) -> Self {
        Self(vec![root.to_string()])
    }

    pub fn child(&self, name: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(name.to_string());
        Self(segments)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub bad_value: Value,
    pub detail: String,
}

impl FieldError {
    /// The value at `path` is invalid for the reason given in `detail`
    pub fn invalid(path: &FieldPath, value: impl Into<Value>, detail: impl Into<String>) -> Self {
        Self {
            field: path.to_string(),
            bad_value: value.into(),
            detail: detail.into(),
        }
    }

    /// Error text without the field prefix
    pub fn error_body(&self) -> String {
        format!("Invalid value: {}: {}", self.bad_value, self.detail)
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.error_body())
    }
}

pub type ErrorList = Vec<FieldError>;

/// Render a list the way aggregate errors print: one error bare, several in brackets
pub fn aggregate_message(errors: &[FieldError]) -> String {
    match errors {
        [] => String::new(),
        [only] => only.to_string(),
        many => format!(
            "[{}]",
            many.iter().map(|e| e.to_string()).collect::<Vec<_>>().join(", ")
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_path_display() {
        let path = FieldPath::new("spec").child("nodePools");
        assert_eq!(path.to_string(), "spec.nodePools");
    }

    #[test]
    fn test_invalid_renders_json_value() {
        let path = FieldPath::new("spec").child("nodePools");

        let single = FieldError::invalid(&path, "A", "already used");
        assert_eq!(single.to_string(), r#"spec.nodePools: Invalid value: "A": already used"#);

        let list = FieldError::invalid(&path, json!(["D", "E"]), "can not find the nodepools");
        assert_eq!(list.error_body(), r#"Invalid value: ["D","E"]: can not find the nodepools"#);
    }

    #[test]
    fn test_aggregate_message() {
        let path = FieldPath::new("spec");
        let a = FieldError::invalid(&path, "a", "first");
        let b = FieldError::invalid(&path, "b", "second");

        assert_eq!(aggregate_message(&[]), "");
        assert_eq!(aggregate_message(&[a.clone()]), a.to_string());
        assert_eq!(aggregate_message(&[a.clone(), b.clone()]), format!("[{}, {}]", a, b));
    }
}
