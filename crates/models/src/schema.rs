//! Input schemas and field-level validation.
//!
//! Every create/update payload is a closed schema: a fixed list of fields with
//! a JSON kind each. [`parse_input`] checks the raw JSON against that list
//! first (so every missing, mistyped or unknown field is reported at once),
//! then decodes it and runs the `validator` constraints plus any cross-field
//! rules the schema adds in [`InputSchema::check`].

use std::fmt;

use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

/// One violated constraint on one field.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub code: String,
    pub message: String,
}

/// Every violation found in one payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFailure {
    pub violations: Vec<FieldViolation>,
}

impl ValidationFailure {
    pub fn single(field: &str, code: &str, message: impl Into<String>) -> Self {
        let mut out = Self::default();
        out.push(field, code, message);
        out
    }

    pub fn push(&mut self, field: &str, code: &str, message: impl Into<String>) {
        self.violations.push(FieldViolation { field: field.to_string(), code: code.to_string(), message: message.into() });
    }

    pub fn merge(&mut self, other: ValidationFailure) {
        self.violations.extend(other.violations);
    }

    pub fn is_empty(&self) -> bool { self.violations.is_empty() }

    /// Field names with at least one violation, in report order.
    pub fn fields(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.violations.iter().map(|v| v.field.as_str()).collect();
        names.dedup();
        names
    }

    pub fn has(&self, field: &str, code: &str) -> bool {
        self.violations.iter().any(|v| v.field == field && v.code == code)
    }

    pub fn into_result(mut self) -> Result<(), Self> {
        if self.is_empty() {
            return Ok(());
        }
        self.violations.sort();
        Err(self)
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.violations.iter().map(|v| format!("{}: {}", v.field, v.message)).collect();
        f.write_str(&parts.join("; "))
    }
}

impl std::error::Error for ValidationFailure {}

impl From<ValidationErrors> for ValidationFailure {
    fn from(errs: ValidationErrors) -> Self {
        let mut out = Self::default();
        for (field, kind) in errs.errors() {
            if let ValidationErrorsKind::Field(list) = kind {
                for e in list {
                    let message = match &e.message {
                        Some(m) => m.to_string(),
                        None => describe(&e.code, &e.params),
                    };
                    out.push(&field.to_string(), &e.code, message);
                }
            }
        }
        out.violations.sort();
        out
    }
}

fn describe(code: &str, params: &std::collections::HashMap<std::borrow::Cow<'static, str>, Value>) -> String {
    let min = params.get("min").map(|v| v.to_string());
    let max = params.get("max").map(|v| v.to_string());
    match (code, min, max) {
        ("length", Some(min), Some(max)) => format!("length must be between {min} and {max}"),
        ("length", Some(min), None) => format!("length must be at least {min}"),
        ("length", None, Some(max)) => format!("length must be at most {max}"),
        ("range", Some(min), Some(max)) => format!("must be between {min} and {max}"),
        ("range", Some(min), None) => format!("must be at least {min}"),
        ("range", None, Some(max)) => format!("must be at most {max}"),
        ("email", _, _) => "must be a valid email address".to_string(),
        (other, _, _) => format!("failed `{other}` check"),
    }
}

/// JSON kind a field must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Str,
    Int,
    Bool,
    /// RFC 3339 timestamp string
    Timestamp,
    /// String restricted to a closed set of values
    OneOf(&'static [&'static str]),
}

impl FieldKind {
    fn matches(self, v: &Value) -> bool {
        match self {
            FieldKind::Str => v.is_string(),
            FieldKind::Int => v.is_i64() || v.is_u64(),
            FieldKind::Bool => v.is_boolean(),
            FieldKind::Timestamp => v
                .as_str()
                .is_some_and(|s| chrono::DateTime::parse_from_rfc3339(s).is_ok()),
            FieldKind::OneOf(allowed) => v.as_str().is_some_and(|s| allowed.contains(&s)),
        }
    }

    fn expectation(self) -> String {
        match self {
            FieldKind::Str => "expected a string".into(),
            FieldKind::Int => "expected an integer".into(),
            FieldKind::Bool => "expected a boolean".into(),
            FieldKind::Timestamp => "expected an RFC 3339 timestamp".into(),
            FieldKind::OneOf(allowed) => format!("expected one of: {}", allowed.join(", ")),
        }
    }
}

/// Declaration of one schema field.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub nullable: bool,
}

impl FieldSpec {
    /// Must be present and non-null.
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind, required: true, nullable: false }
    }

    /// May be omitted, but not null.
    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind, required: false, nullable: false }
    }

    /// May be omitted or null.
    pub const fn nullable(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind, required: false, nullable: true }
    }
}

/// A closed, validated input shape.
pub trait InputSchema: DeserializeOwned + Validate {
    const FIELDS: &'static [FieldSpec];

    /// Cross-field rules run after per-field validation.
    fn check(&self, _out: &mut ValidationFailure) {}
}

/// Check an untyped payload against `T`'s schema and decode it.
pub fn parse_input<T: InputSchema>(value: Value) -> Result<T, ValidationFailure> {
    let Value::Object(map) = value else {
        return Err(ValidationFailure::single("_schema", "type", "expected a JSON object"));
    };
    structural_check(T::FIELDS, &map).into_result()?;

    let parsed: T = serde_json::from_value(Value::Object(map))
        .map_err(|e| ValidationFailure::single("_schema", "invalid", e.to_string()))?;
    validate_typed(&parsed)?;
    Ok(parsed)
}

/// Run the `validator` constraints and the schema's cross-field rules on an
/// already-typed value.
pub fn validate_typed<T: InputSchema>(value: &T) -> Result<(), ValidationFailure> {
    let mut out = match value.validate() {
        Ok(()) => ValidationFailure::default(),
        Err(e) => ValidationFailure::from(e),
    };
    value.check(&mut out);
    out.into_result()
}

fn structural_check(fields: &[FieldSpec], map: &Map<String, Value>) -> ValidationFailure {
    let mut out = ValidationFailure::default();
    for field in fields {
        match map.get(field.name) {
            None if field.required => out.push(field.name, "required", "is required"),
            None => {}
            Some(Value::Null) if field.nullable => {}
            Some(Value::Null) if field.required => out.push(field.name, "required", "is required"),
            Some(Value::Null) => out.push(field.name, "type", "must not be null"),
            Some(v) if !field.kind.matches(v) => out.push(field.name, "type", field.kind.expectation()),
            Some(_) => {}
        }
    }
    for key in map.keys() {
        if !fields.iter().any(|f| f.name == key) {
            out.push(key, "unknown_field", "is not allowed");
        }
    }
    out
}

/// Length check for fields validator cannot see (tri-state update fields).
pub fn check_length(out: &mut ValidationFailure, field: &str, value: Option<&str>, min: usize, max: usize) {
    if let Some(v) = value {
        let len = v.chars().count();
        if len < min || len > max {
            out.push(field, "length", format!("length must be between {min} and {max}"));
        }
    }
}

/// Deserialize a field as `Some(None)` for explicit `null` and `Some(Some(v))`
/// for a value; combined with `#[serde(default)]` an absent field stays `None`.
pub fn double_option<'de, D, T>(d: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(d).map(Some)
}

/// ISO-4217 style currency code: three uppercase ASCII letters.
pub fn is_currency(value: &str) -> bool {
    value.len() == 3 && value.chars().all(|c| c.is_ascii_uppercase())
}

/// Non-empty and digits only.
pub fn is_digits(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_digit())
}

/// Push a `format` violation when a present value fails `pred`.
pub fn check_format(
    out: &mut ValidationFailure,
    field: &str,
    value: Option<&str>,
    pred: impl Fn(&str) -> bool,
    message: &str,
) {
    if let Some(v) = value {
        if !pred(v) {
            out.push(field, "format", message);
        }
    }
}

/// Push a `length` violation when a present value is blank after trimming.
pub fn check_not_blank(out: &mut ValidationFailure, field: &str, value: Option<&str>) {
    if value.is_some_and(|v| v.trim().is_empty()) {
        out.push(field, "length", "must not be blank");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize, Validate)]
    #[serde(deny_unknown_fields)]
    struct Probe {
        #[validate(length(min = 1, max = 4))]
        name: String,
        #[validate(range(min = 0))]
        count: Option<i64>,
        #[serde(default, deserialize_with = "double_option")]
        note: Option<Option<String>>,
    }

    impl InputSchema for Probe {
        const FIELDS: &'static [FieldSpec] = &[
            FieldSpec::required("name", FieldKind::Str),
            FieldSpec::optional("count", FieldKind::Int),
            FieldSpec::nullable("note", FieldKind::Str),
        ];

        fn check(&self, out: &mut ValidationFailure) {
            check_length(out, "note", self.note.as_ref().and_then(|n| n.as_deref()), 0, 3);
        }
    }

    #[test]
    fn accepts_valid_payload_unchanged() {
        let p: Probe = parse_input(json!({"name": "abc", "count": 2})).unwrap();
        assert_eq!(p.name, "abc");
        assert_eq!(p.count, Some(2));
        assert_eq!(p.note, None);
    }

    #[test]
    fn rejects_non_object() {
        let err = parse_input::<Probe>(json!([1, 2])).unwrap_err();
        assert!(err.has("_schema", "type"));
    }

    #[test]
    fn reports_every_structural_problem() {
        let err = parse_input::<Probe>(json!({"count": "x", "extra": 1})).unwrap_err();
        assert!(err.has("name", "required"));
        assert!(err.has("count", "type"));
        assert!(err.has("extra", "unknown_field"));
        assert_eq!(err.violations.len(), 3);
    }

    #[test]
    fn null_handling_depends_on_field_flags() {
        let err = parse_input::<Probe>(json!({"name": "a", "count": null})).unwrap_err();
        assert!(err.has("count", "type"));

        let p: Probe = parse_input(json!({"name": "a", "note": null})).unwrap();
        assert_eq!(p.note, Some(None));
    }

    #[test]
    fn runs_constraints_and_cross_field_rules() {
        let err = parse_input::<Probe>(json!({"name": "toolong", "count": -1, "note": "long"})).unwrap_err();
        assert!(err.has("name", "length"));
        assert!(err.has("count", "range"));
        assert!(err.has("note", "length"));
        assert_eq!(err.fields(), vec!["count", "name", "note"]);
    }

    #[test]
    fn format_helpers() {
        assert!(is_currency("EUR"));
        assert!(!is_currency("eur"));
        assert!(!is_currency("EURO"));
        assert!(is_digits("0012345"));
        assert!(!is_digits("12-34"));

        let mut out = ValidationFailure::default();
        check_format(&mut out, "currency", Some("usd"), is_currency, "bad currency");
        check_format(&mut out, "account_number", None, is_digits, "digits only");
        check_not_blank(&mut out, "name", Some("   "));
        assert!(out.has("currency", "format"));
        assert!(out.has("name", "length"));
        assert_eq!(out.violations.len(), 2);
    }

    #[test]
    fn display_joins_fields() {
        let mut f = ValidationFailure::single("name", "required", "is required");
        f.push("email", "email", "must be a valid email address");
        assert_eq!(f.to_string(), "name: is required; email: must be a valid email address");
    }
}
