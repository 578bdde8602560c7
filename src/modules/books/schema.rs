//! Structural validation of incoming book payloads.
//!
//! The schema is a fixed table of field rules. Validation is strict: values are
//! never coerced, so `"10"` is not an acceptable `pages`. Properties outside the
//! table are ignored.

use serde_json::{Map, Value};

/// JSON type a field must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Non-empty string
    Text,
    /// Integer representable as `i64`
    Integer,
}

impl FieldKind {
    fn type_name(self) -> &'static str {
        match self {
            FieldKind::Text => "string",
            FieldKind::Integer => "integer",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

const fn required(name: &'static str, kind: FieldKind) -> FieldRule {
    FieldRule {
        name,
        kind,
        required: true,
    }
}

pub const BOOK_SCHEMA: &[FieldRule] = &[
    required("isbn", FieldKind::Text),
    required("amazon_url", FieldKind::Text),
    required("author", FieldKind::Text),
    required("language", FieldKind::Text),
    required("pages", FieldKind::Integer),
    required("publisher", FieldKind::Text),
    required("title", FieldKind::Text),
    required("year", FieldKind::Integer),
];

/// Check `payload` against `schema`, returning every violation found.
pub fn validate(payload: &Value, schema: &[FieldRule]) -> Result<(), Vec<String>> {
    let Some(object) = payload.as_object() else {
        return Err(vec![format!(
            "instance is not of a type(s) object, got {}",
            json_type(payload)
        )]);
    };

    let violations = check_object(object, schema);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

/// Validate against [`BOOK_SCHEMA`].
pub fn validate_book(payload: &Value) -> Result<(), Vec<String>> {
    validate(payload, BOOK_SCHEMA)
}

fn check_object(object: &Map<String, Value>, schema: &[FieldRule]) -> Vec<String> {
    let mut violations = Vec::new();

    for rule in schema {
        match object.get(rule.name) {
            None | Some(Value::Null) if rule.required => {
                violations.push(format!("instance requires property \"{}\"", rule.name));
            }
            None | Some(Value::Null) => {}
            Some(value) => {
                if let Some(violation) = check_value(rule, value) {
                    violations.push(violation);
                }
            }
        }
    }

    violations
}

fn check_value(rule: &FieldRule, value: &Value) -> Option<String> {
    let matches = match rule.kind {
        FieldKind::Text => value.is_string(),
        FieldKind::Integer => value.as_i64().is_some(),
    };

    if !matches {
        return Some(format!(
            "instance.{} is not of a type(s) {}",
            rule.name,
            rule.kind.type_name()
        ));
    }

    match value.as_str() {
        Some("") => Some(format!(
            "instance.{} does not meet minimum length of 1",
            rule.name
        )),
        _ => None,
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_book() -> Value {
        json!({
            "isbn": "0691161518",
            "amazon_url": "http://a.co/eobPtX2",
            "author": "Matthew Lane",
            "language": "english",
            "pages": 264,
            "publisher": "Princeton University Press",
            "title": "Power-Up: Unlocking the Hidden Mathematics in Video Games",
            "year": 2017
        })
    }

    #[test]
    fn accepts_complete_book() {
        assert!(validate_book(&valid_book()).is_ok());
    }

    #[test]
    fn ignores_unknown_fields() {
        let mut book = valid_book();
        book["edition"] = json!("second");
        assert!(validate_book(&book).is_ok());
    }

    #[test]
    fn reports_each_missing_field() {
        let violations = validate_book(&json!({ "isbn": "1" })).unwrap_err();
        assert_eq!(violations.len(), 7);
        assert!(violations.contains(&"instance requires property \"title\"".to_string()));
    }

    #[test]
    fn null_counts_as_missing() {
        let mut book = valid_book();
        book["publisher"] = Value::Null;
        assert_eq!(
            validate_book(&book).unwrap_err(),
            vec!["instance requires property \"publisher\"".to_string()]
        );
    }

    #[test]
    fn numeric_string_is_not_an_integer() {
        let mut book = valid_book();
        book["pages"] = json!("12345");
        assert_eq!(
            validate_book(&book).unwrap_err(),
            vec!["instance.pages is not of a type(s) integer".to_string()]
        );
    }

    #[test]
    fn fractional_year_is_rejected() {
        let mut book = valid_book();
        book["year"] = json!(2017.5);
        assert!(validate_book(&book).is_err());
    }

    #[test]
    fn array_author_is_rejected() {
        let mut book = valid_book();
        book["author"] = json!(["Matthew Lane"]);
        assert_eq!(
            validate_book(&book).unwrap_err(),
            vec!["instance.author is not of a type(s) string".to_string()]
        );
    }

    #[test]
    fn empty_string_is_rejected() {
        let mut book = valid_book();
        book["isbn"] = json!("");
        assert_eq!(
            validate_book(&book).unwrap_err(),
            vec!["instance.isbn does not meet minimum length of 1".to_string()]
        );
    }

    #[test]
    fn non_object_payload_is_one_violation() {
        let violations = validate_book(&json!([1, 2])).unwrap_err();
        assert_eq!(
            violations,
            vec!["instance is not of a type(s) object, got array".to_string()]
        );
    }
}
