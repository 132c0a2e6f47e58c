//! Mapping of API error payloads onto form fields.
//!
//! The CRUD collaborator reports failures in one of two shapes:
//! field-level validation details, `{"data":{"details":{"name":["..."]}}}`,
//! or a single message, `{"message":"..."}`. Anything else collapses to a
//! fixed root message.

use std::collections::HashMap;

use serde_json::Value;

const FALLBACK_MESSAGE: &str = "Something went wrong. Please try again.";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormErrors {
    /// Field name → message, for inline display next to the input.
    pub field_errors: HashMap<String, String>,
    /// Shown at the top of the form when no field detail is available.
    pub root: Option<String>,
}

impl FormErrors {
    pub fn from_body(body: &str) -> Self {
        match serde_json::from_str::<Value>(body) {
            Ok(value) => Self::from_value(&value),
            Err(_) => Self::fallback(),
        }
    }

    pub fn from_value(value: &Value) -> Self {
        if let Some(details) = value.pointer("/data/details").and_then(Value::as_object) {
            let mut field_errors = HashMap::new();
            for (field, messages) in details {
                let message = match messages {
                    Value::Array(list) => list
                        .iter()
                        .filter_map(Value::as_str)
                        .collect::<Vec<_>>()
                        .join(", "),
                    Value::String(message) => message.clone(),
                    other => other.to_string(),
                };
                if !message.is_empty() {
                    field_errors.insert(field.clone(), message);
                }
            }
            if !field_errors.is_empty() {
                return FormErrors {
                    field_errors,
                    root: None,
                };
            }
        }

        if let Some(message) = value.get("message").and_then(Value::as_str) {
            return FormErrors {
                field_errors: HashMap::new(),
                root: Some(message.to_string()),
            };
        }

        Self::fallback()
    }

    fn fallback() -> Self {
        FormErrors {
            field_errors: HashMap::new(),
            root: Some(FALLBACK_MESSAGE.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.field_errors.is_empty() && self.root.is_none()
    }
}
