use std::fmt;

use serde::Serialize;
use serde_json::Value;

use super::domain::{ApplicationForm, RawApplication};

/// A single rejected input field, keyed by its wire name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub reason: String,
}

impl FieldError {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Client input rejected before anything was stored.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid application: {}", summarize(.fields))]
pub struct ValidationError {
    pub fields: Vec<FieldError>,
}

impl ValidationError {
    pub fn single(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            fields: vec![FieldError::new(field, reason)],
        }
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields.iter().any(|error| error.field == field)
    }
}

fn summarize(fields: &[FieldError]) -> String {
    let mut rendered = String::new();
    for (index, error) in fields.iter().enumerate() {
        if index > 0 {
            rendered.push_str("; ");
        }
        rendered.push_str(&error.to_string());
    }
    rendered
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.reason)
    }
}

/// Check every field of a raw submission and return the normalized form.
pub fn validate(raw: RawApplication) -> Result<ApplicationForm, ValidationError> {
    let mut errors = Vec::new();

    let name = required_text("name", raw.name, &mut errors);
    let age = positive_age(raw.age.as_ref(), &mut errors);
    let works_elsewhere = work_selection(raw.works_elsewhere.as_ref(), &mut errors);
    let external_chat_id = required_text("externalChatId", raw.external_chat_id, &mut errors);
    let referred_by = required_text("referredBy", raw.referred_by, &mut errors);

    match (name, age, works_elsewhere, external_chat_id, referred_by) {
        (Some(name), Some(age), Some(works_elsewhere), Some(external_chat_id), Some(referred_by)) => {
            Ok(ApplicationForm {
                name,
                age,
                works_elsewhere,
                external_chat_id,
                referred_by,
            })
        }
        _ => Err(ValidationError { fields: errors }),
    }
}

fn required_text(
    field: &'static str,
    value: Option<String>,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    match value.as_deref().map(str::trim) {
        None => {
            errors.push(FieldError::new(field, "is required"));
            None
        }
        Some("") => {
            errors.push(FieldError::new(field, "must not be blank"));
            None
        }
        Some(trimmed) => Some(trimmed.to_string()),
    }
}

fn positive_age(value: Option<&Value>, errors: &mut Vec<FieldError>) -> Option<u32> {
    let parsed = match value {
        None | Some(Value::Null) => {
            errors.push(FieldError::new("age", "is required"));
            return None;
        }
        Some(Value::Number(number)) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|value| value.fract() == 0.0)
                .map(|value| value as i64)
        }),
        Some(Value::String(text)) => text.trim().parse::<i64>().ok(),
        Some(_) => None,
    };

    match parsed.map(u32::try_from) {
        Some(Ok(age)) if age > 0 => Some(age),
        _ => {
            errors.push(FieldError::new("age", "must be a positive whole number"));
            None
        }
    }
}

fn work_selection(value: Option<&Value>, errors: &mut Vec<FieldError>) -> Option<bool> {
    let selection = match value {
        None | Some(Value::Null) => {
            errors.push(FieldError::new("worksElsewhere", "is required"));
            return None;
        }
        Some(Value::Bool(flag)) => Some(*flag),
        Some(Value::String(choice)) => match choice.trim().to_lowercase().as_str() {
            "true" | "yes" | "sim" => Some(true),
            "false" | "no" | "nao" | "não" => Some(false),
            _ => None,
        },
        Some(_) => None,
    };

    if selection.is_none() {
        errors.push(FieldError::new("worksElsewhere", "must be a yes/no selection"));
    }
    selection
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawApplication {
        serde_json::from_value(value).expect("raw application deserializes")
    }

    #[test]
    fn summary_lists_every_rejected_field() {
        let error = ValidationError {
            fields: vec![
                FieldError::new("name", "must not be blank"),
                FieldError::new("age", "is required"),
            ],
        };
        assert_eq!(
            error.to_string(),
            "invalid application: name must not be blank; age is required"
        );
    }

    #[test]
    fn age_accepts_numeric_text_from_the_form() {
        let form = validate(raw(json!({
            "name": "TestUser",
            "age": " 21 ",
            "worksElsewhere": "nao",
            "externalChatId": "123456789",
            "referredBy": "Recruiter",
        })))
        .expect("valid form");
        assert_eq!(form.age, 21);
        assert!(!form.works_elsewhere);
    }

    #[test]
    fn age_accepts_whole_floats() {
        let form = validate(raw(json!({
            "name": "TestUser",
            "age": 18.0,
            "worksElsewhere": true,
            "externalChatId": "123456789",
            "referredBy": "Recruiter",
        })))
        .expect("valid form");
        assert_eq!(form.age, 18);
    }

    #[test]
    fn age_rejects_fractions_and_overflow() {
        for age in [
            json!(18.5),
            json!(4_294_967_296_u64),
            json!(1e20),
            json!(-3.0),
            json!("18.5"),
            json!(true),
        ] {
            let error = validate(raw(json!({
                "name": "TestUser",
                "age": age,
                "worksElsewhere": true,
                "externalChatId": "123456789",
                "referredBy": "Recruiter",
            })))
            .expect_err("age rejected");
            assert_eq!(error.fields.len(), 1);
            assert!(error.has_field("age"));
        }
    }
}
