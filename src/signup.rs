//! Field rules for the signup form.
//!
//! The form itself lives elsewhere; it hands a candidate record (typed, or as
//! loose JSON) to [`validate`] / [`validate_value`] and renders the returned
//! [`FieldError`]s inline next to each field.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::ValidateEmail;

const NAME_MIN: usize = 2;
const NAME_MAX: usize = 10;
const PASSWORD_MIN: usize = 4;

// Literal bounds of the contact number rule: only the value 10 itself passes.
const CONTACT_NUMBER_MAX: f64 = 10.0;
const CONTACT_NUMBER_MIN: f64 = 10.0;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SignupFields {
    pub name: String,
    pub contact_number: f64,
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

pub fn validate(candidate: SignupFields) -> Result<SignupFields, Vec<FieldError>> {
    let errors: Vec<FieldError> = [
        ("name", check_name(&candidate.name)),
        ("contactNumber", check_contact_number(candidate.contact_number)),
        ("email", check_email(&candidate.email)),
        ("password", check_password(&candidate.password)),
    ]
    .into_iter()
    .flat_map(|(field, messages)| messages.into_iter().map(move |m| FieldError::new(field, m)))
    .collect();

    if errors.is_empty() {
        Ok(candidate)
    } else {
        Err(errors)
    }
}

/// Validates an untyped record, e.g. a form library's raw JSON payload.
/// Missing and mistyped fields are reported alongside rule failures.
pub fn validate_value(candidate: &Value) -> Result<SignupFields, Vec<FieldError>> {
    let mut errors = Vec::new();

    let name = string_field(candidate, "name", &mut errors);
    let contact_number = number_field(candidate, "contactNumber", &mut errors);
    let email = string_field(candidate, "email", &mut errors);
    let password = string_field(candidate, "password", &mut errors);

    let (Some(name), Some(contact_number), Some(email), Some(password)) =
        (name, contact_number, email, password)
    else {
        // Rule failures of the well-typed fields are already in `errors`.
        return Err(errors);
    };

    validate(SignupFields {
        name,
        contact_number,
        email,
        password,
    })
}

pub fn check_name(name: &str) -> Vec<&'static str> {
    let len = name.chars().count();
    let mut messages = Vec::new();

    if len < NAME_MIN {
        messages.push("name must be atleast 2 character");
    }
    if len > NAME_MAX {
        messages.push("name not more than 10 character");
    }
    if len == 0 || !name.chars().all(is_name_char) {
        messages.push("name must not contain special character");
    }
    messages
}

pub fn check_contact_number(contact_number: f64) -> Vec<&'static str> {
    let mut messages = Vec::new();

    // NaN and infinities compare false against both bounds.
    if !contact_number.is_finite() {
        messages.push("Expected number, received nan");
        return messages;
    }
    if contact_number > CONTACT_NUMBER_MAX {
        messages.push("Number must be less than or equal to 10");
    }
    if contact_number < CONTACT_NUMBER_MIN {
        messages.push("Number must be greater than or equal to 10");
    }
    messages
}

pub fn check_email(email: &str) -> Vec<&'static str> {
    if email.validate_email() {
        Vec::new()
    } else {
        vec!["invalid email address"]
    }
}

pub fn check_password(password: &str) -> Vec<&'static str> {
    if password.chars().count() < PASSWORD_MIN {
        vec!["password must be atleast 4 character"]
    } else {
        Vec::new()
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c.is_whitespace() || c == '\'' || c == '-'
}

fn string_field(
    candidate: &Value,
    field: &'static str,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    match candidate.get(field) {
        Some(Value::String(s)) => {
            let messages = match field {
                "name" => check_name(s),
                "email" => check_email(s),
                _ => check_password(s),
            };
            if messages.is_empty() {
                return Some(s.clone());
            }
            errors.extend(messages.into_iter().map(|m| FieldError::new(field, m)));
            None
        }
        other => {
            errors.push(type_error(field, "string", other));
            None
        }
    }
}

fn number_field(
    candidate: &Value,
    field: &'static str,
    errors: &mut Vec<FieldError>,
) -> Option<f64> {
    match candidate.get(field).map(|v| (v, v.as_f64())) {
        Some((_, Some(n))) => {
            let messages = check_contact_number(n);
            if messages.is_empty() {
                return Some(n);
            }
            errors.extend(messages.into_iter().map(|m| FieldError::new(field, m)));
            None
        }
        other => {
            errors.push(type_error(field, "number", other.map(|(v, _)| v)));
            None
        }
    }
}

fn type_error(field: &'static str, expected: &str, found: Option<&Value>) -> FieldError {
    match found {
        None => FieldError::new(field, "Required"),
        Some(value) => FieldError::new(
            field,
            format!("Expected {expected}, received {}", json_type(value)),
        ),
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
    use serde_json::json;

    use super::*;

    fn fields() -> SignupFields {
        SignupFields {
            name: "Asha".into(),
            contact_number: 10.0,
            email: "asha@farm.in".into(),
            password: "seeds".into(),
        }
    }

    fn failed_fields(result: Result<SignupFields, Vec<FieldError>>) -> Vec<&'static str> {
        result.unwrap_err().into_iter().map(|e| e.field).collect()
    }

    #[test]
    fn name_rules() {
        assert!(check_name("Jo").is_empty());
        assert!(check_name("Mary-Jane").is_empty());
        assert!(check_name("O'Neil Ray").is_empty());
        assert_eq!(check_name("J"), vec!["name must be atleast 2 character"]);
        assert_eq!(
            check_name("Jonathan12"),
            vec!["name must not contain special character"]
        );
        assert_eq!(
            check_name("Christopher"),
            vec!["name not more than 10 character"]
        );
    }

    #[test]
    fn name_reports_every_broken_rule() {
        assert_eq!(
            check_name("Maximilian99"),
            vec![
                "name not more than 10 character",
                "name must not contain special character"
            ]
        );
        assert_eq!(check_name("").len(), 2);
    }

    #[test]
    fn email_rules() {
        assert!(check_email("a@b.com").is_empty());
        assert_eq!(check_email("not-an-email"), vec!["invalid email address"]);
    }

    #[test]
    fn password_rules() {
        assert!(check_password("abcd").is_empty());
        assert_eq!(
            check_password("abc"),
            vec!["password must be atleast 4 character"]
        );
    }

    #[test]
    fn contact_number_bounds_are_literal() {
        assert!(check_contact_number(10.0).is_empty());
        assert_eq!(
            check_contact_number(9_876_543_210.0),
            vec!["Number must be less than or equal to 10"]
        );
        assert_eq!(
            check_contact_number(9.0),
            vec!["Number must be greater than or equal to 10"]
        );
        assert_eq!(
            check_contact_number(f64::NAN),
            vec!["Expected number, received nan"]
        );
        assert_eq!(check_contact_number(f64::INFINITY).len(), 1);
    }

    #[test]
    fn nan_contact_number_is_rejected() {
        let candidate = SignupFields {
            contact_number: f64::NAN,
            ..fields()
        };
        assert_eq!(failed_fields(validate(candidate)), vec!["contactNumber"]);
    }

    #[test]
    fn valid_record_is_returned_unchanged() {
        assert_eq!(validate(fields()), Ok(fields()));
    }

    #[test]
    fn errors_are_scoped_per_field() {
        let candidate = SignupFields {
            name: "J".into(),
            email: "nope".into(),
            ..fields()
        };
        assert_eq!(failed_fields(validate(candidate)), vec!["name", "email"]);
    }

    #[test]
    fn loose_json_record() {
        let candidate = json!({
            "name": "Mary-Jane",
            "contactNumber": 10,
            "email": "a@b.com",
            "password": "abcd"
        });
        let fields = validate_value(&candidate).unwrap();
        assert_eq!(fields.name, "Mary-Jane");
        assert_eq!(fields.contact_number, 10.0);
    }

    #[test]
    fn loose_json_type_errors() {
        let candidate = json!({
            "name": "Jo",
            "contactNumber": "9876543210",
            "password": "abc"
        });
        let errors = validate_value(&candidate).unwrap_err();
        assert_eq!(
            errors,
            vec![
                FieldError::new("contactNumber", "Expected number, received string"),
                FieldError::new("email", "Required"),
                FieldError::new("password", "password must be atleast 4 character"),
            ]
        );
    }

    #[test]
    fn camel_case_wire_names() {
        let wire = serde_json::to_value(fields()).unwrap();
        assert_eq!(wire["contactNumber"], json!(10.0));
    }
}
