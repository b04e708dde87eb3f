use serde::{Deserialize, Serialize};
use serde_json::Value;

use kitab_kernel::payload::{integer, text};
use kitab_kernel::CallableError;

pub const MISSING_FIELDS: &str = "Missing title, author, or year";

/// Wire payload for `addBook`. Fields are kept as raw JSON so that an absent
/// or wrongly typed field is reported as an invalid argument by validation
/// rather than as a decoding failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddBookPayload {
    pub title: Option<Value>,
    pub author: Option<Value>,
    pub year: Option<Value>,
}

/// A validated book submission: every field present and non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookSubmission {
    pub title: String,
    pub author: String,
    pub year: i64,
}

impl TryFrom<AddBookPayload> for BookSubmission {
    type Error = CallableError;

    fn try_from(payload: AddBookPayload) -> Result<Self, Self::Error> {
        let title = text(payload.title);
        let author = text(payload.author);
        let year = integer(payload.year);

        match (title, author, year) {
            (Some(title), Some(author), Some(year)) => Ok(Self {
                title,
                author,
                year,
            }),
            _ => Err(CallableError::invalid_argument(MISSING_FIELDS)),
        }
    }
}

/// Result of a successful `addBook` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddBookResult {
    pub message: String,
    pub id: String,
}

impl AddBookResult {
    pub fn new(title: &str, id: String) -> Self {
        Self {
            message: format!("Book '{}' added successfully", title),
            id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(title: Option<&str>, author: Option<&str>, year: Option<i64>) -> AddBookPayload {
        AddBookPayload {
            title: title.map(Value::from),
            author: author.map(Value::from),
            year: year.map(Value::from),
        }
    }

    #[test]
    fn complete_payload_validates() {
        let submission =
            BookSubmission::try_from(payload(Some("Dune"), Some("Herbert"), Some(1965))).unwrap();
        assert_eq!(
            submission,
            BookSubmission {
                title: "Dune".into(),
                author: "Herbert".into(),
                year: 1965,
            }
        );
    }

    #[test]
    fn absent_empty_or_zero_fields_are_rejected() {
        let cases = [
            payload(None, Some("Herbert"), Some(1965)),
            payload(Some("Dune"), None, Some(1965)),
            payload(Some("Dune"), Some("Herbert"), None),
            payload(Some(""), Some("Herbert"), Some(1965)),
            payload(Some("Dune"), Some(""), Some(1965)),
            payload(Some("Dune"), Some("Herbert"), Some(0)),
            AddBookPayload::default(),
        ];

        for case in cases {
            let err = BookSubmission::try_from(case).unwrap_err();
            assert_eq!(err, CallableError::invalid_argument(MISSING_FIELDS));
        }
    }

    #[test]
    fn wrongly_typed_fields_are_reported_as_missing() {
        let cases = [
            json!({"title": "Dune", "author": "Herbert", "year": "1965"}),
            json!({"title": "Dune", "author": "Herbert", "year": 1965.5}),
            json!({"title": 42, "author": "Herbert", "year": 1965}),
            json!({"title": "Dune", "author": ["Herbert"], "year": 1965}),
            json!({"title": null, "author": "Herbert", "year": 1965}),
        ];

        for case in cases {
            let payload: AddBookPayload = serde_json::from_value(case).unwrap();
            let err = BookSubmission::try_from(payload).unwrap_err();
            assert_eq!(err, CallableError::invalid_argument(MISSING_FIELDS));
        }
    }

    #[test]
    fn whole_valued_float_year_is_accepted() {
        let payload: AddBookPayload =
            serde_json::from_value(json!({"title": "Dune", "author": "Herbert", "year": 1965.0}))
                .unwrap();

        assert_eq!(BookSubmission::try_from(payload).unwrap().year, 1965);
    }

    #[test]
    fn result_message_quotes_title() {
        let result = AddBookResult::new("Dune", "abc".into());
        assert_eq!(result.message, "Book 'Dune' added successfully");
    }
}
