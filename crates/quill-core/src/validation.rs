//! Request field validation
//!
//! Pure checks shared by the blog and user services. Each check either
//! returns the normalized value or a [`QuillError`] describing the problem.

use serde_json::Value;

use crate::models::BlogState;
use crate::query::SortField;
use crate::{QuillError, Result};

/// Characters of body text read per minute
pub const CHARACTERS_PER_MINUTE: usize = 215;

/// Estimated minutes needed to read `body`, rounded up
pub fn reading_time(body: &str) -> u32 {
    let chars = body.chars().count();
    chars.div_ceil(CHARACTERS_PER_MINUTE) as u32
}

/// Fail with every missing field name, in the order given
///
/// A field is missing when it is absent or an empty string.
pub fn require_fields(fields: &[(Option<&str>, &str)]) -> Result<()> {
    let missing: Vec<String> = fields
        .iter()
        .filter(|(value, _)| value.map_or(true, str::is_empty))
        .map(|(_, name)| (*name).to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(QuillError::MissingFields(missing))
    }
}

/// Validate an optional `tags` payload
///
/// `null`, `false`, `0` and `""` count as "not provided" and yield `None`.
/// Anything else must be an array of strings.
pub fn validate_tags(tags: Option<&Value>) -> Result<Option<Vec<String>>> {
    let Some(value) = tags else {
        return Ok(None);
    };

    if is_falsy(value) {
        return Ok(None);
    }

    let items = value
        .as_array()
        .ok_or_else(|| QuillError::invalid_input("Tags should be an array of strings"))?;

    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| QuillError::invalid_input("Tags must be an array of strings."))
        })
        .collect::<Result<Vec<_>>>()
        .map(Some)
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Validate an optional state value, returning its canonical form
///
/// `message` is the client-facing text used when the value is not
/// draft/published.
pub fn validate_state_value(state: Option<&str>, message: &str) -> Result<Option<BlogState>> {
    match state {
        None | Some("") => Ok(None),
        Some(value) => BlogState::parse(value)
            .map(Some)
            .ok_or_else(|| QuillError::invalid_input(message)),
    }
}

/// Validate an optional `orderBy` value against the sortable fields
pub fn validate_order_by(field: Option<&str>) -> Result<Option<SortField>> {
    match field {
        None | Some("") => Ok(None),
        Some(value) => SortField::parse(value)
            .map(Some)
            .ok_or_else(|| QuillError::invalid_input("orderBy field is invalid")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_reading_time_rounds_up() {
        assert_eq!(reading_time("a"), 1);
        assert_eq!(reading_time(&"a".repeat(215)), 1);
        assert_eq!(reading_time(&"a".repeat(216)), 2);
        assert_eq!(reading_time(""), 0);
    }

    #[test]
    fn test_reading_time_counts_characters_not_bytes() {
        // 215 two-byte characters still fit in one minute
        assert_eq!(reading_time(&"é".repeat(215)), 1);
    }

    #[test]
    fn test_require_fields_reports_all_missing_in_order() {
        let err = require_fields(&[
            (None, "title"),
            (Some("body text"), "body"),
            (Some(""), "description"),
        ])
        .unwrap_err();

        assert_eq!(
            err,
            QuillError::MissingFields(vec!["title".to_string(), "description".to_string()])
        );
        assert_eq!(err.to_string(), "Required fields, title, description");
    }

    #[test]
    fn test_require_fields_passes_when_present() {
        assert!(require_fields(&[(Some("a"), "email"), (Some("b"), "password")]).is_ok());
    }

    #[test]
    fn test_validate_tags() {
        assert_eq!(validate_tags(None).unwrap(), None);
        assert_eq!(validate_tags(Some(&json!(null))).unwrap(), None);
        assert_eq!(validate_tags(Some(&json!(""))).unwrap(), None);
        assert_eq!(
            validate_tags(Some(&json!(["rust", "web"]))).unwrap(),
            Some(vec!["rust".to_string(), "web".to_string()])
        );
        assert_eq!(validate_tags(Some(&json!([]))).unwrap(), Some(vec![]));

        let not_array = validate_tags(Some(&json!("rust"))).unwrap_err();
        assert_eq!(not_array.to_string(), "Tags should be an array of strings");

        let mixed = validate_tags(Some(&json!(["rust", 3]))).unwrap_err();
        assert_eq!(mixed.to_string(), "Tags must be an array of strings.");
    }

    #[test]
    fn test_validate_state_value() {
        assert_eq!(validate_state_value(None, "bad").unwrap(), None);
        assert_eq!(validate_state_value(Some(""), "bad").unwrap(), None);
        assert_eq!(
            validate_state_value(Some("published"), "bad").unwrap(),
            Some(BlogState::Published)
        );
        assert_eq!(
            validate_state_value(Some("Draft"), "bad").unwrap(),
            Some(BlogState::Draft)
        );
        assert_eq!(
            validate_state_value(Some("archived"), "Invalid state provided").unwrap_err(),
            QuillError::InvalidInput("Invalid state provided".to_string())
        );
    }

    #[test]
    fn test_validate_order_by() {
        assert_eq!(validate_order_by(None).unwrap(), None);
        assert_eq!(
            validate_order_by(Some("READ_COUNT")).unwrap(),
            Some(SortField::ReadCount)
        );
        assert_eq!(
            validate_order_by(Some("createdAt")).unwrap(),
            Some(SortField::CreatedAt)
        );
        let err = validate_order_by(Some("title")).unwrap_err();
        assert_eq!(err.to_string(), "orderBy field is invalid");
    }

    proptest! {
        #[test]
        fn prop_reading_time_is_ceiling(body in "\\PC{0,1000}") {
            let chars = body.chars().count();
            let minutes = reading_time(&body) as usize;
            prop_assert!(minutes * CHARACTERS_PER_MINUTE >= chars);
            prop_assert!(minutes == 0 || (minutes - 1) * CHARACTERS_PER_MINUTE < chars);
        }

        #[test]
        fn prop_require_fields_lists_exactly_the_empty_ones(
            values in proptest::collection::vec(proptest::option::of("[a-z]{0,3}"), 1..6)
        ) {
            let names: Vec<String> = (0..values.len()).map(|i| format!("f{i}")).collect();
            let fields: Vec<(Option<&str>, &str)> = values
                .iter()
                .zip(&names)
                .map(|(v, n)| (v.as_deref(), n.as_str()))
                .collect();
            let expected: Vec<String> = values
                .iter()
                .zip(&names)
                .filter(|(v, _)| v.as_deref().map_or(true, str::is_empty))
                .map(|(_, n)| n.clone())
                .collect();

            match require_fields(&fields) {
                Ok(()) => prop_assert!(expected.is_empty()),
                Err(QuillError::MissingFields(missing)) => prop_assert_eq!(missing, expected),
                Err(other) => prop_assert!(false, "unexpected error {other:?}"),
            }
        }
    }
}
