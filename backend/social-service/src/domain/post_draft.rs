//! Two-stage post input pipeline
//!
//! `PostDraft::sanitize` coerces an untyped payload into a strictly typed
//! candidate (non-string fields become empty, markup is stripped, ids are parsed).
//! `PostDraft::validate` is a pure check over that candidate and either yields a
//! [`NewPost`] or the complete, ordered list of problems.

use crate::domain::models::NewPost;
use crate::services::markup::strip_markup;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

pub const MISSING_TITLE: &str = "You must provide a title.";
pub const MISSING_BODY: &str = "You must provide content.";
pub const INVALID_AUTHOR: &str = "Invalid user ID.";
pub const TRY_AGAIN_LATER: &str = "Please try again later.";

/// Post payload exactly as received from a caller
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPostInput {
    #[serde(default)]
    pub title: Value,
    #[serde(default)]
    pub body: Value,
}

impl RawPostInput {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: Value::String(title.into()),
            body: Value::String(body.into()),
        }
    }
}

/// Typed candidate produced by the sanitize stage
#[derive(Debug, Clone, PartialEq)]
pub struct PostDraft {
    pub title: String,
    pub body: String,
    pub created_date: DateTime<Utc>,
    pub author_id: Option<Uuid>,
}

/// Parse a caller-supplied id (post or identity reference); malformed input yields `None`
pub fn parse_ref(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw.trim()).ok()
}

fn coerce_text(value: &Value) -> String {
    match value {
        Value::String(text) => strip_markup(text).trim().to_string(),
        _ => String::new(),
    }
}

impl PostDraft {
    pub fn sanitize(raw: &RawPostInput, author_id: Option<Uuid>) -> Self {
        Self {
            title: coerce_text(&raw.title),
            body: coerce_text(&raw.body),
            created_date: Utc::now(),
            author_id,
        }
    }

    pub fn validate(self) -> Result<NewPost, Vec<String>> {
        let mut errors = Vec::new();
        if self.title.is_empty() {
            errors.push(MISSING_TITLE.to_string());
        }
        if self.body.is_empty() {
            errors.push(MISSING_BODY.to_string());
        }
        if self.author_id.is_none() {
            errors.push(INVALID_AUTHOR.to_string());
        }

        match (errors.is_empty(), self.author_id) {
            (true, Some(author_id)) => Ok(NewPost {
                title: self.title,
                body: self.body,
                created_date: self.created_date,
                author_id,
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sanitize_strips_and_trims() {
        let raw = RawPostInput::new("  Hi  ", "<script>x</script>world ");
        let draft = PostDraft::sanitize(&raw, Some(Uuid::new_v4()));
        assert_eq!(draft.title, "Hi");
        assert_eq!(draft.body, "world");
    }

    #[test]
    fn test_sanitize_coerces_non_strings() {
        let raw: RawPostInput =
            serde_json::from_value(json!({ "title": 42, "body": ["a"], "extra": true })).unwrap();
        let draft = PostDraft::sanitize(&raw, None);
        assert_eq!(draft.title, "");
        assert_eq!(draft.body, "");

        let missing: RawPostInput = serde_json::from_value(json!({})).unwrap();
        assert_eq!(PostDraft::sanitize(&missing, None).title, "");
    }

    #[test]
    fn test_validate_collects_every_error_in_order() {
        let draft = PostDraft::sanitize(&RawPostInput::new("   ", "<b></b>"), None);
        assert_eq!(
            draft.validate().unwrap_err(),
            vec![MISSING_TITLE, MISSING_BODY, INVALID_AUTHOR]
        );
    }

    #[test]
    fn test_validate_success() {
        let author = Uuid::new_v4();
        let post = PostDraft::sanitize(&RawPostInput::new("Hi", "there"), Some(author))
            .validate()
            .unwrap();
        assert_eq!(post.author_id, author);
        assert_eq!(post.title, "Hi");
    }

    #[test]
    fn test_parse_ref() {
        let id = Uuid::new_v4();
        assert_eq!(parse_ref(&id.to_string()), Some(id));
        assert_eq!(parse_ref("507f1f77bcf86cd799439011"), None);
        assert_eq!(parse_ref(""), None);
    }
}
