use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{ContentKind, FeedbackId, ItemId};

/// Longest comment accepted with a rating, in characters.
pub const COMMENT_MAX_CHARS: usize = 500;

//
// ─── RATING ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RatingError {
    #[error("rating {0} is outside 1-5")]
    OutOfRange(i64),
}

/// Star rating, always within 1–5.
///
/// Persisted values are clamped on read, so a hand-edited store cannot
/// smuggle a 0 or a 9 into averages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// # Errors
    ///
    /// Returns `RatingError::OutOfRange` unless `value` is in 1–5.
    pub fn new(value: i64) -> Result<Self, RatingError> {
        u8::try_from(value)
            .ok()
            .filter(|v| (Self::MIN..=Self::MAX).contains(v))
            .map(Self)
            .ok_or(RatingError::OutOfRange(value))
    }

    #[must_use]
    pub fn clamped(value: i64) -> Self {
        let v = value.clamp(i64::from(Self::MIN), i64::from(Self::MAX));
        Self(u8::try_from(v).unwrap_or(Self::MAX))
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }
}

impl From<i64> for Rating {
    fn from(value: i64) -> Self {
        Self::clamped(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

//
// ─── COMMENT ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CommentError {
    #[error("comment is {len} characters, limit is {}", COMMENT_MAX_CHARS)]
    TooLong { len: usize },
}

/// Optional free-text remark attached to a rating.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Comment(String);

impl Comment {
    /// # Errors
    ///
    /// Returns `CommentError::TooLong` when the text exceeds `COMMENT_MAX_CHARS`.
    pub fn new(text: impl Into<String>) -> Result<Self, CommentError> {
        let text = text.into();
        let len = text.chars().count();
        if len > COMMENT_MAX_CHARS {
            return Err(CommentError::TooLong { len });
        }
        Ok(Self(text))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for Comment {
    fn from(text: String) -> Self {
        if text.chars().count() <= COMMENT_MAX_CHARS {
            Self(text)
        } else {
            Self(text.chars().take(COMMENT_MAX_CHARS).collect())
        }
    }
}

impl From<Comment> for String {
    fn from(comment: Comment) -> Self {
        comment.0
    }
}

//
// ─── FEEDBACK ──────────────────────────────────────────────────────────────────
//

/// A submitted rating for one content item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub id: FeedbackId,
    pub item_id: ItemId,
    #[serde(rename = "type")]
    pub kind: ContentKind,
    pub title: String,
    pub rating: Rating,
    #[serde(default)]
    pub comment: Comment,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl Feedback {
    #[must_use]
    pub fn new(
        item_id: ItemId,
        kind: ContentKind,
        title: impl Into<String>,
        rating: Rating,
        comment: Comment,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: FeedbackId::new(kind, item_id, timestamp.timestamp_millis()),
            item_id,
            kind,
            title: title.into(),
            rating,
            comment,
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn rating_rejects_out_of_range() {
        assert_eq!(Rating::new(0), Err(RatingError::OutOfRange(0)));
        assert_eq!(Rating::new(6), Err(RatingError::OutOfRange(6)));
        assert_eq!(Rating::new(5).unwrap().value(), 5);
    }

    #[test]
    fn persisted_rating_is_clamped() {
        let low: Rating = serde_json::from_str("-3").unwrap();
        let high: Rating = serde_json::from_str("42").unwrap();
        assert_eq!(low.value(), 1);
        assert_eq!(high.value(), 5);
    }

    #[test]
    fn comment_limit_counts_chars_not_bytes() {
        let exact = "é".repeat(COMMENT_MAX_CHARS);
        assert!(Comment::new(exact).is_ok());
        let over = "a".repeat(COMMENT_MAX_CHARS + 1);
        assert_eq!(
            Comment::new(over),
            Err(CommentError::TooLong {
                len: COMMENT_MAX_CHARS + 1
            })
        );
    }

    #[test]
    fn overlong_persisted_comment_is_truncated() {
        let raw = serde_json::to_string(&"x".repeat(600)).unwrap();
        let comment: Comment = serde_json::from_str(&raw).unwrap();
        assert_eq!(comment.as_str().len(), COMMENT_MAX_CHARS);
    }

    #[test]
    fn feedback_uses_camel_case_and_synthetic_id() {
        let feedback = Feedback::new(
            ItemId::new(14),
            ContentKind::Article,
            "Article 14",
            Rating::new(4).unwrap(),
            Comment::default(),
            fixed_now(),
        );
        let json = serde_json::to_value(&feedback).unwrap();
        assert_eq!(json["id"], "article-14-1700000000000");
        assert_eq!(json["itemId"], 14);
        assert_eq!(json["type"], "article");
        assert_eq!(json["rating"], 4);
    }
}
