use chrono::{DateTime, Utc};

use portal_core::model::{Comment, ContentKind, Feedback, ItemId, Rating};

use crate::email::Notifier;
use crate::error::FeedbackError;
use crate::session_store::SessionStore;

/// Unvalidated rating form. A `rating` of 0 means no star was picked.
#[derive(Debug, Clone)]
pub struct FeedbackDraft {
    pub item_id: ItemId,
    pub kind: ContentKind,
    pub title: String,
    pub rating: u8,
    pub comment: String,
}

impl FeedbackDraft {
    #[must_use]
    pub fn new(item_id: ItemId, kind: ContentKind, title: impl Into<String>, rating: u8) -> Self {
        Self {
            item_id,
            kind,
            title: title.into(),
            rating,
            comment: String::new(),
        }
    }

    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// # Errors
    ///
    /// Returns `FeedbackError::MissingRating` for a zero rating,
    /// `FeedbackError::Rating` above 5, and `FeedbackError::Comment` for an
    /// overlong comment.
    pub fn validate(self, now: DateTime<Utc>) -> Result<Feedback, FeedbackError> {
        if self.rating == 0 {
            return Err(FeedbackError::MissingRating);
        }
        let rating = Rating::new(i64::from(self.rating))?;
        let comment = Comment::new(self.comment)?;
        Ok(Feedback::new(
            self.item_id,
            self.kind,
            self.title,
            rating,
            comment,
            now,
        ))
    }
}

/// Rating submission flow: sign-in gate, validation, store, admin email.
#[derive(Clone)]
pub struct FeedbackService {
    notifier: Notifier,
}

impl FeedbackService {
    #[must_use]
    pub fn new(notifier: Notifier) -> Self {
        Self { notifier }
    }

    /// # Errors
    ///
    /// Returns `FeedbackError::SignInRequired` when signed out, a validation
    /// error for a bad draft, or `FeedbackError::Store` if persisting fails.
    pub async fn submit(
        &self,
        store: &mut SessionStore,
        draft: FeedbackDraft,
    ) -> Result<Feedback, FeedbackError> {
        let Some(user) = store.user().cloned() else {
            return Err(FeedbackError::SignInRequired);
        };
        let feedback = draft.validate(store.clock().now())?;
        store.add_feedback(feedback.clone()).await?;

        let text = if feedback.comment.is_empty() {
            format!("{}/5 for \"{}\"", feedback.rating.value(), feedback.title)
        } else {
            format!(
                "{}/5 for \"{}\": {}",
                feedback.rating.value(),
                feedback.title,
                feedback.comment.as_str()
            )
        };
        if !self.notifier.send_feedback(&user, &text, feedback.kind).await {
            tracing::debug!(id = %feedback.id, "feedback email not delivered");
        }
        Ok(feedback)
    }
}
