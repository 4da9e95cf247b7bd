use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Bookmark, ContentKind, Feedback, Role, User, UserId, ViewedSet};

/// Number of trackable items across all catalogs; the progress denominator.
pub const TRACKABLE_ITEMS_TOTAL: u32 = 30;

/// How many bookmarks the learning path surfaces as recent items.
pub const RECENT_ITEMS_LIMIT: usize = 5;

/// Rounds to one decimal place, halves away from zero.
#[must_use]
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

//
// ─── LEARNING PATH ─────────────────────────────────────────────────────────────
//

/// Aggregate view of what the current user has opened and rated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningPath {
    pub articles_completed: u32,
    pub books_completed: u32,
    pub videos_completed: u32,
    /// Percentage of trackable items opened, clamped to 0–100.
    pub total_progress: u8,
    pub recent_items: Vec<Bookmark>,
    pub average_rating: f64,
}

impl LearningPath {
    /// Derive the path from session state.
    ///
    /// `bookmarks` must be most-recent-first; the first `RECENT_ITEMS_LIMIT`
    /// entries become `recent_items`. A `trackable_total` of zero yields 0%.
    #[must_use]
    pub fn compute(
        viewed: &ViewedSet,
        feedback: &[Feedback],
        bookmarks: &[Bookmark],
        trackable_total: u32,
    ) -> Self {
        let count = |kind| u32::try_from(viewed.count(kind)).unwrap_or(u32::MAX);
        let articles_completed = count(ContentKind::Article);
        let books_completed = count(ContentKind::Book);
        let videos_completed = count(ContentKind::Video);

        let completed = f64::from(articles_completed)
            + f64::from(books_completed)
            + f64::from(videos_completed);
        let total_progress = if trackable_total == 0 {
            0
        } else {
            let pct = (completed / f64::from(trackable_total) * 100.0).round();
            // clamped to 0..=100 before the narrowing cast
            pct.clamp(0.0, 100.0) as u8
        };

        Self {
            articles_completed,
            books_completed,
            videos_completed,
            total_progress,
            recent_items: bookmarks.iter().take(RECENT_ITEMS_LIMIT).cloned().collect(),
            average_rating: average_rating(feedback),
        }
    }

    #[must_use]
    pub fn completed(&self, kind: ContentKind) -> u32 {
        match kind {
            ContentKind::Article => self.articles_completed,
            ContentKind::Book => self.books_completed,
            ContentKind::Video => self.videos_completed,
        }
    }
}

/// Mean rating rounded to one decimal; 0 when there is no feedback.
#[must_use]
pub fn average_rating(feedback: &[Feedback]) -> f64 {
    if feedback.is_empty() {
        return 0.0;
    }
    let sum: u32 = feedback.iter().map(|f| u32::from(f.rating.value())).sum();
    let n = u32::try_from(feedback.len()).unwrap_or(u32::MAX);
    round_to_tenth(f64::from(sum) / f64::from(n))
}

//
// ─── USER PROGRESS ─────────────────────────────────────────────────────────────
//

/// Admin-visible ledger row. Survives sign-out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProgress {
    pub user_id: UserId,
    pub user_name: String,
    pub user_email: String,
    pub user_role: Role,
    pub articles_completed: u32,
    pub books_completed: u32,
    pub videos_completed: u32,
    pub total_progress: u8,
    pub average_rating: f64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_active: DateTime<Utc>,
}

impl UserProgress {
    /// Snapshot a signed-in user's learning path.
    #[must_use]
    pub fn from_learning_path(user: &User, path: &LearningPath, last_active: DateTime<Utc>) -> Self {
        Self {
            user_id: user.id(),
            user_name: user.name.clone(),
            user_email: user.email.clone(),
            user_role: user.role,
            articles_completed: path.articles_completed,
            books_completed: path.books_completed,
            videos_completed: path.videos_completed,
            total_progress: path.total_progress,
            average_rating: path.average_rating,
            last_active,
        }
    }
}
