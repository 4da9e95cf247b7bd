//! Admin dashboard figures over the user-progress ledger.

use serde::Serialize;

use portal_core::model::{Role, User, UserProgress, round_to_tenth};

use crate::error::AdminError;
use crate::session_store::SessionStore;

/// Gate for admin-only views.
///
/// # Errors
///
/// Returns `AdminError::Forbidden` unless the signed-in user is an admin.
pub fn require_admin(store: &SessionStore) -> Result<&User, AdminError> {
    store
        .user()
        .filter(|u| u.is_admin())
        .ok_or(AdminError::Forbidden)
}

/// Rows shown in the dashboard's per-user activity list.
pub const ACTIVITY_ROWS: usize = 10;

/// One entry of the per-user activity list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRow {
    /// First word of the user's name.
    pub name: String,
    pub progress: u8,
    pub rating: f64,
}

impl ActivityRow {
    #[must_use]
    pub fn from_progress(row: &UserProgress) -> Self {
        let first = row.user_name.split(' ').next().unwrap_or_default();
        Self {
            name: first.to_string(),
            progress: row.total_progress,
            rating: row.average_rating,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_users: usize,
    pub student_count: usize,
    pub citizen_count: usize,
    /// Mean of `totalProgress`, rounded to a whole percent.
    pub average_progress: u32,
    /// Mean of per-user average ratings, one decimal.
    pub average_rating: f64,
    pub average_articles: u32,
    pub average_books: u32,
    pub average_videos: u32,
    /// Ledger order, first `ACTIVITY_ROWS` users.
    pub activity: Vec<ActivityRow>,
}

impl DashboardStats {
    #[must_use]
    pub fn from_progress(rows: &[UserProgress]) -> Self {
        if rows.is_empty() {
            return Self::default();
        }
        let n = rows.len() as f64;
        let mean = |f: fn(&UserProgress) -> f64| rows.iter().map(f).sum::<f64>() / n;
        let whole = |v: f64| v.round().max(0.0) as u32;

        Self {
            total_users: rows.len(),
            student_count: rows.iter().filter(|p| p.user_role == Role::Student).count(),
            citizen_count: rows.iter().filter(|p| p.user_role == Role::Citizen).count(),
            average_progress: whole(mean(|p| f64::from(p.total_progress))),
            average_rating: round_to_tenth(mean(|p| p.average_rating)),
            average_articles: whole(mean(|p| f64::from(p.articles_completed))),
            average_books: whole(mean(|p| f64::from(p.books_completed))),
            average_videos: whole(mean(|p| f64::from(p.videos_completed))),
            activity: rows
                .iter()
                .take(ACTIVITY_ROWS)
                .map(ActivityRow::from_progress)
                .collect(),
        }
    }

    /// Dashboard for the signed-in admin.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Forbidden` for non-admins.
    pub fn for_admin(store: &SessionStore) -> Result<Self, AdminError> {
        require_admin(store)?;
        Ok(Self::from_progress(store.all_user_progress()))
    }
}
