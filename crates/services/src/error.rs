//! Shared error types for the services crate.

use thiserror::Error;

use portal_core::model::{CommentError, ParseKindError, RatingError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `SessionStore`.
///
/// Domain input never fails here; only the backing store can.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionStoreError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Rejections shown to the user on the sign-in forms.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
    #[error("please enter a valid 10-digit phone number")]
    InvalidPhone,
    #[error("{field} is required")]
    MissingField { field: &'static str },
    #[error(transparent)]
    Role(#[from] ParseKindError),
    #[error(transparent)]
    Store(#[from] SessionStoreError),
}

/// Errors emitted by `FeedbackService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FeedbackError {
    #[error("please select a star rating before submitting")]
    MissingRating,
    #[error(transparent)]
    Rating(#[from] RatingError),
    #[error(transparent)]
    Comment(#[from] CommentError),
    #[error("please sign in to provide feedback")]
    SignInRequired,
    #[error(transparent)]
    Store(#[from] SessionStoreError),
}

/// Errors emitted by `LibraryService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LibraryError {
    #[error("please sign in to bookmark content")]
    SignInRequired,
    #[error(transparent)]
    Store(#[from] SessionStoreError),
}

/// Errors emitted by the admin dashboard.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AdminError {
    #[error("admin access required")]
    Forbidden,
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Store(#[from] SessionStoreError),
}
