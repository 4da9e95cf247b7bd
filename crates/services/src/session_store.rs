//! Session and progress store.
//!
//! Holds the signed-in user and everything they accumulate while browsing:
//! bookmarks, feedback, viewed markers, plus the progress ledger that admins
//! read. Every mutation is written through to the `KeyValueStore` before the
//! in-memory copy changes, so a failed write leaves the session untouched.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use portal_core::model::{
    Bookmark, ContentKind, Feedback, ItemId, LearningPath, Mode, ProfilePatch,
    TRACKABLE_ITEMS_TOTAL, User, UserId, UserProgress, ViewedKey, ViewedSet,
};
use storage::repository::{KeyValueStore, StorageError, StorageKey};

use crate::Clock;
use crate::error::SessionStoreError;

pub struct SessionStore {
    kv: Arc<dyn KeyValueStore>,
    clock: Clock,
    trackable_total: u32,
    user: Option<User>,
    bookmarks: Vec<Bookmark>,
    feedback: Vec<Feedback>,
    viewed: ViewedSet,
    progress: Vec<UserProgress>,
}

impl SessionStore {
    /// Rehydrate a session from `kv`.
    ///
    /// Absent slots start empty. A slot holding JSON that no longer parses is
    /// logged and also starts empty. In list slots only the entries that fail
    /// to parse are dropped.
    ///
    /// # Errors
    ///
    /// Returns `SessionStoreError::Storage` if the backend cannot be read.
    pub async fn load(kv: Arc<dyn KeyValueStore>, clock: Clock) -> Result<Self, SessionStoreError> {
        let user = read_slot(kv.as_ref(), StorageKey::User).await?;
        let bookmarks = read_list(kv.as_ref(), StorageKey::Bookmarks).await?;
        let feedback = read_list(kv.as_ref(), StorageKey::Feedbacks).await?;
        let viewed: Vec<ViewedKey> = read_list(kv.as_ref(), StorageKey::ViewedItems).await?;
        let progress = read_list(kv.as_ref(), StorageKey::UserProgress).await?;

        Ok(Self {
            kv,
            clock,
            trackable_total: TRACKABLE_ITEMS_TOTAL,
            user,
            bookmarks,
            feedback,
            viewed: ViewedSet::from(viewed),
            progress,
        })
    }

    /// Override the learning-path denominator.
    #[must_use]
    pub fn with_trackable_total(mut self, total: u32) -> Self {
        self.trackable_total = total;
        self
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    // ─── Accessors ──────────────────────────────────────────────────────────

    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Bookmarks, most recent first.
    #[must_use]
    pub fn bookmarks(&self) -> &[Bookmark] {
        &self.bookmarks
    }

    #[must_use]
    pub fn is_bookmarked(&self, id: ItemId, kind: ContentKind) -> bool {
        self.bookmarks.iter().any(|b| b.matches(id, kind))
    }

    /// Feedback entries, most recent first.
    #[must_use]
    pub fn feedback(&self) -> &[Feedback] {
        &self.feedback
    }

    #[must_use]
    pub fn viewed(&self) -> &ViewedSet {
        &self.viewed
    }

    #[must_use]
    pub fn all_user_progress(&self) -> &[UserProgress] {
        &self.progress
    }

    #[must_use]
    pub fn user_progress(&self, user_id: &UserId) -> Option<&UserProgress> {
        self.progress.iter().find(|p| &p.user_id == user_id)
    }

    // ─── User session ───────────────────────────────────────────────────────

    /// Replace the current user. Nothing from a previous user is merged in.
    ///
    /// # Errors
    ///
    /// Returns `SessionStoreError::Storage` if the user cannot be persisted.
    pub async fn sign_in(&mut self, user: User) -> Result<(), SessionStoreError> {
        self.write_slot(StorageKey::User, &user).await?;
        tracing::debug!(phone = %user.phone, role = %user.role, "signed in");
        self.user = Some(user);
        Ok(())
    }

    /// Clear the user and every session-scoped collection.
    ///
    /// The progress ledger is kept. The user slot goes first: once it is
    /// removed the session counts as signed out, and the remaining slots are
    /// all attempted even if one of them fails.
    ///
    /// # Errors
    ///
    /// Returns the first `SessionStoreError::Storage` hit while removing slots.
    /// If the user slot itself cannot be removed nothing changes.
    pub async fn sign_out(&mut self) -> Result<(), SessionStoreError> {
        self.kv.remove(StorageKey::User).await?;
        self.user = None;
        self.bookmarks.clear();
        self.feedback.clear();
        self.viewed.clear();

        let mut first_err = None;
        for key in StorageKey::ALL
            .into_iter()
            .filter(|k| k.is_session_scoped() && *k != StorageKey::User)
        {
            if let Err(err) = self.kv.remove(key).await {
                tracing::warn!(%key, error = %err, "failed to clear session slot");
                first_err.get_or_insert(err);
            }
        }
        tracing::debug!("signed out");
        match first_err {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }

    /// Shallow-merge `patch` into the current user.
    ///
    /// Does nothing when no one is signed in.
    ///
    /// # Errors
    ///
    /// Returns `SessionStoreError::Storage` if the merged user cannot be persisted.
    pub async fn update_profile(&mut self, patch: ProfilePatch) -> Result<(), SessionStoreError> {
        let Some(current) = self.user.as_ref() else {
            tracing::debug!("profile update ignored, no user signed in");
            return Ok(());
        };
        let mut updated = current.clone();
        updated.apply(patch);
        self.write_slot(StorageKey::User, &updated).await?;
        self.user = Some(updated);
        Ok(())
    }

    /// Set the learning mode of the current user; no-op when signed out.
    ///
    /// # Errors
    ///
    /// Returns `SessionStoreError::Storage` if the user cannot be persisted.
    pub async fn set_mode(&mut self, mode: Mode) -> Result<(), SessionStoreError> {
        self.update_profile(ProfilePatch::mode(mode)).await
    }

    // ─── Bookmarks ──────────────────────────────────────────────────────────

    /// Put `bookmark` at the front of the list.
    ///
    /// An older entry for the same item is dropped so each `(id, type)`
    /// appears once.
    ///
    /// # Errors
    ///
    /// Returns `SessionStoreError::Storage` if the list cannot be persisted.
    pub async fn add_bookmark(&mut self, bookmark: Bookmark) -> Result<(), SessionStoreError> {
        let mut updated = Vec::with_capacity(self.bookmarks.len() + 1);
        updated.extend(
            self.bookmarks
                .iter()
                .filter(|b| !b.matches(bookmark.id, bookmark.kind))
                .cloned(),
        );
        let (id, kind) = (bookmark.id, bookmark.kind);
        updated.insert(0, bookmark);
        self.write_slot(StorageKey::Bookmarks, &updated).await?;
        self.bookmarks = updated;
        tracing::debug!(%id, %kind, "bookmark added");
        Ok(())
    }

    /// Drop every bookmark for `(id, kind)`.
    ///
    /// # Errors
    ///
    /// Returns `SessionStoreError::Storage` if the list cannot be persisted.
    pub async fn remove_bookmark(
        &mut self,
        id: ItemId,
        kind: ContentKind,
    ) -> Result<(), SessionStoreError> {
        let updated: Vec<Bookmark> = self
            .bookmarks
            .iter()
            .filter(|b| !b.matches(id, kind))
            .cloned()
            .collect();
        self.write_slot(StorageKey::Bookmarks, &updated).await?;
        self.bookmarks = updated;
        Ok(())
    }

    // ─── Feedback ───────────────────────────────────────────────────────────

    /// Put `feedback` at the front of the list.
    ///
    /// # Errors
    ///
    /// Returns `SessionStoreError::Storage` if the list cannot be persisted.
    pub async fn add_feedback(&mut self, feedback: Feedback) -> Result<(), SessionStoreError> {
        let mut updated = Vec::with_capacity(self.feedback.len() + 1);
        updated.push(feedback);
        updated.extend(self.feedback.iter().cloned());
        self.write_slot(StorageKey::Feedbacks, &updated).await?;
        self.feedback = updated;
        Ok(())
    }

    // ─── Viewed markers ─────────────────────────────────────────────────────

    /// Record that `(id, kind)` was opened. Repeated calls change nothing.
    ///
    /// Returns `true` when the marker was new.
    ///
    /// # Errors
    ///
    /// Returns `SessionStoreError::Storage` if the set cannot be persisted.
    pub async fn mark_viewed(
        &mut self,
        id: ItemId,
        kind: ContentKind,
    ) -> Result<bool, SessionStoreError> {
        let key = ViewedKey::new(id, kind);
        if self.viewed.contains(key) {
            return Ok(false);
        }
        let mut updated = self.viewed.clone();
        updated.insert(key);
        self.write_slot(StorageKey::ViewedItems, &updated).await?;
        self.viewed = updated;
        tracing::debug!(marker = %key, "item viewed");
        Ok(true)
    }

    // ─── Derived ────────────────────────────────────────────────────────────

    #[must_use]
    pub fn learning_path(&self) -> LearningPath {
        LearningPath::compute(
            &self.viewed,
            &self.feedback,
            &self.bookmarks,
            self.trackable_total,
        )
    }

    // ─── Progress ledger ────────────────────────────────────────────────────

    /// Replace the ledger row with the same user id, or append a new one.
    ///
    /// # Errors
    ///
    /// Returns `SessionStoreError::Storage` if the ledger cannot be persisted.
    pub async fn upsert_user_progress(
        &mut self,
        snapshot: UserProgress,
    ) -> Result<(), SessionStoreError> {
        let mut updated = self.progress.clone();
        match updated.iter_mut().find(|p| p.user_id == snapshot.user_id) {
            Some(existing) => *existing = snapshot,
            None => updated.push(snapshot),
        }
        self.write_slot(StorageKey::UserProgress, &updated).await?;
        self.progress = updated;
        Ok(())
    }

    /// Snapshot the signed-in user's learning path into the ledger.
    ///
    /// Returns the stored snapshot, or `None` when no one is signed in.
    ///
    /// # Errors
    ///
    /// Returns `SessionStoreError::Storage` if the ledger cannot be persisted.
    pub async fn sync_current_progress(
        &mut self,
    ) -> Result<Option<UserProgress>, SessionStoreError> {
        let Some(user) = self.user.as_ref() else {
            return Ok(None);
        };
        let snapshot =
            UserProgress::from_learning_path(user, &self.learning_path(), self.clock.now());
        self.upsert_user_progress(snapshot.clone()).await?;
        Ok(Some(snapshot))
    }

    async fn write_slot<T: Serialize + ?Sized>(
        &self,
        key: StorageKey,
        value: &T,
    ) -> Result<(), SessionStoreError> {
        let raw = serde_json::to_string(value)
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        self.kv.save(key, &raw).await?;
        Ok(())
    }
}

async fn read_slot<T: DeserializeOwned + Default>(
    kv: &dyn KeyValueStore,
    key: StorageKey,
) -> Result<T, StorageError> {
    let Some(raw) = kv.load(key).await? else {
        return Ok(T::default());
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(value),
        Err(err) => {
            tracing::warn!(%key, error = %err, "discarding malformed persisted value");
            Ok(T::default())
        }
    }
}

/// Read a list slot element by element, keeping every entry that parses.
async fn read_list<T: DeserializeOwned>(
    kv: &dyn KeyValueStore,
    key: StorageKey,
) -> Result<Vec<T>, StorageError> {
    let raw: Vec<serde_json::Value> = read_slot(kv, key).await?;
    let total = raw.len();
    let items: Vec<T> = raw
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(item) => Some(item),
            Err(err) => {
                tracing::warn!(%key, error = %err, "skipping malformed persisted entry");
                None
            }
        })
        .collect();
    if items.len() < total {
        tracing::warn!(%key, kept = items.len(), total, "dropped unreadable entries");
    }
    Ok(items)
}
