//! Content interactions behind the sign-in gate: opening and bookmarking items.

use portal_core::model::{Bookmark, ContentKind, ItemId};

use crate::error::LibraryError;
use crate::session_store::SessionStore;

#[derive(Debug, Clone, Copy, Default)]
pub struct LibraryService;

impl LibraryService {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Record a page view. Anonymous visitors are not tracked.
    ///
    /// Returns `true` when a new viewed marker was stored.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::Store` if persisting fails.
    pub async fn open_item(
        &self,
        store: &mut SessionStore,
        id: ItemId,
        kind: ContentKind,
    ) -> Result<bool, LibraryError> {
        if !store.is_authenticated() {
            return Ok(false);
        }
        Ok(store.mark_viewed(id, kind).await?)
    }

    /// Bookmark an item, stamped with the store's clock.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::SignInRequired` when signed out, or
    /// `LibraryError::Store` if persisting fails.
    pub async fn bookmark_item(
        &self,
        store: &mut SessionStore,
        id: ItemId,
        kind: ContentKind,
        title: impl Into<String>,
    ) -> Result<Bookmark, LibraryError> {
        if !store.is_authenticated() {
            return Err(LibraryError::SignInRequired);
        }
        let bookmark = Bookmark::new(id, kind, title, store.clock().now());
        store.add_bookmark(bookmark.clone()).await?;
        Ok(bookmark)
    }

    /// Flip the bookmark state of an item. Returns the new state.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::SignInRequired` when signed out, or
    /// `LibraryError::Store` if persisting fails.
    pub async fn toggle_bookmark(
        &self,
        store: &mut SessionStore,
        id: ItemId,
        kind: ContentKind,
        title: impl Into<String>,
    ) -> Result<bool, LibraryError> {
        if store.is_bookmarked(id, kind) {
            store.remove_bookmark(id, kind).await?;
            Ok(false)
        } else {
            self.bookmark_item(store, id, kind, title).await?;
            Ok(true)
        }
    }
}
