use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::auth::AuthService;
use crate::email::Notifier;
use crate::error::AppServicesError;
use crate::feedback::FeedbackService;
use crate::library::LibraryService;
use crate::session_store::SessionStore;

/// Assembles the session store and the services that operate on it.
pub struct AppServices {
    store: SessionStore,
    auth: Arc<AuthService>,
    feedback: Arc<FeedbackService>,
    library: LibraryService,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or session
    /// rehydration fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        notifier: Notifier,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Self::from_storage(storage, clock, notifier).await
    }

    /// Build services over a fresh in-memory backend.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if session rehydration fails.
    pub async fn in_memory(clock: Clock, notifier: Notifier) -> Result<Self, AppServicesError> {
        Self::from_storage(Storage::in_memory(), clock, notifier).await
    }

    /// # Errors
    ///
    /// Returns `AppServicesError` if session rehydration fails.
    pub async fn from_storage(
        storage: Storage,
        clock: Clock,
        notifier: Notifier,
    ) -> Result<Self, AppServicesError> {
        let store = SessionStore::load(Arc::clone(&storage.kv), clock).await?;
        Ok(Self {
            store,
            auth: Arc::new(AuthService::new(notifier.clone())),
            feedback: Arc::new(FeedbackService::new(notifier)),
            library: LibraryService::new(),
        })
    }

    #[must_use]
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut SessionStore {
        &mut self.store
    }

    #[must_use]
    pub fn auth(&self) -> Arc<AuthService> {
        Arc::clone(&self.auth)
    }

    #[must_use]
    pub fn feedback(&self) -> Arc<FeedbackService> {
        Arc::clone(&self.feedback)
    }

    #[must_use]
    pub fn library(&self) -> LibraryService {
        self.library
    }
}
