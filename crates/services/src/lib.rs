#![forbid(unsafe_code)]

pub mod admin;
pub mod app_services;
pub mod auth;
pub mod email;
pub mod error;
pub mod feedback;
pub mod library;
pub mod session_store;

pub use portal_core::Clock;

pub use admin::{ActivityRow, DashboardStats, require_admin};
pub use app_services::AppServices;
pub use auth::{AuthService, LoginForm, OtpChallenge, SignUpForm};
pub use email::{EmailConfig, EmailJsSender, EmailParams, EmailSender, NoopEmailSender, Notifier};
pub use error::{
    AdminError, AppServicesError, AuthError, FeedbackError, LibraryError, SessionStoreError,
};
pub use feedback::{FeedbackDraft, FeedbackService};
pub use library::LibraryService;
pub use session_store::SessionStore;
