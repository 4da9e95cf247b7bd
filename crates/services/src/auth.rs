//! Sign-up and log-in forms.
//!
//! There is no credential check: any well-formed 10-digit phone signs in.
//! Form problems are returned as `AuthError` before the store is touched.

use rand::Rng;
use url::Url;

use portal_core::model::{Role, User};

use crate::email::Notifier;
use crate::error::AuthError;
use crate::session_store::SessionStore;

const AVATAR_BASE: &str = "https://api.dicebear.com/7.x/avataaars/svg";

/// Accept exactly ten ASCII digits, surrounding whitespace ignored.
///
/// # Errors
///
/// Returns `AuthError::InvalidPhone` for anything else.
pub fn validate_phone(raw: &str) -> Result<String, AuthError> {
    let phone = raw.trim();
    if phone.len() == 10 && phone.bytes().all(|b| b.is_ascii_digit()) {
        Ok(phone.to_string())
    } else {
        Err(AuthError::InvalidPhone)
    }
}

/// Generated avatar for `seed`.
#[must_use]
pub fn avatar_url(seed: &str) -> Option<String> {
    Url::parse_with_params(AVATAR_BASE, &[("seed", seed)])
        .ok()
        .map(String::from)
}

fn required(value: &str, field: &'static str) -> Result<String, AuthError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AuthError::MissingField { field });
    }
    Ok(value.to_string())
}

#[derive(Debug, Clone, Default)]
pub struct SignUpForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: String,
}

impl SignUpForm {
    /// # Errors
    ///
    /// Returns `AuthError` if a field is empty, the phone is malformed, or
    /// the role is unknown.
    pub fn validate(&self) -> Result<User, AuthError> {
        let phone = validate_phone(&self.phone)?;
        let name = required(&self.name, "name")?;
        let email = required(&self.email, "email")?;
        let role: Role = required(&self.role, "role")?.parse()?;

        let mut user = User::new(name, email, phone, role);
        user.avatar = avatar_url(&user.name);
        Ok(user)
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub phone: String,
}

impl LoginForm {
    /// Build the placeholder account used for returning users.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidPhone` if the phone is malformed.
    pub fn validate(&self) -> Result<User, AuthError> {
        let phone = validate_phone(&self.phone)?;
        let mut user = User::new("User", "user@example.com", phone, Role::Citizen);
        user.avatar = avatar_url(&user.phone);
        Ok(user)
    }
}

/// One-time code sent by email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpChallenge {
    code: String,
    delivered: bool,
}

impl OtpChallenge {
    /// Random six-digit code.
    #[must_use]
    pub fn generate() -> String {
        rand::rng().random_range(100_000..=999_999).to_string()
    }

    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    #[must_use]
    pub fn delivered(&self) -> bool {
        self.delivered
    }

    #[must_use]
    pub fn verify(&self, input: &str) -> bool {
        input.trim() == self.code
    }
}

#[derive(Clone)]
pub struct AuthService {
    notifier: Notifier,
}

impl AuthService {
    #[must_use]
    pub fn new(notifier: Notifier) -> Self {
        Self { notifier }
    }

    /// Create an account and sign it in. A welcome email is attempted.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` for invalid form input or a storage failure.
    pub async fn sign_up(
        &self,
        store: &mut SessionStore,
        form: &SignUpForm,
    ) -> Result<User, AuthError> {
        let user = form.validate()?;
        store.sign_in(user.clone()).await?;
        if !self.notifier.send_welcome(&user).await {
            tracing::debug!(email = %user.email, "welcome email not delivered");
        }
        Ok(user)
    }

    /// Sign in with a phone number.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` for an invalid phone or a storage failure.
    pub async fn log_in(
        &self,
        store: &mut SessionStore,
        form: &LoginForm,
    ) -> Result<User, AuthError> {
        let user = form.validate()?;
        store.sign_in(user.clone()).await?;
        Ok(user)
    }

    /// Generate a code and email it to `recipient`.
    pub async fn request_otp(&self, recipient: &str, user_name: &str) -> OtpChallenge {
        let code = OtpChallenge::generate();
        let delivered = self.notifier.send_otp(recipient, user_name, &code).await;
        OtpChallenge { code, delivered }
    }

    /// Generate a code and text it to `phone` through the SMS gateway.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidPhone` if the phone is malformed.
    pub async fn request_otp_sms(
        &self,
        phone: &str,
        user_name: &str,
    ) -> Result<OtpChallenge, AuthError> {
        let phone = validate_phone(phone)?;
        let code = OtpChallenge::generate();
        let delivered = self.notifier.send_otp_sms(&phone, user_name, &code).await;
        Ok(OtpChallenge { code, delivered })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_must_be_ten_digits() {
        assert_eq!(validate_phone(" 9876543210 ").unwrap(), "9876543210");
        assert!(matches!(validate_phone("987654321"), Err(AuthError::InvalidPhone)));
        assert!(matches!(validate_phone("98765432101"), Err(AuthError::InvalidPhone)));
        assert!(matches!(validate_phone("98765-4321"), Err(AuthError::InvalidPhone)));
        assert!(matches!(validate_phone("９８７６５４３２１０"), Err(AuthError::InvalidPhone)));
    }

    #[test]
    fn sign_up_requires_every_field() {
        let form = SignUpForm {
            name: "  ".into(),
            email: "a@example.com".into(),
            phone: "9876543210".into(),
            role: "student".into(),
        };
        assert!(matches!(
            form.validate(),
            Err(AuthError::MissingField { field: "name" })
        ));
    }

    #[test]
    fn sign_up_rejects_unknown_role() {
        let form = SignUpForm {
            name: "Asha".into(),
            email: "a@example.com".into(),
            phone: "9876543210".into(),
            role: "moderator".into(),
        };
        assert!(matches!(form.validate(), Err(AuthError::Role(_))));
    }

    #[test]
    fn sign_up_builds_user_with_avatar() {
        let form = SignUpForm {
            name: "Asha Rao".into(),
            email: "a@example.com".into(),
            phone: "9876543210".into(),
            role: "Admin".into(),
        };
        let user = form.validate().unwrap();
        assert_eq!(user.role, Role::Admin);
        assert_eq!(
            user.avatar.as_deref(),
            Some("https://api.dicebear.com/7.x/avataaars/svg?seed=Asha+Rao")
        );
    }

    #[test]
    fn login_builds_placeholder_citizen() {
        let user = LoginForm {
            phone: "9123456780".into(),
        }
        .validate()
        .unwrap();
        assert_eq!(user.name, "User");
        assert_eq!(user.role, Role::Citizen);
        assert_eq!(user.phone, "9123456780");
    }

    #[test]
    fn otp_is_six_digits() {
        for _ in 0..50 {
            let code = OtpChallenge::generate();
            assert_eq!(code.len(), 6);
            assert!(code.bytes().all(|b| b.is_ascii_digit()));
            assert_ne!(&code[..1], "0");
        }
    }

    #[tokio::test]
    async fn sms_otp_rejects_malformed_phone() {
        let auth = AuthService::new(Notifier::disabled());
        assert!(matches!(
            auth.request_otp_sms("12345", "Asha").await,
            Err(AuthError::InvalidPhone)
        ));
        let challenge = auth.request_otp_sms("9876543210", "Asha").await.unwrap();
        assert!(!challenge.delivered());
        assert_eq!(challenge.code().len(), 6);
    }

    #[test]
    fn otp_verify_ignores_whitespace() {
        let challenge = OtpChallenge {
            code: "482913".into(),
            delivered: false,
        };
        assert!(challenge.verify(" 482913\n"));
        assert!(!challenge.verify("482914"));
    }
}
