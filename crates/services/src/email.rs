//! Best-effort transactional email.
//!
//! Senders report success as a plain `bool`; a failed send is logged and
//! never interrupts the calling flow.

use std::collections::BTreeMap;
use std::env;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use portal_core::model::{ContentKind, User};

/// Flat template parameters, keyed by template variable name.
pub type EmailParams = BTreeMap<String, String>;

const DEFAULT_API_URL: &str = "https://api.emailjs.com/api/v1.0/email/send";
const FROM_NAME: &str = "Constitution Connect";
const DEFAULT_SMS_GATEWAY: &str = "sms.gateway.com";

pub const TEMPLATE_WELCOME: &str = "template_welcome";
pub const TEMPLATE_FEEDBACK: &str = "template_feedback";

#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Deliver `template_id` to `recipient`. Returns `true` only on confirmed delivery.
    async fn send(&self, recipient: &str, template_id: &str, params: &EmailParams) -> bool;
}

/// Sender used when no email provider is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEmailSender;

#[async_trait]
impl EmailSender for NoopEmailSender {
    async fn send(&self, recipient: &str, template_id: &str, _params: &EmailParams) -> bool {
        tracing::debug!(recipient, template_id, "email disabled, skipping send");
        false
    }
}

#[derive(Clone, Debug)]
pub struct EmailConfig {
    pub api_url: String,
    pub service_id: String,
    pub otp_template: String,
    pub public_key: String,
    /// Address shown as sender and used as the admin inbox for feedback.
    pub sender_address: String,
    /// Email-to-SMS domain; codes for `phone` go to `phone@domain`.
    pub sms_gateway: String,
}

impl EmailConfig {
    /// Read the EmailJS settings from the environment.
    ///
    /// Returns `None` when no public key is set.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let public_key = env::var("PORTAL_EMAILJS_PUBLIC_KEY").ok()?;
        if public_key.trim().is_empty() {
            return None;
        }
        let api_url = env::var("PORTAL_EMAILJS_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into());
        let service_id = env::var("PORTAL_EMAILJS_SERVICE_ID")
            .unwrap_or_else(|_| "service_constitution".into());
        let otp_template =
            env::var("PORTAL_EMAILJS_TEMPLATE_OTP").unwrap_or_else(|_| "template_otp".into());
        let sender_address =
            env::var("PORTAL_EMAIL_SENDER").unwrap_or_else(|_| "admin@example.com".into());
        let sms_gateway =
            env::var("PORTAL_SMS_GATEWAY").unwrap_or_else(|_| DEFAULT_SMS_GATEWAY.into());
        Some(Self {
            api_url,
            service_id,
            otp_template,
            public_key,
            sender_address,
            sms_gateway,
        })
    }
}

/// Sends through the EmailJS REST endpoint.
#[derive(Clone)]
pub struct EmailJsSender {
    client: Client,
    config: EmailConfig,
}

impl EmailJsSender {
    #[must_use]
    pub fn new(config: EmailConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    template_params: &'a EmailParams,
}

#[async_trait]
impl EmailSender for EmailJsSender {
    async fn send(&self, recipient: &str, template_id: &str, params: &EmailParams) -> bool {
        let mut template_params = params.clone();
        template_params
            .entry("to_email".into())
            .or_insert_with(|| recipient.to_string());

        let payload = SendRequest {
            service_id: &self.config.service_id,
            template_id,
            user_id: &self.config.public_key,
            template_params: &template_params,
        };

        match self
            .client
            .post(&self.config.api_url)
            .json(&payload)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => {
                tracing::info!(recipient, template_id, "email sent");
                true
            }
            Ok(response) => {
                tracing::warn!(recipient, template_id, status = %response.status(), "email rejected");
                false
            }
            Err(err) => {
                tracing::warn!(recipient, template_id, error = %err, "email send failed");
                false
            }
        }
    }
}

/// Builds the portal's notification emails on top of an `EmailSender`.
#[derive(Clone)]
pub struct Notifier {
    sender: Arc<dyn EmailSender>,
    sender_address: String,
    otp_template: String,
    sms_gateway: String,
}

impl Notifier {
    #[must_use]
    pub fn new(sender: Arc<dyn EmailSender>, sender_address: impl Into<String>) -> Self {
        Self {
            sender,
            sender_address: sender_address.into(),
            otp_template: "template_otp".into(),
            sms_gateway: DEFAULT_SMS_GATEWAY.into(),
        }
    }

    /// EmailJS when configured in the environment, otherwise a no-op sender.
    #[must_use]
    pub fn from_env() -> Self {
        match EmailConfig::from_env() {
            Some(config) => {
                let address = config.sender_address.clone();
                let otp_template = config.otp_template.clone();
                let sms_gateway = config.sms_gateway.clone();
                let mut notifier = Self::new(Arc::new(EmailJsSender::new(config)), address);
                notifier.otp_template = otp_template;
                notifier.sms_gateway = sms_gateway;
                notifier
            }
            None => Self::disabled(),
        }
    }

    #[must_use]
    pub fn disabled() -> Self {
        Self::new(Arc::new(NoopEmailSender), "admin@example.com")
    }

    pub async fn send_otp(&self, recipient: &str, user_name: &str, otp: &str) -> bool {
        let params = params([
            ("name", user_name),
            ("email", recipient),
            ("message", otp),
            ("to_email", recipient),
            ("from_email", self.sender_address.as_str()),
            ("from_name", FROM_NAME),
            ("subject", "Your OTP Verification Code - Constitution Connect"),
        ]);
        self.sender.send(recipient, &self.otp_template, &params).await
    }

    /// Send a code to a phone through the email-to-SMS gateway.
    pub async fn send_otp_sms(&self, phone: &str, user_name: &str, otp: &str) -> bool {
        let recipient = format!("{phone}@{}", self.sms_gateway);
        let params = params([
            ("to_email", recipient.as_str()),
            ("from_email", self.sender_address.as_str()),
            ("user_name", user_name),
            ("otp_code", otp),
            ("from_name", FROM_NAME),
        ]);
        self.sender.send(&recipient, &self.otp_template, &params).await
    }

    pub async fn send_welcome(&self, user: &User) -> bool {
        let role = user.role.to_string();
        let params = params([
            ("to_email", user.email.as_str()),
            ("from_email", self.sender_address.as_str()),
            ("user_name", user.name.as_str()),
            ("user_role", role.as_str()),
            ("from_name", FROM_NAME),
            ("subject", "Welcome to Constitution Connect!"),
        ]);
        self.sender.send(&user.email, TEMPLATE_WELCOME, &params).await
    }

    /// Forward a user's feedback to the admin inbox.
    pub async fn send_feedback(&self, user: &User, text: &str, kind: ContentKind) -> bool {
        let subject = format!("New Feedback from {}", user.name);
        let params = params([
            ("to_email", self.sender_address.as_str()),
            ("from_email", user.email.as_str()),
            ("user_name", user.name.as_str()),
            ("feedback_text", text),
            ("item_type", kind.as_str()),
            ("from_name", "Constitution Connect - User Feedback"),
            ("subject", subject.as_str()),
        ]);
        self.sender
            .send(&self.sender_address, TEMPLATE_FEEDBACK, &params)
            .await
    }
}

fn params<const N: usize>(pairs: [(&str, &str); N]) -> EmailParams {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_core::model::Role;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recording {
        sent: Mutex<Vec<(String, String, EmailParams)>>,
    }

    #[async_trait]
    impl EmailSender for Recording {
        async fn send(&self, recipient: &str, template_id: &str, params: &EmailParams) -> bool {
            self.sent.lock().unwrap().push((
                recipient.to_string(),
                template_id.to_string(),
                params.clone(),
            ));
            true
        }
    }

    #[tokio::test]
    async fn feedback_goes_to_admin_inbox() {
        let recorder = Arc::new(Recording::default());
        let notifier = Notifier::new(recorder.clone(), "admin@portal.test");
        let user = User::new("Kiran", "kiran@example.com", "9000000003", Role::Citizen);

        assert!(notifier.send_feedback(&user, "great", ContentKind::Video).await);

        let sent = recorder.sent.lock().unwrap();
        let (recipient, template, params) = &sent[0];
        assert_eq!(recipient, "admin@portal.test");
        assert_eq!(template, TEMPLATE_FEEDBACK);
        assert_eq!(params["from_email"], "kiran@example.com");
        assert_eq!(params["item_type"], "video");
        assert_eq!(params["subject"], "New Feedback from Kiran");
    }

    #[tokio::test]
    async fn otp_carries_code_in_message() {
        let recorder = Arc::new(Recording::default());
        let notifier = Notifier::new(recorder.clone(), "admin@portal.test");

        notifier.send_otp("a@example.com", "Asha", "123456").await;

        let sent = recorder.sent.lock().unwrap();
        assert_eq!(sent[0].1, "template_otp");
        assert_eq!(sent[0].2["message"], "123456");
        assert_eq!(sent[0].2["name"], "Asha");
    }

    #[tokio::test]
    async fn sms_otp_goes_through_gateway_address() {
        let recorder = Arc::new(Recording::default());
        let notifier = Notifier::new(recorder.clone(), "admin@portal.test");

        assert!(notifier.send_otp_sms("9876543210", "Asha", "654321").await);

        let sent = recorder.sent.lock().unwrap();
        let (recipient, template, params) = &sent[0];
        assert_eq!(recipient, "9876543210@sms.gateway.com");
        assert_eq!(template, "template_otp");
        assert_eq!(params["otp_code"], "654321");
        assert_eq!(params["user_name"], "Asha");
        assert_eq!(params["to_email"], "9876543210@sms.gateway.com");
    }

    #[tokio::test]
    async fn disabled_notifier_reports_failure() {
        let user = User::new("Kiran", "kiran@example.com", "9000000003", Role::Citizen);
        assert!(!Notifier::disabled().send_welcome(&user).await);
    }
}
