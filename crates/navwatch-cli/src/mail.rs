//! SMTP connectivity test: sends one fixed HTML message.
//!
//! Not wired to the scrape pipeline. It only proves the mail credentials in
//! the environment work.

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

/// Optional env file loaded before the real environment is read.
pub const ENV_FILE: &str = ".env.local";

pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";

pub const SUBJECT: &str = "Test Email from Vanguard Scraper";

const USER_VAR: &str = "EMAIL_USER";
const PASSWORD_VAR: &str = "EMAIL_PASSWORD";
const RECIPIENT_VAR: &str = "RECIPIENT_EMAIL";
const HOST_VAR: &str = "SMTP_HOST";

/// Errors from building or delivering the test message.
#[derive(thiserror::Error, Debug)]
pub enum MailError {
    #[error("Missing environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Message error: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

/// Sender credentials and recipient.
#[derive(Clone)]
pub struct MailSettings {
    pub user: String,
    pub password: String,
    pub recipient: String,
    pub smtp_host: String,
}

impl std::fmt::Debug for MailSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailSettings")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("recipient", &self.recipient)
            .field("smtp_host", &self.smtp_host)
            .finish()
    }
}

impl MailSettings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, MailError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary key lookup. Empty values count
    /// as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, MailError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(MailError::MissingVar(key))
        };

        Ok(Self {
            user: required(USER_VAR)?,
            password: required(PASSWORD_VAR)?,
            recipient: required(RECIPIENT_VAR)?,
            smtp_host: lookup(HOST_VAR)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
        })
    }
}

/// Load [`ENV_FILE`] into the environment if it exists.
pub fn load_env_file() {
    match dotenv::from_filename(ENV_FILE) {
        Ok(path) => info!("Loaded {}", path.display()),
        Err(_) => tracing::debug!("No {ENV_FILE} found"),
    }
}

/// HTML body of the test message.
pub fn test_body(settings: &MailSettings, sent_at: &str) -> String {
    format!(
        r#"
<h2>Email Test Successful! 🎉</h2>
<p>This is a test email to verify that SMTP delivery is working correctly.</p>
<ul>
    <li><strong>From:</strong> {from}</li>
    <li><strong>To:</strong> {to}</li>
    <li><strong>Time:</strong> {sent_at}</li>
</ul>
<p>Your Vanguard scraper is ready to send emails!</p>
"#,
        from = settings.user,
        to = settings.recipient,
    )
}

/// Build the test message. Returns it with its Message-ID.
pub fn build_test_message(
    settings: &MailSettings,
    sent_at: &str,
) -> Result<(Message, String), MailError> {
    let from: Mailbox = settings.user.parse()?;
    let to: Mailbox = settings.recipient.parse()?;
    let message_id = format!("<{}@navwatch>", uuid::Uuid::new_v4());

    let message = Message::builder()
        .from(from)
        .to(to)
        .subject(SUBJECT)
        .message_id(Some(message_id.clone()))
        .header(ContentType::TEXT_HTML)
        .body(test_body(settings, sent_at))?;

    Ok((message, message_id))
}

/// Outcome of a successful delivery.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub message_id: String,
    /// Relay's reply, e.g. `250 2.0.0 OK`.
    pub response: String,
}

/// Send the test message through the configured relay.
pub async fn send_test_email(settings: &MailSettings) -> Result<Delivery, MailError> {
    let sent_at = chrono::Local::now().format("%d/%m/%Y, %H:%M:%S").to_string();
    let (message, message_id) = build_test_message(settings, &sent_at)?;

    info!("Connecting to {}", settings.smtp_host);
    let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.smtp_host)?
        .credentials(Credentials::new(
            settings.user.clone(),
            settings.password.clone(),
        ))
        .build();

    let response = mailer.send(message).await?;
    let text: Vec<&str> = response.message().collect();

    Ok(Delivery {
        message_id,
        response: format!("{} {}", response.code(), text.join(" ")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn settings() -> MailSettings {
        MailSettings {
            user: "sender@example.com".into(),
            password: "app-password".into(),
            recipient: "inbox@example.org".into(),
            smtp_host: DEFAULT_SMTP_HOST.into(),
        }
    }

    #[test]
    fn test_settings_from_lookup() {
        let s = MailSettings::from_lookup(lookup(&[
            ("EMAIL_USER", "sender@example.com"),
            ("EMAIL_PASSWORD", "secret"),
            ("RECIPIENT_EMAIL", "inbox@example.org"),
        ]))
        .unwrap();
        assert_eq!(s.user, "sender@example.com");
        assert_eq!(s.smtp_host, "smtp.gmail.com");
    }

    #[test]
    fn test_missing_var_is_reported() {
        let err = MailSettings::from_lookup(lookup(&[
            ("EMAIL_USER", "sender@example.com"),
            ("EMAIL_PASSWORD", "  "),
        ]))
        .unwrap_err();
        assert!(matches!(err, MailError::MissingVar("EMAIL_PASSWORD")));
    }

    #[test]
    fn test_host_override() {
        let s = MailSettings::from_lookup(lookup(&[
            ("EMAIL_USER", "a@example.com"),
            ("EMAIL_PASSWORD", "p"),
            ("RECIPIENT_EMAIL", "b@example.com"),
            ("SMTP_HOST", "smtp.example.net"),
        ]))
        .unwrap();
        assert_eq!(s.smtp_host, "smtp.example.net");
    }

    #[test]
    fn test_debug_hides_password() {
        let out = format!("{:?}", settings());
        assert!(!out.contains("app-password"));
        assert!(out.contains("<redacted>"));
    }

    #[test]
    fn test_body_lists_addresses_and_time() {
        let body = test_body(&settings(), "19/10/2026, 09:00:00");
        assert!(body.contains("<strong>From:</strong> sender@example.com"));
        assert!(body.contains("<strong>To:</strong> inbox@example.org"));
        assert!(body.contains("19/10/2026, 09:00:00"));
    }

    #[test]
    fn test_build_message_headers() {
        let (message, id) = build_test_message(&settings(), "now").unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains(&format!("Message-ID: {id}")));
        assert!(raw.contains("Subject: Test Email from Vanguard Scraper"));
        assert!(raw.contains("Content-Type: text/html"));
        assert!(id.starts_with('<') && id.ends_with("@navwatch>"));
    }

    #[test]
    fn test_bad_address_is_an_error() {
        let mut s = settings();
        s.recipient = "not an address".into();
        assert!(matches!(
            build_test_message(&s, "now"),
            Err(MailError::Address(_))
        ));
    }
}
