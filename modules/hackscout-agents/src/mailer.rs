//! Outbound mail transport.
//!
//! Production delivery goes through Gmail SMTP over implicit TLS with
//! an app password. Tests use [`MemoryMailer`], which records sends and
//! can be scripted to fail.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

/// Gmail SMTPS relay host.
const GMAIL_RELAY: &str = "smtp.gmail.com";

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// Credentials absent. Checked eagerly before a batch starts.
    #[error("GMAIL_USER and GMAIL_APP_PASSWORD are required for sending emails")]
    MissingCredentials,

    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),

    /// Scripted failure from the in-memory test transport.
    #[error("{0}")]
    Simulated(String),
}

// ---------------------------------------------------------------------------
// MailTransport
// ---------------------------------------------------------------------------

/// Opaque mail transport: recipient/subject/body in, success or a
/// transport error out.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError>;
}

#[async_trait]
impl<M: MailTransport + ?Sized> MailTransport for Arc<M> {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        (**self).send(to, subject, body).await
    }
}

// ---------------------------------------------------------------------------
// SmtpMailer
// ---------------------------------------------------------------------------

/// Sends plain-text mail via Gmail SMTPS with an app password.
pub struct SmtpMailer {
    user: String,
    app_password: String,
}

impl SmtpMailer {
    pub fn new(user: impl Into<String>, app_password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            app_password: app_password.into(),
        }
    }

    /// Build from optional credentials, failing eagerly when either is
    /// missing so a batch never starts half-configured.
    pub fn from_credentials(
        user: Option<&str>,
        app_password: Option<&str>,
    ) -> Result<Self, MailError> {
        match (user, app_password) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => {
                Ok(Self::new(user, pass))
            }
            _ => Err(MailError::MissingCredentials),
        }
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        use lettre::{
            message::header::ContentType, transport::smtp::authentication::Credentials,
            AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
        };

        let email = Message::builder()
            .from(self.user.parse()?)
            .to(to.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| MailError::Build(e.to_string()))?;

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(GMAIL_RELAY)?
            .credentials(Credentials::new(
                self.user.clone(),
                self.app_password.clone(),
            ))
            .build();

        mailer.send(email).await?;

        tracing::info!(to, "Invitation email sent");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// NoopMailer
// ---------------------------------------------------------------------------

/// Transport for dry runs, where nothing should ever be sent. Any
/// actual send call is a bug and reports missing configuration.
pub struct NoopMailer;

#[async_trait]
impl MailTransport for NoopMailer {
    async fn send(&self, _to: &str, _subject: &str, _body: &str) -> Result<(), MailError> {
        Err(MailError::MissingCredentials)
    }
}

// ---------------------------------------------------------------------------
// MemoryMailer (tests — no SMTP required)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// In-memory transport. Records every send; can be scripted to fail
/// for specific recipients.
#[derive(Default)]
pub struct MemoryMailer {
    sent: Mutex<Vec<SentMail>>,
    fail_for: Mutex<Vec<String>>,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sends to this recipient fail with a simulated transport
    /// error.
    pub fn fail_for(&self, to: impl Into<String>) {
        self.fail_for.lock().unwrap().push(to.into());
    }

    /// Everything sent so far (for test assertions).
    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailTransport for MemoryMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        if self.fail_for.lock().unwrap().iter().any(|t| t == to) {
            return Err(MailError::Simulated(format!("simulated failure for {to}")));
        }
        self.sent.lock().unwrap().push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}
