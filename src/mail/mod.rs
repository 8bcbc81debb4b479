//! Outgoing email for DriveClone.
//!
//! Account lifecycle messages (activation, password reset) are handed to a
//! [`Mailer`]. Production uses SMTP; when mail is disabled the messages are
//! only logged so links can be picked up from the server output.

mod smtp;
mod templates;

pub use smtp::{install_crypto_provider, SmtpMailer};
pub use templates::{activation_email, password_reset_email};

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::config::MailConfig;
use crate::Result;

/// A rendered message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Plain text body.
    pub text: String,
    /// HTML body.
    pub html: String,
}

/// Delivers outgoing mail.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send a single message. Delivery failures map to `DriveError::Upstream`.
    async fn send(&self, mail: &OutgoingMail) -> Result<()>;
}

/// Mailer that writes messages to the log instead of sending them.
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<()> {
        info!(to = %mail.to, subject = %mail.subject, "Mail delivery disabled, logging message");
        info!("{}", mail.text);
        Ok(())
    }
}

/// Build the mailer selected by configuration.
pub fn from_config(config: &MailConfig) -> Arc<dyn Mailer> {
    if config.enabled {
        info!(host = %config.host, port = config.port, "Using SMTP mailer");
        Arc::new(SmtpMailer::new(config.clone()))
    } else {
        info!("Mail delivery disabled, using log mailer");
        Arc::new(LogMailer)
    }
}
