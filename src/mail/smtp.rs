//! SMTP delivery.

use async_trait::async_trait;
use mail_builder::MessageBuilder;
use mail_send::SmtpClientBuilder;
use tracing::{debug, warn};

use super::{Mailer, OutgoingMail};
use crate::config::MailConfig;
use crate::{DriveError, Result};

/// Mailer that opens an SMTP connection per message.
///
/// Without implicit TLS the connection is upgraded with STARTTLS.
#[derive(Debug, Clone)]
pub struct SmtpMailer {
    config: MailConfig,
}

impl SmtpMailer {
    /// Create a mailer for the configured relay.
    pub fn new(config: MailConfig) -> Self {
        install_crypto_provider();
        Self { config }
    }
}

/// Install the process-wide rustls provider used by STARTTLS and implicit TLS.
///
/// Safe to call repeatedly; an already installed provider is kept.
pub fn install_crypto_provider() {
    if rustls::crypto::CryptoProvider::get_default().is_none() {
        // Lost race with another installer; either provider works.
        let _ = rustls::crypto::ring::default_provider().install_default();
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<()> {
        let message = MessageBuilder::new()
            .from((
                self.config.from_name.as_str(),
                self.config.from_address.as_str(),
            ))
            .to(mail.to.as_str())
            .subject(mail.subject.as_str())
            .text_body(mail.text.as_str())
            .html_body(mail.html.as_str());

        let mut builder = SmtpClientBuilder::new(self.config.host.clone(), self.config.port)
            .implicit_tls(self.config.implicit_tls);
        if !self.config.username.is_empty() {
            builder = builder.credentials((
                self.config.username.clone(),
                self.config.password.clone(),
            ));
        }

        let result = async {
            builder.connect().await?.send(message).await?;
            Ok::<_, mail_send::Error>(())
        }
        .await;

        match result {
            Ok(()) => {
                debug!(to = %mail.to, subject = %mail.subject, "Mail sent");
                Ok(())
            }
            Err(e) => {
                warn!(to = %mail.to, error = %e, "Mail delivery failed");
                Err(DriveError::Upstream(format!("mail delivery failed: {e}")))
            }
        }
    }
}
