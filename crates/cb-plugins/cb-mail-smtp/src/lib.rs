//! # cb-mail-smtp
//!
//! SMTP implementation of `Mailer`, built on lettre.
//! Delivery is blocking, so each send runs on tokio's blocking pool.

use anyhow::Context;
use async_trait::async_trait;
use cb_core::mail::{MailAttachment, OutgoingMail};
use cb_core::traits::Mailer;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use secrecy::{ExposeSecret, SecretString};

pub struct SmtpMailer {
    transport: SmtpTransport,
    from: Mailbox,
}

impl SmtpMailer {
    /// Connects lazily; nothing touches the network until the first send.
    /// The connection is upgraded with STARTTLS.
    pub fn new(
        host: &str,
        port: u16,
        user: &str,
        password: &SecretString,
        from: &str,
    ) -> anyhow::Result<Self> {
        let credentials = Credentials::new(user.to_owned(), password.expose_secret().to_owned());
        let transport = SmtpTransport::starttls_relay(host)
            .with_context(|| format!("configuring SMTP relay {host}"))?
            .port(port)
            .credentials(credentials)
            .build();
        let from = from
            .parse()
            .with_context(|| format!("invalid sender address {from:?}"))?;
        Ok(Self { transport, from })
    }

    async fn build_message(&self, mail: OutgoingMail) -> anyhow::Result<Message> {
        let builder = Message::builder()
            .from(self.from.clone())
            .to(mail
                .to
                .parse()
                .with_context(|| format!("invalid recipient address {:?}", mail.to))?)
            .subject(mail.subject);

        let message = match mail.attachment {
            None => builder.header(ContentType::TEXT_PLAIN).body(mail.body)?,
            Some(attachment) => {
                let file = attachment_part(attachment).await?;
                builder.multipart(
                    MultiPart::mixed()
                        .singlepart(SinglePart::plain(mail.body))
                        .singlepart(file),
                )?
            }
        };
        Ok(message)
    }
}

async fn attachment_part(attachment: MailAttachment) -> anyhow::Result<SinglePart> {
    let bytes = tokio::fs::read(&attachment.path)
        .await
        .with_context(|| format!("reading attachment {}", attachment.path.display()))?;
    let mime = mime_guess::from_path(&attachment.file_name).first_or_octet_stream();
    let content_type = ContentType::parse(mime.as_ref())
        .map_err(|e| anyhow::anyhow!("content type {mime}: {e}"))?;
    Ok(Attachment::new(attachment.file_name).body(bytes, content_type))
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, mail: OutgoingMail) -> anyhow::Result<()> {
        let recipient = mail.to.clone();
        let message = self.build_message(mail).await?;
        let transport = self.transport.clone();
        tokio::task::spawn_blocking(move || transport.send(&message))
            .await
            .context("mail task panicked")?
            .with_context(|| format!("delivering mail to {recipient}"))?;
        log::debug!("mail delivered to {recipient}");
        Ok(())
    }
}
