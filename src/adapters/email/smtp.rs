use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, MultiPart, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use secrecy::{ExposeSecret, SecretString};
use uuid::Uuid;

use crate::application::use_cases::email::{
    MailTransport, OutboundEmail, SenderIdentity, TransportError,
};

/// Sends through an authenticated SMTP relay (Gmail by default).
pub struct SmtpMailTransport {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailTransport {
    /// Connections are opened lazily, so this only fails on a bad host name.
    pub fn new(
        host: &str,
        username: String,
        password: &SecretString,
    ) -> Result<Self, lettre::transport::smtp::Error> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(host)?
            .credentials(Credentials::new(
                username,
                password.expose_secret().to_string(),
            ))
            .build();
        Ok(Self { transport })
    }
}

/// Build the MIME message. A text+html pair becomes multipart/alternative.
pub fn build_message(
    sender: &SenderIdentity,
    email: &OutboundEmail,
    message_id: &str,
) -> Result<Message, TransportError> {
    let from = Mailbox::new(
        Some(sender.name.clone()),
        sender
            .address
            .parse()
            .map_err(|e| TransportError::new(format!("Invalid sender address: {e}")))?,
    );

    let mut builder = Message::builder()
        .from(from)
        .subject(email.subject.clone())
        .message_id(Some(message_id.to_string()));

    for mailbox in email.recipients()? {
        builder = builder.to(mailbox);
    }

    let message = match (&email.text, &email.html) {
        (Some(text), Some(html)) => {
            builder.multipart(MultiPart::alternative_plain_html(text.clone(), html.clone()))
        }
        (Some(text), None) => builder.header(ContentType::TEXT_PLAIN).body(text.clone()),
        (None, Some(html)) => builder.header(ContentType::TEXT_HTML).body(html.clone()),
        (None, None) => return Err(TransportError::new("Message has no body")),
    };

    message.map_err(|e| TransportError::new(e.to_string()))
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    async fn send(
        &self,
        sender: &SenderIdentity,
        email: &OutboundEmail,
    ) -> Result<String, TransportError> {
        let message_id = format!("<{}@{}>", Uuid::new_v4(), sender.domain());
        let message = build_message(sender, email, &message_id)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| TransportError::new(e.to_string()))?;

        Ok(message_id)
    }
}
