use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    application::use_cases::email::{MailTransport, OutboundEmail, SenderIdentity, TransportError},
    infra::http_client,
};

/// Sends through the Resend HTTP API with the process-wide account key.
#[derive(Clone)]
pub struct ResendMailTransport {
    client: Client,
    api_key: SecretString,
    api_url: Url,
}

impl ResendMailTransport {
    pub fn new(api_key: SecretString, api_url: Url) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: http_client::try_build_client()?,
            api_key,
            api_url,
        })
    }
}

#[derive(Serialize)]
struct ResendReq<'a> {
    from: &'a str,
    to: Vec<String>,
    subject: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    html: Option<&'a str>,
}

#[derive(Deserialize)]
struct ResendResp {
    id: String,
}

fn request_body<'a>(
    from: &'a str,
    email: &'a OutboundEmail,
) -> Result<ResendReq<'a>, TransportError> {
    Ok(ResendReq {
        from,
        to: email
            .recipients()?
            .iter()
            .map(ToString::to_string)
            .collect(),
        subject: &email.subject,
        text: email.text.as_deref(),
        html: email.html.as_deref(),
    })
}

#[async_trait]
impl MailTransport for ResendMailTransport {
    async fn send(
        &self,
        sender: &SenderIdentity,
        email: &OutboundEmail,
    ) -> Result<String, TransportError> {
        let from = sender.mailbox();
        let body = request_body(&from, email)?;

        let response = self
            .client
            .post(self.api_url.clone())
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| TransportError::new(format!("Failed to send email: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(TransportError::new(format!(
                "Email API error ({status}): {detail}"
            )));
        }

        let parsed: ResendResp = response
            .json()
            .await
            .map_err(|e| TransportError::new(format!("Unexpected email API response: {e}")))?;
        Ok(parsed.id)
    }
}
