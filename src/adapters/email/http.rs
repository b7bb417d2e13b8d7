//! HTTP email API client.
//!
//! Posts rendered emails as JSON to `{base_url}/emails` with bearer
//! authentication. Sends are throttled client-side with a governor
//! rate limiter and transient failures are retried with backoff.

use std::num::NonZeroU32;
use std::sync::Arc;

use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::config::EmailConfig;
use crate::domain::ports::email_sender::{EmailReceipt, EmailSender, OutgoingEmail};
use crate::infrastructure::retry::{classify_status, classify_transport_error, RetryPolicy};

const SERVICE: &str = "email";
const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: &'a str,
    text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct SendEmailResponse {
    #[serde(default)]
    id: Option<String>,
}

pub struct HttpEmailSender {
    http: Client,
    base_url: String,
    api_key: String,
    from_address: String,
    rate_limiter: Arc<DefaultDirectRateLimiter>,
    retry: RetryPolicy,
}

impl HttpEmailSender {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        from_address: impl Into<String>,
        requests_per_second: u32,
        retry: RetryPolicy,
    ) -> Self {
        let per_second = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            from_address: from_address.into(),
            rate_limiter: Arc::new(RateLimiter::direct(Quota::per_second(per_second))),
            retry,
        }
    }

    /// Build from config; `None` when the http provider is not fully configured.
    pub fn from_config(config: &EmailConfig, retry: RetryPolicy) -> Option<Self> {
        let base_url = config.base_url.as_ref()?;
        let api_key = config.api_key.as_ref()?;
        Some(Self::new(
            base_url.clone(),
            api_key.clone(),
            config.from_address.clone(),
            config.requests_per_second,
            retry,
        ))
    }
}

#[async_trait]
impl EmailSender for HttpEmailSender {
    async fn send_email(&self, email: OutgoingEmail) -> DomainResult<EmailReceipt> {
        if email.to.trim().is_empty() {
            return Err(DomainError::invalid_value("to", "recipient address is empty"));
        }

        self.rate_limiter.until_ready().await;

        let url = format!("{}/emails", self.base_url);
        let payload = SendEmailRequest {
            from: &self.from_address,
            to: vec![email.to.as_str()],
            subject: &email.subject,
            text: &email.body,
        };
        let body = serde_json::to_value(&payload)?;
        // Every attempt carries the same key so a retried timeout is not sent twice.
        let idempotency_key = email
            .idempotency_key
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let receipt = self
            .retry
            .execute("send_email", || {
                let request = self
                    .http
                    .post(&url)
                    .bearer_auth(&self.api_key)
                    .header(IDEMPOTENCY_KEY_HEADER, idempotency_key.as_str())
                    .json(&body);
                async move {
                    let response = request
                        .send()
                        .await
                        .map_err(|e| classify_transport_error(SERVICE, &e))?;
                    let status = response.status();
                    let text = response
                        .text()
                        .await
                        .map_err(|e| classify_transport_error(SERVICE, &e))?;

                    if !status.is_success() {
                        return Err(classify_status(SERVICE, status, &text));
                    }

                    let parsed: SendEmailResponse = serde_json::from_str(&text).unwrap_or_default();
                    Ok(EmailReceipt {
                        message_id: parsed.id,
                    })
                }
            })
            .await?;

        debug!(to = %email.to, "Email accepted by provider");
        info!(message_id = ?receipt.message_id, subject = %email.subject, "Email sent");
        Ok(receipt)
    }
}
