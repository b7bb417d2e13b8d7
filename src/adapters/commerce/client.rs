//! Commerce admin API client for discount codes.
//!
//! Creates codes under a configured price rule:
//! `POST {base_url}/price_rules/{price_rule_id}/discount_codes.json`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::config::CommerceConfig;
use crate::domain::ports::coupon_provisioner::{CouponProvisioner, CouponResult};
use crate::infrastructure::retry::{classify_status, classify_transport_error, RetryPolicy};

const SERVICE: &str = "commerce";
const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

#[derive(Debug, Serialize)]
struct DiscountCodeRequest<'a> {
    discount_code: DiscountCodeBody<'a>,
}

#[derive(Debug, Serialize)]
struct DiscountCodeBody<'a> {
    code: &'a str,
}

#[derive(Debug, Deserialize)]
struct DiscountCodeResponse {
    discount_code: DiscountCode,
}

#[derive(Debug, Deserialize)]
struct DiscountCode {
    id: serde_json::Value,
    code: String,
}

#[derive(Debug, Clone)]
pub struct HttpCouponProvisioner {
    http: Client,
    base_url: String,
    access_token: String,
    price_rule_id: String,
    retry: RetryPolicy,
}

impl HttpCouponProvisioner {
    pub fn new(
        base_url: impl Into<String>,
        access_token: impl Into<String>,
        price_rule_id: impl Into<String>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
            price_rule_id: price_rule_id.into(),
            retry,
        }
    }

    /// `None` unless base URL, token and price rule are all configured.
    pub fn from_config(config: &CommerceConfig, retry: RetryPolicy) -> Option<Self> {
        Some(Self::new(
            config.base_url.clone()?,
            config.access_token.clone()?,
            config.price_rule_id.clone()?,
            retry,
        ))
    }
}

#[async_trait]
impl CouponProvisioner for HttpCouponProvisioner {
    async fn create_discount_code(&self, influencer_id: Uuid, code: &str) -> DomainResult<CouponResult> {
        let url = format!(
            "{}/price_rules/{}/discount_codes.json",
            self.base_url, self.price_rule_id
        );
        let body = serde_json::to_value(DiscountCodeRequest {
            discount_code: DiscountCodeBody { code },
        })?;

        let created = self
            .retry
            .execute("create_discount_code", || {
                let request = self
                    .http
                    .post(&url)
                    .header(ACCESS_TOKEN_HEADER, &self.access_token)
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

                    serde_json::from_str::<DiscountCodeResponse>(&text).map_err(|e| {
                        backoff::Error::permanent(DomainError::external(
                            SERVICE,
                            format!("unexpected response: {e}"),
                        ))
                    })
                }
            })
            .await?;

        let external_id = match created.discount_code.id {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        info!(%influencer_id, code = %created.discount_code.code, %external_id, "Discount code created");

        Ok(CouponResult {
            code: created.discount_code.code,
            external_id: Some(external_id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use std::time::Duration;

    fn provisioner(base_url: &str) -> HttpCouponProvisioner {
        HttpCouponProvisioner::new(
            base_url,
            "shpat_test",
            "507328175",
            RetryPolicy::new(1, Duration::from_millis(1), Duration::from_millis(2)),
        )
    }

    #[tokio::test]
    async fn test_creates_code_under_price_rule() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/price_rules/507328175/discount_codes.json")
            .match_header("x-shopify-access-token", "shpat_test")
            .match_body(Matcher::Json(serde_json::json!({"discount_code": {"code": "ANA10"}})))
            .with_status(201)
            .with_body(r#"{"discount_code":{"id":1054381139,"price_rule_id":507328175,"code":"ANA10"}}"#)
            .create_async()
            .await;

        let result = provisioner(&server.url())
            .create_discount_code(Uuid::new_v4(), "ANA10")
            .await
            .unwrap();
        assert_eq!(result.code, "ANA10");
        assert_eq!(result.external_id.as_deref(), Some("1054381139"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_duplicate_code_fails_without_retry() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/price_rules/507328175/discount_codes.json")
            .with_status(422)
            .with_body(r#"{"errors":{"code":["must be unique"]}}"#)
            .expect(1)
            .create_async()
            .await;

        let err = provisioner(&server.url())
            .create_discount_code(Uuid::new_v4(), "ANA10")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("must be unique"));
        mock.assert_async().await;
    }

    #[test]
    fn test_from_config_requires_every_setting() {
        let mut config = CommerceConfig {
            base_url: Some("https://shop.example.com/admin/api/2024-01".to_string()),
            access_token: Some("t".to_string()),
            price_rule_id: None,
        };
        assert!(HttpCouponProvisioner::from_config(&config, RetryPolicy::none()).is_none());
        config.price_rule_id = Some("1".to_string());
        assert!(HttpCouponProvisioner::from_config(&config, RetryPolicy::none()).is_some());
    }
}
