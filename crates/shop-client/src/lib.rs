use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use shop_types::domain::entity::EntityId;
use shop_types::ports::upstream::{
    PaymentGateway, PaymentRequest, UpstreamError, UserDataCleanup,
};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

#[derive(Clone)]
pub struct ServiceClientBuilder {
    base: Url,
    headers: HeaderMap,
    timeout: Duration,
    client: Option<reqwest::Client>,
}

/// HTTP client for a peer service's `/api` surface. Every request carries
/// the configured timeout, also when the `reqwest::Client` was supplied.
#[derive(Clone)]
pub struct ServiceClient {
    base: Url,
    client: reqwest::Client,
    timeout: Duration,
}

impl ServiceClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        Self::builder(base_url)?.build()
    }

    pub fn builder(base_url: &str) -> anyhow::Result<ServiceClientBuilder> {
        // Without a trailing slash `join` would drop the last path segment.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base = Url::parse(&normalized).context("invalid base url")?;
        Ok(ServiceClientBuilder {
            base,
            headers: HeaderMap::new(),
            timeout: DEFAULT_TIMEOUT,
            client: None,
        })
    }

    fn url(&self, path: &str) -> Result<Url, UpstreamError> {
        self.base
            .join(path)
            .map_err(|e| UpstreamError::Transport(format!("failed to join url: {e}")))
    }

    /// POST `api/payments`. Only `201 Created` counts as accepted.
    pub async fn create_payment(&self, req: &PaymentRequest) -> Result<(), UpstreamError> {
        let url = self.url("api/payments")?;
        let res = self
            .client
            .post(url.clone())
            .timeout(self.timeout)
            .header(IDEMPOTENCY_HEADER, req.idempotency_key())
            .json(req)
            .send()
            .await
            .map_err(transport)?;
        expect_status(res.status(), &[StatusCode::CREATED], &url)
    }

    /// DELETE `api/{resource}/user/{user_id}`.
    pub async fn delete_user_records(
        &self,
        resource: &str,
        user_id: EntityId,
    ) -> Result<(), UpstreamError> {
        let url = self.url(&format!("api/{resource}/user/{user_id}"))?;
        let res = self
            .client
            .delete(url.clone())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(transport)?;
        expect_status(
            res.status(),
            &[StatusCode::OK, StatusCode::NO_CONTENT],
            &url,
        )
    }

    pub async fn list_user_records<T: DeserializeOwned>(
        &self,
        resource: &str,
        user_id: EntityId,
    ) -> anyhow::Result<Vec<T>> {
        let res = self
            .client
            .get(self.url(&format!("api/{resource}/user/{user_id}"))?)
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }
}

fn transport(err: reqwest::Error) -> UpstreamError {
    UpstreamError::Transport(err.to_string())
}

fn expect_status(status: StatusCode, accepted: &[StatusCode], url: &Url) -> Result<(), UpstreamError> {
    if accepted.contains(&status) {
        Ok(())
    } else {
        Err(UpstreamError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        })
    }
}

impl ServiceClientBuilder {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_header(
        mut self,
        key: impl AsRef<str>,
        value: impl AsRef<str>,
    ) -> anyhow::Result<Self> {
        let header_name =
            HeaderName::from_bytes(key.as_ref().as_bytes()).context("invalid header name")?;
        let header_value = HeaderValue::from_str(value.as_ref()).context("invalid header value")?;
        self.headers.insert(header_name, header_value);
        Ok(self)
    }

    /// Use `client` as is. Headers set on the builder are not applied to it;
    /// the timeout still is.
    pub fn with_reqwest_client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    pub fn build(self) -> anyhow::Result<ServiceClient> {
        if let Some(client) = self.client {
            return Ok(ServiceClient {
                base: self.base,
                client,
                timeout: self.timeout,
            });
        }

        let mut builder = reqwest::Client::builder().timeout(self.timeout);
        if !self.headers.is_empty() {
            builder = builder.default_headers(self.headers);
        }
        let client = builder.build()?;
        Ok(ServiceClient {
            base: self.base,
            client,
            timeout: self.timeout,
        })
    }
}

#[async_trait]
impl PaymentGateway for ServiceClient {
    async fn request_payment(&self, request: &PaymentRequest) -> Result<(), UpstreamError> {
        self.create_payment(request).await
    }
}

/// Fans a user deletion out to every service that keeps user-owned records.
pub struct UserCascade {
    targets: Vec<(String, ServiceClient)>,
}

impl UserCascade {
    pub fn new() -> Self {
        Self {
            targets: Vec::new(),
        }
    }

    pub fn with_target(mut self, resource: impl Into<String>, client: ServiceClient) -> Self {
        self.targets.push((resource.into(), client));
        self
    }

    pub fn resources(&self) -> impl Iterator<Item = &str> {
        self.targets.iter().map(|(resource, _)| resource.as_str())
    }
}

impl Default for UserCascade {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserDataCleanup for UserCascade {
    /// Every target is attempted; the first failure is reported.
    async fn purge_user(&self, user_id: EntityId) -> Result<(), UpstreamError> {
        let mut first_err = None;
        for (resource, client) in &self.targets {
            match client.delete_user_records(resource, user_id).await {
                Ok(()) => tracing::debug!(resource = %resource, user_id, "purged user records"),
                Err(err) => {
                    tracing::warn!(resource = %resource, user_id, error = %err, "purge failed");
                    first_err.get_or_insert(err);
                }
            }
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
