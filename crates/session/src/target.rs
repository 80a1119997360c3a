//! Delivery targets for tag payloads

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, info};
use url::Url;

use crate::error::DeliveryError;

/// Receives the payload of every tag read
#[async_trait]
pub trait DeliveryTarget: Send + Sync {
    /// Deliver one payload
    ///
    /// Called once per successful read. Failures are logged by the caller and
    /// not retried.
    async fn dispatch(&self, payload: &[u8]) -> Result<(), DeliveryError>;
}

#[async_trait]
impl<T: DeliveryTarget + ?Sized> DeliveryTarget for Box<T> {
    async fn dispatch(&self, payload: &[u8]) -> Result<(), DeliveryError> {
        (**self).dispatch(payload).await
    }
}

/// POSTs payloads to an HTTP endpoint
#[derive(Debug, Clone)]
pub struct HttpTarget {
    client: reqwest::Client,
    url: Url,
    headers: HeaderMap,
}

impl HttpTarget {
    /// Create a target posting to `url` with extra `headers`
    ///
    /// The body is sent as `application/octet-stream` unless a
    /// `Content-Type` header is configured. A request not completed within
    /// `timeout` fails.
    pub fn new<I, K, V>(
        url: Url,
        headers: I,
        timeout: Duration,
    ) -> Result<Self, DeliveryError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            let (name, value) = (name.as_ref(), value.as_ref());
            let invalid = |reason: String| DeliveryError::InvalidHeader {
                name: name.to_string(),
                reason,
            };
            let header_name =
                HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid(e.to_string()))?;
            let header_value = HeaderValue::from_str(value).map_err(|e| invalid(e.to_string()))?;
            map.insert(header_name, header_value);
        }

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            url,
            headers: map,
        })
    }

    /// Endpoint payloads are posted to
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Headers attached to every request
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

#[async_trait]
impl DeliveryTarget for HttpTarget {
    async fn dispatch(&self, payload: &[u8]) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(self.url.clone())
            .header(CONTENT_TYPE, "application/octet-stream")
            .headers(self.headers.clone())
            .body(payload.to_vec())
            .send()
            .await?
            .error_for_status()?;

        debug!(url = %self.url, status = %response.status(), "Payload delivered");
        Ok(())
    }
}

/// Logs payloads instead of delivering them
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTarget;

#[async_trait]
impl DeliveryTarget for LogTarget {
    async fn dispatch(&self, payload: &[u8]) -> Result<(), DeliveryError> {
        info!(len = payload.len(), payload = %hex::encode_upper(payload), "Tag contents");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[test]
    fn test_http_target_headers() {
        let url = Url::parse("http://localhost:8080/tags").unwrap();
        let target = HttpTarget::new(
            url.clone(),
            [("Authorization", "Bearer token"), ("X-Reader", "Reader A")],
            TIMEOUT,
        )
        .unwrap();

        assert_eq!(target.url(), &url);
        assert_eq!(target.headers().len(), 2);
        assert_eq!(target.headers()["x-reader"], "Reader A");
    }

    #[test]
    fn test_http_target_rejects_invalid_header() {
        let url = Url::parse("http://localhost:8080/tags").unwrap();
        let err = HttpTarget::new(url.clone(), [("Bad Header", "value")], TIMEOUT).unwrap_err();
        assert!(matches!(
            err,
            DeliveryError::InvalidHeader { ref name, .. } if name == "Bad Header"
        ));

        let err = HttpTarget::new(url, [("X-Reader", "line\nbreak")], TIMEOUT).unwrap_err();
        assert!(matches!(err, DeliveryError::InvalidHeader { .. }));
    }

    #[tokio::test]
    async fn test_log_target_accepts_payload() {
        LogTarget.dispatch(&[0x03, 0x0C, 0xD1, 0x01]).await.unwrap();
    }

    #[tokio::test]
    async fn test_http_target_reports_unreachable_endpoint() {
        // Port 9 (discard) on loopback is closed on test hosts
        let url = Url::parse("http://127.0.0.1:9/tags").unwrap();
        let target = HttpTarget::new(url, std::iter::empty::<(&str, &str)>(), TIMEOUT).unwrap();
        assert!(matches!(
            target.dispatch(&[0x01]).await,
            Err(DeliveryError::Http(_))
        ));
    }

    #[tokio::test]
    async fn test_http_target_times_out_on_silent_endpoint() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept and hold connections without ever answering
        let server = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((stream, _)) = listener.accept().await {
                held.push(stream);
            }
        });

        let url = Url::parse(&format!("http://{addr}/tags")).unwrap();
        let target = HttpTarget::new(
            url,
            std::iter::empty::<(&str, &str)>(),
            Duration::from_millis(100),
        )
        .unwrap();

        let result = tokio::time::timeout(Duration::from_secs(5), target.dispatch(&[0x01]))
            .await
            .expect("request should time out on its own");
        match result {
            Err(DeliveryError::Http(e)) => assert!(e.is_timeout()),
            other => panic!("unexpected result: {other:?}"),
        }
        server.abort();
    }
}
