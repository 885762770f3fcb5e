use std::{fmt, pin::Pin, time::Duration};

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{Stream, StreamExt, TryStreamExt};
use reqwest::{header, Method, StatusCode, Url};

use crate::{error::BoxError, TransportError};

/// Response body as a stream of chunks.
pub type BodyStream = Pin<Box<dyn Stream<Item = Result<Bytes, BoxError>> + Send>>;

pub(crate) const JSON_CONTENT_TYPE: &str = "application/json";

/// A fully built request handed to a [`Transport`].
#[derive(Clone, Debug)]
pub struct OutboundRequest {
    pub url: Url,
    pub method: Method,
    /// Media type of `content`; always `application/json` for this crate.
    pub content_type: &'static str,
    pub content: Bytes,
}

/// Response head plus an unread body.
pub struct RawResponse {
    pub status: StatusCode,
    /// Declared character encoding of the body, if any.
    pub content_encoding: Option<String>,
    pub body: BodyStream,
}

impl RawResponse {
    /// Builds a response whose body is a single in-memory chunk.
    pub fn from_bytes(
        status: StatusCode,
        content_encoding: Option<String>,
        body: impl Into<Bytes>,
    ) -> Self {
        let chunk: Result<Bytes, BoxError> = Ok(body.into());
        Self {
            status,
            content_encoding,
            body: futures_util::stream::once(async move { chunk }).boxed(),
        }
    }
}

impl fmt::Debug for RawResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawResponse")
            .field("status", &self.status)
            .field("content_encoding", &self.content_encoding)
            .field("body", &"<stream>")
            .finish()
    }
}

/// Performs a single HTTP exchange.
///
/// Implementations must report every failure to deliver the request or to
/// receive the response head as a [`TransportError`]; the body stream carries
/// its own errors.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: OutboundRequest) -> Result<RawResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn send(&self, request: OutboundRequest) -> Result<RawResponse, TransportError> {
        (**self).send(request).await
    }
}

/// [`Transport`] backed by `reqwest`.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    http: reqwest::Client,
    timeout: Duration,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Self {
        Self::with_client(reqwest::Client::new(), timeout)
    }

    /// Uses a caller-configured `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, timeout: Duration) -> Self {
        Self { http, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: OutboundRequest) -> Result<RawResponse, TransportError> {
        let response = self
            .http
            .request(request.method, request.url)
            .header(header::CONTENT_TYPE, request.content_type)
            .timeout(self.timeout)
            .body(request.content)
            .send()
            .await?;

        let content_encoding = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(charset_param);

        Ok(RawResponse {
            status: response.status(),
            content_encoding,
            body: response
                .bytes_stream()
                .map_err(|err| Box::new(err) as BoxError)
                .boxed(),
        })
    }
}

/// Extracts the `charset` parameter of a `Content-Type` value.
fn charset_param(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        if !name.trim().eq_ignore_ascii_case("charset") {
            return None;
        }
        let value = value.trim().trim_matches('"');
        (!value.is_empty()).then(|| value.to_owned())
    })
}

#[cfg(test)]
mod tests {
    use super::charset_param;

    #[test]
    fn charset_param_reads_declared_charset() {
        assert_eq!(
            charset_param("application/json; charset=ISO-8859-1").as_deref(),
            Some("ISO-8859-1")
        );
        assert_eq!(
            charset_param("text/plain;CHARSET=\"utf-16le\"").as_deref(),
            Some("utf-16le")
        );
    }

    #[test]
    fn charset_param_absent() {
        assert_eq!(charset_param("application/json"), None);
        assert_eq!(charset_param("application/json; boundary=x"), None);
        assert_eq!(charset_param("application/json; charset="), None);
    }
}
