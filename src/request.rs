use bytes::Bytes;
use reqwest::{Method, Url};

/// String-keyed JSON object used for both request and response payloads.
pub type JsonObject = serde_json::Map<String, serde_json::Value>;

/// Target, method and JSON body of one call.
#[derive(Clone, Debug, PartialEq)]
pub struct JsonRequest {
    pub url: Url,
    pub method: Method,
    pub body: JsonObject,
}

impl JsonRequest {
    pub fn new(url: Url, method: Method, body: JsonObject) -> Self {
        Self { url, method, body }
    }

    pub fn post(url: Url, body: JsonObject) -> Self {
        Self::new(url, Method::POST, body)
    }

    /// Serializes the body to compact JSON text.
    pub(crate) fn encode_body(&self) -> serde_json::Result<Bytes> {
        serde_json::to_vec(&self.body).map(Bytes::from)
    }
}
