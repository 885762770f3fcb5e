//! `jsonweb-http` sends a JSON object to an HTTP endpoint and returns the
//! JSON object it answers with.
//!
//! A call is a bounded sequence of attempts:
//! - [`JsonWebClient::call`] retries transport failures immediately, up to
//!   [`ClientOptions::max_attempts`]
//! - [`JsonWebClient::execute_once`] performs a single attempt
//!
//! Every failure is one of the [`JsonWebError`] kinds.

mod attempt;
mod client;
mod error;
mod options;
mod request;
mod transport;

pub use async_trait::async_trait;
pub use client::JsonWebClient;
pub use error::{BoxError, JsonWebError, TransportError};
pub use options::ClientOptions;
pub use request::{JsonObject, JsonRequest};
pub use reqwest::{Method, StatusCode, Url};
pub use transport::{BodyStream, OutboundRequest, RawResponse, ReqwestTransport, Transport};

pub type Result<T> = std::result::Result<T, JsonWebError>;
