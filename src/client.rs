use std::{fmt, sync::Arc, time::Duration};

use reqwest::{Method, Url};

use crate::{
    attempt::execute_once, ClientOptions, JsonObject, JsonRequest, JsonWebError, ReqwestTransport,
    Result, Transport,
};

#[derive(Clone)]
/// Sends JSON requests and retries transport failures.
pub struct JsonWebClient {
    transport: Arc<dyn Transport>,
    default_transport: bool,
    options: ClientOptions,
}

impl fmt::Debug for JsonWebClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonWebClient")
            .field("transport", &"<dyn Transport>")
            .field("options", &self.options)
            .finish()
    }
}

impl Default for JsonWebClient {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonWebClient {
    /// Creates a client backed by `reqwest` with default options.
    pub fn new() -> Self {
        let options = ClientOptions::default();
        Self {
            transport: Arc::new(ReqwestTransport::new(Duration::from_millis(
                options.timeout_ms,
            ))),
            default_transport: true,
            options,
        }
    }

    /// Creates a client backed by a custom [`Transport`].
    ///
    /// [`ClientOptions::timeout_ms`] is not applied to custom transports.
    pub fn with_transport(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Arc::new(transport),
            default_transport: false,
            options: ClientOptions::default(),
        }
    }

    /// Applies client options such as attempt budget and timeout.
    ///
    /// When the client uses the default `reqwest` transport, the transport is
    /// rebuilt with the new timeout.
    pub fn with_options(mut self, opts: ClientOptions) -> Self {
        if self.default_transport && opts.timeout_ms != self.options.timeout_ms {
            self.transport = Arc::new(ReqwestTransport::new(Duration::from_millis(
                opts.timeout_ms,
            )));
        }
        self.options = opts;
        self
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Sends `body` to `url` with `method` and returns the parsed JSON object.
    pub async fn send(&self, url: Url, method: Method, body: JsonObject) -> Result<JsonObject> {
        self.call(&JsonRequest::new(url, method, body)).await
    }

    /// Performs the request, retrying immediately on transport failures.
    ///
    /// Status, body read and body parse failures are returned on first
    /// occurrence. If every attempt fails in transport,
    /// [`JsonWebError::AllAttemptsFailed`] is returned with the last
    /// transport failure as its source.
    pub async fn call(&self, request: &JsonRequest) -> Result<JsonObject> {
        let max_attempts = self.options.max_attempts;
        let mut attempts = 0u32;
        let mut last = None;

        while attempts < max_attempts {
            attempts += 1;
            match execute_once(
                self.transport.as_ref(),
                request,
                self.options.log_response_body,
            )
            .await
            {
                Err(JsonWebError::Transport(err)) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(
                        url = %request.url,
                        method = %request.method,
                        attempt = attempts,
                        max_attempts,
                        error = %err,
                        "transport failure"
                    );
                    last = Some(err);
                }
                outcome => return outcome,
            }
        }

        #[cfg(feature = "tracing")]
        tracing::warn!(
            url = %request.url,
            method = %request.method,
            attempts,
            "all attempts failed"
        );

        Err(JsonWebError::AllAttemptsFailed {
            url: request.url.clone(),
            method: request.method.clone(),
            attempts,
            last,
        })
    }

    /// Performs exactly one attempt without retrying.
    ///
    /// Transport failures are returned as [`JsonWebError::Transport`].
    pub async fn execute_once(&self, request: &JsonRequest) -> Result<JsonObject> {
        execute_once(self.transport.as_ref(), request, self.options.log_response_body).await
    }
}
