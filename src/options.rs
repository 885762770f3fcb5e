/// Configures attempt budget, transport timeout and diagnostics.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClientOptions {
    /// Maximum number of attempts per call, including the first one.
    ///
    /// `0` makes no attempt at all and fails immediately.
    pub max_attempts: u32,
    /// Per-request timeout in milliseconds, applied by [`ReqwestTransport`].
    ///
    /// [`ReqwestTransport`]: crate::ReqwestTransport
    pub timeout_ms: u64,
    /// Emit the raw response body as a debug event (requires the `tracing` feature).
    pub log_response_body: bool,
}

impl ClientOptions {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
            timeout_ms: 10_000,
            log_response_body: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ClientOptions;

    #[test]
    fn defaults_to_three_attempts() {
        let opts = ClientOptions::default();
        assert_eq!(opts.max_attempts, 3);
        assert_eq!(opts.timeout_ms, 10_000);
        assert!(!opts.log_response_body);
    }

    #[test]
    fn with_max_attempts_keeps_other_fields() {
        let opts = ClientOptions {
            timeout_ms: 250,
            ..ClientOptions::default()
        }
        .with_max_attempts(0);
        assert_eq!(opts.max_attempts, 0);
        assert_eq!(opts.timeout_ms, 250);
    }
}
