//! Pipeline tuning from environment variables.

use std::env;
use std::time::Duration;

/// Default per-call timeout for backend requests, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Default cap on concurrent image requests within one fan-out.
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// Settings shared by the generation client and the enrichers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Upper bound for each backend call. `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
    /// Maximum in-flight requests per fan-out. 0 means unbounded.
    pub max_concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            request_timeout: Some(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

impl PipelineConfig {
    /// Load settings from environment variables.
    ///
    /// Optional:
    /// - `INGREAI_REQUEST_TIMEOUT_SECS`: per-call timeout (default: 60, 0 disables)
    /// - `INGREAI_MAX_CONCURRENCY`: fan-out width (default: 8, 0 means unbounded)
    pub fn from_env() -> Self {
        let request_timeout_secs = env::var("INGREAI_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        let max_concurrency = env::var("INGREAI_MAX_CONCURRENCY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_CONCURRENCY);

        Self {
            request_timeout: (request_timeout_secs > 0)
                .then(|| Duration::from_secs(request_timeout_secs)),
            max_concurrency,
        }
    }

    /// Number of requests to keep in flight for a fan-out over `len` items.
    pub fn fan_out_width(&self, len: usize) -> usize {
        match self.max_concurrency {
            0 => len.max(1),
            cap => cap,
        }
    }
}
