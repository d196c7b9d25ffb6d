//! Record submission
//!
//! The workflow only sees the [`Submit`] trait. [`SyncSubmitter`] is the
//! production implementation: it drives the async [`SubmitClient`] to
//! completion on a current-thread runtime, so callers stay synchronous.
//!
//! ## Configuration
//!
//! The endpoint defaults to the public collection service and can be
//! overridden in `~/.config/cxms-report/config.toml`:
//!
//! ```toml
//! [endpoint]
//! base_url = "https://collect.example.com"
//! table = "cxms_telemetry"
//! api_key = "anon-key"
//! ```

mod client;

pub use client::SubmitClient;

use crate::config::EndpointConfig;
use crate::error::{Error, Result};
use crate::types::MetricsRecord;

/// Sends one finished record somewhere.
pub trait Submit {
    fn submit(&mut self, record: &MetricsRecord) -> Result<()>;
}

/// Blocking wrapper around [`SubmitClient`]
pub struct SyncSubmitter {
    inner: SubmitClient,
    runtime: tokio::runtime::Runtime,
}

impl SyncSubmitter {
    pub fn new(config: &EndpointConfig) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::Submit(format!("failed to create runtime: {}", e)))?;

        Ok(Self {
            inner: SubmitClient::new(config)?,
            runtime,
        })
    }
}

impl Submit for SyncSubmitter {
    fn submit(&mut self, record: &MetricsRecord) -> Result<()> {
        tracing::info!(url = %self.inner.insert_url(), "Submitting record");
        self.runtime.block_on(self.inner.submit(record))
    }
}
