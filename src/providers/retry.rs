//! Retry decorator
//!
//! Wraps any `TextGenerator` with exponential backoff. Layered on top of the
//! adapters so each adapter call stays a single outbound request.

use super::{GenerationParams, InvocationError, TextGenerator};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Retry configuration
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum retry attempts
    pub max_retries: u32,
    /// Base delay time (milliseconds)
    pub base_delay_ms: u64,
    /// Maximum delay time (milliseconds)
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 0,
            base_delay_ms: 500,
            max_delay_ms: 10000,
        }
    }
}

impl RetryConfig {
    /// Backoff before retry number `attempt` (0-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2_u64.saturating_pow(attempt);
        let delay = self.base_delay_ms.saturating_mul(factor).min(self.max_delay_ms);
        Duration::from_millis(delay)
    }
}

/// Generator wrapper with retry functionality
pub struct RetryingGenerator {
    inner: Arc<dyn TextGenerator>,
    retry_config: RetryConfig,
}

impl RetryingGenerator {
    pub fn new(inner: Arc<dyn TextGenerator>, retry_config: RetryConfig) -> Self {
        Self { inner, retry_config }
    }
}

#[async_trait]
impl TextGenerator for RetryingGenerator {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn has_credential(&self) -> bool {
        self.inner.has_credential()
    }

    async fn generate(
        &self,
        system: &str,
        user: &str,
        params: &GenerationParams,
    ) -> Result<String, InvocationError> {
        let mut attempt = 0;

        loop {
            match self.inner.generate(system, user, params).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_retryable() && attempt < self.retry_config.max_retries => {
                    let delay = self.retry_config.delay_for(attempt);
                    warn!(
                        "Provider call failed: {}, retrying after {}ms (attempt {}/{})",
                        e,
                        delay.as_millis(),
                        attempt + 1,
                        self.retry_config.max_retries
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
