use std::sync::Arc;
use std::time::Duration;

use tickwise_models::{DataConfig, Fundamentals, PriceSeries, TickerSymbol};

use crate::error::MarketError;
use crate::sources::MarketDataProvider;

/// Bounded attempts with a fixed pause between them. No exponential growth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// No pause between attempts. Used by tests.
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

impl From<&DataConfig> for RetryPolicy {
    fn from(config: &DataConfig) -> Self {
        Self::new(config.max_attempts, Duration::from_millis(config.retry_backoff_ms))
    }
}

/// Wraps an unreliable provider with the retry policy.
///
/// An empty series counts as a failed attempt. Running out of attempts on
/// empty answers yields [`MarketError::DataUnavailable`]; running out on
/// a hard error returns that last error unchanged.
pub struct RetryingFetcher {
    provider: Arc<dyn MarketDataProvider>,
    policy: RetryPolicy,
}

impl RetryingFetcher {
    pub fn new(provider: Arc<dyn MarketDataProvider>, policy: RetryPolicy) -> Self {
        Self { provider, policy }
    }

    pub async fn fetch_history(
        &self,
        ticker: &TickerSymbol,
        sessions: usize,
    ) -> Result<PriceSeries, MarketError> {
        let max = self.policy.max_attempts;
        let mut attempt = 0;

        loop {
            attempt += 1;
            let outcome = self.provider.fetch_history(ticker, sessions).await;
            let last = attempt >= max;

            match outcome {
                Ok(series) if !series.is_empty() => {
                    tracing::debug!(%ticker, attempt, bars = series.len(), "Fetched history");
                    return Ok(series);
                }
                Ok(_) => {
                    if last {
                        tracing::warn!(
                            %ticker,
                            provider = self.provider.name(),
                            attempts = attempt,
                            "History empty on every attempt"
                        );
                        return Err(MarketError::DataUnavailable {
                            ticker: ticker.to_string(),
                            attempts: attempt,
                        });
                    }
                    tracing::warn!(%ticker, attempt, "Empty history, retrying");
                }
                Err(e) if e.is_empty_result() => {
                    if last {
                        return Err(MarketError::DataUnavailable {
                            ticker: ticker.to_string(),
                            attempts: attempt,
                        });
                    }
                    tracing::warn!(%ticker, attempt, "Empty history, retrying");
                }
                Err(e) => {
                    if last {
                        tracing::warn!(
                            %ticker,
                            provider = self.provider.name(),
                            attempts = attempt,
                            error = %e,
                            "History fetch failed"
                        );
                        return Err(e);
                    }
                    tracing::warn!(%ticker, attempt, error = %e, "History fetch failed, retrying");
                }
            }

            tokio::time::sleep(self.policy.backoff).await;
        }
    }

    pub async fn fetch_info(&self, ticker: &TickerSymbol) -> Result<Fundamentals, MarketError> {
        let max = self.policy.max_attempts;
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.provider.fetch_info(ticker).await {
                Ok(info) => return Ok(info),
                Err(e) if attempt >= max => {
                    tracing::warn!(
                        %ticker,
                        provider = self.provider.name(),
                        attempts = attempt,
                        error = %e,
                        "Fundamentals fetch failed"
                    );
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!(%ticker, attempt, error = %e, "Fundamentals fetch failed, retrying");
                }
            }
            tokio::time::sleep(self.policy.backoff).await;
        }
    }

    /// Benchmark history for beta. One attempt only: the caller has a
    /// neutral fallback, so there is nothing to gain from waiting.
    pub async fn fetch_benchmark(
        &self,
        benchmark: &TickerSymbol,
        sessions: usize,
    ) -> Result<PriceSeries, MarketError> {
        let series = self.provider.fetch_history(benchmark, sessions).await?;
        if series.is_empty() {
            return Err(MarketError::EmptyResult(benchmark.to_string()));
        }
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_from_config() {
        let config = DataConfig {
            max_attempts: 5,
            retry_backoff_ms: 250,
            ..DataConfig::default()
        };
        let policy = RetryPolicy::from(&config);
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.backoff, Duration::from_millis(250));
    }

    #[test]
    fn default_policy_is_three_attempts_one_second() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.backoff, Duration::from_secs(1));
    }

    #[test]
    fn zero_attempts_still_tries_once() {
        assert_eq!(RetryPolicy::immediate(0).max_attempts, 1);
    }
}
