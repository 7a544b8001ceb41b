//! Scorer configuration: defaults, builder, and environment loading
//!
//! ## Table of Contents
//! - **ScorerConfig**: the full configuration surface (spec §6)
//! - **ScorerConfigBuilder**: fluent construction, mirroring `ForgeBuilder`
//! - **ScorerConfig::from_env**: read `SCORER_*` environment variables

use crate::error::{Result, ScorerError};
use crate::resilience::circuit_breaker::CircuitBreakerConfig;
use crate::resilience::retry::RetryConfig;
use std::time::Duration;

const DEFAULT_AHP_URL: &str = "http://172.18.0.1:6000/distribution_score";
const DEFAULT_UPDATER_URL: &str = "http://172.18.0.1:6001/weights";
const DEFAULT_CRITERIA_PROFILE: &str = "balance";
const DEFAULT_ZERO_MULTIPLIER: u64 = 1000;
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_ENUMERATION_CEILING: u64 = 1_000_000;

/// Complete scorer configuration (SPEC_FULL §10.3).
#[derive(Debug, Clone)]
pub struct ScorerConfig {
    /// AHP evaluator endpoint, e.g. `http://172.18.0.1:6000/distribution_score`
    pub ahp_url: String,
    /// Weights updater sink endpoint, e.g. `http://172.18.0.1:6001/weights`
    pub updater_url: String,
    /// Named criteria profile (`balance`, `cost30`, `utilization50`, ...)
    pub criteria_profile: String,
    /// Multiplier applied to non-zero clusters under the zero-replica preservation rule
    pub zero_preservation_multiplier: u64,
    /// Timeout applied to both the AHP client and the weight publisher
    pub http_timeout: Duration,
    /// Retry policy shared by the AHP client and weight publisher
    pub retry: RetryConfig,
    /// Circuit breaker tuning shared by the AHP client and weight publisher
    pub circuit_breaker: CircuitBreakerConfig,
    /// Upper bound on the number of allocations a single decision may enumerate
    pub enumeration_ceiling: u64,
    /// Use the embedded ratio-scale evaluator instead of the remote AHP client
    pub use_local_ahp: bool,
    /// Node identity used in tracing spans and metrics labels
    pub node_name: String,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            ahp_url: DEFAULT_AHP_URL.to_string(),
            updater_url: DEFAULT_UPDATER_URL.to_string(),
            criteria_profile: DEFAULT_CRITERIA_PROFILE.to_string(),
            zero_preservation_multiplier: DEFAULT_ZERO_MULTIPLIER,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            retry: RetryConfig::default(),
            circuit_breaker: CircuitBreakerConfig::default(),
            enumeration_ceiling: DEFAULT_ENUMERATION_CEILING,
            use_local_ahp: false,
            node_name: hostname::get()
                .map(|h| h.to_string_lossy().to_string())
                .unwrap_or_else(|_| "scorer-node".to_string()),
        }
    }
}

impl ScorerConfig {
    /// Read configuration from `SCORER_*` environment variables, falling back to
    /// [`ScorerConfig::default`] for anything unset.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("SCORER_AHP_URL") {
            config.ahp_url = url;
        }
        if let Ok(url) = std::env::var("SCORER_UPDATER_URL") {
            config.updater_url = url;
        }
        if let Ok(profile) = std::env::var("SCORER_CRITERIA_PROFILE") {
            config.criteria_profile = profile;
        }
        if let Ok(raw) = std::env::var("SCORER_ZERO_MULTIPLIER") {
            config.zero_preservation_multiplier = raw
                .parse()
                .map_err(|_| ScorerError::config(format!("invalid SCORER_ZERO_MULTIPLIER: {raw}")))?;
        }
        if let Ok(raw) = std::env::var("SCORER_HTTP_TIMEOUT_MS") {
            let ms: u64 = raw
                .parse()
                .map_err(|_| ScorerError::config(format!("invalid SCORER_HTTP_TIMEOUT_MS: {raw}")))?;
            config.http_timeout = Duration::from_millis(ms);
        }
        if let Ok(raw) = std::env::var("SCORER_ENUMERATION_CEILING") {
            config.enumeration_ceiling = raw
                .parse()
                .map_err(|_| ScorerError::config(format!("invalid SCORER_ENUMERATION_CEILING: {raw}")))?;
        }
        if let Ok(raw) = std::env::var("SCORER_USE_LOCAL_AHP") {
            config.use_local_ahp = raw == "1" || raw.eq_ignore_ascii_case("true");
        }

        Ok(config)
    }
}

/// Builder for [`ScorerConfig`] (mirrors the teacher crate's `ForgeBuilder`).
pub struct ScorerConfigBuilder {
    config: ScorerConfig,
}

impl ScorerConfigBuilder {
    /// Start from the default configuration.
    pub fn new() -> Self {
        Self { config: ScorerConfig::default() }
    }

    /// Set the AHP evaluator endpoint.
    pub fn with_ahp_url(mut self, url: impl Into<String>) -> Self {
        self.config.ahp_url = url.into();
        self
    }

    /// Set the weights updater sink endpoint.
    pub fn with_updater_url(mut self, url: impl Into<String>) -> Self {
        self.config.updater_url = url.into();
        self
    }

    /// Set the named criteria profile.
    pub fn with_criteria_profile(mut self, name: impl Into<String>) -> Self {
        self.config.criteria_profile = name.into();
        self
    }

    /// Set the zero-replica preservation multiplier.
    pub fn with_zero_preservation_multiplier(mut self, multiplier: u64) -> Self {
        self.config.zero_preservation_multiplier = multiplier;
        self
    }

    /// Set the shared HTTP timeout.
    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.config.http_timeout = timeout;
        self
    }

    /// Set the shared retry policy.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.config.retry = retry;
        self
    }

    /// Set the shared circuit breaker tuning.
    pub fn with_circuit_breaker(mut self, config: CircuitBreakerConfig) -> Self {
        self.config.circuit_breaker = config;
        self
    }

    /// Set the enumeration resource bound.
    pub fn with_enumeration_ceiling(mut self, ceiling: u64) -> Self {
        self.config.enumeration_ceiling = ceiling;
        self
    }

    /// Use the embedded ratio-scale evaluator instead of the remote AHP client.
    pub fn with_local_ahp(mut self, enabled: bool) -> Self {
        self.config.use_local_ahp = enabled;
        self
    }

    /// Set the node name used in tracing spans and metrics labels.
    pub fn with_node_name(mut self, name: impl Into<String>) -> Self {
        self.config.node_name = name.into();
        self
    }

    /// Finish building.
    pub fn build(self) -> ScorerConfig {
        self.config
    }
}

impl Default for ScorerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_source_system_urls() {
        let config = ScorerConfig::default();
        assert_eq!(config.ahp_url, "http://172.18.0.1:6000/distribution_score");
        assert_eq!(config.updater_url, "http://172.18.0.1:6001/weights");
        assert_eq!(config.criteria_profile, "balance");
        assert_eq!(config.zero_preservation_multiplier, 1000);
    }

    #[test]
    fn builder_overrides_defaults() {
        let config = ScorerConfigBuilder::new()
            .with_ahp_url("http://example.test/score")
            .with_criteria_profile("cost30")
            .with_local_ahp(true)
            .build();

        assert_eq!(config.ahp_url, "http://example.test/score");
        assert_eq!(config.criteria_profile, "cost30");
        assert!(config.use_local_ahp);
    }

    #[test]
    fn from_env_falls_back_to_defaults_when_unset() {
        std::env::remove_var("SCORER_AHP_URL");
        let config = ScorerConfig::from_env().unwrap();
        assert_eq!(config.ahp_url, DEFAULT_AHP_URL);
    }
}
