//! Admission gate configuration with validation.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One rate-limit profile: a fixed window and the request ceiling inside it.
///
/// Immutable; supplied per call site. The gate carries two profiles, a
/// default one for general API traffic and a strict one for sensitive
/// endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Window length
    #[serde(with = "humantime_serde")]
    pub window: Duration,
    /// Max requests allowed per key inside one window
    pub max_requests: u32,
}

impl RateLimitConfig {
    /// Profile for general API traffic.
    #[must_use]
    pub fn default_profile() -> Self {
        Self {
            window: Duration::from_secs(60),
            max_requests: 100,
        }
    }

    /// Profile for sensitive endpoints (swap mutations, payment wrapper).
    #[must_use]
    pub fn strict_profile() -> Self {
        Self {
            window: Duration::from_secs(60),
            max_requests: 20,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::default_profile()
    }
}

/// Admission gate configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Enable the gate (disable only for local development)
    pub enabled: bool,
    /// Only paths under this prefix are gated
    pub api_prefix: String,
    /// Exact paths that bypass both checks
    pub exempt_paths: Vec<String>,
    /// Path prefixes that bypass both checks
    pub exempt_prefixes: Vec<String>,
    /// Path prefixes rated with the strict profile
    pub strict_prefixes: Vec<String>,
    /// Profile for general API traffic
    pub default_limit: RateLimitConfig,
    /// Profile for sensitive endpoints
    pub strict_limit: RateLimitConfig,
    /// Minimum interval between expired-entry sweeps
    #[serde(with = "humantime_serde")]
    pub sweep_interval: Duration,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_prefix: "/api/".to_string(),
            exempt_paths: vec![
                "/api/webhooks/payments".to_string(),
                "/api/jobs/run".to_string(),
                "/api/stream".to_string(),
            ],
            exempt_prefixes: vec!["/storage/".to_string()],
            strict_prefixes: vec!["/api/swaps".to_string(), "/api/payments".to_string()],
            default_limit: RateLimitConfig::default_profile(),
            strict_limit: RateLimitConfig::strict_profile(),
            sweep_interval: Duration::from_secs(300),
        }
    }
}

impl GateConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.api_prefix.starts_with('/') {
            return Err(ConfigError::InvalidPrefix(self.api_prefix.clone()));
        }

        for profile in [&self.default_limit, &self.strict_limit] {
            if profile.max_requests == 0 {
                return Err(ConfigError::InvalidRateLimit(
                    "max_requests cannot be 0".into(),
                ));
            }
            if profile.window.as_millis() == 0 {
                return Err(ConfigError::InvalidRateLimit("window cannot be 0".into()));
            }
        }

        if self.sweep_interval.as_millis() == 0 {
            return Err(ConfigError::InvalidRateLimit(
                "sweep_interval cannot be 0".into(),
            ));
        }

        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// API prefix must be an absolute path
    #[error("invalid api prefix: {0}")]
    InvalidPrefix(String),
    /// Invalid rate limiting configuration
    #[error("invalid rate limit: {0}")]
    InvalidRateLimit(String),
}

/// Humantime serde module for Duration serialization
mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{}s", duration.as_secs()))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_duration(&s).map_err(serde::de::Error::custom)
    }

    fn parse_duration(s: &str) -> Result<Duration, &'static str> {
        let s = s.trim();
        if let Some(ms) = s.strip_suffix("ms") {
            ms.trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| "invalid milliseconds")
        } else if let Some(secs) = s.strip_suffix('s') {
            secs.trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| "invalid seconds")
        } else if let Some(mins) = s.strip_suffix('m') {
            mins.trim()
                .parse::<u64>()
                .map(|m| Duration::from_secs(m * 60))
                .map_err(|_| "invalid minutes")
        } else {
            // Try parsing as plain seconds
            s.parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| "invalid duration format")
        }
    }
}
