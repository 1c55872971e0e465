//! Portal service configuration.
//!
//! Every section carries serde defaults so a partial JSON file (or none at
//! all) yields a runnable development setup. `validate` is called before the
//! service is built; the binary layers environment overrides on top.

use hosthub_gate::GateConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Placeholder secret shipped with the defaults. The service logs a warning
/// when it is still in place at startup.
pub const DEV_SECRET: &str = "change-me";

/// Top-level portal configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PortalConfig {
    /// HTTP server settings
    pub server: ServerConfig,
    /// Cross-origin grants for browser clients
    pub cors: CorsConfig,
    /// Admission gate (rate limiting + origin validation)
    pub gate: GateConfig,
    /// Payment webhook receiver
    pub webhook: WebhookConfig,
    /// Scheduled job trigger
    pub jobs: JobsConfig,
    /// Live event feed
    pub stream: StreamConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the portal listens on
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8700".to_string(),
        }
    }
}

/// Cross-origin grants. The portal is normally served same-origin with the
/// front-end, so the default list is empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Attach CORS headers at all
    pub enabled: bool,
    /// Origins allowed to call the API ("*" for any)
    pub allowed_origins: Vec<String>,
    /// Allow cookies and authorization headers cross-origin
    pub allow_credentials: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_origins: Vec::new(),
            allow_credentials: false,
        }
    }
}

/// Payment webhook receiver settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    /// Mount the webhook route
    pub enabled: bool,
    /// Shared HMAC secret for signature verification
    pub secret: String,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            secret: DEV_SECRET.to_string(),
        }
    }
}

/// Scheduled job trigger settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JobsConfig {
    /// Mount the job trigger route
    pub enabled: bool,
    /// Shared key checked against `x-hosthub-job-key`
    pub secret: String,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            secret: DEV_SECRET.to_string(),
        }
    }
}

/// Live event feed settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Interval between keep-alive frames
    #[serde(with = "humantime_serde")]
    pub keepalive: Duration,
    /// Per-connection frame queue depth
    pub queue_capacity: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            keepalive: Duration::from_secs(30),
            queue_capacity: 64,
        }
    }
}

impl PortalConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.bind_addr.parse::<std::net::SocketAddr>().is_err() {
            return Err(ConfigError::InvalidBindAddr(self.server.bind_addr.clone()));
        }

        self.gate.validate()?;

        if self.webhook.enabled && self.webhook.secret.is_empty() {
            return Err(ConfigError::MissingWebhookSecret);
        }
        if self.jobs.enabled && self.jobs.secret.is_empty() {
            return Err(ConfigError::MissingJobSecret);
        }

        if self.stream.keepalive.as_millis() == 0 {
            return Err(ConfigError::InvalidStream("keepalive cannot be 0".into()));
        }
        if self.stream.queue_capacity == 0 {
            return Err(ConfigError::InvalidStream(
                "queue_capacity cannot be 0".into(),
            ));
        }

        Ok(())
    }

    /// True when either shared secret is still the shipped placeholder.
    #[must_use]
    pub fn uses_dev_secrets(&self) -> bool {
        (self.webhook.enabled && self.webhook.secret == DEV_SECRET)
            || (self.jobs.enabled && self.jobs.secret == DEV_SECRET)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Bind address must parse as host:port
    #[error("invalid bind address: {0}")]
    InvalidBindAddr(String),
    /// Webhook route mounted without a secret
    #[error("webhook enabled without a secret")]
    MissingWebhookSecret,
    /// Job trigger mounted without a key
    #[error("job trigger enabled without a secret")]
    MissingJobSecret,
    /// Invalid stream settings
    #[error("invalid stream config: {0}")]
    InvalidStream(String),
    /// Admission gate configuration rejected
    #[error("invalid gate config: {0}")]
    Gate(#[from] hosthub_gate::ConfigError),
    /// Config file could not be read
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    /// Config file is not valid JSON
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
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
