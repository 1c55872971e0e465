//! The wire unit of the live stream: one JSON object per line.

use hosthub_types::KEEPALIVE_CHANNEL;
use serde::{Deserialize, Serialize};

/// One streamed event: the bus channel it was published on plus its payload.
///
/// `payload` is omitted from the wire when absent, and tolerated as missing
/// or `null` on decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamFrame {
    pub channel: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

impl StreamFrame {
    pub fn new(channel: impl Into<String>, payload: Option<serde_json::Value>) -> Self {
        Self {
            channel: channel.into(),
            payload,
        }
    }

    /// The empty frame written periodically to keep idle connections open.
    pub fn keepalive() -> Self {
        Self::new(KEEPALIVE_CHANNEL, None)
    }

    /// Encode as one newline-terminated NDJSON line.
    pub fn encode(&self) -> String {
        // A frame is a string channel plus an already-valid Value; encoding
        // cannot fail in practice, and an empty line decodes to nothing.
        let mut line = serde_json::to_string(self).unwrap_or_default();
        line.push('\n');
        line
    }

    /// Decode one line. Blank or malformed lines yield `None`; callers drop
    /// them without surfacing an error.
    pub fn decode(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        serde_json::from_str(line).ok()
    }
}
