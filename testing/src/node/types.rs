use serde::{Deserialize, Serialize};

/// Response of `GET /debug/v1/info`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DebugInfo {
    #[serde(default)]
    pub listen_addresses: Vec<String>,
    /// Discovery record other nodes bootstrap from. Absent until the
    /// node's discv5 service is up.
    #[serde(default)]
    pub enr_uri: Option<String>,
}

impl DebugInfo {
    pub fn discovery_record(&self) -> &str {
        self.enr_uri.as_deref().unwrap_or("")
    }
}

/// A relay message, both as published and as retrieved.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RelayMessage {
    /// Base64 transport encoding of the message body.
    pub payload: String,
    pub content_topic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ephemeral: Option<bool>,
}

impl RelayMessage {
    pub fn new(content_topic: &str, text: &str, timestamp: Option<i64>) -> Self {
        Self {
            payload: crate::codec::encode(text),
            content_topic: content_topic.to_owned(),
            timestamp,
            version: None,
            meta: None,
            ephemeral: None,
        }
    }

    pub fn text(&self) -> String {
        crate::codec::decode(&self.payload)
    }
}

/// Entry of `GET /admin/v1/peers`. Only the count matters to scenarios; the
/// rest is kept for diagnostics.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Peer {
    #[serde(default)]
    pub multiaddr: Option<String>,
    #[serde(default)]
    pub protocols: Vec<serde_json::Value>,
}
