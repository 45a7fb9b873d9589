use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::header::ACCEPT;
use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, warn};

use crate::poll;

use super::{DebugInfo, Peer, RelayMessage};

pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);
pub const PEER_POLL_INTERVAL: Duration = Duration::from_secs(2);

#[derive(thiserror::Error, Debug)]
pub enum NodeClientError {
    #[error("invalid node url: {0}")]
    InvalidUrl(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Client for a single node's REST control plane.
///
/// `get_debug_info` is the liveness check and reports failures to the caller.
/// Every other operation is meant to be called from polling loops, so it logs
/// transport errors and returns `false` or an empty list instead.
#[derive(Debug, Clone)]
pub struct NodeClient {
    base_url: Url,
    http: Client,
    peer_poll_interval: Duration,
}

impl NodeClient {
    pub fn new(base_url: &str) -> Result<Self, NodeClientError> {
        Self::with_timeout(base_url, DEFAULT_HTTP_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, NodeClientError> {
        let base_url = Url::parse(base_url)
            .map_err(|err| NodeClientError::InvalidUrl(format!("{base_url}: {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(NodeClientError::InvalidUrl(base_url.to_string()));
        }
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url,
            http,
            peer_poll_interval: PEER_POLL_INTERVAL,
        })
    }

    /// Client for a node whose REST port is published on `host`.
    pub fn for_port(host: &str, rest_port: u16, timeout: Duration) -> Result<Self, NodeClientError> {
        Self::with_timeout(&format!("http://{host}:{rest_port}"), timeout)
    }

    pub fn with_peer_poll_interval(mut self, interval: Duration) -> Self {
        self.peer_poll_interval = interval;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Each segment is percent-encoded on its own, so a topic like
    /// `/my-app/2/chatroom-1/proto` stays a single path segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, NodeClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| NodeClientError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, NodeClientError> {
        let url = self.endpoint(segments)?;
        let value = self
            .http
            .get(url)
            .send()
            .and_then(Response::error_for_status)?
            .json::<T>()?;
        Ok(value)
    }

    fn fetch_debug_info(&self) -> Result<DebugInfo, NodeClientError> {
        self.get_json(&["debug", "v1", "info"])
    }

    pub fn get_debug_info(&self) -> Result<DebugInfo, NodeClientError> {
        self.fetch_debug_info().map_err(|err| {
            error!("failed to get debug info from {}: {err}", self.base_url);
            err
        })
    }

    /// The node's ENR, or an empty string if it doesn't advertise one yet.
    pub fn get_discovery_record(&self) -> Result<String, NodeClientError> {
        Ok(self.get_debug_info()?.discovery_record().to_owned())
    }

    /// Polls debug info until the node reports a non-empty discovery record.
    pub fn await_discovery_record(&self, max_wait: Duration, interval: Duration) -> Option<String> {
        let record = poll::wait_for_value(max_wait, interval, || {
            match self.fetch_debug_info() {
                Ok(info) if !info.discovery_record().is_empty() => {
                    Some(info.discovery_record().to_owned())
                }
                Ok(_) => {
                    debug!("{} has no discovery record yet", self.base_url);
                    None
                }
                Err(err) => {
                    debug!("{} not reachable yet: {err}", self.base_url);
                    None
                }
            }
        });
        if record.is_none() {
            warn!("timeout waiting for discovery record of {}", self.base_url);
        }
        record
    }

    pub fn subscribe<T: AsRef<str>>(&self, topics: &[T]) -> bool {
        let topics = topics.iter().map(AsRef::as_ref).collect::<Vec<_>>();
        let res = self
            .endpoint(&["relay", "v1", "auto", "subscriptions"])
            .and_then(|url| {
                self.http
                    .post(url)
                    .header(ACCEPT, "text/plain")
                    .json(&topics)
                    .send()
                    .and_then(Response::error_for_status)
                    .map_err(Into::into)
            });
        match res {
            Ok(_) => {
                info!("subscribed to topics: {topics:?}");
                true
            }
            Err(err) => {
                error!("failed to subscribe to topics {topics:?}: {err}");
                false
            }
        }
    }

    pub fn publish(&self, content_topic: &str, payload: &str, timestamp: Option<i64>) -> bool {
        let message = RelayMessage::new(content_topic, payload, timestamp);
        let res = self
            .endpoint(&["relay", "v1", "auto", "messages"])
            .and_then(|url| {
                self.http
                    .post(url)
                    .json(&message)
                    .send()
                    .and_then(Response::error_for_status)
                    .map_err(Into::into)
            });
        match res {
            Ok(_) => {
                info!("published message to {content_topic}");
                true
            }
            Err(err) => {
                error!("failed to publish message to {content_topic}: {err}");
                false
            }
        }
    }

    pub fn try_fetch_messages(&self, content_topic: &str) -> Result<Vec<RelayMessage>, NodeClientError> {
        self.get_json(&["relay", "v1", "auto", "messages", content_topic])
    }

    /// Messages the node cached for `content_topic`. An unreachable node
    /// looks the same as one with no messages.
    pub fn fetch_messages(&self, content_topic: &str) -> Vec<RelayMessage> {
        self.try_fetch_messages(content_topic).unwrap_or_else(|err| {
            error!("failed to get messages for {content_topic}: {err}");
            Vec::new()
        })
    }

    /// Polls until a message on `content_topic` decodes to `expected`.
    pub fn await_message(
        &self,
        content_topic: &str,
        expected: &str,
        max_wait: Duration,
        interval: Duration,
    ) -> Option<RelayMessage> {
        poll::wait_for_value(max_wait, interval, || {
            self.fetch_messages(content_topic).into_iter().find(|msg| {
                let text = msg.text();
                debug!("received message on {content_topic}: '{text}'");
                text == expected
            })
        })
    }

    pub fn try_list_peers(&self) -> Result<Vec<Peer>, NodeClientError> {
        self.get_json(&["admin", "v1", "peers"])
    }

    /// Connected peers. An unreachable node looks the same as one with no peers.
    pub fn list_peers(&self) -> Vec<Peer> {
        self.try_list_peers().unwrap_or_else(|err| {
            error!("failed to get peers from {}: {err}", self.base_url);
            Vec::new()
        })
    }

    pub fn await_peer_count(&self, expected: usize, max_wait: Duration) -> bool {
        let connected = poll::wait_for_condition(max_wait, self.peer_poll_interval, || {
            let count = self.list_peers().len();
            if count >= expected {
                info!("{} found {count} peer(s)", self.base_url);
            }
            count >= expected
        });
        if !connected {
            warn!("timeout waiting for {expected} peer(s) on {}", self.base_url);
        }
        connected
    }
}
