//! Connection configuration

use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

use oscroute_core::{RoutingInfo, DEFAULT_HOST, DEFAULT_PORT, WSS_SCHEME, WS_SCHEME};

use crate::error::Result;

/// WebSocket configuration
///
/// Missing fields fall back to `localhost:8080`, plaintext, no sub-protocol.
/// `protocol` accepts a single string or a list when deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebSocketConfig {
    /// Hostname of the WebSocket server
    pub host: String,
    /// Port of the WebSocket server; `None` builds a URL without a port
    pub port: Option<u16>,
    /// Use `wss://` instead of `ws://`
    pub secure: bool,
    /// Sub-protocols offered during the handshake
    #[serde(deserialize_with = "one_or_many")]
    pub protocol: Vec<String>,
}

impl Default for WebSocketConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: Some(DEFAULT_PORT),
            secure: false,
            protocol: Vec::new(),
        }
    }
}

impl WebSocketConfig {
    pub fn scheme(&self) -> &'static str {
        if self.secure {
            WSS_SCHEME
        } else {
            WS_SCHEME
        }
    }

    /// `scheme://host[:port]`
    pub fn url(&self) -> Result<Url> {
        let raw = match self.port {
            Some(port) => format!("{}://{}:{}", self.scheme(), self.host, port),
            None => format!("{}://{}", self.scheme(), self.host),
        };
        Ok(Url::parse(&raw)?)
    }

    /// Provenance attached to every inbound payload on this connection
    pub fn routing_info(&self) -> RoutingInfo {
        RoutingInfo::new(self.host.clone(), self.scheme(), self.port)
    }

    /// Apply per-call overrides on top of this config
    pub fn merge(&self, options: &ConnectOptions) -> Self {
        Self {
            host: options.host.clone().unwrap_or_else(|| self.host.clone()),
            port: options.port.unwrap_or(self.port),
            secure: options.secure.unwrap_or(self.secure),
            protocol: options
                .protocol
                .clone()
                .unwrap_or_else(|| self.protocol.clone()),
        }
    }
}

/// Per-call overrides for [`Transport::open`](crate::Transport::open).
/// Unset fields keep the transport's configured value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectOptions {
    host: Option<String>,
    port: Option<Option<u16>>,
    secure: Option<bool>,
    protocol: Option<Vec<String>>,
}

impl ConnectOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(Some(port));
        self
    }

    /// Connect without an explicit port in the URL
    pub fn no_port(mut self) -> Self {
        self.port = Some(None);
        self
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = Some(secure);
        self
    }

    pub fn protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = Some(vec![protocol.into()]);
        self
    }

    pub fn protocols<I, S>(mut self, protocols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.protocol = Some(protocols.into_iter().map(Into::into).collect());
        self
    }
}

impl From<WebSocketConfig> for ConnectOptions {
    fn from(config: WebSocketConfig) -> Self {
        Self {
            host: Some(config.host),
            port: Some(config.port),
            secure: Some(config.secure),
            protocol: Some(config.protocol),
        }
    }
}

fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) if s.is_empty() => Vec::new(),
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(v) => v,
    })
}
