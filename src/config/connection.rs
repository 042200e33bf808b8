use serde::Deserialize;
use serde::Serialize;

use super::invalid;
use crate::Result;

/// Connection parameters handed to the transport factory.
///
/// Auto-reconnect and connect-on-new default to disabled: the notification
/// client drives connection establishment itself from `start`, and a
/// session that dropped is never silently resumed.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnConfig {
    /// Node RPC address, `host:port`
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP path of the websocket endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default)]
    pub user: String,

    #[serde(default)]
    pub pass: String,

    /// PEM encoded certificate chain of the node when TLS is enabled
    #[serde(default)]
    pub certificates: Option<String>,

    #[serde(default)]
    pub disable_tls: bool,

    #[serde(default = "default_true")]
    pub disable_auto_reconnect: bool,

    #[serde(default = "default_true")]
    pub disable_connect_on_new: bool,

    /// Issue requests as individual HTTP POSTs instead of over the websocket
    #[serde(default)]
    pub http_post_mode: bool,
}

impl Default for ConnConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            endpoint: default_endpoint(),
            user: String::new(),
            pass: String::new(),
            certificates: None,
            disable_tls: false,
            disable_auto_reconnect: true,
            disable_connect_on_new: true,
            http_post_mode: false,
        }
    }
}

impl ConnConfig {
    /// Websocket connection to `host` with the given credentials.
    pub fn new(
        host: impl Into<String>,
        user: impl Into<String>,
        pass: impl Into<String>,
        certificates: Option<String>,
        disable_tls: bool,
    ) -> Self {
        Self {
            host: host.into(),
            user: user.into(),
            pass: pass.into(),
            certificates,
            disable_tls,
            ..Self::default()
        }
    }

    /// Copy of this configuration for an HTTP POST mode client.
    pub fn post_mode(&self) -> Self {
        Self {
            http_post_mode: true,
            ..self.clone()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(invalid("connection.host cannot be empty"));
        }
        if self.endpoint.trim().is_empty() && !self.http_post_mode {
            return Err(invalid("connection.endpoint cannot be empty in websocket mode"));
        }
        Ok(())
    }
}

// Credentials stay out of logs
impl std::fmt::Debug for ConnConfig {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("ConnConfig")
            .field("host", &self.host)
            .field("endpoint", &self.endpoint)
            .field("user", &self.user)
            .field("disable_tls", &self.disable_tls)
            .field("http_post_mode", &self.http_post_mode)
            .finish()
    }
}

fn default_host() -> String {
    "localhost:9109".to_string()
}
fn default_endpoint() -> String {
    "ws".to_string()
}
fn default_true() -> bool {
    true
}
