//! Scoped proxy environment for network commands.
//!
//! Child processes inherit the environment, so setting the two proxy
//! variables around a network-touching command is all the routing the
//! external tools need. The guard clears both variables when dropped,
//! which covers early returns and panics inside the guarded body.
//!
//! The scope mutates process-wide state and must not be nested or shared
//! across threads.

use std::env;

use serde::{Deserialize, Serialize};

pub const HTTP_PROXY: &str = "http_proxy";
pub const HTTPS_PROXY: &str = "https_proxy";

/// Proxy endpoints for outbound traffic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    /// Whether network commands run inside a proxy scope at all.
    pub enabled: bool,

    /// Endpoint for http traffic.
    pub http_url: String,

    /// Endpoint for https traffic.
    pub https_url: String,
}

/// RAII guard that keeps the proxy variables set while alive.
pub struct ProxyScope {
    active: bool,
}

impl ProxyScope {
    /// Set the proxy variables. A no-op when `settings.enabled` is false.
    pub fn enter(settings: &ProxySettings) -> Self {
        if !settings.enabled {
            return ProxyScope { active: false };
        }

        env::set_var(HTTP_PROXY, &settings.http_url);
        env::set_var(HTTPS_PROXY, &settings.https_url);
        tracing::debug!("proxy scope opened ({})", settings.http_url);

        ProxyScope { active: true }
    }
}

impl Drop for ProxyScope {
    fn drop(&mut self) {
        if self.active {
            env::remove_var(HTTP_PROXY);
            env::remove_var(HTTPS_PROXY);
            tracing::debug!("proxy scope closed");
        }
    }
}

/// Run `body` with the proxy variables set, clearing them again on every
/// exit path.
pub fn with_proxy<T>(
    settings: &ProxySettings,
    body: impl FnOnce() -> anyhow::Result<T>,
) -> anyhow::Result<T> {
    let _scope = ProxyScope::enter(settings);
    body()
}
