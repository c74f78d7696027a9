//! Monitored hosts and how each one is reached.

use crate::error::{Result, TelemetryError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Identity and reachability of one monitored machine.
///
/// Unknown keys in the configuration entry are kept in `extra` and passed
/// through when the host list is served back to the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HostConfig {
    pub name: String,
    pub ip: String,
    #[serde(default, alias = "proxyURL", skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
    #[serde(default, skip_serializing)]
    pub username: Option<String>,
    #[serde(default, rename = "privateKeyPath", skip_serializing)]
    pub private_key_path: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Parameters for the remote-execution channel. Unset fields fall back to
/// process-wide defaults inside the sampler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteParams {
    pub address: String,
    pub username: Option<String>,
    pub private_key_path: Option<PathBuf>,
}

/// How a host is sampled. Exactly one per host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStrategy {
    Proxy(String),
    Remote(RemoteParams),
}

impl HostConfig {
    /// Builds a host reached over the remote-execution channel.
    pub fn remote(name: impl Into<String>, ip: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ip: ip.into(),
            proxy: None,
            username: None,
            private_key_path: None,
            extra: Map::new(),
        }
    }

    /// Builds a host reached through an HTTP proxy.
    pub fn proxied(name: impl Into<String>, ip: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            proxy: Some(url.into()),
            ..Self::remote(name, ip)
        }
    }

    /// Selects the fetch strategy. Decided solely by a non-empty `proxy`.
    pub fn strategy(&self) -> FetchStrategy {
        match self.proxy.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => FetchStrategy::Proxy(url.to_string()),
            _ => FetchStrategy::Remote(RemoteParams {
                address: self.ip.clone(),
                username: self.username.clone(),
                private_key_path: self.private_key_path.as_ref().map(PathBuf::from),
            }),
        }
    }
}

#[derive(Deserialize)]
struct ServersFile {
    servers: Vec<HostConfig>,
}

/// The configured fleet, in configuration order.
#[derive(Debug, Clone, Default)]
pub struct HostRegistry {
    hosts: Vec<HostConfig>,
}

impl HostRegistry {
    pub fn new(hosts: Vec<HostConfig>) -> Result<Self> {
        let mut seen = HashSet::new();
        for host in &hosts {
            if host.name.trim().is_empty() || host.ip.trim().is_empty() {
                return Err(TelemetryError::Config(format!(
                    "host entry {:?} needs both a name and an ip",
                    host.name
                )));
            }
            if !seen.insert(host.name.as_str()) {
                return Err(TelemetryError::Config(format!(
                    "duplicate host name {:?}",
                    host.name
                )));
            }
        }
        Ok(Self { hosts })
    }

    /// Parses `{ "servers": [...] }`.
    pub fn from_json(raw: &str) -> Result<Self> {
        let file: ServersFile = serde_json::from_str(raw)
            .map_err(|e| TelemetryError::Config(format!("invalid servers file: {e}")))?;
        Self::new(file.servers)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            TelemetryError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&raw)
    }

    pub fn find(&self, name: &str) -> Result<&HostConfig> {
        self.hosts
            .iter()
            .find(|h| h.name == name)
            .ok_or_else(|| TelemetryError::UnknownHost(name.to_string()))
    }

    pub fn hosts(&self) -> &[HostConfig] {
        &self.hosts
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}
