//! Target network configuration.
//!
//! A deployment run targets exactly one network, described by a host, a
//! port, and a network identifier. The identifier may be a concrete decimal
//! id or the `*` wildcard, meaning "whatever network the node reports".

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// A network identifier: a concrete id or the `*` wildcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetworkId {
    /// Accept any network id the node reports.
    Any,
    /// A specific network id.
    Id(u64),
}

impl NetworkId {
    /// Returns true if this identifier matches the given concrete id.
    #[must_use]
    pub fn matches(&self, id: u64) -> bool {
        match self {
            Self::Any => true,
            Self::Id(expected) => *expected == id,
        }
    }
}

impl Default for NetworkId {
    fn default() -> Self {
        Self::Any
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "*"),
            Self::Id(id) => write!(f, "{id}"),
        }
    }
}

impl FromStr for NetworkId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s == "*" {
            return Ok(Self::Any);
        }
        s.parse::<u64>()
            .map(Self::Id)
            .map_err(|_| Error::InvalidNetworkId { value: s.into() })
    }
}

impl Serialize for NetworkId {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for NetworkId {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Connection settings for the target network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    /// Node host name or IP.
    pub host: String,
    /// Node RPC port.
    pub port: u16,
    /// Expected network identifier.
    #[serde(default)]
    pub network_id: NetworkId,
}

impl NetworkConfig {
    /// Creates a configuration for the given host and port, accepting any
    /// network id.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            network_id: NetworkId::Any,
        }
    }

    /// Sets the expected network id.
    #[must_use]
    pub const fn with_network_id(mut self, network_id: NetworkId) -> Self {
        self.network_id = network_id;
        self
    }

    /// Returns the HTTP endpoint URL for the node.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self::new("127.0.0.1", 8545)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_targets_local_node() {
        let config = NetworkConfig::default();
        assert_eq!(config.endpoint(), "http://127.0.0.1:8545");
        assert_eq!(config.network_id, NetworkId::Any);
    }

    #[test]
    fn wildcard_matches_everything() {
        assert!(NetworkId::Any.matches(1));
        assert!(NetworkId::Any.matches(1337));
    }

    #[test]
    fn concrete_id_matches_itself_only() {
        let id = NetworkId::Id(5777);
        assert!(id.matches(5777));
        assert!(!id.matches(1));
    }

    #[test]
    fn network_id_parses_wildcard_and_decimal() {
        assert_eq!("*".parse::<NetworkId>().unwrap(), NetworkId::Any);
        assert_eq!("1337".parse::<NetworkId>().unwrap(), NetworkId::Id(1337));
        assert!("mainnet".parse::<NetworkId>().is_err());
    }

    #[test]
    fn config_serde_round_trip() {
        let config = NetworkConfig::new("localhost", 7545).with_network_id(NetworkId::Id(5777));
        let json = serde_json::to_string(&config).unwrap();
        let back: NetworkConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
        assert!(json.contains("\"networkId\":\"5777\""));
    }
}
