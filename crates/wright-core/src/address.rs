//! The opaque on-chain identity produced by a deployment.
//!
//! An [`Address`] is a fixed-length (20-byte) handle. The orchestrator treats
//! it as opaque: it is recorded in the registry and threaded into dependent
//! units' constructor arguments, never interpreted.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Byte length of an address.
pub const ADDRESS_LEN: usize = 20;

/// A fixed-length on-chain address.
///
/// Displayed and serialized as `0x`-prefixed lowercase hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// Creates an address from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Returns the raw bytes of the address.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// The all-zero address.
    ///
    /// Some networks report this for failed creations; it is never a valid
    /// deployment result.
    #[must_use]
    pub const fn zero() -> Self {
        Self([0u8; ADDRESS_LEN])
    }

    /// Returns true if this is the all-zero address.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ADDRESS_LEN]
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let stripped = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);

        let bytes = hex::decode(stripped).map_err(|e| Error::InvalidAddress {
            message: format!("'{s}' is not hex: {e}"),
        })?;

        let bytes: [u8; ADDRESS_LEN] =
            bytes.try_into().map_err(|actual: Vec<u8>| Error::InvalidAddress {
                message: format!(
                    "'{s}' has {} bytes, expected {ADDRESS_LEN}",
                    actual.len()
                ),
            })?;

        Ok(Self(bytes))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "0x1f9090aae28b8a3dceadf281b0f12828e676c326";

    #[test]
    fn address_round_trips_through_string() {
        let addr: Address = SAMPLE.parse().unwrap();
        assert_eq!(addr.to_string(), SAMPLE);
    }

    #[test]
    fn address_accepts_uppercase_prefix_and_digits() {
        let addr: Address = "0X1F9090AAE28B8A3DCEADF281B0F12828E676C326".parse().unwrap();
        assert_eq!(addr.to_string(), SAMPLE);
    }

    #[test]
    fn address_rejects_wrong_length() {
        let result: Result<Address> = "0xdeadbeef".parse();
        assert!(matches!(result, Err(Error::InvalidAddress { .. })));
    }

    #[test]
    fn address_rejects_non_hex() {
        let result: Result<Address> = "0xzz9090aae28b8a3dceadf281b0f12828e676c326".parse();
        assert!(matches!(result, Err(Error::InvalidAddress { .. })));
    }

    #[test]
    fn zero_address_is_detectable() {
        assert!(Address::zero().is_zero());
        let addr: Address = SAMPLE.parse().unwrap();
        assert!(!addr.is_zero());
    }

    #[test]
    fn address_serde_uses_hex_string() {
        let addr: Address = SAMPLE.parse().unwrap();
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{SAMPLE}\""));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }
}
