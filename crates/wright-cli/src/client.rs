//! JSON-RPC deployment client.
//!
//! Implements [`ChainClient`] over a node's HTTP JSON-RPC endpoint:
//! creation bytecode plus encoded constructor arguments go out as an
//! `eth_sendTransaction`, and the deployed address comes back on the
//! transaction receipt.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::OnceCell;

use wright_core::{Address, NetworkConfig};
use wright_deploy::artifact::ArtifactStore;
use wright_deploy::client::{ChainClient, ChainError};
use wright_deploy::descriptor::ArgValue;

use crate::abi;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);
const RECEIPT_POLL_INTERVAL: Duration = Duration::from_millis(500);
const RECEIPT_TIMEOUT: Duration = Duration::from_secs(120);

/// A [`ChainClient`] over HTTP JSON-RPC.
pub struct RpcChainClient {
    http: reqwest::Client,
    endpoint: String,
    artifacts: Arc<dyn ArtifactStore>,
    configured_sender: Option<Address>,
    sender: OnceCell<Address>,
    gas: Option<u64>,
    receipt_timeout: Duration,
    next_id: AtomicU64,
}

impl RpcChainClient {
    /// Creates a client for the given network.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(network: &NetworkConfig, artifacts: Arc<dyn ArtifactStore>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            endpoint: network.endpoint(),
            artifacts,
            configured_sender: None,
            sender: OnceCell::new(),
            gas: None,
            receipt_timeout: RECEIPT_TIMEOUT,
            next_id: AtomicU64::new(1),
        })
    }

    /// Sets the sending account. Without this, the node's first account is
    /// used.
    #[must_use]
    pub const fn with_sender(mut self, sender: Address) -> Self {
        self.configured_sender = Some(sender);
        self
    }

    /// Sets an explicit gas limit for deployment transactions.
    #[must_use]
    pub const fn with_gas(mut self, gas: u64) -> Self {
        self.gas = Some(gas);
        self
    }

    /// Sets how long to wait for a transaction receipt.
    #[must_use]
    pub const fn with_receipt_timeout(mut self, timeout: Duration) -> Self {
        self.receipt_timeout = timeout;
        self
    }

    /// Queries the node's network id (`net_version`).
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails or the node reports a
    /// non-numeric id.
    pub async fn network_version(&self) -> Result<u64, ChainError> {
        let result = self.call("net_version", json!([])).await?;
        result
            .as_str()
            .and_then(|s| s.parse::<u64>().ok())
            .ok_or_else(|| ChainError::Rpc {
                message: format!("unexpected net_version response: {result}"),
            })
    }

    async fn sender(&self) -> Result<Address, ChainError> {
        if let Some(sender) = self.configured_sender {
            return Ok(sender);
        }
        self.sender
            .get_or_try_init(|| async {
                let accounts = self.call("eth_accounts", json!([])).await?;
                let first = accounts
                    .as_array()
                    .and_then(|a| a.first())
                    .and_then(Value::as_str)
                    .ok_or_else(|| ChainError::Rejected {
                        message: "node exposes no accounts to send from".into(),
                    })?;
                first.parse::<Address>().map_err(|e| ChainError::Rpc {
                    message: format!("unparseable account address: {e}"),
                })
            })
            .await
            .copied()
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, ChainError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let response = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ChainError::Timeout {
                        message: format!("{method} timed out: {e}"),
                    }
                } else {
                    ChainError::Rpc {
                        message: format!("{method} failed: {e}"),
                    }
                }
            })?;

        let envelope: Value = response.json().await.map_err(|e| ChainError::Rpc {
            message: format!("{method} returned malformed JSON: {e}"),
        })?;

        if let Some(error) = envelope.get("error").filter(|e| !e.is_null()) {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown RPC error");
            return Err(ChainError::Rejected {
                message: format!("{method}: {message}"),
            });
        }

        Ok(envelope.get("result").cloned().unwrap_or(Value::Null))
    }

    async fn await_receipt(&self, tx_hash: &str) -> Result<Address, ChainError> {
        let deadline = Instant::now() + self.receipt_timeout;

        loop {
            let receipt = self
                .call("eth_getTransactionReceipt", json!([tx_hash]))
                .await?;

            if !receipt.is_null() {
                if receipt.get("status").and_then(Value::as_str) == Some("0x0") {
                    return Err(ChainError::Rejected {
                        message: format!("transaction {tx_hash} reverted"),
                    });
                }

                let address = receipt
                    .get("contractAddress")
                    .and_then(Value::as_str)
                    .ok_or_else(|| ChainError::Rejected {
                        message: format!("transaction {tx_hash} created no contract"),
                    })?
                    .parse::<Address>()
                    .map_err(|e| ChainError::Rpc {
                        message: format!("unparseable contract address: {e}"),
                    })?;

                if address.is_zero() {
                    return Err(ChainError::Rejected {
                        message: format!("transaction {tx_hash} reported the zero address"),
                    });
                }
                return Ok(address);
            }

            if Instant::now() >= deadline {
                return Err(ChainError::Timeout {
                    message: format!(
                        "no receipt for {tx_hash} after {}s",
                        self.receipt_timeout.as_secs()
                    ),
                });
            }
            tokio::time::sleep(RECEIPT_POLL_INTERVAL).await;
        }
    }
}

#[async_trait]
impl ChainClient for RpcChainClient {
    #[tracing::instrument(skip(self, args), fields(unit = %unit))]
    async fn deploy(&self, unit: &str, args: &[ArgValue]) -> Result<Address, ChainError> {
        let artifact = self
            .artifacts
            .load(unit)
            .map_err(|e| ChainError::Rejected {
                message: e.to_string(),
            })?;

        let mut data = artifact.bytecode_bytes().map_err(|e| ChainError::Rejected {
            message: e.to_string(),
        })?;
        data.extend(abi::encode_constructor_args(args));

        let from = self.sender().await?;
        let mut tx = json!({
            "from": from.to_string(),
            "data": format!("0x{}", hex::encode(&data)),
        });
        if let Some(gas) = self.gas {
            tx["gas"] = json!(format!("0x{gas:x}"));
        }

        let result = self.call("eth_sendTransaction", json!([tx])).await?;
        let tx_hash = result.as_str().ok_or_else(|| ChainError::Rpc {
            message: format!("unexpected eth_sendTransaction response: {result}"),
        })?;

        tracing::debug!(unit = %unit, tx_hash = %tx_hash, "deployment submitted");
        self.await_receipt(tx_hash).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wright_deploy::artifact::MemoryArtifacts;

    #[test]
    fn client_builds_from_network_config() {
        let network = NetworkConfig::new("127.0.0.1", 8545);
        let client = RpcChainClient::new(&network, Arc::new(MemoryArtifacts::new())).unwrap();
        assert_eq!(client.endpoint, "http://127.0.0.1:8545");
        assert!(client.configured_sender.is_none());
    }

    #[tokio::test]
    async fn configured_sender_skips_account_lookup() {
        let sender: Address = "0x1f9090aae28b8a3dceadf281b0f12828e676c326".parse().unwrap();
        let network = NetworkConfig::new("127.0.0.1", 8545);
        let client = RpcChainClient::new(&network, Arc::new(MemoryArtifacts::new()))
            .unwrap()
            .with_sender(sender);

        // No node is listening; this succeeds only because the configured
        // sender short-circuits the eth_accounts call.
        assert_eq!(client.sender().await.unwrap(), sender);
    }

    #[tokio::test]
    async fn missing_artifact_fails_before_any_rpc() {
        let network = NetworkConfig::new("127.0.0.1", 8545);
        let client = RpcChainClient::new(&network, Arc::new(MemoryArtifacts::new())).unwrap();

        let result = client.deploy("Ghost", &[]).await;
        match result {
            Err(ChainError::Rejected { message }) => assert!(message.contains("Ghost")),
            other => panic!("expected Rejected, got {other:?}"),
        }
    }
}
