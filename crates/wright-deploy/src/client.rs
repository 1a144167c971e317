//! Network client trait and test implementations.
//!
//! The executor never talks to a node directly; it is handed a
//! [`ChainClient`] and calls its single `deploy` operation. Implementations
//! can submit real transactions, simulate a network, or record calls for
//! tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use wright_core::Address;

use crate::descriptor::ArgValue;

/// Failure of a single deploy call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainError {
    /// The node did not produce a receipt in time. Usually transient.
    #[error("deploy timed out: {message}")]
    Timeout {
        /// Description of the timeout.
        message: String,
    },

    /// The node rejected the transaction (bad bytecode, insufficient
    /// funds, reverted constructor). Permanent.
    #[error("transaction rejected: {message}")]
    Rejected {
        /// Description of the rejection.
        message: String,
    },

    /// Transport or protocol failure talking to the node.
    #[error("rpc failure: {message}")]
    Rpc {
        /// Description of the failure.
        message: String,
    },
}

impl ChainError {
    /// Returns true if a retry by the caller might succeed.
    ///
    /// The executor itself never retries; this informs the caller's policy.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Rpc { .. })
    }
}

/// Trait for submitting unit deployments to a network.
///
/// `deploy` may block on network and consensus latency. It must return the
/// deployed unit's address exactly once per successful call; the
/// orchestrator records it write-once.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Deploys one unit with fully resolved constructor arguments and
    /// returns its address.
    async fn deploy(&self, unit: &str, args: &[ArgValue]) -> Result<Address, ChainError>;
}

/// A client that assigns sequential addresses without touching a network.
///
/// Deterministic: the Nth successful deploy gets address `0x...0N`.
#[derive(Debug, Default)]
pub struct StaticClient {
    next: AtomicU64,
}

impl StaticClient {
    /// Creates a new static client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn next_address(&self) -> Address {
        let n = self.next.fetch_add(1, Ordering::SeqCst) + 1;
        let mut bytes = [0u8; 20];
        bytes[12..].copy_from_slice(&n.to_be_bytes());
        Address::from_bytes(bytes)
    }
}

#[async_trait]
impl ChainClient for StaticClient {
    async fn deploy(&self, _unit: &str, _args: &[ArgValue]) -> Result<Address, ChainError> {
        Ok(self.next_address())
    }
}

/// A client that fails deployment of one named unit and delegates the rest
/// to a [`StaticClient`].
#[derive(Debug)]
pub struct FailingClient {
    inner: StaticClient,
    fail_on: String,
    error: ChainError,
}

impl FailingClient {
    /// Creates a client that fails the named unit with the given error.
    #[must_use]
    pub fn new(fail_on: impl Into<String>, error: ChainError) -> Self {
        Self {
            inner: StaticClient::new(),
            fail_on: fail_on.into(),
            error,
        }
    }
}

#[async_trait]
impl ChainClient for FailingClient {
    async fn deploy(&self, unit: &str, args: &[ArgValue]) -> Result<Address, ChainError> {
        if unit == self.fail_on {
            return Err(self.error.clone());
        }
        self.inner.deploy(unit, args).await
    }
}

/// A client wrapper that records every deploy call.
pub struct RecordingClient<C> {
    inner: C,
    calls: Mutex<Vec<(String, Vec<ArgValue>)>>,
}

impl<C> RecordingClient<C> {
    /// Wraps a client, recording calls in order.
    #[must_use]
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Returns the recorded `(unit, args)` calls in invocation order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned (test helper).
    #[must_use]
    pub fn calls(&self) -> Vec<(String, Vec<ArgValue>)> {
        self.calls.lock().expect("calls lock poisoned").clone()
    }
}

#[async_trait]
impl<C: ChainClient> ChainClient for RecordingClient<C> {
    async fn deploy(&self, unit: &str, args: &[ArgValue]) -> Result<Address, ChainError> {
        self.calls
            .lock()
            .expect("calls lock poisoned")
            .push((unit.to_string(), args.to_vec()));
        self.inner.deploy(unit, args).await
    }
}
