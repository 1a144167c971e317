//! # wright-core
//!
//! Core primitives for the Wright deployment orchestrator.
//!
//! This crate provides the foundational types shared by the orchestration
//! engine and the CLI:
//!
//! - **Identifiers**: Strongly-typed run IDs
//! - **Addresses**: The opaque on-chain identity a deployment produces
//! - **Network Configuration**: Host, port, and network identifier
//! - **Error Types**: Shared error definitions and result types
//!
//! ## Example
//!
//! ```rust
//! use wright_core::prelude::*;
//!
//! let run_id = RunId::generate();
//! let address: Address = "0x1f9090aae28b8a3dceadf281b0f12828e676c326".parse().unwrap();
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod address;
pub mod error;
pub mod id;
pub mod network;
pub mod observability;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use wright_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::address::Address;
    pub use crate::error::{Error, Result};
    pub use crate::id::RunId;
    pub use crate::network::{NetworkConfig, NetworkId};
}

pub use address::Address;
pub use error::{Error, Result};
pub use id::RunId;
pub use network::{NetworkConfig, NetworkId};
pub use observability::{LogFormat, init_logging};
