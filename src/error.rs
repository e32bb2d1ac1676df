//! Error types for a netboot run
//!
//! [`AttemptError`] covers everything that can go wrong on one interface
//! and is never fatal to the run. [`NetbootError`] is the only error
//! [`crate::Netboot::run`] returns.

use crate::config::ConfigError;
use netboot_boot::{ExecError, ResolveError};
use netboot_dhcp::{AcquireError, BootInfoError, InterfaceError};
use thiserror::Error;

/// Failure of a single interface's boot attempt
#[derive(Debug, Error)]
pub enum AttemptError {
    /// Interface up, lease or configure step failed
    #[error(transparent)]
    Acquire(#[from] AcquireError),

    /// Lease obtained but it names no usable boot location
    #[error("lease on {interface} carries no boot information: {source}")]
    NoBootInfo {
        interface: String,
        #[source]
        source: BootInfoError,
    },

    /// Neither configuration format resolved
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Hand-off to the resolved image failed
    #[error("failed to boot from {interface}: {source}")]
    Execution {
        interface: String,
        #[source]
        source: ExecError,
    },
}

/// Error that aborts a whole netboot run
#[derive(Debug, Error)]
pub enum NetbootError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to enumerate network interfaces: {0}")]
    Enumerate(#[source] InterfaceError),
}

/// Result type for netboot runs
pub type Result<T> = std::result::Result<T, NetbootError>;
