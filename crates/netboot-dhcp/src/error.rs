//! Error types for lease acquisition
//!
//! Each step of an attempt has its own variant in [`AcquireError`] so the
//! caller can report which step failed before moving on.

use std::time::Duration;
use thiserror::Error;

/// Error from the interface control collaborator
#[derive(Debug, Error)]
pub enum InterfaceError {
    /// Failed to list the system's interfaces
    #[error("failed to enumerate interfaces: {0}")]
    Enumerate(String),

    /// Failed to start a configuration command
    #[error("failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration command exited unsuccessfully
    #[error("{command} failed (exit code {code:?}): {stderr}")]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// Lease does not carry an address to apply
    #[error("lease carries no assigned address")]
    NoAssignedAddress,
}

/// Error from the lease protocol collaborator
#[derive(Debug, Error)]
pub enum LeaseClientError {
    /// No server answered within the retry budget
    #[error("no lease after {attempts} attempts of {timeout:?}")]
    Exhausted { attempts: u32, timeout: Duration },

    /// Server refused the request
    #[error("lease declined: {0}")]
    Declined(String),

    /// Malformed or unexpected protocol exchange
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Socket error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error from a single lease acquisition attempt
#[derive(Debug, Error)]
pub enum AcquireError {
    /// Interface could not be brought up
    #[error("failed to bring up {interface}: {source}")]
    InterfaceUp {
        interface: String,
        #[source]
        source: InterfaceError,
    },

    /// Lease protocol failed after its own retries
    #[error("no lease on {interface}: {source}")]
    Lease {
        interface: String,
        #[source]
        source: LeaseClientError,
    },

    /// Lease obtained but could not be applied to the interface
    #[error("failed to configure {interface}: {source}")]
    Configure {
        interface: String,
        #[source]
        source: InterfaceError,
    },
}

impl AcquireError {
    /// Name of the interface the attempt was made on
    pub fn interface(&self) -> &str {
        match self {
            AcquireError::InterfaceUp { interface, .. }
            | AcquireError::Lease { interface, .. }
            | AcquireError::Configure { interface, .. } => interface,
        }
    }
}

/// Reason a lease carries no usable boot location
#[derive(Debug, Error)]
pub enum BootInfoError {
    /// Neither the `file` field nor option 67 name a boot file
    #[error("lease names no boot file")]
    NoBootFile,

    /// Boot file is relative and no server name or address is known
    #[error("lease names boot file {0} but no server to fetch it from")]
    NoServer(String),

    /// Boot file and server do not form a valid location
    #[error(transparent)]
    InvalidLocation(#[from] netboot_common::Error),
}

/// Result type for lease acquisition
pub type Result<T> = std::result::Result<T, AcquireError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AcquireError::Lease {
            interface: "eth0".to_string(),
            source: LeaseClientError::Exhausted {
                attempts: 5,
                timeout: Duration::from_secs(30),
            },
        };
        assert_eq!(err.to_string(), "no lease on eth0: no lease after 5 attempts of 30s");
        assert_eq!(err.interface(), "eth0");

        let err = InterfaceError::CommandFailed {
            command: "ip link set dev eth0 up".to_string(),
            code: Some(2),
            stderr: "Cannot find device".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "ip link set dev eth0 up failed (exit code Some(2)): Cannot find device"
        );
    }

    #[test]
    fn test_error_source_chain() {
        use std::error::Error as _;

        let err = AcquireError::Configure {
            interface: "eth1".to_string(),
            source: InterfaceError::NoAssignedAddress,
        };
        let source = err.source().unwrap();
        assert_eq!(source.to_string(), "lease carries no assigned address");
    }

    #[test]
    fn test_boot_info_error_display() {
        assert_eq!(BootInfoError::NoBootFile.to_string(), "lease names no boot file");
        assert_eq!(
            BootInfoError::NoServer("pxelinux.0".to_string()).to_string(),
            "lease names boot file pxelinux.0 but no server to fetch it from"
        );
    }
}
