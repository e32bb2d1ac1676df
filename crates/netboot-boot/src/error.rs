//! Error types for boot resolution and execution

use netboot_common::BootLocation;
use thiserror::Error;

/// Failure to interpret a location as a boot script
///
/// Expected whenever the location is not a script; the resolver falls back
/// on it.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to fetch {location}: {reason}")]
    Fetch {
        location: BootLocation,
        reason: String,
    },

    #[error("{location} is not a boot script: {reason}")]
    Parse {
        location: BootLocation,
        reason: String,
    },
}

/// Failure to find a directory-style configuration
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("no configuration matched in {0}")]
    NotFound(BootLocation),

    #[error("failed to fetch {location}: {reason}")]
    Fetch {
        location: BootLocation,
        reason: String,
    },

    #[error("failed to parse {location}: {reason}")]
    Parse {
        location: BootLocation,
        reason: String,
    },
}

/// Error type for boot resolution
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Neither format yielded a configuration
    #[error("no boot configuration found in {directory}: {source}")]
    BootConfigNotFound {
        directory: BootLocation,
        #[source]
        source: DirectoryError,
    },

    /// Configuration names a default entry it does not define
    #[error("default entry {label:?} not defined in {directory}")]
    DefaultEntryMissing {
        directory: BootLocation,
        label: String,
    },
}

/// Error type for boot image execution
#[derive(Debug, Error)]
pub enum ExecError {
    /// Kernel or initrd is not a local file
    #[error("{0} is not a local file")]
    NotLocal(String),

    /// Failed to start a command
    #[error("failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// `kexec -l` rejected the image
    #[error("kexec load failed (exit code {code:?}): {stderr}")]
    LoadFailed { code: Option<i32>, stderr: String },

    /// `kexec -e` returned instead of replacing the running kernel
    #[error("kexec exec returned (exit code {code:?}): {stderr}")]
    ExecReturned { code: Option<i32>, stderr: String },
}

/// Result type for boot resolution
pub type Result<T> = std::result::Result<T, ResolveError>;
