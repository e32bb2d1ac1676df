//! Netboot boot image resolution and execution
//!
//! # Resolution
//!
//! A boot location from the DHCP lease is first tried as a self-contained
//! boot script (iPXE style). If that does not parse, the containing
//! directory is searched for a directory-style configuration (pxelinux
//! style) keyed by hardware and IP address, and its default entry is used.
//!
//! ```text
//! tftp://10.0.0.1/pxe/pxelinux.0
//!        │
//!        ├─▶ ScriptConfigSource::load(location) ──ok──▶ Resolution::Script
//!        │
//!        └─▶ DirectoryConfigSource::find(tftp://10.0.0.1/pxe, mac, ip)
//!                 ──ok──▶ default entry ──▶ Resolution::Directory
//!                 ──err─▶ ResolveError::BootConfigNotFound
//! ```
//!
//! # Execution
//!
//! [`KexecExecutor`] loads the resolved image with `kexec -l` and jumps into
//! it with `kexec -e`.

pub mod error;
pub mod kexec;
pub mod resolver;

pub use error::*;
pub use kexec::*;
pub use resolver::*;

pub use netboot_common::{BootImage, BootLocation, HardwareAddr};
