//! Network boot orchestration
//!
//! For every candidate network interface, `netboot` obtains a DHCP lease,
//! derives a boot location from it, resolves that location into a boot
//! image and hands the image to an executor, rewriting its kernel command
//! line on the way:
//!
//! ```text
//!  interfaces() ──▶ acquire lease ──▶ boot_location() ──▶ resolve ──▶ filter ──▶ execute
//!       │                │                  │                 │                      │
//!   Enumerate        Acquire            NoBootInfo         Resolve              Execution
//!   (aborts run)     └──────────────── logged, next interface ─────────────────────┘
//! ```
//!
//! The pieces live in their own crates and are re-exported here:
//! [`netboot_dhcp`] for leases and interface control, [`netboot_boot`] for
//! resolution and kexec, [`netboot_cmdline`] for command-line rewriting.
//!
//! # Example
//!
//! ```ignore
//! use netboot::{Collaborators, Netboot, NetbootConfig};
//!
//! let config = NetbootConfig::load("/etc/netboot.toml").await?;
//! let netboot = Netboot::new(config, collaborators);
//! let report = netboot.run().await?;
//! if report.dispatched().is_none() {
//!     eprintln!("nothing booted");
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod orchestrator;

pub use config::{ConfigError, NetbootConfig, DEFAULT_BOOT_INTERFACE};
pub use error::{AttemptError, NetbootError, Result};
pub use logging::init_logging;
pub use orchestrator::{Collaborators, Dispatch, InterfaceAttempt, Netboot, RunReport};

pub use netboot_boot;
pub use netboot_cmdline;
pub use netboot_common;
pub use netboot_dhcp;
