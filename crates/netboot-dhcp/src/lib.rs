//! Netboot DHCP lease acquisition
//!
//! This crate obtains a DHCPv4 lease on a network interface and exposes
//! the boot information carried by it. The wire protocol itself is left to
//! a [`LeaseClient`] implementation; this crate sequences the attempt.
//!
//! # Attempt sequence
//!
//! ```text
//! ┌──────────────┐   ┌───────────────┐   ┌────────────────┐
//! │  bring_up    │──▶│ LeaseClient   │──▶│   configure    │──▶ LeaseResult
//! │ (link up)    │   │ request()     │   │ (addr, route)  │
//! └──────────────┘   └───────────────┘   └────────────────┘
//!   InterfaceUp         Lease               Configure        ◀── AcquireError
//! ```
//!
//! Retries and timeouts below the attempt level belong to the lease
//! client. The acquirer never retries.
//!
//! # Example
//!
//! ```ignore
//! use netboot_dhcp::{LeaseAcquirer, LeaseOptions, SystemInterfaceControl};
//! use std::sync::Arc;
//!
//! let control = Arc::new(SystemInterfaceControl::new());
//! let acquirer = LeaseAcquirer::new(control.clone(), Arc::new(MyDhcpClient::new()));
//!
//! for iface in control.interfaces().await? {
//!     let lease = acquirer.acquire(&iface, &LeaseOptions::default()).await?;
//!     println!("{} -> {:?}", iface.name, lease.boot_location());
//! }
//! ```

pub mod acquire;
pub mod error;
pub mod interface;
pub mod lease;
pub mod system;

pub use acquire::*;
pub use error::*;
pub use interface::*;
pub use lease::*;
pub use system::*;
