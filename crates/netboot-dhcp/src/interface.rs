//! Network interfaces and the control seam used to configure them

use crate::error::InterfaceError;
use crate::lease::LeaseResult;
use async_trait::async_trait;
use netboot_common::HardwareAddr;

/// A network interface as seen by the platform's network stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkInterface {
    /// Interface name (e.g. "eth0")
    pub name: String,

    /// Link-layer address
    pub hardware_addr: HardwareAddr,

    /// Administrative state
    pub is_up: bool,
}

impl NetworkInterface {
    pub fn new(name: impl Into<String>, hardware_addr: HardwareAddr) -> Self {
        Self {
            name: name.into(),
            hardware_addr,
            is_up: false,
        }
    }

    pub fn with_up(mut self, is_up: bool) -> Self {
        self.is_up = is_up;
        self
    }
}

/// Trait for enumerating and configuring network interfaces
#[async_trait]
pub trait InterfaceControl: Send + Sync {
    /// List the interfaces known to the system
    async fn interfaces(&self) -> Result<Vec<NetworkInterface>, InterfaceError>;

    /// Bring the interface administratively up
    async fn bring_up(&self, iface: &NetworkInterface) -> Result<(), InterfaceError>;

    /// Apply the addresses and routes of a lease to the interface
    async fn configure(
        &self,
        iface: &NetworkInterface,
        lease: &LeaseResult,
    ) -> Result<(), InterfaceError>;
}
