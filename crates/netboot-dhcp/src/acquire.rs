//! Single-interface lease acquisition

use crate::error::{AcquireError, Result};
use crate::interface::{InterfaceControl, NetworkInterface};
use crate::lease::{LeaseClient, LeaseOptions, LeaseResult};
use std::sync::Arc;
use tracing::{debug, info};

/// Brings an interface up, obtains a lease and applies it
pub struct LeaseAcquirer {
    control: Arc<dyn InterfaceControl>,
    client: Arc<dyn LeaseClient>,
}

impl LeaseAcquirer {
    pub fn new(control: Arc<dyn InterfaceControl>, client: Arc<dyn LeaseClient>) -> Self {
        Self { control, client }
    }

    /// Acquire a lease on `iface`
    ///
    /// Each step fails with its own [`AcquireError`] variant. The lease
    /// client owns retries; this method makes exactly one request.
    pub async fn acquire(
        &self,
        iface: &NetworkInterface,
        options: &LeaseOptions,
    ) -> Result<LeaseResult> {
        self.control
            .bring_up(iface)
            .await
            .map_err(|source| AcquireError::InterfaceUp {
                interface: iface.name.clone(),
                source,
            })?;

        debug!(
            interface = %iface.name,
            timeout = ?options.timeout,
            retries = options.retries,
            "Requesting DHCP lease"
        );

        let message = self
            .client
            .request(iface, options)
            .await
            .map_err(|source| AcquireError::Lease {
                interface: iface.name.clone(),
                source,
            })?;
        let lease = LeaseResult::new(message);

        info!(
            interface = %iface.name,
            address = %lease.assigned_addr(),
            server = %lease.server_addr(),
            "Got DHCP lease"
        );

        self.control
            .configure(iface, &lease)
            .await
            .map_err(|source| AcquireError::Configure {
                interface: iface.name.clone(),
                source,
            })?;

        Ok(lease)
    }
}
