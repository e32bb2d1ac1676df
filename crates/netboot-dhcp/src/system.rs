//! Linux interface control via the datalink layer and iproute2
//!
//! Interfaces are enumerated with `pnet::datalink` and configured by
//! running `ip`, the same way the rest of the boot environment would do it
//! by hand.

use crate::error::InterfaceError;
use crate::interface::{InterfaceControl, NetworkInterface};
use crate::lease::LeaseResult;
use async_trait::async_trait;
use netboot_common::HardwareAddr;
use pnet::datalink;
use pnet::util::MacAddr;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::{debug, info};

/// [`InterfaceControl`] backed by `pnet::datalink` and the `ip` command
#[derive(Debug, Clone)]
pub struct SystemInterfaceControl {
    ip_command: PathBuf,
}

impl Default for SystemInterfaceControl {
    fn default() -> Self {
        Self {
            ip_command: PathBuf::from("ip"),
        }
    }
}

impl SystemInterfaceControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different `ip` binary
    pub fn with_ip_command(mut self, command: impl Into<PathBuf>) -> Self {
        self.ip_command = command.into();
        self
    }

    async fn run_ip(&self, args: &[String]) -> Result<(), InterfaceError> {
        let command = format!("{} {}", self.ip_command.display(), args.join(" "));
        debug!(command = %command, "Running interface command");

        let output = Command::new(&self.ip_command)
            .args(args)
            .output()
            .await
            .map_err(|source| InterfaceError::Spawn {
                command: command.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(InterfaceError::CommandFailed {
                command,
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl InterfaceControl for SystemInterfaceControl {
    async fn interfaces(&self) -> Result<Vec<NetworkInterface>, InterfaceError> {
        let found = tokio::task::spawn_blocking(datalink::interfaces)
            .await
            .map_err(|e| InterfaceError::Enumerate(e.to_string()))?;

        let mut interfaces: Vec<NetworkInterface> = found
            .into_iter()
            .map(|iface| {
                let is_up = iface.is_up();
                to_interface(iface.name, iface.mac, is_up)
            })
            .collect();

        interfaces.sort_by(|a, b| a.name.cmp(&b.name));
        interfaces.dedup_by(|a, b| a.name == b.name);
        debug!(count = interfaces.len(), "Enumerated network interfaces");

        Ok(interfaces)
    }

    async fn bring_up(&self, iface: &NetworkInterface) -> Result<(), InterfaceError> {
        self.run_ip(&link_up_args(&iface.name)).await
    }

    async fn configure(
        &self,
        iface: &NetworkInterface,
        lease: &LeaseResult,
    ) -> Result<(), InterfaceError> {
        let addr = lease.assigned_addr();
        if addr.is_unspecified() {
            return Err(InterfaceError::NoAssignedAddress);
        }

        self.run_ip(&addr_args(&iface.name, addr, lease.subnet_mask()))
            .await?;

        if let Some(router) = lease.routers().first() {
            self.run_ip(&route_args(&iface.name, *router)).await?;
        }

        info!(
            interface = %iface.name,
            address = %addr,
            prefix = prefix_len(lease.subnet_mask()),
            router = ?lease.routers().first(),
            "Configured interface from lease"
        );

        Ok(())
    }
}

fn to_interface(name: String, mac: Option<MacAddr>, is_up: bool) -> NetworkInterface {
    let hardware_addr = mac
        .map(|m| HardwareAddr::from([m.0, m.1, m.2, m.3, m.4, m.5]))
        .unwrap_or_default();
    NetworkInterface::new(name, hardware_addr).with_up(is_up)
}

fn link_up_args(name: &str) -> Vec<String> {
    ["link", "set", "dev", name, "up"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn addr_args(name: &str, addr: Ipv4Addr, mask: Option<Ipv4Addr>) -> Vec<String> {
    vec![
        "addr".to_string(),
        "replace".to_string(),
        format!("{}/{}", addr, prefix_len(mask)),
        "dev".to_string(),
        name.to_string(),
    ]
}

fn route_args(name: &str, router: Ipv4Addr) -> Vec<String> {
    vec![
        "route".to_string(),
        "replace".to_string(),
        "default".to_string(),
        "via".to_string(),
        router.to_string(),
        "dev".to_string(),
        name.to_string(),
    ]
}

/// Prefix length of a netmask; a missing mask means a host route
fn prefix_len(mask: Option<Ipv4Addr>) -> u32 {
    mask.map(|m| u32::from(m).leading_ones()).unwrap_or(32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dhcproto::v4::{DhcpOption, Message};

    fn lease_with(addr: Ipv4Addr) -> LeaseResult {
        let mut msg = Message::default();
        msg.set_yiaddr(addr);
        LeaseResult::new(msg)
    }

    #[test]
    fn test_to_interface() {
        let iface = to_interface("eth0".to_string(), Some(MacAddr::new(0x52, 0x54, 0, 0x12, 0x34, 0x56)), true);
        assert_eq!(iface.name, "eth0");
        assert_eq!(iface.hardware_addr.to_string(), "52:54:00:12:34:56");
        assert!(iface.is_up);

        let iface = to_interface("tun0".to_string(), None, false);
        assert!(iface.hardware_addr.is_empty());
        assert!(!iface.is_up);
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_interfaces_are_sorted_and_unique() {
        let interfaces = SystemInterfaceControl::new().interfaces().await.unwrap();

        let names: Vec<&str> = interfaces.iter().map(|i| i.name.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_command_args() {
        assert_eq!(link_up_args("eth0").join(" "), "link set dev eth0 up");
        assert_eq!(
            addr_args("eth0", Ipv4Addr::new(10, 0, 0, 50), Some(Ipv4Addr::new(255, 255, 255, 0)))
                .join(" "),
            "addr replace 10.0.0.50/24 dev eth0"
        );
        assert_eq!(
            route_args("eth0", Ipv4Addr::new(10, 0, 0, 1)).join(" "),
            "route replace default via 10.0.0.1 dev eth0"
        );
    }

    #[test]
    fn test_prefix_len() {
        assert_eq!(prefix_len(Some(Ipv4Addr::new(255, 255, 255, 0))), 24);
        assert_eq!(prefix_len(Some(Ipv4Addr::new(255, 255, 240, 0))), 20);
        assert_eq!(prefix_len(Some(Ipv4Addr::new(0, 0, 0, 0))), 0);
        assert_eq!(prefix_len(None), 32);
    }

    #[tokio::test]
    async fn test_configure_rejects_unspecified_address() {
        let control = SystemInterfaceControl::new().with_ip_command("true");
        let iface = NetworkInterface::new("eth0", HardwareAddr::default());

        let err = control
            .configure(&iface, &lease_with(Ipv4Addr::UNSPECIFIED))
            .await
            .unwrap_err();
        assert!(matches!(err, InterfaceError::NoAssignedAddress));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_exit_status() {
        let iface = NetworkInterface::new("eth0", HardwareAddr::default());

        let ok = SystemInterfaceControl::new().with_ip_command("true");
        assert!(ok.bring_up(&iface).await.is_ok());

        let mut msg = Message::default();
        msg.set_yiaddr(Ipv4Addr::new(10, 0, 0, 50));
        msg.opts_mut().insert(DhcpOption::Router(vec![Ipv4Addr::new(10, 0, 0, 1)]));
        assert!(ok.configure(&iface, &LeaseResult::new(msg)).await.is_ok());

        let failing = SystemInterfaceControl::new().with_ip_command("false");
        let err = failing.bring_up(&iface).await.unwrap_err();
        assert!(matches!(err, InterfaceError::CommandFailed { code: Some(1), .. }));
    }

    #[tokio::test]
    async fn test_missing_command() {
        let control =
            SystemInterfaceControl::new().with_ip_command("/nonexistent/netboot-ip-command");
        let iface = NetworkInterface::new("eth0", HardwareAddr::default());

        let err = control.bring_up(&iface).await.unwrap_err();
        assert!(matches!(err, InterfaceError::Spawn { .. }));
    }
}
