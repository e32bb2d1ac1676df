//! DHCP leases and the lease protocol seam
//!
//! A [`LeaseResult`] wraps the server's reply and derives the values the
//! boot flow needs from it, most importantly the boot location.

use crate::error::{BootInfoError, LeaseClientError};
use crate::interface::NetworkInterface;
use async_trait::async_trait;
use dhcproto::v4::{DhcpOption, Message, OptionCode};
use netboot_common::BootLocation;
use std::net::Ipv4Addr;
use std::time::Duration;

/// Bounds for a single lease request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaseOptions {
    /// Time to wait for each exchange
    pub timeout: Duration,

    /// Number of retries the lease client may make
    pub retries: u32,
}

impl Default for LeaseOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            retries: 5,
        }
    }
}

impl LeaseOptions {
    pub fn new(timeout: Duration, retries: u32) -> Self {
        Self { timeout, retries }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }
}

/// Trait for the DHCPv4 protocol implementation
///
/// A call is one lease session bound to `iface`: the client performs its
/// own retransmissions within `options` and returns the server's ACK.
#[async_trait]
pub trait LeaseClient: Send + Sync {
    async fn request(
        &self,
        iface: &NetworkInterface,
        options: &LeaseOptions,
    ) -> Result<Message, LeaseClientError>;
}

/// A lease obtained from a DHCP server
#[derive(Debug, Clone)]
pub struct LeaseResult {
    message: Message,
}

impl LeaseResult {
    pub fn new(message: Message) -> Self {
        Self { message }
    }

    /// The raw DHCP reply
    pub fn message(&self) -> &Message {
        &self.message
    }

    /// Address assigned to the client (yiaddr)
    pub fn assigned_addr(&self) -> Ipv4Addr {
        self.message.yiaddr()
    }

    /// Next server address (siaddr)
    pub fn server_addr(&self) -> Ipv4Addr {
        self.message.siaddr()
    }

    /// Subnet mask (option 1)
    pub fn subnet_mask(&self) -> Option<Ipv4Addr> {
        match self.message.opts().get(OptionCode::SubnetMask) {
            Some(DhcpOption::SubnetMask(mask)) => Some(*mask),
            _ => None,
        }
    }

    /// Routers (option 3)
    pub fn routers(&self) -> &[Ipv4Addr] {
        match self.message.opts().get(OptionCode::Router) {
            Some(DhcpOption::Router(routers)) => routers.as_slice(),
            _ => &[],
        }
    }

    /// DNS servers (option 6)
    pub fn dns_servers(&self) -> &[Ipv4Addr] {
        match self.message.opts().get(OptionCode::DomainNameServer) {
            Some(DhcpOption::DomainNameServer(servers)) => servers.as_slice(),
            _ => &[],
        }
    }

    /// Lease duration (option 51)
    pub fn lease_time(&self) -> Option<Duration> {
        match self.message.opts().get(OptionCode::AddressLeaseTime) {
            Some(DhcpOption::AddressLeaseTime(secs)) => Some(Duration::from_secs(u64::from(*secs))),
            _ => None,
        }
    }

    /// Boot file name: the `file` header field, falling back to option 67
    pub fn boot_file(&self) -> Option<String> {
        header_string(self.message.fname()).or_else(|| {
            match self.message.opts().get(OptionCode::BootfileName) {
                Some(DhcpOption::BootfileName(name)) => header_string(Some(name.as_slice())),
                _ => None,
            }
        })
    }

    /// Boot server name: the `sname` header field, falling back to option 66
    pub fn server_name(&self) -> Option<String> {
        header_string(self.message.sname()).or_else(|| {
            match self.message.opts().get(OptionCode::TFTPServerName) {
                Some(DhcpOption::TFTPServerName(name)) => header_string(Some(name.as_slice())),
                _ => None,
            }
        })
    }

    /// Location of the boot configuration named by this lease
    ///
    /// A boot file that is already an absolute URL (`http://...`) is used
    /// as-is. Otherwise it is fetched over TFTP from the server name, or
    /// from siaddr when no name is given.
    pub fn boot_location(&self) -> Result<BootLocation, BootInfoError> {
        let file = self.boot_file().ok_or(BootInfoError::NoBootFile)?;

        if let Ok(location) = BootLocation::parse(&file) {
            if !location.as_url().cannot_be_a_base() {
                return Ok(location);
            }
        }

        let host = self
            .server_name()
            .or_else(|| {
                let siaddr = self.server_addr();
                (!siaddr.is_unspecified()).then(|| siaddr.to_string())
            })
            .ok_or_else(|| BootInfoError::NoServer(file.clone()))?;

        Ok(BootLocation::tftp(&host, &file)?)
    }
}

impl From<Message> for LeaseResult {
    fn from(message: Message) -> Self {
        Self::new(message)
    }
}

/// Decode a NUL padded BOOTP header string
fn header_string(bytes: Option<&[u8]>) -> Option<String> {
    let bytes = bytes?;
    let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
    let value = String::from_utf8_lossy(&bytes[..end]).trim().to_string();
    (!value.is_empty()).then_some(value)
}
