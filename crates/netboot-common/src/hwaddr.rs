//! Link-layer hardware address

use std::fmt;

/// Hardware (MAC) address of a network interface
///
/// Stored as raw bytes; links other than Ethernet may use other lengths.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct HardwareAddr(Vec<u8>);

impl HardwareAddr {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<[u8; 6]> for HardwareAddr {
    fn from(bytes: [u8; 6]) -> Self {
        Self(bytes.to_vec())
    }
}

impl fmt::Display for HardwareAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(":")?;
            }
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_lowercase_hex() {
        let addr = HardwareAddr::from([0x00, 0x1A, 0x2b, 0x3C, 0x4d, 0xFF]);
        assert_eq!(addr.to_string(), "00:1a:2b:3c:4d:ff");
    }

    #[test]
    fn test_bytes_round_trip() {
        let addr = HardwareAddr::new(vec![0x80, 0x00, 0x02, 0x08]);
        assert_eq!(addr.as_bytes(), &[0x80, 0x00, 0x02, 0x08]);
        assert_eq!(addr.to_string(), "80:00:02:08");
        assert!(HardwareAddr::default().is_empty());
    }
}
