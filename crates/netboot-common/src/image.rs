//! Resolved boot artifacts

use std::fmt;

/// A Linux boot image: kernel, optional initrd and the kernel command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootImage {
    /// Kernel reference (path or URL, as produced by the config source)
    pub kernel: String,

    /// Initrd reference
    pub initrd: Option<String>,

    /// Raw kernel command line
    pub cmdline: String,
}

impl BootImage {
    pub fn new(kernel: impl Into<String>) -> Self {
        Self {
            kernel: kernel.into(),
            initrd: None,
            cmdline: String::new(),
        }
    }

    pub fn with_initrd(mut self, initrd: impl Into<String>) -> Self {
        self.initrd = Some(initrd.into());
        self
    }

    pub fn with_cmdline(mut self, cmdline: impl Into<String>) -> Self {
        self.cmdline = cmdline.into();
        self
    }

    /// Human readable description of what executing this image would do
    pub fn execution_info(&self) -> String {
        format!(
            "Kernel: {}\nInitrd: {}\nCommand line: {}",
            self.kernel,
            self.initrd.as_deref().unwrap_or("none"),
            self.cmdline
        )
    }
}

impl fmt::Display for BootImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LinuxImage(kernel={}", self.kernel)?;
        if let Some(ref initrd) = self.initrd {
            write!(f, " initrd={}", initrd)?;
        }
        write!(f, " cmdline={:?})", self.cmdline)
    }
}
