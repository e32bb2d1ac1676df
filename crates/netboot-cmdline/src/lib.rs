//! Netboot kernel command-line handling
//!
//! This crate rewrites the kernel command line of a resolved boot image
//! before it is handed to kexec:
//!
//! - **Filter**: drop parameters by key. Keys compare canonically, so
//!   `my-flag` and `my_flag` name the same parameter.
//! - **Merge**: filter, then append literal text and parameters reused from
//!   the running kernel's own command line.
//!
//! Tokenization is quote-aware: `a b="c d" e` is three parameters, and
//! tokens are always kept verbatim, never re-quoted.
//!
//! # Example
//!
//! ```
//! use netboot_cmdline::{FilterSpec, KernelCmdline};
//!
//! let running = KernelCmdline::parse("console=ttyS0,115200 quiet");
//! let spec = FilterSpec::new()
//!     .with_remove(["console"])
//!     .with_reuse(["console"])
//!     .with_append("ip=dhcp");
//!
//! let merged = spec.apply("console=tty0 root=/dev/nfs", &running);
//! assert_eq!(merged, "root=/dev/nfs ip=dhcp console=ttyS0,115200");
//! ```

pub mod filter;
pub mod lookup;

pub use filter::*;
pub use lookup::*;
