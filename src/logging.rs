//! Global tracing subscriber for programs embedding netboot

use std::io::stderr;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter};

/// Install a stderr subscriber for the netboot crates
///
/// `RUST_LOG` overrides the default directives when set.
pub fn init_logging(verbose: bool) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

    registry()
        .with(filter)
        .with(fmt::layer().with_writer(stderr))
        .try_init()
}

fn default_directives(verbose: bool) -> String {
    let level = if verbose { "debug" } else { "info" };
    format!(
        "netboot={level},netboot_dhcp={level},netboot_boot={level},netboot_cmdline={level}",
        level = level
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives() {
        assert_eq!(
            default_directives(false),
            "netboot=info,netboot_dhcp=info,netboot_boot=info,netboot_cmdline=info"
        );
        assert!(default_directives(true).starts_with("netboot=debug,"));
    }
}
