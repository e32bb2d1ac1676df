//! Per-interface boot attempts
//!
//! [`Netboot::run`] walks the enumerated interfaces in order. Every failure
//! below enumeration is logged and the walk moves on to the next interface.
//! The first image that is dispatched ends the run.

use crate::config::NetbootConfig;
use crate::error::{AttemptError, NetbootError, Result};
use netboot_boot::{
    BootExecutor, BootResolver, DirectoryConfigSource, KexecExecutor, Resolution, ScriptConfigSource,
};
use netboot_cmdline::{CmdlineLookup, KernelCmdline};
use netboot_common::BootImage;
use netboot_dhcp::{
    InterfaceControl, LeaseAcquirer, LeaseClient, NetworkInterface, SystemInterfaceControl,
};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// External systems a netboot run talks to
#[derive(Clone)]
pub struct Collaborators {
    pub interfaces: Arc<dyn InterfaceControl>,
    pub lease_client: Arc<dyn LeaseClient>,
    pub script_source: Arc<dyn ScriptConfigSource>,
    pub directory_source: Arc<dyn DirectoryConfigSource>,
    pub executor: Arc<dyn BootExecutor>,
    /// Running kernel's command line, consulted for reused keys
    pub cmdline: Arc<dyn CmdlineLookup + Send + Sync>,
}

impl Collaborators {
    /// Collaborators for the running Linux system
    ///
    /// Interfaces come from the datalink layer and are configured with `ip`,
    /// images are booted with kexec and reused parameters are read from
    /// `/proc/cmdline`. The lease client and both configuration sources are
    /// supplied by the caller.
    pub fn system(
        lease_client: Arc<dyn LeaseClient>,
        script_source: Arc<dyn ScriptConfigSource>,
        directory_source: Arc<dyn DirectoryConfigSource>,
    ) -> Self {
        Self {
            interfaces: Arc::new(SystemInterfaceControl::new()),
            lease_client,
            script_source,
            directory_source,
            executor: Arc::new(KexecExecutor::new()),
            cmdline: Arc::new(KernelCmdline::from_proc()),
        }
    }
}

/// What happened to the resolved image
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Dry run: the image was reported, not executed
    DryRun { image: BootImage, report: String },

    /// The executor accepted the image
    Executed { image: BootImage },
}

impl Dispatch {
    pub fn image(&self) -> &BootImage {
        match self {
            Dispatch::DryRun { image, .. } | Dispatch::Executed { image } => image,
        }
    }

    pub fn is_dry_run(&self) -> bool {
        matches!(self, Dispatch::DryRun { .. })
    }
}

/// Outcome of one attempted interface
#[derive(Debug)]
pub struct InterfaceAttempt {
    pub interface: String,
    pub result: std::result::Result<Dispatch, AttemptError>,
}

/// Summary of a netboot run
///
/// Interfaces that were skipped by name do not appear.
#[derive(Debug, Default)]
pub struct RunReport {
    pub attempts: Vec<InterfaceAttempt>,
}

impl RunReport {
    /// The dispatch that ended the run, if any
    pub fn dispatched(&self) -> Option<&Dispatch> {
        self.attempts.iter().find_map(|a| a.result.as_ref().ok())
    }

    /// Failed attempts in the order they happened
    pub fn failures(&self) -> impl Iterator<Item = (&str, &AttemptError)> {
        self.attempts
            .iter()
            .filter_map(|a| a.result.as_ref().err().map(|e| (a.interface.as_str(), e)))
    }
}

/// Network boot orchestrator
pub struct Netboot {
    config: NetbootConfig,
    interfaces: Arc<dyn InterfaceControl>,
    acquirer: LeaseAcquirer,
    resolver: BootResolver,
    executor: Arc<dyn BootExecutor>,
    cmdline: Arc<dyn CmdlineLookup + Send + Sync>,
}

impl Netboot {
    pub fn new(config: NetbootConfig, collaborators: Collaborators) -> Self {
        let Collaborators {
            interfaces,
            lease_client,
            script_source,
            directory_source,
            executor,
            cmdline,
        } = collaborators;

        Self {
            config,
            acquirer: LeaseAcquirer::new(interfaces.clone(), lease_client),
            resolver: BootResolver::new(script_source, directory_source),
            interfaces,
            executor,
            cmdline,
        }
    }

    pub fn config(&self) -> &NetbootConfig {
        &self.config
    }

    /// Try to boot from each candidate interface until one dispatches
    ///
    /// Only an invalid configuration or a failure to enumerate interfaces
    /// is an error. A run where no interface booted returns `Ok` with the
    /// failures in the report.
    pub async fn run(&self) -> Result<RunReport> {
        self.config.validate()?;

        let interfaces = self
            .interfaces
            .interfaces()
            .await
            .map_err(NetbootError::Enumerate)?;

        let mut report = RunReport::default();

        for iface in &interfaces {
            if iface.name != self.config.boot_interface {
                debug!(interface = %iface.name, "Skipping interface");
                continue;
            }

            info!(interface = %iface.name, mac = %iface.hardware_addr, "Attempting to netboot");

            let result = self.attempt(iface).await;
            let dispatched = match &result {
                Ok(dispatch) => {
                    info!(interface = %iface.name, image = %dispatch.image(), "Boot image dispatched");
                    true
                }
                Err(e) => {
                    warn!(interface = %iface.name, error = %e, "Netboot attempt failed");
                    false
                }
            };

            report.attempts.push(InterfaceAttempt {
                interface: iface.name.clone(),
                result,
            });

            if dispatched {
                break;
            }
        }

        if report.dispatched().is_none() {
            warn!(
                attempted = report.attempts.len(),
                boot_interface = %self.config.boot_interface,
                "No interface booted"
            );
        }

        Ok(report)
    }

    async fn attempt(&self, iface: &NetworkInterface) -> std::result::Result<Dispatch, AttemptError> {
        let lease = self
            .acquirer
            .acquire(iface, &self.config.lease_options())
            .await?;

        let location = lease
            .boot_location()
            .map_err(|source| AttemptError::NoBootInfo {
                interface: iface.name.clone(),
                source,
            })?;

        info!(interface = %iface.name, location = %location, "Got boot location");

        let resolution = self
            .resolver
            .resolve(&location, &iface.hardware_addr, lease.assigned_addr())
            .await?;

        let image = self.rewrite_cmdline(resolution);
        self.dispatch(iface, image).await
    }

    fn rewrite_cmdline(&self, resolution: Resolution) -> BootImage {
        let format = resolution.format();
        let image = resolution.into_image();
        let cmdline = self.config.filter.apply(&image.cmdline, self.cmdline.as_ref());

        debug!(
            format,
            original = %image.cmdline,
            rewritten = %cmdline,
            "Rewrote kernel command line"
        );

        image.with_cmdline(cmdline)
    }

    async fn dispatch(
        &self,
        iface: &NetworkInterface,
        image: BootImage,
    ) -> std::result::Result<Dispatch, AttemptError> {
        if self.config.dry_run {
            let report = image.execution_info();
            info!(interface = %iface.name, "Dry run, not executing boot image:\n{}", report);
            return Ok(Dispatch::DryRun { image, report });
        }

        match self.executor.execute(&image).await {
            Ok(()) => Ok(Dispatch::Executed { image }),
            Err(source) => {
                error!(interface = %iface.name, image = %image, error = %source, "Failed to execute boot image");
                Err(AttemptError::Execution {
                    interface: iface.name.clone(),
                    source,
                })
            }
        }
    }
}
