//! Kexec hand-off into a resolved boot image
//!
//! Loads the kernel with `kexec -l` and jumps into it with `kexec -e`,
//! replacing the running kernel without a firmware reboot.

use crate::error::ExecError;
use async_trait::async_trait;
use netboot_common::BootImage;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::{info, warn};
use url::Url;

/// Trait for handing a boot image over to the machine
#[async_trait]
pub trait BootExecutor: Send + Sync {
    /// Boot `image`
    ///
    /// A real hand-off does not return. `Ok(())` is for executors that only
    /// schedule the boot.
    async fn execute(&self, image: &BootImage) -> Result<(), ExecError>;
}

/// [`BootExecutor`] using the kexec-tools binary
#[derive(Debug, Clone)]
pub struct KexecExecutor {
    kexec_command: PathBuf,
}

impl Default for KexecExecutor {
    fn default() -> Self {
        Self {
            kexec_command: PathBuf::from("kexec"),
        }
    }
}

impl KexecExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different kexec binary
    pub fn with_kexec_command(mut self, command: impl Into<PathBuf>) -> Self {
        self.kexec_command = command.into();
        self
    }

    fn command_string(&self, args: &[String]) -> String {
        format!("{} {}", self.kexec_command.display(), args.join(" "))
    }
}

#[async_trait]
impl BootExecutor for KexecExecutor {
    async fn execute(&self, image: &BootImage) -> Result<(), ExecError> {
        let args = load_args(image)?;

        info!(
            kernel = %image.kernel,
            initrd = ?image.initrd,
            cmdline = %image.cmdline,
            "Loading kernel with kexec"
        );

        let load = Command::new(&self.kexec_command)
            .args(&args)
            .output()
            .await
            .map_err(|source| ExecError::Spawn {
                command: self.command_string(&args),
                source,
            })?;

        if !load.status.success() {
            return Err(ExecError::LoadFailed {
                code: load.status.code(),
                stderr: String::from_utf8_lossy(&load.stderr).trim().to_string(),
            });
        }

        if let Err(e) = Command::new("sync").output().await {
            warn!(error = %e, "Failed to sync filesystems before kexec");
        }

        info!("Executing kexec");

        let exec = Command::new(&self.kexec_command)
            .arg("-e")
            .output()
            .await
            .map_err(|source| ExecError::Spawn {
                command: self.command_string(&["-e".to_string()]),
                source,
            })?;

        // Still running, so the jump did not happen
        Err(ExecError::ExecReturned {
            code: exec.status.code(),
            stderr: String::from_utf8_lossy(&exec.stderr).trim().to_string(),
        })
    }
}

/// Arguments for `kexec -l`
fn load_args(image: &BootImage) -> Result<Vec<String>, ExecError> {
    let mut args = vec!["-l".to_string(), local_path(&image.kernel)?];

    if let Some(ref initrd) = image.initrd {
        args.push(format!("--initrd={}", local_path(initrd)?));
    }

    args.push(format!("--command-line={}", image.cmdline));
    Ok(args)
}

/// Local filesystem path of an image reference
///
/// kexec only reads local files. Plain paths pass through, `file` URLs are
/// converted to paths and any other URL is rejected.
fn local_path(reference: &str) -> Result<String, ExecError> {
    match Url::parse(reference) {
        Ok(url) if url.scheme() == "file" => url
            .to_file_path()
            .map(|path| path.to_string_lossy().into_owned())
            .map_err(|()| ExecError::NotLocal(reference.to_string())),
        Ok(_) => Err(ExecError::NotLocal(reference.to_string())),
        Err(_) => Ok(reference.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_args() {
        let image = BootImage::new("/tmp/boot/vmlinuz")
            .with_initrd("file:///tmp/boot/initrd.img")
            .with_cmdline(r#"root=/dev/nfs init="/bin/sh -x""#);

        assert_eq!(
            load_args(&image).unwrap(),
            vec![
                "-l",
                "/tmp/boot/vmlinuz",
                "--initrd=/tmp/boot/initrd.img",
                r#"--command-line=root=/dev/nfs init="/bin/sh -x""#,
            ]
        );
    }

    #[test]
    fn test_load_args_without_initrd() {
        let image = BootImage::new("/vmlinuz");
        assert_eq!(load_args(&image).unwrap(), vec!["-l", "/vmlinuz", "--command-line="]);
    }

    #[test]
    fn test_remote_kernel_rejected() {
        let image = BootImage::new("tftp://10.0.0.1/vmlinuz");
        let err = load_args(&image).unwrap_err();
        assert!(matches!(err, ExecError::NotLocal(ref r) if r == "tftp://10.0.0.1/vmlinuz"));
    }

    #[cfg(unix)]
    #[test]
    fn test_file_urls() {
        assert_eq!(local_path("/boot/vmlinuz").unwrap(), "/boot/vmlinuz");
        assert_eq!(local_path("vmlinuz").unwrap(), "vmlinuz");
        assert_eq!(local_path("file:///tmp/my%20kernel").unwrap(), "/tmp/my kernel");
        assert_eq!(local_path("file://localhost/tmp/vmlinuz").unwrap(), "/tmp/vmlinuz");
        assert!(matches!(
            local_path("file://fileserver/tmp/vmlinuz"),
            Err(ExecError::NotLocal(_))
        ));
        assert!(matches!(local_path("http://10.0.0.1/vmlinuz"), Err(ExecError::NotLocal(_))));
    }

    #[tokio::test]
    async fn test_missing_kexec_binary() {
        let executor = KexecExecutor::new().with_kexec_command("/nonexistent/netboot-kexec");
        let err = executor.execute(&BootImage::new("/vmlinuz")).await.unwrap_err();
        assert!(matches!(err, ExecError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_load_failure() {
        let executor = KexecExecutor::new().with_kexec_command("false");
        let err = executor.execute(&BootImage::new("/vmlinuz")).await.unwrap_err();
        assert!(matches!(err, ExecError::LoadFailed { code: Some(1), .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exec_returning_is_an_error() {
        let executor = KexecExecutor::new().with_kexec_command("true");
        let err = executor.execute(&BootImage::new("/vmlinuz")).await.unwrap_err();
        assert!(matches!(err, ExecError::ExecReturned { code: Some(0), .. }));
    }
}
