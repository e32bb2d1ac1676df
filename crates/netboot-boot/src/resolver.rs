//! Boot configuration resolution with script-then-directory fallback

use crate::error::{DirectoryError, ResolveError, Result, ScriptError};
use async_trait::async_trait;
use netboot_common::{BootImage, BootLocation, HardwareAddr};
use std::net::Ipv4Addr;
use std::sync::Arc;
use tracing::{debug, info};

/// Trait for the script-style configuration format
///
/// The location names a single file that fully describes the boot image
/// (kernel, initrd, command line).
#[async_trait]
pub trait ScriptConfigSource: Send + Sync {
    async fn load(&self, location: &BootLocation) -> std::result::Result<BootImage, ScriptError>;
}

/// Trait for the directory-style configuration format
///
/// The source searches `directory` for the most specific configuration
/// matching the client's hardware and IP address and returns it.
#[async_trait]
pub trait DirectoryConfigSource: Send + Sync {
    async fn find(
        &self,
        directory: &BootLocation,
        hardware_addr: &HardwareAddr,
        ip: Ipv4Addr,
    ) -> std::result::Result<DirectoryConfig, DirectoryError>;
}

/// A labelled boot entry of a directory-style configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootEntry {
    pub label: String,
    pub image: BootImage,
}

/// Directory-style configuration: ordered entries plus a default label
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DirectoryConfig {
    /// Entries in file order
    pub entries: Vec<BootEntry>,

    /// Label of the entry to boot
    pub default_entry: String,
}

impl DirectoryConfig {
    pub fn new(default_entry: impl Into<String>) -> Self {
        Self {
            entries: Vec::new(),
            default_entry: default_entry.into(),
        }
    }

    pub fn with_entry(mut self, label: impl Into<String>, image: BootImage) -> Self {
        self.entries.push(BootEntry {
            label: label.into(),
            image,
        });
        self
    }

    /// Look up an entry by label
    pub fn entry(&self, label: &str) -> Option<&BootImage> {
        self.entries
            .iter()
            .find(|entry| entry.label == label)
            .map(|entry| &entry.image)
    }

    /// The entry named by `default_entry`
    pub fn default_image(&self) -> Option<&BootImage> {
        self.entry(&self.default_entry)
    }
}

/// Outcome of a successful resolution, tagged by the format that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The location itself was a boot script
    Script {
        location: BootLocation,
        image: BootImage,
    },

    /// The default entry of a directory-style configuration
    Directory {
        directory: BootLocation,
        label: String,
        image: BootImage,
    },
}

impl Resolution {
    pub fn image(&self) -> &BootImage {
        match self {
            Resolution::Script { image, .. } | Resolution::Directory { image, .. } => image,
        }
    }

    pub fn into_image(self) -> BootImage {
        match self {
            Resolution::Script { image, .. } | Resolution::Directory { image, .. } => image,
        }
    }

    /// Location the configuration was read from
    pub fn source(&self) -> &BootLocation {
        match self {
            Resolution::Script { location, .. } => location,
            Resolution::Directory { directory, .. } => directory,
        }
    }

    pub fn format(&self) -> &'static str {
        match self {
            Resolution::Script { .. } => "script",
            Resolution::Directory { .. } => "directory",
        }
    }
}

/// Resolves a boot location into a boot image
#[derive(Clone)]
pub struct BootResolver {
    script: Arc<dyn ScriptConfigSource>,
    directory: Arc<dyn DirectoryConfigSource>,
}

impl BootResolver {
    pub fn new(
        script: Arc<dyn ScriptConfigSource>,
        directory: Arc<dyn DirectoryConfigSource>,
    ) -> Self {
        Self { script, directory }
    }

    /// Resolve `location`, probing the script format before the directory
    /// format
    ///
    /// The directory search runs against the location's containing
    /// directory. Its failure is final.
    pub async fn resolve(
        &self,
        location: &BootLocation,
        hardware_addr: &HardwareAddr,
        ip: Ipv4Addr,
    ) -> Result<Resolution> {
        match self.script.load(location).await {
            Ok(image) => {
                info!(location = %location, image = %image, "Got boot script configuration");
                return Ok(Resolution::Script {
                    location: location.clone(),
                    image,
                });
            }
            Err(e) => {
                debug!(location = %location, error = %e, "Not a boot script, trying directory configuration");
            }
        }

        let directory = location.containing_directory();
        let config = self
            .directory
            .find(&directory, hardware_addr, ip)
            .await
            .map_err(|source| ResolveError::BootConfigNotFound {
                directory: directory.clone(),
                source,
            })?;

        let image = config
            .default_image()
            .cloned()
            .ok_or_else(|| ResolveError::DefaultEntryMissing {
                directory: directory.clone(),
                label: config.default_entry.clone(),
            })?;

        info!(
            directory = %directory,
            label = %config.default_entry,
            image = %image,
            "Got directory configuration"
        );

        Ok(Resolution::Directory {
            directory,
            label: config.default_entry,
            image,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct FakeScript {
        image: Option<BootImage>,
        loaded: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ScriptConfigSource for FakeScript {
        async fn load(&self, location: &BootLocation) -> std::result::Result<BootImage, ScriptError> {
            self.loaded.lock().unwrap().push(location.to_string());
            self.image.clone().ok_or_else(|| ScriptError::Parse {
                location: location.clone(),
                reason: "missing #!ipxe header".to_string(),
            })
        }
    }

    struct FakeDirectory {
        config: Option<DirectoryConfig>,
        searched: Mutex<Vec<(String, String, Ipv4Addr)>>,
    }

    #[async_trait]
    impl DirectoryConfigSource for FakeDirectory {
        async fn find(
            &self,
            directory: &BootLocation,
            hardware_addr: &HardwareAddr,
            ip: Ipv4Addr,
        ) -> std::result::Result<DirectoryConfig, DirectoryError> {
            self.searched
                .lock()
                .unwrap()
                .push((directory.to_string(), hardware_addr.to_string(), ip));
            self.config
                .clone()
                .ok_or_else(|| DirectoryError::NotFound(directory.clone()))
        }
    }

    fn fakes(
        script: Option<BootImage>,
        config: Option<DirectoryConfig>,
    ) -> (Arc<FakeScript>, Arc<FakeDirectory>, BootResolver) {
        let script = Arc::new(FakeScript {
            image: script,
            loaded: Mutex::new(Vec::new()),
        });
        let directory = Arc::new(FakeDirectory {
            config,
            searched: Mutex::new(Vec::new()),
        });
        let resolver = BootResolver::new(script.clone(), directory.clone());
        (script, directory, resolver)
    }

    fn mac() -> HardwareAddr {
        HardwareAddr::from([0x52, 0x54, 0x00, 0x12, 0x34, 0x56])
    }

    const IP: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 50);

    #[tokio::test]
    async fn test_script_success_short_circuits() {
        let image = BootImage::new("http://10.0.0.1/vmlinuz").with_cmdline("console=tty0");
        let (script, directory, resolver) = fakes(Some(image.clone()), Some(DirectoryConfig::new("x")));
        let location = BootLocation::parse("http://10.0.0.1/boot/boot.ipxe").unwrap();

        let resolution = resolver.resolve(&location, &mac(), IP).await.unwrap();

        assert_eq!(resolution, Resolution::Script { location, image });
        assert_eq!(script.loaded.lock().unwrap().len(), 1);
        assert!(directory.searched.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fallback_searches_containing_directory_once() {
        let linux = BootImage::new("vmlinuz").with_initrd("initrd.img").with_cmdline("root=/dev/nfs");
        let config = DirectoryConfig::new("linux")
            .with_entry("rescue", BootImage::new("rescue"))
            .with_entry("linux", linux.clone());
        let (script, directory, resolver) = fakes(None, Some(config));
        let location = BootLocation::parse("tftp://10.0.0.1/dir/file").unwrap();

        let resolution = resolver.resolve(&location, &mac(), IP).await.unwrap();

        assert_eq!(*script.loaded.lock().unwrap(), vec!["tftp://10.0.0.1/dir/file"]);
        assert_eq!(
            *directory.searched.lock().unwrap(),
            vec![("tftp://10.0.0.1/dir".to_string(), "52:54:00:12:34:56".to_string(), IP)]
        );
        assert_eq!(resolution.format(), "directory");
        assert_eq!(resolution.source().to_string(), "tftp://10.0.0.1/dir");
        assert_eq!(resolution.into_image(), linux);
    }

    #[tokio::test]
    async fn test_not_found_is_terminal() {
        let (_, directory, resolver) = fakes(None, None);
        let location = BootLocation::parse("tftp://10.0.0.1/pxelinux.0").unwrap();

        let err = resolver.resolve(&location, &mac(), IP).await.unwrap_err();

        assert!(matches!(
            err,
            ResolveError::BootConfigNotFound { ref directory, .. } if directory.path() == "/"
        ));
        assert_eq!(directory.searched.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_default_entry() {
        let config = DirectoryConfig::new("missing").with_entry("linux", BootImage::new("vmlinuz"));
        let (_, _, resolver) = fakes(None, Some(config));
        let location = BootLocation::parse("tftp://10.0.0.1/pxe/pxelinux.0").unwrap();

        let err = resolver.resolve(&location, &mac(), IP).await.unwrap_err();
        assert!(matches!(err, ResolveError::DefaultEntryMissing { ref label, .. } if label == "missing"));
    }

    #[test]
    fn test_directory_config_lookup() {
        let config = DirectoryConfig::new("b")
            .with_entry("a", BootImage::new("ka"))
            .with_entry("b", BootImage::new("kb"));

        assert_eq!(config.entry("a").map(|i| i.kernel.as_str()), Some("ka"));
        assert_eq!(config.default_image().map(|i| i.kernel.as_str()), Some("kb"));
        assert!(config.entry("c").is_none());
        let labels: Vec<&str> = config.entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["a", "b"]);
    }
}
