//! Boot location references
//!
//! A boot location is a URL (scheme, host, path) pointing at a boot
//! configuration resource. It is handed out by the DHCP server as a boot
//! file name and later narrowed to its containing directory when the
//! directory-style configuration search takes over.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Structured reference to a boot configuration resource
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BootLocation {
    url: Url,
}

impl BootLocation {
    /// Parse an absolute URL
    pub fn parse(location: &str) -> Result<Self> {
        let url = Url::parse(location).map_err(|source| Error::InvalidLocation {
            location: location.to_string(),
            source,
        })?;
        Ok(Self { url })
    }

    /// Build a `tftp://host/file` location, the default when the boot file
    /// name carries no scheme of its own
    pub fn tftp(host: &str, file: &str) -> Result<Self> {
        if host.is_empty() {
            return Err(Error::MissingHost(file.to_string()));
        }
        Self::parse(&format!("tftp://{}/{}", host, file.trim_start_matches('/')))
    }

    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    /// Host, including the port when one is set
    pub fn host(&self) -> Option<String> {
        let host = self.url.host_str()?;
        Some(match self.url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        })
    }

    pub fn path(&self) -> &str {
        self.url.path()
    }

    pub fn as_url(&self) -> &Url {
        &self.url
    }

    /// Location of the directory containing this resource
    ///
    /// Scheme and host are kept, the path is replaced by its parent
    /// directory and any query or fragment is dropped:
    /// `tftp://10.0.0.1/pxe/pxelinux.0` becomes `tftp://10.0.0.1/pxe`.
    pub fn containing_directory(&self) -> Self {
        let mut url = self.url.clone();
        url.set_path(&parent_dir(self.url.path()));
        url.set_query(None);
        url.set_fragment(None);
        Self { url }
    }
}

impl From<Url> for BootLocation {
    fn from(url: Url) -> Self {
        Self { url }
    }
}

impl FromStr for BootLocation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for BootLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.url, f)
    }
}

/// Parent directory of a slash-separated path, lexically cleaned
///
/// `/a/b` -> `/a`, `/a` -> `/`, `a` -> `.`, `` -> `.`
fn parent_dir(path: &str) -> String {
    let dir = match path.rfind('/') {
        Some(idx) => &path[..=idx],
        None => "",
    };
    clean_path(dir)
}

fn clean_path(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|p| *p != "..") {
                    parts.pop();
                } else if !rooted {
                    parts.push("..");
                }
            }
            _ => parts.push(part),
        }
    }

    let joined = parts.join("/");
    match (rooted, joined.is_empty()) {
        (true, _) => format!("/{}", joined),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}
