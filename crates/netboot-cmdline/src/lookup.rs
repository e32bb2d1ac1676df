//! Lookup of parameters on the running kernel's command line

use crate::filter::{canonical_key, tokenize, Param};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

const PROC_CMDLINE: &str = "/proc/cmdline";

/// Source of the current boot's kernel parameters
pub trait CmdlineLookup {
    /// Value of the parameter `key`, if it was set
    fn flag(&self, key: &str) -> Option<String>;
}

impl<F> CmdlineLookup for F
where
    F: Fn(&str) -> Option<String>,
{
    fn flag(&self, key: &str) -> Option<String> {
        self(key)
    }
}

/// Parsed kernel command line
///
/// Keys are stored canonically. A parameter without `=` has the value
/// `"1"`, surrounding quotes are trimmed from values and the last
/// occurrence of a key wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KernelCmdline {
    raw: String,
    params: HashMap<String, String>,
}

impl KernelCmdline {
    pub fn parse(line: &str) -> Self {
        let params = tokenize(line)
            .map(Param::parse)
            .map(|param| {
                let value = param
                    .value
                    .map(|v| v.trim_matches(|c| c == '"' || c == '\''))
                    .unwrap_or("1");
                (param.canonical_key().into_owned(), value.to_string())
            })
            .collect();

        Self {
            raw: line.trim().to_string(),
            params,
        }
    }

    /// Read the running kernel's command line from `/proc/cmdline`
    pub fn from_proc() -> Self {
        Self::from_path(PROC_CMDLINE)
    }

    /// Read a command line from `path`
    ///
    /// An unreadable file yields an empty command line.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(content) => {
                debug!(path = %path.display(), cmdline = %content.trim(), "Read kernel command line");
                Self::parse(&content)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read kernel command line");
                Self::default()
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl CmdlineLookup for KernelCmdline {
    fn flag(&self, key: &str) -> Option<String> {
        self.params.get(canonical_key(key).as_ref()).cloned()
    }
}
