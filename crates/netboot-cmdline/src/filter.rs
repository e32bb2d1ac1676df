//! Quote-aware kernel command-line filtering and merging

use crate::lookup::CmdlineLookup;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tracing::debug;

/// Check whether `c` carries the Unicode `Quotation_Mark` property
pub fn is_quotation_mark(c: char) -> bool {
    matches!(
        c,
        '\u{0022}'
            | '\u{0027}'
            | '\u{00AB}'
            | '\u{00BB}'
            | '\u{2018}'..='\u{201F}'
            | '\u{2039}'
            | '\u{203A}'
            | '\u{2E42}'
            | '\u{300C}'..='\u{300F}'
            | '\u{301D}'..='\u{301F}'
            | '\u{FE41}'..='\u{FE44}'
            | '\u{FF02}'
            | '\u{FF07}'
            | '\u{FF62}'
            | '\u{FF63}'
    )
}

/// Iterator over the whitespace-separated tokens of a command line
///
/// Whitespace inside a quoted span does not split. A span opens on any
/// quotation mark and closes on the next occurrence of that same character;
/// the quotes stay part of the token. An unterminated span runs to the end
/// of the input.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    rest: &'a str,
}

/// Split a command line into quote-aware tokens
pub fn tokenize(line: &str) -> Tokens<'_> {
    Tokens { rest: line }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let rest = self.rest;
        let mut open_quote: Option<char> = None;
        let mut start: Option<usize> = None;

        for (idx, c) in rest.char_indices() {
            let is_separator = match open_quote {
                Some(quote) if c == quote => {
                    open_quote = None;
                    false
                }
                Some(_) => false,
                None if is_quotation_mark(c) => {
                    open_quote = Some(c);
                    false
                }
                None => c.is_whitespace(),
            };

            match (is_separator, start) {
                (true, Some(begin)) => {
                    self.rest = &rest[idx + c.len_utf8()..];
                    return Some(&rest[begin..idx]);
                }
                (false, None) => start = Some(idx),
                _ => {}
            }
        }

        self.rest = "";
        start.map(|begin| &rest[begin..])
    }
}

/// Canonical form of a parameter key: `-` and `_` are equivalent
pub fn canonical_key(key: &str) -> Cow<'_, str> {
    if key.contains('-') {
        Cow::Owned(key.replace('-', "_"))
    } else {
        Cow::Borrowed(key)
    }
}

/// A single command-line parameter split at its first `=`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Param<'a> {
    /// The token exactly as it appeared
    pub raw: &'a str,
    pub key: &'a str,
    pub value: Option<&'a str>,
}

impl<'a> Param<'a> {
    pub fn parse(raw: &'a str) -> Self {
        match raw.split_once('=') {
            Some((key, value)) => Self {
                raw,
                key,
                value: Some(value),
            },
            None => Self {
                raw,
                key: raw,
                value: None,
            },
        }
    }

    pub fn canonical_key(&self) -> Cow<'a, str> {
        canonical_key(self.key)
    }
}

/// Remove every parameter whose key matches one of `remove`
///
/// Surviving tokens keep their original text and order and are joined by
/// single spaces.
pub fn filter<S: AsRef<str>>(line: &str, remove: &[S]) -> String {
    let remove: Vec<Cow<'_, str>> = remove.iter().map(|k| canonical_key(k.as_ref())).collect();

    let kept: Vec<&str> = tokenize(line)
        .filter(|token| !token.is_empty())
        .filter(|token| {
            let key = Param::parse(token).canonical_key();
            !remove.iter().any(|r| *r == key)
        })
        .collect();

    kept.join(" ")
}

/// Filter `line`, then append `append` and the reused parameters
///
/// The result is the filtered line, followed by ` <append>` when `append`
/// is non-empty, followed by ` key=value` for every key in `reuse` (in
/// order) that `lookup` knows about. Keys the lookup does not know are
/// skipped.
pub fn merge<S, R, L>(line: &str, append: &str, remove: &[S], reuse: &[R], lookup: &L) -> String
where
    S: AsRef<str>,
    R: AsRef<str>,
    L: CmdlineLookup + ?Sized,
{
    let mut suffix = String::new();
    if !append.is_empty() {
        suffix.push(' ');
        suffix.push_str(append);
    }

    for key in reuse {
        let key = key.as_ref();
        if let Some(value) = lookup.flag(key) {
            debug!(key = %key, value = %value, "Reusing parameter from running kernel");
            suffix.push(' ');
            suffix.push_str(key);
            suffix.push('=');
            suffix.push_str(&value);
        }
    }
    debug!(suffix = %suffix, "Command line suffix");

    let mut merged = filter(line, remove);
    merged.push_str(&suffix);
    merged
}

/// Immutable description of how to rewrite a boot image's command line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSpec {
    /// Keys to drop from the resolved command line
    pub remove: Vec<String>,

    /// Keys to copy from the running kernel's command line
    pub reuse: Vec<String>,

    /// Literal text appended after the filtered line
    pub append: String,
}

/// Drops the resolved `console=` and carries over the running one.
impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            remove: vec!["console".to_string()],
            reuse: vec!["console".to_string()],
            append: String::new(),
        }
    }
}

impl FilterSpec {
    /// Create an empty spec that leaves command lines untouched
    pub fn new() -> Self {
        Self {
            remove: Vec::new(),
            reuse: Vec::new(),
            append: String::new(),
        }
    }

    pub fn with_remove<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.remove = keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_reuse<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reuse = keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_append(mut self, append: impl Into<String>) -> Self {
        self.append = append.into();
        self
    }

    /// Rewrite `line` according to this spec
    pub fn apply<L: CmdlineLookup + ?Sized>(&self, line: &str, lookup: &L) -> String {
        merge(line, &self.append, &self.remove, &self.reuse, lookup)
    }
}
