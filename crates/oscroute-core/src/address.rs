//! Address normalization
//!
//! OSC addresses are `/`-delimited paths:
//! ```text
//! /synth/1/freq
//! /instrument/3/volume
//! ```
//!
//! Empty segments are discarded, so `/a//b/`, `a/b` and `/a/b` all name the
//! same address. Matching is exact per segment; no wildcard expansion.

use crate::{Error, Result};

/// A normalized address: the ordered list of its non-empty segments
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Address {
    segments: Vec<String>,
}

impl Address {
    /// Normalize a path string. Never fails; `""` and `"/"` yield the root.
    pub fn normalize(path: &str) -> Self {
        let segments = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        Self { segments }
    }

    /// Build an address from pre-tokenized segments
    pub fn from_segments<I, S>(segments: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();

        for seg in &segments {
            if seg.is_empty() {
                return Err(Error::invalid_argument("empty address segment"));
            }
            if seg.contains('/') {
                return Err(Error::invalid_argument(format!(
                    "address segment contains '/': {}",
                    seg
                )));
            }
        }

        Ok(Self { segments })
    }

    /// The root address (no segments)
    pub fn root() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for seg in &self.segments {
            write!(f, "/{}", seg)?;
        }
        Ok(())
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Address::normalize(s)
    }
}

impl TryFrom<Vec<String>> for Address {
    type Error = Error;

    fn try_from(segments: Vec<String>) -> Result<Self> {
        Address::from_segments(segments)
    }
}
