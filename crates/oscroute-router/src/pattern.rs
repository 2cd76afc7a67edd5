//! Subscription patterns
//!
//! A pattern is either free text or a pre-tokenized segment list. Text is
//! resolved against the router's registered channels first; anything that is
//! not an exact channel name is an address.

use oscroute_core::{Address, Result};

/// Caller-supplied subscription target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    /// A channel name or an address path
    Text(String),
    /// Address segments, used as-is
    Segments(Vec<String>),
}

/// A pattern after channel resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Channel(String),
    Address(Address),
}

impl Pattern {
    /// Resolve against a channel membership test
    pub(crate) fn resolve(self, is_channel: impl Fn(&str) -> bool) -> Result<Route> {
        match self {
            Pattern::Text(text) if is_channel(&text) => Ok(Route::Channel(text)),
            Pattern::Text(text) => Ok(Route::Address(Address::normalize(&text))),
            Pattern::Segments(segments) => Ok(Route::Address(Address::from_segments(segments)?)),
        }
    }
}

impl From<&str> for Pattern {
    fn from(s: &str) -> Self {
        Pattern::Text(s.to_string())
    }
}

impl From<String> for Pattern {
    fn from(s: String) -> Self {
        Pattern::Text(s)
    }
}

impl From<&String> for Pattern {
    fn from(s: &String) -> Self {
        Pattern::Text(s.clone())
    }
}

impl From<Vec<String>> for Pattern {
    fn from(segments: Vec<String>) -> Self {
        Pattern::Segments(segments)
    }
}

impl From<Vec<&str>> for Pattern {
    fn from(segments: Vec<&str>) -> Self {
        Pattern::Segments(segments.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for Pattern {
    fn from(segments: &[&str]) -> Self {
        Pattern::Segments(segments.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Pattern {
    fn from(segments: [&str; N]) -> Self {
        Pattern::Segments(segments.iter().map(|s| s.to_string()).collect())
    }
}

impl From<Address> for Pattern {
    fn from(address: Address) -> Self {
        Pattern::Segments(address.segments().to_vec())
    }
}

impl From<&Address> for Pattern {
    fn from(address: &Address) -> Self {
        Pattern::Segments(address.segments().to_vec())
    }
}
