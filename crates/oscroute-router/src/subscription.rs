//! Subscription entries and tokens

use oscroute_core::{Error, Result};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Subscriber callback
pub type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Handle returned by `subscribe`, the only way to remove that subscription.
///
/// Tokens are issued from a per-router counter starting at zero and are
/// never reused. The string form is the decimal counter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Token(u64);

impl Token {
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Token {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(Error::invalid_argument("missing subscription token"));
        }
        s.parse::<u64>()
            .map(Token)
            .map_err(|_| Error::invalid_argument(format!("malformed subscription token: {}", s)))
    }
}

/// A subscription entry
pub struct Subscription<T> {
    pub token: Token,
    pub callback: Callback<T>,
}

impl<T> Subscription<T> {
    pub fn new(token: Token, callback: Callback<T>) -> Self {
        Self { token, callback }
    }
}

impl<T> Clone for Subscription<T> {
    fn clone(&self) -> Self {
        Self {
            token: self.token,
            callback: Arc::clone(&self.callback),
        }
    }
}

impl<T> fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}

/// Remove every entry carrying `token`, returning whether any were removed
pub(crate) fn remove_token<T>(subs: &mut Vec<Subscription<T>>, token: &Token) -> bool {
    let before = subs.len();
    subs.retain(|s| s.token != *token);
    subs.len() != before
}
