//! Address router
//!
//! Owns the subscription trie and the lifecycle channel registry.
//! All operations take `&self`; mutation and traversal are serialized by a
//! single read/write lock. Callbacks run after the lock is released, so a
//! callback may subscribe or unsubscribe on the same router.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

use oscroute_core::{Error, Result, LIFECYCLE_CHANNELS};

use crate::pattern::{Pattern, Route};
use crate::subscription::{remove_token, Callback, Subscription, Token};
use crate::trie::TrieNode;

struct RouterInner<T> {
    channels: HashMap<String, Vec<Subscription<T>>>,
    root: TrieNode<T>,
    next_token: u64,
}

impl<T> RouterInner<T> {
    fn resolve(&self, pattern: Pattern) -> Result<Route> {
        pattern.resolve(|name| self.channels.contains_key(name))
    }
}

/// Routes payloads of type `T` to channel and address subscribers
pub struct AddressRouter<T> {
    inner: RwLock<RouterInner<T>>,
}

impl<T> AddressRouter<T> {
    /// Create a router with the `open`, `error` and `close` channels registered
    pub fn new() -> Self {
        let channels = LIFECYCLE_CHANNELS
            .iter()
            .map(|name| (name.to_string(), Vec::new()))
            .collect();

        Self {
            inner: RwLock::new(RouterInner {
                channels,
                root: TrieNode::new(),
                next_token: 0,
            }),
        }
    }

    /// Register an additional lifecycle channel.
    ///
    /// From then on, the exact string `name` is routed to the channel and no
    /// longer reaches the address trie. Registering an existing channel is a
    /// no-op.
    pub fn register_channel(&self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(Error::invalid_argument("channel name must not be empty"));
        }
        if name.contains('/') {
            return Err(Error::invalid_argument(format!(
                "channel name must not contain '/': {}",
                name
            )));
        }

        self.inner
            .write()
            .channels
            .entry(name.to_string())
            .or_default();
        debug!("Registered channel {}", name);
        Ok(())
    }

    /// Check whether `name` resolves to a lifecycle channel
    pub fn is_channel(&self, name: &str) -> bool {
        self.inner.read().channels.contains_key(name)
    }

    /// Subscribe `callback` to a channel or address
    pub fn subscribe<F>(&self, pattern: impl Into<Pattern>, callback: F) -> Result<Token>
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.subscribe_callback(pattern, Arc::new(callback))
    }

    /// Subscribe an already shared callback
    pub fn subscribe_callback(
        &self,
        pattern: impl Into<Pattern>,
        callback: Callback<T>,
    ) -> Result<Token> {
        let mut inner = self.inner.write();
        let route = inner.resolve(pattern.into())?;

        let token = Token::new(inner.next_token);
        inner.next_token += 1;
        let sub = Subscription::new(token, callback);

        match route {
            Route::Channel(name) => {
                trace!("Subscribed {} to channel {}", token, name);
                inner.channels.entry(name).or_default().push(sub);
            }
            Route::Address(address) => {
                trace!("Subscribed {} to {}", token, address);
                inner.root.insert(address.segments(), sub);
            }
        }

        Ok(token)
    }

    /// Remove the subscription identified by `token`.
    ///
    /// Returns `Ok(false)` when nothing matched, including addresses that
    /// were never subscribed.
    pub fn unsubscribe(&self, pattern: impl Into<Pattern>, token: &Token) -> Result<bool> {
        let mut inner = self.inner.write();
        let route = inner.resolve(pattern.into())?;

        let removed = match route {
            Route::Channel(name) => inner
                .channels
                .get_mut(&name)
                .map(|subs| remove_token(subs, token))
                .unwrap_or(false),
            Route::Address(address) => inner.root.remove(address.segments(), token),
        };

        if removed {
            trace!("Unsubscribed {}", token);
        }
        Ok(removed)
    }

    /// Invoke every subscriber of a channel or exact address, in
    /// subscription order.
    ///
    /// Returns whether any callback ran. An address nobody subscribed to is
    /// not an error.
    pub fn dispatch(&self, pattern: impl Into<Pattern>, payload: &T) -> Result<bool> {
        let callbacks: Vec<Callback<T>> = {
            let inner = self.inner.read();
            let subs = match inner.resolve(pattern.into())? {
                Route::Channel(name) => inner.channels.get(&name).map(Vec::as_slice),
                Route::Address(address) => {
                    let node = inner.root.find(address.segments());
                    if node.is_none() {
                        trace!("No subscribers for {}", address);
                    }
                    node.map(TrieNode::subscriptions)
                }
            };

            subs.unwrap_or_default()
                .iter()
                .map(|s| Arc::clone(&s.callback))
                .collect()
        };

        for callback in &callbacks {
            callback(payload);
        }

        Ok(!callbacks.is_empty())
    }

    /// Total number of live subscriptions, channels included
    pub fn len(&self) -> usize {
        let inner = self.inner.read();
        let channel_subs: usize = inner.channels.values().map(Vec::len).sum();
        channel_subs + inner.root.count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for AddressRouter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for AddressRouter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.read();
        let mut channels: Vec<&str> = inner.channels.keys().map(String::as_str).collect();
        channels.sort_unstable();

        f.debug_struct("AddressRouter")
            .field("channels", &channels)
            .field("address_subscriptions", &inner.root.count())
            .field("next_token", &inner.next_token)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_lifecycle_channels_registered() {
        let router = AddressRouter::<()>::new();
        assert!(router.is_channel("open"));
        assert!(router.is_channel("error"));
        assert!(router.is_channel("close"));
        assert!(!router.is_channel("/open"));
    }

    #[test]
    fn test_register_channel_validation() {
        let router = AddressRouter::<()>::new();
        assert!(router.register_channel("").is_err());
        assert!(router.register_channel("a/b").is_err());
        assert!(router.register_channel("ready").is_ok());
        assert!(router.is_channel("ready"));
    }

    #[test]
    fn test_callback_can_resubscribe() {
        let router = Arc::new(AddressRouter::<()>::new());
        let hits = Arc::new(AtomicUsize::new(0));

        let inner_router = Arc::clone(&router);
        let inner_hits = Arc::clone(&hits);
        router
            .subscribe("/reenter", move |_| {
                let hits = Arc::clone(&inner_hits);
                inner_router
                    .subscribe("/other", move |_| {
                        hits.fetch_add(1, Ordering::SeqCst);
                    })
                    .unwrap();
            })
            .unwrap();

        assert!(router.dispatch("/reenter", &()).unwrap());
        assert!(router.dispatch("/other", &()).unwrap());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_len_counts_channels_and_addresses() {
        let router = AddressRouter::<()>::new();
        assert!(router.is_empty());

        router.subscribe("open", |_| {}).unwrap();
        router.subscribe("/a/b", |_| {}).unwrap();
        router.subscribe("/a", |_| {}).unwrap();
        assert_eq!(router.len(), 3);
    }
}
