//! oscroute Router
//!
//! Routes named events and OSC addresses to subscribers:
//! - Lifecycle channels (`open`, `error`, `close`, plus registered ones)
//!   live in a flat map
//! - Addresses live in a trie keyed by path segment, giving lookups
//!   proportional to address depth regardless of subscriber count
//!
//! # Example
//!
//! ```
//! use oscroute_router::AddressRouter;
//!
//! let router = AddressRouter::<i32>::new();
//! let token = router.subscribe("/synth/1/freq", |v: &i32| println!("freq {}", v)).unwrap();
//!
//! assert!(router.dispatch("/synth/1/freq", &440).unwrap());
//! assert!(router.unsubscribe("/synth/1/freq", &token).unwrap());
//! ```

pub mod pattern;
pub mod router;
pub mod subscription;
mod trie;

pub use oscroute_core::{Error, Result};
pub use pattern::{Pattern, Route};
pub use router::AddressRouter;
pub use subscription::{Callback, Subscription, Token};
