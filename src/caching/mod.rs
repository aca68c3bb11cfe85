//! # Caching Module
//!
//! Scoped memoization of intermediate values. A cached value is identified by
//! a [`CacheKey`] whose components are chosen by a [`Scope`]; the
//! [`ScopedCache`] stores one value per canonical key and guarantees that,
//! within a generation, the generator of a key runs at most once even when
//! many individuals request it concurrently.
//!
//! Heuristics normally reach the cache through a context and a
//! [`Parameter`](crate::metaheuristics::Parameter) rather than directly.

pub mod key;
pub mod scope;
pub mod store;

pub use key::CacheKey;
pub use scope::Scope;
pub use store::{CachedValue, ScopedCache};
