//! Resolver: layered fragments -> one executable configuration per project.
//!
//! Split into focused submodules:
//! - `classify`: platform / rollout classification from override and experiment
//! - `core`: the [`Resolver`] and its fixed layer order (steps 1-4)
//! - `expand`: reference expansion and identity substitution (step 5)
//! - `resolved`: the resulting immutable [`ResolvedConfiguration`]

mod classify;
mod core;
mod error;
mod expand;
mod resolved;


pub use self::classify::{Classification, DEFAULT_PLATFORM};
pub use self::core::Resolver;
pub use self::error::ResolveError;
pub use self::resolved::*;
