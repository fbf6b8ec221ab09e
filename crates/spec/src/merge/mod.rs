//! Layer merging for monitoring specs.
//!
//! Two operations, both pure (they build a new value from two inputs):
//! - [`MonitoringSpec::merged`]: layer a higher-priority spec over a lower one.
//!   Scalars are last-write-wins, lists are unioned (an explicit empty list
//!   clears), named entries are replaced whole.
//! - [`MonitoringSpec::combined`]: join two same-kind fragments from different
//!   sources. Order-independent: any field both set differently is a conflict.

mod combine;
mod layer;

pub use combine::MergeConflict;
