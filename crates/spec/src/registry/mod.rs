//! SpecLayer registry: raw fragments loaded from config directories.
//!
//! Each source is scanned recursively for `*.toml` files. The file's place in
//! the tree decides its kind (`definitions/`, `defaults/`, anything else is
//! an override). Precedence between kinds is applied later by the resolver;
//! the registry never orders sources.

mod core;
mod error;
mod scan;
mod source;


pub use self::core::{Registry, ROLLOUT_DEFAULTS_KEY};
pub use self::error::{FragmentError, LoadError, LoadResult, LoadStatus, Result};
pub use self::scan::{classify_path, is_example_file, load_fragment};
pub use self::source::ConfigSource;
