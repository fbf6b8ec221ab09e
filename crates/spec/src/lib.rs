//! Layered monitoring specifications and their resolution.
//!
//! This crate provides:
//! - TOML fragment schema (`project`, `metrics`, `data_sources`, `dimensions`)
//! - A registry of fragments loaded from one or more config directories
//! - Layer merging with a fixed kind order (definition, platform default,
//!   rollout default, override)
//! - Resolution of merged specs into executable configurations
//! - Date eligibility and config validation

pub mod catalog;
pub mod eligibility;
pub mod experiment;
pub mod merge;
pub mod registry;
pub mod resolver;
pub mod schema;
pub mod validation;

pub use catalog::{ProjectCatalog, ResolvedProject};
pub use eligibility::{is_eligible, Eligibility};
pub use experiment::{Experiment, ExperimentCollection, ExperimentLookup};
pub use registry::{ConfigSource, LoadError, Registry};
pub use resolver::{Classification, ResolveError, ResolvedConfiguration, Resolver};
pub use schema::{FragmentKind, MonitoringSpec, SpecFragment};
pub use validation::{validate_fragment, validate_merge, validate_paths, FileValidation, ValidationResult};
