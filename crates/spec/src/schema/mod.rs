//! TOML fragment schema with serde deserialization.
//!
//! Defines the section hierarchy shared by every fragment kind:
//! - `MonitoringSpec`: the whole document (`project`, `metrics`, `data_sources`, `dimensions`)
//! - `ProjectSpec` / `PopulationSpec`: project-level settings, every field optional
//! - `MetricDefinition`, `DataSourceDefinition`, `DimensionDefinition`: named entries
//! - `SpecFragment`: a parsed document tagged with its slug, kind, and provenance

mod dates;
mod definitions;
mod fragment;
mod kind;
mod project;
mod spec;

pub use dates::parse_date;
pub use definitions::*;
pub use fragment::*;
pub use kind::*;
pub use project::*;
pub use spec::*;

#[cfg(test)]
mod tests;
