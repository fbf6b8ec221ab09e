//! Same-kind combination across config sources.

use std::collections::BTreeMap;

use crate::schema::{MonitoringSpec, PopulationSpec, ProjectSpec};

/// Two fragments set the same field to different values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("conflicting values for '{field}'")]
pub struct MergeConflict {
    /// Dotted path of the conflicting field, e.g. `metrics.active_hours`.
    pub field: String,
}

impl MonitoringSpec {
    /// Union two specs of the same kind. The result does not depend on
    /// argument order except for the order of list items.
    pub fn combined(&self, other: &MonitoringSpec) -> Result<MonitoringSpec, MergeConflict> {
        Ok(MonitoringSpec {
            project: self.project.combined(&other.project)?,
            metrics: union_entries("metrics", &self.metrics, &other.metrics)?,
            data_sources: union_entries("data_sources", &self.data_sources, &other.data_sources)?,
            dimensions: union_entries("dimensions", &self.dimensions, &other.dimensions)?,
        })
    }
}

impl ProjectSpec {
    fn combined(&self, other: &ProjectSpec) -> Result<ProjectSpec, MergeConflict> {
        Ok(ProjectSpec {
            name: agree("project.name", &self.name, &other.name)?,
            platform: agree("project.platform", &self.platform, &other.platform)?,
            xaxis: agree("project.xaxis", &self.xaxis, &other.xaxis)?,
            start_date: agree("project.start_date", &self.start_date, &other.start_date)?,
            end_date: agree("project.end_date", &self.end_date, &other.end_date)?,
            skip: agree("project.skip", &self.skip, &other.skip)?,
            skip_default_metrics: agree(
                "project.skip_default_metrics",
                &self.skip_default_metrics,
                &other.skip_default_metrics,
            )?,
            compact_visualization: agree(
                "project.compact_visualization",
                &self.compact_visualization,
                &other.compact_visualization,
            )?,
            metrics: join_lists(&self.metrics, &other.metrics),
            population: self.population.combined(&other.population)?,
        })
    }
}

impl PopulationSpec {
    fn combined(&self, other: &PopulationSpec) -> Result<PopulationSpec, MergeConflict> {
        Ok(PopulationSpec {
            data_source: agree("project.population.data_source", &self.data_source, &other.data_source)?,
            boolean_pref: agree("project.population.boolean_pref", &self.boolean_pref, &other.boolean_pref)?,
            channel: agree("project.population.channel", &self.channel, &other.channel)?,
            branches: join_lists(&self.branches, &other.branches),
            monitor_entire_population: agree(
                "project.population.monitor_entire_population",
                &self.monitor_entire_population,
                &other.monitor_entire_population,
            )?,
            dimensions: join_lists(&self.dimensions, &other.dimensions),
            group_by_dimension: agree(
                "project.population.group_by_dimension",
                &self.group_by_dimension,
                &other.group_by_dimension,
            )?,
        })
    }
}

fn agree<T: Clone + PartialEq>(
    field: &str,
    a: &Option<T>,
    b: &Option<T>,
) -> Result<Option<T>, MergeConflict> {
    match (a, b) {
        (Some(x), Some(y)) if x != y => Err(MergeConflict {
            field: field.to_string(),
        }),
        (Some(x), _) => Ok(Some(x.clone())),
        (None, y) => Ok(y.clone()),
    }
}

fn join_lists(a: &Option<Vec<String>>, b: &Option<Vec<String>>) -> Option<Vec<String>> {
    match (a, b) {
        (None, None) => None,
        _ => {
            let mut out: Vec<String> = Vec::new();
            for item in a.iter().flatten().chain(b.iter().flatten()) {
                if !out.contains(item) {
                    out.push(item.clone());
                }
            }
            Some(out)
        }
    }
}

fn union_entries<V: Clone + PartialEq>(
    section: &str,
    a: &BTreeMap<String, V>,
    b: &BTreeMap<String, V>,
) -> Result<BTreeMap<String, V>, MergeConflict> {
    let mut out = a.clone();
    for (name, entry) in b {
        match out.get(name) {
            Some(existing) if existing != entry => {
                return Err(MergeConflict {
                    field: format!("{}.{}", section, name),
                });
            }
            Some(_) => {}
            None => {
                out.insert(name.clone(), entry.clone());
            }
        }
    }
    Ok(out)
}
