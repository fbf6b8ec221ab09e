//! Priority layering: `lower.merged(upper)`.

use std::collections::BTreeMap;

use crate::schema::{MonitoringSpec, PopulationSpec, ProjectSpec};

impl MonitoringSpec {
    /// Return a new spec with `upper` layered over `self`.
    pub fn merged(&self, upper: &MonitoringSpec) -> MonitoringSpec {
        MonitoringSpec {
            project: self.project.merged(&upper.project),
            metrics: replace_entries(&self.metrics, &upper.metrics),
            data_sources: replace_entries(&self.data_sources, &upper.data_sources),
            dimensions: replace_entries(&self.dimensions, &upper.dimensions),
        }
    }
}

impl ProjectSpec {
    fn merged(&self, upper: &ProjectSpec) -> ProjectSpec {
        ProjectSpec {
            name: last_wins(&self.name, &upper.name),
            platform: last_wins(&self.platform, &upper.platform),
            xaxis: last_wins(&self.xaxis, &upper.xaxis),
            start_date: last_wins(&self.start_date, &upper.start_date),
            end_date: last_wins(&self.end_date, &upper.end_date),
            skip: last_wins(&self.skip, &upper.skip),
            skip_default_metrics: last_wins(&self.skip_default_metrics, &upper.skip_default_metrics),
            compact_visualization: last_wins(&self.compact_visualization, &upper.compact_visualization),
            metrics: union_list(&self.metrics, &upper.metrics),
            population: self.population.merged(&upper.population),
        }
    }
}

impl PopulationSpec {
    fn merged(&self, upper: &PopulationSpec) -> PopulationSpec {
        PopulationSpec {
            data_source: last_wins(&self.data_source, &upper.data_source),
            boolean_pref: last_wins(&self.boolean_pref, &upper.boolean_pref),
            channel: last_wins(&self.channel, &upper.channel),
            branches: union_list(&self.branches, &upper.branches),
            monitor_entire_population: last_wins(
                &self.monitor_entire_population,
                &upper.monitor_entire_population,
            ),
            dimensions: union_list(&self.dimensions, &upper.dimensions),
            group_by_dimension: last_wins(&self.group_by_dimension, &upper.group_by_dimension),
        }
    }
}

fn last_wins<T: Clone>(lower: &Option<T>, upper: &Option<T>) -> Option<T> {
    upper.as_ref().or(lower.as_ref()).cloned()
}

/// Extend `lower` with unseen items of `upper`, keeping first-seen order.
/// `Some(vec![])` in `upper` clears the list.
fn union_list(lower: &Option<Vec<String>>, upper: &Option<Vec<String>>) -> Option<Vec<String>> {
    match (lower, upper) {
        (_, Some(items)) if items.is_empty() => Some(Vec::new()),
        (lower, None) => lower.clone(),
        (None, Some(items)) => Some(dedup(items.iter())),
        (Some(base), Some(items)) => Some(dedup(base.iter().chain(items.iter()))),
    }
}

fn dedup<'a>(items: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items {
        if !out.contains(item) {
            out.push(item.clone());
        }
    }
    out
}

/// Keyed last-write-wins: an entry in `upper` replaces the whole entry in `lower`.
fn replace_entries<V: Clone>(
    lower: &BTreeMap<String, V>,
    upper: &BTreeMap<String, V>,
) -> BTreeMap<String, V> {
    let mut out = lower.clone();
    out.extend(upper.iter().map(|(k, v)| (k.clone(), v.clone())));
    out
}
