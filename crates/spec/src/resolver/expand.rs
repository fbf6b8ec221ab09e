//! Step 5: expand references and substitute the experiment identity.

use crate::experiment::Experiment;
use crate::schema::MonitoringSpec;

use super::classify::Classification;
use super::error::ResolveError;
use super::resolved::{
    DataSourceConfiguration, DimensionConfiguration, MetricConfiguration, PopulationConfiguration,
    ProjectConfiguration, ResolvedConfiguration,
};

/// Placeholder in SQL fragments replaced by the project's identity.
const SLUG_PLACEHOLDER: &str = "{slug}";

struct Expander<'a> {
    slug: &'a str,
    spec: &'a MonitoringSpec,
    /// Normandy slug of the linked experiment, or the project slug.
    identity: &'a str,
}

pub(super) fn expand(
    slug: &str,
    spec: &MonitoringSpec,
    classification: &Classification,
    experiment: Option<&Experiment>,
) -> Result<ResolvedConfiguration, ResolveError> {
    let ctx = Expander {
        slug,
        spec,
        identity: experiment.map(|e| e.normandy_slug.as_str()).unwrap_or(slug),
    };

    let metrics = spec
        .project
        .metrics
        .iter()
        .flatten()
        .map(|name| ctx.metric(name))
        .collect::<Result<Vec<_>, _>>()?;

    let population = &spec.project.population;
    let dimensions = population
        .dimensions
        .iter()
        .flatten()
        .map(|name| ctx.dimension(name))
        .collect::<Result<Vec<_>, _>>()?;

    let project = ProjectConfiguration {
        name: spec
            .project
            .name
            .clone()
            .or_else(|| experiment.and_then(|e| e.name.clone()))
            .unwrap_or_else(|| slug.to_string()),
        platform: classification.platform.clone(),
        is_rollout: classification.is_rollout,
        xaxis: spec.project.xaxis.unwrap_or_default(),
        start_date: spec
            .project
            .start_date
            .or_else(|| experiment.and_then(|e| e.start_date)),
        end_date: spec.project.end_date.or_else(|| experiment.and_then(|e| e.end_date)),
        skip: spec.project.skip.unwrap_or(false),
        compact_visualization: spec.project.compact_visualization.unwrap_or(false),
        population: PopulationConfiguration {
            data_source: population
                .data_source
                .as_deref()
                .map(|name| ctx.data_source(name))
                .transpose()?,
            boolean_pref: population.boolean_pref.clone(),
            channel: population
                .channel
                .clone()
                .or_else(|| experiment.and_then(|e| e.channel.clone())),
            branches: population
                .branches
                .clone()
                .or_else(|| experiment.map(|e| e.branches.clone()))
                .unwrap_or_default(),
            monitor_entire_population: population.monitor_entire_population.unwrap_or(false),
            group_by_dimension: population
                .group_by_dimension
                .as_deref()
                .map(|name| ctx.dimension(name))
                .transpose()?,
        },
    };

    Ok(ResolvedConfiguration::new(project, metrics, dimensions))
}

impl Expander<'_> {
    fn substitute(&self, sql: &str) -> String {
        sql.replace(SLUG_PLACEHOLDER, self.identity)
    }

    fn data_source(&self, name: &str) -> Result<DataSourceConfiguration, ResolveError> {
        let def = self.spec.data_sources.get(name).ok_or_else(|| {
            ResolveError::resolution(self.slug, format!("data source '{}' is not defined", name))
        })?;
        Ok(DataSourceConfiguration {
            name: name.to_string(),
            from_expression: self.substitute(&def.from_expression),
            submission_date_column: def
                .submission_date_column
                .clone()
                .unwrap_or_else(|| "submission_date".to_string()),
            client_id_column: def
                .client_id_column
                .clone()
                .unwrap_or_else(|| "client_id".to_string()),
            build_id_column: def
                .build_id_column
                .clone()
                .unwrap_or_else(|| "SAFE.SUBSTR(application.build_id, 0, 8)".to_string()),
        })
    }

    fn metric(&self, name: &str) -> Result<MetricConfiguration, ResolveError> {
        let def = self.spec.metrics.get(name).ok_or_else(|| {
            ResolveError::resolution(self.slug, format!("metric '{}' is not defined", name))
        })?;
        let data_source = self.data_source(&def.data_source).map_err(|e| match e {
            ResolveError::Resolution { slug, reason } => ResolveError::Resolution {
                slug,
                reason: format!("metric '{}': {}", name, reason),
            },
            other => other,
        })?;
        Ok(MetricConfiguration {
            name: name.to_string(),
            select_expression: self.substitute(&def.select_expression),
            data_source,
            kind: def.kind,
            friendly_name: def.friendly_name.clone(),
            description: def.description.clone(),
            category: def.category.clone(),
            statistics: def.statistics.clone(),
        })
    }

    fn dimension(&self, name: &str) -> Result<DimensionConfiguration, ResolveError> {
        let def = self.spec.dimensions.get(name).ok_or_else(|| {
            ResolveError::resolution(self.slug, format!("dimension '{}' is not defined", name))
        })?;
        Ok(DimensionConfiguration {
            name: name.to_string(),
            select_expression: self.substitute(&def.select_expression),
            data_source: self.data_source(&def.data_source)?,
            friendly_name: def.friendly_name.clone(),
        })
    }
}
