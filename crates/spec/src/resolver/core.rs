//! Core [`Resolver`]: layer selection and merging.

use tracing::debug;

use crate::experiment::Experiment;
use crate::registry::{Registry, ROLLOUT_DEFAULTS_KEY};
use crate::schema::{FragmentKind, MonitoringSpec};

use super::classify::Classification;
use super::error::ResolveError;
use super::expand::expand;
use super::resolved::ResolvedConfiguration;

/// Resolves projects against an immutable [`Registry`].
///
/// Pure: the same inputs always produce the same output.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    registry: &'a Registry,
}

impl<'a> Resolver<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'a Registry {
        self.registry
    }

    /// Resolve a project using the registry's own override for `slug`.
    pub fn resolve(
        &self,
        slug: &str,
        classification: &Classification,
        experiment: Option<&Experiment>,
    ) -> Result<ResolvedConfiguration, ResolveError> {
        let override_spec = self.registry.override_for(slug).map(|f| f.spec());
        self.resolve_with_override(slug, classification, override_spec, experiment)
    }

    /// Resolve a project with an explicitly supplied override (or none).
    pub fn resolve_with_override(
        &self,
        slug: &str,
        classification: &Classification,
        override_spec: Option<&MonitoringSpec>,
        experiment: Option<&Experiment>,
    ) -> Result<ResolvedConfiguration, ResolveError> {
        let merged = self.merge_layers(slug, classification, override_spec)?;
        expand(slug, &merged, classification, experiment)
    }

    /// Steps 1-4: start from the platform definition and layer every
    /// applicable fragment over it in [`FragmentKind::MERGE_ORDER`].
    pub fn merge_layers(
        &self,
        slug: &str,
        classification: &Classification,
        override_spec: Option<&MonitoringSpec>,
    ) -> Result<MonitoringSpec, ResolveError> {
        let skip_defaults = override_spec
            .map(|s| s.project.skips_default_metrics())
            .unwrap_or(false);

        let mut merged: Option<MonitoringSpec> = None;
        for kind in FragmentKind::MERGE_ORDER {
            let layer = match kind {
                FragmentKind::Definition => {
                    let definition = self
                        .registry
                        .definitions_for(&classification.platform)
                        .ok_or_else(|| ResolveError::UnknownPlatform {
                            slug: slug.to_string(),
                            platform: classification.platform.clone(),
                        })?;
                    Some(definition.spec())
                }
                FragmentKind::PlatformDefault if !skip_defaults => self
                    .registry
                    .defaults_for(&classification.platform)
                    .map(|f| f.spec()),
                FragmentKind::RolloutDefault if !skip_defaults && classification.is_rollout => self
                    .registry
                    .defaults_for(ROLLOUT_DEFAULTS_KEY)
                    .map(|f| f.spec()),
                FragmentKind::Override => override_spec,
                _ => None,
            };

            if let Some(layer) = layer {
                debug!(slug = %slug, layer = %kind, "merging layer");
                merged = Some(match merged {
                    None => layer.clone(),
                    Some(lower) => lower.merged(layer),
                });
            }
        }

        // Definition is the first layer and is required, so `merged` is set.
        merged.ok_or_else(|| ResolveError::UnknownPlatform {
            slug: slug.to_string(),
            platform: classification.platform.clone(),
        })
    }
}
