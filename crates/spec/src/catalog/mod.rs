//! Project catalog: the single path from registry + experiments to
//! `(slug, ResolvedConfiguration)` pairs, shared by routine runs and backfills.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::experiment::ExperimentLookup;
use crate::registry::Registry;
use crate::resolver::{Classification, ResolveError, ResolvedConfiguration, Resolver};
use crate::schema::MonitoringSpec;


/// A resolved project ready for scheduling. Cloning shares the configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedProject {
    pub slug: String,
    pub config: Arc<ResolvedConfiguration>,
}

impl ResolvedProject {
    pub fn new(slug: impl Into<String>, config: ResolvedConfiguration) -> Self {
        Self {
            slug: slug.into(),
            config: Arc::new(config),
        }
    }
}

pub struct ProjectCatalog<'a> {
    resolver: Resolver<'a>,
    experiments: &'a dyn ExperimentLookup,
}

impl<'a> ProjectCatalog<'a> {
    pub fn new(registry: &'a Registry, experiments: &'a dyn ExperimentLookup) -> Self {
        Self {
            resolver: Resolver::new(registry),
            experiments,
        }
    }

    /// Classify and resolve one project.
    ///
    /// `override_spec` replaces the registry's override for `slug`; pass
    /// `None` to use whatever the registry holds (possibly nothing).
    pub fn resolve_one(
        &self,
        slug: &str,
        override_spec: Option<&MonitoringSpec>,
    ) -> Result<ResolvedProject, ResolveError> {
        let override_spec =
            override_spec.or_else(|| self.resolver.registry().override_for(slug).map(|f| f.spec()));
        let experiment = self.experiments.with_slug(slug);
        let classification = Classification::derive(override_spec, experiment);
        debug!(slug = %slug, platform = %classification.platform, is_rollout = classification.is_rollout, "classified project");

        let config =
            self.resolver
                .resolve_with_override(slug, &classification, override_spec, experiment)?;
        Ok(ResolvedProject::new(slug, config))
    }

    /// Resolve every known project, or only `slug` when given.
    ///
    /// Known projects are all overrides plus every rollout without an
    /// override. Projects that fail to resolve are logged and left out.
    pub fn collect(&self, slug: Option<&str>) -> Vec<ResolvedProject> {
        let registry = self.resolver.registry();
        let wanted = |candidate: &str| slug.map_or(true, |s| s == candidate);

        let mut seen: BTreeSet<String> = BTreeSet::new();
        let mut projects = Vec::new();

        let candidates = registry
            .overrides()
            .map(|f| f.slug().to_string())
            .chain(
                self.experiments
                    .rollouts()
                    .into_iter()
                    .filter(|r| registry.override_for(&r.normandy_slug).is_none())
                    .map(|r| r.normandy_slug.clone()),
            );

        for candidate in candidates {
            if !wanted(&candidate) || !seen.insert(candidate.clone()) {
                continue;
            }
            match self.resolve_one(&candidate, None) {
                Ok(project) => projects.push(project),
                Err(e) => warn!(slug = %candidate, error = %e, "skipping project"),
            }
        }

        projects
    }

    /// Resolve exactly one project by slug, failing if it is unknown.
    pub fn find(&self, slug: &str) -> Result<ResolvedProject, ResolveError> {
        let registry = self.resolver.registry();
        let is_rollout = self
            .experiments
            .with_slug(slug)
            .map(|e| e.is_rollout)
            .unwrap_or(false);

        if registry.override_for(slug).is_none() && !is_rollout {
            return Err(ResolveError::UnknownProject {
                slug: slug.to_string(),
            });
        }
        self.resolve_one(slug, None)
    }
}
