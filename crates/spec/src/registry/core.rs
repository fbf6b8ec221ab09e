//! Core [`Registry`] struct: fragment storage and lookups.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use tracing::{info, warn};

use crate::schema::{FragmentKind, Privacy, SpecFragment};

use super::error::{LoadError, LoadResult, LoadStatus, Result};
use super::scan::scan_dir_recursive;
use super::source::ConfigSource;

/// Key under which rollout defaults are stored (`defaults/rollout.toml`).
pub const ROLLOUT_DEFAULTS_KEY: &str = "rollout";

/// Immutable set of fragments, built once per invocation.
///
/// Fragments are keyed by `(kind, key)` where the key is the platform for
/// definitions and platform defaults, [`ROLLOUT_DEFAULTS_KEY`] for rollout
/// defaults, and the slug for overrides.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    fragments: BTreeMap<(FragmentKind, String), SpecFragment>,
    load_results: Vec<LoadResult>,
}

impl Registry {
    /// Load every source, public ones first.
    ///
    /// A missing public source fails with [`LoadError::Unreachable`]; a missing
    /// private source is logged and skipped. Same-kind fragments from several
    /// sources are combined (see [`crate::schema::MonitoringSpec::combined`]).
    ///
    /// Conflicts between public definitions or defaults abort the load. A
    /// conflict on an override drops that slug entirely, and any other
    /// conflict involving a private file drops the private fragment; both are
    /// recorded as [`LoadStatus::Failed`].
    pub fn load(sources: &[ConfigSource]) -> Result<Self> {
        let mut registry = Registry::default();
        let mut dropped = BTreeSet::new();

        let ordered = sources
            .iter()
            .filter(|s| s.is_required())
            .chain(sources.iter().filter(|s| !s.is_required()));
        for source in ordered {
            if let Err(e) = fs::read_dir(&source.location) {
                if source.is_required() {
                    return Err(LoadError::Unreachable {
                        path: source.location.clone(),
                        source: e,
                    });
                }
                warn!(path = %source.location.display(), error = %e, "skipping unreachable private config source");
                registry.load_results.push(LoadResult {
                    path: source.location.clone(),
                    status: LoadStatus::Skipped {
                        reason: format!("unreachable {} source: {}", source.privacy, e),
                    },
                });
                continue;
            }

            let mut fragments = Vec::new();
            scan_dir_recursive(source, &source.location, &mut fragments, &mut registry.load_results)?;
            info!(
                path = %source.location.display(),
                privacy = %source.privacy,
                fragments = fragments.len(),
                "loaded config source"
            );
            for fragment in fragments {
                registry.admit(fragment, &mut dropped)?;
            }
        }

        Ok(registry)
    }

    /// Insert a freshly loaded fragment, containing conflicts that only
    /// affect one slug or come from a private source.
    fn admit(
        &mut self,
        fragment: SpecFragment,
        dropped: &mut BTreeSet<(FragmentKind, String)>,
    ) -> Result<()> {
        let key = (fragment.kind(), fragment.slug().to_string());
        if dropped.contains(&key) {
            let error = format!("{} '{}' was dropped after a conflict", key.0, key.1);
            warn!(path = %fragment.path().display(), %error, "skipping config file");
            self.mark_failed(fragment.path(), error);
            return Ok(());
        }

        let involves_private = fragment
            .provenance()
            .iter()
            .chain(self.fragments.get(&key).map(|f| f.provenance()).unwrap_or(&[]))
            .any(|p| p.privacy == Privacy::Private);

        match self.insert(fragment.clone()) {
            Ok(()) => Ok(()),
            Err(conflict @ LoadError::Conflict { kind: FragmentKind::Override, .. }) => {
                let error = conflict.to_string();
                warn!(slug = %key.1, %error, "dropping conflicting override");
                if let Some(existing) = self.fragments.remove(&key) {
                    for provenance in existing.provenance() {
                        self.mark_failed(&provenance.path, error.clone());
                    }
                }
                self.mark_failed(fragment.path(), error);
                dropped.insert(key);
                Ok(())
            }
            Err(conflict @ LoadError::Conflict { .. }) if involves_private => {
                let error = conflict.to_string();
                warn!(path = %fragment.path().display(), %error, "skipping conflicting private config file");
                self.mark_failed(fragment.path(), error);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn mark_failed(&mut self, path: &Path, error: String) {
        match self.load_results.iter_mut().find(|r| r.path == path) {
            Some(result) => result.status = LoadStatus::Failed { error },
            None => self.load_results.push(LoadResult {
                path: path.to_path_buf(),
                status: LoadStatus::Failed { error },
            }),
        }
    }

    /// Build a registry from already-parsed fragments.
    pub fn from_fragments(fragments: impl IntoIterator<Item = SpecFragment>) -> Result<Self> {
        let mut registry = Registry::default();
        for fragment in fragments {
            registry.insert(fragment)?;
        }
        Ok(registry)
    }

    /// Return a new registry with one more fragment. `self` is unchanged.
    pub fn with_fragment(&self, fragment: SpecFragment) -> Result<Self> {
        let mut next = self.clone();
        next.insert(fragment)?;
        Ok(next)
    }

    /// Return a new registry where `fragment` takes the place of any existing
    /// fragment with the same kind and key. `self` is unchanged.
    pub fn replacing(&self, fragment: SpecFragment) -> Self {
        let mut next = self.clone();
        next.fragments
            .insert((fragment.kind(), fragment.slug().to_string()), fragment);
        next
    }

    fn insert(&mut self, fragment: SpecFragment) -> Result<()> {
        let key = (fragment.kind(), fragment.slug().to_string());
        let entry = match self.fragments.get(&key) {
            Some(existing) => {
                let spec = existing.spec().combined(fragment.spec()).map_err(|conflict| {
                    LoadError::Conflict {
                        kind: fragment.kind(),
                        key: fragment.slug().to_string(),
                        field: conflict.field,
                        paths: existing
                            .provenance()
                            .iter()
                            .chain(fragment.provenance())
                            .map(|p| p.path.display().to_string())
                            .collect(),
                    }
                })?;
                existing.combined_with(spec, fragment.provenance())
            }
            None => fragment,
        };
        self.fragments.insert(key, entry);
        Ok(())
    }

    fn get(&self, kind: FragmentKind, key: &str) -> Option<&SpecFragment> {
        self.fragments.get(&(kind, key.to_string()))
    }

    /// Definition fragment establishing a platform's schema.
    pub fn definitions_for(&self, platform: &str) -> Option<&SpecFragment> {
        self.get(FragmentKind::Definition, platform)
    }

    /// Platform defaults, or rollout defaults when `platform` is
    /// [`ROLLOUT_DEFAULTS_KEY`].
    pub fn defaults_for(&self, platform: &str) -> Option<&SpecFragment> {
        if platform == ROLLOUT_DEFAULTS_KEY {
            self.get(FragmentKind::RolloutDefault, ROLLOUT_DEFAULTS_KEY)
        } else {
            self.get(FragmentKind::PlatformDefault, platform)
        }
    }

    pub fn override_for(&self, slug: &str) -> Option<&SpecFragment> {
        self.get(FragmentKind::Override, slug)
    }

    /// All override fragments, ordered by slug.
    pub fn overrides(&self) -> impl Iterator<Item = &SpecFragment> {
        self.fragments
            .iter()
            .filter(|((kind, _), _)| *kind == FragmentKind::Override)
            .map(|(_, fragment)| fragment)
    }

    /// Platforms with a definition fragment.
    pub fn platforms(&self) -> impl Iterator<Item = &str> {
        self.fragments
            .keys()
            .filter(|(kind, _)| *kind == FragmentKind::Definition)
            .map(|(_, key)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Per-file outcomes of [`Registry::load`].
    pub fn load_results(&self) -> &[LoadResult] {
        &self.load_results
    }
}
