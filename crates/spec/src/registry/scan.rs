//! Recursive directory scan of one config source.

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::schema::{FragmentKind, MonitoringSpec, Privacy, Provenance, SpecFragment};

use super::error::{FragmentError, LoadResult, LoadStatus, Result};
use super::source::ConfigSource;
use super::ROLLOUT_DEFAULTS_KEY;

const DEFINITIONS_DIR: &str = "definitions";
const DEFAULTS_DIR: &str = "defaults";

/// Decide a file's kind and key from its location.
///
/// `definitions/<platform>.toml` and `defaults/<platform>.toml` are keyed by
/// platform, `defaults/rollout.toml` holds rollout defaults, and every other
/// file is an override keyed by its stem (the project slug).
pub fn classify_path(path: &Path) -> Option<(FragmentKind, String)> {
    let stem = path.file_stem()?.to_str()?.to_string();
    let parent = path
        .parent()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
        .unwrap_or("");

    let kind = match parent {
        DEFINITIONS_DIR => FragmentKind::Definition,
        DEFAULTS_DIR if stem == ROLLOUT_DEFAULTS_KEY => FragmentKind::RolloutDefault,
        DEFAULTS_DIR => FragmentKind::PlatformDefault,
        _ => FragmentKind::Override,
    };
    Some((kind, stem))
}

/// `foo.example.toml` style files document the format and are never loaded.
pub fn is_example_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|name| name.split('.').skip(1).any(|part| part == "example"))
        .unwrap_or(false)
}

/// Read and parse one fragment file.
pub fn load_fragment(
    path: &Path,
    source_root: &Path,
    privacy: Privacy,
) -> std::result::Result<SpecFragment, FragmentError> {
    let (kind, slug) =
        classify_path(path).ok_or_else(|| FragmentError::InvalidName(path.to_path_buf()))?;
    let contents = fs::read_to_string(path)?;
    let spec = MonitoringSpec::from_toml_str(&contents)?;
    let provenance = Provenance {
        source: source_root.to_path_buf(),
        path: path.to_path_buf(),
        privacy,
    };
    Ok(SpecFragment::new(slug, kind, provenance, spec))
}

/// Recursively scan a source directory for TOML fragments.
///
/// Dotfiles, non-TOML files and example files are skipped.
/// Parse errors are reported per-file but do not abort the scan. Unreadable
/// directories abort a public scan and are skipped in a private one.
pub(super) fn scan_dir_recursive(
    source: &ConfigSource,
    dir: &Path,
    fragments: &mut Vec<SpecFragment>,
    results: &mut Vec<LoadResult>,
) -> Result<()> {
    let listing = fs::read_dir(dir).and_then(|rd| rd.collect::<std::io::Result<Vec<_>>>());
    let mut entries = match listing {
        Ok(entries) => entries,
        Err(e) if !source.is_required() => {
            warn!(path = %dir.display(), error = %e, "skipping unreadable private config directory");
            results.push(LoadResult {
                path: dir.to_path_buf(),
                status: LoadStatus::Skipped {
                    reason: format!("unreadable directory: {}", e),
                },
            });
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    // Sorted so the load report and combination order are stable.
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let path = entry.path();

        // Skip dotfiles/dotdirs
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if name.starts_with('.') {
                if path.is_file() {
                    results.push(LoadResult {
                        path,
                        status: LoadStatus::Skipped {
                            reason: "dotfile".to_string(),
                        },
                    });
                }
                continue;
            }
        }

        if path.is_dir() {
            scan_dir_recursive(source, &path, fragments, results)?;
            continue;
        }

        let is_toml = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e == "toml")
            .unwrap_or(false);

        if !is_toml {
            results.push(LoadResult {
                path,
                status: LoadStatus::Skipped {
                    reason: "not a TOML file".to_string(),
                },
            });
            continue;
        }

        if is_example_file(&path) {
            debug!(path = %path.display(), "skipping example config");
            results.push(LoadResult {
                path,
                status: LoadStatus::Skipped {
                    reason: "example config".to_string(),
                },
            });
            continue;
        }

        match load_fragment(&path, &source.location, source.privacy) {
            Ok(fragment) => {
                debug!(slug = %fragment.slug(), kind = %fragment.kind(), path = %path.display(), "loaded fragment");
                results.push(LoadResult {
                    path,
                    status: LoadStatus::Loaded {
                        slug: fragment.slug().to_string(),
                        kind: fragment.kind(),
                    },
                });
                fragments.push(fragment);
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config file");
                results.push(LoadResult {
                    path,
                    status: LoadStatus::Failed {
                        error: e.to_string(),
                    },
                });
            }
        }
    }

    Ok(())
}
