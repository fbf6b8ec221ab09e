//! Parsed fragments tagged with identity and provenance.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::kind::FragmentKind;
use super::spec::MonitoringSpec;

/// Visibility of a config source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Privacy {
    #[default]
    Public,
    Private,
}

impl fmt::Display for Privacy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Privacy::Public => write!(f, "public"),
            Privacy::Private => write!(f, "private"),
        }
    }
}

/// Where a fragment came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    /// Root of the config source.
    pub source: PathBuf,
    /// The file itself.
    pub path: PathBuf,
    pub privacy: Privacy,
}

impl Provenance {
    /// Provenance for content that did not come from a loaded source.
    pub fn inline(name: &str) -> Self {
        Self {
            source: PathBuf::new(),
            path: PathBuf::from(name),
            privacy: Privacy::Public,
        }
    }
}

/// A read-only fragment. Cloning shares the underlying spec.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecFragment {
    slug: String,
    kind: FragmentKind,
    provenance: Vec<Provenance>,
    spec: Arc<MonitoringSpec>,
}

impl SpecFragment {
    pub fn new(
        slug: impl Into<String>,
        kind: FragmentKind,
        provenance: Provenance,
        spec: MonitoringSpec,
    ) -> Self {
        Self {
            slug: slug.into(),
            kind,
            provenance: vec![provenance],
            spec: Arc::new(spec),
        }
    }

    /// Parse TOML text into a fragment with inline provenance.
    pub fn parse(
        slug: impl Into<String>,
        kind: FragmentKind,
        text: &str,
    ) -> Result<Self, toml::de::Error> {
        let slug = slug.into();
        let spec = MonitoringSpec::from_toml_str(text)?;
        let provenance = Provenance::inline(&slug);
        Ok(Self::new(slug, kind, provenance, spec))
    }

    /// Slug for overrides; platform name for definitions and defaults.
    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn kind(&self) -> FragmentKind {
        self.kind
    }

    pub fn spec(&self) -> &MonitoringSpec {
        &self.spec
    }

    pub fn provenance(&self) -> &[Provenance] {
        &self.provenance
    }

    /// First file this fragment was read from.
    pub fn path(&self) -> &Path {
        self.provenance
            .first()
            .map(|p| p.path.as_path())
            .unwrap_or_else(|| Path::new(""))
    }

    /// Replace the content, keeping identity and adding provenance.
    pub(crate) fn combined_with(&self, spec: MonitoringSpec, extra: &[Provenance]) -> Self {
        let mut provenance = self.provenance.clone();
        provenance.extend_from_slice(extra);
        Self {
            slug: self.slug.clone(),
            kind: self.kind,
            provenance,
            spec: Arc::new(spec),
        }
    }
}
