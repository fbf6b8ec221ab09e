use std::path::PathBuf;

use crate::schema::Privacy;

/// A config directory to load fragments from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSource {
    pub location: PathBuf,
    pub privacy: Privacy,
}

impl ConfigSource {
    pub fn public(location: impl Into<PathBuf>) -> Self {
        Self {
            location: location.into(),
            privacy: Privacy::Public,
        }
    }

    pub fn private(location: impl Into<PathBuf>) -> Self {
        Self {
            location: location.into(),
            privacy: Privacy::Private,
        }
    }

    /// Public sources must exist; private ones are skipped when missing.
    pub fn is_required(&self) -> bool {
        self.privacy == Privacy::Public
    }
}
