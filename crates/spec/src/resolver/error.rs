/// Errors resolving a single project. Never fatal to other projects.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// No definition fragment exists for the classified platform.
    #[error("invalid platform '{platform}' for '{slug}'")]
    UnknownPlatform { slug: String, platform: String },

    /// No experiment or rollout matches, and the project does not monitor
    /// the entire population.
    #[error("no experiment or rollout with slug '{slug}'")]
    UnknownExperiment { slug: String },

    /// Neither an override nor a rollout exists for the slug.
    #[error("no project configuration or rollout for '{slug}'")]
    UnknownProject { slug: String },

    /// A reference in the merged spec points at nothing.
    #[error("cannot resolve '{slug}': {reason}")]
    Resolution { slug: String, reason: String },
}

impl ResolveError {
    pub(crate) fn resolution(slug: &str, reason: impl Into<String>) -> Self {
        ResolveError::Resolution {
            slug: slug.to_string(),
            reason: reason.into(),
        }
    }
}
