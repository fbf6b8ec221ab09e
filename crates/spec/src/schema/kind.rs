//! Fragment kind enum with its fixed merge order.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The layer a fragment belongs to.
///
/// Declaration order is merge order: later kinds override earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FragmentKind {
    /// Platform schema: every metric, data source and dimension the platform knows.
    Definition,
    /// Defaults applied to every project on a platform.
    PlatformDefault,
    /// Defaults applied on top of platform defaults for rollouts only.
    RolloutDefault,
    /// Project-specific settings. Always merged last.
    Override,
}

impl FragmentKind {
    /// Merge order consumed by the resolver.
    pub const MERGE_ORDER: [FragmentKind; 4] = [
        FragmentKind::Definition,
        FragmentKind::PlatformDefault,
        FragmentKind::RolloutDefault,
        FragmentKind::Override,
    ];
}

impl fmt::Display for FragmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FragmentKind::Definition => write!(f, "definition"),
            FragmentKind::PlatformDefault => write!(f, "platform-default"),
            FragmentKind::RolloutDefault => write!(f, "rollout-default"),
            FragmentKind::Override => write!(f, "override"),
        }
    }
}

impl FromStr for FragmentKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "definition" => Ok(FragmentKind::Definition),
            "platform-default" => Ok(FragmentKind::PlatformDefault),
            "rollout-default" => Ok(FragmentKind::RolloutDefault),
            "override" => Ok(FragmentKind::Override),
            other => Err(format!("unknown fragment kind: '{}'", other)),
        }
    }
}
