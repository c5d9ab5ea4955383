//! Entity kinds and the common [`Entity`] trait.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// The ten linkable entity families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    FocusArea,
    Archetype,
    Hypothesis,
    Idea,
    JourneyMap,
    Decision,
    Objective,
    Document,
    Changelog,
    Blocker,
}

impl EntityKind {
    /// Wire name, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FocusArea => "focus-area",
            Self::Archetype => "archetype",
            Self::Hypothesis => "hypothesis",
            Self::Idea => "idea",
            Self::JourneyMap => "journey-map",
            Self::Decision => "decision",
            Self::Objective => "objective",
            Self::Document => "document",
            Self::Changelog => "changelog",
            Self::Blocker => "blocker",
        }
    }

    /// Dashboard route listing entities of this kind.
    pub fn list_path(&self) -> &'static str {
        match self {
            Self::FocusArea => "/focus-areas",
            Self::Archetype => "/archetypes",
            Self::Hypothesis => "/hypotheses",
            Self::Idea => "/ideas",
            Self::JourneyMap => "/journey-maps",
            Self::Decision => "/decisions",
            Self::Objective => "/objectives",
            Self::Document => "/documents",
            Self::Changelog => "/changelog",
            Self::Blocker => "/blockers",
        }
    }

    /// All kinds in display order.
    pub fn all() -> [Self; 10] {
        [
            Self::FocusArea,
            Self::Archetype,
            Self::Hypothesis,
            Self::Idea,
            Self::JourneyMap,
            Self::Decision,
            Self::Objective,
            Self::Document,
            Self::Changelog,
            Self::Blocker,
        ]
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a path segment names no known entity kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKind(pub String);

impl fmt::Display for UnknownKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown entity kind: {}", self.0)
    }
}

impl std::error::Error for UnknownKind {}

impl FromStr for EntityKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

/// Common accessors shared by every linkable record.
pub trait Entity {
    /// Kind tag for this record type.
    const KIND: EntityKind;

    /// Opaque record id.
    fn id(&self) -> &str;

    /// Human-readable label (title or name).
    fn label(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trips_through_str() {
        for kind in EntityKind::all() {
            assert_eq!(kind.as_str().parse::<EntityKind>().unwrap(), kind);
        }
        assert!("widget".parse::<EntityKind>().is_err());
    }

    #[test]
    fn test_kind_serialization_matches_as_str() {
        let json = serde_json::to_string(&EntityKind::JourneyMap).unwrap();
        assert_eq!(json, "\"journey-map\"");
    }
}
