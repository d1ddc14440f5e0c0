//! Closed segment classification vocabularies.
//!
//! Categories, action types, and services are closed enumerations; unknown
//! wire strings are rejected at the boundary instead of flowing into the
//! engine as free-form text. Each category admits a fixed subset of action
//! types, and a small priority ordering resolves ties between categories
//! occupying the identical interval.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/* --------------------------------------------------------------------------
Category
-------------------------------------------------------------------------- */

/// Segment category. Wire names are the snake_case variant names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Sponsor,
    Intro,
    Outro,
    Interaction,
    Selfpromo,
    Preview,
    MusicOfftopic,
    PoiHighlight,
    Chapter,
    ExclusiveAccess,
    Filler,
}

impl Category {
    /// Every category, in wire order.
    pub const ALL: &'static [Category] = &[
        Category::Sponsor,
        Category::Intro,
        Category::Outro,
        Category::Interaction,
        Category::Selfpromo,
        Category::Preview,
        Category::MusicOfftopic,
        Category::PoiHighlight,
        Category::Chapter,
        Category::ExclusiveAccess,
        Category::Filler,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Sponsor => "sponsor",
            Category::Intro => "intro",
            Category::Outro => "outro",
            Category::Interaction => "interaction",
            Category::Selfpromo => "selfpromo",
            Category::Preview => "preview",
            Category::MusicOfftopic => "music_offtopic",
            Category::PoiHighlight => "poi_highlight",
            Category::Chapter => "chapter",
            Category::ExclusiveAccess => "exclusive_access",
            Category::Filler => "filler",
        }
    }

    /// Action types this category admits.
    pub fn allowed_action_types(&self) -> &'static [ActionType] {
        match self {
            Category::Sponsor | Category::Selfpromo | Category::Interaction => {
                &[ActionType::Skip, ActionType::Mute, ActionType::Full]
            }
            Category::Intro | Category::Outro | Category::Preview | Category::Filler => {
                &[ActionType::Skip, ActionType::Mute]
            }
            Category::MusicOfftopic => &[ActionType::Skip],
            Category::PoiHighlight => &[ActionType::Poi],
            Category::Chapter => &[ActionType::Chapter],
            Category::ExclusiveAccess => &[ActionType::Full],
        }
    }

    /// Point categories mark a single timestamp (`start_time == end_time`).
    pub fn is_point(&self) -> bool {
        matches!(self, Category::PoiHighlight)
    }

    /// Whether segments of this category carry a chapter description.
    pub fn carries_description(&self) -> bool {
        matches!(self, Category::Chapter)
    }

    /// Ranking between categories that occupy the identical interval.
    /// Higher wins; only meaningful when intervals coincide exactly.
    pub fn priority(&self) -> u8 {
        match self {
            Category::ExclusiveAccess => 1,
            _ => 0,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown category '{s}'")))
    }
}

/* --------------------------------------------------------------------------
ActionType
-------------------------------------------------------------------------- */

/// What a client should do with a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Skip,
    Mute,
    Full,
    Poi,
    Chapter,
}

impl ActionType {
    pub const ALL: &'static [ActionType] = &[
        ActionType::Skip,
        ActionType::Mute,
        ActionType::Full,
        ActionType::Poi,
        ActionType::Chapter,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Skip => "skip",
            ActionType::Mute => "mute",
            ActionType::Full => "full",
            ActionType::Poi => "poi",
            ActionType::Chapter => "chapter",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionType::ALL
            .iter()
            .copied()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown action type '{s}'")))
    }
}

/* --------------------------------------------------------------------------
Service
-------------------------------------------------------------------------- */

/// Video platform a segment belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Service {
    Youtube,
    Peertube,
}

impl Service {
    pub fn as_str(&self) -> &'static str {
        match self {
            Service::Youtube => "youtube",
            Service::Peertube => "peertube",
        }
    }
}

impl Default for Service {
    fn default() -> Self {
        Service::Youtube
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Service {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "youtube" => Ok(Service::Youtube),
            "peertube" => Ok(Service::Peertube),
            other => Err(CoreError::Validation(format!("Unknown service '{other}'"))),
        }
    }
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */
