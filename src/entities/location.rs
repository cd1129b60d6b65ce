// Location Entity - a managed business site
//
// "Location name is a VALUE (can change), Location UUID is IDENTITY (never changes)"
//
// Sales point at a location by NAME, not by id, so renaming a location
// detaches its history. Names are not required to be unique.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// LOCATION CATEGORY
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LocationCategory {
    /// Regular spot visited on a rotating schedule
    #[default]
    DailyRotation,

    /// One-off or seasonal event (fair, market, festival)
    SpecialEvent,
}

impl LocationCategory {
    /// Every category, in display order
    pub const ALL: [LocationCategory; 2] = [
        LocationCategory::DailyRotation,
        LocationCategory::SpecialEvent,
    ];

    /// Stable storage/wire code
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationCategory::DailyRotation => "DAILY_ROTATION",
            LocationCategory::SpecialEvent => "SPECIAL_EVENT",
        }
    }

    /// Human readable label for tables and badges
    pub fn label(&self) -> &'static str {
        match self {
            LocationCategory::DailyRotation => "Daily Rotation",
            LocationCategory::SpecialEvent => "Special Event",
        }
    }

    /// Next category in `ALL`, wrapping around (used by the form to cycle)
    pub fn next(&self) -> Self {
        let idx = Self::ALL.iter().position(|c| c == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for LocationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown location category: {0}")]
pub struct ParseCategoryError(pub String);

impl FromStr for LocationCategory {
    type Err = ParseCategoryError;

    /// Accepts the storage code or the display label, case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace([' ', '-'], "_");
        LocationCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| ParseCategoryError(s.to_string()))
    }
}

// ============================================================================
// LOCATION ENTITY
// ============================================================================

/// Location Entity
///
/// Identity: UUID (assigned once, never changes)
/// Values: name, category (replaced together on edit)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Stable identity (UUID) - NEVER changes
    pub id: String,

    /// Display label, also the key sales refer to
    pub name: String,

    pub category: LocationCategory,

    /// When this location was first created
    pub created_at: DateTime<Utc>,
}

impl Location {
    /// Create new location with a fresh UUID
    pub fn new(name: impl Into<String>, category: LocationCategory) -> Self {
        Location {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            category,
            created_at: Utc::now(),
        }
    }

    /// Create location with a caller-supplied id (imports, fixtures)
    pub fn with_id(
        id: impl Into<String>,
        name: impl Into<String>,
        category: LocationCategory,
    ) -> Self {
        let mut location = Self::new(name, category);
        location.id = id.into();
        location
    }

    /// Full-record edit: identity and creation time are kept
    pub fn edited(&self, name: impl Into<String>, category: LocationCategory) -> Location {
        Location {
            id: self.id.clone(),
            name: name.into(),
            category,
            created_at: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_creation() {
        let location = Location::new("Central Park", LocationCategory::DailyRotation);

        assert!(!location.id.is_empty());
        assert_eq!(location.name, "Central Park");
        assert_eq!(location.category, LocationCategory::DailyRotation);
    }

    #[test]
    fn test_location_ids_are_unique() {
        let a = Location::new("Same Name", LocationCategory::DailyRotation);
        let b = Location::new("Same Name", LocationCategory::DailyRotation);

        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_edit_preserves_identity() {
        let original = Location::new("Mall", LocationCategory::DailyRotation);
        let edited = original.edited("Mall East", LocationCategory::SpecialEvent);

        assert_eq!(edited.id, original.id);
        assert_eq!(edited.created_at, original.created_at);
        assert_eq!(edited.name, "Mall East");
        assert_eq!(edited.category, LocationCategory::SpecialEvent);
    }

    #[test]
    fn test_category_parse() {
        assert_eq!(
            "DAILY_ROTATION".parse::<LocationCategory>().unwrap(),
            LocationCategory::DailyRotation
        );
        assert_eq!(
            "special event".parse::<LocationCategory>().unwrap(),
            LocationCategory::SpecialEvent
        );
        assert!("WAREHOUSE".parse::<LocationCategory>().is_err());
    }

    #[test]
    fn test_category_cycle_wraps() {
        let first = LocationCategory::ALL[0];
        let mut current = first;
        for _ in 0..LocationCategory::ALL.len() {
            current = current.next();
        }
        assert_eq!(current, first);
    }

    #[test]
    fn test_category_serde_code() {
        let json = serde_json::to_string(&LocationCategory::DailyRotation).unwrap();
        assert_eq!(json, "\"DAILY_ROTATION\"");
    }
}
