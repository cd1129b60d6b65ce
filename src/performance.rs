// Location Performance - ranked activity view
//
// Turns (locations, sales) into a ranked list with a relative activity
// score. The busiest counted location name scores 100, everything else is
// a percentage of it. Pure function; the cache below only avoids recomputing
// when the store has not changed.

use crate::entities::{Location, Sale};
use crate::store::Snapshot;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A location annotated with its sales activity (derived, never persisted)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedLocation {
    #[serde(flatten)]
    pub location: Location,

    /// Number of sales whose `location` equals this location's name
    pub transactions: usize,

    /// Activity relative to the busiest location, in [0, 100]
    pub score: f64,
}

/// Rank locations by number of sales, busiest first.
///
/// Sales are counted per location name, including names that match no
/// location; those counts still take part in the maximum but never produce
/// a row. With no sales every score is 0. Ties keep the input order of
/// `locations`.
pub fn aggregate(locations: &[Location], sales: &[Sale]) -> Vec<RankedLocation> {
    let mut sales_by_location: HashMap<&str, usize> = HashMap::new();
    for sale in sales {
        *sales_by_location.entry(sale.location.as_str()).or_insert(0) += 1;
    }

    let max_transactions = sales_by_location.values().copied().max().unwrap_or(0);

    let mut ranked: Vec<RankedLocation> = locations
        .iter()
        .map(|location| {
            let transactions = sales_by_location
                .get(location.name.as_str())
                .copied()
                .unwrap_or(0);
            let score = if max_transactions > 0 {
                (transactions as f64 / max_transactions as f64) * 100.0
            } else {
                0.0
            };

            RankedLocation {
                location: location.clone(),
                transactions,
                score,
            }
        })
        .collect();

    // sort_by is stable: equal counts keep location order
    ranked.sort_by(|a, b| b.transactions.cmp(&a.transactions));
    ranked
}

/// Ranked output memoized on the store revision it was computed from
#[derive(Debug, Default)]
pub struct PerformanceCache {
    revision: Option<u64>,
    ranked: Vec<RankedLocation>,
}

impl PerformanceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute if `snapshot` comes from a different revision than the
    /// cached result. Returns true when a recompute happened.
    pub fn refresh(&mut self, snapshot: &Snapshot) -> bool {
        if self.revision == Some(snapshot.revision) {
            return false;
        }

        self.ranked = aggregate(&snapshot.locations, &snapshot.sales);
        self.revision = Some(snapshot.revision);
        tracing::debug!(
            revision = snapshot.revision,
            locations = self.ranked.len(),
            "recomputed location performance"
        );
        true
    }

    /// Drop the cached result so the next refresh always recomputes
    pub fn invalidate(&mut self) {
        self.revision = None;
    }

    pub fn ranked(&self) -> &[RankedLocation] {
        &self.ranked
    }

    pub fn revision(&self) -> Option<u64> {
        self.revision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::LocationCategory;

    fn location(id: &str, name: &str) -> Location {
        Location::with_id(id, name, LocationCategory::DailyRotation)
    }

    fn sale(at: &str) -> Sale {
        Sale::new("2024-06-01", at, 10.0)
    }

    fn park_and_mall() -> Vec<Location> {
        vec![location("1", "Park"), location("2", "Mall")]
    }

    #[test]
    fn test_park_and_mall_ranking() {
        let sales = vec![sale("Park"), sale("Park"), sale("Mall")];

        let ranked = aggregate(&park_and_mall(), &sales);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].location.name, "Park");
        assert_eq!(ranked[0].transactions, 2);
        assert_eq!(ranked[0].score, 100.0);
        assert_eq!(ranked[1].location.name, "Mall");
        assert_eq!(ranked[1].transactions, 1);
        assert_eq!(ranked[1].score, 50.0);
    }

    #[test]
    fn test_no_sales_scores_zero_and_keeps_order() {
        let ranked = aggregate(&park_and_mall(), &[]);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].location.id, "1");
        assert_eq!(ranked[1].location.id, "2");
        for row in &ranked {
            assert_eq!(row.transactions, 0);
            assert_eq!(row.score, 0.0);
        }
    }

    #[test]
    fn test_empty_locations_yield_empty_output() {
        let ranked = aggregate(&[], &[sale("Park")]);
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_output_is_image_of_locations() {
        let locations = vec![
            location("a", "North"),
            location("b", "South"),
            location("c", "East"),
            location("d", "West"),
        ];
        let sales = vec![sale("East"), sale("West"), sale("West"), sale("Nowhere")];

        let ranked = aggregate(&locations, &sales);

        assert_eq!(ranked.len(), locations.len());
        let mut ids: Vec<&str> = ranked.iter().map(|r| r.location.id.as_str()).collect();
        ids.sort();
        assert_eq!(ids, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_busiest_location_scores_100() {
        let locations = vec![location("1", "A"), location("2", "B"), location("3", "C")];
        let sales = vec![sale("B"), sale("B"), sale("B"), sale("C"), sale("A")];

        let ranked = aggregate(&locations, &sales);

        assert_eq!(ranked[0].location.name, "B");
        assert_eq!(ranked[0].score, 100.0);
        assert!(ranked.iter().all(|r| (0.0..=100.0).contains(&r.score)));
    }

    #[test]
    fn test_orphan_sales_count_toward_maximum_only() {
        let sales = vec![
            sale("Park"),
            sale("Closed Kiosk"),
            sale("Closed Kiosk"),
            sale("Closed Kiosk"),
            sale("Closed Kiosk"),
        ];

        let ranked = aggregate(&park_and_mall(), &sales);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].location.name, "Park");
        assert_eq!(ranked[0].transactions, 1);
        assert_eq!(ranked[0].score, 25.0);
        assert_eq!(ranked[1].score, 0.0);
    }

    #[test]
    fn test_ties_keep_location_order() {
        let locations = vec![
            location("1", "A"),
            location("2", "B"),
            location("3", "C"),
        ];
        let sales = vec![sale("C"), sale("B"), sale("C"), sale("B"), sale("A")];

        let ranked = aggregate(&locations, &sales);
        let names: Vec<&str> = ranked.iter().map(|r| r.location.name.as_str()).collect();

        assert_eq!(names, vec!["B", "C", "A"]);
    }

    #[test]
    fn test_sale_order_does_not_matter() {
        let locations = vec![location("1", "A"), location("2", "B"), location("3", "C")];
        let sales = vec![sale("A"), sale("B"), sale("B"), sale("C"), sale("A")];
        let mut reversed = sales.clone();
        reversed.reverse();

        assert_eq!(aggregate(&locations, &sales), aggregate(&locations, &reversed));
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let sales = vec![sale("Park"), sale("Mall"), sale("Mall")];

        let first = aggregate(&park_and_mall(), &sales);
        let second = aggregate(&park_and_mall(), &sales);

        assert_eq!(first, second);
    }

    #[test]
    fn test_duplicate_names_share_counts() {
        let locations = vec![location("1", "Market"), location("2", "Market")];
        let sales = vec![sale("Market"), sale("Market")];

        let ranked = aggregate(&locations, &sales);

        assert!(ranked.iter().all(|r| r.transactions == 2 && r.score == 100.0));
    }

    #[test]
    fn test_cache_recomputes_only_on_new_revision() {
        let mut cache = PerformanceCache::new();
        let mut snapshot = Snapshot {
            locations: park_and_mall(),
            sales: vec![sale("Park")],
            revision: 1,
        };

        assert!(cache.refresh(&snapshot));
        assert!(!cache.refresh(&snapshot));
        assert_eq!(cache.ranked()[0].location.name, "Park");

        snapshot.sales = vec![sale("Mall"), sale("Mall")];
        snapshot.revision = 2;
        assert!(cache.refresh(&snapshot));
        assert_eq!(cache.ranked()[0].location.name, "Mall");
        assert_eq!(cache.revision(), Some(2));
    }

    #[test]
    fn test_cache_matches_fresh_aggregate() {
        let mut cache = PerformanceCache::new();
        let snapshot = Snapshot {
            locations: park_and_mall(),
            sales: vec![sale("Mall"), sale("Park"), sale("Mall")],
            revision: 7,
        };

        cache.refresh(&snapshot);
        cache.invalidate();
        assert!(cache.refresh(&snapshot));

        assert_eq!(cache.ranked(), aggregate(&snapshot.locations, &snapshot.sales).as_slice());
    }
}
