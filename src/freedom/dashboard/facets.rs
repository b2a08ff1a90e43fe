use std::collections::BTreeSet;

use serde::Serialize;

use crate::freedom::dashboard::model::{CanonicalTable, EntityKind};

/// Score bounds offered when the table carries no total score at all.
pub const DEFAULT_SCORE_BOUNDS: (f64, f64) = (0.0, 100.0);

/// Option lists for the filter widgets, derived from the canonical table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Facets {
    /// Most recent year first.
    pub years: Vec<i32>,
    pub regions: Vec<String>,
    pub statuses: Vec<String>,
    pub entity_kinds: Vec<EntityKind>,
    pub entity_names: Vec<String>,
    /// Observed minimum and maximum total score.
    pub score_bounds: (f64, f64),
}

impl Facets {
    pub fn from_table(table: &CanonicalTable) -> Self {
        let mut years = BTreeSet::new();
        let mut regions = BTreeSet::new();
        let mut statuses = BTreeSet::new();
        let mut entity_kinds = BTreeSet::new();
        let mut entity_names = BTreeSet::new();
        let mut bounds: Option<(f64, f64)> = None;

        for record in table.records() {
            years.extend(record.year);
            regions.extend(record.region.as_deref());
            statuses.extend(record.freedom_status.as_deref());
            entity_kinds.extend(record.entity_kind);
            entity_names.insert(record.entity_name.as_str());
            if let Some(score) = record.total_score {
                bounds = Some(match bounds {
                    Some((low, high)) => (low.min(score), high.max(score)),
                    None => (score, score),
                });
            }
        }

        Self {
            years: years.into_iter().rev().collect(),
            regions: regions.into_iter().map(str::to_string).collect(),
            statuses: statuses.into_iter().map(str::to_string).collect(),
            entity_kinds: entity_kinds.into_iter().collect(),
            entity_names: entity_names.into_iter().map(str::to_string).collect(),
            score_bounds: bounds.unwrap_or(DEFAULT_SCORE_BOUNDS),
        }
    }

    /// The year preselected by the year selector.
    pub fn latest_year(&self) -> Option<i32> {
        self.years.first().copied()
    }
}
