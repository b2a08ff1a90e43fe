use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::freedom::dashboard::error::{DashboardError, Result};
use crate::freedom::dashboard::model::{CanonicalTable, EntityKind, Record};
use crate::freedom::dashboard::present::ColorScale;

/// Closed interval over total scores; both bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "(f64, f64)", into = "(f64, f64)")]
pub struct ScoreRange {
    lower: f64,
    upper: f64,
}

impl ScoreRange {
    pub fn new(lower: f64, upper: f64) -> Result<Self> {
        if !lower.is_finite() || !upper.is_finite() {
            return Err(DashboardError::InvalidCriteria(format!(
                "score range bounds must be finite, got [{lower}, {upper}]"
            )));
        }
        if lower > upper {
            return Err(DashboardError::InvalidCriteria(format!(
                "score range lower bound {lower} exceeds upper bound {upper}"
            )));
        }
        Ok(Self { lower, upper })
    }

    pub fn lower(&self) -> f64 {
        self.lower
    }

    pub fn upper(&self) -> f64 {
        self.upper
    }

    /// A missing score never falls inside any range.
    pub fn contains(&self, score: Option<f64>) -> bool {
        score.is_some_and(|score| self.lower <= score && score <= self.upper)
    }
}

impl TryFrom<(f64, f64)> for ScoreRange {
    type Error = DashboardError;

    fn try_from((lower, upper): (f64, f64)) -> Result<Self> {
        ScoreRange::new(lower, upper)
    }
}

impl From<ScoreRange> for (f64, f64) {
    fn from(range: ScoreRange) -> Self {
        (range.lower, range.upper)
    }
}

/// User-selected constraints for one render cycle.
///
/// Absent options and empty sets impose no restriction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    pub year: Option<i32>,
    pub score_range: Option<ScoreRange>,
    pub regions: BTreeSet<String>,
    pub statuses: BTreeSet<String>,
    pub entity_kind: Option<EntityKind>,
    pub entity_name: Option<String>,
}

impl FilterCriteria {
    /// Returns `true` when no criterion is active.
    pub fn is_unrestricted(&self) -> bool {
        self.year.is_none()
            && self.score_range.is_none()
            && self.regions.is_empty()
            && self.statuses.is_empty()
            && self.entity_kind.is_none()
            && self.entity_name.is_none()
    }

    /// Evaluates every active predicate in the documented order: year, score
    /// range, region, freedom status, entity kind, entity name.
    pub fn matches(&self, record: &Record) -> bool {
        self.year.is_none_or(|year| record.year == Some(year))
            && self
                .score_range
                .is_none_or(|range| range.contains(record.total_score))
            && member_of(&self.regions, record.region.as_deref())
            && member_of(&self.statuses, record.freedom_status.as_deref())
            && self
                .entity_kind
                .is_none_or(|kind| record.entity_kind == Some(kind))
            && self
                .entity_name
                .as_deref()
                .is_none_or(|name| record.entity_name == name)
    }
}

fn member_of(allowed: &BTreeSet<String>, value: Option<&str>) -> bool {
    allowed.is_empty() || value.is_some_and(|value| allowed.contains(value))
}

/// Read-only selection of canonical table rows, in table order.
#[derive(Debug, Clone)]
pub struct FilteredView<'t> {
    table: &'t CanonicalTable,
    indices: Vec<usize>,
}

impl<'t> FilteredView<'t> {
    /// A view that selects every row of `table`.
    pub fn all(table: &'t CanonicalTable) -> Self {
        Self {
            table,
            indices: (0..table.len()).collect(),
        }
    }

    pub fn table(&self) -> &'t CanonicalTable {
        self.table
    }

    /// Row positions within the canonical table.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn records(&self) -> impl Iterator<Item = &'t Record> + '_ {
        let records = self.table.records();
        self.indices.iter().map(move |index| &records[*index])
    }

    pub fn first(&self) -> Option<&'t Record> {
        self.indices
            .first()
            .map(|index| &self.table.records()[*index])
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Applies `criteria` to `table`. An empty result is a normal outcome.
#[instrument(level = "debug", skip_all, fields(rows = table.len()))]
pub fn apply<'t>(table: &'t CanonicalTable, criteria: &FilterCriteria) -> FilteredView<'t> {
    if criteria.is_unrestricted() {
        debug!("no active criteria; selecting every row");
        return FilteredView::all(table);
    }

    let indices: Vec<usize> = table
        .records()
        .iter()
        .enumerate()
        .filter(|(_, record)| criteria.matches(record))
        .map(|(index, _)| index)
        .collect();

    debug!(selected = indices.len(), "applied filter criteria");
    FilteredView { table, indices }
}

/// The dashboard pages, each exposing a subset of the filter criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    /// Global overview: year, score range, regions, statuses, entity kind.
    Overview,
    /// Single country or territory: entity name, year, region.
    EntityFocus,
}

impl Page {
    /// Clears every criterion the page does not expose.
    pub fn scope(self, criteria: &FilterCriteria) -> FilterCriteria {
        match self {
            Page::Overview => FilterCriteria {
                entity_name: None,
                ..criteria.clone()
            },
            Page::EntityFocus => FilterCriteria {
                year: criteria.year,
                regions: criteria.regions.clone(),
                entity_name: criteria.entity_name.clone(),
                ..FilterCriteria::default()
            },
        }
    }

    /// Map color scale used when the session has not picked one.
    pub fn default_color_scale(self) -> ColorScale {
        match self {
            Page::Overview => ColorScale::Viridis,
            Page::EntityFocus => ColorScale::Turbo,
        }
    }
}
