use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::{debug, instrument};

use crate::freedom::dashboard::filter::FilteredView;
use crate::freedom::dashboard::model::{CanonicalTable, EntityKind};

/// Headline statistics over a filtered view.
///
/// The numeric fields are `None` when no record in the view carries a total
/// score; callers must render that state explicitly rather than as zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub entities: usize,
    pub mean_total_score: Option<f64>,
    pub max_total_score: Option<f64>,
    pub min_total_score: Option<f64>,
}

impl Summary {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

#[instrument(level = "debug", skip_all, fields(rows = view.len()))]
pub fn summary(view: &FilteredView<'_>) -> Summary {
    let mut entities = BTreeSet::new();
    let mut scored = 0usize;
    let mut sum = 0.0;
    let mut max: Option<f64> = None;
    let mut min: Option<f64> = None;

    for record in view.records() {
        entities.insert(record.entity_name.as_str());
        if let Some(score) = record.total_score {
            scored += 1;
            sum += score;
            max = Some(max.map_or(score, |current| current.max(score)));
            min = Some(min.map_or(score, |current| current.min(score)));
        }
    }

    let mean_total_score = (scored > 0).then(|| sum / scored as f64);
    debug!(scored, "computed summary");
    Summary {
        count: view.len(),
        entities: entities.len(),
        mean_total_score,
        max_total_score: max,
        min_total_score: min,
    }
}

/// One point of a trend line. A missing score is drawn as a gap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendPoint {
    pub year: i32,
    pub total_score: Option<f64>,
}

pub type TimeSeries = BTreeMap<String, Vec<TrendPoint>>;

/// Per-entity total score by year over the whole table.
///
/// Reads the whole canonical table, never a filtered view: a trend line spans
/// every year regardless of the active year filter. Rows lacking a year are
/// skipped; rows lacking a score stay in the line as gaps. Duplicate years
/// are kept. Every
/// requested name appears in the result, possibly with no points.
#[instrument(level = "debug", skip_all, fields(entities = entity_names.len()))]
pub fn time_series<S: AsRef<str>>(table: &CanonicalTable, entity_names: &[S]) -> TimeSeries {
    let mut series: TimeSeries = entity_names
        .iter()
        .map(|name| (name.as_ref().to_string(), Vec::new()))
        .collect();

    for record in table.records() {
        let Some(points) = series.get_mut(&record.entity_name) else {
            continue;
        };
        if let Some(year) = record.year {
            points.push(TrendPoint {
                year,
                total_score: record.total_score,
            });
        }
    }

    for points in series.values_mut() {
        points.sort_by_key(|point| point.year);
    }
    series
}

/// The view used for map and table rendering, unchanged.
pub fn snapshot<'v, 't>(view: &'v FilteredView<'t>) -> &'v FilteredView<'t> {
    view
}

/// Scores of a single entity for the focus page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityHighlight {
    pub entity_name: String,
    pub entity_kind: Option<EntityKind>,
    pub year: Option<i32>,
    pub total_score: Option<f64>,
    pub political_rights_score: Option<f64>,
    pub civil_liberties_score: Option<f64>,
}

/// Highlights the first record of the view, if any.
pub fn entity_highlight(view: &FilteredView<'_>) -> Option<EntityHighlight> {
    view.first().map(|record| EntityHighlight {
        entity_name: record.entity_name.clone(),
        entity_kind: record.entity_kind,
        year: record.year,
        total_score: record.total_score,
        political_rights_score: record.political_rights_score,
        civil_liberties_score: record.civil_liberties_score,
    })
}
