//! Adapter between the pipeline and the charting and table widgets.
//!
//! Everything here is plain serializable data; drawing the choropleth or the
//! trend chart is the rendering layer's job.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::freedom::dashboard::aggregate::{self, EntityHighlight, Summary, TimeSeries};
use crate::freedom::dashboard::error::{DashboardError, Result};
use crate::freedom::dashboard::export;
use crate::freedom::dashboard::filter::{self, FilterCriteria, FilteredView, Page};
use crate::freedom::dashboard::model::CanonicalTable;

/// Placeholder shown for a metric with no defined value.
pub const UNDEFINED_METRIC: &str = "—";

/// Continuous color scales offered for the map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorScale {
    #[default]
    #[serde(rename = "viridis")]
    Viridis,
    #[serde(rename = "plasma")]
    Plasma,
    #[serde(rename = "inferno")]
    Inferno,
    #[serde(rename = "magma")]
    Magma,
    #[serde(rename = "cividis")]
    Cividis,
    RdYlGn,
    Blues,
    Greens,
    Turbo,
    IceFire,
}

impl ColorScale {
    pub const ALL: [ColorScale; 10] = [
        ColorScale::Viridis,
        ColorScale::Plasma,
        ColorScale::Inferno,
        ColorScale::Magma,
        ColorScale::Cividis,
        ColorScale::RdYlGn,
        ColorScale::Blues,
        ColorScale::Greens,
        ColorScale::Turbo,
        ColorScale::IceFire,
    ];

    /// Name understood by the charting library.
    pub fn name(self) -> &'static str {
        match self {
            ColorScale::Viridis => "viridis",
            ColorScale::Plasma => "plasma",
            ColorScale::Inferno => "inferno",
            ColorScale::Magma => "magma",
            ColorScale::Cividis => "cividis",
            ColorScale::RdYlGn => "RdYlGn",
            ColorScale::Blues => "Blues",
            ColorScale::Greens => "Greens",
            ColorScale::Turbo => "Turbo",
            ColorScale::IceFire => "IceFire",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        ColorScale::ALL
            .into_iter()
            .find(|scale| scale.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for ColorScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Chart template matching the theme.
    pub fn template(self) -> &'static str {
        match self {
            Theme::Light => "plotly",
            Theme::Dark => "plotly_dark",
        }
    }
}

/// Session-scoped presentation choices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentationOptions {
    /// Map color scale; `None` falls back to the page's own default.
    pub color_scale: Option<ColorScale>,
    pub theme: Theme,
}

impl PresentationOptions {
    pub fn color_scale_for(&self, page: Page) -> ColorScale {
        self.color_scale.unwrap_or_else(|| page.default_color_scale())
    }
}

/// One labelled headline figure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpi {
    pub label: &'static str,
    pub value: String,
}

impl Kpi {
    fn metric(label: &'static str, value: Option<f64>, decimals: Option<usize>) -> Self {
        Self {
            label,
            value: format_metric(value, decimals),
        }
    }
}

/// Renders an optional metric, rounding when `decimals` is given.
pub fn format_metric(value: Option<f64>, decimals: Option<usize>) -> String {
    match (value, decimals) {
        (None, _) => UNDEFINED_METRIC.to_string(),
        (Some(value), Some(decimals)) => format!("{value:.decimals$}"),
        (Some(value), None) => value.to_string(),
    }
}

/// Overview KPI cards.
pub fn summary_kpis(summary: &Summary) -> Vec<Kpi> {
    vec![
        Kpi::metric("Average Score", summary.mean_total_score, Some(2)),
        Kpi {
            label: "Countries",
            value: summary.entities.to_string(),
        },
        Kpi::metric("Max Score", summary.max_total_score, None),
        Kpi::metric("Min Score", summary.min_total_score, None),
    ]
}

/// Entity focus KPI cards.
pub fn highlight_kpis(highlight: Option<&EntityHighlight>) -> Vec<Kpi> {
    vec![
        Kpi::metric("Total Score", highlight.and_then(|h| h.total_score), None),
        Kpi::metric(
            "Political Rights",
            highlight.and_then(|h| h.political_rights_score),
            None,
        ),
        Kpi::metric(
            "Civil Liberties",
            highlight.and_then(|h| h.civil_liberties_score),
            None,
        ),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPoint {
    pub entity_name: String,
    pub total_score: f64,
}

/// Choropleth input. Names are resolved against the renderer's country
/// gazetteer; unresolved names are simply not drawn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapInput {
    pub points: Vec<MapPoint>,
    pub color_scale: ColorScale,
    pub template: &'static str,
}

/// Records without a total score have nothing to color and are left out.
pub fn map_input(
    view: &FilteredView<'_>,
    options: &PresentationOptions,
    page: Page,
) -> MapInput {
    let points = aggregate::snapshot(view)
        .records()
        .filter_map(|record| {
            record.total_score.map(|total_score| MapPoint {
                entity_name: record.entity_name.clone(),
                total_score,
            })
        })
        .collect();
    MapInput {
        points,
        color_scale: options.color_scale_for(page),
        template: options.theme.template(),
    }
}

/// Line chart input: one line per entity, x = year, y = total score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendChart {
    pub title: Option<String>,
    pub series: TimeSeries,
    pub markers: bool,
    pub template: &'static str,
}

pub fn trend_input<S: AsRef<str>>(
    table: &CanonicalTable,
    entity_names: &[S],
    options: &PresentationOptions,
) -> TrendChart {
    let title = match entity_names {
        [single] => Some(format!("Total Score: {}", single.as_ref())),
        _ => None,
    };
    TrendChart {
        title,
        series: aggregate::time_series(table, entity_names),
        markers: true,
        template: options.theme.template(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportInput {
    pub filename: String,
    pub text: String,
}

/// Table widget input. `export` is `None` when there is nothing to download.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableInput {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub export: Option<ExportInput>,
}

pub fn table_input(view: &FilteredView<'_>, criteria: &FilterCriteria) -> Result<TableInput> {
    let columns = view.table().columns();
    let rows = view
        .records()
        .map(|record| {
            columns
                .iter()
                .map(|column| column.cell(record).to_field())
                .collect()
        })
        .collect();

    let export = if view.is_empty() {
        None
    } else {
        Some(ExportInput {
            filename: export::suggested_filename(criteria),
            text: export::to_delimited_text(view)?,
        })
    };

    Ok(TableInput {
        columns: columns.iter().map(|column| column.header().to_string()).collect(),
        rows,
        export,
    })
}

/// What the user asked for in one interaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderRequest {
    pub page: Option<Page>,
    pub criteria: FilterCriteria,
    /// Entities plotted on the overview trend chart.
    pub trend_entities: Vec<String>,
}

/// Everything a page shows for one render cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedPage {
    pub page: Page,
    pub criteria: FilterCriteria,
    pub summary: Summary,
    pub kpis: Vec<Kpi>,
    /// Informational message shown instead of the map when nothing matched.
    pub notice: Option<&'static str>,
    pub map: Option<MapInput>,
    pub trend: Option<TrendChart>,
    pub trend_notice: Option<&'static str>,
    pub table: TableInput,
}

pub const EMPTY_OVERVIEW_NOTICE: &str = "No rows match your current filters. Try broadening the score range, clearing regions, or switching year.";
pub const EMPTY_FOCUS_NOTICE: &str = "No row found for the chosen filters.";
pub const EMPTY_TREND_NOTICE: &str = "No trend data for this selection.";

/// Runs the whole pipeline for one page: scope the criteria, filter,
/// aggregate, and shape the results for the widgets.
///
/// The entity focus page describes exactly one entity, so a request for it
/// without an entity name is rejected with
/// [`DashboardError::InvalidCriteria`].
#[instrument(level = "info", skip_all, fields(page = ?request.page.unwrap_or(Page::Overview)))]
pub fn render_page(
    table: &CanonicalTable,
    options: &PresentationOptions,
    request: &RenderRequest,
) -> Result<RenderedPage> {
    let page = request.page.unwrap_or(Page::Overview);
    if page == Page::EntityFocus && request.criteria.entity_name.is_none() {
        return Err(DashboardError::InvalidCriteria(
            "the entity focus page needs an entity name".to_string(),
        ));
    }
    let criteria = page.scope(&request.criteria);
    let view = filter::apply(table, &criteria);
    let summary = aggregate::summary(&view);

    let (kpis, notice) = match page {
        Page::Overview => (
            summary_kpis(&summary),
            view.is_empty().then_some(EMPTY_OVERVIEW_NOTICE),
        ),
        Page::EntityFocus => (
            highlight_kpis(aggregate::entity_highlight(&view).as_ref()),
            view.is_empty().then_some(EMPTY_FOCUS_NOTICE),
        ),
    };
    if notice.is_some() {
        info!("no records matched the active criteria");
    }

    let trend_entities: Vec<String> = match page {
        Page::Overview => request.trend_entities.clone(),
        Page::EntityFocus => criteria.entity_name.iter().cloned().collect(),
    };
    let trend = (!trend_entities.is_empty())
        .then(|| trend_input(table, trend_entities.as_slice(), options));
    let trend_notice = match (&trend, page) {
        (Some(chart), Page::EntityFocus)
            if chart.series.values().all(|points| points.is_empty()) =>
        {
            Some(EMPTY_TREND_NOTICE)
        }
        _ => None,
    };

    Ok(RenderedPage {
        page,
        map: (!view.is_empty()).then(|| map_input(&view, options, page)),
        table: table_input(&view, &criteria)?,
        criteria,
        summary,
        kpis,
        notice,
        trend,
        trend_notice,
    })
}
