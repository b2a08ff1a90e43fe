use std::sync::Arc;

use freedom_dashboard::DashboardError;
use freedom_dashboard::filter::{FilterCriteria, Page};
use freedom_dashboard::model::{CanonicalTable, EntityKind, Record};
use freedom_dashboard::present::{
    ColorScale, EMPTY_FOCUS_NOTICE, EMPTY_OVERVIEW_NOTICE, PresentationOptions, RenderRequest,
    Theme, UNDEFINED_METRIC, format_metric,
};
use freedom_dashboard::session::Session;

fn record(name: &str, year: i32, total: Option<f64>) -> Record {
    let mut record = Record::new(name);
    record.year = Some(year);
    record.total_score = total;
    record.political_rights_score = total.map(|t| t / 2.0);
    record.civil_liberties_score = total.map(|t| t / 2.0);
    record.entity_kind = Some(EntityKind::Country);
    record
}

fn session() -> Session {
    let table = CanonicalTable::from_records(vec![
        record("Arcadia", 2020, Some(90.0)),
        record("Arcadia", 2021, Some(92.0)),
        record("Ruritania", 2021, Some(55.0)),
        record("Atlantis", 2021, None),
    ]);
    Session::new(
        Arc::new(table),
        PresentationOptions {
            color_scale: Some(ColorScale::Turbo),
            theme: Theme::Dark,
        },
    )
}

#[test]
fn overview_page_combines_all_outputs() {
    let session = session();
    let request = RenderRequest {
        page: Some(Page::Overview),
        criteria: FilterCriteria {
            year: Some(2021),
            ..FilterCriteria::default()
        },
        trend_entities: vec!["Arcadia".to_string()],
    };

    let page = session.render(&request).expect("page rendered");
    assert_eq!(page.summary.count, 3);
    assert_eq!(page.notice, None);

    let values: Vec<&str> = page.kpis.iter().map(|kpi| kpi.value.as_str()).collect();
    assert_eq!(values, vec!["73.50", "3", "92", "55"]);

    let map = page.map.expect("map present");
    assert_eq!(map.points.len(), 2);
    assert_eq!(map.color_scale.name(), "Turbo");
    assert_eq!(map.template, "plotly_dark");

    let trend = page.trend.expect("trend present");
    assert_eq!(trend.series["Arcadia"].len(), 2);
    assert!(trend.markers);

    assert_eq!(page.table.rows.len(), 3);
    let export = page.table.export.expect("export offered");
    assert_eq!(export.filename, "filtered_freedom_data.csv");
    assert_eq!(export.text.lines().count(), 4);
}

#[test]
fn overview_page_with_no_matches_shows_notice() {
    let session = session();
    let request = RenderRequest {
        page: Some(Page::Overview),
        criteria: FilterCriteria {
            year: Some(1990),
            ..FilterCriteria::default()
        },
        trend_entities: Vec::new(),
    };

    let page = session.render(&request).expect("page rendered");
    assert_eq!(page.notice, Some(EMPTY_OVERVIEW_NOTICE));
    assert!(page.map.is_none());
    assert!(page.trend.is_none());
    assert!(page.table.export.is_none());
    assert!(page.table.rows.is_empty());
    let values: Vec<&str> = page.kpis.iter().map(|kpi| kpi.value.as_str()).collect();
    assert_eq!(values, vec![UNDEFINED_METRIC, "0", UNDEFINED_METRIC, UNDEFINED_METRIC]);
}

#[test]
fn focus_page_keeps_full_trend_despite_year() {
    let session = session();
    let request = RenderRequest {
        page: Some(Page::EntityFocus),
        criteria: FilterCriteria {
            year: Some(2021),
            statuses: ["Not Free".to_string()].into_iter().collect(),
            entity_name: Some("Arcadia".to_string()),
            ..FilterCriteria::default()
        },
        trend_entities: Vec::new(),
    };

    let page = session.render(&request).expect("page rendered");
    assert!(page.criteria.statuses.is_empty());
    assert_eq!(page.summary.count, 1);
    let values: Vec<&str> = page.kpis.iter().map(|kpi| kpi.value.as_str()).collect();
    assert_eq!(values, vec!["92", "46", "46"]);

    let trend = page.trend.expect("trend present");
    assert_eq!(trend.title.as_deref(), Some("Total Score: Arcadia"));
    let years: Vec<i32> = trend.series["Arcadia"].iter().map(|p| p.year).collect();
    assert_eq!(years, vec![2020, 2021]);
    assert_eq!(page.trend_notice, None);

    let export = page.table.export.expect("export offered");
    assert_eq!(export.filename, "Arcadia_2021_freedom_data.csv");
}

#[test]
fn focus_page_without_row_reports_empty_state() {
    let session = session();
    let request = RenderRequest {
        page: Some(Page::EntityFocus),
        criteria: FilterCriteria {
            year: Some(2020),
            entity_name: Some("Ruritania".to_string()),
            ..FilterCriteria::default()
        },
        trend_entities: Vec::new(),
    };

    let page = session.render(&request).expect("page rendered");
    assert_eq!(page.notice, Some(EMPTY_FOCUS_NOTICE));
    assert!(page.kpis.iter().all(|kpi| kpi.value == UNDEFINED_METRIC));
    assert!(page.table.export.is_none());
    assert_eq!(page.trend.expect("trend present").series["Ruritania"].len(), 1);
}

#[test]
fn focus_page_requires_an_entity() {
    let table = CanonicalTable::from_records(vec![
        record("Ruritania", 2021, Some(55.0)),
        record("Arcadia", 2021, Some(92.0)),
    ]);
    let session = Session::new(Arc::new(table), PresentationOptions::default());
    let request = RenderRequest {
        page: Some(Page::EntityFocus),
        criteria: FilterCriteria {
            year: Some(2021),
            ..FilterCriteria::default()
        },
        trend_entities: Vec::new(),
    };

    let err = session.render(&request).expect_err("entity is required");
    assert!(matches!(err, DashboardError::InvalidCriteria(_)));

    let overview = RenderRequest {
        page: Some(Page::Overview),
        ..request
    };
    let page = session.render(&overview).expect("overview needs no entity");
    assert_eq!(page.summary.count, 2);
}

#[test]
fn focus_trend_keeps_unscored_years_as_gaps() {
    let session = session();
    let request = RenderRequest {
        page: Some(Page::EntityFocus),
        criteria: FilterCriteria {
            year: Some(2021),
            entity_name: Some("Atlantis".to_string()),
            ..FilterCriteria::default()
        },
        trend_entities: Vec::new(),
    };

    let page = session.render(&request).expect("page rendered");
    assert!(page.kpis.iter().all(|kpi| kpi.value == UNDEFINED_METRIC));
    let trend = page.trend.expect("trend present");
    let points: Vec<(i32, Option<f64>)> = trend.series["Atlantis"]
        .iter()
        .map(|point| (point.year, point.total_score))
        .collect();
    assert_eq!(points, vec![(2021, None)]);
    assert_eq!(page.trend_notice, None);
}

#[test]
fn map_color_scale_defaults_per_page() {
    let session = session().with_options(PresentationOptions {
        theme: Theme::Dark,
        ..PresentationOptions::default()
    });
    let criteria = FilterCriteria {
        year: Some(2021),
        entity_name: Some("Arcadia".to_string()),
        ..FilterCriteria::default()
    };

    let focus = session
        .render(&RenderRequest {
            page: Some(Page::EntityFocus),
            criteria: criteria.clone(),
            trend_entities: Vec::new(),
        })
        .expect("focus rendered");
    assert_eq!(focus.map.expect("map present").color_scale, ColorScale::Turbo);

    let overview = session
        .render(&RenderRequest {
            page: Some(Page::Overview),
            criteria,
            trend_entities: Vec::new(),
        })
        .expect("overview rendered");
    assert_eq!(
        overview.map.expect("map present").color_scale,
        ColorScale::Viridis
    );

    assert_eq!(Page::Overview.default_color_scale(), ColorScale::Viridis);
    assert_eq!(Page::EntityFocus.default_color_scale(), ColorScale::Turbo);
}

#[test]
fn render_output_serializes_to_json() {
    let session = session().with_options(PresentationOptions::default());
    let page = session
        .render(&RenderRequest::default())
        .expect("page rendered");

    let json = serde_json::to_value(&page).expect("serialized");
    assert_eq!(json["page"], "overview");
    assert_eq!(json["map"]["color_scale"], "viridis");
    assert_eq!(json["map"]["template"], "plotly");
    assert_eq!(json["summary"]["count"], 4);
}

#[test]
fn metrics_render_undefined_explicitly() {
    assert_eq!(format_metric(None, Some(2)), UNDEFINED_METRIC);
    assert_eq!(format_metric(Some(73.456), Some(2)), "73.46");
    assert_eq!(format_metric(Some(92.0), None), "92");
    assert_eq!(ColorScale::from_name("icefire"), Some(ColorScale::IceFire));
}
