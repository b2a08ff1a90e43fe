use freedom_dashboard::model::{EntityKind, Field, RawCell, RawTable};
use freedom_dashboard::normalize::{canonical_header, normalize};

fn text(value: &str) -> RawCell {
    RawCell::Text(value.to_string())
}

fn number(value: f64) -> RawCell {
    RawCell::Number(value)
}

fn headers(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

#[test]
fn renames_source_headers_and_coerces_values() {
    let raw = RawTable::new(
        headers(&[
            "Country/Territory",
            "Region",
            "C/T",
            "Edition",
            "Status",
            "PR rating",
            "CL rating",
            "PR",
            "CL",
            "Total",
        ]),
        vec![
            vec![
                text("Arcadia"),
                text("Europe"),
                text("c"),
                number(2021.0),
                text("F"),
                number(1.0),
                number(2.0),
                number(38.0),
                number(54.0),
                number(92.0),
            ],
            vec![
                text("Isle of Nowhere"),
                RawCell::Empty,
                text("T"),
                text(" 2020 "),
                RawCell::Empty,
                RawCell::Empty,
                RawCell::Empty,
                text("n/a"),
                text("12.5"),
                text("-"),
            ],
        ],
    );

    let table = normalize(&raw).expect("normalized");
    assert_eq!(table.len(), 2);
    assert_eq!(table.fields(), &Field::ALL);
    assert!(table.extra_columns().is_empty());

    let arcadia = &table.records()[0];
    assert_eq!(arcadia.entity_name, "Arcadia");
    assert_eq!(arcadia.entity_kind, Some(EntityKind::Country));
    assert_eq!(arcadia.region.as_deref(), Some("Europe"));
    assert_eq!(arcadia.year, Some(2021));
    assert_eq!(arcadia.freedom_status.as_deref(), Some("F"));
    assert_eq!(arcadia.political_rights_rating, Some(1.0));
    assert_eq!(arcadia.civil_liberties_rating, Some(2.0));
    assert_eq!(arcadia.political_rights_score, Some(38.0));
    assert_eq!(arcadia.civil_liberties_score, Some(54.0));
    assert_eq!(arcadia.total_score, Some(92.0));

    let isle = &table.records()[1];
    assert_eq!(isle.entity_kind, Some(EntityKind::Territory));
    assert_eq!(isle.region, None);
    assert_eq!(isle.year, Some(2020));
    assert_eq!(isle.political_rights_score, None);
    assert_eq!(isle.civil_liberties_score, Some(12.5));
    assert_eq!(isle.total_score, None);
}

#[test]
fn entity_column_follows_candidate_priority() {
    let raw = RawTable::new(
        headers(&["Country", "Country or Territory", "Total"]),
        vec![vec![text("Short"), text("Long Name"), number(50.0)]],
    );

    let table = normalize(&raw).expect("normalized");
    assert_eq!(table.records()[0].entity_name, "Long Name");
    assert_eq!(table.extra_columns(), &["Country".to_string()]);
    assert_eq!(table.records()[0].extra, vec![Some("Short".to_string())]);
}

#[test]
fn single_file_layout_uses_country_header() {
    let raw = RawTable::new(
        headers(&["Country", "Edition", "Total"]),
        vec![vec![text("Arcadia"), number(2019.0), number(88.0)]],
    );

    let table = normalize(&raw).expect("normalized");
    assert_eq!(table.records()[0].entity_name, "Arcadia");
    assert_eq!(table.fields(), &[Field::EntityName, Field::Year, Field::TotalScore]);
}

#[test]
fn missing_entity_column_is_a_schema_error() {
    let raw = RawTable::new(
        headers(&["Region", "Total"]),
        vec![vec![text("Europe"), number(10.0)]],
    );

    let err = normalize(&raw).expect_err("schema error");
    assert!(err.is_schema_error());
    assert!(!err.is_load_error());
    assert!(err.to_string().contains("Country/Territory"));
}

#[test]
fn unmapped_kind_codes_and_bad_years_become_null() {
    let raw = RawTable::new(
        headers(&["Country/Territory", "C/T", "Edition"]),
        vec![
            vec![text("A"), text("x"), number(2021.5)],
            vec![text("B"), number(1.0), text("twenty")],
            vec![text("C"), text("Country"), number(2024.0)],
        ],
    );

    let table = normalize(&raw).expect("normalized");
    let kinds: Vec<Option<EntityKind>> = table.records().iter().map(|r| r.entity_kind).collect();
    assert_eq!(kinds, vec![None, None, Some(EntityKind::Country)]);
    let years: Vec<Option<i32>> = table.records().iter().map(|r| r.year).collect();
    assert_eq!(years, vec![None, None, Some(2024)]);
}

#[test]
fn rows_without_entity_name_are_dropped_and_counted() {
    let raw = RawTable::new(
        headers(&["Country/Territory", "Total", "Source note"]),
        vec![
            vec![text("Arcadia"), number(90.0), text("revised")],
            vec![RawCell::Empty, number(10.0), RawCell::Empty],
            vec![text("   "), number(20.0)],
            vec![text("Ruritania")],
        ],
    );

    let table = normalize(&raw).expect("normalized");
    assert_eq!(table.len(), 2);
    assert_eq!(table.dropped_rows(), 2);
    assert_eq!(table.extra_columns(), &["Source note".to_string()]);
    assert_eq!(table.records()[0].extra, vec![Some("revised".to_string())]);
    assert_eq!(table.records()[1].extra, vec![None]);
    assert_eq!(table.records()[1].total_score, None);
}

#[test]
fn normalization_is_deterministic() {
    let raw = RawTable::new(
        headers(&["Country", "Total"]),
        vec![vec![text("Arcadia"), text("77")]],
    );

    assert_eq!(
        normalize(&raw).expect("first pass"),
        normalize(&raw).expect("second pass")
    );
}

#[test]
fn canonical_header_trims_and_renames() {
    assert_eq!(canonical_header(" Edition "), "Year");
    assert_eq!(canonical_header("Total"), "Total Score");
    assert_eq!(canonical_header("Add Q"), "Add Q");
}
