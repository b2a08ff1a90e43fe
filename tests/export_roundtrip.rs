use std::collections::BTreeSet;

use freedom_dashboard::export::{self, DEFAULT_EXPORT_FILENAME};
use freedom_dashboard::filter::{self, FilterCriteria, FilteredView};
use freedom_dashboard::io::{self, SourceSpec};
use freedom_dashboard::model::{CanonicalTable, RawCell, RawTable, Record};
use freedom_dashboard::normalize::normalize;
use tempfile::tempdir;

fn text(value: &str) -> RawCell {
    RawCell::Text(value.to_string())
}

fn source_table() -> CanonicalTable {
    let raw = RawTable::new(
        [
            "Country/Territory",
            "Region",
            "C/T",
            "Edition",
            "Status",
            "PR",
            "CL",
            "Total",
            "Notes",
        ]
        .iter()
        .map(|header| header.to_string())
        .collect(),
        vec![
            vec![
                text("Arcadia"),
                text("Europe, West"),
                text("c"),
                RawCell::Number(2021.0),
                text("Free"),
                RawCell::Number(38.0),
                RawCell::Number(54.5),
                RawCell::Number(92.5),
                text("said \"stable\""),
            ],
            vec![
                text("Isle of Nowhere"),
                RawCell::Empty,
                text("t"),
                RawCell::Number(2021.0),
                RawCell::Empty,
                text("NaN"),
                RawCell::Number(12.0),
                RawCell::Empty,
                RawCell::Empty,
            ],
            vec![
                text("Ruritania"),
                text("Eurasia"),
                text("c"),
                RawCell::Number(2020.0),
                text("Not Free"),
                RawCell::Number(4.0),
                RawCell::Number(6.0),
                RawCell::Number(10.0),
                RawCell::Empty,
            ],
        ],
    );
    normalize(&raw).expect("normalized")
}

fn year_2021(table: &CanonicalTable) -> FilteredView<'_> {
    let criteria = FilterCriteria {
        year: Some(2021),
        ..FilterCriteria::default()
    };
    filter::apply(table, &criteria)
}

fn view_records(view: &FilteredView<'_>) -> Vec<Record> {
    view.records().cloned().collect()
}

#[test]
fn delimited_text_roundtrip_preserves_rows_and_nulls() {
    let table = source_table();
    let view = year_2021(&table);
    assert_eq!(view.len(), 2);

    let text = export::to_delimited_text(&view).expect("exported");
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some(
            "Country/Territory,C/T,Region,Year,Freedom Status,Political Rights score,\
             Civil Liberties score,Total Score,Notes"
        )
    );
    assert!(!text.contains("null"));
    assert!(!text.contains("NaN"));
    assert_eq!(
        lines.nth(1),
        Some("Isle of Nowhere,Territory,,2021,,,12,,")
    );

    let reparsed = normalize(&io::parse_delimited_text(&text).expect("parsed")).expect("normalized");
    assert_eq!(reparsed.len(), view.len());
    assert_eq!(reparsed.fields(), table.fields());
    assert_eq!(reparsed.extra_columns(), table.extra_columns());
    assert_eq!(reparsed.records(), view_records(&view).as_slice());
}

#[test]
fn empty_view_exports_nothing() {
    let table = source_table();
    let criteria = FilterCriteria {
        regions: BTreeSet::from(["Antarctica".to_string()]),
        ..FilterCriteria::default()
    };
    let view = filter::apply(&table, &criteria);

    assert_eq!(export::to_delimited_text(&view).expect("exported"), "");

    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("empty.xlsx");
    let written = export::write_workbook(&view, &path).expect("export attempted");
    assert!(!written);
    assert!(!path.exists());
}

#[test]
fn workbook_export_reads_back_through_loader() {
    let table = source_table();
    let view = year_2021(&table);

    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("filtered.xlsx");
    assert!(export::write_workbook(&view, &path).expect("workbook written"));

    let raw = io::load(&SourceSpec::new(&path)).expect("workbook loaded");
    let restored = normalize(&raw).expect("normalized");

    assert_eq!(restored.records(), view_records(&view).as_slice());
    assert_eq!(restored.extra_columns(), table.extra_columns());
}

#[test]
fn suggested_filename_reflects_selection() {
    assert_eq!(
        export::suggested_filename(&FilterCriteria::default()),
        DEFAULT_EXPORT_FILENAME
    );

    let focused = FilterCriteria {
        year: Some(2021),
        entity_name: Some("Arcadia".to_string()),
        ..FilterCriteria::default()
    };
    assert_eq!(
        export::suggested_filename(&focused),
        "Arcadia_2021_freedom_data.csv"
    );
}
