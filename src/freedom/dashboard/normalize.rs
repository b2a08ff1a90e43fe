use std::collections::BTreeMap;

use tracing::{debug, info, instrument};

use crate::freedom::dashboard::error::{DashboardError, Result};
use crate::freedom::dashboard::model::{
    CanonicalTable, EntityKind, Field, RawCell, RawTable, Record,
};

/// Raw header variants and the canonical header each one is renamed to.
/// Headers not listed here are kept as they are.
pub const HEADER_RENAMES: &[(&str, &str)] = &[
    ("Edition", "Year"),
    ("Status", "Freedom Status"),
    ("PR rating", "Political Rights ratings"),
    ("CL rating", "Civil Liberties ratings"),
    ("F", "Freedom Score ratings"),
    ("PR", "Political Rights score"),
    ("CL", "Civil Liberties score"),
    ("Total", "Total Score"),
];

/// Headers that may carry the entity name, highest priority first.
pub const ENTITY_NAME_CANDIDATES: &[&str] = &[
    "Country/Territory",
    "Country / Territory",
    "Country or Territory",
    "Country",
];

/// Applies [`HEADER_RENAMES`] to a single trimmed header.
pub fn canonical_header(header: &str) -> &str {
    let header = header.trim();
    HEADER_RENAMES
        .iter()
        .find(|(raw, _)| *raw == header)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(header)
}

/// Turns a loader's raw table into the canonical table.
///
/// Pure: the output depends only on `raw`, so callers may cache it keyed on
/// the source identity. Unparsable numbers and unknown kind codes become
/// nulls; rows without an entity name are dropped and counted.
#[instrument(level = "info", skip_all, fields(columns = raw.headers.len(), rows = raw.rows.len()))]
pub fn normalize(raw: &RawTable) -> Result<CanonicalTable> {
    let headers: Vec<String> = raw
        .headers
        .iter()
        .enumerate()
        .map(|(index, header)| match canonical_header(header) {
            "" => format!("Unnamed: {index}"),
            renamed => renamed.to_string(),
        })
        .collect();

    let name_index = resolve_entity_column(&headers)?;
    let layout = ColumnLayout::build(&headers, name_index);
    debug!(
        fields = layout.fields.len(),
        extra = layout.extra.len(),
        "resolved column layout"
    );

    let mut records = Vec::with_capacity(raw.rows.len());
    let mut dropped = 0usize;
    for row in &raw.rows {
        match layout.record(row) {
            Some(record) => records.push(record),
            None => dropped += 1,
        }
    }

    info!(records = records.len(), dropped, "normalized dataset");
    let fields = layout.fields.keys().copied().collect();
    let extra_columns = layout.extra.into_iter().map(|(_, header)| header).collect();
    Ok(CanonicalTable::new(fields, extra_columns, records, dropped))
}

fn resolve_entity_column(headers: &[String]) -> Result<usize> {
    ENTITY_NAME_CANDIDATES
        .iter()
        .find_map(|candidate| headers.iter().position(|header| header == candidate))
        .ok_or_else(|| DashboardError::Schema {
            field: "entity_name",
            candidates: ENTITY_NAME_CANDIDATES
                .iter()
                .map(|candidate| candidate.to_string())
                .collect(),
        })
}

struct ColumnLayout {
    fields: BTreeMap<Field, usize>,
    extra: Vec<(usize, String)>,
}

impl ColumnLayout {
    fn build(headers: &[String], name_index: usize) -> Self {
        let mut fields = BTreeMap::from([(Field::EntityName, name_index)]);
        let mut extra = Vec::new();

        for (index, header) in headers.iter().enumerate() {
            if index == name_index {
                continue;
            }
            match Field::from_header(header) {
                Some(field) if field != Field::EntityName && !fields.contains_key(&field) => {
                    fields.insert(field, index);
                }
                _ => extra.push((index, header.clone())),
            }
        }

        Self { fields, extra }
    }

    fn cell<'r>(&self, row: &'r [RawCell], field: Field) -> &'r RawCell {
        self.fields
            .get(&field)
            .and_then(|index| row.get(*index))
            .unwrap_or(&RawCell::Empty)
    }

    fn record(&self, row: &[RawCell]) -> Option<Record> {
        let mut record = Record::new(self.cell(row, Field::EntityName).to_text()?);
        record.entity_kind = self
            .cell(row, Field::EntityKind)
            .to_text()
            .and_then(|code| EntityKind::from_code(&code));
        record.region = self.cell(row, Field::Region).to_text();
        record.year = coerce_year(self.cell(row, Field::Year));
        record.freedom_status = self.cell(row, Field::FreedomStatus).to_text();
        record.political_rights_rating = self.cell(row, Field::PoliticalRightsRating).to_number();
        record.civil_liberties_rating = self.cell(row, Field::CivilLibertiesRating).to_number();
        record.political_rights_score = self.cell(row, Field::PoliticalRightsScore).to_number();
        record.civil_liberties_score = self.cell(row, Field::CivilLibertiesScore).to_number();
        record.total_score = self.cell(row, Field::TotalScore).to_number();
        record.extra = self
            .extra
            .iter()
            .map(|(index, _)| row.get(*index).and_then(RawCell::to_text))
            .collect();
        Some(record)
    }
}

fn coerce_year(cell: &RawCell) -> Option<i32> {
    let value = cell.to_number()?;
    if value.fract() != 0.0 || value < f64::from(i32::MIN) || value > f64::from(i32::MAX) {
        return None;
    }
    Some(value as i32)
}
