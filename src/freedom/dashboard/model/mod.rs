use std::fmt;

use serde::{Deserialize, Serialize};

/// A single cell as produced by a loader, before any schema is applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum RawCell {
    /// Blank cell.
    Empty,
    /// Text literal.
    Text(String),
    /// Numeric literal.
    Number(f64),
    /// Boolean literal.
    Bool(bool),
}

impl RawCell {
    /// Renders the cell as display text; blank cells become `None`.
    pub fn to_text(&self) -> Option<String> {
        match self {
            RawCell::Empty => None,
            RawCell::Text(value) => {
                let trimmed = value.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            RawCell::Number(value) => Some(format_number(*value)),
            RawCell::Bool(value) => Some(value.to_string()),
        }
    }

    /// Coerces the cell to a finite number. Anything unparsable becomes `None`.
    pub fn to_number(&self) -> Option<f64> {
        let value = match self {
            RawCell::Number(value) => *value,
            RawCell::Text(value) => value.trim().parse::<f64>().ok()?,
            RawCell::Empty | RawCell::Bool(_) => return None,
        };
        value.is_finite().then_some(value)
    }
}

/// Header row plus data rows exactly as the loader found them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<RawCell>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<RawCell>>) -> Self {
        Self { headers, rows }
    }
}

/// Whether a row describes a sovereign country or a territory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Country,
    Territory,
}

impl EntityKind {
    /// Maps the source's single-letter code (or an already canonical label).
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        if code.eq_ignore_ascii_case("c") || code == "Country" {
            Some(EntityKind::Country)
        } else if code.eq_ignore_ascii_case("t") || code == "Territory" {
            Some(EntityKind::Territory)
        } else {
            None
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Country => "Country",
            EntityKind::Territory => "Territory",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One (entity, year) observation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub entity_name: String,
    pub entity_kind: Option<EntityKind>,
    pub region: Option<String>,
    pub year: Option<i32>,
    pub freedom_status: Option<String>,
    pub political_rights_rating: Option<f64>,
    pub civil_liberties_rating: Option<f64>,
    pub political_rights_score: Option<f64>,
    pub civil_liberties_score: Option<f64>,
    pub total_score: Option<f64>,
    /// Pass-through columns, aligned with [`CanonicalTable::extra_columns`].
    pub extra: Vec<Option<String>>,
}

impl Record {
    /// Creates a record carrying only an entity name.
    pub fn new(entity_name: impl Into<String>) -> Self {
        Self {
            entity_name: entity_name.into(),
            entity_kind: None,
            region: None,
            year: None,
            freedom_status: None,
            political_rights_rating: None,
            civil_liberties_rating: None,
            political_rights_score: None,
            civil_liberties_score: None,
            total_score: None,
            extra: Vec::new(),
        }
    }
}

/// Canonical columns understood by the pipeline, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    EntityName,
    EntityKind,
    Region,
    Year,
    FreedomStatus,
    PoliticalRightsRating,
    CivilLibertiesRating,
    PoliticalRightsScore,
    CivilLibertiesScore,
    TotalScore,
}

impl Field {
    pub const ALL: [Field; 10] = [
        Field::EntityName,
        Field::EntityKind,
        Field::Region,
        Field::Year,
        Field::FreedomStatus,
        Field::PoliticalRightsRating,
        Field::CivilLibertiesRating,
        Field::PoliticalRightsScore,
        Field::CivilLibertiesScore,
        Field::TotalScore,
    ];

    /// Canonical header used for display and export.
    pub fn header(self) -> &'static str {
        match self {
            Field::EntityName => "Country/Territory",
            Field::EntityKind => "C/T",
            Field::Region => "Region",
            Field::Year => "Year",
            Field::FreedomStatus => "Freedom Status",
            Field::PoliticalRightsRating => "Political Rights ratings",
            Field::CivilLibertiesRating => "Civil Liberties ratings",
            Field::PoliticalRightsScore => "Political Rights score",
            Field::CivilLibertiesScore => "Civil Liberties score",
            Field::TotalScore => "Total Score",
        }
    }

    pub fn from_header(header: &str) -> Option<Self> {
        Field::ALL.into_iter().find(|field| field.header() == header)
    }

    /// Reads this field from a record.
    pub fn cell(self, record: &Record) -> Cell<'_> {
        match self {
            Field::EntityName => Cell::Text(&record.entity_name),
            Field::EntityKind => record
                .entity_kind
                .map_or(Cell::Empty, |kind| Cell::Text(kind.label())),
            Field::Region => Cell::from_text(record.region.as_deref()),
            Field::Year => record
                .year
                .map_or(Cell::Empty, |year| Cell::Integer(i64::from(year))),
            Field::FreedomStatus => Cell::from_text(record.freedom_status.as_deref()),
            Field::PoliticalRightsRating => Cell::from_number(record.political_rights_rating),
            Field::CivilLibertiesRating => Cell::from_number(record.civil_liberties_rating),
            Field::PoliticalRightsScore => Cell::from_number(record.political_rights_score),
            Field::CivilLibertiesScore => Cell::from_number(record.civil_liberties_score),
            Field::TotalScore => Cell::from_number(record.total_score),
        }
    }
}

/// A borrowed, typed view of one output cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell<'a> {
    Empty,
    Text(&'a str),
    Integer(i64),
    Number(f64),
}

impl<'a> Cell<'a> {
    fn from_text(value: Option<&'a str>) -> Self {
        value.map_or(Cell::Empty, Cell::Text)
    }

    fn from_number(value: Option<f64>) -> Self {
        value.map_or(Cell::Empty, Cell::Number)
    }

    /// Text rendering used by delimited export. Nulls render as an empty field.
    pub fn to_field(self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(value) => value.to_string(),
            Cell::Integer(value) => value.to_string(),
            Cell::Number(value) => format_number(value),
        }
    }
}

/// Formats a number without a trailing `.0` for integral values.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// One output column of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column<'a> {
    Field(Field),
    Extra { index: usize, header: &'a str },
}

impl<'a> Column<'a> {
    pub fn header(&self) -> &'a str {
        match self {
            Column::Field(field) => field.header(),
            Column::Extra { header, .. } => header,
        }
    }

    pub fn cell(&self, record: &'a Record) -> Cell<'a> {
        match self {
            Column::Field(field) => field.cell(record),
            Column::Extra { index, .. } => record
                .extra
                .get(*index)
                .and_then(|value| value.as_deref())
                .map_or(Cell::Empty, Cell::Text),
        }
    }
}

/// The normalized, immutable dataset for a session.
///
/// Built once by [`normalize`](crate::normalize::normalize); every consumer
/// only borrows it.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalTable {
    fields: Vec<Field>,
    extra_columns: Vec<String>,
    records: Vec<Record>,
    dropped_rows: usize,
}

impl CanonicalTable {
    /// Assembles a table. `fields` is sorted into canonical order and always
    /// contains [`Field::EntityName`].
    pub fn new(
        mut fields: Vec<Field>,
        extra_columns: Vec<String>,
        records: Vec<Record>,
        dropped_rows: usize,
    ) -> Self {
        if !fields.contains(&Field::EntityName) {
            fields.push(Field::EntityName);
        }
        fields.sort();
        fields.dedup();
        Self {
            fields,
            extra_columns,
            records,
            dropped_rows,
        }
    }

    /// Builds a table from records alone, exposing every canonical field.
    pub fn from_records(records: Vec<Record>) -> Self {
        Self::new(Field::ALL.to_vec(), Vec::new(), records, 0)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn extra_columns(&self) -> &[String] {
        &self.extra_columns
    }

    /// Number of source rows discarded because they had no entity name.
    pub fn dropped_rows(&self) -> usize {
        self.dropped_rows
    }

    /// Canonical columns present in the source followed by pass-through columns.
    pub fn columns(&self) -> Vec<Column<'_>> {
        self.fields
            .iter()
            .copied()
            .map(Column::Field)
            .chain(
                self.extra_columns
                    .iter()
                    .enumerate()
                    .map(|(index, header)| Column::Extra { index, header }),
            )
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
