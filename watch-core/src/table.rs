use serde_json::Value;

use crate::format::format_currency;
use crate::record::{number_of, WatchRecord, ENABLED_KEY, ESTIMATE_KEY};

/// Element id prefix of the per-row "Load" controls.
pub const LOAD_ID_PREFIX: &str = "watch-load-";
pub const LOAD_COLUMN: &str = "load";
pub const NO_DATA_LABEL: &str = "No Data";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Currency,
    /// Synthesized "Load" control bound to the record id.
    Load,
}

/// One table column: header name plus how its cells are produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    pub kind: ColumnKind,
}

impl ColumnSpec {
    pub fn text(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ColumnKind::Text,
        }
    }

    pub fn currency(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ColumnKind::Currency,
        }
    }

    pub fn load() -> Self {
        Self {
            name: LOAD_COLUMN.to_string(),
            kind: ColumnKind::Load,
        }
    }

    /// Columns from the keys of the first record, in order. `enabled` is
    /// never shown, `estimate` is a currency column and a `load` column is
    /// appended last.
    pub fn derive(records: &[WatchRecord]) -> Vec<ColumnSpec> {
        let Some(first) = records.first() else {
            return Vec::new();
        };
        first
            .keys()
            .filter(|key| *key != ENABLED_KEY && *key != LOAD_COLUMN)
            .map(|key| {
                if key == ESTIMATE_KEY {
                    ColumnSpec::currency(key)
                } else {
                    ColumnSpec::text(key)
                }
            })
            .chain(std::iter::once(ColumnSpec::load()))
            .collect()
    }

    pub fn cell(&self, record: &WatchRecord) -> Cell {
        match self.kind {
            ColumnKind::Text => match record.get(&self.name) {
                None | Some(Value::Null) => Cell::Unknown,
                Some(Value::String(s)) => Cell::Text(s.clone()),
                Some(other) => Cell::Text(display_value(other)),
            },
            ColumnKind::Currency => {
                let value = record.get(&self.name).and_then(number_of);
                match value {
                    Some(v) if v.is_finite() => Cell::Text(format_currency(Some(v))),
                    _ => Cell::Unknown,
                }
            }
            ColumnKind::Load => match record.id() {
                Some(id) => Cell::Load { id },
                None => Cell::Unknown,
            },
        }
    }
}

/// Floats print without a trailing `.0`; integers keep full precision.
fn display_value(value: &Value) -> String {
    match value {
        Value::Number(n) if n.is_f64() => match n.as_f64() {
            Some(f) => f.to_string(),
            None => n.to_string(),
        },
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    /// Rendered as an italic "Unknown".
    Unknown,
    Load { id: String },
}

impl Cell {
    pub fn element_id(&self) -> Option<String> {
        match self {
            Cell::Load { id } => Some(load_element_id(id)),
            _ => None,
        }
    }
}

pub fn load_element_id(id: &str) -> String {
    format!("{LOAD_ID_PREFIX}{id}")
}

/// Inverse of [`load_element_id`].
pub fn parse_load_id(element_id: &str) -> Option<&str> {
    element_id
        .strip_prefix(LOAD_ID_PREFIX)
        .filter(|id| !id.is_empty())
}

/// What the table renderer draws.
#[derive(Debug, Clone, PartialEq)]
pub enum TableModel {
    /// Single placeholder cell.
    Empty,
    Rows {
        columns: Vec<ColumnSpec>,
        rows: Vec<Vec<Cell>>,
    },
}

impl TableModel {
    pub fn build(records: &[WatchRecord], columns: &[ColumnSpec]) -> Self {
        if records.is_empty() {
            return TableModel::Empty;
        }
        let rows = records
            .iter()
            .map(|record| columns.iter().map(|col| col.cell(record)).collect())
            .collect();
        TableModel::Rows {
            columns: columns.to_vec(),
            rows,
        }
    }

    /// Columns derived from the records themselves.
    pub fn derive(records: &[WatchRecord]) -> Self {
        Self::build(records, &ColumnSpec::derive(records))
    }

    pub fn headers(&self) -> Vec<&str> {
        match self {
            TableModel::Empty => Vec::new(),
            TableModel::Rows { columns, .. } => columns.iter().map(|c| c.name.as_str()).collect(),
        }
    }

    /// Body rows as drawn, the placeholder included.
    pub fn row_count(&self) -> usize {
        match self {
            TableModel::Empty => 1,
            TableModel::Rows { rows, .. } => rows.len(),
        }
    }
}
