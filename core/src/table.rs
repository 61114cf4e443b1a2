//! Enkel kolonnetabell for cache-filene. Celler leses inn som tekst og
//! får riktig type via [`crate::normalize`].

use std::fmt;
use std::path::Path;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};

use crate::error::{Result, RunGraphError};

pub const DATE_FMT: &str = "%Y-%m-%d";
pub const TIME_FMT: &str = "%H:%M:%S%.f";
pub const TIMESTAMP_FMT: &str = "%Y-%m-%d %H:%M:%S%.f%:z";

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(DateTime<FixedOffset>),
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) => f.write_str(s),
            // f64 Display gir korteste representasjon som leses tilbake eksakt
            Cell::Number(v) => write!(f, "{v}"),
            Cell::Bool(b) => write!(f, "{b}"),
            Cell::Date(d) => write!(f, "{}", d.format(DATE_FMT)),
            Cell::Time(t) => write!(f, "{}", t.format(TIME_FMT)),
            Cell::Timestamp(ts) => write!(f, "{}", ts.format(TIMESTAMP_FMT)),
        }
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Number(v)
    }
}

impl From<Option<f64>> for Cell {
    fn from(v: Option<f64>) -> Self {
        v.map_or(Cell::Empty, Cell::Number)
    }
}

impl From<bool> for Cell {
    fn from(b: bool) -> Self {
        Cell::Bool(b)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }

    pub fn row(&self, idx: usize) -> Option<RowView<'_>> {
        self.rows.get(idx).map(|cells| RowView { table: self, cells })
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = RowView<'_>> {
        self.rows.iter().map(move |cells| RowView { table: self, cells })
    }

    /// Leser CSV med header. Tomme felt blir `Cell::Empty`, resten `Cell::Text`.
    pub fn read_csv(path: &Path) -> Result<Table> {
        let mut rdr = csv::Reader::from_path(path)?;
        let columns: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            let row = record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(field.to_string())
                    }
                })
                .collect();
            rows.push(row);
        }
        Ok(Table { columns, rows })
    }

    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut wtr = csv::Writer::from_path(path)?;
        wtr.write_record(&self.columns)?;
        for row in &self.rows {
            wtr.write_record(row.iter().map(|c| c.to_string()))?;
        }
        wtr.flush()?;
        Ok(())
    }
}

/// Én rad med oppslag på kolonnenavn.
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    table: &'a Table,
    cells: &'a [Cell],
}

impl<'a> RowView<'a> {
    pub fn get(&self, column: &str) -> Result<&'a Cell> {
        self.table
            .column_index(column)
            .and_then(|idx| self.cells.get(idx))
            .ok_or_else(|| RunGraphError::missing("cached", column))
    }

    pub fn f64(&self, column: &str) -> Result<f64> {
        match self.get(column)? {
            Cell::Number(v) => Ok(*v),
            Cell::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|e| RunGraphError::parse(column, s, e)),
            Cell::Empty => Err(RunGraphError::missing("cached", column)),
            other => Err(type_mismatch(column, other, "number")),
        }
    }

    pub fn opt_f64(&self, column: &str) -> Result<Option<f64>> {
        match self.table.column_index(column).and_then(|i| self.cells.get(i)) {
            None | Some(Cell::Empty) => Ok(None),
            Some(_) => self.f64(column).map(Some),
        }
    }

    pub fn bool(&self, column: &str) -> Result<bool> {
        match self.get(column)? {
            Cell::Bool(b) => Ok(*b),
            Cell::Number(v) => Ok(*v != 0.0),
            Cell::Text(s) => parse_flag(column, s),
            Cell::Empty => Err(RunGraphError::missing("cached", column)),
            other => Err(type_mismatch(column, other, "bool")),
        }
    }

    pub fn text(&self, column: &str) -> Result<String> {
        match self.get(column)? {
            Cell::Empty => Err(RunGraphError::missing("cached", column)),
            other => Ok(other.to_string()),
        }
    }

    pub fn date(&self, column: &str) -> Result<NaiveDate> {
        match self.get(column)? {
            Cell::Date(d) => Ok(*d),
            other => Err(type_mismatch(column, other, "date")),
        }
    }

    pub fn time(&self, column: &str) -> Result<NaiveTime> {
        match self.get(column)? {
            Cell::Time(t) => Ok(*t),
            other => Err(type_mismatch(column, other, "time")),
        }
    }

    pub fn timestamp(&self, column: &str) -> Result<DateTime<FixedOffset>> {
        match self.get(column)? {
            Cell::Timestamp(ts) => Ok(*ts),
            other => Err(type_mismatch(column, other, "timestamp")),
        }
    }
}

/// "1"/"0" fra eksporten, "true"/"false" fra cachen.
pub fn parse_flag(field: &str, s: &str) -> Result<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(RunGraphError::parse(field, s, "expected a boolean flag")),
    }
}

fn type_mismatch(column: &str, cell: &Cell, expected: &str) -> RunGraphError {
    RunGraphError::parse(
        column,
        &cell.to_string(),
        format!("expected {expected} cell (normalize the table first)"),
    )
}
