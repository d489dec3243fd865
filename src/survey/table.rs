//! Tabular assembly: fixed column order, typed cells, local-time timestamps
//!
//! Every column is carried as the exact source text unless its schema declares
//! it a timestamp or a number. This keeps identifier-like values such as
//! `00042` intact in the exported sheet.

use anyhow::{Context, Result, anyhow, bail};
use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use super::models::{AnswerRecord, ResponseRecord, SurveyRecord};

/// Timestamp format sent by the API (always UTC)
pub const SOURCE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Timestamp format written to the tables (no zone suffix)
pub const TABLE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Timestamp,
    Number,
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
}

const fn text(name: &'static str) -> Column {
    Column { name, kind: ColumnKind::Text }
}

const fn timestamp(name: &'static str) -> Column {
    Column { name, kind: ColumnKind::Timestamp }
}

const fn number(name: &'static str) -> Column {
    Column { name, kind: ColumnKind::Number }
}

/// Column layout of one exported table
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    pub name: &'static str,
    pub columns: &'static [Column],
}

pub const SURVEYS: Schema = Schema {
    name: "surveys",
    columns: &[
        text("id"),
        text("title"),
        timestamp("date_created"),
        timestamp("date_modified"),
        number("responses"),
        text("status"),
    ],
};

pub const RESPONSES: Schema = Schema {
    name: "responses",
    columns: &[
        text("id"),
        text("survey_id"),
        timestamp("date_started"),
        timestamp("date_ended"),
        timestamp("date_modified"),
        text("status"),
    ],
};

pub const ANSWERS: Schema = Schema {
    name: "answers",
    columns: &[
        text("id"),
        text("response_id"),
        text("question"),
        text("answer"),
        text("free_text"),
    ],
};

/// Row source for the assembler
pub trait Tabular {
    /// Every column name [`column`](Self::column) resolves
    const COLUMNS: &'static [&'static str];

    /// Raw value of the named column, `Ok(None)` for null
    fn column(&self, name: &str) -> Result<Option<&str>>;
}

fn unknown_column(name: &str) -> anyhow::Error {
    anyhow!("Unknown column '{}'", name)
}

impl Tabular for SurveyRecord {
    const COLUMNS: &'static [&'static str] =
        &["id", "title", "date_created", "date_modified", "responses", "status"];

    fn column(&self, name: &str) -> Result<Option<&str>> {
        Ok(match name {
            "id" => Some(self.id.as_str()),
            "title" => Some(self.title.as_str()),
            "date_created" => self.date_created.as_deref(),
            "date_modified" => self.date_modified.as_deref(),
            "responses" => Some(self.responses.as_str()),
            "status" => Some(self.status.as_str()),
            _ => return Err(unknown_column(name)),
        })
    }
}

impl Tabular for ResponseRecord {
    const COLUMNS: &'static [&'static str] =
        &["id", "survey_id", "date_started", "date_ended", "date_modified", "status"];

    fn column(&self, name: &str) -> Result<Option<&str>> {
        Ok(match name {
            "id" => Some(self.id.as_str()),
            "survey_id" => Some(self.survey_id.as_str()),
            "date_started" => self.date_started.as_deref(),
            "date_ended" => self.date_ended.as_deref(),
            "date_modified" => self.date_modified.as_deref(),
            "status" => Some(self.status.as_str()),
            _ => return Err(unknown_column(name)),
        })
    }
}

impl Tabular for AnswerRecord {
    const COLUMNS: &'static [&'static str] = &["id", "response_id", "question", "answer", "free_text"];

    fn column(&self, name: &str) -> Result<Option<&str>> {
        Ok(match name {
            "id" => Some(self.id.as_str()),
            "response_id" => Some(self.response_id.as_str()),
            "question" => Some(self.question.as_str()),
            "answer" => Some(self.answer.as_str()),
            "free_text" => Some(self.free_text.as_flag()),
            _ => return Err(unknown_column(name)),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

#[derive(Debug, Clone)]
pub struct Table {
    pub name: &'static str,
    pub columns: Vec<&'static str>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell at `row` in the column called `column`
    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        let idx = self.columns.iter().position(|c| *c == column)?;
        self.rows.get(row)?.get(idx)
    }
}

/// Zone the timestamps are rendered in
#[derive(Debug, Clone)]
pub enum DisplayZone {
    /// The process's local zone
    Local,
    Named(Tz),
    Fixed(FixedOffset),
}

impl DisplayZone {
    pub fn render(&self, utc: &DateTime<Utc>) -> String {
        match self {
            DisplayZone::Local => utc.with_timezone(&Local).format(TABLE_TIMESTAMP_FORMAT).to_string(),
            DisplayZone::Named(tz) => utc.with_timezone(tz).format(TABLE_TIMESTAMP_FORMAT).to_string(),
            DisplayZone::Fixed(offset) => utc.with_timezone(offset).format(TABLE_TIMESTAMP_FORMAT).to_string(),
        }
    }
}

/// Convert an API timestamp (`YYYY-MM-DDTHH:MM:SSZ`, UTC) to `YYYY-MM-DD HH:MM:SS` in `zone`
pub fn convert_timestamp(value: &str, zone: &DisplayZone) -> Result<String> {
    let naive = NaiveDateTime::parse_from_str(value, SOURCE_TIMESTAMP_FORMAT)
        .with_context(|| format!("Invalid timestamp '{}' (expected YYYY-MM-DDTHH:MM:SSZ)", value))?;
    Ok(zone.render(&Utc.from_utc_datetime(&naive)))
}

fn parse_number(value: &str) -> Result<f64> {
    let trimmed = value.trim();
    if let Ok(n) = trimmed.parse::<i64>() {
        return Ok(n as f64);
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| anyhow!("'{}' is not a number", value))
}

/// Build the table for `schema` from `records`, in record order.
///
/// Fails when `schema` names a column the record type lacks, and on an
/// unparsable timestamp or number; those mean the upstream data is corrupt and
/// must not be papered over.
pub fn assemble<R: Tabular>(records: &[R], schema: &Schema, zone: &DisplayZone) -> Result<Table> {
    if let Some(column) = schema.columns.iter().find(|c| !R::COLUMNS.contains(&c.name)) {
        bail!("{} schema: {}", schema.name, unknown_column(column.name));
    }

    let mut rows = Vec::with_capacity(records.len());

    for (idx, record) in records.iter().enumerate() {
        let mut row = Vec::with_capacity(schema.columns.len());
        for column in schema.columns {
            let cell = match (record.column(column.name)?, column.kind) {
                (None, _) => Cell::Empty,
                (Some(value), ColumnKind::Text) => Cell::Text(value.to_string()),
                (Some(value), ColumnKind::Timestamp) => Cell::Text(
                    convert_timestamp(value, zone)
                        .with_context(|| format!("{} row {}: column '{}'", schema.name, idx + 1, column.name))?,
                ),
                (Some(value), ColumnKind::Number) => Cell::Number(
                    parse_number(value)
                        .with_context(|| format!("{} row {}: column '{}'", schema.name, idx + 1, column.name))?,
                ),
            };
            row.push(cell);
        }
        rows.push(row);
    }

    Ok(Table {
        name: schema.name,
        columns: schema.columns.iter().map(|c| c.name).collect(),
        rows,
    })
}
