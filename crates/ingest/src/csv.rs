use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

use haushalt_core::{BankRecord, Flow};

use crate::date;

/// A column role the header resolver assigns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Date,
    Description,
    Amount,
    Kind,
}

/// Ordered header-matching rules. Each header cell is lower-cased and
/// matched by substring containment; the first cell (left to right) hitting
/// any synonym wins the field. Extend here for more locales.
const HEADER_RULES: &[(Column, &[&str])] = &[
    (Column::Date, &["date", "datum"]),
    (
        Column::Description,
        &["description", "memo", "detail", "beschreibung"],
    ),
    (Column::Amount, &["amount", "betrag"]),
    (Column::Kind, &["type", "transaction", "art"]),
];

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Knobs for adapting to a bank export format the heuristics don't cover.
/// Everything has a working default; a TOML profile can override any subset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestOptions {
    /// Explicit field delimiter; skips header-based detection when set.
    /// Only the first byte is used, matching single-byte CSV delimiters.
    pub delimiter: Option<String>,
    /// Date patterns tried in order (chrono strftime syntax).
    pub date_patterns: Vec<String>,
    /// Lowercase markers that classify a type cell as a credit.
    pub credit_markers: Vec<String>,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            delimiter: None,
            date_patterns: date::DEFAULT_PATTERNS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            credit_markers: vec!["credit".into(), "deposit".into(), "haben".into()],
        }
    }
}

/// Resolved indices of the columns this run will read.
#[derive(Debug, Clone, Copy)]
struct ColumnMap {
    date: usize,
    description: usize,
    amount: usize,
    kind: Option<usize>,
}

impl ColumnMap {
    fn resolve(header: &csv::StringRecord) -> Result<Self, IngestError> {
        let cells: Vec<String> = header
            .iter()
            .map(|c| c.trim().trim_matches('"').to_lowercase())
            .collect();

        let find = |column: Column| -> Option<usize> {
            let (_, synonyms) = HEADER_RULES.iter().find(|(c, _)| *c == column)?;
            cells
                .iter()
                .position(|cell| synonyms.iter().any(|syn| cell.contains(*syn)))
        };

        let date = find(Column::Date);
        let description = find(Column::Description);
        let amount = find(Column::Amount);
        let kind = find(Column::Kind);

        match (date, description, amount) {
            (Some(date), Some(description), Some(amount)) => Ok(ColumnMap {
                date,
                description,
                amount,
                kind,
            }),
            _ => {
                let mut missing = Vec::new();
                if date.is_none() {
                    missing.push("date".to_string());
                }
                if description.is_none() {
                    missing.push("description".to_string());
                }
                if amount.is_none() {
                    missing.push("amount".to_string());
                }
                Err(IngestError::MissingColumns(missing))
            }
        }
    }

    /// Highest index this map will read from a row; shorter rows are dropped.
    fn max_index(&self) -> usize {
        self.date
            .max(self.description)
            .max(self.amount)
            .max(self.kind.unwrap_or(0))
    }
}

/// Ingest a raw bank-statement export with default options.
pub fn ingest(raw: &str) -> Result<Vec<BankRecord>, IngestError> {
    ingest_with(raw, &IngestOptions::default())
}

/// Ingest a raw bank-statement export into normalized records.
///
/// Best-effort per row: a row with an unparsable amount or date, or too few
/// columns, is dropped and the rest of the file still imports. The only
/// fatal condition is a header in which the date, description or amount
/// column cannot be located at all.
pub fn ingest_with(raw: &str, opts: &IngestOptions) -> Result<Vec<BankRecord>, IngestError> {
    // Trim every line up front and drop blanks so the header is the first
    // surviving line and quoting never spans rows.
    let text = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    let Some(header_line) = text.lines().next() else {
        return Ok(Vec::new());
    };

    let delimiter = opts
        .delimiter
        .as_deref()
        .and_then(|d| d.as_bytes().first().copied())
        .unwrap_or_else(|| detect_delimiter(header_line));

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut records = reader.records();
    let header = match records.next() {
        Some(record) => record?,
        None => return Ok(Vec::new()),
    };
    let columns = ColumnMap::resolve(&header)?;
    let max_index = columns.max_index();

    let mut out = Vec::new();
    for (row, record) in records.enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(err) => {
                debug!(row, %err, "dropping unreadable row");
                continue;
            }
        };
        if record.len() <= max_index {
            debug!(row, cells = record.len(), "dropping short row");
            continue;
        }

        let amount_cell = record.get(columns.amount).unwrap_or_default();
        let Ok(signed) = Decimal::from_str(&amount_cell.replace(',', ".")) else {
            debug!(row, cell = amount_cell, "dropping row with unparsable amount");
            continue;
        };

        let flow = match columns.kind {
            Some(idx) => {
                let cell = record.get(idx).unwrap_or_default().to_lowercase();
                if opts.credit_markers.iter().any(|m| cell.contains(m.as_str())) {
                    Flow::Credit
                } else {
                    Flow::Debit
                }
            }
            None if signed > Decimal::ZERO => Flow::Credit,
            None => Flow::Debit,
        };

        let date_cell = record.get(columns.date).unwrap_or_default();
        let Some(date) =
            date::normalize_with(date_cell, opts.date_patterns.iter().map(String::as_str))
        else {
            debug!(row, cell = date_cell, "dropping row with unparsable date");
            continue;
        };

        let description = record
            .get(columns.description)
            .unwrap_or_default()
            .trim_matches('"')
            .to_string();

        out.push(BankRecord {
            date,
            description,
            amount: signed.abs(),
            flow,
        });
    }

    debug!(records = out.len(), "statement ingested");
    Ok(out)
}

/// Header-line delimiter sniffing: semicolon beats tab beats comma.
fn detect_delimiter(header_line: &str) -> u8 {
    if header_line.contains(';') {
        b';'
    } else if header_line.contains('\t') {
        b'\t'
    } else {
        b','
    }
}
