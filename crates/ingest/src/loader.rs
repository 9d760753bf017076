use crate::error::IngestError;
use crate::timestamp::parse_timestamp;
use core_types::{BridgeEvent, Direction};
use csv::{ReaderBuilder, StringRecord};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

/// Columns every ledger must carry, in their case-folded form.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "block_timestamp",
    "amount_usd",
    "direction",
    "source_chain",
    "symbol",
    "source_address",
];

/// Positions of the required columns inside a record.
struct ColumnIndex {
    timestamp: usize,
    amount_usd: usize,
    direction: usize,
    source_chain: usize,
    symbol: usize,
    source_address: usize,
}

impl ColumnIndex {
    /// Case-folds the header row and resolves every required column, reporting all
    /// missing ones at once.
    fn resolve(headers: &StringRecord) -> Result<Self, IngestError> {
        let mut positions: HashMap<String, usize> = HashMap::new();
        for (idx, header) in headers.iter().enumerate() {
            // First occurrence wins if two headers fold to the same name.
            positions.entry(header.trim().to_lowercase()).or_insert(idx);
        }

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|column| !positions.contains_key(**column))
            .map(|column| column.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(IngestError::Schema { missing });
        }

        let at = |column: &str| positions[column];
        Ok(Self {
            timestamp: at("block_timestamp"),
            amount_usd: at("amount_usd"),
            direction: at("direction"),
            source_chain: at("source_chain"),
            symbol: at("symbol"),
            source_address: at("source_address"),
        })
    }
}

/// Opens a CSV file and loads every row as a `BridgeEvent`.
pub fn load_events_from_path(path: impl AsRef<Path>) -> Result<Vec<BridgeEvent>, IngestError> {
    let path = path.as_ref();
    tracing::info!(path = %path.display(), "Loading bridge ledger.");
    let file = File::open(path)?;
    load_events(file)
}

/// Loads every row of a CSV ledger. The first malformed row aborts the load.
pub fn load_events<R: Read>(reader: R) -> Result<Vec<BridgeEvent>, IngestError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns = ColumnIndex::resolve(rdr.headers()?)?;

    let mut events = Vec::new();
    let mut empty_amounts = 0usize;
    for (idx, result) in rdr.records().enumerate() {
        let record = result?;
        // Header is line 1.
        let line = record
            .position()
            .map(|p| p.line())
            .unwrap_or(idx as u64 + 2);

        let (event, amount_was_empty) = parse_record(&record, &columns, line)?;
        if amount_was_empty {
            empty_amounts += 1;
        }
        events.push(event);
    }

    if empty_amounts > 0 {
        tracing::debug!(rows = empty_amounts, "Empty amount_usd cells counted as zero.");
    }
    tracing::info!(events = events.len(), "Bridge ledger loaded.");

    Ok(events)
}

fn parse_record(
    record: &StringRecord,
    columns: &ColumnIndex,
    line: u64,
) -> Result<(BridgeEvent, bool), IngestError> {
    let cell = |idx: usize| record.get(idx).unwrap_or("");
    let malformed = |column: &str, value: &str| IngestError::MalformedField {
        line,
        column: column.to_string(),
        value: value.to_string(),
    };

    let raw_timestamp = cell(columns.timestamp);
    let timestamp =
        parse_timestamp(raw_timestamp).ok_or_else(|| IngestError::MalformedTimestamp {
            line,
            value: raw_timestamp.to_string(),
        })?;

    let raw_amount = cell(columns.amount_usd);
    let amount_was_empty = raw_amount.is_empty();
    let amount_usd = if amount_was_empty {
        Decimal::ZERO
    } else {
        parse_amount(raw_amount).ok_or_else(|| malformed("amount_usd", raw_amount))?
    };

    let raw_direction = cell(columns.direction);
    let direction =
        Direction::from_str(raw_direction).map_err(|_| malformed("direction", raw_direction))?;

    let event = BridgeEvent::new(
        timestamp,
        cell(columns.source_address),
        cell(columns.source_chain),
        direction,
        cell(columns.symbol),
        amount_usd,
    )
    .map_err(|_| malformed("amount_usd", raw_amount))?;

    Ok((event, amount_was_empty))
}

/// Accepts plain and scientific notation (`1.5e3`), which spreadsheet exports emit.
fn parse_amount(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}
