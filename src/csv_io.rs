//! Delimited-text import and export of readings.
//!
//! The import schema is `timestamp, machine_id, energy_kwh, is_operational`
//! with an optional `maintenance_flag`; flags accept `0/1`, `true/false`.
//! Export writes the same columns plus `anomaly` (`1` / `-1`).

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::{parse_timestamp, LabeledTable, Reading};

const REQUIRED_COLUMNS: [&str; 4] = ["timestamp", "machine_id", "energy_kwh", "is_operational"];
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ---

#[derive(Debug, Deserialize)]
struct CsvReading {
    timestamp: String,
    machine_id: String,
    energy_kwh: f64,
    is_operational: String,
    #[serde(default)]
    maintenance_flag: Option<String>,
}

#[derive(Debug, Serialize)]
struct CsvLabeledRow<'a> {
    timestamp: String,
    machine_id: &'a str,
    energy_kwh: f64,
    is_operational: u8,
    maintenance_flag: Option<u8>,
    anomaly: i8,
}

/// Outcome of an import: parsed readings plus the number of rejected rows.
#[derive(Debug)]
pub struct ParsedReadings {
    pub readings: Vec<Reading>,
    pub skipped: usize,
}

/// Parse CSV text into readings, skipping rows that do not parse.
///
/// Fails only when the header lacks a required column.
pub fn parse_readings(body: &str) -> Result<ParsedReadings> {
    // ---
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let headers = reader.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(anyhow!("CSV header is missing required column '{}'", column));
        }
    }

    let mut readings = Vec::new();
    let mut skipped = 0;
    for (line, record) in reader.deserialize::<CsvReading>().enumerate() {
        match record.map_err(anyhow::Error::from).and_then(to_reading) {
            Ok(reading) => readings.push(reading),
            Err(e) => {
                tracing::debug!("Skipping CSV row {}: {}", line + 1, e);
                skipped += 1;
            }
        }
    }

    tracing::info!("Parsed {} readings from CSV ({} skipped)", readings.len(), skipped);
    Ok(ParsedReadings { readings, skipped })
}

fn to_reading(row: CsvReading) -> Result<Reading> {
    // ---
    let timestamp = parse_timestamp(&row.timestamp)
        .map_err(|e| anyhow!("bad timestamp '{}': {}", row.timestamp, e))?;
    let is_operational = parse_flag(&row.is_operational)
        .ok_or_else(|| anyhow!("bad is_operational '{}'", row.is_operational))?;
    let maintenance_flag = match row.maintenance_flag.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(parse_flag(raw).ok_or_else(|| anyhow!("bad maintenance_flag '{}'", raw))?),
    };
    if row.machine_id.is_empty() {
        return Err(anyhow!("empty machine_id"));
    }
    if !row.energy_kwh.is_finite() {
        return Err(anyhow!("non-finite energy_kwh '{}'", row.energy_kwh));
    }

    Ok(Reading {
        timestamp,
        machine_id: row.machine_id,
        energy_kwh: row.energy_kwh,
        is_operational,
        maintenance_flag,
    })
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "1.0" | "true" | "yes" => Some(true),
        "0" | "0.0" | "false" | "no" => Some(false),
        _ => None,
    }
}

/// Render a labeled view as CSV text.
pub fn write_labeled(table: &LabeledTable) -> Result<String> {
    // ---
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in table.rows() {
        let r = &row.reading;
        writer.serialize(CsvLabeledRow {
            timestamp: r.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            machine_id: &r.machine_id,
            energy_kwh: r.energy_kwh,
            is_operational: u8::from(r.is_operational),
            maintenance_flag: r.maintenance_flag.map(u8::from),
            anomaly: row.anomaly.as_i8(),
        })?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow!("Failed to flush CSV: {}", e.error()))?;
    Ok(String::from_utf8(bytes)?)
}
