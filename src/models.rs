//! Data models for the energy signal: readings, tables, filtered views and
//! anomaly labels.
//!
//! Tables are value types. Nothing in the core mutates a [`Reading`] once it is
//! in a table; detection produces a new [`LabeledTable`] that pairs each reading
//! with its [`Label`].

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

// ---

/// Per-row anomaly label, encoded as `1` (normal) / `-1` (anomalous) on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum Label {
    Normal,
    Anomalous,
}

impl Label {
    // ---
    /// Remap a raw boolean outlier flag onto the sentinel encoding.
    pub fn from_flag(is_anomaly: bool) -> Self {
        if is_anomaly {
            Label::Anomalous
        } else {
            Label::Normal
        }
    }

    pub fn is_anomalous(self) -> bool {
        self == Label::Anomalous
    }

    pub fn as_i8(self) -> i8 {
        match self {
            Label::Normal => 1,
            Label::Anomalous => -1,
        }
    }
}

impl From<Label> for i8 {
    fn from(label: Label) -> Self {
        label.as_i8()
    }
}

impl TryFrom<i8> for Label {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Label::Normal),
            -1 => Ok(Label::Anomalous),
            other => Err(format!("anomaly label must be 1 or -1, got {other}")),
        }
    }
}

/// One energy reading for one machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Reading {
    // ---
    pub timestamp: DateTime<Utc>,
    pub machine_id: String,
    pub energy_kwh: f64,
    pub is_operational: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintenance_flag: Option<bool>,
}

impl Reading {
    // ---
    pub fn new(
        timestamp: DateTime<Utc>,
        machine_id: impl Into<String>,
        energy_kwh: f64,
        is_operational: bool,
    ) -> Self {
        Self {
            timestamp,
            machine_id: machine_id.into(),
            energy_kwh,
            is_operational,
            maintenance_flag: None,
        }
    }

    pub fn with_maintenance_flag(mut self, flag: bool) -> Self {
        self.maintenance_flag = Some(flag);
        self
    }

    /// Calendar date (UTC) used by date-range filters.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}

/// Parse an ISO-style timestamp.
///
/// Accepts RFC 3339 (`2025-08-01T00:00:00Z`), naive forms with optional
/// fractional seconds (`2025-08-01 00:00:00.5`, `2025-08-01T00:00:00`) and bare
/// dates (`2025-08-01`, midnight). Naive values are read as UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    // ---
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d").map(|d| d.and_time(NaiveTime::MIN)))
        .map(|naive| naive.and_utc())
}

/// Machine and inclusive date range selecting a [`FilteredView`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewFilter {
    pub machine_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl ViewFilter {
    pub fn new(machine_id: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            machine_id: machine_id.into(),
            start_date,
            end_date,
        }
    }

    pub fn matches(&self, reading: &Reading) -> bool {
        let date = reading.date();
        reading.machine_id == self.machine_id && date >= self.start_date && date <= self.end_date
    }
}

/// In-memory collection of readings for one or more machines.
///
/// Row order is whatever the source produced; duplicate timestamps are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignalTable {
    readings: Vec<Reading>,
}

impl SignalTable {
    // ---
    pub fn new(readings: Vec<Reading>) -> Self {
        Self { readings }
    }

    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Distinct machine ids, sorted.
    pub fn machine_ids(&self) -> Vec<String> {
        self.readings
            .iter()
            .map(|r| r.machine_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// First and last reading date for a machine, if it has any readings.
    pub fn date_bounds(&self, machine_id: &str) -> Option<(NaiveDate, NaiveDate)> {
        self.readings
            .iter()
            .filter(|r| r.machine_id == machine_id)
            .map(Reading::date)
            .fold(None, |bounds, date| match bounds {
                None => Some((date, date)),
                Some((lo, hi)) => Some((lo.min(date), hi.max(date))),
            })
    }

    /// Restrict the table to one machine and date range.
    ///
    /// The returned view is sorted chronologically (stable, so duplicate
    /// timestamps keep their table order).
    pub fn view(&self, filter: &ViewFilter) -> FilteredView {
        // ---
        let mut readings: Vec<Reading> = self
            .readings
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        readings.sort_by_key(|r| r.timestamp);

        FilteredView {
            filter: filter.clone(),
            readings,
        }
    }
}

impl FromIterator<Reading> for SignalTable {
    fn from_iter<I: IntoIterator<Item = Reading>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Read-only, machine- and date-restricted slice of a [`SignalTable`].
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredView {
    filter: ViewFilter,
    readings: Vec<Reading>,
}

impl FilteredView {
    pub fn filter(&self) -> &ViewFilter {
        &self.filter
    }

    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}

/// A reading paired with the label a detector assigned to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledReading {
    #[serde(flatten)]
    pub reading: Reading,
    pub anomaly: Label,
}

/// Detector output: the input rows, in input order, each with an `anomaly` label.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabeledTable {
    rows: Vec<LabeledReading>,
}

impl LabeledTable {
    // ---
    /// Pair readings with labels. Both slices must have the same length.
    pub(crate) fn from_labels(readings: &[Reading], labels: Vec<Label>) -> Self {
        debug_assert_eq!(readings.len(), labels.len());
        let rows = readings
            .iter()
            .cloned()
            .zip(labels)
            .map(|(reading, anomaly)| LabeledReading { reading, anomaly })
            .collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[LabeledReading] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = Label> + '_ {
        self.rows.iter().map(|row| row.anomaly)
    }

    pub fn anomalies(&self) -> impl Iterator<Item = &LabeledReading> + '_ {
        self.rows.iter().filter(|row| row.anomaly.is_anomalous())
    }

    pub fn anomaly_count(&self) -> usize {
        self.anomalies().count()
    }

    /// Keep rows matching `filter`, in chronological order.
    pub fn restrict(&self, filter: &ViewFilter) -> LabeledTable {
        // ---
        let mut rows: Vec<LabeledReading> = self
            .rows
            .iter()
            .filter(|row| filter.matches(&row.reading))
            .cloned()
            .collect();
        rows.sort_by_key(|row| row.reading.timestamp);
        Self { rows }
    }
}
