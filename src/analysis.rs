//! One-call analysis of a machine/date slice: labels, metrics, comparison and
//! alert.
//!
//! This is where the table scope handed to a detector is decided. Statistics
//! computed over the whole signal and over a filtered view differ, so callers
//! pick a [`DetectionScope`] explicitly.

use serde::{Deserialize, Serialize};

use crate::alert::{Alert, AlertThresholds};
use crate::compare::{compare, ComparisonRow};
use crate::detectors::{detect_with, DetectorSettings, Method};
use crate::error::Result;
use crate::metrics::MetricsSnapshot;
use crate::models::{LabeledTable, SignalTable, ViewFilter};

/// Which rows a detector sees when labeling a view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionScope {
    /// Detect over the filtered view only (chronological order).
    #[default]
    FilteredView,
    /// Detect over the entire table in stored order, then keep the view's rows.
    WholeSignal,
}

/// Label the rows selected by `filter`.
pub fn label_view(
    table: &SignalTable,
    filter: &ViewFilter,
    method: Method,
    scope: DetectionScope,
    settings: &DetectorSettings,
) -> Result<LabeledTable> {
    // ---
    match scope {
        DetectionScope::FilteredView => {
            let view = table.view(filter);
            detect_with(view.readings(), method, settings)
        }
        DetectionScope::WholeSignal => {
            let labeled = detect_with(table.readings(), method, settings)?;
            Ok(labeled.restrict(filter))
        }
    }
}

/// Everything the dashboard shows for one slice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub filter: ViewFilter,
    pub method: Method,
    pub scope: DetectionScope,
    pub metrics: MetricsSnapshot,
    pub alert: Alert,
    pub comparison: Vec<ComparisonRow>,
    #[serde(skip)]
    pub labeled: LabeledTable,
}

/// Label the slice with `method`, derive its metrics and alert, and compare
/// all detectors on the filtered view.
pub fn analyze(
    table: &SignalTable,
    filter: &ViewFilter,
    method: Method,
    scope: DetectionScope,
    settings: &DetectorSettings,
    thresholds: &AlertThresholds,
) -> Result<Analysis> {
    // ---
    let labeled = label_view(table, filter, method, scope, settings)?;
    let metrics = MetricsSnapshot::compute(&labeled);
    let alert = Alert::evaluate(&metrics, thresholds);
    let comparison = compare(&table.view(filter), settings);

    tracing::info!(
        "analysis {} [{}..{}] {} ({:?}): {} readings, {} anomalies, alert={:?}",
        filter.machine_id,
        filter.start_date,
        filter.end_date,
        method,
        scope,
        metrics.total_readings,
        metrics.anomaly_count,
        alert
    );

    Ok(Analysis {
        filter: filter.clone(),
        method,
        scope,
        metrics,
        alert,
        comparison,
        labeled,
    })
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::models::Reading;
    use chrono::{Duration, NaiveDate, TimeZone, Utc};

    fn two_machine_table() -> SignalTable {
        // ---
        // A1 sits around 5 kWh, B2 around 50 kWh
        let start = Utc.with_ymd_and_hms(2025, 8, 1, 0, 0, 0).unwrap();
        let mut readings = Vec::new();
        for i in 0..48 {
            let ts = start + Duration::hours(i);
            readings.push(Reading::new(ts, "A1", 5.0 + (i % 3) as f64 * 0.1, i % 2 == 0));
            readings.push(Reading::new(ts, "B2", 50.0 + (i % 3) as f64 * 0.1, true));
        }
        SignalTable::new(readings)
    }

    fn a1_filter() -> ViewFilter {
        let day = NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();
        ViewFilter::new("A1", day, day + Duration::days(1))
    }

    #[test]
    fn test_scopes_differ_on_multi_machine_table() {
        // ---
        let table = two_machine_table();
        let settings = DetectorSettings::default();

        let local = label_view(&table, &a1_filter(), Method::ZScore, DetectionScope::FilteredView, &settings)
            .unwrap();
        let global = label_view(&table, &a1_filter(), Method::ZScore, DetectionScope::WholeSignal, &settings)
            .unwrap();

        assert_eq!(local.len(), 48);
        assert_eq!(global.len(), 48);
        assert!(global.rows().iter().all(|r| r.reading.machine_id == "A1"));
        // Whole-signal stats span both machines, so A1 never leaves 3 sigma
        assert_eq!(global.anomaly_count(), 0);
    }

    #[test]
    fn test_analyze_assembles_all_parts() {
        // ---
        let table = two_machine_table();
        let analysis = analyze(
            &table,
            &a1_filter(),
            Method::RollingMedian,
            DetectionScope::default(),
            &DetectorSettings::default(),
            &AlertThresholds::default(),
        )
        .unwrap();

        assert_eq!(analysis.metrics.total_readings, 48);
        assert_eq!(analysis.comparison.len(), 3);
        assert_eq!(analysis.labeled.len(), 48);
        assert_eq!(analysis.scope, DetectionScope::FilteredView);
        assert_eq!(analysis.metrics.anomaly_count, 0);
        // Half of A1's readings are idle, well over 50 kWh in two days
        assert_eq!(analysis.alert, Alert::IdleLossWarning);
    }

    #[test]
    fn test_unknown_machine_gives_empty_analysis() {
        // ---
        let day = NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();
        let analysis = analyze(
            &two_machine_table(),
            &ViewFilter::new("Z9", day, day),
            Method::IsolationForest,
            DetectionScope::WholeSignal,
            &DetectorSettings::default(),
            &AlertThresholds::default(),
        )
        .unwrap();

        assert_eq!(analysis.metrics.total_readings, 0);
        assert_eq!(analysis.metrics.anomaly_rate, 0.0);
        assert_eq!(analysis.alert, Alert::Normal);
    }
}
