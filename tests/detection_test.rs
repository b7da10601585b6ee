use approx::assert_relative_eq;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

use smartenergy_watch::{
    analyze, compare, detect, detect_with, label_view, Alert, AlertThresholds, CoreError,
    DetectionScope, DetectorSettings, ForecastRequest, Label, Method, MetricsSnapshot, Reading,
    SignalTable, ViewFilter,
};

const MACHINE: &str = "Machine_A1";

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

fn hourly(machine_id: &str, values: &[f64]) -> Vec<Reading> {
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| Reading::new(start() + Duration::hours(i as i64), machine_id, v, true))
        .collect()
}

/// 500 hourly N(5, 1) readings with one spike far above and one far below.
fn scenario() -> Vec<Reading> {
    let mut rng = StdRng::seed_from_u64(42);
    let normal = Normal::new(5.0, 1.0).unwrap();
    let mut values: Vec<f64> = (0..500).map(|_| normal.sample(&mut rng)).collect();
    values[100] = 15.0;
    values[300] = 0.2;
    hourly(MACHINE, &values)
}

fn whole_range(machine_id: &str) -> ViewFilter {
    ViewFilter::new(
        machine_id,
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
    )
}

fn snapshot(anomaly_rate: f64, idle_energy_loss_kwh: f64) -> MetricsSnapshot {
    MetricsSnapshot {
        mean_kwh_per_reading: Some(1.0),
        efficiency_score: 1.0,
        idle_energy_loss_kwh,
        anomaly_count: 0,
        total_readings: 100,
        anomaly_rate,
    }
}

// ---

#[test]
fn injected_extremes_are_flagged() {
    // ---
    let readings = scenario();

    for name in ["isolation_forest", "z_score"] {
        let labeled = detect(&readings, name).unwrap();
        let rows = labeled.rows();
        assert_eq!(rows[100].anomaly, Label::Anomalous, "{} missed the spike", name);
        assert_eq!(rows[300].anomaly, Label::Anomalous, "{} missed the dip", name);
    }

    let isolation = detect(&readings, "isolation_forest").unwrap();
    assert!(
        isolation.anomaly_count() <= 15,
        "contamination 0.03 of 500 rows allows at most 15 anomalies, got {}",
        isolation.anomaly_count()
    );
}

#[test]
fn every_detector_keeps_rows_and_uses_sentinel_labels() {
    // ---
    let readings = scenario();

    for method in Method::ALL {
        let labeled = detect(&readings, method.as_str()).unwrap();
        assert_eq!(labeled.len(), readings.len());
        for (row, reading) in labeled.rows().iter().zip(&readings) {
            assert_eq!(&row.reading, reading);
            assert!(matches!(row.anomaly.as_i8(), 1 | -1));
        }
    }
}

#[test]
fn unknown_method_is_rejected() {
    let err = detect(&scenario(), "local_outlier_factor").unwrap_err();
    assert_eq!(err, CoreError::UnknownMethod("local_outlier_factor".into()));
}

#[test]
fn same_seed_gives_identical_labels() {
    // ---
    let readings = scenario();
    let settings = DetectorSettings::with_seed(7);

    let first = detect_with(&readings, Method::IsolationForest, &settings).unwrap();
    let second = detect_with(&readings, Method::IsolationForest, &settings).unwrap();
    assert_eq!(first, second);
}

#[test]
fn degenerate_inputs_report_zero_rate() {
    // ---
    let flat = hourly(MACHINE, &[4.2; 48]);
    let labeled = detect(&flat, "z_score").unwrap();
    assert_eq!(MetricsSnapshot::compute(&labeled).anomaly_rate, 0.0);

    let short = hourly(MACHINE, &[1.0, 1.0, 1.0, 90.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0]);
    let labeled = detect(&short, "rolling_median").unwrap();
    assert_eq!(labeled.len(), 11);
    assert_eq!(MetricsSnapshot::compute(&labeled).anomaly_rate, 0.0);
}

#[test]
fn empty_view_metrics() {
    // ---
    let table: SignalTable = scenario().into_iter().collect();
    let filter = ViewFilter::new(
        MACHINE,
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
    );

    for method in Method::ALL {
        let labeled = label_view(
            &table,
            &filter,
            method,
            DetectionScope::FilteredView,
            &DetectorSettings::default(),
        )
        .unwrap();
        let metrics = MetricsSnapshot::compute(&labeled);
        assert_eq!(metrics.total_readings, 0);
        assert_eq!(metrics.anomaly_rate, 0.0);
        assert_eq!(metrics.mean_kwh_per_reading, None);
    }
}

#[test]
fn fully_operational_view_is_efficient() {
    // ---
    let labeled = detect(&hourly(MACHINE, &[2.5; 24]), "z_score").unwrap();
    let metrics = MetricsSnapshot::compute(&labeled);

    assert_relative_eq!(metrics.efficiency_score, 1.0, epsilon = 1e-9);
    assert_eq!(metrics.idle_energy_loss_kwh, 0.0);
    assert_relative_eq!(metrics.mean_kwh_per_reading.unwrap(), 2.5);
}

#[test]
fn alert_levels() {
    // ---
    let thresholds = AlertThresholds::default();

    assert_eq!(Alert::evaluate(&snapshot(0.20, 0.0), &thresholds), Alert::HighAnomalyRate);
    assert_eq!(Alert::evaluate(&snapshot(0.01, 60.0), &thresholds), Alert::IdleLossWarning);
    assert_eq!(Alert::evaluate(&snapshot(0.01, 0.0), &thresholds), Alert::Normal);
    // rate check wins when both trip
    assert_eq!(Alert::evaluate(&snapshot(0.5, 500.0), &thresholds), Alert::HighAnomalyRate);
}

#[test]
fn comparison_is_idempotent() {
    // ---
    let table: SignalTable = scenario().into_iter().collect();
    let view = table.view(&whole_range(MACHINE));
    let settings = DetectorSettings::default();

    let first = compare(&view, &settings);
    let second = compare(&view, &settings);

    assert_eq!(first, second);
    let methods: Vec<Method> = first.iter().map(|row| row.method).collect();
    assert_eq!(methods, Method::ALL.to_vec());
    assert!(first.iter().all(|row| row.error.is_none()));
}

#[test]
fn detection_scope_changes_the_statistics() {
    // ---
    // M1 runs near 100 kWh with one excursion to 130; M2 idles near 1 kWh.
    // Pooled with M2 the excursion is unremarkable.
    let mut m1 = vec![100.0; 30];
    m1[15] = 130.0;
    let mut readings = hourly("M1", &m1);
    readings.extend(hourly("M2", &[1.0; 30]));
    let table = SignalTable::new(readings);
    let filter = whole_range("M1");
    let settings = DetectorSettings::default();

    let filtered = label_view(&table, &filter, Method::ZScore, DetectionScope::FilteredView, &settings)
        .unwrap();
    let whole = label_view(&table, &filter, Method::ZScore, DetectionScope::WholeSignal, &settings)
        .unwrap();

    assert_eq!(filtered.len(), 30);
    assert_eq!(whole.len(), 30);
    assert_eq!(filtered.anomaly_count(), 1);
    assert_eq!(filtered.rows()[15].anomaly, Label::Anomalous);
    assert_eq!(whole.anomaly_count(), 0);
}

#[test]
fn analyze_compares_on_the_filtered_view() {
    // ---
    let table: SignalTable = scenario().into_iter().collect();
    let filter = whole_range(MACHINE);

    let analysis = analyze(
        &table,
        &filter,
        Method::ZScore,
        DetectionScope::WholeSignal,
        &DetectorSettings::default(),
        &AlertThresholds::default(),
    )
    .unwrap();

    assert_eq!(analysis.metrics.total_readings, 500);
    assert_eq!(analysis.comparison, compare(&table.view(&filter), &DetectorSettings::default()));
    assert_eq!(analysis.alert, Alert::Normal);
}

#[test]
fn forecast_needs_twenty_readings() {
    // ---
    let table = SignalTable::new(hourly(MACHINE, &[3.0; 19]));
    let view = table.view(&whole_range(MACHINE));
    assert_eq!(
        ForecastRequest::from_view(&view, 30).unwrap_err(),
        CoreError::InsufficientData {
            required: 20,
            actual: 19
        }
    );

    let table = SignalTable::new(hourly(MACHINE, &[3.0; 20]));
    let view = table.view(&whole_range(MACHINE));
    let request = ForecastRequest::from_view(&view, 30).unwrap();
    assert_eq!(request.history.len(), 20);
    assert!(matches!(
        ForecastRequest::from_view(&view, 61),
        Err(CoreError::InvalidHorizon { days: 61, .. })
    ));
}
