//! Integration tests for the single-dataset license passes: address
//! density, name similarity, DBA patterns, temporal clustering and
//! geographic concentration.

use chrono::NaiveDate;
use civicledger_core::{
    AnalysisConfig, AnalysisKind, Dataset, LicenseRecord, LicenseTable, PatternEngine,
};

fn license(id: &str, name: &str, address: &str) -> LicenseRecord {
    LicenseRecord {
        id: id.into(),
        business_name: name.into(),
        dba_name: None,
        address: address.into(),
        city: None,
        state: None,
        zip: None,
        issue_date: None,
        license_type: None,
        owner_name: None,
    }
}

fn dated(id: &str, name: &str, address: &str, date: &str) -> LicenseRecord {
    let mut record = license(id, name, address);
    record.issue_date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok();
    record
}

fn table(rows: Vec<LicenseRecord>) -> LicenseTable {
    LicenseTable::new(rows).unwrap()
}

fn engine() -> PatternEngine {
    PatternEngine::new(AnalysisConfig::default()).unwrap()
}

/// Six licenses at one address, with varied formatting, should produce
/// exactly one address-density finding covering all six rows.
#[test]
fn six_licenses_at_one_address_flagged_once() {
    let rows = vec![
        license("L-1", "Alpha Trading", "100 Main Street"),
        license("L-2", "Beta Logistics", "100 MAIN ST."),
        license("L-3", "Gamma Foods", "100 Main St"),
        license("L-4", "Delta Imports", "100 main street"),
        license("L-5", "Epsilon Goods", "100 Main Street "),
        license("L-6", "Zeta Services", "100 Main St."),
        license("L-7", "Unrelated Shop", "900 Elm Avenue"),
    ];
    let report = engine().run_all(&table(rows));

    assert_eq!(
        report.address_density.len(),
        1,
        "Expected one finding, got {}",
        report.address_density.len()
    );
    let finding = &report.address_density[0];
    assert_eq!(finding.analysis, AnalysisKind::AddressDensity);
    assert_eq!(finding.subject, "100 MAIN ST");
    assert_eq!(finding.metric, 6.0);
    assert_eq!(finding.supporting_records.len(), 6);
    assert!(finding
        .supporting_records
        .iter()
        .all(|r| r.dataset == Dataset::Licenses));
    // Twice the threshold lands at 0.75 on the score curve.
    assert!(
        (finding.risk_score - 0.75).abs() < 1e-9,
        "Unexpected risk score {}",
        finding.risk_score
    );
    assert!(!finding.suggested_validation_steps.is_empty());
}

/// Counts below the configured threshold should never flag.
#[test]
fn address_below_threshold_not_flagged() {
    let rows = vec![
        license("L-1", "Alpha Trading", "100 Main Street"),
        license("L-2", "Beta Logistics", "100 Main Street"),
    ];
    let report = engine().run_all(&table(rows));
    assert!(report.address_density.is_empty());
}

/// Exactly at the threshold should flag at risk 0.5.
#[test]
fn address_at_threshold_scores_half() {
    let rows = vec![
        license("L-1", "Alpha Trading", "100 Main Street"),
        license("L-2", "Beta Logistics", "100 Main Street"),
        license("L-3", "Gamma Foods", "100 Main Street"),
    ];
    let report = engine().run_all(&table(rows));
    assert_eq!(report.address_density.len(), 1);
    assert!(
        (report.address_density[0].risk_score - 0.5).abs() < 1e-9,
        "Threshold count should score 0.5, got {}",
        report.address_density[0].risk_score
    );
}

/// Near-identical names should collapse into one cluster, including a
/// pair linked only through a shared neighbor.
#[test]
fn similar_names_form_one_cluster() {
    let rows = vec![
        license("L-1", "Riverside Cafe", "1 First St"),
        license("L-2", "Riverside Caffe", "2 Second St"),
        license("L-3", "Riverside Kafe", "3 Third St"),
        license("L-4", "Zephyr Imports", "4 Fourth St"),
    ];
    let report = engine().run_all(&table(rows));

    assert_eq!(
        report.name_similarity.len(),
        1,
        "Expected one cluster, got {}",
        report.name_similarity.len()
    );
    let finding = &report.name_similarity[0];
    assert_eq!(finding.subject, "RIVERSIDE CAFE");
    assert_eq!(finding.metric, 3.0);
    assert_eq!(finding.supporting_records.len(), 3);
    assert!((0.0..=1.0).contains(&finding.risk_score));
    assert!(finding.why_it_matters.contains("Riverside Kafe"));
}

/// Corporate-suffix variants of one name share a normalized key and
/// cluster together; an unrelated name stays out.
#[test]
fn suffix_variants_cluster_without_unrelated_names() {
    let rows = vec![
        license("L-1", "Acme Corp", "1 First St"),
        license("L-2", "ACME Corporation", "2 Second St"),
        license("L-3", "Acme Co.", "3 Third St"),
        license("L-4", "Zeta LLC", "4 Fourth St"),
    ];
    let report = engine().run_all(&table(rows));

    assert_eq!(report.name_similarity.len(), 1);
    let finding = &report.name_similarity[0];
    assert_eq!(finding.subject, "ACME");
    assert_eq!(finding.metric, 3.0);
    assert_eq!(finding.supporting_records.len(), 3);
    assert!(
        !finding.supporting_records.iter().any(|r| r.row == 3),
        "Unrelated name must not join the cluster"
    );
}

/// Identical spellings are one variant, never a cluster of themselves.
#[test]
fn repeated_identical_names_not_a_cluster() {
    let rows = vec![
        license("L-1", "Acme Corp", "1 First St"),
        license("L-2", "Acme Corp", "2 Second St"),
        license("L-3", "Acme Corp", "3 Third St"),
    ];
    let report = engine().run_all(&table(rows));
    assert!(report.name_similarity.is_empty());
}

/// One business with several DBAs, and one DBA shared by several
/// businesses, flag in their respective directions.
#[test]
fn dba_patterns_flag_both_directions() {
    let mut a = license("L-1", "Harbor Holdings", "1 Pier Rd");
    a.dba_name = Some("Harbor Cafe".into());
    let mut b = license("L-2", "Harbor Holdings", "2 Pier Rd");
    b.dba_name = Some("Harbor Cleaners".into());
    let mut c = license("L-3", "Alpha Ventures", "3 Dock St");
    c.dba_name = Some("Downtown Deli".into());
    let mut d = license("L-4", "Beta Ventures", "4 Dock St");
    d.dba_name = Some("Downtown Deli".into());

    let report = engine().run_all(&table(vec![a, b, c, d]));

    let multiple: Vec<_> = report
        .dba_patterns
        .iter()
        .filter(|f| f.analysis == AnalysisKind::MultipleDbas)
        .collect();
    let shared: Vec<_> = report
        .dba_patterns
        .iter()
        .filter(|f| f.analysis == AnalysisKind::SharedDba)
        .collect();

    assert_eq!(multiple.len(), 1, "Expected one multi-DBA business");
    assert_eq!(multiple[0].subject, "HARBOR HOLDINGS");
    assert_eq!(multiple[0].metric, 2.0);

    assert_eq!(shared.len(), 1, "Expected one shared DBA");
    assert_eq!(shared[0].subject, "DOWNTOWN DELI");
    assert_eq!(shared[0].metric, 2.0);
}

/// Rows without a DBA never contribute to either direction.
#[test]
fn missing_dbas_are_ignored() {
    let rows = vec![
        license("L-1", "Harbor Holdings", "1 Pier Rd"),
        license("L-2", "Harbor Holdings", "2 Pier Rd"),
    ];
    let report = engine().run_all(&table(rows));
    assert!(report.dba_patterns.is_empty());
}

/// Eight licenses inside five days should merge into a single cluster
/// covering all eight, not a finding per overlapping window.
#[test]
fn issuance_spike_reported_as_one_cluster() {
    let rows = vec![
        dated("L-1", "A One", "1 A St", "2024-03-01"),
        dated("L-2", "B Two", "2 B St", "2024-03-01"),
        dated("L-3", "C Three", "3 C St", "2024-03-02"),
        dated("L-4", "D Four", "4 D St", "2024-03-02"),
        dated("L-5", "E Five", "5 E St", "2024-03-03"),
        dated("L-6", "F Six", "6 F St", "2024-03-04"),
        dated("L-7", "G Seven", "7 G St", "2024-03-05"),
        dated("L-8", "H Eight", "8 H St", "2024-03-05"),
        dated("L-9", "I Nine", "9 I St", "2024-07-20"),
    ];
    let report = engine().run_all(&table(rows));

    assert_eq!(
        report.temporal_clusters.len(),
        1,
        "Overlapping windows must merge into one finding"
    );
    let finding = &report.temporal_clusters[0];
    assert_eq!(finding.metric, 8.0);
    assert_eq!(finding.supporting_records.len(), 8);
    assert_eq!(finding.subject, "2024-03-01..2024-03-05");
}

/// Undated rows are excluded from timing but stay in the table and in
/// the other passes.
#[test]
fn undated_rows_skip_timing_only() {
    let rows = vec![
        license("L-1", "Alpha Trading", "100 Main Street"),
        license("L-2", "Beta Logistics", "100 Main Street"),
        license("L-3", "Gamma Foods", "100 Main Street"),
    ];
    let table = table(rows);
    assert_eq!(table.undated_count(), 3);

    let report = engine().run_all(&table);
    assert!(report.temporal_clusters.is_empty());
    assert_eq!(report.address_density.len(), 1);
    assert_eq!(report.summary.undated_excluded, 3);
}

/// Ten licenses in one zip clears the default threshold; ten in
/// another zip spread more thinly never appears above it.
#[test]
fn zip_concentration_flags_at_threshold() {
    let mut rows = Vec::new();
    for i in 0..10 {
        let mut r = license(
            &format!("L-{i}"),
            &format!("Biz {i}"),
            &format!("{i} Grove Street"),
        );
        r.zip = Some("19019".into());
        rows.push(r);
    }
    for i in 10..15 {
        let mut r = license(
            &format!("L-{i}"),
            &format!("Biz {i}"),
            &format!("{i} Birch Lane"),
        );
        r.zip = Some("19020".into());
        rows.push(r);
    }
    let report = engine().run_all(&table(rows));

    assert_eq!(report.geographic_concentration.len(), 1);
    let finding = &report.geographic_concentration[0];
    assert_eq!(finding.subject, "19019");
    assert_eq!(finding.metric, 10.0);
    assert_eq!(finding.supporting_records.len(), 10);
}

/// Many licenses on few addresses should surface the hub note.
#[test]
fn agent_hub_ratio_called_out() {
    let mut rows = Vec::new();
    for i in 0..12 {
        let mut r = license(
            &format!("L-{i}"),
            &format!("Biz {i}"),
            // 12 licenses across 2 addresses: 6 per address.
            if i % 2 == 0 { "1 Hub Plaza" } else { "2 Hub Plaza" },
        );
        r.zip = Some("19103".into());
        rows.push(r);
    }
    let report = engine().run_all(&table(rows));

    assert_eq!(report.geographic_concentration.len(), 1);
    assert!(
        report.geographic_concentration[0]
            .why_it_matters
            .contains("registered-agent or hub activity"),
        "High per-address ratio should be called out"
    );
}

/// The summary should agree with the tables and the findings lists.
#[test]
fn summary_counts_are_consistent() {
    let rows = vec![
        dated("L-1", "Alpha Trading", "100 Main Street", "2024-01-15"),
        dated("L-2", "Beta Logistics", "100 Main Street", "2024-02-20"),
        dated("L-3", "Gamma Foods", "100 Main Street", "2024-03-25"),
        license("L-4", "Delta Imports", "900 Elm Avenue"),
    ];
    let report = engine().run_all(&table(rows));

    assert_eq!(report.summary.total_licenses, 4);
    assert_eq!(report.summary.unique_businesses, 4);
    assert_eq!(report.summary.unique_addresses, 2);
    assert_eq!(report.summary.undated_excluded, 1);
    assert_eq!(
        report.summary.earliest_issue,
        NaiveDate::from_ymd_opt(2024, 1, 15)
    );
    assert_eq!(
        report.summary.latest_issue,
        NaiveDate::from_ymd_opt(2024, 3, 25)
    );
    assert_eq!(report.summary.findings_total, report.all_findings().count());
}

/// Every score from every pass stays inside [0, 1].
#[test]
fn all_risk_scores_bounded() {
    let mut rows = Vec::new();
    for i in 0..40 {
        let mut r = dated(
            &format!("L-{i}"),
            &format!("Vendor {}", i % 7),
            &format!("{} Market Street", i % 4),
            "2024-05-01",
        );
        r.zip = Some("19106".into());
        r.dba_name = Some(format!("Front {}", i % 3));
        rows.push(r);
    }
    let report = engine().run_all(&table(rows));

    for finding in report.all_findings() {
        assert!(
            (0.0..=1.0).contains(&finding.risk_score),
            "{:?} '{}' scored {} outside [0, 1]",
            finding.analysis,
            finding.subject,
            finding.risk_score
        );
    }
}
