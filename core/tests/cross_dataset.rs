//! Integration tests for the cross-dataset correlator: address
//! overlap, entity matching, contract timing, procurement skew, agency
//! concentration and delinquency overlap.

use chrono::NaiveDate;
use civicledger_core::{
    AnalysisConfig, AnalysisKind, ContractRecord, ContractTable, CrossDatasetEngine, Dataset,
    LicenseRecord, LicenseTable, TaxDelinquencyRecord, TaxTable,
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

fn contract(agency: &str, number: &str, supplier: &str, value: f64, kind: &str) -> ContractRecord {
    ContractRecord {
        agency: agency.into(),
        contract_number: number.into(),
        value,
        supplier: supplier.into(),
        procurement_type: kind.into(),
        description: None,
        solicitation_type: None,
        effective_from: None,
        effective_to: None,
    }
}

fn tax(code: &str, owner: &str, address: &str, due: f64, years: f64) -> TaxDelinquencyRecord {
    TaxDelinquencyRecord {
        property_code: code.into(),
        owner_name_1: owner.into(),
        owner_name_2: None,
        address: address.into(),
        total_due: due,
        years_delinquent: years,
        geo: None,
    }
}

fn day(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

fn engine() -> CrossDatasetEngine {
    CrossDatasetEngine::new(AnalysisConfig::default()).unwrap()
}

fn run(
    licenses: Vec<LicenseRecord>,
    contracts: Vec<ContractRecord>,
    taxes: Vec<TaxDelinquencyRecord>,
) -> civicledger_core::CrossReport {
    let licenses = LicenseTable::new(licenses).unwrap();
    let contracts = ContractTable::new(contracts);
    let taxes = TaxTable::new(taxes);
    engine().run_all(&licenses, &contracts, &taxes)
}

/// A license and a delinquent property at the same normalized address
/// produce one overlap finding referencing rows on both sides.
#[test]
fn shared_address_links_license_to_tax_record() {
    let report = run(
        vec![
            license("L-1", "Market Deli", "555 Market Street"),
            license("L-2", "Far Away Shop", "9 Remote Road"),
        ],
        vec![],
        vec![
            tax("P-100", "Jordan Property Group", "555 MARKET ST", 2_000.0, 1.0),
            tax("P-200", "Elsewhere Estates", "77 Other Place", 9_000.0, 5.0),
        ],
    );

    assert_eq!(report.address_overlap.len(), 1);
    let finding = &report.address_overlap[0];
    assert_eq!(finding.subject, "555 MARKET ST");
    assert_eq!(finding.metric, 2.0);
    let datasets: Vec<Dataset> = finding
        .supporting_records
        .iter()
        .map(|r| r.dataset)
        .collect();
    assert!(datasets.contains(&Dataset::Licenses));
    assert!(datasets.contains(&Dataset::Taxes));
    assert!(finding.why_it_matters.contains("$2000.00"));
    assert_eq!(report.summary.shared_addresses, 1);
}

/// A license holder whose name matches a contract supplier is reported
/// with both sides' rows attached.
#[test]
fn license_holder_matching_supplier_flagged() {
    let report = run(
        vec![license("L-1", "Granite Construction LLC", "1 Quarry Rd")],
        vec![
            contract("Public Works", "C-501", "Granite Construction Inc", 80_000.0, "Competitive Bid"),
            contract("Public Works", "C-502", "Granite Construction Inc", 40_000.0, "Competitive Bid"),
        ],
        vec![],
    );

    assert_eq!(report.entity_matches.len(), 1);
    let finding = &report.entity_matches[0];
    assert_eq!(finding.analysis, AnalysisKind::EntityMatch);
    assert_eq!(finding.subject, "GRANITE CONSTRUCTION ~ GRANITE CONSTRUCTION");
    assert_eq!(finding.metric, 1.0);
    assert_eq!(finding.supporting_records.len(), 3);
    assert!(finding.why_it_matters.contains("$120000.00"));
}

/// A license holder matching a delinquent owner through either owner
/// field is reported with the arrears attached.
#[test]
fn license_holder_matching_tax_owner_flagged() {
    let mut record = tax("P-300", "Unrelated Owner", "5 Hill St", 4_000.0, 2.0);
    record.owner_name_2 = Some("Lakeshore Properties LLC".into());
    let report = run(
        vec![license("L-1", "Lakeshore Properties", "10 Shore Dr")],
        vec![],
        vec![record],
    );

    assert_eq!(report.entity_matches.len(), 1);
    let finding = &report.entity_matches[0];
    assert!(finding.subject.contains("LAKESHORE PROPERTIES"));
    assert!(finding.why_it_matters.contains("$4000.00"));
}

/// Three contracts effective on one day form a same-day batch finding.
#[test]
fn same_day_award_batch_flagged() {
    let mut contracts = vec![
        contract("Parks", "C-1", "Vendor Alpha", 10_000.0, "Competitive Bid"),
        contract("Parks", "C-2", "Vendor Beta", 12_000.0, "Competitive Bid"),
        contract("Streets", "C-3", "Vendor Gamma", 14_000.0, "Competitive Bid"),
        contract("Streets", "C-4", "Vendor Delta", 16_000.0, "Competitive Bid"),
    ];
    for c in contracts.iter_mut().take(3) {
        c.effective_from = day("2024-06-01");
    }
    contracts[3].effective_from = day("2024-09-15");

    let report = run(vec![], contracts, vec![]);
    let batches: Vec<_> = report
        .contract_timing
        .iter()
        .filter(|f| f.subject.starts_with("same-day awards"))
        .collect();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].subject, "same-day awards 2024-06-01");
    assert_eq!(batches[0].metric, 3.0);
    assert_eq!(batches[0].supporting_records.len(), 3);
}

/// A ten-day contract falls under the default short-duration cutoff.
#[test]
fn short_duration_contract_flagged() {
    let mut short = contract("Water", "C-9", "Quickfix Services", 24_000.0, "Competitive Bid");
    short.effective_from = day("2024-01-01");
    short.effective_to = day("2024-01-11");
    let mut long = contract("Water", "C-10", "Steady Services", 24_000.0, "Competitive Bid");
    long.effective_from = day("2024-01-01");
    long.effective_to = day("2025-01-01");

    let report = run(vec![], vec![short, long], vec![]);
    let shorts: Vec<_> = report
        .contract_timing
        .iter()
        .filter(|f| f.subject.starts_with("short contract"))
        .collect();
    assert_eq!(shorts.len(), 1);
    assert_eq!(shorts[0].subject, "short contract C-9");
    assert_eq!(shorts[0].metric, 10.0);
}

/// A contract starting days after a matching license was issued is
/// reported as an award-near-license lead.
#[test]
fn award_soon_after_license_issue_flagged() {
    let mut holder = license("L-1", "Oakdale Paving", "3 Gravel Way");
    holder.issue_date = day("2024-05-01");
    let mut award = contract("Streets", "C-77", "Oakdale Paving", 55_000.0, "Competitive Bid");
    award.effective_from = day("2024-05-03");

    let report = run(vec![holder], vec![award], vec![]);
    let near: Vec<_> = report
        .contract_timing
        .iter()
        .filter(|f| f.subject.starts_with("award near license"))
        .collect();
    assert_eq!(near.len(), 1);
    assert_eq!(near[0].metric, 2.0, "Gap should be two days");
    assert!(!near[0].why_it_matters.contains("same day"));
}

/// A supplier collecting several non-competitive awards is flagged,
/// regardless of procurement-type casing.
#[test]
fn repeat_non_competitive_awards_flagged() {
    let report = run(
        vec![],
        vec![
            contract("Facilities", "C-20", "Keystone Services", 30_000.0, "Sole Source"),
            contract("Facilities", "C-21", "Keystone Services", 45_000.0, "sole source"),
            contract("Facilities", "C-22", "Keystone Services", 15_000.0, "Emergency"),
            contract("Facilities", "C-23", "Open Bid Vendor", 90_000.0, "Competitive Bid"),
            contract("Facilities", "C-24", "One Off Vendor", 5_000.0, "Small Purchase"),
        ],
        vec![],
    );

    assert_eq!(report.procurement_skew.len(), 1);
    let finding = &report.procurement_skew[0];
    assert_eq!(finding.subject, "KEYSTONE SERVICES");
    assert_eq!(finding.metric, 3.0);
    assert_eq!(report.summary.non_competitive_contracts, 4);
}

/// An agency whose top suppliers control most of its contract value is
/// flagged; a supplier spanning three agencies is flagged separately.
#[test]
fn agency_concentration_both_directions() {
    let report = run(
        vec![],
        vec![
            contract("Public Works", "C-30", "Dominant Vendor", 500_000.0, "Competitive Bid"),
            contract("Public Works", "C-31", "Minor Vendor A", 10_000.0, "Competitive Bid"),
            contract("Public Works", "C-32", "Minor Vendor B", 10_000.0, "Competitive Bid"),
            contract("Public Works", "C-33", "Minor Vendor C", 10_000.0, "Competitive Bid"),
            contract("Public Works", "C-34", "Minor Vendor D", 10_000.0, "Competitive Bid"),
            contract("Parks", "C-35", "Citywide Maintenance", 20_000.0, "Competitive Bid"),
            contract("Streets", "C-36", "Citywide Maintenance", 20_000.0, "Competitive Bid"),
            contract("Water", "C-37", "Citywide Maintenance", 20_000.0, "Competitive Bid"),
        ],
        vec![],
    );

    let shares: Vec<_> = report
        .agency_concentration
        .iter()
        .filter(|f| f.subject == "Public Works")
        .collect();
    assert_eq!(shares.len(), 1, "Top-heavy agency should be flagged");
    assert!(shares[0].metric > 0.5 && shares[0].metric <= 1.0);
    assert!(shares[0].why_it_matters.contains("DOMINANT VENDOR"));

    let multi: Vec<_> = report
        .agency_concentration
        .iter()
        .filter(|f| f.subject.starts_with("multi-agency supplier"))
        .collect();
    assert_eq!(multi.len(), 1);
    assert_eq!(multi[0].subject, "multi-agency supplier CITYWIDE MAINTENANCE");
    assert_eq!(multi[0].metric, 3.0);
}

/// Severe arrears only become a finding when the owner links to a
/// license holder or supplier; unlinked or mild arrears stay out.
#[test]
fn delinquency_requires_severity_and_a_link() {
    let report = run(
        vec![license("L-1", "Lakeshore Properties LLC", "10 Shore Dr")],
        vec![],
        vec![
            // Severe and linked: flagged.
            tax("P-1", "Lakeshore Properties", "11 Shore Dr", 12_000.0, 4.0),
            // Severe but unlinked: not flagged.
            tax("P-2", "Anonymous Holdings", "12 Back St", 40_000.0, 8.0),
            // Linked but mild: not flagged.
            tax("P-3", "Lakeshore Properties", "13 Shore Dr", 1_000.0, 1.0),
        ],
    );

    assert_eq!(report.delinquency_overlap.len(), 1);
    let finding = &report.delinquency_overlap[0];
    assert_eq!(finding.subject, "Lakeshore Properties (P-1)");
    assert_eq!(finding.metric, 12_000.0);
    assert!(finding.why_it_matters.contains("holds a business license"));
    assert!(finding
        .supporting_records
        .iter()
        .any(|r| r.dataset == Dataset::Licenses));
}

/// Years alone can clear the severity screen even with little owed.
#[test]
fn long_delinquency_clears_screen_without_large_balance() {
    let report = run(
        vec![license("L-1", "Pine Street Books", "1 Pine St")],
        vec![],
        vec![tax("P-9", "Pine Street Books", "2 Pine St", 800.0, 6.0)],
    );
    assert_eq!(report.delinquency_overlap.len(), 1);
}

/// Summary totals should reflect the input tables.
#[test]
fn cross_summary_reflects_inputs() {
    let report = run(
        vec![license("L-1", "Market Deli", "555 Market Street")],
        vec![
            contract("Parks", "C-1", "Vendor Alpha", 10_000.0, "Sole Source"),
            contract("Parks", "C-2", "Vendor Beta", 15_000.0, "Competitive Bid"),
        ],
        vec![tax("P-1", "Jordan Property Group", "555 Market St", 2_500.0, 1.5)],
    );

    assert_eq!(report.summary.license_count, 1);
    assert_eq!(report.summary.contract_count, 2);
    assert_eq!(report.summary.contract_total_value, 25_000.0);
    assert_eq!(report.summary.tax_record_count, 1);
    assert_eq!(report.summary.tax_total_due, 2_500.0);
    assert_eq!(report.summary.shared_addresses, 1);
    assert_eq!(report.summary.non_competitive_contracts, 1);
    assert_eq!(report.summary.findings_total, report.all_findings().count());
}

/// All cross-analysis scores stay inside [0, 1].
#[test]
fn cross_scores_bounded() {
    let mut holder = license("L-1", "Granite Construction", "1 Quarry Rd");
    holder.issue_date = day("2024-05-01");
    let mut contracts = Vec::new();
    for i in 0..6 {
        let mut c = contract(
            "Public Works",
            &format!("C-{i}"),
            "Granite Construction",
            2_000_000.0,
            "Sole Source",
        );
        c.effective_from = day("2024-05-01");
        c.effective_to = day("2024-05-02");
        contracts.push(c);
    }
    let taxes = vec![tax("P-1", "Granite Construction", "1 Quarry Rd", 500_000.0, 20.0)];

    let report = run(vec![holder], contracts, taxes);
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
