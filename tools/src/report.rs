//! Plain-text and JSON rendering of analysis reports.

use civicledger_core::{AnalysisKind, CrossReport, Finding, LicenseReport};
use serde::Serialize;
use std::fmt::Write;

/// Combined export shape for `--json`.
#[derive(Serialize)]
pub struct JsonExport<'a> {
    pub licenses: &'a LicenseReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cross_dataset: Option<&'a CrossReport>,
}

fn kind_label(kind: AnalysisKind) -> &'static str {
    match kind {
        AnalysisKind::AddressDensity => "ADDRESS DENSITY",
        AnalysisKind::NameSimilarity => "SIMILAR BUSINESS NAMES",
        AnalysisKind::MultipleDbas => "MULTIPLE DBAS PER BUSINESS",
        AnalysisKind::SharedDba => "SHARED DBA NAMES",
        AnalysisKind::TemporalCluster => "TEMPORAL CLUSTERING",
        AnalysisKind::GeographicConcentration => "GEOGRAPHIC CONCENTRATION",
        AnalysisKind::AddressOverlap => "LICENSE / TAX ADDRESS OVERLAP",
        AnalysisKind::EntityMatch => "CROSS-DATASET ENTITY MATCHES",
        AnalysisKind::ContractTiming => "CONTRACT TIMING PATTERNS",
        AnalysisKind::ProcurementSkew => "NON-COMPETITIVE PROCUREMENT",
        AnalysisKind::AgencyConcentration => "AGENCY SUPPLIER CONCENTRATION",
        AnalysisKind::DelinquencyOverlap => "TAX DELINQUENCY OVERLAP",
    }
}

fn render_finding(out: &mut String, index: usize, finding: &Finding) {
    let _ = writeln!(
        out,
        "  {}. {}  (metric {:.2}, risk {:.2})",
        index + 1,
        finding.subject,
        finding.metric,
        finding.risk_score
    );
    let _ = writeln!(out, "     {}", finding.why_it_matters);
    let _ = writeln!(out, "     supporting records: {}", finding.supporting_records.len());
    for step in &finding.suggested_validation_steps {
        let _ = writeln!(out, "     - {}", step);
    }
}

fn render_section(out: &mut String, kind: AnalysisKind, findings: &[Finding], limit: usize) {
    let _ = writeln!(out, "--- {} ---", kind_label(kind));
    if findings.is_empty() {
        let _ = writeln!(out, "  (no findings)");
    } else {
        for (index, finding) in findings.iter().take(limit).enumerate() {
            render_finding(out, index, finding);
        }
        if findings.len() > limit {
            let _ = writeln!(out, "  ... and {} more", findings.len() - limit);
        }
    }
    let _ = writeln!(out);
}

/// Render the single-dataset license report.
pub fn render_license_report(report: &LicenseReport, limit: usize) -> String {
    let mut out = String::new();
    let s = &report.summary;

    let _ = writeln!(out, "=== BUSINESS LICENSE PATTERN REPORT ===");
    let _ = writeln!(out, "  licenses:          {}", s.total_licenses);
    let _ = writeln!(out, "  unique businesses: {}", s.unique_businesses);
    let _ = writeln!(out, "  unique addresses:  {}", s.unique_addresses);
    if s.undated_excluded > 0 {
        let _ = writeln!(
            out,
            "  undated (excluded from timing): {}",
            s.undated_excluded
        );
    }
    if let (Some(earliest), Some(latest)) = (s.earliest_issue, s.latest_issue) {
        let _ = writeln!(out, "  issue dates:       {} .. {}", earliest, latest);
    }
    let _ = writeln!(out, "  findings:          {}", s.findings_total);
    let _ = writeln!(out);

    render_section(&mut out, AnalysisKind::AddressDensity, &report.address_density, limit);
    render_section(&mut out, AnalysisKind::NameSimilarity, &report.name_similarity, limit);
    let (multi, shared): (Vec<_>, Vec<_>) = report
        .dba_patterns
        .iter()
        .cloned()
        .partition(|f| f.analysis == AnalysisKind::MultipleDbas);
    render_section(&mut out, AnalysisKind::MultipleDbas, &multi, limit);
    render_section(&mut out, AnalysisKind::SharedDba, &shared, limit);
    render_section(&mut out, AnalysisKind::TemporalCluster, &report.temporal_clusters, limit);
    render_section(
        &mut out,
        AnalysisKind::GeographicConcentration,
        &report.geographic_concentration,
        limit,
    );

    out
}

/// Render the cross-dataset report appended after the license report.
pub fn render_cross_report(report: &CrossReport, limit: usize) -> String {
    let mut out = String::new();
    let s = &report.summary;

    let _ = writeln!(out, "=== CROSS-DATASET CORRELATION REPORT ===");
    let _ = writeln!(out, "  licenses:        {}", s.license_count);
    let _ = writeln!(
        out,
        "  contracts:       {} (${:.2} total)",
        s.contract_count, s.contract_total_value
    );
    let _ = writeln!(
        out,
        "  tax records:     {} (${:.2} due)",
        s.tax_record_count, s.tax_total_due
    );
    let _ = writeln!(out, "  shared addresses:          {}", s.shared_addresses);
    let _ = writeln!(out, "  non-competitive contracts: {}", s.non_competitive_contracts);
    let _ = writeln!(out, "  findings:        {}", s.findings_total);
    let _ = writeln!(out);

    render_section(&mut out, AnalysisKind::AddressOverlap, &report.address_overlap, limit);
    render_section(&mut out, AnalysisKind::EntityMatch, &report.entity_matches, limit);
    render_section(&mut out, AnalysisKind::ContractTiming, &report.contract_timing, limit);
    render_section(&mut out, AnalysisKind::ProcurementSkew, &report.procurement_skew, limit);
    render_section(
        &mut out,
        AnalysisKind::AgencyConcentration,
        &report.agency_concentration,
        limit,
    );
    render_section(
        &mut out,
        AnalysisKind::DelinquencyOverlap,
        &report.delinquency_overlap,
        limit,
    );

    out
}
