//! Agency concentration — who controls an agency's contract value, and
//! which suppliers span many agencies.
//!
//! The concentration metric is the share of an agency's total contract
//! value held by its top three suppliers; above one half it flags.
//! Suppliers working with three or more agencies are flagged separately.

use crate::config::AnalysisConfig;
use crate::cross::sort_findings;
use crate::finding::{AnalysisKind, Finding};
use crate::score;
use crate::table::ContractTable;
use crate::types::{Dataset, RecordRef};
use std::collections::{BTreeMap, BTreeSet};

const TOP_SHARE_FLAG: f64 = 0.5;
const MULTI_AGENCY_THRESHOLD: usize = 3;

pub fn analyze(contracts: &ContractTable, _config: &AnalysisConfig) -> Vec<Finding> {
    let mut findings = Vec::new();

    // Supplier value share within each agency.
    let mut by_agency: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (row, record) in contracts.records().iter().enumerate() {
        let agency = record.agency.trim();
        if !agency.is_empty() {
            by_agency.entry(agency).or_default().push(row);
        }
    }

    for (agency, rows) in &by_agency {
        let mut value_by_supplier: BTreeMap<&str, f64> = BTreeMap::new();
        for &row in rows {
            let key = contracts.supplier_keys()[row].as_str();
            if !key.is_empty() {
                *value_by_supplier.entry(key).or_default() += contracts.records()[row].value;
            }
        }
        let total: f64 = value_by_supplier.values().sum();
        if total <= 0.0 {
            continue;
        }
        let mut shares: Vec<(&str, f64)> = value_by_supplier.into_iter().collect();
        // Largest value first; name breaks ties deterministically.
        shares.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        let top: Vec<&(&str, f64)> = shares.iter().take(3).collect();
        let top_value: f64 = top.iter().map(|(_, v)| v).sum();
        let share = top_value / total;
        if share <= TOP_SHARE_FLAG {
            continue;
        }

        findings.push(Finding {
            analysis: AnalysisKind::AgencyConcentration,
            subject: (*agency).to_owned(),
            metric: share,
            risk_score: score::scaled(share, TOP_SHARE_FLAG, 1.0),
            why_it_matters: format!(
                "Top {} supplier(s) ({}) control {:.1}% of {agency}'s contract \
                 value (${top_value:.2} of ${total:.2}). Could indicate specialized \
                 requirements, limited competition, or preferential treatment.",
                top.len(),
                top.iter().map(|(name, _)| *name).collect::<Vec<_>>().join(", "),
                share * 100.0,
            ),
            supporting_records: rows
                .iter()
                .map(|&row| RecordRef::new(Dataset::Contracts, row))
                .collect(),
            suggested_validation_steps: vec![
                "Count distinct bidders in the agency's recent solicitations".to_owned(),
                "Check whether the top suppliers share ownership".to_owned(),
            ],
        });
    }

    // Suppliers spanning several agencies.
    let mut agencies_by_supplier: BTreeMap<&str, (BTreeSet<&str>, Vec<usize>)> = BTreeMap::new();
    for (row, record) in contracts.records().iter().enumerate() {
        let key = contracts.supplier_keys()[row].as_str();
        let agency = record.agency.trim();
        if key.is_empty() || agency.is_empty() {
            continue;
        }
        let entry = agencies_by_supplier.entry(key).or_default();
        entry.0.insert(agency);
        entry.1.push(row);
    }

    for (supplier, (agencies, rows)) in &agencies_by_supplier {
        if agencies.len() < MULTI_AGENCY_THRESHOLD {
            continue;
        }
        let count = agencies.len();
        let total_value: f64 = rows.iter().map(|&row| contracts.records()[row].value).sum();
        findings.push(Finding {
            analysis: AnalysisKind::AgencyConcentration,
            subject: format!("multi-agency supplier {supplier}"),
            metric: count as f64,
            risk_score: score::scaled(
                count as f64,
                MULTI_AGENCY_THRESHOLD as f64,
                score::saturation_for(MULTI_AGENCY_THRESHOLD as f64),
            ),
            why_it_matters: format!(
                "Supplier works with {count} different agencies ({}) across {} \
                 contracts worth ${total_value:.2}. Could indicate broad capability \
                 or influence reaching across departments.",
                agencies.iter().copied().collect::<Vec<_>>().join(", "),
                rows.len(),
            ),
            supporting_records: rows
                .iter()
                .map(|&row| RecordRef::new(Dataset::Contracts, row))
                .collect(),
            suggested_validation_steps: vec![
                "Review how each agency selected the supplier".to_owned(),
                "Check campaign contribution records for the supplier's principals"
                    .to_owned(),
            ],
        });
    }

    sort_findings(&mut findings);
    findings
}
