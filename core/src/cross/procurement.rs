//! Procurement skew — concentration of non-competitive awards.
//!
//! Agency Request, Small Purchase, Sole Source and Emergency awards
//! bypass competitive bidding; a supplier collecting several of them
//! is a lead worth a look regardless of any cross-table link.

use crate::config::AnalysisConfig;
use crate::cross::sort_findings;
use crate::finding::{AnalysisKind, Finding};
use crate::score;
use crate::table::ContractTable;
use crate::types::{Dataset, RecordRef};
use std::collections::{BTreeMap, BTreeSet};

const NON_COMPETITIVE_TYPES: &[&str] =
    &["AGENCY REQUEST", "SMALL PURCHASE", "SOLE SOURCE", "EMERGENCY"];

// Two non-competitive awards flag a supplier; value saturates the modifier.
const AWARD_COUNT_THRESHOLD: f64 = 2.0;
const VALUE_SATURATION: f64 = 1_000_000.0;

/// Case-insensitive membership in the non-competitive set.
pub fn is_non_competitive(procurement_type: &str) -> bool {
    let upper = procurement_type.trim().to_uppercase();
    NON_COMPETITIVE_TYPES.contains(&upper.as_str())
}

pub fn analyze(contracts: &ContractTable, _config: &AnalysisConfig) -> Vec<Finding> {
    let mut by_supplier: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (row, record) in contracts.records().iter().enumerate() {
        if !is_non_competitive(&record.procurement_type) {
            continue;
        }
        let key = contracts.supplier_keys()[row].as_str();
        if !key.is_empty() {
            by_supplier.entry(key).or_default().push(row);
        }
    }

    let mut findings = Vec::new();
    for (supplier, rows) in &by_supplier {
        let count = rows.len();
        if (count as f64) < AWARD_COUNT_THRESHOLD {
            continue;
        }
        let total_value: f64 = rows.iter().map(|&row| contracts.records()[row].value).sum();
        let types: BTreeSet<&str> = rows
            .iter()
            .map(|&row| contracts.records()[row].procurement_type.as_str())
            .collect();
        let agencies: BTreeSet<&str> = rows
            .iter()
            .map(|&row| contracts.records()[row].agency.as_str())
            .collect();

        let base = score::scaled(
            count as f64,
            AWARD_COUNT_THRESHOLD,
            score::saturation_for(AWARD_COUNT_THRESHOLD),
        );
        findings.push(Finding {
            analysis: AnalysisKind::ProcurementSkew,
            subject: (*supplier).to_owned(),
            metric: count as f64,
            risk_score: score::blend(base, total_value / VALUE_SATURATION),
            why_it_matters: format!(
                "Supplier received {count} non-competitive awards ({}) totaling \
                 ${total_value:.2} from {} agency(ies). Could indicate specialized \
                 expertise, preferred-vendor status, or favoritism.",
                types.iter().copied().collect::<Vec<_>>().join(", "),
                agencies.len(),
            ),
            supporting_records: rows
                .iter()
                .map(|&row| RecordRef::new(Dataset::Contracts, row))
                .collect(),
            suggested_validation_steps: vec![
                "Request the sole-source or emergency justifications on file".to_owned(),
                "Compare award values against the competitive-bid threshold".to_owned(),
            ],
        });
    }

    sort_findings(&mut findings);
    findings
}
