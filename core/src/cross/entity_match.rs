//! Entity matching — fuzzy name links across table boundaries.
//!
//! License holders are compared against contract suppliers and against
//! tax-delinquent owners (both owner name fields) with the same
//! similarity ratio as in-table matching, at the cross-table threshold.
//! Similarity alone is a weak lead, so the score blends it with linked
//! volume: contract count on the supplier side, total due on the tax
//! side.

use crate::config::AnalysisConfig;
use crate::cross::{fuzzy_pairs, rows_by_key, sort_findings};
use crate::finding::{AnalysisKind, Finding};
use crate::score;
use crate::table::{ContractTable, LicenseTable, TaxTable};
use crate::types::{Dataset, RecordRef};
use std::collections::BTreeMap;

// Linked volume that saturates the score modifier.
const CONTRACT_COUNT_SATURATION: f64 = 5.0;
const TAX_DUE_SATURATION: f64 = 10_000.0;

pub fn analyze(
    licenses: &LicenseTable,
    contracts: &ContractTable,
    taxes: &TaxTable,
    config: &AnalysisConfig,
) -> Vec<Finding> {
    let license_names = rows_by_key(licenses.name_keys());
    let supplier_names = rows_by_key(contracts.supplier_keys());
    let threshold = config.cross_name_similarity_threshold;

    let mut findings = Vec::new();

    // License holders ↔ contract suppliers.
    for (license_name, supplier, sim) in fuzzy_pairs(&license_names, &supplier_names, threshold) {
        let license_rows = &license_names[license_name];
        let contract_rows = &supplier_names[supplier];
        let total_value: f64 = contract_rows
            .iter()
            .map(|&row| contracts.records()[row].value)
            .sum();
        let modifier = contract_rows.len() as f64 / CONTRACT_COUNT_SATURATION;

        let mut supporting: Vec<RecordRef> = license_rows
            .iter()
            .map(|&row| RecordRef::new(Dataset::Licenses, row))
            .collect();
        supporting.extend(
            contract_rows
                .iter()
                .map(|&row| RecordRef::new(Dataset::Contracts, row)),
        );

        findings.push(Finding {
            analysis: AnalysisKind::EntityMatch,
            subject: format!("{license_name} ~ {supplier}"),
            metric: sim,
            risk_score: score::blend(sim, modifier),
            why_it_matters: format!(
                "License holder '{license_name}' matches contract supplier \
                 '{supplier}' at {:.1}% similarity; {} contracts worth \
                 ${total_value:.2}. Could indicate a legitimate vendor that is \
                 locally licensed, or a self-dealing arrangement.",
                sim * 100.0,
                contract_rows.len(),
            ),
            supporting_records: supporting,
            suggested_validation_steps: vec![
                "Confirm the two names are the same legal entity".to_owned(),
                "Check the supplier's contract history for conflicts of interest".to_owned(),
            ],
        });
    }

    // License holders ↔ tax-delinquent owners (either owner field).
    let mut owner_names: BTreeMap<&str, Vec<usize>> = rows_by_key(taxes.owner_keys());
    for (row, key) in taxes.owner2_keys().iter().enumerate() {
        if let Some(key) = key.as_deref() {
            if !key.is_empty() {
                let rows = owner_names.entry(key).or_default();
                if !rows.contains(&row) {
                    rows.push(row);
                }
            }
        }
    }

    for (license_name, owner, sim) in fuzzy_pairs(&license_names, &owner_names, threshold) {
        let license_rows = &license_names[license_name];
        let tax_rows = &owner_names[owner];
        let total_due: f64 = tax_rows
            .iter()
            .map(|&row| taxes.records()[row].total_due)
            .sum();
        let modifier = total_due / TAX_DUE_SATURATION;

        let mut supporting: Vec<RecordRef> = license_rows
            .iter()
            .map(|&row| RecordRef::new(Dataset::Licenses, row))
            .collect();
        supporting.extend(tax_rows.iter().map(|&row| RecordRef::new(Dataset::Taxes, row)));

        findings.push(Finding {
            analysis: AnalysisKind::EntityMatch,
            subject: format!("{license_name} ~ {owner}"),
            metric: sim,
            risk_score: score::blend(sim, modifier),
            why_it_matters: format!(
                "License holder '{license_name}' matches tax-delinquent owner \
                 '{owner}' at {:.1}% similarity; ${total_due:.2} in unpaid \
                 property taxes across {} record(s). Could indicate financial \
                 distress or a business operating from a problem property.",
                sim * 100.0,
                tax_rows.len(),
            ),
            supporting_records: supporting,
            suggested_validation_steps: vec![
                "Verify owner identity against property transfer records".to_owned(),
                "Check whether the delinquent parcels host the licensed business".to_owned(),
            ],
        });
    }

    sort_findings(&mut findings);
    findings
}
