//! Address overlap — a licensed business and a delinquent property at
//! the same normalized address.

use crate::config::AnalysisConfig;
use crate::cross::{rows_by_key, sort_findings};
use crate::finding::{AnalysisKind, Finding};
use crate::score;
use crate::table::{LicenseTable, TaxTable};
use crate::types::{Dataset, RecordRef};

// One row on each side already flags; ten combined rows saturate.
const OVERLAP_THRESHOLD: f64 = 2.0;
const OVERLAP_SATURATION: f64 = 10.0;

pub fn analyze(licenses: &LicenseTable, taxes: &TaxTable, _config: &AnalysisConfig) -> Vec<Finding> {
    let license_addresses = rows_by_key(licenses.address_keys());
    let tax_addresses = rows_by_key(taxes.address_keys());

    let mut findings = Vec::new();
    for (address, license_rows) in &license_addresses {
        let Some(tax_rows) = tax_addresses.get(address) else {
            continue;
        };
        let combined = license_rows.len() + tax_rows.len();
        let total_due: f64 = tax_rows
            .iter()
            .map(|&row| taxes.records()[row].total_due)
            .sum();
        let mean_years: f64 = tax_rows
            .iter()
            .map(|&row| taxes.records()[row].years_delinquent)
            .sum::<f64>()
            / tax_rows.len() as f64;

        let mut supporting: Vec<RecordRef> = license_rows
            .iter()
            .map(|&row| RecordRef::new(Dataset::Licenses, row))
            .collect();
        supporting.extend(tax_rows.iter().map(|&row| RecordRef::new(Dataset::Taxes, row)));

        findings.push(Finding {
            analysis: AnalysisKind::AddressOverlap,
            subject: (*address).to_owned(),
            metric: combined as f64,
            risk_score: score::scaled(combined as f64, OVERLAP_THRESHOLD, OVERLAP_SATURATION),
            why_it_matters: format!(
                "Address appears in both business licenses ({}) and delinquent tax \
                 records ({}); ${total_due:.2} due, {mean_years:.1} years delinquent \
                 on average. Could indicate financial distress, shell operations, or \
                 undisclosed business use of the property.",
                license_rows.len(),
                tax_rows.len(),
            ),
            supporting_records: supporting,
            suggested_validation_steps: vec![
                "Compare the property owner of record with the license holder".to_owned(),
                "Check whether the business still operates at the address".to_owned(),
                "Review the delinquency history for payment plans or disputes".to_owned(),
            ],
        });
    }

    sort_findings(&mut findings);
    findings
}
