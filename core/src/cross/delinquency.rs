//! Delinquency overlap — severe tax arrears held by an entity that
//! also holds a license or a city contract.
//!
//! The severity screen keeps tax rows with at least `SEVERE_DUE`
//! outstanding or `SEVERE_YEARS` delinquent. A screened owner only
//! becomes a finding when a fuzzy name link ties it to a license
//! holder or contract supplier; unlinked arrears are an enforcement
//! story, not a cross-dataset lead.

use crate::config::AnalysisConfig;
use crate::cross::{rows_by_key, sort_findings};
use crate::finding::{AnalysisKind, Finding};
use crate::score;
use crate::similarity::{name_similarity, MIN_NAME_LEN};
use crate::table::{ContractTable, LicenseTable, TaxTable};
use crate::types::{Dataset, RecordRef};

const SEVERE_DUE: f64 = 5_000.0;
const SEVERE_YEARS: f64 = 3.0;
const DUE_SATURATION: f64 = 50_000.0;
const YEARS_SATURATION: f64 = 10.0;

/// Best fuzzy match for `owner` among `candidates` (distinct keys with
/// their rows). Ties resolve to the lexicographically first key.
fn best_match<'a>(
    owner: &str,
    candidates: &std::collections::BTreeMap<&'a str, Vec<usize>>,
    threshold: f64,
) -> Option<(&'a str, f64)> {
    if owner.chars().count() < MIN_NAME_LEN {
        return None;
    }
    let mut best: Option<(&str, f64)> = None;
    for key in candidates.keys() {
        if key.chars().count() < MIN_NAME_LEN {
            continue;
        }
        let sim = name_similarity(owner, key);
        if sim >= threshold && best.map_or(true, |(_, b)| sim > b) {
            best = Some((key, sim));
        }
    }
    best
}

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
    for (row, record) in taxes.records().iter().enumerate() {
        if record.total_due < SEVERE_DUE && record.years_delinquent < SEVERE_YEARS {
            continue;
        }
        let owner = taxes.owner_keys()[row].as_str();

        let license_link = best_match(owner, &license_names, threshold);
        let supplier_link = best_match(owner, &supplier_names, threshold);
        if license_link.is_none() && supplier_link.is_none() {
            continue;
        }

        let mut supporting = vec![RecordRef::new(Dataset::Taxes, row)];
        let mut link_notes = Vec::new();
        if let Some((name, sim)) = license_link {
            supporting.extend(
                license_names[name]
                    .iter()
                    .map(|&r| RecordRef::new(Dataset::Licenses, r)),
            );
            link_notes.push(format!(
                "holds a business license as '{name}' ({:.1}% match)",
                sim * 100.0
            ));
        }
        if let Some((name, sim)) = supplier_link {
            supporting.extend(
                supplier_names[name]
                    .iter()
                    .map(|&r| RecordRef::new(Dataset::Contracts, r)),
            );
            link_notes.push(format!(
                "supplies city contracts as '{name}' ({:.1}% match)",
                sim * 100.0
            ));
        }

        let due_score = score::scaled(record.total_due, SEVERE_DUE, DUE_SATURATION);
        let years_modifier = record.years_delinquent / YEARS_SATURATION;
        findings.push(Finding {
            analysis: AnalysisKind::DelinquencyOverlap,
            subject: format!("{} ({})", record.owner_name_1, record.property_code),
            metric: record.total_due,
            risk_score: score::blend(due_score.max(0.5), years_modifier),
            why_it_matters: format!(
                "Owner of property {} owes ${:.2}, {:.0} years delinquent, and \
                 {}. Could indicate financial instability, asset shielding, or an \
                 enforcement gap.",
                record.property_code,
                record.total_due,
                record.years_delinquent,
                link_notes.join(" and "),
            ),
            supporting_records: supporting,
            suggested_validation_steps: vec![
                "Confirm the owner and the linked entity are the same party".to_owned(),
                "Check contractor-eligibility rules for tax compliance clauses".to_owned(),
                "Review the parcel for payment plans or pending appeals".to_owned(),
            ],
        });
    }

    sort_findings(&mut findings);
    findings
}
