//! Contract timing — award batches, short durations, and awards close
//! to a linked license's issue date.
//!
//! Three sub-patterns:
//!   1. Same-day batches: three or more contracts effective on one day.
//!   2. Short durations: contracts shorter than
//!      `contract_short_duration_days` (possible bid-threshold
//!      circumvention).
//!   3. Award proximity: a contract effective within
//!      `PROXIMITY_WINDOW_DAYS` of a fuzzy-linked license's issue date;
//!      same-day awards are called out explicitly.
//!
//! Contracts without a parseable effective_from are excluded here and
//! counted in the summary.

use crate::config::AnalysisConfig;
use crate::cross::{fuzzy_pairs, rows_by_key, sort_findings};
use crate::finding::{AnalysisKind, Finding};
use crate::score;
use crate::table::{ContractTable, LicenseTable};
use crate::types::{Dataset, RecordRef};
use chrono::NaiveDate;
use std::collections::BTreeMap;

const SAME_DAY_THRESHOLD: usize = 3;
/// Days between license issue and contract start that still count as close.
const PROXIMITY_WINDOW_DAYS: i64 = 30;

pub fn analyze(
    licenses: &LicenseTable,
    contracts: &ContractTable,
    config: &AnalysisConfig,
) -> Vec<Finding> {
    let mut findings = Vec::new();

    // 1. Same-day award batches.
    let mut by_day: BTreeMap<NaiveDate, Vec<usize>> = BTreeMap::new();
    for (row, record) in contracts.records().iter().enumerate() {
        if let Some(date) = record.effective_from {
            by_day.entry(date).or_default().push(row);
        }
    }
    for (date, rows) in &by_day {
        if rows.len() < SAME_DAY_THRESHOLD {
            continue;
        }
        let count = rows.len();
        let total_value: f64 = rows.iter().map(|&row| contracts.records()[row].value).sum();
        findings.push(Finding {
            analysis: AnalysisKind::ContractTiming,
            subject: format!("same-day awards {date}"),
            metric: count as f64,
            risk_score: score::scaled(
                count as f64,
                SAME_DAY_THRESHOLD as f64,
                score::saturation_for(SAME_DAY_THRESHOLD as f64),
            ),
            why_it_matters: format!(
                "{count} contracts effective on {date}, ${total_value:.2} combined. \
                 Could indicate batch processing, coordinated awards, or expedited \
                 approvals.",
            ),
            supporting_records: rows
                .iter()
                .map(|&row| RecordRef::new(Dataset::Contracts, row))
                .collect(),
            suggested_validation_steps: vec![
                "Ask the procurement office whether the batch shares one solicitation"
                    .to_owned(),
                "Compare the awarded suppliers for common ownership".to_owned(),
            ],
        });
    }

    // 2. Short-duration contracts.
    let short_days = config.contract_short_duration_days;
    for (row, record) in contracts.records().iter().enumerate() {
        let (Some(from), Some(to)) = (record.effective_from, record.effective_to) else {
            continue;
        };
        let duration = (to - from).num_days();
        if duration < 0 || duration >= short_days {
            continue;
        }
        // Shorter is worse: one day under the limit just flags, a
        // zero-day contract saturates.
        let severity = (short_days - duration) as f64;
        findings.push(Finding {
            analysis: AnalysisKind::ContractTiming,
            subject: format!("short contract {}", record.contract_number),
            metric: duration as f64,
            risk_score: score::scaled(severity, 1.0, short_days as f64),
            why_it_matters: format!(
                "Contract {} ({}) runs only {duration} days for ${:.2}. Could \
                 indicate emergency procurement, a test engagement, or bid-threshold \
                 circumvention.",
                record.contract_number, record.supplier, record.value,
            ),
            supporting_records: vec![RecordRef::new(Dataset::Contracts, row)],
            suggested_validation_steps: vec![
                "Review the solicitation type and any emergency justification".to_owned(),
                "Look for sequential short contracts to the same supplier".to_owned(),
            ],
        });
    }

    // 3. Awards close to a fuzzy-linked license's issue date.
    let license_names = rows_by_key(licenses.name_keys());
    let supplier_names = rows_by_key(contracts.supplier_keys());
    let threshold = config.cross_name_similarity_threshold;
    for (license_name, supplier, sim) in fuzzy_pairs(&license_names, &supplier_names, threshold) {
        let mut best: Option<(i64, usize, usize)> = None; // (gap, license row, contract row)
        for &license_row in &license_names[license_name] {
            let Some(issued) = licenses.records()[license_row].issue_date else {
                continue;
            };
            for &contract_row in &supplier_names[supplier] {
                let Some(effective) = contracts.records()[contract_row].effective_from else {
                    continue;
                };
                let gap = (effective - issued).num_days().abs();
                if gap <= PROXIMITY_WINDOW_DAYS
                    && best.map_or(true, |(b, _, _)| gap < b)
                {
                    best = Some((gap, license_row, contract_row));
                }
            }
        }
        let Some((gap, license_row, contract_row)) = best else {
            continue;
        };
        let contract = &contracts.records()[contract_row];
        let same_day_note = if gap == 0 {
            " The award is effective the same day the license was issued."
        } else {
            ""
        };
        findings.push(Finding {
            analysis: AnalysisKind::ContractTiming,
            subject: format!("award near license: {license_name} ~ {supplier}"),
            metric: gap as f64,
            // gap 0 scores 1.0, gap at the window edge scores 0.5.
            risk_score: score::scaled(
                (PROXIMITY_WINDOW_DAYS + 1 - gap) as f64,
                1.0,
                (PROXIMITY_WINDOW_DAYS + 1) as f64,
            ),
            why_it_matters: format!(
                "Contract {} to '{}' starts {gap} day(s) from the issue date of a \
                 license matching the supplier at {:.1}% similarity.{same_day_note} \
                 Could indicate an entity formed for a specific award.",
                contract.contract_number,
                contract.supplier,
                sim * 100.0,
            ),
            supporting_records: vec![
                RecordRef::new(Dataset::Licenses, license_row),
                RecordRef::new(Dataset::Contracts, contract_row),
            ],
            suggested_validation_steps: vec![
                "Check the incorporation date against the solicitation timeline".to_owned(),
                "Review the bid evaluation records for the award".to_owned(),
            ],
        });
    }

    sort_findings(&mut findings);
    findings
}
