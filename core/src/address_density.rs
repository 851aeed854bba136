//! Address density — multiple licenses at one normalized address.
//!
//! Shared addresses are the cheapest structural signal in license
//! data: registered-agent hubs, shared office space and shell
//! arrangements all present as one address carrying many licenses.

use crate::config::AnalysisConfig;
use crate::finding::{AnalysisKind, Finding};
use crate::score;
use crate::table::LicenseTable;
use crate::types::{Dataset, RecordRef};
use std::collections::BTreeMap;

pub fn analyze(table: &LicenseTable, config: &AnalysisConfig) -> Vec<Finding> {
    let mut groups: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (row, key) in table.address_keys().iter().enumerate() {
        if key.is_empty() {
            continue;
        }
        groups.entry(key).or_default().push(row);
    }

    let threshold = config.address_threshold;
    let mut findings: Vec<Finding> = groups
        .into_iter()
        .filter(|(_, rows)| rows.len() >= threshold)
        .map(|(address, rows)| {
            let count = rows.len();
            let businesses: Vec<&str> = rows
                .iter()
                .map(|&row| table.records()[row].business_name.as_str())
                .collect();
            Finding {
                analysis: AnalysisKind::AddressDensity,
                subject: address.to_owned(),
                metric: count as f64,
                risk_score: score::scaled(
                    count as f64,
                    threshold as f64,
                    score::saturation_for(threshold as f64),
                ),
                why_it_matters: format!(
                    "{count} licenses at a single address ({}). Could indicate shared \
                     office space, a registered-agent hub, shell arrangements, or a \
                     legitimate business center.",
                    businesses.join(", "),
                ),
                supporting_records: rows
                    .iter()
                    .map(|&row| RecordRef::new(Dataset::Licenses, row))
                    .collect(),
                suggested_validation_steps: vec![
                    "Check corporate registration records for a shared registered agent"
                        .to_owned(),
                    "Verify actual occupancy through building permits or utility service"
                        .to_owned(),
                    "Compare the owner names behind the co-located licenses".to_owned(),
                ],
            }
        })
        .collect();

    // Descending count, then ascending address, for deterministic output.
    findings.sort_by(|a, b| {
        b.metric
            .total_cmp(&a.metric)
            .then_with(|| a.subject.cmp(&b.subject))
    });
    log::debug!(
        "address density: {} of {} addresses flagged",
        findings.len(),
        table.len()
    );
    findings
}
