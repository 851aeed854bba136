//! Geographic concentration — license density by zip code.
//!
//! Flags zips with at least `zip_threshold` licenses. The score blends
//! the raw count with the licenses-per-unique-address ratio: a high
//! ratio on few addresses reads like an agent hub. A high ratio below
//! the absolute threshold is a secondary signal surfaced in the
//! rationale of flagged zips, never auto-flagged on its own.

use crate::config::AnalysisConfig;
use crate::finding::{AnalysisKind, Finding};
use crate::score;
use crate::table::LicenseTable;
use crate::types::{Dataset, RecordRef};
use std::collections::{BTreeMap, BTreeSet};

// Per-address ratio above which the rationale calls out hub behavior.
const HUB_RATIO: f64 = 3.0;

pub fn analyze(table: &LicenseTable, config: &AnalysisConfig) -> Vec<Finding> {
    let mut groups: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (row, record) in table.records().iter().enumerate() {
        let Some(zip) = record.zip.as_deref() else {
            continue;
        };
        let zip = zip.trim();
        if zip.is_empty() {
            continue;
        }
        groups.entry(zip).or_default().push(row);
    }

    let threshold = config.zip_threshold;
    let mut findings: Vec<Finding> = groups
        .into_iter()
        .filter(|(_, rows)| rows.len() >= threshold)
        .map(|(zip, rows)| {
            let count = rows.len();
            let unique_addresses: BTreeSet<&str> = rows
                .iter()
                .map(|&row| table.address_keys()[row].as_str())
                .filter(|key| !key.is_empty())
                .collect();
            let ratio = if unique_addresses.is_empty() {
                0.0
            } else {
                count as f64 / unique_addresses.len() as f64
            };

            let base = score::scaled(
                count as f64,
                threshold as f64,
                score::saturation_for(threshold as f64),
            );
            // Ratio 1.0 (one license per address) halves the count
            // score; the hub ratio restores it fully.
            let ratio_modifier = ((ratio - 1.0) / (HUB_RATIO - 1.0)).clamp(0.0, 1.0);

            let hub_note = if ratio >= HUB_RATIO {
                " The per-address ratio alone suggests registered-agent or hub activity."
            } else {
                ""
            };
            Finding {
                analysis: AnalysisKind::GeographicConcentration,
                subject: zip.to_owned(),
                metric: count as f64,
                risk_score: score::blend(base, ratio_modifier),
                why_it_matters: format!(
                    "{count} licenses in zip {zip} across {} unique addresses \
                     ({ratio:.1} licenses per address). Could indicate a business \
                     district, a registered-agent service, or a shell company hub.{hub_note}",
                    unique_addresses.len(),
                ),
                supporting_records: rows
                    .iter()
                    .map(|&row| RecordRef::new(Dataset::Licenses, row))
                    .collect(),
                suggested_validation_steps: vec![
                    "Map the addresses to separate real storefronts from one suite".to_owned(),
                    "Check the densest addresses against registered-agent directories"
                        .to_owned(),
                ],
            }
        })
        .collect();

    findings.sort_by(|a, b| {
        b.metric
            .total_cmp(&a.metric)
            .then_with(|| a.subject.cmp(&b.subject))
    });
    findings
}
