//! DBA patterns — trade-name reuse in two directions.
//!
//! (a) one business operating under several DBAs (possible identity
//!     fragmentation), and
//! (b) one DBA shared by several businesses (possible shared front).
//!
//! DBA reuse is rare by construction, so the bar is lower than for
//! address density: two is enough to flag.

use crate::config::AnalysisConfig;
use crate::finding::{AnalysisKind, Finding};
use crate::score;
use crate::table::LicenseTable;
use crate::types::{Dataset, RecordRef};
use std::collections::{BTreeMap, BTreeSet};

pub fn analyze(table: &LicenseTable, config: &AnalysisConfig) -> Vec<Finding> {
    // business name key -> (distinct dba keys, rows)
    let mut dbas_per_business: BTreeMap<&str, (BTreeSet<&str>, Vec<usize>)> = BTreeMap::new();
    // dba key -> (distinct business name keys, rows)
    let mut businesses_per_dba: BTreeMap<&str, (BTreeSet<&str>, Vec<usize>)> = BTreeMap::new();

    for (row, dba_key) in table.dba_keys().iter().enumerate() {
        let Some(dba) = dba_key.as_deref() else {
            continue;
        };
        if dba.is_empty() {
            continue;
        }
        let name = table.name_keys()[row].as_str();
        if name.is_empty() {
            continue;
        }
        let entry = dbas_per_business.entry(name).or_default();
        entry.0.insert(dba);
        entry.1.push(row);
        let entry = businesses_per_dba.entry(dba).or_default();
        entry.0.insert(name);
        entry.1.push(row);
    }

    let min = config.dba_min_count;
    let mut findings = Vec::new();

    for (business, (dbas, rows)) in &dbas_per_business {
        if dbas.len() < min {
            continue;
        }
        let count = dbas.len();
        findings.push(Finding {
            analysis: AnalysisKind::MultipleDbas,
            subject: (*business).to_owned(),
            metric: count as f64,
            risk_score: score::scaled(count as f64, min as f64, score::saturation_for(min as f64)),
            why_it_matters: format!(
                "Business operates under {count} different DBAs ({}). Could indicate \
                 legitimate diversification or complexity that obscures ownership.",
                dbas.iter().copied().collect::<Vec<_>>().join(" / "),
            ),
            supporting_records: rows
                .iter()
                .map(|&row| RecordRef::new(Dataset::Licenses, row))
                .collect(),
            suggested_validation_steps: vec![
                "Confirm each DBA is registered to the same legal entity".to_owned(),
                "Check whether the DBAs operate from different addresses".to_owned(),
            ],
        });
    }

    for (dba, (businesses, rows)) in &businesses_per_dba {
        if businesses.len() < min {
            continue;
        }
        let count = businesses.len();
        findings.push(Finding {
            analysis: AnalysisKind::SharedDba,
            subject: (*dba).to_owned(),
            metric: count as f64,
            risk_score: score::scaled(count as f64, min as f64, score::saturation_for(min as f64)),
            why_it_matters: format!(
                "DBA used by {count} different businesses ({}). Could indicate \
                 related entities or a naming conflict.",
                businesses.iter().copied().collect::<Vec<_>>().join(" / "),
            ),
            supporting_records: rows
                .iter()
                .map(|&row| RecordRef::new(Dataset::Licenses, row))
                .collect(),
            suggested_validation_steps: vec![
                "Identify the legal entities behind each use of the trade name".to_owned(),
                "Look for common officers or owners across the businesses".to_owned(),
            ],
        });
    }

    findings.sort_by(|a, b| {
        b.metric
            .total_cmp(&a.metric)
            .then_with(|| a.subject.cmp(&b.subject))
    });
    findings
}
