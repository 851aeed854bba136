//! Temporal clustering — issuance spikes inside a sliding window.
//!
//! Dated licenses are sorted by issue date and a window of
//! `temporal_window_days` slides across every record. Windows holding
//! at least `temporal_threshold` licenses are candidates; overlapping
//! candidates merge into one cluster spanning their union interval, so
//! a single spike is never reported twice. Undated rows are excluded
//! here (and counted in the summary) but remain in every other
//! analysis.

use crate::config::AnalysisConfig;
use crate::finding::{AnalysisKind, Finding};
use crate::score;
use crate::table::LicenseTable;
use crate::types::{Dataset, RecordRef};
use chrono::NaiveDate;

struct Candidate {
    start: NaiveDate,
    end: NaiveDate,
    count: usize,
}

pub fn analyze(table: &LicenseTable, config: &AnalysisConfig) -> Vec<Finding> {
    let mut dated: Vec<(NaiveDate, usize)> = table
        .records()
        .iter()
        .enumerate()
        .filter_map(|(row, record)| record.issue_date.map(|date| (date, row)))
        .collect();
    dated.sort_unstable();

    let window = config.temporal_window_days;
    let threshold = config.temporal_threshold;

    // Every record anchors a window starting at its date.
    let mut candidates: Vec<Candidate> = Vec::new();
    for i in 0..dated.len() {
        let start = dated[i].0;
        let mut end = start;
        let mut count = 0;
        for &(date, _) in &dated[i..] {
            if (date - start).num_days() >= window {
                break;
            }
            end = date;
            count += 1;
        }
        if count >= threshold {
            candidates.push(Candidate { start, end, count });
        }
    }

    // Merge overlapping candidate windows into union intervals,
    // keeping the max per-window count.
    let mut merged: Vec<Candidate> = Vec::new();
    for candidate in candidates {
        match merged.last_mut() {
            Some(last) if candidate.start <= last.end => {
                last.end = last.end.max(candidate.end);
                last.count = last.count.max(candidate.count);
            }
            _ => merged.push(candidate),
        }
    }

    let mut findings: Vec<Finding> = merged
        .into_iter()
        .map(|cluster| {
            let rows: Vec<usize> = dated
                .iter()
                .filter(|(date, _)| *date >= cluster.start && *date <= cluster.end)
                .map(|&(_, row)| row)
                .collect();
            let span_days = (cluster.end - cluster.start).num_days() + 1;
            // Tighter spikes score higher: a span at or under the
            // window width keeps the full count-based score.
            let tightness = (window as f64 / span_days as f64).min(1.0);
            let base = score::scaled(
                cluster.count as f64,
                threshold as f64,
                score::saturation_for(threshold as f64),
            );
            Finding {
                analysis: AnalysisKind::TemporalCluster,
                subject: format!("{}..{}", cluster.start, cluster.end),
                metric: cluster.count as f64,
                risk_score: score::blend(base, tightness),
                why_it_matters: format!(
                    "{} licenses issued within a {window}-day window ({} to {}). \
                     Could indicate a processing batch, coordinated filing, or an \
                     administrative event.",
                    cluster.count, cluster.start, cluster.end,
                ),
                supporting_records: rows
                    .into_iter()
                    .map(|row| RecordRef::new(Dataset::Licenses, row))
                    .collect(),
                suggested_validation_steps: vec![
                    "Ask the licensing office whether a batch was processed that week"
                        .to_owned(),
                    "Compare applicants in the spike for shared addresses or agents"
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
    log::debug!(
        "temporal clustering: {} clusters, {} undated rows excluded",
        findings.len(),
        table.undated_count()
    );
    findings
}
