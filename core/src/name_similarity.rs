//! Name similarity — clusters of near-identical business names.
//!
//! Distinct raw spellings are clustered by comparing their normalized
//! keys (O(n²), see `similarity`). Suffix variants of one name ("Acme
//! Corp", "ACME Corporation") share a key and link at similarity 1.0;
//! near keys link fuzzily; links form connected components, so "Acme
//! Corp" ~ "Acme Co" ~ "ACME Corporation" collapse into one cluster
//! even when the endpoints are not direct matches.

use crate::config::AnalysisConfig;
use crate::finding::{AnalysisKind, Finding};
use crate::score;
use crate::similarity;
use crate::table::LicenseTable;
use crate::types::{Dataset, RecordRef};
use std::collections::BTreeMap;

// Size anchors for the cluster score: two names just flag, ten saturate.
const CLUSTER_SIZE_THRESHOLD: f64 = 2.0;
const CLUSTER_SIZE_SATURATION: f64 = 10.0;

pub fn analyze(table: &LicenseTable, config: &AnalysisConfig) -> Vec<Finding> {
    // Distinct raw spellings, each with the rows carrying it. BTreeMap
    // gives a stable comparison order.
    let mut rows_by_variant: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (row, record) in table.records().iter().enumerate() {
        let raw = record.business_name.trim();
        if raw.is_empty() || table.name_keys()[row].is_empty() {
            continue;
        }
        rows_by_variant.entry(raw).or_default().push(row);
    }
    let variants: Vec<&str> = rows_by_variant.keys().copied().collect();
    // Comparison runs on normalized keys, index-parallel with variants.
    let keys: Vec<String> = variants
        .iter()
        .map(|v| {
            let row = rows_by_variant[v][0];
            table.name_keys()[row].clone()
        })
        .collect();

    let clusters = similarity::cluster_names(
        &keys,
        config.name_similarity_threshold,
        config.bucket_by_first_letter,
    );
    log::debug!(
        "name similarity: {} clusters over {} distinct spellings",
        clusters.len(),
        variants.len()
    );

    let mut findings: Vec<Finding> = clusters
        .into_iter()
        .map(|cluster| {
            let member_names: Vec<&str> =
                cluster.members.iter().map(|&i| variants[i]).collect();
            let mut rows: Vec<usize> = member_names
                .iter()
                .flat_map(|name| rows_by_variant[*name].iter().copied())
                .collect();
            rows.sort_unstable();

            let size = cluster.members.len();
            let base = score::scaled(size as f64, CLUSTER_SIZE_THRESHOLD, CLUSTER_SIZE_SATURATION);
            Finding {
                analysis: AnalysisKind::NameSimilarity,
                subject: keys[cluster.members[0]].clone(),
                metric: size as f64,
                risk_score: score::blend(base, cluster.mean_similarity),
                why_it_matters: format!(
                    "{size} near-identical business names ({}) across {} licenses. \
                     Could indicate related entities, franchises, or attempts to \
                     obscure common ownership.",
                    member_names.join(" / "),
                    rows.len(),
                ),
                supporting_records: rows
                    .into_iter()
                    .map(|row| RecordRef::new(Dataset::Licenses, row))
                    .collect(),
                suggested_validation_steps: vec![
                    "Pull incorporation filings for each name and compare officers".to_owned(),
                    "Check whether the variants share addresses, owners or license types"
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
