//! The cross-dataset correlator.
//!
//! Six analyses over three independently-schemaed tables, unified by
//! two join strategies:
//!   - exact normalized-address equality (licenses ↔ tax records)
//!   - fuzzy name joins at `cross_name_similarity_threshold`
//!     (license names ↔ contract suppliers ↔ tax owners)
//!
//! Analyses:
//!   1. Address overlap       (licenses + delinquent properties)
//!   2. Entity matching       (fuzzy name links across all three tables)
//!   3. Contract timing       (same-day batches, short durations,
//!                             award-near-license proximity)
//!   4. Procurement skew      (non-competitive award concentration)
//!   5. Agency concentration  (top-supplier share, multi-agency suppliers)
//!   6. Delinquency overlap   (severe arrears held by licensees/suppliers)
//!
//! Every analysis reads the shared read-only tables and returns
//! findings in the same uniform shape as the single-dataset passes.

pub mod address_overlap;
pub mod agency;
pub mod contract_timing;
pub mod delinquency;
pub mod entity_match;
pub mod procurement;

use crate::{
    config::AnalysisConfig,
    error::AnalysisResult,
    finding::Finding,
    similarity::{name_similarity, MIN_NAME_LEN},
    table::{ContractTable, LicenseTable, TaxTable},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ── Shared join helpers ──────────────────────────────────────────────────────

/// Distinct non-empty keys mapped to the rows carrying them, in a
/// stable order.
pub(crate) fn rows_by_key(keys: &[String]) -> BTreeMap<&str, Vec<usize>> {
    let mut map: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (row, key) in keys.iter().enumerate() {
        if !key.is_empty() {
            map.entry(key).or_default().push(row);
        }
    }
    map
}

/// Fuzzy join between two distinct-key sets: every (left, right) pair
/// at or above the threshold, with its similarity. O(n·m); acceptable
/// at municipal scale, same documented bound as in-table matching.
pub(crate) fn fuzzy_pairs<'a>(
    left: &BTreeMap<&'a str, Vec<usize>>,
    right: &BTreeMap<&'a str, Vec<usize>>,
    threshold: f64,
) -> Vec<(&'a str, &'a str, f64)> {
    let mut pairs = Vec::new();
    for left_key in left.keys() {
        if left_key.chars().count() < MIN_NAME_LEN {
            continue;
        }
        for right_key in right.keys() {
            if right_key.chars().count() < MIN_NAME_LEN {
                continue;
            }
            let sim = name_similarity(left_key, right_key);
            if sim >= threshold {
                pairs.push((*left_key, *right_key, sim));
            }
        }
    }
    pairs
}

/// Descending metric, ascending subject — the deterministic order
/// every cross analysis returns.
pub(crate) fn sort_findings(findings: &mut [Finding]) {
    findings.sort_by(|a, b| {
        b.metric
            .total_cmp(&a.metric)
            .then_with(|| a.subject.cmp(&b.subject))
    });
}

// ── Report types ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossSummary {
    pub license_count: usize,
    pub contract_count: usize,
    pub contract_total_value: f64,
    pub tax_record_count: usize,
    pub tax_total_due: f64,
    /// Normalized addresses present in both licenses and tax records.
    pub shared_addresses: usize,
    /// Contracts whose procurement type is non-competitive.
    pub non_competitive_contracts: usize,
    pub findings_total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossReport {
    pub summary: CrossSummary,
    pub address_overlap: Vec<Finding>,
    pub entity_matches: Vec<Finding>,
    pub contract_timing: Vec<Finding>,
    pub procurement_skew: Vec<Finding>,
    pub agency_concentration: Vec<Finding>,
    pub delinquency_overlap: Vec<Finding>,
}

impl CrossReport {
    pub fn all_findings(&self) -> impl Iterator<Item = &Finding> {
        self.address_overlap
            .iter()
            .chain(&self.entity_matches)
            .chain(&self.contract_timing)
            .chain(&self.procurement_skew)
            .chain(&self.agency_concentration)
            .chain(&self.delinquency_overlap)
    }
}

// ── Engine ───────────────────────────────────────────────────────────────────

pub struct CrossDatasetEngine {
    config: AnalysisConfig,
}

impl CrossDatasetEngine {
    pub fn new(config: AnalysisConfig) -> AnalysisResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn run_all(
        &self,
        licenses: &LicenseTable,
        contracts: &ContractTable,
        taxes: &TaxTable,
    ) -> CrossReport {
        log::info!(
            "cross-dataset engine: {} licenses, {} contracts, {} tax records",
            licenses.len(),
            contracts.len(),
            taxes.len()
        );

        let address_overlap = address_overlap::analyze(licenses, taxes, &self.config);
        let entity_matches = entity_match::analyze(licenses, contracts, taxes, &self.config);
        let contract_timing = contract_timing::analyze(licenses, contracts, &self.config);
        let procurement_skew = procurement::analyze(contracts, &self.config);
        let agency_concentration = agency::analyze(contracts, &self.config);
        let delinquency_overlap = delinquency::analyze(licenses, contracts, taxes, &self.config);

        let license_addresses = rows_by_key(licenses.address_keys());
        let tax_addresses = rows_by_key(taxes.address_keys());
        let shared_addresses = license_addresses
            .keys()
            .filter(|key| tax_addresses.contains_key(**key))
            .count();
        let non_competitive_contracts = contracts
            .records()
            .iter()
            .filter(|r| procurement::is_non_competitive(&r.procurement_type))
            .count();

        let findings_total = address_overlap.len()
            + entity_matches.len()
            + contract_timing.len()
            + procurement_skew.len()
            + agency_concentration.len()
            + delinquency_overlap.len();
        log::info!("cross-dataset engine: {findings_total} findings");

        CrossReport {
            summary: CrossSummary {
                license_count: licenses.len(),
                contract_count: contracts.len(),
                contract_total_value: contracts.total_value(),
                tax_record_count: taxes.len(),
                tax_total_due: taxes.total_due(),
                shared_addresses,
                non_competitive_contracts,
                findings_total,
            },
            address_overlap,
            entity_matches,
            contract_timing,
            procurement_skew,
            agency_concentration,
            delinquency_overlap,
        }
    }
}
