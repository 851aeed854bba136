//! The single-dataset pattern engine.
//!
//! Runs the five analytical passes over one license table, in a fixed
//! order, and assembles the summary:
//!   1. Address density
//!   2. Name similarity
//!   3. DBA patterns
//!   4. Temporal clustering
//!   5. Geographic concentration
//!
//! Passes are independent: each reads the shared read-only table and
//! writes only its own findings. The engine never touches files and
//! never prints; it returns data for the caller to render.

use crate::{
    address_density,
    config::AnalysisConfig,
    dba_patterns,
    error::AnalysisResult,
    finding::Finding,
    geo_concentration, name_similarity,
    table::LicenseTable,
    temporal_clusters,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ── Report types ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LicenseSummary {
    pub total_licenses: usize,
    pub unique_businesses: usize,
    pub unique_addresses: usize,
    /// Rows excluded from temporal clustering for lack of a parseable date.
    pub undated_excluded: usize,
    pub earliest_issue: Option<NaiveDate>,
    pub latest_issue: Option<NaiveDate>,
    pub findings_total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LicenseReport {
    pub summary: LicenseSummary,
    pub address_density: Vec<Finding>,
    pub name_similarity: Vec<Finding>,
    pub dba_patterns: Vec<Finding>,
    pub temporal_clusters: Vec<Finding>,
    pub geographic_concentration: Vec<Finding>,
}

impl LicenseReport {
    /// All findings across the five passes, in pass order.
    pub fn all_findings(&self) -> impl Iterator<Item = &Finding> {
        self.address_density
            .iter()
            .chain(&self.name_similarity)
            .chain(&self.dba_patterns)
            .chain(&self.temporal_clusters)
            .chain(&self.geographic_concentration)
    }
}

// ── Engine ───────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct PatternEngine {
    config: AnalysisConfig,
}

impl PatternEngine {
    /// Validates the config up front; a bad threshold aborts before
    /// any analysis runs.
    pub fn new(config: AnalysisConfig) -> AnalysisResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Run all five passes and assemble the report.
    pub fn run_all(&self, table: &LicenseTable) -> LicenseReport {
        log::info!("pattern engine: analyzing {} licenses", table.len());

        let address_density = address_density::analyze(table, &self.config);
        let name_similarity = name_similarity::analyze(table, &self.config);
        let dba_patterns = dba_patterns::analyze(table, &self.config);
        let temporal_clusters = temporal_clusters::analyze(table, &self.config);
        let geographic_concentration = geo_concentration::analyze(table, &self.config);

        let unique_businesses: BTreeSet<&str> = table
            .name_keys()
            .iter()
            .map(String::as_str)
            .filter(|k| !k.is_empty())
            .collect();
        let unique_addresses: BTreeSet<&str> = table
            .address_keys()
            .iter()
            .map(String::as_str)
            .filter(|k| !k.is_empty())
            .collect();
        let dates: Vec<NaiveDate> = table
            .records()
            .iter()
            .filter_map(|r| r.issue_date)
            .collect();

        let findings_total = address_density.len()
            + name_similarity.len()
            + dba_patterns.len()
            + temporal_clusters.len()
            + geographic_concentration.len();
        log::info!("pattern engine: {findings_total} findings");

        LicenseReport {
            summary: LicenseSummary {
                total_licenses: table.len(),
                unique_businesses: unique_businesses.len(),
                unique_addresses: unique_addresses.len(),
                undated_excluded: table.undated_count(),
                earliest_issue: dates.iter().min().copied(),
                latest_issue: dates.iter().max().copied(),
                findings_total,
            },
            address_density,
            name_similarity,
            dba_patterns,
            temporal_clusters,
            geographic_concentration,
        }
    }
}
