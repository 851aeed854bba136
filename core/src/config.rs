//! Analysis configuration — every threshold in one immutable value.
//!
//! Defaults live in the `Default` impl and nowhere else. Engines take
//! the config by value at construction and validate it before any
//! analysis runs; there is no module-level mutable state.

use crate::error::{AnalysisError, AnalysisResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Minimum licenses at one normalized address before flagging.
    pub address_threshold: usize,
    /// Normalized-Levenshtein similarity at or above which two
    /// business names are linked, within the license table.
    pub name_similarity_threshold: f64,
    /// Minimum distinct DBAs per business (or businesses per DBA).
    pub dba_min_count: usize,
    /// Width of the sliding issuance window, in days.
    pub temporal_window_days: i64,
    /// Minimum licenses inside one window before flagging.
    pub temporal_threshold: usize,
    /// Minimum licenses in one zip code before flagging.
    pub zip_threshold: usize,
    /// Similarity threshold for name joins across tables. Lower than
    /// the single-table default because cross-table name forms vary more.
    pub cross_name_similarity_threshold: f64,
    /// Contracts shorter than this many days are flagged.
    pub contract_short_duration_days: i64,
    /// Optional pre-filter: only compare names sharing a first letter.
    /// Pure optimization for same-bucket pairs; trades recall for
    /// pairs whose first letters differ. Off by default.
    pub bucket_by_first_letter: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            address_threshold: 3,
            name_similarity_threshold: 0.85,
            dba_min_count: 2,
            temporal_window_days: 7,
            temporal_threshold: 5,
            zip_threshold: 10,
            cross_name_similarity_threshold: 0.80,
            contract_short_duration_days: 30,
            bucket_by_first_letter: false,
        }
    }
}

impl AnalysisConfig {
    /// Check every threshold against its valid range.
    pub fn validate(&self) -> AnalysisResult<()> {
        fn count_at_least(
            option: &'static str,
            value: usize,
            min: usize,
        ) -> AnalysisResult<()> {
            if value < min {
                return Err(AnalysisError::Config {
                    option,
                    value: value.to_string(),
                    reason: "must be at least 1",
                });
            }
            Ok(())
        }
        fn similarity_in_range(option: &'static str, value: f64) -> AnalysisResult<()> {
            if !(value > 0.0 && value <= 1.0) {
                return Err(AnalysisError::Config {
                    option,
                    value: value.to_string(),
                    reason: "must be in (0, 1]",
                });
            }
            Ok(())
        }

        count_at_least("address_threshold", self.address_threshold, 1)?;
        count_at_least("dba_min_count", self.dba_min_count, 1)?;
        count_at_least("temporal_threshold", self.temporal_threshold, 1)?;
        count_at_least("zip_threshold", self.zip_threshold, 1)?;
        similarity_in_range("name_similarity_threshold", self.name_similarity_threshold)?;
        similarity_in_range(
            "cross_name_similarity_threshold",
            self.cross_name_similarity_threshold,
        )?;
        if self.temporal_window_days < 1 {
            return Err(AnalysisError::Config {
                option: "temporal_window_days",
                value: self.temporal_window_days.to_string(),
                reason: "must be at least 1",
            });
        }
        if self.contract_short_duration_days < 1 {
            return Err(AnalysisError::Config {
                option: "contract_short_duration_days",
                value: self.contract_short_duration_days.to_string(),
                reason: "must be at least 1",
            });
        }
        Ok(())
    }
}
