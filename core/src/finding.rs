//! The uniform output unit of every analysis.

use crate::types::RecordRef;
use serde::{Deserialize, Serialize};

/// Which analysis produced a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    AddressDensity,
    NameSimilarity,
    MultipleDbas,
    SharedDba,
    TemporalCluster,
    GeographicConcentration,
    AddressOverlap,
    EntityMatch,
    ContractTiming,
    ProcurementSkew,
    AgencyConcentration,
    DelinquencyOverlap,
}

/// A single scored lead. Findings are leads for human validation, not
/// conclusions; `why_it_matters` always states benign explanations
/// alongside the concerning ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub analysis: AnalysisKind,
    /// The entity, address, zip, interval or cluster key this is about.
    pub subject: String,
    /// Raw severity metric: a count, ratio or distance depending on the
    /// analysis.
    pub metric: f64,
    /// Normalized severity in [0, 1], monotonic in the metric. Not a
    /// probability of wrongdoing.
    pub risk_score: f64,
    pub why_it_matters: String,
    /// References into the source tables this was derived from.
    pub supporting_records: Vec<RecordRef>,
    /// Ordered, concrete steps a reader can take to confirm or dismiss
    /// the lead.
    pub suggested_validation_steps: Vec<String>,
}
