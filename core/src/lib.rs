//! civicledger-core — pattern detection over municipal datasets.
//!
//! Analyzes business-license, city-contract and tax-delinquency tables
//! to surface structural patterns (address clustering, name similarity,
//! temporal spikes, geographic concentration, cross-dataset overlaps)
//! as investigative leads, not conclusions.
//!
//! The crate is a pure engine: it receives normalized in-memory tables
//! and returns structured, scored findings. File formats, column
//! aliasing and report rendering belong to the caller (see the
//! `ledger-scan` binary in this workspace).
//!
//! Determinism is a contract: identical input and configuration yield
//! byte-identical findings, including their order.

pub mod address_density;
pub mod config;
pub mod cross;
pub mod dba_patterns;
pub mod engine;
pub mod error;
pub mod finding;
pub mod geo_concentration;
pub mod name_similarity;
pub mod normalize;
pub mod schema;
pub mod score;
pub mod similarity;
pub mod table;
pub mod temporal_clusters;
pub mod types;

pub use config::AnalysisConfig;
pub use cross::{CrossDatasetEngine, CrossReport, CrossSummary};
pub use engine::{LicenseReport, LicenseSummary, PatternEngine};
pub use error::{AnalysisError, AnalysisResult};
pub use finding::{AnalysisKind, Finding};
pub use table::{ContractTable, LicenseTable, TaxTable};
pub use types::{ContractRecord, Dataset, LicenseRecord, RecordRef, TaxDelinquencyRecord};
