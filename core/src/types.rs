//! Shared record types for the three municipal datasets.
//!
//! Records are loaded once and never mutated. Derived matching keys
//! (normalized addresses, normalized names) live in the table layer,
//! not on the records, so display values are preserved verbatim.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Which source table a row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dataset {
    Licenses,
    Contracts,
    Taxes,
}

impl std::fmt::Display for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dataset::Licenses => write!(f, "licenses"),
            Dataset::Contracts => write!(f, "contracts"),
            Dataset::Taxes => write!(f, "taxes"),
        }
    }
}

/// A reference into a source table. Findings carry these instead of
/// copies of the rows they were derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordRef {
    pub dataset: Dataset,
    pub row: usize,
}

impl RecordRef {
    pub fn new(dataset: Dataset, row: usize) -> Self {
        Self { dataset, row }
    }
}

/// One business-license row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LicenseRecord {
    pub id: String,
    pub business_name: String,
    pub dba_name: Option<String>,
    pub address: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    /// None when the source field was absent or unparseable; such
    /// rows are excluded from temporal analysis only.
    pub issue_date: Option<NaiveDate>,
    pub license_type: Option<String>,
    pub owner_name: Option<String>,
}

/// One city-contract row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractRecord {
    pub agency: String,
    pub contract_number: String,
    pub value: f64,
    pub supplier: String,
    pub procurement_type: String,
    pub description: Option<String>,
    pub solicitation_type: Option<String>,
    pub effective_from: Option<NaiveDate>,
    pub effective_to: Option<NaiveDate>,
}

/// One delinquent-property-tax row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxDelinquencyRecord {
    pub property_code: String,
    pub owner_name_1: String,
    pub owner_name_2: Option<String>,
    pub address: String,
    pub total_due: f64,
    pub years_delinquent: f64,
    pub geo: Option<String>,
}
