//! Data-driven required-column checks, one set per dataset type.
//!
//! The loader owns column aliasing and file parsing; it reports the
//! canonical column names it resolved, and this module decides whether
//! the table is usable at all. A failure is fatal and names every
//! missing column, before any analysis runs.

use crate::error::{AnalysisError, AnalysisResult};
use crate::types::Dataset;
use std::collections::BTreeSet;

const LICENSE_REQUIRED: &[&str] = &["license_id", "business_name", "address"];
const CONTRACT_REQUIRED: &[&str] = &[
    "agency",
    "contract_number",
    "value",
    "supplier",
    "procurement_type",
    "effective_from",
];
const TAX_REQUIRED: &[&str] = &[
    "property_code",
    "owner_name_1",
    "address",
    "total_due",
    "years_delinquent",
];

/// The canonical column names a dataset cannot be analyzed without.
pub fn required_columns(dataset: Dataset) -> &'static [&'static str] {
    match dataset {
        Dataset::Licenses => LICENSE_REQUIRED,
        Dataset::Contracts => CONTRACT_REQUIRED,
        Dataset::Taxes => TAX_REQUIRED,
    }
}

/// Verify every required column is present (post-aliasing).
pub fn check_columns<S: AsRef<str>>(dataset: Dataset, present: &[S]) -> AnalysisResult<()> {
    let present: BTreeSet<&str> = present.iter().map(|s| s.as_ref()).collect();
    let missing: Vec<String> = required_columns(dataset)
        .iter()
        .filter(|col| !present.contains(**col))
        .map(|col| (*col).to_owned())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(AnalysisError::Schema { dataset, missing })
    }
}
