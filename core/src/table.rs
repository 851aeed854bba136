//! Normalized in-memory tables — raw rows plus derived matching keys.
//!
//! Each table owns its records read-only for the duration of a run.
//! The derived vectors are index-parallel with the records, so a
//! `RecordRef` row index addresses both. Building a table is the only
//! place a dataset-level invariant (unique license ids) is enforced.

use crate::error::{AnalysisError, AnalysisResult};
use crate::normalize;
use crate::types::{ContractRecord, LicenseRecord, TaxDelinquencyRecord};
use std::collections::BTreeSet;

#[derive(Debug)]
pub struct LicenseTable {
    records: Vec<LicenseRecord>,
    address_keys: Vec<String>,
    name_keys: Vec<String>,
    dba_keys: Vec<Option<String>>,
    undated: usize,
}

impl LicenseTable {
    /// Build the table, deriving matching keys and rejecting duplicate ids.
    pub fn new(records: Vec<LicenseRecord>) -> AnalysisResult<Self> {
        let mut seen = BTreeSet::new();
        for record in &records {
            if !seen.insert(record.id.as_str()) {
                return Err(AnalysisError::DuplicateId {
                    id: record.id.clone(),
                });
            }
        }

        let address_keys = records
            .iter()
            .map(|r| normalize::address_key(&r.address))
            .collect();
        let name_keys = records
            .iter()
            .map(|r| normalize::name_key(&r.business_name))
            .collect();
        let dba_keys = records
            .iter()
            .map(|r| r.dba_name.as_deref().map(normalize::name_key))
            .collect();
        let undated = records.iter().filter(|r| r.issue_date.is_none()).count();

        Ok(Self {
            records,
            address_keys,
            name_keys,
            dba_keys,
            undated,
        })
    }

    pub fn records(&self) -> &[LicenseRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn address_keys(&self) -> &[String] {
        &self.address_keys
    }

    pub fn name_keys(&self) -> &[String] {
        &self.name_keys
    }

    pub fn dba_keys(&self) -> &[Option<String>] {
        &self.dba_keys
    }

    /// Rows lacking a usable issue date, excluded from temporal analysis.
    pub fn undated_count(&self) -> usize {
        self.undated
    }
}

pub struct ContractTable {
    records: Vec<ContractRecord>,
    supplier_keys: Vec<String>,
    undated: usize,
}

impl ContractTable {
    pub fn new(records: Vec<ContractRecord>) -> Self {
        let supplier_keys = records
            .iter()
            .map(|r| normalize::name_key(&r.supplier))
            .collect();
        let undated = records
            .iter()
            .filter(|r| r.effective_from.is_none())
            .count();
        Self {
            records,
            supplier_keys,
            undated,
        }
    }

    pub fn records(&self) -> &[ContractRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn supplier_keys(&self) -> &[String] {
        &self.supplier_keys
    }

    pub fn undated_count(&self) -> usize {
        self.undated
    }

    pub fn total_value(&self) -> f64 {
        self.records.iter().map(|r| r.value).sum()
    }
}

pub struct TaxTable {
    records: Vec<TaxDelinquencyRecord>,
    address_keys: Vec<String>,
    owner_keys: Vec<String>,
    owner2_keys: Vec<Option<String>>,
}

impl TaxTable {
    pub fn new(records: Vec<TaxDelinquencyRecord>) -> Self {
        let address_keys = records
            .iter()
            .map(|r| normalize::address_key(&r.address))
            .collect();
        let owner_keys = records
            .iter()
            .map(|r| normalize::name_key(&r.owner_name_1))
            .collect();
        let owner2_keys = records
            .iter()
            .map(|r| r.owner_name_2.as_deref().map(normalize::name_key))
            .collect();
        Self {
            records,
            address_keys,
            owner_keys,
            owner2_keys,
        }
    }

    pub fn records(&self) -> &[TaxDelinquencyRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn address_keys(&self) -> &[String] {
        &self.address_keys
    }

    pub fn owner_keys(&self) -> &[String] {
        &self.owner_keys
    }

    pub fn owner2_keys(&self) -> &[Option<String>] {
        &self.owner2_keys
    }

    pub fn total_due(&self) -> f64 {
        self.records.iter().map(|r| r.total_due).sum()
    }
}
