//! CSV loading and column aliasing.
//!
//! Municipal exports name the same column a dozen ways; the alias
//! tables below map whatever the header says onto the canonical field
//! names the core requires. Missing required columns surface as the
//! core's SchemaError before any rows are read.

use anyhow::{Context, Result};
use civicledger_core::{
    normalize, schema, ContractRecord, Dataset, LicenseRecord, TaxDelinquencyRecord,
};
use std::collections::HashMap;
use std::path::Path;

const LICENSE_ALIASES: &[(&str, &[&str])] = &[
    ("license_id", &["license_id", "license_number", "id"]),
    ("business_name", &["business_name", "legal_name", "name"]),
    ("dba_name", &["dba_name", "dba", "doing_business_as", "trade_name"]),
    ("address", &["address", "street_address", "business_address"]),
    ("city", &["city"]),
    ("state", &["state"]),
    ("zip", &["zip", "zip_code", "zipcode", "postal_code"]),
    ("issue_date", &["issue_date", "issued", "date_issued", "license_start_date"]),
    ("license_type", &["license_type", "type", "category"]),
    ("owner_name", &["owner_name", "owner", "applicant"]),
];

const CONTRACT_ALIASES: &[(&str, &[&str])] = &[
    ("agency", &["agency", "department"]),
    ("contract_number", &["contract_number", "contract_no", "contract_id"]),
    ("value", &["value", "contract_value", "amount", "award_amount"]),
    ("supplier", &["supplier", "vendor", "vendor_name", "contractor"]),
    ("procurement_type", &["procurement_type", "procurement_method", "award_method"]),
    ("description", &["description", "purpose"]),
    ("solicitation_type", &["solicitation_type", "solicitation"]),
    ("effective_from", &["effective_from", "start_date", "effective_date"]),
    ("effective_to", &["effective_to", "end_date", "expiration_date"]),
];

const TAX_ALIASES: &[(&str, &[&str])] = &[
    ("property_code", &["property_code", "parcel", "parcel_id", "property_id"]),
    ("owner_name_1", &["owner_name_1", "owner_1", "owner", "owner_name"]),
    ("owner_name_2", &["owner_name_2", "owner_2", "co_owner"]),
    ("address", &["address", "property_address", "situs_address"]),
    ("total_due", &["total_due", "amount_due", "balance_due"]),
    ("years_delinquent", &["years_delinquent", "years", "tax_years"]),
    ("geo", &["geo", "geo_location", "location"]),
];

/// Header text -> canonical form: lowercase, trimmed, spaces to underscores.
fn canonical_header(raw: &str) -> String {
    raw.trim().to_lowercase().replace([' ', '-'], "_")
}

/// Resolve a header row against an alias table, returning canonical
/// name -> column index for every column we recognize.
fn resolve_columns(
    headers: &csv::StringRecord,
    aliases: &[(&str, &[&str])],
) -> HashMap<String, usize> {
    let mut resolved = HashMap::new();
    for (index, raw) in headers.iter().enumerate() {
        let header = canonical_header(raw);
        for (canonical, names) in aliases {
            if names.contains(&header.as_str()) && !resolved.contains_key(*canonical) {
                resolved.insert((*canonical).to_owned(), index);
            }
        }
    }
    resolved
}

fn field<'a>(
    record: &'a csv::StringRecord,
    columns: &HashMap<String, usize>,
    name: &str,
) -> Option<&'a str> {
    columns
        .get(name)
        .and_then(|&index| record.get(index))
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn optional(record: &csv::StringRecord, columns: &HashMap<String, usize>, name: &str) -> Option<String> {
    field(record, columns, name).map(str::to_owned)
}

pub fn load_licenses(path: &Path) -> Result<Vec<LicenseRecord>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("cannot open {}", path.display()))?;
    let columns = resolve_columns(reader.headers()?, LICENSE_ALIASES);
    let present: Vec<&String> = columns.keys().collect();
    schema::check_columns(Dataset::Licenses, &present)?;

    let mut records = Vec::new();
    for (line, row) in reader.records().enumerate() {
        let row = row.with_context(|| format!("{}: bad row {}", path.display(), line + 2))?;
        records.push(LicenseRecord {
            id: field(&row, &columns, "license_id").unwrap_or_default().to_owned(),
            business_name: field(&row, &columns, "business_name")
                .unwrap_or_default()
                .to_owned(),
            dba_name: optional(&row, &columns, "dba_name"),
            address: field(&row, &columns, "address").unwrap_or_default().to_owned(),
            city: optional(&row, &columns, "city"),
            state: optional(&row, &columns, "state"),
            zip: optional(&row, &columns, "zip"),
            issue_date: field(&row, &columns, "issue_date").and_then(normalize::parse_date),
            license_type: optional(&row, &columns, "license_type"),
            owner_name: optional(&row, &columns, "owner_name"),
        });
    }
    log::info!("loaded {} license rows from {}", records.len(), path.display());
    Ok(records)
}

pub fn load_contracts(path: &Path) -> Result<Vec<ContractRecord>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("cannot open {}", path.display()))?;
    let columns = resolve_columns(reader.headers()?, CONTRACT_ALIASES);
    let present: Vec<&String> = columns.keys().collect();
    schema::check_columns(Dataset::Contracts, &present)?;

    let mut records = Vec::new();
    for (line, row) in reader.records().enumerate() {
        let row = row.with_context(|| format!("{}: bad row {}", path.display(), line + 2))?;
        records.push(ContractRecord {
            agency: field(&row, &columns, "agency").unwrap_or_default().to_owned(),
            contract_number: field(&row, &columns, "contract_number")
                .unwrap_or_default()
                .to_owned(),
            // Unparseable values count as zero, as a missing amount
            // should depress rather than inflate value-weighted scores.
            value: field(&row, &columns, "value")
                .and_then(normalize::parse_currency)
                .unwrap_or(0.0),
            supplier: field(&row, &columns, "supplier").unwrap_or_default().to_owned(),
            procurement_type: field(&row, &columns, "procurement_type")
                .unwrap_or_default()
                .to_owned(),
            description: optional(&row, &columns, "description"),
            solicitation_type: optional(&row, &columns, "solicitation_type"),
            effective_from: field(&row, &columns, "effective_from").and_then(normalize::parse_date),
            effective_to: field(&row, &columns, "effective_to").and_then(normalize::parse_date),
        });
    }
    log::info!("loaded {} contract rows from {}", records.len(), path.display());
    Ok(records)
}

pub fn load_taxes(path: &Path) -> Result<Vec<TaxDelinquencyRecord>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("cannot open {}", path.display()))?;
    let columns = resolve_columns(reader.headers()?, TAX_ALIASES);
    let present: Vec<&String> = columns.keys().collect();
    schema::check_columns(Dataset::Taxes, &present)?;

    let mut records = Vec::new();
    for (line, row) in reader.records().enumerate() {
        let row = row.with_context(|| format!("{}: bad row {}", path.display(), line + 2))?;
        records.push(TaxDelinquencyRecord {
            property_code: field(&row, &columns, "property_code")
                .unwrap_or_default()
                .to_owned(),
            owner_name_1: field(&row, &columns, "owner_name_1")
                .unwrap_or_default()
                .to_owned(),
            owner_name_2: optional(&row, &columns, "owner_name_2"),
            address: field(&row, &columns, "address").unwrap_or_default().to_owned(),
            total_due: field(&row, &columns, "total_due")
                .and_then(normalize::parse_currency)
                .unwrap_or(0.0),
            years_delinquent: field(&row, &columns, "years_delinquent")
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.0),
            geo: optional(&row, &columns, "geo"),
        });
    }
    log::info!("loaded {} tax rows from {}", records.len(), path.display());
    Ok(records)
}
