//! ledger-scan: batch pattern analysis over municipal license, contract
//! and tax-delinquency exports.
//!
//! Usage:
//!   ledger-scan --licenses licenses.csv
//!   ledger-scan --licenses licenses.csv --contracts contracts.csv \
//!       --taxes taxes.csv --output report.txt --json report.json

use anyhow::{bail, Result};
use civicledger_core::{
    AnalysisConfig, ContractTable, CrossDatasetEngine, LicenseTable, PatternEngine, TaxTable,
};
use std::env;
use std::fs;
use std::path::Path;

mod loader;
mod report;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let licenses_path = match path_arg(&args, "--licenses") {
        Some(p) => p,
        None => {
            eprintln!("usage: ledger-scan --licenses FILE [--contracts FILE --taxes FILE]");
            eprintln!("                   [--output FILE] [--json FILE] [--limit N]");
            eprintln!("                   [--address-threshold N] [--name-similarity X]");
            eprintln!("                   [--temporal-window DAYS] [--temporal-threshold N]");
            eprintln!("                   [--zip-threshold N] [--bucket-names]");
            bail!("--licenses is required");
        }
    };
    let contracts_path = path_arg(&args, "--contracts");
    let taxes_path = path_arg(&args, "--taxes");
    let output_path = path_arg(&args, "--output");
    let json_path = path_arg(&args, "--json");
    let limit = parse_arg(&args, "--limit", 20usize);

    if contracts_path.is_some() != taxes_path.is_some() {
        bail!("--contracts and --taxes must be given together");
    }

    let defaults = AnalysisConfig::default();
    let config = AnalysisConfig {
        address_threshold: parse_arg(&args, "--address-threshold", defaults.address_threshold),
        name_similarity_threshold: parse_arg(
            &args,
            "--name-similarity",
            defaults.name_similarity_threshold,
        ),
        dba_min_count: parse_arg(&args, "--dba-min-count", defaults.dba_min_count),
        temporal_window_days: parse_arg(&args, "--temporal-window", defaults.temporal_window_days),
        temporal_threshold: parse_arg(&args, "--temporal-threshold", defaults.temporal_threshold),
        zip_threshold: parse_arg(&args, "--zip-threshold", defaults.zip_threshold),
        cross_name_similarity_threshold: parse_arg(
            &args,
            "--cross-name-similarity",
            defaults.cross_name_similarity_threshold,
        ),
        contract_short_duration_days: parse_arg(
            &args,
            "--short-duration",
            defaults.contract_short_duration_days,
        ),
        bucket_by_first_letter: args.iter().any(|a| a == "--bucket-names"),
    };

    let licenses = LicenseTable::new(loader::load_licenses(Path::new(&licenses_path))?)?;

    let engine = PatternEngine::new(config.clone())?;
    let license_report = engine.run_all(&licenses);

    let mut text = report::render_license_report(&license_report, limit);

    let cross_report = match (&contracts_path, &taxes_path) {
        (Some(contracts), Some(taxes)) => {
            let contracts = ContractTable::new(loader::load_contracts(Path::new(contracts))?);
            let taxes = TaxTable::new(loader::load_taxes(Path::new(taxes))?);
            let cross_engine = CrossDatasetEngine::new(config)?;
            let cross = cross_engine.run_all(&licenses, &contracts, &taxes);
            text.push_str(&report::render_cross_report(&cross, limit));
            Some(cross)
        }
        _ => None,
    };

    match &output_path {
        Some(path) => {
            fs::write(path, &text)?;
            log::info!("report written to {}", path);
        }
        None => print!("{text}"),
    }

    if let Some(path) = &json_path {
        let export = report::JsonExport {
            licenses: &license_report,
            cross_dataset: cross_report.as_ref(),
        };
        fs::write(path, serde_json::to_string_pretty(&export)?)?;
        log::info!("json written to {}", path);
    }

    Ok(())
}

fn path_arg(args: &[String], flag: &str) -> Option<String> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].clone())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
