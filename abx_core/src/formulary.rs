//! Formulary lookup: drug code to price, display name and safety warning.
//!
//! The dataset is a CSV table keyed by drug code. It is loaded once at
//! startup and is read-only afterwards. Loading fails soft: an unreadable or
//! malformed file yields an empty formulary so dosing keeps working, and
//! callers can tell "formulary unavailable" apart from "drug not found"
//! through [`DrugLookup::is_available`].

use crate::{DrugRecord, Error, Result};
use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

/// Process-wide formulary, installed once at startup
static GLOBAL_FORMULARY: OnceCell<Formulary> = OnceCell::new();

/// Accepted header names per column (English and Chinese)
const CODE_HEADERS: &[&str] = &["code", "drug_code", "藥代"];
const PRICE_HEADERS: &[&str] = &["price", "unit_price", "健保價"];
const NAME_HEADERS: &[&str] = &["name", "drug_name", "藥名"];
const WARNING_HEADERS: &[&str] = &["warning", "警語"];

/// Read-only drug lookup used by the report formatter and recognition pricing
///
/// All lookups are total: an absent code yields price 0, the code itself as
/// name, and an empty warning.
pub trait DrugLookup {
    /// Find the record for a code (codes are case-normalized before lookup)
    fn record(&self, code: &str) -> Option<&DrugRecord>;

    /// False when the backing dataset is empty or failed to load
    fn is_available(&self) -> bool;

    fn price(&self, code: &str) -> f64 {
        self.record(code).map(|r| r.unit_price).unwrap_or(0.0)
    }

    fn name(&self, code: &str) -> String {
        self.record(code)
            .map(|r| r.name.clone())
            .unwrap_or_else(|| code.to_string())
    }

    fn warning(&self, code: &str) -> String {
        self.record(code)
            .map(|r| r.warning.clone())
            .unwrap_or_default()
    }
}

/// Normalize a drug code the way the dataset keys are stored
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// In-memory formulary table keyed by normalized drug code
#[derive(Clone, Debug, Default)]
pub struct Formulary {
    records: HashMap<String, DrugRecord>,
}

impl Formulary {
    /// An empty (unavailable) formulary
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from records; later duplicates replace earlier ones
    pub fn from_records(records: impl IntoIterator<Item = DrugRecord>) -> Self {
        let mut formulary = Self::new();
        for record in records {
            formulary.insert(record);
        }
        formulary
    }

    fn insert(&mut self, mut record: DrugRecord) {
        record.code = normalize_code(&record.code);
        if let Some(previous) = self.records.insert(record.code.clone(), record) {
            tracing::debug!("Duplicate formulary code {}, keeping last row", previous.code);
        }
    }

    /// Load the dataset at `path`, degrading to an empty formulary on any failure
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(formulary) => {
                tracing::info!("Loaded {} drugs from {:?}", formulary.len(), path);
                formulary
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to load formulary from {:?}: {}. Prices and warnings unavailable.",
                    path,
                    e
                );
                Self::new()
            }
        }
    }

    /// Load the dataset at `path`, reporting failures
    pub fn try_load(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Parse CSV formulary data
    ///
    /// Malformed cells are coerced: a non-numeric or negative price becomes 0,
    /// a missing warning column or cell becomes an empty warning. Rows without
    /// a code are skipped.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_lowercase())
            .collect();

        let column = |aliases: &[&str]| headers.iter().position(|h| aliases.contains(&h.as_str()));

        let code_idx = column(CODE_HEADERS)
            .ok_or_else(|| Error::Formulary("dataset has no drug code column".into()))?;
        let price_idx = column(PRICE_HEADERS);
        let name_idx = column(NAME_HEADERS);
        let warning_idx = column(WARNING_HEADERS);

        let mut formulary = Self::new();

        for (line, row) in csv_reader.records().enumerate() {
            let row = match row {
                Ok(row) => row,
                Err(e) => {
                    tracing::warn!("Skipping unreadable formulary row {}: {}", line + 2, e);
                    continue;
                }
            };

            let cell = |idx: Option<usize>| idx.and_then(|i| row.get(i)).unwrap_or("");

            let code = normalize_code(cell(Some(code_idx)));
            if code.is_empty() {
                tracing::warn!("Skipping formulary row {} without a drug code", line + 2);
                continue;
            }

            let unit_price = coerce_price(cell(price_idx));
            let name = match cell(name_idx) {
                "" => code.clone(),
                name => name.to_string(),
            };

            formulary.insert(DrugRecord {
                code,
                name,
                unit_price,
                warning: cell(warning_idx).to_string(),
            });
        }

        Ok(formulary)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Human-readable load status for an embedding surface
    pub fn status_line(&self) -> String {
        if self.is_empty() {
            "Formulary unavailable: check that drug_database.csv is present".to_string()
        } else {
            format!("Formulary: {} drugs loaded", self.len())
        }
    }

    /// Iterate records in code order
    pub fn records(&self) -> impl Iterator<Item = &DrugRecord> {
        let mut records: Vec<_> = self.records.values().collect();
        records.sort_by(|a, b| a.code.cmp(&b.code));
        records.into_iter()
    }
}

impl DrugLookup for Formulary {
    fn record(&self, code: &str) -> Option<&DrugRecord> {
        self.records.get(&normalize_code(code))
    }

    fn is_available(&self) -> bool {
        !self.is_empty()
    }
}

fn coerce_price(raw: &str) -> f64 {
    match raw.replace(',', "").parse::<f64>() {
        Ok(price) if price.is_finite() && price >= 0.0 => price,
        Ok(price) => {
            tracing::warn!("Coercing out-of-range formulary price {} to 0", price);
            0.0
        }
        Err(_) => {
            if !raw.is_empty() {
                tracing::debug!("Coercing non-numeric formulary price {:?} to 0", raw);
            }
            0.0
        }
    }
}

/// Load the process-wide formulary from `path` on first call
///
/// Subsequent calls return the already-installed formulary and ignore `path`.
pub fn init_global(path: &Path) -> &'static Formulary {
    GLOBAL_FORMULARY.get_or_init(|| Formulary::load(path))
}

/// The process-wide formulary, if [`init_global`] has run
pub fn global() -> Option<&'static Formulary> {
    GLOBAL_FORMULARY.get()
}
