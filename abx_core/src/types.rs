//! Core domain types for the dosing calculator.
//!
//! This module defines the values passed between the engine, the formulary
//! and the report formatter:
//! - Validated body weight
//! - Formulary records
//! - Dose line items and prescription plans
//! - Clinical notes as named outcomes
//! - Rendered prescription reports

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of days every prescription is dispensed for
pub const COURSE_DAYS: f64 = 3.0;

// ============================================================================
// Patient Input
// ============================================================================

/// Body weight in kilograms, guaranteed positive and finite
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct BodyWeight(f64);

impl BodyWeight {
    /// Validate a raw weight. Non-positive, NaN or infinite values are rejected,
    /// never clamped.
    pub fn new(kg: f64) -> Result<Self> {
        if kg.is_finite() && kg > 0.0 {
            Ok(Self(kg))
        } else {
            Err(Error::InvalidWeight(kg))
        }
    }

    pub fn kg(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for BodyWeight {
    type Error = Error;

    fn try_from(kg: f64) -> Result<Self> {
        Self::new(kg)
    }
}

impl fmt::Display for BodyWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Formulary Types
// ============================================================================

/// One row of the formulary dataset
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DrugRecord {
    /// Upper-cased, trimmed drug code
    pub code: String,
    pub name: String,
    /// Price per dispensed unit, never negative
    pub unit_price: f64,
    /// Safety warning, empty when the drug has none
    pub warning: String,
}

impl DrugRecord {
    pub fn new(code: impl Into<String>, name: impl Into<String>, unit_price: f64) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            unit_price,
            warning: String::new(),
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warning = warning.into();
        self
    }
}

// ============================================================================
// Engine Output
// ============================================================================

/// A quantity of one dispensable product
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct DoseLineItem {
    pub drug_code: String,
    pub display_name: String,
    /// Tablet count over the whole course; may be a multiple of 0.5
    pub quantity: f64,
}

impl DoseLineItem {
    pub(crate) fn new(drug_code: &str, display_name: &str, quantity: f64) -> Self {
        Self {
            drug_code: drug_code.to_string(),
            display_name: display_name.to_string(),
            quantity: quantity.max(0.0),
        }
    }
}

/// Treatment target for the amoxicillin/clavulanate protocol
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AmoxClavMode {
    /// 80 mg/kg/day amoxicillin at a 14:1 amoxicillin:clavulanate ratio
    #[default]
    HighDose,
    /// 45 mg/kg/day amoxicillin, clavulanate at 6.4 mg/kg/day
    StandardDose,
}

impl AmoxClavMode {
    /// Clinical label shown in the confirmation note
    pub fn label(self) -> &'static str {
        match self {
            AmoxClavMode::HighDose => "acute sinusitis (80 mg/kg)",
            AmoxClavMode::StandardDose => "standard dose (45 mg/kg)",
        }
    }
}

impl FromStr for AmoxClavMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "high" | "high_dose" | "high-dose" | "80" => Ok(AmoxClavMode::HighDose),
            "std" | "standard" | "standard_dose" | "standard-dose" | "45" => {
                Ok(AmoxClavMode::StandardDose)
            }
            other => Err(Error::Config(format!(
                "Unknown amoxicillin/clavulanate mode: {}",
                other
            ))),
        }
    }
}

/// The rule a protocol applied, rendered to text only at report time
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClinicalNote {
    /// Fixed adult amoxicillin/clavulanate regimen was dispensed
    AdultCeilingReached,
    /// Weight-based amoxicillin/clavulanate regimen matching the selected mode
    AmoxClavModeConfirmed {
        mode: AmoxClavMode,
        probiotic_advisory: bool,
    },
    PediatricJointRisk,
    G6pdContraindicated,
    AdultDose,
    OnceDaily,
    StandardDose,
    FourTimesDaily,
    NotUnderAgeEight,
}

impl fmt::Display for ClinicalNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClinicalNote::AdultCeilingReached => write!(f, "Adult ceiling dose reached."),
            ClinicalNote::AmoxClavModeConfirmed {
                mode,
                probiotic_advisory,
            } => {
                write!(f, "Meets {}.", mode.label())?;
                if *probiotic_advisory {
                    write!(
                        f,
                        " Clavulanate dose is slightly high; consider pairing with a probiotic."
                    )?;
                }
                Ok(())
            }
            ClinicalNote::PediatricJointRisk => {
                write!(f, "⚠️ Pediatric use requires assessment of joint risk.")
            }
            ClinicalNote::G6pdContraindicated => {
                write!(f, "⚠️ Contraindicated in G6PD deficiency.")
            }
            ClinicalNote::AdultDose => write!(f, "Adult dose."),
            ClinicalNote::OnceDaily => write!(f, "Usage: QD (once daily)."),
            ClinicalNote::StandardDose => write!(f, "Standard dose."),
            ClinicalNote::FourTimesDaily => write!(f, "Divide into 4 doses per day (QID)."),
            ClinicalNote::NotUnderAgeEight => {
                write!(f, "⚠️ Not recommended under 8 years of age.")
            }
        }
    }
}

/// Result of one dosing calculation, consumed by the report formatter
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct PrescriptionPlan {
    weight: BodyWeight,
    line_items: Vec<DoseLineItem>,
    analysis: String,
    note: ClinicalNote,
}

impl PrescriptionPlan {
    pub(crate) fn new(
        weight: BodyWeight,
        line_items: Vec<DoseLineItem>,
        analysis: String,
        note: ClinicalNote,
    ) -> Self {
        Self {
            weight,
            line_items,
            analysis,
            note,
        }
    }

    pub fn weight(&self) -> BodyWeight {
        self.weight
    }

    /// Line items in dispensing priority order
    pub fn line_items(&self) -> &[DoseLineItem] {
        &self.line_items
    }

    /// Dose verification narrative
    pub fn analysis(&self) -> &str {
        &self.analysis
    }

    pub fn note(&self) -> &ClinicalNote {
        &self.note
    }
}

// ============================================================================
// Report Types
// ============================================================================

/// Whether a report carries a prescription or an explicit error marker
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReportStatus {
    Prescribed,
    UnknownDrug { code: String },
}

/// Renderable prescription document
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct PrescriptionReport {
    pub markdown_body: String,
    /// Unrounded sum of unit price times quantity
    pub total_cost: f64,
    pub has_warning: bool,
    /// False when the formulary was unavailable and prices defaulted to 0
    pub pricing_available: bool,
    pub status: ReportStatus,
}

impl PrescriptionReport {
    pub fn is_unknown_drug(&self) -> bool {
        matches!(self.status, ReportStatus::UnknownDrug { .. })
    }
}
