//! Calculation entry points for an embedding surface.
//!
//! Each entry validates the raw weight, runs one protocol and formats the
//! result against the injected formulary.

use crate::engine::{self, Protocol};
use crate::formulary::DrugLookup;
use crate::report;
use crate::{AmoxClavMode, BodyWeight, Error, PrescriptionPlan, PrescriptionReport, Result};

/// Dosing engine and report formatter bound to one formulary
#[derive(Clone, Copy)]
pub struct Calculator<'a> {
    lookup: &'a dyn DrugLookup,
}

impl<'a> Calculator<'a> {
    pub fn new(lookup: &'a dyn DrugLookup) -> Self {
        Self { lookup }
    }

    /// Report for a drug code
    ///
    /// An invalid weight is an error; an unrecognized code yields the explicit
    /// unknown-drug report.
    pub fn prescribe(&self, code: &str, weight_kg: f64, mode: AmoxClavMode) -> Result<PrescriptionReport> {
        let weight = BodyWeight::new(weight_kg)?;
        match engine::calculate(code, weight, mode) {
            Ok(plan) => Ok(self.render(&plan)),
            Err(Error::UnknownDrug(code)) => Ok(report::unknown_drug(self.lookup, &code)),
            Err(e) => Err(e),
        }
    }

    /// Report for a protocol chosen from [`Protocol::ALL`]
    pub fn prescribe_protocol(
        &self,
        protocol: Protocol,
        weight_kg: f64,
        mode: AmoxClavMode,
    ) -> Result<PrescriptionReport> {
        let weight = BodyWeight::new(weight_kg)?;
        Ok(self.render(&engine::calculate_protocol(protocol, weight, mode)))
    }

    pub fn amoxicillin_clavulanate(&self, weight_kg: f64, mode: AmoxClavMode) -> Result<PrescriptionReport> {
        self.run(weight_kg, |w| engine::amoxicillin_clavulanate(w, mode))
    }

    pub fn azithromycin(&self, weight_kg: f64) -> Result<PrescriptionReport> {
        self.run(weight_kg, engine::azithromycin)
    }

    pub fn ciprofloxacin(&self, weight_kg: f64) -> Result<PrescriptionReport> {
        self.run(weight_kg, engine::ciprofloxacin)
    }

    pub fn amoxicillin(&self, weight_kg: f64) -> Result<PrescriptionReport> {
        self.run(weight_kg, engine::amoxicillin)
    }

    pub fn cephalexin(&self, weight_kg: f64) -> Result<PrescriptionReport> {
        self.run(weight_kg, engine::cephalexin)
    }

    pub fn trimethoprim_sulfa(&self, weight_kg: f64) -> Result<PrescriptionReport> {
        self.run(weight_kg, engine::trimethoprim_sulfa)
    }

    pub fn doxycycline(&self, weight_kg: f64) -> Result<PrescriptionReport> {
        self.run(weight_kg, engine::doxycycline)
    }

    pub fn unknown_drug(&self, code: &str) -> PrescriptionReport {
        report::unknown_drug(self.lookup, code)
    }

    fn run(
        &self,
        weight_kg: f64,
        protocol: impl FnOnce(BodyWeight) -> PrescriptionPlan,
    ) -> Result<PrescriptionReport> {
        let weight = BodyWeight::new(weight_kg)?;
        Ok(self.render(&protocol(weight)))
    }

    fn render(&self, plan: &PrescriptionPlan) -> PrescriptionReport {
        report::format(self.lookup, plan)
    }
}
