//! Report formatter: prices a plan through the formulary and renders the
//! prescription document.
//!
//! The document has fixed sections: header with weight, itemized drug list
//! with per-item warning markers, estimated cost, dose verification text,
//! and the clinician note. Line items keep the engine's order.

use crate::formulary::DrugLookup;
use crate::{PrescriptionPlan, PrescriptionReport, ReportStatus};
use std::fmt;

const WARNING_BANNER: &str =
    "> ⚠️ Caution: this prescription contains flagged drugs (e.g. G6PD deficiency / pediatric contraindications)!";
const PRICING_UNAVAILABLE: &str =
    "_Pricing and warning data unavailable: the cost above is not authoritative._";

/// One priced line of a report
#[derive(Clone, Debug, PartialEq)]
pub struct PricedLine {
    pub drug_code: String,
    pub display_name: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub warning: String,
}

impl PricedLine {
    pub fn cost(&self) -> f64 {
        self.unit_price * self.quantity
    }
}

/// Resolve price and warning for every line item, in order
pub fn price_lines(lookup: &dyn DrugLookup, plan: &PrescriptionPlan) -> Vec<PricedLine> {
    plan.line_items()
        .iter()
        .map(|item| PricedLine {
            drug_code: item.drug_code.clone(),
            display_name: item.display_name.clone(),
            quantity: item.quantity,
            unit_price: lookup.price(&item.drug_code),
            warning: lookup.warning(&item.drug_code),
        })
        .collect()
}

/// Render a plan into a prescription report
pub fn format(lookup: &dyn DrugLookup, plan: &PrescriptionPlan) -> PrescriptionReport {
    let lines = price_lines(lookup, plan);
    let total_cost: f64 = lines.iter().map(PricedLine::cost).sum();
    let has_warning = lines.iter().any(|l| !l.warning.is_empty());
    let pricing_available = lookup.is_available();

    if !pricing_available {
        tracing::warn!("Formatting report without formulary data; costs default to 0");
    }

    let body = ReportBody {
        plan,
        lines: &lines,
        total_cost,
        has_warning,
        pricing_available,
    }
    .to_string();

    PrescriptionReport {
        markdown_body: body,
        total_cost,
        has_warning,
        pricing_available,
        status: ReportStatus::Prescribed,
    }
}

struct ReportBody<'a> {
    plan: &'a PrescriptionPlan,
    lines: &'a [PricedLine],
    total_cost: f64,
    has_warning: bool,
    pricing_available: bool,
}

impl fmt::Display for ReportBody<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "### 💊 Prescription ({} days)", crate::COURSE_DAYS)?;
        writeln!(f, "**Weight:** {} kg", self.plan.weight())?;
        writeln!(f)?;
        writeln!(f, "**1. Total quantity (pharmacist to grind and divide):**")?;
        for line in self.lines {
            write!(f, "- **{}**: {} tab", line.display_name, line.quantity)?;
            if !line.warning.is_empty() {
                write!(f, "  ⛔ {}", line.warning)?;
            }
            writeln!(f)?;
        }
        writeln!(f, "**(Estimated drug cost: ${})**", self.total_cost.trunc())?;
        if !self.pricing_available {
            writeln!(f, "{}", PRICING_UNAVAILABLE)?;
        }
        if self.has_warning {
            writeln!(f)?;
            writeln!(f, "{}", WARNING_BANNER)?;
        }
        writeln!(f)?;
        writeln!(f, "**2. Dose verification:**")?;
        writeln!(f, "{}", self.plan.analysis())?;
        writeln!(f)?;
        writeln!(f, "**3. Clinician note:**")?;
        writeln!(f, "{}", self.plan.note())
    }
}

/// Explicit error report for a code with no dosing protocol
///
/// `pricing_available` still reflects the formulary, not the drug.
pub fn unknown_drug(lookup: &dyn DrugLookup, code: &str) -> PrescriptionReport {
    let code = code.trim();
    tracing::warn!("No dosing protocol for drug code {:?}", code);

    PrescriptionReport {
        markdown_body: format!("### ❌ Error: Unknown Drug\n\nNo dosing protocol for drug code `{}`.\n", code),
        total_cost: 0.0,
        has_warning: false,
        pricing_available: lookup.is_available(),
        status: ReportStatus::UnknownDrug {
            code: code.to_string(),
        },
    }
}
