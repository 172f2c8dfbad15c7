#![forbid(unsafe_code)]

//! Weight-based antibiotic dosing calculator.
//!
//! This crate provides:
//! - Formulary lookup (price, name, warning per drug code)
//! - Dosing engine (one protocol per antibiotic, 3-day courses)
//! - Pack-size selection between tablet strengths
//! - Prescription report formatting
//! - The core's side of image-based prescription recognition
//!
//! Typical use: load the formulary once at startup, then build reports
//! through a [`Calculator`] bound to it.
//!
//! ```no_run
//! use abx_core::{formulary, AmoxClavMode, Calculator, Config};
//!
//! let config = Config::load()?;
//! let formulary = formulary::init_global(&config.data.formulary_path);
//! let report = Calculator::new(formulary).prescribe("AMO1", 18.0, AmoxClavMode::HighDose)?;
//! println!("{}", report.markdown_body);
//! # Ok::<(), abx_core::Error>(())
//! ```

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod formulary;
pub mod packs;
pub mod engine;
pub mod report;
pub mod calculator;
pub mod recognition;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use formulary::{DrugLookup, Formulary};
pub use packs::{choose_pack, PackChoice, SwitchPolicy, TabletStrength};
pub use engine::{calculate, Protocol};
pub use calculator::Calculator;
pub use recognition::{recognize_prescription, RecognitionOutcome, RecognizedItem, Recognizer};
