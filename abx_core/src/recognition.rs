//! Prescription image recognition: the core's side of the contract.
//!
//! The recognizer itself (an external vision model behind an API key) lives
//! outside this crate and is reached through the [`Recognizer`] trait. This
//! module owns the prompt, parsing of the model's text payload, and pricing of
//! recognized items through the formulary. Any failure collapses to
//! [`RecognitionOutcome::NoItemsRecognized`]; a partially parsed item list is
//! never returned.

use crate::formulary::DrugLookup;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Instruction sent alongside the image
pub const RECOGNITION_PROMPT: &str = r#"You are a professional drug recognition system. Analyze this prescription image.
Reply with a plain JSON list only, without any markdown formatting.
Format: [{"code":"DRUG CODE IN UPPER CASE", "frequency":number, "total_amount":number}]
Example: [{"code":"AZI2", "frequency":1, "total_amount":3}]"#;

/// One item as returned by the recognizer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecognizedItem {
    pub code: String,
    /// Doses per day as read from the image; not interpreted by the core
    #[serde(default)]
    pub frequency: f64,
    #[serde(default)]
    pub total_amount: f64,
}

/// External image-to-items collaborator
pub trait Recognizer {
    fn recognize(&self, image: &[u8], credential: &str) -> Result<Vec<RecognizedItem>>;
}

/// Parse the model's text reply into items.
///
/// Markdown code fences are stripped and the outermost JSON list is parsed.
pub fn parse_recognition_payload(text: &str) -> Result<Vec<RecognizedItem>> {
    let cleaned = text.replace("```json", "").replace("```", "");
    let cleaned = cleaned.trim();

    let start = cleaned
        .find('[')
        .ok_or_else(|| Error::Recognition("No JSON list found in response".into()))?;
    let end = cleaned
        .rfind(']')
        .ok_or_else(|| Error::Recognition("No closing bracket found in response".into()))?;
    if end < start {
        return Err(Error::Recognition("Malformed JSON list in response".into()));
    }

    let items: Vec<RecognizedItem> = serde_json::from_str(&cleaned[start..=end])?;
    Ok(items)
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    text: Option<String>,
}

/// Pull the first candidate's text out of a generate-content response body
pub fn extract_candidate_text(response_body: &str) -> Result<String> {
    let response: GenerateContentResponse = serde_json::from_str(response_body)?;
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content.parts.into_iter().next())
        .and_then(|p| p.text)
        .ok_or_else(|| Error::Recognition("Response contains no candidate text".into()))
}

/// A recognized item resolved against the formulary
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RecognizedLine {
    pub code: String,
    pub name: String,
    pub total_amount: f64,
    pub subtotal: f64,
}

/// Priced recognition result
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RecognitionSummary {
    pub lines: Vec<RecognizedLine>,
    pub total_cost: f64,
    pub pricing_available: bool,
}

/// What the caller gets back from a recognition attempt
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RecognitionOutcome {
    Recognized(RecognitionSummary),
    NoItemsRecognized { reason: String },
}

/// Price recognized items through the formulary, preserving order
pub fn price_items(items: &[RecognizedItem], lookup: &dyn DrugLookup) -> RecognitionSummary {
    let lines: Vec<RecognizedLine> = items
        .iter()
        .map(|item| RecognizedLine {
            code: item.code.clone(),
            name: lookup.name(&item.code),
            total_amount: item.total_amount,
            subtotal: lookup.price(&item.code) * item.total_amount,
        })
        .collect();
    let total_cost: f64 = lines.iter().map(|l| l.subtotal).sum();

    RecognitionSummary {
        lines,
        total_cost,
        pricing_available: lookup.is_available(),
    }
}

/// Run the recognizer and price its items
///
/// A missing credential is rejected before the recognizer is called.
pub fn recognize_prescription(
    recognizer: &dyn Recognizer,
    image: &[u8],
    credential: Option<&str>,
    lookup: &dyn DrugLookup,
) -> RecognitionOutcome {
    let credential = match credential.map(str::trim) {
        Some(c) if !c.is_empty() => c,
        _ => {
            tracing::warn!("Recognition skipped: API key missing");
            return RecognitionOutcome::NoItemsRecognized {
                reason: "API key missing".into(),
            };
        }
    };

    match recognizer.recognize(image, credential) {
        Ok(items) if items.is_empty() => {
            tracing::info!("Recognizer returned no items");
            RecognitionOutcome::NoItemsRecognized {
                reason: "No items recognized".into(),
            }
        }
        Ok(items) => {
            tracing::info!("Recognized {} prescription items", items.len());
            RecognitionOutcome::Recognized(price_items(&items, lookup))
        }
        Err(e) => {
            tracing::warn!("Recognition failed: {}", e);
            RecognitionOutcome::NoItemsRecognized {
                reason: e.to_string(),
            }
        }
    }
}
