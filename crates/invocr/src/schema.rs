//! Typed contract for the agent's structured answer.
//!
//! The agent must emit exactly one JSON object with nine named invoice
//! fields; anything missing or extra is rejected at parse time rather than
//! passed through unchecked. The dedicated no-document answer form parses
//! into its own variant.

use serde::{Deserialize, Serialize};

use crate::normalize::extract_json;

/// A field value carrying a text payload (invoice number, names, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TextField {
    pub value: Option<String>,
    pub evidence: String,
    pub confidence: f64,
    pub extraction_method: String,
}

/// A date field; `value_iso` holds the `YYYY-MM-DD` rendering when
/// derivable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DateField {
    pub value: Option<String>,
    #[serde(default)]
    pub value_iso: Option<String>,
    pub evidence: String,
    pub confidence: f64,
    pub extraction_method: String,
}

/// A money field. The agent is told to return raw numbers but sometimes
/// returns formatted currency strings; both shapes parse, and
/// normalization settles them to numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AmountField {
    #[serde(default)]
    pub value: Option<RawAmount>,
    pub evidence: String,
    pub confidence: f64,
    pub extraction_method: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    Number(f64),
    Text(String),
}

/// The nine invoice fields the schema contract names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InvoiceFields {
    pub invoice_number: TextField,
    pub purchase_order_number: TextField,
    pub invoice_date: DateField,
    pub due_date: DateField,
    pub vendor_name: TextField,
    pub customer_name: TextField,
    pub tax: AmountField,
    pub total: AmountField,
    pub balance_due: AmountField,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtractionResult {
    pub document_type: String,
    pub fields: InvoiceFields,
}

/// Answer the agent returns when `get_full_text` reported an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NoDocumentAnswer {
    pub error: String,
    pub details: String,
    pub document_type: String,
    pub fields: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AgentAnswer {
    Extraction(ExtractionResult),
    NoDocument(NoDocumentAnswer),
}

/// Parses the agent's raw answer: strips an optional code fence, checks
/// JSON syntax, then validates against the schema. The `error` key routes
/// to the no-document form.
pub fn parse_agent_answer(raw: &str) -> Result<AgentAnswer, serde_json::Error> {
    let stripped = extract_json(raw);
    let value: serde_json::Value = serde_json::from_str(stripped)?;

    if value.get("error").is_some() {
        Ok(AgentAnswer::NoDocument(serde_json::from_value(value)?))
    } else {
        Ok(AgentAnswer::Extraction(serde_json::from_value(value)?))
    }
}
