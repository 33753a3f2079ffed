//! Post-processing of the agent's structured answer: code-fence stripping,
//! date normalization, and numeric coercion. All repairs are
//! non-destructive; a value the agent already filled in correctly is never
//! overwritten.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::schema::{ExtractionResult, RawAmount};

/// Date formats accepted when deriving `value_iso`, tried in order.
const DATE_FORMATS: [&str; 3] = ["%m/%d/%y", "%m/%d/%Y", "%Y-%m-%d"];

fn json_fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)```(?:json)?\s*(\{.*?\})\s*```").expect("fence regex is valid")
    })
}

/// Extracts the JSON object from text that may be wrapped in a
/// ```` ```json ... ``` ```` fence. Text without a fence is returned
/// trimmed.
pub fn extract_json(text: &str) -> &str {
    if text.is_empty() {
        return text;
    }
    match json_fence_re().captures(text).and_then(|c| c.get(1)) {
        Some(m) => m.as_str(),
        None => text.trim(),
    }
}

/// Converts common invoice date formats to ISO `YYYY-MM-DD`. Returns None
/// when no supported format matches.
pub fn normalize_date_to_iso(date_str: &str) -> Option<String> {
    let s = date_str.trim();
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date.format("%Y-%m-%d").to_string());
        }
    }
    None
}

/// Coerces an agent-supplied amount to a float. Numbers pass through;
/// strings are trimmed, stripped of thousands separators and one leading
/// currency symbol, then parsed. Anything else becomes None.
pub fn coerce_number(value: Option<&RawAmount>) -> Option<f64> {
    match value? {
        RawAmount::Number(n) => Some(*n),
        RawAmount::Text(s) => {
            let cleaned = s.trim().replace(',', "");
            let cleaned = cleaned.strip_prefix('$').unwrap_or(&cleaned);
            cleaned.trim().parse::<f64>().ok()
        }
    }
}

/// Repairs gaps in a parsed extraction result:
/// missing ISO dates are derived from `value`, and the three money fields
/// are coerced to plain numbers.
pub fn normalize_extraction(result: &mut ExtractionResult) {
    let fields = &mut result.fields;

    for date_field in [&mut fields.invoice_date, &mut fields.due_date] {
        if date_field.value_iso.is_none() {
            if let Some(value) = &date_field.value {
                date_field.value_iso = normalize_date_to_iso(value);
            }
        }
    }

    for amount_field in [&mut fields.tax, &mut fields.total, &mut fields.balance_due] {
        amount_field.value = coerce_number(amount_field.value.as_ref()).map(RawAmount::Number);
    }
}
