use chrono::Utc;
use serde_json::Value;

use crate::error::FetchError;
use crate::models::TenderRecord;
use crate::normalize::{parse_datetime, parse_money};

/// Extract a string-ish field, stringifying numbers the way loosely typed
/// sources hand out ids. Empty strings count as absent so fallback chains
/// can skip them.
fn string_field(item: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
    match item.get(key) {
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

fn money_field(item: &serde_json::Map<String, Value>, key: &str) -> Option<f64> {
    match item.get(key) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => parse_money(s),
        _ => None,
    }
}

/// Parse a JSON payload into canonical tender records.
///
/// Accepts either a top-level array of items or an object exposing an
/// `items` array. Non-object entries carry no usable fields and are skipped.
pub fn parse_payload(raw_json: &str, source: &str) -> Result<Vec<TenderRecord>, FetchError> {
    let data: Value = serde_json::from_str(raw_json)?;

    let items: Vec<Value> = match data {
        Value::Array(items) => items,
        Value::Object(map) => match map.get("items").and_then(Value::as_array) {
            Some(items) => items.clone(),
            None => Vec::new(),
        },
        other => {
            return Err(FetchError::Payload(format!(
                "expected a JSON array or object at the top level, got {}",
                json_type_name(&other)
            )))
        }
    };

    let ingested_at = Utc::now();
    let mut tenders = Vec::with_capacity(items.len());

    for item in &items {
        let Some(item) = item.as_object() else {
            continue;
        };

        let published_at = string_field(item, "published_at")
            .as_deref()
            .and_then(parse_datetime)
            .unwrap_or(ingested_at);

        // Identifier fallback chain: external_id, id, link, then the
        // resolved publish time as a last resort.
        let external_id = string_field(item, "external_id")
            .or_else(|| string_field(item, "id"))
            .or_else(|| string_field(item, "link"))
            .unwrap_or_else(|| published_at.to_rfc3339());

        tenders.push(TenderRecord {
            external_id,
            title: string_field(item, "title").unwrap_or_default(),
            summary: string_field(item, "summary").unwrap_or_default(),
            link: string_field(item, "link").unwrap_or_default(),
            published_at,
            deadline_at: string_field(item, "deadline_at")
                .as_deref()
                .and_then(parse_datetime),
            buyer_name: string_field(item, "buyer_name").unwrap_or_default(),
            region: string_field(item, "region").unwrap_or_default(),
            cpv: string_field(item, "cpv").unwrap_or_default(),
            budget_amount: money_field(item, "budget_amount"),
            source: source.to_string(),
        });
    }

    Ok(tenders)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
