//! Normalization of upstream extraction payloads into the canonical
//! line-item shape.
//!
//! The extraction service returns line items in one of several envelope
//! shapes and with loosely-typed fields (numbers as strings, missing
//! identifiers, absent totals). [`normalize`] reconciles a raw payload into
//! one canonical mapping; [`into_extraction_result`] then projects it onto
//! the typed [`ExtractionResult`]. Field-level repair never fails a
//! response: unparseable numerics degrade to `0`.

use serde_json::{Map, Number, Value};

use crate::error::ExtractError;
use crate::types::{ExtractionResult, LineItem};

/// Fields coerced from strings to floats during repair.
const NUMERIC_FIELDS: &[&str] = &[
    "quantity",
    "unit_price",
    "total_value",
    "net_weight",
    "gross_weight",
];

/// Candidate identifier keys, checked in order.
///
/// Exactly these casings are recognized — `sku`, `part_number`, and
/// uppercase `SKU` have all been observed in upstream payloads. Other
/// variants (`Sku`, `SKU_CODE`) are not checked and trigger backfill.
const IDENTIFIER_KEYS: &[&str] = &["sku", "part_number", "SKU"];

/// One accepted upstream envelope shape: returns the mapping that owns the
/// line items together with the item sequence, or `None` if the shape does
/// not match.
type ShapeStrategy = fn(&Value) -> Option<(Map<String, Value>, Vec<Value>)>;

/// Accepted upstream shapes in priority order; the first match wins.
const SHAPE_STRATEGIES: &[ShapeStrategy] = &[top_level_items, nested_data_items, bare_array];

/// Top-level `line_items` holding a non-empty array.
fn top_level_items(raw: &Value) -> Option<(Map<String, Value>, Vec<Value>)> {
    let scope = raw.as_object()?;
    let items = scope.get("line_items")?.as_array()?;
    if items.is_empty() {
        return None;
    }
    Some((scope.clone(), items.clone()))
}

/// Nested `data.line_items` holding a non-empty array. The `data` mapping
/// becomes the output scope; its siblings are discarded.
fn nested_data_items(raw: &Value) -> Option<(Map<String, Value>, Vec<Value>)> {
    let scope = raw.get("data")?.as_object()?;
    let items = scope.get("line_items")?.as_array()?;
    if items.is_empty() {
        return None;
    }
    Some((scope.clone(), items.clone()))
}

/// The whole payload is the item sequence (possibly empty).
fn bare_array(raw: &Value) -> Option<(Map<String, Value>, Vec<Value>)> {
    let items = raw.as_array()?;
    Some((Map::new(), items.clone()))
}

/// Reconciles a raw upstream payload into the canonical mapping: the
/// resolved scope with `line_items` replaced by the repaired sequence and
/// all sibling keys passed through unchanged.
///
/// Applying `normalize` to its own output yields an identical value.
///
/// # Errors
///
/// Returns [`ExtractError::MalformedResponse`] when no recognizable
/// line-item sequence is present.
pub fn normalize(raw: &Value) -> Result<Value, ExtractError> {
    let (mut scope, items) = SHAPE_STRATEGIES
        .iter()
        .find_map(|strategy| strategy(raw))
        .ok_or_else(|| ExtractError::MalformedResponse("line_items array not found".to_string()))?;

    let repaired: Vec<Value> = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| repair_item(item, index))
        .collect();

    scope.insert("line_items".to_string(), Value::Array(repaired));
    Ok(Value::Object(scope))
}

/// Repairs one line item at `index` (0-based) in three fixed steps:
/// identifier backfill, numeric coercion, total derivation.
///
/// Non-object items are returned untouched; the typed conversion rejects
/// them later with positional context.
fn repair_item(item: Value, index: usize) -> Value {
    let Value::Object(mut fields) = item else {
        return item;
    };

    if !IDENTIFIER_KEYS
        .iter()
        .any(|key| fields.get(*key).is_some_and(is_truthy))
    {
        fields.insert(
            "sku".to_string(),
            Value::String(format!("ITEM-{}", index + 1)),
        );
    }

    for field in NUMERIC_FIELDS {
        let parsed = match fields.get(*field) {
            Some(Value::String(raw)) => Some(parse_or_default(raw, 0.0)),
            _ => None,
        };
        if let Some(value) = parsed {
            fields.insert((*field).to_string(), number_value(value));
        }
    }

    // Derivation runs strictly after coercion, so string quantities and
    // prices have already been converted.
    if !fields.get("total_value").is_some_and(is_truthy) {
        let quantity = truthy_number(fields.get("quantity"));
        let unit_price = truthy_number(fields.get("unit_price"));
        if let (Some(quantity), Some(unit_price)) = (quantity, unit_price) {
            fields.insert("total_value".to_string(), number_value(quantity * unit_price));
        }
    }

    Value::Object(fields)
}

/// Truthiness as the upstream contract defines it: `null`, `false`, `0`,
/// `""`, `[]`, and `{}` are falsy; everything else is truthy.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// The value as a non-zero float, or `None`.
fn truthy_number(value: Option<&Value>) -> Option<f64> {
    value.and_then(Value::as_f64).filter(|f| *f != 0.0)
}

/// Parses a trimmed string as a finite float, yielding `default` on any
/// failure. Never errors: a malformed numeric field degrades rather than
/// aborting the response.
#[must_use]
pub fn parse_or_default(raw: &str, default: f64) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .unwrap_or(default)
}

/// Wraps a float in a JSON number, falling back to `0` for values JSON
/// cannot represent.
fn number_value(value: f64) -> Value {
    Number::from_f64(value).map_or_else(|| Value::from(0), Value::Number)
}

/// Projects a normalized mapping onto the typed [`ExtractionResult`]:
/// `line_items` deserialized with canonical defaults, `metadata` and
/// `error` carried over, other keys dropped.
///
/// # Errors
///
/// Returns [`ExtractError::MalformedResponse`] if `line_items` is missing
/// or an item cannot be deserialized (e.g. a non-object array element).
pub fn into_extraction_result(normalized: Value) -> Result<ExtractionResult, ExtractError> {
    let Value::Object(mut scope) = normalized else {
        return Err(ExtractError::MalformedResponse(
            "normalized payload is not an object".to_string(),
        ));
    };

    let items = match scope.remove("line_items") {
        Some(Value::Array(items)) => items,
        _ => {
            return Err(ExtractError::MalformedResponse(
                "line_items array not found".to_string(),
            ))
        }
    };

    let line_items = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value::<LineItem>(item)
                .map_err(|e| ExtractError::MalformedResponse(format!("line item {index}: {e}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let metadata = match scope.remove("metadata") {
        Some(Value::Object(map)) => Some(map),
        _ => None,
    };
    let error = match scope.remove("error") {
        Some(Value::String(message)) => Some(message),
        _ => None,
    };

    Ok(ExtractionResult {
        line_items,
        metadata,
        error,
    })
}
