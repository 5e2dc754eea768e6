//! Result contract validation.
//!
//! The [`crate::models::PayrollResult`] shape is the crate's bit-exact
//! boundary. [`validate`] checks untyped result data — e.g. a record read
//! back from an external cache — against that contract before it is handed
//! to reporting code. Violations indicate a programming defect upstream and
//! are raised, never swallowed.

use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::str::FromStr;

use crate::error::{EngineError, EngineResult};
use crate::models::PayrollResult;

const REQUIRED_FIELDS: [&str; 8] = [
    "total_salary",
    "total_hours",
    "regular_hours",
    "overtime_hours",
    "holiday_hours",
    "shabbat_hours",
    "breakdown",
    "metadata",
];

const DECIMAL_FIELDS: [&str; 6] = [
    "total_salary",
    "total_hours",
    "regular_hours",
    "overtime_hours",
    "holiday_hours",
    "shabbat_hours",
];

/// Validates untyped result data against the [`PayrollResult`] contract.
///
/// Monetary and hour fields are coerced to exact decimals from either
/// string or numeric JSON forms; everything else must already have the
/// contract's shape.
///
/// # Errors
///
/// Returns [`EngineError::ValidationError`] when required fields are
/// missing, a monetary field cannot be converted to a decimal, or
/// `breakdown`/`metadata` are not mappings.
pub fn validate(value: &Value) -> EngineResult<PayrollResult> {
    let Some(object) = value.as_object() else {
        return Err(EngineError::ValidationError {
            message: "result must be a mapping".to_string(),
        });
    };

    let missing: Vec<&str> = REQUIRED_FIELDS
        .iter()
        .filter(|field| !object.contains_key(**field))
        .copied()
        .collect();
    if !missing.is_empty() {
        return Err(EngineError::ValidationError {
            message: format!("Missing required fields: {}", missing.join(", ")),
        });
    }

    let Some(breakdown) = object["breakdown"].as_object() else {
        return Err(EngineError::ValidationError {
            message: "breakdown must be a mapping".to_string(),
        });
    };
    if !object["metadata"].is_object() {
        return Err(EngineError::ValidationError {
            message: "metadata must be a mapping".to_string(),
        });
    }

    let mut coerced = object.clone();
    for field in DECIMAL_FIELDS {
        let decimal = coerce_decimal(&object[field], field)?;
        coerced.insert(field.to_string(), Value::String(decimal.to_string()));
    }
    coerced.insert(
        "breakdown".to_string(),
        Value::Object(coerce_breakdown(breakdown)?),
    );

    serde_json::from_value(Value::Object(coerced)).map_err(|e| EngineError::ValidationError {
        message: format!("result does not match the contract: {}", e),
    })
}

/// Coerces each tier entry's `hours`/`pay` to decimal string form.
fn coerce_breakdown(breakdown: &Map<String, Value>) -> EngineResult<Map<String, Value>> {
    let mut out = Map::new();
    for (tier, entry) in breakdown {
        let Some(fields) = entry.as_object() else {
            return Err(EngineError::ValidationError {
                message: format!("breakdown entry '{}' must be a mapping", tier),
            });
        };
        let mut coerced = fields.clone();
        for field in ["hours", "pay"] {
            if let Some(value) = fields.get(field) {
                let decimal = coerce_decimal(value, &format!("breakdown.{}.{}", tier, field))?;
                coerced.insert(field.to_string(), Value::String(decimal.to_string()));
            }
        }
        out.insert(tier.clone(), Value::Object(coerced));
    }
    Ok(out)
}

fn coerce_decimal(value: &Value, field: &str) -> EngineResult<Decimal> {
    let parsed = match value {
        Value::String(s) => Decimal::from_str(s).ok(),
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        _ => None,
    };
    parsed.ok_or_else(|| EngineError::ValidationError {
        message: format!("Cannot convert {} to Decimal", field),
    })
}
