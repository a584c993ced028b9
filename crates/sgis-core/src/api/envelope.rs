//! Decoding of the SGIS response envelope.
//!
//! Every SGIS endpoint answers `200 OK` and reports failures inside the body
//! as `{"errCd": <code>, "errMsg": <text>}`. A missing or zero `errCd` means
//! success. Codes arrive as numbers on most endpoints and as numeric strings
//! on a few, so both are accepted.

use serde_json::Value;

use super::{ApiError, Result};

/// Parse a raw body and split it into success payload or typed failure.
pub fn decode(status: reqwest::StatusCode, body: &[u8]) -> Result<Value> {
    let parsed: Value = serde_json::from_slice(body)
        .map_err(|e| ApiError::undecodable(status, &String::from_utf8_lossy(body), e))?;
    check(parsed)
}

/// Map an already-parsed envelope to `Ok(envelope)` or `ApiError::Remote`.
pub fn check(parsed: Value) -> Result<Value> {
    let code = parsed.get("errCd").map(error_code).unwrap_or(0);
    if code != 0 {
        let message = match parsed.get("errMsg") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        return Err(ApiError::Remote { code, message });
    }
    Ok(parsed)
}

/// Take the `result` object out of a successful envelope.
pub fn into_result(mut envelope: Value) -> Value {
    match envelope.get_mut("result") {
        Some(result) => result.take(),
        None => Value::Null,
    }
}

fn error_code(value: &Value) -> i64 {
    match value {
        Value::Number(n) => match n.as_i64() {
            Some(code) => code,
            None => match n.as_f64() {
                Some(f) if f == 0.0 => 0,
                // Integral values beyond i64 saturate and stay nonzero.
                Some(f) if f.fract() == 0.0 => f as i64,
                _ => -1,
            },
        },
        Value::String(s) => s.trim().parse().unwrap_or(if s.trim().is_empty() { 0 } else { -1 }),
        Value::Bool(true) => 1,
        _ => 0,
    }
}
