//! Conversion of loosely typed constructor arguments into ABI values.
//!
//! Arguments arrive as JSON values, the same shape a user would write in a
//! config file or on the command line. Array and tuple parameters also accept
//! a string holding a JSON literal, so `"[1,2,3]"` and `[1, 2, 3]` encode the
//! same way.
use alloy::{
    dyn_abi::{DynSolType, DynSolValue, Specifier},
    json_abi::Param,
};
use serde_json::Value;

use crate::{Error, Result};

/// Convert `args` into ABI values matching `params` positionally.
///
/// # Errors
///
/// * [`Error::ArgumentCount`] - If `args` and `params` differ in length.
/// * [`Error::ArgumentType`] - If an argument cannot be converted to the type
///   of its parameter.
pub fn parse_args(
    params: &[Param],
    args: &[Value],
) -> Result<Vec<DynSolValue>> {
    if params.len() != args.len() {
        return Err(Error::ArgumentCount {
            expected: params.len(),
            actual: args.len(),
        });
    }

    params
        .iter()
        .zip(args)
        .enumerate()
        .map(|(index, (param, arg))| {
            let ty = param.selector_type().into_owned();
            let invalid = |reason: String| Error::ArgumentType {
                index,
                ty: ty.clone(),
                reason,
            };

            let sol_type =
                param.resolve().map_err(|e| invalid(e.to_string()))?;
            coerce(&sol_type, arg).map_err(invalid)
        })
        .collect()
}

/// Convert a single JSON value into a value of type `ty`.
///
/// # Errors
///
/// Returns a human readable reason when `value` does not fit `ty`.
pub fn coerce(ty: &DynSolType, value: &Value) -> Result<DynSolValue, String> {
    match ty {
        DynSolType::Array(inner) => {
            let items = as_sequence(value)?;
            items
                .iter()
                .map(|item| coerce(inner, item))
                .collect::<Result<_, _>>()
                .map(DynSolValue::Array)
        }
        DynSolType::FixedArray(inner, len) => {
            let items = as_sequence(value)?;
            if items.len() != *len {
                return Err(format!(
                    "expected {len} element(s), got {}",
                    items.len()
                ));
            }
            items
                .iter()
                .map(|item| coerce(inner, item))
                .collect::<Result<_, _>>()
                .map(DynSolValue::FixedArray)
        }
        DynSolType::Tuple(types) => {
            let items = as_sequence(value)?;
            if items.len() != types.len() {
                return Err(format!(
                    "expected {} tuple component(s), got {}",
                    types.len(),
                    items.len()
                ));
            }
            types
                .iter()
                .zip(&items)
                .map(|(ty, item)| coerce(ty, item))
                .collect::<Result<_, _>>()
                .map(DynSolValue::Tuple)
        }
        _ => {
            let raw = as_scalar(value)?;
            ty.coerce_str(&raw).map_err(|e| e.to_string())
        }
    }
}

/// Elements of an array argument, decoding string literals such as
/// `"[1,2,3]"` first.
fn as_sequence(value: &Value) -> Result<Vec<Value>, String> {
    match value {
        Value::Array(items) => Ok(items.clone()),
        Value::String(literal) => match parse_literal(literal)? {
            Value::Array(items) => Ok(items),
            other => Err(format!("expected an array literal, got `{other}`")),
        },
        other => Err(format!("expected an array, got `{other}`")),
    }
}

/// Decode a string-encoded array literal.
///
/// Strict JSON is tried first. Literals with bare words, like
/// `[0xabc..., true]` typed on a command line, fall back to splitting on
/// top-level commas.
///
/// # Errors
///
/// Returns a reason when `literal` is not bracketed.
pub fn parse_literal(literal: &str) -> Result<Value, String> {
    let literal = literal.trim();
    if let Ok(value) = serde_json::from_str::<Value>(literal) {
        return Ok(value);
    }

    let inner = literal
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| format!("`{literal}` is not an array literal"))?;

    if inner.trim().is_empty() {
        return Ok(Value::Array(vec![]));
    }

    let items = split_top_level(inner)?
        .into_iter()
        .map(|item| {
            let item = item.trim();
            if item.starts_with('[') {
                parse_literal(item)
            } else if item.starts_with('"') {
                serde_json::from_str(item)
                    .map_err(|e| format!("invalid string `{item}`: {e}"))
            } else {
                Ok(Value::String(item.trim_matches('"').to_owned()))
            }
        })
        .collect::<Result<_, _>>()?;

    Ok(Value::Array(items))
}

/// Split on commas that are neither nested inside brackets nor quoted.
fn split_top_level(inner: &str) -> Result<Vec<&str>, String> {
    let mut items = vec![];
    let mut depth = 0usize;
    let mut start = 0;
    let mut quoted = false;
    let mut escaped = false;

    for (pos, c) in inner.char_indices() {
        if quoted {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => quoted = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => quoted = true,
            '[' => depth += 1,
            ']' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| format!("unbalanced `]` in `{inner}`"))?;
            }
            ',' if depth == 0 => {
                items.push(&inner[start..pos]);
                start = pos + 1;
            }
            _ => {}
        }
    }

    if quoted {
        return Err(format!("unterminated string in `{inner}`"));
    }
    if depth != 0 {
        return Err(format!("unbalanced `[` in `{inner}`"));
    }

    items.push(&inner[start..]);
    Ok(items)
}

/// Largest integer a JSON number stored as `f64` represents exactly.
const MAX_SAFE_FLOAT: f64 = 9_007_199_254_740_991.0;

/// String form of a scalar argument, as understood by
/// [`DynSolType::coerce_str`].
#[allow(clippy::float_cmp)]
fn as_scalar(value: &Value) -> Result<String, String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => {
            if let Some(n) = n.as_u64() {
                Ok(n.to_string())
            } else if let Some(n) = n.as_i64() {
                Ok(n.to_string())
            } else {
                match n.as_f64() {
                    // Numbers like `20e9` are integral but stored as floats.
                    // Past 2^53 a float no longer holds the written value.
                    Some(f) if f.fract() == 0.0 && f.abs() <= MAX_SAFE_FLOAT => {
                        Ok(format!("{f:.0}"))
                    }
                    Some(f) if f.fract() == 0.0 && f.is_finite() => {
                        Err(format!(
                            "`{n}` exceeds 2^53, pass it as a string instead"
                        ))
                    }
                    _ => Err(format!("`{n}` is not an integer")),
                }
            }
        }
        other => Err(format!("expected a scalar value, got `{other}`")),
    }
}
