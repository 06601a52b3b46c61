//! Validation entry point for untyped callers.
//!
//! RPC handlers and scripting bridges receive arguments as JSON values, so
//! they can be missing or of the wrong type. Those are caller bugs and are
//! reported as errors; everything else about the address is a plain `false`.

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::{Prefixes, is_valid};

/// Errors raised before an address is looked at.
#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum InputError {
    /// No address, or `null`
    #[error("address must be defined")]
    MissingAddress,

    /// The address is not a string
    #[error("address must be a string")]
    InvalidAddressType,

    /// The prefix is not a string or a non-empty array of strings
    #[error("prefix must be a string or a non-empty array of strings")]
    InvalidPrefixType,
}

/// Normalizes a prefix argument: a string becomes a one-element set, an
/// array must be non-empty and contain only strings.
///
/// # Errors
/// Returns [`InputError::InvalidPrefixType`] for any other shape.
pub fn prefixes_from_value(prefix: &Value) -> Result<Prefixes, InputError> {
    match prefix {
        Value::String(prefix) => Ok(Prefixes::from(prefix.as_str())),
        Value::Array(items) if items.is_empty() => Err(InputError::InvalidPrefixType),
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().ok_or(InputError::InvalidPrefixType))
            .collect(),
        _ => Err(InputError::InvalidPrefixType),
    }
}

/// Checks an address given as untyped arguments.
///
/// A missing `prefix` means the default `nano` and `xrb` prefixes.
///
/// # Errors
/// - [`InputError::MissingAddress`] if `address` is absent or `null`
/// - [`InputError::InvalidAddressType`] if `address` is not a string
/// - [`InputError::InvalidPrefixType`] if `prefix` is neither a string nor a non-empty array of strings
pub fn is_valid_value(address: Option<&Value>, prefix: Option<&Value>) -> Result<bool, InputError> {
    let address = match address {
        None | Some(Value::Null) => return Err(InputError::MissingAddress),
        Some(Value::String(address)) => address,
        Some(other) => {
            debug!("address has type {}", type_name(other));
            return Err(InputError::InvalidAddressType);
        }
    };

    let prefixes = match prefix {
        None => Prefixes::default(),
        Some(prefix) => prefixes_from_value(prefix)?,
    };

    Ok(is_valid(address, prefixes))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
