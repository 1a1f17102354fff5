//! Key-material resolution.
//!
//! The upstream account-generation facility has not kept a stable shape for
//! the credential it hands back: rows written by older deployments hold raw
//! byte arrays, objects wrapping a byte array, objects exposing a hex-string
//! field, bare hex strings with or without a `0x` prefix, or values whose
//! plain string form happens to be hex. [`to_signing_hex`] isolates that
//! instability behind one narrow contract: an ordered list of pure extraction
//! strategies, the first of which to produce a hex-valid value wins, with the
//! result normalised to a `0x`-prefixed lower-case hex string. Everything
//! downstream only ever sees the canonical form.
//!
//! Resolution failure is fatal for the operation that needed the key; it is
//! never silently defaulted.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use zeroize::Zeroize;

/// Stored credential in whichever shape the generating code produced.
///
/// Modelled as a JSON value because the registry has accumulated rows in
/// several historical layouts; see the module docs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialValue(Value);

impl CredentialValue {
    /// Wrap a canonical hex string (the shape new rows are written in).
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(Value::String(hex.into()))
    }

    /// Wrap a raw byte sequence.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(Value::Array(
            bytes.iter().map(|b| Value::from(u64::from(*b))).collect(),
        ))
    }

    /// Wrap an arbitrary stored value.
    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    /// Stored shape, for persistence adapters. Must never appear in logs or
    /// response payloads.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    fn value(&self) -> &Value {
        &self.0
    }
}

impl fmt::Debug for CredentialValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CredentialValue(<redacted>)")
    }
}

/// Canonical signing key: a validated, `0x`-prefixed lower-case hex string.
///
/// The inner string is wiped on drop and excluded from `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningKeyHex(String);

impl SigningKeyHex {
    /// Access the canonical hex form, including the `0x` prefix.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for SigningKeyHex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningKeyHex(<redacted>)")
    }
}

impl Drop for SigningKeyHex {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

type Strategy = fn(&Value) -> Option<String>;

/// Extraction strategies in fixed priority order.
const STRATEGIES: &[Strategy] = &[
    byte_sequence,
    byte_field,
    hex_field,
    plain_string,
    stringified,
];

/// Resolve a stored credential to its canonical signing-key hex form.
///
/// Returns `None` when no strategy yields a hex-valid value. Idempotent:
/// feeding the output back in (as a [`CredentialValue::from_hex`]) yields the
/// same output.
pub fn to_signing_hex(raw: &CredentialValue) -> Option<SigningKeyHex> {
    STRATEGIES
        .iter()
        .find_map(|strategy| strategy(raw.value()))
        .and_then(|candidate| normalise(&candidate))
        .map(SigningKeyHex)
}

/// Array of integers in `0..=255` → hex encoding of those bytes.
fn byte_sequence(value: &Value) -> Option<String> {
    let items = value.as_array()?;
    collect_bytes(items).map(hex::encode)
}

/// Object wrapping a byte array under a `bytes` field.
fn byte_field(value: &Value) -> Option<String> {
    let items = value.as_object()?.get("bytes")?.as_array()?;
    collect_bytes(items).map(hex::encode)
}

/// Object exposing a hex string under a `hex` field.
fn hex_field(value: &Value) -> Option<String> {
    value
        .as_object()?
        .get("hex")?
        .as_str()
        .map(str::to_owned)
}

/// Bare string, hopefully already hex.
fn plain_string(value: &Value) -> Option<String> {
    value.as_str().map(str::to_owned)
}

/// Last resort: the value's plain string form (numbers and the like).
fn stringified(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn collect_bytes(items: &[Value]) -> Option<Vec<u8>> {
    items
        .iter()
        .map(|item| item.as_u64().and_then(|n| u8::try_from(n).ok()))
        .collect()
}

/// Validate a candidate as hex (optional `0x`) and normalise it.
fn normalise(candidate: &str) -> Option<String> {
    let digits = candidate.strip_prefix("0x").unwrap_or(candidate);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    Some(format!("0x{}", digits.to_lowercase()))
}
