//! Values, keys and decode strategies for [`ObjectCache`](crate::ObjectCache).

use crate::{CacheError, Result};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// A value that can be written to the store.
///
/// Each variant has a fixed byte serialization: text as UTF-8, integers in
/// decimal, floats in their shortest round-trip form (always with a fractional
/// part, so `1.0` stays `"1.0"`), and bytes verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredValue {
    Bytes(Vec<u8>),
    Str(String),
    Int(i64),
    Float(f64),
}

impl StoredValue {
    /// The bytes handed to the store.
    ///
    /// # Examples
    ///
    /// ```
    /// use kvtrace_core::StoredValue;
    ///
    /// assert_eq!(StoredValue::from("hi").to_bytes(), b"hi");
    /// assert_eq!(StoredValue::from(-7).to_bytes(), b"-7");
    /// assert_eq!(StoredValue::from(2.5).to_bytes(), b"2.5");
    /// assert_eq!(StoredValue::from(1.0).to_bytes(), b"1.0");
    /// ```
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            StoredValue::Bytes(bytes) => bytes.clone(),
            StoredValue::Str(s) => s.as_bytes().to_vec(),
            StoredValue::Int(i) => i.to_string().into_bytes(),
            StoredValue::Float(f) => format!("{:?}", f).into_bytes(),
        }
    }
}

/// Renders the value the way it appears in call history: text quoted, bytes
/// as an escaped byte string, numbers bare.
impl fmt::Display for StoredValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoredValue::Bytes(bytes) => write!(f, "b\"{}\"", bytes.escape_ascii()),
            StoredValue::Str(s) => write!(f, "{:?}", s),
            StoredValue::Int(i) => write!(f, "{}", i),
            StoredValue::Float(x) => write!(f, "{:?}", x),
        }
    }
}

impl From<&str> for StoredValue {
    fn from(value: &str) -> Self {
        StoredValue::Str(value.to_string())
    }
}

impl From<String> for StoredValue {
    fn from(value: String) -> Self {
        StoredValue::Str(value)
    }
}

impl From<&[u8]> for StoredValue {
    fn from(value: &[u8]) -> Self {
        StoredValue::Bytes(value.to_vec())
    }
}

impl From<Vec<u8>> for StoredValue {
    fn from(value: Vec<u8>) -> Self {
        StoredValue::Bytes(value)
    }
}

impl From<i64> for StoredValue {
    fn from(value: i64) -> Self {
        StoredValue::Int(value)
    }
}

impl From<i32> for StoredValue {
    fn from(value: i32) -> Self {
        StoredValue::Int(value.into())
    }
}

impl From<u32> for StoredValue {
    fn from(value: u32) -> Self {
        StoredValue::Int(value.into())
    }
}

impl From<f64> for StoredValue {
    fn from(value: f64) -> Self {
        StoredValue::Float(value)
    }
}

/// Client-generated identifier of a stored value.
///
/// Keys are random v4 UUIDs. Uniqueness is probabilistic; the store is never
/// asked whether a key is already taken.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(String);

impl Key {
    /// Generates a fresh random key.
    pub fn generate() -> Self {
        Key(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key(value)
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key(value.to_string())
    }
}

/// Signature of a caller-supplied decoder.
pub type DecodeFn = dyn Fn(&[u8]) -> Result<StoredValue> + Send + Sync;

/// How raw bytes read from the store are turned back into a value.
///
/// # Examples
///
/// ```
/// use kvtrace_core::{Decoder, StoredValue};
///
/// let bytes = b"42".to_vec();
/// assert_eq!(Decoder::Raw.decode(bytes.clone()).unwrap(), StoredValue::Bytes(bytes.clone()));
/// assert_eq!(Decoder::Int.decode(bytes.clone()).unwrap(), StoredValue::Int(42));
///
/// let shout = Decoder::custom(|b| Ok(StoredValue::Str(String::from_utf8_lossy(b).to_uppercase())));
/// assert_eq!(shout.decode(b"hey".to_vec()).unwrap(), StoredValue::from("HEY"));
/// ```
#[derive(Clone, Default)]
pub enum Decoder {
    /// Hand the bytes back untouched.
    #[default]
    Raw,
    /// Strict UTF-8 text.
    Utf8,
    /// Decimal `i64`.
    Int,
    Float,
    Custom(Arc<DecodeFn>),
}

impl Decoder {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&[u8]) -> Result<StoredValue> + Send + Sync + 'static,
    {
        Decoder::Custom(Arc::new(f))
    }

    pub fn decode(&self, bytes: Vec<u8>) -> Result<StoredValue> {
        match self {
            Decoder::Raw => Ok(StoredValue::Bytes(bytes)),
            Decoder::Utf8 => decode_utf8(bytes).map(StoredValue::Str),
            Decoder::Int => decode_int(&bytes).map(StoredValue::Int),
            Decoder::Float => decode_float(&bytes).map(StoredValue::Float),
            Decoder::Custom(f) => f(&bytes),
        }
    }
}

impl fmt::Debug for Decoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decoder::Raw => f.write_str("Raw"),
            Decoder::Utf8 => f.write_str("Utf8"),
            Decoder::Int => f.write_str("Int"),
            Decoder::Float => f.write_str("Float"),
            Decoder::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

pub(crate) fn decode_utf8(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|e| CacheError::decode("UTF-8 text", e))
}

pub(crate) fn decode_int(bytes: &[u8]) -> Result<i64> {
    std::str::from_utf8(bytes)
        .map_err(|e| CacheError::decode("integer", e))?
        .parse::<i64>()
        .map_err(|e| CacheError::decode("integer", e))
}

pub(crate) fn decode_float(bytes: &[u8]) -> Result<f64> {
    std::str::from_utf8(bytes)
        .map_err(|e| CacheError::decode("float", e))?
        .parse::<f64>()
        .map_err(|e| CacheError::decode("float", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_keys_differ() {
        let a = Key::generate();
        let b = Key::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 36);
    }

    #[test]
    fn test_display_for_history() {
        assert_eq!(StoredValue::from("hello").to_string(), "\"hello\"");
        assert_eq!(StoredValue::from(12).to_string(), "12");
        assert_eq!(StoredValue::from(0.5).to_string(), "0.5");
        assert_eq!(StoredValue::from(&b"a\n"[..]).to_string(), "b\"a\\n\"");
    }

    #[test]
    fn test_decode_int_rejects_text() {
        let err = Decoder::Int.decode(b"hello".to_vec()).unwrap_err();
        assert!(matches!(err, CacheError::Decode { target: "integer", .. }));
    }

    #[test]
    fn test_decode_utf8_rejects_invalid_bytes() {
        let err = Decoder::Utf8.decode(vec![0xff, 0xfe]).unwrap_err();
        assert!(matches!(err, CacheError::Decode { target: "UTF-8 text", .. }));
    }

    #[test]
    fn test_decode_float_reads_int_text() {
        assert_eq!(
            Decoder::Float.decode(b"3".to_vec()).unwrap(),
            StoredValue::Float(3.0)
        );
    }

    #[test]
    fn test_custom_decoder_error_propagates() {
        let failing = Decoder::custom(|_| Err(CacheError::decode("json", "unexpected end")));
        assert!(failing.decode(b"{".to_vec()).is_err());
        assert_eq!(format!("{:?}", failing), "Custom(..)");
    }
}
