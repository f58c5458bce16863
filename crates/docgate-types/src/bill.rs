//! Bill documents and the row duplicated into the relational table

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Document member holding the caller-chosen storage key
pub const KEY_FIELD: &str = "key";

/// Prefix of keys generated for documents that carry no usable key
pub const FALLBACK_KEY_PREFIX: &str = "data_";

/// Why a document could not be turned into a [`BillRow`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("document must be a JSON object")]
    NotAnObject,

    #[error("missing field '{0}'")]
    Missing(&'static str),

    #[error("field '{field}' must be {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },
}

/// Denormalized projection of a bill document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillRow {
    /// Decimal text of the document number, empty when the document has none
    pub billing_doc_no: String,
    pub billing_date: String,
    pub da_code: i32,
}

impl BillRow {
    /// Extract the relational columns from a parsed document.
    ///
    /// `billing_doc_no` is optional and only kept when it is an integral
    /// number; `billing_date` (string) and `da_code` (integral number) must
    /// be present. Integral floats such as `42.0` count as integers.
    pub fn from_document(doc: &Value) -> Result<Self, FieldError> {
        let obj = doc.as_object().ok_or(FieldError::NotAnObject)?;

        let billing_doc_no = obj
            .get("billing_doc_no")
            .and_then(as_i32)
            .map(|n| n.to_string())
            .unwrap_or_default();

        let billing_date = match obj.get("billing_date") {
            None | Some(Value::Null) => return Err(FieldError::Missing("billing_date")),
            Some(Value::String(s)) => s.clone(),
            Some(_) => {
                return Err(FieldError::WrongType {
                    field: "billing_date",
                    expected: "a string",
                })
            }
        };

        let da_code = match obj.get("da_code") {
            None | Some(Value::Null) => return Err(FieldError::Missing("da_code")),
            Some(v) => as_i32(v).ok_or(FieldError::WrongType {
                field: "da_code",
                expected: "an integral number within the 32-bit range",
            })?,
        };

        Ok(Self {
            billing_doc_no,
            billing_date,
            da_code,
        })
    }
}

/// The caller-supplied key, when the document has a string `key` member
pub fn document_key(doc: &Value) -> Option<String> {
    doc.get(KEY_FIELD)
        .and_then(Value::as_str)
        .map(|s| s.to_string())
}

/// Build a fallback key from a timestamp in nanoseconds since the Unix epoch
pub fn fallback_key(nanos: i64) -> String {
    format!("{}{}", FALLBACK_KEY_PREFIX, nanos)
}

fn as_i32(v: &Value) -> Option<i32> {
    if let Some(n) = v.as_i64() {
        return i32::try_from(n).ok();
    }
    let f = v.as_f64()?;
    if f.fract() == 0.0 && f >= f64::from(i32::MIN) && f <= f64::from(i32::MAX) {
        Some(f as i32)
    } else {
        None
    }
}
