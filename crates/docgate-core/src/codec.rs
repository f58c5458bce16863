//! Comma-delimited text encoding for integer arrays

use crate::error::{CoreError, Result};

/// Join the integers with `,` (no spaces, no trailing separator)
pub fn serialize_array(values: &[i32]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Parse text produced by [`serialize_array`]. The empty string is the empty array.
pub fn deserialize_array(data: &str) -> Result<Vec<i32>> {
    if data.is_empty() {
        return Ok(Vec::new());
    }

    data.split(',')
        .map(|item| {
            item.trim()
                .parse::<i32>()
                .map_err(|_| CoreError::Codec(item.to_string()))
        })
        .collect()
}
