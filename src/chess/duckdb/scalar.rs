//! Shared DuckDB scalar invoke helpers.
//!
//! # Safety
//! Only call these from inside a scalar `invoke()` while its vectors are
//! valid, with input and output logical types matching the helper.

use std::error::Error;
use std::ffi::CString;

use duckdb::{
    Result,
    core::{DataChunkHandle, FlatVector, Inserter, LogicalTypeId},
    vtab::arrow::WritableVector,
};
use libduckdb_sys::duckdb_string_t;

use super::string::decode_varchar;

#[derive(Debug, Clone)]
pub enum VarcharOutput {
    Null,
    Value(String),
}

fn ensure_type(
    vec: &FlatVector,
    expected: LogicalTypeId,
    label: &str,
) -> Result<(), Box<dyn Error>> {
    let actual = vec.logical_type().id();
    if actual != expected {
        return Err(format!(
            "scalar helper type mismatch: {label} expected {expected:?}, got {actual:?}"
        )
        .into());
    }
    Ok(())
}

/// Invoke a unary `VARCHAR -> VARCHAR` scalar. NULL rows map to NULL.
pub fn invoke_unary_varchar_to_varchar<F>(
    input: &DataChunkHandle,
    output: &mut dyn WritableVector,
    mut f: F,
) -> Result<(), Box<dyn Error>>
where
    F: FnMut(&str) -> Result<VarcharOutput, Box<dyn Error>>,
{
    let len = input.len();
    let input_vec = input.flat_vector(0);
    ensure_type(&input_vec, LogicalTypeId::Varchar, "input[0]")?;
    let input_slice = input_vec.as_slice::<duckdb_string_t>();
    let mut output_vec = output.flat_vector();
    ensure_type(&output_vec, LogicalTypeId::Varchar, "output")?;

    for (i, s) in input_slice.iter().take(len).enumerate() {
        if input_vec.row_is_null(i as u64) {
            output_vec.set_null(i);
            continue;
        }

        // SAFETY: Row nullability is checked above.
        let val = unsafe { decode_varchar(s) };
        match f(val.as_ref())? {
            VarcharOutput::Null => output_vec.set_null(i),
            VarcharOutput::Value(v) => output_vec.insert(i, CString::new(v)?),
        }
    }

    Ok(())
}

/// Invoke a zero-argument scalar, writing the same text to every row.
pub fn invoke_constant_varchar(
    input: &DataChunkHandle,
    output: &mut dyn WritableVector,
    value: &str,
) -> Result<(), Box<dyn Error>> {
    let output_vec = output.flat_vector();
    ensure_type(&output_vec, LogicalTypeId::Varchar, "output")?;
    let value = CString::new(value)?;
    for i in 0..input.len() {
        output_vec.insert(i, value.clone());
    }
    Ok(())
}
