use duckdb::vtab::BindInfo;
use libduckdb_sys::{
    duckdb_bind_get_named_parameter, duckdb_bind_info, duckdb_destroy_value, duckdb_free,
    duckdb_get_varchar, duckdb_is_null_value,
};
use std::ffi::{CStr, CString};
use std::os::raw::c_void;

/// Read a named parameter as text. Omitted and SQL NULL both come back as
/// `None`; any non-NULL value is cast to VARCHAR by DuckDB first.
pub(crate) fn named_parameter_text(
    bind: &BindInfo,
    name: &str,
) -> Result<Option<String>, Box<dyn std::error::Error>> {
    let name_cstr = CString::new(name)?;

    // SAFETY: the handle is valid for the duration of this bind callback.
    let mut value =
        unsafe { duckdb_bind_get_named_parameter(bind_info_ptr(bind), name_cstr.as_ptr()) };
    if value.is_null() {
        return Ok(None);
    }

    // SAFETY: `value` is a live `duckdb_value`, released exactly once below.
    let result = unsafe {
        if duckdb_is_null_value(value) {
            Ok(None)
        } else {
            let varchar = duckdb_get_varchar(value);
            if varchar.is_null() {
                Err(format!("Failed to read named parameter '{}' as VARCHAR", name).into())
            } else {
                let text = CStr::from_ptr(varchar).to_string_lossy().into_owned();
                duckdb_free(varchar as *mut c_void);
                Ok(Some(text))
            }
        }
    };

    // SAFETY: not yet destroyed.
    unsafe {
        duckdb_destroy_value(&mut value);
    }

    result
}

fn bind_info_ptr(bind: &BindInfo) -> duckdb_bind_info {
    // SAFETY: `BindInfo` wraps a single `duckdb_bind_info` field and exposes no
    // raw accessor. Re-check this layout whenever the duckdb crate is bumped.
    unsafe { *(bind as *const BindInfo as *const duckdb_bind_info) }
}
