use libduckdb_sys::duckdb_string_t;

/// Longest payload DuckDB stores inline in a `duckdb_string_t`.
const INLINE_CAPACITY: usize = 12;

/// Raw bytes of one VARCHAR row.
///
/// # Safety
///
/// `s` must be a non-NULL row of a VARCHAR vector owned by the active
/// invocation, and the returned slice must not outlive that vector.
unsafe fn varchar_bytes(s: &duckdb_string_t) -> &[u8] {
    // SAFETY: both union variants start with the length.
    let len = unsafe { s.value.inlined.length } as usize;
    if len == 0 {
        return &[];
    }
    if len <= INLINE_CAPACITY {
        // SAFETY: inline rows carry `len` initialized bytes.
        let inlined = unsafe { &s.value.inlined.inlined };
        unsafe { std::slice::from_raw_parts(inlined.as_ptr() as *const u8, len) }
    } else {
        // SAFETY: longer rows point at `len` bytes in DuckDB's string heap.
        let ptr = unsafe { s.value.pointer.ptr };
        unsafe { std::slice::from_raw_parts(ptr as *const u8, len) }
    }
}

/// Copy a VARCHAR row into an owned string, replacing invalid UTF-8.
///
/// # Safety
///
/// Same contract as [`varchar_bytes`]; callers check row validity first.
pub unsafe fn decode_varchar(s: &duckdb_string_t) -> String {
    // SAFETY: forwarded contract.
    let bytes = unsafe { varchar_bytes(s) };
    String::from_utf8_lossy(bytes).into_owned()
}
