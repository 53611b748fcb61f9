//! Low-level argument conversion helpers.
//!
//! Numbers on the `mll` command line are read exactly as C's `atof` reads
//! them, so conversion goes through the platform `strtod`.

use std::ffi::CString;

/// Converts the longest numeric prefix of `s` to `f64`, C `atof` style.
///
/// Leading C whitespace (including `\v` and `\f`) is skipped. The prefix may
/// be a decimal or hexadecimal floating-point number (`12`, `-1.5`, `2e-3`,
/// `0x1p3`), `inf`/`infinity`, or `nan`/`nan(...)` in any letter case.
/// Trailing text is ignored, and a string with no numeric prefix is `0.0`.
/// An interior NUL ends the string, as it would in C. Never fails.
pub fn atof(s: &str) -> f64 {
    let prefix = s.split('\0').next().unwrap_or_default();
    let Ok(c) = CString::new(prefix) else {
        return 0.0;
    };
    // SAFETY: `c` is NUL-terminated and outlives the call; a null end pointer
    // is allowed and makes strtod behave as atof.
    unsafe { libc::strtod(c.as_ptr(), std::ptr::null_mut()) }
}
