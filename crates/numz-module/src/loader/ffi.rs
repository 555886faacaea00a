//! C ABI for dynamically loaded modules.
//!
//! A module library named after the module exports:
//!
//! ```c
//! // JSON array of exported symbol names, e.g. ["acme_CreateAccount"].
//! char *acme_Exports(void);
//! // One function per exported symbol: JSON params in, JSON result out.
//! char *acme_CreateAccount(const char *params_json);
//! // Frees strings returned by the two functions above.
//! void acme_Free(char *ptr);
//! ```
//!
//! A function reports failure by returning `{"error": "<message>"}`.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

/// `<name>_Exports`.
pub type ExportsFn = unsafe extern "C" fn() -> *mut c_char;

/// An exported module function.
pub type ModuleFn = unsafe extern "C" fn(params_json: *const c_char) -> *mut c_char;

/// `<name>_Free`.
pub type FreeFn = unsafe extern "C" fn(ptr: *mut c_char);

/// Copies a C string into an owned `String`.
///
/// Returns `None` if the pointer is null or not UTF-8.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string that stays valid
/// for the duration of the call.
pub unsafe fn c_str_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr).to_str().ok().map(str::to_string) }
}

/// Converts a Rust string to a `CString`.
///
/// Returns `None` if the string contains NUL bytes.
pub fn string_to_c_string(s: &str) -> Option<CString> {
    CString::new(s).ok()
}
