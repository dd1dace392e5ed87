//! C ABI for Arrow IPC buffer verification.
//!
//! Every entry point takes a caller-owned buffer and its length and returns
//! `true` only if the buffer is structurally valid. Malformed input, a null
//! pointer, unusable limits and internal panics all come back as `false`;
//! nothing unwinds across the boundary.
//!
//! The declarations live in `include/arrow_ipc_verify.h`.

#![allow(non_snake_case)]

use std::ffi::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::slice;

use arrow_ipc_verify::{
    verify_encapsulated_message, verify_file, verify_footer, verify_message, verify_schema,
    RootKind, TableCountLimit, VerificationLimits, Verifier,
};
use tracing::warn;

/// # Safety
///
/// `buf` must be null or point to `len` readable bytes that are not mutated
/// for the duration of the call.
unsafe fn with_buffer(
    entry: &'static str,
    buf: *const c_char,
    len: usize,
    check: impl FnOnce(&[u8]) -> bool,
) -> bool {
    if buf.is_null() || len > isize::MAX as usize {
        return false;
    }
    let bytes = unsafe { slice::from_raw_parts(buf.cast::<u8>(), len) };
    catch_unwind(AssertUnwindSafe(|| check(bytes))).unwrap_or_else(|_| {
        warn!(entry, len, "panic during verification");
        false
    })
}

/// Returns `true` if `buf` holds a valid `Schema` root.
///
/// Uses a nesting depth of 128 and at most `8 * len` tables.
///
/// # Safety
///
/// `buf` must be null or point to `len` readable bytes.
#[no_mangle]
pub unsafe extern "C" fn verifySchema(buf: *const c_char, len: usize) -> bool {
    unsafe { with_buffer("verifySchema", buf, len, verify_schema) }
}

/// Returns `true` if `buf` holds a valid `Message` root.
///
/// # Safety
///
/// `buf` must be null or point to `len` readable bytes.
#[no_mangle]
pub unsafe extern "C" fn verifyMessage(buf: *const c_char, len: usize) -> bool {
    unsafe { with_buffer("verifyMessage", buf, len, verify_message) }
}

/// Returns `true` if `buf` holds a valid `Footer` root.
///
/// # Safety
///
/// `buf` must be null or point to `len` readable bytes.
#[no_mangle]
pub unsafe extern "C" fn verifyFooter(buf: *const c_char, len: usize) -> bool {
    unsafe { with_buffer("verifyFooter", buf, len, verify_footer) }
}

/// Verifies `buf` as the root kind with code `kind` (0 schema, 1 message,
/// 2 footer) under caller-chosen limits.
///
/// `max_depth` must be at least 1. A `max_table_count` of 0 selects the
/// default of `8 * len`.
///
/// # Safety
///
/// `buf` must be null or point to `len` readable bytes.
#[no_mangle]
pub unsafe extern "C" fn verifyRootWithLimits(
    kind: u32,
    buf: *const c_char,
    len: usize,
    max_depth: usize,
    max_table_count: usize,
) -> bool {
    let Some(kind) = RootKind::from_code(kind) else {
        return false;
    };
    let max_table_count = match max_table_count {
        0 => TableCountLimit::default(),
        n => TableCountLimit::Fixed(n),
    };
    let Ok(verifier) = VerificationLimits::new(max_depth, max_table_count).and_then(Verifier::new)
    else {
        return false;
    };
    unsafe {
        with_buffer("verifyRootWithLimits", buf, len, |bytes| {
            verifier.verify_kind(kind, bytes).is_ok()
        })
    }
}

/// Returns `true` if `buf` starts with a valid encapsulated IPC message
/// (or the end-of-stream marker) whose body fits in `len`.
///
/// # Safety
///
/// `buf` must be null or point to `len` readable bytes.
#[no_mangle]
pub unsafe extern "C" fn verifyEncapsulatedMessage(buf: *const c_char, len: usize) -> bool {
    unsafe {
        with_buffer("verifyEncapsulatedMessage", buf, len, |bytes| {
            verify_encapsulated_message(bytes, &VerificationLimits::default()).is_ok()
        })
    }
}

/// Returns `true` if `buf` is a complete Arrow IPC file with a valid footer
/// and disjoint, in-bounds record batch and dictionary blocks.
///
/// # Safety
///
/// `buf` must be null or point to `len` readable bytes.
#[no_mangle]
pub unsafe extern "C" fn verifyFile(buf: *const c_char, len: usize) -> bool {
    unsafe {
        with_buffer("verifyFile", buf, len, |bytes| {
            verify_file(bytes, &VerificationLimits::default()).is_ok()
        })
    }
}
