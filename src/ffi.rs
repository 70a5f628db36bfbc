//! C Foreign Function Interface for jp2bridge-rs.
//!
//! This module provides C-compatible functions with an opaque session
//! handle, so a native decoder can push component planes (base pointer plus
//! sample count) and diagnostic text across the boundary.

use std::ffi::CStr;
use std::os::raw::{c_char, c_int};
use std::ptr;

use num_enum::IntoPrimitive;

use crate::error::BridgeError;
use crate::repack::DecodeSession;

/// Opaque session handle.
#[repr(C)]
pub struct Jp2BridgeSession {
    _private: [u8; 0],
}

/// Status codes returned by the C API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive)]
#[repr(i32)]
pub enum BridgeStatus {
    Ok = 0,
    InvalidArgument = 1,
    UnsupportedBytesPerPixel = 2,
}

impl From<BridgeError> for BridgeStatus {
    fn from(err: BridgeError) -> Self {
        match err {
            BridgeError::UnsupportedBytesPerPixel(_) => Self::UnsupportedBytesPerPixel,
            _ => Self::InvalidArgument,
        }
    }
}

fn code(status: BridgeStatus) -> c_int {
    i32::from(status)
}

/// Create a new session with the default warning sink.
#[unsafe(no_mangle)]
pub extern "C" fn jp2bridge_session_new() -> *mut Jp2BridgeSession {
    Box::into_raw(Box::new(DecodeSession::new())) as *mut Jp2BridgeSession
}

/// Free a session handle.
///
/// # Safety
/// `session` must be a valid handle from `jp2bridge_session_new`, or null.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn jp2bridge_session_free(session: *mut Jp2BridgeSession) {
    if !session.is_null() {
        let _ = unsafe { Box::from_raw(session as *mut DecodeSession) };
    }
}

/// Repack one grayscale plane into the session image buffer.
///
/// # Safety
/// `session` must be valid. `plane` must point to `pixel_count` readable
/// `i32` samples.
#[unsafe(no_mangle)]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub unsafe extern "C" fn jp2bridge_copy_pixels_1(
    session: *mut Jp2BridgeSession,
    plane: *const i32,
    precision_bits: u32,
    pixel_count: usize,
) -> c_int {
    if session.is_null() || plane.is_null() {
        return code(BridgeStatus::InvalidArgument);
    }
    let session = unsafe { &mut *(session as *mut DecodeSession) };
    let plane = unsafe { std::slice::from_raw_parts(plane, pixel_count) };
    match session.convert_grayscale(plane, precision_bits) {
        Ok(_) => code(BridgeStatus::Ok),
        Err(err) => code(err.into()),
    }
}

/// Repack three planes into interleaved RGB.
///
/// # Safety
/// `session` must be valid. Each plane pointer must point to `pixel_count`
/// readable `i32` samples.
#[unsafe(no_mangle)]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub unsafe extern "C" fn jp2bridge_copy_pixels_3(
    session: *mut Jp2BridgeSession,
    red: *const i32,
    green: *const i32,
    blue: *const i32,
    pixel_count: usize,
) -> c_int {
    if session.is_null() || red.is_null() || green.is_null() || blue.is_null() {
        return code(BridgeStatus::InvalidArgument);
    }
    let session = unsafe { &mut *(session as *mut DecodeSession) };
    let red = unsafe { std::slice::from_raw_parts(red, pixel_count) };
    let green = unsafe { std::slice::from_raw_parts(green, pixel_count) };
    let blue = unsafe { std::slice::from_raw_parts(blue, pixel_count) };
    session.convert_rgb(red, green, blue);
    code(BridgeStatus::Ok)
}

/// Repack four planes into interleaved RGBA.
///
/// # Safety
/// `session` must be valid. Each plane pointer must point to `pixel_count`
/// readable `i32` samples.
#[unsafe(no_mangle)]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub unsafe extern "C" fn jp2bridge_copy_pixels_4(
    session: *mut Jp2BridgeSession,
    red: *const i32,
    green: *const i32,
    blue: *const i32,
    alpha: *const i32,
    pixel_count: usize,
) -> c_int {
    if session.is_null()
        || red.is_null()
        || green.is_null()
        || blue.is_null()
        || alpha.is_null()
    {
        return code(BridgeStatus::InvalidArgument);
    }
    let session = unsafe { &mut *(session as *mut DecodeSession) };
    let red = unsafe { std::slice::from_raw_parts(red, pixel_count) };
    let green = unsafe { std::slice::from_raw_parts(green, pixel_count) };
    let blue = unsafe { std::slice::from_raw_parts(blue, pixel_count) };
    let alpha = unsafe { std::slice::from_raw_parts(alpha, pixel_count) };
    session.convert_rgba(red, green, blue, alpha);
    code(BridgeStatus::Ok)
}

/// Append a decoder error message to the session error log.
///
/// # Safety
/// `session` must be valid. `message` must be a NUL-terminated string.
#[unsafe(no_mangle)]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub unsafe extern "C" fn jp2bridge_store_error_message(
    session: *mut Jp2BridgeSession,
    message: *const c_char,
) -> c_int {
    if session.is_null() || message.is_null() {
        return code(BridgeStatus::InvalidArgument);
    }
    let session = unsafe { &mut *(session as *mut DecodeSession) };
    let message = unsafe { CStr::from_ptr(message) }.to_string_lossy();
    session.report_error(&message);
    code(BridgeStatus::Ok)
}

/// Record a decoder warning.
///
/// # Safety
/// `session` must be valid. `message` must be a NUL-terminated string.
#[unsafe(no_mangle)]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub unsafe extern "C" fn jp2bridge_print_warning(
    session: *mut Jp2BridgeSession,
    message: *const c_char,
) -> c_int {
    if session.is_null() || message.is_null() {
        return code(BridgeStatus::InvalidArgument);
    }
    let session = unsafe { &mut *(session as *mut DecodeSession) };
    let message = unsafe { CStr::from_ptr(message) }.to_string_lossy();
    session.report_warning(&message);
    code(BridgeStatus::Ok)
}

/// Current interleaved image buffer.
///
/// Writes the buffer length to `out_len` and returns the data pointer, or
/// null if no conversion has run. The pointer stays valid until the next
/// conversion on this session or `jp2bridge_session_free`.
///
/// # Safety
/// `session` must be valid. `out_len` must be a valid `usize` pointer.
#[unsafe(no_mangle)]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub unsafe extern "C" fn jp2bridge_image_data(
    session: *const Jp2BridgeSession,
    out_len: *mut usize,
) -> *const u8 {
    if session.is_null() || out_len.is_null() {
        return ptr::null();
    }
    let session = unsafe { &*(session as *const DecodeSession) };
    match session.image_data() {
        Some(data) => {
            unsafe { *out_len = data.len() };
            data.as_ptr()
        }
        None => {
            unsafe { *out_len = 0 };
            ptr::null()
        }
    }
}

/// Accumulated error text, newline-joined, UTF-8, not NUL-terminated.
///
/// Writes the byte length to `out_len` and returns the text pointer, or
/// null if no error has been reported. The pointer stays valid until the
/// next `jp2bridge_store_error_message` call or `jp2bridge_session_free`.
///
/// # Safety
/// `session` must be valid. `out_len` must be a valid `usize` pointer.
#[unsafe(no_mangle)]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub unsafe extern "C" fn jp2bridge_error_messages(
    session: *const Jp2BridgeSession,
    out_len: *mut usize,
) -> *const u8 {
    if session.is_null() || out_len.is_null() {
        return ptr::null();
    }
    let session = unsafe { &*(session as *const DecodeSession) };
    match session.error_messages() {
        Some(text) => {
            unsafe { *out_len = text.len() };
            text.as_ptr()
        }
        None => {
            unsafe { *out_len = 0 };
            ptr::null()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    #[test]
    fn session_round_trip_through_c_api() {
        let session = jp2bridge_session_new();

        let red = [10i32, 300];
        let green = [20i32, 0];
        let blue = [30i32, 255];
        let status = unsafe {
            jp2bridge_copy_pixels_3(session, red.as_ptr(), green.as_ptr(), blue.as_ptr(), 2)
        };
        assert_eq!(status, 0);

        let mut len = 0usize;
        let data = unsafe { jp2bridge_image_data(session, &mut len) };
        assert!(!data.is_null());
        let bytes = unsafe { std::slice::from_raw_parts(data, len) };
        assert_eq!(bytes, [10, 20, 30, 44, 0, 255]);

        unsafe { jp2bridge_session_free(session) };
    }

    #[test]
    fn unsupported_precision_maps_to_status() {
        let session = jp2bridge_session_new();
        let plane = [0i32; 4];
        let status = unsafe { jp2bridge_copy_pixels_1(session, plane.as_ptr(), 33, 4) };
        assert_eq!(status, i32::from(BridgeStatus::UnsupportedBytesPerPixel));
        unsafe { jp2bridge_session_free(session) };
    }

    #[test]
    fn error_messages_accumulate_across_calls() {
        let session = jp2bridge_session_new();
        let a = CString::new("a").unwrap();
        let b = CString::new("b").unwrap();
        unsafe {
            jp2bridge_store_error_message(session, a.as_ptr());
            jp2bridge_store_error_message(session, b.as_ptr());
        }
        let mut len = 0usize;
        let text = unsafe { jp2bridge_error_messages(session, &mut len) };
        let text = unsafe { std::slice::from_raw_parts(text, len) };
        assert_eq!(text, b"a\nb".as_slice());
        unsafe { jp2bridge_session_free(session) };
    }

    #[test]
    fn null_arguments_are_rejected() {
        let status = unsafe { jp2bridge_copy_pixels_1(ptr::null_mut(), ptr::null(), 8, 0) };
        assert_eq!(status, i32::from(BridgeStatus::InvalidArgument));

        let mut len = 0usize;
        assert!(unsafe { jp2bridge_image_data(ptr::null(), &mut len) }.is_null());
    }
}
