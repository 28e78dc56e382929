//! cayenne-lpp-ffi: C-ABI exports for the Cayenne LPP stream codec.
//!
//! The exported functions keep the `cayenne_lpp_stream_*` C API of the
//! embedded codec so existing C callers can link against this library unchanged.

mod error;
mod stream;
mod types;

use std::panic::AssertUnwindSafe;

pub use stream::{
    cayenne_lpp_stream_delete, cayenne_lpp_stream_get_buffer, cayenne_lpp_stream_get_free_space,
    cayenne_lpp_stream_new, cayenne_lpp_stream_read, cayenne_lpp_stream_reset,
    cayenne_lpp_stream_write,
};
pub use types::{
    CayenneLppBarometer, CayenneLppGps, CayenneLppHumidity, CayenneLppIlluminance,
    CayenneLppResult, CayenneLppStream, CayenneLppTemperature, CayenneLppValue, CayenneLppXyz,
};

fn ffi_boundary<T>(on_panic: T, f: impl FnOnce() -> T) -> T {
    match std::panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => value,
        Err(_) => {
            error::set_panic_error();
            on_panic
        }
    }
}

/// Clear the calling thread's last error message.
#[no_mangle]
pub extern "C" fn cayenne_lpp_clear_error() {
    ffi_boundary((), error::clear_error_state);
}

/// Message describing the calling thread's last failure, or an empty string.
///
/// The pointer stays valid until the next failing call on the same thread.
#[no_mangle]
pub extern "C" fn cayenne_lpp_last_error() -> *const std::os::raw::c_char {
    ffi_boundary(std::ptr::null(), error::last_error_ptr)
}
