use std::cell::RefCell;
use std::ffi::CString;
use std::os::raw::c_char;

use cayenne_lpp_codec::LppError;

use crate::types::CayenneLppResult;

thread_local! {
    static LAST_ERROR: RefCell<CString> = RefCell::new(CString::new("").expect("empty CString should be valid"));
}

pub(crate) fn clear_error_state() {
    LAST_ERROR.with(|state| {
        *state.borrow_mut() = CString::new("").expect("empty CString should be valid");
    });
}

pub(crate) fn set_error_message(message: impl Into<String>) {
    let message = message.into();
    let sanitized = message.replace('\0', "?");
    LAST_ERROR.with(|state| {
        *state.borrow_mut() = CString::new(sanitized)
            .unwrap_or_else(|_| CString::new("internal error").expect("literal is valid"));
    });
}

pub(crate) fn set_invalid_argument(message: impl Into<String>) -> CayenneLppResult {
    set_error_message(message);
    CayenneLppResult::InvalidArgument
}

pub(crate) fn set_panic_error() {
    set_error_message("panic across FFI boundary");
}

pub(crate) fn map_lpp_error(err: &LppError) -> CayenneLppResult {
    set_error_message(err.to_string());
    match err {
        LppError::UnknownType(_) => CayenneLppResult::UnknownType,
        LppError::NotImplemented(_) => CayenneLppResult::NotImplemented,
        LppError::Overflow { .. } => CayenneLppResult::Overflow,
        LppError::OutOfRange { .. } => CayenneLppResult::OutOfRange,
        LppError::Truncated { .. } => CayenneLppResult::Truncated,
        LppError::BufferLength { .. } | LppError::TypeMismatch { .. } => {
            CayenneLppResult::InvalidArgument
        }
        LppError::Alloc(_) => CayenneLppResult::Internal,
    }
}

pub(crate) fn last_error_ptr() -> *const c_char {
    LAST_ERROR.with(|state| state.borrow().as_ptr())
}
