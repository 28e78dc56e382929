use std::ptr;

use cayenne_lpp_codec::{LppStream, LppType};

use crate::error::{map_lpp_error, set_invalid_argument};
use crate::types::{CayenneLppResult, CayenneLppStream, CayenneLppValue};

/// Create a stream. With a null `buffer` the stream is for encoding; otherwise
/// `size` bytes are copied from `buffer` and the stream is for decoding.
///
/// Returns null if the buffer cannot be allocated.
///
/// # Safety
/// `buffer` must be null or valid for reads of `size` bytes.
#[no_mangle]
pub unsafe extern "C" fn cayenne_lpp_stream_new(
    size: usize,
    buffer: *const u8,
) -> *mut CayenneLppStream {
    crate::ffi_boundary(ptr::null_mut(), || {
        let existing = if buffer.is_null() {
            None
        } else {
            // SAFETY: Pointer validity and length are guaranteed by the caller.
            Some(unsafe { std::slice::from_raw_parts(buffer, size) })
        };

        match LppStream::open(size, existing) {
            Ok(inner) => Box::into_raw(Box::new(CayenneLppStream { inner })),
            Err(err) => {
                map_lpp_error(&err);
                ptr::null_mut()
            }
        }
    })
}

/// Delete a stream and free its buffer.
///
/// # Safety
/// `stream` must be null or a pointer returned by `cayenne_lpp_stream_new`
/// that has not been deleted yet.
#[no_mangle]
pub unsafe extern "C" fn cayenne_lpp_stream_delete(stream: *mut CayenneLppStream) {
    crate::ffi_boundary((), || {
        if stream.is_null() {
            return;
        }
        // SAFETY: Pointer originates from `Box::into_raw` in `cayenne_lpp_stream_new`.
        let boxed = unsafe { Box::from_raw(stream) };
        boxed.inner.release();
    });
}

/// Append one record to an encoding stream.
///
/// # Safety
/// `stream` must be a live stream handle. `value` must point to a value whose
/// field matching `type_code` is initialised.
#[no_mangle]
pub unsafe extern "C" fn cayenne_lpp_stream_write(
    stream: *mut CayenneLppStream,
    channel: u8,
    type_code: u8,
    value: *const CayenneLppValue,
) -> CayenneLppResult {
    crate::ffi_boundary(CayenneLppResult::Internal, || {
        if stream.is_null() {
            return set_invalid_argument("stream is null");
        }
        if value.is_null() {
            return set_invalid_argument("value is null");
        }

        let ty = match LppType::try_from(type_code) {
            Ok(ty) => ty,
            Err(err) => return map_lpp_error(&err),
        };
        let Some(encoding) = ty.encoding() else {
            return map_lpp_error(&cayenne_lpp_codec::LppError::NotImplemented(ty));
        };

        // SAFETY: Pointer validity and active field are guaranteed by the caller.
        let value = unsafe { (*value).to_value(encoding) };
        // SAFETY: Stream handle validity is guaranteed by the caller.
        let stream = unsafe { &mut (*stream).inner };

        match stream.write(channel, ty, &value) {
            Ok(()) => CayenneLppResult::Success,
            Err(err) => map_lpp_error(&err),
        }
    })
}

/// Read the next record from a decoding stream.
///
/// Returns `EndOfStream` once every record has been read.
///
/// # Safety
/// `stream` must be a live stream handle; the output pointers must be valid
/// for writes.
#[no_mangle]
pub unsafe extern "C" fn cayenne_lpp_stream_read(
    stream: *mut CayenneLppStream,
    channel: *mut u8,
    type_code: *mut u8,
    value: *mut CayenneLppValue,
) -> CayenneLppResult {
    crate::ffi_boundary(CayenneLppResult::Internal, || {
        if stream.is_null() || channel.is_null() || type_code.is_null() || value.is_null() {
            return set_invalid_argument("stream and output pointers must be non-null");
        }

        // SAFETY: Stream handle validity is guaranteed by the caller.
        let stream = unsafe { &mut (*stream).inner };
        match stream.read() {
            Ok(Some(record)) => {
                // SAFETY: Output pointer validity is guaranteed by the caller.
                unsafe {
                    *channel = record.channel;
                    *type_code = record.ty.code();
                    *value = CayenneLppValue::from(record.value);
                }
                CayenneLppResult::Success
            }
            Ok(None) => CayenneLppResult::EndOfStream,
            Err(err) => map_lpp_error(&err),
        }
    })
}

/// Return the stream buffer, optionally reporting its capacity and the
/// number of bytes written.
///
/// # Safety
/// `stream` must be a live stream handle. `buffer_size` and `stream_size`
/// must each be null or valid for writes. The returned pointer is valid until
/// the stream is written to, reset or deleted.
#[no_mangle]
pub unsafe extern "C" fn cayenne_lpp_stream_get_buffer(
    stream: *const CayenneLppStream,
    buffer_size: *mut usize,
    stream_size: *mut usize,
) -> *const u8 {
    crate::ffi_boundary(ptr::null(), || {
        if stream.is_null() {
            set_invalid_argument("stream is null");
            return ptr::null();
        }

        // SAFETY: Stream handle validity is guaranteed by the caller.
        let view = unsafe { (*stream).inner.buffer() };
        if !buffer_size.is_null() {
            // SAFETY: Output pointer validity is guaranteed by the caller.
            unsafe { *buffer_size = view.capacity };
        }
        if !stream_size.is_null() {
            // SAFETY: Output pointer validity is guaranteed by the caller.
            unsafe { *stream_size = view.used };
        }
        view.data.as_ptr()
    })
}

/// Free space left in the stream; zero for a null handle.
///
/// # Safety
/// `stream` must be null or a live stream handle.
#[no_mangle]
pub unsafe extern "C" fn cayenne_lpp_stream_get_free_space(
    stream: *const CayenneLppStream,
) -> usize {
    crate::ffi_boundary(0, || {
        if stream.is_null() {
            return 0;
        }
        // SAFETY: Stream handle validity is guaranteed by the caller.
        unsafe { (*stream).inner.free_space() }
    })
}

/// Rewind the write and read cursors.
///
/// # Safety
/// `stream` must be null or a live stream handle.
#[no_mangle]
pub unsafe extern "C" fn cayenne_lpp_stream_reset(stream: *mut CayenneLppStream) {
    crate::ffi_boundary((), || {
        if stream.is_null() {
            return;
        }
        // SAFETY: Stream handle validity is guaranteed by the caller.
        unsafe { (*stream).inner.reset() };
    });
}
