use std::{ffi::CStr, mem, ptr};

use lzma_sys::lzma_stream;

use super::{Action, Engine, Status, Step};
use crate::{errors::Result, flags::DecoderFlags, Error};

/// liblzma 5.0.0, stable, in `LZMA_VERSION` encoding.
const MIN_VERSION: u32 = 50000002;

/// The system (or bundled) liblzma, as linked by `lzma-sys`.
///
/// The `lzma_stream` record comes straight from `lzma-sys`, whose declaration
/// follows `lzma.h` for the target's word size. Only the in/out cursors are
/// ever touched here; the reserved fields are left alone.
pub struct Liblzma {
    raw: lzma_stream,
}

// The record holds raw pointers into liblzma's own allocations, which are not
// tied to the creating thread.
unsafe impl Send for Liblzma {}

impl Liblzma {
    /// Check the linked library and return an engine with a zeroed record.
    pub fn new() -> Result<Self> {
        let version = unsafe { lzma_sys::lzma_version_number() };
        if version < MIN_VERSION {
            return Err(Error::Library {
                version: version_string(),
            });
        }

        Ok(Self {
            // All-zero is `LZMA_STREAM_INIT`: null pointers, zero counters.
            raw: unsafe { mem::zeroed() },
        })
    }
}

/// The linked library's version, e.g. `"5.2.5"`.
pub fn version_string() -> String {
    let raw = unsafe { lzma_sys::lzma_version_string() };
    if raw.is_null() {
        return String::from("unknown");
    }
    unsafe { CStr::from_ptr(raw) }.to_string_lossy().into_owned()
}

impl Engine for Liblzma {
    fn init(&mut self, memlimit: u64, flags: DecoderFlags) -> Status {
        let ret = unsafe { lzma_sys::lzma_auto_decoder(&mut self.raw, memlimit, flags.bits()) };
        Status::from_raw(ret as u32)
    }

    fn step(&mut self, input: &[u8], output: &mut [u8], action: Action) -> Step {
        self.raw.next_in = input.as_ptr();
        self.raw.avail_in = input.len();
        self.raw.next_out = output.as_mut_ptr();
        self.raw.avail_out = output.len();

        let action = match action {
            Action::Run => lzma_sys::LZMA_RUN,
            Action::Finish => lzma_sys::LZMA_FINISH,
        };
        let ret = unsafe { lzma_sys::lzma_code(&mut self.raw, action) };

        let consumed = input.len() - self.raw.avail_in;
        let produced = output.len() - self.raw.avail_out;

        // Don't leave the record pointing into buffers we only borrowed.
        self.raw.next_in = ptr::null();
        self.raw.avail_in = 0;
        self.raw.next_out = ptr::null_mut();
        self.raw.avail_out = 0;

        Step {
            status: Status::from_raw(ret as u32),
            consumed,
            produced,
        }
    }

    fn release(&mut self) {
        unsafe { lzma_sys::lzma_end(&mut self.raw) }
    }
}
