//! The seam between the chunked driver and the native decoding engine.
//!
//! Everything ABI-shaped (the `lzma_stream` record, raw entry points) lives
//! behind [`Engine`], so the driver only ever sees slices and [`Status`].

mod liblzma;
#[cfg(test)]
pub(crate) mod probe;

use std::fmt;

use crate::flags::DecoderFlags;

pub use self::liblzma::{version_string, Liblzma};

/// What the engine should do with the input it is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// More input may follow.
    Run,
    /// The input handed over now is the last of it.
    Finish,
}

/// An engine return code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    StreamEnd,
    NoCheck,
    UnsupportedCheck,
    GetCheck,
    MemError,
    MemlimitError,
    FormatError,
    OptionsError,
    DataError,
    BufError,
    ProgError,
    /// A code newer than this crate.
    Other(u32),
}

impl Status {
    /// Map a raw `lzma_ret` value.
    pub fn from_raw(ret: u32) -> Self {
        match ret {
            0 => Status::Ok,
            1 => Status::StreamEnd,
            2 => Status::NoCheck,
            3 => Status::UnsupportedCheck,
            4 => Status::GetCheck,
            5 => Status::MemError,
            6 => Status::MemlimitError,
            7 => Status::FormatError,
            8 => Status::OptionsError,
            9 => Status::DataError,
            10 => Status::BufError,
            11 => Status::ProgError,
            other => Status::Other(other),
        }
    }

    /// Statuses that only report on the integrity check, and which the
    /// engine only returns when asked to via a `TELL_*` flag.
    pub fn is_informational(self) -> bool {
        matches!(
            self,
            Status::NoCheck | Status::UnsupportedCheck | Status::GetCheck
        )
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Status::Ok => "operation completed successfully",
            Status::StreamEnd => "end of stream reached",
            Status::NoCheck => "input stream has no integrity check",
            Status::UnsupportedCheck => "cannot verify the integrity check type",
            Status::GetCheck => "integrity check type is now available",
            Status::MemError => "cannot allocate memory",
            Status::MemlimitError => "memory usage limit reached",
            Status::FormatError => "file format not recognized",
            Status::OptionsError => "invalid or unsupported options",
            Status::DataError => "compressed data is corrupt",
            Status::BufError => "no progress is possible (truncated input?)",
            Status::ProgError => "programming error",
            Status::Other(ret) => return write!(f, "unknown status code {ret}"),
        };
        f.write_str(msg)
    }
}

/// The outcome of one decode step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub status: Status,
    /// Bytes taken from the front of the input slice.
    pub consumed: usize,
    /// Bytes written to the front of the output slice.
    pub produced: usize,
}

/// An incremental decoder that auto-detects the `.xz` / `.lzma` container.
///
/// Implementations hold native resources: once `init` has returned
/// [`Status::Ok`], `release` must be called exactly once. The driver ties
/// that call to [`Session`](crate::Session)'s `Drop`.
pub trait Engine {
    fn init(&mut self, memlimit: u64, flags: DecoderFlags) -> Status;

    /// Consume from `input` and write to `output` as far as either allows.
    fn step(&mut self, input: &[u8], output: &mut [u8], action: Action) -> Step;

    fn release(&mut self);
}
