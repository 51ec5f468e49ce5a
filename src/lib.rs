//! Streaming `.xz` / `.lzma` decompression through the native liblzma.
//!
//! All decoding happens inside liblzma. This crate drives it: source bytes go
//! in a bounded chunk at a time, and output comes back as bounded chunks, pushed
//! to a sink ([`decompress_with`]), collected ([`decompress`]), pulled
//! ([`Decoder::chunks`], [`reader`]) or written to a file ([`extract`]).

mod bufread;
mod decoder;
pub mod engine;
mod errors;
mod extract;
mod flags;
#[cfg(test)]
mod testing;

use std::{
    io::{self, Read},
    path::{Path, PathBuf},
};

pub use crate::bufread::Reader;
pub use crate::decoder::{Chunks, Decoder, Driver, Session, DEFAULT_CHUNK_SIZE};
pub use crate::engine::Liblzma;
pub use crate::errors::{Error, Result};
pub use crate::extract::default_destination;
pub use crate::flags::DecoderFlags;

/// Decompress all of `source` into memory.
///
/// A byte slice is a reader too: `decompress(&bytes[..])`.
pub fn decompress(source: impl Read) -> Result<Vec<u8>> {
    Decoder::new().decompress(source)
}

/// Decompress `source` in `chunk_size` pieces, calling `sink` once per output
/// chunk. Returns the source when done.
///
/// # Panics
///
/// Panics if `chunk_size` is 0.
pub fn decompress_with<R, F>(source: R, chunk_size: usize, sink: F) -> Result<R>
where
    R: Read,
    F: FnMut(&[u8]) -> io::Result<()>,
{
    Decoder::new()
        .chunk_size(chunk_size)
        .decompress_with(source, sink)
}

/// Decompress `source` lazily, behind a `BufRead`.
pub fn reader<R: Read>(source: R) -> Result<Reader<R, Liblzma>> {
    Decoder::new().reader(source)
}

/// Decompress the file at `path`. See [`Decoder::extract`].
///
/// # Panics
///
/// Panics if `chunk_size` is 0.
pub fn extract(
    path: impl AsRef<Path>,
    destination: Option<&Path>,
    chunk_size: usize,
) -> Result<PathBuf> {
    Decoder::new().chunk_size(chunk_size).extract(path, destination)
}
