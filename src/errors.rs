use std::io;
use std::path::PathBuf;

use crate::engine::Status;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// An error encountered while driving a decoder session.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The engine refused to set up an auto-detecting decoder.
    #[error("decoder configuration rejected: {status}")]
    Configuration { status: Status },

    /// A decode step failed. Output already handed to a sink stays delivered.
    #[error("decode failed: {status}")]
    Decode { status: Status },

    /// The linked liblzma is older than the 5.x series.
    #[error("unsupported liblzma version {version}")]
    Library { version: String },

    #[error("unexpected data after the end of the compressed stream")]
    TrailingData,

    /// The destination would be the compressed file itself.
    #[error("refusing to overwrite input file {}", .path.display())]
    Destination { path: PathBuf },

    /// An error yielded by the source, the sink, or the filesystem.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<Error> for io::Error {
    fn from(e: Error) -> Self {
        match e {
            Error::Io(e) => e,
            Error::Decode { .. } | Error::TrailingData => {
                io::Error::new(io::ErrorKind::InvalidData, e)
            }
            e => io::Error::new(io::ErrorKind::Other, e),
        }
    }
}
