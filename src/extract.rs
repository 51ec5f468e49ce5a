use std::{
    ffi::OsStr,
    fs::{self, File},
    io::{prelude::*, BufWriter},
    path::{Path, PathBuf},
};

use log::{debug, warn};

use crate::{decoder::Decoder, errors::Result, Error};

/// `path` with a trailing `.xz` or `.lzma` extension removed.
///
/// Any other path comes back unchanged.
pub fn default_destination(path: &Path) -> PathBuf {
    match path.extension().and_then(OsStr::to_str) {
        Some("xz" | "lzma") => path.with_extension(""),
        _ => path.to_path_buf(),
    }
}

impl Decoder {
    /// Decompress the file at `path` into `destination`, or next to it with
    /// the compression extension removed.
    ///
    /// An existing destination file is overwritten. If decoding fails, the
    /// partial output is removed.
    pub fn extract(&self, path: impl AsRef<Path>, destination: Option<&Path>) -> Result<PathBuf> {
        let path = path.as_ref();
        let destination = match destination {
            Some(destination) => destination.to_path_buf(),
            None => default_destination(path),
        };
        if destination == path {
            return Err(Error::Destination { path: destination });
        }

        let source = File::open(path)?;
        let mut out = BufWriter::new(File::create(&destination)?);

        let written = self
            .decompress_with(source, |chunk| out.write_all(chunk))
            .and_then(|_| out.flush().map_err(Error::from));

        if let Err(e) = written {
            drop(out);
            if let Err(remove_err) = fs::remove_file(&destination) {
                warn!(
                    "couldn't remove partial output {}: {remove_err}",
                    destination.display()
                );
            }
            return Err(e);
        }

        debug!("extracted {} to {}", path.display(), destination.display());
        Ok(destination)
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;
    use crate::testing::{lzma_alone_compress, xz_compress};

    #[test_case("a.xz", "a")]
    #[test_case("dir/archive.tar.xz", "dir/archive.tar")]
    #[test_case("data.lzma", "data")]
    #[test_case("notes.txt", "notes.txt")]
    #[test_case("a.XZ", "a.XZ" ; "extension match is case sensitive")]
    fn destination_strips_compression_extension(path: &str, expected: &str) {
        assert_eq!(default_destination(Path::new(path)), Path::new(expected));
    }

    #[test]
    fn extract_overwrites_existing_destination() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let compressed = dir.path().join("a.xz");
        let target = dir.path().join("a");
        fs::write(&compressed, xz_compress(b"fresh contents"))?;
        fs::write(&target, b"stale contents that are longer than the new ones")?;

        let written = Decoder::new().extract(&compressed, None)?;

        assert_eq!(written, target);
        assert_eq!(fs::read(&target)?, b"fresh contents");
        Ok(())
    }

    #[test]
    fn extract_to_explicit_destination() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let compressed = dir.path().join("legacy.lzma");
        let target = dir.path().join("elsewhere.bin");
        let payload = b"legacy container".repeat(500);
        fs::write(&compressed, lzma_alone_compress(&payload))?;

        let written = Decoder::new()
            .chunk_size(16)
            .extract(&compressed, Some(target.as_path()))?;

        assert_eq!(written, target);
        assert_eq!(fs::read(&target)?, payload);
        assert!(!dir.path().join("legacy").exists());
        Ok(())
    }

    #[test]
    fn extract_refuses_to_overwrite_its_input() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let compressed = dir.path().join("archive.bin");
        fs::write(&compressed, xz_compress(b"payload"))?;

        let err = Decoder::new().extract(&compressed, None).unwrap_err();

        assert!(matches!(err, Error::Destination { .. }));
        assert_eq!(fs::read(&compressed)?, xz_compress(b"payload"));
        Ok(())
    }

    #[test]
    fn failed_extract_leaves_no_partial_output() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let compressed = dir.path().join("broken.xz");
        let mut data = xz_compress(&b"0123456789".repeat(1000));
        data.truncate(data.len() / 2);
        fs::write(&compressed, data)?;

        let err = Decoder::new().extract(&compressed, None).unwrap_err();

        assert!(matches!(err, Error::Decode { .. }));
        assert!(!dir.path().join("broken").exists());
        Ok(())
    }

    #[test]
    fn missing_input_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Decoder::new()
            .extract(dir.path().join("absent.xz"), None)
            .unwrap_err();

        assert!(matches!(err, Error::Io(_)));
        assert!(!dir.path().join("absent").exists());
    }
}
