use std::io::{self, prelude::*};

use crate::{decoder::Driver, engine::Engine};

/// Decompressed data behind `BufRead`, so it can go through `io::copy`,
/// `read_to_end`, `lines()` and friends.
///
/// Reads are served straight out of the driver's staging buffer.
pub struct Reader<R, E: Engine> {
    driver: Driver<R, E>,
    /// Read position within the staged output.
    pos: usize,
    /// How much of the staging buffer the last step filled.
    len: usize,
}

impl<R: Read, E: Engine> Reader<R, E> {
    pub fn new(driver: Driver<R, E>) -> Self {
        Self {
            driver,
            pos: 0,
            len: 0,
        }
    }

    pub fn driver(&self) -> &Driver<R, E> {
        &self.driver
    }
}

impl<R: Read, E: Engine> BufRead for Reader<R, E> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        if self.pos == self.len {
            self.len = self.driver.fill_staging()?;
            self.pos = 0;
        }

        Ok(&self.driver.staged()[self.pos..self.len])
    }

    fn consume(&mut self, amt: usize) {
        self.pos = (self.pos + amt).min(self.len);
    }
}

impl<R: Read, E: Engine> Read for Reader<R, E> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.fill_buf()?.read(buf)?;
        self.consume(n);

        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{decoder::Decoder, engine::probe::ProbeEngine, engine::Status};

    #[test]
    fn reads_across_chunk_boundaries() -> anyhow::Result<()> {
        let (engine, _probe) = ProbeEngine::new();
        let driver = Decoder::new()
            .chunk_size(3)
            .open_with(engine, &b"hello\nworld"[..])?;

        let lines = Reader::new(driver).lines().collect::<io::Result<Vec<_>>>()?;
        assert_eq!(lines, ["hello", "world"]);
        Ok(())
    }

    #[test]
    fn errors_surface_after_earlier_data() -> anyhow::Result<()> {
        let (engine, probe) = ProbeEngine::new();
        let driver = Decoder::new()
            .chunk_size(2)
            .open_with(engine.fail_at(2, Status::DataError), &b"okay!"[..])?;
        let mut reader = Reader::new(driver);

        let mut out = vec![];
        let err = reader.read_to_end(&mut out).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert_eq!(out, b"ok");

        drop(reader);
        assert_eq!(probe.releases.get(), 1);
        Ok(())
    }

    #[test]
    fn partial_consume_stays_within_the_staged_output() -> anyhow::Result<()> {
        let payload: Vec<u8> = (0..20).collect();
        let (engine, probe) = ProbeEngine::new();
        let driver = Decoder::new()
            .chunk_size(64)
            .staging_len(5)
            .open_with(engine, &payload[..])?;
        let mut reader = Reader::new(driver);

        assert_eq!(reader.fill_buf()?, &payload[..5]);
        let steps = probe.steps.get();

        reader.consume(2);
        assert_eq!(reader.fill_buf()?, &payload[2..5]);
        assert_eq!(probe.steps.get(), steps);

        reader.consume(3);
        assert_eq!(reader.fill_buf()?, &payload[5..10]);
        assert_eq!(reader.driver().session().total_out(), 10);
        Ok(())
    }

    #[test]
    fn fill_buf_is_empty_at_the_end() -> anyhow::Result<()> {
        let (engine, _probe) = ProbeEngine::new();
        let driver = Decoder::new().open_with(engine, &b"abc"[..])?;
        let mut reader = Reader::new(driver);

        let mut out = String::new();
        reader.read_to_string(&mut out)?;
        assert_eq!(out, "abc");
        assert!(reader.fill_buf()?.is_empty());
        Ok(())
    }
}
