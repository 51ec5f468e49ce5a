mod session;

use std::io::{self, prelude::*};

use crate::{
    bufread::Reader,
    engine::{Action, Engine, Liblzma, Status},
    errors::Result,
    flags::DecoderFlags,
    Error,
};

pub use self::session::Session;

/// Default size of source reads and of output chunks.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Decoder settings. Cheap to clone; every decode opens its own session.
#[derive(Debug, Clone)]
pub struct Decoder {
    chunk_size: usize,
    /// Output chunk size when set apart from `chunk_size`.
    staging_len: Option<usize>,
    memlimit: u64,
    flags: DecoderFlags,
}

impl Default for Decoder {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            staging_len: None,
            memlimit: u64::MAX,
            flags: DecoderFlags::empty(),
        }
    }
}

impl Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes read from the source per step. Output chunks are the same size
    /// unless [`staging_len`](Self::staging_len) is set, in either order.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size` is 0.
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        assert_ne!(chunk_size, 0, "chunk size must be positive");
        self.chunk_size = chunk_size;
        self
    }

    /// Size of output chunks, independently of the read size.
    ///
    /// # Panics
    ///
    /// Panics if `staging_len` is 0.
    pub fn staging_len(mut self, staging_len: usize) -> Self {
        assert_ne!(staging_len, 0, "staging length must be positive");
        self.staging_len = Some(staging_len);
        self
    }

    /// Engine memory usage limit in bytes. Unlimited by default.
    pub fn memlimit(mut self, memlimit: u64) -> Self {
        self.memlimit = memlimit;
        self
    }

    pub fn flags(mut self, flags: DecoderFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Start decoding `source` with liblzma.
    pub fn open<R: Read>(&self, source: R) -> Result<Driver<R, Liblzma>> {
        self.open_with(Liblzma::new()?, source)
    }

    /// Start decoding `source` with the given engine.
    pub fn open_with<R: Read, E: Engine>(&self, engine: E, source: R) -> Result<Driver<R, E>> {
        let session = Session::open(engine, self.memlimit, self.flags)?;

        Ok(Driver {
            source,
            session,
            input: vec![0; self.chunk_size],
            in_pos: 0,
            in_len: 0,
            action: Action::Run,
            staging: vec![0; self.staging_len.unwrap_or(self.chunk_size)],
            state: State::Feed,
        })
    }

    /// Decompress all of `source` into memory.
    ///
    /// On error, output decoded so far is discarded.
    pub fn decompress<R: Read>(&self, source: R) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.decompress_with(source, |chunk| {
            out.extend_from_slice(chunk);
            Ok(())
        })?;
        Ok(out)
    }

    /// Decompress `source`, handing each output chunk to `sink` in order.
    ///
    /// Returns the source once the stream has ended. Chunks delivered before
    /// an error are not taken back.
    pub fn decompress_with<R, F>(&self, source: R, sink: F) -> Result<R>
    where
        R: Read,
        F: FnMut(&[u8]) -> io::Result<()>,
    {
        self.open(source)?.drain_into(sink)
    }

    /// Decompress `source` lazily, as an iterator of owned chunks.
    pub fn chunks<R: Read>(&self, source: R) -> Result<Chunks<R, Liblzma>> {
        Ok(self.open(source)?.into_chunks())
    }

    /// Decompress `source` lazily, behind a `BufRead`.
    pub fn reader<R: Read>(&self, source: R) -> Result<Reader<R, Liblzma>> {
        Ok(Reader::new(self.open(source)?))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// The current input chunk is used up; read the next one.
    Feed,
    /// Step the engine over the current input chunk.
    Drain,
    /// The engine reported the end of the stream.
    Ended,
    Done,
}

/// Drives one session: reads bounded input chunks from the source and steps
/// the engine until it reports the end of the stream.
pub struct Driver<R, E: Engine> {
    source: R,
    session: Session<E>,

    input: Vec<u8>,
    /// Start of the unconsumed part of `input`.
    in_pos: usize,
    /// How much of `input` the last read filled.
    in_len: usize,
    action: Action,

    staging: Vec<u8>,
    state: State,
}

impl<R: Read, E: Engine> Driver<R, E> {
    /// Get the next output chunk.
    ///
    /// Return `Ok(None)` once the stream has ended. After an error the driver
    /// is finished and keeps returning `Ok(None)`.
    pub fn next_chunk(&mut self) -> Result<Option<&[u8]>> {
        match self.fill_staging()? {
            0 => Ok(None),
            n => Ok(Some(&self.staging[..n])),
        }
    }

    /// Push every remaining chunk into `sink`, then give back the source.
    pub fn drain_into<F>(mut self, mut sink: F) -> Result<R>
    where
        F: FnMut(&[u8]) -> io::Result<()>,
    {
        while let Some(chunk) = self.next_chunk()? {
            sink(chunk)?;
        }
        Ok(self.into_source())
    }

    pub fn into_chunks(self) -> Chunks<R, E> {
        Chunks { driver: self }
    }

    /// Release the session and return the source.
    pub fn into_source(self) -> R {
        self.source
    }

    pub fn session(&self) -> &Session<E> {
        &self.session
    }

    /// Step until some output is staged, and return its length. Returns 0
    /// once done, including after an error.
    pub(crate) fn fill_staging(&mut self) -> Result<usize> {
        self.advance().map_err(|e| {
            self.state = State::Done;
            e
        })
    }

    /// The staging buffer, valid up to the last length from `fill_staging`.
    pub(crate) fn staged(&self) -> &[u8] {
        &self.staging
    }

    fn advance(&mut self) -> Result<usize> {
        loop {
            match self.state {
                State::Done => return Ok(0),
                State::Feed => self.feed()?,
                State::Drain => {
                    let produced = self.drain_once()?;
                    if produced > 0 {
                        return Ok(produced);
                    }
                }
                State::Ended => {
                    self.ensure_source_exhausted()?;
                    self.state = State::Done;
                }
            }
        }
    }

    fn feed(&mut self) -> Result<()> {
        self.in_len = read_chunk(&mut self.source, &mut self.input)?;
        self.in_pos = 0;

        // A short read means the source is exhausted.
        self.action = if self.in_len < self.input.len() {
            Action::Finish
        } else {
            Action::Run
        };
        self.state = State::Drain;
        Ok(())
    }

    fn drain_once(&mut self) -> Result<usize> {
        let step = self.session.step(
            &self.input[self.in_pos..self.in_len],
            &mut self.staging,
            self.action,
        )?;
        self.in_pos += step.consumed;

        if step.status == Status::StreamEnd {
            self.state = State::Ended;
        } else if self.action == Action::Run {
            // A completely filled staging buffer may mean more output is
            // pending for the same input.
            let output_full = step.produced == self.staging.len();
            let input_pending = self.in_pos < self.in_len;
            if !output_full && !input_pending {
                self.state = State::Feed;
            }
        }
        // Under `Finish`, keep stepping until the engine either ends the
        // stream or reports that it cannot (e.g. truncated input).

        Ok(step.produced)
    }

    fn ensure_source_exhausted(&mut self) -> Result<()> {
        if self.in_pos < self.in_len {
            return Err(Error::TrailingData);
        }

        if self.action == Action::Run {
            let mut probe = [0; 1];
            if read_chunk(&mut self.source, &mut probe)? != 0 {
                return Err(Error::TrailingData);
            }
        }

        Ok(())
    }
}

/// Fill `buf` from `source`, stopping early only at end of stream.
fn read_chunk(source: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Output chunks of a driver, as owned buffers.
///
/// Ends after the first error.
pub struct Chunks<R, E: Engine> {
    driver: Driver<R, E>,
}

impl<R: Read, E: Engine> Iterator for Chunks<R, E> {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.driver
            .next_chunk()
            .map(|chunk| chunk.map(<[u8]>::to_vec))
            .map_err(io::Error::from)
            .transpose()
    }
}
