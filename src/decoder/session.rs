use log::{debug, trace, warn};

use crate::{
    engine::{Action, Engine, Status, Step},
    errors::Result,
    flags::DecoderFlags,
    Error,
};

/// An initialized engine.
///
/// Owning a `Session` means owning the engine's native resources; they are
/// released when the session is dropped, whichever way the decode loop ends.
pub struct Session<E: Engine> {
    engine: E,
    total_in: u64,
    total_out: u64,
}

impl<E: Engine> Session<E> {
    /// Initialize `engine` as an auto-detecting decoder.
    ///
    /// A rejected configuration leaves nothing to release, so the engine is
    /// simply dropped.
    pub fn open(mut engine: E, memlimit: u64, flags: DecoderFlags) -> Result<Self> {
        match engine.init(memlimit, flags) {
            Status::Ok => {
                debug!("decoder session opened (memlimit {memlimit}, flags {flags:?})");
                Ok(Self {
                    engine,
                    total_in: 0,
                    total_out: 0,
                })
            }
            status => Err(Error::Configuration { status }),
        }
    }

    /// Run one decode step, turning fatal statuses into [`Error::Decode`].
    pub fn step(&mut self, input: &[u8], output: &mut [u8], action: Action) -> Result<Step> {
        let step = self.engine.step(input, output, action);
        self.total_in += step.consumed as u64;
        self.total_out += step.produced as u64;

        trace!(
            "{action:?} step: {}/{} bytes in, {}/{} bytes out -> {:?}",
            step.consumed,
            input.len(),
            step.produced,
            output.len(),
            step.status,
        );

        match step.status {
            Status::Ok | Status::StreamEnd => Ok(step),
            status if status.is_informational() => {
                warn!("{status}");
                Ok(step)
            }
            status => Err(Error::Decode { status }),
        }
    }

    /// Compressed bytes consumed so far.
    pub fn total_in(&self) -> u64 {
        self.total_in
    }

    /// Decompressed bytes produced so far.
    pub fn total_out(&self) -> u64 {
        self.total_out
    }
}

impl<E: Engine> Drop for Session<E> {
    fn drop(&mut self) {
        self.engine.release();
        debug!(
            "decoder session released ({} bytes in, {} bytes out)",
            self.total_in, self.total_out
        );
    }
}
