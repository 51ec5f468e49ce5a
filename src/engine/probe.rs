//! An instrumented stand-in engine for driver tests.
//!
//! Decoding is the identity: input bytes are copied to the output. Every call
//! is counted so tests can check the init/step/release discipline.

use std::{cell::Cell, rc::Rc};

use super::{Action, Engine, Status, Step};
use crate::flags::DecoderFlags;

#[derive(Debug, Default)]
pub struct Probe {
    pub inits: Cell<usize>,
    pub steps: Cell<usize>,
    pub finishes: Cell<usize>,
    pub releases: Cell<usize>,
}

pub struct ProbeEngine {
    probe: Rc<Probe>,
    init_status: Status,
    fail_at: Option<(usize, Status)>,
}

impl ProbeEngine {
    pub fn new() -> (Self, Rc<Probe>) {
        let probe = Rc::new(Probe::default());
        let engine = Self {
            probe: Rc::clone(&probe),
            init_status: Status::Ok,
            fail_at: None,
        };
        (engine, probe)
    }

    pub fn init_status(mut self, status: Status) -> Self {
        self.init_status = status;
        self
    }

    /// Make the `step`th call (counting from 0) fail without progress.
    pub fn fail_at(mut self, step: usize, status: Status) -> Self {
        self.fail_at = Some((step, status));
        self
    }
}

fn bump(counter: &Cell<usize>) -> usize {
    let n = counter.get();
    counter.set(n + 1);
    n
}

impl Engine for ProbeEngine {
    fn init(&mut self, _memlimit: u64, _flags: DecoderFlags) -> Status {
        bump(&self.probe.inits);
        self.init_status
    }

    fn step(&mut self, input: &[u8], output: &mut [u8], action: Action) -> Step {
        let index = bump(&self.probe.steps);
        if action == Action::Finish {
            bump(&self.probe.finishes);
        }

        if let Some((at, status)) = self.fail_at {
            if index == at {
                return Step {
                    status,
                    consumed: 0,
                    produced: 0,
                };
            }
        }

        let n = input.len().min(output.len());
        output[..n].copy_from_slice(&input[..n]);
        let status = if action == Action::Finish && n == input.len() {
            Status::StreamEnd
        } else {
            Status::Ok
        };

        Step {
            status,
            consumed: n,
            produced: n,
        }
    }

    fn release(&mut self) {
        bump(&self.probe.releases);
    }
}
