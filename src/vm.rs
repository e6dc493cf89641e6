use std::io::{self, Read, Write};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::{OutOfRangeError, VmError};
use crate::instruction::{Inst, InstType};

pub const TAPE_LEN: usize = 30_000;

/// Runs a compiled program against a fresh tape.
///
/// The program is only borrowed, so one compilation can drive any number of
/// runs. Each `Vm` owns its tape and both pointers.
pub struct Vm<'p, R, W> {
    prog: &'p [Inst],
    data: Vec<u8>,
    dp: usize,
    ip: usize,
    input: R,
    output: W,
    flush: bool,
}

impl<'p, R: Read, W: Write> Vm<'p, R, W> {
    pub fn new(prog: &'p [Inst], input: R, output: W) -> Self {
        Vm {
            prog,
            data: vec![0u8; TAPE_LEN],
            dp: 0,
            ip: 0,
            input,
            output,
            flush: false,
        }
    }

    /// Flush the output stream after every `Write` instruction.
    pub fn with_flush(mut self, flush: bool) -> Self {
        self.flush = flush;
        self
    }

    pub fn tape(&self) -> &[u8] {
        &self.data
    }

    pub fn dp(&self) -> usize {
        self.dp
    }

    pub fn ip(&self) -> usize {
        self.ip
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Executes until the instruction pointer runs off the end of the
    /// program. Output is flushed before returning, also on error.
    pub fn run(&mut self) -> Result<Duration, VmError> {
        let start = Instant::now();
        let mut dispatched: u64 = 0;
        let outcome = self.execute(&mut dispatched);
        let flushed = self.output.flush();
        outcome?;
        flushed?;
        let elapsed = start.elapsed();
        debug!(
            dispatched,
            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
            "run finished"
        );
        Ok(elapsed)
    }

    fn execute(&mut self, dispatched: &mut u64) -> Result<(), VmError> {
        while self.ip < self.prog.len() {
            let Inst { cmd, value, offset } = self.prog[self.ip];
            match cmd {
                InstType::Arithmetic => {
                    let cell = &mut self.data[self.dp];
                    *cell = cell.wrapping_add(value as u8);
                }
                InstType::Pointer => {
                    self.dp = self.cell_index(self.dp as isize + value)?;
                }
                InstType::Write => {
                    let byte = self.data[self.dp];
                    for _ in 0..value {
                        self.output.write_all(&[byte])?;
                        if self.flush {
                            self.output.flush()?;
                        }
                    }
                }
                InstType::Read => {
                    for _ in 0..value {
                        self.data[self.dp] = self.read_byte()?;
                    }
                }
                InstType::JumpIfZero => {
                    if self.data[self.dp] == 0 {
                        self.ip = value as usize;
                    }
                }
                InstType::JumpUnlessZero => {
                    if self.data[self.dp] != 0 {
                        self.ip = value as usize;
                    }
                }
                InstType::Clear => self.data[self.dp] = 0,
                InstType::ScanLeft => {
                    while self.data[self.dp] != 0 {
                        self.dp = self.cell_index(self.dp as isize - 1)?;
                    }
                }
                InstType::ScanRight => {
                    while self.data[self.dp] != 0 {
                        self.dp = self.cell_index(self.dp as isize + 1)?;
                    }
                }
                InstType::Multiply => {
                    // A zero counter means the replaced loop never ran.
                    let factor = self.data[self.dp];
                    if factor != 0 {
                        let pos = self.cell_index(self.dp as isize + offset)?;
                        self.data[pos] =
                            self.data[pos].wrapping_add(factor.wrapping_mul(value as u8));
                    }
                }
            }
            self.ip += 1;
            *dispatched += 1;
        }
        Ok(())
    }

    fn cell_index(&self, target: isize) -> Result<usize, OutOfRangeError> {
        if (0..TAPE_LEN as isize).contains(&target) {
            Ok(target as usize)
        } else {
            Err(OutOfRangeError {
                ip: self.ip,
                target,
            })
        }
    }

    /// End of input reads as 0, as does a NUL byte.
    fn read_byte(&mut self) -> io::Result<u8> {
        let mut buf = [0u8];
        match self.input.read_exact(&mut buf) {
            Ok(()) => Ok(buf[0]),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(0),
            Err(e) => Err(e),
        }
    }
}
