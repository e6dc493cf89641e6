pub mod compiler;
pub mod error;
pub mod instruction;
#[cfg(feature = "python")]
mod python;
pub mod vm;

use std::ffi::CStr;
use std::io::{self, Read, Write};
use std::os::raw::{c_char, c_int, c_uchar};
use std::time::Duration;

pub use compiler::{compile, compile_unoptimized};
pub use error::{Bracket, BracketMismatchError, Error, OutOfRangeError, VmError};
pub use instruction::{Inst, InstType, Program, disassemble};
pub use vm::{TAPE_LEN, Vm};

/// Compiles `code` and runs it once against `input` and `output`.
pub fn execute<R: Read, W: Write>(code: &str, input: R, output: W) -> Result<Duration, Error> {
    let prog = compile(code)?;
    let elapsed = Vm::new(&prog, input, output).run()?;
    Ok(elapsed)
}

/// Execute Brainfuck code through a C-compatible interface, reading stdin and
/// writing stdout.
///
/// Returns 0 on success, 1 on a bracket mismatch, 2 on a runtime error and -1
/// if `code` is null or not UTF-8.
///
/// # Safety
/// `code` must be null or a valid null-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn bfexec_run(code: *const c_char, flush: c_uchar) -> c_int {
    if code.is_null() {
        return -1;
    }
    let c_str = unsafe { CStr::from_ptr(code) };
    let Ok(code_str) = c_str.to_str() else {
        return -1;
    };
    let prog = match compile(code_str) {
        Ok(prog) => prog,
        Err(_) => return 1,
    };
    let mut vm = Vm::new(&prog, io::stdin().lock(), io::stdout().lock()).with_flush(flush != 0);
    match vm.run() {
        Ok(_) => 0,
        Err(_) => 2,
    }
}
