use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::error::{Bracket, BracketMismatchError};
use crate::instruction::{Inst, InstType, Program};

/// Strips everything but the eight operator characters.
pub fn cleanup(code: &str) -> Vec<u8> {
    code.bytes()
        .filter(|&op| matches!(op, b'+' | b'-' | b'<' | b'>' | b'.' | b',' | b'[' | b']'))
        .collect()
}

/// Checks bracket balance over cleaned source.
///
/// With more `[` than `]` the first unmatched `[` is reported, with more `]`
/// than `[` the last unmatched `]`. Equal counts with broken nesting (`][`)
/// report the first unmatched `]`.
pub fn check_brackets(ops: &[u8]) -> Result<(), BracketMismatchError> {
    let mut open = Vec::new();
    let mut stray_close = Vec::new();
    for (pos, &op) in ops.iter().enumerate() {
        match op {
            b'[' => open.push(pos),
            b']' => {
                if open.pop().is_none() {
                    stray_close.push(pos);
                }
            }
            _ => {}
        }
    }
    let mismatch = if open.len() > stray_close.len() {
        open.first().map(|&pos| (pos, Bracket::Open))
    } else if stray_close.len() > open.len() {
        stray_close.last().map(|&pos| (pos, Bracket::Close))
    } else {
        stray_close.first().map(|&pos| (pos, Bracket::Close))
    };
    match mismatch {
        Some((position, bracket)) => Err(BracketMismatchError { position, bracket }),
        None => Ok(()),
    }
}

/// Emits one instruction per run of identical operators. Brackets are never
/// collapsed and get a placeholder target of 0.
pub fn emit(ops: &[u8]) -> Vec<Inst> {
    let mut prog = Vec::with_capacity(ops.len());
    let mut iter = ops.iter().copied().peekable();
    while let Some(op) = iter.next() {
        let cmd = match op {
            b'+' | b'-' => InstType::Arithmetic,
            b'<' | b'>' => InstType::Pointer,
            b',' => InstType::Read,
            b'.' => InstType::Write,
            b'[' => {
                prog.push(Inst::new(InstType::JumpIfZero, 0));
                continue;
            }
            b']' => {
                prog.push(Inst::new(InstType::JumpUnlessZero, 0));
                continue;
            }
            _ => continue,
        };
        let mut count: isize = 1;
        while iter.next_if_eq(&op).is_some() {
            count += 1;
        }
        let value = match op {
            b'-' | b'<' => -count,
            _ => count,
        };
        prog.push(Inst::new(cmd, value));
    }
    prog
}

/// Rewrites the body of an innermost loop, if it matches one of the
/// recognized shapes. Only bodies made entirely of `Arithmetic` and `Pointer`
/// instructions are considered.
fn fold_loop(body: &[Inst]) -> Option<Vec<Inst>> {
    let mut ptr: isize = 0;
    let mut changes: BTreeMap<isize, isize> = BTreeMap::new();
    for inst in body {
        match inst.cmd {
            InstType::Arithmetic => *changes.entry(ptr).or_insert(0) += inst.value,
            InstType::Pointer => {
                ptr += inst.value;
                // Every cell the pointer lands on keeps an entry, so its
                // Multiply still range-checks it even with a zero delta.
                changes.entry(ptr).or_insert(0);
            }
            _ => return None,
        }
    }
    // The counter cell loses exactly one per iteration, so the body runs
    // cell[dp] times and every other touched cell gains cell[dp] * delta.
    if ptr == 0 && changes.get(&0) == Some(&-1) {
        let mut folded: Vec<Inst> = changes
            .into_iter()
            .filter(|&(offset, _)| offset != 0)
            .map(|(offset, delta)| Inst::multiply(offset, delta))
            .collect();
        folded.push(Inst::clear());
        return Some(folded);
    }
    match body {
        // An odd step is coprime with 256 and always reaches zero.
        [inst] if inst.cmd == InstType::Arithmetic && inst.value % 2 != 0 => {
            Some(vec![Inst::clear()])
        }
        [inst] if inst.cmd == InstType::Pointer && inst.value == -1 => {
            Some(vec![Inst::new(InstType::ScanLeft, 0)])
        }
        [inst] if inst.cmd == InstType::Pointer && inst.value == 1 => {
            Some(vec![Inst::new(InstType::ScanRight, 0)])
        }
        _ => None,
    }
}

/// One left-to-right sweep. Open brackets are tracked by their index in the
/// output buffer; when a loop closes and its body folds, the buffer is
/// truncated back to the `[` and the replacement appended.
fn fold_sweep(prog: Vec<Inst>) -> (Vec<Inst>, usize) {
    let mut folded = Vec::with_capacity(prog.len());
    let mut opens: Vec<usize> = Vec::new();
    let mut rewrites = 0;
    for inst in prog {
        match inst.cmd {
            InstType::JumpIfZero => {
                opens.push(folded.len());
                folded.push(inst);
            }
            InstType::JumpUnlessZero => {
                if let Some(open) = opens.pop() {
                    if let Some(replacement) = fold_loop(&folded[open + 1..]) {
                        trace!(at = open, len = replacement.len(), "folded loop");
                        folded.truncate(open);
                        folded.extend(replacement);
                        rewrites += 1;
                        continue;
                    }
                }
                folded.push(inst);
            }
            _ => folded.push(inst),
        }
    }
    (folded, rewrites)
}

/// Applies the loop peepholes until a sweep rewrites nothing.
pub fn fold_loops(mut prog: Vec<Inst>) -> Vec<Inst> {
    let mut sweeps = 0;
    loop {
        let (folded, rewrites) = fold_sweep(prog);
        prog = folded;
        sweeps += 1;
        if rewrites == 0 {
            break;
        }
    }
    debug!(sweeps, "loop folding reached a fixed point");
    prog
}

/// Backpatches every bracket pair so that each jump holds the index of its
/// partner.
pub fn link(prog: &mut [Inst]) {
    let mut stack = Vec::new();
    for idx in 0..prog.len() {
        match prog[idx].cmd {
            InstType::JumpIfZero => stack.push(idx),
            InstType::JumpUnlessZero => {
                if let Some(open) = stack.pop() {
                    prog[open].value = idx as isize;
                    prog[idx].value = open as isize;
                }
            }
            _ => {}
        }
    }
}

pub fn compile(code: &str) -> Result<Program, BracketMismatchError> {
    let ops = cleanup(code);
    check_brackets(&ops)?;
    let emitted = emit(&ops);
    let emitted_len = emitted.len();
    let mut prog = fold_loops(emitted);
    link(&mut prog);
    debug!(
        source_len = code.len(),
        cleaned_len = ops.len(),
        emitted = emitted_len,
        folded = prog.len(),
        "compiled program"
    );
    Ok(prog)
}

/// Compiles without the loop peepholes: collapsing and linking only.
pub fn compile_unoptimized(code: &str) -> Result<Program, BracketMismatchError> {
    let ops = cleanup(code);
    check_brackets(&ops)?;
    let mut prog = emit(&ops);
    link(&mut prog);
    Ok(prog)
}
