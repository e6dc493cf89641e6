use std::fmt;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum InstType {
    Arithmetic,
    Pointer,
    Read,
    Write,
    JumpIfZero,
    JumpUnlessZero,
    Clear,
    ScanLeft,
    ScanRight,
    Multiply,
}

/// A single VM instruction.
///
/// `value` depends on `cmd`: the run length for `Arithmetic`/`Pointer`/`Read`/`Write`
/// (signed for the first two), the paired bracket index for the jumps, or the
/// multiplier for `Multiply`. `offset` is only meaningful for `Multiply`.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Inst {
    pub cmd: InstType,
    pub value: isize,
    pub offset: isize,
}

pub type Program = Vec<Inst>;

impl Inst {
    pub fn new(cmd: InstType, value: isize) -> Self {
        Inst {
            cmd,
            value,
            offset: 0,
        }
    }

    pub fn multiply(offset: isize, value: isize) -> Self {
        Inst {
            cmd: InstType::Multiply,
            value,
            offset,
        }
    }

    pub fn clear() -> Self {
        Inst::new(InstType::Clear, 0)
    }

    pub fn is_jump(&self) -> bool {
        matches!(self.cmd, InstType::JumpIfZero | InstType::JumpUnlessZero)
    }
}

impl fmt::Display for Inst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cmd {
            InstType::Arithmetic => write!(f, "add {}", self.value),
            InstType::Pointer => write!(f, "move {}", self.value),
            InstType::Read => write!(f, "read {}", self.value),
            InstType::Write => write!(f, "write {}", self.value),
            InstType::JumpIfZero => write!(f, "jz {}", self.value),
            InstType::JumpUnlessZero => write!(f, "jnz {}", self.value),
            InstType::Clear => write!(f, "clear"),
            InstType::ScanLeft => write!(f, "scan left"),
            InstType::ScanRight => write!(f, "scan right"),
            InstType::Multiply => write!(f, "mul [{:+}] {}", self.offset, self.value),
        }
    }
}

/// Renders a program as one numbered instruction per line.
pub fn disassemble(prog: &[Inst]) -> String {
    let width = prog.len().saturating_sub(1).to_string().len();
    let mut listing = String::new();
    for (idx, inst) in prog.iter().enumerate() {
        listing.push_str(&format!("{idx:>width$}  {inst}\n"));
    }
    listing
}
