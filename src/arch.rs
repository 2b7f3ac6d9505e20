//! Architecture-specific control-flow classification of opcodes.
//!
//! The graph and layout algorithms are architecture-agnostic; only the
//! decision "does this mnemonic transfer control, and how" depends on the
//! instruction set. Callers with an unusual ISA can supply their own
//! [`InstructionClassifier`].

/// How an instruction affects control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowKind {
    /// Falls through to the next instruction.
    Sequential,
    /// Unconditional jump (`b`, `jmp`).
    Jump,
    /// Conditional jump (`b.eq`, `cbz`, `je`, ...).
    ConditionalJump,
    /// Function return; ends the block with no outgoing edge.
    Return,
    /// Call. Control returns to the following instruction, so calls never
    /// split a block.
    Call,
}

impl FlowKind {
    /// Whether the instruction ends a basic block.
    pub fn is_terminator(self) -> bool {
        matches!(self, Self::Jump | Self::ConditionalJump | Self::Return)
    }

    pub fn is_branch(self) -> bool {
        matches!(self, Self::Jump | Self::ConditionalJump)
    }
}

pub trait InstructionClassifier {
    fn classify(&self, opcode: &str) -> FlowKind;
}

/// Built-in mnemonic tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Arch {
    #[default]
    Arm64,
    X86,
}

impl Arch {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "arm64" | "aarch64" => Some(Self::Arm64),
            "x86" | "x86_64" | "x64" | "amd64" => Some(Self::X86),
            _ => None,
        }
    }
}

impl InstructionClassifier for Arch {
    fn classify(&self, opcode: &str) -> FlowKind {
        let opcode = opcode.trim().to_ascii_lowercase();
        match self {
            Self::Arm64 => classify_arm64(&opcode),
            Self::X86 => classify_x86(&opcode),
        }
    }
}

fn classify_arm64(opcode: &str) -> FlowKind {
    match opcode {
        "ret" | "retaa" | "retab" | "eret" => FlowKind::Return,
        "bl" | "blr" => FlowKind::Call,
        "b" | "br" => FlowKind::Jump,
        "cbz" | "cbnz" | "tbz" | "tbnz" => FlowKind::ConditionalJump,
        _ if opcode.starts_with("b.") => FlowKind::ConditionalJump,
        _ => FlowKind::Sequential,
    }
}

fn classify_x86(opcode: &str) -> FlowKind {
    match opcode {
        "ret" | "retn" | "retf" | "iret" | "iretd" | "iretq" => FlowKind::Return,
        "call" | "lcall" => FlowKind::Call,
        "jmp" | "ljmp" => FlowKind::Jump,
        "loop" | "loope" | "loopne" | "jcxz" | "jecxz" | "jrcxz" => FlowKind::ConditionalJump,
        // jcc family: je, jne, ja, jb, jg, jl, js, jo, jp and their aliases.
        _ if opcode.starts_with('j') => FlowKind::ConditionalJump,
        _ => FlowKind::Sequential,
    }
}
