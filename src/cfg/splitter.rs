use std::collections::{BTreeSet, HashMap};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::arch::{FlowKind, InstructionClassifier};
use crate::ir::{BasicBlock, Cfg, Edge, EdgeKind, Instruction};

/// First `0x`-prefixed hex literal in the operand text. A heuristic: operands
/// containing unrelated hex-looking substrings can misfire, and a miss simply
/// leaves the jump target unresolved.
static HEX_LITERAL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"0[xX][0-9a-fA-F]+").unwrap());

/// Canonical address key: lowercase hex with the `0x` prefix and leading
/// zeros stripped, so jump-target text can be matched against instruction
/// addresses regardless of formatting. Returns `None` for non-hex text.
pub(crate) fn normalize_address(text: &str) -> Option<String> {
    let text = text.trim();
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() {
        Some("0".to_string())
    } else {
        Some(trimmed.to_ascii_lowercase())
    }
}

/// Numeric value of an address string, for address-order ranking.
pub(crate) fn address_value(text: &str) -> Option<u64> {
    let key = normalize_address(text)?;
    u64::from_str_radix(&key, 16).ok()
}

fn jump_target(operands: &str, addr_index: &HashMap<String, usize>) -> Option<usize> {
    let literal = HEX_LITERAL_RE.find(operands)?;
    let key = normalize_address(literal.as_str())?;
    addr_index.get(&key).copied()
}

/// Partitions an address-ordered instruction stream into basic blocks and
/// control-transfer edges.
///
/// Unresolvable jump targets drop that one edge; instructions whose address
/// fails to parse are omitted from the address index (branches to them stay
/// unresolved) but remain in their block. Empty input yields an empty graph.
pub fn split_blocks(instructions: &[Instruction], classifier: &dyn InstructionClassifier) -> Cfg {
    if instructions.is_empty() {
        return Cfg::default();
    }

    let mut addr_index: HashMap<String, usize> = HashMap::new();
    for (idx, insn) in instructions.iter().enumerate() {
        if let Some(key) = normalize_address(&insn.address) {
            addr_index.entry(key).or_insert(idx);
        }
    }

    // Leaders: index 0, the instruction after every terminator, and every
    // resolvable branch target. Calls return to the following instruction
    // and never split a block.
    let mut leaders: BTreeSet<usize> = BTreeSet::new();
    leaders.insert(0);
    for (idx, insn) in instructions.iter().enumerate() {
        let kind = classifier.classify(&insn.opcode);
        if !kind.is_terminator() {
            continue;
        }
        if idx + 1 < instructions.len() {
            leaders.insert(idx + 1);
        }
        if kind.is_branch() {
            if let Some(target) = jump_target(&insn.operands, &addr_index) {
                leaders.insert(target);
            }
        }
    }

    let starts: Vec<usize> = leaders.into_iter().collect();
    let mut block_of_insn = vec![0usize; instructions.len()];
    let mut blocks: Vec<BasicBlock> = Vec::with_capacity(starts.len());
    for (bi, &start) in starts.iter().enumerate() {
        let end = starts.get(bi + 1).copied().unwrap_or(instructions.len());
        for slot in block_of_insn.iter_mut().take(end).skip(start) {
            *slot = bi;
        }
        blocks.push(BasicBlock {
            id: format!("b{bi}"),
            start_address: instructions[start].address.clone(),
            end_address: instructions[end - 1].address.clone(),
            instructions: instructions[start..end].to_vec(),
            successors: Vec::new(),
            predecessors: Vec::new(),
            is_entry: bi == 0,
            is_exit: false,
        });
    }

    let mut edges: Vec<Edge> = Vec::new();
    let push_edge = |edges: &mut Vec<Edge>, from: usize, to: usize, kind: EdgeKind| {
        edges.push(Edge {
            from: format!("b{from}"),
            to: format!("b{to}"),
            kind,
        });
    };
    for (bi, &start) in starts.iter().enumerate() {
        let end = starts.get(bi + 1).copied().unwrap_or(instructions.len());
        let terminal = &instructions[end - 1];
        match classifier.classify(&terminal.opcode) {
            FlowKind::Return => {}
            FlowKind::Jump => {
                if let Some(target) = jump_target(&terminal.operands, &addr_index) {
                    push_edge(&mut edges, bi, block_of_insn[target], EdgeKind::Unconditional);
                }
            }
            FlowKind::ConditionalJump => {
                if let Some(target) = jump_target(&terminal.operands, &addr_index) {
                    push_edge(&mut edges, bi, block_of_insn[target], EdgeKind::ConditionalTrue);
                }
                if bi + 1 < blocks.len() {
                    push_edge(&mut edges, bi, bi + 1, EdgeKind::ConditionalFalse);
                }
            }
            FlowKind::Sequential | FlowKind::Call => {
                if bi + 1 < blocks.len() {
                    push_edge(&mut edges, bi, bi + 1, EdgeKind::Normal);
                }
            }
        }
    }

    for edge in &edges {
        let from = edge.from[1..].parse::<usize>().unwrap_or(0);
        let to = edge.to[1..].parse::<usize>().unwrap_or(0);
        blocks[from].successors.push(edge.to.clone());
        blocks[to].predecessors.push(edge.from.clone());
    }
    for block in &mut blocks {
        block.is_exit = block.successors.is_empty();
    }

    Cfg { blocks, edges }
}
