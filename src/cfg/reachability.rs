use std::collections::{HashMap, HashSet, VecDeque};

use crate::ir::Cfg;

use super::CfgError;

/// BFS from the entry block over successors; keeps the blocks reached (in
/// construction order) and the edges whose both endpoints are reached.
/// Successor/predecessor lists and exit flags are rebuilt for the surviving
/// subgraph.
pub fn filter_reachable(cfg: &Cfg) -> Result<Cfg, CfgError> {
    let index: HashMap<&str, usize> = cfg
        .blocks
        .iter()
        .enumerate()
        .map(|(idx, block)| (block.id.as_str(), idx))
        .collect();
    let entry = cfg
        .blocks
        .iter()
        .position(|block| block.is_entry)
        .ok_or(CfgError::NoEntry)?;

    let mut reached: HashSet<usize> = HashSet::new();
    let mut queue = VecDeque::new();
    reached.insert(entry);
    queue.push_back(entry);
    while let Some(current) = queue.pop_front() {
        for succ in &cfg.blocks[current].successors {
            if let Some(&next) = index.get(succ.as_str()) {
                if reached.insert(next) {
                    queue.push_back(next);
                }
            }
        }
    }

    let mut blocks: Vec<_> = cfg
        .blocks
        .iter()
        .enumerate()
        .filter(|(idx, _)| reached.contains(idx))
        .map(|(_, block)| block.clone())
        .collect();
    let kept: HashSet<&str> = blocks.iter().map(|block| block.id.as_str()).collect();
    let edges: Vec<_> = cfg
        .edges
        .iter()
        .filter(|edge| kept.contains(edge.from.as_str()) && kept.contains(edge.to.as_str()))
        .cloned()
        .collect();

    for block in &mut blocks {
        block.successors.clear();
        block.predecessors.clear();
    }
    let by_id: HashMap<String, usize> = blocks
        .iter()
        .enumerate()
        .map(|(idx, block)| (block.id.clone(), idx))
        .collect();
    for edge in &edges {
        if let (Some(&from), Some(&to)) = (by_id.get(&edge.from), by_id.get(&edge.to)) {
            blocks[from].successors.push(edge.to.clone());
            blocks[to].predecessors.push(edge.from.clone());
        }
    }
    for block in &mut blocks {
        block.is_exit = block.successors.is_empty();
    }

    Ok(Cfg { blocks, edges })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arch::Arch;
    use crate::cfg::split_blocks;
    use crate::ir::Instruction;

    fn insn(address: &str, opcode: &str, operands: &str) -> Instruction {
        Instruction {
            address: address.to_string(),
            bytes: String::new(),
            opcode: opcode.to_string(),
            operands: operands.to_string(),
        }
    }

    #[test]
    fn drops_dead_code_after_unconditional_jump() {
        let instructions = vec![
            insn("0x1000", "b", "0x100c"),
            insn("0x1004", "mov", "x0, #1"),
            insn("0x1008", "mov", "x1, #2"),
            insn("0x100c", "ret", ""),
        ];
        let cfg = split_blocks(&instructions, &Arch::Arm64);
        assert_eq!(cfg.blocks.len(), 3);
        let filtered = filter_reachable(&cfg).unwrap();
        assert_eq!(filtered.blocks.len(), 2);
        assert!(filtered.block("b1").is_none());
        // The dead block's fallthrough edge went with it.
        assert!(
            filtered
                .edges
                .iter()
                .all(|edge| edge.from != "b1" && edge.to != "b1")
        );
        assert_eq!(filtered.edges.len(), 1);
    }

    #[test]
    fn exit_flags_follow_surviving_successors() {
        let instructions = vec![
            insn("0x1000", "b", "0x100c"),
            insn("0x1004", "mov", "x0, #1"),
            insn("0x1008", "mov", "x1, #2"),
            insn("0x100c", "ret", ""),
        ];
        let cfg = split_blocks(&instructions, &Arch::Arm64);
        let filtered = filter_reachable(&cfg).unwrap();
        for block in &filtered.blocks {
            assert_eq!(block.is_exit, block.successors.is_empty(), "{}", block.id);
        }
    }

    #[test]
    fn missing_entry_is_reported() {
        let mut cfg = split_blocks(&[insn("0x1000", "ret", "")], &Arch::Arm64);
        cfg.blocks[0].is_entry = false;
        assert!(matches!(filter_reachable(&cfg), Err(CfgError::NoEntry)));
    }

    #[test]
    fn empty_graph_has_no_entry() {
        assert!(matches!(
            filter_reachable(&Cfg::default()),
            Err(CfgError::NoEntry)
        ));
    }
}
