use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One disassembled instruction, as supplied by an external disassembler.
///
/// `address` and `bytes` are hex strings; `operands` is free text that may
/// embed a hex literal naming a branch target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub address: String,
    #[serde(default)]
    pub bytes: String,
    pub opcode: String,
    #[serde(default)]
    pub operands: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeKind {
    Normal,
    ConditionalTrue,
    ConditionalFalse,
    Unconditional,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub kind: EdgeKind,
}

/// Maximal straight-line instruction run with one entry and one exit.
#[derive(Debug, Clone, Serialize)]
pub struct BasicBlock {
    pub id: String,
    pub start_address: String,
    pub end_address: String,
    pub instructions: Vec<Instruction>,
    pub successors: Vec<String>,
    pub predecessors: Vec<String>,
    pub is_entry: bool,
    pub is_exit: bool,
}

/// A control-flow graph: blocks in construction (address) order plus the
/// transfer edges between them. Concatenating `blocks` reproduces the
/// instruction stream the graph was built from.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Cfg {
    pub blocks: Vec<BasicBlock>,
    pub edges: Vec<Edge>,
}

impl Cfg {
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn block(&self, id: &str) -> Option<&BasicBlock> {
        self.blocks.iter().find(|block| block.id == id)
    }

    pub fn entry(&self) -> Option<&BasicBlock> {
        self.blocks.iter().find(|block| block.is_entry)
    }
}

/// Classification attached to a block by an external reachability analyzer.
/// Coloring data only; it never affects topology or geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReachStatus {
    Current,
    Reachable,
    Unreachable,
    Conditional,
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockAnnotation {
    pub status: ReachStatus,
    #[serde(default)]
    pub condition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,
}

pub type ReachabilityOverlay = BTreeMap<String, BlockAnnotation>;

/// Overall status of one CFG build, for hosts that run the pipeline on a
/// worker and track its progress. The pipeline itself is synchronous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildStatus {
    #[default]
    Loading,
    Error,
    Loaded,
}
