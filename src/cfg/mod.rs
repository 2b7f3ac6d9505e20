mod reachability;
mod splitter;

pub use reachability::filter_reachable;
pub use splitter::split_blocks;
pub(crate) use splitter::address_value;

use thiserror::Error;

use crate::arch::InstructionClassifier;
use crate::config::Config;
use crate::ir::Instruction;
use crate::layout::{CfgView, compute_layout, route_edges};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CfgError {
    /// The graph has no entry block to start reachability from.
    #[error("control-flow graph has no entry block")]
    NoEntry,
}

/// Runs the whole pipeline for one function: split into blocks, prune
/// unreachable code, lay the blocks out, route the edges.
///
/// Empty input is an empty view, not an error. The only failure is a graph
/// without an entry block.
pub fn build_view(
    instructions: &[Instruction],
    classifier: &dyn InstructionClassifier,
    config: &Config,
) -> Result<CfgView, CfgError> {
    if instructions.is_empty() {
        return Ok(CfgView {
            initial_zoom: config.layout.initial_zoom,
            ..CfgView::default()
        });
    }
    let cfg = split_blocks(instructions, classifier);
    let cfg = filter_reachable(&cfg)?;
    let (layouts, initial_pan, initial_zoom) = compute_layout(&cfg, &config.layout);
    let paths = route_edges(&cfg, &layouts, &config.layout);
    Ok(CfgView {
        blocks: cfg.blocks,
        edges: cfg.edges,
        layouts,
        paths,
        initial_pan,
        initial_zoom,
    })
}
