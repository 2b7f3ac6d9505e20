mod minimap;
mod routing;
pub(crate) mod types;

pub use minimap::MinimapProjection;
pub use routing::route_edges;
pub use types::*;

use std::collections::{BTreeMap, HashMap, VecDeque};

use crate::cfg::address_value;
use crate::config::LayoutConfig;
use crate::ir::{Cfg, EdgeKind};

/// Left-to-right ordering of a block's owned children, keyed by the edge
/// that classifies them: taken branch, plain jump, then fallthrough.
fn child_slot(kind: EdgeKind) -> u8 {
    match kind {
        EdgeKind::ConditionalTrue => 0,
        EdgeKind::Unconditional => 1,
        EdgeKind::ConditionalFalse | EdgeKind::Normal => 2,
    }
}

/// Computes a collision-free hierarchical layout for a reachable CFG.
///
/// Levels follow BFS distance from the entry, corrected by address order so
/// loop bodies cannot pull their headers upward. Horizontal space is
/// allocated through single-parent "ownership": each non-entry block is
/// owned by the predecessor that first discovers it in BFS order, and only
/// owned children count toward a block's subtree width, so merge points are
/// never double-counted.
///
/// Returns the per-block layouts plus an initial pan/zoom centered on the
/// entry block's top edge.
pub fn compute_layout(
    cfg: &Cfg,
    config: &LayoutConfig,
) -> (BTreeMap<String, BlockLayout>, Point, f32) {
    let n = cfg.blocks.len();
    if n == 0 {
        return (BTreeMap::new(), Point::default(), config.initial_zoom);
    }

    let index: HashMap<&str, usize> = cfg
        .blocks
        .iter()
        .enumerate()
        .map(|(idx, block)| (block.id.as_str(), idx))
        .collect();
    let mut succ: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut pred: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut edge_kind: HashMap<(usize, usize), EdgeKind> = HashMap::new();
    for edge in &cfg.edges {
        let (Some(&from), Some(&to)) = (index.get(edge.from.as_str()), index.get(edge.to.as_str()))
        else {
            continue;
        };
        succ[from].push(to);
        pred[to].push(from);
        edge_kind.entry((from, to)).or_insert(edge.kind);
    }

    let entry = cfg
        .blocks
        .iter()
        .position(|block| block.is_entry)
        .unwrap_or(0);

    let heights: Vec<f32> = cfg
        .blocks
        .iter()
        .map(|block| {
            config.header_height
                + config.line_height * block.instructions.len() as f32
                + config.block_border
        })
        .collect();

    // Address rank: position in ascending start-address order. Unparsable
    // addresses sort last, by construction index.
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by_key(|&i| {
        (
            address_value(&cfg.blocks[i].start_address).unwrap_or(u64::MAX),
            i,
        )
    });
    let mut rank = vec![0usize; n];
    for (r, &i) in order.iter().enumerate() {
        rank[i] = r;
    }

    // Baseline levels: BFS edge distance from the entry.
    let mut bfs_level = vec![usize::MAX; n];
    let mut queue = VecDeque::new();
    bfs_level[entry] = 0;
    queue.push_back(entry);
    while let Some(current) = queue.pop_front() {
        for &next in &succ[current] {
            if bfs_level[next] == usize::MAX {
                bfs_level[next] = bfs_level[current] + 1;
                queue.push_back(next);
            }
        }
    }

    // Hybrid leveling: walk blocks in address order with the entry pinned at
    // level 0. Predecessors with a lower address rank are ordinary forward
    // flow and push the block below them; predecessors with a higher rank
    // are loop back edges and are ignored, falling back to the BFS baseline.
    let mut level = vec![usize::MAX; n];
    level[entry] = 0;
    for &i in &order {
        if i == entry {
            continue;
        }
        let forward_max = pred[i]
            .iter()
            .filter(|&&p| rank[p] < rank[i] && level[p] != usize::MAX)
            .map(|&p| level[p])
            .max();
        level[i] = match forward_max {
            Some(max) => max + 1,
            None if bfs_level[i] != usize::MAX => bfs_level[i],
            None => 0,
        };
    }

    let level_count = level.iter().copied().max().unwrap_or(0) + 1;
    let mut level_blocks: Vec<Vec<usize>> = vec![Vec::new(); level_count];
    for &i in &order {
        level_blocks[level[i]].push(i);
    }

    // Ownership: a second BFS from the entry; the first predecessor to
    // discover a block becomes its layout parent (earliest-BFS-order wins).
    let mut owned: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut discovered = vec![false; n];
    let mut disc_order: Vec<usize> = Vec::with_capacity(n);
    discovered[entry] = true;
    disc_order.push(entry);
    queue.push_back(entry);
    while let Some(current) = queue.pop_front() {
        for &next in &succ[current] {
            if !discovered[next] {
                discovered[next] = true;
                owned[current].push(next);
                disc_order.push(next);
                queue.push_back(next);
            }
        }
    }

    // Subtree widths, children before parents (reverse discovery order).
    let mut subtree = vec![config.block_width; n];
    for &i in disc_order.iter().rev() {
        if owned[i].is_empty() {
            continue;
        }
        let children: f32 = owned[i].iter().map(|&c| subtree[c]).sum::<f32>()
            + config.gap_x * (owned[i].len() - 1) as f32;
        subtree[i] = config.block_width.max(children);
    }

    // Top-down placement: each block centered within its subtree slice,
    // owned children ordered taken-branch / jump / fallthrough.
    let mut x = vec![f32::NAN; n];
    let mut stack: Vec<(usize, f32)> = vec![(entry, config.margin)];
    while let Some((i, left)) = stack.pop() {
        let center = left + subtree[i] / 2.0;
        x[i] = center - config.block_width / 2.0;
        if owned[i].is_empty() {
            continue;
        }
        let mut children = owned[i].clone();
        children.sort_by_key(|&c| child_slot(edge_kind.get(&(i, c)).copied().unwrap_or(EdgeKind::Normal)));
        let total: f32 = children.iter().map(|&c| subtree[c]).sum::<f32>()
            + config.gap_x * (children.len() - 1) as f32;
        let mut cursor = center - total / 2.0;
        for &child in &children {
            stack.push((child, cursor));
            cursor += subtree[child] + config.gap_x;
        }
    }

    // Fallback slots: anything the ownership DFS never placed (disconnected,
    // or reachable only through back edges) goes after its level's rightmost
    // occupied slot.
    for blocks in &level_blocks {
        let mut max_right = blocks
            .iter()
            .filter(|&&i| !x[i].is_nan())
            .map(|&i| x[i] + config.block_width)
            .fold(f32::NEG_INFINITY, f32::max);
        for &i in blocks {
            if x[i].is_nan() {
                x[i] = if max_right.is_finite() {
                    max_right + config.gap_x
                } else {
                    config.margin
                };
                max_right = x[i] + config.block_width;
            }
        }
    }

    // Overlap resolution: within each level, push blocks right until the
    // gap constraint holds.
    for blocks in &level_blocks {
        let mut sorted = blocks.clone();
        sorted.sort_by(|&a, &b| x[a].partial_cmp(&x[b]).unwrap_or(std::cmp::Ordering::Equal));
        for pair in sorted.windows(2) {
            let min_x = x[pair[0]] + config.block_width + config.gap_x;
            if x[pair[1]] < min_x {
                x[pair[1]] = min_x;
            }
        }
    }

    // Global centering: align every level's horizontal center with the
    // graph's center.
    let global_min = x.iter().copied().fold(f32::INFINITY, f32::min);
    let global_max = x
        .iter()
        .map(|&v| v + config.block_width)
        .fold(f32::NEG_INFINITY, f32::max);
    let global_center = (global_min + global_max) / 2.0;
    for blocks in &level_blocks {
        if blocks.is_empty() {
            continue;
        }
        let min = blocks.iter().map(|&i| x[i]).fold(f32::INFINITY, f32::min);
        let max = blocks
            .iter()
            .map(|&i| x[i] + config.block_width)
            .fold(f32::NEG_INFINITY, f32::max);
        let shift = global_center - (min + max) / 2.0;
        for &i in blocks {
            x[i] += shift;
        }
    }

    // Vertical stacking: each level sits below the previous level's tallest
    // block.
    let mut level_y = vec![config.margin; level_count];
    for l in 1..level_count {
        let prev_height = level_blocks[l - 1]
            .iter()
            .map(|&i| heights[i])
            .fold(0.0f32, f32::max);
        level_y[l] = level_y[l - 1] + prev_height + config.gap_y;
    }

    let mut layouts = BTreeMap::new();
    for (i, block) in cfg.blocks.iter().enumerate() {
        layouts.insert(
            block.id.clone(),
            BlockLayout {
                id: block.id.clone(),
                x: x[i],
                y: level_y[level[i]],
                width: config.block_width,
                height: heights[i],
                level: level[i],
            },
        );
    }

    // Initial view: center the canvas on the entry block's top edge.
    let zoom = config.initial_zoom;
    let entry_cx = x[entry] + config.block_width / 2.0;
    let entry_top = level_y[level[entry]];
    let pan = Point::new(
        config.canvas_width / 2.0 - entry_cx * zoom,
        config.canvas_height / 2.0 - entry_top * zoom,
    );

    (layouts, pan, zoom)
}
