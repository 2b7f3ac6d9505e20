use std::collections::{BTreeMap, HashMap};

use crate::config::LayoutConfig;
use crate::ir::Cfg;

use super::types::{BlockLayout, EdgePath, Point, Rect};

const EPS: f32 = 0.01;

/// Routes every edge as an axis-aligned polyline from the source's bottom
/// edge to the target's top edge.
///
/// Forward edges first try a 3-segment route turning at the vertical
/// midpoint between the two rows; if any segment crosses another block's
/// expanded rectangle the edge falls back to a side detour. Back edges
/// (target level not below the source) always detour around the bounding
/// box of the intervening blocks, visually marking loops. Parallel edges at
/// one block are fanned out symmetrically around its center.
///
/// Purely geometric and deterministic; every edge always receives a valid
/// path, worst case a longer detour.
pub fn route_edges(
    cfg: &Cfg,
    layouts: &BTreeMap<String, BlockLayout>,
    config: &LayoutConfig,
) -> Vec<EdgePath> {
    let mut out_ports: HashMap<&str, Vec<usize>> = HashMap::new();
    let mut in_ports: HashMap<&str, Vec<usize>> = HashMap::new();
    for (idx, edge) in cfg.edges.iter().enumerate() {
        out_ports.entry(edge.from.as_str()).or_default().push(idx);
        in_ports.entry(edge.to.as_str()).or_default().push(idx);
    }

    // Fan parallel edges out around the port center, ordered by the far
    // endpoint's x so siblings do not cross at the port.
    let far_x = |idx: usize, outgoing: bool| -> f32 {
        let edge = &cfg.edges[idx];
        let other = if outgoing { &edge.to } else { &edge.from };
        layouts
            .get(other)
            .map(|layout| layout.rect().center_x())
            .unwrap_or(0.0)
    };
    let mut start_offsets = vec![0.0f32; cfg.edges.len()];
    let mut end_offsets = vec![0.0f32; cfg.edges.len()];
    for (offsets, ports, outgoing) in [
        (&mut start_offsets, &mut out_ports, true),
        (&mut end_offsets, &mut in_ports, false),
    ] {
        for list in ports.values_mut() {
            list.sort_by(|&a, &b| {
                far_x(a, outgoing)
                    .partial_cmp(&far_x(b, outgoing))
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.cmp(&b))
            });
            let count = list.len() as f32;
            for (pos, &idx) in list.iter().enumerate() {
                offsets[idx] = (pos as f32 - (count - 1.0) / 2.0) * config.edge_spacing;
            }
        }
    }

    let mut paths = Vec::with_capacity(cfg.edges.len());
    for (idx, edge) in cfg.edges.iter().enumerate() {
        let (Some(from), Some(to)) = (layouts.get(&edge.from), layouts.get(&edge.to)) else {
            continue;
        };
        let start = Point::new(
            from.rect().center_x() + start_offsets[idx],
            from.rect().bottom(),
        );
        let end = Point::new(to.rect().center_x() + end_offsets[idx], to.y);
        let is_back_edge = to.level <= from.level;

        let points = if is_back_edge {
            detour_route(start, end, from, to, layouts, config)
        } else {
            forward_route(start, end, start_offsets[idx], from, to, layouts, config)
        };

        paths.push(EdgePath {
            from: edge.from.clone(),
            to: edge.to.clone(),
            kind: edge.kind,
            points,
            is_back_edge,
        });
    }
    paths
}

fn forward_route(
    start: Point,
    end: Point,
    mid_offset: f32,
    from: &BlockLayout,
    to: &BlockLayout,
    layouts: &BTreeMap<String, BlockLayout>,
    config: &LayoutConfig,
) -> Vec<Point> {
    let mid = (start.y + end.y) / 2.0 + mid_offset;
    let direct = vec![
        start,
        Point::new(start.x, mid),
        Point::new(end.x, mid),
        end,
    ];

    // Only blocks whose padded rectangle overlaps the route's bounding box
    // can collide; test against those, not the whole graph.
    let bbox = path_bounds(&direct);
    let obstacles: Vec<Rect> = layouts
        .values()
        .filter(|layout| layout.id != from.id && layout.id != to.id)
        .map(|layout| layout.rect().expand(config.edge_clearance))
        .filter(|rect| rect.intersects(&bbox))
        .collect();
    if !path_hits(&direct, &obstacles) {
        return direct;
    }
    detour_route(start, end, from, to, layouts, config)
}

/// Exit below the source, travel out past the nearer side of everything in
/// the corridor, descend (or climb, for back edges), and re-enter the
/// target from the top.
fn detour_route(
    start: Point,
    end: Point,
    from: &BlockLayout,
    to: &BlockLayout,
    layouts: &BTreeMap<String, BlockLayout>,
    config: &LayoutConfig,
) -> Vec<Point> {
    let y_lo = start.y.min(end.y);
    let y_hi = start.y.max(end.y);
    let mut span = from.rect().union(&to.rect());
    for layout in layouts.values() {
        let rect = layout.rect();
        if rect.y < y_hi + config.edge_stub && rect.bottom() > y_lo - config.edge_stub {
            span = span.union(&rect);
        }
    }
    let left = span.x - config.detour_margin;
    let right = span.right() + config.detour_margin;
    let side_x = if (start.x - left).abs() + (end.x - left).abs()
        <= (start.x - right).abs() + (end.x - right).abs()
    {
        left
    } else {
        right
    };

    // The horizontal exit run must pass under any taller sibling it crosses;
    // the entry run must pass above anything still in the way.
    let exit_span = (start.x.min(side_x), start.x.max(side_x));
    let mut exit_y = start.y + config.edge_stub;
    let mut changed = true;
    while changed {
        changed = false;
        for layout in layouts.values() {
            if layout.id == from.id || layout.id == to.id {
                continue;
            }
            let rect = layout.rect().expand(config.edge_clearance);
            if rect.x < exit_span.1
                && rect.right() > exit_span.0
                && rect.y < exit_y
                && rect.bottom() > exit_y
            {
                exit_y = rect.bottom();
                changed = true;
            }
        }
    }
    let enter_span = (end.x.min(side_x), end.x.max(side_x));
    let mut enter_y = end.y - config.edge_stub;
    changed = true;
    while changed {
        changed = false;
        for layout in layouts.values() {
            if layout.id == from.id || layout.id == to.id {
                continue;
            }
            let rect = layout.rect().expand(config.edge_clearance);
            if rect.x < enter_span.1
                && rect.right() > enter_span.0
                && rect.y < enter_y
                && rect.bottom() > enter_y
            {
                enter_y = rect.y;
                changed = true;
            }
        }
    }
    vec![
        start,
        Point::new(start.x, exit_y),
        Point::new(side_x, exit_y),
        Point::new(side_x, enter_y),
        Point::new(end.x, enter_y),
        end,
    ]
}

fn path_bounds(points: &[Point]) -> Rect {
    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;
    for point in points {
        min_x = min_x.min(point.x);
        min_y = min_y.min(point.y);
        max_x = max_x.max(point.x);
        max_y = max_y.max(point.y);
    }
    Rect {
        x: min_x,
        y: min_y,
        width: max_x - min_x,
        height: max_y - min_y,
    }
}

fn path_hits(points: &[Point], obstacles: &[Rect]) -> bool {
    points.windows(2).any(|segment| {
        obstacles
            .iter()
            .any(|rect| segment_hits_rect(segment[0], segment[1], rect))
    })
}

/// Axis-aligned segment vs. rectangle; touching an edge does not count.
fn segment_hits_rect(a: Point, b: Point, rect: &Rect) -> bool {
    if (a.y - b.y).abs() < EPS {
        a.y > rect.y + EPS
            && a.y < rect.bottom() - EPS
            && a.x.max(b.x) > rect.x + EPS
            && a.x.min(b.x) < rect.right() - EPS
    } else {
        a.x > rect.x + EPS
            && a.x < rect.right() - EPS
            && a.y.max(b.y) > rect.y + EPS
            && a.y.min(b.y) < rect.bottom() - EPS
    }
}
