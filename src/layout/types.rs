use std::collections::BTreeMap;

use serde::Serialize;

use crate::ir::{BasicBlock, Edge, EdgeKind};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    pub fn expand(&self, pad: f32) -> Rect {
        Rect {
            x: self.x - pad,
            y: self.y - pad,
            width: self.width + pad * 2.0,
            height: self.height + pad * 2.0,
        }
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect {
            x,
            y,
            width: self.right().max(other.right()) - x,
            height: self.bottom().max(other.bottom()) - y,
        }
    }
}

/// Position and size of one block, plus the hierarchical level it was
/// assigned. Top-left pixel coordinates; recomputed wholesale when the
/// instruction stream changes.
#[derive(Debug, Clone, Serialize)]
pub struct BlockLayout {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub level: usize,
}

impl BlockLayout {
    pub fn rect(&self) -> Rect {
        Rect {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
        }
    }

    pub fn bottom_center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height)
    }

    pub fn top_center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y)
    }
}

/// One routed edge: an obstacle-avoiding polyline from the source's bottom
/// edge to the target's top edge.
#[derive(Debug, Clone, Serialize)]
pub struct EdgePath {
    pub from: String,
    pub to: String,
    pub kind: EdgeKind,
    pub points: Vec<Point>,
    /// Whether this edge was routed as a loop back edge (side detour).
    pub is_back_edge: bool,
}

/// Everything a renderer needs for one function: the pruned graph, block
/// positions, routed edges, and a suggested initial pan/zoom centered on
/// the entry block.
#[derive(Debug, Clone, Serialize)]
pub struct CfgView {
    pub blocks: Vec<BasicBlock>,
    pub edges: Vec<Edge>,
    pub layouts: BTreeMap<String, BlockLayout>,
    pub paths: Vec<EdgePath>,
    pub initial_pan: Point,
    pub initial_zoom: f32,
}

impl Default for CfgView {
    fn default() -> Self {
        Self {
            blocks: Vec::new(),
            edges: Vec::new(),
            layouts: BTreeMap::new(),
            paths: Vec::new(),
            initial_pan: Point::default(),
            initial_zoom: 1.0,
        }
    }
}

impl CfgView {
    /// Bounding box of all block layouts; zero rect when empty.
    pub fn bounds(&self) -> Rect {
        bounds_of(&self.layouts)
    }
}

pub(crate) fn bounds_of(layouts: &BTreeMap<String, BlockLayout>) -> Rect {
    let mut iter = layouts.values();
    let Some(first) = iter.next() else {
        return Rect::default();
    };
    let mut bounds = first.rect();
    for layout in iter {
        bounds = bounds.union(&layout.rect());
    }
    bounds
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_intersection() {
        let a = Rect {
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
        };
        let b = Rect {
            x: 5.0,
            y: 5.0,
            width: 10.0,
            height: 10.0,
        };
        let c = Rect {
            x: 20.0,
            y: 0.0,
            width: 5.0,
            height: 5.0,
        };
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        // Touching edges do not count as overlap.
        let d = Rect {
            x: 10.0,
            y: 0.0,
            width: 5.0,
            height: 5.0,
        };
        assert!(!a.intersects(&d));
    }

    #[test]
    fn rect_union_covers_both() {
        let a = Rect {
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
        };
        let b = Rect {
            x: 20.0,
            y: -5.0,
            width: 10.0,
            height: 10.0,
        };
        let u = a.union(&b);
        assert_eq!(u.x, 0.0);
        assert_eq!(u.y, -5.0);
        assert_eq!(u.right(), 30.0);
        assert_eq!(u.bottom(), 10.0);
    }
}
