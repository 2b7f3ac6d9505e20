use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::MinimapConfig;

use super::types::{BlockLayout, Point, Rect, bounds_of};

/// Uniform-scale projection of the graph into a fixed-size minimap panel,
/// plus the bidirectional mapping between minimap and main-canvas
/// coordinates.
///
/// Pure function of the layouts; recompute after a rebuild.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MinimapProjection {
    /// Uniform scale; the smaller of the width and height fit ratios, so
    /// aspect ratio is kept.
    pub scale: f32,
    /// Offset centering the scaled graph in the panel.
    pub offset: Point,
    pub panel_width: f32,
    pub panel_height: f32,
    bounds: Rect,
}

impl MinimapProjection {
    pub fn new(layouts: &BTreeMap<String, BlockLayout>, config: &MinimapConfig) -> Self {
        let bounds = bounds_of(layouts).expand(config.padding);
        let width = bounds.width.max(1.0);
        let height = bounds.height.max(1.0);
        let scale = (config.panel_width / width).min(config.panel_height / height);
        let offset = Point::new(
            (config.panel_width - width * scale) / 2.0 - bounds.x * scale,
            (config.panel_height - height * scale) / 2.0 - bounds.y * scale,
        );
        Self {
            scale,
            offset,
            panel_width: config.panel_width,
            panel_height: config.panel_height,
            bounds,
        }
    }

    /// Padded graph bounding box this projection was fitted to.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Graph coordinates to minimap panel coordinates.
    pub fn to_minimap(&self, point: Point) -> Point {
        Point::new(
            point.x * self.scale + self.offset.x,
            point.y * self.scale + self.offset.y,
        )
    }

    /// The main-canvas viewport, projected into minimap coordinates.
    /// `pan`/`zoom` are the canvas transform: `screen = graph * zoom + pan`.
    pub fn viewport_rect(&self, pan: Point, zoom: f32, canvas_width: f32, canvas_height: f32) -> Rect {
        let zoom = zoom.max(f32::EPSILON);
        let origin = self.to_minimap(Point::new(-pan.x / zoom, -pan.y / zoom));
        Rect {
            x: origin.x,
            y: origin.y,
            width: canvas_width / zoom * self.scale,
            height: canvas_height / zoom * self.scale,
        }
    }

    /// The pan that centers the main canvas on the graph location under a
    /// minimap click, at the current zoom.
    pub fn pan_for_click(
        &self,
        click: Point,
        zoom: f32,
        canvas_width: f32,
        canvas_height: f32,
    ) -> Point {
        let scale = self.scale.max(f32::EPSILON);
        let graph = Point::new(
            (click.x - self.offset.x) / scale,
            (click.y - self.offset.y) / scale,
        );
        Point::new(
            canvas_width / 2.0 - graph.x * zoom,
            canvas_height / 2.0 - graph.y * zoom,
        )
    }
}
