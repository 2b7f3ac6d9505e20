use std::path::Path;

use serde::{Deserialize, Serialize};

/// Geometry constants for block sizing, spacing, and the initial view.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Fixed block width; heights come from instruction counts.
    pub block_width: f32,
    pub header_height: f32,
    pub line_height: f32,
    /// Top+bottom border allowance added to every block height.
    pub block_border: f32,
    /// Horizontal gap between sibling blocks on a level.
    pub gap_x: f32,
    /// Vertical gap between levels.
    pub gap_y: f32,
    /// Outer margin around the whole graph.
    pub margin: f32,
    /// Horizontal fan-out step between parallel edges at one port.
    pub edge_spacing: f32,
    /// Stub length below a source / above a target before an edge turns.
    pub edge_stub: f32,
    /// Padding around block rectangles when testing edge collisions.
    pub edge_clearance: f32,
    /// How far detour routes clear the obstruction bounding box.
    pub detour_margin: f32,
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub initial_zoom: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            block_width: 256.0,
            header_height: 28.0,
            line_height: 16.0,
            block_border: 4.0,
            gap_x: 48.0,
            gap_y: 64.0,
            margin: 48.0,
            edge_spacing: 12.0,
            edge_stub: 14.0,
            edge_clearance: 10.0,
            detour_margin: 24.0,
            canvas_width: 1200.0,
            canvas_height: 800.0,
            initial_zoom: 0.8,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MinimapConfig {
    pub panel_width: f32,
    pub panel_height: f32,
    /// Padding added around the graph bounding box before fitting.
    pub padding: f32,
}

impl Default for MinimapConfig {
    fn default() -> Self {
        Self {
            panel_width: 200.0,
            panel_height: 160.0,
            padding: 16.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub layout: LayoutConfig,
    pub minimap: MinimapConfig,
}

/// Loads a JSON config file; missing fields fall back to defaults, and no
/// path at all yields the default config.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    let config: Config = serde_json::from_str(&contents)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_fills_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"layout": {"block_width": 300.0}}"#).unwrap();
        assert_eq!(config.layout.block_width, 300.0);
        assert_eq!(config.layout.gap_y, LayoutConfig::default().gap_y);
        assert_eq!(config.minimap.panel_width, 200.0);
    }

    #[test]
    fn no_path_is_default() {
        let config = load_config(None).unwrap();
        assert_eq!(config.layout.block_width, 256.0);
    }
}
