use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::Serialize;

use crate::ir::{BlockAnnotation, EdgeKind, ReachabilityOverlay};
use crate::layout::{CfgView, MinimapProjection, Point};

/// Stable JSON projection of a built view, for renderers and for the CLI.
#[derive(Debug, Serialize)]
pub struct ViewDump {
    pub width: f32,
    pub height: f32,
    pub blocks: Vec<BlockDump>,
    pub edges: Vec<EdgeDump>,
    pub initial_pan: Point,
    pub initial_zoom: f32,
    pub minimap: MinimapDump,
}

#[derive(Debug, Serialize)]
pub struct BlockDump {
    pub id: String,
    pub start_address: String,
    pub end_address: String,
    pub instructions: Vec<[String; 4]>,
    pub successors: Vec<String>,
    pub predecessors: Vec<String>,
    pub is_entry: bool,
    pub is_exit: bool,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub level: usize,
    /// Reachability coloring from the external analyzer, if supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<BlockAnnotation>,
}

#[derive(Debug, Serialize)]
pub struct EdgeDump {
    pub from: String,
    pub to: String,
    pub kind: EdgeKind,
    pub back_edge: bool,
    pub points: Vec<[f32; 2]>,
}

#[derive(Debug, Serialize)]
pub struct MinimapDump {
    pub scale: f32,
    pub offset: Point,
    pub panel_width: f32,
    pub panel_height: f32,
}

impl ViewDump {
    pub fn from_view(
        view: &CfgView,
        minimap: &MinimapProjection,
        overlay: Option<&ReachabilityOverlay>,
    ) -> Self {
        let bounds = view.bounds();
        let blocks = view
            .blocks
            .iter()
            .map(|block| {
                let layout = view.layouts.get(&block.id);
                BlockDump {
                    id: block.id.clone(),
                    start_address: block.start_address.clone(),
                    end_address: block.end_address.clone(),
                    instructions: block
                        .instructions
                        .iter()
                        .map(|insn| {
                            [
                                insn.address.clone(),
                                insn.bytes.clone(),
                                insn.opcode.clone(),
                                insn.operands.clone(),
                            ]
                        })
                        .collect(),
                    successors: block.successors.clone(),
                    predecessors: block.predecessors.clone(),
                    is_entry: block.is_entry,
                    is_exit: block.is_exit,
                    x: layout.map(|l| l.x).unwrap_or(0.0),
                    y: layout.map(|l| l.y).unwrap_or(0.0),
                    width: layout.map(|l| l.width).unwrap_or(0.0),
                    height: layout.map(|l| l.height).unwrap_or(0.0),
                    level: layout.map(|l| l.level).unwrap_or(0),
                    annotation: overlay
                        .and_then(|overlay| overlay.get(&block.id))
                        .cloned(),
                }
            })
            .collect();

        let edges = view
            .paths
            .iter()
            .map(|path| EdgeDump {
                from: path.from.clone(),
                to: path.to.clone(),
                kind: path.kind,
                back_edge: path.is_back_edge,
                points: path.points.iter().map(|p| [p.x, p.y]).collect(),
            })
            .collect();

        ViewDump {
            width: bounds.right(),
            height: bounds.bottom(),
            blocks,
            edges,
            initial_pan: view.initial_pan,
            initial_zoom: view.initial_zoom,
            minimap: MinimapDump {
                scale: minimap.scale,
                offset: minimap.offset,
                panel_width: minimap.panel_width,
                panel_height: minimap.panel_height,
            },
        }
    }
}

pub fn write_layout_dump(
    path: &Path,
    view: &CfgView,
    minimap: &MinimapProjection,
    overlay: Option<&ReachabilityOverlay>,
) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = ViewDump::from_view(view, minimap, overlay);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arch::Arch;
    use crate::cfg::build_view;
    use crate::config::Config;
    use crate::ir::{Instruction, ReachStatus};

    #[test]
    fn overlay_passes_through_without_touching_geometry() {
        let instructions = vec![
            Instruction {
                address: "0x1000".to_string(),
                bytes: String::new(),
                opcode: "cmp".to_string(),
                operands: "x0, #0".to_string(),
            },
            Instruction {
                address: "0x1004".to_string(),
                bytes: String::new(),
                opcode: "b.eq".to_string(),
                operands: "0x100c".to_string(),
            },
            Instruction {
                address: "0x1008".to_string(),
                bytes: String::new(),
                opcode: "mov".to_string(),
                operands: "x0, #1".to_string(),
            },
            Instruction {
                address: "0x100c".to_string(),
                bytes: String::new(),
                opcode: "ret".to_string(),
                operands: String::new(),
            },
        ];
        let config = Config::default();
        let view = build_view(&instructions, &Arch::Arm64, &config).unwrap();
        let minimap = MinimapProjection::new(&view.layouts, &config.minimap);

        let mut overlay = ReachabilityOverlay::new();
        overlay.insert(
            "b1".to_string(),
            BlockAnnotation {
                status: ReachStatus::Conditional,
                condition: "x0 != 0".to_string(),
                probability: Some(0.5),
            },
        );

        let plain = ViewDump::from_view(&view, &minimap, None);
        let annotated = ViewDump::from_view(&view, &minimap, Some(&overlay));
        for (a, b) in plain.blocks.iter().zip(&annotated.blocks) {
            assert_eq!(a.x, b.x);
            assert_eq!(a.y, b.y);
        }
        let b1 = annotated.blocks.iter().find(|b| b.id == "b1").unwrap();
        assert!(matches!(
            b1.annotation.as_ref().map(|a| a.status),
            Some(ReachStatus::Conditional)
        ));
    }
}
