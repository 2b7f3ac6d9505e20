pub mod arch;
pub mod cfg;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod ir;
pub mod layout;
pub mod layout_dump;

pub use arch::{Arch, FlowKind, InstructionClassifier};
pub use cfg::{CfgError, build_view, filter_reachable, split_blocks};
pub use config::{Config, LayoutConfig, MinimapConfig, load_config};
pub use ir::{
    BasicBlock, BlockAnnotation, BuildStatus, Cfg, Edge, EdgeKind, Instruction, ReachStatus,
    ReachabilityOverlay,
};
pub use layout::{
    BlockLayout, CfgView, EdgePath, MinimapProjection, Point, Rect, compute_layout, route_edges,
};

#[cfg(feature = "cli")]
pub use cli::run;
