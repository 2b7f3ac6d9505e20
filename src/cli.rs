use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use crate::arch::Arch;
use crate::cfg::build_view;
use crate::config::load_config;
use crate::ir::{Instruction, ReachabilityOverlay};
use crate::layout::MinimapProjection;
use crate::layout_dump::{ViewDump, write_layout_dump};

#[derive(Parser, Debug)]
#[command(
    name = "asmflow",
    version,
    about = "Control-flow graph layout for disassembled functions"
)]
pub struct Args {
    /// Input JSON instruction dump, or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output layout dump (JSON). Defaults to stdout if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Instruction set used to classify branch mnemonics
    #[arg(short = 'a', long = "arch", value_enum, default_value = "arm64")]
    pub arch: ArchArg,

    /// Config JSON file (layout and minimap geometry)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Optional reachability overlay JSON (coloring only)
    #[arg(long = "overlay")]
    pub overlay: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum ArchArg {
    Arm64,
    X86,
}

impl From<ArchArg> for Arch {
    fn from(arg: ArchArg) -> Self {
        match arg {
            ArchArg::Arm64 => Arch::Arm64,
            ArchArg::X86 => Arch::X86,
        }
    }
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    let input = read_input(args.input.as_deref())?;
    let instructions: Vec<Instruction> =
        serde_json::from_str(&input).context("instruction dump is not valid JSON")?;
    let overlay: Option<ReachabilityOverlay> = match &args.overlay {
        Some(path) => {
            let contents = std::fs::read_to_string(path)?;
            Some(serde_json::from_str(&contents).context("overlay is not valid JSON")?)
        }
        None => None,
    };

    let arch: Arch = args.arch.into();
    let view = build_view(&instructions, &arch, &config)
        .context("failed to build control-flow graph")?;
    let minimap = MinimapProjection::new(&view.layouts, &config.minimap);

    match &args.output {
        Some(path) => write_layout_dump(path, &view, &minimap, overlay.as_ref())?,
        None => {
            let dump = ViewDump::from_view(&view, &minimap, overlay.as_ref());
            let json = serde_json::to_string_pretty(&dump)?;
            println!("{json}");
        }
    }
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path == Path::new("-") {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            return Ok(buf);
        }
        return Ok(std::fs::read_to_string(path)?);
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}
