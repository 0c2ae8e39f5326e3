//! CLI argument definitions

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use flame_levels_core::views::CallTreeSort;

#[derive(Parser)]
#[command(
    name = "flame-levels",
    about = "Inspect flame graph profiles as levels, sandwich views and pixel geometry",
    after_help = "\
EXAMPLES:
    flame-levels levels cpu.folded                     Materialized levels
    flame-levels sandwich cpu.folded db.Query          Callers and callees of one function
    flame-levels rects cpu.json --width 800 --focus 2:0  Rects zoomed onto a bar
    flame-levels hit cpu.json --x 130 --y 30           Bar under a canvas position
    flame-levels tree cpu.json --sort self             Call tree, largest self time first
    flame-levels search cpu.folded '^net/http'        Labels matching a regex"
)]
pub struct Args {
    /// JSON file with render thresholds (missing keys keep their defaults)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the materialized levels of the primary tree
    Levels {
        /// Profile: data-frame JSON or collapsed stacks
        profile: PathBuf,
    },
    /// Print the merged callers and callees of every node with a label
    Sandwich {
        profile: PathBuf,
        label: String,
    },
    /// Print the rectangles for one render pass
    Rects {
        profile: PathBuf,
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Print the bar under a canvas position, or null
    Hit {
        profile: PathBuf,
        #[command(flatten)]
        view: ViewArgs,
        #[arg(long)]
        x: f64,
        #[arg(long)]
        y: f64,
    },
    /// Print labels matching a substring, or a case-insensitive regex when the
    /// query has metacharacters; largest total first
    Search {
        profile: PathBuf,
        query: String,
    },
    /// Print the call tree with self and total columns
    Tree {
        profile: PathBuf,
        /// Show who calls this label instead of the whole profile
        #[arg(long, value_name = "LABEL")]
        callers: Option<String>,
        #[arg(long, value_enum, default_value_t = TreeSort::Total)]
        sort: TreeSort,
        /// Smallest first
        #[arg(long)]
        ascending: bool,
        /// Keep only the node folding exactly these source rows, under its parent
        #[arg(long, value_name = "ROWS", value_delimiter = ',')]
        focus: Option<Vec<usize>>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TreeSort {
    Total,
    #[value(name = "self")]
    SelfTime,
}

impl From<TreeSort> for CallTreeSort {
    fn from(sort: TreeSort) -> Self {
        match sort {
            TreeSort::Total => Self::Total,
            TreeSort::SelfTime => Self::SelfTime,
        }
    }
}

#[derive(ClapArgs)]
pub struct ViewArgs {
    /// Canvas width in pixels
    #[arg(long, default_value_t = 1200.0)]
    pub width: f64,

    /// Render the sandwich of this label instead of the primary tree
    #[arg(long, value_name = "LABEL")]
    pub sandwich: Option<String>,

    /// With --sandwich, render the callers half instead of the callees
    #[arg(long, requires = "sandwich")]
    pub callers: bool,

    /// Visible window start as a fraction of the total
    #[arg(long, default_value_t = 0.0)]
    pub min: f64,

    /// Visible window end as a fraction of the total
    #[arg(long, default_value_t = 1.0)]
    pub max: f64,

    /// Zoom onto the bar at LEVEL:BAR (overrides --min/--max)
    #[arg(long, value_name = "LEVEL:BAR", value_parser = parse_coordinates)]
    pub focus: Option<(usize, usize)>,
}

fn parse_coordinates(s: &str) -> Result<(usize, usize), String> {
    let (level, bar) = s
        .split_once(':')
        .ok_or_else(|| format!("expected LEVEL:BAR, got `{s}`"))?;
    let level = level.parse().map_err(|e| format!("level: {e}"))?;
    let bar = bar.parse().map_err(|e| format!("bar: {e}"))?;
    Ok((level, bar))
}
