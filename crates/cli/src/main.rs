mod args;
mod output;

use std::borrow::Cow;
use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::Parser;
use flame_levels_core::model::{Levels, ProfileStore};
use flame_levels_core::parsers::parse_auto;
use flame_levels_core::search::search_labels;
use flame_levels_core::views::call_tree::{
    build_call_tree, build_callers_tree, focus_call_tree, sort_call_tree,
};
use flame_levels_core::views::{Projection, flame_rects, hit_test};
use flame_levels_protocol::{RenderConfig, ZoomRange};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use args::{Args, Command, ViewArgs};
use output::{Bar, Hit, SandwichJson};

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();

    let config = load_config(args.config.as_deref())?;
    match args.command {
        Command::Levels { profile } => {
            let store = load_profile(&profile)?;
            output::print(&output::levels(&store, store.levels()), args.pretty)
        }
        Command::Sandwich { profile, label } => {
            let store = load_profile(&profile)?;
            let sandwich = store.sandwich(&label);
            if sandwich.is_empty() {
                info!(label = %label, "label not found in profile");
            }
            let json = SandwichJson {
                label: &label,
                callers: output::levels(&store, &sandwich.callers),
                callees: output::levels(&store, &sandwich.callees),
            };
            output::print(&json, args.pretty)
        }
        Command::Rects { profile, view } => {
            let store = load_profile(&profile)?;
            let levels = view_levels(&store, &view);
            let range = view_range(&levels, &view)?;
            let projection = Projection::for_levels(&levels, view.width, range);
            let rects = flame_rects(store.table(), &levels, &projection, &config);
            debug!(count = rects.len(), "computed rects");
            let colored = output::colored(rects, &store, &levels, range);
            output::print(&colored, args.pretty)
        }
        Command::Hit { profile, view, x, y } => {
            let store = load_profile(&profile)?;
            let levels = view_levels(&store, &view);
            let range = view_range(&levels, &view)?;
            let projection = Projection::for_levels(&levels, view.width, range);
            let hit = hit_test(&levels, x, y, &projection, &config).and_then(|coordinates| {
                let item = levels.bar(coordinates.level_index, coordinates.bar_index)?;
                Some(Hit {
                    coordinates,
                    bar: Bar::new(&store, item),
                })
            });
            output::print(&hit, args.pretty)
        }
        Command::Search { profile, query } => {
            let store = load_profile(&profile)?;
            let matches = search_labels(&store, &query)
                .with_context(|| format!("bad search query `{query}`"))?;
            output::print(&matches, args.pretty)
        }
        Command::Tree {
            profile,
            callers,
            sort,
            ascending,
            focus,
        } => {
            let store = load_profile(&profile)?;
            let mut tree = match &callers {
                Some(label) => build_callers_tree(&store, label),
                None => build_call_tree(&store),
            };
            if tree.is_empty() {
                info!(label = ?callers, "call tree is empty");
            }
            sort_call_tree(&mut tree, sort.into(), !ascending);
            if let Some(rows) = focus {
                let Some(focused) = focus_call_tree(&tree, &rows) else {
                    bail!("no call tree node folds rows {rows:?}");
                };
                tree = focused;
            }
            output::print(&tree, args.pretty)
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<RenderConfig> {
    let Some(path) = path else {
        return Ok(RenderConfig::default());
    };
    let data = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_slice(&data).with_context(|| format!("invalid config {}", path.display()))
}

fn load_profile(path: &Path) -> Result<ProfileStore> {
    let data = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let table = parse_auto(&data).with_context(|| format!("failed to parse {}", path.display()))?;
    debug!(rows = table.len(), unit = ?table.unit(), "loaded profile");
    Ok(ProfileStore::new(table))
}

/// The primary tree, or one half of a sandwich when `--sandwich` is set.
fn view_levels<'a>(store: &'a ProfileStore, view: &ViewArgs) -> Cow<'a, Levels> {
    match &view.sandwich {
        None => Cow::Borrowed(store.levels()),
        Some(label) => {
            let sandwich = store.sandwich(label);
            Cow::Owned(if view.callers {
                sandwich.callers
            } else {
                sandwich.callees
            })
        }
    }
}

fn view_range(levels: &Levels, view: &ViewArgs) -> Result<ZoomRange> {
    let Some((level, bar)) = view.focus else {
        return Ok(ZoomRange::new(view.min, view.max));
    };
    let Some(item) = levels.bar(level, bar) else {
        bail!("no bar at {level}:{bar}");
    };
    Ok(ZoomRange::focus(item.start, item.value, levels.total_ticks()))
}
