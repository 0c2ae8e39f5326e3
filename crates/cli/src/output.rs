//! JSON shapes printed by the CLI.

use std::io::Write;

use anyhow::{Context, Result};
use flame_levels_core::model::{DiffShares, LevelItem, Levels, ProfileStore};
use flame_levels_core::views::{bar_color_by_value, diff_color, package_color_index};
use flame_levels_protocol::{BarCoordinates, BarRect, Hsl, SharedStr, ZoomRange};
use serde::Serialize;

/// Palette size used for the `package_slot` field.
const PACKAGE_PALETTE: usize = 16;

#[derive(Serialize)]
pub struct Bar<'a> {
    pub label: &'a SharedStr,
    pub start: f64,
    pub value: f64,
    pub value_display: String,
    pub self_display: String,
    pub item_indexes: &'a [usize],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<DiffShares>,
}

impl<'a> Bar<'a> {
    pub fn new(store: &'a ProfileStore, item: &'a LevelItem) -> Self {
        Self {
            label: store.label_of(item),
            start: item.start,
            value: item.value,
            value_display: store.table().unit().format_value(item.value),
            self_display: store.self_display(&item.item_indexes),
            item_indexes: &item.item_indexes,
            diff: store.diff_shares(&item.item_indexes),
        }
    }
}

pub fn levels<'a>(store: &'a ProfileStore, levels: &'a Levels) -> Vec<Vec<Bar<'a>>> {
    (0..levels.len())
        .map(|level| {
            levels
                .items_at(level)
                .map(|item| Bar::new(store, item))
                .collect()
        })
        .collect()
}

#[derive(Serialize)]
pub struct SandwichJson<'a> {
    pub label: &'a str,
    pub callers: Vec<Vec<Bar<'a>>>,
    pub callees: Vec<Vec<Bar<'a>>>,
}

#[derive(Serialize)]
pub struct ColoredRect {
    #[serde(flatten)]
    pub rect: BarRect,
    pub color: Hsl,
    pub package_slot: usize,
}

/// Attach colors to `rects`: by change for diff profiles, by share of the
/// visible range otherwise.
pub fn colored(
    rects: Vec<BarRect>,
    store: &ProfileStore,
    levels: &Levels,
    range: ZoomRange,
) -> Vec<ColoredRect> {
    let total_ticks = levels.total_ticks();
    rects
        .into_iter()
        .map(|rect| {
            let diff = levels
                .bar(rect.level_index, rect.bar_index)
                .and_then(|item| store.diff_shares(&item.item_indexes));
            let color = match diff {
                Some(shares) => diff_color(shares.change),
                None => bar_color_by_value(rect.ticks, total_ticks, range),
            };
            let label = store.table().label(rect.item_index);
            let package_slot = package_color_index(label, PACKAGE_PALETTE);
            ColoredRect {
                rect,
                color,
                package_slot,
            }
        })
        .collect()
}

#[derive(Serialize)]
pub struct Hit<'a> {
    #[serde(flatten)]
    pub coordinates: BarCoordinates,
    #[serde(flatten)]
    pub bar: Bar<'a>,
}

/// Write `value` to stdout followed by a newline.
pub fn print<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if pretty {
        serde_json::to_writer_pretty(&mut out, value)
    } else {
        serde_json::to_writer(&mut out, value)
    }
    .context("failed to serialize output")?;
    writeln!(out).context("failed to write output")?;
    Ok(())
}
