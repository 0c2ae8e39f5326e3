use flame_levels_protocol::{BarRect, RenderConfig, ZoomRange};

use crate::model::{Levels, ProfileTable};

/// Horizontal pixel position of a tick offset for the current zoom.
pub fn bar_x(offset: f64, total_ticks: f64, range_min: f64, pixels_per_tick: f64) -> f64 {
    (offset - total_ticks * range_min) * pixels_per_tick
}

/// Pixels per tick when `range` of `total_ticks` fills `width_px`.
/// Zero for an empty profile.
pub fn pixels_per_tick(width_px: f64, total_ticks: f64, range: ZoomRange) -> f64 {
    if total_ticks <= 0.0 {
        return 0.0;
    }
    width_px / total_ticks / range.span()
}

/// Tick space → pixel space mapping for one render pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub total_ticks: f64,
    pub range_min: f64,
    pub pixels_per_tick: f64,
}

impl Projection {
    pub fn new(width_px: f64, total_ticks: f64, range: ZoomRange) -> Self {
        Self {
            total_ticks,
            range_min: range.min,
            pixels_per_tick: pixels_per_tick(width_px, total_ticks, range),
        }
    }

    /// Projection of `levels` using their own root total.
    pub fn for_levels(levels: &Levels, width_px: f64, range: ZoomRange) -> Self {
        Self::new(width_px, levels.total_ticks(), range)
    }

    pub fn x(&self, offset: f64) -> f64 {
        bar_x(offset, self.total_ticks, self.range_min, self.pixels_per_tick)
    }

    pub fn width(&self, ticks: f64) -> f64 {
        ticks * self.pixels_per_tick
    }
}

/// Rectangles for one level, left to right.
///
/// A bar at or below the collapse threshold swallows the touching siblings
/// that follow it while they are also below the threshold; the result is
/// one unlabeled `collapsed` rect. Rects narrower than the hide threshold
/// are dropped.
pub fn level_rects(
    table: &ProfileTable,
    levels: &Levels,
    level_index: usize,
    projection: &Projection,
    config: &RenderConfig,
) -> Vec<BarRect> {
    let row = levels.level(level_index);
    let mut rects = Vec::new();
    let mut bar = 0;

    while bar < row.len() {
        let first = bar;
        let item = levels.item(row[bar]);
        let mut ticks = item.value;
        let collapsed = projection.width(ticks) <= config.collapse_threshold_px;

        if collapsed {
            let mut end = item.end();
            while let Some(&next_id) = row.get(bar + 1) {
                let next = levels.item(next_id);
                if !touches(end, next.start)
                    || projection.width(next.value) > config.collapse_threshold_px
                {
                    break;
                }
                bar += 1;
                ticks += next.value;
                end = next.end();
            }
        }

        let width = projection.width(ticks);
        if width >= config.hide_threshold_px {
            let label = (!collapsed && width > config.label_threshold_px)
                .then(|| table.label(item.first_index()).clone());
            rects.push(BarRect {
                x: projection.x(item.start),
                y: level_index as f64 * config.pixels_per_level,
                width,
                height: config.pixels_per_level,
                collapsed,
                label,
                item_index: item.first_index(),
                level_index,
                bar_index: first,
                ticks,
            });
        }
        bar += 1;
    }
    rects
}

/// Rectangles for every level.
pub fn flame_rects(
    table: &ProfileTable,
    levels: &Levels,
    projection: &Projection,
    config: &RenderConfig,
) -> Vec<BarRect> {
    (0..levels.len())
        .flat_map(|level| level_rects(table, levels, level, projection, config))
        .collect()
}

fn touches(end: f64, start: f64) -> bool {
    (start - end).abs() <= f64::EPSILON * end.abs().max(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProfileStore;
    use flame_levels_protocol::ValueUnit;

    fn siblings(count: usize, value: f64) -> ProfileStore {
        let total = value * count as f64;
        let rows = std::iter::once(("root", 0, total, 0.0))
            .chain((0..count).map(|_| ("leaf", 1, value, value)));
        ProfileStore::new(ProfileTable::from_rows(rows, ValueUnit::Short).unwrap())
    }

    #[test]
    fn bar_x_formula() {
        assert_eq!(bar_x(50.0, 100.0, 0.0, 2.0), 100.0);
        assert_eq!(bar_x(50.0, 100.0, 0.25, 2.0), 50.0);
        let ppt = pixels_per_tick(800.0, 100.0, ZoomRange::new(0.5, 1.0));
        assert_eq!(ppt, 16.0);
    }

    #[test]
    fn empty_profile_has_zero_scale() {
        assert_eq!(pixels_per_tick(800.0, 0.0, ZoomRange::FULL), 0.0);
    }

    #[test]
    fn wide_bars_get_labels() {
        let store = ProfileStore::new(
            ProfileTable::from_rows(
                [("root", 0, 300.0, 0.0), ("a", 1, 200.0, 50.0), ("b", 1, 100.0, 100.0)],
                ValueUnit::Short,
            )
            .unwrap(),
        );
        let projection = Projection::for_levels(store.levels(), 300.0, ZoomRange::FULL);
        let config = RenderConfig::default();
        let rects = flame_rects(store.table(), store.levels(), &projection, &config);

        assert_eq!(rects.len(), 3);
        let b = &rects[2];
        assert_eq!((b.x, b.width, b.y), (200.0, 100.0, 22.0));
        assert_eq!(b.label.as_deref(), Some("b"));
        assert_eq!((b.level_index, b.bar_index, b.item_index), (1, 1, 2));
        assert!(!b.collapsed);
    }

    #[test]
    fn narrow_siblings_collapse() {
        let store = siblings(100, 1.0);
        // 100 ticks over 400px: each leaf is 4px wide.
        let projection = Projection::for_levels(store.levels(), 400.0, ZoomRange::FULL);
        let rects = level_rects(
            store.table(),
            store.levels(),
            1,
            &projection,
            &RenderConfig::default(),
        );

        assert!(rects.len() < 100);
        assert_eq!(rects.len(), 1);
        assert!(rects.iter().all(|r| r.collapsed && r.label.is_none()));
        assert_eq!(rects[0].ticks, 100.0);
        assert_eq!(rects[0].width, 400.0);
    }

    #[test]
    fn medium_bars_stay_unlabeled() {
        let store = siblings(10, 1.0);
        // 15px per leaf: above collapse, below label threshold.
        let projection = Projection::for_levels(store.levels(), 150.0, ZoomRange::FULL);
        let rects = level_rects(
            store.table(),
            store.levels(),
            1,
            &projection,
            &RenderConfig::default(),
        );
        assert_eq!(rects.len(), 10);
        assert!(rects.iter().all(|r| !r.collapsed && r.label.is_none()));
    }

    #[test]
    fn sub_pixel_bars_are_hidden() {
        let store = siblings(1_000, 1.0);
        // 0.1px per leaf with collapsing disabled.
        let config = RenderConfig {
            collapse_threshold_px: 0.0,
            ..RenderConfig::default()
        };
        let projection = Projection::for_levels(store.levels(), 100.0, ZoomRange::FULL);
        let rects = level_rects(store.table(), store.levels(), 1, &projection, &config);
        assert!(rects.is_empty());
    }

    #[test]
    fn zoom_shifts_and_scales() {
        let store = siblings(4, 25.0);
        let projection = Projection::for_levels(store.levels(), 200.0, ZoomRange::new(0.5, 1.0));
        let rects = level_rects(
            store.table(),
            store.levels(),
            1,
            &projection,
            &RenderConfig::default(),
        );
        let xs: Vec<_> = rects.iter().map(|r| r.x).collect();
        assert_eq!(xs, [-200.0, -100.0, 0.0, 100.0]);
    }
}
