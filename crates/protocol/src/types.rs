use serde::{Deserialize, Serialize};

use crate::shared_str::SharedStr;

/// One rectangle of a flame graph level, in canvas pixels.
///
/// `bar_index` is the position of the first folded node inside its level,
/// so a renderer can map the rect back to `levels[level_index][bar_index]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Several sub-threshold siblings drawn as one unlabeled block.
    pub collapsed: bool,
    /// Present only when the bar is wide enough to carry text.
    pub label: Option<SharedStr>,
    /// First source row folded into this bar.
    pub item_index: usize,
    pub level_index: usize,
    pub bar_index: usize,
    /// Ticks covered by the rect (sum over folded siblings when collapsed).
    pub ticks: f64,
}

impl BarRect {
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Result of a successful pixel → node lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BarCoordinates {
    pub level_index: usize,
    pub bar_index: usize,
}

/// Visible window over the total ticks, as fractions in `[0, 1]`.
///
/// Not validated: `min > max` or values outside `[0, 1]` give meaningless
/// but finite coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomRange {
    pub min: f64,
    pub max: f64,
}

impl ZoomRange {
    pub const FULL: ZoomRange = ZoomRange { min: 0.0, max: 1.0 };

    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Zoom so that a node spanning `[start, start + value)` fills the view.
    pub fn focus(start: f64, value: f64, total_ticks: f64) -> Self {
        if total_ticks <= 0.0 {
            return Self::FULL;
        }
        Self {
            min: start / total_ticks,
            max: (start + value) / total_ticks,
        }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

impl Default for ZoomRange {
    fn default() -> Self {
        Self::FULL
    }
}

/// A color in HSL space: hue in degrees, saturation and lightness in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hsl {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn focus_maps_node_to_fractions() {
        let range = ZoomRange::focus(200.0, 100.0, 400.0);
        assert!((range.min - 0.5).abs() < f64::EPSILON);
        assert!((range.max - 0.75).abs() < f64::EPSILON);
        assert!((range.span() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn focus_on_empty_profile_is_full_range() {
        assert_eq!(ZoomRange::focus(0.0, 0.0, 0.0), ZoomRange::FULL);
    }

    #[test]
    fn rect_center() {
        let rect = BarRect {
            x: 10.0,
            y: 22.0,
            width: 100.0,
            height: 22.0,
            collapsed: false,
            label: None,
            item_index: 0,
            level_index: 1,
            bar_index: 0,
            ticks: 5.0,
        };
        assert_eq!(rect.center(), (60.0, 33.0));
    }
}
