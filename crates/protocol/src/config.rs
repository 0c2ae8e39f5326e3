use serde::{Deserialize, Serialize};

/// Pixel thresholds used when turning levels into rectangles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Bars at or below this width are merged with touching small siblings.
    pub collapse_threshold_px: f64,
    /// Bars narrower than this are neither drawn nor hit-testable.
    pub hide_threshold_px: f64,
    /// Bars must be wider than this to carry a label.
    pub label_threshold_px: f64,
    pub pixels_per_level: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            collapse_threshold_px: 10.0,
            hide_threshold_px: 0.5,
            label_threshold_px: 20.0,
            pixels_per_level: 22.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: RenderConfig =
            serde_json::from_str(r#"{"pixels_per_level": 16.0}"#).unwrap_or_default();
        assert_eq!(config.pixels_per_level, 16.0);
        assert_eq!(config.collapse_threshold_px, 10.0);
        assert_eq!(config.label_threshold_px, 20.0);
    }
}
