use flame_levels_protocol::{Hsl, ZoomRange};

use crate::model::DiffChange;

/// Share of the visible range a node covers, saturating at 1.
pub fn intensity(value: f64, total_ticks: f64, range: ZoomRange) -> f64 {
    if total_ticks <= 0.0 {
        return 0.0;
    }
    (value / total_ticks / range.span()).min(1.0)
}

/// Yellow for small nodes shading to red as a node fills the view.
pub fn bar_color_by_value(value: f64, total_ticks: f64, range: ZoomRange) -> Hsl {
    let i = intensity(value, total_ticks, range);
    Hsl {
        h: 50.0 - 50.0 * i,
        s: 100.0,
        l: 65.0 + 7.0 * i,
    }
}

/// Red for nodes that grew in the comparison, green for nodes that shrank,
/// grey when unchanged. Saturation reaches its maximum at a 100% change;
/// new nodes are fully red and removed ones fully green.
pub fn diff_color(change: DiffChange) -> Hsl {
    let percent = change.percent();
    let h = if percent < 0.0 { 120.0 } else { 0.0 };
    Hsl {
        h,
        s: (percent.abs() / 100.0).min(1.0) * 100.0,
        l: 60.0,
    }
}

/// Package or namespace part of a symbol name.
///
/// Handles `pkg/path.Func` (Go), `crate::module::func` (Rust, C++) and
/// `com.example.Class.method` (Java). Returns `None` for bare names.
pub fn package_name(label: &str) -> Option<&str> {
    if let Some(pos) = label.rfind("::") {
        return Some(&label[..pos]).filter(|p| !p.is_empty());
    }
    let after_slash = label.rfind('/').map_or(0, |p| p + 1);
    let tail = &label[after_slash..];
    let dot = tail.find('.')?;
    let end = match label.find('/') {
        // Go: the package path runs up to the first dot after the last slash.
        Some(_) => after_slash + dot,
        // Java-like: everything before the final segment.
        None => label.rfind('.').unwrap_or(dot),
    };
    Some(&label[..end]).filter(|p| !p.is_empty())
}

/// Stable palette slot for a label: nodes of one package share a color.
pub fn package_color_index(label: &str, palette_len: usize) -> usize {
    if palette_len == 0 {
        return 0;
    }
    let key = package_name(label).unwrap_or(label);
    (fnv1a(key.as_bytes()) % palette_len as u64) as usize
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0xcbf2_9ce4_8422_2325, |hash, &b| {
        (hash ^ u64::from(b)).wrapping_mul(0x0000_0100_0000_01b3)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intensity_saturates_toward_the_visible_range() {
        let full = ZoomRange::FULL;
        assert_eq!(intensity(0.0, 100.0, full), 0.0);
        assert_eq!(intensity(50.0, 100.0, full), 0.5);
        assert_eq!(intensity(100.0, 100.0, full), 1.0);
        // Zoomed to half the profile, a half-size node already fills it.
        assert_eq!(intensity(50.0, 100.0, ZoomRange::new(0.0, 0.5)), 1.0);
        assert_eq!(intensity(80.0, 100.0, ZoomRange::new(0.0, 0.5)), 1.0);
    }

    #[test]
    fn color_endpoints() {
        let cold = bar_color_by_value(0.0, 100.0, ZoomRange::FULL);
        assert_eq!((cold.h, cold.s, cold.l), (50.0, 100.0, 65.0));
        let hot = bar_color_by_value(100.0, 100.0, ZoomRange::FULL);
        assert_eq!((hot.h, hot.l), (0.0, 72.0));
    }

    #[test]
    fn diff_colors_by_direction() {
        let same = diff_color(DiffChange::Changed(0.0));
        assert_eq!(same.s, 0.0);
        let grew = diff_color(DiffChange::Changed(50.0));
        assert_eq!((grew.h, grew.s), (0.0, 50.0));
        let shrank = diff_color(DiffChange::Changed(-25.0));
        assert_eq!((shrank.h, shrank.s), (120.0, 25.0));
        assert_eq!(diff_color(DiffChange::New).s, 100.0);
        let removed = diff_color(DiffChange::Removed);
        assert_eq!((removed.h, removed.s), (120.0, 100.0));
        assert_eq!(diff_color(DiffChange::Changed(400.0)).s, 100.0);
    }

    #[test]
    fn package_names() {
        assert_eq!(package_name("net/http.(*conn).serve"), Some("net/http"));
        assert_eq!(package_name("runtime.mallocgc"), Some("runtime"));
        assert_eq!(package_name("std::io::copy"), Some("std::io"));
        assert_eq!(package_name("com.example.Server.handle"), Some("com.example.Server"));
        assert_eq!(package_name("main"), None);
    }

    #[test]
    fn same_package_same_color() {
        let a = package_color_index("runtime.mallocgc", 16);
        let b = package_color_index("runtime.gcBgMarkWorker", 16);
        assert_eq!(a, b);
        assert!(a < 16);
        assert_eq!(package_color_index("anything", 0), 0);
    }
}
