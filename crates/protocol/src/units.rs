use serde::{Deserialize, Serialize};

/// What a tick in the `value` / `self` columns measures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueUnit {
    Nanoseconds,
    Microseconds,
    Milliseconds,
    Seconds,
    Bytes,
    /// Plain sample counts.
    #[default]
    Short,
}

impl ValueUnit {
    /// Map a data-frame field unit id (`"ns"`, `"bytes"`, ...) to a unit.
    /// Unknown or absent ids fall back to [`ValueUnit::Short`].
    pub fn from_field_unit(unit: Option<&str>) -> Self {
        match unit {
            Some("ns") => Self::Nanoseconds,
            Some("µs" | "us") => Self::Microseconds,
            Some("ms") => Self::Milliseconds,
            Some("s") => Self::Seconds,
            Some("bytes" | "decbytes") => Self::Bytes,
            _ => Self::Short,
        }
    }

    /// Format a tick count for display, choosing the largest fitting suffix.
    pub fn format_value(&self, value: f64) -> String {
        match self {
            Self::Nanoseconds => format_time(value),
            Self::Microseconds => format_time(value * 1_000.0),
            Self::Milliseconds => format_time(value * 1_000_000.0),
            Self::Seconds => format_time(value * 1_000_000_000.0),
            Self::Bytes => {
                if value >= 1_073_741_824.0 {
                    format!("{:.2} GiB", value / 1_073_741_824.0)
                } else if value >= 1_048_576.0 {
                    format!("{:.2} MiB", value / 1_048_576.0)
                } else if value >= 1_024.0 {
                    format!("{:.2} KiB", value / 1_024.0)
                } else {
                    format!("{} B", value as u64)
                }
            }
            Self::Short => {
                if value >= 1_000_000_000.0 {
                    format!("{:.2} Bil", value / 1_000_000_000.0)
                } else if value >= 1_000_000.0 {
                    format!("{:.2} Mil", value / 1_000_000.0)
                } else if value >= 1_000.0 {
                    format!("{:.2} K", value / 1_000.0)
                } else {
                    format!("{}", value as u64)
                }
            }
        }
    }
}

fn format_time(nanos: f64) -> String {
    if nanos >= 1_000_000_000.0 {
        format!("{:.2} s", nanos / 1_000_000_000.0)
    } else if nanos >= 1_000_000.0 {
        format!("{:.2} ms", nanos / 1_000_000.0)
    } else if nanos >= 1_000.0 {
        format!("{:.2} µs", nanos / 1_000.0)
    } else {
        format!("{nanos:.0} ns")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_unit_ids() {
        assert_eq!(ValueUnit::from_field_unit(Some("ns")), ValueUnit::Nanoseconds);
        assert_eq!(ValueUnit::from_field_unit(Some("us")), ValueUnit::Microseconds);
        assert_eq!(ValueUnit::from_field_unit(Some("bytes")), ValueUnit::Bytes);
        assert_eq!(ValueUnit::from_field_unit(Some("short")), ValueUnit::Short);
        assert_eq!(ValueUnit::from_field_unit(None), ValueUnit::Short);
    }

    #[test]
    fn time_scales_through_suffixes() {
        assert_eq!(ValueUnit::Nanoseconds.format_value(850.0), "850 ns");
        assert_eq!(ValueUnit::Nanoseconds.format_value(1_500.0), "1.50 µs");
        assert_eq!(ValueUnit::Nanoseconds.format_value(2_500_000_000.0), "2.50 s");
        assert_eq!(ValueUnit::Milliseconds.format_value(12.0), "12.00 ms");
    }

    #[test]
    fn bytes_and_counts() {
        assert_eq!(ValueUnit::Bytes.format_value(512.0), "512 B");
        assert_eq!(ValueUnit::Bytes.format_value(2_048.0), "2.00 KiB");
        assert_eq!(ValueUnit::Short.format_value(42.0), "42");
        assert_eq!(ValueUnit::Short.format_value(1_200.0), "1.20 K");
    }
}
