use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An interned-style frame label.
///
/// Labels are repeated across thousands of rows, the label index, merged
/// sandwich nodes and every emitted `BarRect`. Cloning is an `Arc` bump.
#[derive(Debug, Clone, Eq)]
pub struct SharedStr(Arc<str>);

impl SharedStr {
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether two labels share one allocation (same interned entry).
    #[inline]
    pub fn same_allocation(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for SharedStr {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.same_allocation(other) || self.0 == other.0
    }
}

impl PartialEq<str> for SharedStr {
    #[inline]
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for SharedStr {
    #[inline]
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl Ord for SharedStr {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

impl PartialOrd for SharedStr {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

// Must hash like `str` so maps keyed by `SharedStr` can be queried with `&str`.
impl Hash for SharedStr {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (*self.0).hash(state);
    }
}

impl Deref for SharedStr {
    type Target = str;

    #[inline]
    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for SharedStr {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for SharedStr {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SharedStr {
    fn from(s: &str) -> Self {
        Self(Arc::from(s))
    }
}

impl From<String> for SharedStr {
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl fmt::Display for SharedStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for SharedStr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SharedStr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Owned so escaped JSON strings deserialize too.
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn clones_share_the_label() {
        let a = SharedStr::from("runtime.mallocgc");
        let b = a.clone();
        assert!(a.same_allocation(&b));
        assert_eq!(a, b);
    }

    #[test]
    fn equal_text_from_different_allocations() {
        let a = SharedStr::from("main");
        let b = SharedStr::from(String::from("main"));
        assert!(!a.same_allocation(&b));
        assert_eq!(a, b);
        assert_eq!(a, "main");
    }

    #[test]
    fn label_map_lookup_by_str() {
        let mut index = HashMap::new();
        index.insert(SharedStr::from("net/http.(*conn).serve"), 3usize);
        assert_eq!(index.get("net/http.(*conn).serve"), Some(&3));
        assert!(index.get("missing").is_none());
    }

    #[test]
    fn serde_handles_escaped_labels() {
        let label: SharedStr =
            serde_json::from_str(r#""fn<T>""#).unwrap_or_else(|_| SharedStr::from(""));
        assert_eq!(label, "fn<T>");
        let json = serde_json::to_string(&label).unwrap_or_default();
        assert_eq!(json, "\"fn<T>\"");
    }
}
