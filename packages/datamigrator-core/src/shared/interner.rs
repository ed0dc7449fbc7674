//! String interning for type and field names
//!
//! Every vertex and edge repeats its type name or field name; interning makes
//! them share one allocation per distinct name.

use dashmap::DashMap;
use serde::{Deserialize, Deserializer, Serializer};
use std::sync::Arc;

/// Interned string, cheap to clone and compare
pub type InternedString = Arc<str>;

static STRING_INTERNER: std::sync::LazyLock<DashMap<Arc<str>, Arc<str>>> =
    std::sync::LazyLock::new(DashMap::new);

/// Intern a string (concurrent-safe, deduplicates automatically)
#[inline]
pub fn intern_str(s: impl AsRef<str>) -> InternedString {
    let s_ref = s.as_ref();

    // Fast path: check if already interned
    if let Some(entry) = STRING_INTERNER.get(s_ref) {
        return Arc::clone(entry.value());
    }

    // Slow path: insert new string
    let arc: Arc<str> = Arc::from(s_ref);
    STRING_INTERNER
        .entry(Arc::clone(&arc))
        .or_insert(arc)
        .clone()
}

/// Number of distinct strings interned so far
pub fn interner_size() -> usize {
    STRING_INTERNER.len()
}

/// Serialize Arc<str> as a regular string
pub fn serialize_arc_str<S>(arc_str: &Arc<str>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(arc_str.as_ref())
}

/// Deserialize a string into an interned Arc<str>
pub fn deserialize_arc_str<'de, D>(deserializer: D) -> Result<Arc<str>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Ok(intern_str(s))
}
