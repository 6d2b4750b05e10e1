use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Global string interner for logical node ids: fast comparisons, low memory.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// A lightweight, interned logical identifier for nodes in the metadata tree.
/// Internally a `Spur` index: 4 bytes, Copy, Eq, Hash in O(1).
///
/// Logical ids are `id-<native-id>` when the element carries a native `id`
/// attribute, or a path-encoded `element-<path>-<tag>` fallback that is only
/// stable within a single build.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(Spur);

impl NodeId {
    /// Intern a new string as a NodeId, or return existing if already interned.
    pub fn intern(s: &str) -> Self {
        NodeId(INTERNER.get_or_intern(s))
    }

    /// Logical id for an element with a native `id` attribute.
    pub fn from_dom_id(dom_id: &str) -> Self {
        Self::intern(&format!("id-{dom_id}"))
    }

    /// Path-encoded logical id for an element without a native `id`.
    /// `path` encodes ancestor traversal order, e.g. `root-0-2`.
    pub fn from_path(path: &str, tag: &str) -> Self {
        Self::intern(&format!("element-{path}-{tag}"))
    }

    /// Resolve back to a string slice.
    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(NodeId::intern(&s))
    }
}

/// Generate a fresh marker value for stamping onto an element that has no
/// native identity. Time-based with a process-unique suffix, so collisions
/// across documents and sessions are negligible.
pub fn marker_value() -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    format!("sv-{millis}-{n:x}")
}
