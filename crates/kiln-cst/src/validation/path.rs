//! Fully qualified key paths.

use std::fmt;
use std::hash::{Hash, Hasher};

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0100_0000_01b3;

/// One step in a path: a key or a position in an array.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl PathSegment {
    fn fnv(&self) -> u64 {
        match self {
            PathSegment::Key(key) => fnv_bytes(0, key.as_bytes()),
            PathSegment::Index(index) => fnv_bytes(1, &(*index as u64).to_le_bytes()),
        }
    }
}

fn fnv_bytes(tag: u8, bytes: &[u8]) -> u64 {
    let mut hash = (FNV_OFFSET ^ u64::from(tag)).wrapping_mul(FNV_PRIME);
    for byte in bytes {
        hash = (hash ^ u64::from(*byte)).wrapping_mul(FNV_PRIME);
    }
    hash
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key)
                if !key.is_empty() && key.chars().all(kiln_tokenizer::is_bare_key_char) =>
            {
                write!(f, "{key}")
            }
            PathSegment::Key(key) => write!(f, "\"{}\"", key.escape_debug()),
            PathSegment::Index(index) => write!(f, "{index}"),
        }
    }
}

/// An ordered list of segments from the document root.
///
/// The hash of every prefix is kept next to the segments, so hashing a path
/// is a lookup and pushing a segment costs one combine step.
#[derive(Debug, Clone, Default)]
pub struct ObjectPath {
    segments: Vec<PathSegment>,
    /// `hashes[i]` covers `segments[..=i]`.
    hashes: Vec<u64>,
}

impl ObjectPath {
    /// The empty (root) path.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, segment: PathSegment) {
        let hash = (self.hash_value() ^ segment.fnv()).wrapping_mul(FNV_PRIME);
        self.segments.push(segment);
        self.hashes.push(hash);
    }

    pub fn pop(&mut self) -> Option<PathSegment> {
        self.hashes.pop();
        self.segments.pop()
    }

    /// Drop segments past `len`.
    pub fn truncate(&mut self, len: usize) {
        self.segments.truncate(len);
        self.hashes.truncate(len);
    }

    pub fn clear(&mut self) {
        self.truncate(0);
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Order-sensitive hash of the whole path.
    pub fn hash_value(&self) -> u64 {
        self.hashes.last().copied().unwrap_or(FNV_OFFSET)
    }
}

impl FromIterator<PathSegment> for ObjectPath {
    fn from_iter<I: IntoIterator<Item = PathSegment>>(iter: I) -> Self {
        let mut path = ObjectPath::new();
        for segment in iter {
            path.push(segment);
        }
        path
    }
}

impl PartialEq for ObjectPath {
    fn eq(&self, other: &Self) -> bool {
        self.hash_value() == other.hash_value() && self.segments == other.segments
    }
}

impl Eq for ObjectPath {}

impl Hash for ObjectPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_value());
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}
