//! Paths addressing a location inside a state snapshot.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A path into a snapshot: a sequence of object keys and array indices.
///
/// The empty path addresses the whole snapshot.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<PathSegment>);

impl Path {
    /// Create an empty (root) path.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Create a path from segments.
    pub fn new(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }

    /// Single-key path, the common case for flat state.
    pub fn key(key: impl Into<String>) -> Self {
        Self(vec![PathSegment::Key(key.into())])
    }

    /// Parse a path from dot notation (e.g., "user.name" or "items.0.value").
    ///
    /// Numeric segments become indices.
    pub fn parse(path: &str) -> Self {
        if path.is_empty() {
            return Self::root();
        }
        let segments = path
            .split('.')
            .map(|s| match s.parse::<usize>() {
                Ok(idx) => PathSegment::Index(idx),
                Err(_) => PathSegment::Key(s.to_string()),
            })
            .collect();
        Self(segments)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the parent path.
    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    pub fn last(&self) -> Option<&PathSegment> {
        self.0.last()
    }

    /// Check whether `self` is `other` or lies underneath it.
    pub fn starts_with(&self, other: &Path) -> bool {
        self.0.starts_with(&other.0)
    }

    pub fn push(&mut self, segment: PathSegment) {
        self.0.push(segment);
    }

    pub fn pop(&mut self) -> Option<PathSegment> {
        self.0.pop()
    }

    /// Create a child path with a key.
    pub fn child_key(&self, key: impl Into<String>) -> Self {
        let mut new = self.clone();
        new.push(PathSegment::Key(key.into()));
        new
    }

    /// Create a child path with an index.
    pub fn child_index(&self, index: usize) -> Self {
        let mut new = self.clone();
        new.push(PathSegment::Index(index));
        new
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: Vec<String> = self.0.iter().map(|s| s.to_string()).collect();
        write!(f, "{}", s.join("."))
    }
}

impl From<Vec<PathSegment>> for Path {
    fn from(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }
}

impl FromIterator<PathSegment> for Path {
    fn from_iter<I: IntoIterator<Item = PathSegment>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A segment in a path.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// Array index.
    Index(usize),
    /// Object key.
    Key(String),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(k) => write!(f, "{}", k),
            PathSegment::Index(i) => write!(f, "{}", i),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let path = Path::parse("items.0.value");
        assert_eq!(
            path.segments(),
            &[
                PathSegment::Key("items".into()),
                PathSegment::Index(0),
                PathSegment::Key("value".into()),
            ]
        );
        assert_eq!(path.to_string(), "items.0.value");
        assert!(Path::parse("").is_root());
    }

    #[test]
    fn test_parent_and_children() {
        let path = Path::key("user").child_key("tags").child_index(2);
        assert_eq!(path.len(), 3);
        assert_eq!(path.parent(), Some(Path::parse("user.tags")));
        assert_eq!(path.last(), Some(&PathSegment::Index(2)));
        assert!(path.starts_with(&Path::key("user")));
        assert!(!Path::key("user").starts_with(&path));
        assert_eq!(Path::root().parent(), None);
    }

    #[test]
    fn test_serde_shape() {
        let path = Path::key("items").child_index(3);
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, r#"["items",3]"#);
        let back: Path = serde_json::from_str(&json).unwrap();
        assert_eq!(back, path);
    }

    #[test]
    fn test_ordering_puts_parents_first() {
        let mut paths = vec![
            Path::parse("b"),
            Path::parse("a.1"),
            Path::parse("a"),
            Path::parse("a.0"),
        ];
        paths.sort();
        assert_eq!(
            paths,
            vec![Path::parse("a"), Path::parse("a.0"), Path::parse("a.1"), Path::parse("b")]
        );
    }
}
