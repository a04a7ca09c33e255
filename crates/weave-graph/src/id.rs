//! Identifiers for events and universes.
//!
//! Both are ULIDs: 128-bit, sortable, and rendered as 26-character
//! Crockford base32 strings. The byte order of a ULID matches the
//! lexicographic order of its string form, so `Ord` on these ids is the
//! same as comparing their rendered strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

/// Unique identifier of a causal event. Never reused.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Ulid);

impl EventId {
    /// Mint a fresh id.
    pub fn new() -> Self {
        EventId(Ulid::new())
    }

    /// Wrap an existing ULID.
    pub fn from_ulid(ulid: Ulid) -> Self {
        EventId(ulid)
    }

    /// Get the underlying ULID.
    pub fn as_ulid(&self) -> Ulid {
        self.0
    }

    /// Truncated display (last 8 chars, the random part).
    pub fn short(&self) -> String {
        let s = self.0.to_string();
        s[s.len() - 8..].to_string()
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventId({})", self.0)
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EventId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ulid::from_string(s).map(EventId)
    }
}

/// Unique identifier of a universe (a named branch/timeline).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UniverseId(Ulid);

impl UniverseId {
    pub fn new() -> Self {
        UniverseId(Ulid::new())
    }

    pub fn from_ulid(ulid: Ulid) -> Self {
        UniverseId(ulid)
    }

    pub fn as_ulid(&self) -> Ulid {
        self.0
    }
}

impl Default for UniverseId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for UniverseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UniverseId({})", self.0)
    }
}

impl fmt::Display for UniverseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UniverseId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ulid::from_string(s).map(UniverseId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let a = EventId::new();
        let b = EventId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_string_roundtrip() {
        let id = EventId::new();
        let parsed: EventId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);

        let uid = UniverseId::new();
        let parsed: UniverseId = uid.to_string().parse().unwrap();
        assert_eq!(uid, parsed);
    }

    #[test]
    fn test_order_matches_string_order() {
        let mut ids: Vec<EventId> = (0..32).map(|_| EventId::new()).collect();
        let mut strings: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
        ids.sort();
        strings.sort();
        let rendered: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
        assert_eq!(rendered, strings);
    }

    #[test]
    fn test_short() {
        let id = EventId::new();
        assert_eq!(id.short().len(), 8);
        assert!(id.to_string().ends_with(&id.short()));
    }

    #[test]
    fn test_serde_is_plain_string() {
        let id = EventId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
    }
}
