//! Node keys and key allocation.

use std::fmt;

use serde::{Deserialize, Serialize};
use smol_str::{SmolStr, format_smolstr};

/// Identity of a node within one editor session.
///
/// Keys are only used for identity, never for semantic comparison.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeKey(SmolStr);

impl NodeKey {
    /// Key of the root node. It is the only key not produced by a `KeyAllocator`.
    pub fn root() -> Self {
        Self(SmolStr::new_static("root"))
    }

    pub fn is_root(&self) -> bool {
        self.0 == "root"
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeKey {
    fn from(s: &str) -> Self {
        Self(SmolStr::new(s))
    }
}

/// Monotonic key source for an editor session.
///
/// Keys handed out are never reused, even when the node they named is
/// removed or the transaction that created it is discarded.
#[derive(Debug, Default, Clone)]
pub struct KeyAllocator {
    issued: u64,
}

impl KeyAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next key (`n1`, `n2`, ...).
    pub fn next_key(&mut self) -> NodeKey {
        self.issued += 1;
        NodeKey(format_smolstr!("n{}", self.issued))
    }

    /// Number of keys issued so far.
    pub fn issued(&self) -> u64 {
        self.issued
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_monotonic() {
        let mut keys = KeyAllocator::new();
        assert_eq!(keys.next_key().as_str(), "n1");
        assert_eq!(keys.next_key().as_str(), "n2");
        assert_eq!(keys.issued(), 2);
    }

    #[test]
    fn test_root_key() {
        assert!(NodeKey::root().is_root());
        assert!(!NodeKey::from("n1").is_root());
        assert_eq!(NodeKey::root().to_string(), "root");
    }
}
