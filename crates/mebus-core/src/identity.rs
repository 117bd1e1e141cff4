//! Reference identities for values tracked by a reactive host.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_IDENTITY: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a schema or callback map instance.
///
/// Clones of a value share its identity; building a new value yields a new
/// one. Hosts compare identities, never contents, to decide whether a
/// dependency changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity(u64);

impl Identity {
    /// Allocate a new identity.
    #[must_use]
    pub fn fresh() -> Self {
        Self(NEXT_IDENTITY.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw identity value.
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_identities_differ() {
        let a = Identity::fresh();
        let b = Identity::fresh();
        assert_ne!(a, b);
        assert!(b > a);
    }

    #[test]
    fn test_identity_display() {
        let id = Identity::fresh();
        assert_eq!(id.to_string(), format!("#{}", id.get()));
    }
}
