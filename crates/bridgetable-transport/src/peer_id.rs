use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_PEER: AtomicU64 = AtomicU64::new(1);

/// Process-unique number of an accepted peer. Never reused while the
/// process runs, so it doubles as the player's identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PeerId(u64);

impl PeerId {
    /// Draws the next id.
    pub fn next() -> Self {
        Self(NEXT_PEER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for PeerId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "peer#{}", self.0)
    }
}
