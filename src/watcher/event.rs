//! The decoded change event record.

use serde::Serialize;

use crate::flags::WatchFlags;
use crate::path::Path;

/// One decoded filesystem change.
///
/// Created by the watch subsystem for every decoded OS notification and
/// never mutated afterwards; the dispatcher consumes it once.
#[derive(Debug, Clone, Serialize)]
pub struct WatchEvent {
    /// Monotonically increasing per-source sequence number.
    pub sequence_id: u64,
    /// The path the change applies to.
    pub path: Path,
    /// What happened.
    pub flags: WatchFlags,
}

impl WatchEvent {
    pub fn new(sequence_id: u64, path: Path, flags: WatchFlags) -> WatchEvent {
        WatchEvent {
            sequence_id,
            path,
            flags,
        }
    }
}

impl std::fmt::Display for WatchEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{} {} [{}]", self.sequence_id, self.path, self.flags)
    }
}
