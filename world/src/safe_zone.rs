//! Safe-zone membership tracking.

use std::collections::BTreeSet;

use skywatch_core::{SafeZoneStatus, ZoneId};

/// Zones the player currently stands in.
#[derive(Clone, Debug, Default)]
pub struct SafeZones {
    occupied: BTreeSet<ZoneId>,
}

impl SafeZones {
    /// Creates an empty membership set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that the player entered `zone`.
    ///
    /// Returns `true` when the player was unprotected before.
    pub fn enter(&mut self, zone: ZoneId) -> bool {
        let was_safe = self.is_player_safe();
        let _ = self.occupied.insert(zone);
        !was_safe
    }

    /// Records that the player left `zone`.
    ///
    /// Returns `true` when the player lost protection.
    pub fn exit(&mut self, zone: ZoneId) -> bool {
        let was_safe = self.is_player_safe();
        let _ = self.occupied.remove(&zone);
        was_safe && !self.is_player_safe()
    }
}

impl SafeZoneStatus for SafeZones {
    fn is_player_safe(&self) -> bool {
        !self.occupied.is_empty()
    }
}
