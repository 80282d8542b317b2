//! Pickup slots that feed the running score.

use skywatch_core::{CollectibleId, Vec3};

#[derive(Clone, Copy, Debug)]
pub(crate) struct PickupSlot {
    /// Position the pickup currently occupies.
    pub(crate) position: Vec3,
    /// Whether the pickup is visible and can be touched.
    pub(crate) active: bool,
}

/// Reasons a pickup touch may be ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PickupRejected {
    /// The player already carries a pickup.
    AlreadyCarrying,
    /// The touched pickup is hidden or unknown.
    Unavailable,
}

/// Registry of pickup slots, one per configured point.
#[derive(Debug)]
pub(crate) struct CollectibleRegistry {
    points: Vec<Vec3>,
    slots: Vec<PickupSlot>,
    next_point: usize,
    score: u32,
    carrying: bool,
}

impl CollectibleRegistry {
    /// Creates hidden pickup slots positioned at the provided points.
    pub(crate) fn new(points: Vec<Vec3>) -> Self {
        let slots = points
            .iter()
            .map(|&position| PickupSlot {
                position,
                active: false,
            })
            .collect();
        Self {
            points,
            slots,
            next_point: 0,
            score: 0,
            carrying: false,
        }
    }

    pub(crate) fn score(&self) -> u32 {
        self.score
    }

    pub(crate) fn is_carrying(&self) -> bool {
        self.carrying
    }

    /// Active pickups in slot order.
    pub(crate) fn active(&self) -> impl Iterator<Item = (CollectibleId, Vec3)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.active)
            .filter_map(|(index, slot)| {
                u32::try_from(index)
                    .ok()
                    .map(|index| (CollectibleId::new(index), slot.position))
            })
    }

    /// Shows the first hidden pickup at the next point in rotation.
    pub(crate) fn activate_next(&mut self) -> Option<(CollectibleId, Vec3)> {
        if self.points.is_empty() {
            return None;
        }
        let index = self.slots.iter().position(|slot| !slot.active)?;
        let id = CollectibleId::new(u32::try_from(index).ok()?);
        let position = self.points[self.next_point];
        self.next_point = (self.next_point + 1) % self.points.len();

        let slot = &mut self.slots[index];
        slot.position = position;
        slot.active = true;
        Some((id, position))
    }

    /// Picks up a pickup, returning the new score.
    pub(crate) fn pick_up(&mut self, id: CollectibleId) -> Result<u32, PickupRejected> {
        if self.carrying {
            return Err(PickupRejected::AlreadyCarrying);
        }
        let slot = usize::try_from(id.get())
            .ok()
            .and_then(|index| self.slots.get_mut(index))
            .filter(|slot| slot.active)
            .ok_or(PickupRejected::Unavailable)?;
        slot.active = false;
        self.carrying = true;
        self.score = self.score.saturating_add(1);
        Ok(self.score)
    }

    /// Drops the carried pickup; returns `false` when nothing was carried.
    pub(crate) fn deposit(&mut self) -> bool {
        let carried = self.carrying;
        self.carrying = false;
        carried
    }
}
