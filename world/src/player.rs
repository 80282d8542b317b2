//! Player health bookkeeping.

use skywatch_core::DamageSink;

/// Clamped health pool that agents damage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Health {
    current: u32,
    max: u32,
}

impl Health {
    /// Creates a full health pool.
    #[must_use]
    pub const fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    /// Remaining health.
    #[must_use]
    pub const fn current(&self) -> u32 {
        self.current
    }

    /// Maximum health.
    #[must_use]
    pub const fn max(&self) -> u32 {
        self.max
    }

    /// Reports whether health is depleted.
    #[must_use]
    pub const fn is_depleted(&self) -> bool {
        self.current == 0
    }

    /// Restores health without exceeding the maximum.
    pub fn heal(&mut self, amount: u32) {
        self.current = self.current.saturating_add(amount).min(self.max);
    }
}

impl DamageSink for Health {
    fn apply_damage(&mut self, amount: u32) {
        self.current = self.current.saturating_sub(amount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn damage_clamps_at_zero() {
        let mut health = Health::new(100);
        health.apply_damage(60);
        health.apply_damage(60);
        assert_eq!(health.current(), 0);
        assert!(health.is_depleted());
    }

    #[test]
    fn heal_clamps_at_max() {
        let mut health = Health::new(100);
        health.apply_damage(30);
        health.heal(50);
        assert_eq!(health.current(), 100);
    }
}
