//! Waypoint following used while an agent patrols.

use glam::Vec3;

/// Distance under which a waypoint counts as reached.
pub const ARRIVAL_THRESHOLD: f32 = 0.1;

/// Cyclic waypoint route that moves a position toward one waypoint at a time.
#[derive(Clone, Debug)]
pub struct PathFollower {
    waypoints: Vec<Vec3>,
    current: usize,
    enabled: bool,
}

impl PathFollower {
    /// Creates an enabled follower for the provided route.
    #[must_use]
    pub fn new(waypoints: Vec<Vec3>) -> Self {
        Self {
            waypoints,
            current: 0,
            enabled: true,
        }
    }

    /// Reports whether the follower currently drives motion.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Turns waypoint following on or off without losing route progress.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Rewinds the route to its first waypoint.
    pub fn restart(&mut self) {
        self.current = 0;
    }

    /// Reports whether the route has no waypoints.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Waypoint the follower is heading to, if any.
    #[must_use]
    pub fn current_waypoint(&self) -> Option<Vec3> {
        self.waypoints.get(self.current).copied()
    }

    /// Moves `position` toward the current waypoint by at most `max_distance`.
    ///
    /// Returns `false` without touching the position when the follower is
    /// disabled or the route is empty.
    pub fn advance(&mut self, position: &mut Vec3, max_distance: f32) -> bool {
        if !self.enabled {
            return false;
        }
        let Some(target) = self.current_waypoint() else {
            return false;
        };

        *position = move_towards(*position, target, max_distance);
        if position.distance(target) < ARRIVAL_THRESHOLD {
            self.current = (self.current + 1) % self.waypoints.len();
        }
        true
    }
}

/// Moves `current` toward `target` by at most `max_delta` without overshooting.
#[must_use]
pub fn move_towards(current: Vec3, target: Vec3, max_delta: f32) -> Vec3 {
    let offset = target - current;
    let distance = offset.length();
    if distance <= max_delta || distance <= f32::EPSILON {
        return target;
    }
    current + offset / distance * max_delta
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_towards_stops_at_target() {
        let moved = move_towards(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), 5.0);
        assert_eq!(moved, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn move_towards_respects_step_length() {
        let moved = move_towards(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), 2.5);
        assert!((moved.x - 2.5).abs() < 1e-5);
    }

    #[test]
    fn empty_route_leaves_position_untouched() {
        let mut follower = PathFollower::new(Vec::new());
        let mut position = Vec3::new(3.0, 4.0, 5.0);
        assert!(!follower.advance(&mut position, 1.0));
        assert_eq!(position, Vec3::new(3.0, 4.0, 5.0));
    }

    #[test]
    fn disabled_follower_does_not_move() {
        let mut follower = PathFollower::new(vec![Vec3::new(10.0, 0.0, 0.0)]);
        follower.set_enabled(false);
        let mut position = Vec3::ZERO;
        assert!(!follower.advance(&mut position, 1.0));
        assert_eq!(position, Vec3::ZERO);
    }

    #[test]
    fn route_wraps_after_last_waypoint() {
        let first = Vec3::new(1.0, 0.0, 0.0);
        let second = Vec3::new(1.0, 0.0, 1.0);
        let mut follower = PathFollower::new(vec![first, second]);
        let mut position = Vec3::ZERO;

        assert!(follower.advance(&mut position, 5.0));
        assert_eq!(follower.current_waypoint(), Some(second));
        assert!(follower.advance(&mut position, 5.0));
        assert_eq!(follower.current_waypoint(), Some(first));
    }

    #[test]
    fn restart_rewinds_progress() {
        let first = Vec3::new(1.0, 0.0, 0.0);
        let mut follower = PathFollower::new(vec![first, Vec3::new(2.0, 0.0, 0.0)]);
        let mut position = Vec3::ZERO;
        let _ = follower.advance(&mut position, 5.0);
        follower.restart();
        assert_eq!(follower.current_waypoint(), Some(first));
    }
}
