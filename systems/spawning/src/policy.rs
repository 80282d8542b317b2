//! Milestone escalation policy.

use skywatch_core::is_milestone;

/// Decides how many agents a score milestone releases.
///
/// Each milestone is honoured at most once and every honoured milestone
/// raises the next batch size by one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpawnPolicy {
    last_milestone_seen: u32,
    next_spawn_count: u32,
}

impl Default for SpawnPolicy {
    fn default() -> Self {
        Self {
            last_milestone_seen: 0,
            next_spawn_count: 1,
        }
    }
}

impl SpawnPolicy {
    /// Creates a policy that has not acted on any milestone yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Highest milestone already acted on.
    #[must_use]
    pub const fn last_milestone_seen(&self) -> u32 {
        self.last_milestone_seen
    }

    /// Batch size the next milestone will release.
    #[must_use]
    pub const fn next_spawn_count(&self) -> u32 {
        self.next_spawn_count
    }

    /// Returns the batch size for `score`, or `None` if it is not a new milestone.
    pub fn evaluate(&mut self, score: u32) -> Option<u32> {
        if !is_milestone(score) || score <= self.last_milestone_seen {
            return None;
        }
        self.last_milestone_seen = score;
        let count = self.next_spawn_count;
        self.next_spawn_count = self.next_spawn_count.saturating_add(1);
        Some(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn milestones_escalate() {
        let mut policy = SpawnPolicy::new();
        assert_eq!(policy.evaluate(5), Some(1));
        assert_eq!(policy.evaluate(10), Some(2));
        assert_eq!(policy.evaluate(15), Some(3));
        assert_eq!(policy.next_spawn_count(), 4);
    }

    #[test]
    fn repeated_milestone_is_ignored() {
        let mut policy = SpawnPolicy::new();
        assert_eq!(policy.evaluate(10), Some(1));
        assert_eq!(policy.evaluate(10), None);
        assert_eq!(policy.next_spawn_count(), 2);
    }

    #[test]
    fn non_milestones_do_not_advance() {
        let mut policy = SpawnPolicy::new();
        for score in [0, 1, 4, 6, 9] {
            assert_eq!(policy.evaluate(score), None);
        }
        assert_eq!(policy, SpawnPolicy::default());
    }

    #[test]
    fn stale_milestone_is_ignored() {
        let mut policy = SpawnPolicy::new();
        assert_eq!(policy.evaluate(15), Some(1));
        assert_eq!(policy.evaluate(10), None);
        assert_eq!(policy.last_milestone_seen(), 15);
    }
}
