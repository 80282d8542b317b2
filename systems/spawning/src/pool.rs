//! Fixed-capacity storage for reusable enemy agents.

use skywatch_core::{AgentId, Event};
use skywatch_system_agent::EnemyAgent;

#[derive(Debug)]
struct Slot {
    agent: EnemyAgent,
    active: bool,
}

/// Pre-allocated agents indexed by slot.
///
/// Slots are constructed once and only ever toggle between active and
/// inactive. The number of active slots never exceeds the capacity.
#[derive(Debug)]
pub struct EnemyPool {
    slots: Vec<Slot>,
}

impl EnemyPool {
    /// Constructs `capacity` inactive agents using `factory`.
    ///
    /// The factory receives the identifier of the slot being filled.
    pub fn fill<F>(capacity: usize, mut factory: F) -> Self
    where
        F: FnMut(AgentId) -> EnemyAgent,
    {
        let slots = (0..capacity)
            .map_while(|index| u32::try_from(index).ok())
            .map(|index| {
                let id = AgentId::new(index);
                let agent = factory(id);
                debug_assert_eq!(agent.id(), id, "factory must honour the slot id");
                Slot {
                    agent,
                    active: false,
                }
            })
            .collect();
        Self { slots }
    }

    /// Number of slots in the pool.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of slots currently handed out.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.active).count()
    }

    /// Reports whether the slot is handed out.
    #[must_use]
    pub fn is_active(&self, id: AgentId) -> bool {
        self.slots.get(id.index()).map_or(false, |slot| slot.active)
    }

    /// Hands out the first inactive slot, or `None` when all slots are busy.
    ///
    /// The slot counts as active from here on; the caller is expected to
    /// activate the agent it refers to.
    pub fn acquire(&mut self) -> Option<AgentId> {
        let slot = self.slots.iter_mut().find(|slot| !slot.active)?;
        slot.active = true;
        Some(slot.agent.id())
    }

    /// Returns a slot to the pool, parking its agent.
    ///
    /// Returns `false` when the slot was not handed out.
    pub fn release(&mut self, id: AgentId, out: &mut Vec<Event>) -> bool {
        let Some(slot) = self.slots.get_mut(id.index()) else {
            return false;
        };
        if !slot.active {
            return false;
        }
        slot.active = false;
        slot.agent.deactivate(out);
        out.push(Event::AgentReleased { agent: id });
        true
    }

    /// Read-only access to the agent stored in a slot.
    #[must_use]
    pub fn agent(&self, id: AgentId) -> Option<&EnemyAgent> {
        self.slots.get(id.index()).map(|slot| &slot.agent)
    }

    /// Mutable access to the agent stored in a slot.
    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut EnemyAgent> {
        self.slots.get_mut(id.index()).map(|slot| &mut slot.agent)
    }

    /// Iterator over every agent in slot order.
    pub fn agents(&self) -> impl Iterator<Item = &EnemyAgent> {
        self.slots.iter().map(|slot| &slot.agent)
    }

    /// Iterator over the agents of handed-out slots in slot order.
    pub fn active_agents_mut(&mut self) -> impl Iterator<Item = &mut EnemyAgent> {
        self.slots
            .iter_mut()
            .filter(|slot| slot.active)
            .map(|slot| &mut slot.agent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use skywatch_core::{AgentState, AgentTuning};

    fn pool(capacity: usize) -> EnemyPool {
        EnemyPool::fill(capacity, |id| EnemyAgent::new(id, AgentTuning::default()))
    }

    #[test]
    fn fill_constructs_inactive_slots() {
        let pool = pool(3);
        assert_eq!(pool.capacity(), 3);
        assert_eq!(pool.active_count(), 0);
        assert!(pool
            .agents()
            .all(|agent| agent.state() == AgentState::Inactive));
    }

    #[test]
    fn acquire_returns_first_free_slot() {
        let mut pool = pool(3);
        assert_eq!(pool.acquire(), Some(AgentId::new(0)));
        assert_eq!(pool.acquire(), Some(AgentId::new(1)));

        let mut events = Vec::new();
        assert!(pool.release(AgentId::new(0), &mut events));
        assert_eq!(pool.acquire(), Some(AgentId::new(0)));
    }

    #[test]
    fn exhausted_pool_yields_none() {
        let mut pool = pool(2);
        assert!(pool.acquire().is_some());
        assert!(pool.acquire().is_some());
        assert_eq!(pool.acquire(), None);
        assert_eq!(pool.active_count(), 2);
    }

    #[test]
    fn releasing_free_slot_is_a_no_op() {
        let mut pool = pool(2);
        let mut events = Vec::new();
        assert!(!pool.release(AgentId::new(1), &mut events));
        assert!(!pool.release(AgentId::new(9), &mut events));
        assert!(events.is_empty());
    }

    #[test]
    fn release_parks_active_agent() {
        let mut pool = pool(1);
        let id = pool.acquire().expect("free slot");
        let mut events = Vec::new();
        pool.agent_mut(id)
            .expect("slot exists")
            .activate(Vec3::new(1.0, 0.0, 0.0), &mut events);
        events.clear();

        assert!(pool.release(id, &mut events));
        assert_eq!(
            events,
            vec![
                Event::AgentStateChanged {
                    agent: id,
                    from: AgentState::Patrol,
                    to: AgentState::Inactive,
                },
                Event::AgentReleased { agent: id },
            ]
        );
        assert!(!pool.is_active(id));
    }

    #[test]
    fn active_iteration_skips_free_slots() {
        let mut pool = pool(4);
        let _ = pool.acquire();
        let _ = pool.acquire();
        let mut events = Vec::new();
        let _ = pool.release(AgentId::new(0), &mut events);

        let ids: Vec<_> = pool.active_agents_mut().map(|agent| agent.id()).collect();
        assert_eq!(ids, vec![AgentId::new(1)]);
    }

    #[test]
    fn zero_capacity_pool_never_hands_out_slots() {
        let mut pool = pool(0);
        assert_eq!(pool.acquire(), None);
    }
}
