#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system that feeds pooled agents into the world.
//!
//! The [`Spawner`] composes an [`EnemyPool`] with a [`SpawnPolicy`]. Score
//! milestones release escalating batches, and every landed attack is
//! answered with a replacement agent.
//!
//! Unlike systems that answer with commands for the world to apply, the
//! spawner owns the pool it draws from: acquiring a slot and activating its
//! agent must happen together, so [`Spawner::handle`] mutates the pool
//! directly and reports what it did as [`Event`]s.

pub mod policy;
pub mod pool;

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use skywatch_core::{AgentId, AgentTuning, AttackPolicy, ConfigError, Event, SpawnError};
use skywatch_system_agent::EnemyAgent;
use tracing::{error, info, warn};

pub use policy::SpawnPolicy;
pub use pool::EnemyPool;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Debug)]
pub struct Config {
    capacity: usize,
    spawn_points: Vec<Vec3>,
    rng_seed: u64,
    tuning: AgentTuning,
}

impl Config {
    /// Creates a new configuration for a pool of `capacity` agents.
    #[must_use]
    pub fn new(
        capacity: usize,
        spawn_points: Vec<Vec3>,
        rng_seed: u64,
        tuning: AgentTuning,
    ) -> Self {
        Self {
            capacity,
            spawn_points,
            rng_seed,
            tuning,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.spawn_points.is_empty() {
            return Err(ConfigError::NoSpawnPoints);
        }
        self.tuning.validate()
    }
}

/// Pool-backed spawner driven by score milestones and attack replenishment.
#[derive(Debug)]
pub struct Spawner {
    pool: EnemyPool,
    policy: SpawnPolicy,
    spawn_points: Vec<Vec3>,
    rng: ChaCha8Rng,
    disabled: Option<ConfigError>,
}

impl Spawner {
    /// Creates a spawner and fills its pool.
    ///
    /// An invalid configuration is logged once and leaves the spawner
    /// disabled: every later spawn request is refused.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let disabled = config.validate().err();
        if let Some(error) = disabled {
            error!(%error, "spawner disabled");
        }
        let tuning = config.tuning;
        let pool = EnemyPool::fill(config.capacity, |id| EnemyAgent::new(id, tuning.clone()));
        Self {
            pool,
            policy: SpawnPolicy::new(),
            spawn_points: config.spawn_points,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            disabled,
        }
    }

    /// Read-only access to the agent pool.
    #[must_use]
    pub const fn pool(&self) -> &EnemyPool {
        &self.pool
    }

    /// Mutable access to the agent pool for ticking agents.
    pub fn pool_mut(&mut self) -> &mut EnemyPool {
        &mut self.pool
    }

    /// Current milestone bookkeeping.
    #[must_use]
    pub const fn policy(&self) -> &SpawnPolicy {
        &self.policy
    }

    /// Configuration error that disabled the spawner, if any.
    #[must_use]
    pub const fn configuration_error(&self) -> Option<ConfigError> {
        self.disabled
    }

    /// Activates one pooled agent at a random spawn point.
    ///
    /// Exhaustion and a disabled spawner are reported through
    /// [`Event::SpawnRejected`] and the returned error; neither is fatal.
    pub fn spawn_one(&mut self, out: &mut Vec<Event>) -> Result<AgentId, SpawnError> {
        if let Some(error) = self.disabled {
            return Err(reject(SpawnError::Disabled(error), out));
        }
        let Some(id) = self.pool.acquire() else {
            let reason = SpawnError::CapacityExceeded {
                capacity: self.pool.capacity(),
            };
            warn!(%reason, "no inactive agents available");
            return Err(reject(reason, out));
        };

        let point = self.select_spawn_point();
        if let Some(agent) = self.pool.agent_mut(id) {
            agent.activate(point, out);
        }
        info!(agent = id.get(), ?point, "agent spawned");
        out.push(Event::AgentSpawned {
            agent: id,
            position: point,
        });
        Ok(id)
    }

    /// Releases the batch earned by `score` if it is a new milestone.
    ///
    /// Returns the number of agents activated.
    pub fn on_score_changed(&mut self, score: u32, out: &mut Vec<Event>) -> u32 {
        let Some(requested) = self.policy.evaluate(score) else {
            return 0;
        };

        let mut spawned = 0;
        for _ in 0..requested {
            if self.spawn_one(out).is_ok() {
                spawned += 1;
            }
        }
        info!(score, requested, spawned, "milestone reached");
        out.push(Event::MilestoneReached {
            score,
            requested,
            spawned,
        });
        spawned
    }

    /// Reacts to agent attacks by recycling the attacker and spawning a replacement.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Event>) {
        for event in events {
            if let Event::AgentAttacked { agent, policy, .. } = event {
                if *policy == AttackPolicy::ReleaseToPool {
                    let _ = self.pool.release(*agent, out);
                }
                let _ = self.spawn_one(out);
            }
        }
    }

    fn select_spawn_point(&mut self) -> Vec3 {
        debug_assert!(
            !self.spawn_points.is_empty(),
            "select_spawn_point requires spawn points"
        );
        let index = self.rng.gen_range(0..self.spawn_points.len());
        self.spawn_points[index]
    }
}

fn reject(reason: SpawnError, out: &mut Vec<Event>) -> SpawnError {
    out.push(Event::SpawnRejected { reason });
    reason
}
