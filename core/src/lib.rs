#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Skywatch simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Enemy agents never look their collaborators up:
//! they receive the [`PlayerPosition`], [`SafeZoneStatus`] and [`DamageSink`]
//! capabilities explicitly on every tick.

use std::time::Duration;

pub use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Skywatch.";

/// Scores that are positive multiples of this value are spawn milestones.
pub const MILESTONE_INTERVAL: u32 = 5;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the fixed-step simulate phase by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Advances the variable-step poll phase used for patrol motion.
    Frame {
        /// Wall-clock time that elapsed since the previous frame.
        dt: Duration,
    },
    /// Teleports the player to the provided position.
    MovePlayer {
        /// Position reported by the locomotion layer.
        position: Vec3,
    },
    /// Reports that the player's collider entered a safe zone.
    PlayerEnteredSafeZone {
        /// Zone that was entered.
        zone: ZoneId,
    },
    /// Reports that the player's collider left a safe zone.
    PlayerExitedSafeZone {
        /// Zone that was left.
        zone: ZoneId,
    },
    /// Reports that the player's collider started intersecting an agent.
    PlayerTouchedAgent {
        /// Agent whose volume was entered.
        agent: AgentId,
    },
    /// Reports that the player's collider stopped intersecting an agent.
    PlayerLeftAgent {
        /// Agent whose volume was left.
        agent: AgentId,
    },
    /// Reports that the player's collider touched a pickup.
    PlayerTouchedCollectible {
        /// Pickup that was touched.
        collectible: CollectibleId,
    },
    /// Requests a single agent spawn regardless of score.
    SpawnAgent,
    /// Forwards an external score notification to the spawner.
    ReportScore {
        /// Running score total reported by the score source.
        score: u32,
    },
    /// Restores player health by the provided amount.
    HealPlayer {
        /// Health points to restore.
        amount: u32,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulate phase advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a pooled agent was activated at a spawn point.
    AgentSpawned {
        /// Slot of the activated agent.
        agent: AgentId,
        /// Spawn point the agent was placed at.
        position: Vec3,
    },
    /// Reports that a spawn request could not be satisfied.
    SpawnRejected {
        /// Reason the spawn was refused.
        reason: SpawnError,
    },
    /// Announces a state machine transition for an agent.
    AgentStateChanged {
        /// Agent that transitioned.
        agent: AgentId,
        /// State before the transition.
        from: AgentState,
        /// State after the transition.
        to: AgentState,
    },
    /// Fire-and-forget request for the presentation layer to play a sound.
    AudioCue {
        /// Agent emitting the cue.
        agent: AgentId,
        /// Sound that should be played.
        cue: AudioCue,
    },
    /// Confirms that an agent dealt damage to the player.
    AgentAttacked {
        /// Agent that attacked.
        agent: AgentId,
        /// Damage applied to the player.
        damage: u32,
        /// Outcome the agent follows after the attack.
        policy: AttackPolicy,
    },
    /// Confirms that an agent slot returned to the pool.
    AgentReleased {
        /// Slot that became inactive.
        agent: AgentId,
    },
    /// Reports that an activated agent lacks a required collaborator.
    AgentMisconfigured {
        /// Agent that cannot engage.
        agent: AgentId,
        /// Missing collaborator.
        error: ConfigError,
    },
    /// Announces that a new score milestone triggered a spawn batch.
    MilestoneReached {
        /// Score that satisfied the milestone predicate.
        score: u32,
        /// Number of spawns the policy requested.
        requested: u32,
        /// Number of agents actually activated.
        spawned: u32,
    },
    /// Reports the player's health after it changed.
    PlayerHealthChanged {
        /// Current health.
        health: u32,
        /// Maximum health.
        max: u32,
    },
    /// Announces that the player's health reached zero.
    PlayerDefeated,
    /// Reports that the player's safe-zone membership flipped.
    PlayerSafetyChanged {
        /// Whether the player is inside at least one safe zone.
        safe: bool,
    },
    /// Confirms that a pickup became available.
    CollectibleActivated {
        /// Pickup that was activated.
        collectible: CollectibleId,
        /// Position of the pickup.
        position: Vec3,
    },
    /// Confirms that the player picked up a pickup.
    CollectiblePickedUp {
        /// Pickup that was collected.
        collectible: CollectibleId,
    },
    /// Confirms that the player deposited the carried pickup.
    CollectibleDeposited {
        /// Zone that accepted the deposit.
        zone: ZoneId,
    },
    /// Reports that the running score changed.
    ScoreChanged {
        /// New running total.
        score: u32,
    },
}

/// Unique identifier assigned to an agent; equal to its pool slot index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(u32);

impl AgentId {
    /// Creates a new agent identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Slot index backing the identifier.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Identifier of a safe-zone region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ZoneId(u32);

impl ZoneId {
    /// Creates a new zone identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifier of a pickup slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectibleId(u32);

impl CollectibleId {
    /// Creates a new pickup identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Behavioural state of an enemy agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AgentState {
    /// Parked in the pool; never evaluates transitions.
    Inactive,
    /// Following waypoints or idling while watching for the player.
    Patrol,
    /// Flying toward the player.
    Chase,
    /// Delivered an attack. Released agents leave it at once; reset agents
    /// return to Patrol on their next tick.
    Attacking,
}

impl AgentState {
    /// Reports whether the state belongs to an activated agent.
    #[must_use]
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::Inactive)
    }
}

/// What an agent does once its attack landed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackPolicy {
    /// Return to patrol and stay in the world.
    ResetInPlace,
    /// Deactivate and return the slot to the pool.
    #[default]
    ReleaseToPool,
}

/// Sounds the presentation layer may play for an agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AudioCue {
    /// Cry played when an agent starts chasing.
    Screech,
}

/// Colliders an agent volume can report overlaps with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OverlapTarget {
    /// The player character.
    Player,
    /// Any other collider; ignored by agents.
    Other,
}

/// Presentation flags derived from an agent's state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct AnimationFlags {
    /// The flying loop should play.
    pub is_flying: bool,
    /// The idle loop should play.
    pub is_idle: bool,
}

/// Tuning applied to every agent constructed by the pool.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentTuning {
    /// Speed used while following waypoints, in units per second.
    pub patrol_speed: f32,
    /// Speed used while chasing, in units per second.
    pub chase_speed: f32,
    /// Maximum distance at which the player is noticed.
    pub follow_distance: f32,
    /// Distance at which an attack lands.
    pub attack_range: f32,
    /// Damage dealt per attack.
    pub damage: u32,
    /// Interpolation rate of the facing rotation, per second.
    pub turn_rate: f32,
    /// Altitude held while chasing, if any.
    pub flight_height: Option<f32>,
    /// Outcome of a landed attack.
    pub attack_policy: AttackPolicy,
    /// Patrol route shared by every agent; empty means idling.
    pub waypoints: Vec<Vec3>,
}

impl Default for AgentTuning {
    fn default() -> Self {
        Self {
            patrol_speed: 5.0,
            chase_speed: 5.0,
            follow_distance: 20.0,
            attack_range: 2.0,
            damage: 20,
            turn_rate: 5.0,
            flight_height: None,
            attack_policy: AttackPolicy::ReleaseToPool,
            waypoints: Vec::new(),
        }
    }
}

impl AgentTuning {
    /// Checks that every distance and speed is finite and non-negative.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("patrol_speed", self.patrol_speed),
            ("chase_speed", self.chase_speed),
            ("follow_distance", self.follow_distance),
            ("attack_range", self.attack_range),
            ("turn_rate", self.turn_rate),
        ];
        for (field, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidTuning { field });
            }
        }
        if let Some(height) = self.flight_height {
            if !height.is_finite() {
                return Err(ConfigError::InvalidTuning {
                    field: "flight_height",
                });
            }
        }
        Ok(())
    }
}

/// Provides the player's current position.
pub trait PlayerPosition {
    /// Position of the player in world space.
    fn player_position(&self) -> Vec3;
}

impl PlayerPosition for Vec3 {
    fn player_position(&self) -> Vec3 {
        *self
    }
}

/// Reports whether the player currently stands in a safe zone.
pub trait SafeZoneStatus {
    /// `true` while the player is protected from agents.
    fn is_player_safe(&self) -> bool;
}

impl SafeZoneStatus for bool {
    fn is_player_safe(&self) -> bool {
        *self
    }
}

/// Receives damage dealt by agents.
pub trait DamageSink {
    /// Applies the provided amount of damage.
    fn apply_damage(&mut self, amount: u32);
}

/// Missing or invalid collaborators detected at activation or initialization.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash)]
pub enum ConfigError {
    /// No player position provider was supplied.
    #[error("player reference is missing")]
    MissingPlayer,
    /// No safe-zone status was supplied.
    #[error("safe zone status is missing")]
    MissingSafeZone,
    /// No damage sink was supplied.
    #[error("damage sink is missing")]
    MissingDamageSink,
    /// The spawner was configured without spawn points.
    #[error("no spawn points configured")]
    NoSpawnPoints,
    /// The pool was configured with zero capacity.
    #[error("pool capacity must be greater than zero")]
    ZeroCapacity,
    /// A tuning value is negative or not finite.
    #[error("tuning field `{field}` must be finite and non-negative")]
    InvalidTuning {
        /// Name of the offending field.
        field: &'static str,
    },
}

/// Reasons a spawn request may be refused.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash)]
pub enum SpawnError {
    /// Every pool slot is active.
    #[error("all {capacity} pool slots are active")]
    CapacityExceeded {
        /// Configured pool capacity.
        capacity: usize,
    },
    /// The spawner refused to start because of a configuration error.
    #[error("spawner disabled: {0}")]
    Disabled(ConfigError),
}

/// Reports whether the score satisfies the milestone predicate.
#[must_use]
pub const fn is_milestone(score: u32) -> bool {
    score > 0 && score % MILESTONE_INTERVAL == 0
}
