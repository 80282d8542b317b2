#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Enemy agent state machine.
//!
//! Each [`EnemyAgent`] lives in a pool slot for the whole session. While
//! active it patrols, notices an unprotected player within its follow
//! distance, chases, and lands exactly one attack per episode through the
//! injected [`DamageSink`]. Every transition is reported as an [`Event`] so the
//! spawner and presentation layers can react without touching agent state.

pub mod patrol;

use std::time::Duration;

use glam::{Mat3, Quat, Vec3};
use skywatch_core::{
    AgentId, AgentState, AgentTuning, AnimationFlags, AttackPolicy, AudioCue, ConfigError,
    DamageSink, Event, OverlapTarget, PlayerPosition, SafeZoneStatus,
};
use tracing::{debug, error, trace, warn};

pub use patrol::PathFollower;

/// Collaborators an agent needs to evaluate a tick.
///
/// Any missing collaborator is a configuration error: the agent reports it
/// once per activation and keeps patrolling.
pub struct TickContext<'a> {
    /// Source of the player's position.
    pub player: Option<&'a dyn PlayerPosition>,
    /// Source of the player's safe-zone membership.
    pub safe_zone: Option<&'a dyn SafeZoneStatus>,
    /// Receiver of attack damage.
    pub damage_sink: Option<&'a mut dyn DamageSink>,
}

impl<'a> TickContext<'a> {
    /// Creates a context with every collaborator bound.
    #[must_use]
    pub fn new(
        player: &'a dyn PlayerPosition,
        safe_zone: &'a dyn SafeZoneStatus,
        damage_sink: &'a mut dyn DamageSink,
    ) -> Self {
        Self {
            player: Some(player),
            safe_zone: Some(safe_zone),
            damage_sink: Some(damage_sink),
        }
    }

    /// Creates a context with no collaborators bound.
    #[must_use]
    pub fn detached() -> Self {
        Self {
            player: None,
            safe_zone: None,
            damage_sink: None,
        }
    }

    fn missing(&self) -> Option<ConfigError> {
        if self.player.is_none() {
            Some(ConfigError::MissingPlayer)
        } else if self.safe_zone.is_none() {
            Some(ConfigError::MissingSafeZone)
        } else if self.damage_sink.is_none() {
            Some(ConfigError::MissingDamageSink)
        } else {
            None
        }
    }
}

impl std::fmt::Debug for TickContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TickContext")
            .field("player", &self.player.map(|player| player.player_position()))
            .field("safe_zone", &self.safe_zone.map(|zone| zone.is_player_safe()))
            .field("damage_sink", &self.damage_sink.is_some())
            .finish()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Links {
    Unchecked,
    Ready,
    Broken(ConfigError),
}

/// Pooled enemy that patrols, chases, and attacks the player.
#[derive(Clone, Debug)]
pub struct EnemyAgent {
    id: AgentId,
    tuning: AgentTuning,
    state: AgentState,
    position: Vec3,
    orientation: Quat,
    damage_dealt_this_cycle: bool,
    cue_played: bool,
    patrol: PathFollower,
    links: Links,
    idle_reported: bool,
}

impl EnemyAgent {
    /// Creates an inactive agent bound to the provided pool slot.
    #[must_use]
    pub fn new(id: AgentId, tuning: AgentTuning) -> Self {
        let patrol = PathFollower::new(tuning.waypoints.clone());
        Self {
            id,
            tuning,
            state: AgentState::Inactive,
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            damage_dealt_this_cycle: false,
            cue_played: false,
            patrol,
            links: Links::Unchecked,
            idle_reported: false,
        }
    }

    /// Pool slot backing the agent.
    #[must_use]
    pub const fn id(&self) -> AgentId {
        self.id
    }

    /// Current behavioural state.
    #[must_use]
    pub const fn state(&self) -> AgentState {
        self.state
    }

    /// Current world position.
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.position
    }

    /// Current facing rotation.
    #[must_use]
    pub const fn orientation(&self) -> Quat {
        self.orientation
    }

    /// Tuning the agent was constructed with.
    #[must_use]
    pub const fn tuning(&self) -> &AgentTuning {
        &self.tuning
    }

    /// Reports whether the agent already attacked during the current cycle.
    #[must_use]
    pub const fn damage_dealt_this_cycle(&self) -> bool {
        self.damage_dealt_this_cycle
    }

    /// Reports whether waypoint following is enabled.
    #[must_use]
    pub const fn patrol_enabled(&self) -> bool {
        self.patrol.is_enabled()
    }

    /// Read-only access to the patrol route.
    #[must_use]
    pub const fn patrol(&self) -> &PathFollower {
        &self.patrol
    }

    /// Configuration error detected for the current activation, if any.
    #[must_use]
    pub const fn configuration_error(&self) -> Option<ConfigError> {
        match self.links {
            Links::Broken(error) => Some(error),
            Links::Unchecked | Links::Ready => None,
        }
    }

    /// Presentation flags derived from the current state.
    #[must_use]
    pub fn animation(&self) -> AnimationFlags {
        match self.state {
            AgentState::Inactive => AnimationFlags::default(),
            AgentState::Patrol => {
                let idle = !self.patrol.is_enabled() || self.patrol.is_empty();
                AnimationFlags {
                    is_flying: !idle,
                    is_idle: idle,
                }
            }
            AgentState::Chase | AgentState::Attacking => AnimationFlags {
                is_flying: true,
                is_idle: false,
            },
        }
    }

    /// Places the agent at `point` and starts patrolling.
    ///
    /// Collaborators are not known yet, so a missing one is detected and
    /// reported on the first [`tick`](Self::tick) or
    /// [`on_overlap_enter`](Self::on_overlap_enter) after activation.
    pub fn activate(&mut self, point: Vec3, out: &mut Vec<Event>) {
        self.position = point;
        self.orientation = Quat::IDENTITY;
        self.damage_dealt_this_cycle = false;
        self.cue_played = false;
        self.links = Links::Unchecked;
        self.idle_reported = false;
        self.patrol.set_enabled(true);
        self.patrol.restart();
        self.transition(AgentState::Patrol, out);
    }

    /// Parks the agent, clearing per-cycle flags and restoring patrol capability.
    pub fn deactivate(&mut self, out: &mut Vec<Event>) {
        self.damage_dealt_this_cycle = false;
        self.cue_played = false;
        self.patrol.set_enabled(true);
        self.transition(AgentState::Inactive, out);
    }

    /// Evaluates the state machine for one fixed simulation step.
    ///
    /// An agent left in `Attacking` by a reset-in-place attack spends this
    /// step returning to Patrol.
    pub fn tick(&mut self, dt: Duration, ctx: &mut TickContext<'_>, out: &mut Vec<Event>) {
        if !self.state.is_active() || !self.links_ready(ctx, out) {
            return;
        }
        let (Some(player), Some(safe_zone)) = (ctx.player, ctx.safe_zone) else {
            return;
        };
        let target = player.player_position();
        let distance = self.position.distance(target);
        let engaged = !safe_zone.is_player_safe() && distance <= self.tuning.follow_distance;

        match self.state {
            AgentState::Attacking => {
                self.reset_to_patrol(out);
                return;
            }
            AgentState::Patrol if engaged => self.begin_chase(out),
            AgentState::Chase if !engaged => self.reset_to_patrol(out),
            AgentState::Patrol | AgentState::Chase | AgentState::Inactive => {}
        }

        if self.state != AgentState::Chase {
            return;
        }

        if distance <= self.tuning.attack_range && !self.damage_dealt_this_cycle {
            self.attack(ctx, out);
            return;
        }

        self.pursue(target, dt.as_secs_f32());
    }

    /// Advances waypoint following for one variable-rate frame.
    pub fn poll(&mut self, dt: Duration) {
        if self.state != AgentState::Patrol {
            return;
        }
        let step = self.tuning.patrol_speed * dt.as_secs_f32();
        if !self.patrol.advance(&mut self.position, step)
            && self.patrol.is_empty()
            && !self.idle_reported
        {
            self.idle_reported = true;
            warn!(agent = self.id.get(), "no waypoints assigned; idling in place");
        }
    }

    /// Handles a collider entering the agent's volume.
    ///
    /// The player touching an active, engaged-capable agent lands the same
    /// exactly-once attack as the range check.
    pub fn on_overlap_enter(
        &mut self,
        other: OverlapTarget,
        ctx: &mut TickContext<'_>,
        out: &mut Vec<Event>,
    ) {
        if other != OverlapTarget::Player || !self.state.is_active() {
            return;
        }
        if !self.links_ready(ctx, out) {
            return;
        }
        if ctx.safe_zone.map_or(true, |zone| zone.is_player_safe()) {
            trace!(agent = self.id.get(), "contact ignored while player is safe");
            return;
        }
        if self.damage_dealt_this_cycle || self.state == AgentState::Attacking {
            trace!(agent = self.id.get(), "contact ignored; damage already dealt");
            return;
        }
        self.attack(ctx, out);
    }

    /// Handles a collider leaving the agent's volume.
    pub fn on_overlap_exit(&mut self, other: OverlapTarget) {
        if other == OverlapTarget::Player && self.state.is_active() {
            trace!(agent = self.id.get(), "player left agent volume");
        }
    }

    /// Checks the collaborators; the first gap in an activation is reported
    /// and drops the agent back to Patrol for the rest of it.
    fn links_ready(&mut self, ctx: &TickContext<'_>, out: &mut Vec<Event>) -> bool {
        if let Links::Broken(_) = self.links {
            return false;
        }
        match ctx.missing() {
            None => {
                self.links = Links::Ready;
                true
            }
            Some(error) => {
                error!(agent = self.id.get(), %error, "agent cannot engage");
                self.links = Links::Broken(error);
                out.push(Event::AgentMisconfigured {
                    agent: self.id,
                    error,
                });
                self.reset_to_patrol(out);
                false
            }
        }
    }

    fn begin_chase(&mut self, out: &mut Vec<Event>) {
        self.patrol.set_enabled(false);
        self.transition(AgentState::Chase, out);
        if !self.cue_played {
            self.cue_played = true;
            out.push(Event::AudioCue {
                agent: self.id,
                cue: AudioCue::Screech,
            });
        }
    }

    /// Ends the current episode: waypoints resume and the next engagement may
    /// attack again.
    fn reset_to_patrol(&mut self, out: &mut Vec<Event>) {
        self.patrol.set_enabled(true);
        self.cue_played = false;
        self.damage_dealt_this_cycle = false;
        self.transition(AgentState::Patrol, out);
    }

    fn pursue(&mut self, target: Vec3, dt: f32) {
        let offset = target - self.position;
        let Some(direction) = offset.try_normalize() else {
            return;
        };
        let step = (self.tuning.chase_speed * dt).min(offset.length());
        self.position += direction * step;
        if let Some(height) = self.tuning.flight_height {
            self.position.y = height;
        }
        if let Some(facing) = look_rotation(direction) {
            let blend = (self.tuning.turn_rate * dt).clamp(0.0, 1.0);
            self.orientation = self.orientation.slerp(facing, blend).normalize();
        }
    }

    fn attack(&mut self, ctx: &mut TickContext<'_>, out: &mut Vec<Event>) {
        let Some(sink) = ctx.damage_sink.as_deref_mut() else {
            return;
        };
        self.damage_dealt_this_cycle = true;
        self.transition(AgentState::Attacking, out);
        sink.apply_damage(self.tuning.damage);
        out.push(Event::AgentAttacked {
            agent: self.id,
            damage: self.tuning.damage,
            policy: self.tuning.attack_policy,
        });

        // Reset agents hold Attacking until their next tick so a contact in
        // the same window cannot land a second hit.
        if self.tuning.attack_policy == AttackPolicy::ReleaseToPool {
            self.cue_played = false;
            self.patrol.set_enabled(true);
            self.transition(AgentState::Inactive, out);
        }
    }

    fn transition(&mut self, to: AgentState, out: &mut Vec<Event>) {
        let from = self.state;
        if from == to {
            return;
        }
        self.state = to;
        debug!(agent = self.id.get(), ?from, ?to, "agent transition");
        out.push(Event::AgentStateChanged {
            agent: self.id,
            from,
            to,
        });
    }
}

/// Rotation whose forward (+Z) axis points along `direction` with +Y kept up.
fn look_rotation(direction: Vec3) -> Option<Quat> {
    let forward = direction.try_normalize()?;
    let Some(right) = Vec3::Y.cross(forward).try_normalize() else {
        return Some(Quat::from_rotation_arc(Vec3::Z, forward));
    };
    let up = forward.cross(right);
    Some(Quat::from_mat3(&Mat3::from_cols(right, up, forward)).normalize())
}
