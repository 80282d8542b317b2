#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Skywatch.

mod collectibles;
mod config;
mod player;
mod safe_zone;

use std::time::Duration;

use skywatch_core::{AgentId, Command, Event, OverlapTarget, Vec3, ZoneId, WELCOME_BANNER};
use skywatch_system_agent::TickContext;
use skywatch_system_spawning::{Config as SpawnerConfig, Spawner};
use tracing::{debug, info, warn};

use collectibles::CollectibleRegistry;
pub use config::WorldConfig;
pub use player::Health;
pub use safe_zone::SafeZones;

/// Represents the authoritative Skywatch session state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    spawner: Spawner,
    player: Vec3,
    health: Health,
    safe_zones: SafeZones,
    collectibles: CollectibleRegistry,
    tick_index: u64,
}

impl World {
    /// Creates a world using the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(WorldConfig::default())
    }

    /// Creates a world from the provided configuration.
    #[must_use]
    pub fn with_config(config: WorldConfig) -> Self {
        let spawner = Spawner::new(SpawnerConfig::new(
            config.pool_capacity,
            config.spawn_points,
            config.rng_seed,
            config.agent,
        ));
        let mut collectibles = CollectibleRegistry::new(config.pickup_points);
        if collectibles.activate_next().is_none() {
            warn!("no pickup points configured; score will never change");
        }
        Self {
            banner: WELCOME_BANNER,
            spawner,
            player: config.player_start,
            health: Health::new(config.player_max_health),
            safe_zones: SafeZones::new(),
            collectibles,
            tick_index: 0,
        }
    }

    fn tick_agents(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let health_before = self.health.current();
        let mut agent_events = Vec::new();
        {
            let player = self.player;
            let mut ctx = TickContext::new(&player, &self.safe_zones, &mut self.health);
            for agent in self.spawner.pool_mut().active_agents_mut() {
                agent.tick(dt, &mut ctx, &mut agent_events);
            }
        }
        self.settle_agent_events(agent_events, health_before, out_events);
    }

    fn touch_agent(&mut self, agent: AgentId, out_events: &mut Vec<Event>) {
        if !self.spawner.pool().is_active(agent) {
            debug!(agent = agent.get(), "contact with parked agent ignored");
            return;
        }
        let health_before = self.health.current();
        let mut agent_events = Vec::new();
        {
            let player = self.player;
            let mut ctx = TickContext::new(&player, &self.safe_zones, &mut self.health);
            if let Some(target) = self.spawner.pool_mut().agent_mut(agent) {
                target.on_overlap_enter(OverlapTarget::Player, &mut ctx, &mut agent_events);
            }
        }
        self.settle_agent_events(agent_events, health_before, out_events);
    }

    fn settle_agent_events(
        &mut self,
        agent_events: Vec<Event>,
        health_before: u32,
        out_events: &mut Vec<Event>,
    ) {
        let mut spawner_events = Vec::new();
        self.spawner.handle(&agent_events, &mut spawner_events);
        out_events.extend(agent_events);
        out_events.extend(spawner_events);
        self.publish_health(health_before, out_events);
    }

    fn publish_health(&self, before: u32, out_events: &mut Vec<Event>) {
        let current = self.health.current();
        if current == before {
            return;
        }
        out_events.push(Event::PlayerHealthChanged {
            health: current,
            max: self.health.max(),
        });
        if before > 0 && self.health.is_depleted() {
            info!("player defeated");
            out_events.push(Event::PlayerDefeated);
        }
    }

    fn enter_safe_zone(&mut self, zone: ZoneId, out_events: &mut Vec<Event>) {
        if self.safe_zones.enter(zone) {
            debug!(zone = zone.get(), "player entered safe zone");
            out_events.push(Event::PlayerSafetyChanged { safe: true });
        }

        if !self.collectibles.deposit() {
            return;
        }
        info!(zone = zone.get(), "pickup deposited");
        out_events.push(Event::CollectibleDeposited { zone });
        match self.collectibles.activate_next() {
            Some((collectible, position)) => out_events.push(Event::CollectibleActivated {
                collectible,
                position,
            }),
            None => warn!("no hidden pickups left to activate"),
        }
    }

    fn exit_safe_zone(&mut self, zone: ZoneId, out_events: &mut Vec<Event>) {
        if self.safe_zones.exit(zone) {
            debug!(zone = zone.get(), "player left safe zones");
            out_events.push(Event::PlayerSafetyChanged { safe: false });
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });
            world.tick_agents(dt, out_events);
        }
        Command::Frame { dt } => {
            for agent in world.spawner.pool_mut().active_agents_mut() {
                agent.poll(dt);
            }
        }
        Command::MovePlayer { position } => {
            world.player = position;
        }
        Command::PlayerEnteredSafeZone { zone } => world.enter_safe_zone(zone, out_events),
        Command::PlayerExitedSafeZone { zone } => world.exit_safe_zone(zone, out_events),
        Command::PlayerTouchedAgent { agent } => world.touch_agent(agent, out_events),
        Command::PlayerLeftAgent { agent } => {
            if let Some(target) = world.spawner.pool_mut().agent_mut(agent) {
                target.on_overlap_exit(OverlapTarget::Player);
            }
        }
        Command::PlayerTouchedCollectible { collectible } => {
            match world.collectibles.pick_up(collectible) {
                Ok(score) => {
                    info!(score, "pickup collected");
                    out_events.push(Event::CollectiblePickedUp { collectible });
                    out_events.push(Event::ScoreChanged { score });
                    let _ = world.spawner.on_score_changed(score, out_events);
                }
                Err(reason) => {
                    warn!(collectible = collectible.get(), ?reason, "pickup ignored");
                }
            }
        }
        Command::SpawnAgent => {
            let _ = world.spawner.spawn_one(out_events);
        }
        Command::ReportScore { score } => {
            let _ = world.spawner.on_score_changed(score, out_events);
        }
        Command::HealPlayer { amount } => {
            let before = world.health.current();
            world.health.heal(amount);
            world.publish_health(before, out_events);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use skywatch_core::{
        AgentId, AgentState, AnimationFlags, CollectibleId, ConfigError, SafeZoneStatus, Vec3,
    };

    use super::World;

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Number of simulate ticks applied so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Current player position.
    #[must_use]
    pub fn player_position(world: &World) -> Vec3 {
        world.player
    }

    /// Remaining player health.
    #[must_use]
    pub fn player_health(world: &World) -> u32 {
        world.health.current()
    }

    /// Maximum player health.
    #[must_use]
    pub fn player_max_health(world: &World) -> u32 {
        world.health.max()
    }

    /// Reports whether the player stands in a safe zone.
    #[must_use]
    pub fn is_player_safe(world: &World) -> bool {
        world.safe_zones.is_player_safe()
    }

    /// Running pickup count.
    #[must_use]
    pub fn score(world: &World) -> u32 {
        world.collectibles.score()
    }

    /// Reports whether the player carries a pickup.
    #[must_use]
    pub fn is_carrying(world: &World) -> bool {
        world.collectibles.is_carrying()
    }

    /// Pickups currently available, in slot order.
    #[must_use]
    pub fn active_collectibles(world: &World) -> Vec<(CollectibleId, Vec3)> {
        world.collectibles.active().collect()
    }

    /// Number of pooled agents.
    #[must_use]
    pub fn pool_capacity(world: &World) -> usize {
        world.spawner.pool().capacity()
    }

    /// Number of pool slots currently handed out.
    #[must_use]
    pub fn active_agent_count(world: &World) -> usize {
        world.spawner.pool().active_count()
    }

    /// Batch size the next milestone will release.
    #[must_use]
    pub fn next_spawn_count(world: &World) -> u32 {
        world.spawner.policy().next_spawn_count()
    }

    /// Configuration error that disabled spawning, if any.
    #[must_use]
    pub fn spawner_error(world: &World) -> Option<ConfigError> {
        world.spawner.configuration_error()
    }

    /// Captures a read-only view of every handed-out agent in slot order.
    #[must_use]
    pub fn agent_view(world: &World) -> AgentView {
        let pool = world.spawner.pool();
        let snapshots = pool
            .agents()
            .filter(|agent| pool.is_active(agent.id()))
            .map(|agent| AgentSnapshot {
                id: agent.id(),
                state: agent.state(),
                position: agent.position(),
                animation: agent.animation(),
                damage_dealt_this_cycle: agent.damage_dealt_this_cycle(),
                patrol_enabled: agent.patrol_enabled(),
            })
            .collect();
        AgentView { snapshots }
    }

    /// Captures a snapshot of a single slot, active or not.
    #[must_use]
    pub fn agent(world: &World, id: AgentId) -> Option<AgentSnapshot> {
        world
            .spawner
            .pool()
            .agent(id)
            .map(|agent| AgentSnapshot {
                id: agent.id(),
                state: agent.state(),
                position: agent.position(),
                animation: agent.animation(),
                damage_dealt_this_cycle: agent.damage_dealt_this_cycle(),
                patrol_enabled: agent.patrol_enabled(),
            })
    }

    /// Read-only snapshot describing the handed-out agents.
    #[derive(Clone, Debug)]
    pub struct AgentView {
        snapshots: Vec<AgentSnapshot>,
    }

    impl AgentView {
        /// Iterator over the captured snapshots in slot order.
        pub fn iter(&self) -> impl Iterator<Item = &AgentSnapshot> {
            self.snapshots.iter()
        }

        /// Consumes the view, yielding the underlying snapshots.
        pub fn into_vec(self) -> Vec<AgentSnapshot> {
            self.snapshots
        }
    }

    /// Immutable representation of a single agent used for queries.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct AgentSnapshot {
        /// Pool slot of the agent.
        pub id: AgentId,
        /// Behavioural state.
        pub state: AgentState,
        /// World position.
        pub position: Vec3,
        /// Presentation flags.
        pub animation: AnimationFlags,
        /// Whether the agent attacked during the current cycle.
        pub damage_dealt_this_cycle: bool,
        /// Whether waypoint following is enabled.
        pub patrol_enabled: bool,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skywatch_core::{AgentState, AgentTuning, CollectibleId};

    const STEP: Duration = Duration::from_millis(20);

    fn config() -> WorldConfig {
        WorldConfig {
            pool_capacity: 3,
            spawn_points: vec![Vec3::ZERO],
            player_start: Vec3::new(25.0, 0.0, 0.0),
            agent: AgentTuning {
                follow_distance: 20.0,
                attack_range: 2.0,
                damage: 20,
                ..AgentTuning::default()
            },
            ..WorldConfig::default()
        }
    }

    fn run(world: &mut World, commands: Vec<Command>) -> Vec<Event> {
        let mut events = Vec::new();
        for command in commands {
            apply(world, command, &mut events);
        }
        events
    }

    #[test]
    fn new_world_activates_first_pickup() {
        let world = World::with_config(config());
        let active = query::active_collectibles(&world);
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].0, CollectibleId::new(0));
        assert_eq!(query::score(&world), 0);
        assert_eq!(query::player_health(&world), 100);
    }

    #[test]
    fn tick_reports_time() {
        let mut world = World::with_config(config());
        let events = run(&mut world, vec![Command::Tick { dt: STEP }]);
        assert_eq!(events, vec![Event::TimeAdvanced { dt: STEP }]);
        assert_eq!(query::tick_index(&world), 1);
    }

    #[test]
    fn safe_zone_entry_deposits_pickup() {
        let mut world = World::with_config(config());
        let events = run(
            &mut world,
            vec![
                Command::PlayerTouchedCollectible {
                    collectible: CollectibleId::new(0),
                },
                Command::PlayerEnteredSafeZone {
                    zone: ZoneId::new(1),
                },
            ],
        );

        assert!(events.contains(&Event::ScoreChanged { score: 1 }));
        assert!(events.contains(&Event::PlayerSafetyChanged { safe: true }));
        assert!(events.contains(&Event::CollectibleDeposited {
            zone: ZoneId::new(1)
        }));
        assert!(!query::is_carrying(&world));
        assert_eq!(query::active_collectibles(&world).len(), 1);
    }

    #[test]
    fn entering_zone_empty_handed_only_flips_safety() {
        let mut world = World::with_config(config());
        let events = run(
            &mut world,
            vec![Command::PlayerEnteredSafeZone {
                zone: ZoneId::new(1),
            }],
        );
        assert_eq!(events, vec![Event::PlayerSafetyChanged { safe: true }]);
    }

    #[test]
    fn fifth_pickup_triggers_first_milestone() {
        let mut world = World::with_config(config());
        let mut events = Vec::new();
        for _ in 0..5 {
            let collectible = query::active_collectibles(&world)[0].0;
            apply(
                &mut world,
                Command::PlayerTouchedCollectible { collectible },
                &mut events,
            );
            apply(
                &mut world,
                Command::PlayerEnteredSafeZone {
                    zone: ZoneId::new(1),
                },
                &mut events,
            );
            apply(
                &mut world,
                Command::PlayerExitedSafeZone {
                    zone: ZoneId::new(1),
                },
                &mut events,
            );
        }

        assert_eq!(query::score(&world), 5);
        assert_eq!(query::active_agent_count(&world), 1);
        assert!(events.contains(&Event::MilestoneReached {
            score: 5,
            requested: 1,
            spawned: 1,
        }));
    }

    #[test]
    fn contact_attack_damages_player_and_replenishes() {
        let mut world = World::with_config(config());
        let mut events = run(
            &mut world,
            vec![
                Command::SpawnAgent,
                Command::MovePlayer {
                    position: Vec3::new(0.5, 0.0, 0.0),
                },
            ],
        );
        events.clear();
        apply(
            &mut world,
            Command::PlayerTouchedAgent {
                agent: AgentId::new(0),
            },
            &mut events,
        );

        assert_eq!(query::player_health(&world), 80);
        assert!(events.contains(&Event::AgentReleased {
            agent: AgentId::new(0)
        }));
        assert!(events.contains(&Event::PlayerHealthChanged {
            health: 80,
            max: 100,
        }));
        assert_eq!(query::active_agent_count(&world), 1);
    }

    #[test]
    fn touching_parked_agent_is_ignored() {
        let mut world = World::with_config(config());
        let events = run(
            &mut world,
            vec![Command::PlayerTouchedAgent {
                agent: AgentId::new(2),
            }],
        );
        assert!(events.is_empty());
        assert_eq!(query::player_health(&world), 100);
    }

    #[test]
    fn defeat_is_reported_when_health_runs_out() {
        let mut world = World::with_config(WorldConfig {
            player_max_health: 30,
            ..config()
        });
        let mut events = Vec::new();
        for _ in 0..2 {
            apply(&mut world, Command::SpawnAgent, &mut events);
            apply(
                &mut world,
                Command::MovePlayer {
                    position: Vec3::new(0.5, 0.0, 0.0),
                },
                &mut events,
            );
            apply(
                &mut world,
                Command::PlayerTouchedAgent {
                    agent: AgentId::new(0),
                },
                &mut events,
            );
        }

        assert_eq!(query::player_health(&world), 0);
        let defeats = events
            .iter()
            .filter(|event| matches!(event, Event::PlayerDefeated))
            .count();
        assert_eq!(defeats, 1);
    }

    #[test]
    fn heal_restores_health() {
        let mut world = World::with_config(config());
        let _ = run(
            &mut world,
            vec![
                Command::SpawnAgent,
                Command::MovePlayer {
                    position: Vec3::new(0.5, 0.0, 0.0),
                },
                Command::PlayerTouchedAgent {
                    agent: AgentId::new(0),
                },
                Command::HealPlayer { amount: 5 },
            ],
        );
        assert_eq!(query::player_health(&world), 85);
    }

    #[test]
    fn frame_moves_patrolling_agents() {
        let mut world = World::with_config(WorldConfig {
            agent: AgentTuning {
                patrol_speed: 10.0,
                waypoints: vec![Vec3::new(0.0, 0.0, -40.0)],
                ..config().agent
            },
            ..config()
        });
        let _ = run(
            &mut world,
            vec![
                Command::SpawnAgent,
                Command::Frame {
                    dt: Duration::from_millis(100),
                },
            ],
        );
        let agent = query::agent(&world, AgentId::new(0)).expect("slot exists");
        assert_eq!(agent.state, AgentState::Patrol);
        assert!((agent.position.z + 1.0).abs() < 1e-4);
    }

    #[test]
    fn disabled_spawner_is_reported() {
        let world = World::with_config(WorldConfig {
            pool_capacity: 0,
            ..config()
        });
        assert_eq!(
            query::spawner_error(&world),
            Some(skywatch_core::ConfigError::ZeroCapacity)
        );
    }
}
