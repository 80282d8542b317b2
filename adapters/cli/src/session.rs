//! Scripted player that walks pickups home while agents hunt it.

use std::{collections::BTreeSet, fmt, time::Duration};

use anyhow::{Context, Result};
use skywatch_core::{AgentId, Command, Event, Vec3, ZoneId};
use skywatch_system_agent::patrol::move_towards;
use skywatch_world::{self as world, query, World, WorldConfig};
use tracing::{debug, info};

const PLAYER_SPEED: f32 = 6.0;
const SAFE_ZONE_RADIUS: f32 = 3.0;
const PICKUP_RADIUS: f32 = 0.75;
const CONTACT_RADIUS: f32 = 1.0;
const HOME: ZoneId = ZoneId::new(0);

/// Parameters controlling a scripted session.
#[derive(Clone, Copy, Debug)]
pub(crate) struct SessionOptions {
    /// Number of fixed simulation ticks to run.
    pub(crate) ticks: u32,
    /// Length of one tick.
    pub(crate) dt: Duration,
}

/// Tally of everything that happened during a session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Summary {
    pub(crate) ticks_run: u32,
    pub(crate) score: u32,
    pub(crate) health: u32,
    pub(crate) max_health: u32,
    pub(crate) active_agents: usize,
    pub(crate) capacity: usize,
    pub(crate) spawned: u32,
    pub(crate) rejected: u32,
    pub(crate) attacks: u32,
    pub(crate) released: u32,
    pub(crate) milestones: u32,
    pub(crate) defeated: bool,
}

impl Summary {
    fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::AgentSpawned { .. } => self.spawned += 1,
                Event::SpawnRejected { .. } => self.rejected += 1,
                Event::AgentAttacked { .. } => self.attacks += 1,
                Event::AgentReleased { .. } => self.released += 1,
                Event::MilestoneReached { .. } => self.milestones += 1,
                Event::PlayerDefeated => self.defeated = true,
                _ => {}
            }
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ticks run:      {}", self.ticks_run)?;
        writeln!(f, "score:          {}", self.score)?;
        writeln!(f, "health:         {}/{}", self.health, self.max_health)?;
        writeln!(f, "active agents:  {}/{}", self.active_agents, self.capacity)?;
        writeln!(f, "spawned:        {}", self.spawned)?;
        writeln!(f, "rejected:       {}", self.rejected)?;
        writeln!(f, "attacks:        {}", self.attacks)?;
        writeln!(f, "released:       {}", self.released)?;
        writeln!(f, "milestones:     {}", self.milestones)?;
        write!(
            f,
            "outcome:        {}",
            if self.defeated { "defeated" } else { "survived" }
        )
    }
}

/// Runs the scripted session to completion or until the player falls.
pub(crate) fn run(config: WorldConfig, options: SessionOptions) -> Result<Summary> {
    let home = config.player_start;
    let mut world = World::with_config(config);
    if let Some(error) = query::spawner_error(&world) {
        return Err(error).context("world configuration rejected");
    }
    println!("{}", query::welcome_banner(&world));

    let mut summary = Summary::default();
    let mut events = Vec::new();
    world::apply(&mut world, Command::PlayerEnteredSafeZone { zone: HOME }, &mut events);
    world::apply(&mut world, Command::SpawnAgent, &mut events);
    summary.record(&events);

    let mut inside = true;
    let mut touching = BTreeSet::new();
    for _ in 0..options.ticks {
        events.clear();
        step_player(&mut world, home, options.dt, &mut inside, &mut touching, &mut events);
        world::apply(&mut world, Command::Frame { dt: options.dt }, &mut events);
        world::apply(&mut world, Command::Tick { dt: options.dt }, &mut events);
        summary.record(&events);
        summary.ticks_run += 1;

        if summary.defeated {
            info!(tick = summary.ticks_run, "player defeated; ending session");
            break;
        }
    }

    summary.score = query::score(&world);
    summary.health = query::player_health(&world);
    summary.max_health = query::player_max_health(&world);
    summary.active_agents = query::active_agent_count(&world);
    summary.capacity = query::pool_capacity(&world);
    Ok(summary)
}

fn step_player(
    world: &mut World,
    home: Vec3,
    dt: Duration,
    inside: &mut bool,
    touching: &mut BTreeSet<AgentId>,
    events: &mut Vec<Event>,
) {
    let position = query::player_position(world);
    let target = if query::is_carrying(world) {
        home
    } else {
        query::active_collectibles(world)
            .first()
            .map_or(home, |&(_, position)| position)
    };
    let next = move_towards(position, target, PLAYER_SPEED * dt.as_secs_f32());
    world::apply(world, Command::MovePlayer { position: next }, events);

    let now_inside = next.distance(home) <= SAFE_ZONE_RADIUS;
    if now_inside != *inside {
        *inside = now_inside;
        let command = if now_inside {
            Command::PlayerEnteredSafeZone { zone: HOME }
        } else {
            Command::PlayerExitedSafeZone { zone: HOME }
        };
        world::apply(world, command, events);
    }

    for (collectible, position) in query::active_collectibles(world) {
        if next.distance(position) <= PICKUP_RADIUS {
            debug!(collectible = collectible.get(), "walking over pickup");
            world::apply(world, Command::PlayerTouchedCollectible { collectible }, events);
        }
    }

    let near: BTreeSet<AgentId> = query::agent_view(world)
        .iter()
        .filter(|agent| agent.position.distance(next) <= CONTACT_RADIUS)
        .map(|agent| agent.id)
        .collect();
    for &agent in near.difference(touching) {
        world::apply(world, Command::PlayerTouchedAgent { agent }, events);
    }
    for &agent in touching.difference(&near) {
        world::apply(world, Command::PlayerLeftAgent { agent }, events);
    }
    *touching = near;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(ticks: u32) -> SessionOptions {
        SessionOptions {
            ticks,
            dt: Duration::from_millis(20),
        }
    }

    #[test]
    fn default_session_collects_pickups() {
        let summary = run(WorldConfig::default(), options(2_000)).expect("session runs");
        assert!(summary.score > 0);
        assert!(summary.spawned >= 1);
        assert!(summary.active_agents <= summary.capacity);
    }

    #[test]
    fn sessions_with_same_seed_match() {
        let first = run(WorldConfig::default(), options(500)).expect("session runs");
        let second = run(WorldConfig::default(), options(500)).expect("session runs");
        assert_eq!(first, second);
    }

    #[test]
    fn invalid_world_is_rejected() {
        let config = WorldConfig {
            spawn_points: Vec::new(),
            ..WorldConfig::default()
        };
        let error = run(config, options(10)).expect_err("config is rejected");
        assert!(error.to_string().contains("world configuration rejected"));
    }

    #[test]
    fn summary_counts_events() {
        let mut summary = Summary::default();
        summary.record(&[
            Event::PlayerDefeated,
            Event::AgentReleased {
                agent: AgentId::new(0),
            },
        ]);
        assert!(summary.defeated);
        assert_eq!(summary.released, 1);
    }
}
