//! Session configuration.

use serde::{Deserialize, Serialize};
use skywatch_core::{AgentTuning, Vec3};

/// Everything needed to build a [`World`](crate::World).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Number of pooled agents.
    pub pool_capacity: usize,
    /// Candidate points agents are activated at.
    pub spawn_points: Vec<Vec3>,
    /// Seed for spawn point selection.
    pub rng_seed: u64,
    /// Maximum player health.
    pub player_max_health: u32,
    /// Player position when the session starts.
    pub player_start: Vec3,
    /// Points pickups rotate through.
    pub pickup_points: Vec<Vec3>,
    /// Tuning applied to every pooled agent.
    pub agent: AgentTuning,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            pool_capacity: 20,
            spawn_points: vec![
                Vec3::new(-30.0, 10.0, -30.0),
                Vec3::new(30.0, 10.0, -30.0),
                Vec3::new(0.0, 10.0, 40.0),
            ],
            rng_seed: 0x42f0_e1eb_d4a5_3c21,
            player_max_health: 100,
            player_start: Vec3::ZERO,
            pickup_points: vec![
                Vec3::new(12.0, 0.0, 0.0),
                Vec3::new(-12.0, 0.0, 6.0),
                Vec3::new(0.0, 0.0, -15.0),
            ],
            agent: AgentTuning::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skywatch_core::AttackPolicy;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: WorldConfig = toml::from_str(
            r#"
            pool_capacity = 3
            spawn_points = [[0.0, 5.0, 0.0]]

            [agent]
            attack_policy = "reset_in_place"
            "#,
        )
        .expect("config parses");

        assert_eq!(config.pool_capacity, 3);
        assert_eq!(config.spawn_points, vec![Vec3::new(0.0, 5.0, 0.0)]);
        assert_eq!(config.agent.attack_policy, AttackPolicy::ResetInPlace);
        assert_eq!(config.player_max_health, 100);
    }
}
