//! Synthetic moving population fed to the grid every tick.
//!
//! Each agent walks in a straight line towards a waypoint and picks a new one
//! on arrival. Waypoints are drawn from the world bounds grown by a margin, so
//! some agents regularly leave the grid and exercise edge-cell clamping.

use proximity_grid::{EntityId, TrackedObject, Vec3, WorldBounds};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Distance at which an agent counts as having reached its waypoint.
const ARRIVAL_DISTANCE: f64 = 5.0;

#[derive(Debug, Clone)]
struct Agent {
    id: EntityId,
    position: Vec3,
    waypoint: Vec3,
}

/// A seeded swarm of wandering agents.
///
/// Movement is deterministic for a given seed; only the entity ids are random.
#[derive(Debug)]
pub struct Swarm {
    agents: Vec<Agent>,
    /// Reused every tick so steady-state snapshots don't allocate
    snapshot: Vec<TrackedObject<EntityId>>,
    spawn_min: Vec3,
    spawn_max: Vec3,
    speed: f64,
    rng: StdRng,
}

impl Swarm {
    /// Spawns `count` agents uniformly inside `bounds` grown by `stray_margin`
    /// on every side.
    pub fn new(count: usize, bounds: &WorldBounds, stray_margin: f64, speed: f64, seed: u64) -> Self {
        let margin = Vec3::splat(stray_margin);
        let mut swarm = Self {
            agents: Vec::with_capacity(count),
            snapshot: Vec::with_capacity(count),
            spawn_min: bounds.origin - margin,
            spawn_max: bounds.max() + margin,
            speed,
            rng: StdRng::seed_from_u64(seed),
        };
        for _ in 0..count {
            let position = swarm.random_point();
            let waypoint = swarm.random_point();
            swarm.agents.push(Agent {
                id: EntityId::new(),
                position,
                waypoint,
            });
        }
        swarm
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Advances every agent by `delta_seconds` of movement.
    pub fn step(&mut self, delta_seconds: f64) {
        let max_travel = self.speed * delta_seconds;
        for index in 0..self.agents.len() {
            let agent = &mut self.agents[index];
            let to_target = agent.waypoint - agent.position;
            let distance = agent.position.distance(agent.waypoint);

            if distance <= max_travel {
                agent.position = agent.waypoint;
            } else if distance > 0.0 {
                let scale = max_travel / distance;
                agent.position = Vec3::new(
                    agent.position.x + to_target.x * scale,
                    agent.position.y + to_target.y * scale,
                    agent.position.z + to_target.z * scale,
                );
            }

            if self.agents[index].position.distance(self.agents[index].waypoint) < ARRIVAL_DISTANCE {
                let waypoint = self.random_point();
                self.agents[index].waypoint = waypoint;
            }
        }
    }

    /// Current positions in agent order, ready to hand to a rebuild.
    pub fn snapshot(&mut self) -> &[TrackedObject<EntityId>] {
        self.snapshot.clear();
        self.snapshot.extend(
            self.agents
                .iter()
                .map(|agent| TrackedObject::new(agent.id, agent.position)),
        );
        &self.snapshot
    }

    /// Position of a randomly chosen agent, used as a query center.
    pub fn probe(&mut self) -> Option<Vec3> {
        if self.agents.is_empty() {
            return None;
        }
        let index = self.rng.gen_range(0..self.agents.len());
        Some(self.agents[index].position)
    }

    fn random_point(&mut self) -> Vec3 {
        let (min, max) = (self.spawn_min, self.spawn_max);
        Vec3::new(
            sample(&mut self.rng, min.x, max.x),
            sample(&mut self.rng, min.y, max.y),
            sample(&mut self.rng, min.z, max.z),
        )
    }
}

fn sample(rng: &mut StdRng, min: f64, max: f64) -> f64 {
    if max > min {
        rng.gen_range(min..max)
    } else {
        min
    }
}
