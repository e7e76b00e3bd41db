use std::collections::HashMap;
use std::time::Instant;

use swarm_traffic::{
    CentralObjectState, EntityCollection, EntityPose, Interval, RTreeIndex, RoadId,
    RoadSegmentPrimitive, SpawnPoint, SwarmContext, SwarmTrafficAction, VehicleId,
};

/// Minimal stand-in for a host entity registry: spawned vehicles simply
/// stay where they were placed.
#[derive(Default)]
struct Registry {
    poses: HashMap<VehicleId, EntityPose>,
}

impl EntityCollection for Registry {
    fn add(&mut self, id: VehicleId, spawn: &SpawnPoint) -> bool {
        self.poses.insert(
            id,
            EntityPose {
                pos: spawn.pos,
                road: spawn.road,
                lane: spawn.lane,
                s: spawn.s,
            },
        );
        true
    }

    fn remove(&mut self, id: VehicleId) -> bool {
        self.poses.remove(&id).is_some()
    }

    fn pose(&self, id: VehicleId) -> Option<EntityPose> {
        self.poses.get(&id).copied()
    }
}

/// A straight two-lane highway along the x axis, split into segments.
fn highway() -> Vec<RoadSegmentPrimitive> {
    (0..40)
        .map(|i| {
            let s0 = i as f64 * 250.0;
            RoadSegmentPrimitive::line(
                RoadId(1),
                [-1, 1],
                Interval::new(s0, s0 + 250.0),
                swarm_traffic::math::Point2d::new(s0 - 5000.0, 0.0),
                0.0,
            )
        })
        .collect()
}

fn main() {
    let index = RTreeIndex::new(highway());
    let mut registry = Registry::default();

    let mut action = SwarmTrafficAction::new();
    action.set_inner_radius(25.0);
    action.set_semi_major_axes(120.0);
    action.set_semi_minor_axes(60.0);
    action.set_number_of_vehicles(20);

    let dt = 0.05;
    let speed = 25.0;
    let mut central = CentralObjectState {
        pos: swarm_traffic::math::Point2d::new(-4000.0, 0.0),
        heading: 0.0,
        speed,
    };

    {
        let mut ctx = SwarmContext {
            central: &central,
            road_index: &index,
            entities: &mut registry,
        };
        action.start(&mut ctx).expect("invalid swarm configuration");
    }

    println!("Simulating...");
    let frames = 2000;
    let mut spawned = 0;
    let mut despawned = 0;
    let start = Instant::now();
    for frame in 0..frames {
        let sim_time = frame as f64 * dt;
        central.pos.x += speed * dt;

        let mut ctx = SwarmContext {
            central: &central,
            road_index: &index,
            entities: &mut registry,
        };
        let report = action.step(&mut ctx, dt, sim_time).expect("step failed");
        spawned += report.spawned;
        despawned += report.despawned;

        if frame % 400 == 0 {
            println!(
                "t = {:6.1} s  population {:2}  (+{} / -{} total)",
                sim_time, report.population, spawned, despawned
            );
        }
    }
    let frame = start.elapsed() / frames;
    println!(
        "Avg. step: {:?} ({} vehicles alive, {} spawned, {} despawned)",
        frame,
        registry.poses.len(),
        spawned,
        despawned
    );
}
