//! The population controller: admission and eviction of swarm vehicles.

use log::{debug, trace};
use once_cell::sync::Lazy;
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::ellipse::EllipseRegion;
use crate::entity::{CentralObjectState, EntityCollection, SpawnPoint};
use crate::selector::SpawnCandidate;
use crate::road::{Lane, RoadId};
use crate::{PopulationSet, VehicleId};

/// Consecutive ticks a vehicle may stay outside the mid area before eviction.
const OUT_MID_GRACE_TICKS: u32 = 10;

/// Factor applied to the longest catalog vehicle to derive the minimum
/// inter-vehicle separation along a lane.
const SEPARATION_FACTOR: f64 = 2.0;

/// Spawn speeds are scaled by a factor clamped to this range.
const SPEED_FACTOR_RANGE: (f64, f64) = (0.75, 1.25);

/// A background vehicle model available to the spawner.
#[derive(Copy, Clone, Debug)]
struct VehicleModel {
    name: &'static str,
    length: f64,
}

/// Catalog of background vehicle models. The minimum separation is derived
/// from the longest entry so any model fits into an admitted slot.
static MODEL_CATALOG: Lazy<Vec<VehicleModel>> = Lazy::new(|| {
    vec![
        VehicleModel { name: "car_white", length: 5.0 },
        VehicleModel { name: "car_blue", length: 4.5 },
        VehicleModel { name: "van_red", length: 5.8 },
        VehicleModel { name: "bus_blue", length: 12.0 },
    ]
});

/// One live swarm vehicle.
#[derive(Copy, Clone, Debug)]
pub struct SpawnRecord {
    /// Road the vehicle spawned on.
    pub road: RoadId,
    /// Lane the vehicle spawned in.
    pub lane: Lane,
    /// Arc-length at spawn, in m.
    pub s: f64,
    /// Consecutive ticks spent outside the mid area.
    pub out_mid_count: u32,
    /// Simulation time at spawn, in s.
    pub spawn_time: f64,
}

/// Owns the set of currently spawned vehicles and applies the capacity and
/// minimum-distance constraints.
#[derive(Clone, Debug)]
pub struct PopulationController {
    spawned: PopulationSet,
    capacity: usize,
    min_separation: f64,
}

impl PopulationController {
    pub(crate) fn new(capacity: usize) -> Self {
        let longest = MODEL_CATALOG.iter().map(|m| m.length).fold(0.0, f64::max);
        Self {
            spawned: PopulationSet::default(),
            capacity,
            min_separation: SEPARATION_FACTOR * longest,
        }
    }

    /// Number of live swarm vehicles.
    pub fn len(&self) -> usize {
        self.spawned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spawned.is_empty()
    }

    /// The configured maximum number of vehicles.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Minimum arc-length separation between vehicles sharing a lane, in m.
    pub fn min_separation(&self) -> f64 {
        self.min_separation
    }

    /// Returns true if the vehicle is currently part of the swarm.
    pub fn contains(&self, id: VehicleId) -> bool {
        self.spawned.contains_key(id)
    }

    /// Iterates over the live records.
    pub fn iter(&self) -> impl Iterator<Item = (VehicleId, &SpawnRecord)> {
        self.spawned.iter()
    }

    /// Despawn pass: evicts vehicles that left the outer ellipse, overstayed
    /// outside the mid area, or vanished from the host registry.
    ///
    /// Returns the number of records dropped.
    pub(crate) fn despawn(
        &mut self,
        region: &EllipseRegion,
        entities: &mut dyn EntityCollection,
    ) -> usize {
        let mut evicted = vec![];
        for (id, record) in &mut self.spawned {
            let pose = match entities.pose(id) {
                Some(pose) => pose,
                None => {
                    // Removed externally; just forget the record.
                    evicted.push((id, false));
                    continue;
                }
            };
            if region.outer.eval(pose.pos) > 0.0 {
                evicted.push((id, true));
            } else if region.mid.eval(pose.pos) > 0.0 {
                record.out_mid_count += 1;
                if record.out_mid_count > OUT_MID_GRACE_TICKS {
                    evicted.push((id, true));
                }
            } else {
                record.out_mid_count = 0;
            }
        }

        for &(id, remove_entity) in &evicted {
            self.spawned.remove(id);
            if remove_entity {
                entities.remove(id);
            }
            crate::debug::debug_despawn(id);
            debug!("despawned swarm vehicle {:?}", id);
        }
        evicted.len()
    }

    /// Spawn pass: admits candidates in order until the capacity is reached,
    /// subject to the annulus and minimum-separation constraints.
    ///
    /// Returns the number of vehicles spawned.
    pub(crate) fn spawn(
        &mut self,
        candidates: &[SpawnCandidate],
        region: &EllipseRegion,
        central: &CentralObjectState,
        velocity_jitter: f64,
        sim_time: f64,
        entities: &mut dyn EntityCollection,
    ) -> usize {
        let mut rng = rand::thread_rng();
        let factor_distr = Normal::new(1.0, velocity_jitter).expect("invalid velocity jitter");

        let mut spawned = 0;
        for candidate in candidates {
            if self.spawned.len() >= self.capacity {
                break;
            }
            if !region.in_annulus(candidate.pos) {
                continue;
            }
            if !self.ensure_distance(candidate, &*entities) {
                trace!(
                    "candidate on road {:?} lane {} rejected by separation",
                    candidate.road,
                    candidate.lane
                );
                continue;
            }

            let model = MODEL_CATALOG[rng.gen_range(0..MODEL_CATALOG.len())];
            let (lo, hi) = SPEED_FACTOR_RANGE;
            let factor = factor_distr.sample(&mut rng).clamp(lo, hi);
            let spawn = SpawnPoint {
                pos: candidate.pos,
                heading: candidate.heading,
                road: candidate.road,
                lane: candidate.lane,
                s: candidate.s,
                speed: factor * central.speed,
                model: model.name,
            };

            let id = self.spawned.insert(SpawnRecord {
                road: candidate.road,
                lane: candidate.lane,
                s: candidate.s,
                out_mid_count: 0,
                spawn_time: sim_time,
            });
            if entities.add(id, &spawn) {
                spawned += 1;
                crate::debug::debug_spawn(id, &spawn);
                debug!(
                    "spawned {} {:?} on road {:?} lane {} at s {:.1}",
                    spawn.model, id, spawn.road, spawn.lane, spawn.s
                );
            } else {
                // Host refused the spawn; roll the record back.
                self.spawned.remove(id);
            }
        }
        spawned
    }

    /// True when no live vehicle on the candidate's road and lane sits
    /// within the minimum separation along arc-length.
    ///
    /// Distances use the registry's current poses, falling back to the
    /// spawn record for entities the registry cannot resolve this tick.
    fn ensure_distance(&self, candidate: &SpawnCandidate, entities: &dyn EntityCollection) -> bool {
        self.spawned.iter().all(|(id, record)| {
            let (road, lane, s) = match entities.pose(id) {
                Some(pose) => (pose.road, pose.lane, pose.s),
                None => (record.road, record.lane, record.s),
            };
            road != candidate.road
                || lane != candidate.lane
                || (s - candidate.s).abs() >= self.min_separation
        })
    }
}
