//! Externally owned traffic entities and the central object.
//!
//! The engine never owns the central object or the entity registry. Both are
//! borrowed for the duration of a single call through
//! [`SwarmContext`](crate::SwarmContext) and addressed by id, so the engine
//! cannot outlive or destroy them.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::math::Point2d;
use crate::road::{Lane, RoadId};
use crate::VehicleId;

/// Pose of the central (ego) object, refreshed by the host before each step.
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CentralObjectState {
    /// World position in m.
    pub pos: Point2d,
    /// Heading in radians.
    pub heading: f64,
    /// Speed in m/s.
    pub speed: f64,
}

/// Current pose of a live swarm vehicle, as reported by the host registry.
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EntityPose {
    /// World position in m.
    pub pos: Point2d,
    /// Road the vehicle is currently on.
    pub road: RoadId,
    /// Lane the vehicle is currently in.
    pub lane: Lane,
    /// Arc-length along the road in m.
    pub s: f64,
}

/// Spawn request handed to the host registry for a newly admitted vehicle.
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpawnPoint {
    /// World position in m.
    pub pos: Point2d,
    /// Road heading at the spawn position, in radians.
    pub heading: f64,
    /// Road to spawn on.
    pub road: RoadId,
    /// Lane to spawn in.
    pub lane: Lane,
    /// Arc-length along the road in m.
    pub s: f64,
    /// Initial speed in m/s.
    pub speed: f64,
    /// Name of the vehicle model drawn from the catalog.
    pub model: &'static str,
}

/// Externally owned registry of live traffic entities.
pub trait EntityCollection {
    /// Registers a new entity under `id`.
    ///
    /// Returning false refuses the spawn; the engine then drops the
    /// candidate without recording it.
    fn add(&mut self, id: VehicleId, spawn: &SpawnPoint) -> bool;

    /// Removes the entity registered under `id`.
    /// Returns false if it was already gone.
    fn remove(&mut self, id: VehicleId) -> bool;

    /// Current pose of the entity under `id`, if it is still alive.
    fn pose(&self, id: VehicleId) -> Option<EntityPose>;
}
