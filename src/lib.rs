pub use action::{
    ActionContext, ActionState, GlobalAction, ParameterSetAction, Parameters, StepReport,
    SwarmContext, SwarmTrafficAction,
};
pub use cgmath;
pub use ellipse::{Ellipse, EllipseRegion};
pub use entity::{CentralObjectState, EntityCollection, EntityPose, SpawnPoint};
pub use error::{Result, SwarmError};
pub use index::{RTreeIndex, RoadGeometryIndex};
pub use population::{PopulationController, SpawnRecord};
pub use road::{Lane, RoadId, RoadSegmentPrimitive, SegmentGeometry};
pub use selector::SpawnCandidate;
use slotmap::{new_key_type, SlotMap};
pub use slotmap::{Key, KeyData};
pub use util::{Aabb, Interval};

mod action;
mod debug;
mod ellipse;
mod entity;
mod error;
mod index;
pub mod math;
mod population;
mod road;
mod selector;
pub mod solver;
mod util;

new_key_type! {
    /// Unique ID of a spawned swarm vehicle.
    ///
    /// Keys are versioned, so the id of a despawned vehicle is never
    /// handed out again.
    pub struct VehicleId;
}

type PopulationSet = SlotMap<VehicleId, SpawnRecord>;
