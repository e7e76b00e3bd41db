//! Global scenario actions and the swarm traffic orchestrator.

use std::collections::HashMap;

use log::debug;

use crate::ellipse::EllipseRegion;
use crate::entity::{CentralObjectState, EntityCollection};
use crate::error::{Result, SwarmError};
use crate::index::RoadGeometryIndex;
use crate::population::PopulationController;
use crate::selector;

/// Default standard deviation of the spawn-speed factor.
const DEFAULT_VELOCITY_JITTER: f64 = 0.1;

/// Lifecycle state of an action.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ActionState {
    /// Not yet started.
    Idle,
    /// Started and stepping.
    Active,
}

/// Everything an action may touch during `start` or `step`, borrowed from
/// the host for the duration of one call.
///
/// Holding these as borrows rather than stored references means the engine
/// can never own, outlive or destroy the host's objects.
pub struct SwarmContext<'a> {
    /// Pose of the central object, refreshed by the host each tick.
    pub central: &'a CentralObjectState,
    /// Spatial index over the road network, read-only during a step.
    pub road_index: &'a dyn RoadGeometryIndex,
    /// Externally owned registry of live traffic entities.
    pub entities: &'a mut dyn EntityCollection,
}

/// Telemetry for one completed step.
#[derive(Copy, Clone, Debug, Default)]
pub struct StepReport {
    /// Step length in s.
    pub dt: f64,
    /// Simulation time at the step, in s.
    pub sim_time: f64,
    /// Vehicles spawned this tick.
    pub spawned: usize,
    /// Vehicles despawned this tick.
    pub despawned: usize,
    /// Population size after the step.
    pub population: usize,
}

/// Scenario parameter store written by [`ParameterSetAction`].
#[derive(Clone, Debug, Default)]
pub struct Parameters {
    values: HashMap<String, String>,
}

impl Parameters {
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets a named parameter, replacing any previous value.
    pub fn set(&mut self, name: &str, value: &str) {
        self.values.insert(name.to_owned(), value.to_owned());
    }

    /// Looks up a named parameter.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

/// Writes a named scenario parameter when started.
#[derive(Clone, Debug)]
pub struct ParameterSetAction {
    name: String,
    value: String,
    state: ActionState,
}

impl ParameterSetAction {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            state: ActionState::Idle,
        }
    }

    pub fn start(&mut self, parameters: &mut Parameters) {
        parameters.set(&self.name, &self.value);
        self.state = ActionState::Active;
    }

    pub fn step(&mut self, _dt: f64, _sim_time: f64) {}

    pub fn is_active(&self) -> bool {
        self.state == ActionState::Active
    }
}

/// Keeps a bounded swarm of background vehicles alive in an elliptical
/// annulus around the central object.
///
/// Configure with the setters, then [`start`](Self::start) once and
/// [`step`](Self::step) every simulation tick.
#[derive(Clone, Debug)]
pub struct SwarmTrafficAction {
    inner_radius: f64,
    semi_major_axis: f64,
    semi_minor_axis: f64,
    number_of_vehicles: usize,
    velocity_jitter: f64,
    state: ActionState,
    population: PopulationController,
    region: Option<EllipseRegion>,
    /// Debugging information from the previously simulated step.
    #[cfg(feature = "debug")]
    debug: serde_json::Value,
}

impl SwarmTrafficAction {
    /// Creates an action with no vehicles and unset geometry.
    pub fn new() -> Self {
        Self {
            inner_radius: 0.0,
            semi_major_axis: 0.0,
            semi_minor_axis: 0.0,
            number_of_vehicles: 0,
            velocity_jitter: DEFAULT_VELOCITY_JITTER,
            state: ActionState::Idle,
            population: PopulationController::new(0),
            region: None,
            #[cfg(feature = "debug")]
            debug: serde_json::Value::Null,
        }
    }

    /// Sets the inner radius of the spawn annulus, in m.
    pub fn set_inner_radius(&mut self, radius: f64) {
        self.inner_radius = radius;
    }

    /// Sets the semi-major axis of the outer ellipse, in m.
    pub fn set_semi_major_axes(&mut self, axes: f64) {
        self.semi_major_axis = axes;
    }

    /// Sets the semi-minor axis of the outer ellipse, in m.
    pub fn set_semi_minor_axes(&mut self, axes: f64) {
        self.semi_minor_axis = axes;
    }

    /// Sets the maximum number of swarm vehicles.
    pub fn set_number_of_vehicles(&mut self, number: usize) {
        self.number_of_vehicles = number;
    }

    /// Sets the standard deviation of the spawn-speed factor.
    pub fn set_velocity_jitter(&mut self, stddev: f64) {
        self.velocity_jitter = stddev;
    }

    pub fn is_active(&self) -> bool {
        self.state == ActionState::Active
    }

    /// The population controller, for inspection.
    pub fn population(&self) -> &PopulationController {
        &self.population
    }

    /// The spawn region derived for the most recent start or step.
    pub fn region(&self) -> Option<&EllipseRegion> {
        self.region.as_ref()
    }

    /// Validates the configuration and activates the action.
    ///
    /// Rejects non-positive axes, radii and capacity, and an inner radius
    /// that does not fit strictly inside the outer ellipse. The population
    /// is reset.
    pub fn start(&mut self, ctx: &mut SwarmContext) -> Result<()> {
        if self.semi_major_axis <= 0.0 || self.semi_minor_axis <= 0.0 {
            return Err(SwarmError::Config(format!(
                "ellipse axes must be positive, got {} x {}",
                self.semi_major_axis, self.semi_minor_axis
            )));
        }
        if self.inner_radius <= 0.0 {
            return Err(SwarmError::Config(format!(
                "inner radius must be positive, got {}",
                self.inner_radius
            )));
        }
        if self.inner_radius >= self.semi_major_axis {
            return Err(SwarmError::Config(format!(
                "inner radius {} does not fit inside the semi-major axis {}",
                self.inner_radius, self.semi_major_axis
            )));
        }
        if self.number_of_vehicles == 0 {
            return Err(SwarmError::Config("vehicle count must be positive".to_owned()));
        }
        if self.velocity_jitter < 0.0 {
            return Err(SwarmError::Config(format!(
                "velocity jitter must be non-negative, got {}",
                self.velocity_jitter
            )));
        }

        self.population = PopulationController::new(self.number_of_vehicles);
        self.region = Some(self.derive_region(ctx.central));
        self.state = ActionState::Active;
        debug!(
            "swarm traffic started: capacity {}, outer {} x {}, inner radius {}",
            self.number_of_vehicles, self.semi_major_axis, self.semi_minor_axis, self.inner_radius
        );
        Ok(())
    }

    /// Advances the population by one tick.
    ///
    /// Refreshes the spawn region from the central object pose, then runs
    /// the despawn pass before the spawn pass so a freed slot can be reused
    /// within the same tick. Must be called at most once per simulation
    /// tick, after [`start`](Self::start).
    pub fn step(&mut self, ctx: &mut SwarmContext, dt: f64, sim_time: f64) -> Result<StepReport> {
        if self.state != ActionState::Active {
            return Err(SwarmError::NotStarted);
        }

        let region = self.derive_region(ctx.central);
        self.region = Some(region);
        crate::debug::debug_region(&region);

        let despawned = self.population.despawn(&region, ctx.entities);
        let spawned = if self.population.len() < self.population.capacity() {
            let candidates = selector::select(ctx.road_index, &region.mid);
            self.population.spawn(
                &candidates,
                &region,
                ctx.central,
                self.velocity_jitter,
                sim_time,
                ctx.entities,
            )
        } else {
            0
        };

        #[cfg(feature = "debug")]
        {
            self.debug = crate::debug::take_debug_frame();
        }

        Ok(StepReport {
            dt,
            sim_time,
            spawned,
            despawned,
            population: self.population.len(),
        })
    }

    /// Gets the debugging information for the previously simulated step.
    #[cfg(feature = "debug")]
    pub fn debug(&mut self) -> serde_json::Value {
        self.debug.clone()
    }

    fn derive_region(&self, central: &CentralObjectState) -> EllipseRegion {
        EllipseRegion::from_central(
            central,
            self.inner_radius,
            self.semi_major_axis,
            self.semi_minor_axis,
        )
    }
}

impl Default for SwarmTrafficAction {
    fn default() -> Self {
        Self::new()
    }
}

/// The global action hierarchy as a tagged variant.
///
/// `start` and `step` dispatch on the tag; cloning an action is the copy
/// capability. New action kinds add a variant here.
#[derive(Clone, Debug)]
pub enum GlobalAction {
    ParameterSet(ParameterSetAction),
    SwarmTraffic(SwarmTrafficAction),
}

/// Everything any global action may touch, borrowed per call.
pub struct ActionContext<'a> {
    pub parameters: &'a mut Parameters,
    pub central: &'a CentralObjectState,
    pub road_index: &'a dyn RoadGeometryIndex,
    pub entities: &'a mut dyn EntityCollection,
}

impl<'a> ActionContext<'a> {
    fn swarm(&mut self) -> SwarmContext<'_> {
        SwarmContext {
            central: self.central,
            road_index: self.road_index,
            entities: &mut *self.entities,
        }
    }
}

impl GlobalAction {
    pub fn start(&mut self, ctx: &mut ActionContext) -> Result<()> {
        match self {
            GlobalAction::ParameterSet(action) => {
                action.start(ctx.parameters);
                Ok(())
            }
            GlobalAction::SwarmTraffic(action) => action.start(&mut ctx.swarm()),
        }
    }

    pub fn step(&mut self, ctx: &mut ActionContext, dt: f64, sim_time: f64) -> Result<()> {
        match self {
            GlobalAction::ParameterSet(action) => {
                action.step(dt, sim_time);
                Ok(())
            }
            GlobalAction::SwarmTraffic(action) => {
                action.step(&mut ctx.swarm(), dt, sim_time)?;
                Ok(())
            }
        }
    }

    pub fn is_active(&self) -> bool {
        match self {
            GlobalAction::ParameterSet(action) => action.is_active(),
            GlobalAction::SwarmTraffic(action) => action.is_active(),
        }
    }
}
