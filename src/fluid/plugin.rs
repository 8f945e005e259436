//! Bevy plugin for fluid simulation.

use bevy::log::{error, warn};
use bevy::prelude::*;

use super::error::FluidError;
use super::params::FluidParams;
use super::simulation::{FluidSimulation, StepStats};

/// Plugin that steps a [`FluidSimulation`] once per app update.
///
/// Edits to the [`FluidParams`] resource are applied before the next step.
/// A host renders by reading [`FluidSimulation::positions`] after `Update`.
///
/// # Example
///
/// ```rust,ignore
/// use bevy::prelude::*;
/// use sph2d::prelude::*;
///
/// fn main() {
///     App::new()
///         .add_plugins(DefaultPlugins)
///         .add_plugins(FluidPlugin::with_params(FluidParams::godot()))
///         .run();
/// }
/// ```
#[derive(Default)]
pub struct FluidPlugin {
    pub params: FluidParams,
}

impl FluidPlugin {
    pub fn with_params(params: FluidParams) -> Self {
        Self { params }
    }
}

impl Plugin for FluidPlugin {
    fn build(&self, app: &mut App) {
        let simulation = match FluidSimulation::new(self.params.clone()) {
            Ok(simulation) => simulation,
            Err(err) => {
                error!("fluid simulation not started: {err}");
                return;
            }
        };

        app.insert_resource(self.params.clone())
            .insert_resource(simulation)
            .init_resource::<FluidState>();

        app.add_systems(Update, (sync_params, run_simulation).chain());
    }
}

/// Run control and the outcome of the latest step.
#[derive(Resource, Clone, Debug, Default)]
pub struct FluidState {
    pub paused: bool,
    /// Run exactly one step while paused.
    pub step_requested: bool,
    pub last_stats: Option<StepStats>,
    /// Error of the latest step, cleared by the next successful one.
    pub last_error: Option<FluidError>,
    /// Why the latest [`FluidParams`] edit was rejected. Cleared once an edit
    /// is accepted.
    pub params_error: Option<FluidError>,
}

impl FluidState {
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    pub fn request_step(&mut self) {
        self.step_requested = true;
    }
}

/// System to push edited parameters into the simulation.
///
/// A rejected edit is reverted in the resource, so it always shows the
/// parameters the simulation actually runs with.
fn sync_params(
    mut params: ResMut<FluidParams>,
    mut simulation: ResMut<FluidSimulation>,
    mut state: ResMut<FluidState>,
) {
    if !params.is_changed() || *params == *simulation.params() {
        return;
    }
    match simulation.apply_params(params.clone()) {
        Ok(()) => state.params_error = None,
        Err(err) => {
            warn!("rejected fluid parameters: {err}");
            *params = simulation.params().clone();
            state.params_error = Some(err);
        }
    }
}

/// System to run the fluid simulation.
fn run_simulation(
    time: Option<Res<Time>>,
    params: Res<FluidParams>,
    mut simulation: ResMut<FluidSimulation>,
    mut state: ResMut<FluidState>,
) {
    if state.paused && !state.step_requested {
        return;
    }
    state.step_requested = false;

    // Clamp frame dt to prevent instability
    let dt = match params.fixed_timestep {
        Some(dt) => dt,
        None => time
            .map(|time| time.delta_secs())
            .unwrap_or(0.0)
            .min(params.max_timestep),
    };

    match simulation.step(dt) {
        Ok(stats) => {
            state.last_stats = Some(stats);
            state.last_error = None;
        }
        Err(err) => {
            error!("fluid step failed: {err}");
            state.last_error = Some(err);
        }
    }
}
