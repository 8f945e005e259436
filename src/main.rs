//! sph2d - headless fluid run
//!
//! Lays out a block of particles, steps the simulation for a number of frames
//! through the Bevy plugin and logs how the fluid settles.

use std::process::ExitCode;

use bevy::log::{error, info, Level, LogPlugin};
use bevy::prelude::*;
use clap::Parser;
use sph2d::prelude::*;

#[derive(Parser, Debug)]
#[command(author, version, about = "2D SPH fluid simulation", long_about = None)]
struct Args {
    /// Number of particles (defaults to the preset's count)
    #[arg(short = 'n', long)]
    particles: Option<u32>,

    /// Number of frames to simulate
    #[arg(short, long, default_value_t = 120)]
    frames: u32,

    /// Timestep per frame in seconds
    #[arg(long, default_value_t = 0.016)]
    dt: f32,

    /// Gravity scalar, applied towards +y
    #[arg(short, long)]
    gravity: Option<f32>,

    /// Fraction of velocity kept after a wall hit
    #[arg(short, long)]
    damping: Option<f32>,

    /// Start from the single-drop desktop preset
    #[arg(long)]
    desktop: bool,

    /// Log every frame
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn params(&self) -> FluidParams {
        let mut params = if self.desktop {
            FluidParams::desktop()
        } else {
            FluidParams::godot()
        };
        if let Some(count) = self.particles {
            params = params.with_particle_count(count);
        }
        if let Some(gravity) = self.gravity {
            params = params.with_gravity(gravity);
        }
        if let Some(damping) = self.damping {
            params = params.with_collision_damping(damping);
        }
        params.with_fixed_timestep(self.dt)
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let mut app = App::new();
    app.add_plugins(LogPlugin {
        level: if args.verbose { Level::TRACE } else { Level::INFO },
        ..default()
    });

    let params = args.params();
    if let Err(err) = params.validate() {
        error!("invalid parameters: {err}");
        return ExitCode::FAILURE;
    }

    info!(
        "simulating {} particles for {} frames (dt = {}s)",
        params.particle_count, args.frames, args.dt
    );
    app.add_plugins(FluidPlugin::with_params(params));

    for _ in 0..args.frames {
        app.update();

        let Some(state) = app.world().get_resource::<FluidState>() else {
            error!("fluid plugin did not start");
            return ExitCode::FAILURE;
        };
        if let Some(err) = &state.params_error {
            error!("parameters rejected: {err}");
            return ExitCode::FAILURE;
        }
        if let Some(err) = &state.last_error {
            error!("simulation stopped: {err}");
            return ExitCode::FAILURE;
        }
    }

    let Some(simulation) = app.world().get_resource::<FluidSimulation>() else {
        return ExitCode::FAILURE;
    };
    let stats = simulation.last_stats();
    info!(
        "frame {} at t = {:.3}s: avg density {:.6}, density error {:.1}%, max speed {:.1}",
        stats.frame,
        simulation.time(),
        stats.average_density,
        stats.average_density_error * 100.0,
        stats.max_speed
    );

    let lowest = simulation
        .positions()
        .iter()
        .map(|p| p.y)
        .fold(f32::NEG_INFINITY, f32::max);
    info!("deepest particle at y = {lowest:.1}");

    ExitCode::SUCCESS
}
