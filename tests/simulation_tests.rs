//! End-to-end behavior of the fluid simulation.

use bevy::prelude::*;
use sph2d::prelude::*;

fn kinetic_energy(sim: &FluidSimulation) -> f32 {
    let mass = sim.params().particle_mass;
    sim.velocities()
        .iter()
        .map(|v| 0.5 * mass * v.length_squared())
        .sum()
}

#[test]
fn test_kernel_vanishes_outside_radius() {
    let h = 35.0;
    for dst in [35.0, 35.5, 100.0, 1e6] {
        assert_eq!(SphKernels::smoothing(h, dst), 0.0);
        assert_eq!(SphKernels::smoothing_derivative(dst, h), 0.0);
    }
    assert!(SphKernels::smoothing(h, 0.0) > SphKernels::smoothing(h, 10.0));
    assert!(SphKernels::smoothing_derivative(10.0, h) < 0.0);
}

#[test]
fn test_lone_particle_density_is_self_contribution() {
    let particles = ParticleSet::from_positions(vec![Vec2::new(300.0, 300.0)]);
    let params = FluidParams::default().with_gravity(0.0);
    let mut sim = FluidSimulation::from_particles(params, particles).unwrap();
    sim.step(0.016).unwrap();

    let expected = sim.params().particle_mass * SphKernels::smoothing(35.0, 0.0);
    assert!((sim.densities()[0] - expected).abs() <= expected * 1e-5);
    assert_eq!(sim.velocities()[0], Vec2::ZERO);
}

#[test]
fn test_every_particle_finds_itself() {
    let params = FluidParams::default().with_particle_count(400);
    let positions = GridLayout::from_params(&params).generate_positions();

    let mut lookup = SpatialLookup::new(params.resolved_table_size());
    lookup.build(&positions, params.smoothing_radius);

    for (i, &p) in positions.iter().enumerate() {
        assert!(lookup.candidates(p).contains(&i), "particle {i} missing from its own query");
    }
}

#[test]
fn test_lookup_rebuild_is_idempotent() {
    let params = FluidParams::default().with_particle_count(256);
    let positions = GridLayout::from_params(&params).generate_positions();

    let mut lookup = SpatialLookup::new(params.resolved_table_size());
    lookup.build(&positions, params.smoothing_radius);
    let entries = lookup.entries().to_vec();
    let starts = lookup.start_indices().to_vec();

    lookup.build(&positions, params.smoothing_radius);
    assert_eq!(lookup.entries(), entries.as_slice());
    assert_eq!(lookup.start_indices(), starts.as_slice());
}

#[test]
fn test_floor_collision_reflects_and_damps() {
    let params = FluidParams::default()
        .with_half_bounds(Vec2::new(300.0, 300.0))
        .with_particle_radius(7.5)
        .with_collision_damping(0.7);
    let boundary = BoxBoundary::from_params(&params);

    let mut position = Vec2::new(200.0, -5.0);
    let mut velocity = Vec2::new(0.0, -10.0);
    boundary.apply_collision(&mut position, &mut velocity);

    assert_eq!(position.y, 0.0);
    assert!((velocity.y - 7.0).abs() < 1e-5);
}

#[test]
fn test_energy_drops_across_bounces() {
    let params = FluidParams::default()
        .with_gravity(0.0)
        .with_pressure(0.005, 0.0)
        .with_collision_damping(0.7);
    let mut particles = ParticleSet::with_capacity(1);
    particles.push(Vec2::new(300.0, 300.0), Vec2::new(900.0, -600.0));
    let mut sim = FluidSimulation::from_particles(params, particles).unwrap();

    let initial = kinetic_energy(&sim);
    let mut energy = initial;
    for _ in 0..600 {
        sim.step(0.016).unwrap();
        let next = kinetic_energy(&sim);
        assert!(next <= energy + 1e-3);
        energy = next;
    }
    assert!(energy < initial * 0.1);
}

#[test]
fn test_dam_settles_inside_box() {
    let params = FluidParams::default()
        .with_particle_count(2000)
        .with_particle_spacing(15.0)
        .with_half_bounds(Vec2::new(300.0, 300.0))
        .with_gravity(10.0)
        .with_collision_damping(0.7);
    let mut sim = FluidSimulation::new(params).unwrap();

    let stats = sim.step(0.016).unwrap();
    assert_eq!(stats.frame, 1);
    for p in sim.positions() {
        assert!(p.is_finite());
        assert!((0.0..=585.0).contains(&p.y), "y = {} escaped the box", p.y);
        assert!((0.0..=585.0).contains(&p.x), "x = {} escaped the box", p.x);
    }
}

#[test]
fn test_many_frames_stay_finite() {
    let mut sim = FluidSimulation::new(FluidParams::default().with_particle_count(300)).unwrap();
    for _ in 0..60 {
        sim.step(0.016).unwrap();
    }
    assert!(sim.positions().iter().all(|p| p.is_finite()));
    assert!(sim.velocities().iter().all(|v| v.is_finite()));
}

#[test]
fn test_degenerate_configuration_is_rejected() {
    assert_eq!(
        FluidSimulation::new(FluidParams::default().with_particle_count(0)).unwrap_err(),
        FluidError::NoParticles
    );
    assert!(matches!(
        FluidSimulation::new(FluidParams::default().with_smoothing_radius(0.0)),
        Err(FluidError::InvalidSmoothingRadius(_))
    ));
    assert!(matches!(
        FluidSimulation::new(FluidParams::default().with_half_bounds(Vec2::new(-1.0, 300.0))),
        Err(FluidError::InvalidBounds(_))
    ));

    let mut sim = FluidSimulation::new(FluidParams::default().with_particle_count(16)).unwrap();
    let bad = sim.params().clone().with_smoothing_radius(-2.0);
    assert!(sim.apply_params(bad).is_err());
    assert!(sim.step(0.016).is_ok());
}
