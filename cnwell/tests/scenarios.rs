use approx::assert_abs_diff_eq;
use ndarray as nd;
use num_complex::Complex64 as C64;
use cnwell::{
    config::SimConfig,
    error::{ ConfigError, SimError, SingularSystem },
    sim::{ RunState, Simulation, Tick },
    state::GaussianPacket,
};

fn five_node() -> SimConfig {
    SimConfig {
        length: 1.0,
        resolution: 5,
        dim: 1,
        dt: 1e-4,
        steps: 100,
        packet: GaussianPacket { center: vec![0.5], sigma: 0.2, k0: vec![0.0] },
        ..SimConfig::box_1d()
    }
}

fn sum_sq(q: &nd::Array1<C64>) -> f64 { q.iter().map(|qk| qk.norm_sqr()).sum() }

#[test]
fn five_node_profile_single_tick() {
    let profile: nd::Array1<C64>
        = [0.0, 1.0, 0.0, -1.0, 0.0].into_iter().map(C64::from).collect();
    let mut sim = Simulation::with_profile(five_node(), &profile).unwrap();
    let expected = sum_sq(sim.initial_state());
    // Σ |ψ|² dx = 1 with dx = 1/4
    assert_abs_diff_eq!(expected, 4.0, epsilon = 1e-12);

    assert_eq!(sim.tick().unwrap(), Tick::Advanced);
    let psi = sim.wavefunction();
    assert_eq!(psi[0], C64::new(0.0, 0.0));
    assert_eq!(psi[4], C64::new(0.0, 0.0));
    assert_abs_diff_eq!(sum_sq(psi), expected, epsilon = 1e-6);
    assert!(psi.iter().all(|qk| qk.is_finite()));
}

#[test]
fn profile_start_ignores_packet() {
    let profile: nd::Array1<C64>
        = [0.0, 1.0, 2.0, 1.0, 0.0].into_iter().map(C64::from).collect();
    let mut config = five_node();
    config.packet = GaussianPacket { center: vec![0.5, 0.5], sigma: 0.0, k0: vec![] };
    assert!(config.validate().is_err());
    let mut sim = Simulation::with_profile(config.clone(), &profile).unwrap();
    assert_eq!(sim.tick().unwrap(), Tick::Advanced);
    assert!(matches!(
        Simulation::initialize(config),
        Err(SimError::InvalidConfiguration(ConfigError::AxisCount { field: "center", .. })),
    ));
}

#[test]
fn zero_width_packet_is_degenerate() {
    let config = SimConfig {
        packet: GaussianPacket { center: vec![0.5], sigma: 0.0, k0: vec![0.0] },
        ..five_node()
    };
    assert!(matches!(
        Simulation::initialize(config),
        Err(SimError::DegenerateState(_)),
    ));
}

#[test]
fn paused_ticks_change_nothing() {
    let mut sim = Simulation::initialize(SimConfig { resolution: 64, ..SimConfig::box_1d() }).unwrap();
    sim.run(5).unwrap();
    sim.signal_pause();
    let before = sim.snapshot();
    for _ in 0..10 {
        assert_eq!(sim.tick().unwrap(), Tick::Paused);
    }
    assert_eq!(sim.snapshot(), before);
    assert_eq!(sim.step_index(), 5);
}

#[test]
fn reset_mid_run_matches_fresh_simulation() {
    let config = SimConfig { resolution: 64, steps: 200, ..SimConfig::box_1d() };
    let mut sim = Simulation::initialize(config.clone()).unwrap();
    assert_eq!(sim.run(50).unwrap(), 50);
    assert_ne!(sim.wavefunction(), sim.initial_state());
    sim.signal_reset();

    let mut fresh = Simulation::initialize(config).unwrap();
    fresh.signal_reset();
    assert_eq!(sim.wavefunction(), fresh.wavefunction());
    assert_eq!(sim.wavefunction(), fresh.initial_state());
    assert_eq!(sim.step_index(), 0);
    assert_eq!(sim.run_state(), RunState::Paused);
    assert_eq!(sim.snapshot(), fresh.snapshot());

    // both continue identically once resumed
    sim.signal_resume();
    fresh.signal_resume();
    sim.run(10).unwrap();
    fresh.run(10).unwrap();
    assert_eq!(sim.wavefunction(), fresh.wavefunction());
}

#[test]
fn handle_signals_from_another_thread() {
    let mut sim = Simulation::initialize(SimConfig { resolution: 32, ..SimConfig::box_1d() }).unwrap();
    sim.run(3).unwrap();
    let handle = sim.control();
    std::thread::spawn(move || {
        handle.reset();
        handle.pause();
    })
    .join()
    .unwrap();
    assert!(sim.control().is_pending());
    assert_eq!(sim.tick().unwrap(), Tick::Paused);
    assert_eq!(sim.step_index(), 0);
    assert_eq!(sim.wavefunction(), sim.initial_state());
}

#[test]
fn latest_signal_wins_across_threads() {
    let mut sim = Simulation::initialize(SimConfig { resolution: 32, ..SimConfig::box_1d() }).unwrap();
    sim.run(3).unwrap();
    let handle = sim.control();
    std::thread::spawn(move || {
        handle.pause();
        handle.resume();
        handle.reset();
    })
    .join()
    .unwrap();
    assert_eq!(sim.tick().unwrap(), Tick::Paused);
    assert_eq!(sim.step_index(), 0);
    assert_eq!(sim.run_state(), RunState::Paused);
    assert_eq!(sim.wavefunction(), sim.initial_state());

    let handle = sim.control();
    handle.reset();
    handle.resume();
    assert_eq!(sim.tick().unwrap(), Tick::Advanced);
    assert_eq!(sim.step_index(), 1);
}

#[test]
fn completes_at_step_budget() {
    let mut sim = Simulation::initialize(SimConfig { steps: 7, ..five_node() }).unwrap();
    assert_eq!(sim.run(100).unwrap(), 7);
    assert!(sim.is_complete());
    assert_abs_diff_eq!(sim.current_time(), 7e-4, epsilon = 1e-15);
    assert_eq!(sim.tick().unwrap(), Tick::Complete);
    assert_eq!(sim.step_index(), 7);
}

#[test]
fn overflowing_timestep_fails_setup() {
    let config = SimConfig { dt: 1e300, ..five_node() };
    assert!(matches!(
        Simulation::initialize(config),
        Err(SimError::SingularSystem { step: 0, source: SingularSystem::Pivot(0) }),
    ));
}

#[test]
fn invalid_configuration_fails_setup() {
    let config = SimConfig { resolution: 2, ..five_node() };
    assert!(matches!(
        Simulation::initialize(config),
        Err(SimError::InvalidConfiguration(ConfigError::BadResolution(2))),
    ));
    let config = SimConfig { wall_potential: -1.0, ..five_node() };
    assert!(matches!(
        Simulation::initialize(config),
        Err(SimError::InvalidConfiguration(ConfigError::BadWall(_))),
    ));
}

#[test]
fn boundary_only_profile_is_degenerate() {
    let profile: nd::Array1<C64>
        = [1.0, 0.0, 0.0, 0.0, 1.0].into_iter().map(C64::from).collect();
    assert!(matches!(
        Simulation::with_profile(five_node(), &profile),
        Err(SimError::DegenerateState(_)),
    ));
}

#[cfg(not(feature = "lapack"))]
#[test]
fn dense_solver_unavailable() {
    let config = SimConfig { solver: cnwell::propagator::Solver::Dense, ..five_node() };
    assert!(matches!(
        Simulation::initialize(config),
        Err(SimError::InvalidConfiguration(ConfigError::SolverUnavailable)),
    ));
}
