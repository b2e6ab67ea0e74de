//! Tick-driven simulation controller.
//!
//! A [`Simulation`] owns the wavefunction and everything needed to advance it,
//! and moves between two run states:
//! ```text
//!            pause              reset (from anywhere)
//!   Running ───────▶ Paused ◀──────────────────────
//!           ◀───────
//!            resume
//! ```
//! Each call to [`Simulation::tick`] performs at most one full time step. Once
//! the configured step budget is reached, ticks report [`Tick::Complete`]
//! without touching the state until the simulation is reset.
//!
//! Signals can be applied directly through `&mut self` methods, or from other
//! threads through a [`ControlHandle`]. Signals sent through a handle are
//! applied at the start of the next tick in the order they were sent, so they
//! never interleave with a step in progress.

use std::sync::{
    Arc,
    atomic::{ AtomicU8, Ordering },
};
use ndarray as nd;
use num_complex::Complex64 as C64;
use tracing::{ debug, error, info };
use crate::{
    Arr1,
    boundary::BoundaryEnforcer,
    config::{ BoundaryMode, SimConfig },
    error::{ SimError, SingularSystem },
    grid::Grid,
    hamiltonian::Hamiltonian,
    potential::PotentialField,
    propagator::CrankNicolson,
    state,
    utils::{ density, wf_norm },
};

/// Whether ticks currently advance the simulation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RunState {
    Running,
    Paused,
}

impl RunState {
    /// Return `true` if `self` is `Running`.
    pub fn is_running(&self) -> bool { matches!(self, Self::Running) }

    /// Return `true` if `self` is `Paused`.
    pub fn is_paused(&self) -> bool { matches!(self, Self::Paused) }
}

/// Outcome of a single [`Simulation::tick`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Tick {
    /// One time step was taken.
    Advanced,
    /// Nothing happened because the simulation is paused.
    Paused,
    /// Nothing happened because the step budget has been used up.
    Complete,
}

/// Owned copy of the simulation state at some step.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub step: usize,
    pub time: f64,
    pub state: RunState,
    pub psi: nd::Array1<C64>,
}

// pending-signal codes; a reset is remembered until drained, and only a
// resume sent after it can lift the pause it implies
const NONE: u8 = 0;
const PAUSE: u8 = 1;
const RESUME: u8 = 2;
const RESET: u8 = 3;
const RESET_RESUME: u8 = 4;

#[derive(Debug, Default)]
struct Signals(AtomicU8);

impl Signals {
    fn send(&self, f: impl Fn(u8) -> u8) {
        // the closure never returns `None`, so this cannot fail
        let _ = self.0.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |s| Some(f(s)));
    }
}

/// Cloneable, thread-safe handle for signaling a [`Simulation`].
///
/// Signals are recorded and applied by the simulation at the start of its next
/// tick (or on [`Simulation::poll_signals`]), with the same result as if they
/// had been applied in the order they were sent.
#[derive(Clone, Debug, Default)]
pub struct ControlHandle(Arc<Signals>);

impl ControlHandle {
    /// Request a pause.
    pub fn pause(&self) {
        self.0.send(|s| if matches!(s, RESET | RESET_RESUME) { RESET } else { PAUSE });
    }

    /// Request a resume.
    pub fn resume(&self) {
        self.0.send(|s| if matches!(s, RESET | RESET_RESUME) { RESET_RESUME } else { RESUME });
    }

    /// Request a reset to the initial state, leaving the simulation paused.
    pub fn reset(&self) { self.0.send(|_| RESET); }

    /// Return `true` if any signal is waiting to be applied.
    pub fn is_pending(&self) -> bool { self.0.0.load(Ordering::SeqCst) != NONE }

    fn take(&self) -> u8 { self.0.0.swap(NONE, Ordering::SeqCst) }
}

// propagates either the whole grid or only its interior nodes
#[derive(Clone, Debug)]
enum Stepper {
    Full(CrankNicolson),
    Interior { cn: CrankNicolson, nodes: Vec<usize> },
}

impl Stepper {
    fn new(config: &SimConfig, grid: &Grid, potential: &PotentialField)
        -> Result<Self, SimError>
    {
        match config.boundary {
            BoundaryMode::Penalty => {
                let H = Hamiltonian::assemble(grid, potential)?;
                let cn = CrankNicolson::new(&H, config.dt, config.solver)?;
                Ok(Self::Full(cn))
            },
            BoundaryMode::Eliminated => {
                let H = Hamiltonian::assemble_interior(grid, potential)?;
                let cn = CrankNicolson::new(&H, config.dt, config.solver)?;
                Ok(Self::Interior { cn, nodes: grid.interior_nodes() })
            },
        }
    }

    fn step<S>(&self, q: &Arr1<S>) -> Result<nd::Array1<C64>, SingularSystem>
    where S: nd::Data<Elem = C64>
    {
        match self {
            Self::Full(cn) => cn.step(q),
            Self::Interior { cn, nodes } => {
                let inner: nd::Array1<C64> = nodes.iter().map(|&k| q[k]).collect();
                let inner = cn.step(&inner)?;
                let mut q_next: nd::Array1<C64> = nd::Array1::zeros(q.len());
                nodes.iter().zip(inner.iter())
                    .for_each(|(&k, &qk)| { q_next[k] = qk; });
                Ok(q_next)
            },
        }
    }
}

/// Crank-Nicolson simulation of a wave packet in an infinite well.
#[derive(Debug)]
pub struct Simulation {
    config: SimConfig,
    grid: Grid,
    potential: PotentialField,
    boundary: BoundaryEnforcer,
    stepper: Stepper,
    psi0: nd::Array1<C64>,
    psi: nd::Array1<C64>,
    step: usize,
    state: RunState,
    halted: Option<usize>,
    signals: ControlHandle,
}

impl Simulation {
    /// Set up a simulation starting from the configured Gaussian packet.
    ///
    /// The new simulation is [`RunState::Running`] at step 0.
    pub fn initialize(config: SimConfig) -> Result<Self, SimError> {
        Self::build(config, |grid, packet| packet.build(grid))
    }

    /// Set up a simulation starting from an arbitrary sampled profile instead
    /// of the configured packet.
    ///
    /// `profile` is zeroed on the boundary and normalized. `config.packet` is
    /// ignored.
    pub fn with_profile<S>(config: SimConfig, profile: &Arr1<S>)
        -> Result<Self, SimError>
    where S: nd::Data<Elem = C64>
    {
        Self::build(config, |grid, _| state::from_profile(grid, profile))
    }

    fn build<F>(config: SimConfig, init: F) -> Result<Self, SimError>
    where F: FnOnce(&Grid, &state::GaussianPacket) -> Result<nd::Array1<C64>, SimError>
    {
        config.validate_setup()?;
        let grid = Grid::new(config.length, config.resolution, config.dim)?;
        let potential = PotentialField::infinite_well(&grid, config.wall_potential)?;
        let boundary = BoundaryEnforcer::new(&grid);

        let mut psi0 = init(&grid, &config.packet)?;
        boundary.apply(&mut psi0);
        let psi0 = state::normalize(&grid, psi0)?;

        let stepper = Stepper::new(&config, &grid, &potential)?;
        info!(
            dim = grid.dim(),
            resolution = grid.n(),
            nodes = grid.total(),
            dt = config.dt,
            steps = config.steps,
            boundary = ?config.boundary,
            solver = ?config.solver,
            "initialized simulation"
        );
        Ok(Self {
            psi: psi0.clone(),
            psi0,
            config,
            grid,
            potential,
            boundary,
            stepper,
            step: 0,
            state: RunState::Running,
            halted: None,
            signals: ControlHandle::default(),
        })
    }

    /// Apply pending signals, then advance by one step if running.
    ///
    /// A [`SimError::SingularSystem`] halts the simulation: every later call
    /// returns [`SimError::Halted`] without changing anything, and reset does
    /// not clear it.
    pub fn tick(&mut self) -> Result<Tick, SimError> {
        if let Some(step) = self.halted {
            return Err(SimError::Halted { step });
        }
        self.poll_signals();
        if self.is_complete() { return Ok(Tick::Complete); }
        if self.state.is_paused() { return Ok(Tick::Paused); }

        match self.stepper.step(&self.psi) {
            Ok(psi) => {
                self.psi = psi;
                self.boundary.apply(&mut self.psi);
                self.step += 1;
                if self.is_complete() {
                    info!(
                        step = self.step,
                        time = self.current_time(),
                        norm = self.norm(),
                        "simulation complete"
                    );
                }
                Ok(Tick::Advanced)
            },
            Err(source) => {
                let step = self.step + 1;
                self.halted = Some(step);
                error!(step, %source, "simulation halted");
                Err(SimError::SingularSystem { step, source })
            },
        }
    }

    /// Apply any signals sent through a [`ControlHandle`].
    pub fn poll_signals(&mut self) {
        match self.signals.take() {
            PAUSE => self.signal_pause(),
            RESUME => self.signal_resume(),
            RESET => self.signal_reset(),
            RESET_RESUME => {
                self.signal_reset();
                self.signal_resume();
            },
            _ => { },
        }
    }

    /// Stop advancing on subsequent ticks.
    pub fn signal_pause(&mut self) {
        if self.state.is_running() { debug!(step = self.step, "paused"); }
        self.state = RunState::Paused;
    }

    /// Resume advancing on subsequent ticks.
    pub fn signal_resume(&mut self) {
        if self.state.is_paused() { debug!(step = self.step, "resumed"); }
        self.state = RunState::Running;
    }

    /// Restore the initial state at step 0, paused.
    pub fn signal_reset(&mut self) {
        self.psi.assign(&self.psi0);
        self.step = 0;
        self.state = RunState::Paused;
        info!("simulation reset");
    }

    /// Probability density `|ψ|²`, shaped like the grid.
    pub fn current_density(&self) -> nd::ArrayD<f64> {
        self.grid.reshape(&density(&self.psi))
    }

    /// Simulated time, `step × dt`.
    pub fn current_time(&self) -> f64 { self.step as f64 * self.config.dt }

    /// Number of steps taken since initialization or the last reset.
    pub fn step_index(&self) -> usize { self.step }

    /// Current run state.
    pub fn run_state(&self) -> RunState { self.state }

    /// Return `true` if the step budget has been used up.
    pub fn is_complete(&self) -> bool { self.step >= self.config.steps }

    /// Step at which a singular system halted the simulation, if any.
    pub fn halted_at(&self) -> Option<usize> { self.halted }

    /// Current wavefunction over all grid nodes.
    pub fn wavefunction(&self) -> &nd::Array1<C64> { &self.psi }

    /// Normalized initial wavefunction.
    pub fn initial_state(&self) -> &nd::Array1<C64> { &self.psi0 }

    /// Current norm `Σ |ψ|² dx^d`.
    pub fn norm(&self) -> f64 { wf_norm(&self.psi, self.grid.cell()) }

    pub fn grid(&self) -> &Grid { &self.grid }

    pub fn potential(&self) -> &PotentialField { &self.potential }

    pub fn config(&self) -> &SimConfig { &self.config }

    /// Copy out the current state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            step: self.step,
            time: self.current_time(),
            state: self.state,
            psi: self.psi.clone(),
        }
    }

    /// Get a handle for signaling this simulation from elsewhere.
    pub fn control(&self) -> ControlHandle { self.signals.clone() }

    /// Tick up to `max_ticks` times, stopping early if the simulation is
    /// paused or complete. Returns the number of steps taken.
    pub fn run(&mut self, max_ticks: usize) -> Result<usize, SimError> {
        let mut advanced = 0;
        for _ in 0..max_ticks {
            match self.tick()? {
                Tick::Advanced => { advanced += 1; },
                Tick::Paused | Tick::Complete => { break; },
            }
        }
        Ok(advanced)
    }
}
