//! Simulation parameters, read from and written to TOML.
//!
//! A complete configuration looks like
//! ```toml
//! length = 1.0
//! resolution = 256
//! dim = 1
//! dt = 1e-4
//! steps = 100000
//! wall_potential = 1e12
//! boundary = "penalty"   # optional; or "eliminated"
//! solver = "banded"      # optional; or "dense" (needs the `lapack` feature)
//!
//! [packet]
//! center = [0.5]
//! sigma = 0.05
//! k0 = [628.3185307179587]
//! ```

use std::{ f64::consts::PI, fs, path::Path };
use serde::{ Deserialize, Serialize };
use crate::{
    DEF_WALL,
    error::ConfigError,
    grid::MAX_DIM,
    propagator::Solver,
    state::GaussianPacket,
};

/// How the Dirichlet condition on the domain boundary enters the linear
/// system.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryMode {
    /// Boundary nodes stay in the system under a large finite wall potential,
    /// and are zeroed after every step.
    #[default]
    Penalty,
    /// Boundary nodes are removed from the system entirely; only interior
    /// nodes are propagated.
    Eliminated,
}

/// All parameters needed to set up a [`Simulation`][crate::sim::Simulation].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimConfig {
    /// Side length `L` of the box.
    pub length: f64,
    /// Nodes per axis `N`.
    pub resolution: usize,
    /// Number of spatial dimensions.
    pub dim: usize,
    /// Time step.
    pub dt: f64,
    /// Total number of steps before the run is complete.
    pub steps: usize,
    /// Potential on boundary nodes.
    pub wall_potential: f64,
    /// Boundary treatment.
    #[serde(default)]
    pub boundary: BoundaryMode,
    /// Linear solver for the implicit half-step.
    #[serde(default)]
    pub solver: Solver,
    /// Initial wave packet.
    pub packet: GaussianPacket,
}

impl SimConfig {
    /// A narrow, fast packet bouncing in a unit box: `N = 256`, `dt = 1e-4`
    /// out to `T = 10`.
    pub fn box_1d() -> Self {
        Self {
            length: 1.0,
            resolution: 256,
            dim: 1,
            dt: 1e-4,
            steps: 100_000,
            wall_potential: DEF_WALL,
            boundary: BoundaryMode::Penalty,
            solver: Solver::Banded,
            packet: GaussianPacket {
                center: vec![0.5],
                sigma: 0.05,
                k0: vec![200.0 * PI],
            },
        }
    }

    /// The two-dimensional analogue of [`Self::box_1d`] on a `32 × 32` grid,
    /// moving diagonally, out to `T = 1`.
    pub fn box_2d() -> Self {
        Self {
            length: 1.0,
            resolution: 32,
            dim: 2,
            dt: 1e-4,
            steps: 10_000,
            wall_potential: DEF_WALL,
            boundary: BoundaryMode::Penalty,
            solver: Solver::Banded,
            packet: GaussianPacket {
                center: vec![0.5, 0.5],
                sigma: 0.05,
                k0: vec![200.0 * PI, 200.0 * PI],
            },
        }
    }

    /// Check every field, returning the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_setup()?;
        self.packet.validate(self.dim)?;
        Ok(())
    }

    /// Check every field except the initial packet.
    pub fn validate_setup(&self) -> Result<(), ConfigError> {
        ConfigError::check_length(self.length)?;
        ConfigError::check_resolution(self.resolution)?;
        ConfigError::check_dim(self.dim, MAX_DIM)?;
        ConfigError::check_timestep(self.dt)?;
        ConfigError::check_steps(self.steps)?;
        ConfigError::check_wall(self.wall_potential)?;
        self.solver.check()
    }

    /// Parse a configuration from a TOML string and validate it.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a configuration from a TOML file and validate it.
    pub fn from_file<P>(path: P) -> Result<Self, ConfigError>
    where P: AsRef<Path>
    {
        let path = path.as_ref();
        let contents
            = fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&contents)
    }

    /// Render as TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    /// Simulated time at the end of the run, `steps × dt`.
    pub fn total_time(&self) -> f64 { self.steps as f64 * self.dt }
}
