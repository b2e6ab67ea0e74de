//! Collection of all error types.
//!
//! All errors derive [`thiserror::Error`], making them composable when allowed
//! and compatible with application code using [`anyhow`][anyhow].
//!
//! [anyhow]: https://crates.io/crates/anyhow

use std::path::PathBuf;
use thiserror::Error;

/// Returned when an operation requiring equal-length arrays encounters arrays
/// with unequal length.
#[derive(Debug, Error)]
#[error("encountered arrays with incompatible lengths; got {0} and {1}")]
pub struct LengthError(pub usize, pub usize);

impl LengthError {
    pub(crate) fn check(na: usize, nb: usize) -> Result<(), Self> {
        (na == nb).then_some(()).ok_or(Self(na, nb))
    }
}

/// Returned when simulation parameters are malformed, i.e. the simulation
/// cannot be set up at all.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Returned when fewer than 3 nodes per axis are requested.
    #[error("grid resolution must be at least 3 nodes per axis; got {0}")]
    BadResolution(usize),

    /// Returned when the domain length is non-positive or not finite.
    #[error("domain length must be positive and finite; got {0}")]
    BadLength(f64),

    /// Returned for an unsupported number of spatial dimensions.
    #[error("dimensionality must be between 1 and {max}; got {got}")]
    BadDim { got: usize, max: usize },

    /// Returned when the time step is non-positive or not finite.
    #[error("time step must be positive and finite; got {0}")]
    BadTimestep(f64),

    /// Returned when the total step budget is zero.
    #[error("step budget must be greater than 0")]
    BadSteps,

    /// Returned when the wall potential is non-positive or not finite.
    #[error("wall potential must be positive and finite; got {0}")]
    BadWall(f64),

    /// Returned when a per-axis parameter has the wrong number of entries.
    #[error("`{field}` needs one value per axis ({expected}); got {got}")]
    AxisCount { field: &'static str, expected: usize, got: usize },

    /// Returned when a per-axis parameter holds a non-finite value.
    #[error("`{0}` contains a non-finite value")]
    NonFinite(&'static str),

    /// Returned when the dense solver is requested without LAPACK support
    /// compiled in.
    #[error("the dense solver requires the `lapack` feature")]
    SolverUnavailable,

    /// [`LengthError`]
    #[error("array length error: {0}")]
    Length(#[from] LengthError),

    /// Returned when a config file cannot be read.
    #[error("could not read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// [`toml::de::Error`]
    #[error("could not parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// [`toml::ser::Error`]
    #[error("could not serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

impl ConfigError {
    pub(crate) fn check_resolution(n: usize) -> Result<(), Self> {
        (n >= 3).then_some(()).ok_or(Self::BadResolution(n))
    }

    pub(crate) fn check_length(len: f64) -> Result<(), Self> {
        (len > 0.0 && len.is_finite()).then_some(()).ok_or(Self::BadLength(len))
    }

    pub(crate) fn check_dim(dim: usize, max: usize) -> Result<(), Self> {
        (1..=max).contains(&dim).then_some(())
            .ok_or(Self::BadDim { got: dim, max })
    }

    pub(crate) fn check_timestep(dt: f64) -> Result<(), Self> {
        (dt > 0.0 && dt.is_finite()).then_some(()).ok_or(Self::BadTimestep(dt))
    }

    pub(crate) fn check_steps(steps: usize) -> Result<(), Self> {
        (steps != 0).then_some(()).ok_or(Self::BadSteps)
    }

    pub(crate) fn check_wall(wall: f64) -> Result<(), Self> {
        (wall > 0.0 && wall.is_finite()).then_some(()).ok_or(Self::BadWall(wall))
    }

    pub(crate) fn check_axes(field: &'static str, vals: &[f64], dim: usize)
        -> Result<(), Self>
    {
        if vals.len() != dim {
            return Err(Self::AxisCount { field, expected: dim, got: vals.len() });
        }
        vals.iter().all(|v| v.is_finite()).then_some(())
            .ok_or(Self::NonFinite(field))
    }
}

/// Returned when an initial wavefunction has zero (or non-finite) norm and
/// hence cannot be normalized.
#[derive(Debug, Error)]
#[error("initial state has degenerate norm {0}")]
pub struct DegenerateState(pub f64);

impl DegenerateState {
    pub(crate) fn check(norm: f64) -> Result<(), Self> {
        (norm > 0.0 && norm.is_finite()).then_some(()).ok_or(Self(norm))
    }
}

/// Returned when the implicit Crank-Nicolson system cannot be solved.
#[derive(Debug, Error)]
pub enum SingularSystem {
    /// A zero or non-finite pivot was encountered while factorizing.
    #[error("zero or non-finite pivot in row {0}")]
    Pivot(usize),

    /// A linear solve produced a non-finite amplitude.
    #[error("solve produced a non-finite amplitude at node {0}")]
    NonFinite(usize),

    /// [`LinalgError`][ndarray_linalg::error::LinalgError]
    #[cfg(feature = "lapack")]
    #[error("linalg error: {0}")]
    Linalg(#[from] ndarray_linalg::error::LinalgError),
}

/// Returned from [`Simulation`][crate::sim::Simulation] setup and ticking.
#[derive(Debug, Error)]
pub enum SimError {
    /// [`ConfigError`]
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),

    /// [`DegenerateState`]
    #[error("{0}")]
    DegenerateState(#[from] DegenerateState),

    /// [`SingularSystem`], with the index of the step that could not be
    /// completed (0 when raised during setup).
    #[error("singular system at step {step}: {source}")]
    SingularSystem {
        step: usize,
        #[source]
        source: SingularSystem,
    },

    /// Returned by every tick after a [`SingularSystem`] has halted the
    /// simulation.
    #[error("simulation halted by a singular system at step {step}")]
    Halted { step: usize },
}

impl SimError {
    pub(crate) fn singular(step: usize) -> impl FnOnce(SingularSystem) -> Self {
        move |source| Self::SingularSystem { step, source }
    }
}
