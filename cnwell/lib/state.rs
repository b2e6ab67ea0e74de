//! Initial wavefunctions.

use ndarray as nd;
use num_complex::Complex64 as C64;
use serde::{ Deserialize, Serialize };
use crate::{
    Arr1,
    error::{ ConfigError, DegenerateState, LengthError, SimError },
    grid::Grid,
    utils::wf_norm,
};

/// Gaussian wave packet with a plane-wave carrier,
/// ```text
/// ψ(r) = exp(-|r - r0|² / 2σ²) exp(i k0·r)
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GaussianPacket {
    /// Packet center `r0`, one coordinate per axis.
    pub center: Vec<f64>,
    /// Envelope width `σ`.
    pub sigma: f64,
    /// Carrier wavenumber `k0`, one component per axis.
    pub k0: Vec<f64>,
}

impl GaussianPacket {
    /// Create a packet centered on the midpoint of the grid's domain.
    pub fn centered(grid: &Grid, sigma: f64, k0: Vec<f64>) -> Self {
        Self { center: vec![grid.len() / 2.0; grid.dim()], sigma, k0 }
    }

    /// Check the packet parameters against a number of spatial dimensions.
    pub fn validate(&self, dim: usize) -> Result<(), ConfigError> {
        ConfigError::check_axes("center", &self.center, dim)?;
        ConfigError::check_axes("k0", &self.k0, dim)?;
        Ok(())
    }

    /// Evaluate the (unnormalized) packet at a point.
    pub fn eval(&self, r: &[f64]) -> C64 {
        let (r2, phase)
            = r.iter().zip(&self.center).zip(&self.k0)
            .fold((0.0, 0.0), |(r2, phase), ((rk, ck), kk)| {
                (r2 + (rk - ck).powi(2), phase + kk * rk)
            });
        (-r2 / (2.0 * self.sigma.powi(2))).exp() * C64::cis(phase)
    }

    /// Sample the packet over a grid and normalize it.
    ///
    /// Fails with [`ConfigError`] for parameters that don't match the grid and
    /// with [`DegenerateState`] if the sampled packet has zero norm (e.g. an
    /// envelope much narrower than the node spacing, or `σ ≤ 0`).
    pub fn build(&self, grid: &Grid) -> Result<nd::Array1<C64>, SimError> {
        self.validate(grid.dim())?;
        // no envelope to sample
        if !(self.sigma > 0.0) { return Err(DegenerateState(0.0).into()); }
        let q: nd::Array1<C64>
            = (0..grid.total())
            .map(|k| self.eval(&grid.coords(k)))
            .collect();
        Ok(normalize(grid, q)?)
    }
}

/// Normalize a wavefunction so that `Σ |q|² dx^d = 1`.
///
/// Fails if the norm is zero or not finite.
pub fn normalize(grid: &Grid, mut q: nd::Array1<C64>)
    -> Result<nd::Array1<C64>, DegenerateState>
{
    let norm = wf_norm(&q, grid.cell());
    DegenerateState::check(norm)?;
    let norm = norm.sqrt();
    q.map_inplace(|qk| { *qk /= norm; });
    Ok(q)
}

/// Use an arbitrary sampled profile as an initial state, normalizing it.
pub fn from_profile<S>(grid: &Grid, profile: &Arr1<S>)
    -> Result<nd::Array1<C64>, SimError>
where S: nd::Data<Elem = C64>
{
    LengthError::check(grid.total(), profile.len())
        .map_err(ConfigError::from)?;
    Ok(normalize(grid, profile.to_owned())?)
}
