//! Potential energy over the grid nodes.

use ndarray as nd;
use tracing::{ debug, warn };
use crate::{ HBAR, MASS, error::ConfigError, grid::Grid };

/// Below this multiple of the kinetic energy scale, a wall is considered too
/// weak to approximate an infinite one.
pub const WEAK_WALL_RATIO: f64 = 100.0;

/// Kinetic energy scale `ħ² / 2 m dx²` associated with a grid spacing.
pub fn kinetic_scale(dx: f64) -> f64 {
    HBAR.powi(2) / (2.0 * MASS * dx.powi(2))
}

/// Real-valued potential sampled at every grid node.
#[derive(Clone, Debug, PartialEq)]
pub struct PotentialField {
    values: nd::Array1<f64>,
    wall: f64,
}

impl PotentialField {
    /// Infinite square well: zero on interior nodes and `wall` on every node
    /// of the domain boundary.
    ///
    /// The wall is a penalty approximation of a hard constraint. A warning is
    /// logged if `wall` is less than [`WEAK_WALL_RATIO`] times the kinetic
    /// energy scale of the grid.
    pub fn infinite_well(grid: &Grid, wall: f64) -> Result<Self, ConfigError> {
        ConfigError::check_wall(wall)?;
        let scale = kinetic_scale(grid.dx());
        if wall < WEAK_WALL_RATIO * scale {
            warn!(
                wall,
                kinetic_scale = scale,
                "wall potential is weak relative to the kinetic energy scale"
            );
        }
        let values: nd::Array1<f64>
            = (0..grid.total())
            .map(|k| if grid.is_boundary(k) { wall } else { 0.0 })
            .collect();
        debug!(nodes = values.len(), wall, "built infinite-well potential");
        Ok(Self { values, wall })
    }

    /// Get a reference to the potential values, one per node.
    pub fn values(&self) -> &nd::Array1<f64> { &self.values }

    /// Value assigned to boundary nodes.
    pub fn wall(&self) -> f64 { self.wall }

    /// Number of nodes.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize { self.values.len() }
}
