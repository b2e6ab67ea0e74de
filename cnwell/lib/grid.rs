//! Regular rectangular grid over the box `[0, L]^d`.
//!
//! Nodes are flattened in row-major order (the last axis varies fastest), so
//! that for `d = 2` the flat index of node `(i, j)` is `i * N + j`.

use ndarray::{ self as nd, Dimension };
use crate::{ Arr1, error::ConfigError };

/// Maximum supported number of spatial dimensions.
pub const MAX_DIM: usize = 2;

/// Spatial discretization of a `d`-dimensional box with equal side lengths.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    // number of spatial dimensions
    dim: usize,
    // side length of the box
    len: f64,
    // nodes per axis
    n: usize,
    // node spacing
    dx: f64,
    // node coordinates along a single axis
    axis: nd::Array1<f64>,
}

impl Grid {
    /// Create a new grid of `n` nodes per axis spanning `[0, len]` on each of
    /// `dim` axes.
    ///
    /// Fails if `n < 3` (no interior nodes), `len` is not positive and finite,
    /// or `dim` is not between 1 and [`MAX_DIM`].
    pub fn new(len: f64, n: usize, dim: usize) -> Result<Self, ConfigError> {
        ConfigError::check_length(len)?;
        ConfigError::check_resolution(n)?;
        ConfigError::check_dim(dim, MAX_DIM)?;
        let axis: nd::Array1<f64> = nd::Array1::linspace(0.0, len, n);
        let dx = len / (n - 1) as f64;
        Ok(Self { dim, len, n, dx, axis })
    }

    /// Number of spatial dimensions.
    pub fn dim(&self) -> usize { self.dim }

    /// Side length of the box.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> f64 { self.len }

    /// Number of nodes per axis.
    pub fn n(&self) -> usize { self.n }

    /// Node spacing.
    pub fn dx(&self) -> f64 { self.dx }

    /// Total number of nodes, `n^dim`.
    pub fn total(&self) -> usize { self.n.pow(self.dim as u32) }

    /// Volume element, `dx^dim`.
    pub fn cell(&self) -> f64 { self.dx.powi(self.dim as i32) }

    /// Node coordinates along any one axis.
    pub fn axis(&self) -> &nd::Array1<f64> { &self.axis }

    /// Shape of the grid as a `dim`-dimensional array.
    pub fn shape(&self) -> Vec<usize> { vec![self.n; self.dim] }

    /// Flat-index distance between neighboring nodes along each axis.
    pub fn strides(&self) -> Vec<usize> {
        (0..self.dim).rev().map(|a| self.n.pow(a as u32)).collect()
    }

    /// Convert a flat node index to a per-axis index.
    pub fn unravel(&self, flat: usize) -> Vec<usize> {
        let mut idx = vec![0; self.dim];
        let mut rem = flat;
        for ia in idx.iter_mut().rev() {
            *ia = rem % self.n;
            rem /= self.n;
        }
        idx
    }

    /// Convert a per-axis index to a flat node index.
    pub fn ravel(&self, idx: &[usize]) -> usize {
        idx.iter().fold(0, |acc, &ia| acc * self.n + ia)
    }

    /// Cartesian coordinates of a node.
    pub fn coords(&self, flat: usize) -> Vec<f64> {
        self.unravel(flat).into_iter().map(|ia| self.axis[ia]).collect()
    }

    /// Return `true` if any per-axis index of the node is `0` or `n - 1`.
    pub fn is_boundary(&self, flat: usize) -> bool {
        let mut rem = flat;
        (0..self.dim).any(|_| {
            let ia = rem % self.n;
            rem /= self.n;
            ia == 0 || ia == self.n - 1
        })
    }

    /// Flat indices of all boundary nodes, in ascending order.
    pub fn boundary_nodes(&self) -> Vec<usize> {
        (0..self.total()).filter(|&k| self.is_boundary(k)).collect()
    }

    /// Flat indices of all interior nodes, in ascending order.
    ///
    /// These enumerate the `(n - 2)^dim` interior sub-grid in its own row-major
    /// order.
    pub fn interior_nodes(&self) -> Vec<usize> {
        (0..self.total()).filter(|&k| !self.is_boundary(k)).collect()
    }

    /// Number of interior nodes per axis.
    pub fn interior_n(&self) -> usize { self.n - 2 }

    /// Reshape flat node data into a `dim`-dimensional array.
    ///
    /// *Panics if `q` is shorter than [`Self::total`]*.
    pub fn reshape<S, A>(&self, q: &Arr1<S>) -> nd::ArrayD<A>
    where
        S: nd::Data<Elem = A>,
        A: Clone,
    {
        nd::ArrayD::from_shape_fn(
            nd::IxDyn(&self.shape()),
            |idx| q[self.ravel(idx.slice())].clone(),
        )
    }
}
