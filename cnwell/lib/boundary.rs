//! Hard Dirichlet constraint on the domain boundary.

use ndarray as nd;
use num_complex::Complex64 as C64;
use num_traits::Zero;
use crate::{ Arr1, grid::Grid };

/// Zeroes a wavefunction on every boundary node of a grid.
///
/// With a penalty wall the propagated amplitude on the boundary is small but
/// nonzero; applying this after every step makes it exactly zero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoundaryEnforcer {
    nodes: Vec<usize>,
}

impl BoundaryEnforcer {
    /// Cache the boundary nodes of `grid`.
    pub fn new(grid: &Grid) -> Self {
        Self { nodes: grid.boundary_nodes() }
    }

    /// Flat indices of the constrained nodes.
    pub fn nodes(&self) -> &[usize] { &self.nodes }

    /// Set `q` to zero on every boundary node.
    ///
    /// *Panics if `q` is shorter than the grid the enforcer was built for*.
    pub fn apply<S>(&self, q: &mut Arr1<S>)
    where S: nd::DataMut<Elem = C64>
    {
        self.nodes.iter().for_each(|&k| { q[k] = C64::zero(); });
    }

    /// Return `true` if `q` is exactly zero on every boundary node.
    pub fn is_satisfied<S>(&self, q: &Arr1<S>) -> bool
    where S: nd::Data<Elem = C64>
    {
        self.nodes.iter().all(|&k| q[k].is_zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeroes_exactly_the_boundary() {
        let grid = Grid::new(1.0, 4, 2).unwrap();
        let enforcer = BoundaryEnforcer::new(&grid);
        let mut q: nd::Array1<C64>
            = (0..grid.total()).map(|k| C64::new(1.0 + k as f64, -1.0)).collect();
        assert!(!enforcer.is_satisfied(&q));
        enforcer.apply(&mut q);
        assert!(enforcer.is_satisfied(&q));
        for k in 0..grid.total() {
            assert_eq!(q[k].is_zero(), grid.is_boundary(k));
        }
    }
}
