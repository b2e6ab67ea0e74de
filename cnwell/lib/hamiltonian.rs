//! Finite-difference Hamiltonians on a regular grid.
//!
//! The `d`-dimensional Laplacian is assembled as a Kronecker sum of 1D
//! second-difference operators,
//! ```text
//! L_d = Σ_a  I ⊗ ... ⊗ L_1 ⊗ ... ⊗ I
//!                      ^ axis a
//! ```
//! so that for `d = 2`, `L_2 = L_1 ⊗ I + I ⊗ L_1`. Every factor is a band
//! matrix, hence so is the result.

use ndarray as nd;
use num_complex::Complex64 as C64;
use tracing::debug;
use crate::{
    Arr1,
    HBAR,
    MASS,
    band::BandMatrix,
    error::{ ConfigError, LengthError },
    grid::Grid,
    potential::PotentialField,
};

/// Unscaled second-difference operator on `n` nodes: `-2` on the diagonal, `1`
/// on the first sub- and super-diagonals.
pub fn laplacian_1d(n: usize) -> BandMatrix<f64> {
    BandMatrix::tridiagonal(n, 1.0, -2.0, 1.0)
}

/// Embed a 1D operator along one axis of a `dim`-dimensional grid, taking
/// Kronecker products with identities on all other axes.
pub fn embed_axis(op: &BandMatrix<f64>, axis: usize, dim: usize)
    -> BandMatrix<f64>
{
    let id = BandMatrix::identity(op.n());
    (0..dim)
        .map(|a| if a == axis { op } else { &id })
        .fold(BandMatrix::identity(1), |acc, factor| acc.kron(factor))
}

/// Unscaled `dim`-dimensional Laplacian on `n` nodes per axis.
pub fn laplacian(n: usize, dim: usize) -> BandMatrix<f64> {
    let l1 = laplacian_1d(n);
    (0..dim)
        .map(|axis| embed_axis(&l1, axis, dim))
        .reduce(|acc, term| &acc + &term)
        .unwrap_or_else(|| BandMatrix::zeros(1, 0, 0))
}

/// Discrete Hamiltonian `H = -(ħ²/2m) L_d / dx² + diag(V)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Hamiltonian {
    matrix: BandMatrix<f64>,
    dx: f64,
    dim: usize,
}

impl Hamiltonian {
    fn build<S>(n: usize, dim: usize, dx: f64, V: &Arr1<S>) -> Self
    where S: nd::Data<Elem = f64>
    {
        let kinetic = -HBAR.powi(2) / (2.0 * MASS) / dx.powi(2);
        let mut matrix = laplacian(n, dim).scaled(kinetic);
        matrix.add_diag(V);
        debug!(
            size = matrix.n(),
            bandwidth = matrix.kl(),
            "assembled hamiltonian"
        );
        Self { matrix, dx, dim }
    }

    /// Assemble the Hamiltonian over every node of the grid.
    pub fn assemble(grid: &Grid, potential: &PotentialField)
        -> Result<Self, ConfigError>
    {
        LengthError::check(grid.total(), potential.len())?;
        Ok(Self::build(grid.n(), grid.dim(), grid.dx(), potential.values()))
    }

    /// Assemble the Hamiltonian over interior nodes only, with zero Dirichlet
    /// values substituted for the boundary.
    ///
    /// Rows and columns follow [`Grid::interior_nodes`]. This is the
    /// restriction of [`Self::assemble`] to the interior; the penalty values
    /// on the boundary drop out entirely.
    pub fn assemble_interior(grid: &Grid, potential: &PotentialField)
        -> Result<Self, ConfigError>
    {
        LengthError::check(grid.total(), potential.len())?;
        let V: nd::Array1<f64>
            = grid.interior_nodes().into_iter()
            .map(|k| potential.values()[k])
            .collect();
        Ok(Self::build(grid.interior_n(), grid.dim(), grid.dx(), &V))
    }

    /// Get a reference to the underlying band matrix.
    pub fn matrix(&self) -> &BandMatrix<f64> { &self.matrix }

    /// Number of rows (and columns).
    pub fn size(&self) -> usize { self.matrix.n() }

    /// Grid spacing the Hamiltonian was assembled with.
    pub fn dx(&self) -> f64 { self.dx }

    /// Number of spatial dimensions.
    pub fn dim(&self) -> usize { self.dim }

    /// Compute `H q`.
    ///
    /// *Panics if `q` does not have length equal to [`Self::size`]*.
    pub fn apply<S>(&self, q: &Arr1<S>) -> nd::Array1<C64>
    where S: nd::Data<Elem = C64>
    {
        self.matrix.dot(q)
    }

    /// Expand into a dense matrix.
    pub fn to_dense(&self) -> nd::Array2<f64> { self.matrix.to_dense() }

    /// Return `true` if the (real) matrix is symmetric, i.e. Hermitian.
    pub fn is_hermitian(&self) -> bool { self.matrix.is_symmetric() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn kron_dense(a: &nd::Array2<f64>, b: &nd::Array2<f64>) -> nd::Array2<f64> {
        let (ra, ca) = a.dim();
        let (rb, cb) = b.dim();
        nd::Array2::from_shape_fn(
            (ra * rb, ca * cb),
            |(i, j)| a[[i / rb, j / cb]] * b[[i % rb, j % cb]],
        )
    }

    #[test]
    fn kronecker_sum_matches_dense_construction() {
        let n = 5;
        let l1 = laplacian_1d(n).to_dense();
        let id: nd::Array2<f64> = nd::Array2::eye(n);
        let expected = kron_dense(&l1, &id) + kron_dense(&id, &l1);
        let lap2 = laplacian(n, 2);
        assert_eq!(lap2.to_dense(), expected);
        assert_eq!(lap2.kl(), n);
        assert_eq!(laplacian(n, 1), laplacian_1d(n));
    }

    #[test]
    fn hamiltonian_1d_entries() {
        let grid = Grid::new(1.0, 5, 1).unwrap();
        let V = PotentialField::infinite_well(&grid, 1e12).unwrap();
        let H = Hamiltonian::assemble(&grid, &V).unwrap();
        // dx = 1/4 => ħ²/2m dx² = 8
        assert_eq!(H.matrix().get(2, 2), 16.0);
        assert_eq!(H.matrix().get(2, 3), -8.0);
        assert_eq!(H.matrix().get(0, 0), 16.0 + 1e12);
        assert!(H.is_hermitian());
    }

    #[test]
    fn interior_hamiltonian_is_restriction() {
        let grid = Grid::new(1.0, 6, 2).unwrap();
        let V = PotentialField::infinite_well(&grid, 1e12).unwrap();
        let full = Hamiltonian::assemble(&grid, &V).unwrap().to_dense();
        let inner = Hamiltonian::assemble_interior(&grid, &V).unwrap();
        let nodes = grid.interior_nodes();
        assert_eq!(inner.size(), nodes.len());
        for (a, &ka) in nodes.iter().enumerate() {
            for (b, &kb) in nodes.iter().enumerate() {
                assert_eq!(inner.matrix().get(a, b), full[[ka, kb]]);
            }
        }
    }

    // a wavefunction supported on a single line of a 2D grid sees the 1D
    // Hamiltonian along the line, plus a constant diagonal term from the
    // orthogonal axis and a leak onto the two neighboring lines
    #[test]
    fn separable_slice_reduces_to_1d() {
        let n = 7;
        let g1 = Grid::new(1.0, n, 1).unwrap();
        let g2 = Grid::new(1.0, n, 2).unwrap();
        let H1 = Hamiltonian::assemble(
            &g1, &PotentialField::infinite_well(&g1, 1e12).unwrap()).unwrap();
        let H2 = Hamiltonian::assemble(
            &g2, &PotentialField::infinite_well(&g2, 1e12).unwrap()).unwrap();
        let dx2 = g1.dx().powi(2);

        let i0 = 3;
        let f: nd::Array1<C64>
            = (0..n)
            .map(|j| C64::new((j as f64).sin(), (0.3 * j as f64).cos()))
            .collect();
        let mut line: nd::Array1<C64> = nd::Array1::zeros(g2.total());
        (0..n).for_each(|j| { line[g2.ravel(&[i0, j])] = f[j]; });

        let h1f = H1.apply(&f);
        let h2f = H2.apply(&line);
        for j in 0..n {
            let on_line = h2f[g2.ravel(&[i0, j])];
            let expected = h1f[j] + f[j] / dx2;
            let scale = expected.norm().max(1.0);
            assert_abs_diff_eq!((on_line - expected).norm() / scale, 0.0, epsilon = 1e-12);
            for i in [i0 - 1, i0 + 1] {
                let leak = h2f[g2.ravel(&[i, j])];
                let expected = -0.5 * f[j] / dx2;
                assert_abs_diff_eq!((leak - expected).norm(), 0.0, epsilon = 1e-9);
            }
        }
    }
}
