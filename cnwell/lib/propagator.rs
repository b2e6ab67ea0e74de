//! Crank-Nicolson time stepping.
//!
//! For a time-independent Hamiltonian `H` and step `dt`, each step solves
//! ```text
//! (I + i dt H / 2ħ) ψ' = (I - i dt H / 2ħ) ψ
//! ```
//! The left-hand matrix is factorized once when the propagator is built; every
//! step afterward costs one band matrix-vector product and one pair of
//! triangular solves.

use std::time::Instant;
use ndarray as nd;
use num_complex::Complex64 as C64;
use serde::{ Deserialize, Serialize };
use tracing::debug;
use crate::{
    Arr1,
    HBAR,
    band::{ BandLu, BandMatrix },
    error::{ ConfigError, SimError, SingularSystem },
    hamiltonian::Hamiltonian,
};
#[cfg(feature = "lapack")]
use ndarray_linalg::{ FactorizeInto, LUFactorized, Solve };

/// Linear solver used for the implicit half of each step.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Solver {
    /// In-crate banded LU with partial pivoting.
    #[default]
    Banded,
    /// Dense LAPACK LU (`zgetrf`/`zgetrs`); requires the `lapack` feature.
    Dense,
}

impl Solver {
    /// Return `true` if the solver was compiled in.
    pub fn is_available(&self) -> bool {
        match self {
            Self::Banded => true,
            Self::Dense => cfg!(feature = "lapack"),
        }
    }

    pub(crate) fn check(&self) -> Result<(), ConfigError> {
        self.is_available().then_some(()).ok_or(ConfigError::SolverUnavailable)
    }
}

#[derive(Clone)]
enum Factored {
    Banded(BandLu),
    #[cfg(feature = "lapack")]
    Dense(LUFactorized<nd::OwnedRepr<C64>>),
}

impl Factored {
    fn solve(&self, b: nd::Array1<C64>) -> Result<nd::Array1<C64>, SingularSystem> {
        match self {
            Self::Banded(lu) => {
                let mut x = b;
                lu.solve_inplace(&mut x);
                Ok(x)
            },
            #[cfg(feature = "lapack")]
            Self::Dense(lu) => Ok(lu.solve(&b)?),
        }
    }
}

/// Crank-Nicolson propagator for a fixed Hamiltonian and time step.
#[derive(Clone)]
pub struct CrankNicolson {
    dt: f64,
    solver: Solver,
    // explicit half, I - i dt H / 2ħ
    B: BandMatrix<C64>,
    // factorized implicit half, I + i dt H / 2ħ
    A_lu: Factored,
}

impl std::fmt::Debug for CrankNicolson {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrankNicolson")
            .field("dt", &self.dt)
            .field("solver", &self.solver)
            .field("size", &self.B.n())
            .finish()
    }
}

impl CrankNicolson {
    /// Build both propagator matrices and factorize the implicit one.
    ///
    /// Fails with [`SimError::InvalidConfiguration`] for a bad `dt` or an
    /// unavailable solver and with [`SimError::SingularSystem`] (at step 0) if
    /// the factorization fails.
    pub fn new(H: &Hamiltonian, dt: f64, solver: Solver) -> Result<Self, SimError> {
        ConfigError::check_timestep(dt)?;
        solver.check()?;
        let n = H.size();
        let coef = C64::new(0.0, dt / (2.0 * HBAR));
        let Hc: BandMatrix<C64> = H.matrix().map(|&h| C64::from(h));
        let I: BandMatrix<C64> = BandMatrix::identity(n);
        let A = &I + &Hc.scaled(coef);
        let B = &I + &Hc.scaled(-coef);

        let t0 = Instant::now();
        let A_lu = factorize(&A, solver)?;
        debug!(
            size = n,
            bandwidth = A.kl(),
            ?solver,
            elapsed_ms = t0.elapsed().as_secs_f64() * 1e3,
            "factorized crank-nicolson system"
        );
        Ok(Self { dt, solver, B, A_lu })
    }

    /// Time step.
    pub fn dt(&self) -> f64 { self.dt }

    /// Solver backing the implicit half-step.
    pub fn solver(&self) -> Solver { self.solver }

    /// Size of the propagated state.
    pub fn size(&self) -> usize { self.B.n() }

    /// Advance a state by one time step, returning the new state.
    ///
    /// Fails if the solve produces a non-finite amplitude.
    ///
    /// *Panics if `q` does not have length equal to [`Self::size`]*.
    pub fn step<S>(&self, q: &Arr1<S>) -> Result<nd::Array1<C64>, SingularSystem>
    where S: nd::Data<Elem = C64>
    {
        let b = self.B.dot(q);
        let q_next = self.A_lu.solve(b)?;
        match q_next.iter().position(|qk| !qk.is_finite()) {
            Some(k) => Err(SingularSystem::NonFinite(k)),
            None => Ok(q_next),
        }
    }

    /// Advance a state by one time step in place.
    ///
    /// `q` is left untouched if the step fails.
    ///
    /// *Panics if `q` does not have length equal to [`Self::size`]*.
    pub fn step_inplace<S>(&self, q: &mut Arr1<S>) -> Result<(), SingularSystem>
    where S: nd::DataMut<Elem = C64>
    {
        let q_next = self.step(q)?;
        q.assign(&q_next);
        Ok(())
    }
}

fn factorize(A: &BandMatrix<C64>, solver: Solver) -> Result<Factored, SimError> {
    match solver {
        Solver::Banded
            => BandLu::factorize(A)
            .map(Factored::Banded)
            .map_err(SimError::singular(0)),
        #[cfg(feature = "lapack")]
        Solver::Dense
            => A.to_dense().factorize_into()
            .map(Factored::Dense)
            .map_err(|err| SimError::singular(0)(err.into())),
        #[cfg(not(feature = "lapack"))]
        Solver::Dense => Err(ConfigError::SolverUnavailable.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use crate::{
        grid::Grid,
        potential::PotentialField,
        state::GaussianPacket,
        utils::wf_norm,
    };

    fn well(n: usize, dim: usize) -> (Grid, Hamiltonian) {
        let grid = Grid::new(1.0, n, dim).unwrap();
        let V = PotentialField::infinite_well(&grid, 1e12).unwrap();
        let H = Hamiltonian::assemble(&grid, &V).unwrap();
        (grid, H)
    }

    #[test]
    fn step_satisfies_implicit_equation() {
        let (grid, H) = well(17, 1);
        let dt = 1e-3;
        let cn = CrankNicolson::new(&H, dt, Solver::Banded).unwrap();
        let q = GaussianPacket::centered(&grid, 0.1, vec![10.0]).build(&grid).unwrap();
        let q1 = cn.step(&q).unwrap();
        // (I + i dt H/2) q1 == (I - i dt H/2) q
        let coef = C64::new(0.0, dt / 2.0);
        let lhs = &q1 + &H.apply(&q1).mapv(|x| coef * x);
        let rhs = &q - &H.apply(&q).mapv(|x| coef * x);
        lhs.iter().zip(&rhs)
            .for_each(|(l, r)| assert_abs_diff_eq!((l - r).norm(), 0.0, epsilon = 1e-6));
    }

    #[test]
    fn step_is_unitary() {
        let (grid, H) = well(12, 2);
        let cn = CrankNicolson::new(&H, 1e-4, Solver::Banded).unwrap();
        let mut q
            = GaussianPacket::centered(&grid, 0.15, vec![5.0, -3.0])
            .build(&grid).unwrap();
        for _ in 0..20 { cn.step_inplace(&mut q).unwrap(); }
        assert_abs_diff_eq!(wf_norm(&q, grid.cell()), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn rejects_bad_timestep() {
        let (_, H) = well(5, 1);
        for dt in [0.0, -1e-3, f64::NAN] {
            assert!(matches!(
                CrankNicolson::new(&H, dt, Solver::Banded),
                Err(SimError::InvalidConfiguration(ConfigError::BadTimestep(_))),
            ));
        }
    }

    #[test]
    fn overflowing_system_is_singular() {
        let (_, H) = well(5, 1);
        assert!(matches!(
            CrankNicolson::new(&H, 1e300, Solver::Banded),
            Err(SimError::SingularSystem { step: 0, source: SingularSystem::Pivot(0) }),
        ));
    }

    #[cfg(not(feature = "lapack"))]
    #[test]
    fn dense_solver_needs_lapack() {
        let (_, H) = well(5, 1);
        assert!(matches!(
            CrankNicolson::new(&H, 1e-4, Solver::Dense),
            Err(SimError::InvalidConfiguration(ConfigError::SolverUnavailable)),
        ));
    }

    #[cfg(not(feature = "lapack"))]
    #[test]
    fn dense_factorization_never_falls_back() {
        let (_, H) = well(5, 1);
        let A = H.matrix().map(|&h| C64::from(h));
        assert!(Solver::Banded.is_available());
        assert!(!Solver::Dense.is_available());
        assert!(factorize(&A, Solver::Banded).is_ok());
        assert!(matches!(
            factorize(&A, Solver::Dense),
            Err(SimError::InvalidConfiguration(ConfigError::SolverUnavailable)),
        ));
    }

    #[cfg(feature = "lapack")]
    #[test]
    fn dense_and_banded_agree() {
        let (grid, H) = well(9, 2);
        let q = GaussianPacket::centered(&grid, 0.2, vec![3.0, 1.0]).build(&grid).unwrap();
        let banded = CrankNicolson::new(&H, 1e-4, Solver::Banded).unwrap();
        let dense = CrankNicolson::new(&H, 1e-4, Solver::Dense).unwrap();
        let qb = banded.step(&q).unwrap();
        let qd = dense.step(&q).unwrap();
        qb.iter().zip(&qd)
            .for_each(|(b, d)| assert_abs_diff_eq!((b - d).norm(), 0.0, epsilon = 1e-10));
    }
}
