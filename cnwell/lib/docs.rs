//! Theoretical background.
//!
//! # Contents
//! - [Background](#background)
//! - [Units](#units)
//! - [Spatial discretization](#spatial-discretization)
//! - [Walls](#walls)
//! - [Solving the implicit system](#solving-the-implicit-system)
//!
//! # Background
//! The time-dependent Schrödinger equation for a particle of mass *m* in a
//! time-independent potential *V*,
//! ```text
//!   ∂ψ      ħ²
//! iħ -- = - --- ∇²ψ + V ψ = H ψ
//!   ∂t      2 m
//! ```
//! has the formal solution ψ(*t* + *dt*) = exp(-*i* *H* *dt* / *ħ*) ψ(*t*).
//! The Crank-Nicolson scheme[^1] replaces the exponential with its diagonal
//! (1, 1) Padé approximant,
//! ```text
//!                 1 - i H dt / 2ħ
//! ψ(t + dt) = [ ----------------- ] ψ(t) + O(dt³)
//!                 1 + i H dt / 2ħ
//! ```
//! which is equivalent to averaging the right-hand side of the equation over
//! the current and next time step. Writing
//! ```text
//! A = I + i H dt / 2ħ
//! B = I - i H dt / 2ħ
//! ```
//! each step solves the linear system
//! ```text
//! A ψ(t + dt) = B ψ(t)
//! ```
//! For Hermitian *H* the matrix *A*⁻¹*B* is unitary (it is the Cayley
//! transform of *H*), so the scheme conserves the norm of ψ exactly and is
//! unconditionally stable for any *dt*. It is second-order accurate in time.
//! Its application to wave packet motion in one dimension goes back to
//! Goldberg, Schey, and Schwartz[^2].
//!
//! # Units
//! Everything here works in natural units with *ħ* = *m* = 1. If lengths are
//! measured in units of some *ℓ*, then times are measured in units of
//! *m* *ℓ*²/*ħ* and energies in units of *ħ*²/*m* *ℓ*².
//!
//! # Spatial discretization
//! The box [0, *L*]<sup>*d*</sup> is sampled on *N* nodes per axis with
//! spacing *dx* = *L* / (*N* - 1). In one dimension, the Laplacian is the
//! usual three-point second difference,
//! ```text
//!           ψ[i - 1] - 2 ψ[i] + ψ[i + 1]
//! ∇²ψ[i] ≈ ------------------------------
//!                       dx²
//! ```
//! i.e. the tridiagonal matrix *L*<sub>1</sub>/*dx*² with -2 on the diagonal
//! and 1 on the first off-diagonals. With nodes flattened in row-major order,
//! the *d*-dimensional operator is the Kronecker sum of one-dimensional ones:
//! ```text
//! L_2 = L_1 ⊗ I + I ⊗ L_1
//! L_3 = L_1 ⊗ I ⊗ I + I ⊗ L_1 ⊗ I + I ⊗ I ⊗ L_1
//! ```
//! and so on. Every Kronecker factor is a band matrix, and the Kronecker
//! product of band matrices is again a band matrix: if *X* has bandwidth *k*
//! and *Y* is *N* × *N* with bandwidth *k*', then *X* ⊗ *Y* has bandwidth
//! *k* *N* + *k*'. The *d*-dimensional Laplacian therefore has bandwidth
//! *N*<sup>*d* - 1</sup>, which is the stride of the slowest axis. The full
//! Hamiltonian is
//! ```text
//!        ħ²  L_d
//! H = - --- ---- + diag(V)
//!       2 m  dx²
//! ```
//! which is real and symmetric. Restricted to a line of nodes through the
//! interior along one axis, it acts as the one-dimensional Hamiltonian plus a
//! constant diagonal term ħ²/(*m* *dx*²) from each of the other axes.
//!
//! # Walls
//! An infinite square well requires ψ = 0 on the boundary. There are two
//! natural ways to impose this:
//! - Penalty: keep the boundary nodes in the system, but set the potential
//!   there to a large finite value *V*<sub>wall</sub>. The amplitude on a
//!   boundary node is then suppressed by a factor of roughly
//!   (ħ²/2*m* *dx*²) / *V*<sub>wall</sub> relative to its neighbors, and is
//!   set to exactly zero after every step. The penalty should be many orders
//!   of magnitude larger than the kinetic energy scale ħ²/2*m* *dx*², but it
//!   also dominates the diagonal of *A* and so worsens its conditioning.
//! - Elimination: drop the boundary nodes from the system altogether and
//!   propagate only the (*N* - 2)<sup>*d*</sup> interior nodes, with the zero
//!   Dirichlet values substituted into the finite differences. Since the
//!   interior nodes of a regular grid form a smaller regular grid with the
//!   same spacing, the reduced Hamiltonian is assembled exactly as above with
//!   *N* - 2 nodes per axis and no wall term. This is the *V*<sub>wall</sub> →
//!   ∞ limit of the penalty approach, but with a well-conditioned *A*.
//!
//! # Solving the implicit system
//! Since *H* and *dt* are fixed for the duration of a run, *A* is factorized
//! once and the factorization is reused for every step. *A* is complex
//! symmetric (not Hermitian) and, for a large penalty wall, has diagonal
//! elements varying over many orders of magnitude, so the factorization uses
//! Gaussian elimination with partial pivoting restricted to the band[^3]. For
//! an *n* × *n* system with *k*<sub>l</sub> sub- and *k*<sub>u</sub>
//! super-diagonals, pivoting can only fill in *k*<sub>l</sub> additional
//! super-diagonals of *U*, so the factorization costs
//! *O*(*n* *k*<sub>l</sub> (*k*<sub>l</sub> + *k*<sub>u</sub>)) and each solve
//! *O*(*n* (2*k*<sub>l</sub> + *k*<sub>u</sub>)), compared to *O*(*n*³) and
//! *O*(*n*²) for a dense LU.
//!
//! [^1]: J. Crank and P. Nicolson, "A practical method for numerical
//! evaluation of solutions of partial differential equations of the
//! heat-conduction type." Math. Proc. Cambridge Philos. Soc. **43** 1 50-67
//! (1947).
//!
//! [^2]: A. Goldberg, H. M. Schey, and J. L. Schwartz, "Computer-generated
//! motion pictures of one-dimensional quantum-mechanical transmission and
//! reflection phenomena." American Journal of Physics **35** 3 177-186 (1967).
//!
//! [^3]: G. H. Golub and C. F. Van Loan, *Matrix Computations*, 4th ed., §4.3.
//! Johns Hopkins University Press (2013).
