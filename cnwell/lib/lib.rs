#![allow(non_snake_case)]

//! Provides a Crank-Nicolson propagator for the time-dependent Schrödinger
//! equation of a particle in a one- or two-dimensional infinite square well,
//! wrapped in a tick-driven simulation controller with pause, resume, and
//! reset signals.
//!
//! Provides implementations for the following numerical routines:
//! - Finite-difference Hamiltonians assembled as Kronecker sums of 1D
//!   operators in band storage
//! - Banded LU with partial pivoting (dense LAPACK LU with the `lapack`
//!   feature), factorized once per run
//! - Penalty-wall or eliminated-node treatment of the Dirichlet boundary
//!
//! ```
//! use cnwell::{ config::SimConfig, sim::{ Simulation, Tick } };
//!
//! let config = SimConfig { resolution: 64, steps: 10, ..SimConfig::box_1d() };
//! let mut sim = Simulation::initialize(config).unwrap();
//! while sim.tick().unwrap() == Tick::Advanced { }
//! assert_eq!(sim.step_index(), 10);
//! assert!((sim.norm() - 1.0).abs() < 1e-6);
//! ```
//!
//! See [`docs`] for theoretical background.

pub mod band;
pub mod boundary;
pub mod config;
pub mod error;
pub mod grid;
pub mod hamiltonian;
pub mod potential;
pub mod propagator;
pub mod sim;
pub mod state;
pub mod utils;

pub mod docs;

pub(crate) const HBAR: f64 = 1.0;
pub(crate) const MASS: f64 = 1.0;
pub(crate) const DEF_WALL: f64 = 1e12;

pub type Arr1<S> = ndarray::ArrayBase<S, ndarray::Ix1>;
pub type Arr2<S> = ndarray::ArrayBase<S, ndarray::Ix2>;
