//! Band matrix storage and a banded LU factorization.
//!
//! Finite-difference operators on a regular grid only couple nearest
//! neighbors, so every matrix built here has all of its nonzero elements within
//! a few diagonals of the main one (or, in more than one dimension, within a
//! band of width *N*^(*d* - 1)). Storing only the band keeps both memory and the
//! cost of factorizing the Crank-Nicolson system linear in the number of grid
//! nodes.

use std::ops::{ Add, Range };
use ndarray as nd;
use num_complex::Complex64 as C64;
use num_traits::{ Num, Zero };
use crate::{ Arr1, Arr2, error::SingularSystem };

/// A square matrix with `kl` nonzero sub-diagonals and `ku` nonzero
/// super-diagonals.
///
/// Elements are stored row-wise: row `i` holds columns `i - kl ..= i + ku` in a
/// fixed-width row of the backing array. Elements outside the band are
/// implicitly zero.
#[derive(Clone, Debug, PartialEq)]
pub struct BandMatrix<A> {
    n: usize,
    kl: usize,
    ku: usize,
    data: nd::Array2<A>,
}

impl<A> BandMatrix<A>
where A: Num + Copy
{
    /// Create an `n`×`n` zero matrix with room for the given bandwidths.
    pub fn zeros(n: usize, kl: usize, ku: usize) -> Self {
        Self { n, kl, ku, data: nd::Array2::zeros((n, kl + ku + 1)) }
    }

    /// Create the `n`×`n` identity.
    pub fn identity(n: usize) -> Self {
        Self { n, kl: 0, ku: 0, data: nd::Array2::ones((n, 1)) }
    }

    /// Create a diagonal matrix.
    pub fn from_diag<S>(d: &Arr1<S>) -> Self
    where S: nd::Data<Elem = A>
    {
        let n = d.len();
        let mut new = Self::zeros(n, 0, 0);
        new.data.column_mut(0).assign(d);
        new
    }

    /// Create an `n`×`n` tridiagonal matrix with constant diagonals.
    pub fn tridiagonal(n: usize, sub: A, diag: A, sup: A) -> Self {
        let mut new = Self::zeros(n, 1, 1);
        for i in 0..n {
            if i > 0 { new.set(i, i - 1, sub); }
            new.set(i, i, diag);
            if i + 1 < n { new.set(i, i + 1, sup); }
        }
        new
    }

    /// Collect a dense matrix into band storage, taking the smallest bandwidths
    /// that cover all of its nonzero elements.
    ///
    /// *Panics if `a` is not square*.
    pub fn from_dense<S>(a: &Arr2<S>) -> Self
    where S: nd::Data<Elem = A>
    {
        let (n, m) = a.dim();
        assert_eq!(n, m, "band matrices must be square");
        let (kl, ku)
            = a.indexed_iter()
            .filter(|(_, v)| !v.is_zero())
            .fold((0, 0), |(kl, ku), ((i, j), _)| {
                (kl.max(i.saturating_sub(j)), ku.max(j.saturating_sub(i)))
            });
        let mut new = Self::zeros(n, kl, ku);
        for i in 0..n {
            for j in new.row_span(i) { new.set(i, j, a[[i, j]]); }
        }
        new
    }

    /// Number of rows (and columns).
    pub fn n(&self) -> usize { self.n }

    /// Number of sub-diagonals held in storage.
    pub fn kl(&self) -> usize { self.kl }

    /// Number of super-diagonals held in storage.
    pub fn ku(&self) -> usize { self.ku }

    /// Range of column indices held in storage for row `i`.
    pub fn row_span(&self, i: usize) -> Range<usize> {
        i.saturating_sub(self.kl)..(i + self.ku + 1).min(self.n)
    }

    fn in_band(&self, i: usize, j: usize) -> bool {
        i < self.n && j < self.n && j + self.kl >= i && j <= i + self.ku
    }

    /// Get the `(i, j)`-th element.
    pub fn get(&self, i: usize, j: usize) -> A {
        if self.in_band(i, j) {
            self.data[[i, j + self.kl - i]]
        } else {
            A::zero()
        }
    }

    /// Set the `(i, j)`-th element.
    ///
    /// *Panics if `(i, j)` lies outside the stored band*.
    pub fn set(&mut self, i: usize, j: usize, val: A) {
        assert!(
            self.in_band(i, j),
            "element ({}, {}) is outside the band (kl = {}, ku = {})",
            i, j, self.kl, self.ku,
        );
        self.data[[i, j + self.kl - i]] = val;
    }

    /// Add `d` to the main diagonal in place.
    ///
    /// *Panics if `d` does not have length equal to the matrix size*.
    pub fn add_diag<S>(&mut self, d: &Arr1<S>)
    where S: nd::Data<Elem = A>
    {
        assert_eq!(d.len(), self.n);
        let kl = self.kl;
        self.data.column_mut(kl).iter_mut().zip(d)
            .for_each(|(a, dk)| { *a = *a + *dk; });
    }

    /// Iterate over all stored `(i, j, value)` triples, row by row.
    pub fn entries(&self) -> impl Iterator<Item = (usize, usize, A)> + '_ {
        (0..self.n)
            .flat_map(move |i| self.row_span(i).map(move |j| (i, j, self.get(i, j))))
    }

    /// Apply a function to every stored element.
    pub fn map<B, F>(&self, f: F) -> BandMatrix<B>
    where
        B: Num + Copy,
        F: FnMut(&A) -> B,
    {
        BandMatrix {
            n: self.n,
            kl: self.kl,
            ku: self.ku,
            data: self.data.map(f),
        }
    }

    /// Return a copy of `self` multiplied by a scalar.
    pub fn scaled(&self, a: A) -> Self { self.map(|x| *x * a) }

    /// Kronecker product `self ⊗ other`.
    ///
    /// The result is again banded: for an `n`×`n` right-hand factor, lower
    /// bandwidth `kl` becomes `self.kl * n + other.kl` (likewise for `ku`).
    pub fn kron(&self, other: &Self) -> Self {
        let nb = other.n;
        let n = self.n * nb;
        let max = n.saturating_sub(1);
        let kl = (self.kl * nb + other.kl).min(max);
        let ku = (self.ku * nb + other.ku).min(max);
        let mut out = Self::zeros(n, kl, ku);
        for (i1, j1, a) in self.entries() {
            if a.is_zero() { continue; }
            for (i2, j2, b) in other.entries() {
                out.set(i1 * nb + i2, j1 * nb + j2, a * b);
            }
        }
        out
    }

    /// Matrix-vector product.
    ///
    /// *Panics if `x` does not have length equal to the matrix size*.
    pub fn dot<S, B>(&self, x: &Arr1<S>) -> nd::Array1<B>
    where
        S: nd::Data<Elem = B>,
        B: Num + Copy + From<A>,
    {
        assert_eq!(
            x.len(), self.n,
            "vector of length {} incompatible with {}x{} matrix",
            x.len(), self.n, self.n,
        );
        (0..self.n)
            .map(|i| {
                self.row_span(i)
                    .fold(B::zero(), |acc, j| acc + B::from(self.get(i, j)) * x[j])
            })
            .collect()
    }

    /// Expand into a dense matrix.
    pub fn to_dense(&self) -> nd::Array2<A> {
        let mut a = nd::Array2::zeros((self.n, self.n));
        self.entries().for_each(|(i, j, v)| { a[[i, j]] = v; });
        a
    }

    /// Return `true` if `self` equals its own transpose.
    pub fn is_symmetric(&self) -> bool
    where A: PartialEq
    {
        self.entries().all(|(i, j, v)| self.get(j, i) == v)
    }
}

impl<A> Add for &BandMatrix<A>
where A: Num + Copy
{
    type Output = BandMatrix<A>;

    /// *Panics if the operands have different sizes*.
    fn add(self, rhs: Self) -> BandMatrix<A> {
        assert_eq!(self.n, rhs.n, "cannot add band matrices of different sizes");
        let mut out
            = BandMatrix::zeros(self.n, self.kl.max(rhs.kl), self.ku.max(rhs.ku));
        self.entries().chain(rhs.entries())
            .for_each(|(i, j, v)| { out.set(i, j, out.get(i, j) + v); });
        out
    }
}

/// LU factorization of a complex band matrix with partial (row) pivoting.
///
/// Row interchanges are confined to the `kl` rows below each pivot, so the
/// factor `U` gains at most `kl` extra super-diagonals of fill-in. `L` is kept
/// as the sequence of elimination multipliers in the rows they were applied
/// to, and row interchanges are replayed on the right-hand side during a
/// solve.
#[derive(Clone, Debug)]
pub struct BandLu {
    n: usize,
    kl: usize,
    ku: usize,
    // row i holds columns i - kl ..= i + kl + ku
    lu: nd::Array2<C64>,
    piv: Vec<usize>,
}

impl BandLu {
    /// Factorize `a` once, for any number of subsequent solves.
    ///
    /// Fails with [`SingularSystem::Pivot`] if a zero or non-finite pivot is
    /// encountered.
    pub fn factorize(a: &BandMatrix<C64>) -> Result<Self, SingularSystem> {
        let n = a.n();
        let kl = a.kl();
        let ku = a.ku();
        let mut lu: nd::Array2<C64> = nd::Array2::zeros((n, 2 * kl + ku + 1));
        for (i, j, v) in a.entries() { lu[[i, j + kl - i]] = v; }

        let mut piv: Vec<usize> = Vec::with_capacity(n);
        for k in 0..n {
            let last_row = (k + kl).min(n - 1);
            let last_col = (k + kl + ku).min(n - 1);
            let p
                = (k..=last_row)
                .max_by(|&r, &s| {
                    lu[[r, k + kl - r]].norm().total_cmp(&lu[[s, k + kl - s]].norm())
                })
                .unwrap_or(k);
            let pivot = lu[[p, k + kl - p]];
            if !(pivot.norm() > 0.0) || !pivot.is_finite() {
                return Err(SingularSystem::Pivot(k));
            }
            piv.push(p);
            if p != k {
                for j in k..=last_col {
                    lu.swap([k, j + kl - k], [p, j + kl - p]);
                }
            }
            for i in k + 1..=last_row {
                let m = lu[[i, k + kl - i]] / pivot;
                lu[[i, k + kl - i]] = m;
                if m.is_zero() { continue; }
                for j in k + 1..=last_col {
                    let ukj = lu[[k, j + kl - k]];
                    lu[[i, j + kl - i]] -= m * ukj;
                }
            }
        }
        Ok(Self { n, kl, ku, lu, piv })
    }

    /// Size of the factorized system.
    pub fn n(&self) -> usize { self.n }

    /// Solve `A x = b` in place, overwriting `b` with `x`.
    ///
    /// *Panics if `b` does not have length equal to the system size*.
    pub fn solve_inplace<S>(&self, b: &mut Arr1<S>)
    where S: nd::DataMut<Elem = C64>
    {
        assert_eq!(b.len(), self.n);
        let n = self.n;
        let kl = self.kl;
        let w = self.kl + self.ku;
        for (k, &p) in self.piv.iter().enumerate() {
            if p != k { b.swap(k, p); }
            let bk = b[k];
            for i in k + 1..=(k + kl).min(n - 1) {
                b[i] -= self.lu[[i, k + kl - i]] * bk;
            }
        }
        for i in (0..n).rev() {
            let mut s = b[i];
            for j in i + 1..=(i + w).min(n - 1) {
                s -= self.lu[[i, j + kl - i]] * b[j];
            }
            b[i] = s / self.lu[[i, kl]];
        }
    }

    /// Solve `A x = b`, returning `x`.
    ///
    /// *Panics if `b` does not have length equal to the system size*.
    pub fn solve<S>(&self, b: &Arr1<S>) -> nd::Array1<C64>
    where S: nd::Data<Elem = C64>
    {
        let mut x = b.to_owned();
        self.solve_inplace(&mut x);
        x
    }
}
