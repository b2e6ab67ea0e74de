//! Miscellaneous tools for wavefunctions sampled on a grid.
//!
//! All integrals here use the rectangle rule with volume element `cell`
//! (`dx^d` for a `d`-dimensional grid), which coincides with the trapezoidal
//! rule whenever the wavefunction vanishes on the boundary.

use ndarray as nd;
use num_complex::Complex64 as C64;
use crate::Arr1;

/// Calculate the norm `Σ |q|² dx^d` of a wavefunction.
pub fn wf_norm<S>(q: &Arr1<S>, cell: f64) -> f64
where S: nd::Data<Elem = C64>
{
    q.iter().map(|qk| qk.norm_sqr()).sum::<f64>() * cell
}

/// Calculate the inner product `⟨q|p⟩` of two wavefunctions.
///
/// Extra elements in the longer array are ignored.
pub fn wf_dot<S, T>(q: &Arr1<S>, p: &Arr1<T>, cell: f64) -> C64
where
    S: nd::Data<Elem = C64>,
    T: nd::Data<Elem = C64>,
{
    q.iter().zip(p)
        .fold(C64::from(0.0), |acc, (qk, pk)| acc + qk.conj() * pk)
        * cell
}

/// Renormalize a wavefunction in place.
///
/// A wavefunction with zero norm is left with non-finite values; see
/// [`crate::state::normalize`] for a checked version.
pub fn wf_renormalize<S>(q: &mut Arr1<S>, cell: f64)
where S: nd::DataMut<Elem = C64>
{
    let norm = wf_norm(q, cell).sqrt();
    q.map_inplace(|qk| { *qk /= norm; });
}

/// Return a normalized copy of a wavefunction.
pub fn wf_normalized<S>(q: &Arr1<S>, cell: f64) -> nd::Array1<C64>
where S: nd::Data<Elem = C64>
{
    let norm = wf_norm(q, cell).sqrt();
    q.mapv(|qk| qk / norm)
}

/// Probability density `|q|²` at every node.
pub fn density<S>(q: &Arr1<S>) -> nd::Array1<f64>
where S: nd::Data<Elem = C64>
{
    q.mapv(|qk| qk.norm_sqr())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn norm_and_renormalize() {
        let mut q = nd::array![C64::new(0.0, 0.0), C64::new(3.0, 4.0), C64::new(0.0, 0.0)];
        assert_relative_eq!(wf_norm(&q, 0.5), 12.5);
        wf_renormalize(&mut q, 0.5);
        assert_relative_eq!(wf_norm(&q, 0.5), 1.0, epsilon = 1e-14);
        let p = nd::array![C64::new(1.0, 1.0), C64::new(0.0, 1.0)];
        assert_relative_eq!(wf_norm(&wf_normalized(&p, 0.25), 0.25), 1.0, epsilon = 1e-14);
    }

    #[test]
    fn dot_is_conjugate_linear_in_first_argument() {
        let q = nd::array![C64::new(0.0, 1.0), C64::new(1.0, 0.0)];
        let p = nd::array![C64::new(1.0, 0.0), C64::new(1.0, 0.0)];
        let qp = wf_dot(&q, &p, 1.0);
        assert_relative_eq!(qp.re, 1.0);
        assert_relative_eq!(qp.im, -1.0);
        assert_eq!(density(&q), nd::array![1.0, 1.0]);
    }
}
