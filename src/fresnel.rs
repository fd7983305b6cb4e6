//! Interface matrices from the Fresnel boundary conditions.
//!
//! At a planar interface the tangential fields are continuous. Written in
//! terms of the forward/backward amplitudes on both sides this gives a 2×2
//! matrix that depends only on the effective indices of the two media:
//! `n * cos(theta)` for s-polarization and `n / cos(theta)` for p-polarization.

use crate::matrix::{TransferMatrix, TransferOps, C64};
use crate::state::Polarization;


/// Effective index of a medium for the given polarization.
pub fn effective_index(n: C64, cos_theta: C64, polarization: Polarization) -> C64 {
    match polarization {
        Polarization::S => n * cos_theta,
        Polarization::P => n / cos_theta,
    }
}

/// Interface matrix for light crossing from medium 1 (left) into medium 2 (right).
///
/// `M = [[(n2e + n1e) / 2n2e, (n2e - n1e) / 2n2e], [(n2e - n1e) / 2n2e, (n2e + n1e) / 2n2e]]`
pub fn interface(
    n1: C64,
    cos1: C64,
    n2: C64,
    cos2: C64,
    polarization: Polarization,
) -> TransferMatrix {
    let n1e = effective_index(n1, cos1, polarization);
    let n2e = effective_index(n2, cos2, polarization);
    let mut m = TransferMatrix::zeros();
    m.fill_diagonal((n2e + n1e) / (2.0 * n2e));
    m.fill_anti_diagonal((n2e - n1e) / (2.0 * n2e));
    m
}
