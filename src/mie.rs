//! Extinction and scattering of metal nanoclusters from Mie theory.
//!
//! The clusters are spheres of radius `r` (nm) with volume fraction `f` in the
//! host. Efficiencies `Q` are converted to cross sections `C = Q * pi * r^2`
//! and to volumetric coefficients `3 f / (4 pi r^3) * C`, reported in cm^-1.
//!
//! Three precision tiers are available. The small-particle expansions keep
//! the leading terms of the electric dipole `a1` and magnetic dipole `b1`
//! (optionally the electric quadrupole `a2`); the full tier sums the series
//! with the Bohren-Huffman recurrences.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::config::{MIE_MAX_TERMS, NM_PER_CM};
use crate::error::{MirrorError, Result};
use crate::matrix::C64;

#[cfg(test)]
mod tests {

    use super::*;
    use crate::metal::Drude;
    use approx::assert_relative_eq;

    fn silver_like() -> C64 {
        Drude {
            eps_inf: 1.0,
            w_plasma: 9.0,
            gamma_plasma: 0.1,
        }
        .permittivity(crate::state::to_energy(800.0))
    }

    #[test]
    fn small_particle_regression() {
        let eps_matrix = C64::new(13.0, 0.05);
        let (ext, sca) = coefficients(MieOrder::Full, 800.0, eps_matrix, silver_like(), 0.01, 2.0).unwrap();
        assert_relative_eq!(ext, 16201.70, max_relative = 1e-5);
        assert_relative_eq!(sca, 45.544, max_relative = 1e-4);
    }

    #[test]
    fn tiers_agree_for_small_particles() {
        let eps_matrix = C64::new(13.0, 0.05);
        let eps_metal = silver_like();
        let (full_ext, full_sca) = coefficients(MieOrder::Full, 800.0, eps_matrix, eps_metal, 0.01, 2.0).unwrap();
        for order in [MieOrder::First, MieOrder::FirstSecond] {
            let (ext, sca) = coefficients(order, 800.0, eps_matrix, eps_metal, 0.01, 2.0).unwrap();
            assert_relative_eq!(ext, full_ext, max_relative = 2e-3);
            assert_relative_eq!(sca, full_sca, max_relative = 2e-3);
        }
    }

    #[test]
    fn quadrupole_term_separates_tiers() {
        let eps_matrix = C64::new(13.0, 0.05);
        let eps_metal = silver_like();
        let (first_ext, first_sca) = coefficients(MieOrder::First, 800.0, eps_matrix, eps_metal, 0.01, 2.0).unwrap();
        let (second_ext, second_sca) =
            coefficients(MieOrder::FirstSecond, 800.0, eps_matrix, eps_metal, 0.01, 2.0).unwrap();
        assert_relative_eq!(first_ext, 16188.788823372935, max_relative = 1e-9);
        assert_relative_eq!(first_sca, 45.52717991783461, max_relative = 1e-9);
        assert_relative_eq!(second_ext, 16189.748682045887, max_relative = 1e-9);
        assert_relative_eq!(second_sca, 45.52718043896903, max_relative = 1e-9);
        assert!((second_ext - first_ext - 0.959858672952).abs() < 1e-6);
    }

    #[test]
    fn coefficients_scale_with_fraction() {
        let eps_matrix = C64::new(12.0, 0.0);
        let eps_metal = silver_like();
        let (ext1, sca1) = coefficients(MieOrder::Full, 700.0, eps_matrix, eps_metal, 0.01, 5.0).unwrap();
        let (ext2, sca2) = coefficients(MieOrder::Full, 700.0, eps_matrix, eps_metal, 0.02, 5.0).unwrap();
        assert_relative_eq!(ext2, 2.0 * ext1, max_relative = 1e-12);
        assert_relative_eq!(sca2, 2.0 * sca1, max_relative = 1e-12);
        assert!(ext1 >= sca1);
    }

    #[test]
    fn huge_particles_are_rejected() {
        let result = coefficients(MieOrder::Full, 500.0, C64::new(12.0, 0.0), silver_like(), 0.01, 1e6);
        assert!(matches!(
            result,
            Err(MirrorError::MieSizeParameterTooLarge { limit: MIE_MAX_TERMS, .. })
        ));
    }

    #[test]
    fn rejects_nonpositive_radius() {
        let result = coefficients(MieOrder::First, 500.0, C64::new(12.0, 0.0), silver_like(), 0.01, 0.0);
        assert!(matches!(result, Err(MirrorError::InvalidParameter { name: "radius", .. })));
    }
}

/// Number of Mie series terms kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MieOrder {
    /// Leading terms of `a1` and `b1`.
    First,
    /// Adds the leading term of `a2`.
    FirstSecond,
    /// Complete series.
    Full,
}

/// Extinction and scattering efficiencies `(Q_ext, Q_sca)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Efficiencies {
    pub extinction: f64,
    pub scattering: f64,
}

/// Returns `(extinction, scattering)` coefficients in cm^-1.
pub fn coefficients(
    order: MieOrder,
    wavelength: f64,
    eps_matrix: C64,
    eps_metal: C64,
    f: f64,
    radius: f64,
) -> Result<(f64, f64)> {
    if !(radius > 0.0) {
        return Err(MirrorError::InvalidParameter {
            name: "radius",
            value: radius,
        });
    }
    let n_matrix = eps_matrix.sqrt();
    let m = eps_metal.sqrt() / n_matrix;
    let x = 2.0 * PI * radius * n_matrix.re / wavelength;

    let q = match order {
        MieOrder::First => small_particle(x, m, false),
        MieOrder::FirstSecond => small_particle(x, m, true),
        MieOrder::Full => bhmie(x, m)?,
    };
    let cross_section = PI * radius * radius;
    let density = 3.0 * f / (4.0 * PI * radius.powi(3)) * NM_PER_CM;
    Ok((
        density * q.extinction * cross_section,
        density * q.scattering * cross_section,
    ))
}

fn small_particle(x: f64, m: C64, quadrupole: bool) -> Efficiencies {
    let i = C64::i();
    let m2 = m * m;
    let ratio = (m2 - 1.0) / (m2 + 2.0);
    let a1 = -i * (2.0 * x.powi(3) / 3.0) * ratio
        - i * (2.0 * x.powi(5) / 5.0) * (m2 - 2.0) * (m2 - 1.0) / ((m2 + 2.0) * (m2 + 2.0))
        + (4.0 * x.powi(6) / 9.0) * ratio * ratio;
    let b1 = -i * (x.powi(5) / 45.0) * (m2 - 1.0);

    let x2 = x * x;
    let mut extinction = 6.0 / x2 * (a1 + b1).re;
    let mut scattering = 6.0 / x2 * (a1.norm_sqr() + b1.norm_sqr());
    if quadrupole {
        let a2 = -i * (x.powi(5) / 15.0) * (m2 - 1.0) / (2.0 * m2 + 3.0);
        extinction += 10.0 / x2 * a2.re;
        scattering += 10.0 / x2 * a2.norm_sqr();
    }
    Efficiencies {
        extinction,
        scattering,
    }
}

/// Full Mie series for a sphere with size parameter `x` and relative index `m`.
///
/// The logarithmic derivative `D_n(mx)` is obtained by downward recurrence
/// from `D_nmx = 0`; the Riccati-Bessel functions `psi_n`, `chi_n` by upward
/// recurrence from `n = 1`.
fn bhmie(x: f64, m: C64) -> Result<Efficiencies> {
    let y = m * x;
    let nstop = (x + 4.0 * x.cbrt() + 2.0).floor() as usize;
    let nmx = (nstop as f64).max(y.norm()).round() as usize + 15;
    if nmx > MIE_MAX_TERMS {
        return Err(MirrorError::MieSizeParameterTooLarge {
            required: nmx,
            limit: MIE_MAX_TERMS,
        });
    }

    let mut d = vec![C64::new(0.0, 0.0); nmx + 1];
    for n in (2..=nmx).rev() {
        let ratio = n as f64 / y;
        d[n - 1] = ratio - 1.0 / (d[n] + ratio);
    }

    let (mut psi0, mut psi1) = (x.cos(), x.sin());
    let (mut chi0, mut chi1) = (-x.sin(), x.cos());
    let mut xi1 = C64::new(psi1, -chi1);
    let mut extinction = 0.0;
    let mut scattering = 0.0;
    for n in 1..=nstop {
        let nf = n as f64;
        let psi = (2.0 * nf - 1.0) * psi1 / x - psi0;
        let chi = (2.0 * nf - 1.0) * chi1 / x - chi0;
        let xi = C64::new(psi, -chi);

        let da = d[n] / m + nf / x;
        let an = (da * psi - psi1) / (da * xi - xi1);
        let db = m * d[n] + nf / x;
        let bn = (db * psi - psi1) / (db * xi - xi1);

        let weight = 2.0 * nf + 1.0;
        extinction += weight * (an + bn).re;
        scattering += weight * (an.norm_sqr() + bn.norm_sqr());

        psi0 = psi1;
        psi1 = psi;
        chi0 = chi1;
        chi1 = chi;
        xi1 = C64::new(psi1, -chi1);
    }

    let scale = 2.0 / (x * x);
    Ok(Efficiencies {
        extinction: scale * extinction,
        scattering: scale * scattering,
    })
}
