//! Reflection and transmission of a two-dimensional array of metal clusters.
//!
//! Spherical clusters of diameter `d` sit on a square lattice of period
//! `a = lattice_factor * d` inside a host. Each cluster is a point dipole with
//! the quasi-static polarizability `alpha = (eps_p - eps_m) / (eps_p + 2 eps_m) R^3`,
//! renormalised by the dipole field of the rest of the lattice through the
//! lattice sum `U0 = 9.03 / a^3`. The sheet radiates like a current sheet,
//! which gives closed-form amplitudes `r` and `t`.

use std::f64::consts::PI;

use crate::config::PERSSON_LATTICE_SUM;
use crate::matrix::{TransferMatrix, C64};
use crate::state::Polarization;


/// Cluster size and lattice spacing of a sheet. Lengths in nm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SheetGeometry {
    pub diameter: f64,
    pub lattice_factor: f64,
}

impl SheetGeometry {
    pub fn lattice_constant(&self) -> f64 {
        self.lattice_factor * self.diameter
    }

    /// Polarizabilities `(alpha_parallel, alpha_orthogonal)` of a cluster in the lattice.
    pub fn polarizabilities(&self, eps_matrix: C64, eps_metal: C64) -> (C64, C64) {
        let radius = self.diameter / 2.0;
        let a = self.lattice_constant();
        let u0 = PERSSON_LATTICE_SUM / a.powi(3);
        let alpha = (eps_metal - eps_matrix) / (eps_metal + 2.0 * eps_matrix) * radius.powi(3);
        (alpha / (1.0 - alpha * u0 / 2.0), alpha / (1.0 + alpha * u0))
    }

    /// Amplitudes `(r, t)` of the sheet for a wave of `wavelength` (nm) hitting
    /// it with the complex cosine `cos_theta` inside the host.
    pub fn reflection_transmission(
        &self,
        wavelength: f64,
        eps_matrix: C64,
        eps_metal: C64,
        cos_theta: C64,
        polarization: Polarization,
    ) -> (C64, C64) {
        let i = C64::i();
        let a = self.lattice_constant();
        let k = 2.0 * PI * eps_matrix.sqrt() / wavelength;
        let (alpha_par, alpha_ort) = self.polarizabilities(eps_matrix, eps_metal);
        let k_par = 2.0 * PI * k * alpha_par / (a * a);
        let k_ort = 2.0 * PI * k * alpha_ort / (a * a);

        match polarization {
            Polarization::S => {
                let denominator = cos_theta - i * k_par;
                (i * k_par / denominator, cos_theta / denominator)
            }
            Polarization::P => {
                let sin2 = 1.0 - cos_theta * cos_theta;
                let tangential = i * k_par * cos_theta;
                let normal = i * k_ort * sin2 / cos_theta;
                let a = tangential / (1.0 - tangential);
                let b = normal / (1.0 - normal);
                (a - b, 1.0 + a + b)
            }
        }
    }
}

/// Transfer matrix of a zero-thickness sheet with amplitudes `r` and `t`,
/// identical from both sides.
pub fn sheet_matrix(r: C64, t: C64) -> TransferMatrix {
    TransferMatrix::new((t * t - r * r) / t, r / t, -r / t, 1.0 / t)
}
