//! Adachi model of the AlGaAs dielectric function below the fundamental gap.
//!
//! The model is real valued. Above the band gap it saturates: photon energies
//! larger than `Eg(x)` are evaluated at `Eg(x)`.

use crate::matrix::C64;

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn gaas_at_band_gap() {
        // Eg = 1.425, delta = 0.34, A = 6.3, B = 9.4
        let eps = permittivity(1.425, 0.0);
        assert!((eps - 13.8501955).abs() < 1e-6, "eps: {}", eps);
    }

    #[test]
    fn saturates_above_band_gap() {
        assert_eq!(permittivity(2.5, 0.0), permittivity(1.425, 0.0));
        assert_eq!(permittivity(1.9, 0.3), permittivity(band_gap(0.3), 0.3));
    }

    #[test]
    fn absorption_scales_with_k() {
        let n = refractive_index(1.0, 0.2, 0.05);
        assert!((n.im - 0.05 * n.re).abs() < 1e-15);
        assert_eq!(refractive_index(1.0, 0.2, 0.0).im, 0.0);
    }
}

/// Fundamental band gap `Eg(x)` in eV.
pub fn band_gap(x: f64) -> f64 {
    1.425 + 1.155 * x + 0.37 * x * x
}

/// Spin-orbit splitting in eV.
fn spin_orbit(x: f64) -> f64 {
    0.34 - 0.04 * x
}

fn f(chi: f64) -> f64 {
    (2.0 - (1.0 + chi).sqrt() - (1.0 - chi).sqrt()) / (chi * chi)
}

/// Permittivity at photon energy `energy` (eV) for AlAs fraction `x`.
pub fn permittivity(energy: f64, x: f64) -> f64 {
    let eg = band_gap(x);
    let w = energy.min(eg);
    let delta = spin_orbit(x);
    let a = 6.3 + 19.0 * x;
    let b = 9.4 - 10.2 * x;
    a * (f(w / eg) + 0.5 * (eg / (eg + delta)).powf(1.5) * f(w / (eg + delta))) + b
}

/// Refractive index with an externally supplied absorption ratio: `n + i * k * n`.
pub fn refractive_index(energy: f64, x: f64, k: f64) -> C64 {
    let n = permittivity(energy, x).sqrt();
    C64::new(n, k * n)
}
