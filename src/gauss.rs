//! Gaussian-oscillator model of the AlGaAs dielectric function.
//!
//! The permittivity is a sum of critical-point contributions, each with a
//! Gaussian-broadened damping `Γ' = Γ exp(-α ((E - Ec) / Γ)^2)`:
//!
//! - `eps1`: three-dimensional M0 edge at `E0` and `E0 + Δ0`,
//! - `eps2`: two-dimensional M0 edges at `E1` and `E1 + Δ1` (logarithmic terms),
//! - `eps3`: discrete exciton Rydberg series below `E1` and `E1 + Δ1`,
//! - `eps4`: damped harmonic oscillators at `E2`, `E3` and `E4`.
//!
//! Every model parameter is a cubic polynomial in the AlAs fraction `x`,
//! collected in a [`GaussTable`]. The functional form is Adachi's
//! critical-point model with the Gaussian-like broadening of Djurišić et al.,
//! J. Appl. Phys. 86, 445 (1999). The built-in table is a fitted set in that
//! layout, shipped as `data/gauss_algaas.toml`; a published table in the same
//! layout is loaded with [`GaussTable::from_file`].

use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::{EXCITON_SERIES_MAX_TERMS, EXCITON_SERIES_PRECISION, GAUSS_BROADENING_FLOOR};
use crate::error::{MirrorError, Result};
use crate::matrix::C64;

#[cfg(test)]
mod tests {

    use super::*;
    use crate::state::to_energy;

    fn permittivity(energy: f64, x: f64) -> C64 {
        GaussTable::default().permittivity(energy, x)
    }

    #[test]
    fn gaas_below_gap_regression() {
        let eps = permittivity(to_energy(870.0), 0.0);
        let n = crate::permittivity::eps_to_n(eps);
        assert!((n.re - 3.7162527515).abs() < 1e-9, "n: {}", n);
        assert!((n.im - 0.0566814515).abs() < 1e-9, "n: {}", n);
    }

    #[test]
    fn passive_everywhere() {
        for x in [0.0, 0.1, 0.2, 0.3, 0.5, 0.8, 1.0] {
            for wavelength in (200..4000).step_by(7) {
                let eps = permittivity(to_energy(wavelength as f64), x);
                assert!(eps.im >= 0.0, "x: {}, wavelength: {}, eps: {}", x, wavelength, eps);
                assert!(eps.re.is_finite() && eps.im.is_finite());
            }
        }
    }

    #[test]
    fn parameters_follow_band_edge() {
        let table = GaussTable::default();
        let gaas = table.params(0.0);
        let alas = table.params(1.0);
        assert_eq!(gaas.e0, 1.410);
        assert!(alas.e0 > gaas.e0);
        assert!(alas.e1 > gaas.e1);
    }

    #[test]
    fn shipped_table_matches_builtin() {
        let text = include_str!("../data/gauss_algaas.toml");
        assert_eq!(GaussTable::from_toml(text).unwrap(), GaussTable::default());
    }

    #[test]
    fn loaded_table_drives_the_model() {
        let mut shifted = GaussTable::default();
        shifted.e0 = Cubic([1.510, 1.247, 0.0, 0.336]);
        let text = toml::to_string(&shifted).unwrap();
        let loaded = GaussTable::from_toml(&text).unwrap();
        assert_eq!(loaded, shifted);
        assert_eq!(loaded.params(0.0).e0, 1.510);
        assert_ne!(
            loaded.permittivity(to_energy(870.0), 0.0),
            GaussTable::default().permittivity(to_energy(870.0), 0.0)
        );
    }

    #[test]
    fn malformed_tables_are_rejected() {
        let mut text = toml::to_string(&GaussTable::default()).unwrap();
        assert!(matches!(
            GaussTable::from_toml(&text.replace("alpha4", "alpha5")),
            Err(MirrorError::InvalidGaussTable(_))
        ));
        text.push_str("extra = [0.0, 0.0, 0.0, 0.0]\n");
        assert!(matches!(GaussTable::from_toml(&text), Err(MirrorError::InvalidGaussTable(_))));
        assert!(matches!(
            GaussTable::from_toml("e0 = [1.0, 2.0]"),
            Err(MirrorError::InvalidGaussTable(_))
        ));
    }

    #[test]
    fn broadening_is_floored() {
        assert_eq!(broadening(0.01, 10.0, 5.0, 1.4), GAUSS_BROADENING_FLOOR);
        assert_eq!(broadening(0.1, 0.0, 5.0, 1.4), 0.1);
    }
}

/// Cubic polynomial `c0 + c1 x + c2 x^2 + c3 x^3`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cubic(pub [f64; 4]);

impl Cubic {
    fn at(&self, x: f64) -> f64 {
        let [c0, c1, c2, c3] = self.0;
        c0 + x * (c1 + x * (c2 + x * c3))
    }
}

/// Cubic-in-x coefficients of every model parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GaussTable {
    pub eps_inf: Cubic,
    pub e0: Cubic,
    pub delta0: Cubic,
    pub e1: Cubic,
    pub delta1: Cubic,
    pub e2: Cubic,
    pub e3: Cubic,
    pub e4: Cubic,
    pub gamma0: Cubic,
    pub gamma1: Cubic,
    pub gamma2: Cubic,
    pub gamma3: Cubic,
    pub gamma4: Cubic,
    pub a: Cubic,
    pub b1: Cubic,
    pub b1s: Cubic,
    pub b1x: Cubic,
    pub b2x: Cubic,
    pub g1: Cubic,
    pub f2: Cubic,
    pub f3: Cubic,
    pub f4: Cubic,
    pub alpha0: Cubic,
    pub alpha1: Cubic,
    pub alpha2: Cubic,
    pub alpha3: Cubic,
    pub alpha4: Cubic,
}

const FITTED: GaussTable = GaussTable {
    eps_inf: Cubic([1.60, 0.90, -0.60, 0.0]),
    e0: Cubic([1.410, 1.247, 0.0, 0.336]),
    delta0: Cubic([0.341, -0.041, 0.0, 0.0]),
    e1: Cubic([2.926, 0.964, 0.0, 0.0]),
    delta1: Cubic([0.230, -0.030, 0.0, 0.0]),
    e2: Cubic([4.740, 0.110, 0.0, 0.0]),
    e3: Cubic([5.200, 0.300, 0.0, 0.0]),
    e4: Cubic([6.100, 0.400, 0.0, 0.0]),
    gamma0: Cubic([0.010, 0.010, 0.0, 0.0]),
    gamma1: Cubic([0.090, 0.030, 0.0, 0.0]),
    gamma2: Cubic([0.520, 0.080, 0.0, 0.0]),
    gamma3: Cubic([0.700, 0.100, 0.0, 0.0]),
    gamma4: Cubic([1.000, 0.100, 0.0, 0.0]),
    a: Cubic([7.00, 3.00, 0.0, 0.0]),
    b1: Cubic([3.60, -0.60, 0.0, 0.0]),
    b1s: Cubic([1.10, -0.20, 0.0, 0.0]),
    b1x: Cubic([1.20, -0.30, 0.0, 0.0]),
    b2x: Cubic([0.60, -0.15, 0.0, 0.0]),
    g1: Cubic([0.060, 0.020, 0.0, 0.0]),
    f2: Cubic([6.60, -0.40, 0.0, 0.0]),
    f3: Cubic([3.20, -0.20, 0.0, 0.0]),
    f4: Cubic([3.00, 0.0, 0.0, 0.0]),
    alpha0: Cubic([0.30, 0.0, 0.0, 0.0]),
    alpha1: Cubic([0.20, 0.0, 0.0, 0.0]),
    alpha2: Cubic([0.10, 0.0, 0.0, 0.0]),
    alpha3: Cubic([0.10, 0.0, 0.0, 0.0]),
    alpha4: Cubic([0.0, 0.0, 0.0, 0.0]),
};

impl Default for GaussTable {
    fn default() -> Self {
        FITTED
    }
}

impl GaussTable {
    /// Parses a table written as TOML, one `name = [c0, c1, c2, c3]` entry
    /// per parameter.
    pub fn from_toml(text: &str) -> Result<Self> {
        let table: Self = toml::from_str(text).map_err(|e| MirrorError::InvalidGaussTable(e.to_string()))?;
        if let Some(name) = table.first_non_finite() {
            return Err(MirrorError::InvalidGaussTable(format!("{} has a non-finite coefficient", name)));
        }
        Ok(table)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| MirrorError::InvalidGaussTable(format!("{}: {}", path.display(), e)))?;
        let table = Self::from_toml(&text)?;
        debug!("loaded Gauss coefficient table from {}", path.display());
        Ok(table)
    }

    fn first_non_finite(&self) -> Option<&'static str> {
        [
            ("eps_inf", self.eps_inf),
            ("e0", self.e0),
            ("delta0", self.delta0),
            ("e1", self.e1),
            ("delta1", self.delta1),
            ("e2", self.e2),
            ("e3", self.e3),
            ("e4", self.e4),
            ("gamma0", self.gamma0),
            ("gamma1", self.gamma1),
            ("gamma2", self.gamma2),
            ("gamma3", self.gamma3),
            ("gamma4", self.gamma4),
            ("a", self.a),
            ("b1", self.b1),
            ("b1s", self.b1s),
            ("b1x", self.b1x),
            ("b2x", self.b2x),
            ("g1", self.g1),
            ("f2", self.f2),
            ("f3", self.f3),
            ("f4", self.f4),
            ("alpha0", self.alpha0),
            ("alpha1", self.alpha1),
            ("alpha2", self.alpha2),
            ("alpha3", self.alpha3),
            ("alpha4", self.alpha4),
        ]
        .into_iter()
        .find(|(_, cubic)| cubic.0.iter().any(|c| !c.is_finite()))
        .map(|(name, _)| name)
    }

    /// Model parameters at AlAs fraction `x`.
    pub fn params(&self, x: f64) -> GaussParams {
        GaussParams {
            eps_inf: self.eps_inf.at(x),
            e0: self.e0.at(x),
            delta0: self.delta0.at(x),
            e1: self.e1.at(x),
            delta1: self.delta1.at(x),
            e2: self.e2.at(x),
            e3: self.e3.at(x),
            e4: self.e4.at(x),
            gamma0: self.gamma0.at(x),
            gamma1: self.gamma1.at(x),
            gamma2: self.gamma2.at(x),
            gamma3: self.gamma3.at(x),
            gamma4: self.gamma4.at(x),
            a: self.a.at(x),
            b1: self.b1.at(x),
            b1s: self.b1s.at(x),
            b1x: self.b1x.at(x),
            b2x: self.b2x.at(x),
            g1: self.g1.at(x),
            f2: self.f2.at(x),
            f3: self.f3.at(x),
            f4: self.f4.at(x),
            alpha0: self.alpha0.at(x),
            alpha1: self.alpha1.at(x),
            alpha2: self.alpha2.at(x),
            alpha3: self.alpha3.at(x),
            alpha4: self.alpha4.at(x),
        }
    }

    /// Permittivity at photon energy `energy` (eV) for AlAs fraction `x`.
    pub fn permittivity(&self, energy: f64, x: f64) -> C64 {
        self.params(x).permittivity(energy)
    }
}

/// Model parameters evaluated at one alloy composition. Energies in eV.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussParams {
    pub eps_inf: f64,
    pub e0: f64,
    pub delta0: f64,
    pub e1: f64,
    pub delta1: f64,
    pub e2: f64,
    pub e3: f64,
    pub e4: f64,
    pub gamma0: f64,
    pub gamma1: f64,
    pub gamma2: f64,
    pub gamma3: f64,
    pub gamma4: f64,
    pub a: f64,
    pub b1: f64,
    pub b1s: f64,
    pub b1x: f64,
    pub b2x: f64,
    /// Exciton Rydberg energy of the E1 series.
    pub g1: f64,
    pub f2: f64,
    pub f3: f64,
    pub f4: f64,
    pub alpha0: f64,
    pub alpha1: f64,
    pub alpha2: f64,
    pub alpha3: f64,
    pub alpha4: f64,
}

impl GaussParams {
    pub fn permittivity(&self, energy: f64) -> C64 {
        C64::new(self.eps_inf, 0.0)
            + self.eps1(energy)
            + self.eps2(energy)
            + self.eps3(energy)
            + self.eps4(energy)
    }

    fn eps1(&self, energy: f64) -> C64 {
        let e0s = self.e0 + self.delta0;
        let gamma = broadening(self.gamma0, self.alpha0, energy, self.e0);
        let chi0 = C64::new(energy, gamma) / self.e0;
        let chi_so = C64::new(energy, gamma) / e0s;
        self.a
            * self.e0.powf(-1.5)
            * (edge(chi0) + 0.5 * (self.e0 / e0s).powf(1.5) * edge(chi_so))
    }

    fn eps2(&self, energy: f64) -> C64 {
        let e1s = self.e1 + self.delta1;
        let gamma = broadening(self.gamma1, self.alpha1, energy, self.e1);
        let chi1 = C64::new(energy, gamma) / self.e1;
        let chi1s = C64::new(energy, gamma) / e1s;
        let one = C64::new(1.0, 0.0);
        -self.b1 / (chi1 * chi1) * (one - chi1 * chi1).ln()
            - self.b1s / (chi1s * chi1s) * (one - chi1s * chi1s).ln()
    }

    fn eps3(&self, energy: f64) -> C64 {
        let e1s = self.e1 + self.delta1;
        let gamma = broadening(self.gamma1, self.alpha1, energy, self.e1);
        let mut sum = C64::new(0.0, 0.0);
        for n in 1..=EXCITON_SERIES_MAX_TERMS {
            let k = (2 * n - 1) as f64;
            let binding = self.g1 / (k * k);
            let term = (self.b1x / C64::new(self.e1 - binding - energy, -gamma)
                + self.b2x / C64::new(e1s - binding - energy, -gamma))
                / (k * k * k);
            sum += term;
            if term.norm() < EXCITON_SERIES_PRECISION * sum.norm() {
                break;
            }
        }
        sum
    }

    fn eps4(&self, energy: f64) -> C64 {
        [
            (self.f2, self.e2, self.gamma2, self.alpha2),
            (self.f3, self.e3, self.gamma3, self.alpha3),
            (self.f4, self.e4, self.gamma4, self.alpha4),
        ]
        .iter()
        .map(|&(f, ej, gamma, alpha)| {
            let gamma = broadening(gamma, alpha, energy, ej);
            f * f / C64::new(ej * ej - energy * energy, -energy * gamma)
        })
        .sum()
    }
}

/// Gaussian-broadened damping, floored to keep the edge terms off their branch cuts.
fn broadening(gamma: f64, alpha: f64, energy: f64, center: f64) -> f64 {
    let scaled = (energy - center) / gamma;
    (gamma * (-alpha * scaled * scaled).exp()).max(GAUSS_BROADENING_FLOOR)
}

/// Three-dimensional M0 edge function `(2 - sqrt(1 + chi) - sqrt(1 - chi)) / chi^2`.
fn edge(chi: C64) -> C64 {
    let one = C64::new(1.0, 0.0);
    (2.0 - (one + chi).sqrt() - (one - chi).sqrt()) / (chi * chi)
}
