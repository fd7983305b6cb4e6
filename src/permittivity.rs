//! AlGaAs optical constants from the Adachi, Gauss and stitched models.
//!
//! The stitched model uses the real part of the Adachi index below the
//! energy where the two models' real indices cross, and the full Gauss index
//! above it. The crossing depends only on the alloy fraction and is searched
//! once per fraction, then memoized in [`AdachiGaussIntersections`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::{INTERSECTION_DECIMALS, INTERSECTION_FROM, INTERSECTION_STEP, INTERSECTION_TO};
use crate::error::{MirrorError, Result};
use crate::gauss::GaussTable;
use crate::matrix::C64;
use crate::adachi;

#[cfg(test)]
mod tests {

    use super::*;
    use rayon::prelude::*;

    #[test]
    fn eps_to_n_round_trip() {
        for x in [0.0, 0.15, 0.3, 1.0] {
            for wavelength in (250..2000).step_by(13) {
                let eps = GaussTable::default().permittivity(crate::state::to_energy(wavelength as f64), x);
                let n = eps_to_n(eps);
                let re = n.re * n.re - n.im * n.im;
                let im = 2.0 * n.re * n.im;
                assert!((re - eps.re).abs() <= 1e-9 * eps.norm(), "eps: {}, n: {}", eps, n);
                assert!((im - eps.im).abs() <= 1e-9 * eps.norm(), "eps: {}, n: {}", eps, n);
            }
        }
    }

    #[test]
    fn gaas_intersection() {
        let energy = find_intersection(&GaussTable::default(), 0.0).unwrap();
        assert!((energy - 1.425).abs() < 1e-9, "energy: {}", energy);
    }

    #[test]
    fn intersection_is_memoized() {
        let table = AdachiGaussIntersections::new();
        let first = table.get(0.1).unwrap();
        let second = table.get(0.1).unwrap();
        assert_eq!(first, second);
        assert_eq!(table.searches(), 1);
        table.get(0.2).unwrap();
        assert_eq!(table.searches(), 2);
    }

    #[test]
    fn intersection_is_searched_once_under_contention() {
        let table = AdachiGaussIntersections::new();
        let energies: Vec<f64> = (0..64)
            .into_par_iter()
            .map(|_| table.get(0.05).unwrap())
            .collect();
        assert!(energies.iter().all(|e| *e == energies[0]));
        assert_eq!(table.searches(), 1);
    }

    #[test]
    fn missing_intersection_is_an_error() {
        assert!(matches!(
            find_intersection(&GaussTable::default(), 1.0),
            Err(MirrorError::NoIntersection { .. })
        ));
    }

    #[test]
    fn gauss_branches_use_the_held_table() {
        let mut table = GaussTable::default();
        table.eps_inf = crate::gauss::Cubic([2.6, 0.9, -0.6, 0.0]);
        let custom = AdachiGaussIntersections::with_table(table);
        let energy = 1.3;
        let n = refractive_index(energy, 0.0, 0.0, EpsType::Gauss, &custom).unwrap();
        assert_eq!(n, eps_to_n(table.permittivity(energy, 0.0)));
        let builtin = refractive_index(energy, 0.0, 0.0, EpsType::Gauss, &AdachiGaussIntersections::new()).unwrap();
        assert!(n.re > builtin.re);
    }

    #[test]
    fn stitched_index_switches_at_intersection() {
        let table = AdachiGaussIntersections::new();
        let below = 1.2;
        let n = refractive_index(below, 0.0, 0.0, EpsType::GaussAdachi, &table).unwrap();
        let gauss_n = eps_to_n(GaussTable::default().permittivity(below, 0.0));
        assert_eq!(n.re, adachi::refractive_index(below, 0.0, 0.0).re);
        assert_eq!(n.im, gauss_n.im);

        let above = 2.0;
        let n = refractive_index(above, 0.0, 0.0, EpsType::GaussAdachi, &table).unwrap();
        assert_eq!(n, eps_to_n(GaussTable::default().permittivity(above, 0.0)));
    }
}

/// Dielectric function model used for an AlGaAs layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpsType {
    Adachi,
    Gauss,
    GaussAdachi,
}

/// Refractive index `n + ik` of a passive medium with permittivity `eps`.
pub fn eps_to_n(eps: C64) -> C64 {
    let modulus = eps.norm();
    C64::new(
        ((modulus + eps.re) / 2.0).sqrt(),
        ((modulus - eps.re).max(0.0) / 2.0).sqrt(),
    )
}

/// Refractive index of AlGaAs at photon energy `energy` (eV).
///
/// `k` is the absorption ratio of the Adachi branch (`n_im = k * n_re`) and is
/// ignored by the other models. The Gauss branches use the coefficient table
/// held by `intersections`.
pub fn refractive_index(
    energy: f64,
    x: f64,
    k: f64,
    eps_type: EpsType,
    intersections: &AdachiGaussIntersections,
) -> Result<C64> {
    match eps_type {
        EpsType::Adachi => Ok(adachi::refractive_index(energy, x, k)),
        EpsType::Gauss => Ok(eps_to_n(intersections.gauss().permittivity(energy, x))),
        EpsType::GaussAdachi => {
            let boundary = intersections.get(x)?;
            let gauss_n = eps_to_n(intersections.gauss().permittivity(energy, x));
            if energy < boundary {
                Ok(C64::new(adachi::refractive_index(energy, x, 0.0).re, gauss_n.im))
            } else {
                Ok(gauss_n)
            }
        }
    }
}

/// Permittivity of AlGaAs, the square of [`refractive_index`].
pub fn permittivity(
    energy: f64,
    x: f64,
    k: f64,
    eps_type: EpsType,
    intersections: &AdachiGaussIntersections,
) -> Result<C64> {
    let n = refractive_index(energy, x, k, eps_type, intersections)?;
    Ok(n * n)
}

/// Searches the photon energy in the fixed window where the real indices of
/// the Gauss and Adachi models cross, choosing the crossing closest to `E0(x)`.
pub fn find_intersection(gauss: &GaussTable, x: f64) -> Result<f64> {
    let steps = ((INTERSECTION_TO - INTERSECTION_FROM) / INTERSECTION_STEP).round() as usize;
    let scale = 10f64.powi(INTERSECTION_DECIMALS);
    let samples: Vec<(f64, f64)> = (0..=steps)
        .map(|i| {
            let energy = ((INTERSECTION_FROM + i as f64 * INTERSECTION_STEP) * scale).round() / scale;
            let gauss_n = eps_to_n(gauss.permittivity(energy, x));
            let adachi_n = adachi::refractive_index(energy, x, 0.0);
            (energy, gauss_n.re - adachi_n.re)
        })
        .collect();

    let e0 = gauss.params(x).e0;
    samples
        .iter()
        .tuple_windows()
        .filter_map(|(a, b)| {
            if a.1 == 0.0 || a.1 * b.1 < 0.0 {
                Some(if a.1.abs() <= b.1.abs() { a.0 } else { b.0 })
            } else {
                None
            }
        })
        .min_by(|a, b| (a - e0).abs().total_cmp(&(b - e0).abs()))
        .ok_or(MirrorError::NoIntersection {
            x,
            from: INTERSECTION_FROM,
            to: INTERSECTION_TO,
        })
}

/// Memoized Adachi/Gauss intersection energies keyed by alloy fraction, for
/// one Gauss coefficient table.
///
/// Each fraction is searched at most once, also when many threads ask for the
/// same fraction at the same time. Failed searches are memoized as well.
#[derive(Debug, Default)]
pub struct AdachiGaussIntersections {
    gauss: GaussTable,
    cells: Mutex<HashMap<u64, Arc<OnceLock<Result<f64>>>>>,
    searches: AtomicUsize,
}

impl AdachiGaussIntersections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(gauss: GaussTable) -> Self {
        Self {
            gauss,
            ..Self::default()
        }
    }

    pub fn gauss(&self) -> &GaussTable {
        &self.gauss
    }

    /// Returns the intersection energy for `x`, searching on first use.
    pub fn get(&self, x: f64) -> Result<f64> {
        let cell = {
            let mut cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
            // normalise -0.0 so both zeros share an entry
            cells.entry((x + 0.0).to_bits()).or_default().clone()
        };
        cell.get_or_init(|| {
            self.searches.fetch_add(1, Ordering::Relaxed);
            let energy = find_intersection(&self.gauss, x);
            debug!("Adachi/Gauss intersection for x = {}: {:?}", x, energy);
            energy
        })
        .clone()
    }

    /// Number of searches performed so far.
    pub fn searches(&self) -> usize {
        self.searches.load(Ordering::Relaxed)
    }
}
