//! Permittivity of metal nanoclusters and their effective medium in a host.
//!
//! Two cluster models are supported: a Drude free-electron metal and
//! tabulated antimony data, linearly interpolated in wavelength. The
//! [`Materials`] bundle owns the shared, read-only model data of one run.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{MirrorError, Result};
use crate::matrix::C64;
use crate::gauss::GaussTable;
use crate::permittivity::AdachiGaussIntersections;
use crate::state::OpticalContext;

const BUNDLED_SB: &str = include_str!("../data/sb_permittivity.txt");


/// Free-electron permittivity `eps_inf - wp^2 / (w (w + i gamma))`. Energies in eV.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Drude {
    pub eps_inf: f64,
    pub w_plasma: f64,
    pub gamma_plasma: f64,
}

impl Drude {
    pub fn permittivity(&self, energy: f64) -> C64 {
        self.eps_inf - self.w_plasma * self.w_plasma / (energy * C64::new(energy, self.gamma_plasma))
    }
}

/// Metal the clusters are made of.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum MetalModel {
    Drude(Drude),
    /// Tabulated antimony permittivity.
    Sb,
}

/// Effective permittivity of spherical inclusions with volume fraction `f`
/// dispersed in a host (Maxwell-Garnett).
pub fn maxwell_garnett(eps_matrix: C64, eps_metal: C64, f: f64) -> C64 {
    let diff = eps_metal - eps_matrix;
    eps_matrix * (2.0 * f * diff + eps_metal + 2.0 * eps_matrix)
        / (2.0 * eps_matrix + eps_metal - f * diff)
}

/// Tabulated antimony permittivity over wavelength (nm).
///
/// Real and imaginary parts are interpolated linearly and independently.
/// Queries outside the table return the nearest endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct SbPermittivity {
    wavelengths: Vec<f64>,
    values: Vec<C64>,
}

impl SbPermittivity {
    /// Parses `wavelength re im` rows. Blank lines and `#` comments are skipped.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut rows: Vec<(f64, C64)> = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line_number = index + 1;
            let line = line.map_err(|e| MirrorError::DatasetParse {
                line: line_number,
                reason: e.to_string(),
            })?;
            let content = line.split('#').next().unwrap_or("").trim();
            if content.is_empty() {
                continue;
            }
            let columns = content
                .split_whitespace()
                .map(|column| column.parse::<f64>())
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| MirrorError::DatasetParse {
                    line: line_number,
                    reason: e.to_string(),
                })?;
            match columns.as_slice() {
                [wavelength, re, im] => rows.push((*wavelength, C64::new(*re, *im))),
                _ => {
                    return Err(MirrorError::DatasetParse {
                        line: line_number,
                        reason: format!("expected 3 columns, found {}", columns.len()),
                    })
                }
            }
        }
        if rows.is_empty() {
            return Err(MirrorError::EmptyDataset);
        }
        rows.sort_by(|a, b| a.0.total_cmp(&b.0));
        let (wavelengths, values) = rows.into_iter().unzip();
        Ok(Self {
            wavelengths,
            values,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| MirrorError::DatasetParse {
            line: 0,
            reason: format!("{}: {}", path.display(), e),
        })?;
        let dataset = Self::from_reader(BufReader::new(file))?;
        debug!(
            "loaded {} Sb permittivity rows from {}",
            dataset.wavelengths.len(),
            path.display()
        );
        Ok(dataset)
    }

    /// The dataset compiled into the crate.
    pub fn bundled() -> Result<Self> {
        Self::from_reader(BUNDLED_SB.as_bytes())
    }

    /// Tabulated wavelength range in nm.
    pub fn range(&self) -> (f64, f64) {
        let first = self.wavelengths[0];
        let last = self.wavelengths[self.wavelengths.len() - 1];
        (first, last)
    }

    pub fn at(&self, wavelength: f64) -> C64 {
        let (first, last) = self.range();
        if wavelength <= first || wavelength >= last {
            if wavelength < first || wavelength > last {
                warn!(
                    "wavelength {} nm outside Sb table [{}, {}], clamping",
                    wavelength, first, last
                );
            }
            return if wavelength <= first {
                self.values[0]
            } else {
                self.values[self.values.len() - 1]
            };
        }
        let upper = self.wavelengths.partition_point(|w| *w < wavelength);
        let lower = upper - 1;
        let t = (wavelength - self.wavelengths[lower]) / (self.wavelengths[upper] - self.wavelengths[lower]);
        self.values[lower] + (self.values[upper] - self.values[lower]) * t
    }
}

/// Read-only model data shared by all samples of one run.
#[derive(Debug, Default)]
pub struct Materials {
    pub intersections: AdachiGaussIntersections,
    pub sb: Option<SbPermittivity>,
}

impl Materials {
    pub fn new(sb: Option<SbPermittivity>) -> Self {
        Self {
            intersections: AdachiGaussIntersections::new(),
            sb,
        }
    }

    /// Replaces the Gauss coefficient table, dropping memoized intersections.
    pub fn with_gauss_table(mut self, table: GaussTable) -> Self {
        self.intersections = AdachiGaussIntersections::with_table(table);
        self
    }

    /// Materials with the bundled Sb dataset.
    pub fn bundled() -> Result<Self> {
        Ok(Self::new(Some(SbPermittivity::bundled()?)))
    }

    pub fn metal_permittivity(&self, model: &MetalModel, ctx: &OpticalContext) -> Result<C64> {
        match model {
            MetalModel::Drude(drude) => Ok(drude.permittivity(ctx.energy())),
            MetalModel::Sb => self
                .sb
                .as_ref()
                .map(|sb| sb.at(ctx.wavelength))
                .ok_or(MirrorError::DatasetUnavailable),
        }
    }
}
