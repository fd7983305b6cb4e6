use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::matrix::C64;
use crate::state::Regime;


/// Value of one sweep sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sample {
    Real(f64),
    Complex(C64),
}

impl Sample {
    /// Real part, or the value itself for real samples.
    pub fn re(&self) -> f64 {
        match self {
            Sample::Real(value) => *value,
            Sample::Complex(value) => value.re,
        }
    }

    pub fn to_complex(&self) -> C64 {
        match self {
            Sample::Real(value) => C64::new(*value, 0.0),
            Sample::Complex(value) => *value,
        }
    }
}

/// Output series of a sweep, parallel to its wavelengths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Values {
    Real(Vec<f64>),
    Complex(Vec<C64>),
}

/// Wavelengths (nm) and the regime values computed at each of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepResult {
    pub regime: Regime,
    pub wavelengths: Vec<f64>,
    pub values: Values,
}

impl SweepResult {
    /// Builds the series for `regime` from samples ordered like `wavelengths`.
    pub fn from_samples(regime: Regime, wavelengths: Vec<f64>, samples: Vec<Sample>) -> Self {
        let values = if regime.is_complex() {
            Values::Complex(samples.iter().map(Sample::to_complex).collect())
        } else {
            Values::Real(samples.iter().map(Sample::re).collect())
        };
        Self {
            regime,
            wavelengths,
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.wavelengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wavelengths.is_empty()
    }

    /// The series as a table with columns `wavelength, value` for real
    /// regimes and `wavelength, re, im` for complex ones.
    pub fn table(&self) -> Array2<f64> {
        match &self.values {
            Values::Real(values) => {
                let mut table = Array2::<f64>::zeros((self.len(), 2));
                for (i, (wavelength, value)) in self.wavelengths.iter().zip(values).enumerate() {
                    table[[i, 0]] = *wavelength;
                    table[[i, 1]] = *value;
                }
                table
            }
            Values::Complex(values) => {
                let mut table = Array2::<f64>::zeros((self.len(), 3));
                for (i, (wavelength, value)) in self.wavelengths.iter().zip(values).enumerate() {
                    table[[i, 0]] = *wavelength;
                    table[[i, 1]] = value.re;
                    table[[i, 2]] = value.im;
                }
                table
            }
        }
    }
}
