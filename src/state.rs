//! Per-sample computation state.
//!
//! Every optical model is a pure function of an [`OpticalContext`]: the
//! wavelength of the current sample, the incidence angle and the
//! polarization. The context is a small `Copy` value handed down explicitly,
//! so parallel samples never observe each other's wavelength.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::EV_NM;
use crate::error::{MirrorError, Result};

/// Polarization of the incident plane wave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum Polarization {
    S,
    P,
}

/// The quantity a sweep computes at every wavelength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Regime {
    Reflectance,
    Transmittance,
    Absorbance,
    Permittivity,
    RefractiveIndex,
    ExtinctionCoefficient,
    ScatteringCoefficient,
}

impl Regime {
    /// Regimes that characterise a single material rather than a stack.
    pub fn requires_single_layer(&self) -> bool {
        matches!(
            self,
            Regime::Permittivity
                | Regime::RefractiveIndex
                | Regime::ExtinctionCoefficient
                | Regime::ScatteringCoefficient
        )
    }

    /// Regimes whose values are complex numbers.
    pub fn is_complex(&self) -> bool {
        matches!(self, Regime::Permittivity | Regime::RefractiveIndex)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Regime::Reflectance => "reflectance",
            Regime::Transmittance => "transmittance",
            Regime::Absorbance => "absorbance",
            Regime::Permittivity => "permittivity",
            Regime::RefractiveIndex => "refractive_index",
            Regime::ExtinctionCoefficient => "extinction_coefficient",
            Regime::ScatteringCoefficient => "scattering_coefficient",
        }
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Wavelength, angle and polarization of one computed sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpticalContext {
    /// Wavelength in nm.
    pub wavelength: f64,
    /// Incidence angle in radians, measured in the left medium.
    pub angle: f64,
    pub polarization: Polarization,
}

impl OpticalContext {
    /// Creates a context from an angle in degrees, rejecting angles outside
    /// [0, 90) and wavelengths that are not positive.
    pub fn new(wavelength: f64, angle_deg: f64, polarization: Polarization) -> Result<Self> {
        if !(0.0..90.0).contains(&angle_deg) {
            return Err(MirrorError::InvalidAngle(angle_deg));
        }
        check_wavelength(wavelength)?;
        Ok(Self {
            wavelength,
            angle: angle_deg.to_radians(),
            polarization,
        })
    }

    /// Returns a copy of this context at another wavelength.
    pub fn at_wavelength(&self, wavelength: f64) -> Result<Self> {
        check_wavelength(wavelength)?;
        Ok(Self { wavelength, ..*self })
    }

    /// Photon energy of the current wavelength in eV.
    pub fn energy(&self) -> f64 {
        to_energy(self.wavelength)
    }
}

fn check_wavelength(wavelength: f64) -> Result<()> {
    if wavelength > 0.0 && wavelength.is_finite() {
        Ok(())
    } else {
        Err(MirrorError::InvalidWavelength(wavelength))
    }
}

/// Converts a wavelength in nm to a photon energy in eV.
pub fn to_energy(wavelength: f64) -> f64 {
    EV_NM / wavelength
}

/// Converts a photon energy in eV to a wavelength in nm.
pub fn to_wavelength(energy: f64) -> f64 {
    EV_NM / energy
}
