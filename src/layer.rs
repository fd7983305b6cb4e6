//! Layers of a mirror and their transfer matrices.
//!
//! A [`Layer`] is a closed set of variants, each with its own parameters.
//! Every variant answers the same three questions for a given
//! [`OpticalContext`]: its thickness, its complex refractive index and its
//! transfer matrix. Thicknesses are in nm, energies in eV.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::error::{MirrorError, Result};
use crate::matrix::{TransferMatrix, C64};
use crate::metal::{maxwell_garnett, Materials, MetalModel};
use crate::mie::{self, MieOrder};
use crate::permittivity::{self, eps_to_n, EpsType};
use crate::persson::{sheet_matrix, SheetGeometry};
use crate::snell::cos_theta_in_layer;
use crate::state::{OpticalContext, Polarization};


/// Exciton resonance of an excitonic layer. Energies in eV.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Exciton {
    /// Resonance energy.
    pub w0: f64,
    /// Radiative decay rate.
    pub gamma0: f64,
    /// Non-radiative decay rate.
    pub gamma: f64,
}

impl Exciton {
    /// Resonance factor `S = gamma0_eff / ((E - w0) + i gamma)`.
    fn response(&self, energy: f64, cos_theta: C64, polarization: Polarization) -> C64 {
        let gamma0 = match polarization {
            Polarization::P => self.gamma0 * cos_theta.re,
            Polarization::S => self.gamma0 * (1.0 / cos_theta).re,
        };
        gamma0 / C64::new(energy - self.w0, self.gamma)
    }

    /// Transfer matrix of a layer with phase `phi` hosting the exciton.
    fn matrix(&self, phi: C64, energy: f64, cos_theta: C64, polarization: Polarization) -> TransferMatrix {
        let i = C64::i();
        let s = self.response(energy, cos_theta, polarization);
        TransferMatrix::new(
            (i * phi).exp() * (1.0 - i * s),
            -i * s,
            i * s,
            (-i * phi).exp() * (1.0 + i * s),
        )
    }
}

/// One layer of a mirror, or one of its semi-infinite bounding media.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Layer {
    ConstRefractiveIndex {
        d: f64,
        n: C64,
    },
    #[serde(rename = "gaas")]
    GaAs {
        d: f64,
        eps_type: EpsType,
    },
    #[serde(rename = "algaas")]
    AlGaAs {
        d: f64,
        k: f64,
        x: f64,
        eps_type: EpsType,
    },
    ConstRefractiveIndexExcitonic {
        d: f64,
        n: C64,
        exciton: Exciton,
    },
    #[serde(rename = "gaas_excitonic")]
    GaAsExcitonic {
        d: f64,
        eps_type: EpsType,
        exciton: Exciton,
    },
    #[serde(rename = "algaas_excitonic")]
    AlGaAsExcitonic {
        d: f64,
        k: f64,
        x: f64,
        eps_type: EpsType,
        exciton: Exciton,
    },
    /// Metal clusters in AlGaAs, mixed with Maxwell-Garnett.
    EffectiveMedium {
        d: f64,
        k: f64,
        x: f64,
        f: f64,
        eps_type: EpsType,
        metal: MetalModel,
    },
    /// A single sheet of metal clusters of diameter `d` in AlGaAs, on a square
    /// lattice of period `lattice_factor * d`. Has no thickness of its own.
    TwoDimensional {
        d: f64,
        k: f64,
        x: f64,
        lattice_factor: f64,
        eps_type: EpsType,
        metal: MetalModel,
    },
    /// AlGaAs with dispersed clusters of `radius` that also reports Mie
    /// extinction and scattering.
    Mie {
        d: f64,
        k: f64,
        x: f64,
        f: f64,
        eps_type: EpsType,
        metal: MetalModel,
        radius: f64,
        order: MieOrder,
    },
}

/// Per-sample optical data of a layer inside a mirror.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerOptics {
    pub n: C64,
    /// Cosine of the refraction angle in this layer.
    pub cos_theta: C64,
    pub matrix: TransferMatrix,
}

impl Layer {
    /// A semi-infinite medium of constant index.
    pub fn medium(n: C64) -> Self {
        Layer::ConstRefractiveIndex { d: f64::INFINITY, n }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Layer::ConstRefractiveIndex { .. } => "ConstRefractiveIndex",
            Layer::GaAs { .. } => "GaAs",
            Layer::AlGaAs { .. } => "AlGaAs",
            Layer::ConstRefractiveIndexExcitonic { .. } => "ConstRefractiveIndexExcitonic",
            Layer::GaAsExcitonic { .. } => "GaAsExcitonic",
            Layer::AlGaAsExcitonic { .. } => "AlGaAsExcitonic",
            Layer::EffectiveMedium { .. } => "EffectiveMedium",
            Layer::TwoDimensional { .. } => "TwoDimensional",
            Layer::Mie { .. } => "Mie",
        }
    }

    /// Thickness in nm. Sheets of clusters have zero thickness.
    pub fn d(&self) -> f64 {
        match self {
            Layer::TwoDimensional { .. } => 0.0,
            Layer::ConstRefractiveIndex { d, .. }
            | Layer::GaAs { d, .. }
            | Layer::AlGaAs { d, .. }
            | Layer::ConstRefractiveIndexExcitonic { d, .. }
            | Layer::GaAsExcitonic { d, .. }
            | Layer::AlGaAsExcitonic { d, .. }
            | Layer::EffectiveMedium { d, .. }
            | Layer::Mie { d, .. } => *d,
        }
    }

    /// Checks the layer parameters are physically meaningful.
    pub fn validate(&self) -> Result<()> {
        let d = match self {
            Layer::TwoDimensional { d, .. } => *d,
            _ => self.d(),
        };
        if d.is_nan() || d < 0.0 {
            return Err(MirrorError::InvalidParameter { name: "d", value: d });
        }
        match self {
            Layer::AlGaAs { x, k, .. } | Layer::AlGaAsExcitonic { x, k, .. } => check_alloy(*x, *k),
            Layer::EffectiveMedium { x, k, f, .. } => {
                check_alloy(*x, *k)?;
                check_range("f", *f, 0.0, 1.0)
            }
            Layer::TwoDimensional {
                d, x, k, lattice_factor, ..
            } => {
                check_alloy(*x, *k)?;
                if !(*d > 0.0) {
                    return Err(MirrorError::InvalidParameter { name: "d", value: *d });
                }
                check_range("lattice_factor", *lattice_factor, 1.0, f64::INFINITY)
            }
            Layer::Mie { x, k, f, radius, .. } => {
                check_alloy(*x, *k)?;
                check_range("f", *f, 0.0, 1.0)?;
                if !(*radius > 0.0) {
                    return Err(MirrorError::InvalidParameter {
                        name: "radius",
                        value: *radius,
                    });
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Complex refractive index at the context wavelength.
    pub fn n(&self, ctx: &OpticalContext, materials: &Materials) -> Result<C64> {
        match self {
            Layer::ConstRefractiveIndex { n, .. } | Layer::ConstRefractiveIndexExcitonic { n, .. } => {
                Ok(*n)
            }
            Layer::GaAs { eps_type, .. } | Layer::GaAsExcitonic { eps_type, .. } => {
                permittivity::refractive_index(ctx.energy(), 0.0, 0.0, *eps_type, &materials.intersections)
            }
            Layer::AlGaAs { k, x, eps_type, .. }
            | Layer::AlGaAsExcitonic { k, x, eps_type, .. }
            | Layer::TwoDimensional { k, x, eps_type, .. }
            | Layer::Mie { k, x, eps_type, .. } => {
                permittivity::refractive_index(ctx.energy(), *x, *k, *eps_type, &materials.intersections)
            }
            Layer::EffectiveMedium {
                k,
                x,
                f,
                eps_type,
                metal,
                ..
            } => {
                let eps_matrix =
                    permittivity::permittivity(ctx.energy(), *x, *k, *eps_type, &materials.intersections)?;
                let eps_metal = materials.metal_permittivity(metal, ctx)?;
                Ok(eps_to_n(maxwell_garnett(eps_matrix, eps_metal, *f)))
            }
        }
    }

    /// Complex permittivity `n^2` at the context wavelength.
    pub fn permittivity(&self, ctx: &OpticalContext, materials: &Materials) -> Result<C64> {
        let n = self.n(ctx, materials)?;
        Ok(n * n)
    }

    /// Index, refraction cosine and transfer matrix of this layer for light
    /// entering the mirror from a medium of index `n_left`.
    pub fn optics(&self, ctx: &OpticalContext, materials: &Materials, n_left: C64) -> Result<LayerOptics> {
        let n = self.n(ctx, materials)?;
        let cos_theta = cos_theta_in_layer(n_left, n, ctx.angle);
        let phi = phase(ctx.wavelength, self.d(), n, cos_theta);
        let matrix = match self {
            Layer::ConstRefractiveIndexExcitonic { exciton, .. }
            | Layer::GaAsExcitonic { exciton, .. }
            | Layer::AlGaAsExcitonic { exciton, .. } => {
                exciton.matrix(phi, ctx.energy(), cos_theta, ctx.polarization)
            }
            Layer::TwoDimensional {
                d,
                k,
                x,
                lattice_factor,
                eps_type,
                metal,
            } => {
                let geometry = SheetGeometry {
                    diameter: *d,
                    lattice_factor: *lattice_factor,
                };
                let eps_matrix =
                    permittivity::permittivity(ctx.energy(), *x, *k, *eps_type, &materials.intersections)?;
                let eps_metal = materials.metal_permittivity(metal, ctx)?;
                let (r, t) = geometry.reflection_transmission(
                    ctx.wavelength,
                    eps_matrix,
                    eps_metal,
                    cos_theta,
                    ctx.polarization,
                );
                sheet_matrix(r, t)
            }
            _ => propagation(phi),
        };
        Ok(LayerOptics { n, cos_theta, matrix })
    }

    /// Mie `(extinction, scattering)` coefficients in cm^-1 of a Mie layer.
    pub fn mie_coefficients(&self, ctx: &OpticalContext, materials: &Materials) -> Result<(f64, f64)> {
        match self {
            Layer::Mie {
                k,
                x,
                f,
                eps_type,
                metal,
                radius,
                order,
                ..
            } => {
                let eps_matrix =
                    permittivity::permittivity(ctx.energy(), *x, *k, *eps_type, &materials.intersections)?;
                let eps_metal = materials.metal_permittivity(metal, ctx)?;
                mie::coefficients(*order, ctx.wavelength, eps_matrix, eps_metal, *f, *radius)
            }
            other => Err(MirrorError::NotAMieLayer(other.name().to_string())),
        }
    }
}

fn check_range(name: &'static str, value: f64, min: f64, max: f64) -> Result<()> {
    if value >= min && value <= max {
        Ok(())
    } else {
        Err(MirrorError::InvalidParameter { name, value })
    }
}

fn check_alloy(x: f64, k: f64) -> Result<()> {
    check_range("x", x, 0.0, 1.0)?;
    check_range("k", k, 0.0, f64::INFINITY)
}

/// Phase thickness `2 pi d / lambda * n * cos`, on the decaying branch.
pub fn phase(wavelength: f64, d: f64, n: C64, cos_theta: C64) -> C64 {
    let phi = 2.0 * PI * d / wavelength * n * cos_theta;
    if phi.im < 0.0 {
        -phi
    } else {
        phi
    }
}

/// Propagation matrix `diag(exp(i phi), exp(-i phi))`.
pub fn propagation(phi: C64) -> TransferMatrix {
    let i = C64::i();
    let mut m = TransferMatrix::zeros();
    m[(0, 0)] = (i * phi).exp();
    m[(1, 1)] = (-i * phi).exp();
    m
}
