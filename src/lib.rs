//! Transfer-matrix optics of multilayer mirrors.
//!
//! A [`mirror::Mirror`] is a stack of AlGaAs, excitonic and metal-cluster
//! layers between two semi-infinite media. A [`sweep::Sweep`] evaluates its
//! reflectance, transmittance or absorbance, or the optical constants of a
//! single layer, over a range of wavelengths.

pub mod adachi;
pub mod config;
pub mod error;
pub mod fresnel;
pub mod gauss;
pub mod layer;
pub mod matrix;
pub mod metal;
pub mod mie;
pub mod mirror;
pub mod output;
pub mod permittivity;
pub mod persson;
pub mod result;
pub mod settings;
pub mod snell;
pub mod state;
pub mod structure;
pub mod sweep;
