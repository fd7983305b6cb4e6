//! Error types for mirror computations.
//!
//! Every fatal precondition of the engine has its own variant so that callers
//! can present a precise diagnostic. Numeric edge cases that have a well
//! defined recovery (clamping, branch selection) are handled inside the models
//! and never surface here.

use thiserror::Error;

/// Errors raised while validating input or evaluating the optical models.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MirrorError {
    #[error("Incidence angle must be in [0, 90) degrees, got {0}")]
    InvalidAngle(f64),

    #[error("Sample wavelength must be positive and finite, got {0} nm")]
    InvalidWavelength(f64),

    #[error("Invalid wavelength range from={from} to={to} step={step}: {reason}")]
    InvalidWavelengthRange {
        from: f64,
        to: f64,
        step: f64,
        reason: &'static str,
    },

    #[error("Structure contains no blocks")]
    EmptyStructure,

    #[error("Block {0} contains no layers")]
    EmptyBlock(usize),

    #[error("Block {index} has repeat count {repeat}, expected a positive integer")]
    InvalidRepeat { index: usize, repeat: usize },

    #[error("Layer {layer} of block {block} has an infinite thickness")]
    InfiniteThickness { block: usize, layer: usize },

    #[error("Regime {regime} requires a structure with exactly one layer, found {layers}")]
    SingleLayerRegime { regime: String, layers: usize },

    #[error("Regime {0} requires a Mie layer")]
    NotAMieLayer(String),

    #[error("Layer parameter {name} is out of range: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("Tabulated permittivity dataset is not available")]
    DatasetUnavailable,

    #[error("Tabulated permittivity dataset contains no data points")]
    EmptyDataset,

    #[error("Failed to parse tabulated dataset at line {line}: {reason}")]
    DatasetParse { line: usize, reason: String },

    #[error("Invalid Gauss coefficient table: {0}")]
    InvalidGaussTable(String),

    #[error("Mie size parameter too large: {required} series terms needed, limit is {limit}")]
    MieSizeParameterTooLarge { required: usize, limit: usize },

    #[error("No Adachi/Gauss intersection in [{from}, {to}] eV for x = {x}")]
    NoIntersection { x: f64, from: f64, to: f64 },

    #[error("Computation cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, MirrorError>;
