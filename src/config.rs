/// Conversion factor between photon energy in eV and wavelength in nm.
pub const EV_NM: f64 = 1239.8;
/// Nanometres per centimetre, used to express volumetric coefficients in cm^-1.
pub const NM_PER_CM: f64 = 1e7;
/// Floor for Gaussian-broadened widths to keep the excitonic square roots off their branch cut.
pub const GAUSS_BROADENING_FLOOR: f64 = 1e-6;
/// Relative precision at which the exciton Rydberg series is truncated.
pub const EXCITON_SERIES_PRECISION: f64 = 1e-4;
/// Hard cap on exciton series terms, reached only for degenerate inputs.
pub const EXCITON_SERIES_MAX_TERMS: usize = 10_000;
/// Lower bound of the Adachi/Gauss intersection search window (eV).
pub const INTERSECTION_FROM: f64 = 1.4;
/// Upper bound of the Adachi/Gauss intersection search window (eV).
pub const INTERSECTION_TO: f64 = 1.8;
/// Step of the Adachi/Gauss intersection search (eV).
pub const INTERSECTION_STEP: f64 = 0.001;
/// Decimal places kept for each search energy to avoid accumulated float drift.
pub const INTERSECTION_DECIMALS: i32 = 7;
/// Maximum number of terms allowed in the full Mie series.
pub const MIE_MAX_TERMS: usize = 5000;
/// Lattice sum of `1/r^3` over a square lattice with unit spacing.
pub const PERSSON_LATTICE_SUM: f64 = 9.03;
