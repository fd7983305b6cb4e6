use anyhow::{anyhow, Context, Result};
use clap::Parser;
use config::{Config, Environment, File, FileFormat};
use log::info;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::MirrorError;
use crate::gauss::GaussTable;
use crate::layer::Layer;
use crate::matrix::C64;
use crate::metal::{Materials, SbPermittivity};
use crate::mirror::Mirror;
use crate::permittivity::EpsType;
use crate::state::{OpticalContext, Polarization, Regime};
use crate::structure::Structure;
use crate::sweep::{Sweep, WavelengthRange};


fn default_true() -> bool {
    true
}

fn default_output() -> PathBuf {
    PathBuf::from("output")
}

/// A semi-infinite medium bounding the structure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Medium {
    Air,
    #[serde(rename = "gaas")]
    GaAs { eps_type: EpsType },
    Custom { n: C64 },
}

impl Medium {
    pub fn to_layer(&self) -> Layer {
        match self {
            Medium::Air => Layer::medium(C64::new(1.0, 0.0)),
            Medium::GaAs { eps_type } => Layer::GaAs {
                d: f64::INFINITY,
                eps_type: *eps_type,
            },
            Medium::Custom { n } => Layer::medium(*n),
        }
    }
}

/// Runtime configuration for a sweep.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    pub wavelength: WavelengthRange,
    /// Incidence angle in degrees.
    pub angle: f64,
    pub polarization: Polarization,
    pub regime: Regime,
    pub left: Medium,
    pub right: Medium,
    pub structure: Structure,
    /// Antimony permittivity table replacing the bundled one.
    #[serde(default)]
    pub sb_data: Option<PathBuf>,
    /// Gauss coefficient table replacing the built-in one.
    #[serde(default)]
    pub gauss_data: Option<PathBuf>,
    #[serde(default = "default_output")]
    pub output: PathBuf,
    #[serde(default = "default_true")]
    pub parallel: bool,
    #[serde(default = "default_true")]
    pub progress: bool,
}

impl Settings {
    /// Parses settings from a TOML document alone, without other sources.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Config::builder()
            .add_source(File::from_str(text, FileFormat::Toml))
            .build()
            .context("Error loading configuration")?
            .try_deserialize()
            .context("Error deserializing configuration")
    }

    /// Checks every precondition of a sweep, in order of appearance.
    pub fn validate(&self) -> std::result::Result<(), MirrorError> {
        self.wavelength.validate()?;
        OpticalContext::new(self.wavelength.from, self.angle, self.polarization)?;
        self.structure.validate()?;
        self.left.to_layer().validate()?;
        self.right.to_layer().validate()?;
        if self.regime.requires_single_layer() && self.structure.layer_count() != 1 {
            return Err(MirrorError::SingleLayerRegime {
                regime: self.regime.to_string(),
                layers: self.structure.layer_count(),
            });
        }
        Ok(())
    }

    pub fn materials(&self) -> Result<Materials> {
        let sb = match &self.sb_data {
            Some(path) => SbPermittivity::from_file(path)?,
            None => SbPermittivity::bundled()?,
        };
        let materials = Materials::new(Some(sb));
        match &self.gauss_data {
            Some(path) => Ok(materials.with_gauss_table(GaussTable::from_file(path)?)),
            None => Ok(materials),
        }
    }

    pub fn build_mirror(&self) -> Result<Mirror> {
        self.validate()?;
        let mirror = Mirror::new(
            self.structure.clone(),
            self.left.to_layer(),
            self.right.to_layer(),
            Arc::new(self.materials()?),
        )?;
        Ok(mirror)
    }

    pub fn build_sweep(&self) -> Result<Sweep> {
        let sweep = Sweep::new(
            self.build_mirror()?,
            self.wavelength,
            self.angle,
            self.polarization,
            self.regime,
        )?
        .parallel(self.parallel)
        .progress(self.progress);
        Ok(sweep)
    }

    /// Overrides values with those given on the command line.
    pub fn apply_args(&mut self, args: &CliArgs) {
        if let Some(from) = args.from {
            self.wavelength.from = from;
        }
        if let Some(to) = args.to {
            self.wavelength.to = to;
        }
        if let Some(step) = args.step {
            self.wavelength.step = step;
        }
        if let Some(angle) = args.angle {
            self.angle = angle;
        }
        if let Some(polarization) = args.polarization {
            self.polarization = polarization;
        }
        if let Some(regime) = args.regime {
            self.regime = regime;
        }
        if let Some(output) = &args.output {
            self.output = output.clone();
        }
        if args.sequential {
            self.parallel = false;
        }
        if args.no_progress {
            self.progress = false;
        }
    }
}

pub fn load_default_config() -> Result<Settings> {
    let root = retrieve_project_root()?;
    let default_config_file = root.join("config/default.toml");

    let settings: Settings = Config::builder()
        .add_source(File::from(default_config_file).required(true))
        .build()
        .context("Error loading configuration")?
        .try_deserialize()
        .context("Error deserializing configuration")?;

    settings.validate()?;
    Ok(settings)
}

/// Loads settings from the default file, a local override file, an optional
/// file given with `--config`, `MIRROR_` environment variables and the command
/// line, in increasing priority.
pub fn load_config() -> Result<Settings> {
    load_config_with(&CliArgs::parse())
}

pub fn load_config_with(args: &CliArgs) -> Result<Settings> {
    let root = retrieve_project_root()?;
    let default_config_file = root.join("config/default.toml");
    let local_config = root.join("config/local.toml");

    let mut builder = Config::builder().add_source(File::from(default_config_file).required(true));
    if local_config.exists() {
        info!("Using local configuration: {:?}", local_config);
        builder = builder.add_source(File::from(local_config).required(true));
    }
    if let Some(path) = &args.config {
        info!("Using configuration: {:?}", path);
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    let mut settings: Settings = builder
        .add_source(
            Environment::with_prefix("MIRROR")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()
        .context("Error loading configuration")?
        .try_deserialize()
        .context("Error deserializing configuration")?;

    settings.apply_args(args);
    settings.validate()?;
    Ok(settings)
}

/// Retrieve the project root directory.
/// This function tries to find the project root directory in different ways:
/// 1. If the CARGO_MANIFEST_DIR environment variable is set, use it.
/// 2. If the MIRROR_ROOT_DIR environment variable is set, use it.
/// 3. If the "config" subdirectory is found in the executable directory or any of its parents, use it.
fn retrieve_project_root() -> Result<PathBuf> {
    if let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") {
        return Ok(PathBuf::from(manifest_dir));
    }
    if let Ok(path) = env::var("MIRROR_ROOT_DIR") {
        return Ok(PathBuf::from(path));
    }
    let exe_path = env::current_exe().context("Failed to get current executable path")?;
    exe_path
        .ancestors()
        .skip(1)
        .find(|dir| dir.join("config").is_dir())
        .map(Path::to_path_buf)
        .ok_or_else(|| anyhow!("Could not find project root directory"))
}

#[derive(Parser, Debug)]
#[command(version, about = "mirror - transfer-matrix optics of multilayer mirrors")]
pub struct CliArgs {
    /// First wavelength of the sweep in nm.
    #[arg(long)]
    pub from: Option<f64>,

    /// Last wavelength of the sweep in nm (inclusive).
    #[arg(long)]
    pub to: Option<f64>,

    /// Wavelength step in nm.
    #[arg(long)]
    pub step: Option<f64>,

    /// Incidence angle in degrees, in [0, 90).
    #[arg(short, long)]
    pub angle: Option<f64>,

    /// Polarization of the incident wave.
    #[arg(short, long, value_enum, ignore_case = true)]
    pub polarization: Option<Polarization>,

    /// Quantity to compute at every wavelength.
    #[arg(short, long, value_enum)]
    pub regime: Option<Regime>,

    /// Additional TOML configuration file, applied over the default one.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output directory.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Evaluate the wavelengths one after another on the current thread.
    #[arg(long)]
    pub sequential: bool,

    /// Do not draw a progress bar.
    #[arg(long)]
    pub no_progress: bool,
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Settings:
  - Wavelength: {:.3} to {:.3} nm, step {:.3} nm
  - Angle: {:.3} deg
  - Polarization: {:?}
  - Regime: {}
  - Left medium: {:?}
  - Right medium: {:?}
  - Blocks: {}, layers: {}
  ",
            self.wavelength.from,
            self.wavelength.to,
            self.wavelength.step,
            self.angle,
            self.polarization,
            self.regime,
            self.left,
            self.right,
            self.structure.blocks.len(),
            self.structure.layer_count(),
        )
    }
}
