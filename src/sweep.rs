//! Wavelength sweeps over a mirror.
//!
//! A sweep evaluates one regime of a [`Mirror`] at evenly spaced wavelengths.
//! Every sample carries its own [`OpticalContext`], so samples are independent
//! and are evaluated in parallel with rayon by default. Results are collected
//! by sample index, never appended, so their order does not depend on
//! scheduling.
//!
//! All preconditions (wavelength range, incidence angle, regime against the
//! structure) are checked when the sweep is built, so an invalid request fails
//! before any sample is computed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{MirrorError, Result};
use crate::mirror::Mirror;
use crate::result::{Sample, SweepResult};
use crate::state::{OpticalContext, Polarization, Regime};


/// Inclusive wavelength range in nm, sampled every `step`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WavelengthRange {
    pub from: f64,
    pub to: f64,
    pub step: f64,
}

impl WavelengthRange {
    pub fn new(from: f64, to: f64, step: f64) -> Result<Self> {
        let range = Self { from, to, step };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> Result<()> {
        let reason = if !(self.from >= 0.0) {
            Some("from must be non-negative")
        } else if !(self.to > 0.0) {
            Some("to must be positive")
        } else if !(self.step > 0.0) {
            Some("step must be positive")
        } else if self.from >= self.to {
            Some("from must be smaller than to")
        } else if self.step >= self.to {
            Some("step must be smaller than to")
        } else {
            None
        };
        match reason {
            Some(reason) => Err(MirrorError::InvalidWavelengthRange {
                from: self.from,
                to: self.to,
                step: self.step,
                reason,
            }),
            None => Ok(()),
        }
    }

    /// Number of samples, `floor((to - from) / step) + 1`.
    pub fn count(&self) -> usize {
        // tolerate the rounding of steps like 0.1
        ((self.to - self.from) / self.step + 1e-9).floor() as usize + 1
    }

    pub fn wavelengths(&self) -> Vec<f64> {
        (0..self.count())
            .map(|i| self.from + i as f64 * self.step)
            .collect()
    }
}

/// Cooperative cancellation flag shared between a sweep and its controller.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// A validated sweep of one regime over a wavelength range.
#[derive(Debug, Clone)]
pub struct Sweep {
    mirror: Mirror,
    range: WavelengthRange,
    base: OpticalContext,
    regime: Regime,
    parallel: bool,
    progress: bool,
}

impl Sweep {
    /// Validates the request. `angle` is the incidence angle in degrees.
    pub fn new(
        mirror: Mirror,
        range: WavelengthRange,
        angle: f64,
        polarization: Polarization,
        regime: Regime,
    ) -> Result<Self> {
        range.validate()?;
        let base = OpticalContext::new(range.from, angle, polarization)?;
        mirror.check_regime(regime)?;
        Ok(Self {
            mirror,
            range,
            base,
            regime,
            parallel: true,
            progress: true,
        })
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn mirror(&self) -> &Mirror {
        &self.mirror
    }

    pub fn regime(&self) -> Regime {
        self.regime
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] {bar:40.green/blue} {pos:>5}/{len:5} {msg} ETA: {eta_precise}",
        ) {
            pb.set_style(style.progress_chars("█▇▆▅▄▃▂▁"));
        }
        pb.set_message(self.regime.to_string());
        pb
    }

    fn sample(&self, wavelength: f64, token: &CancellationToken, pb: &ProgressBar) -> Result<Sample> {
        if token.is_cancelled() {
            return Err(MirrorError::Cancelled);
        }
        let sample = self.mirror.compute(self.regime, &self.base.at_wavelength(wavelength)?);
        pb.inc(1);
        sample
    }

    /// Computes every sample. The first error aborts the sweep.
    pub fn run(&self, token: &CancellationToken) -> Result<SweepResult> {
        let start = Instant::now();
        let wavelengths = self.range.wavelengths();
        info!(
            "sweeping {} over {} wavelengths from {} to {} nm",
            self.regime,
            wavelengths.len(),
            self.range.from,
            self.range.to
        );

        let pb = self.progress_bar(wavelengths.len());
        let samples = if self.parallel {
            wavelengths
                .par_iter()
                .map(|wavelength| self.sample(*wavelength, token, &pb))
                .collect::<Result<Vec<Sample>>>()
        } else {
            wavelengths
                .iter()
                .map(|wavelength| self.sample(*wavelength, token, &pb))
                .collect::<Result<Vec<Sample>>>()
        };
        pb.finish_and_clear();
        let samples = samples?;

        let duration = start.elapsed();
        info!(
            "sweep finished in {:.2?} ({:.2?} per sample)",
            duration,
            duration / samples.len().max(1) as u32
        );
        debug!(
            "{} Adachi/Gauss intersection searches",
            self.mirror.materials().intersections.searches()
        );
        Ok(SweepResult::from_samples(self.regime, wavelengths, samples))
    }
}
