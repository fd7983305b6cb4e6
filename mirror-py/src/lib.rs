use mirror::result::Values;
use mirror::settings::Settings;
use mirror::sweep::CancellationToken;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

/// Runs the sweep described by a TOML document.
///
/// Returns `(wavelengths, re, im)`. `im` is all zeros for real regimes.
#[pyfunction]
fn compute(py: Python<'_>, config_toml: &str) -> PyResult<(Vec<f64>, Vec<f64>, Vec<f64>)> {
    let to_py = |e: anyhow::Error| PyValueError::new_err(format!("{:#}", e));
    let mut settings = Settings::from_toml_str(config_toml).map_err(to_py)?;
    settings.progress = false;
    let sweep = settings.build_sweep().map_err(to_py)?;

    let result = py
        .allow_threads(|| sweep.run(&CancellationToken::new()))
        .map_err(|e| PyValueError::new_err(e.to_string()))?;

    let (re, im) = match result.values {
        Values::Real(values) => {
            let im = vec![0.0; values.len()];
            (values, im)
        }
        Values::Complex(values) => values.iter().map(|v| (v.re, v.im)).unzip(),
    };
    Ok((result.wavelengths, re, im))
}

/// Normalised settings of a TOML document, as TOML.
#[pyfunction]
fn validate(config_toml: &str) -> PyResult<String> {
    let settings = Settings::from_toml_str(config_toml)
        .and_then(|settings| {
            settings.validate()?;
            Ok(settings)
        })
        .map_err(|e| PyValueError::new_err(format!("{:#}", e)))?;
    toml::to_string_pretty(&settings).map_err(|e| PyValueError::new_err(e.to_string()))
}

#[pymodule]
fn _mirror_py(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(compute, m)?)?;
    m.add_function(wrap_pyfunction!(validate, m)?)?;
    Ok(())
}
