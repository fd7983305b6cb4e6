use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::Serialize;

use crate::result::SweepResult;
use crate::settings::Settings;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::C64;
    use crate::result::Sample;
    use crate::state::Regime;

    #[test]
    fn real_table() {
        let result = SweepResult::from_samples(
            Regime::Reflectance,
            vec![500.0, 500.5],
            vec![Sample::Real(0.25), Sample::Real(1.0 / 3.0)],
        );
        let mut buffer = Vec::new();
        write_table(&mut buffer, &result).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["500.00000000\t0.25000000", "500.50000000\t0.33333333"]);
    }

    #[test]
    fn complex_table() {
        let result = SweepResult::from_samples(
            Regime::RefractiveIndex,
            vec![870.0],
            vec![Sample::Complex(C64::new(3.6, -0.001))],
        );
        let mut buffer = Vec::new();
        write_table(&mut buffer, &result).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "870.00000000\t3.60000000\t-0.00100000\n");
    }

    #[test]
    fn writes_result_files() {
        let dir = std::env::temp_dir().join(format!("mirror-output-{}", std::process::id()));
        let result = SweepResult::from_samples(
            Regime::Absorbance,
            vec![600.0, 601.0],
            vec![Sample::Real(0.1), Sample::Real(0.2)],
        );
        let table = write_result(&dir, &result).unwrap();
        assert_eq!(table, dir.join("absorbance.txt"));
        assert!(table.exists());

        let json = fs::read_to_string(dir.join("absorbance.json")).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["result"]["regime"], "absorbance");
        assert_eq!(parsed["result"]["values"]["real"][1], 0.2);
        fs::remove_dir_all(&dir).unwrap();
    }
}

#[derive(Serialize)]
struct Record<'a> {
    computed_at: DateTime<Local>,
    result: &'a SweepResult,
}

/// Writes one row per sample: `wavelength<TAB>value`, or
/// `wavelength<TAB>re<TAB>im` for complex regimes.
pub fn write_table<W: Write>(writer: W, result: &SweepResult) -> Result<()> {
    let mut writer = BufWriter::new(writer);
    for row in result.table().rows() {
        let line = row
            .iter()
            .map(|value| format!("{:.8}", value))
            .collect::<Vec<_>>()
            .join("\t");
        writeln!(writer, "{}", line)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes `<regime>.txt` and `<regime>.json` into `dir`, creating it if
/// needed. Returns the path of the table.
pub fn write_result(dir: &Path, result: &SweepResult) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let table = dir.join(format!("{}.txt", result.regime));
    let file = File::create(&table).with_context(|| format!("failed to create {}", table.display()))?;
    write_table(file, result)?;

    let json = dir.join(format!("{}.json", result.regime));
    let file = File::create(&json).with_context(|| format!("failed to create {}", json.display()))?;
    let record = Record {
        computed_at: Local::now(),
        result,
    };
    serde_json::to_writer_pretty(BufWriter::new(file), &record)?;
    Ok(table)
}

/// Writes the effective settings of a run as `settings.toml` into `dir`.
pub fn write_settings(dir: &Path, settings: &Settings) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join("settings.toml");
    let text = toml::to_string_pretty(settings).context("failed to serialize settings")?;
    fs::write(&path, text).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}
