//! Output formatting and logging utilities

use color_eyre::eyre::{Result, WrapErr};
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::time::SystemTime as StdSystemTime;
use tracing::info;
use tracing_subscriber::{
    filter::LevelFilter, fmt::format::Writer, fmt::layer, fmt::time::FormatTime,
    layer::SubscriberExt, util::SubscriberInitExt, Layer, Registry,
};

/// Timestamps with second precision only
struct SecondPrecisionTimer;

impl FormatTime for SecondPrecisionTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        let now = StdSystemTime::now();
        let duration = now
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default();

        let total_seconds = duration.as_secs();
        let hours = (total_seconds / 3600) % 24;
        let minutes = (total_seconds / 60) % 60;
        let seconds = total_seconds % 60;

        write!(w, "{:02}:{:02}:{:02}", hours, minutes, seconds)
    }
}

/// Route tracing output to `output_path` (or stdout), at debug level when `verbose`.
pub fn setup_output(output_path: Option<&String>, verbose: bool) -> Result<()> {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    match output_path {
        Some(path) => {
            let log = File::create(path)
                .wrap_err_with(|| format!("Could not create output file: {}", path))?;
            let file_layer = layer()
                .with_writer(log)
                .with_timer(SecondPrecisionTimer)
                .with_ansi(false)
                .with_filter(level);
            Registry::default().with(file_layer).init();
            info!("Output will be written to: {}", path);
        }
        None => {
            let stdout_layer = layer()
                .with_writer(std::io::stdout)
                .with_timer(SecondPrecisionTimer)
                .with_ansi(true)
                .with_filter(level);
            Registry::default().with(stdout_layer).init();
        }
    }
    Ok(())
}

/// Write the potential along the first lattice direction (j = k = 0).
pub fn print_potential_profile<W: Write>(
    writer: &mut W,
    potential: &[f64],
    fft_size: [usize; 3],
) -> Result<()> {
    writeln!(writer, "Hartree potential along a1:")?;
    for i in 0..fft_size[0] {
        let x = i as f64 / fft_size[0] as f64;
        writeln!(writer, "  {:>8.4}  {:+.10e}", x, potential[i])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unwritable_output_is_an_error() {
        let path = String::from("/nonexistent-hartree-dir/run.log");
        assert!(setup_output(Some(&path), false).is_err());
    }

    #[test]
    fn test_potential_profile_lists_first_axis() {
        let mut buffer = Vec::new();
        print_potential_profile(&mut buffer, &[1.0, -2.0, 3.0, 0.0, 0.0, 0.0], [3, 2, 1]).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text.lines().count(), 4);
        assert!(text.contains("-2.0000000000e0"));
    }
}
