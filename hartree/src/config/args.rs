//! Command-line argument parsing for Hartree evaluations

use clap::Parser;

/// Evaluate the periodic Hartree energy and potential of a configured density
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = "hartree.yaml")]
    pub config_file: String,

    /// Override output file: (default stdout)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Override the Hartree scaling factor
    #[arg(long, allow_hyphen_values = true)]
    pub scaling_factor: Option<f64>,

    /// Override the kinetic-energy cutoff used to size the FFT grid
    #[arg(long)]
    pub ecut: Option<f64>,

    /// Build the dense kernel and report its symmetry and spectrum
    #[arg(long)]
    pub check_kernel: bool,

    /// Log at debug level (basis construction, Green's tables, discarded residues)
    #[arg(short, long)]
    pub verbose: bool,
}
