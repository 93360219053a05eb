//! Hartree Term Command-Line Interface
//!
//! Evaluates the periodic Hartree energy and potential of a density described
//! in a YAML configuration file.

use color_eyre::eyre::Result;

mod app;
mod io;

use app::HartreeApplication;

fn main() -> Result<()> {
    color_eyre::install()?;
    HartreeApplication::from_cli()?.run()
}
