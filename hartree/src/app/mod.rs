mod report;
mod runner;

pub use runner::{run_evaluation, run_kernel_check, Evaluation};

use self::report::{report_evaluation, report_kernel_spectrum};
use crate::io::setup_output;
use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use hartree::config::{Args, Config};
use std::fs;
use tracing::info;

pub struct HartreeApplication {
    args: Args,
    config: Config,
}

impl HartreeApplication {
    pub fn from_cli() -> Result<Self> {
        let args = Args::parse();
        let config = load_config(&args)?;
        Ok(Self { args, config })
    }

    pub fn run(mut self) -> Result<()> {
        setup_output(self.args.output.as_ref(), self.args.verbose)?;
        apply_overrides(&mut self.config, &self.args);
        info!("Configuration loaded:\n{:?}", self.config);

        let evaluation = run_evaluation(&self.config)?;
        report_evaluation(&evaluation);

        if self.args.check_kernel || self.config.is_kernel_check_enabled() {
            match run_kernel_check(&evaluation, self.config.kernel_check_max_points())? {
                Some(spectrum) => report_kernel_spectrum(&spectrum),
                None => info!(
                    "Skipping kernel check: {} grid points exceed the limit of {}",
                    evaluation.n_grid_points(),
                    self.config.kernel_check_max_points()
                ),
            }
        }

        Ok(())
    }
}

fn load_config(args: &Args) -> Result<Config> {
    let config_content = fs::read_to_string(&args.config_file)
        .wrap_err_with(|| format!("Unable to read configuration file: {}", args.config_file))?;

    let config = serde_yml::from_str::<Config>(&config_content)
        .wrap_err("Failed to parse configuration file")?
        .with_defaults();

    Ok(config)
}

fn apply_overrides(config: &mut Config, args: &Args) {
    if let Some(scaling_factor) = args.scaling_factor {
        info!("Overriding scaling_factor with: {}", scaling_factor);
        config.hartree.scaling_factor = Some(scaling_factor);
    }
    if let Some(ecut) = args.ecut {
        info!("Overriding ecut with: {}", ecut);
        config.grid.ecut = Some(ecut);
        config.grid.fft_size = None;
    }
}
