//! Input/Output operations for Hartree evaluations
//!
//! This module handles logging setup and result summaries.

mod output;

pub use output::{print_potential_profile, setup_output};
