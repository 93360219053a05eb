// Hartree term of a plane-wave DFT model

pub mod config;
pub mod debug;
pub mod error;
pub mod term_impl;

pub use error::HartreeError;
pub use term_impl::{
    GreenCoefficients, HartreeOutput, RealSpaceMultiplication, SpinChannels, Term, TermHartree,
    TermOutput,
};
