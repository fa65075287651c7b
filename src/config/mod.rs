//! Configuration: environment-driven settings and shared constants.

mod constants;
mod settings;

pub use constants::*;
pub use settings::Config;
