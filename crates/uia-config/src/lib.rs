#![allow(dead_code)]

pub mod errors;
pub mod loader;
pub mod model;

pub use errors::ConfigError;
pub use loader::{load, LoadedConfig, Source};
pub use model::*;
