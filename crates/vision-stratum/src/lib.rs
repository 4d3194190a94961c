#![allow(dead_code)]

pub mod actions;
pub mod capture;
pub mod client;
pub mod context;
pub mod coords;
pub mod errors;
pub mod keycombo;
pub mod model;
pub mod ring;
pub mod stratum;

pub use client::{VisionClient, VisionConfig};
pub use errors::VisionError;
pub use stratum::VisionStratum;
