#![allow(dead_code)]

pub mod client;
pub mod errors;
pub mod model;
pub mod snapshot;
pub mod stratum;

pub use client::BrowserClient;
pub use errors::BrowserError;
pub use stratum::BrowserStratum;
