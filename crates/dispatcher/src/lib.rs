#![allow(dead_code)]

pub mod dispatcher;
pub mod error;
pub mod metrics;
pub mod process_name;

pub use dispatcher::Dispatcher;
pub use error::StratumErrorKind;
