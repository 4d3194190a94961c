#![allow(dead_code)]

pub mod errors;
pub mod model;
pub mod observer;

pub use errors::ObserverError;
pub use model::ObserveInputs;
pub use observer::Observer;
