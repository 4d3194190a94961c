#![allow(dead_code)]

pub mod client;
pub mod errors;
pub mod jxa;
pub mod model;
pub mod stratum;

pub use client::AccessibilityClient;
pub use errors::AxError;
pub use model::{AxElement, AxLocator, AxSnapshot, TreeNode};
pub use stratum::AccessibilityStratum;
