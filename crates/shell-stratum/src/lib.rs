#![allow(dead_code)]

pub mod actions;
pub mod stratum;

pub use stratum::ShellStratum;
