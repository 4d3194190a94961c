#![allow(dead_code)]

pub mod bridge;
pub mod errors;
pub mod escape;

pub use bridge::ScriptingBridge;
pub use errors::BridgeError;
pub use escape::{escape_js_string, js_literal};
