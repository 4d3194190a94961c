#![allow(dead_code)]

pub mod catalog;
pub mod message;
pub mod parser;

pub use catalog::{system_prompt, ActionDoc, CATALOG};
pub use message::{build_user_message, ContentBlock, OracleMessage};
pub use parser::parse_response;
