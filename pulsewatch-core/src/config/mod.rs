//! Configuration types
//!
//! Board-agnostic monitor settings, with defaults matching the deployed
//! wearable and a parser for the TOML subset used by `monitor.toml`.

pub mod parser;
pub mod types;

pub use parser::{parse_config, ParseError};
pub use types::*;
