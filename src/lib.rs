// src/lib.rs
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod lookup;
pub mod output;
pub mod resolver;
pub mod types;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

pub use cli::Args;
pub use engine::GuesserEngine;
pub use lookup::Lookup;
pub use resolver::{Resolve, UdpResolver};
pub use types::{Config, GuesserError, LookupResult, RecordKind, ResolveError, ScanReport};
