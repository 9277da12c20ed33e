pub mod assemble;
pub mod attacks;
pub mod config;
#[path = "duckdb/mod.rs"]
mod duckdb_impl;
pub mod error;
pub mod features;
pub mod functions;
pub mod header;
pub mod log;
pub mod phase;
pub mod reader;
pub mod replay;
pub mod snapshot;
pub mod types;
pub mod visitor;

#[cfg(test)]
mod fixtures;
