//! CLI command implementations.

pub mod common;
pub mod config;
pub mod delineate;
pub mod info;
