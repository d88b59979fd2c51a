//! Configuration for the twave delineator.
//!
//! A flat table of typed properties (key, type, default, description) persisted as
//! TOML, validated and converted into [`DelineationParams`](twave_delineator::DelineationParams).
//!
//! # Features
//!
//! - **Property table**: every tunable threshold with its type and description
//! - **TOML**: load and save partial or complete configuration files
//! - **Threshold codec**: the slur-classifier table as `"a,b,c_d,e,f_g,h,i"`
//! - **Paths**: platform-specific default configuration location
//!
//! # Example
//!
//! ```rust
//! use twave_config::DelineatorConfig;
//!
//! let config = DelineatorConfig::from_toml("minPoints = 8\ncandidateFinder = 2").unwrap();
//! let params = config.to_params().unwrap();
//! assert_eq!(params.min_points, 8);
//! ```

mod config;
mod error;
mod thresholds;

/// Platform-specific configuration paths.
pub mod paths;

/// The typed property table.
pub mod property;

pub use config::DelineatorConfig;
pub use error::{ConfigError, Result};
pub use paths::{default_config_path, user_config_dir};
pub use property::{PropertySpec, PropertyType, PropertyValue, properties, property};
pub use thresholds::{format_thresholds, parse_thresholds};
