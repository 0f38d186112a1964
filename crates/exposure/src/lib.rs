//! # exposure
//!
//! Portfolio risk-factor exposure: value weights from share holdings, a
//! static-weight monthly return series, and an OLS regression of excess
//! returns on the Fama-French market, size and value factors.
//!
//! This crate provides a unified interface to the exposure workspace.
//! Individual components can be enabled via feature flags.
//!
//! ## Features
//!
//! - `full` (default): Enables all components
//! - `primitives`: Core type definitions
//! - `traits`: Price source and factor model abstractions
//! - `math`: Least squares and linear algebra
//! - `model`: Weights, returns, alignment and regression
//! - `data`: Factor files, positions, holdings, config and Yahoo Finance
//! - `cli`: The `exposure` binary
//!
//! ## Example
//!
//! ```rust,ignore
//! use exposure::data::{YahooPriceSource, load_factor_file, read_weights};
//! use exposure::model::{ExposurePipeline, RegressionReport, history_window};
//!
//! let factors = load_factor_file("data/raw/factors/F-F_Research_Data_Factors.csv")?;
//! let weights = read_weights("data/processed/holdings_latest.csv", 1e-6)?;
//! let source = YahooPriceSource::new()?;
//! let (start, end) = history_window(chrono::Local::now().date_naive(), 5);
//! let result = ExposurePipeline::new(&source).regress(&weights, &factors, start, end)?;
//! RegressionReport::new(&result).print_summary();
//!
//! // Or with specific features only:
//! // [dependencies]
//! // exposure = { version = "0.1", default-features = false, features = ["model"] }
//! ```

#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

// Used by the binary only.
#[cfg(feature = "cli")]
use {anyhow as _, chrono as _, clap as _, tracing as _, tracing_subscriber as _};

#[cfg(feature = "primitives")]
#[doc(inline)]
pub use exposure_primitives as primitives;
#[cfg(feature = "traits")]
#[doc(inline)]
pub use exposure_traits as traits;
#[cfg(feature = "math")]
#[doc(inline)]
pub use exposure_math as math;
#[cfg(feature = "model")]
#[doc(inline)]
pub use exposure_model as model;
#[cfg(feature = "data")]
#[doc(inline)]
pub use exposure_data as data;
