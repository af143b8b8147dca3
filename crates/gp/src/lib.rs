//! This library implements
//! [Gaussian Process](https://en.wikipedia.org/wiki/Gaussian_process) regression
//! with a zero prior mean and a stationary covariance kernel, providing for any
//! query point a posterior mean and a standard deviation used as an uncertainty estimate.
//!
//! GP methods are implemented by [GaussianProcess] parameterized by [GpParams],
//! following the [linfa](https://github.com/rust-ml/linfa) `ParamGuard`/`Fit` conventions.
//! [GpRegressor] wraps them for callers refitting the same model on growing data.
//!
//! Kernels are available in the [correlation_models] module, either as dedicated types
//! or selected at runtime with [Kernel](correlation_models::Kernel).
#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
mod algorithm;
pub mod correlation_models;
mod errors;
mod parameters;
mod regressor;
mod utils;

mod optimization;

pub use algorithm::*;
pub use errors::*;
pub use parameters::*;
pub use regressor::*;
pub use utils::PairDistances;
