//! This library implements an active learning loop driven by the uncertainty
//! of a [Gaussian Process](gpal_gp) surrogate of an expensive oracle
//! (a simulation, an experiment or a robot measurement).
//!
//! Starting from a few observations, each iteration:
//! * fits a GP on the current observations,
//! * predicts the posterior mean and standard deviation over a fixed candidate set
//!   (a grid of the design space by default),
//! * queries the oracle at the candidates whose standard deviation exceeds
//!   an uncertainty threshold, after a small uniform perturbation (jitter),
//! * appends the new observations.
//!
//! The loop stops when no candidate is uncertain enough (convergence), when the
//! iteration budget is exhausted or when an iteration fails.
//! The learner comes with a set of options to:
//! * specify the initial doe (x only or evaluated \[x, y\]),
//! * choose the GP kernel and its hyperparameters tuning,
//! * specify the candidate set explicitly,
//! * seed the random generator for reproducible runs.
//!
//! # Examples
//!
//! ```no_run
//! use ndarray::{array, ArrayView1};
//! use gpal_active::{ActiveLearnerBuilder, Outcome};
//!
//! // A two-dimensional phenomenon over [0., 10.]^2
//! fn sinx_cosy(x: &ArrayView1<f64>) -> f64 {
//!     x[0].sin() * x[1].cos()
//! }
//!
//! let res = ActiveLearnerBuilder::learn(sinx_cosy)
//!             .configure(|config| config.n_doe(10).n_levels(30).max_iters(5))
//!             .within(&array![[0.0, 10.0], [0.0, 10.0]])
//!             .expect("learner configured")
//!             .run()
//!             .expect("active learning run");
//! println!("{:?} with {} observations", res.outcome, res.x_data.nrows());
//! ```
//!
//! The loop is implemented as an [argmin](https://www.argmin-rs.org) solver,
//! see [ActiveLearnerSolver].
//!
//! # Implementation notes
//!
//! * Logging is controlled by the `GPAL_LOG` environment variable (default level `info`),
//!   see [env_logger](https://docs.rs/env_logger) for the syntax.
//! * The configuration can be read from or written to JSON with
//!   [ActiveLearnerConfig::from_json] and [ActiveLearnerConfig::to_json].
//!
#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]

mod config;
mod errors;
mod learner;
pub mod sampler;
mod solver;
mod types;

pub use crate::config::*;
pub use crate::errors::*;
pub use crate::learner::*;
pub use crate::solver::*;
pub use crate::types::*;
