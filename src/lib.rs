//! `gpal` is a toolbox for gaussian process based active learning.
//!
//! It gathers the following crates:
//! * [doe](gpal_doe): sampling methods (random designs and candidate grids),
//! * [gp](gpal_gp): gaussian process regression with uncertainty estimates,
//! * [active](gpal_active): the uncertainty driven active learning loop.
//!
//! ```no_run
//! use gpal::ActiveLearnerBuilder;
//! use ndarray::{array, ArrayView1};
//!
//! fn sinx(x: &ArrayView1<f64>) -> f64 {
//!     x[0].sin()
//! }
//!
//! let res = ActiveLearnerBuilder::learn(sinx)
//!     .configure(|config| config.seed(42))
//!     .within(&array![[0., 10.]])
//!     .expect("learner configured")
//!     .run()
//!     .expect("active learning run");
//! println!("{:?}: {} observations", res.outcome, res.x_data.nrows());
//! ```
#![warn(missing_docs)]

pub use gpal_active::*;
pub use gpal_doe as doe;
pub use gpal_gp as gp;
