//! Active learner implementation as a [argmin::core::Solver] to be used to benefit from
//! features coming with the argmin framework such as observers.
//!
//! Note: Depending on your need you can either use the `ActiveLearnerSolver` or the provided
//! `ActiveLearnerBuilder` which allows to build an `ActiveLearner` struct which wraps the
//! `argmin::Executor` running an `ActiveLearnerSolver` on `OracleFunc`.
//! See [`crate::ActiveLearnerBuilder`]
//!
//! ```no_run
//! use ndarray::{array, ArrayView1};
//! use gpal_active::{ActiveLearnerConfig, ActiveLearnerSolver, OracleFunc};
//! use linfa::ParamGuard;
//! use argmin::core::Executor;
//!
//! fn sinx(x: &ArrayView1<f64>) -> f64 {
//!     x[0].sin()
//! }
//! let xlimits = array![[0., 10.]];
//! let config = ActiveLearnerConfig::default()
//!     .seed(42)
//!     .check()
//!     .expect("configuration validated");
//! let solver = ActiveLearnerSolver::new(config, &xlimits).expect("solver");
//! let res = Executor::new(OracleFunc::new(sinx), solver)
//!     .run()
//!     .unwrap();
//! println!("Learnt from {} observations", res.state.n_observations());
//! ```
use crate::config::ValidActiveLearnerConfig;
use crate::sampler::evaluate;
use crate::{IterationRecord, LearnerState};

use gpal_doe::Random;
use log::{debug, info, warn};
use ndarray::{concatenate, s, Array1, Array2, Axis};

use argmin::core::{CostFunction, Problem, Solver, State, TerminationReason, TerminationStatus, KV};

use ndarray_rand::rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Implementation of `argmin::core::Solver` for the active learner.
/// Therefore this structure can be used with `argmin::core::Executor` and benefit
/// from observers feature.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActiveLearnerSolver {
    pub(crate) config: ValidActiveLearnerConfig,
    /// Matrix (nx, 2) of [lower bound, upper bound] of the nx components of x
    pub(crate) xlimits: Array2<f64>,
    /// Candidate locations (nc, nx) scanned for uncertainty at each iteration
    pub(crate) candidates: Array2<f64>,
}

impl<O> Solver<O, LearnerState<f64>> for ActiveLearnerSolver
where
    O: CostFunction<Param = Array1<f64>, Output = f64>,
{
    const NAME: &'static str = "ActiveLearner";

    fn init(
        &mut self,
        problem: &mut Problem<O>,
        state: LearnerState<f64>,
    ) -> std::result::Result<(LearnerState<f64>, Option<KV>), argmin::core::Error> {
        let mut rng = if let Some(seed) = self.config.seed {
            Xoshiro256Plus::seed_from_u64(seed)
        } else {
            Xoshiro256Plus::from_entropy()
        };
        let nx = self.xlimits.nrows();

        let (x_data, y_data) = if let Some(doe) = self.config.doe.as_ref() {
            if doe.ncols() == nx {
                // only x are specified
                info!("Compute initial DOE on specified {} points", doe.nrows());
                (doe.to_owned(), evaluate(problem, doe)?)
            } else {
                // split doe in x and y
                info!("Use specified DOE {} samples", doe.nrows());
                (
                    doe.slice(s![.., ..nx]).to_owned(),
                    doe.column(nx).to_owned(),
                )
            }
        } else {
            info!("Compute initial random DOE with {} points", self.config.n_doe);
            let x = Random::new(&self.xlimits).sample_using(self.config.n_doe, &mut rng);
            let y = evaluate(problem, &x)?;
            (x, y)
        };
        let doe_size = x_data.nrows();

        let mut initial_state = state.data((x_data, y_data)).rng(rng);
        initial_state.doe_size = doe_size;
        initial_state.max_iters = self.config.max_iters as u64;
        info!(
            "********* Initialization: {} observations, {} candidates, threshold={}",
            doe_size,
            self.candidates.nrows(),
            self.config.threshold
        );
        Ok((initial_state, None))
    }

    fn next_iter(
        &mut self,
        problem: &mut Problem<O>,
        mut state: LearnerState<f64>,
    ) -> std::result::Result<(LearnerState<f64>, Option<KV>), argmin::core::Error> {
        let iter = state.get_iter();
        debug!(
            "********* Start iteration {}/{}",
            iter + 1,
            state.get_max_iters()
        );
        let now = Instant::now();

        let mut rng = state
            .take_rng()
            .unwrap_or_else(Xoshiro256Plus::from_entropy);
        let (x_data, y_data) = state
            .take_data()
            .ok_or_else(|| argmin::core::Error::msg("Active learner state holds no observation"))?;

        let (gp, acq) = match self.learning_step(problem, &x_data, &y_data, &mut rng) {
            Ok(res) => res,
            Err(err) => {
                warn!("Iteration {} failed: {}", iter + 1, err);
                let state = state
                    .data((x_data, y_data))
                    .rng(rng)
                    .terminate_with(TerminationReason::SolverExit(err.to_string()));
                return Ok((state, None));
            }
        };

        let n_added = acq.n_added();
        let (param, max_std) = self.most_uncertain(&acq.std);
        let record = IterationRecord {
            iteration: iter,
            x_data: x_data.clone(),
            y_data: y_data.clone(),
            candidates: self.candidates.clone(),
            mean: acq.mean,
            std: acq.std,
            n_added,
        };
        state = state.record(record).cost(max_std).model(gp).rng(rng);
        if let Some(param) = param {
            state = state.param(param);
        }

        if n_added == 0 {
            info!(
                "********* Converged at iteration {}/{} in {:.3}s: no candidate with std > {} (max std={:.3e})",
                iter + 1,
                state.get_max_iters(),
                now.elapsed().as_secs_f64(),
                self.config.threshold,
                max_std
            );
            let state = state
                .data((x_data, y_data))
                .terminate_with(TerminationReason::SolverConverged);
            return Ok((state, None));
        }

        let x_data = concatenate![Axis(0), x_data, acq.x];
        let y_data = concatenate![Axis(0), y_data, acq.y];
        state.added += n_added;
        info!(
            "********* End iteration {}/{} in {:.3}s: {} points added (max std={:.3e}), {} observations",
            iter + 1,
            state.get_max_iters(),
            now.elapsed().as_secs_f64(),
            n_added,
            max_std,
            x_data.nrows()
        );
        Ok((state.data((x_data, y_data)), None))
    }

    fn terminate(&mut self, state: &LearnerState<f64>) -> TerminationStatus {
        debug!(">>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>> end iteration");
        debug!("Current max std {:?}", state.get_cost());
        debug!("Lowest max std {:?}", state.get_best_cost());
        debug!("Observations {}", state.n_observations());

        TerminationStatus::NotTerminated
    }
}
