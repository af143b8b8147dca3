use crate::config::ValidActiveLearnerConfig;
use crate::errors::Result;
use crate::sampler::{select_and_query, Acquisition};
use crate::ActiveLearnerSolver;

use argmin::core::{CostFunction, Problem};
use env_logger::{Builder, Env};
use gpal_doe::Grid;
use gpal_gp::{correlation_models::Kernel, GaussianProcess, GpRegressor};
use log::debug;
use ndarray::{Array1, Array2, ArrayBase, Data, Ix2};
use ndarray_rand::rand::Rng;
use ndarray_stats::QuantileExt;
use rand_xoshiro::Xoshiro256Plus;

/// Environment variable controlling the log level (default to `info`)
pub const GPAL_LOG: &str = "GPAL_LOG";

impl ActiveLearnerSolver {
    /// Constructor of the active learning of an oracle defined over the `xlimits` design space,
    /// a (nx, 2) matrix of [lower bound, upper bound] of the nx input components.
    ///
    /// The candidate set is either the one given by the configuration or a grid
    /// of `n_levels` evenly spaced values per input component.
    pub fn new(
        config: ValidActiveLearnerConfig,
        xlimits: &ArrayBase<impl Data<Elem = f64>, Ix2>,
    ) -> Result<Self> {
        let env = Env::new().filter_or(GPAL_LOG, "info");
        let mut builder = Builder::from_env(env);
        let builder = builder.target(env_logger::Target::Stdout);
        builder.try_init().ok();

        config.check_within(xlimits)?;
        let candidates = match config.candidates.as_ref() {
            Some(candidates) => candidates.to_owned(),
            None => Grid::new(xlimits).levels(config.n_levels).points(),
        };
        Ok(ActiveLearnerSolver {
            config,
            xlimits: xlimits.to_owned(),
            candidates,
        })
    }

    /// Candidate locations scanned at each iteration
    pub fn candidates(&self) -> &Array2<f64> {
        &self.candidates
    }

    /// Fit the GP on the current observations then select and query
    /// the uncertain candidates
    pub(crate) fn learning_step<O>(
        &self,
        problem: &mut Problem<O>,
        x_data: &Array2<f64>,
        y_data: &Array1<f64>,
        rng: &mut Xoshiro256Plus,
    ) -> Result<(GaussianProcess<f64, Kernel>, Acquisition)>
    where
        O: CostFunction<Param = Array1<f64>, Output = f64>,
    {
        let mut gpr = GpRegressor::new(self.config.gp_params(rng.gen())?);
        let gp = gpr.fit(x_data, y_data)?;
        debug!("Fitted {}", gp);

        let acq = select_and_query(
            &gpr,
            &self.candidates,
            self.config.threshold,
            self.config.jitter,
            problem,
            rng,
        )?;
        let gp = gpr.into_model().ok_or(gpal_gp::GpError::UnfittedModel)?;
        Ok((gp, acq))
    }

    /// Most uncertain candidate and its std, the std being 0 when there is no candidate
    pub(crate) fn most_uncertain(&self, std: &Array1<f64>) -> (Option<Array1<f64>>, f64) {
        match std.argmax() {
            Ok(i) => (Some(self.candidates.row(i).to_owned()), std[i]),
            Err(_) => (None, 0.),
        }
    }
}
