//! Active learner main API to build and run the learning of an oracle.
//!
//! ```no_run
//! use ndarray::{array, ArrayView1};
//! use gpal_active::{ActiveLearnerBuilder, Outcome};
//!
//! // Expensive simulation of a 1D phenomenon
//! fn sinx(x: &ArrayView1<f64>) -> f64 {
//!     x[0].sin()
//! }
//! let xlimits = array![[0., 10.]];
//! let res = ActiveLearnerBuilder::learn(sinx)
//!     .configure(|config| config.max_iters(20).threshold(0.1).seed(42))
//!     .within(&xlimits)
//!     .expect("valid configuration")
//!     .run()
//!     .expect("active learning run");
//! assert_eq!(res.outcome, Outcome::Converged);
//! println!("Learnt from {} observations", res.x_data.nrows());
//! ```
//!
//! Each iteration is recorded as an [`IterationRecord`] allowing to monitor or plot
//! the run, either afterwards from the result history or on the fly with a callback.
//!
//! ```no_run
//! # use ndarray::{array, ArrayView1};
//! # use gpal_active::ActiveLearnerBuilder;
//! # fn sinx(x: &ArrayView1<f64>) -> f64 { x[0].sin() }
//! let res = ActiveLearnerBuilder::learn(sinx)
//!     .within(&array![[0., 10.]])
//!     .expect("valid configuration")
//!     .run_with_callback(|record| {
//!         let max_std = record.std.iter().cloned().fold(0., f64::max);
//!         println!("iter {}: max std={:.3}", record.iteration, max_std)
//!     })
//!     .expect("active learning run");
//! ```
use crate::errors::{ActiveError, Result};
use crate::types::*;
use crate::ActiveLearnerConfig;
use crate::{ActiveLearnerSolver, LearnerState};

use argmin::core::observers::{Observe, ObserverMode};
use argmin::core::{CostFunction, Error, Executor, State, TerminationReason, KV};
use linfa::ParamGuard;
use log::info;
use ndarray::{Array1, ArrayBase, Data, Ix2};

/// Active learner builder allowing to specify the oracle, the configuration
/// and the design space.
pub struct ActiveLearnerFactory<O: CostFunction<Param = Array1<f64>, Output = f64> + Clone> {
    problem: O,
    config: ActiveLearnerConfig,
}

impl<O: CostFunction<Param = Array1<f64>, Output = f64> + Clone> ActiveLearnerFactory<O> {
    /// Constructor of the learning of any oracle implementing `argmin::CostFunction`
    pub fn new(problem: O) -> Self {
        ActiveLearnerFactory {
            problem,
            config: ActiveLearnerConfig::default(),
        }
    }

    /// Set configuration of the active learner
    pub fn configure<F: FnOnce(ActiveLearnerConfig) -> ActiveLearnerConfig>(
        mut self,
        init: F,
    ) -> Self {
        self.config = init(self.config);
        self
    }

    /// Build an active learner of the oracle over the design space `xlimits`,
    /// a (nx, 2) matrix where the ith row contains \[lower bound, upper bound\]
    /// of the ith input component.
    pub fn within(
        self,
        xlimits: &ArrayBase<impl Data<Elem = f64>, Ix2>,
    ) -> Result<ActiveLearner<O>> {
        let config = self.config.check()?;
        Ok(ActiveLearner {
            problem: self.problem,
            solver: ActiveLearnerSolver::new(config, xlimits)?,
        })
    }
}

impl<G: OracleFn> ActiveLearnerFactory<OracleFunc<G>> {
    /// Constructor of the learning of the function `oracle`
    pub fn learn(oracle: G) -> Self {
        Self::new(OracleFunc::new(oracle))
    }
}

/// Active learner builder for oracles given as functions
pub type ActiveLearnerBuilder<G> = ActiveLearnerFactory<OracleFunc<G>>;

/// Active learner structure wrapping the argmin executor running
/// an [ActiveLearnerSolver] on the oracle.
#[derive(Clone)]
pub struct ActiveLearner<O: CostFunction<Param = Array1<f64>, Output = f64> + Clone> {
    problem: O,
    solver: ActiveLearnerSolver,
}

impl<O: CostFunction<Param = Array1<f64>, Output = f64> + Clone> ActiveLearner<O> {
    /// Runs the active learning loop
    pub fn run(&self) -> Result<LearnResult<f64>> {
        let exec = Executor::new(self.problem.clone(), self.solver.clone());
        self.learn_result(exec.run())
    }

    /// Runs the active learning loop, `callback` being called
    /// with the record of each completed iteration
    pub fn run_with_callback<C>(&self, callback: C) -> Result<LearnResult<f64>>
    where
        C: FnMut(&IterationRecord<f64>) + Send + 'static,
    {
        let exec = Executor::new(self.problem.clone(), self.solver.clone())
            .add_observer(IterationCallback::new(callback), ObserverMode::Always);
        self.learn_result(exec.run())
    }

    /// The solver run by this learner
    pub fn solver(&self) -> &ActiveLearnerSolver {
        &self.solver
    }

    fn learn_result(
        &self,
        result: std::result::Result<
            argmin::core::OptimizationResult<O, ActiveLearnerSolver, LearnerState<f64>>,
            Error,
        >,
    ) -> Result<LearnResult<f64>> {
        let result = result.map_err(|err| match err.downcast::<ActiveError>() {
            Ok(err) => err,
            Err(err) => ActiveError::ArgminError(err),
        })?;
        let mut state = result.state;
        let outcome = outcome_of(&state);
        let (x_data, y_data) = state
            .take_data()
            .ok_or_else(|| Error::msg("Active learner state holds no observation"))?;
        info!(
            "Active learning {:?} after {} iterations: {} observations ({} initial, {} added)",
            outcome,
            state.get_iter(),
            x_data.nrows(),
            state.doe_size,
            state.added
        );
        Ok(LearnResult {
            x_data,
            y_data,
            model: state.take_model(),
            outcome,
            history: state.take_history(),
            state,
        })
    }
}

fn outcome_of(state: &LearnerState<f64>) -> Outcome {
    match state.get_termination_reason() {
        Some(TerminationReason::SolverConverged) => Outcome::Converged,
        Some(TerminationReason::MaxItersReached) => Outcome::BudgetExhausted,
        Some(TerminationReason::SolverExit(reason)) => Outcome::Failed(reason.clone()),
        Some(reason) => Outcome::Failed(format!("{reason:?}")),
        None => Outcome::Failed("not terminated".to_string()),
    }
}

/// Observer delivering the record of each completed iteration to a callback
pub struct IterationCallback<C: FnMut(&IterationRecord<f64>)> {
    callback: C,
}

impl<C: FnMut(&IterationRecord<f64>)> IterationCallback<C> {
    /// Constructor given the function called with each iteration record
    pub fn new(callback: C) -> Self {
        IterationCallback { callback }
    }
}

impl<C: FnMut(&IterationRecord<f64>)> Observe<LearnerState<f64>> for IterationCallback<C> {
    fn observe_iter(
        &mut self,
        state: &LearnerState<f64>,
        _kv: &KV,
    ) -> std::result::Result<(), Error> {
        // a failed iteration leaves no record
        if let Some(record) = state.history.last() {
            if record.iteration == state.get_iter() {
                (self.callback)(record);
            }
        }
        Ok(())
    }
}
