//! Active learner state carried by argmin from iteration to iteration
use crate::types::IterationRecord;

use argmin::core::{ArgminFloat, Problem, State, TerminationReason, TerminationStatus};
use gpal_gp::{correlation_models::Kernel, GaussianProcess};
use linfa::Float;
use ndarray::{Array1, Array2};
use ndarray_rand::rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Maintains the state from iteration to iteration of the [crate::ActiveLearnerSolver].
///
/// The cost tracked through argmin is the maximum posterior standard deviation
/// over the candidates, `param` being the most uncertain candidate.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LearnerState<F: Float> {
    /// Most uncertain candidate at current iteration
    pub param: Option<Array1<F>>,
    /// Previous parameter vector
    pub prev_param: Option<Array1<F>>,
    /// Most uncertain candidate at the iteration with the lowest max std
    pub best_param: Option<Array1<F>>,
    /// Previous best parameter vector
    pub prev_best_param: Option<Array1<F>>,

    /// Current max std over candidates
    pub cost: Option<F>,
    /// Previous cost value
    pub prev_cost: Option<F>,
    /// Lowest max std so far
    pub best_cost: Option<F>,
    /// Previous best cost value
    pub prev_best_cost: Option<F>,
    /// Target cost function value
    pub target_cost: F,

    /// Current iteration
    pub iter: u64,
    /// Iteration number of last best cost
    pub last_best_iter: u64,
    /// Maximum number of iterations
    pub max_iters: u64,
    /// Evaluation counts
    pub counts: HashMap<String, u64>,
    /// Time required so far
    pub time: Option<web_time::Duration>,
    /// Learning status
    pub termination_status: TerminationStatus,

    /// Initial doe size
    pub doe_size: usize,
    /// Number of observations added by the iterations
    pub added: usize,

    /// Observation set (x_data, y_data)
    pub data: Option<(Array2<F>, Array1<F>)>,
    /// GP fitted at the start of the last completed iteration
    pub model: Option<GaussianProcess<F, Kernel>>,
    /// Iteration records
    pub history: Vec<IterationRecord<F>>,

    /// Random number generator for reproducibility
    pub rng: Option<Xoshiro256Plus>,
}

impl<F> LearnerState<F>
where
    Self: State<Float = F>,
    F: Float,
{
    /// Set parameter vector. This shifts the stored parameter vector to the previous parameter
    /// vector.
    #[must_use]
    pub fn param(mut self, param: Array1<F>) -> Self {
        std::mem::swap(&mut self.prev_param, &mut self.param);
        self.param = Some(param);
        self
    }

    /// Set maximum number of iterations
    #[must_use]
    pub fn max_iters(mut self, iters: u64) -> Self {
        self.max_iters = iters;
        self
    }

    /// Set the current max std, shifting the stored one to `prev_cost`.
    #[must_use]
    pub fn cost(mut self, cost: F) -> Self {
        std::mem::swap(&mut self.prev_cost, &mut self.cost);
        self.cost = Some(cost);
        self
    }

    /// Set the current observation set as training data of the GP.
    /// Data is expressed as a pair (xdata, ydata) where :
    /// * xdata is a (p, nx matrix),
    /// * ydata is a (p,) vector and ydata_i = oracle(xdata_i) for i in [1, p].
    pub fn data(mut self, data: (Array2<F>, Array1<F>)) -> Self {
        self.data = Some(data);
        self
    }

    /// Moves the current data out and replaces it internally with `None`.
    pub fn take_data(&mut self) -> Option<(Array2<F>, Array1<F>)> {
        self.data.take()
    }

    /// Set the last fitted GP
    pub fn model(mut self, model: GaussianProcess<F, Kernel>) -> Self {
        self.model = Some(model);
        self
    }

    /// Moves the last fitted GP out and replaces it internally with `None`.
    pub fn take_model(&mut self) -> Option<GaussianProcess<F, Kernel>> {
        self.model.take()
    }

    /// Append an iteration record
    pub fn record(mut self, record: IterationRecord<F>) -> Self {
        self.history.push(record);
        self
    }

    /// Moves the iteration records out, leaving an empty history.
    pub fn take_history(&mut self) -> Vec<IterationRecord<F>> {
        std::mem::take(&mut self.history)
    }

    /// Set the random number generator used to draw random points
    pub fn rng(mut self, rng: Xoshiro256Plus) -> Self {
        self.rng = Some(rng);
        self
    }

    /// Moves the current random number generator out and replaces it internally with `None`.
    pub fn take_rng(&mut self) -> Option<Xoshiro256Plus> {
        self.rng.take()
    }

    /// Number of observations currently held
    pub fn n_observations(&self) -> usize {
        self.data.as_ref().map_or(0, |(x, _)| x.nrows())
    }
}

impl<F> State for LearnerState<F>
where
    F: Float + ArgminFloat,
{
    /// Type of parameter vector
    type Param = Array1<F>;
    /// Floating point precision
    type Float = F;

    /// Empty state: no observation yet, no iteration bound, entropy-seeded rng.
    /// The target cost stays at `-inf` as convergence is decided by the solver.
    fn new() -> Self {
        LearnerState {
            param: None,
            prev_param: None,
            best_param: None,
            prev_best_param: None,

            cost: None,
            prev_cost: None,
            best_cost: None,
            prev_best_cost: None,
            target_cost: F::neg_infinity(),

            iter: 0,
            last_best_iter: 0,
            max_iters: u64::MAX,
            counts: HashMap::new(),
            time: Some(web_time::Duration::new(0, 0)),
            termination_status: TerminationStatus::NotTerminated,

            doe_size: 0,
            added: 0,

            data: None,
            model: None,
            history: vec![],
            rng: Some(Xoshiro256Plus::from_entropy()),
        }
    }

    /// Checks if the current max std is lower than the best one so far. If so
    /// the state is updated accordingly.
    ///
    /// # Example
    ///
    /// ```
    /// # use argmin::core::State;
    /// # use ndarray::array;
    /// # use gpal_active::LearnerState;
    /// let mut state: LearnerState<f64> = LearnerState::new();
    /// state.iter = 2;
    /// state.param = Some(array![3.0f64]);
    /// state.cost = Some(0.5);
    ///
    /// state.update();
    ///
    /// assert_eq!(state.best_param.as_ref().unwrap()[0], 3.0f64);
    /// assert_eq!(state.best_cost, Some(0.5));
    /// assert!(state.is_best());
    /// ```
    fn update(&mut self) {
        if let Some(cost) = self.cost {
            let improved = self.best_cost.map_or(true, |best| cost < best);
            if improved {
                std::mem::swap(&mut self.prev_best_param, &mut self.best_param);
                self.best_param = self.param.clone();
                std::mem::swap(&mut self.prev_best_cost, &mut self.best_cost);
                self.best_cost = Some(cost);
                self.last_best_iter = self.iter + 1;
            }
        }
    }

    fn get_param(&self) -> Option<&Array1<F>> {
        self.param.as_ref()
    }

    fn get_best_param(&self) -> Option<&Array1<F>> {
        self.best_param.as_ref()
    }

    /// Sets the termination status to [`Terminated`](`TerminationStatus::Terminated`)
    /// with the given reason
    fn terminate_with(mut self, reason: TerminationReason) -> Self {
        self.termination_status = TerminationStatus::Terminated(reason);
        self
    }

    /// Sets the time required so far.
    fn time(&mut self, time: Option<web_time::Duration>) -> &mut Self {
        self.time = time;
        self
    }

    fn get_cost(&self) -> Self::Float {
        self.cost.unwrap_or(Self::Float::infinity())
    }

    fn get_best_cost(&self) -> Self::Float {
        self.best_cost.unwrap_or(Self::Float::infinity())
    }

    fn get_target_cost(&self) -> Self::Float {
        self.target_cost
    }

    fn get_iter(&self) -> u64 {
        self.iter
    }

    fn get_last_best_iter(&self) -> u64 {
        self.last_best_iter
    }

    fn get_max_iters(&self) -> u64 {
        self.max_iters
    }

    fn get_termination_status(&self) -> &TerminationStatus {
        &self.termination_status
    }

    /// Returns the termination reason if terminated, otherwise None.
    fn get_termination_reason(&self) -> Option<&TerminationReason> {
        match &self.termination_status {
            TerminationStatus::Terminated(reason) => Some(reason),
            TerminationStatus::NotTerminated => None,
        }
    }

    fn get_time(&self) -> Option<web_time::Duration> {
        self.time
    }

    fn increment_iter(&mut self) {
        self.iter += 1;
    }

    /// Copy the evaluation counts of the problem (oracle calls under `cost_count`)
    fn func_counts<O>(&mut self, problem: &Problem<O>) {
        for (k, &v) in problem.counts.iter() {
            self.counts.insert(k.to_string(), v);
        }
    }

    fn get_func_counts(&self) -> &HashMap<String, u64> {
        &self.counts
    }

    /// Returns whether the current max std is also the lowest found so far.
    fn is_best(&self) -> bool {
        // last_best_iter is set before the iteration counter is incremented
        self.last_best_iter == self.iter + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_new_state() {
        let state: LearnerState<f64> = LearnerState::new();
        assert!(state.get_param().is_none());
        assert_eq!(state.get_target_cost(), f64::NEG_INFINITY);
        assert_eq!(state.get_max_iters(), u64::MAX);
        assert!(state.get_func_counts().is_empty());
        assert!(state.get_termination_reason().is_none());
        assert!(state.rng.is_some());
    }

    #[test]
    fn test_func_counts() {
        #[derive(Debug)]
        struct Oracle;
        let mut problem = Problem::new(Oracle);
        problem.counts.insert("cost_count", 7u64);
        let mut state: LearnerState<f64> = LearnerState::new();
        state.func_counts(&problem);
        assert_eq!(state.get_func_counts().get("cost_count"), Some(&7));
    }

    #[test]
    fn test_update_keeps_lowest_cost() {
        let mut state: LearnerState<f64> = LearnerState::new();
        state = state.param(array![1.]).cost(0.8);
        state.update();
        state.increment_iter();
        state = state.param(array![2.]).cost(0.9);
        assert_eq!(state.prev_cost, Some(0.8));
        state.update();
        assert_eq!(state.best_cost, Some(0.8));
        assert_eq!(state.best_param, Some(array![1.]));
        assert_eq!(state.get_last_best_iter(), 1);
        assert!(!state.is_best());

        state.increment_iter();
        state = state.param(array![3.]).cost(0.2);
        state.update();
        assert_eq!(state.get_best_cost(), 0.2);
        assert_eq!(state.prev_best_cost, Some(0.8));
        assert!(state.is_best());
    }

    #[test]
    fn test_data_and_history() {
        let mut state: LearnerState<f64> = LearnerState::new();
        assert_eq!(state.n_observations(), 0);
        state = state.data((array![[0.], [1.]], array![0., 1.]));
        assert_eq!(state.n_observations(), 2);
        let (x, y) = state.take_data().expect("data");
        assert_eq!((x.nrows(), y.len()), (2, 2));
        assert!(state.take_data().is_none());

        let record = IterationRecord {
            iteration: 0,
            x_data: x,
            y_data: y,
            candidates: array![[0.5]],
            mean: array![0.5],
            std: array![0.3],
            n_added: 1,
        };
        state = state.record(record);
        assert_eq!(state.history.len(), 1);
        assert_eq!(state.take_history().len(), 1);
        assert!(state.history.is_empty());
    }
}
