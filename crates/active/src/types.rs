use crate::LearnerState;
use argmin::core::CostFunction;
use gpal_gp::{correlation_models::Kernel, GaussianProcess};
use linfa::Float;
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

/// An interface for the oracle (aka the simulation or the experiment) to be learnt.
///
/// The function is expected to return the observed value at the given input point.
pub trait OracleFn: Clone + Fn(&ArrayView1<f64>) -> f64 {}
impl<T> OracleFn for T where T: Clone + Fn(&ArrayView1<f64>) -> f64 {}

/// A structure wrapping an oracle function implementing `argmin::CostFunction`
/// to be used with argmin framework.
///
/// Oracles which may fail can implement `CostFunction` directly and
/// report their failure through its `Result`.
#[derive(Clone)]
pub struct OracleFunc<O: OracleFn> {
    oracle: O,
}

impl<O: OracleFn> OracleFunc<O> {
    /// Constructor given the oracle function
    pub fn new(oracle: O) -> Self {
        OracleFunc { oracle }
    }
}

impl<O: OracleFn> CostFunction for OracleFunc<O> {
    /// Type of the parameter vector
    type Param = Array1<f64>;
    /// Type of the return value computed by the cost function
    type Output = f64;

    /// Apply the oracle to a parameter `p`
    fn cost(&self, p: &Self::Param) -> std::result::Result<Self::Output, argmin::core::Error> {
        Ok((self.oracle)(&p.view()))
    }
}

/// Snapshot of one active learning iteration, meant for visualization
/// or monitoring of the run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IterationRecord<F: Float> {
    /// Iteration index (0-based)
    pub iteration: u64,
    /// Training inputs of the GP fitted at this iteration
    pub x_data: Array2<F>,
    /// Training outputs of the GP fitted at this iteration
    pub y_data: Array1<F>,
    /// Candidate locations scanned for uncertainty
    pub candidates: Array2<F>,
    /// Posterior mean at candidate locations
    pub mean: Array1<F>,
    /// Posterior standard deviation at candidate locations
    pub std: Array1<F>,
    /// Number of observations added at the end of this iteration
    pub n_added: usize,
}

/// How an active learning run ended
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// No candidate uncertainty is above the threshold anymore
    Converged,
    /// The maximum number of iterations was reached
    BudgetExhausted,
    /// An iteration failed, the reason is given
    Failed(String),
}

/// Active learning result
#[derive(Clone, Debug)]
pub struct LearnResult<F: Float> {
    /// Final observation inputs
    pub x_data: Array2<F>,
    /// Final observation outputs
    pub y_data: Array1<F>,
    /// GP fitted at the start of the last completed iteration, if any
    pub model: Option<GaussianProcess<F, Kernel>>,
    /// Terminal state of the run
    pub outcome: Outcome,
    /// Records of the successive iterations
    pub history: Vec<IterationRecord<F>>,
    /// Solver final state
    pub state: LearnerState<F>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_oracle_func_cost() {
        let oracle = OracleFunc::new(|x: &ArrayView1<f64>| x[0] * x[1]);
        let y = oracle.cost(&array![2., 3.]).expect("oracle evaluation");
        assert_eq!(y, 6.);
    }
}
