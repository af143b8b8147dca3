//! Uncertainty driven selection of the next observations.
//!
//! Candidates whose posterior standard deviation is above the uncertainty threshold
//! are perturbed by a uniform jitter and queried to the oracle.
use crate::errors::{ActiveError, Result};
use argmin::core::{CostFunction, Problem};
use gpal_gp::{correlation_models::CorrelationModel, GpRegressor};
use log::debug;
use ndarray::{Array1, Array2, ArrayBase, Axis, Data, Ix2};
use ndarray_rand::{rand::Rng, rand_distr::Uniform, RandomExt};

/// Result of an acquisition step
#[derive(Clone, Debug)]
pub struct Acquisition {
    /// Posterior mean at candidate locations
    pub mean: Array1<f64>,
    /// Posterior standard deviation at candidate locations
    pub std: Array1<f64>,
    /// Indices of the selected candidates, in candidate order
    pub selected: Vec<usize>,
    /// Queried locations (selected candidates with jitter)
    pub x: Array2<f64>,
    /// Oracle observations at queried locations
    pub y: Array1<f64>,
}

impl Acquisition {
    fn empty(nx: usize) -> Self {
        Acquisition {
            mean: Array1::zeros(0),
            std: Array1::zeros(0),
            selected: vec![],
            x: Array2::zeros((0, nx)),
            y: Array1::zeros(0),
        }
    }

    /// Number of new observations
    pub fn n_added(&self) -> usize {
        self.y.len()
    }
}

/// Select the candidates with a posterior std greater than `threshold`, perturb them
/// uniformly within `[-jitter, jitter]` per component and query the oracle at the resulting
/// locations, sequentially in candidate order.
///
/// No candidate above the threshold gives an empty acquisition, which is the signal
/// the model is confident enough everywhere.
pub fn select_and_query<O, Corr, R>(
    gpr: &GpRegressor<f64, Corr>,
    candidates: &ArrayBase<impl Data<Elem = f64>, Ix2>,
    threshold: f64,
    jitter: f64,
    problem: &mut Problem<O>,
    rng: &mut R,
) -> Result<Acquisition>
where
    O: CostFunction<Param = Array1<f64>, Output = f64>,
    Corr: CorrelationModel<f64>,
    R: Rng,
{
    if candidates.nrows() == 0 {
        debug!("No candidate to scan");
        return Ok(Acquisition::empty(candidates.ncols()));
    }
    let (mean, std) = gpr.predict(candidates)?;
    let selected: Vec<usize> = std
        .iter()
        .enumerate()
        .filter(|&(_, &s)| s > threshold)
        .map(|(i, _)| i)
        .collect();
    debug!(
        "{}/{} candidates with std > {}",
        selected.len(),
        candidates.nrows(),
        threshold
    );

    let mut x = candidates.select(Axis(0), &selected);
    if jitter > 0. && !selected.is_empty() {
        x += &Array2::random_using(x.dim(), Uniform::new_inclusive(-jitter, jitter), rng);
    }
    let y = evaluate(problem, &x)?;
    Ok(Acquisition {
        mean,
        std,
        selected,
        x,
        y,
    })
}

/// Query the oracle at each row of `x` in order.
///
/// Evaluations are counted by the problem under `cost_count`.
pub(crate) fn evaluate<O>(
    problem: &mut Problem<O>,
    x: &ArrayBase<impl Data<Elem = f64>, Ix2>,
) -> Result<Array1<f64>>
where
    O: CostFunction<Param = Array1<f64>, Output = f64>,
{
    let mut y = Array1::zeros(x.nrows());
    for (i, xi) in x.rows().into_iter().enumerate() {
        let param = xi.to_owned();
        let yi = problem
            .problem("cost_count", |p| p.cost(&param))
            .map_err(|err| {
                ActiveError::OracleError(format!("evaluation at {param} failed: {err}"))
            })?;
        if !yi.is_finite() {
            return Err(ActiveError::OracleError(format!(
                "evaluation at {param} is not finite ({yi})"
            )));
        }
        y[i] = yi;
    }
    Ok(y)
}
