use crate::correlation_models::*;
use crate::errors::{GpError, Result};
use crate::optimization::{optimize_params, prepare_multistart, CobylaParams};
use crate::parameters::{GpParams, GpValidParams, ThetaTuning};
use crate::utils::{cross_differences, PairDistances, Standardized};

use linfa::prelude::{DatasetBase, Fit, Float};
use linfa_linalg::{cholesky::*, triangular::*};

use ndarray::{Array, Array1, Array2, ArrayBase, Axis, Data, Ix1, Ix2};

use log::{debug, warn};
use rayon::prelude::*;
#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

/// Default number of multistart for hyperparameters optimization
pub const GP_OPTIM_N_START: usize = 10;
/// Minimum of function evaluations for COBYLA optimizer
pub const GP_COBYLA_MIN_EVAL: usize = 25;
/// Maximum of function evaluations for COBYLA optimizer
pub const GP_COBYLA_MAX_EVAL: usize = 1000;

/// Internal parameters computed Gp during training
/// used later on in prediction computations
#[derive(Default, Debug, Clone)]
#[cfg_attr(
    feature = "serializable",
    derive(Serialize, Deserialize),
    serde(bound(deserialize = "F: Deserialize<'de>"))
)]
pub(crate) struct GpInnerParams<F: Float> {
    /// Cholesky decomposition (lower) of the covariance matrix \[K + noise.I\]
    r_chol: Array2<F>,
    /// Solution of the linear equation system : \[K + noise.I\] x alpha = y
    alpha: Array2<F>,
}

/// A zero-mean Gaussian process regression model conditioned on training data.
///
/// The output is modeled as a stochastic process `Y(x) ~ GP(0, k(x, x'))` where
/// `k` is a unit-scaled stationary [correlation model](crate::correlation_models)
/// parameterized by `theta`, the inverse of the length scale of each input component.
/// A noise variance is added to the diagonal of the training covariance matrix.
///
/// Given the Cholesky factor `L` of `K + noise.I` and `alpha = (K + noise.I)^-1 y`,
/// predictions at `x*` are:
///
/// * mean: `k*^T alpha`
/// * variance: `max(0, k(x*, x*) - v^T v)` where `v = L^-1 k*`
///
/// Optionally outputs are centered and scaled before fitting (see [GpParams::normalize_y]),
/// predictions are then given back in original units.
///
/// Hyperparameters `theta` are either fixed or optimized by maximizing the
/// log marginal likelihood with the derivative-free COBYLA optimizer, restarted
/// from several random points of the (log10) search space.
///
/// # Features
///
/// ## serializable
///
/// The `serializable` feature enables the serialization of GP models
/// using the [`serde crate`](https://serde.rs/).
///
/// # Example
///
/// ```no_run
/// use gpal_gp::{correlation_models::*, GaussianProcess};
/// use linfa::prelude::*;
/// use ndarray::{arr2, Array, Axis};
///
/// let xt = arr2(&[[0.0], [2.0], [4.0], [6.0], [8.0], [10.0]]);
/// let yt = xt.column(0).mapv(f64::sin);
///
/// let gp = GaussianProcess::<f64, SquaredExponentialCorr>::params(SquaredExponentialCorr())
///     .length_scale(1.)
///     .fit(&Dataset::new(xt, yt))
///     .expect("GP fitted");
///
/// let xtest = Array::linspace(0., 10., 101).insert_axis(Axis(1));
/// let (mean, std) = gp.predict_valstd(&xtest).expect("GP prediction");
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(
    feature = "serializable",
    derive(Serialize, Deserialize),
    serde(bound(
        serialize = "F: Serialize, Corr: Serialize",
        deserialize = "F: Deserialize<'de>, Corr: Deserialize<'de>"
    ))
)]
pub struct GaussianProcess<F: Float, Corr: CorrelationModel<F>> {
    /// Parameter of the autocorrelation model equal to the inverse of length scale
    theta: Array1<F>,
    /// Log marginal likelihood of the training data under the fitted model
    likelihood: F,
    /// Gaussian process internal fitted params
    inner_params: GpInnerParams<F>,
    /// Training outputs (normalized or not)
    yt_norm: Standardized<F>,
    /// Training dataset (input, output)
    pub(crate) training_data: (Array2<F>, Array1<F>),
    /// Parameters used to fit this model
    pub(crate) params: GpValidParams<F, Corr>,
}

/// Kriging as GP special case when using squared exponential correlation
pub type Kriging<F> = GpParams<F, SquaredExponentialCorr>;

impl<F: Float> Kriging<F> {
    /// Kriging parameters constructor
    pub fn params() -> GpParams<F, SquaredExponentialCorr> {
        GpParams::new(SquaredExponentialCorr())
    }
}

impl<F: Float, Corr: CorrelationModel<F>> fmt::Display for GaussianProcess<F, Corr> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "GP(corr={}, theta={}, noise={}, likelihood={})",
            self.params.corr, self.theta, self.params.noise, self.likelihood,
        )
    }
}

impl<F: Float, Corr: CorrelationModel<F>> GaussianProcess<F, Corr> {
    /// Gp parameters contructor
    pub fn params<NewCorr: CorrelationModel<F>>(corr: NewCorr) -> GpParams<F, NewCorr> {
        GpParams::new(corr)
    }

    /// Predict output values at n given `x` points of nx components specified as a (n, nx) matrix.
    /// Returns n scalar output values as a vector (n,).
    pub fn predict(&self, x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Result<Array1<F>> {
        self.check_input(x)?;
        if x.nrows() == 0 {
            return Ok(Array1::zeros(0));
        }
        let corr = self._compute_correlation(x)?;
        Ok(self._mean_from_correlation(&corr))
    }

    /// Predict variance values at n given `x` points of nx components
    /// specified as a (n, nx) matrix.
    /// Returns n variance values as (n,) column vector.
    pub fn predict_var(&self, x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Result<Array1<F>> {
        self.check_input(x)?;
        if x.nrows() == 0 {
            return Ok(Array1::zeros(0));
        }
        let corr = self._compute_correlation(x)?;
        self._var_from_correlation(&corr)
    }

    /// Predict both output values and variance at n given `x` points of nx components
    pub fn predict_valvar(
        &self,
        x: &ArrayBase<impl Data<Elem = F>, Ix2>,
    ) -> Result<(Array1<F>, Array1<F>)> {
        self.check_input(x)?;
        if x.nrows() == 0 {
            return Ok((Array1::zeros(0), Array1::zeros(0)));
        }
        let corr = self._compute_correlation(x)?;
        let mean = self._mean_from_correlation(&corr);
        let var = self._var_from_correlation(&corr)?;
        Ok((mean, var))
    }

    /// Predict standard deviation values at n given `x` points specified as a (n, nx) matrix.
    pub fn predict_std(&self, x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Result<Array1<F>> {
        Ok(self.predict_var(x)?.mapv(|v| v.sqrt()))
    }

    /// Predict both output values and standard deviation at n given `x` points
    pub fn predict_valstd(
        &self,
        x: &ArrayBase<impl Data<Elem = F>, Ix2>,
    ) -> Result<(Array1<F>, Array1<F>)> {
        let (mean, var) = self.predict_valvar(x)?;
        Ok((mean, var.mapv(|v| v.sqrt())))
    }

    fn check_input(&self, x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Result<()> {
        let nx = self.training_data.0.ncols();
        if x.ncols() != nx {
            return Err(GpError::InvalidValueError(format!(
                "Query points should have {} components, got {}",
                nx,
                x.ncols()
            )));
        }
        Ok(())
    }

    /// Scaled predictor `k*^T alpha` given back in output units
    fn _mean_from_correlation(&self, corr: &Array2<F>) -> Array1<F> {
        let y_ = corr.dot(&self.inner_params.alpha);
        (&y_ * &self.yt_norm.scale + &self.yt_norm.mean).remove_axis(Axis(1))
    }

    fn _var_from_correlation(&self, corr: &Array2<F>) -> Result<Array1<F>> {
        let corr_t = corr.t().to_owned();
        let v = self
            .inner_params
            .r_chol
            .solve_triangular(&corr_t, UPLO::Lower)?;
        let sigma2 = self.yt_norm.scale[0] * self.yt_norm.scale[0];
        // Variance might be slightly negative depending on
        // machine precision: set to zero in that case
        let var = v.mapv(|v| v * v).sum_axis(Axis(0)).mapv(|s| {
            let r = F::one() - s;
            if r < F::zero() {
                F::zero()
            } else {
                sigma2 * r
            }
        });
        Ok(var)
    }

    /// Compute correlation matrix (n, n_train) given x points specified as a (n, nx) matrix
    fn _compute_correlation(&self, x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Result<Array2<F>> {
        let xtrain = &self.training_data.0;
        // Get pairwise componentwise differences to the input training set
        let dx = cross_differences(x, xtrain);
        // Compute the correlation function
        let r = self.params.corr.value(&dx, &self.theta);
        Ok(r.into_shape((x.nrows(), xtrain.nrows()))?)
    }

    /// Retrieve optimized hyperparameters theta
    pub fn theta(&self) -> &Array1<F> {
        &self.theta
    }

    /// Retrieve length scales, the inverse of theta components
    pub fn length_scales(&self) -> Array1<F> {
        self.theta.mapv(|v| F::one() / v)
    }

    /// Retrieve log marginal likelihood value
    pub fn likelihood(&self) -> F {
        self.likelihood
    }

    /// Retrieve training dataset (inputs, outputs)
    pub fn training_data(&self) -> (&Array2<F>, &Array1<F>) {
        (&self.training_data.0, &self.training_data.1)
    }

    /// Retrieve parameters used to fit this model
    pub fn params_used(&self) -> &GpValidParams<F, Corr> {
        &self.params
    }
}

impl<F: Float, Corr: CorrelationModel<F>, D: Data<Elem = F>>
    Fit<ArrayBase<D, Ix2>, ArrayBase<D, Ix1>, GpError> for GpValidParams<F, Corr>
{
    type Object = GaussianProcess<F, Corr>;

    /// Fit GP parameters using maximum likelihood
    fn fit(
        &self,
        dataset: &DatasetBase<ArrayBase<D, Ix2>, ArrayBase<D, Ix1>>,
    ) -> Result<Self::Object> {
        let x = dataset.records();
        let y = dataset.targets();

        if x.nrows() == 0 || x.ncols() == 0 {
            return Err(GpError::InvalidValueError(format!(
                "Training inputs should be a non empty (n, nx) matrix, got {:?}",
                x.dim()
            )));
        }
        if y.len() != x.nrows() {
            return Err(GpError::InvalidValueError(format!(
                "Training inputs and outputs should have the same number of rows, got {} and {}",
                x.nrows(),
                y.len()
            )));
        }
        if y.iter().any(|v| !v.is_finite()) {
            return Err(GpError::InvalidValueError(
                "Training outputs should be finite values".to_string(),
            ));
        }

        let dim = self.corr().n_params(x.ncols());
        // Initial guess for theta
        let init = self.theta_tuning().init();
        let theta0 = if init.len() == 1 {
            Array1::from_elem(dim, init[0])
        } else if init.len() == dim {
            init.to_owned()
        } else {
            return Err(GpError::InvalidValueError(format!(
                "Initial guess for theta should be either 1-dim or dim of xtrain ({}), got {}",
                dim,
                init.len()
            )));
        };

        let y = y.to_owned().insert_axis(Axis(1));
        let ytrain = if self.normalize_y() {
            Standardized::new(&y)
        } else {
            Standardized::unscaled(&y)
        };

        let x_distances = PairDistances::new(x);
        if x_distances
            .diffs
            .rows()
            .into_iter()
            .any(|row| row.iter().all(|v| *v == F::zero()))
        {
            warn!("Training inputs contain the same point twice or more");
        }

        let opt_params = match self.theta_tuning() {
            ThetaTuning::Fixed(_) => {
                // Easy path no optimization
                theta0
            }
            ThetaTuning::Full { init: _, bounds } => {
                let base: f64 = 10.;
                let objfn = |x: &[f64]| -> f64 {
                    let theta: Array1<F> = x.iter().map(|v| F::cast(base.powf(*v))).collect();
                    // check theta as optimizer may return nan values
                    if theta.iter().any(|v| v.is_nan()) {
                        // shortcut return worst value wrt to likelihood maximization
                        return f64::INFINITY;
                    }
                    let rxx = self.corr().value(&x_distances.diffs, &theta);
                    match log_likelihood(rxx, &x_distances, &ytrain, self.noise()) {
                        Ok((lkh, _)) => match lkh.to_f64() {
                            Some(v) if v.is_finite() => -v,
                            _ => f64::INFINITY,
                        },
                        Err(_) => f64::INFINITY,
                    }
                };

                let bounds = if bounds.len() == 1 {
                    vec![bounds[0]; dim]
                } else if bounds.len() == dim {
                    bounds.to_vec()
                } else {
                    return Err(GpError::InvalidValueError(format!(
                        "Bounds for theta should be either 1-dim or dim of xtrain ({}), got {}",
                        dim,
                        bounds.len()
                    )));
                };

                let (theta_inits, log_bounds) =
                    prepare_multistart(self.n_start(), &theta0, &bounds, self.seed());
                debug!(
                    "Optimize with multistart theta = {theta_inits:?} and bounds = {log_bounds:?}"
                );
                let now = Instant::now();
                let opt_params = (0..theta_inits.nrows())
                    .into_par_iter()
                    .map(|i| {
                        optimize_params(
                            &objfn,
                            &theta_inits.row(i).to_owned(),
                            &log_bounds,
                            CobylaParams {
                                maxeval: (10 * theta_inits.ncols())
                                    .clamp(GP_COBYLA_MIN_EVAL, self.max_eval()),
                                ..CobylaParams::default()
                            },
                        )
                    })
                    .reduce(
                        || (f64::INFINITY, Array::ones((theta_inits.ncols(),))),
                        |a, b| if b.0 < a.0 { b } else { a },
                    );
                debug!("elapsed optim = {:?}", now.elapsed().as_millis());

                if opt_params.0.is_infinite() {
                    warn!("Likelihood optimization failed from every start, keep initial theta");
                    theta0
                } else {
                    let mut theta = opt_params.1.mapv(|v| F::cast(base.powf(v)));
                    theta
                        .iter_mut()
                        .zip(bounds.iter())
                        .for_each(|(t, (lo, up))| *t = clamp_to_bounds(*t, *lo, *up));
                    theta
                }
            }
        };

        let rxx = self.corr().value(&x_distances.diffs, &opt_params);
        let (lkh, inner_params) = log_likelihood(rxx, &x_distances, &ytrain, self.noise())?;
        debug!("GP fitted with theta = {opt_params} and log likelihood = {lkh}");
        Ok(GaussianProcess {
            theta: opt_params,
            likelihood: lkh,
            inner_params,
            yt_norm: ytrain,
            training_data: (x.to_owned(), y.remove_axis(Axis(1))),
            params: self.clone(),
        })
    }
}

fn clamp_to_bounds<F: Float>(v: F, lo: F, up: F) -> F {
    if v < lo {
        lo
    } else if v > up {
        up
    } else {
        v
    }
}

/// Compute the log marginal likelihood of the training outputs
/// rxx: correlation factors at x samples,
/// x_distances: pairwise distances between x samples
/// ytrain: (normalized) output training values
/// noise: variance added to the diagonal of the covariance matrix
fn log_likelihood<F: Float>(
    rxx: ArrayBase<impl Data<Elem = F>, Ix1>,
    x_distances: &PairDistances<F>,
    ytrain: &Standardized<F>,
    noise: F,
) -> Result<(F, GpInnerParams<F>)> {
    let n_obs = x_distances.n_obs;
    // Set up K + noise.I
    let mut r_mx: Array2<F> = Array2::<F>::eye(n_obs).mapv(|v| v + v * noise);
    for (&(i, j), &r) in x_distances.pairs.iter().zip(rxx.iter()) {
        r_mx[[i, j]] = r;
        r_mx[[j, i]] = r;
    }
    // K cholesky decomposition
    let r_chol = r_mx
        .cholesky()
        .map_err(|source| GpError::NumericalInstability {
            n_obs,
            noise: noise.to_f64().unwrap_or(f64::NAN),
            source,
        })?;
    let v = r_chol.solve_triangular(&ytrain.values, UPLO::Lower)?;
    let data_fit = v.mapv(|v| v * v).sum();
    let alpha = r_chol.t().solve_triangular_into(v, UPLO::Upper)?;

    // The determinant of K is equal to the squared product of
    // the diagonal elements of its Cholesky decomposition r_chol
    let half_logdet = r_chol.diag().mapv(|v: F| v.ln()).sum();
    let n = F::cast(n_obs);
    let two_pi = F::cast(2. * std::f64::consts::PI);
    let likelihood =
        -F::cast(0.5) * data_fit - half_logdet - F::cast(0.5) * n * two_pi.ln();

    Ok((likelihood, GpInnerParams { r_chol, alpha }))
}
