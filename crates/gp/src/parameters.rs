use crate::correlation_models::CorrelationModel;
use crate::errors::{GpError, Result};
use crate::{GP_COBYLA_MAX_EVAL, GP_COBYLA_MIN_EVAL, GP_OPTIM_N_START};
use linfa::{Float, ParamGuard};

use ndarray::{array, Array1};
#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};

/// An enum to represent a n-dim hyper parameter tuning
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub enum ThetaTuning<F: Float> {
    /// Constant parameter (ie given not estimated)
    Fixed(Array1<F>),
    /// Parameter is optimized between given bounds (lower, upper) starting from the inital guess
    Full {
        /// Initial guess for the parameter
        init: Array1<F>,
        /// Bounds for the parameter array(lower, upper)
        bounds: Array1<(F, F)>,
    },
}

impl<F: Float> Default for ThetaTuning<F> {
    fn default() -> Self {
        ThetaTuning::Full {
            init: array![F::cast(ThetaTuning::<F>::DEFAULT_INIT)],
            bounds: array![(
                F::cast(ThetaTuning::<F>::DEFAULT_BOUNDS.0),
                F::cast(ThetaTuning::<F>::DEFAULT_BOUNDS.1),
            )],
        }
    }
}

impl<F: Float> ThetaTuning<F> {
    /// Default initial theta value (i.e. unit length scale)
    pub const DEFAULT_INIT: f64 = 1.;
    /// Default bounds for theta values
    pub const DEFAULT_BOUNDS: (f64, f64) = (1e-5, 1e5);

    /// Get initial theta value
    pub fn init(&self) -> &Array1<F> {
        match self {
            ThetaTuning::Full { init, bounds: _ } => init,
            ThetaTuning::Fixed(init) => init,
        }
    }

    /// Get bounds for theta value
    pub fn bounds(&self) -> Option<&Array1<(F, F)>> {
        match self {
            ThetaTuning::Full { init: _, bounds } => Some(bounds),
            ThetaTuning::Fixed(_) => None,
        }
    }
}

/// A set of validated GP parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serializable",
    derive(Serialize, Deserialize),
    serde(bound(
        serialize = "F: Serialize, Corr: Serialize",
        deserialize = "F: Deserialize<'de>, Corr: Deserialize<'de>"
    ))
)]
pub struct GpValidParams<F: Float, Corr: CorrelationModel<F>> {
    /// Parameter tuning hint of the autocorrelation model
    pub(crate) theta_tuning: ThetaTuning<F>,
    /// Correlation model representing the spatial correlation between errors at e(x) and e(x')
    pub(crate) corr: Corr,
    /// Number of internal likelihood optimization restart
    pub(crate) n_start: usize,
    /// Max number of internal likelihood evaluation during optimization
    pub(crate) max_eval: usize,
    /// Noise variance added to the diagonal of the covariance matrix
    pub(crate) noise: F,
    /// Whether training outputs are centered and scaled before fitting
    pub(crate) normalize_y: bool,
    /// Seed of the random restarts of the likelihood optimization
    pub(crate) seed: Option<u64>,
}

impl<F: Float, Corr: CorrelationModel<F>> Default for GpValidParams<F, Corr> {
    fn default() -> GpValidParams<F, Corr> {
        GpValidParams {
            theta_tuning: ThetaTuning::default(),
            corr: Corr::default(),
            n_start: GP_OPTIM_N_START,
            max_eval: GP_COBYLA_MAX_EVAL,
            noise: F::cast(1e-10),
            normalize_y: false,
            seed: None,
        }
    }
}

impl<F: Float, Corr: CorrelationModel<F>> GpValidParams<F, Corr> {
    /// Get correlation corr k(x, x')
    pub fn corr(&self) -> &Corr {
        &self.corr
    }

    /// Get starting theta value for optimization
    pub fn theta_tuning(&self) -> &ThetaTuning<F> {
        &self.theta_tuning
    }

    /// Get the number of internal optimization restart
    pub fn n_start(&self) -> usize {
        self.n_start
    }

    /// Get the max number of internal likelihood evaluations during one optimization
    pub fn max_eval(&self) -> usize {
        self.max_eval
    }

    /// Get noise variance
    pub fn noise(&self) -> F {
        self.noise
    }

    /// Whether outputs are normalized
    pub fn normalize_y(&self) -> bool {
        self.normalize_y
    }

    /// Get the seed of the optimization restarts if any
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}

#[derive(Clone, Debug)]
/// The set of hyperparameters that can be specified for the execution of
/// the [GP algorithm](struct.GaussianProcess.html).
pub struct GpParams<F: Float, Corr: CorrelationModel<F>>(GpValidParams<F, Corr>);

impl<F: Float, Corr: CorrelationModel<F>> GpParams<F, Corr> {
    /// A constructor for GP parameters given a correlation model
    pub fn new(corr: Corr) -> GpParams<F, Corr> {
        Self(GpValidParams {
            corr,
            ..Default::default()
        })
    }

    /// A constructor for GP parameters from validated parameters
    pub fn new_from_valid(params: &GpValidParams<F, Corr>) -> Self {
        Self(params.clone())
    }

    /// Set correlation model.
    pub fn corr(mut self, corr: Corr) -> Self {
        self.0.corr = corr;
        self
    }

    /// Set value for theta hyper parameter.
    ///
    /// When theta is optimized, the internal optimization is started from `theta_init`.
    /// When theta is fixed, this set theta constant value.
    pub fn theta_init(mut self, theta_init: Array1<F>) -> Self {
        self.0.theta_tuning = match self.0.theta_tuning {
            ThetaTuning::Full { init: _, bounds } => ThetaTuning::Full {
                init: theta_init,
                bounds,
            },
            ThetaTuning::Fixed(_) => ThetaTuning::Fixed(theta_init),
        };
        self
    }

    /// Set theta hyper parameter search space.
    ///
    /// This function is no-op when theta tuning is fixed
    pub fn theta_bounds(mut self, theta_bounds: Array1<(F, F)>) -> Self {
        self.0.theta_tuning = match self.0.theta_tuning {
            ThetaTuning::Full { init, bounds: _ } => ThetaTuning::Full {
                init,
                bounds: theta_bounds,
            },
            ThetaTuning::Fixed(f) => ThetaTuning::Fixed(f),
        };
        self
    }

    /// Set theta hyper parameter tuning
    pub fn theta_tuning(mut self, theta_tuning: ThetaTuning<F>) -> Self {
        self.0.theta_tuning = theta_tuning;
        self
    }

    /// Set the initial length scale shared by all input components (theta = 1 / length_scale).
    pub fn length_scale(self, length_scale: F) -> Self {
        self.theta_init(array![F::one() / length_scale])
    }

    /// Set the length scale search space (lower, upper) shared by all input components.
    pub fn length_scale_bounds(self, bounds: (F, F)) -> Self {
        self.theta_bounds(array![(F::one() / bounds.1, F::one() / bounds.0)])
    }

    /// Keep the length scale constant (no likelihood optimization).
    pub fn fixed_length_scale(mut self, length_scale: F) -> Self {
        self.0.theta_tuning = ThetaTuning::Fixed(array![F::one() / length_scale]);
        self
    }

    /// Set the number of internal GP hyperparameter theta optimization restarts
    pub fn n_start(mut self, n_start: usize) -> Self {
        self.0.n_start = n_start;
        self
    }

    /// Set the max number of internal likelihood evaluations during one optimization
    /// Given max_eval has to be greater than [crate::GP_COBYLA_MIN_EVAL] otherwise
    /// max_eval is set to [crate::GP_COBYLA_MIN_EVAL].
    pub fn max_eval(mut self, max_eval: usize) -> Self {
        self.0.max_eval = GP_COBYLA_MIN_EVAL.max(max_eval);
        self
    }

    /// Set noise variance.
    ///
    /// Added to the diagonal of the covariance matrix, it models observation noise
    /// and improves numerical stability
    pub fn noise(mut self, noise: F) -> Self {
        self.0.noise = noise;
        self
    }

    /// Center and scale training outputs before fitting
    pub fn normalize_y(mut self, normalize_y: bool) -> Self {
        self.0.normalize_y = normalize_y;
        self
    }

    /// Set the seed of the random restarts of the likelihood optimization
    pub fn seed(mut self, seed: Option<u64>) -> Self {
        self.0.seed = seed;
        self
    }
}

impl<F: Float, Corr: CorrelationModel<F>> From<GpValidParams<F, Corr>> for GpParams<F, Corr> {
    fn from(valid: GpValidParams<F, Corr>) -> Self {
        GpParams(valid)
    }
}

impl<F: Float, Corr: CorrelationModel<F>> ParamGuard for GpParams<F, Corr> {
    type Checked = GpValidParams<F, Corr>;
    type Error = GpError;

    fn check_ref(&self) -> Result<&Self::Checked> {
        if !(self.0.noise >= F::zero()) {
            return Err(GpError::InvalidValueError(format!(
                "Noise variance should be positive or null, got {}",
                self.0.noise
            )));
        }
        let init = self.0.theta_tuning.init();
        if init.is_empty() || init.iter().any(|v| !(*v > F::zero()) || !v.is_finite()) {
            return Err(GpError::InvalidValueError(format!(
                "Theta values (inverse length scales) should be positive and finite, got {init}"
            )));
        }
        if let Some(bounds) = self.0.theta_tuning.bounds() {
            if bounds.is_empty()
                || bounds
                    .iter()
                    .any(|(lo, up)| !(*lo > F::zero()) || !(lo <= up) || !up.is_finite())
            {
                return Err(GpError::InvalidValueError(
                    "Theta bounds should be given as (lower, upper) with 0 < lower <= upper"
                        .to_string(),
                ));
            }
        }
        Ok(&self.0)
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correlation_models::SquaredExponentialCorr;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_length_scale_helpers() {
        let params = GpParams::<f64, _>::new(SquaredExponentialCorr())
            .length_scale(2.)
            .length_scale_bounds((1e-2, 1e2))
            .check()
            .expect("valid params");
        assert_abs_diff_eq!(params.theta_tuning().init()[0], 0.5);
        let (lo, up) = params.theta_tuning().bounds().expect("bounds")[0];
        assert_abs_diff_eq!(lo, 1e-2);
        assert_abs_diff_eq!(up, 1e2);
    }

    #[test]
    fn test_fixed_length_scale() {
        let params = GpParams::<f64, _>::new(SquaredExponentialCorr())
            .fixed_length_scale(4.)
            .theta_bounds(array![(1., 2.)])
            .check()
            .expect("valid params");
        assert_eq!(params.theta_tuning(), &ThetaTuning::Fixed(array![0.25]));
    }

    #[test]
    fn test_invalid_params() {
        let negative_noise = GpParams::<f64, _>::new(SquaredExponentialCorr()).noise(-1.);
        assert!(matches!(
            negative_noise.check_ref(),
            Err(GpError::InvalidValueError(_))
        ));
        let null_theta = GpParams::<f64, _>::new(SquaredExponentialCorr()).theta_init(array![0.]);
        assert!(null_theta.check().is_err());
        let bad_bounds =
            GpParams::<f64, _>::new(SquaredExponentialCorr()).theta_bounds(array![(2., 1.)]);
        assert!(bad_bounds.check().is_err());
    }
}
