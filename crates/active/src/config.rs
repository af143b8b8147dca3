//! Active learner configuration.
use crate::errors::{ActiveError, Result};
use gpal_doe::Grid;
use gpal_gp::correlation_models::Kernel;
use gpal_gp::{GpParams, GpValidParams, ThetaTuning};
use linfa::ParamGuard;
use ndarray::{Array2, ArrayBase, Data, Ix2};

use serde::{Deserialize, Serialize};

/// Default maximum number of iterations
pub const DEFAULT_MAX_ITERS: usize = 20;
/// Default uncertainty threshold
pub const DEFAULT_THRESHOLD: f64 = 0.1;
/// Default half width of the uniform perturbation of selected candidates
pub const DEFAULT_JITTER: f64 = 0.5;
/// Default number of initial random observations
pub const DEFAULT_N_DOE: usize = 5;
/// Max number of points of the candidate grid built from `n_levels`
/// (e.g. 100 levels in 3 dimensions). Beyond, candidates have to be given explicitly.
pub const MAX_GRID_POINTS: usize = 1_000_000;

/// Validated active learner configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidActiveLearnerConfig {
    /// Max number of iterations (aka iteration budget)
    pub(crate) max_iters: usize,
    /// Uncertainty threshold: candidates with a posterior std above it are queried
    pub(crate) threshold: f64,
    /// Kernel of the GP
    pub(crate) kernel: Kernel,
    /// Initial length scale, shared by all input components
    pub(crate) length_scale: f64,
    /// Length scale search space (lower, upper)
    pub(crate) length_scale_bounds: (f64, f64),
    /// Whether length scales are optimized by likelihood maximization at each fit
    pub(crate) optimize_length_scale: bool,
    /// Noise variance added to the covariance diagonal
    pub(crate) noise_variance: f64,
    /// Whether observations are centered and scaled before fitting
    pub(crate) normalize_y: bool,
    /// Half width of the uniform perturbation applied to selected candidates
    pub(crate) jitter: f64,
    /// Number of restarts of the GP hyperparameters optimization
    pub(crate) n_start: usize,
    /// Number of initial observations drawn uniformly at random
    /// Note: ignored when an initial `doe` is given
    pub(crate) n_doe: usize,
    /// Initial doe can be either \[x\] with x inputs only or an evaluated doe \[x, y\]
    /// Note: x dimension is determined using `xlimits.nrows()`
    pub(crate) doe: Option<Array2<f64>>,
    /// Number of grid levels per component of the candidate set
    /// Note: ignored when explicit `candidates` are given
    pub(crate) n_levels: usize,
    /// Explicit candidate set
    pub(crate) candidates: Option<Array2<f64>>,
    /// A random generator seed used to get reproductible results.
    pub(crate) seed: Option<u64>,
}

impl Default for ValidActiveLearnerConfig {
    fn default() -> Self {
        ValidActiveLearnerConfig {
            max_iters: DEFAULT_MAX_ITERS,
            threshold: DEFAULT_THRESHOLD,
            kernel: Kernel::default(),
            length_scale: ThetaTuning::<f64>::DEFAULT_INIT,
            length_scale_bounds: ThetaTuning::<f64>::DEFAULT_BOUNDS,
            optimize_length_scale: true,
            noise_variance: 1e-10,
            normalize_y: false,
            jitter: DEFAULT_JITTER,
            n_start: gpal_gp::GP_OPTIM_N_START,
            n_doe: DEFAULT_N_DOE,
            doe: None,
            n_levels: gpal_doe::GRID_DEFAULT_LEVELS,
            candidates: None,
            seed: None,
        }
    }
}

impl ValidActiveLearnerConfig {
    /// Max number of iterations
    pub fn max_iters(&self) -> usize {
        self.max_iters
    }

    /// Uncertainty threshold
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Kernel of the GP
    pub fn kernel(&self) -> Kernel {
        self.kernel
    }

    /// Half width of the candidate perturbation
    pub fn jitter(&self) -> f64 {
        self.jitter
    }

    /// Random generator seed if any
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Serialize the configuration as a JSON string
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// GP parameters used at each fit, the likelihood optimization restarts
    /// being seeded with `seed`.
    pub(crate) fn gp_params(&self, seed: u64) -> Result<GpValidParams<f64, Kernel>> {
        let params = GpParams::new(self.kernel);
        let params = if self.optimize_length_scale {
            params
                .length_scale(self.length_scale)
                .length_scale_bounds(self.length_scale_bounds)
        } else {
            params.fixed_length_scale(self.length_scale)
        };
        let params = params
            .noise(self.noise_variance)
            .normalize_y(self.normalize_y)
            .n_start(self.n_start)
            .seed(Some(seed))
            .check()?;
        Ok(params)
    }

    /// Check the configuration against the design space `xlimits` (nx, 2)
    pub(crate) fn check_within(
        &self,
        xlimits: &ArrayBase<impl Data<Elem = f64>, Ix2>,
    ) -> Result<()> {
        if xlimits.ncols() != 2 || xlimits.nrows() == 0 {
            return Err(ActiveError::InvalidConfigError(format!(
                "Design space should be given as a (nx, 2) matrix with nx > 0, got {:?}",
                xlimits.dim()
            )));
        }
        if xlimits
            .rows()
            .into_iter()
            .any(|row| !row[0].is_finite() || !row[1].is_finite() || !(row[0] <= row[1]))
        {
            return Err(ActiveError::InvalidConfigError(
                "Design space bounds should be finite (lower, upper) with lower <= upper"
                    .to_string(),
            ));
        }
        let nx = xlimits.nrows();
        if let Some(doe) = self.doe.as_ref() {
            if doe.ncols() != nx && doe.ncols() != nx + 1 {
                return Err(ActiveError::InvalidConfigError(format!(
                    "Initial doe should have {} (x only) or {} ([x, y]) columns, got {}",
                    nx,
                    nx + 1,
                    doe.ncols()
                )));
            }
        }
        match self.candidates.as_ref() {
            Some(candidates) if candidates.ncols() != nx => {
                return Err(ActiveError::InvalidConfigError(format!(
                    "Candidates should have {} columns, got {}",
                    nx,
                    candidates.ncols()
                )));
            }
            Some(_) => (),
            None => {
                let n_points = match self.n_levels {
                    0 => None,
                    n_levels => Grid::new(xlimits).levels(n_levels).n_points(),
                };
                if !n_points.is_some_and(|n| n <= MAX_GRID_POINTS) {
                    return Err(ActiveError::InvalidConfigError(format!(
                        "Candidate grid of {}^{} points should hold between 1 and {} points: \
                         set n_levels accordingly or give candidates explicitly",
                        self.n_levels, nx, MAX_GRID_POINTS
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Active learner configuration builder
#[derive(Clone, Debug, Default)]
pub struct ActiveLearnerConfig(ValidActiveLearnerConfig);

impl ActiveLearnerConfig {
    /// Sets allowed number of iterations
    pub fn max_iters(mut self, max_iters: usize) -> Self {
        self.0.max_iters = max_iters;
        self
    }

    /// Sets the uncertainty threshold above which candidates are queried
    pub fn threshold(mut self, threshold: f64) -> Self {
        self.0.threshold = threshold;
        self
    }

    /// Sets the kernel of the GP
    pub fn kernel(mut self, kernel: Kernel) -> Self {
        self.0.kernel = kernel;
        self
    }

    /// Sets the initial length scale
    pub fn length_scale(mut self, length_scale: f64) -> Self {
        self.0.length_scale = length_scale;
        self
    }

    /// Sets the length scale search space
    pub fn length_scale_bounds(mut self, bounds: (f64, f64)) -> Self {
        self.0.length_scale_bounds = bounds;
        self
    }

    /// Enables or disables the length scale optimization at each fit.
    /// When disabled the initial length scale is used as is.
    pub fn optimize_length_scale(mut self, optimize: bool) -> Self {
        self.0.optimize_length_scale = optimize;
        self
    }

    /// Sets the noise variance added to the covariance diagonal
    pub fn noise_variance(mut self, noise_variance: f64) -> Self {
        self.0.noise_variance = noise_variance;
        self
    }

    /// Enables centering and scaling of observations before fitting
    pub fn normalize_y(mut self, normalize_y: bool) -> Self {
        self.0.normalize_y = normalize_y;
        self
    }

    /// Sets the half width of the uniform perturbation of selected candidates,
    /// 0 means candidates are queried as is
    pub fn jitter(mut self, jitter: f64) -> Self {
        self.0.jitter = jitter;
        self
    }

    /// Sets the number of runs of GP hyperparameters optimizer
    pub fn n_start(mut self, n_start: usize) -> Self {
        self.0.n_start = n_start;
        self
    }

    /// Sets the number of initial observations drawn uniformly at random
    pub fn n_doe(mut self, n_doe: usize) -> Self {
        self.0.n_doe = n_doe;
        self
    }

    /// Sets an initial DOE containing ns samples.
    ///
    /// Either nt = nx then only x are specified and ns evals are done to get y doe values,
    /// or nt = nx + 1 then x = doe(:, :nx) and y = doe(:, nx) are specified
    pub fn doe(mut self, doe: &Array2<f64>) -> Self {
        self.0.doe = Some(doe.to_owned());
        self
    }

    /// Sets the number of grid levels per component of the candidate set
    pub fn n_levels(mut self, n_levels: usize) -> Self {
        self.0.n_levels = n_levels;
        self
    }

    /// Sets an explicit candidate set, as a (nc, nx) matrix, instead of the grid
    pub fn candidates(mut self, candidates: &Array2<f64>) -> Self {
        self.0.candidates = Some(candidates.to_owned());
        self
    }

    /// Allow to specify a seed for random number generator to allow
    /// reproducible runs.
    pub fn seed(mut self, seed: u64) -> Self {
        self.0.seed = Some(seed);
        self
    }

    /// Read a configuration from a JSON string, unspecified options taking their default value
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(ActiveLearnerConfig(serde_json::from_str(json)?))
    }

    /// Serialize the configuration as a JSON string
    pub fn to_json(&self) -> Result<String> {
        self.0.to_json()
    }
}

impl From<ValidActiveLearnerConfig> for ActiveLearnerConfig {
    fn from(valid: ValidActiveLearnerConfig) -> Self {
        ActiveLearnerConfig(valid)
    }
}

impl ParamGuard for ActiveLearnerConfig {
    type Checked = ValidActiveLearnerConfig;
    type Error = ActiveError;

    fn check_ref(&self) -> Result<&Self::Checked> {
        let config = &self.0;
        if config.threshold.is_nan() {
            return Err(ActiveError::InvalidConfigError(
                "Uncertainty threshold should be a number".to_string(),
            ));
        }
        if !(config.jitter >= 0.) || !config.jitter.is_finite() {
            return Err(ActiveError::InvalidConfigError(format!(
                "Jitter should be positive or null, got {}",
                config.jitter
            )));
        }
        if config.doe.is_none() && config.n_doe == 0 {
            return Err(ActiveError::InvalidConfigError(
                "At least one initial observation is required (n_doe > 0)".to_string(),
            ));
        }
        if config.doe.as_ref().map_or(false, |doe| doe.nrows() == 0) {
            return Err(ActiveError::InvalidConfigError(
                "Initial doe should contain at least one sample".to_string(),
            ));
        }
        if config.candidates.is_none() && config.n_levels == 0 {
            return Err(ActiveError::InvalidConfigError(
                "Candidate grid requires at least one level per component".to_string(),
            ));
        }
        let (lo, up) = config.length_scale_bounds;
        if !(lo > 0.) || !(lo <= up) || !up.is_finite() {
            return Err(ActiveError::InvalidConfigError(format!(
                "Length scale bounds should satisfy 0 < lower <= upper, got ({lo}, {up})"
            )));
        }
        if !(config.length_scale > 0.) || !config.length_scale.is_finite() {
            return Err(ActiveError::InvalidConfigError(format!(
                "Length scale should be positive, got {}",
                config.length_scale
            )));
        }
        config.gp_params(0)?;
        Ok(config)
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_default_config() {
        let config = ActiveLearnerConfig::default().check().expect("valid config");
        assert_eq!(config.max_iters(), 20);
        assert_abs_diff_eq!(config.threshold(), 0.1);
        assert_abs_diff_eq!(config.jitter(), 0.5);
        assert_eq!(config.kernel(), Kernel::SquaredExponential);
        assert_eq!(config.n_doe, 5);
        assert_eq!(config.n_levels, 100);
        assert_eq!(config.length_scale_bounds, (1e-5, 1e5));
        assert!(config.seed().is_none());
    }

    #[test]
    fn test_config_json() {
        let config = ActiveLearnerConfig::default()
            .max_iters(7)
            .kernel(Kernel::Matern52)
            .doe(&array![[0.], [5.]])
            .seed(42);
        let json = config.to_json().expect("serialization");
        let read = ActiveLearnerConfig::from_json(&json)
            .expect("deserialization")
            .check()
            .expect("valid config");
        assert_eq!(&read, config.check_ref().expect("valid config"));

        let partial = ActiveLearnerConfig::from_json(r#"{"threshold": 0.05, "jitter": 0.0}"#)
            .expect("deserialization")
            .check()
            .expect("valid config");
        assert_abs_diff_eq!(partial.threshold(), 0.05);
        assert_abs_diff_eq!(partial.jitter(), 0.);
        assert_eq!(partial.max_iters(), 20);
    }

    #[test]
    fn test_invalid_config() {
        let check = |config: ActiveLearnerConfig| {
            matches!(config.check(), Err(ActiveError::InvalidConfigError(_)))
        };
        assert!(check(ActiveLearnerConfig::default().jitter(-0.1)));
        assert!(check(ActiveLearnerConfig::default().threshold(f64::NAN)));
        assert!(check(ActiveLearnerConfig::default().n_doe(0)));
        assert!(check(ActiveLearnerConfig::default().n_levels(0)));
        assert!(check(ActiveLearnerConfig::default().length_scale(0.)));
        assert!(check(
            ActiveLearnerConfig::default().length_scale_bounds((1., 0.1))
        ));
        assert!(matches!(
            ActiveLearnerConfig::default().noise_variance(-1.).check(),
            Err(ActiveError::GpError(_))
        ));
        assert!(ActiveLearnerConfig::from_json("{\"max_iters\": -1}").is_err());
    }

    #[test]
    fn test_check_within() {
        let xlimits = array![[0., 10.]];
        let config = ActiveLearnerConfig::default()
            .doe(&array![[1., 2.], [3., 4.]])
            .check()
            .expect("valid config");
        assert!(config.check_within(&xlimits).is_ok());
        assert!(config.check_within(&array![[0., 1.], [0., 1.]]).is_ok());
        assert!(config
            .check_within(&array![[0., 1.], [0., 1.], [0., 1.]])
            .is_err());
        assert!(config.check_within(&array![[1., 0.]]).is_err());

        let config = ActiveLearnerConfig::default()
            .candidates(&array![[1., 2.]])
            .check()
            .expect("valid config");
        assert!(config.check_within(&xlimits).is_err());
    }

    #[test]
    fn test_check_within_grid_size() {
        let space = |nx: usize| Array2::from_shape_fn((nx, 2), |(_, j)| j as f64);
        let config = ActiveLearnerConfig::default()
            .check()
            .expect("valid config");
        // 100^3 points is the largest default grid
        assert!(config.check_within(&space(3)).is_ok());
        for nx in [4, 5, 10] {
            assert!(matches!(
                config.check_within(&space(nx)),
                Err(ActiveError::InvalidConfigError(_))
            ));
        }

        let config = ActiveLearnerConfig::default()
            .n_levels(10)
            .check()
            .expect("valid config");
        assert!(config.check_within(&space(6)).is_ok());
        assert!(config.check_within(&space(7)).is_err());

        let config = ActiveLearnerConfig::default()
            .candidates(&Array2::zeros((3, 10)))
            .check()
            .expect("valid config");
        assert!(config.check_within(&space(10)).is_ok());
    }
}
