//! A stateful GP regressor which can be refitted on growing training data.

use crate::algorithm::GaussianProcess;
use crate::correlation_models::CorrelationModel;
use crate::errors::{GpError, Result};
use crate::parameters::GpValidParams;

use linfa::prelude::{Dataset, Fit, Float};
use ndarray::{Array1, ArrayBase, Data, Ix1, Ix2};

/// A GP regressor holding its validated parameters and the model
/// of its last successful fit, if any.
///
/// Each call to [GpRegressor::fit] replaces the training data and recomputes
/// the whole posterior state. A failed fit leaves the regressor unfitted.
#[derive(Clone, Debug)]
pub struct GpRegressor<F: Float, Corr: CorrelationModel<F>> {
    params: GpValidParams<F, Corr>,
    model: Option<GaussianProcess<F, Corr>>,
}

impl<F: Float, Corr: CorrelationModel<F>> GpRegressor<F, Corr> {
    /// Constructor given validated parameters
    pub fn new(params: GpValidParams<F, Corr>) -> Self {
        GpRegressor {
            params,
            model: None,
        }
    }

    /// Fit the model on (n, nx) inputs and (n,) outputs
    pub fn fit(
        &mut self,
        x: &ArrayBase<impl Data<Elem = F>, Ix2>,
        y: &ArrayBase<impl Data<Elem = F>, Ix1>,
    ) -> Result<&GaussianProcess<F, Corr>> {
        self.model = None;
        let dataset = Dataset::new(x.to_owned(), y.to_owned());
        let model = self.params.fit(&dataset)?;
        Ok(self.model.insert(model))
    }

    /// Posterior mean and standard deviation at (n, nx) `x` query points
    pub fn predict(
        &self,
        x: &ArrayBase<impl Data<Elem = F>, Ix2>,
    ) -> Result<(Array1<F>, Array1<F>)> {
        self.model
            .as_ref()
            .ok_or(GpError::UnfittedModel)?
            .predict_valstd(x)
    }

    /// The model of the last successful fit
    pub fn model(&self) -> Option<&GaussianProcess<F, Corr>> {
        self.model.as_ref()
    }

    /// Consume the regressor, returning the fitted model
    pub fn into_model(self) -> Option<GaussianProcess<F, Corr>> {
        self.model
    }

    /// Whether the last fit succeeded
    pub fn is_fitted(&self) -> bool {
        self.model.is_some()
    }

    /// Parameters used at each fit
    pub fn params(&self) -> &GpValidParams<F, Corr> {
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correlation_models::Kernel;
    use crate::GpParams;
    use approx::assert_abs_diff_eq;
    use linfa::ParamGuard;
    use ndarray::array;

    fn regressor() -> GpRegressor<f64, Kernel> {
        let params = GpParams::new(Kernel::SquaredExponential)
            .seed(Some(42))
            .check()
            .expect("valid params");
        GpRegressor::new(params)
    }

    #[test]
    fn test_predict_before_fit() {
        let gpr = regressor();
        assert!(!gpr.is_fitted());
        assert!(matches!(
            gpr.predict(&array![[1.]]),
            Err(GpError::UnfittedModel)
        ));
    }

    #[test]
    fn test_refit_replaces_data() {
        let mut gpr = regressor();
        gpr.fit(&array![[0.], [5.]], &array![0., 1.])
            .expect("GP fit error");
        let model = gpr
            .fit(&array![[0.], [2.5], [5.]], &array![0., 0.5, 1.])
            .expect("GP fit error");
        assert_eq!(model.training_data().0.nrows(), 3);
        let (mean, std) = gpr.predict(&array![[2.5]]).expect("prediction error");
        assert_abs_diff_eq!(mean[0], 0.5, epsilon = 1e-3);
        assert!(std[0] >= 0.);
    }

    #[test]
    fn test_failed_fit_leaves_regressor_unfitted() {
        let params = GpParams::new(Kernel::Matern32)
            .fixed_length_scale(1.)
            .noise(0.)
            .check()
            .expect("valid params");
        let mut gpr = GpRegressor::new(params);
        gpr.fit(&array![[0.], [1.]], &array![0., 1.])
            .expect("GP fit error");
        assert!(gpr.is_fitted());
        let res = gpr.fit(&array![[1.], [1.]], &array![1., 1.]);
        assert!(matches!(res, Err(GpError::NumericalInstability { .. })));
        assert!(!gpr.is_fitted());
    }
}
