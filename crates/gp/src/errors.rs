use thiserror::Error;

/// A result type for GP regression algorithm
pub type Result<T> = std::result::Result<T, GpError>;

/// An error when fitting or using a [`GaussianProcess`](crate::GaussianProcess)
#[derive(Error, Debug)]
pub enum GpError {
    /// When the covariance matrix cannot be factorized even with the noise added on its diagonal
    #[error(
        "Covariance matrix of {n_obs} observations is not positive definite \
        (noise variance {noise:e}), consider increasing the noise: {source}"
    )]
    NumericalInstability {
        /// Number of training observations
        n_obs: usize,
        /// Noise variance added on the diagonal
        noise: f64,
        /// Factorization failure
        #[source]
        source: linfa_linalg::LinalgError,
    },
    /// When prediction is requested before any successful fit
    #[error("Gaussian process is not fitted, call fit() before predict()")]
    UnfittedModel,
    /// When linear algebra computation fails
    #[error(transparent)]
    LinalgError(#[from] linfa_linalg::LinalgError),
    /// When a linfa error occurs
    #[error(transparent)]
    LinfaError(#[from] linfa::error::Error),
    /// When array reshaping fails
    #[error(transparent)]
    ShapeError(#[from] ndarray::ShapeError),
    /// When error due to a bad value
    #[error("InvalidValue error: {0}")]
    InvalidValueError(String),
}
