//! A module for the stationary correlation models (aka kernels) of the GP.
//!
//! The following correlation models are implemented:
//! * squared exponential (RBF),
//! * absolute exponential,
//! * matern 3/2,
//! * matern 5/2.
//!
//! All models are parameterized by `theta`, one positive value per input component,
//! equal to the inverse of the length scale of that component, and are unit-scaled:
//! the correlation of a point with itself is 1.
//!
//! [Kernel] selects one of them at construction time (e.g. from a configuration file).

use linfa::Float;
use ndarray::{Array1, ArrayBase, Axis, Data, Ix1, Ix2};
#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt;

/// A trait for using a correlation model in GP regression
pub trait CorrelationModel<F: Float>: Clone + Copy + Default + fmt::Display + Sync {
    /// Compute correlation values r(x, x') given componentwise differences `d` between
    /// pairs of points x and x' and `theta` parameters, where:
    /// `d`     : differences (n, nx)
    /// `theta` : inverse length scales (nx,)
    ///
    /// Returns the (n,) correlation values.
    fn value(
        &self,
        d: &ArrayBase<impl Data<Elem = F>, Ix2>,
        theta: &ArrayBase<impl Data<Elem = F>, Ix1>,
    ) -> Array1<F>;

    /// Correlation between two points `a` and `b`
    fn covariance(
        &self,
        a: &ArrayBase<impl Data<Elem = F>, Ix1>,
        b: &ArrayBase<impl Data<Elem = F>, Ix1>,
        theta: &ArrayBase<impl Data<Elem = F>, Ix1>,
    ) -> F {
        let d = (a - b).insert_axis(Axis(0));
        self.value(&d, theta)[0]
    }

    /// Number of hyperparameters for inputs of dimension `nx`
    fn n_params(&self, nx: usize) -> usize {
        nx
    }
}

macro_rules! impl_corr_name {
    ($corr:ident, $name:literal) => {
        impl From<$corr> for String {
            fn from(_item: $corr) -> String {
                $name.to_string()
            }
        }

        impl TryFrom<String> for $corr {
            type Error = &'static str;
            fn try_from(s: String) -> Result<Self, Self::Error> {
                if s == $name {
                    Ok(Self::default())
                } else {
                    Err(concat!(
                        "Bad string value for ",
                        stringify!($corr),
                        ", should be '",
                        $name,
                        "'"
                    ))
                }
            }
        }

        impl fmt::Display for $corr {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{}", $name)
            }
        }
    };
}

/// Squared exponential correlation model
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serializable",
    derive(Serialize, Deserialize),
    serde(into = "String"),
    serde(try_from = "String")
)]
pub struct SquaredExponentialCorr();

impl_corr_name!(SquaredExponentialCorr, "SquaredExponential");

impl<F: Float> CorrelationModel<F> for SquaredExponentialCorr {
    ///   nx
    /// prod exp( - |theta_l * d_l|^2 / 2 )
    ///  l=1
    fn value(
        &self,
        d: &ArrayBase<impl Data<Elem = F>, Ix2>,
        theta: &ArrayBase<impl Data<Elem = F>, Ix1>,
    ) -> Array1<F> {
        let theta2 = theta.mapv(|v| v * v);
        let r = d.mapv(|v| v * v).dot(&theta2);
        r.mapv(|v| F::exp(F::cast(-0.5) * v))
    }
}

/// Absolute exponential correlation model
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serializable",
    derive(Serialize, Deserialize),
    serde(into = "String"),
    serde(try_from = "String")
)]
pub struct AbsoluteExponentialCorr();

impl_corr_name!(AbsoluteExponentialCorr, "AbsoluteExponential");

impl<F: Float> CorrelationModel<F> for AbsoluteExponentialCorr {
    ///   nx
    /// prod exp( - theta_l * |d_l| )
    ///  l=1
    fn value(
        &self,
        d: &ArrayBase<impl Data<Elem = F>, Ix2>,
        theta: &ArrayBase<impl Data<Elem = F>, Ix1>,
    ) -> Array1<F> {
        let r = d.mapv(|v| v.abs()).dot(theta);
        r.mapv(|v| F::exp(-v))
    }
}

/// Matern 3/2 correlation model
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serializable",
    derive(Serialize, Deserialize),
    serde(into = "String"),
    serde(try_from = "String")
)]
pub struct Matern32Corr();

impl_corr_name!(Matern32Corr, "Matern32");

impl<F: Float> CorrelationModel<F> for Matern32Corr {
    ///   nx
    /// prod (1 + sqrt(3) * theta_l * |d_l|) exp( - sqrt(3) * theta_l * |d_l| )
    ///  l=1
    fn value(
        &self,
        d: &ArrayBase<impl Data<Elem = F>, Ix2>,
        theta: &ArrayBase<impl Data<Elem = F>, Ix1>,
    ) -> Array1<F> {
        let sqrt3 = F::cast(3.).sqrt();
        let theta_d = d.mapv(|v| v.abs()) * theta;

        let a = theta_d.map_axis(Axis(1), |row| {
            row.fold(F::one(), |acc, &v| acc * (F::one() + sqrt3 * v))
        });
        let b = theta_d.sum_axis(Axis(1)).mapv(|v| F::exp(-sqrt3 * v));
        a * b
    }
}

/// Matern 5/2 correlation model
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serializable",
    derive(Serialize, Deserialize),
    serde(into = "String"),
    serde(try_from = "String")
)]
pub struct Matern52Corr();

impl_corr_name!(Matern52Corr, "Matern52");

impl<F: Float> CorrelationModel<F> for Matern52Corr {
    ///   nx
    /// prod (1 + sqrt(5) * theta_l * |d_l| + (5/3) * theta_l^2 * d_l^2)
    ///     * exp(- sqrt(5) * theta_l * |d_l|)
    ///  l=1
    fn value(
        &self,
        d: &ArrayBase<impl Data<Elem = F>, Ix2>,
        theta: &ArrayBase<impl Data<Elem = F>, Ix1>,
    ) -> Array1<F> {
        let sqrt5 = F::cast(5.).sqrt();
        let div5_3 = F::cast(5. / 3.);
        let theta_d = d.mapv(|v| v.abs()) * theta;

        let a = theta_d.map_axis(Axis(1), |row| {
            row.fold(F::one(), |acc, &v| {
                acc * (F::one() + sqrt5 * v + div5_3 * v * v)
            })
        });
        let b = theta_d.sum_axis(Axis(1)).mapv(|v| F::exp(-sqrt5 * v));
        a * b
    }
}

/// Correlation model selected at runtime among the available ones
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub enum Kernel {
    /// see [SquaredExponentialCorr]
    #[default]
    SquaredExponential,
    /// see [AbsoluteExponentialCorr]
    AbsoluteExponential,
    /// see [Matern32Corr]
    Matern32,
    /// see [Matern52Corr]
    Matern52,
}

impl<F: Float> CorrelationModel<F> for Kernel {
    fn value(
        &self,
        d: &ArrayBase<impl Data<Elem = F>, Ix2>,
        theta: &ArrayBase<impl Data<Elem = F>, Ix1>,
    ) -> Array1<F> {
        match self {
            Kernel::SquaredExponential => {
                CorrelationModel::<F>::value(&SquaredExponentialCorr(), d, theta)
            }
            Kernel::AbsoluteExponential => {
                CorrelationModel::<F>::value(&AbsoluteExponentialCorr(), d, theta)
            }
            Kernel::Matern32 => CorrelationModel::<F>::value(&Matern32Corr(), d, theta),
            Kernel::Matern52 => CorrelationModel::<F>::value(&Matern52Corr(), d, theta),
        }
    }
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Kernel::SquaredExponential => write!(f, "{}", SquaredExponentialCorr()),
            Kernel::AbsoluteExponential => write!(f, "{}", AbsoluteExponentialCorr()),
            Kernel::Matern32 => write!(f, "{}", Matern32Corr()),
            Kernel::Matern52 => write!(f, "{}", Matern52Corr()),
        }
    }
}

impl std::str::FromStr for Kernel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SquaredExponential" | "RBF" => Ok(Kernel::SquaredExponential),
            "AbsoluteExponential" => Ok(Kernel::AbsoluteExponential),
            "Matern32" => Ok(Kernel::Matern32),
            "Matern52" => Ok(Kernel::Matern52),
            _ => Err(format!("Unknown kernel '{s}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::PairDistances;
    use approx::assert_abs_diff_eq;
    use ndarray::{arr1, array};
    use paste::paste;

    #[test]
    fn test_squared_exponential() {
        let xt = array![[4.5], [1.2], [2.0], [3.0], [4.0]];
        let dm = PairDistances::new(&xt);
        let res = SquaredExponentialCorr::default().value(&dm.diffs, &arr1(&[f64::sqrt(0.2)]));
        let expected = array![
            0.336552878364737,
            0.5352614285189903,
            0.7985162187593771,
            0.9753099120283326,
            0.9380049995307295,
            0.7232502423798424,
            0.4565760496233148,
            0.9048374180359595,
            0.6703200460356393,
            0.9048374180359595
        ];
        assert_abs_diff_eq!(res, expected, epsilon = 1e-6);
    }

    #[test]
    fn test_squared_exponential_length_scale() {
        // exp(-|a-b|^2 / (2 l^2)) with l = 2
        let l = 2.;
        let a = array![1., 2.];
        let b = array![3., 0.];
        let k = SquaredExponentialCorr().covariance(&a, &b, &array![1. / l, 1. / l]);
        assert_abs_diff_eq!(k, f64::exp(-8. / (2. * l * l)), epsilon = 1e-12);
    }

    #[test]
    fn test_matern32_value() {
        let d = array![[1.], [0.5]];
        let res = Matern32Corr().value(&d, &array![1.]);
        let s3 = f64::sqrt(3.);
        let expected = array![(1. + s3) * f64::exp(-s3), (1. + 0.5 * s3) * f64::exp(-0.5 * s3)];
        assert_abs_diff_eq!(res, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_matern52_value() {
        let d = array![[1., 2.]];
        let res = Matern52Corr().value(&d, &array![1., 0.5]);
        let s5 = f64::sqrt(5.);
        let one_dim = (1. + s5 + 5. / 3.) * f64::exp(-s5);
        assert_abs_diff_eq!(res[0], one_dim * one_dim, epsilon = 1e-12);
    }

    #[test]
    fn test_kernel_parsing() {
        assert_eq!("RBF".parse::<Kernel>(), Ok(Kernel::SquaredExponential));
        assert_eq!("Matern52".parse::<Kernel>(), Ok(Kernel::Matern52));
        assert!("Linear".parse::<Kernel>().is_err());
        assert_eq!(Kernel::Matern32.to_string(), "Matern32");
    }

    macro_rules! test_correlation {
        ($corr:ident) => {
            paste! {
                #[test]
                fn [<test_corr_ $corr:snake _properties>]() {
                    let corr = [<$corr Corr>]::default();
                    let kernel = Kernel::$corr;
                    let theta = array![0.7, 1.3];
                    let a = array![0.3, -1.2];
                    let b = array![2.1, 0.4];
                    let c = array![5.0, 4.0];

                    // symmetric
                    assert_abs_diff_eq!(
                        corr.covariance(&a, &b, &theta),
                        corr.covariance(&b, &a, &theta),
                        epsilon = 1e-14
                    );
                    // unit self correlation
                    assert_abs_diff_eq!(corr.covariance(&a, &a, &theta), 1.0, epsilon = 1e-14);
                    assert_abs_diff_eq!(corr.covariance(&c, &c, &theta), 1.0, epsilon = 1e-14);
                    // decreasing with distance
                    let near = corr.covariance(&a, &b, &theta);
                    let far = corr.covariance(&a, &c, &theta);
                    assert!(0. < far && far < near && near < 1.);
                    // same values through the runtime selection
                    assert_abs_diff_eq!(
                        kernel.covariance(&a, &b, &theta),
                        near,
                        epsilon = 1e-14
                    );
                    assert_eq!(kernel.to_string(), corr.to_string());
                }
            }
        };
    }

    test_correlation!(SquaredExponential);
    test_correlation!(AbsoluteExponential);
    test_correlation!(Matern32);
    test_correlation!(Matern52);
}
