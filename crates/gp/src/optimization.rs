use gpal_doe::Random;
use ndarray::{arr1, s};
use ndarray_rand::rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;

use ndarray::{Array1, Array2, Zip};

use linfa::prelude::Float;

pub(crate) struct CobylaParams {
    pub rhobeg: f64,
    pub ftol_rel: f64,
    pub maxeval: usize,
}

impl Default for CobylaParams {
    fn default() -> Self {
        CobylaParams {
            rhobeg: 0.5,
            ftol_rel: 1e-4,
            maxeval: 200,
        }
    }
}

/// Build the `n_start + 1` starting points of the likelihood optimization
/// in the log10 theta space: the given `theta0` first, then points drawn
/// uniformly within the bounds.
pub(crate) fn prepare_multistart<F: Float>(
    n_start: usize,
    theta0: &Array1<F>,
    bounds: &[(F, F)],
    seed: Option<u64>,
) -> (Array2<F>, Vec<(F, F)>) {
    // Use log10 theta as optimization parameter
    let bounds: Vec<(F, F)> = bounds
        .iter()
        .map(|(lo, up)| (lo.log10(), up.log10()))
        .collect();

    let mut theta0s = Array2::zeros((n_start + 1, theta0.len()));
    theta0s.row_mut(0).assign(&theta0.mapv(|v| F::log10(v)));

    if n_start > 0 {
        let mut xlimits: Array2<F> = Array2::zeros((bounds.len(), 2));
        Zip::from(xlimits.rows_mut())
            .and(&bounds)
            .for_each(|mut row, limits| row.assign(&arr1(&[limits.0, limits.1])));
        let mut rng = match seed {
            Some(seed) => Xoshiro256Plus::seed_from_u64(seed),
            None => Xoshiro256Plus::from_entropy(),
        };
        let starts = Random::new(&xlimits).sample_using(n_start, &mut rng);
        theta0s.slice_mut(s![1.., ..]).assign(&starts);
    }
    (theta0s, bounds)
}

/// Minimize `objfn` with cobyla given an initial guess and bounds.
///
/// Returns the best value found (infinity when the optimizer failed) and
/// the corresponding parameters.
pub(crate) fn optimize_params<ObjF, F>(
    objfn: &ObjF,
    param0: &Array1<F>,
    bounds: &[(F, F)],
    cobyla: CobylaParams,
) -> (f64, Array1<f64>)
where
    ObjF: Fn(&[f64]) -> f64,
    F: Float,
{
    use cobyla::{minimize, Func, StopTols};

    let cons: Vec<&dyn Func<()>> = vec![];
    let param0 = param0.iter().map(into_f64).collect::<Vec<_>>();

    let bounds: Vec<_> = bounds
        .iter()
        .map(|(lo, up)| (into_f64(lo), into_f64(up)))
        .collect();

    match minimize(
        |x: &[f64], _u: &mut ()| objfn(x),
        &param0,
        &bounds,
        &cons,
        (),
        cobyla.maxeval,
        cobyla::RhoBeg::All(cobyla.rhobeg),
        Some(StopTols {
            ftol_rel: cobyla.ftol_rel,
            ..StopTols::default()
        }),
    ) {
        Ok((_, x_opt, fval)) => {
            let params_opt = arr1(&x_opt);
            let fval = if f64::is_nan(fval) {
                f64::INFINITY
            } else {
                fval
            };
            (fval, params_opt)
        }
        Err((status, x_opt, _)) => {
            log::warn!("Cobyla optimizer failure in GP fitting status={status:?}");
            (f64::INFINITY, arr1(&x_opt))
        }
    }
}

#[inline(always)]
fn into_f64<F: Float>(v: &F) -> f64 {
    v.to_f64().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_prepare_multistart() {
        let (starts, bounds) =
            prepare_multistart(4, &array![1., 10.], &[(1e-2, 1e2), (1e-2, 1e2)], Some(42));
        assert_eq!(starts.dim(), (5, 2));
        assert_abs_diff_eq!(starts.row(0), array![0., 1.]);
        assert_eq!(bounds, vec![(-2., 2.), (-2., 2.)]);
        assert!(starts.iter().all(|v| (-2. ..=2.).contains(v)));

        let (same, _) =
            prepare_multistart(4, &array![1., 10.], &[(1e-2, 1e2), (1e-2, 1e2)], Some(42));
        assert_abs_diff_eq!(starts, same);
    }

    #[test]
    fn test_optimize_params() {
        let objfn = |x: &[f64]| (x[0] - 1.).powi(2) + (x[1] + 0.5).powi(2);
        let (fmin, xmin) = optimize_params(
            &objfn,
            &array![0., 0.],
            &[(-2., 2.), (-2., 2.)],
            CobylaParams::default(),
        );
        assert_abs_diff_eq!(fmin, 0., epsilon = 1e-4);
        assert_abs_diff_eq!(xmin, array![1., -0.5], epsilon = 1e-2);
    }
}
