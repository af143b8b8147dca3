use linfa::Float;
use ndarray::{s, Array1, Array2, ArrayBase, Axis, Data, Ix2};
#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};

/// Column-wise standardized (n, ny) values, with the statistics needed
/// to map predictions back to original units.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub(crate) struct Standardized<F: Float> {
    pub values: Array2<F>,
    pub mean: Array1<F>,
    pub scale: Array1<F>,
}

impl<F: Float> Standardized<F> {
    /// Center and scale the columns of `y`.
    /// The scale falls back to 1 for a constant column or a single row.
    pub fn new(y: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Standardized<F> {
        let ncols = y.ncols();
        let mean = y
            .mean_axis(Axis(0))
            .unwrap_or_else(|| Array1::zeros(ncols));
        let scale = if y.nrows() < 2 {
            Array1::ones(ncols)
        } else {
            y.std_axis(Axis(0), F::one())
                .mapv(|s| if s > F::zero() && s.is_finite() { s } else { F::one() })
        };
        Standardized {
            values: (y - &mean) / &scale,
            mean,
            scale,
        }
    }

    /// Values kept untouched: zero mean, unit scale
    pub fn unscaled(y: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Standardized<F> {
        Standardized {
            values: y.to_owned(),
            mean: Array1::zeros(y.ncols()),
            scale: Array1::ones(y.ncols()),
        }
    }
}

/// Absolute componentwise differences between every pair of distinct training
/// points, i.e. the strictly upper triangular part of the covariance matrix.
#[derive(Debug)]
pub struct PairDistances<F: Float> {
    /// (n_obs * (n_obs - 1) / 2, nx) differences
    pub diffs: Array2<F>,
    /// Row/column pair `(i, j)` with `i < j` of each difference
    pub pairs: Vec<(usize, usize)>,
    /// Number of training points
    pub n_obs: usize,
}

impl<F: Float> PairDistances<F> {
    /// Differences between the rows of (n_obs, nx) `x`, ordered by `i` then `j`
    pub fn new(x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> PairDistances<F> {
        let n_obs = x.nrows();
        let pairs: Vec<(usize, usize)> = (0..n_obs)
            .flat_map(|i| (i + 1..n_obs).map(move |j| (i, j)))
            .collect();
        let mut diffs = Array2::zeros((pairs.len(), x.ncols()));
        for (mut row, &(i, j)) in diffs.rows_mut().into_iter().zip(pairs.iter()) {
            row.assign(&(&x.row(i) - &x.row(j)).mapv(|v| v.abs()));
        }
        PairDistances {
            diffs,
            pairs,
            n_obs,
        }
    }
}

/// Signed differences `x_i - y_j` for every row `i` of `x` and `j` of `y`,
/// stacked as a (nrows(x) * nrows(y), nx) array with `j` varying fastest.
pub fn cross_differences<F: Float>(
    x: &ArrayBase<impl Data<Elem = F>, Ix2>,
    y: &ArrayBase<impl Data<Elem = F>, Ix2>,
) -> Array2<F> {
    debug_assert_eq!(x.ncols(), y.ncols());
    let ny = y.nrows();
    let mut diffs = Array2::zeros((x.nrows() * ny, x.ncols()));
    for (i, xi) in x.rows().into_iter().enumerate() {
        diffs
            .slice_mut(s![i * ny..(i + 1) * ny, ..])
            .assign(&(&xi - y));
    }
    diffs
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_pair_distances() {
        let x = array![[0., 1.], [2., -1.], [0.5, 4.]];
        let pd = PairDistances::new(&x);
        assert_eq!(pd.pairs, vec![(0, 1), (0, 2), (1, 2)]);
        assert_abs_diff_eq!(
            pd.diffs,
            array![[2., 2.], [0.5, 3.], [1.5, 5.]],
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_pair_distances_single_point() {
        let pd = PairDistances::new(&array![[1., 2.]]);
        assert_eq!(pd.diffs.dim(), (0, 2));
        assert!(pd.pairs.is_empty());
        assert_eq!(pd.n_obs, 1);
    }

    #[test]
    fn test_cross_differences() {
        let x = array![[1.], [3.]];
        let y = array![[0.], [0.5], [2.]];
        assert_abs_diff_eq!(
            cross_differences(&x, &y),
            array![[1.], [0.5], [-1.], [3.], [2.5], [1.]],
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_standardize_columns() {
        let y = array![[1.], [3.], [5.]];
        let st = Standardized::new(&y);
        assert_abs_diff_eq!(st.mean, array![3.], epsilon = 1e-12);
        assert_abs_diff_eq!(st.scale, array![2.], epsilon = 1e-12);
        assert_abs_diff_eq!(st.values, array![[-1.], [0.], [1.]], epsilon = 1e-12);
    }

    #[test]
    fn test_standardize_constant_output() {
        let st = Standardized::new(&array![[2.], [2.], [2.]]);
        assert_abs_diff_eq!(st.scale, array![1.], epsilon = 1e-12);
        assert_abs_diff_eq!(st.values, array![[0.], [0.], [0.]], epsilon = 1e-12);
    }

    #[test]
    fn test_standardize_single_row() {
        let st = Standardized::new(&array![[3.]]);
        assert_abs_diff_eq!(st.mean, array![3.], epsilon = 1e-12);
        assert_abs_diff_eq!(st.scale, array![1.], epsilon = 1e-12);
    }
}
