use linfa::Float;
use ndarray::{Array2, ArrayBase, Data, Ix2};

/// **Panics** if `xlimits` is not a (nx, 2) matrix of \[lower bound, upper bound\] rows.
pub(crate) fn check_space<F: Float>(xlimits: &ArrayBase<impl Data<Elem = F>, Ix2>) {
    if xlimits.ncols() != 2 {
        panic!("xlimits must have 2 columns (lower, upper)");
    }
}

/// Maps (ns, nx) points of the unit hypercube `[0., 1.]^nx` to the design space
/// `xlimits`, i.e. `lower + unit * (upper - lower)` component-wise.
pub fn to_space<F: Float>(
    xlimits: &ArrayBase<impl Data<Elem = F>, Ix2>,
    unit: Array2<F>,
) -> Array2<F> {
    let lower = xlimits.column(0);
    let width = &xlimits.column(1) - &lower;
    unit * width + lower
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_to_space() {
        let xlimits = array![[-1., 1.], [10., 20.]];
        let unit = array![[0., 0.], [0.5, 1.], [1., 0.25]];
        assert_abs_diff_eq!(
            to_space(&xlimits, unit),
            array![[-1., 10.], [0., 20.], [1., 12.5]],
            epsilon = 1e-12
        );
    }
}
