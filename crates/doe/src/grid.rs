use crate::space::{check_space, to_space};
use linfa::Float;
use ndarray::{Array1, Array2, ArrayBase, Data, Ix2, Zip};

/// Default number of levels per component
pub const GRID_DEFAULT_LEVELS: usize = 100;

/// The Grid design is the Cartesian product of evenly spaced levels
/// taken in each component interval of the design space (bounds included).
///
/// Points are ordered with the first component varying fastest, that is
/// the row-major flattening of a `meshgrid` of the levels: with levels `x1 = [a, b]`
/// and `x2 = [c, d]` the grid is `[[a, c], [b, c], [a, d], [b, d]]`.
#[derive(Clone, Debug)]
pub struct Grid<F: Float> {
    /// Design space definition as a (nx, 2) matrix
    /// The ith row is the [lower_bound, upper_bound] of xi, the ith component of a sample x
    xlimits: Array2<F>,
    /// Number of levels of each component
    levels: Array1<usize>,
}

impl<F: Float> Grid<F> {
    /// Constructor given a design space as a (nx, 2) matrix
    /// \[\[lower bound, upper bound\], ...\]
    /// with [GRID_DEFAULT_LEVELS] levels per component.
    ///
    /// ```
    /// use gpal_doe::Grid;
    /// use ndarray::arr2;
    ///
    /// let grid = Grid::new(&arr2(&[[0.0, 10.0], [0.0, 10.0]]));
    /// assert_eq!(grid.n_points(), Some(10_000));
    /// ```
    ///
    /// **Panics** if xlimits number of columns is different from 2.
    pub fn new(xlimits: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Self {
        check_space(xlimits);
        Grid {
            xlimits: xlimits.to_owned(),
            levels: Array1::from_elem(xlimits.nrows(), GRID_DEFAULT_LEVELS),
        }
    }

    /// Set the same number of levels for every component
    ///
    /// **Panics** if `n_levels` is zero.
    pub fn levels(mut self, n_levels: usize) -> Self {
        if n_levels == 0 {
            panic!("Grid requires at least one level per component");
        }
        self.levels.fill(n_levels);
        self
    }

    /// Set the number of levels component by component
    ///
    /// **Panics** if `levels` length is not the design space dimension or if a level count is zero.
    pub fn levels_per_component(mut self, levels: &[usize]) -> Self {
        if levels.len() != self.xlimits.nrows() {
            panic!(
                "Expected {} level counts, got {}",
                self.xlimits.nrows(),
                levels.len()
            );
        }
        if levels.contains(&0) {
            panic!("Grid requires at least one level per component");
        }
        self.levels = Array1::from_vec(levels.to_vec());
        self
    }

    /// Total number of points of the grid, `None` when it does not fit in a `usize`
    pub fn n_points(&self) -> Option<usize> {
        self.levels
            .iter()
            .try_fold(1usize, |acc, &n| acc.checked_mul(n))
    }

    /// Generates all the points of the grid as a (n_points, nx) matrix
    ///
    /// **Panics** if the number of points overflows a `usize`, see [Grid::n_points].
    pub fn points(&self) -> Array2<F> {
        let n_points = match self.n_points() {
            Some(n) => n,
            None => panic!("Grid with {} levels is too large", self.levels),
        };
        let mut unit = Array2::<F>::zeros((n_points, self.levels.len()));
        Zip::indexed(unit.rows_mut()).for_each(|i, mut row| {
            let mut rest = i;
            for (j, &n) in self.levels.iter().enumerate() {
                let level = rest % n;
                rest /= n;
                row[j] = if n > 1 {
                    F::cast(level) / F::cast(n - 1)
                } else {
                    F::zero()
                };
            }
        });
        to_space(&self.xlimits, unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{arr2, array, Array, Array2, Axis};

    #[test]
    fn test_grid_1d_is_linspace() {
        let grid = Grid::new(&arr2(&[[0., 10.]])).levels(100).points();
        let expected = Array::linspace(0., 10., 100).insert_axis(Axis(1));
        assert_abs_diff_eq!(expected, grid, epsilon = 1e-12);
    }

    #[test]
    fn test_grid_2d_first_component_fastest() {
        let xlimits = arr2(&[[5., 10.], [0., 1.]]);
        let expected = array![
            [5., 0.],
            [7.5, 0.],
            [10., 0.],
            [5., 0.5],
            [7.5, 0.5],
            [10., 0.5],
            [5., 1.],
            [7.5, 1.],
            [10., 1.],
        ];
        let actual = Grid::new(&xlimits).levels(3).points();
        assert_abs_diff_eq!(expected, actual, epsilon = 1e-6);
    }

    #[test]
    fn test_grid_mesh_size() {
        let grid = Grid::new(&arr2(&[[0., 10.], [0., 10.]]));
        let mesh = grid.points();
        assert_eq!(mesh.dim(), (10_000, 2));
        assert_abs_diff_eq!(mesh[[99, 0]], 10., epsilon = 1e-12);
        assert_abs_diff_eq!(mesh[[99, 1]], 0., epsilon = 1e-12);
        assert_abs_diff_eq!(mesh[[100, 1]], 10. / 99., epsilon = 1e-12);
    }

    #[test]
    fn test_grid_levels_per_component() {
        let grid = Grid::new(&arr2(&[[0., 1.], [0., 1.]])).levels_per_component(&[2, 1]);
        assert_abs_diff_eq!(grid.points(), array![[0., 0.], [1., 0.]], epsilon = 1e-12);
    }

    #[test]
    fn test_grid_size_overflow() {
        let xlimits = Array2::from_shape_fn((10, 2), |(_, j)| j as f64);
        assert_eq!(Grid::new(&xlimits).n_points(), None);
        assert_eq!(
            Grid::new(&xlimits).levels(10).n_points(),
            10usize.checked_pow(10)
        );
        assert_eq!(Grid::new(&xlimits).levels(1).n_points(), Some(1));
    }

    #[test]
    #[should_panic(expected = "too large")]
    fn test_grid_points_overflow_panics() {
        let xlimits = Array2::from_shape_fn((10, 2), |(_, j)| j as f64);
        Grid::new(&xlimits).points();
    }
}
