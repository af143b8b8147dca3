use crate::space::{check_space, to_space};
use linfa::Float;
use ndarray::{Array, Array2, ArrayBase, Data, Ix2};
use ndarray_rand::{rand::Rng, rand_distr::Uniform, RandomExt};

/// The Random design draws samples uniformly within the design space.
///
/// It does not own a random generator: each draw advances the one given by the
/// caller, so that a seeded run threads a single generator through all its draws.
///
/// ```
/// use gpal_doe::Random;
/// use ndarray::arr2;
/// use ndarray_rand::rand::SeedableRng;
/// use rand_xoshiro::Xoshiro256Plus;
///
/// let mut rng = Xoshiro256Plus::seed_from_u64(42);
/// let doe = Random::new(&arr2(&[[0.0, 10.0], [-1.0, 1.0]]));
/// let x = doe.sample_using(5, &mut rng);
/// assert_eq!(x.dim(), (5, 2));
/// ```
#[derive(Clone, Debug)]
pub struct Random<F: Float> {
    /// (nx, 2) matrix, the ith row is the [lower_bound, upper_bound] of xi
    xlimits: Array2<F>,
}

impl<F: Float> Random<F> {
    /// Constructor given a design space as a (nx, 2) matrix \[\[lower bound, upper bound\], ...\]
    ///
    /// **Panics** if xlimits number of columns is different from 2.
    pub fn new(xlimits: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Self {
        check_space(xlimits);
        Random {
            xlimits: xlimits.to_owned(),
        }
    }

    /// The design space
    pub fn xlimits(&self) -> &Array2<F> {
        &self.xlimits
    }

    /// Draws `ns` points as a (ns, nx) matrix, advancing `rng`
    pub fn sample_using<R: Rng + ?Sized>(&self, ns: usize, rng: &mut R) -> Array2<F> {
        let unit = Array::random_using((ns, self.xlimits.nrows()), Uniform::new(0., 1.), rng)
            .mapv(|v| F::cast(v));
        to_space(&self.xlimits, unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{arr2, Axis};
    use ndarray_rand::rand::SeedableRng;
    use rand_xoshiro::Xoshiro256Plus;

    #[test]
    fn test_random_within_bounds() {
        let xlimits = arr2(&[[5., 10.], [0., 1.]]);
        let mut rng = Xoshiro256Plus::seed_from_u64(42);
        let actual = Random::new(&xlimits).sample_using(50, &mut rng);
        assert_eq!(actual.dim(), (50, 2));
        for (j, col) in actual.axis_iter(Axis(1)).enumerate() {
            assert!(col.iter().all(|&v| v >= xlimits[[j, 0]] && v < xlimits[[j, 1]]));
        }
    }

    #[test]
    fn test_random_reproducible() {
        let doe = Random::new(&arr2(&[[0., 10.]]));
        let first = doe.sample_using(5, &mut Xoshiro256Plus::seed_from_u64(42));
        let second = doe.sample_using(5, &mut Xoshiro256Plus::seed_from_u64(42));
        assert_abs_diff_eq!(first, second, epsilon = 0.);
    }

    #[test]
    fn test_random_advances_caller_rng() {
        let doe = Random::new(&arr2(&[[0., 1.]]));
        let mut rng = Xoshiro256Plus::seed_from_u64(0);
        let first = doe.sample_using(3, &mut rng);
        let second = doe.sample_using(3, &mut rng);
        assert!(first != second);
        let mut replay = Xoshiro256Plus::seed_from_u64(0);
        let both = doe.sample_using(6, &mut replay);
        assert_abs_diff_eq!(both.slice(ndarray::s![3.., ..]), second, epsilon = 0.);
    }

    #[test]
    fn test_random_degenerate_interval() {
        let mut rng = Xoshiro256Plus::seed_from_u64(1);
        let x = Random::new(&arr2(&[[2., 2.]])).sample_using(4, &mut rng);
        assert_abs_diff_eq!(x, arr2(&[[2.], [2.], [2.], [2.]]), epsilon = 0.);
    }
}
