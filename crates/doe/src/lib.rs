/*!
This library implements the sampling methods used to explore a design space
during an active-learning run: uniform random designs, used to get the initial
observations, and regular grids, used as the fixed set of candidate locations
scanned for uncertainty at each iteration.

A sampling method generates a set of points within a design space `xlimits`,
a 2D ndarray `(nx, 2)` specifying lower bound and upper bound
of each of the `nx` components of the samples `x`.

Example:
```
use gpal_doe::{Grid, Random};
use ndarray::arr2;
use ndarray_rand::rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;

// Design space is defined as [0., 10.] x [0., 10.], samples are 2-dimensional.
let xlimits = arr2(&[[0., 10.], [0., 10.]]);
// Ten random samples, reproducible thanks to the seeded generator
let mut rng = Xoshiro256Plus::seed_from_u64(42);
let samples = Random::new(&xlimits).sample_using(10, &mut rng);
assert_eq!(samples.dim(), (10, 2));
// or the full 100 x 100 mesh
let mesh = Grid::new(&xlimits).levels(100).points();
assert_eq!(mesh.dim(), (10_000, 2));
```

This library contains two kinds of sampling methods:
* [Random Sampling](crate::Random),
* [Grid Sampling](crate::Grid)

*/
#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
mod grid;
mod random;
mod space;

pub use grid::*;
pub use random::*;
pub use space::to_space;
