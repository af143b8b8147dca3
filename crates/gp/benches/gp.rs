use criterion::{criterion_group, criterion_main, Criterion};
use gpal_doe::Random;
use gpal_gp::correlation_models::Kernel;
use gpal_gp::GaussianProcess;
use linfa::prelude::{Dataset, Fit};
use ndarray::{array, Array1, Zip};
use ndarray_rand::rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;

fn criterion_gp(c: &mut Criterion) {
    let dims = [1, 2, 5];
    let nts = [20, 50, 100];

    let mut group = c.benchmark_group("gp");
    group.sample_size(10);
    for (dim, nt) in dims.into_iter().zip(nts) {
        let lim = array![[0., 10.]];
        let xlimits = lim.broadcast((dim, 2)).unwrap();
        let mut rng = Xoshiro256Plus::seed_from_u64(42);
        let xt = Random::new(&xlimits).sample_using(nt, &mut rng);
        let mut yt: Array1<f64> = Array1::zeros(xt.nrows());
        Zip::from(&mut yt).and(xt.rows()).for_each(|y, x| {
            *y = x.mapv(f64::sin).product();
        });

        for kernel in [Kernel::SquaredExponential, Kernel::Matern52] {
            group.bench_function(format!("gp-{kernel}-{dim}-dim-{nt}-points"), |b| {
                b.iter(|| {
                    std::hint::black_box(
                        GaussianProcess::<f64, Kernel>::params(kernel)
                            .seed(Some(42))
                            .fit(&Dataset::new(xt.to_owned(), yt.to_owned()))
                            .expect("GP fit error"),
                    )
                });
            });
        }
    }
    group.finish();
}

criterion_group!(benches, criterion_gp);
criterion_main!(benches);
