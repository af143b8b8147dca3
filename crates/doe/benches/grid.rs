use criterion::{criterion_group, criterion_main, Criterion};
use gpal_doe::{Grid, Random};
use ndarray::aview1;
use ndarray_rand::rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;

fn criterion_doe(c: &mut Criterion) {
    let dims = [1, 2, 3];

    let mut group = c.benchmark_group("doe");
    group.sample_size(10);
    let arr1 = aview1(&[0., 10.]);
    for dim in dims {
        let xlimits = arr1.broadcast((dim, 2)).unwrap();
        group.bench_function(format!("grid-{dim}-dim-50-levels"), |b| {
            b.iter(|| std::hint::black_box(Grid::new(&xlimits).levels(50).points()));
        });
        group.bench_function(format!("random-{dim}-dim-1000-size"), |b| {
            let doe = Random::new(&xlimits);
            let mut rng = Xoshiro256Plus::seed_from_u64(42);
            b.iter(|| std::hint::black_box(doe.sample_using(1000, &mut rng)));
        });
    }
    group.finish();
}

criterion_group!(benches, criterion_doe);
criterion_main!(benches);
