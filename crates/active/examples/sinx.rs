use gpal_active::ActiveLearnerBuilder;
use ndarray::{array, ArrayView1};

fn sinx(x: &ArrayView1<f64>) -> f64 {
    x[0].sin()
}

fn main() {
    let res = ActiveLearnerBuilder::learn(sinx)
        .configure(|config| config.n_doe(5).threshold(0.1).max_iters(20))
        .within(&array![[0., 10.]])
        .expect("Active learner configured")
        .run_with_callback(|record| {
            let max_std = record.std.iter().cloned().fold(0., f64::max);
            println!(
                "iter {:>2}: {:>3} observations, max std = {:.4}, {} points to add",
                record.iteration,
                record.x_data.nrows(),
                max_std,
                record.n_added
            );
        })
        .expect("Active learning of sinx");
    println!(
        "{:?} with {} observations",
        res.outcome,
        res.x_data.nrows()
    );
    if let Some(model) = res.model {
        println!("Learnt length scale = {}", model.length_scales());
    }
}
