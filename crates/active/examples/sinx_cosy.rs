use gpal_active::{ActiveLearnerBuilder, IterationRecord};
use ndarray::{array, ArrayView1};
use std::sync::{Arc, Mutex};

fn sinx_cosy(x: &ArrayView1<f64>) -> f64 {
    x[0].sin() * x[1].cos()
}

fn main() {
    // Fitting cost grows as the cube of the number of observations:
    // the mesh is kept coarse as every uncertain node is queried at each iteration
    let last_record: Arc<Mutex<Option<IterationRecord<f64>>>> = Arc::new(Mutex::new(None));
    let recorder = last_record.clone();

    let res = ActiveLearnerBuilder::learn(sinx_cosy)
        .configure(|config| config.n_doe(10).n_levels(30).max_iters(5).seed(42))
        .within(&array![[0., 10.], [0., 10.]])
        .expect("Active learner configured")
        .run_with_callback(move |record| {
            *recorder.lock().expect("recorder lock") = Some(record.clone());
        })
        .expect("Active learning of sinx_cosy");

    println!(
        "{:?} after {} iterations with {} observations",
        res.outcome,
        res.history.len(),
        res.x_data.nrows()
    );
    if let Some(record) = last_record.lock().expect("recorder lock").as_ref() {
        let err = record
            .candidates
            .rows()
            .into_iter()
            .zip(record.mean.iter())
            .map(|(x, m)| (sinx_cosy(&x) - m).abs())
            .fold(0., f64::max);
        println!(
            "Last iteration: max |f - mean| = {:.4} over {} mesh nodes",
            err,
            record.candidates.nrows()
        );
    };
}
