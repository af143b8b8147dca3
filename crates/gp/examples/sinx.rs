use gpal_gp::Kriging;
use linfa::prelude::*;
use ndarray::{arr2, concatenate, Array, Array1, Array2, Axis};

fn sinx(x: &Array2<f64>) -> Array1<f64> {
    x.column(0).mapv(f64::sin)
}

fn main() {
    let xt = arr2(&[[0.0], [2.5], [5.0], [7.5], [10.0]]);
    let yt = sinx(&xt);

    println!("Train GP surrogate of 'sin' at {}", xt.column(0));
    let gp = Kriging::params()
        .seed(Some(42))
        .fit(&Dataset::new(xt, yt))
        .expect("GP fitting");
    println!("Fitted {gp}");
    println!("Length scales: {}", gp.length_scales());

    let xtest = Array::linspace(0., 10., 21).insert_axis(Axis(1));
    let ytest = sinx(&xtest);
    // predict values and standard deviations
    let (ypred, ysigma) = gp.predict_valstd(&xtest).expect("GP prediction");

    println!("Compute prediction errors (x, err(x), std(x))");
    println!(
        "{}",
        concatenate![
            Axis(1),
            xtest,
            (ypred - ytest).insert_axis(Axis(1)),
            ysigma.insert_axis(Axis(1))
        ]
    );
}
