// Logistic regression trained by incremental gradient descent on graphs built
// with the public API. Exercises Env-based evaluation, backpropagation through
// exp/log/div, and gradient lookup by variable name.

use mll::graph::{Dag, Env, OpId};

/// prediction = σ(w0 + Σ wᵢ·xᵢ): the model probability of label 1.
fn forward_graph(dag: &mut Dag, dim: usize) -> OpId {
    let mut eta = dag.lit0();
    for v in 0..=dim {
        let xv = if v == 0 { dag.lit1() } else { dag.var(&format!("x{}", v)) };
        let wv = dag.var(&format!("w{}", v));
        let term = dag.mul(wv, xv);
        eta = dag.add(eta, term);
    }
    let neg = dag.neg(eta);
    let e = dag.exp(neg);
    let one = dag.lit1();
    let den = dag.add(one, e);
    dag.div(one, den)
}

/// Log loss: -(y·log p + (1 - y)·log(1 - p)).
fn loss_graph(dag: &mut Dag, prediction: OpId) -> OpId {
    let y = dag.var("y");
    let one = dag.lit1();
    let lp = dag.log(prediction);
    let pos = dag.mul(y, lp);
    let not_y = dag.sub(one, y);
    let not_p = dag.sub(one, prediction);
    let lnp = dag.log(not_p);
    let neg_part = dag.mul(not_y, lnp);
    let sum = dag.add(pos, neg_part);
    dag.neg(sum)
}

fn data() -> Vec<(f64, f64)> {
    vec![
        (-2.0, 0.0),
        (-1.5, 0.0),
        (-1.0, 0.0),
        (-0.75, 0.0),
        (-0.5, 0.0),
        (0.5, 1.0),
        (0.75, 1.0),
        (1.0, 1.0),
        (1.5, 1.0),
        (2.0, 1.0),
    ]
}

fn set_example(env: &mut Env, x: f64, y: f64, w: &[f64]) {
    env.clear();
    env.insert("x1".into(), x);
    env.insert("y".into(), y);
    for (i, wi) in w.iter().enumerate() {
        env.insert(format!("w{}", i), *wi);
    }
}

#[test]
fn free_variables_of_the_loss() {
    let mut dag = Dag::new();
    let p = forward_graph(&mut dag, 2);
    let loss = loss_graph(&mut dag, p);
    assert_eq!(dag.free_var_names(loss), vec!["w0", "w1", "w2", "x1", "x2", "y"]);
}

#[test]
fn gradient_matches_finite_differences() {
    let mut dag = Dag::new();
    let p = forward_graph(&mut dag, 1);
    let loss = loss_graph(&mut dag, p);
    let dout = dag.backwards(loss).unwrap();

    let w = [0.3, -0.8];
    let mut env = Env::new();
    set_example(&mut env, 1.25, 1.0, &w);
    let ev = dag.eval_env(dout, &env).unwrap();

    let h = 1e-6;
    for i in 0..w.len() {
        let mut hi = w;
        let mut lo = w;
        hi[i] += h;
        lo[i] -= h;
        set_example(&mut env, 1.25, 1.0, &hi);
        let f_hi = dag.eval_env(loss, &env).unwrap().result();
        set_example(&mut env, 1.25, 1.0, &lo);
        let f_lo = dag.eval_env(loss, &env).unwrap().result();
        let numeric = (f_hi - f_lo) / (2.0 * h);
        let analytic = ev.grad(&format!("w{}", i)).unwrap();
        assert!((analytic - numeric).abs() < 1e-6, "w{i}: {analytic} vs {numeric}");
    }
}

#[test]
fn training_reduces_loss_and_separates_classes() {
    let mut dag = Dag::new();
    let p = forward_graph(&mut dag, 1);
    let loss = loss_graph(&mut dag, p);
    let dout = dag.backwards(loss).unwrap();

    let examples = data();
    let epsilon = 0.1;
    let mut w = vec![0.0; 2];
    let mut env = Env::new();
    let mut first_epoch_loss = None;
    let mut last_epoch_loss = 0.0;

    for _epoch in 0..100 {
        let mut total = 0.0;
        for &(x, y) in &examples {
            set_example(&mut env, x, y, &w);
            let ev = dag.eval_env(dout, &env).unwrap();
            total += ev.result();
            for (i, wi) in w.iter_mut().enumerate() {
                *wi -= epsilon * ev.grad(&format!("w{}", i)).unwrap();
            }
        }
        let avg = total / examples.len() as f64;
        first_epoch_loss.get_or_insert(avg);
        last_epoch_loss = avg;
    }

    let first = first_epoch_loss.unwrap();
    assert!(first <= std::f64::consts::LN_2 + 1e-9, "initial loss {first}");
    assert!(last_epoch_loss < first / 2.0, "loss {first} -> {last_epoch_loss}");

    for &(x, y) in &examples {
        set_example(&mut env, x, y, &w);
        let prediction = dag.eval_env(p, &env).unwrap().result();
        assert_eq!(prediction > 0.5, y == 1.0, "x = {x}, prediction {prediction}");
    }
}
