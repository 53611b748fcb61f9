#![no_main]
use libfuzzer_sys::fuzz_target;

use mll::graph::{parse, Dag};

fuzz_target!(|data: &[u8]| {
    let Ok(src) = std::str::from_utf8(data) else {
        return;
    };
    let mut dag = Dag::new();
    let Ok(root) = parse(&mut dag, src) else {
        return;
    };

    assert!(!dag.display(root).is_empty());

    // Every parsed expression is differentiable and lowers to IR.
    let g = dag.backwards(root).expect("backpropagation succeeds");
    dag.llvm(g).expect("gradient lowers to IR");
    let n = dag.free_vars(root).len();
    let ev = dag.eval(g, &vec![0.5; n]).expect("arity matches");
    assert_eq!(ev.results().len(), n + 1);
});
