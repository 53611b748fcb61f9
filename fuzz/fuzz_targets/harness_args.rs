#![no_main]
use libfuzzer_sys::fuzz_target;

use mll::{parse_args_from, run, NoOp};

fuzz_target!(|data: &[u8]| {
    let s = String::from_utf8_lossy(data);
    let argv: Vec<&str> = s.split('\0').collect();
    let args = parse_args_from(&argv);

    let flagged = argv.iter().any(|a| *a == "-b");
    assert_eq!(args.backwards, flagged);
    assert_eq!(args.inputs.len(), argv.iter().filter(|a| **a != "-b").count());

    let mut out = Vec::new();
    let outputs = run(&args, &mut NoOp, &mut out).expect("Vec writer");
    assert_eq!(outputs.len(), if flagged { args.inputs.len() + 1 } else { 1 });
    assert_eq!(out.iter().filter(|&&b| b == b'\n').count(), 2);
});
