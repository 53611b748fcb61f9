#![no_main]
use libfuzzer_sys::fuzz_target;

use mll::cli::arg_utils::atof;

fuzz_target!(|data: &[u8]| {
    let s = String::from_utf8_lossy(data);
    let v = atof(&s);

    // A fully numeric decimal string must agree with the standard parser.
    if s.bytes().all(|b| b.is_ascii_digit() || b == b'.' || b == b'-') {
        if let Ok(expected) = s.parse::<f64>() {
            assert!(v == expected || (v.is_nan() && expected.is_nan()), "{:?}: {} vs {}", s, v, expected);
        }
    }
});
