//! The argument-to-call-to-print pipeline.
//!
//! [`run`] takes the parsed command line, sizes a zeroed output buffer with
//! [`output_len`], hands both buffers to a [`Transform`], and writes the
//! report:
//!
//! ```text
//! mll(1.000000, 2.000000)
//! => (3.000000)
//! ```
//!
//! The input line is written before the transformation runs, the output line
//! after.

use std::io::{self, Write};

use crate::cli::args::ParsedArgs;
use crate::cli::constants::{INPUT_PREFIX, OUTPUT_PREFIX};
use crate::config::FLOAT_PRECISION;
use crate::displaylevel;

/// The numeric function exercised by the harness.
///
/// `input` is read-only; `output` arrives zeroed and the implementation may
/// write any prefix of it. Slots left untouched print as zero.
pub trait Transform {
    fn apply(&mut self, input: &[f64], output: &mut [f64]);
}

impl<F> Transform for F
where
    F: FnMut(&[f64], &mut [f64]),
{
    fn apply(&mut self, input: &[f64], output: &mut [f64]) {
        self(input, output)
    }
}

/// Transformation that writes nothing; used when no function is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOp;

impl Transform for NoOp {
    fn apply(&mut self, _input: &[f64], _output: &mut [f64]) {}
}

/// Output length for `num_inputs` inputs: 1 normally, `num_inputs + 1` in
/// backwards mode (value followed by one partial derivative per input).
#[inline]
pub fn output_len(num_inputs: usize, backwards: bool) -> usize {
    if backwards {
        num_inputs + 1
    } else {
        1
    }
}

/// Formats one value like C's `%f`.
pub fn format_value(v: f64) -> String {
    if v.is_nan() {
        let s = if v.is_sign_negative() { "-nan" } else { "nan" };
        s.to_owned()
    } else if v.is_infinite() {
        let s = if v > 0.0 { "inf" } else { "-inf" };
        s.to_owned()
    } else {
        format!("{:.*}", FLOAT_PRECISION, v)
    }
}

/// Formats `values` as `(v0, v1, ...)`; an empty slice is `()`.
pub fn format_array(values: &[f64]) -> String {
    let mut s = String::with_capacity(2 + values.len() * 12);
    s.push('(');
    let mut sep = "";
    for &v in values {
        s.push_str(sep);
        s.push_str(&format_value(v));
        sep = ", ";
    }
    s.push(')');
    s
}

/// Runs one invocation: print inputs, call `transform`, print outputs.
///
/// Returns the output vector as populated by the transformation.
pub fn run<T, W>(args: &ParsedArgs, transform: &mut T, out: &mut W) -> io::Result<Vec<f64>>
where
    T: Transform + ?Sized,
    W: Write,
{
    let mut outputs = vec![0.0f64; args.output_len()];
    displaylevel!(
        4,
        "{} inputs, {} output slots (backwards: {})\n",
        args.inputs.len(),
        outputs.len(),
        args.backwards
    );

    writeln!(out, "{}{}", INPUT_PREFIX, format_array(&args.inputs))?;
    transform.apply(&args.inputs, &mut outputs);
    writeln!(out, "{}{}", OUTPUT_PREFIX, format_array(&outputs))?;
    out.flush()?;

    Ok(outputs)
}

/// Runs `run` and renders the report into a `String`.
pub fn run_to_string<T: Transform + ?Sized>(args: &ParsedArgs, transform: &mut T) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = run(args, transform, &mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::parse_args_from;

    fn report(args: &[&str]) -> String {
        run_to_string(&parse_args_from(args), &mut NoOp)
    }

    #[test]
    fn output_len_rule() {
        assert_eq!(output_len(0, false), 1);
        assert_eq!(output_len(5, false), 1);
        assert_eq!(output_len(0, true), 1);
        assert_eq!(output_len(5, true), 6);
    }

    #[test]
    fn format_empty_array() {
        assert_eq!(format_array(&[]), "()");
    }

    #[test]
    fn format_values_fixed_point() {
        assert_eq!(format_array(&[1.0]), "(1.000000)");
        assert_eq!(format_array(&[1.0, -2.5, 0.1234567]), "(1.000000, -2.500000, 0.123457)");
        assert_eq!(format_value(1e7), "10000000.000000");
    }

    #[test]
    fn format_non_finite_like_c() {
        assert_eq!(format_value(f64::INFINITY), "inf");
        assert_eq!(format_value(f64::NEG_INFINITY), "-inf");
        assert_eq!(format_value(f64::NAN), "nan");
        assert_eq!(format_value(-f64::NAN), "-nan");
    }

    #[test]
    fn no_arguments_report() {
        assert_eq!(report(&[]), "mll()\n=> (0.000000)\n");
    }

    #[test]
    fn backwards_report_with_untouched_outputs() {
        assert_eq!(
            report(&["1", "2", "-b"]),
            "mll(1.000000, 2.000000)\n=> (0.000000, 0.000000, 0.000000)\n"
        );
    }

    #[test]
    fn closure_transform_fills_output() {
        let args = parse_args_from(&["1", "2", "3"]);
        let mut sum = |input: &[f64], output: &mut [f64]| output[0] = input.iter().sum();
        let text = run_to_string(&args, &mut sum);
        assert_eq!(text, "mll(1.000000, 2.000000, 3.000000)\n=> (6.000000)\n");
    }

    #[test]
    fn transform_sees_zeroed_buffer_of_right_size() {
        let args = parse_args_from(&["-b", "4", "5"]);
        let mut seen = Vec::new();
        let mut probe = |_: &[f64], output: &mut [f64]| seen.extend_from_slice(output);
        let outputs = run(&args, &mut probe, &mut io::sink()).unwrap();
        assert_eq!(seen, vec![0.0, 0.0, 0.0]);
        assert_eq!(outputs.len(), 3);
    }

    #[test]
    fn partial_writes_leave_zeros() {
        let args = parse_args_from(&["-b", "7", "8"]);
        let mut first_only = |input: &[f64], output: &mut [f64]| output[0] = input[0];
        let text = run_to_string(&args, &mut first_only);
        assert_eq!(text, "mll(7.000000, 8.000000)\n=> (7.000000, 0.000000, 0.000000)\n");
    }

    #[test]
    fn input_line_is_written_before_the_call() {
        struct Panicky;
        impl Transform for Panicky {
            fn apply(&mut self, _: &[f64], _: &mut [f64]) {
                panic!("boom");
            }
        }
        let args = parse_args_from(&["1"]);
        let mut buf = Vec::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = run(&args, &mut Panicky, &mut buf);
        }));
        assert!(result.is_err());
        assert_eq!(String::from_utf8(buf).unwrap(), "mll(1.000000)\n");
    }

    #[test]
    fn dyn_transform_is_accepted() {
        let args = parse_args_from(&["2"]);
        let mut boxed: Box<dyn Transform> = Box::new(|i: &[f64], o: &mut [f64]| o[0] = i[0] * 10.0);
        let text = run_to_string(&args, boxed.as_mut());
        assert_eq!(text, "mll(2.000000)\n=> (20.000000)\n");
    }
}
