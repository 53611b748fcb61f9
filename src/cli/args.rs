//! Command-line argument parsing for the `mll` harness.
//!
//! The entry points are [`parse_args`] (reads `std::env::args()`) and
//! [`parse_args_from`] (takes an explicit slice, suitable for unit-testing).
//! Both return a [`ParsedArgs`] value.
//!
//! There is exactly one option, `-b`, and it may appear anywhere (any number
//! of times). Every other argument is a number converted with
//! [`atof`](crate::cli::arg_utils::atof); parsing never fails.

use crate::cli::arg_utils::atof;
use crate::cli::constants::BACKWARDS_FLAG;

/// Inputs and mode collected from the command line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedArgs {
    /// Numeric arguments in command-line order.
    pub inputs: Vec<f64>,
    /// Set when `-b` was given: the output holds the value plus one partial
    /// derivative per input.
    pub backwards: bool,
}

impl ParsedArgs {
    /// Number of output slots the transformation gets for this invocation.
    pub fn output_len(&self) -> usize {
        crate::harness::output_len(self.inputs.len(), self.backwards)
    }
}

/// Parse `std::env::args()` (skipping argv[0]).
pub fn parse_args() -> ParsedArgs {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    parse_args_from(&argv)
}

/// Parse an explicit argument list (argv[1..]).
pub fn parse_args_from<S: AsRef<str>>(argv: &[S]) -> ParsedArgs {
    let mut parsed = ParsedArgs::default();
    for argument in argv {
        let argument = argument.as_ref();
        if argument == BACKWARDS_FLAG {
            parsed.backwards = true;
        } else {
            parsed.inputs.push(atof(argument));
        }
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ParsedArgs {
        parse_args_from(args)
    }

    #[test]
    fn no_arguments() {
        let p = parse(&[]);
        assert!(p.inputs.is_empty());
        assert!(!p.backwards);
        assert_eq!(p.output_len(), 1);
    }

    #[test]
    fn numbers_without_flag() {
        let p = parse(&["1", "2", "3"]);
        assert_eq!(p.inputs, vec![1.0, 2.0, 3.0]);
        assert!(!p.backwards);
        assert_eq!(p.output_len(), 1);
    }

    #[test]
    fn flag_only() {
        let p = parse(&["-b"]);
        assert!(p.inputs.is_empty());
        assert!(p.backwards);
        assert_eq!(p.output_len(), 1);
    }

    #[test]
    fn flag_position_does_not_matter() {
        let front = parse(&["-b", "1", "2"]);
        let middle = parse(&["1", "-b", "2"]);
        let back = parse(&["1", "2", "-b"]);
        assert_eq!(front, middle);
        assert_eq!(middle, back);
        assert_eq!(back.inputs, vec![1.0, 2.0]);
        assert_eq!(back.output_len(), 3);
    }

    #[test]
    fn repeated_flag_is_idempotent() {
        assert_eq!(parse(&["-b", "-b", "3"]), parse(&["-b", "3"]));
    }

    #[test]
    fn malformed_number_becomes_zero() {
        let p = parse(&["abc", "4"]);
        assert_eq!(p.inputs, vec![0.0, 4.0]);
    }

    #[test]
    fn negative_numbers_are_not_flags() {
        let p = parse(&["-1", "-2.5"]);
        assert_eq!(p.inputs, vec![-1.0, -2.5]);
        assert!(!p.backwards);
    }

    #[test]
    fn flag_lookalikes_are_numbers() {
        // Only the exact token "-b" is the flag.
        let p = parse(&["-bb", "--b", "-B"]);
        assert_eq!(p.inputs, vec![0.0, 0.0, 0.0]);
        assert!(!p.backwards);
    }

    #[test]
    fn accepts_owned_strings() {
        let argv = vec!["5".to_string(), "-b".to_string()];
        let p = parse_args_from(&argv);
        assert_eq!(p.inputs, vec![5.0]);
        assert!(p.backwards);
    }
}
