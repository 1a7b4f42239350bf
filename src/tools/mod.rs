//! Built-in tool handlers.
//!
//! Every handler is a plain function of its (already validated) arguments.
//! Failures are returned as [`ToolFault`] and reported to the client as an
//! `isError` result; they never abort the dispatch loop.

pub mod basic;
pub mod calculator;
pub mod clock;

use serde_json::Value;
use thiserror::Error;

use crate::registry::{Arguments, ToolEntry};

pub use calculator::CalcError;

/// A handler-level failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ToolFault {
    /// An argument was unusable despite passing schema validation.
    #[error("invalid argument '{name}': {reason}")]
    Argument {
        /// Argument name.
        name: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Arithmetic evaluation failed.
    #[error("calculation failed: {0}")]
    Calculation(#[from] CalcError),

    /// Any other failure inside a handler.
    #[error("{0}")]
    Failed(String),
}

/// All built-in tools, in advertisement order.
#[must_use]
pub fn entries() -> Vec<ToolEntry> {
    vec![
        basic::echo(),
        basic::add(),
        basic::hello(),
        calculator::calculate(),
        clock::current_time(),
    ]
}

/// Fetches a string argument.
pub(crate) fn str_arg<'a>(args: &'a Arguments, name: &str) -> Result<&'a str, ToolFault> {
    args.get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| ToolFault::Argument {
            name: name.to_string(),
            reason: "expected a string".to_string(),
        })
}

/// Fetches a numeric argument.
pub(crate) fn num_arg(args: &Arguments, name: &str) -> Result<f64, ToolFault> {
    args.get(name)
        .and_then(Value::as_f64)
        .ok_or_else(|| ToolFault::Argument {
            name: name.to_string(),
            reason: "expected a number".to_string(),
        })
}

/// Formats a number the way people write it: integral values have no
/// fractional part and negative zero prints as `0`.
#[must_use]
#[allow(clippy::float_cmp)] // exact zero, both signs
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    format!("{value}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_number_integral() {
        assert_eq!(format_number(4.0), "4");
        assert_eq!(format_number(-12.0), "-12");
        assert_eq!(format_number(-0.0), "0");
    }

    #[test]
    fn format_number_fractional() {
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(-0.25), "-0.25");
    }

    #[test]
    fn builtin_tool_names_are_unique() {
        let entries = entries();
        let mut names: Vec<&str> = entries.iter().map(|e| e.descriptor.name.as_str()).collect();
        let before = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), before);
    }

    #[test]
    fn builtin_tools_have_object_schemas() {
        for entry in entries() {
            assert!(!entry.descriptor.name.is_empty());
            assert!(!entry.descriptor.description.is_empty());
            assert_eq!(entry.descriptor.input_schema.to_json()["type"], "object");
        }
    }

    #[test]
    fn missing_string_argument() {
        let args = Arguments::new();
        let err = str_arg(&args, "message").unwrap_err();
        assert!(err.to_string().contains("message"));
    }

    #[test]
    fn fault_from_calc_error() {
        let fault = ToolFault::from(CalcError::DivisionByZero);
        assert_eq!(fault.to_string(), "calculation failed: division by zero");
    }
}
