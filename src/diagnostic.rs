//! Error and warning types.
//!
//! Two severities exist: `InvalidOptionError` is fatal and aborts before
//! any output is written, while `Advisory` records a non-fatal conflict
//! that is logged to stderr and mirrored as a comment in the generated
//! file.

use std::fmt;

use miette::Diagnostic as MietteDiagnostic;
use serde::Serialize;
use thiserror::Error;

/// An enumerated option was given a value outside its legal set.
///
/// Raised during argument parsing, before resolution begins; nothing is
/// written when this error is returned.
#[derive(Debug, Error, MietteDiagnostic)]
#[error("invalid value `{value}` for --{option} (expected one of: {expected})")]
#[diagnostic(
    code(configure::invalid_option),
    help("run `configure --help` to see the accepted values")
)]
pub struct InvalidOptionError {
    pub option: String,
    pub value: String,
    pub expected: String,
}

impl InvalidOptionError {
    pub fn new(option: &str, value: &str, expected: &[&str]) -> Self {
        InvalidOptionError {
            option: option.to_string(),
            value: value.to_string(),
            expected: expected.join(", "),
        }
    }
}

/// A non-fatal configuration conflict.
///
/// Advisories never stop generation: each one is logged through the
/// diagnostic channel and embedded as a `WARNING:` comment in the output
/// so a reader of the generated file sees the same information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Advisory {
    pub message: String,
}

impl Advisory {
    pub fn new(message: impl Into<String>) -> Self {
        Advisory {
            message: message.into(),
        }
    }

    /// The comment line mirrored into the generated file.
    pub fn comment(&self) -> String {
        format!("WARNING: {}", self.message)
    }
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_option_message() {
        let err = InvalidOptionError::new("build", "bogus", &["release", "debug", "cross"]);
        let message = err.to_string();
        assert!(message.contains("--build"));
        assert!(message.contains("`bogus`"));
        assert!(message.contains("release, debug, cross"));
    }

    #[test]
    fn test_advisory_comment() {
        let advisory = Advisory::new("ignoring option --O3 for debug build");
        assert_eq!(
            advisory.comment(),
            "WARNING: ignoring option --O3 for debug build"
        );
    }
}
