// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Code generation.
//!
//! This module contains code generators for different target formats:
//! - **`javascript`**: JavaScript output against the Opal runtime library
//!
//! All generators share the [`CodeGenError`] error surface: a single
//! failure aborts the whole generation pass and partial output is never
//! exposed. User-visible messages carry a `:<file>:<line>` suffix locating
//! the offending node.

use miette::Diagnostic;
use thiserror::Error;

pub mod javascript;


/// Errors that can occur during code generation.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum CodeGenError {
    /// A node shape the generator cannot emit, e.g. a bad interpolation
    /// part or an unsupported `defined?` operand.
    #[error("unsupported {what} :{file}:{line}")]
    UnsupportedNode {
        /// Description of the unsupported shape.
        what: String,
        /// Logical file name.
        file: String,
        /// Source line of the offending node.
        line: u32,
    },

    /// A well-formed node in an impossible position, e.g. `break` outside
    /// a loop or iterator, or `return` in expression position.
    #[error("{msg} :{file}:{line}")]
    Structural {
        /// What went wrong.
        msg: String,
        /// Logical file name.
        file: String,
        /// Source line of the offending node.
        line: u32,
    },

    /// An internal invariant was violated (temp not queued, scope stack
    /// imbalance). Indicates a generator bug, not bad input.
    #[error("internal code generation error: {0}")]
    Internal(String),
}

/// Result type for code generation operations.
pub type Result<T> = std::result::Result<T, CodeGenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structural_error_message_carries_location_suffix() {
        let err = CodeGenError::Structural {
            msg: "void value expression: cannot use break outside of iter/while".to_string(),
            file: "(file)".to_string(),
            line: 12,
        };
        assert_eq!(
            err.to_string(),
            "void value expression: cannot use break outside of iter/while :(file):12"
        );
    }

    #[test]
    fn unsupported_node_message() {
        let err = CodeGenError::UnsupportedNode {
            what: "dstr part: gvar".to_string(),
            file: "app.rb".to_string(),
            line: 3,
        };
        assert_eq!(err.to_string(), "unsupported dstr part: gvar :app.rb:3");
    }
}
