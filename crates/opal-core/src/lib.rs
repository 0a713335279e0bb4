// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Compiler core for a Ruby-flavoured scripting language targeting JavaScript.
//!
//! This crate contains the code-generation half of the compiler:
//! - AST definitions (the s-expression tree handed over by the grammar)
//! - JavaScript code generation against the Opal runtime library
//!
//! The grammar that produces the tree and the source-map post-processor that
//! consumes the emitted position-tagged fragments live in sibling projects.

#![doc = include_str!("../../../README.md")]

pub mod ast;
pub mod codegen;

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::ast::{Literal, Node, Sexp};
    pub use crate::codegen::javascript::{generate, CompilerOptions, JavaScriptGenerator};
    pub use crate::codegen::{CodeGenError, Result};
}
