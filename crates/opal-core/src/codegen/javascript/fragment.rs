// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Position-tagged output fragments.
//!
//! The code generator does not write into a single string buffer. Every
//! emitter returns a flat, ordered list of [`Fragment`] values — immutable
//! pairs of generated text and the source line the text originated from —
//! and the final pass concatenates them in traversal order. Keeping the
//! position on each fragment lets the source-map post-processor rebuild
//! line mappings from otherwise ordinary JavaScript output.
//!
//! # Example
//!
//! ```
//! use opal_core::codegen::javascript::fragment::{serialize, Fragment};
//!
//! let frags = vec![Fragment::new("return ", 3), Fragment::new("nil", 3)];
//! assert_eq!(serialize(&frags, false), "return nil");
//! assert_eq!(serialize(&frags, true), "/*:3*/return /*:3*/nil");
//! ```

use ecow::{eco_format, EcoString};

/// One piece of generated JavaScript together with its source position.
///
/// Fragments are immutable once created. Text produced by the generator
/// itself (indentation, punctuation between reassembled pieces) may carry
/// no position; everything derived from a source node carries that node's
/// starting line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    code: EcoString,
    line: Option<u32>,
}

impl Fragment {
    /// Creates a fragment tagged with a 1-based source line.
    #[must_use]
    pub fn new(code: impl Into<EcoString>, line: u32) -> Self {
        debug_assert!(line > 0, "source lines are 1-based");
        Self {
            code: code.into(),
            line: Some(line),
        }
    }

    /// Creates a fragment with no source position.
    #[must_use]
    pub fn anonymous(code: impl Into<EcoString>) -> Self {
        Self {
            code: code.into(),
            line: None,
        }
    }

    /// The generated text.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// The source line this text originated from, if any.
    #[must_use]
    pub fn line(&self) -> Option<u32> {
        self.line
    }

    /// Renders the fragment with its position marker
    /// (`/*:<line>*/<code>`), or bare when it has no position.
    #[must_use]
    pub fn to_annotated(&self) -> EcoString {
        match self.line {
            Some(line) => eco_format!("/*:{line}*/{}", self.code),
            None => self.code.clone(),
        }
    }
}

/// Concatenates fragments in order.
///
/// With `annotate` set, every positioned fragment is prefixed with its
/// `/*:<line>*/` marker for the source-map post-processor; otherwise the
/// raw text is joined unchanged.
#[must_use]
pub fn serialize(fragments: &[Fragment], annotate: bool) -> String {
    let mut output = String::with_capacity(fragments.iter().map(|f| f.code.len()).sum());
    for fragment in fragments {
        if annotate {
            output.push_str(&fragment.to_annotated());
        } else {
            output.push_str(fragment.code());
        }
    }
    output
}
