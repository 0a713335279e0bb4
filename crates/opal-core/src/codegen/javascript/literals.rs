// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Literal and string-family emitters.
//!
//! Covers numeric/symbol/regexp/range literals, plain and interpolated
//! strings and symbols, raw JavaScript splices (`xstr`/`dxstr`), array
//! literals with splats, and hash literals.

use ecow::eco_format;

use crate::ast::{Literal, Node, Sexp};
use crate::codegen::Result;

use super::fragment::Fragment;
use super::mangle::{inspect_string, js_object_key};
use super::{Helper, JavaScriptGenerator, Level};

impl JavaScriptGenerator<'_> {
    /// Emits a literal value. Numbers in receiver position are
    /// parenthesized so `1.$foo()` parses as a call, not a float.
    pub(super) fn process_lit(
        &mut self,
        sexp: &Sexp,
        lit: &Literal,
        level: Level,
    ) -> Result<Vec<Fragment>> {
        let code = match lit {
            Literal::Int(n) => {
                if level == Level::Recv {
                    eco_format!("({n})")
                } else {
                    eco_format!("{n}")
                }
            }
            Literal::Float(f) => {
                if level == Level::Recv {
                    eco_format!("({f})")
                } else {
                    eco_format!("{f}")
                }
            }
            Literal::Sym(name) => inspect_string(name),
            Literal::Regexp(source) => {
                // An empty pattern would read as a line comment.
                if source.is_empty() {
                    "/^/".into()
                } else {
                    eco_format!("/{source}/")
                }
            }
            Literal::Range {
                start,
                end,
                exclusive,
            } => {
                self.require_helper(Helper::Range);
                eco_format!("__range({start}, {end}, {exclusive})")
            }
        };
        Ok(vec![self.frag(code, sexp)])
    }

    /// Emits a string literal, flagging when the program embeds its own
    /// file name.
    pub(super) fn process_str(&mut self, sexp: &Sexp, value: &str) -> Result<Vec<Fragment>> {
        if value == self.options.file.as_str() {
            self.uses_file = true;
        }
        Ok(vec![self.frag(inspect_string(value), sexp)])
    }

    /// Emits an interpolated string as a `+` concatenation; expression
    /// parts are parenthesized so precedence cannot leak.
    pub(super) fn process_dstr(&mut self, sexp: &Sexp, parts: &[Sexp]) -> Result<Vec<Fragment>> {
        let mut result = Vec::new();
        for part in parts {
            if !result.is_empty() {
                result.push(self.frag(" + ", sexp));
            }
            match &part.node {
                Node::Str(s) => result.push(self.frag(inspect_string(s), part)),
                Node::Evstr(inner) => {
                    result.push(self.frag("(", part));
                    result.extend(self.process(inner, Level::Expr)?);
                    result.push(self.frag(")", part));
                }
                _ => {
                    return Err(
                        self.unsupported_error(format!("dstr part: {}", part.kind_name()))
                    )
                }
            }
        }
        Ok(result)
    }

    /// Emits an interpolated symbol; expression parts go through `to_s`
    /// so the result is always a string.
    pub(super) fn process_dsym(&mut self, sexp: &Sexp, parts: &[Sexp]) -> Result<Vec<Fragment>> {
        let mut result = vec![self.frag("(", sexp)];
        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                result.push(self.frag(" + ", sexp));
            }
            match &part.node {
                Node::Str(s) => result.push(self.frag(inspect_string(s), part)),
                Node::Evstr(inner) => {
                    let to_s = Sexp::new(
                        Node::Call {
                            recv: Some(inner.clone()),
                            mid: "to_s".into(),
                            args: Box::new(Sexp::new(Node::Arglist(Vec::new()), part.line)),
                        },
                        part.line,
                    );
                    result.extend(self.process(&to_s, Level::Expr)?);
                }
                _ => {
                    return Err(
                        self.unsupported_error(format!("dsym part: {}", part.kind_name()))
                    )
                }
            }
        }
        result.push(self.frag(")", sexp));
        Ok(result)
    }

    /// Splices raw JavaScript verbatim. Statement position gets a
    /// terminating semicolon when the splice has none of its own.
    pub(super) fn process_xstr(
        &mut self,
        sexp: &Sexp,
        code: &str,
        level: Level,
    ) -> Result<Vec<Fragment>> {
        let mut code = ecow::EcoString::from(code);
        if level == Level::Stmt && !code.contains(';') {
            code.push(';');
        }
        if level == Level::Recv {
            Ok(vec![
                self.frag("(", sexp),
                self.frag(code, sexp),
                self.frag(")", sexp),
            ])
        } else {
            Ok(vec![self.frag(code, sexp)])
        }
    }

    /// Splices raw JavaScript with interpolated expression parts.
    pub(super) fn process_dxstr(
        &mut self,
        sexp: &Sexp,
        parts: &[Sexp],
        level: Level,
    ) -> Result<Vec<Fragment>> {
        let mut result = Vec::new();
        let mut needs_semicolon = false;
        for part in parts {
            match &part.node {
                Node::Str(s) => {
                    result.push(self.frag(s.clone(), part));
                    if level == Level::Stmt && !s.contains(';') {
                        needs_semicolon = true;
                    }
                }
                Node::Evstr(inner) => result.extend(self.process(inner, Level::Expr)?),
                _ => {
                    return Err(
                        self.unsupported_error(format!("dxstr part: {}", part.kind_name()))
                    )
                }
            }
        }
        if needs_semicolon {
            result.push(self.frag(";", sexp));
        }
        Ok(result)
    }

    /// Emits an array literal. Splatted elements turn the literal into a
    /// `concat` chain over the fixed runs.
    pub(super) fn process_array(&mut self, sexp: &Sexp, elements: &[Sexp]) -> Result<Vec<Fragment>> {
        if elements.is_empty() {
            return Ok(vec![self.frag("[]", sexp)]);
        }
        let (frags, saw_splat) = self.compile_arglist(elements)?;
        if saw_splat {
            Ok(frags)
        } else {
            let mut result = vec![self.frag("[", sexp)];
            result.extend(frags);
            result.push(self.frag("]", sexp));
            Ok(result)
        }
    }

    /// Emits a hash literal.
    ///
    /// When every key is a symbol or string literal the keys are known at
    /// compile time and the cheaper `__hash2` constructor is used;
    /// otherwise the flat pair list goes through `__hash`.
    pub(super) fn process_hash(&mut self, sexp: &Sexp, pairs: &[Sexp]) -> Result<Vec<Fragment>> {
        let keys: Vec<&Sexp> = pairs.iter().step_by(2).collect();
        let values: Vec<&Sexp> = pairs.iter().skip(1).step_by(2).collect();
        debug_assert_eq!(keys.len(), values.len(), "hash pair list must be even");

        let all_literal = keys.iter().all(|k| {
            matches!(
                &k.node,
                Node::Lit(Literal::Sym(_)) | Node::Str(_)
            )
        });

        if all_literal && keys.len() == values.len() {
            self.require_helper(Helper::Hash2);
            // Later duplicates override earlier values but keep first
            // position, matching source-language hash semantics.
            let mut ordered: Vec<(ecow::EcoString, Vec<Fragment>)> = Vec::new();
            for (key, value) in keys.iter().zip(values.iter()) {
                let name = match &key.node {
                    Node::Lit(Literal::Sym(s)) | Node::Str(s) => s.clone(),
                    _ => unreachable!("checked literal keys above"),
                };
                let value_frags = self.process(value, Level::Expr)?;
                if let Some(slot) = ordered.iter_mut().find(|(k, _)| *k == name) {
                    slot.1 = value_frags;
                } else {
                    ordered.push((name, value_frags));
                }
            }

            // The key array is always quoted; the object-literal half
            // uses bare identifier keys where JavaScript allows them.
            let mut result = vec![self.frag("__hash2([", sexp)];
            for (i, (name, _)) in ordered.iter().enumerate() {
                if i > 0 {
                    result.push(self.frag(", ", sexp));
                }
                result.push(self.frag(inspect_string(name), sexp));
            }
            result.push(self.frag("], {", sexp));
            for (i, (name, value)) in ordered.into_iter().enumerate() {
                if i > 0 {
                    result.push(self.frag(", ", sexp));
                }
                result.push(self.frag(eco_format!("{}: ", js_object_key(&name)), sexp));
                result.extend(value);
            }
            result.push(self.frag("})", sexp));
            Ok(result)
        } else {
            self.require_helper(Helper::Hash);
            let mut result = vec![self.frag("__hash(", sexp)];
            for (i, part) in pairs.iter().enumerate() {
                if i > 0 {
                    result.push(self.frag(", ", sexp));
                }
                result.extend(self.process(part, Level::Expr)?);
            }
            result.push(self.frag(")", sexp));
            Ok(result)
        }
    }
}
