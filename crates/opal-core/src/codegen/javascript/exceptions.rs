// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Exception handling emitters.
//!
//! `rescue` compiles to `try`/`catch` with a chain of `$===` class tests
//! against the caught value, rethrowing when nothing matched; `ensure`
//! compiles to `try`/`finally`. Both wrap in an immediately-invoked
//! function when used in expression position, with their bodies
//! return-lifted.

use crate::ast::{Node, Sexp};
use crate::codegen::Result;

use super::fragment::Fragment;
use super::returns::returned;
use super::{JavaScriptGenerator, Level};

impl JavaScriptGenerator<'_> {
    pub(super) fn process_rescue(
        &mut self,
        sexp: &Sexp,
        body: Option<&Sexp>,
        handlers: &[Sexp],
        level: Level,
    ) -> Result<Vec<Fragment>> {
        let returnable = level == Level::Expr || level == Level::Recv;

        let body_sexp = body
            .cloned()
            .unwrap_or_else(|| Sexp::new(Node::Nil, sexp.line));
        let body_sexp = if returnable {
            returned(body_sexp)
        } else {
            body_sexp
        };

        let body_frags = self.in_indent(|gen| {
            let mut frags = vec![Fragment::anonymous(gen.indent.clone())];
            frags.extend(gen.process(&body_sexp, Level::Stmt)?);
            Ok(frags)
        })?;

        let mut handler_frags: Vec<Fragment> = Vec::new();
        for (i, handler) in handlers.iter().enumerate() {
            let handler = if returnable {
                lift_resbody(handler)
            } else {
                handler.clone()
            };
            if i > 0 {
                handler_frags.push(Fragment::anonymous(format!("\n{}else ", self.indent)));
            } else {
                handler_frags.push(Fragment::anonymous(self.indent.clone()));
            }
            handler_frags.extend(self.process(&handler, Level::Stmt)?);
        }
        handler_frags.push(Fragment::anonymous(format!(
            "\n{}else {{ throw $err; }}",
            self.indent
        )));

        let mut result = vec![self.frag("try {\n", sexp)];
        result.extend(body_frags);
        result.push(Fragment::anonymous(format!(
            "\n{}}} catch ($err) {{\n",
            self.indent
        )));
        result.extend(handler_frags);
        result.push(Fragment::anonymous(format!("\n{}}}", self.indent)));

        if returnable {
            result.insert(0, self.frag("(function() { ", sexp));
            let recv = self.current_self();
            result.push(self.frag(ecow::eco_format!(" }}).call({recv})"), sexp));
        }
        Ok(result)
    }

    /// One `rescue` clause: class tests joined with `||`, an optional
    /// error binding, then the handler body.
    pub(super) fn process_resbody(
        &mut self,
        sexp: &Sexp,
        list: &Sexp,
        body: Option<&Sexp>,
    ) -> Result<Vec<Fragment>> {
        let Node::Array(entries) = &list.node else {
            return Err(self.structural_error("bad rescue clause type list"));
        };

        // A trailing bare assignment binds the caught error.
        let mut types: &[Sexp] = entries;
        let mut binding: Option<Sexp> = None;
        if let Some(last) = entries.last() {
            if let Node::Lasgn(name, None) = &last.node {
                binding = Some(Sexp::new(
                    Node::Lasgn(
                        name.clone(),
                        Some(Box::new(Sexp::new(Node::JsTmp("$err".into()), last.line))),
                    ),
                    last.line,
                ));
                types = &entries[..entries.len() - 1];
            } else if let Node::Iasgn(name, None) = &last.node {
                binding = Some(Sexp::new(
                    Node::Iasgn(
                        name.clone(),
                        Some(Box::new(Sexp::new(Node::JsTmp("$err".into()), last.line))),
                    ),
                    last.line,
                ));
                types = &entries[..entries.len() - 1];
            }
        }

        let mut test_frags: Vec<Fragment> = Vec::new();
        for (i, class_expr) in types.iter().enumerate() {
            if i > 0 {
                test_frags.push(self.frag(" || ", class_expr));
            }
            let compare = Sexp::new(
                Node::Call {
                    recv: Some(Box::new(class_expr.clone())),
                    mid: "===".into(),
                    args: Box::new(Sexp::new(
                        Node::Arglist(vec![Sexp::new(
                            Node::JsTmp("$err".into()),
                            class_expr.line,
                        )]),
                        class_expr.line,
                    )),
                },
                class_expr.line,
            );
            test_frags.extend(self.process(&compare, Level::Expr)?);
        }
        if test_frags.is_empty() {
            test_frags.push(self.frag("true", sexp));
        }

        let mut result = vec![self.frag("if (", sexp)];
        result.extend(test_frags);
        result.push(self.frag(") {\n", sexp));
        let body_sexp = body
            .cloned()
            .unwrap_or_else(|| Sexp::new(Node::Nil, sexp.line));
        let inner = self.in_indent(|gen| {
            let mut frags = vec![Fragment::anonymous(gen.indent.clone())];
            if let Some(binding) = &binding {
                frags.extend(gen.process(binding, Level::Expr)?);
                frags.push(gen.frag(";\n", binding));
                frags.push(Fragment::anonymous(gen.indent.clone()));
            }
            frags.extend(gen.process(&body_sexp, Level::Stmt)?);
            Ok(frags)
        })?;
        result.extend(inner);
        result.push(Fragment::anonymous(format!("\n{}}}", self.indent)));
        Ok(result)
    }

    pub(super) fn process_ensure(
        &mut self,
        sexp: &Sexp,
        body: Option<&Sexp>,
        ensure_body: &Sexp,
        level: Level,
    ) -> Result<Vec<Fragment>> {
        let returnable = level == Level::Expr || level == Level::Recv;

        let body_sexp = body
            .cloned()
            .unwrap_or_else(|| Sexp::new(Node::Nil, sexp.line));
        let body_sexp = if returnable {
            returned(body_sexp)
        } else {
            body_sexp
        };

        let body_frags = self.in_indent(|gen| {
            let mut frags = vec![Fragment::anonymous(gen.indent.clone())];
            frags.extend(gen.process(&body_sexp, Level::Stmt)?);
            Ok(frags)
        })?;
        let ensure_frags = self.in_indent(|gen| {
            let mut frags = vec![Fragment::anonymous(gen.indent.clone())];
            frags.extend(gen.process(ensure_body, Level::Stmt)?);
            Ok(frags)
        })?;

        let mut result = vec![self.frag("try {\n", sexp)];
        result.extend(body_frags);
        result.push(Fragment::anonymous(format!(
            "\n{}}} finally {{\n",
            self.indent
        )));
        result.extend(ensure_frags);
        result.push(Fragment::anonymous(format!("\n{}}}", self.indent)));

        if returnable {
            result.insert(0, self.frag("(function() { ", sexp));
            let recv = self.current_self();
            result.push(self.frag(ecow::eco_format!(" }}).call({recv})"), sexp));
        }
        Ok(result)
    }
}

/// Return-lifts the body of a rescue clause for expression position.
fn lift_resbody(handler: &Sexp) -> Sexp {
    let Node::Resbody { list, body } = &handler.node else {
        return handler.clone();
    };
    let line = handler.line;
    let lifted = returned(
        body.as_deref()
            .cloned()
            .unwrap_or_else(|| Sexp::new(Node::Nil, line)),
    );
    Sexp {
        node: Node::Resbody {
            list: list.clone(),
            body: Some(Box::new(lifted)),
        },
        line,
        end_line: handler.end_line,
    }
}
