// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Control-flow emitters.
//!
//! Conditionals, loops, `case`, the jump statements, `yield`, the logical
//! operators, and the two-valued truthiness compilers.
//!
//! # Truthiness
//!
//! Only `false` and `nil` are falsy in the source language, so a test
//! compiles to `(tmp = expr) !== false && tmp !== nil`. A peephole skips
//! the temp for expressions that already produce a JavaScript boolean
//! (comparisons, `==`, `block_given?`) or are cheap to repeat (a bare
//! local or `self`).
//!
//! # Value position
//!
//! JavaScript's `if`/`while` are statements. When one appears where the
//! source language wants a value, the construct is wrapped in an
//! immediately-invoked function and its branches are return-lifted.

use ecow::eco_format;

use crate::ast::{Node, Sexp};
use crate::codegen::Result;

use super::fragment::Fragment;
use super::returns::{returned, returned_or_nil};
use super::scope::{ScopeKind, WhileFrame};
use super::{JavaScriptGenerator, Level};

/// Operators whose result is already a JavaScript boolean.
const COMPARE: &[&str] = &["<", ">", "<=", ">="];

impl JavaScriptGenerator<'_> {
    // --- Truthiness ---

    /// Peephole for tests that need no temp binding.
    fn js_truthy_optimize(&mut self, sexp: &Sexp) -> Result<Option<Vec<Fragment>>> {
        match &sexp.node {
            Node::Call { mid, recv, .. }
                if recv.is_none() && mid == "block_given?"
                    || COMPARE.contains(&mid.as_str())
                    || mid == "==" =>
            {
                Ok(Some(self.process(sexp, Level::Expr)?))
            }
            Node::Operator { op, .. } if COMPARE.contains(&op.as_str()) || op == "==" => {
                Ok(Some(self.process(sexp, Level::Expr)?))
            }
            Node::Lvar(_) | Node::SelfRef => {
                let name = self.process(sexp, Level::Expr)?;
                let mut result = name.clone();
                result.push(self.frag(" !== false && ", sexp));
                result.extend(name);
                result.push(self.frag(" !== nil", sexp));
                Ok(Some(result))
            }
            _ => Ok(None),
        }
    }

    /// Compiles a test that is true unless the value is `false` or `nil`.
    pub(super) fn js_truthy(&mut self, sexp: &Sexp) -> Result<Vec<Fragment>> {
        if let Some(optimized) = self.js_truthy_optimize(sexp)? {
            return Ok(optimized);
        }
        self.with_temp(|gen, tmp| {
            let mut result = vec![gen.frag(eco_format!("({tmp} = "), sexp)];
            result.extend(gen.process(sexp, Level::Expr)?);
            result.push(gen.frag(eco_format!(") !== false && {tmp} !== nil"), sexp));
            Ok(result)
        })
    }

    /// Compiles a test that is true only when the value is `false` or
    /// `nil`.
    pub(super) fn js_falsy(&mut self, sexp: &Sexp) -> Result<Vec<Fragment>> {
        if let Node::Call { recv, mid, .. } = &sexp.node {
            if recv.is_none() && mid == "block_given?" {
                return self.compile_block_given(sexp, true);
            }
        }
        self.with_temp(|gen, tmp| {
            let mut result = vec![gen.frag(eco_format!("({tmp} = "), sexp)];
            result.extend(gen.process(sexp, Level::Expr)?);
            result.push(gen.frag(eco_format!(") === false || {tmp} === nil"), sexp));
            Ok(result)
        })
    }

    // --- Logical operators ---

    pub(super) fn process_and(
        &mut self,
        sexp: &Sexp,
        lhs: &Sexp,
        rhs: &Sexp,
    ) -> Result<Vec<Fragment>> {
        let tmp = self.new_temp();
        let result = if let Some(optimized) = self.js_truthy_optimize(lhs)? {
            let mut result = vec![self.frag(eco_format!("(({tmp} = "), sexp)];
            result.extend(optimized);
            result.push(self.frag(") ? ", sexp));
            result.extend(self.process(rhs, Level::Expr)?);
            result.push(self.frag(eco_format!(" : {tmp})"), sexp));
            result
        } else {
            let mut result = vec![self.frag(eco_format!("({tmp} = "), sexp)];
            result.extend(self.process(lhs, Level::Expr)?);
            result.push(self.frag(
                eco_format!(", {tmp} !== false && {tmp} !== nil ? "),
                sexp,
            ));
            result.extend(self.process(rhs, Level::Expr)?);
            result.push(self.frag(eco_format!(" : {tmp})"), sexp));
            result
        };
        self.queue_temp(&tmp);
        Ok(result)
    }

    pub(super) fn process_or(
        &mut self,
        sexp: &Sexp,
        lhs: &Sexp,
        rhs: &Sexp,
    ) -> Result<Vec<Fragment>> {
        self.with_temp(|gen, tmp| {
            let mut result = vec![gen.frag(eco_format!("(({tmp} = "), sexp)];
            result.extend(gen.process(lhs, Level::Expr)?);
            result.push(gen.frag(
                eco_format!(") !== false && {tmp} !== nil ? {tmp} : "),
                sexp,
            ));
            result.extend(gen.process(rhs, Level::Expr)?);
            result.push(gen.frag(")", sexp));
            Ok(result)
        })
    }

    pub(super) fn process_not(&mut self, sexp: &Sexp, inner: &Sexp) -> Result<Vec<Fragment>> {
        self.with_temp(|gen, tmp| {
            let mut result = vec![gen.frag(eco_format!("({tmp} = "), sexp)];
            result.extend(gen.process(inner, Level::Expr)?);
            result.push(gen.frag(
                eco_format!(", ({tmp} === nil || {tmp} === false))"),
                sexp,
            ));
            Ok(result)
        })
    }

    // --- Conditionals ---

    pub(super) fn process_if(
        &mut self,
        sexp: &Sexp,
        test: &Sexp,
        then_body: Option<&Sexp>,
        else_body: Option<&Sexp>,
        level: Level,
    ) -> Result<Vec<Fragment>> {
        let returnable = level == Level::Expr || level == Level::Recv;
        let mut then_body = then_body.cloned();
        let mut else_body = else_body.cloned();
        if returnable {
            then_body = Some(returned_or_nil(then_body, sexp.line));
            else_body = Some(returned_or_nil(else_body, sexp.line));
        }

        // `unless`: only an else branch exists, so test the negation.
        let mut check_falsy = false;
        if then_body.is_none() && else_body.is_some() {
            then_body = else_body.take();
            check_falsy = true;
        }

        let test_frags = if check_falsy {
            self.js_falsy(test)?
        } else {
            self.js_truthy(test)?
        };

        let mut result = vec![self.frag("if (", sexp)];
        result.extend(test_frags);
        result.push(self.frag(") {\n", sexp));
        if let Some(then_body) = &then_body {
            let body = self.in_indent(|gen| {
                let mut body = vec![Fragment::anonymous(gen.indent.clone())];
                body.extend(gen.process(then_body, Level::Stmt)?);
                Ok(body)
            })?;
            result.extend(body);
        }
        result.push(Fragment::anonymous(format!("\n{}}}", self.indent)));

        if let Some(else_body) = &else_body {
            result.push(Fragment::anonymous(" else {\n"));
            let body = self.in_indent(|gen| {
                let mut body = vec![Fragment::anonymous(gen.indent.clone())];
                body.extend(gen.process(else_body, Level::Stmt)?);
                Ok(body)
            })?;
            result.extend(body);
            result.push(Fragment::anonymous(format!("\n{}}}", self.indent)));
        }

        if returnable {
            result.insert(0, self.frag("(function() { ", sexp));
            let recv = self.current_self();
            result.push(self.frag(eco_format!("; return nil; }}).call({recv})"), sexp));
        }
        Ok(result)
    }

    // --- Loops ---

    /// Emits a `while` (or, with `until`, a negated) loop.
    ///
    /// A fresh redo guard is allocated up front; when the body actually
    /// used `redo`, the loop re-enters without retesting the condition:
    /// `tmp = false; while (tmp || cond) { tmp = false; ... }`.
    pub(super) fn process_while(
        &mut self,
        sexp: &Sexp,
        test: &Sexp,
        body: Option<&Sexp>,
        level: Level,
        until: bool,
    ) -> Result<Vec<Fragment>> {
        let closure = level == Level::Expr || level == Level::Recv;
        let redo_var = self.new_temp();

        let mut test_frags = self.js_truthy(test)?;
        if until {
            test_frags.insert(0, self.frag("!(", sexp));
            test_frags.push(self.frag(")", sexp));
        }

        self.scope_mut().while_stack.push(WhileFrame {
            closure,
            redo_var: redo_var.clone(),
            use_redo: false,
        });
        let body_sexp = body
            .cloned()
            .unwrap_or_else(|| Sexp::new(Node::Nil, sexp.line));
        let body_result = self.in_indent(|gen| {
            let mut body = vec![Fragment::anonymous(gen.indent.clone())];
            body.extend(gen.process(&body_sexp, Level::Stmt)?);
            Ok(body)
        });
        let frame = self
            .scope_mut()
            .while_stack
            .pop()
            .expect("while frame pushed above");
        let mut body_frags = body_result?;

        let head = if frame.use_redo {
            body_frags.insert(
                0,
                self.frag(
                    eco_format!("{}{}{redo_var} = false;\n", self.indent, super::INDENT),
                    sexp,
                ),
            );
            eco_format!("{redo_var} = false; while ({redo_var} || ")
        } else {
            "while (".into()
        };

        let mut result = vec![self.frag(head, sexp)];
        result.extend(test_frags);
        result.push(self.frag(") {\n", sexp));
        result.extend(body_frags);
        result.push(Fragment::anonymous(format!("\n{}}}", self.indent)));

        self.queue_temp(&redo_var);

        if closure {
            result.insert(0, self.frag("(function() { ", sexp));
            let recv = self.current_self();
            result.push(self.frag(eco_format!("; return nil; }}).call({recv})"), sexp));
        }
        Ok(result)
    }

    // --- Case ---

    pub(super) fn process_case(
        &mut self,
        sexp: &Sexp,
        subject: Option<&Sexp>,
        whens: &[Sexp],
        else_body: Option<&Sexp>,
        level: Level,
    ) -> Result<Vec<Fragment>> {
        let returnable = level == Level::Expr || level == Level::Recv;
        self.scope_mut().add_local("$case");

        let mut result = Vec::new();
        if let Some(subject) = subject {
            result.push(self.frag("$case = ", sexp));
            result.extend(self.process(subject, Level::Expr)?);
            result.push(self.frag(";", sexp));
        }

        for (i, wen) in whens.iter().enumerate() {
            let wen = if returnable {
                returned(wen.clone())
            } else {
                wen.clone()
            };
            if !result.is_empty() {
                result.push(Fragment::anonymous(format!("\n{}", self.indent)));
            }
            if i > 0 {
                result.push(self.frag("else ", sexp));
            }
            result.extend(self.process(&wen, Level::Stmt)?);
        }

        if let Some(else_body) = else_body {
            let else_body = if returnable {
                returned(else_body.clone())
            } else {
                else_body.clone()
            };
            result.push(Fragment::anonymous(format!("\n{}else {{\n", self.indent)));
            let body = self.in_indent(|gen| {
                let mut frags = vec![Fragment::anonymous(gen.indent.clone())];
                frags.extend(gen.process(&else_body, Level::Stmt)?);
                Ok(frags)
            })?;
            result.extend(body);
            result.push(Fragment::anonymous(format!("\n{}}}", self.indent)));
        } else if returnable {
            result.push(Fragment::anonymous(format!(
                "\n{}else {{ return nil }}",
                self.indent
            )));
        }

        if returnable {
            result.insert(0, self.frag("(function() { ", sexp));
            let recv = self.current_self();
            result.push(self.frag(eco_format!(" }}).call({recv})"), sexp));
        }
        Ok(result)
    }

    /// One `when` clause: the tests compare against `$case` through
    /// `$===`, a splatted test iterates its array in a small closure.
    pub(super) fn process_when(
        &mut self,
        sexp: &Sexp,
        tests: &[Sexp],
        body: Option<&Sexp>,
        _level: Level,
    ) -> Result<Vec<Fragment>> {
        let mut test_frags: Vec<Fragment> = Vec::new();
        for test in tests {
            match &test.node {
                Node::Splat(Some(inner)) => {
                    if !test_frags.is_empty() {
                        test_frags.push(self.frag(" || ", test));
                    }
                    let compare = Sexp::new(
                        Node::Call {
                            recv: Some(Box::new(Sexp::new(
                                Node::JsTmp("$splt[i]".into()),
                                test.line,
                            ))),
                            mid: "===".into(),
                            args: Box::new(Sexp::new(
                                Node::Arglist(vec![Sexp::new(
                                    Node::JsTmp("$case".into()),
                                    test.line,
                                )]),
                                test.line,
                            )),
                        },
                        test.line,
                    );
                    test_frags.push(self.frag(
                        "(function($splt) { for (var i = 0, ii = $splt.length; i < ii; i++) { if (",
                        test,
                    ));
                    test_frags.extend(self.process(&compare, Level::Expr)?);
                    test_frags.push(self.frag(") { return true; } } return false; }).call(", test));
                    let recv = self.current_self();
                    test_frags.push(self.frag(eco_format!("{recv}, "), test));
                    test_frags.extend(self.process(inner, Level::Expr)?);
                    test_frags.push(self.frag(")", test));
                }
                _ => {
                    if !test_frags.is_empty() {
                        test_frags.push(self.frag(" || ", test));
                    }
                    let compare = Sexp::new(
                        Node::Call {
                            recv: Some(Box::new(test.clone())),
                            mid: "===".into(),
                            args: Box::new(Sexp::new(
                                Node::Arglist(vec![Sexp::new(
                                    Node::JsTmp("$case".into()),
                                    test.line,
                                )]),
                                test.line,
                            )),
                        },
                        test.line,
                    );
                    test_frags.extend(self.process(&compare, Level::Expr)?);
                }
            }
        }

        let mut result = vec![self.frag("if (", sexp)];
        result.extend(test_frags);
        result.push(self.frag(") {\n", sexp));
        if let Some(body) = body {
            let body_frags = self.in_indent(|gen| {
                let mut frags = vec![Fragment::anonymous(gen.indent.clone())];
                frags.extend(gen.process(body, Level::Stmt)?);
                Ok(frags)
            })?;
            result.extend(body_frags);
        }
        result.push(Fragment::anonymous(format!("\n{}}}", self.indent)));
        Ok(result)
    }

    // --- Jumps ---

    pub(super) fn process_break(
        &mut self,
        sexp: &Sexp,
        value: Option<&Sexp>,
        level: Level,
    ) -> Result<Vec<Fragment>> {
        let value_sexp = value
            .cloned()
            .unwrap_or_else(|| Sexp::new(Node::Nil, sexp.line));
        if self.in_while() {
            let closure = self
                .scope()
                .current_while()
                .map(|frame| frame.closure)
                .unwrap_or_default();
            if closure {
                let mut result = vec![self.frag("return ", sexp)];
                result.extend(self.process(&value_sexp, Level::Expr)?);
                Ok(result)
            } else {
                Ok(vec![self.frag("break;", sexp)])
            }
        } else if self.scope().kind == ScopeKind::Iter {
            if level != Level::Stmt {
                return Err(self.structural_error("break must be used as a statement"));
            }
            let mut result = vec![self.frag("return (__breaker.$v = ", sexp)];
            result.extend(self.process(&value_sexp, Level::Expr)?);
            result.push(self.frag(", __breaker)", sexp));
            Ok(result)
        } else {
            Err(self.structural_error(
                "void value expression: cannot use break outside of iter/while",
            ))
        }
    }

    pub(super) fn process_next(
        &mut self,
        sexp: &Sexp,
        value: Option<&Sexp>,
    ) -> Result<Vec<Fragment>> {
        if self.in_while() {
            return Ok(vec![self.frag("continue;", sexp)]);
        }
        let value_sexp = value
            .cloned()
            .unwrap_or_else(|| Sexp::new(Node::Nil, sexp.line));
        let mut result = vec![self.frag("return ", sexp)];
        result.extend(self.process(&value_sexp, Level::Expr)?);
        Ok(result)
    }

    pub(super) fn process_redo(&mut self, sexp: &Sexp) -> Result<Vec<Fragment>> {
        if self.in_while() {
            let frame = self
                .scope_mut()
                .while_stack
                .last_mut()
                .expect("in_while checked");
            frame.use_redo = true;
            let redo_var = frame.redo_var.clone();
            Ok(vec![self.frag(eco_format!("{redo_var} = true"), sexp)])
        } else {
            self.warn("redo used outside of a while loop");
            Ok(vec![self.frag("REDO();", sexp)])
        }
    }

    pub(super) fn process_return(
        &mut self,
        sexp: &Sexp,
        value: Option<&Sexp>,
        level: Level,
    ) -> Result<Vec<Fragment>> {
        if level != Level::Stmt {
            return Err(
                self.structural_error("void value expression: cannot use return as an expression")
            );
        }
        let value_sexp = value
            .cloned()
            .unwrap_or_else(|| Sexp::new(Node::Nil, sexp.line));
        if self.scope().kind == ScopeKind::Iter {
            // A lexical return unwinds the enclosing method, not just the
            // block: hand the runtime its breaker sentinel.
            let mut result = vec![self.frag("return (__breaker.$v = ", sexp)];
            result.extend(self.process(&value_sexp, Level::Expr)?);
            result.push(self.frag(", __breaker)", sexp));
            Ok(result)
        } else {
            let mut result = vec![self.frag("return ", sexp)];
            result.extend(self.process(&value_sexp, Level::Expr)?);
            Ok(result)
        }
    }

    pub(super) fn process_js_return(
        &mut self,
        sexp: &Sexp,
        value: Option<&Sexp>,
    ) -> Result<Vec<Fragment>> {
        let mut result = vec![self.frag("return ", sexp)];
        match value {
            Some(value) => result.extend(self.process(value, Level::Expr)?),
            None => result.push(self.frag("nil", sexp)),
        }
        Ok(result)
    }

    // --- Yield ---

    /// Compiles the raw block invocation shared by every yield form.
    fn compile_yield_call(&mut self, sexp: &Sexp, args: &[Sexp]) -> Result<Vec<Fragment>> {
        self.mark_uses_block();
        let block_name = self
            .current_block_name()
            .unwrap_or_else(|| "__yield".into());
        let splat = args
            .iter()
            .any(|arg| matches!(arg.node, Node::Splat(_)));

        let mut list: Vec<Sexp> = Vec::with_capacity(args.len() + 1);
        if !splat {
            list.push(Sexp::new(Node::JsTmp("null".into()), sexp.line));
        }
        list.extend(args.iter().cloned());
        let (arg_frags, _) = self.compile_arglist(&list)?;

        let mut result = if splat {
            vec![self.frag(eco_format!("{block_name}.apply(null, "), sexp)]
        } else {
            vec![self.frag(eco_format!("{block_name}.call("), sexp)]
        };
        result.extend(arg_frags);
        result.push(self.frag(")", sexp));
        Ok(result)
    }

    pub(super) fn process_yield(
        &mut self,
        sexp: &Sexp,
        args: &[Sexp],
        level: Level,
    ) -> Result<Vec<Fragment>> {
        let call = self.compile_yield_call(sexp, args)?;
        if level == Level::Stmt {
            let mut result = vec![self.frag("if (", sexp)];
            result.extend(call);
            result.push(self.frag(" === __breaker) return __breaker.$v", sexp));
            Ok(result)
        } else {
            self.with_temp(|gen, tmp| {
                let mut result = vec![gen.frag(eco_format!("((({tmp} = "), sexp)];
                result.extend(call);
                result.push(gen.frag(
                    eco_format!(") === __breaker) ? __breaker.$v : {tmp})"),
                    sexp,
                ));
                Ok(result)
            })
        }
    }

    pub(super) fn process_returnable_yield(
        &mut self,
        sexp: &Sexp,
        args: &[Sexp],
    ) -> Result<Vec<Fragment>> {
        let call = self.compile_yield_call(sexp, args)?;
        self.with_temp(|gen, tmp| {
            let mut result = vec![gen.frag(eco_format!("return ({tmp} = "), sexp)];
            result.extend(call);
            result.push(gen.frag(
                eco_format!(", {tmp} === __breaker ? __breaker.$v : {tmp})"),
                sexp,
            ));
            Ok(result)
        })
    }

    /// A statement-level yield assignment produced by the inline-yield
    /// lifter.
    pub(super) fn process_yasgn(
        &mut self,
        sexp: &Sexp,
        name: &str,
        value: &Sexp,
    ) -> Result<Vec<Fragment>> {
        let Node::Yield(args) = &value.node else {
            return Err(self.structural_error("yasgn value must be a yield"));
        };
        let args = args.clone();
        let call = self.compile_yield_call(sexp, &args)?;
        let mut result = vec![self.frag(eco_format!("if (({name} = "), sexp)];
        result.extend(call);
        result.push(self.frag(") === __breaker) return __breaker.$v", sexp));
        Ok(result)
    }

    // --- defined? ---

    pub(super) fn process_defined(&mut self, sexp: &Sexp, part: &Sexp) -> Result<Vec<Fragment>> {
        match &part.node {
            Node::SelfRef => Ok(vec![self.frag("\"self\"", sexp)]),
            Node::Nil => Ok(vec![self.frag("\"nil\"", sexp)]),
            Node::True => Ok(vec![self.frag("\"true\"", sexp)]),
            Node::False => Ok(vec![self.frag("\"false\"", sexp)]),
            Node::Lvar(_) => Ok(vec![self.frag("\"local-variable\"", sexp)]),
            Node::Call { recv, mid, .. } => {
                let jsid = super::mangle::mid_to_jsid(mid);
                let mut result = vec![self.frag("(", sexp)];
                match recv {
                    Some(recv) => result.extend(self.process(recv, Level::Recv)?),
                    None => {
                        let name = self.current_self();
                        result.push(self.frag(name, sexp));
                    }
                }
                result.push(self.frag(
                    eco_format!("{jsid} ? \"method\" : nil)"),
                    sexp,
                ));
                Ok(result)
            }
            Node::Ivar(name) => {
                let recv = self.current_self();
                let key = super::mangle::inspect_string(name);
                Ok(vec![self.frag(
                    eco_format!("({recv}[{key}] != null ? \"instance-variable\" : nil)"),
                    sexp,
                )])
            }
            Node::Const(name) => Ok(vec![self.frag(
                eco_format!("(__scope.{name} != null ? \"constant\" : nil)"),
                sexp,
            )]),
            Node::Gvar(name) => {
                self.require_helper(super::Helper::Gvars);
                let key = super::mangle::inspect_string(name);
                Ok(vec![self.frag(
                    eco_format!("(__gvars[{key}] != null ? \"global-variable\" : nil)"),
                    sexp,
                )])
            }
            Node::Xstr(code) => Ok(vec![self.frag(
                eco_format!("(typeof({code}) !== \"undefined\")"),
                sexp,
            )]),
            Node::Colon2(..) => Ok(vec![self.frag("false", sexp)]),
            _ => Err(self.structural_error(format!(
                "bad defined? part: {}",
                part.kind_name()
            ))),
        }
    }
}
