// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Variable, constant, and assignment emitters.
//!
//! Local, instance, global, and class variables; constants and scoped
//! constant paths; multiple assignment; and the operator-assignment family
//! (`||=`, `&&=`, `a[i] op= v`, `a.b op= v`), which desugars onto the
//! `and`/`or` and call emitters.

use ecow::eco_format;

use crate::ast::{Node, Sexp};
use crate::codegen::Result;

use super::fragment::Fragment;
use super::mangle::{inspect_string, ivar_accessor, lvar_to_js, mid_to_jsid};
use super::scope::ScopeKind;
use super::{Helper, JavaScriptGenerator, Level};

impl JavaScriptGenerator<'_> {
    pub(super) fn process_lvar(&mut self, sexp: &Sexp, name: &str) -> Result<Vec<Fragment>> {
        let name = lvar_to_js(name);
        if self.options.irb && self.scope().kind == ScopeKind::Top {
            return self.with_temp(|gen, tmp| {
                Ok(vec![gen.frag(
                    eco_format!("(({tmp} = Opal.irb_vars.{name}) == null ? nil : {tmp})"),
                    sexp,
                )])
            });
        }
        Ok(vec![self.frag(name, sexp)])
    }

    pub(super) fn process_lasgn(
        &mut self,
        sexp: &Sexp,
        name: &str,
        rhs: Option<&Sexp>,
        level: Level,
    ) -> Result<Vec<Fragment>> {
        let Some(rhs) = rhs else {
            return Err(self.structural_error("assignment target without a value"));
        };
        let name = lvar_to_js(name);

        if self.options.irb && self.scope().kind == ScopeKind::Top {
            let mut result = vec![self.frag(eco_format!("Opal.irb_vars.{name} = "), sexp)];
            result.extend(self.process(rhs, Level::Expr)?);
            return Ok(result);
        }

        if !self.has_local(&name) {
            self.scope_mut().add_local(&name);
        }
        let mut result = vec![self.frag(eco_format!("{name} = "), sexp)];
        result.extend(self.process(rhs, Level::Expr)?);
        if level == Level::Recv {
            result.insert(0, self.frag("(", sexp));
            result.push(self.frag(")", sexp));
        }
        Ok(result)
    }

    pub(super) fn process_ivar(&mut self, sexp: &Sexp, name: &str) -> Result<Vec<Fragment>> {
        let accessor = ivar_accessor(name);
        self.scope_mut().add_ivar(&accessor);
        let recv = self.current_self();
        Ok(vec![self.frag(eco_format!("{recv}{accessor}"), sexp)])
    }

    pub(super) fn process_iasgn(
        &mut self,
        sexp: &Sexp,
        name: &str,
        rhs: Option<&Sexp>,
    ) -> Result<Vec<Fragment>> {
        let Some(rhs) = rhs else {
            return Err(self.structural_error("assignment target without a value"));
        };
        let accessor = ivar_accessor(name);
        let recv = self.current_self();
        let mut result = vec![self.frag(eco_format!("{recv}{accessor} = "), sexp)];
        result.extend(self.process(rhs, Level::Expr)?);
        Ok(result)
    }

    pub(super) fn process_gvar(&mut self, sexp: &Sexp, name: &str) -> Result<Vec<Fragment>> {
        self.require_helper(Helper::Gvars);
        let key = inspect_string(name);
        Ok(vec![self.frag(eco_format!("__gvars[{key}]"), sexp)])
    }

    pub(super) fn process_gasgn(
        &mut self,
        sexp: &Sexp,
        name: &str,
        rhs: Option<&Sexp>,
    ) -> Result<Vec<Fragment>> {
        let Some(rhs) = rhs else {
            return Err(self.structural_error("assignment target without a value"));
        };
        self.require_helper(Helper::Gvars);
        let key = inspect_string(name);
        let mut result = vec![self.frag(eco_format!("__gvars[{key}] = "), sexp)];
        result.extend(self.process(rhs, Level::Expr)?);
        Ok(result)
    }

    pub(super) fn process_cvar(&mut self, sexp: &Sexp, name: &str) -> Result<Vec<Fragment>> {
        let key = inspect_string(name);
        self.with_temp(|gen, tmp| {
            Ok(vec![gen.frag(
                eco_format!("(({tmp} = Opal.cvars[{key}]) == null ? nil : {tmp})"),
                sexp,
            )])
        })
    }

    pub(super) fn process_cvasgn(
        &mut self,
        sexp: &Sexp,
        name: &str,
        rhs: &Sexp,
    ) -> Result<Vec<Fragment>> {
        let key = inspect_string(name);
        let mut result = vec![self.frag(eco_format!("(Opal.cvars[{key}] = "), sexp)];
        result.extend(self.process(rhs, Level::Expr)?);
        result.push(self.frag(")", sexp));
        Ok(result)
    }

    pub(super) fn process_const(&mut self, sexp: &Sexp, name: &str) -> Result<Vec<Fragment>> {
        if self.options.const_missing {
            let quoted = inspect_string(name);
            self.with_temp(|gen, tmp| {
                Ok(vec![gen.frag(
                    eco_format!("(({tmp} = __scope.{name}) == null ? __opal.cm({quoted}) : {tmp})"),
                    sexp,
                )])
            })
        } else {
            Ok(vec![self.frag(eco_format!("__scope.{name}"), sexp)])
        }
    }

    pub(super) fn process_cdecl(
        &mut self,
        sexp: &Sexp,
        name: &str,
        rhs: &Sexp,
    ) -> Result<Vec<Fragment>> {
        let mut result = vec![self.frag(eco_format!("__scope.{name} = "), sexp)];
        result.extend(self.process(rhs, Level::Expr)?);
        Ok(result)
    }

    pub(super) fn process_colon2(
        &mut self,
        sexp: &Sexp,
        base: &Sexp,
        name: &str,
    ) -> Result<Vec<Fragment>> {
        let base_frags = self.process(base, Level::Expr)?;
        if self.options.const_missing {
            let quoted = inspect_string(name);
            self.with_temp(|gen, tmp| {
                let mut result = vec![gen.frag(eco_format!("(({tmp} = ("), sexp)];
                result.extend(base_frags);
                result.push(gen.frag(
                    eco_format!(")._scope.{name}) == null ? __opal.cm({quoted}) : {tmp})"),
                    sexp,
                ));
                Ok(result)
            })
        } else {
            let mut result = vec![self.frag("(", sexp)];
            result.extend(base_frags);
            result.push(self.frag(eco_format!(")._scope.{name}"), sexp));
            Ok(result)
        }
    }

    pub(super) fn process_colon3(&mut self, sexp: &Sexp, name: &str) -> Result<Vec<Fragment>> {
        if self.options.const_missing {
            let quoted = inspect_string(name);
            self.with_temp(|gen, tmp| {
                Ok(vec![gen.frag(
                    eco_format!(
                        "(({tmp} = __opal.Object._scope.{name}) == null ? __opal.cm({quoted}) : {tmp})"
                    ),
                    sexp,
                )])
            })
        } else {
            Ok(vec![self.frag(eco_format!("__opal.Object._scope.{name}"), sexp)])
        }
    }

    /// Regexp match references have no runtime support; they compile to a
    /// stable `nil` with a warning rather than an error.
    pub(super) fn process_nth_ref(&mut self, sexp: &Sexp, name: &str) -> Result<Vec<Fragment>> {
        self.warn(&format!("match reference ${name} is unsupported, compiling to nil"));
        Ok(vec![self.frag("nil", sexp)])
    }

    /// Emits a multiple assignment as one comma expression: the rhs is
    /// captured in a temp coerced to an array, then each target is
    /// assigned its slot.
    pub(super) fn process_masgn(
        &mut self,
        sexp: &Sexp,
        targets: &[Sexp],
        rhs: Option<&Sexp>,
    ) -> Result<Vec<Fragment>> {
        let Some(rhs) = rhs else {
            return Err(self.structural_error("multiple assignment without a right-hand side"));
        };

        let tmp = self.new_temp();
        let mut result = Vec::new();
        // Slots at or past the known length need a null guard; only an
        // array-literal rhs has known slots.
        let mut known_len = 0;

        match &rhs.node {
            Node::Array(elements) => {
                known_len = elements.len();
                result.push(self.frag(eco_format!("{tmp} = "), sexp));
                result.extend(self.process(rhs, Level::Expr)?);
            }
            Node::ToAry(inner) => {
                result.push(self.frag(eco_format!("(({tmp} = "), sexp));
                result.extend(self.process(inner, Level::Expr)?);
                result.push(self.frag(
                    eco_format!(")._isArray ? {tmp} : ({tmp} = [{tmp}]))"),
                    sexp,
                ));
            }
            Node::Splat(Some(inner)) => {
                result.push(self.frag(eco_format!("({tmp} = "), sexp));
                result.extend(self.process(inner, Level::Expr)?);
                result.push(self.frag(
                    eco_format!(
                        ")['$to_a'] ? ({tmp} = {tmp}['$to_a']()) : ({tmp})._isArray ? {tmp} : ({tmp} = [{tmp}])"
                    ),
                    sexp,
                ));
            }
            _ => {
                return Err(self.structural_error(format!(
                    "unsupported multiple assignment rhs: {}",
                    rhs.kind_name()
                )))
            }
        }

        for (index, target) in targets.iter().enumerate() {
            if let Node::Splat(inner) = &target.node {
                let Some(inner) = inner else { continue };
                let value = eco_format!("__slice.call({tmp}, {index})");
                result.push(self.frag(", ", target));
                let assigned = self.fill_assignment(inner, value, target.line)?;
                result.extend(self.process(&assigned, Level::Expr)?);
            } else {
                let value = if index >= known_len {
                    eco_format!("({tmp}[{index}] == null ? nil : {tmp}[{index}])")
                } else {
                    eco_format!("{tmp}[{index}]")
                };
                result.push(self.frag(", ", target));
                let assigned = self.fill_assignment(target, value, target.line)?;
                result.extend(self.process(&assigned, Level::Expr)?);
            }
        }

        self.queue_temp(&tmp);
        Ok(result)
    }

    /// Builds a copy of a bare assignment target with a synthetic rhs.
    fn fill_assignment(
        &self,
        target: &Sexp,
        value: ecow::EcoString,
        line: u32,
    ) -> Result<Sexp> {
        let rhs = Some(Box::new(Sexp::new(Node::JsTmp(value), line)));
        let node = match &target.node {
            Node::Lasgn(name, _) => Node::Lasgn(name.clone(), rhs),
            Node::Iasgn(name, _) => Node::Iasgn(name.clone(), rhs),
            Node::Gasgn(name, _) => Node::Gasgn(name.clone(), rhs),
            _ => {
                return Err(self.structural_error(format!(
                    "unsupported multiple assignment target: {}",
                    target.kind_name()
                )))
            }
        };
        Ok(Sexp::new(node, line))
    }

    pub(super) fn process_op_asgn_or(
        &mut self,
        sexp: &Sexp,
        read: &Sexp,
        write: &Sexp,
    ) -> Result<Vec<Fragment>> {
        let or = Sexp::new(
            Node::Or(Box::new(read.clone()), Box::new(write.clone())),
            sexp.line,
        );
        self.process(&or, Level::Expr)
    }

    pub(super) fn process_op_asgn_and(
        &mut self,
        sexp: &Sexp,
        read: &Sexp,
        write: &Sexp,
    ) -> Result<Vec<Fragment>> {
        let and = Sexp::new(
            Node::And(Box::new(read.clone()), Box::new(write.clone())),
            sexp.line,
        );
        self.process(&and, Level::Expr)
    }

    /// `recv[index] op= rhs`: receiver and index are bound once, then the
    /// element goes through `$[]`, the operator, and `$[]=`.
    pub(super) fn process_op_asgn1(
        &mut self,
        sexp: &Sexp,
        recv: &Sexp,
        index: &Sexp,
        op: &str,
        rhs: &Sexp,
    ) -> Result<Vec<Fragment>> {
        let line = sexp.line;
        let recv_frags = self.process(recv, Level::Expr)?;
        let index_frags = self.process(index, Level::Expr)?;

        let recv_tmp = self.new_temp();
        let index_tmp = self.new_temp();

        let getter = Sexp::new(
            Node::Call {
                recv: Some(Box::new(Sexp::new(Node::JsTmp(recv_tmp.clone()), line))),
                mid: "[]".into(),
                args: Box::new(Sexp::new(
                    Node::Arglist(vec![Sexp::new(Node::JsTmp(index_tmp.clone()), line)]),
                    line,
                )),
            },
            line,
        );
        let combined = self.combine_op_asgn(getter, op, rhs, line);
        let setter = Sexp::new(
            Node::Call {
                recv: Some(Box::new(Sexp::new(Node::JsTmp(recv_tmp.clone()), line))),
                mid: "[]=".into(),
                args: Box::new(Sexp::new(
                    Node::Arglist(vec![
                        Sexp::new(Node::JsTmp(index_tmp.clone()), line),
                        combined,
                    ]),
                    line,
                )),
            },
            line,
        );

        let mut result = vec![self.frag(eco_format!("({recv_tmp} = "), sexp)];
        result.extend(recv_frags);
        result.push(self.frag(eco_format!(", {index_tmp} = "), sexp));
        result.extend(index_frags);
        result.push(self.frag(", ", sexp));
        result.extend(self.process(&setter, Level::Expr)?);
        result.push(self.frag(")", sexp));

        self.queue_temp(&index_tmp);
        self.queue_temp(&recv_tmp);
        Ok(result)
    }

    /// `recv.name op= rhs`: the receiver is bound once, then the value
    /// goes through the getter, the operator, and the setter.
    pub(super) fn process_op_asgn2(
        &mut self,
        sexp: &Sexp,
        recv: &Sexp,
        mid: &str,
        op: &str,
        rhs: &Sexp,
    ) -> Result<Vec<Fragment>> {
        let line = sexp.line;
        let getter_mid = mid.strip_suffix('=').unwrap_or(mid);
        let recv_frags = self.process(recv, Level::Expr)?;
        let recv_tmp = self.new_temp();

        let getter = Sexp::new(
            Node::Call {
                recv: Some(Box::new(Sexp::new(Node::JsTmp(recv_tmp.clone()), line))),
                mid: getter_mid.into(),
                args: Box::new(Sexp::new(Node::Arglist(Vec::new()), line)),
            },
            line,
        );
        let combined = self.combine_op_asgn(getter, op, rhs, line);
        let setter = Sexp::new(
            Node::Call {
                recv: Some(Box::new(Sexp::new(Node::JsTmp(recv_tmp.clone()), line))),
                mid: mid.into(),
                args: Box::new(Sexp::new(Node::Arglist(vec![combined]), line)),
            },
            line,
        );

        let mut result = vec![self.frag(eco_format!("({recv_tmp} = "), sexp)];
        result.extend(recv_frags);
        result.push(self.frag(", ", sexp));
        result.extend(self.process(&setter, Level::Expr)?);
        result.push(self.frag(")", sexp));

        self.queue_temp(&recv_tmp);
        Ok(result)
    }

    fn combine_op_asgn(&self, getter: Sexp, op: &str, rhs: &Sexp, line: u32) -> Sexp {
        match op {
            "||" => Sexp::new(
                Node::Or(Box::new(getter), Box::new(rhs.clone())),
                line,
            ),
            "&&" => Sexp::new(
                Node::And(Box::new(getter), Box::new(rhs.clone())),
                line,
            ),
            _ => Sexp::new(
                Node::Call {
                    recv: Some(Box::new(getter)),
                    mid: op.into(),
                    args: Box::new(Sexp::new(Node::Arglist(vec![rhs.clone()]), line)),
                },
                line,
            ),
        }
    }

    /// `value =~ pattern` desugars to an ordinary `=~` send.
    pub(super) fn process_match3(
        &mut self,
        sexp: &Sexp,
        pattern: &Sexp,
        value: &Sexp,
    ) -> Result<Vec<Fragment>> {
        let call = Sexp::new(
            Node::Call {
                recv: Some(Box::new(value.clone())),
                mid: "=~".into(),
                args: Box::new(Sexp::new(Node::Arglist(vec![pattern.clone()]), sexp.line)),
            },
            sexp.line,
        );
        self.process(&call, Level::Expr)
    }

    /// Expands `undef name` to a prototype delete.
    pub(super) fn process_undef(&mut self, sexp: &Sexp, mid: &Sexp) -> Result<Vec<Fragment>> {
        let name = self.symbol_name(mid)?;
        let jsid = mid_to_jsid(&name);
        if self.scope().kind.is_class_like() {
            Ok(vec![self.frag(eco_format!("delete def{jsid}"), sexp)])
        } else {
            let recv = self.current_self();
            Ok(vec![
                self.frag(eco_format!("delete {recv}.prototype{jsid}"), sexp),
            ])
        }
    }

    /// Extracts the name out of a symbol-literal node.
    pub(super) fn symbol_name(&self, sexp: &Sexp) -> Result<ecow::EcoString> {
        match &sexp.node {
            Node::Lit(crate::ast::Literal::Sym(name)) => Ok(name.clone()),
            Node::Str(name) => Ok(name.clone()),
            _ => Err(self.structural_error(format!(
                "expected a symbol, found {}",
                sexp.kind_name()
            ))),
        }
    }
}
