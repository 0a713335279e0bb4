// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Block literal (iterator) emission.
//!
//! A block compiles to a function expression bound to a stable identity
//! temp so the emitted code can reach its own slots:
//!
//! ```javascript
//! (TMP_1 = function(x) {
//!   var self = TMP_1._s || this;
//!   if (x == null) x = nil;
//!   ...
//! }, TMP_1._s = self, TMP_1)
//! ```
//!
//! The `_s` slot carries the lexical `self` into the block; the runtime
//! rebinds `this` for instance-exec style calls by leaving `_s` unset.
//! The result is attached as the block of the wrapped call.

use ecow::{eco_format, EcoString};

use crate::ast::{Node, Sexp};
use crate::codegen::Result;

use super::fragment::Fragment;
use super::mangle::lvar_to_js;
use super::returns::returned_or_nil;
use super::scope::ScopeKind;
use super::{JavaScriptGenerator, Level, INDENT};

impl JavaScriptGenerator<'_> {
    pub(super) fn process_iter(
        &mut self,
        sexp: &Sexp,
        call: &Sexp,
        params: &[Sexp],
        body: Option<&Sexp>,
        level: Level,
    ) -> Result<Vec<Fragment>> {
        let body = returned_or_nil(body.cloned(), sexp.line);

        let outer = self.indent.clone();
        let inner = format!("{outer}{INDENT}");

        let parts = self.in_indent(|gen| {
            gen.in_scope(ScopeKind::Iter, |gen| {
                let identity = gen.identify_scope();
                gen.scope_mut()
                    .add_temp_decl(eco_format!("self = {identity}._s || this"));

                let mut param_names: Vec<EcoString> = Vec::new();
                let mut pre: Vec<Fragment> = Vec::new();
                let mut block_setup: Option<EcoString> = None;

                for (index, param) in params.iter().enumerate() {
                    match &param.node {
                        Node::Lasgn(name, _) => {
                            let name = lvar_to_js(name);
                            gen.scope_mut().add_arg(&name);
                            param_names.push(name.clone());
                            pre.push(Fragment::anonymous(gen.indent.clone()));
                            pre.push(gen.frag(
                                eco_format!("if ({name} == null) {name} = nil;\n"),
                                param,
                            ));
                        }
                        Node::Masgn { targets, .. } => {
                            // Parameter destructuring reuses the multiple
                            // assignment emitter against the raw slot.
                            let destructure = gen.with_temp(|gen, tmp| {
                                param_names.push(tmp.clone());
                                let masgn = Sexp::new(
                                    Node::Masgn {
                                        targets: targets.clone(),
                                        rhs: Some(Box::new(Sexp::new(
                                            Node::ToAry(Box::new(Sexp::new(
                                                Node::JsTmp(tmp.clone()),
                                                param.line,
                                            ))),
                                            param.line,
                                        ))),
                                    },
                                    param.line,
                                );
                                gen.process(&masgn, Level::Expr)
                            })?;
                            pre.push(Fragment::anonymous(gen.indent.clone()));
                            pre.extend(destructure);
                            pre.push(gen.frag(";\n", param));
                        }
                        Node::Splat(Some(target)) => {
                            let Node::Lasgn(name, _) = &target.node else {
                                return Err(gen.structural_error(
                                    "bad splat parameter in block parameter list",
                                ));
                            };
                            let name = lvar_to_js(name);
                            gen.scope_mut().add_arg(&name);
                            param_names.push(name.clone());
                            pre.push(Fragment::anonymous(gen.indent.clone()));
                            pre.push(gen.frag(
                                eco_format!(
                                    "{name} = __slice.call(arguments, {index});\n"
                                ),
                                param,
                            ));
                        }
                        Node::Splat(None) => {}
                        Node::BlockArg(name) => {
                            let name = lvar_to_js(name);
                            gen.scope_mut().block_name = Some(name.clone());
                            gen.scope_mut().uses_block = true;
                            gen.scope_mut().add_arg(&name);
                            gen.scope_mut().add_temp_decl(name.clone());
                            block_setup = Some(eco_format!(
                                "{name} = {identity}._p || nil, {identity}._p = null;"
                            ));
                        }
                        _ => {
                            return Err(gen.structural_error(format!(
                                "bad block parameter: {}",
                                param.kind_name()
                            )))
                        }
                    }
                }

                let body_frags = gen.process(&body, Level::Stmt)?;

                Ok(IterParts {
                    identity,
                    param_names,
                    pre,
                    block_setup,
                    body_frags,
                    var_decl: gen.scope().var_declarations(),
                    guards: gen.ivar_guards("self"),
                })
            })
        })?;

        let identity = &parts.identity;
        let params = parts
            .param_names
            .iter()
            .map(EcoString::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        let mut block = vec![self.frag(
            eco_format!("({identity} = function({params}) {{\n"),
            sexp,
        )];
        if let Some(var_decl) = &parts.var_decl {
            block.push(Fragment::anonymous(format!("{inner}{var_decl}\n")));
        }
        for guard in &parts.guards {
            block.push(Fragment::anonymous(format!("{inner}{guard}\n")));
        }
        if let Some(block_setup) = &parts.block_setup {
            block.push(Fragment::anonymous(format!("{inner}{block_setup}\n")));
        }
        block.extend(parts.pre);
        block.push(Fragment::anonymous(inner));
        block.extend(parts.body_frags);
        let outer_self = self.current_self();
        block.push(Fragment::anonymous(format!(
            "\n{outer}}}, {identity}._s = {outer_self}, {identity})"
        )));

        // Attach as the block of the wrapped call.
        match &call.node {
            Node::Call { recv, mid, args } => {
                self.process_call(call, recv.as_deref(), mid, args, Some(block), level)
            }
            _ => Err(self.structural_error(format!(
                "bad iterator target: {}",
                call.kind_name()
            ))),
        }
    }
}

/// Pieces assembled inside an iterator scope.
struct IterParts {
    identity: EcoString,
    param_names: Vec<EcoString>,
    pre: Vec<Fragment>,
    block_setup: Option<EcoString>,
    body_frags: Vec<Fragment>,
    var_decl: Option<EcoString>,
    guards: Vec<EcoString>,
}
