// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Class, module, singleton-class, and method definition emitters.
//!
//! A class body compiles to an immediately-invoked function that boots the
//! constructor through the runtime and then runs the body against a `def`
//! alias of the prototype:
//!
//! ```javascript
//! (function(__base, __super){
//!   function Foo() {};
//!   Foo = __klass(__base, __super, "Foo", Foo);
//!   var def = Foo.prototype, __scope = Foo._scope;
//!   def.$bar = function() { ... };
//!   ;__donate(Foo, ["$bar"]);
//! })(self, null)
//! ```
//!
//! Method definitions install differently per surrounding scope: onto the
//! `def` prototype alias in class and module bodies (capturing the prior
//! implementation first when the body calls `super`), through
//! `__opal.defs` for singleton methods on the open class, through `_defn`
//! inside `Object` itself, and onto the toplevel `def` alias everywhere
//! else.

use ecow::{eco_format, EcoString};

use crate::ast::{Literal, Node, Sexp};
use crate::codegen::Result;

use super::fragment::Fragment;
use super::mangle::{inspect_string, lvar_to_js, mid_to_jsid};
use super::scope::ScopeKind;
use super::{Helper, JavaScriptGenerator, Level, INDENT};

impl JavaScriptGenerator<'_> {
    pub(super) fn process_class(
        &mut self,
        sexp: &Sexp,
        cpath: &Sexp,
        superclass: Option<&Sexp>,
        body: &Sexp,
    ) -> Result<Vec<Fragment>> {
        self.require_helper(Helper::Klass);
        let (base_frags, name) = self.resolve_definition_path(sexp, cpath)?;
        let sup_frags = match superclass {
            Some(superclass) => self.process(superclass, Level::Expr)?,
            None => vec![self.frag("null", sexp)],
        };

        let outer = self.indent.clone();
        let inner = format!("{outer}{INDENT}");

        let (body_frags, var_decl, guards, methods) = self.in_indent(|gen| {
            gen.in_scope(ScopeKind::Class, |gen| {
                gen.scope_mut().name = Some(name.clone());
                gen.scope_mut()
                    .add_temp_decl(eco_format!("def = {name}.prototype"));
                gen.scope_mut()
                    .add_temp_decl(eco_format!("__scope = {name}._scope"));
                let body = ensure_body_returns_nil(body);
                let frags = gen.process(&body, Level::Stmt)?;
                Ok((
                    frags,
                    gen.scope().var_declarations(),
                    gen.ivar_guards(&name),
                    gen.scope().methods.clone(),
                ))
            })
        })?;

        let mut result = vec![self.frag("(function(__base, __super){\n", sexp)];
        result.push(Fragment::anonymous(inner.clone()));
        result.push(self.frag(eco_format!("function {name}() {{}};\n"), sexp));
        result.push(Fragment::anonymous(inner.clone()));
        result.push(self.frag(
            eco_format!(
                "{name} = __klass(__base, __super, {}, {name});\n",
                inspect_string(&name)
            ),
            sexp,
        ));
        if let Some(var_decl) = var_decl {
            result.push(Fragment::anonymous(format!("{inner}{var_decl}\n")));
        }
        for guard in guards {
            result.push(Fragment::anonymous(format!("{inner}{guard}\n")));
        }
        result.push(Fragment::anonymous(inner.clone()));
        result.extend(body_frags);
        if let Some(donate) = donate_line(&name, &methods) {
            self.require_helper(Helper::Donate);
            result.push(Fragment::anonymous(format!("\n{inner}{donate}")));
        }
        result.push(Fragment::anonymous(format!("\n{outer}}})(")));
        result.extend(base_frags);
        result.push(self.frag(", ", sexp));
        result.extend(sup_frags);
        result.push(self.frag(")", sexp));
        Ok(result)
    }

    pub(super) fn process_module(
        &mut self,
        sexp: &Sexp,
        cpath: &Sexp,
        body: &Sexp,
    ) -> Result<Vec<Fragment>> {
        self.require_helper(Helper::Module);
        let (base_frags, name) = self.resolve_definition_path(sexp, cpath)?;

        let outer = self.indent.clone();
        let inner = format!("{outer}{INDENT}");

        let (body_frags, var_decl, guards, methods) = self.in_indent(|gen| {
            gen.in_scope(ScopeKind::Module, |gen| {
                gen.scope_mut().name = Some(name.clone());
                gen.scope_mut()
                    .add_temp_decl(eco_format!("def = {name}.prototype"));
                gen.scope_mut()
                    .add_temp_decl(eco_format!("__scope = {name}._scope"));
                let frags = gen.process(body, Level::Stmt)?;
                Ok((
                    frags,
                    gen.scope().var_declarations(),
                    gen.ivar_guards(&name),
                    gen.scope().methods.clone(),
                ))
            })
        })?;

        let mut result = vec![self.frag("(function(__base){\n", sexp)];
        result.push(Fragment::anonymous(inner.clone()));
        result.push(self.frag(eco_format!("function {name}() {{}};\n"), sexp));
        result.push(Fragment::anonymous(inner.clone()));
        result.push(self.frag(
            eco_format!("{name} = __module(__base, {}, {name});\n", inspect_string(&name)),
            sexp,
        ));
        if let Some(var_decl) = var_decl {
            result.push(Fragment::anonymous(format!("{inner}{var_decl}\n")));
        }
        for guard in guards {
            result.push(Fragment::anonymous(format!("{inner}{guard}\n")));
        }
        result.push(Fragment::anonymous(inner.clone()));
        result.extend(body_frags);
        if let Some(donate) = donate_line(&name, &methods) {
            self.require_helper(Helper::Donate);
            result.push(Fragment::anonymous(format!("\n{inner}{donate}")));
        }
        result.push(Fragment::anonymous(format!("\n{outer}}})(")));
        result.extend(base_frags);
        result.push(self.frag(")", sexp));
        Ok(result)
    }

    pub(super) fn process_sclass(
        &mut self,
        sexp: &Sexp,
        recv: &Sexp,
        body: &Sexp,
    ) -> Result<Vec<Fragment>> {
        let recv_frags = self.process(recv, Level::Expr)?;
        let outer = self.indent.clone();
        let inner = format!("{outer}{INDENT}");

        let (body_frags, var_decl, guards) = self.in_indent(|gen| {
            gen.in_scope(ScopeKind::Sclass, |gen| {
                gen.scope_mut().add_temp_decl("__scope = self._scope");
                gen.scope_mut().add_temp_decl("def = self.prototype");
                let frags = gen.process(body, Level::Stmt)?;
                Ok((frags, gen.scope().var_declarations(), gen.ivar_guards("self")))
            })
        })?;

        let mut result = vec![self.frag("(function(){\n", sexp)];
        if let Some(var_decl) = var_decl {
            result.push(Fragment::anonymous(format!("{inner}{var_decl}\n")));
        }
        for guard in guards {
            result.push(Fragment::anonymous(format!("{inner}{guard}\n")));
        }
        result.push(Fragment::anonymous(inner));
        result.extend(body_frags);
        result.push(Fragment::anonymous(format!("\n{outer}}}).call(__opal.singleton(")));
        result.extend(recv_frags);
        result.push(self.frag("))", sexp));
        Ok(result)
    }

    pub(super) fn process_defn(
        &mut self,
        sexp: &Sexp,
        mid: &str,
        args: &Sexp,
        body: &Sexp,
    ) -> Result<Vec<Fragment>> {
        self.js_def(sexp, None, mid, args, body)
    }

    pub(super) fn process_defs(
        &mut self,
        sexp: &Sexp,
        recv: &Sexp,
        mid: &str,
        args: &Sexp,
        body: &Sexp,
    ) -> Result<Vec<Fragment>> {
        self.js_def(sexp, Some(recv), mid, args, body)
    }

    /// Shared emitter behind `defn` and `defs`.
    fn js_def(
        &mut self,
        sexp: &Sexp,
        recvr: Option<&Sexp>,
        mid: &str,
        args_sexp: &Sexp,
        body: &Sexp,
    ) -> Result<Vec<Fragment>> {
        let jsid = mid_to_jsid(mid);
        let Node::Args { names, defaults } = &args_sexp.node else {
            return Err(self.structural_error("bad method parameter list"));
        };

        // Install-site bookkeeping happens in the surrounding scope.
        let mut smethod = false;
        let recv_frags = if let Some(recvr) = recvr {
            self.scope_mut().defines_defs = true;
            if self.scope().kind.is_class_like() && matches!(recvr.node, Node::SelfRef) {
                smethod = true;
            }
            Some(self.process(recvr, Level::Expr)?)
        } else {
            self.scope_mut().defines_defn = true;
            // Top and iterator installs go through the toplevel `def`
            // alias, which the assembler only declares on demand.
            if !self.scope().kind.is_class_like() && self.scope().kind != ScopeKind::Sclass {
                self.scopes[0].defines_defn = true;
            }
            None
        };

        // Parameter shape: plain names, then `*splat`, then `&block`.
        let mut names: Vec<EcoString> = names.clone();
        let mut block_param: Option<EcoString> = None;
        if names.last().is_some_and(|n| n.starts_with('&')) {
            let raw = names.pop().expect("checked non-empty");
            block_param = Some(lvar_to_js(&raw[1..]));
        }
        let mut splat: Option<Option<EcoString>> = None;
        if names.last().is_some_and(|n| n.starts_with('*')) {
            let raw = names.pop().expect("checked non-empty");
            splat = Some((raw != "*").then(|| lvar_to_js(&raw[1..])));
        }
        let argc = names.len();

        let default_assignments: Vec<Sexp> = match defaults.as_deref() {
            Some(Sexp {
                node: Node::Block(stmts),
                ..
            }) => stmts.clone(),
            Some(single) => vec![single.clone()],
            None => Vec::new(),
        };
        let arity_code = self
            .options
            .arity_check
            .then(|| arity_check_code(mid, argc, default_assignments.len(), splat.is_some()));

        let outer = self.indent.clone();
        let inner = format!("{outer}{INDENT}");

        let scope_parts = self.in_indent(|gen| {
            gen.in_scope(ScopeKind::Def, |gen| {
                gen.scope_mut().mid = Some(mid.into());
                gen.scope_mut().is_defs = recvr.is_some();
                gen.scope_mut().add_temp_decl("self = this");

                let yielder = block_param.clone().unwrap_or_else(|| "__yield".into());
                gen.scope_mut().block_name = Some(yielder.clone());
                gen.scope_mut().add_arg(&yielder);
                if block_param.is_some() {
                    gen.scope_mut().uses_block = true;
                }

                let mut params: Vec<EcoString> = Vec::with_capacity(names.len());
                for name in &names {
                    let mangled = lvar_to_js(name);
                    gen.scope_mut().add_arg(&mangled);
                    params.push(mangled);
                }

                // Pre-body statements: splat extraction, then defaults.
                let mut pre: Vec<Fragment> = Vec::new();
                if let Some(Some(splat_name)) = &splat {
                    gen.scope_mut().add_arg(splat_name);
                    gen.scope_mut().add_temp_decl(splat_name.clone());
                    pre.push(Fragment::anonymous(gen.indent.clone()));
                    pre.push(gen.frag(
                        eco_format!("{splat_name} = __slice.call(arguments, {argc});\n"),
                        sexp,
                    ));
                }
                for assignment in &default_assignments {
                    let Node::Lasgn(pname, Some(default)) = &assignment.node else {
                        return Err(
                            gen.structural_error("bad default-value assignment in parameter list")
                        );
                    };
                    if is_undefined_literal(default) {
                        continue;
                    }
                    let pname = lvar_to_js(pname);
                    pre.push(Fragment::anonymous(gen.indent.clone()));
                    pre.push(gen.frag(eco_format!("if ({pname} == null) {{ "), assignment));
                    pre.extend(gen.process(assignment, Level::Expr)?);
                    pre.push(gen.frag(" }\n", assignment));
                }

                let body_frags = gen.process(body, Level::Stmt)?;

                let uses_block = gen.scope().uses_block;
                let block_setup = if uses_block {
                    let identity = gen.identify_scope();
                    gen.scope_mut().add_temp_decl(yielder.clone());
                    Some(eco_format!(
                        "{yielder} = {identity}._p || nil, {identity}._p = null;"
                    ))
                } else {
                    None
                };

                Ok(DefParts {
                    params,
                    pre,
                    body_frags,
                    block_setup,
                    var_decl: gen.scope().var_declarations(),
                    guards: gen.ivar_guards("self"),
                    identity: gen.scope().identity.clone(),
                    super_alias: gen.scope().super_alias.clone(),
                })
            })
        })?;

        // The function literal itself.
        let mut function: Vec<Fragment> = Vec::new();
        if let Some(identity) = &scope_parts.identity {
            function.push(self.frag(eco_format!("{identity} = "), sexp));
        }
        let params = scope_parts
            .params
            .iter()
            .map(EcoString::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        function.push(self.frag(eco_format!("function({params}) {{\n"), sexp));
        if let Some(arity_code) = arity_code {
            function.push(Fragment::anonymous(format!("{inner}{arity_code}\n")));
        }
        if let Some(var_decl) = &scope_parts.var_decl {
            function.push(Fragment::anonymous(format!("{inner}{var_decl}\n")));
        }
        for guard in &scope_parts.guards {
            function.push(Fragment::anonymous(format!("{inner}{guard}\n")));
        }
        if let Some(block_setup) = &scope_parts.block_setup {
            function.push(Fragment::anonymous(format!("{inner}{block_setup}\n")));
        }
        function.extend(scope_parts.pre);
        function.push(Fragment::anonymous(inner));
        function.extend(scope_parts.body_frags);
        function.push(Fragment::anonymous(format!("\n{outer}}}")));

        // Install into the surrounding context.
        if let Some(recv_frags) = recv_frags {
            if smethod {
                let class_name = self
                    .scope()
                    .name
                    .clone()
                    .unwrap_or_else(|| "self".into());
                let mut result = vec![self.frag(
                    eco_format!("__opal.defs({class_name}, '${mid}', "),
                    sexp,
                )];
                result.extend(function);
                result.push(self.frag(")", sexp));
                Ok(result)
            } else {
                let mut result = recv_frags;
                result.push(self.frag(eco_format!("{jsid} = "), sexp));
                result.extend(function);
                Ok(result)
            }
        } else if self.scope().kind.is_class_like() {
            if self.scope().name.as_deref() == Some("Object") {
                let name = self.current_self();
                let mut result =
                    vec![self.frag(eco_format!("{name}._defn('${mid}', "), sexp)];
                result.extend(function);
                result.push(self.frag(")", sexp));
                Ok(result)
            } else {
                self.scope_mut().methods.push(eco_format!("${mid}"));
                let mut result = Vec::new();
                if let Some(alias) = scope_parts.super_alias {
                    // Capture the implementation being shadowed so super
                    // can reach it after the reassignment below.
                    self.scope_mut().add_temp_decl(alias.clone());
                    result.push(self.frag(
                        eco_format!("{alias} = def{jsid};\n{}", self.indent),
                        sexp,
                    ));
                }
                result.push(self.frag(eco_format!("def{jsid} = "), sexp));
                result.extend(function);
                Ok(result)
            }
        } else {
            let mut result = vec![self.frag(eco_format!("def{jsid} = "), sexp)];
            result.extend(function);
            Ok(result)
        }
    }

    /// `alias new old` assigns one prototype slot to another.
    pub(super) fn process_alias(
        &mut self,
        sexp: &Sexp,
        new: &Sexp,
        old: &Sexp,
    ) -> Result<Vec<Fragment>> {
        let new_name = self.symbol_name(new)?;
        let old_name = self.symbol_name(old)?;
        let new_jsid = mid_to_jsid(&new_name);
        let old_jsid = mid_to_jsid(&old_name);
        if self.scope().kind.is_class_like() {
            self.scope_mut().methods.push(eco_format!("${new_name}"));
            Ok(vec![self.frag(
                eco_format!("def{new_jsid} = def{old_jsid}"),
                sexp,
            )])
        } else {
            let recv = self.current_self();
            Ok(vec![self.frag(
                eco_format!("{recv}.prototype{new_jsid} = {recv}.prototype{old_jsid}"),
                sexp,
            )])
        }
    }

    /// Expands `attr_reader`/`attr_writer`/`attr_accessor` with literal
    /// names into plain method definitions.
    pub(super) fn expand_attr_definitions(
        &mut self,
        sexp: &Sexp,
        mid: &str,
        names: &[Sexp],
    ) -> Result<Vec<Fragment>> {
        let line = sexp.line;
        let mut defns = Vec::new();
        for name_sexp in names {
            let name = self.symbol_name(name_sexp)?;
            if mid != "attr_writer" {
                defns.push(Sexp::new(
                    Node::Defn {
                        mid: name.clone(),
                        args: Box::new(Sexp::new(
                            Node::Args {
                                names: Vec::new(),
                                defaults: None,
                            },
                            line,
                        )),
                        body: Box::new(Sexp::new(
                            Node::Scope(Some(Box::new(Sexp::new(
                                Node::Ivar(name.clone()),
                                line,
                            )))),
                            line,
                        )),
                    },
                    line,
                ));
            }
            if mid != "attr_reader" {
                defns.push(Sexp::new(
                    Node::Defn {
                        mid: eco_format!("{name}="),
                        args: Box::new(Sexp::new(
                            Node::Args {
                                names: vec!["val".into()],
                                defaults: None,
                            },
                            line,
                        )),
                        body: Box::new(Sexp::new(
                            Node::Scope(Some(Box::new(Sexp::new(
                                Node::Iasgn(
                                    name.clone(),
                                    Some(Box::new(Sexp::new(Node::Lvar("val".into()), line))),
                                ),
                                line,
                            )))),
                            line,
                        )),
                    },
                    line,
                ));
            }
        }
        let block = Sexp::new(Node::Block(defns), line);
        self.process(&block, Level::Stmt)
    }

    /// Resolves a class/module path to its base object and plain name.
    fn resolve_definition_path(
        &mut self,
        sexp: &Sexp,
        cpath: &Sexp,
    ) -> Result<(Vec<Fragment>, EcoString)> {
        match &cpath.node {
            Node::Const(name) => {
                let recv = self.current_self();
                Ok((vec![self.frag(recv, sexp)], name.clone()))
            }
            Node::Colon2(base, name) => {
                let base_frags = self.process(base, Level::Expr)?;
                Ok((base_frags, name.clone()))
            }
            Node::Colon3(name) => Ok((
                vec![self.frag("__opal.Object", sexp)],
                name.clone(),
            )),
            _ => Err(self.structural_error(format!(
                "bad receiver in class/module definition: {}",
                cpath.kind_name()
            ))),
        }
    }
}

/// Carries the pieces assembled inside a def scope out to the install
/// site.
struct DefParts {
    params: Vec<EcoString>,
    pre: Vec<Fragment>,
    body_frags: Vec<Fragment>,
    block_setup: Option<EcoString>,
    var_decl: Option<EcoString>,
    guards: Vec<EcoString>,
    identity: Option<EcoString>,
    super_alias: Option<EcoString>,
}

/// A class body whose last statement is a method definition gets a
/// trailing `nil` so the body expression does not end on the install.
fn ensure_body_returns_nil(body: &Sexp) -> Sexp {
    let Node::Scope(Some(stmt)) = &body.node else {
        return body.clone();
    };
    let needs_nil = match &stmt.node {
        Node::Block(stmts) => stmts
            .last()
            .is_some_and(|s| matches!(s.node, Node::Defn { .. } | Node::Defs { .. })),
        Node::Defn { .. } | Node::Defs { .. } => true,
        _ => false,
    };
    if !needs_nil {
        return body.clone();
    }
    let line = stmt.line;
    let new_stmt = match &stmt.node {
        Node::Block(stmts) => {
            let mut stmts = stmts.clone();
            stmts.push(Sexp::new(Node::Nil, line));
            Sexp::new(Node::Block(stmts), line)
        }
        _ => Sexp::new(
            Node::Block(vec![(**stmt).clone(), Sexp::new(Node::Nil, line)]),
            line,
        ),
    };
    Sexp {
        node: Node::Scope(Some(Box::new(new_stmt))),
        line: body.line,
        end_line: body.end_line,
    }
}

/// The donation call listing every method a class/module body declared.
fn donate_line(name: &str, methods: &[EcoString]) -> Option<String> {
    if methods.is_empty() {
        return None;
    }
    let list = methods
        .iter()
        .map(|m| inspect_string(m).to_string())
        .collect::<Vec<_>>()
        .join(", ");
    Some(format!(";__donate({name}, [{list}]);"))
}

/// The runtime arity guard emitted at method entry.
fn arity_check_code(mid: &str, argc: usize, opt_count: usize, has_splat: bool) -> String {
    let mut arity = argc as i64 - opt_count as i64;
    if opt_count > 0 || has_splat {
        arity = -arity - 1;
    }
    let quoted = inspect_string(mid);
    if arity < 0 {
        format!(
            "var $arity = arguments.length; if ($arity < {}) {{ __opal.ac($arity, {arity}, this, {quoted}); }}",
            -(arity + 1)
        )
    } else {
        format!(
            "var $arity = arguments.length; if ($arity !== {arity}) {{ __opal.ac($arity, {arity}, this, {quoted}); }}"
        )
    }
}

/// `def foo(a = undefined)` keeps the JavaScript-level undefined instead
/// of nil-defaulting.
fn is_undefined_literal(sexp: &Sexp) -> bool {
    matches!(
        &sexp.node,
        Node::Lvar(name) | Node::Const(name) | Node::JsTmp(name) if name == "undefined"
    ) || matches!(&sexp.node, Node::Lit(Literal::Sym(name)) if name == "undefined")
}
