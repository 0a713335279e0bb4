// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! JavaScript code generation.
//!
//! This module transforms the source s-expression tree into a single
//! self-contained JavaScript program targeting the Opal runtime library.
//! The translator is a recursive tree walker: each node kind has one
//! emitter, every emitter returns ordered position-tagged
//! [`fragment::Fragment`]s, and the final pass concatenates them.
//!
//! # Architecture
//!
//! The whole program is wrapped in a module prologue binding the runtime
//! helpers the emitted code actually demanded:
//!
//! ```javascript
//! (function(__opal) {
//!   var self = __opal.top, __scope = __opal, $mm = __opal.mm, nil = __opal.nil,
//!       __breaker = __opal.breaker, __slice = __opal.slice;
//!   // ... translated program ...
//! })(Opal);
//! ```
//!
//! Emission happens at an explicit [`Level`]: statement-position constructs
//! that must produce a value (an `if` in expression position, a `while` on
//! the right of an assignment) are wrapped in immediately-invoked functions
//! and their branches rewritten by [`returns::returned`] so the wrapper
//! returns the value.
//!
//! The generator is strictly single-threaded and not re-entrant: one
//! [`generate`] call per instance at a time, and all state (`line`,
//! scope stack, helper demands, temp counter) lives for exactly one call.

use std::collections::BTreeSet;

use ecow::{eco_format, EcoString};

use crate::ast::{Node, Sexp};
use crate::codegen::{CodeGenError, Result};

pub mod fragment;
pub mod mangle;
pub mod returns;
pub mod scope;

mod blocks;
mod calls;
mod control_flow;
mod definitions;
mod exceptions;
mod literals;
mod variables;

#[cfg(test)]
mod tests;

use fragment::{serialize, Fragment};
use scope::{Scope, ScopeKind};

/// Indentation unit used throughout the generated output.
pub const INDENT: &str = "  ";

/// The emission context of a subtree.
///
/// Ordered from pure statement position to receiver position. `Recv`
/// additionally forces parentheses around numeric literals and compound
/// expressions so the output parses as a method receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    /// Plain statement position.
    Stmt,
    /// Statement position inside a value-producing closure wrapper.
    StmtClosure,
    /// List element position.
    List,
    /// Expression position; the value is consumed.
    Expr,
    /// Method receiver position.
    Recv,
}

/// A runtime helper the emitted code can demand.
///
/// The variant order fixes the prologue declaration order: `breaker` and
/// `slice` always come first, the remainder alphabetically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Helper {
    /// `__breaker`, the non-local-return sentinel.
    Breaker,
    /// `__slice`, `Array.prototype.slice`.
    Slice,
    /// `__donate`, method donation for classes and modules.
    Donate,
    /// `__gvars`, the global-variable table.
    Gvars,
    /// `__hash`, hash construction from a flat pair list.
    Hash,
    /// `__hash2`, hash construction from known string keys.
    Hash2,
    /// `__klass`, class boot.
    Klass,
    /// `__module`, module boot.
    Module,
    /// `__range`, range construction.
    Range,
}

impl Helper {
    /// The short runtime name, as bound in the prologue.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Helper::Breaker => "breaker",
            Helper::Slice => "slice",
            Helper::Donate => "donate",
            Helper::Gvars => "gvars",
            Helper::Hash => "hash",
            Helper::Hash2 => "hash2",
            Helper::Klass => "klass",
            Helper::Module => "module",
            Helper::Range => "range",
        }
    }
}

/// Options controlling a [`generate`] call.
#[derive(Debug, Clone)]
pub struct CompilerOptions {
    /// Logical file name used in error messages and the source-map comment.
    pub file: EcoString,
    /// Name shown in the file comment; defaults to `file`.
    pub source_file: Option<EcoString>,
    /// Emit method-missing-aware dispatch.
    pub method_missing: bool,
    /// Emit the inline numeric fast path for comparison and arithmetic
    /// operators.
    pub optimized_operators: bool,
    /// Emit runtime arity checks at method entry.
    pub arity_check: bool,
    /// Route constant lookups through the runtime const-missing trap.
    pub const_missing: bool,
    /// Rewrite top-level locals to the persistent `Opal.irb_vars` table.
    pub irb: bool,
    /// Tag fragments with line markers and prepend the source-map and file
    /// comments.
    pub source_map_enabled: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            file: "(file)".into(),
            source_file: None,
            method_missing: true,
            optimized_operators: true,
            arity_check: false,
            const_missing: true,
            irb: false,
            source_map_enabled: true,
        }
    }
}

impl CompilerOptions {
    /// Sets the logical file name.
    #[must_use]
    pub fn with_file(mut self, file: impl Into<EcoString>) -> Self {
        self.file = file.into();
        self
    }

    /// Sets the name shown in the file comment.
    #[must_use]
    pub fn with_source_file(mut self, source_file: impl Into<EcoString>) -> Self {
        self.source_file = Some(source_file.into());
        self
    }

    /// Disables source-map comments and fragment markers.
    #[must_use]
    pub fn without_source_map(mut self) -> Self {
        self.source_map_enabled = false;
        self
    }

    /// Disables method-missing-aware dispatch.
    #[must_use]
    pub fn without_method_missing(mut self) -> Self {
        self.method_missing = false;
        self
    }

    /// Disables the inline numeric operator fast path.
    #[must_use]
    pub fn without_optimized_operators(mut self) -> Self {
        self.optimized_operators = false;
        self
    }

    /// Disables the const-missing trap.
    #[must_use]
    pub fn without_const_missing(mut self) -> Self {
        self.const_missing = false;
        self
    }

    /// Enables runtime arity checks.
    #[must_use]
    pub fn with_arity_check(mut self) -> Self {
        self.arity_check = true;
        self
    }

    /// Enables irb mode: top-level locals persist in `Opal.irb_vars`.
    #[must_use]
    pub fn with_irb(mut self) -> Self {
        self.irb = true;
        self
    }

    /// The name shown in the file comment.
    #[must_use]
    pub fn source_file(&self) -> &EcoString {
        self.source_file.as_ref().unwrap_or(&self.file)
    }
}

/// Generates JavaScript for a whole program.
///
/// A missing program (empty source) compiles as `nil`.
///
/// # Errors
///
/// Returns [`CodeGenError`] when the tree contains a construct in an
/// impossible position (`break` outside a loop, `return` in expression
/// position, a malformed interpolation part). Partial output is never
/// exposed.
pub fn generate(program: Option<&Sexp>, options: &CompilerOptions) -> Result<String> {
    let mut generator = JavaScriptGenerator::new(options);
    generator.generate_program(program)
}

/// The tree-walking JavaScript generator.
///
/// Holds all mutable translation state for a single [`generate`] call;
/// not re-entrant.
pub struct JavaScriptGenerator<'a> {
    options: &'a CompilerOptions,
    /// Source line of the node currently being emitted.
    line: u32,
    /// Counter backing `TMP_n` temp names and scope identities.
    unique: usize,
    /// The lexical scope stack; last is innermost.
    scopes: Vec<Scope>,
    /// Runtime helpers demanded so far.
    helpers: BTreeSet<Helper>,
    /// Current output indentation.
    indent: String,
    /// Set when a string literal equal to the file name was emitted.
    uses_file: bool,
}

impl<'a> JavaScriptGenerator<'a> {
    /// Creates a generator for one program.
    #[must_use]
    pub fn new(options: &'a CompilerOptions) -> Self {
        let mut helpers = BTreeSet::new();
        helpers.insert(Helper::Breaker);
        helpers.insert(Helper::Slice);
        Self {
            options,
            line: 1,
            unique: 0,
            scopes: Vec::new(),
            helpers,
            indent: String::new(),
            uses_file: false,
        }
    }

    /// Returns `true` when the program embedded its own file name in a
    /// string literal.
    ///
    /// [`generate`] returns only the output string; callers that need
    /// this flag (build tooling keeping logical names stable across
    /// bundling) drive the generator directly and read it after
    /// [`JavaScriptGenerator::generate_program`] returns.
    #[must_use]
    pub fn uses_file(&self) -> bool {
        self.uses_file
    }

    /// Translates the program and assembles the module wrapper.
    ///
    /// # Errors
    ///
    /// See [`generate`].
    pub fn generate_program(&mut self, program: Option<&Sexp>) -> Result<String> {
        let default_program = Sexp::new(Node::Nil, 1);
        let program = program.unwrap_or(&default_program);
        let wrapper = Sexp::new(
            Node::Scope(Some(Box::new(program.clone()))),
            program.line,
        );

        let (body, prologue, guards) = self.in_scope(ScopeKind::Top, |gen| {
            let body = gen.in_indent(|gen| gen.process(&wrapper, Level::Stmt))?;

            let mut decls: Vec<EcoString> = vec![
                "self = __opal.top".into(),
                "__scope = __opal".into(),
                "$mm = __opal.mm".into(),
                "nil = __opal.nil".into(),
            ];
            for helper in &gen.helpers {
                let name = helper.name();
                decls.push(eco_format!("__{name} = __opal.{name}"));
            }
            let scope = gen.scope();
            if scope.defines_defn {
                decls.push("def = __opal.Object.prototype".into());
            }
            decls.extend(scope.temps.iter().cloned());
            decls.extend(scope.locals.iter().map(|l| eco_format!("{l} = nil")));

            let mut prologue = String::from("var ");
            for (i, decl) in decls.iter().enumerate() {
                if i > 0 {
                    prologue.push_str(", ");
                }
                prologue.push_str(decl);
            }
            prologue.push(';');

            let guards = gen.ivar_guards("self");
            Ok((body, prologue, guards))
        })?;

        debug_assert!(self.scopes.is_empty(), "scope stack must unwind");

        let mut output = String::new();
        if self.options.source_map_enabled {
            output.push_str(&format!(
                "//@ sourceMappingURL=/__opal_source_maps__/{}.js.map\n",
                self.options.file
            ));
            output.push_str(&format!("/*-file:{}-*/\n", self.options.source_file()));
        }
        output.push_str("(function(__opal) {\n");
        output.push_str(INDENT);
        output.push_str(&prologue);
        output.push('\n');
        for guard in &guards {
            output.push_str(INDENT);
            output.push_str(guard);
            output.push('\n');
        }
        output.push_str(INDENT);
        output.push_str(&serialize(&body, self.options.source_map_enabled));
        output.push_str("\n})(Opal);\n");
        Ok(output)
    }

    // --- Dispatch ---

    /// Emits one node at the given level.
    ///
    /// Every emitter updates the current line before recursing, so errors
    /// and fragment tags point at the node being emitted.
    pub(super) fn process(&mut self, sexp: &Sexp, level: Level) -> Result<Vec<Fragment>> {
        self.line = sexp.line;
        match &sexp.node {
            Node::Nil => Ok(vec![self.frag("nil", sexp)]),
            Node::True => Ok(vec![self.frag("true", sexp)]),
            Node::False => Ok(vec![self.frag("false", sexp)]),
            Node::SelfRef => {
                let name = self.current_self();
                Ok(vec![self.frag(name, sexp)])
            }
            Node::JsTmp(name) => Ok(vec![self.frag(name.clone(), sexp)]),

            Node::Lit(lit) => self.process_lit(sexp, lit, level),
            Node::Str(value) => self.process_str(sexp, value),
            Node::Dstr(parts) => self.process_dstr(sexp, parts),
            Node::Dsym(parts) => self.process_dsym(sexp, parts),
            Node::Evstr(inner) => self.process(inner, Level::Expr),
            Node::Xstr(code) => self.process_xstr(sexp, code, level),
            Node::Dxstr(parts) => self.process_dxstr(sexp, parts, level),
            Node::Array(elements) => self.process_array(sexp, elements),
            Node::Hash(pairs) => self.process_hash(sexp, pairs),

            Node::Lvar(name) => self.process_lvar(sexp, name),
            Node::Lasgn(name, rhs) => self.process_lasgn(sexp, name, rhs.as_deref(), level),
            Node::Ivar(name) => self.process_ivar(sexp, name),
            Node::Iasgn(name, rhs) => self.process_iasgn(sexp, name, rhs.as_deref()),
            Node::Gvar(name) => self.process_gvar(sexp, name),
            Node::Gasgn(name, rhs) => self.process_gasgn(sexp, name, rhs.as_deref()),
            Node::Cvar(name) => self.process_cvar(sexp, name),
            Node::Cvasgn(name, rhs) | Node::Cvdecl(name, rhs) => {
                self.process_cvasgn(sexp, name, rhs)
            }
            Node::Const(name) => self.process_const(sexp, name),
            Node::Cdecl(name, rhs) => self.process_cdecl(sexp, name, rhs),
            Node::Colon2(base, name) => self.process_colon2(sexp, base, name),
            Node::Colon3(name) => self.process_colon3(sexp, name),
            Node::NthRef(name) => self.process_nth_ref(sexp, name),

            Node::Masgn { targets, rhs } => self.process_masgn(sexp, targets, rhs.as_deref()),
            Node::Svalue(inner) | Node::ToAry(inner) => self.process(inner, level),
            Node::Splat(inner) => self.process_splat(sexp, inner.as_deref()),
            Node::OpAsgnOr(read, write) => self.process_op_asgn_or(sexp, read, write),
            Node::OpAsgnAnd(read, write) => self.process_op_asgn_and(sexp, read, write),
            Node::OpAsgn1 {
                recv,
                index,
                op,
                rhs,
            } => self.process_op_asgn1(sexp, recv, index, op, rhs),
            Node::OpAsgn2 { recv, mid, op, rhs } => self.process_op_asgn2(sexp, recv, mid, op, rhs),
            Node::Match3 { pattern, value } => self.process_match3(sexp, pattern, value),

            Node::Block(stmts) => self.process_block_body(sexp, stmts, level),
            Node::Begin(body) => match body {
                Some(body) => self.process(body, level),
                None => Ok(vec![self.frag("nil", sexp)]),
            },
            Node::Scope(body) => self.process_scope_node(sexp, body.as_deref()),

            Node::If {
                test,
                then_body,
                else_body,
            } => self.process_if(sexp, test, then_body.as_deref(), else_body.as_deref(), level),
            Node::While { test, body } => {
                self.process_while(sexp, test, body.as_deref(), level, false)
            }
            Node::Until { test, body } => {
                self.process_while(sexp, test, body.as_deref(), level, true)
            }
            Node::Case {
                subject,
                whens,
                else_body,
            } => self.process_case(sexp, subject.as_deref(), whens, else_body.as_deref(), level),
            Node::When { tests, body } => self.process_when(sexp, tests, body.as_deref(), level),
            Node::Break(value) => self.process_break(sexp, value.as_deref(), level),
            Node::Next(value) => self.process_next(sexp, value.as_deref()),
            Node::Redo => self.process_redo(sexp),
            Node::Return(value) => self.process_return(sexp, value.as_deref(), level),
            Node::JsReturn(value) => self.process_js_return(sexp, value.as_deref()),
            Node::And(lhs, rhs) => self.process_and(sexp, lhs, rhs),
            Node::Or(lhs, rhs) => self.process_or(sexp, lhs, rhs),
            Node::Not(inner) => self.process_not(sexp, inner),
            Node::Defined(inner) => self.process_defined(sexp, inner),

            Node::Yield(args) => self.process_yield(sexp, args, level),
            Node::ReturnableYield(args) => self.process_returnable_yield(sexp, args),
            Node::Yasgn(name, value) => self.process_yasgn(sexp, name, value),

            Node::Class {
                cpath,
                superclass,
                body,
            } => self.process_class(sexp, cpath, superclass.as_deref(), body),
            Node::Module { cpath, body } => self.process_module(sexp, cpath, body),
            Node::Sclass { recv, body } => self.process_sclass(sexp, recv, body),
            Node::Defn { mid, args, body } => self.process_defn(sexp, mid, args, body),
            Node::Defs {
                recv,
                mid,
                args,
                body,
            } => self.process_defs(sexp, recv, mid, args, body),
            Node::Alias(new, old) => self.process_alias(sexp, new, old),
            Node::Undef(mid) => self.process_undef(sexp, mid),

            Node::Call { recv, mid, args } => {
                self.process_call(sexp, recv.as_deref(), mid, args, None, level)
            }
            Node::Attrasgn { recv, mid, args } => {
                self.process_call(sexp, recv.as_deref(), mid, args, None, level)
            }
            Node::Operator { recv, op, args } => self.process_operator(sexp, recv, op, args, level),
            Node::Arglist(args) => {
                let (frags, _) = self.compile_arglist(args)?;
                Ok(frags)
            }
            Node::BlockPass(inner) => self.process_block_pass(sexp, inner),
            Node::Iter { call, params, body } => {
                self.process_iter(sexp, call, params, body.as_deref(), level)
            }
            Node::Super(args) => self.process_super(sexp, args.as_deref()),
            Node::Zsuper => self.process_zsuper(sexp),

            Node::Rescue { body, handlers } => {
                self.process_rescue(sexp, body.as_deref(), handlers, level)
            }
            Node::Resbody { list, body } => self.process_resbody(sexp, list, body.as_deref()),
            Node::Ensure { body, ensure_body } => {
                self.process_ensure(sexp, body.as_deref(), ensure_body, level)
            }

            Node::Args { .. } => Err(self.structural_error("args node outside a definition")),
            Node::BlockArg(_) => {
                Err(self.structural_error("block argument outside a parameter list"))
            }
        }
    }

    // --- Statement sequences & scope bodies ---

    /// Emits a statement sequence, lifting inline yields ahead of the
    /// statement containing them and terminating expression statements
    /// with semicolons.
    fn process_block_body(
        &mut self,
        sexp: &Sexp,
        stmts: &[Sexp],
        level: Level,
    ) -> Result<Vec<Fragment>> {
        if stmts.is_empty() {
            return Ok(vec![self.frag("nil", sexp)]);
        }
        let stmt_level = if level == Level::StmtClosure {
            Level::StmtClosure
        } else {
            Level::Stmt
        };

        let mut result = Vec::new();
        for (i, stmt) in stmts.iter().enumerate() {
            if i > 0 {
                result.push(Fragment::anonymous(format!("\n{}", self.indent)));
            }

            let rewritten;
            let stmt = if let Some((found, lifted)) = returns::extract_inline_yield(stmt) {
                let scope = self.scope_mut();
                if !scope.temps.iter().any(|t| t == returns::YIELDED_TMP) {
                    scope.add_temp_decl(returns::YIELDED_TMP);
                }
                let yasgn = Sexp::new(
                    Node::Yasgn(returns::YIELDED_TMP.into(), Box::new(found)),
                    stmt.line,
                );
                result.extend(self.process(&yasgn, Level::Stmt)?);
                result.push(self.frag(format!(";\n{}", self.indent), stmt));
                rewritten = lifted;
                &rewritten
            } else {
                stmt
            };

            result.extend(self.process(stmt, stmt_level)?);
            if !stmt.node.is_statement() {
                result.push(self.frag(";", stmt));
            }
        }
        Ok(result)
    }

    /// Emits a scope wrapper: the body of a class, module, or method.
    /// Everything except class-like bodies is return-lifted so the
    /// enclosing function produces the body's value.
    fn process_scope_node(&mut self, sexp: &Sexp, body: Option<&Sexp>) -> Result<Vec<Fragment>> {
        let stmt = body
            .cloned()
            .unwrap_or_else(|| Sexp::new(Node::Nil, sexp.line));
        let stmt = if self.scope().kind.is_class_like() {
            stmt
        } else {
            returns::returned(stmt)
        };
        self.process(&stmt, Level::Stmt)
    }

    // --- Fragments ---

    fn frag(&self, code: impl Into<EcoString>, sexp: &Sexp) -> Fragment {
        Fragment::new(code, sexp.line)
    }

    // --- Scope stack ---

    fn in_scope<R>(
        &mut self,
        kind: ScopeKind,
        f: impl FnOnce(&mut Self) -> Result<R>,
    ) -> Result<R> {
        self.scopes.push(Scope::new(kind));
        let result = f(self);
        let finished = self.scopes.pop();
        debug_assert!(finished.is_some(), "scope stack imbalance");
        if result.is_ok() {
            debug_assert!(
                finished.is_none_or(|s| s.live.is_empty()),
                "temps still live at scope exit"
            );
        }
        result
    }

    fn in_indent<R>(&mut self, f: impl FnOnce(&mut Self) -> Result<R>) -> Result<R> {
        self.indent.push_str(INDENT);
        let result = f(self);
        let len = self.indent.len().saturating_sub(INDENT.len());
        self.indent.truncate(len);
        result
    }

    fn scope(&self) -> &Scope {
        self.scopes.last().expect("no active scope")
    }

    fn scope_mut(&mut self) -> &mut Scope {
        self.scopes.last_mut().expect("no active scope")
    }

    fn parent_scope(&self) -> Option<&Scope> {
        self.scopes.len().checked_sub(2).map(|i| &self.scopes[i])
    }

    /// Resolves what `self` means in the current scope.
    ///
    /// Class and module bodies refer to the booted constructor by name;
    /// everywhere else a `self` binding is in lexical reach: the prologue
    /// binds it at the toplevel, method bodies bind `self = this`, blocks
    /// bind `self = TMP_n._s || this`, and singleton-class bodies run
    /// `.call()`ed on the singleton.
    fn current_self(&self) -> EcoString {
        let scope = self.scope();
        match scope.kind {
            ScopeKind::Class | ScopeKind::Module => {
                scope.name.clone().unwrap_or_else(|| "self".into())
            }
            _ => "self".into(),
        }
    }

    /// Nil-guard statements for every instance variable the current scope
    /// touched.
    fn ivar_guards(&self, recv: &str) -> Vec<EcoString> {
        self.scope()
            .ivars
            .iter()
            .map(|acc| eco_format!("if ({recv}{acc} == null) {recv}{acc} = nil;"))
            .collect()
    }

    // --- Temps ---

    fn next_temp_name(&mut self) -> EcoString {
        self.unique += 1;
        eco_format!("TMP_{}", self.unique)
    }

    fn new_temp(&mut self) -> EcoString {
        if let Some(temp) = self.scope_mut().pop_pooled_temp() {
            return temp;
        }
        let name = self.next_temp_name();
        self.scope_mut().adopt_temp(name.clone());
        name
    }

    fn queue_temp(&mut self, name: &str) {
        self.scope_mut().queue_temp(name);
    }

    fn with_temp<R>(&mut self, f: impl FnOnce(&mut Self, &EcoString) -> Result<R>) -> Result<R> {
        let temp = self.new_temp();
        let result = f(self, &temp);
        self.queue_temp(&temp);
        result
    }

    /// The stable id naming the current scope's emitted function,
    /// minting and declaring it in the parent scope on first use.
    fn identify_scope(&mut self) -> EcoString {
        self.identify_scope_at(self.scopes.len() - 1)
    }

    /// Marks the nearest non-iterator scope as using a block, assigning
    /// it an identity so the emitted function can reach its own `_p`.
    fn mark_uses_block(&mut self) {
        let mut index = self.scopes.len() - 1;
        while index > 0 && self.scopes[index].kind == ScopeKind::Iter {
            if self.scopes[index].block_name.is_some() {
                break;
            }
            index -= 1;
        }
        self.scopes[index].uses_block = true;
        self.identify_scope_at(index);
    }

    /// The block slot visible from the current scope: the innermost
    /// iterator with an explicit block parameter, else the enclosing
    /// method's slot.
    fn current_block_name(&self) -> Option<EcoString> {
        for scope in self.scopes.iter().rev() {
            if let Some(name) = &scope.block_name {
                return Some(name.clone());
            }
            if scope.kind != ScopeKind::Iter {
                break;
            }
        }
        None
    }

    /// Looks a local up through the iterator chain: block bodies see the
    /// locals of the enclosing method.
    fn has_local(&self, name: &str) -> bool {
        for scope in self.scopes.iter().rev() {
            if scope.has_local(name) {
                return true;
            }
            if scope.kind != ScopeKind::Iter {
                return false;
            }
        }
        false
    }

    fn in_while(&self) -> bool {
        self.scope().in_while()
    }

    fn require_helper(&mut self, helper: Helper) {
        self.helpers.insert(helper);
    }

    // --- Diagnostics ---

    fn structural_error(&self, msg: impl Into<String>) -> CodeGenError {
        CodeGenError::Structural {
            msg: msg.into(),
            file: self.options.file.to_string(),
            line: self.line,
        }
    }

    fn unsupported_error(&self, what: impl Into<String>) -> CodeGenError {
        CodeGenError::UnsupportedNode {
            what: what.into(),
            file: self.options.file.to_string(),
            line: self.line,
        }
    }

    fn warn(&self, msg: &str) {
        tracing::warn!("{msg} :{}:{}", self.options.file, self.line);
    }
}
