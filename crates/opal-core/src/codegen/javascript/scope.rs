// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Lexical scope state for code generation.
//!
//! The generator keeps an explicit stack of [`Scope`] records, one per
//! `top`/`class`/`module`/`sclass`/`def`/`iter` construct being emitted.
//! Each scope tracks:
//!
//! - **Declarations**: locals, parameters, and the `var` snippets emitted
//!   at the head of the scope's function body
//! - **Temporaries**: a free list of reusable synthetic names (`TMP_1`,
//!   `TMP_2`, ...) so sibling subtrees share declarations
//! - **Instance variables seen**, so the scope head can nil-guard them
//! - **Method names declared**, for the donation list of a class/module
//! - **Block and super usage flags**, which decide what the surrounding
//!   definition must capture
//! - **While-loop frames** consulted by `break`/`next`/`redo`
//!
//! Cross-scope operations (local lookup through iterator chains, block-name
//! resolution, the super chain) live on the generator, which owns the
//! stack; this module is the single-scope state only.

use ecow::EcoString;

/// The kind of construct a scope belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// The program toplevel.
    Top,
    /// A `class` body.
    Class,
    /// A `module` body.
    Module,
    /// A `class << recv` body.
    Sclass,
    /// A method body.
    Def,
    /// A block (iterator) body.
    Iter,
}

impl ScopeKind {
    /// Returns `true` for class and module bodies, where method
    /// definitions install onto a prototype alias.
    #[must_use]
    pub fn is_class_like(self) -> bool {
        matches!(self, ScopeKind::Class | ScopeKind::Module)
    }
}

/// One frame of the while-loop stack, consulted by `break`, `next` and
/// `redo` emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhileFrame {
    /// The loop was wrapped in a closure (expression position), so
    /// `break` must emit `return` instead of `break`.
    pub closure: bool,
    /// The temp guarding re-entry when the body uses `redo`.
    pub redo_var: EcoString,
    /// Set when the body actually emitted a `redo`.
    pub use_redo: bool,
}

/// Per-construct lexical state.
#[derive(Debug, Clone)]
pub struct Scope {
    /// What construct this scope belongs to.
    pub kind: ScopeKind,
    /// The declared name, for class/module scopes.
    pub name: Option<EcoString>,
    /// Local variables declared in this scope.
    pub locals: Vec<EcoString>,
    /// Parameter names, in declaration order.
    pub args: Vec<EcoString>,
    /// Instance-variable accessors seen (`.name` / `['name']` form).
    pub ivars: Vec<EcoString>,
    /// Method accessors (`$name`) declared in a class/module body.
    pub methods: Vec<EcoString>,
    /// `var` declaration snippets for the scope head, in emission order.
    /// Holds every temp ever minted here plus pre-bound names such as
    /// `self = this`.
    pub temps: Vec<EcoString>,
    /// Reusable temps currently free.
    pub pool: Vec<EcoString>,
    /// Temps currently handed out and not yet queued back.
    pub live: Vec<EcoString>,
    /// The identifier bound to the block slot of a method or iterator.
    pub block_name: Option<EcoString>,
    /// The method name, for def scopes.
    pub mid: Option<EcoString>,
    /// Set when the body yields or tests `block_given?`.
    pub uses_block: bool,
    /// The captured-super alias, set when a class-scope method body calls
    /// `super`.
    pub super_alias: Option<EcoString>,
    /// Set when a plain method definition was emitted inside this scope.
    pub defines_defn: bool,
    /// Set when a singleton method definition was emitted inside it.
    pub defines_defs: bool,
    /// This scope is a singleton-method (`def recv.name`) body.
    pub is_defs: bool,
    /// Stable id (`TMP_N`) naming the emitted function, assigned lazily.
    pub identity: Option<EcoString>,
    /// Innermost-last stack of active while/until loops.
    pub while_stack: Vec<WhileFrame>,
}

impl Scope {
    /// Creates an empty scope of the given kind.
    #[must_use]
    pub fn new(kind: ScopeKind) -> Self {
        Self {
            kind,
            name: None,
            locals: Vec::new(),
            args: Vec::new(),
            ivars: Vec::new(),
            methods: Vec::new(),
            temps: Vec::new(),
            pool: Vec::new(),
            live: Vec::new(),
            block_name: None,
            mid: None,
            uses_block: false,
            super_alias: None,
            defines_defn: false,
            defines_defs: false,
            is_defs: false,
            identity: None,
            while_stack: Vec::new(),
        }
    }

    /// Declares a local variable, once.
    pub fn add_local(&mut self, name: &str) {
        if !self.has_local(name) {
            self.locals.push(name.into());
        }
    }

    /// Declares a parameter.
    pub fn add_arg(&mut self, name: &str) {
        if !self.args.iter().any(|a| a == name) {
            self.args.push(name.into());
        }
    }

    /// Returns `true` if the name is a local or parameter of this scope.
    #[must_use]
    pub fn has_local(&self, name: &str) -> bool {
        self.locals.iter().any(|l| l == name) || self.args.iter().any(|a| a == name)
    }

    /// Records an instance-variable accessor for the scope-head guard.
    pub fn add_ivar(&mut self, accessor: &str) {
        if !self.ivars.iter().any(|i| i == accessor) {
            self.ivars.push(accessor.into());
        }
    }

    /// Adds a raw `var` declaration snippet to the scope head.
    pub fn add_temp_decl(&mut self, decl: impl Into<EcoString>) {
        self.temps.push(decl.into());
    }

    /// Takes a temp from the free list, if one is available. The caller
    /// mints a fresh name otherwise and registers it with
    /// [`Scope::adopt_temp`].
    pub fn pop_pooled_temp(&mut self) -> Option<EcoString> {
        let temp = self.pool.pop()?;
        self.live.push(temp.clone());
        Some(temp)
    }

    /// Registers a freshly minted temp as declared and live.
    pub fn adopt_temp(&mut self, name: EcoString) {
        self.temps.push(name.clone());
        self.live.push(name);
    }

    /// Returns a temp to the free list for reuse by sibling subtrees.
    ///
    /// Queueing a name that was never handed out is an internal error and
    /// is ignored outside debug builds.
    pub fn queue_temp(&mut self, name: &str) {
        let index = self.live.iter().position(|t| t == name);
        debug_assert!(index.is_some(), "queued unknown temp {name}");
        if let Some(index) = index {
            self.live.remove(index);
            self.pool.push(name.into());
        }
    }

    /// The `var` statement for the scope head, or `None` when nothing
    /// needs declaring. Temps come first, then locals initialised to
    /// `nil`.
    #[must_use]
    pub fn var_declarations(&self) -> Option<EcoString> {
        if self.temps.is_empty() && self.locals.is_empty() {
            return None;
        }
        let mut parts: Vec<EcoString> = self.temps.clone();
        parts.extend(self.locals.iter().map(|l| ecow::eco_format!("{l} = nil")));
        let mut decl = EcoString::from("var ");
        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                decl.push_str(", ");
            }
            decl.push_str(part);
        }
        decl.push(';');
        Some(decl)
    }

    /// The innermost active loop frame, if the scope is inside a
    /// while/until body.
    #[must_use]
    pub fn current_while(&self) -> Option<&WhileFrame> {
        self.while_stack.last()
    }

    /// Returns `true` while emitting a while/until body.
    #[must_use]
    pub fn in_while(&self) -> bool {
        !self.while_stack.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locals_declared_once() {
        let mut scope = Scope::new(ScopeKind::Def);
        scope.add_local("a");
        scope.add_local("a");
        assert_eq!(scope.locals.len(), 1);
    }

    #[test]
    fn args_count_as_locals() {
        let mut scope = Scope::new(ScopeKind::Def);
        scope.add_arg("x");
        assert!(scope.has_local("x"));
        scope.add_local("x");
        assert!(scope.locals.is_empty());
    }

    #[test]
    fn temp_queue_and_reuse() {
        let mut scope = Scope::new(ScopeKind::Def);
        assert!(scope.pop_pooled_temp().is_none());

        scope.adopt_temp("TMP_1".into());
        assert_eq!(scope.live, vec![EcoString::from("TMP_1")]);

        scope.queue_temp("TMP_1");
        assert!(scope.live.is_empty());
        assert_eq!(scope.pop_pooled_temp(), Some(EcoString::from("TMP_1")));
    }

    #[test]
    fn var_declarations_orders_temps_before_locals() {
        let mut scope = Scope::new(ScopeKind::Def);
        scope.add_temp_decl("self = this");
        scope.adopt_temp("TMP_1".into());
        scope.add_local("a");
        assert_eq!(
            scope.var_declarations().unwrap(),
            "var self = this, TMP_1, a = nil;"
        );
    }

    #[test]
    fn var_declarations_empty_scope() {
        let scope = Scope::new(ScopeKind::Top);
        assert!(scope.var_declarations().is_none());
    }

    #[test]
    fn ivar_accessors_deduplicated() {
        let mut scope = Scope::new(ScopeKind::Def);
        scope.add_ivar(".count");
        scope.add_ivar(".count");
        scope.add_ivar("['new']");
        assert_eq!(scope.ivars.len(), 2);
    }

    #[test]
    fn while_frames() {
        let mut scope = Scope::new(ScopeKind::Def);
        assert!(!scope.in_while());
        scope.while_stack.push(WhileFrame {
            closure: false,
            redo_var: "TMP_1".into(),
            use_redo: false,
        });
        assert!(scope.in_while());
        assert_eq!(scope.current_while().unwrap().redo_var, "TMP_1");
    }

    #[test]
    fn class_like_kinds() {
        assert!(ScopeKind::Class.is_class_like());
        assert!(ScopeKind::Module.is_class_like());
        assert!(!ScopeKind::Sclass.is_class_like());
        assert!(!ScopeKind::Def.is_class_like());
    }
}
