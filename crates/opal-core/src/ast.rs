// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Abstract syntax tree definitions.
//!
//! The grammar hands the code generator a tree of [`Sexp`] nodes. Every node
//! carries the source line it started on (1-based) and, for multi-line
//! constructs such as method definitions, the line it ended on. The code
//! generator reads these verbatim when tagging output fragments.
//!
//! # Design
//!
//! The source grammar produces classic tagged s-expressions
//! (`(:lasgn, :a, (:lit, 1))`). Here each tag is a [`Node`] variant with
//! typed children, so the dispatcher in `codegen::javascript` is a total
//! `match` rather than a string-keyed table, and malformed shapes are
//! unrepresentable wherever the type system can rule them out.
//!
//! Assignment nodes (`Lasgn`, `Iasgn`, `Gasgn`) carry an *optional* value:
//! inside a multiple-assignment left-hand side, and in block parameter
//! lists, the grammar emits bare targets with no value attached. The code
//! generator fills the slot with a synthetic [`Node::JsTmp`] when it
//! destructures.
//!
//! # Example
//!
//! ```
//! use opal_core::ast::{Literal, Node, Sexp};
//!
//! // Source: a = 1
//! let assign = Sexp::new(
//!     Node::Lasgn("a".into(), Some(Box::new(Sexp::new(Node::Lit(Literal::Int(1)), 1)))),
//!     1,
//! );
//! assert_eq!(assign.kind_name(), "lasgn");
//! ```

use ecow::EcoString;

/// A node in the source tree together with its source position.
#[derive(Debug, Clone, PartialEq)]
pub struct Sexp {
    /// The tagged node variant.
    pub node: Node,
    /// 1-based source line the node starts on.
    pub line: u32,
    /// 1-based source line the node ends on, when the grammar records one.
    pub end_line: Option<u32>,
}

impl Sexp {
    /// Creates a node at the given source line.
    #[must_use]
    pub fn new(node: Node, line: u32) -> Self {
        Self {
            node,
            line,
            end_line: None,
        }
    }

    /// Attaches an end line to the node.
    #[must_use]
    pub fn with_end_line(mut self, end_line: u32) -> Self {
        self.end_line = Some(end_line);
        self
    }

    /// The s-expression tag name, as the grammar spells it.
    ///
    /// Used in diagnostics so messages match the surface the grammar and
    /// older tooling talk about.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match &self.node {
            Node::Nil => "nil",
            Node::True => "true",
            Node::False => "false",
            Node::SelfRef => "self",
            Node::Lit(_) => "lit",
            Node::Str(_) => "str",
            Node::Dstr(_) => "dstr",
            Node::Dsym(_) => "dsym",
            Node::Evstr(_) => "evstr",
            Node::Xstr(_) => "xstr",
            Node::Dxstr(_) => "dxstr",
            Node::Lvar(_) => "lvar",
            Node::Lasgn(..) => "lasgn",
            Node::Ivar(_) => "ivar",
            Node::Iasgn(..) => "iasgn",
            Node::Gvar(_) => "gvar",
            Node::Gasgn(..) => "gasgn",
            Node::Cvar(_) => "cvar",
            Node::Cvasgn(..) => "cvasgn",
            Node::Cvdecl(..) => "cvdecl",
            Node::Const(_) => "const",
            Node::Cdecl(..) => "cdecl",
            Node::Colon2(..) => "colon2",
            Node::Colon3(_) => "colon3",
            Node::NthRef(_) => "nth_ref",
            Node::Array(_) => "array",
            Node::Hash(_) => "hash",
            Node::Splat(_) => "splat",
            Node::Svalue(_) => "svalue",
            Node::ToAry(_) => "to_ary",
            Node::Masgn { .. } => "masgn",
            Node::Block(_) => "block",
            Node::Begin(_) => "begin",
            Node::If { .. } => "if",
            Node::While { .. } => "while",
            Node::Until { .. } => "until",
            Node::Case { .. } => "case",
            Node::When { .. } => "when",
            Node::Break(_) => "break",
            Node::Next(_) => "next",
            Node::Redo => "redo",
            Node::Return(_) => "return",
            Node::JsReturn(_) => "js_return",
            Node::JsTmp(_) => "js_tmp",
            Node::And(..) => "and",
            Node::Or(..) => "or",
            Node::Not(_) => "not",
            Node::Defined(_) => "defined",
            Node::Yield(_) => "yield",
            Node::ReturnableYield(_) => "returnable_yield",
            Node::Yasgn(..) => "yasgn",
            Node::Scope(_) => "scope",
            Node::Class { .. } => "class",
            Node::Module { .. } => "module",
            Node::Sclass { .. } => "sclass",
            Node::Defn { .. } => "defn",
            Node::Defs { .. } => "defs",
            Node::Args { .. } => "args",
            Node::Alias(..) => "alias",
            Node::Undef(_) => "undef",
            Node::Call { .. } => "call",
            Node::Attrasgn { .. } => "attrasgn",
            Node::Operator { .. } => "operator",
            Node::Arglist(_) => "arglist",
            Node::BlockPass(_) => "block_pass",
            Node::BlockArg(_) => "block_arg",
            Node::Iter { .. } => "iter",
            Node::Super(_) => "super",
            Node::Zsuper => "zsuper",
            Node::OpAsgnOr(..) => "op_asgn_or",
            Node::OpAsgnAnd(..) => "op_asgn_and",
            Node::OpAsgn1 { .. } => "op_asgn1",
            Node::OpAsgn2 { .. } => "op_asgn2",
            Node::Match3 { .. } => "match3",
            Node::Rescue { .. } => "rescue",
            Node::Resbody { .. } => "resbody",
            Node::Ensure { .. } => "ensure",
        }
    }
}

/// A literal value carried by a `lit` node.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// An integer literal.
    Int(i64),
    /// A float literal.
    Float(f64),
    /// A symbol literal (`:name`).
    Sym(EcoString),
    /// A regular expression literal; the pattern source without delimiters.
    Regexp(EcoString),
    /// An integer range literal (`a..b` or `a...b`).
    Range {
        /// Range start.
        start: i64,
        /// Range end.
        end: i64,
        /// `true` for `...` (end excluded).
        exclusive: bool,
    },
}

/// A tagged source-tree node.
///
/// One variant per s-expression kind the grammar emits, plus the synthetic
/// kinds the code generator introduces during rewrites (`js_return`,
/// `js_tmp`, `returnable_yield`, `yasgn`).
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    // --- Atoms ---
    /// `nil`
    Nil,
    /// `true`
    True,
    /// `false`
    False,
    /// `self`
    SelfRef,
    /// A literal value.
    Lit(Literal),

    // --- Strings ---
    /// A plain string literal.
    Str(EcoString),
    /// An interpolated string; parts are `Str` or `Evstr` nodes.
    Dstr(Vec<Sexp>),
    /// An interpolated symbol; parts as for `Dstr`.
    Dsym(Vec<Sexp>),
    /// One `#{...}` interpolation inside a `Dstr`/`Dsym`/`Dxstr`.
    Evstr(Box<Sexp>),
    /// Inline JavaScript spliced verbatim into the output.
    Xstr(EcoString),
    /// Inline JavaScript with interpolated parts (`Str` or `Evstr`).
    Dxstr(Vec<Sexp>),

    // --- Variables ---
    /// Local variable read.
    Lvar(EcoString),
    /// Local variable assignment; the value is absent inside masgn targets
    /// and block parameter lists.
    Lasgn(EcoString, Option<Box<Sexp>>),
    /// Instance variable read; the name is stored without its `@` sigil.
    Ivar(EcoString),
    /// Instance variable assignment.
    Iasgn(EcoString, Option<Box<Sexp>>),
    /// Global variable read; the name keeps its `$` sigil.
    Gvar(EcoString),
    /// Global variable assignment.
    Gasgn(EcoString, Option<Box<Sexp>>),
    /// Class variable read; the name keeps its `@@` sigil.
    Cvar(EcoString),
    /// Class variable assignment in method scope.
    Cvasgn(EcoString, Box<Sexp>),
    /// Class variable declaration in class scope.
    Cvdecl(EcoString, Box<Sexp>),
    /// Constant read.
    Const(EcoString),
    /// Constant assignment.
    Cdecl(EcoString, Box<Sexp>),
    /// Scoped constant read (`Base::Name`).
    Colon2(Box<Sexp>, EcoString),
    /// Top-scoped constant read (`::Name`).
    Colon3(EcoString),
    /// A regexp match reference (`$1`, `` $` ``, ...).
    NthRef(EcoString),

    // --- Collections & multiple assignment ---
    /// An array literal; elements may include `Splat` nodes.
    Array(Vec<Sexp>),
    /// A hash literal as a flat key/value list.
    Hash(Vec<Sexp>),
    /// A splatted expression (`*expr`); bare `*` carries no child.
    Splat(Option<Box<Sexp>>),
    /// A single-value wrapper around a splatted rhs (`a = *b`).
    Svalue(Box<Sexp>),
    /// An rhs needing array coercion in multiple assignment.
    ToAry(Box<Sexp>),
    /// Multiple assignment. Targets are bare assignment nodes (no value)
    /// or `Splat` wrappers around one; `rhs` is absent in block parameter
    /// destructuring, where the value comes from the parameter slot.
    Masgn {
        /// Assignment targets, in order.
        targets: Vec<Sexp>,
        /// The right-hand side: `Array`, `ToAry` or `Splat`.
        rhs: Option<Box<Sexp>>,
    },

    // --- Statements & control flow ---
    /// A statement sequence.
    Block(Vec<Sexp>),
    /// A `begin ... end` wrapper with no rescue/ensure.
    Begin(Option<Box<Sexp>>),
    /// Conditional; either branch may be absent.
    If {
        /// The condition.
        test: Box<Sexp>,
        /// The then-branch.
        then_body: Option<Box<Sexp>>,
        /// The else-branch.
        else_body: Option<Box<Sexp>>,
    },
    /// `while` loop.
    While {
        /// The loop condition.
        test: Box<Sexp>,
        /// The loop body.
        body: Option<Box<Sexp>>,
    },
    /// `until` loop.
    Until {
        /// The loop condition.
        test: Box<Sexp>,
        /// The loop body.
        body: Option<Box<Sexp>>,
    },
    /// `case` expression.
    Case {
        /// The scrutinee; absent for condition-style `case`.
        subject: Option<Box<Sexp>>,
        /// The `When` clauses.
        whens: Vec<Sexp>,
        /// The else body.
        else_body: Option<Box<Sexp>>,
    },
    /// One `when` clause; tests may include `Splat` nodes.
    When {
        /// The comparison expressions.
        tests: Vec<Sexp>,
        /// The clause body.
        body: Option<Box<Sexp>>,
    },
    /// `break`, with an optional value.
    Break(Option<Box<Sexp>>),
    /// `next`, with an optional value.
    Next(Option<Box<Sexp>>),
    /// `redo`.
    Redo,
    /// `return`, with an optional value.
    Return(Option<Box<Sexp>>),
    /// Synthetic: a raw JavaScript `return` produced by return-lifting.
    JsReturn(Option<Box<Sexp>>),
    /// Synthetic: a raw JavaScript expression spliced as an identifier.
    JsTmp(EcoString),
    /// Short-circuit `and`/`&&`.
    And(Box<Sexp>, Box<Sexp>),
    /// Short-circuit `or`/`||`.
    Or(Box<Sexp>, Box<Sexp>),
    /// Negation (`not` / `!`).
    Not(Box<Sexp>),
    /// `defined?(expr)`.
    Defined(Box<Sexp>),

    // --- Yield ---
    /// `yield` with arguments.
    Yield(Vec<Sexp>),
    /// Synthetic: a `yield` whose value is returned from the enclosing
    /// function, produced by return-lifting.
    ReturnableYield(Vec<Sexp>),
    /// Synthetic: a statement-level yield-assignment produced by the
    /// inline-yield lifter. The child is the original `Yield`.
    Yasgn(EcoString, Box<Sexp>),

    // --- Definitions ---
    /// A scope wrapper around a class/module/method body.
    Scope(Option<Box<Sexp>>),
    /// Class definition.
    Class {
        /// The class path: `Const`, `Colon2` or `Colon3`.
        cpath: Box<Sexp>,
        /// The superclass expression, if written.
        superclass: Option<Box<Sexp>>,
        /// The `Scope`-wrapped body.
        body: Box<Sexp>,
    },
    /// Module definition.
    Module {
        /// The module path.
        cpath: Box<Sexp>,
        /// The `Scope`-wrapped body.
        body: Box<Sexp>,
    },
    /// Singleton-class reopening (`class << recv`).
    Sclass {
        /// The receiver whose singleton class is opened.
        recv: Box<Sexp>,
        /// The `Scope`-wrapped body.
        body: Box<Sexp>,
    },
    /// Method definition.
    Defn {
        /// The method name.
        mid: EcoString,
        /// The `Args` parameter list.
        args: Box<Sexp>,
        /// The `Scope`-wrapped body.
        body: Box<Sexp>,
    },
    /// Singleton method definition (`def recv.name`).
    Defs {
        /// The receiver.
        recv: Box<Sexp>,
        /// The method name.
        mid: EcoString,
        /// The `Args` parameter list.
        args: Box<Sexp>,
        /// The `Scope`-wrapped body.
        body: Box<Sexp>,
    },
    /// A method parameter list. Names appear in declaration order; a splat
    /// keeps its `*` prefix (a bare `*` is the name `*`) and a block
    /// parameter keeps its `&` prefix. Optional-argument defaults arrive as
    /// a trailing `Block` of `Lasgn` nodes.
    Args {
        /// Parameter names with sigils preserved.
        names: Vec<EcoString>,
        /// Default-value assignments for optional parameters.
        defaults: Option<Box<Sexp>>,
    },
    /// `alias new old`; both children are symbol literals.
    Alias(Box<Sexp>, Box<Sexp>),
    /// `undef name`; the child is a symbol literal.
    Undef(Box<Sexp>),

    // --- Calls ---
    /// Method call. A missing receiver means an implicit `self` send.
    Call {
        /// The receiver, if explicit.
        recv: Option<Box<Sexp>>,
        /// The method name.
        mid: EcoString,
        /// The `Arglist`.
        args: Box<Sexp>,
    },
    /// Attribute assignment (`recv.name = value`); `mid` keeps its `=`.
    Attrasgn {
        /// The receiver.
        recv: Option<Box<Sexp>>,
        /// The setter name.
        mid: EcoString,
        /// The `Arglist`.
        args: Box<Sexp>,
    },
    /// A binary operator send the grammar marks as optimizable
    /// (`< > <= >= + - * / == !=`).
    Operator {
        /// The left operand.
        recv: Box<Sexp>,
        /// The operator name.
        op: EcoString,
        /// The `Arglist` holding the right operand.
        args: Box<Sexp>,
    },
    /// A call argument list; elements may include `Splat` and a trailing
    /// `BlockPass`.
    Arglist(Vec<Sexp>),
    /// A `&expr` block-pass argument.
    BlockPass(Box<Sexp>),
    /// A `&name` block parameter inside an iterator parameter list.
    BlockArg(EcoString),
    /// A block literal attached to a call.
    Iter {
        /// The call the block is attached to.
        call: Box<Sexp>,
        /// Block parameters: `Lasgn` (plain), `Masgn` (destructuring),
        /// `Splat` and `BlockArg` nodes.
        params: Vec<Sexp>,
        /// The block body.
        body: Option<Box<Sexp>>,
    },
    /// `super` with an explicit `Arglist`.
    Super(Option<Box<Sexp>>),
    /// `super` without parentheses, forwarding the current arguments.
    Zsuper,

    // --- Operator assignment ---
    /// `a ||= b` as a `(read, write)` pair.
    OpAsgnOr(Box<Sexp>, Box<Sexp>),
    /// `a &&= b` as a `(read, write)` pair.
    OpAsgnAnd(Box<Sexp>, Box<Sexp>),
    /// `recv[index] op= rhs`.
    OpAsgn1 {
        /// The indexed receiver.
        recv: Box<Sexp>,
        /// The index expression.
        index: Box<Sexp>,
        /// The operator (`+`, `||`, ...).
        op: EcoString,
        /// The right-hand side.
        rhs: Box<Sexp>,
    },
    /// `recv.name op= rhs`; `mid` is the setter name keeping its `=`.
    OpAsgn2 {
        /// The receiver.
        recv: Box<Sexp>,
        /// The setter name.
        mid: EcoString,
        /// The operator.
        op: EcoString,
        /// The right-hand side.
        rhs: Box<Sexp>,
    },
    /// `value =~ pattern` with a literal regexp.
    Match3 {
        /// The regexp literal.
        pattern: Box<Sexp>,
        /// The matched value.
        value: Box<Sexp>,
    },

    // --- Exceptions ---
    /// `begin/rescue` construct.
    Rescue {
        /// The protected body.
        body: Option<Box<Sexp>>,
        /// The `Resbody` handlers, in order.
        handlers: Vec<Sexp>,
    },
    /// One `rescue` clause. The type list is an `Array` whose trailing
    /// element may be a bare `Lasgn`/`Iasgn` binding the raised error.
    Resbody {
        /// Exception class expressions plus optional binding target.
        list: Box<Sexp>,
        /// The handler body.
        body: Option<Box<Sexp>>,
    },
    /// `begin/ensure` construct.
    Ensure {
        /// The protected body.
        body: Option<Box<Sexp>>,
        /// The ensure body.
        ensure_body: Box<Sexp>,
    },
}

impl Node {
    /// Returns `true` for nodes emitted as whole statements, which the
    /// statement-sequence emitter must not terminate with a semicolon.
    #[must_use]
    pub fn is_statement(&self) -> bool {
        matches!(self, Node::Xstr(_) | Node::Dxstr(_) | Node::If { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_match_grammar_tags() {
        assert_eq!(Sexp::new(Node::Nil, 1).kind_name(), "nil");
        assert_eq!(
            Sexp::new(Node::Lasgn("a".into(), None), 1).kind_name(),
            "lasgn"
        );
        assert_eq!(
            Sexp::new(
                Node::Masgn {
                    targets: Vec::new(),
                    rhs: None
                },
                1
            )
            .kind_name(),
            "masgn"
        );
    }

    #[test]
    fn end_line_attaches() {
        let sexp = Sexp::new(Node::Nil, 3).with_end_line(7);
        assert_eq!(sexp.line, 3);
        assert_eq!(sexp.end_line, Some(7));
    }

    #[test]
    fn statement_kinds() {
        assert!(Node::Xstr("done()".into()).is_statement());
        assert!(Node::If {
            test: Box::new(Sexp::new(Node::True, 1)),
            then_body: None,
            else_body: None,
        }
        .is_statement());
        assert!(!Node::Nil.is_statement());
    }
}
