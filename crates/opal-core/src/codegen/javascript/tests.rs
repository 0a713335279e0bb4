// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! End-to-end emission tests for the JavaScript generator.

use super::*;
use crate::ast::{Literal, Node, Sexp};

fn plain_options() -> CompilerOptions {
    CompilerOptions::default().without_source_map()
}

fn generate_plain(program: Sexp) -> String {
    generate(Some(&program), &plain_options()).expect("generation succeeds")
}

// --- Construction helpers ---

fn lit(n: i64) -> Sexp {
    Sexp::new(Node::Lit(Literal::Int(n)), 1)
}

fn sym(name: &str) -> Sexp {
    Sexp::new(Node::Lit(Literal::Sym(name.into())), 1)
}

fn str_node(value: &str) -> Sexp {
    Sexp::new(Node::Str(value.into()), 1)
}

fn arglist(items: Vec<Sexp>) -> Box<Sexp> {
    Box::new(Sexp::new(Node::Arglist(items), 1))
}

fn call(recv: Option<Sexp>, mid: &str, args: Vec<Sexp>) -> Sexp {
    Sexp::new(
        Node::Call {
            recv: recv.map(Box::new),
            mid: mid.into(),
            args: arglist(args),
        },
        1,
    )
}

fn block(stmts: Vec<Sexp>) -> Sexp {
    Sexp::new(Node::Block(stmts), 1)
}

fn scope(stmt: Sexp) -> Box<Sexp> {
    Box::new(Sexp::new(Node::Scope(Some(Box::new(stmt))), 1))
}

fn args(names: &[&str]) -> Box<Sexp> {
    Box::new(Sexp::new(
        Node::Args {
            names: names.iter().map(|n| (*n).into()).collect(),
            defaults: None,
        },
        1,
    ))
}

fn defn(mid: &str, params: &[&str], body: Sexp) -> Sexp {
    Sexp::new(
        Node::Defn {
            mid: mid.into(),
            args: args(params),
            body: scope(body),
        },
        1,
    )
}

fn lasgn(name: &str, rhs: Sexp) -> Sexp {
    Sexp::new(Node::Lasgn(name.into(), Some(Box::new(rhs))), 1)
}

fn iter(call_sexp: Sexp, params: Vec<Sexp>, body: Sexp) -> Sexp {
    Sexp::new(
        Node::Iter {
            call: Box::new(call_sexp),
            params,
            body: Some(Box::new(body)),
        },
        1,
    )
}

// --- Module wrapper ---

#[test]
fn empty_program_compiles_to_nil() {
    let output = generate(None, &plain_options()).unwrap();
    assert!(output.starts_with("(function(__opal) {"));
    assert!(output.ends_with("})(Opal);\n"));
    assert!(output.contains("return nil"));
}

#[test]
fn prologue_declares_fixed_bindings() {
    let output = generate_plain(lit(42));
    assert!(output.contains(
        "var self = __opal.top, __scope = __opal, $mm = __opal.mm, nil = __opal.nil, \
         __breaker = __opal.breaker, __slice = __opal.slice;"
    ));
}

#[test]
fn source_map_mode_prepends_comments_and_markers() {
    let options = CompilerOptions::default().with_file("app.rb");
    let output = generate(Some(&lit(1)), &options).unwrap();
    assert!(output.starts_with("//@ sourceMappingURL=/__opal_source_maps__/app.rb.js.map\n"));
    assert!(output.contains("/*-file:app.rb-*/"));
    assert!(output.contains("/*:1*/"));
}

#[test]
fn output_is_deterministic() {
    let program = block(vec![
        lasgn("a", lit(1)),
        call(None, "puts", vec![Sexp::new(Node::Lvar("a".into()), 1)]),
    ]);
    let first = generate_plain(program.clone());
    let second = generate_plain(program);
    assert_eq!(first, second);
}

// --- Concrete scenarios ---

#[test]
fn method_returning_literal() {
    // def r; return 1; end
    let program = defn("r", &[], Sexp::new(Node::Return(Some(Box::new(lit(1)))), 1));
    let output = generate_plain(program);
    assert!(output.contains("def.$r = function() {"), "got: {output}");
    assert!(output.contains("return 1"), "got: {output}");
    assert!(
        output.contains("def = __opal.Object.prototype"),
        "toplevel def alias must be declared: {output}"
    );
}

#[test]
fn bare_return_returns_nil() {
    // def r; return; end
    let program = defn("r", &[], Sexp::new(Node::Return(None), 1));
    let output = generate_plain(program);
    assert!(output.contains("return nil"), "got: {output}");
}

#[test]
fn return_of_splatted_literal_array() {
    // def r; return *[1, 2]; end
    let program = defn(
        "r",
        &[],
        Sexp::new(
            Node::Return(Some(Box::new(Sexp::new(
                Node::Svalue(Box::new(Sexp::new(
                    Node::Splat(Some(Box::new(Sexp::new(
                        Node::Array(vec![lit(1), lit(2)]),
                        1,
                    )))),
                    1,
                ))),
                1,
            )))),
            1,
        ),
    );
    let output = generate_plain(program);
    assert!(output.contains("return [1, 2]"), "got: {output}");
}

#[test]
fn lexical_return_in_block_uses_breaker() {
    // lambda { return 123; 456 }.call
    let lambda = iter(
        call(None, "lambda", vec![]),
        vec![],
        block(vec![
            Sexp::new(Node::Return(Some(Box::new(lit(123)))), 1),
            lit(456),
        ]),
    );
    let program = call(Some(lambda), "call", vec![]);
    let output = generate_plain(program);
    assert!(
        output.contains("return (__breaker.$v = 123, __breaker);"),
        "got: {output}"
    );
    assert!(output.contains("return 456"), "got: {output}");
}

#[test]
fn ensure_runs_before_method_unwinds() {
    // def r; begin; return "begin"; ensure; ScratchPad << "ensure"; end; end
    let push = call(
        Some(Sexp::new(Node::Const("ScratchPad".into()), 1)),
        "<<",
        vec![str_node("ensure")],
    );
    let program = defn(
        "r",
        &[],
        Sexp::new(
            Node::Ensure {
                body: Some(Box::new(Sexp::new(
                    Node::Return(Some(Box::new(str_node("begin")))),
                    1,
                ))),
                ensure_body: Box::new(push),
            },
            1,
        ),
    );
    let output = generate_plain(program);
    assert!(output.contains("try {"), "got: {output}");
    assert!(output.contains("return \"begin\""), "got: {output}");
    assert!(output.contains("} finally {"), "got: {output}");
    assert!(output.contains("['$<<']"), "got: {output}");
}

#[test]
fn nested_block_return_propagates_breaker() {
    // def f; 1.times { 1.times { return true }; false }; false; end
    let inner = iter(
        call(Some(lit(1)), "times", vec![]),
        vec![],
        Sexp::new(Node::Return(Some(Box::new(Sexp::new(Node::True, 1)))), 1),
    );
    let outer = iter(
        call(Some(lit(1)), "times", vec![]),
        vec![],
        block(vec![inner, Sexp::new(Node::False, 1)]),
    );
    let program = defn(
        "f",
        &[],
        block(vec![outer, Sexp::new(Node::False, 1)]),
    );
    let output = generate_plain(program);
    assert!(
        output.contains("return (__breaker.$v = true, __breaker)"),
        "got: {output}"
    );
}

#[test]
fn hash_with_literal_keys_uses_hash2() {
    // { a: 1, b: 2 }
    let program = Sexp::new(
        Node::Hash(vec![sym("a"), lit(1), sym("b"), lit(2)]),
        1,
    );
    let output = generate_plain(program);
    assert!(
        output.contains("__hash2([\"a\", \"b\"], {a: 1, b: 2})"),
        "got: {output}"
    );
    assert!(output.contains("__hash2 = __opal.hash2"), "got: {output}");
}

#[test]
fn hash2_quotes_keys_that_are_not_identifiers() {
    // { "a-b" => 1, "class" => 2 }
    let program = Sexp::new(
        Node::Hash(vec![str_node("a-b"), lit(1), str_node("class"), lit(2)]),
        1,
    );
    let output = generate_plain(program);
    assert!(
        output.contains("__hash2([\"a-b\", \"class\"], {\"a-b\": 1, \"class\": 2})"),
        "got: {output}"
    );
}

#[test]
fn hash_with_mixed_keys_uses_hash() {
    // { 1 => 2, :b => 3 }
    let program = Sexp::new(Node::Hash(vec![lit(1), lit(2), sym("b"), lit(3)]), 1);
    let output = generate_plain(program);
    assert!(output.contains("__hash(1, 2, \"b\", 3)"), "got: {output}");
    assert!(output.contains("__hash = __opal.hash"), "got: {output}");
}

#[test]
fn optimized_equality_operator() {
    // foo == bar (over literals)
    let program = Sexp::new(
        Node::Operator {
            recv: Box::new(lit(1)),
            op: "==".into(),
            args: arglist(vec![lit(2)]),
        },
        1,
    );
    let output = generate_plain(program);
    assert!(
        output.contains("typeof(TMP_1) === 'number' ? TMP_1 == TMP_2 : TMP_1['$=='](TMP_2)"),
        "got: {output}"
    );
}

#[test]
fn operator_falls_back_to_call_when_disabled() {
    let program = Sexp::new(
        Node::Operator {
            recv: Box::new(lit(1)),
            op: "+".into(),
            args: arglist(vec![lit(2)]),
        },
        1,
    );
    let options = plain_options().without_optimized_operators();
    let output = generate(Some(&program), &options).unwrap();
    assert!(output.contains("['$+']"), "got: {output}");
    assert!(!output.contains("typeof("), "got: {output}");
}

#[test]
fn reserved_word_locals_are_suffixed() {
    // let = 1; let + 1
    let program = block(vec![
        lasgn("let", lit(1)),
        Sexp::new(
            Node::Operator {
                recv: Box::new(Sexp::new(Node::Lvar("let".into()), 1)),
                op: "+".into(),
                args: arglist(vec![lit(1)]),
            },
            1,
        ),
    ]);
    let output = generate_plain(program);
    assert!(output.contains("let$ = 1"), "got: {output}");
    assert!(output.contains("let$ = nil"), "declared in vars: {output}");
}

#[test]
fn class_variable_assignment() {
    // @@x = 5
    let program = Sexp::new(Node::Cvdecl("@@x".into(), Box::new(lit(5))), 1);
    let output = generate_plain(program);
    assert!(output.contains("(Opal.cvars[\"@@x\"] = 5)"), "got: {output}");
}

// --- Dispatch shapes ---

#[test]
fn call_with_method_missing() {
    let program = call(None, "puts", vec![lit(1)]);
    let output = generate_plain(program);
    assert!(
        output.contains("((TMP_1 = self).$puts || $mm(\"puts\")).call(TMP_1, 1)"),
        "got: {output}"
    );
}

#[test]
fn call_without_method_missing() {
    let program = call(None, "puts", vec![lit(1)]);
    let options = plain_options().without_method_missing();
    let output = generate(Some(&program), &options).unwrap();
    assert!(
        output.contains("(TMP_1 = self).$puts.call(TMP_1, 1)"),
        "got: {output}"
    );
    assert!(!output.contains("$mm("), "got: {output}");
}

#[test]
fn splatted_arguments_switch_to_apply() {
    // foo(1, *rest)
    let program = block(vec![
        lasgn("rest", Sexp::new(Node::Array(vec![lit(2)]), 1)),
        call(
            None,
            "foo",
            vec![
                lit(1),
                Sexp::new(
                    Node::Splat(Some(Box::new(Sexp::new(Node::Lvar("rest".into()), 1)))),
                    1,
                ),
            ],
        ),
    ]);
    let output = generate_plain(program);
    assert!(output.contains(".apply(TMP_1, [1].concat(rest))"), "got: {output}");
}

#[test]
fn block_attaches_through_p_slot() {
    // [1].each { |x| x }
    let each = call(Some(Sexp::new(Node::Array(vec![lit(1)]), 1)), "each", vec![]);
    let program = iter(
        each,
        vec![Sexp::new(Node::Lasgn("x".into(), None), 1)],
        Sexp::new(Node::Lvar("x".into()), 1),
    );
    let output = generate_plain(program);
    assert!(output.contains("(TMP_1 = function(x) {"), "got: {output}");
    assert!(output.contains("var self = TMP_1._s || this"), "got: {output}");
    assert!(output.contains("if (x == null) x = nil;"), "got: {output}");
    assert!(output.contains("TMP_1._s = self, TMP_1)"), "got: {output}");
    assert!(output.contains("._p = "), "got: {output}");
    assert!(output.contains("return x"), "got: {output}");
}

#[test]
fn yield_checks_breaker_at_statement_level() {
    let program = defn("each", &[], Sexp::new(Node::Yield(vec![lit(1)]), 1));
    let output = generate_plain(program);
    // A lifted yield in tail position returns through the breaker check.
    assert!(output.contains("__yield"), "got: {output}");
    assert!(output.contains("__breaker"), "got: {output}");
    assert!(
        output.contains("__yield = TMP_1._p || nil, TMP_1._p = null;"),
        "got: {output}"
    );
}

#[test]
fn inline_yield_is_lifted_before_its_statement() {
    // def each; [yield]; nil; end
    let program = defn(
        "each",
        &[],
        block(vec![
            Sexp::new(Node::Array(vec![Sexp::new(Node::Yield(vec![]), 1)]), 1),
            Sexp::new(Node::Nil, 1),
        ]),
    );
    let output = generate_plain(program);
    assert!(
        output.contains("if ((__yielded = __yield.call(null)) === __breaker) return __breaker.$v"),
        "got: {output}"
    );
    assert!(output.contains("[__yielded]"), "got: {output}");
}

#[test]
fn block_given_compares_block_slot() {
    let program = defn("check", &[], call(None, "block_given?", vec![]));
    let output = generate_plain(program);
    assert!(output.contains("(__yield !== nil)"), "got: {output}");
}

// --- Definitions ---

#[test]
fn class_boots_through_klass_helper() {
    // class Foo; def bar; end; end
    let program = Sexp::new(
        Node::Class {
            cpath: Box::new(Sexp::new(Node::Const("Foo".into()), 1)),
            superclass: None,
            body: scope(defn("bar", &[], Sexp::new(Node::Nil, 1))),
        },
        1,
    );
    let output = generate_plain(program);
    assert!(output.contains("(function(__base, __super){"), "got: {output}");
    assert!(output.contains("function Foo() {};"), "got: {output}");
    assert!(
        output.contains("Foo = __klass(__base, __super, \"Foo\", Foo);"),
        "got: {output}"
    );
    assert!(output.contains("var def = Foo.prototype, __scope = Foo._scope"), "got: {output}");
    assert!(output.contains("def.$bar = function() {"), "got: {output}");
    assert!(output.contains(";__donate(Foo, [\"$bar\"]);"), "got: {output}");
    assert!(output.contains("})(self, null)"), "got: {output}");
    // The class body ends on nil, not on the method install.
    assert!(output.contains("nil;"), "got: {output}");
}

#[test]
fn module_boots_through_module_helper() {
    let program = Sexp::new(
        Node::Module {
            cpath: Box::new(Sexp::new(Node::Const("Kernel".into()), 1)),
            body: scope(defn("bar", &[], Sexp::new(Node::Nil, 1))),
        },
        1,
    );
    let output = generate_plain(program);
    assert!(
        output.contains("Kernel = __module(__base, \"Kernel\", Kernel);"),
        "got: {output}"
    );
    assert!(output.contains("__module = __opal.module"), "got: {output}");
}

#[test]
fn singleton_class_runs_on_singleton() {
    let program = Sexp::new(
        Node::Sclass {
            recv: Box::new(Sexp::new(Node::SelfRef, 1)),
            body: scope(defn("bar", &[], Sexp::new(Node::Nil, 1))),
        },
        1,
    );
    let output = generate_plain(program);
    assert!(
        output.contains("}).call(__opal.singleton(self))"),
        "got: {output}"
    );
    assert!(output.contains("def.$bar = "), "got: {output}");
}

#[test]
fn singleton_method_in_class_uses_defs() {
    // class Foo; def self.bar; end; end
    let program = Sexp::new(
        Node::Class {
            cpath: Box::new(Sexp::new(Node::Const("Foo".into()), 1)),
            superclass: None,
            body: scope(Sexp::new(
                Node::Defs {
                    recv: Box::new(Sexp::new(Node::SelfRef, 1)),
                    mid: "bar".into(),
                    args: args(&[]),
                    body: scope(Sexp::new(Node::Nil, 1)),
                },
                1,
            )),
        },
        1,
    );
    let output = generate_plain(program);
    assert!(output.contains("__opal.defs(Foo, '$bar', function() {"), "got: {output}");
}

#[test]
fn method_with_defaults_and_splat() {
    // def m(a, b = 2, *rest); end
    let defaults = Sexp::new(
        Node::Block(vec![lasgn("b", lit(2))]),
        1,
    );
    let program = Sexp::new(
        Node::Defn {
            mid: "m".into(),
            args: Box::new(Sexp::new(
                Node::Args {
                    names: vec!["a".into(), "b".into(), "*rest".into()],
                    defaults: Some(Box::new(defaults)),
                },
                1,
            )),
            body: scope(Sexp::new(Node::Nil, 1)),
        },
        1,
    );
    let output = generate_plain(program);
    assert!(output.contains("function(a, b) {"), "got: {output}");
    assert!(output.contains("rest = __slice.call(arguments, 2);"), "got: {output}");
    assert!(output.contains("if (b == null) { b = 2 }"), "got: {output}");
}

#[test]
fn arity_check_emits_runtime_guard() {
    let program = defn("m", &["a", "b"], Sexp::new(Node::Nil, 1));
    let options = plain_options().with_arity_check();
    let output = generate(Some(&program), &options).unwrap();
    assert!(
        output.contains(
            "var $arity = arguments.length; if ($arity !== 2) { __opal.ac($arity, 2, this, \"m\"); }"
        ),
        "got: {output}"
    );
}

#[test]
fn attr_accessor_expands_to_methods() {
    let program = Sexp::new(
        Node::Class {
            cpath: Box::new(Sexp::new(Node::Const("Foo".into()), 1)),
            superclass: None,
            body: scope(call(None, "attr_accessor", vec![sym("name")])),
        },
        1,
    );
    let output = generate_plain(program);
    assert!(output.contains("def.$name = function() {"), "got: {output}");
    assert!(output.contains("def['$name='] = function(val) {"), "got: {output}");
    assert!(output.contains("return self.name"), "got: {output}");
    assert!(output.contains("self.name = val"), "got: {output}");
}

#[test]
fn super_in_class_method_captures_previous_implementation() {
    // class Foo; def bar; super; end; end
    let program = Sexp::new(
        Node::Class {
            cpath: Box::new(Sexp::new(Node::Const("Foo".into()), 1)),
            superclass: None,
            body: scope(defn("bar", &[], Sexp::new(Node::Zsuper, 1))),
        },
        1,
    );
    let output = generate_plain(program);
    assert!(
        output.contains(".apply(self, __slice.call(arguments))"),
        "got: {output}"
    );
    assert!(output.contains(" = def.$bar;"), "captured alias: {output}");
}

#[test]
fn alias_records_method_and_assigns_prototype_slot() {
    let program = Sexp::new(
        Node::Class {
            cpath: Box::new(Sexp::new(Node::Const("Foo".into()), 1)),
            superclass: None,
            body: scope(Sexp::new(
                Node::Alias(Box::new(sym("also")), Box::new(sym("original"))),
                1,
            )),
        },
        1,
    );
    let output = generate_plain(program);
    assert!(output.contains("def.$also = def.$original"), "got: {output}");
    assert!(output.contains(";__donate(Foo, [\"$also\"]);"), "got: {output}");
}

// --- Control flow ---

#[test]
fn if_in_expression_position_wraps_in_closure() {
    // a = if true then 1 else 2 end
    let program = lasgn(
        "a",
        Sexp::new(
            Node::If {
                test: Box::new(Sexp::new(Node::True, 1)),
                then_body: Some(Box::new(lit(1))),
                else_body: Some(Box::new(lit(2))),
            },
            1,
        ),
    );
    let output = generate_plain(program);
    assert!(output.contains("a = (function() { if ("), "got: {output}");
    assert!(output.contains("return 1"), "got: {output}");
    assert!(output.contains("return 2"), "got: {output}");
    assert!(output.contains("; return nil; }).call(self)"), "got: {output}");
}

#[test]
fn while_loop_with_break() {
    let program = Sexp::new(
        Node::While {
            test: Box::new(Sexp::new(Node::True, 1)),
            body: Some(Box::new(Sexp::new(Node::Break(None), 1))),
        },
        1,
    );
    let output = generate_plain(program);
    assert!(output.contains("while ("), "got: {output}");
    assert!(output.contains("break;"), "got: {output}");
}

#[test]
fn until_negates_the_condition() {
    let program = Sexp::new(
        Node::Until {
            test: Box::new(Sexp::new(Node::False, 1)),
            body: Some(Box::new(Sexp::new(Node::Nil, 1))),
        },
        1,
    );
    let output = generate_plain(program);
    assert!(output.contains("while (!("), "got: {output}");
}

#[test]
fn redo_rewrites_the_loop_header() {
    let program = Sexp::new(
        Node::While {
            test: Box::new(Sexp::new(Node::True, 1)),
            body: Some(Box::new(Sexp::new(Node::Redo, 1))),
        },
        1,
    );
    let output = generate_plain(program);
    assert!(
        output.contains("TMP_1 = false; while (TMP_1 || "),
        "got: {output}"
    );
    assert!(output.contains("TMP_1 = true"), "got: {output}");
}

#[test]
fn break_outside_loop_or_block_is_an_error() {
    let program = Sexp::new(Node::Break(None), 3);
    let options = plain_options().with_file("app.rb");
    let err = generate(Some(&program), &options).unwrap_err();
    assert_eq!(
        err.to_string(),
        "void value expression: cannot use break outside of iter/while :app.rb:3"
    );
}

#[test]
fn case_dispatches_through_triple_equals() {
    let program = Sexp::new(
        Node::Case {
            subject: Some(Box::new(lit(1))),
            whens: vec![Sexp::new(
                Node::When {
                    tests: vec![lit(1)],
                    body: Some(Box::new(str_node("one"))),
                },
                1,
            )],
            else_body: Some(Box::new(str_node("other"))),
        },
        1,
    );
    let output = generate_plain(program);
    assert!(output.contains("$case = 1;"), "got: {output}");
    assert!(output.contains("['$===']"), "got: {output}");
    assert!(output.contains("else {"), "got: {output}");
}

#[test]
fn and_or_use_two_valued_truthiness() {
    let program = block(vec![
        Sexp::new(Node::And(Box::new(lit(1)), Box::new(lit(2))), 1),
        Sexp::new(Node::Or(Box::new(lit(3)), Box::new(lit(4))), 1),
    ]);
    let output = generate_plain(program);
    assert!(
        output.contains("(TMP_1 = 1, TMP_1 !== false && TMP_1 !== nil ? 2 : TMP_1)"),
        "got: {output}"
    );
    assert!(
        output.contains("((TMP_1 = 3) !== false && TMP_1 !== nil ? TMP_1 : 4)"),
        "got: {output}"
    );
}

#[test]
fn truthy_peephole_for_locals() {
    // while a; end  (over a declared local)
    let program = block(vec![
        lasgn("a", lit(1)),
        Sexp::new(
            Node::While {
                test: Box::new(Sexp::new(Node::Lvar("a".into()), 1)),
                body: Some(Box::new(Sexp::new(Node::Nil, 1))),
            },
            1,
        ),
    ]);
    let output = generate_plain(program);
    assert!(
        output.contains("while (a !== false && a !== nil)"),
        "got: {output}"
    );
}

// --- Variables ---

#[test]
fn globals_go_through_gvars_table() {
    let program = Sexp::new(
        Node::Gasgn("$speed".into(), Some(Box::new(lit(9)))),
        1,
    );
    let output = generate_plain(program);
    assert!(output.contains("__gvars[\"$speed\"] = 9"), "got: {output}");
    assert!(output.contains("__gvars = __opal.gvars"), "got: {output}");
}

#[test]
fn constants_route_through_const_missing_trap() {
    let program = Sexp::new(Node::Const("Foo".into()), 1);
    let output = generate_plain(program);
    assert!(
        output.contains("((TMP_1 = __scope.Foo) == null ? __opal.cm(\"Foo\") : TMP_1)"),
        "got: {output}"
    );

    let options = plain_options().without_const_missing();
    let program = Sexp::new(Node::Const("Foo".into()), 1);
    let output = generate(Some(&program), &options).unwrap();
    assert!(output.contains("return __scope.Foo"), "got: {output}");
}

#[test]
fn instance_variables_are_nil_guarded_at_scope_head() {
    let program = defn("value", &[], Sexp::new(Node::Ivar("count".into()), 1));
    let output = generate_plain(program);
    assert!(
        output.contains("if (self.count == null) self.count = nil;"),
        "got: {output}"
    );
    assert!(output.contains("return self.count"), "got: {output}");
}

#[test]
fn reserved_ivar_uses_bracket_accessor() {
    let program = Sexp::new(Node::Ivar("new".into()), 1);
    let output = generate_plain(program);
    assert!(output.contains("self['new']"), "got: {output}");
}

#[test]
fn masgn_distributes_array_slots() {
    // a, b = 1, 2
    let program = Sexp::new(
        Node::Masgn {
            targets: vec![
                Sexp::new(Node::Lasgn("a".into(), None), 1),
                Sexp::new(Node::Lasgn("b".into(), None), 1),
            ],
            rhs: Some(Box::new(Sexp::new(Node::Array(vec![lit(1), lit(2)]), 1))),
        },
        1,
    );
    let output = generate_plain(program);
    assert!(output.contains("TMP_1 = [1, 2]"), "got: {output}");
    assert!(output.contains("a = TMP_1[0]"), "got: {output}");
    assert!(output.contains("b = TMP_1[1]"), "got: {output}");
}

#[test]
fn masgn_overflow_targets_guard_against_missing_slots() {
    // a, b, c = 1, 2
    let program = Sexp::new(
        Node::Masgn {
            targets: vec![
                Sexp::new(Node::Lasgn("a".into(), None), 1),
                Sexp::new(Node::Lasgn("b".into(), None), 1),
                Sexp::new(Node::Lasgn("c".into(), None), 1),
            ],
            rhs: Some(Box::new(Sexp::new(Node::Array(vec![lit(1), lit(2)]), 1))),
        },
        1,
    );
    let output = generate_plain(program);
    assert!(
        output.contains("c = (TMP_1[2] == null ? nil : TMP_1[2])"),
        "got: {output}"
    );
}

#[test]
fn masgn_splat_target_slices_the_rest() {
    // a, *rest = things
    let program = Sexp::new(
        Node::Masgn {
            targets: vec![
                Sexp::new(Node::Lasgn("a".into(), None), 1),
                Sexp::new(
                    Node::Splat(Some(Box::new(Sexp::new(
                        Node::Lasgn("rest".into(), None),
                        1,
                    )))),
                    1,
                ),
            ],
            rhs: Some(Box::new(Sexp::new(
                Node::ToAry(Box::new(Sexp::new(Node::Array(vec![lit(1)]), 1))),
                1,
            ))),
        },
        1,
    );
    let output = generate_plain(program);
    assert!(
        output.contains("rest = __slice.call(TMP_1, 1)"),
        "got: {output}"
    );
}

#[test]
fn op_asgn_or_reads_then_writes() {
    // a ||= 1
    let program = block(vec![
        lasgn("a", Sexp::new(Node::Nil, 1)),
        Sexp::new(
            Node::OpAsgnOr(
                Box::new(Sexp::new(Node::Lvar("a".into()), 1)),
                Box::new(lasgn("a", lit(1))),
            ),
            1,
        ),
    ]);
    let output = generate_plain(program);
    assert!(
        output.contains("((TMP_1 = a) !== false && TMP_1 !== nil ? TMP_1 : a = 1)"),
        "got: {output}"
    );
}

#[test]
fn irb_mode_persists_toplevel_locals() {
    let program = block(vec![
        lasgn("a", lit(1)),
        Sexp::new(Node::Lvar("a".into()), 1),
    ]);
    let options = plain_options().with_irb();
    let output = generate(Some(&program), &options).unwrap();
    assert!(output.contains("Opal.irb_vars.a = 1"), "got: {output}");
    assert!(
        output.contains("((TMP_1 = Opal.irb_vars.a) == null ? nil : TMP_1)"),
        "got: {output}"
    );
}

#[test]
fn range_literal_uses_range_helper() {
    let program = Sexp::new(
        Node::Lit(Literal::Range {
            start: 1,
            end: 5,
            exclusive: false,
        }),
        1,
    );
    let output = generate_plain(program);
    assert!(output.contains("__range(1, 5, false)"), "got: {output}");
    assert!(output.contains("__range = __opal.range"), "got: {output}");
}

#[test]
fn empty_regexp_is_replaced() {
    let program = Sexp::new(Node::Lit(Literal::Regexp("".into())), 1);
    let output = generate_plain(program);
    assert!(output.contains("/^/"), "got: {output}");
}

#[test]
fn interpolated_string_concatenates_parts() {
    // "a#{b}c"
    let program = block(vec![
        lasgn("b", lit(1)),
        Sexp::new(
            Node::Dstr(vec![
                str_node("a"),
                Sexp::new(
                    Node::Evstr(Box::new(Sexp::new(Node::Lvar("b".into()), 1))),
                    1,
                ),
                str_node("c"),
            ]),
            1,
        ),
    ]);
    let output = generate_plain(program);
    assert!(output.contains("\"a\" + (b) + \"c\""), "got: {output}");
}

#[test]
fn xstr_splices_raw_javascript() {
    let program = block(vec![
        Sexp::new(Node::Xstr("console.log(1)".into()), 1),
        Sexp::new(Node::Nil, 1),
    ]);
    let output = generate_plain(program);
    assert!(output.contains("console.log(1);"), "got: {output}");
}

#[test]
fn helper_declarations_are_ordered() {
    // Demand gvars, hash2 and range together; breaker and slice lead.
    let program = block(vec![
        Sexp::new(Node::Gvar("$g".into()), 1),
        Sexp::new(Node::Hash(vec![sym("a"), lit(1)]), 1),
        Sexp::new(
            Node::Lit(Literal::Range {
                start: 0,
                end: 1,
                exclusive: true,
            }),
            1,
        ),
    ]);
    let output = generate_plain(program);
    let breaker = output.find("__breaker = __opal.breaker").unwrap();
    let slice = output.find("__slice = __opal.slice").unwrap();
    let gvars = output.find("__gvars = __opal.gvars").unwrap();
    let hash2 = output.find("__hash2 = __opal.hash2").unwrap();
    let range = output.find("__range = __opal.range").unwrap();
    assert!(breaker < slice && slice < gvars && gvars < hash2 && hash2 < range);
}

#[test]
fn embedding_the_file_name_sets_uses_file() {
    let options = plain_options().with_file("app.rb");

    let mut generator = JavaScriptGenerator::new(&options);
    generator
        .generate_program(Some(&str_node("app.rb")))
        .unwrap();
    assert!(generator.uses_file());

    let mut generator = JavaScriptGenerator::new(&options);
    generator
        .generate_program(Some(&str_node("other.rb")))
        .unwrap();
    assert!(!generator.uses_file());
}

#[test]
fn nth_ref_compiles_to_nil() {
    let program = Sexp::new(Node::NthRef("1".into()), 1);
    let output = generate_plain(program);
    assert!(output.contains("return nil"), "got: {output}");
}
