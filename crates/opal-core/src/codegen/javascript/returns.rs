// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Return-lifting and inline-yield rewrites.
//!
//! JavaScript functions produce values with `return`, while in the source
//! language the last expression of a body is the value. [`returned`]
//! rewrites a subtree so that emitting it produces a `return` of the
//! original value, pushing the rewrite down through statement wrappers
//! (blocks, scopes, conditionals, rescue bodies) until it reaches an
//! expression to wrap in a synthetic `js_return`.
//!
//! Both rewrites are pure: they consume the subtree and build rewritten
//! values, never mutating shared state. [`returned`] is idempotent —
//! lifting an already lifted tree is the identity.

use crate::ast::{Node, Sexp};

/// Rewrites `sexp` so its emission returns the value to the caller.
#[must_use]
pub fn returned(sexp: Sexp) -> Sexp {
    let Sexp {
        node,
        line,
        end_line,
    } = sexp;
    let rebuilt = |node: Node| Sexp {
        node,
        line,
        end_line,
    };

    match node {
        // Already control flow; nothing to lift.
        Node::Break(_)
        | Node::Next(_)
        | Node::Return(_)
        | Node::JsReturn(_)
        | Node::ReturnableYield(_)
        | Node::While { .. }
        | Node::Until { .. } => rebuilt(node),

        Node::Yield(args) => rebuilt(Node::ReturnableYield(args)),

        Node::Scope(body) => {
            let body = returned_or_nil(body.map(|b| *b), line);
            rebuilt(Node::Scope(Some(Box::new(body))))
        }

        Node::Rescue { body, handlers } => {
            let body = returned_or_nil(body.map(|b| *b), line);
            rebuilt(Node::Rescue {
                body: Some(Box::new(body)),
                handlers,
            })
        }

        Node::Ensure { body, ensure_body } => {
            let body = returned_or_nil(body.map(|b| *b), line);
            rebuilt(Node::Ensure {
                body: Some(Box::new(body)),
                ensure_body,
            })
        }

        Node::Block(mut stmts) => {
            match stmts.pop() {
                Some(last) => stmts.push(returned(last)),
                None => stmts.push(returned(Sexp::new(Node::Nil, line))),
            }
            rebuilt(Node::Block(stmts))
        }

        Node::When { tests, body } => {
            let body = returned_or_nil(body.map(|b| *b), line);
            rebuilt(Node::When {
                tests,
                body: Some(Box::new(body)),
            })
        }

        Node::If {
            test,
            then_body,
            else_body,
        } => {
            let then_body = returned_or_nil(then_body.map(|b| *b), line);
            let else_body = returned_or_nil(else_body.map(|b| *b), line);
            rebuilt(Node::If {
                test,
                then_body: Some(Box::new(then_body)),
                else_body: Some(Box::new(else_body)),
            })
        }

        Node::Xstr(code) => {
            if code.contains("return") || code.contains(';') {
                rebuilt(Node::Xstr(code))
            } else {
                rebuilt(Node::Xstr(ecow::eco_format!("return {code}")))
            }
        }

        Node::Dxstr(parts) => {
            let raw_already_returns = parts.iter().any(|p| match &p.node {
                Node::Str(s) => s.contains("return") || s.contains(';') || s.contains('\n'),
                _ => false,
            });
            if raw_already_returns {
                rebuilt(Node::Dxstr(parts))
            } else {
                let mut lifted = Vec::with_capacity(parts.len() + 1);
                lifted.push(Sexp::new(Node::Str("return ".into()), line));
                lifted.extend(parts);
                rebuilt(Node::Dxstr(lifted))
            }
        }

        other => {
            let inner = rebuilt(other);
            Sexp {
                line: inner.line,
                end_line: inner.end_line,
                node: Node::JsReturn(Some(Box::new(inner))),
            }
        }
    }
}

/// Like [`returned`], with a `return nil` fallback for an absent subtree.
#[must_use]
pub fn returned_or_nil(sexp: Option<Sexp>, line: u32) -> Sexp {
    match sexp {
        Some(sexp) => returned(sexp),
        None => returned(Sexp::new(Node::Nil, line)),
    }
}

/// The synthetic local a lifted inline yield is assigned to.
pub const YIELDED_TMP: &str = "__yielded";

/// Looks for a `yield` embedded in expression position inside `stmt` — in
/// an array literal, a call argument list, or directly under a lifted
/// `js_return` — and splits it out.
///
/// Returns the extracted `yield` node together with a copy of the
/// statement where the yield has been replaced by the synthetic
/// [`YIELDED_TMP`] identifier. The caller emits a `yasgn` for the yield
/// ahead of the rewritten statement. At most one yield is lifted per
/// statement.
#[must_use]
pub fn extract_inline_yield(stmt: &Sexp) -> Option<(Sexp, Sexp)> {
    match &stmt.node {
        Node::JsReturn(Some(inner)) => {
            let (found, rewritten) = extract_inline_yield(inner)?;
            Some((
                found,
                Sexp {
                    node: Node::JsReturn(Some(Box::new(rewritten))),
                    line: stmt.line,
                    end_line: stmt.end_line,
                },
            ))
        }
        Node::Array(elements) => {
            let (found, elements) = replace_first_yield(elements)?;
            Some((
                found,
                Sexp {
                    node: Node::Array(elements),
                    line: stmt.line,
                    end_line: stmt.end_line,
                },
            ))
        }
        Node::Call { recv, mid, args } => {
            let Node::Arglist(elements) = &args.node else {
                return None;
            };
            let (found, elements) = replace_first_yield(elements)?;
            Some((
                found,
                Sexp {
                    node: Node::Call {
                        recv: recv.clone(),
                        mid: mid.clone(),
                        args: Box::new(Sexp {
                            node: Node::Arglist(elements),
                            line: args.line,
                            end_line: args.end_line,
                        }),
                    },
                    line: stmt.line,
                    end_line: stmt.end_line,
                },
            ))
        }
        _ => None,
    }
}

fn replace_first_yield(elements: &[Sexp]) -> Option<(Sexp, Vec<Sexp>)> {
    let index = elements
        .iter()
        .position(|el| matches!(el.node, Node::Yield(_)))?;
    let mut rewritten = elements.to_vec();
    let found = std::mem::replace(
        &mut rewritten[index],
        Sexp::new(Node::JsTmp(YIELDED_TMP.into()), elements[index].line),
    );
    Some((found, rewritten))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Literal;

    fn lit(n: i64, line: u32) -> Sexp {
        Sexp::new(Node::Lit(Literal::Int(n)), line)
    }

    #[test]
    fn expression_wraps_in_js_return() {
        let lifted = returned(lit(1, 4));
        match lifted.node {
            Node::JsReturn(Some(inner)) => assert_eq!(inner.node, Node::Lit(Literal::Int(1))),
            other => panic!("expected js_return, got {other:?}"),
        }
        assert_eq!(lifted.line, 4);
    }

    #[test]
    fn lifting_is_idempotent() {
        let once = returned(lit(1, 1));
        let twice = returned(once.clone());
        assert_eq!(once, twice);

        let block = Sexp::new(Node::Block(vec![lit(1, 1), lit(2, 2)]), 1);
        let once = returned(block);
        let twice = returned(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn break_and_loops_pass_through() {
        let brk = Sexp::new(Node::Break(None), 1);
        assert_eq!(returned(brk.clone()), brk);

        let lp = Sexp::new(
            Node::While {
                test: Box::new(Sexp::new(Node::True, 1)),
                body: None,
            },
            1,
        );
        assert_eq!(returned(lp.clone()), lp);
    }

    #[test]
    fn yield_becomes_returnable() {
        let lifted = returned(Sexp::new(Node::Yield(vec![lit(1, 1)]), 1));
        assert!(matches!(lifted.node, Node::ReturnableYield(_)));
    }

    #[test]
    fn block_lifts_last_statement_only() {
        let block = Sexp::new(Node::Block(vec![lit(1, 1), lit(2, 2)]), 1);
        let Node::Block(stmts) = returned(block).node else {
            panic!("expected block")
        };
        assert!(matches!(stmts[0].node, Node::Lit(_)));
        assert!(matches!(stmts[1].node, Node::JsReturn(_)));
    }

    #[test]
    fn empty_block_returns_nil() {
        let block = Sexp::new(Node::Block(Vec::new()), 5);
        let Node::Block(stmts) = returned(block).node else {
            panic!("expected block")
        };
        assert_eq!(stmts.len(), 1);
        let Node::JsReturn(Some(inner)) = &stmts[0].node else {
            panic!("expected js_return")
        };
        assert_eq!(inner.node, Node::Nil);
    }

    #[test]
    fn if_lifts_both_branches_with_nil_fallback() {
        let cond = Sexp::new(
            Node::If {
                test: Box::new(Sexp::new(Node::True, 1)),
                then_body: Some(Box::new(lit(1, 1))),
                else_body: None,
            },
            1,
        );
        let Node::If {
            then_body,
            else_body,
            ..
        } = returned(cond).node
        else {
            panic!("expected if")
        };
        assert!(matches!(then_body.unwrap().node, Node::JsReturn(_)));
        let Node::JsReturn(Some(inner)) = else_body.unwrap().node else {
            panic!("expected js_return else branch")
        };
        assert_eq!(inner.node, Node::Nil);
    }

    #[test]
    fn xstr_prepends_return_once() {
        let lifted = returned(Sexp::new(Node::Xstr("1 + 1".into()), 1));
        assert_eq!(lifted.node, Node::Xstr("return 1 + 1".into()));

        let already = returned(Sexp::new(Node::Xstr("return 1;".into()), 1));
        assert_eq!(already.node, Node::Xstr("return 1;".into()));
    }

    #[test]
    fn inline_yield_extracted_from_array() {
        let stmt = Sexp::new(
            Node::Array(vec![lit(1, 1), Sexp::new(Node::Yield(Vec::new()), 1)]),
            1,
        );
        let (found, rewritten) = extract_inline_yield(&stmt).expect("yield found");
        assert!(matches!(found.node, Node::Yield(_)));
        let Node::Array(elements) = rewritten.node else {
            panic!("expected array")
        };
        assert_eq!(elements[1].node, Node::JsTmp(YIELDED_TMP.into()));
    }

    #[test]
    fn inline_yield_extracted_through_js_return() {
        let stmt = Sexp::new(
            Node::JsReturn(Some(Box::new(Sexp::new(
                Node::Array(vec![Sexp::new(Node::Yield(Vec::new()), 2)]),
                2,
            )))),
            2,
        );
        let (found, rewritten) = extract_inline_yield(&stmt).expect("yield found");
        assert!(matches!(found.node, Node::Yield(_)));
        assert!(matches!(rewritten.node, Node::JsReturn(Some(_))));
    }

    #[test]
    fn no_yield_no_rewrite() {
        let stmt = Sexp::new(Node::Array(vec![lit(1, 1)]), 1);
        assert!(extract_inline_yield(&stmt).is_none());
    }
}
