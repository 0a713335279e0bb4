// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Method-call dispatch.
//!
//! Every send binds its receiver into a temp, resolves the `$`-prefixed
//! method property, and invokes it with the receiver as first argument:
//!
//! ```javascript
//! ((TMP_1 = recv).$meth || $mm("meth")).call(TMP_1, arg)
//! ```
//!
//! A block (from an `iter` literal or a `&proc` argument) is parked on the
//! function's `_p` slot just before the invocation; a splatted argument
//! list switches to `.apply` over a `concat` chain.
//!
//! The method-missing and plain dispatch paths are kept as two separate
//! emission shapes on purpose — the plain path drops the `|| $mm(...)`
//! fallback but keeps the receiver-binding parenthesization of its own —
//! matching the long-standing output the runtime and its tests expect.

use ecow::{eco_format, EcoString};

use crate::ast::{Literal, Node, Sexp};
use crate::codegen::Result;

use super::fragment::Fragment;
use super::mangle::{inspect_string, mid_to_jsid};
use super::scope::ScopeKind;
use super::{JavaScriptGenerator, Level};

impl JavaScriptGenerator<'_> {
    /// Emits a method call. `block` carries the compiled block literal
    /// when the call came wrapped in an `iter` node.
    pub(super) fn process_call(
        &mut self,
        sexp: &Sexp,
        recv: Option<&Sexp>,
        mid: &str,
        args: &Sexp,
        block: Option<Vec<Fragment>>,
        level: Level,
    ) -> Result<Vec<Fragment>> {
        self.process_call_inner(sexp, recv, mid, args, block, level, true)
    }

    #[expect(clippy::too_many_arguments, reason = "dispatch carries the full call shape")]
    fn process_call_inner(
        &mut self,
        sexp: &Sexp,
        recv: Option<&Sexp>,
        mid: &str,
        args: &Sexp,
        block: Option<Vec<Fragment>>,
        level: Level,
        irb_eligible: bool,
    ) -> Result<Vec<Fragment>> {
        let Node::Arglist(arg_items) = &args.node else {
            return Err(self.structural_error("call without an argument list"));
        };

        // block_given? compares the block slot against nil directly.
        if recv.is_none() && mid == "block_given?" && block.is_none() {
            return self.compile_block_given(sexp, false);
        }

        // attr_* with literal names in a class body expands to plain
        // reader/writer definitions.
        if matches!(mid, "attr_reader" | "attr_writer" | "attr_accessor")
            && recv.is_none()
            && self.scope().kind.is_class_like()
            && !arg_items.is_empty()
            && arg_items.iter().all(|a| {
                matches!(&a.node, Node::Lit(Literal::Sym(_)) | Node::Str(_))
            })
        {
            return self.expand_attr_definitions(sexp, mid, arg_items);
        }

        // In irb mode a bare name may be a variable persisted by an
        // earlier line; fall back to the ordinary send otherwise.
        if irb_eligible
            && self.options.irb
            && self.scope().kind == ScopeKind::Top
            && recv.is_none()
            && block.is_none()
            && arg_items.is_empty()
            && mid.chars().all(|c| c.is_alphanumeric() || c == '_')
        {
            let call =
                self.process_call_inner(sexp, recv, mid, args, None, Level::Expr, false)?;
            return self.with_temp(|gen, tmp| {
                let mut result = vec![gen.frag(
                    eco_format!("(({tmp} = Opal.irb_vars.{mid}) == null ? "),
                    sexp,
                )];
                result.extend(call);
                result.push(gen.frag(eco_format!(" : {tmp})"), sexp));
                Ok(result)
            });
        }

        let mut arg_items: Vec<Sexp> = arg_items.clone();
        let mut block = block;
        if let Some(last) = arg_items.last() {
            if matches!(last.node, Node::BlockPass(_)) {
                let Some(Sexp {
                    node: Node::BlockPass(pass),
                    ..
                }) = arg_items.pop()
                else {
                    unreachable!("matched block_pass above")
                };
                block = Some(self.process_block_pass(sexp, &pass)?);
            }
        }

        let recv_sexp = recv
            .cloned()
            .unwrap_or_else(|| Sexp::new(Node::SelfRef, sexp.line));
        let recv_frags = self.process(&recv_sexp, Level::Recv)?;

        let jsid = mid_to_jsid(mid);
        let tmprecv = self.new_temp();
        let tmpfunc = block.is_some().then(|| self.new_temp());

        let mut dispatch = if self.options.method_missing {
            let quoted = inspect_string(mid);
            let mut dispatch = vec![self.frag(eco_format!("(({tmprecv} = "), sexp)];
            dispatch.extend(recv_frags);
            dispatch.push(self.frag(eco_format!("){jsid} || $mm({quoted}))"), sexp));
            dispatch
        } else {
            let mut dispatch = vec![self.frag(eco_format!("({tmprecv} = "), sexp)];
            dispatch.extend(recv_frags);
            dispatch.push(self.frag(eco_format!("){jsid}"), sexp));
            dispatch
        };

        if let (Some(tmpfunc), Some(block_frags)) = (&tmpfunc, block) {
            let mut attached = vec![self.frag(eco_format!("({tmpfunc} = "), sexp)];
            attached.extend(dispatch);
            attached.push(self.frag(eco_format!(", {tmpfunc}._p = "), sexp));
            attached.extend(block_frags);
            attached.push(self.frag(eco_format!(", {tmpfunc})"), sexp));
            dispatch = attached;
        }

        let (arg_frags, saw_splat) = self.compile_arglist(&arg_items)?;

        let mut result = dispatch;
        if saw_splat {
            result.push(self.frag(eco_format!(".apply({tmprecv}, "), sexp));
            result.extend(arg_frags);
            result.push(self.frag(")", sexp));
        } else {
            result.push(self.frag(eco_format!(".call({tmprecv}"), sexp));
            if !arg_frags.is_empty() {
                result.push(self.frag(", ", sexp));
                result.extend(arg_frags);
            }
            result.push(self.frag(")", sexp));
        }

        if let Some(tmpfunc) = &tmpfunc {
            self.queue_temp(tmpfunc);
        }
        self.queue_temp(&tmprecv);
        Ok(result)
    }

    /// `block_given?` (and its negation for falsy tests).
    pub(super) fn compile_block_given(
        &mut self,
        sexp: &Sexp,
        reverse: bool,
    ) -> Result<Vec<Fragment>> {
        self.mark_uses_block();
        match self.current_block_name() {
            Some(name) => {
                let code = if reverse {
                    eco_format!("({name} === nil)")
                } else {
                    eco_format!("({name} !== nil)")
                };
                Ok(vec![self.frag(code, sexp)])
            }
            None => Ok(vec![self.frag("false", sexp)]),
        }
    }

    /// `&expr` in argument position: the proc conversion is an ordinary
    /// `to_proc` send.
    pub(super) fn process_block_pass(
        &mut self,
        sexp: &Sexp,
        inner: &Sexp,
    ) -> Result<Vec<Fragment>> {
        let call = Sexp::new(
            Node::Call {
                recv: Some(Box::new(inner.clone())),
                mid: "to_proc".into(),
                args: Box::new(Sexp::new(Node::Arglist(Vec::new()), sexp.line)),
            },
            sexp.line,
        );
        self.process(&call, Level::Expr)
    }

    /// A binary operator the grammar marked optimizable: both operands
    /// are bound once, then either the native operator (numbers) or the
    /// method property is used.
    pub(super) fn process_operator(
        &mut self,
        sexp: &Sexp,
        recv: &Sexp,
        op: &str,
        args: &Sexp,
        level: Level,
    ) -> Result<Vec<Fragment>> {
        if !self.options.optimized_operators {
            return self.process_call(sexp, Some(recv), op, args, None, level);
        }
        let Node::Arglist(items) = &args.node else {
            return Err(self.structural_error("operator without an argument list"));
        };
        let [rhs] = items.as_slice() else {
            return Err(self.structural_error("operator expects exactly one operand"));
        };
        let rhs = rhs.clone();
        let jsid = mid_to_jsid(op);
        let op = EcoString::from(op);

        self.with_temp(move |gen, lhs_tmp| {
            let lhs_tmp = lhs_tmp.clone();
            gen.with_temp(move |gen, rhs_tmp| {
                let mut result = vec![gen.frag(eco_format!("({lhs_tmp} = "), sexp)];
                result.extend(gen.process(recv, Level::Expr)?);
                result.push(gen.frag(eco_format!(", {rhs_tmp} = "), sexp));
                result.extend(gen.process(&rhs, Level::Expr)?);
                result.push(gen.frag(
                    eco_format!(
                        ", typeof({lhs_tmp}) === 'number' ? {lhs_tmp} {op} {rhs_tmp} : {lhs_tmp}{jsid}({rhs_tmp}))"
                    ),
                    sexp,
                ));
                Ok(result)
            })
        })
    }

    /// A splatted expression in a list: literals get wrapped into a
    /// one-element array, everything else is assumed to be one already.
    pub(super) fn process_splat(
        &mut self,
        sexp: &Sexp,
        inner: Option<&Sexp>,
    ) -> Result<Vec<Fragment>> {
        let Some(inner) = inner else {
            return Ok(vec![self.frag("[]", sexp)]);
        };
        match &inner.node {
            Node::Nil => Ok(vec![self.frag("[]", sexp)]),
            Node::Lit(_) | Node::Str(_) => {
                let mut result = vec![self.frag("[", sexp)];
                result.extend(self.process(inner, Level::Expr)?);
                result.push(self.frag("]", sexp));
                Ok(result)
            }
            _ => self.process(inner, Level::Recv),
        }
    }

    /// Compiles a comma list that may contain splats.
    ///
    /// Without a splat the result is a bare comma-joined list. With one,
    /// fixed runs become array literals chained through `.concat`, and the
    /// whole result is an array expression — the caller switches to
    /// `.apply`. Returns the fragments and whether a splat was seen.
    pub(super) fn compile_arglist(&mut self, items: &[Sexp]) -> Result<(Vec<Fragment>, bool)> {
        let mut chain: Vec<Fragment> = Vec::new();
        let mut work: Vec<Fragment> = Vec::new();
        let mut saw_splat = false;

        for item in items {
            if let Node::Splat(inner) = &item.node {
                saw_splat = true;
                let splat_frags = self.process_splat(item, inner.as_deref())?;
                if work.is_empty() {
                    if chain.is_empty() {
                        chain.push(self.frag("[].concat(", item));
                        chain.extend(splat_frags);
                        chain.push(self.frag(")", item));
                    } else {
                        chain.push(self.frag(".concat(", item));
                        chain.extend(splat_frags);
                        chain.push(self.frag(")", item));
                    }
                } else {
                    if chain.is_empty() {
                        chain.push(self.frag("[", item));
                        chain.append(&mut work);
                        chain.push(self.frag("]", item));
                    } else {
                        chain.push(self.frag(".concat([", item));
                        chain.append(&mut work);
                        chain.push(self.frag("])", item));
                    }
                    chain.push(self.frag(".concat(", item));
                    chain.extend(splat_frags);
                    chain.push(self.frag(")", item));
                    work.clear();
                }
            } else {
                if !work.is_empty() {
                    work.push(self.frag(", ", item));
                }
                work.extend(self.process(item, Level::Expr)?);
            }
        }

        if !work.is_empty() {
            if chain.is_empty() {
                chain = work;
            } else {
                chain.push(Fragment::anonymous(".concat(["));
                chain.append(&mut work);
                chain.push(Fragment::anonymous("])"));
            }
        }
        Ok((chain, saw_splat))
    }

    // --- super ---

    pub(super) fn process_super(
        &mut self,
        sexp: &Sexp,
        args: Option<&Sexp>,
    ) -> Result<Vec<Fragment>> {
        let items: Vec<Sexp> = match args {
            Some(Sexp {
                node: Node::Arglist(items),
                ..
            }) => items.clone(),
            Some(other) => {
                return Err(self.structural_error(format!(
                    "bad super argument list: {}",
                    other.kind_name()
                )))
            }
            None => Vec::new(),
        };
        let (frags, saw_splat) = self.compile_arglist(&items)?;
        let args_array = if saw_splat {
            frags
        } else {
            let mut wrapped = vec![self.frag("[", sexp)];
            wrapped.extend(frags);
            wrapped.push(self.frag("]", sexp));
            wrapped
        };
        self.compile_super_call(sexp, args_array)
    }

    pub(super) fn process_zsuper(&mut self, sexp: &Sexp) -> Result<Vec<Fragment>> {
        let args = vec![self.frag("__slice.call(arguments)", sexp)];
        self.compile_super_call(sexp, args)
    }

    /// Routes a super invocation to the implementation captured for the
    /// current definition site.
    fn compile_super_call(
        &mut self,
        sexp: &Sexp,
        args: Vec<Fragment>,
    ) -> Result<Vec<Fragment>> {
        let kind = self.scope().kind;
        match kind {
            ScopeKind::Def => {
                let in_class = self
                    .parent_scope()
                    .map(|parent| parent.kind.is_class_like())
                    .unwrap_or_default();
                let is_defs = self.scope().is_defs;

                if in_class && !is_defs {
                    // The previous implementation is captured into an
                    // alias at install time.
                    let alias = match self.scope().super_alias.clone() {
                        Some(alias) => alias,
                        None => {
                            let alias = eco_format!("super_{}", self.next_temp_name());
                            self.scope_mut().super_alias = Some(alias.clone());
                            alias
                        }
                    };
                    let mut result =
                        vec![self.frag(eco_format!("{alias}.apply(self, "), sexp)];
                    result.extend(args);
                    result.push(self.frag(")", sexp));
                    Ok(result)
                } else {
                    let mid = self
                        .scope()
                        .mid
                        .clone()
                        .ok_or_else(|| self.structural_error("super outside of a method"))?;
                    let jsid = mid_to_jsid(&mid);
                    let base = self
                        .parent_scope()
                        .and_then(|parent| parent.name.clone())
                        .unwrap_or_else(|| "self._klass".into());
                    let accessor = if is_defs {
                        eco_format!("{base}._super{jsid}")
                    } else {
                        eco_format!("{base}._super.prototype{jsid}")
                    };
                    let mut result =
                        vec![self.frag(eco_format!("{accessor}.apply(self, "), sexp)];
                    result.extend(args);
                    result.push(self.frag(")", sexp));
                    Ok(result)
                }
            }
            ScopeKind::Iter => {
                let (chain, mid) = self.super_chain()?;
                let mut tries = EcoString::new();
                for identity in &chain {
                    tries.push_str(identity);
                    tries.push_str("._sup || ");
                }
                let quoted = inspect_string(&eco_format!("${mid}"));
                let mut result = vec![self.frag(
                    eco_format!("({tries}self._klass._super.prototype[{quoted}]).apply(self, "),
                    sexp,
                )];
                result.extend(args);
                result.push(self.frag(")", sexp));
                Ok(result)
            }
            _ => Err(self.structural_error("super must be called from a method body")),
        }
    }

    /// Collects the identities of the enclosing block chain up to the
    /// defining method, so a super inside nested blocks can try each
    /// block's captured implementation first.
    fn super_chain(&mut self) -> Result<(Vec<EcoString>, EcoString)> {
        let mut chain = Vec::new();
        let mut index = self.scopes.len();
        while index > 0 {
            index -= 1;
            match self.scopes[index].kind {
                ScopeKind::Iter => {
                    let identity = self.identify_scope_at(index);
                    chain.push(identity);
                }
                ScopeKind::Def => {
                    let mid = self.scopes[index].mid.clone().ok_or_else(|| {
                        self.structural_error("super outside of a method")
                    })?;
                    return Ok((chain, mid));
                }
                _ => break,
            }
        }
        Err(self.structural_error("super must be called from a method body"))
    }

    /// Assigns an identity to the scope at `index`, declaring it in that
    /// scope's parent.
    pub(super) fn identify_scope_at(&mut self, index: usize) -> EcoString {
        if let Some(identity) = &self.scopes[index].identity {
            return identity.clone();
        }
        let identity = self.next_temp_name();
        if index > 0 {
            self.scopes[index - 1].add_temp_decl(identity.clone());
        } else {
            self.scopes[index].add_temp_decl(identity.clone());
        }
        self.scopes[index].identity = Some(identity.clone());
        identity
    }
}
