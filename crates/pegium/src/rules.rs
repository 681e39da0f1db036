//! Rule definitions and the forward-reference machinery.
//!
//! A registry slot exists as soon as a rule is named — by definition *or* by
//! `call` — and its definition is filled in exactly once. `RuleCall` holds
//! the slot, not the definition, so a rule body may reference rules that are
//! defined later; dereferencing a slot that never received a definition is a
//! programmer error.

use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::ast::{AstNode, Value};
use crate::context::Context;
use crate::cst::CstNode;
use crate::grammar::{Element, GrammarElement};

/// A named registry entry, shared between the registry and every `call` site.
pub(crate) struct RuleSlot {
    name: String,
    def: OnceLock<RuleDef>,
}

impl RuleSlot {
    pub(crate) fn new(name: &str) -> Self {
        RuleSlot {
            name: name.to_string(),
            def: OnceLock::new(),
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn def(&self) -> &RuleDef {
        self.def
            .get()
            .unwrap_or_else(|| panic!("call of undefined rule `{}`", self.name))
    }

    pub(crate) fn try_def(&self) -> Option<&RuleDef> {
        self.def.get()
    }

    pub(crate) fn define(&self, def: RuleDef) {
        if self.def.set(def).is_err() {
            panic!("rule `{}` is already defined", self.name);
        }
    }
}

impl fmt::Debug for RuleSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RuleSlot({})", self.name)
    }
}

/// Converts a matched CST subtree into the rule's value.
pub(crate) type Converter = Arc<dyn for<'i> Fn(&CstNode<'i>) -> Value + Send + Sync>;

pub(crate) struct RuleDef {
    pub element: Element,
    pub kind: RuleKind,
}

pub(crate) enum RuleKind {
    /// Builds an AST record by executing the actions of its subtree.
    Parser { record: fn() -> Box<dyn AstNode> },
    /// Matched with hidden-token interleaving; value from a converter over
    /// the subtree.
    DataType { convert: Converter },
    /// Matched skip-free; produces a single leaf.
    Terminal {
        kind: OnceLock<TerminalKind>,
        convert: Converter,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum TerminalKind {
    /// A terminal mapped to a regular leaf.
    #[default]
    Normal,
    /// Interleaved between tokens and kept in the tree, flagged hidden.
    Hidden,
    /// Interleaved between tokens and discarded entirely.
    Ignored,
}

impl RuleDef {
    /// The terminal kind, or `None` for parser and data-type rules. An unset
    /// kind reads as `Normal`.
    pub(crate) fn terminal_kind(&self) -> Option<TerminalKind> {
        match &self.kind {
            RuleKind::Terminal { kind, .. } => Some(kind.get().copied().unwrap_or_default()),
            _ => None,
        }
    }
}

impl fmt::Debug for RuleDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.kind {
            RuleKind::Parser { .. } => "parser",
            RuleKind::DataType { .. } => "data-type",
            RuleKind::Terminal { .. } => "terminal",
        };
        write!(f, "RuleDef({kind}, {:?})", self.element)
    }
}

/// An indirect reference to a registry slot, usable as a grammar element.
pub(crate) struct RuleCall {
    pub slot: Arc<RuleSlot>,
}

impl GrammarElement for RuleCall {
    fn parse_terminal(&self, input: &str) -> Option<usize> {
        self.slot.def().element.parse_terminal(input)
    }

    fn parse_rule<'i>(
        &self,
        input: &'i str,
        parent: &mut CstNode<'i>,
        ctx: &Context,
    ) -> Option<usize> {
        parse_rule_ref(&self.slot, input, parent, ctx)
    }
}

impl fmt::Debug for RuleCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "call({})", self.slot.name())
    }
}

/// Rule-mode entry for a rule reference.
///
/// Terminal rules match their body skip-free, append one leaf and then let
/// hidden tokens onto their right edge. Parser and data-type rules grow a
/// fresh subtree node; the node is only attached to `parent` on success, so
/// failure leaves the parent untouched.
pub(crate) fn parse_rule_ref<'i>(
    slot: &Arc<RuleSlot>,
    input: &'i str,
    parent: &mut CstNode<'i>,
    ctx: &Context,
) -> Option<usize> {
    let def = slot.def();
    match def.terminal_kind() {
        Some(kind) => {
            let len = def.element.parse_terminal(input)?;
            assert!(
                kind != TerminalKind::Ignored,
                "ignored terminal `{}` referenced directly from a rule",
                slot.name()
            );
            parent.children.push(CstNode::leaf(
                &input[..len],
                Some(Arc::clone(slot)),
                kind == TerminalKind::Hidden,
            ));
            Some(len + ctx.skip_hidden(&input[len..], parent))
        }
        None => {
            let mut node = CstNode::default();
            let len = def.element.parse_rule(input, &mut node, ctx)?;
            node.text = &input[..len];
            node.rule = Some(Arc::clone(slot));
            parent.children.push(node);
            Some(len)
        }
    }
}
