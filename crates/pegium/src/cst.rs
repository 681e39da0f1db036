//! Concrete syntax tree.
//!
//! Nodes are zero-copy: `text` is a slice into the parsed input, taken only
//! once the producing element knows how many bytes it consumed. Child vectors
//! are append-only during a match; failure recovery is a plain `truncate`
//! back to the length recorded on entry, so rollback is O(removed nodes) and
//! never reallocates.

use std::fmt;
use std::sync::Arc;

use crate::grammar::Action;
use crate::rules::RuleSlot;

/// A node in the concrete syntax tree.
///
/// Every matched byte of the input has a home in exactly one leaf. Non-leaf
/// nodes span the concatenation of their children plus any hidden tokens
/// interleaved between them.
#[derive(Debug, Default)]
pub struct CstNode<'i> {
    /// The matched text, sliced from the input.
    pub text: &'i str,
    /// Children in match order.
    pub children: Vec<CstNode<'i>>,
    /// The rule that produced this node, if any. Plain tokens (literals,
    /// character classes, `dot`) carry no rule; their value is their text.
    pub(crate) rule: Option<Arc<RuleSlot>>,
    /// Assignment stamped onto this node by the surrounding grammar.
    pub(crate) action: Option<Arc<dyn Action>>,
    /// A leaf corresponds to one token of the input.
    pub is_leaf: bool,
    /// Hidden tokens (e.g. comments) are kept in the tree but excluded from
    /// rule values.
    pub hidden: bool,
}

impl<'i> CstNode<'i> {
    /// Root node over the full input. The root keeps the entire input as its
    /// text even when the parse consumes only a prefix.
    pub(crate) fn root(input: &'i str) -> Self {
        CstNode {
            text: input,
            ..CstNode::default()
        }
    }

    pub(crate) fn leaf(text: &'i str, rule: Option<Arc<RuleSlot>>, hidden: bool) -> Self {
        CstNode {
            text,
            rule,
            is_leaf: true,
            hidden,
            ..CstNode::default()
        }
    }

    /// Name of the rule that produced this node, if any.
    pub fn rule_name(&self) -> Option<&str> {
        self.rule.as_deref().map(RuleSlot::name)
    }

    /// Depth-first traversal of this node and all of its descendants, in
    /// match order.
    pub fn iter(&self) -> Iter<'_, 'i> {
        Iter { stack: vec![self] }
    }

    /// Concatenation of the visible (non-hidden) leaf text under this node.
    /// This is the default value of data-type and terminal rules.
    pub fn visible_text(&self) -> String {
        self.iter()
            .filter(|n| n.is_leaf && !n.hidden)
            .map(|n| n.text)
            .collect()
    }

    /// Renders the tree in an indented one-node-per-line format. Diagnostic
    /// only; the exact shape is not a stable interface.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.dump_into(&mut out, 0);
        out
    }

    fn dump_into(&self, out: &mut String, depth: usize) {
        if depth > 0 {
            out.push('\n');
        }
        for _ in 0..depth {
            out.push_str("  ");
        }
        match (self.rule_name(), self.is_leaf) {
            (Some(name), true) => {
                out.push_str(name);
                out.push(' ');
                out.push_str(&format!("{:?}", self.text));
            }
            (Some(name), false) => out.push_str(name),
            (None, _) => out.push_str(&format!("{:?}", self.text)),
        }
        if self.hidden {
            out.push_str(" (hidden)");
        }
        for child in &self.children {
            child.dump_into(out, depth + 1);
        }
    }
}

impl fmt::Display for CstNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dump())
    }
}

/// Pre-order DFS over a subtree, including the subtree root itself.
pub struct Iter<'a, 'i> {
    stack: Vec<&'a CstNode<'i>>,
}

impl<'a, 'i> Iterator for Iter<'a, 'i> {
    type Item = &'a CstNode<'i>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}
