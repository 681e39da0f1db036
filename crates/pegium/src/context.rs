//! Hidden-token interleaving.

use std::sync::Arc;

use crate::cst::CstNode;
use crate::grammar::GrammarElement;
use crate::rules::{RuleSlot, TerminalKind};

/// Per-parse context: the Hidden and Ignored terminal rules eligible for
/// interleaving, captured once at parse start from the registry in
/// registry (insertion) order.
pub struct Context {
    hiddens: Vec<Arc<RuleSlot>>,
}

impl Context {
    pub(crate) fn new(hiddens: Vec<Arc<RuleSlot>>) -> Self {
        Context { hiddens }
    }

    /// Consumes hidden/ignored terminals at the start of `input`.
    ///
    /// Every Hidden or Ignored terminal is tried, in registry order, until a
    /// whole pass matches nothing. Hidden matches are appended to `parent`
    /// as `hidden` leaves; Ignored matches leave no trace. Each match must
    /// consume at least one byte — a hidden terminal that can match empty
    /// input is a grammar bug. Returns the total number of bytes skipped.
    pub fn skip_hidden<'i>(&self, input: &'i str, parent: &mut CstNode<'i>) -> usize {
        let mut offset = 0;
        loop {
            let mut matched = false;
            for slot in &self.hiddens {
                let def = slot.def();
                let Some(len) = def.element.parse_terminal(&input[offset..]) else {
                    continue;
                };
                assert!(
                    len > 0,
                    "hidden terminal `{}` matched zero bytes",
                    slot.name()
                );
                if def.terminal_kind() != Some(TerminalKind::Ignored) {
                    parent.children.push(CstNode::leaf(
                        &input[offset..offset + len],
                        Some(Arc::clone(slot)),
                        true,
                    ));
                }
                offset += len;
                matched = true;
            }
            if !matched {
                break;
            }
        }
        offset
    }
}
