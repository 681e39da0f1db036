//! Compound elements: sequences, choices, unordered groups, repetitions and
//! predicates.
//!
//! Every compound that can fail midway records `parent.children.len()` on
//! entry and truncates back to it before reporting the failure, so a `None`
//! return never leaves partial children behind.

use super::{Element, GrammarElement, dot, element_ops, into_element};
use crate::context::Context;
use crate::cst::CstNode;

/// Left-to-right sequence. `+` on a group appends, so `a + b + c` stays one
/// flat sequence.
#[derive(Debug, Clone)]
pub struct Group {
    elements: Vec<Element>,
}

impl Group {
    pub(crate) fn pair(lhs: Element, rhs: Element) -> Group {
        Group {
            elements: vec![lhs, rhs],
        }
    }
}

impl GrammarElement for Group {
    fn parse_terminal(&self, input: &str) -> Option<usize> {
        let mut offset = 0;
        for element in &self.elements {
            offset += element.parse_terminal(&input[offset..])?;
        }
        Some(offset)
    }

    fn parse_rule<'i>(
        &self,
        input: &'i str,
        parent: &mut CstNode<'i>,
        ctx: &Context,
    ) -> Option<usize> {
        let mark = parent.children.len();
        let mut offset = 0;
        for element in &self.elements {
            match element.parse_rule(&input[offset..], parent, ctx) {
                Some(len) => offset += len,
                None => {
                    parent.children.truncate(mark);
                    return None;
                }
            }
        }
        Some(offset)
    }
}

impl<R: Into<Element>> std::ops::Add<R> for Group {
    type Output = Group;
    fn add(mut self, rhs: R) -> Group {
        self.elements.push(rhs.into());
        self
    }
}

element_ops!(Group: choice, unordered, until, not);

/// Ordered (prioritized) choice: alternatives are tried left to right from
/// the same position and the first success is committed.
#[derive(Debug, Clone)]
pub struct OrderedChoice {
    elements: Vec<Element>,
}

impl OrderedChoice {
    pub(crate) fn pair(lhs: Element, rhs: Element) -> OrderedChoice {
        OrderedChoice {
            elements: vec![lhs, rhs],
        }
    }
}

impl GrammarElement for OrderedChoice {
    fn parse_terminal(&self, input: &str) -> Option<usize> {
        self.elements
            .iter()
            .find_map(|element| element.parse_terminal(input))
    }

    fn parse_rule<'i>(
        &self,
        input: &'i str,
        parent: &mut CstNode<'i>,
        ctx: &Context,
    ) -> Option<usize> {
        let mark = parent.children.len();
        for element in &self.elements {
            if let Some(len) = element.parse_rule(input, parent, ctx) {
                return Some(len);
            }
            parent.children.truncate(mark);
        }
        None
    }
}

impl<R: Into<Element>> std::ops::BitOr<R> for OrderedChoice {
    type Output = OrderedChoice;
    fn bitor(mut self, rhs: R) -> OrderedChoice {
        self.elements.push(rhs.into());
        self
    }
}

element_ops!(OrderedChoice: seq, unordered, until, not);

/// Matches each child exactly once, in any input order.
///
/// Each scan tries the unprocessed children in declaration order at the
/// current position and commits the first match; a scan with no match ends
/// the search, which succeeds only if every child was processed. The CST
/// records children in matched order, not declaration order.
#[derive(Debug, Clone)]
pub struct UnorderedGroup {
    elements: Vec<Element>,
}

impl UnorderedGroup {
    pub(crate) fn pair(lhs: Element, rhs: Element) -> UnorderedGroup {
        UnorderedGroup {
            elements: vec![lhs, rhs],
        }
    }
}

impl GrammarElement for UnorderedGroup {
    fn parse_terminal(&self, input: &str) -> Option<usize> {
        let mut done = vec![false; self.elements.len()];
        let mut offset = 0;
        loop {
            let hit = self
                .elements
                .iter()
                .enumerate()
                .filter(|(i, _)| !done[*i])
                .find_map(|(i, element)| {
                    element.parse_terminal(&input[offset..]).map(|len| (i, len))
                });
            match hit {
                Some((i, len)) => {
                    done[i] = true;
                    offset += len;
                }
                None => break,
            }
        }
        done.iter().all(|&d| d).then_some(offset)
    }

    fn parse_rule<'i>(
        &self,
        input: &'i str,
        parent: &mut CstNode<'i>,
        ctx: &Context,
    ) -> Option<usize> {
        let mark = parent.children.len();
        let mut done = vec![false; self.elements.len()];
        let mut offset = 0;
        loop {
            let hit = self
                .elements
                .iter()
                .enumerate()
                .filter(|(i, _)| !done[*i])
                .find_map(|(i, element)| {
                    element
                        .parse_rule(&input[offset..], parent, ctx)
                        .map(|len| (i, len))
                });
            match hit {
                Some((i, len)) => {
                    done[i] = true;
                    offset += len;
                }
                None => break,
            }
        }
        if done.iter().all(|&d| d) {
            Some(offset)
        } else {
            parent.children.truncate(mark);
            None
        }
    }
}

impl<R: Into<Element>> std::ops::BitAnd<R> for UnorderedGroup {
    type Output = UnorderedGroup;
    fn bitand(mut self, rhs: R) -> UnorderedGroup {
        self.elements.push(rhs.into());
        self
    }
}

element_ops!(UnorderedGroup: seq, choice, until, not);

/// Bounded repetition: at least `min` and at most `max` matches.
#[derive(Debug, Clone)]
pub struct Repetition {
    element: Element,
    min: usize,
    max: usize,
}

impl GrammarElement for Repetition {
    fn parse_terminal(&self, input: &str) -> Option<usize> {
        let mut offset = 0;
        for _ in 0..self.min {
            offset += self.element.parse_terminal(&input[offset..])?;
        }
        for _ in self.min..self.max {
            match self.element.parse_terminal(&input[offset..]) {
                Some(len) => {
                    offset += len;
                    // A zero-width match cannot make further progress.
                    if len == 0 {
                        break;
                    }
                }
                None => break,
            }
        }
        Some(offset)
    }

    fn parse_rule<'i>(
        &self,
        input: &'i str,
        parent: &mut CstNode<'i>,
        ctx: &Context,
    ) -> Option<usize> {
        let entry = parent.children.len();
        let mut offset = 0;
        for _ in 0..self.min {
            match self.element.parse_rule(&input[offset..], parent, ctx) {
                Some(len) => offset += len,
                None => {
                    parent.children.truncate(entry);
                    return None;
                }
            }
        }
        for _ in self.min..self.max {
            let mark = parent.children.len();
            match self.element.parse_rule(&input[offset..], parent, ctx) {
                Some(len) => {
                    offset += len;
                    // A zero-width match cannot make further progress.
                    if len == 0 {
                        break;
                    }
                }
                None => {
                    parent.children.truncate(mark);
                    break;
                }
            }
        }
        Some(offset)
    }
}

element_ops!(Repetition: seq, choice, unordered, until, not);

/// Zero or one.
pub fn opt(element: impl Into<Element>) -> Repetition {
    rep(0, 1, element)
}

/// Zero or more.
pub fn many(element: impl Into<Element>) -> Repetition {
    rep(0, usize::MAX, element)
}

/// One or more.
pub fn at_least_one(element: impl Into<Element>) -> Repetition {
    rep(1, usize::MAX, element)
}

/// At least `min` and at most `max` (both inclusive) matches of `element`.
pub fn rep(min: usize, max: usize, element: impl Into<Element>) -> Repetition {
    assert!(min <= max, "repetition bounds are reversed");
    Repetition {
        element: element.into(),
        min,
        max,
    }
}

/// One or more `element` separated by `sep`: `element (sep element)*`.
/// A trailing separator never matches, by construction.
pub fn at_least_one_sep(sep: impl Into<Element>, element: impl Into<Element>) -> Group {
    let sep = sep.into();
    let element: Element = element.into();
    element.clone() + many(Group::pair(sep, element))
}

/// Zero or more `element` separated by `sep`: `(element (sep element)*)?`.
pub fn many_sep(sep: impl Into<Element>, element: impl Into<Element>) -> Repetition {
    opt(at_least_one_sep(sep, element))
}

/// And-predicate `&e`: succeeds consuming nothing iff `e` would match here.
pub fn ahead(element: impl Into<Element>) -> Element {
    Element::new(AndPredicate {
        element: element.into(),
    })
}

/// Not-predicate `!e`: succeeds consuming nothing iff `e` would not match
/// here. Also available as the `!` operator on non-class elements.
pub fn not(element: impl Into<Element>) -> Element {
    Element::new(NotPredicate {
        element: element.into(),
    })
}

/// `from >> to`: match `from`, then everything up to and including `to`.
pub(crate) fn until(from: Element, to: Element) -> Group {
    Group::pair(from, many(not(to.clone()) + dot()).into()) + to
}

/// Syntactic predicates run against a throwaway node so the real CST is
/// never touched.
#[derive(Debug)]
struct AndPredicate {
    element: Element,
}

impl GrammarElement for AndPredicate {
    fn parse_terminal(&self, input: &str) -> Option<usize> {
        self.element.parse_terminal(input).map(|_| 0)
    }

    fn parse_rule<'i>(
        &self,
        input: &'i str,
        _parent: &mut CstNode<'i>,
        ctx: &Context,
    ) -> Option<usize> {
        let mut scratch = CstNode::default();
        self.element.parse_rule(input, &mut scratch, ctx).map(|_| 0)
    }
}

#[derive(Debug)]
struct NotPredicate {
    element: Element,
}

impl GrammarElement for NotPredicate {
    fn parse_terminal(&self, input: &str) -> Option<usize> {
        match self.element.parse_terminal(input) {
            Some(_) => None,
            None => Some(0),
        }
    }

    fn parse_rule<'i>(
        &self,
        input: &'i str,
        _parent: &mut CstNode<'i>,
        ctx: &Context,
    ) -> Option<usize> {
        let mut scratch = CstNode::default();
        match self.element.parse_rule(input, &mut scratch, ctx) {
            Some(_) => None,
            None => Some(0),
        }
    }
}

into_element!(Group, OrderedChoice, UnorderedGroup, Repetition);
