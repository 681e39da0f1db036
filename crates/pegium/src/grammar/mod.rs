//! Grammar elements and their composition algebra.
//!
//! Every element is a recognizer with two entry points: *terminal* mode
//! matches raw bytes with no hidden-token handling, *rule* mode additionally
//! grows the CST and lets tokens swallow hidden terminals on their right
//! edge. Combinators compose elements into new elements; composition never
//! touches input.
//!
//! # Operators
//!
//! Rust's native precedence lines up with the grammar algebra: unary `!`
//! binds tightest, then `+` (sequence), then `>>` (until), then `&`
//! (unordered group), then `|` (ordered choice). So
//! `kw("a") + kw("b") | kw("c")` reads `("a" "b") / "c"`.
//!
//! On a [`CharClass`], `!` and `|` stay inside the character-set algebra
//! (negation and union); everywhere else `!` builds a not-predicate and `|`
//! an ordered choice.

mod assignment;
mod atoms;
mod combinators;

use std::fmt;
use std::sync::Arc;

use crate::context::Context;
use crate::cst::CstNode;

pub use assignment::{Action, append, assign};
pub use atoms::{AnyChar, CharClass, D, Literal, S, W, cls, d, dot, eof, eol, kw, s, w};
pub use combinators::{
    Group, OrderedChoice, Repetition, UnorderedGroup, ahead, at_least_one, at_least_one_sep, many,
    many_sep, not, opt, rep,
};

/// The dual-mode recognizer contract implemented by every grammar element.
///
/// Both recognizers return the number of bytes consumed from the start of
/// `input`, or `None` when the element does not match. `Some(0)` is a valid
/// success (predicates, empty repetitions).
pub trait GrammarElement: fmt::Debug + Send + Sync {
    /// Matches at the start of `input` with no hidden-token skipping
    /// anywhere. This is how terminal rule bodies see the raw bytes.
    fn parse_terminal(&self, input: &str) -> Option<usize>;

    /// Matches at the start of `input`, appending CST nodes to `parent`.
    /// Token elements skip hidden terminals on their right edge, so hidden
    /// tokens interleave between tokens. On `None` the parent's children are
    /// exactly as they were on entry.
    fn parse_rule<'i>(
        &self,
        input: &'i str,
        parent: &mut CstNode<'i>,
        ctx: &Context,
    ) -> Option<usize>;
}

/// A cheaply cloneable handle to a grammar element.
///
/// Elements are shared values: the same handle may appear in any number of
/// rules. All composition operators and the rule-construction surface accept
/// `impl Into<Element>`.
#[derive(Clone, Debug)]
pub struct Element(Arc<dyn GrammarElement>);

impl Element {
    pub fn new(element: impl GrammarElement + 'static) -> Self {
        Element(Arc::new(element))
    }
}

impl GrammarElement for Element {
    #[inline]
    fn parse_terminal(&self, input: &str) -> Option<usize> {
        self.0.parse_terminal(input)
    }

    #[inline]
    fn parse_rule<'i>(
        &self,
        input: &'i str,
        parent: &mut CstNode<'i>,
        ctx: &Context,
    ) -> Option<usize> {
        self.0.parse_rule(input, parent, ctx)
    }
}

/// Implements `From<$ty> for Element` by boxing the element.
macro_rules! into_element {
    ($($ty:ty),+ $(,)?) => {$(
        impl From<$ty> for Element {
            fn from(element: $ty) -> Element {
                Element::new(element)
            }
        }
    )+};
}
pub(crate) use into_element;

/// Implements the composition operators that fold a type into compound
/// elements. Each arm is requested separately so types can keep their own
/// meaning for an operator (`Group` appends on `+`, `CharClass` negates on
/// `!`, and so on).
macro_rules! element_ops {
    ($ty:ty: seq) => {
        impl<R: Into<$crate::grammar::Element>> std::ops::Add<R> for $ty {
            type Output = $crate::grammar::Group;
            fn add(self, rhs: R) -> Self::Output {
                $crate::grammar::Group::pair(self.into(), rhs.into())
            }
        }
    };
    ($ty:ty: choice) => {
        impl<R: Into<$crate::grammar::Element>> std::ops::BitOr<R> for $ty {
            type Output = $crate::grammar::OrderedChoice;
            fn bitor(self, rhs: R) -> Self::Output {
                $crate::grammar::OrderedChoice::pair(self.into(), rhs.into())
            }
        }
    };
    ($ty:ty: unordered) => {
        impl<R: Into<$crate::grammar::Element>> std::ops::BitAnd<R> for $ty {
            type Output = $crate::grammar::UnorderedGroup;
            fn bitand(self, rhs: R) -> Self::Output {
                $crate::grammar::UnorderedGroup::pair(self.into(), rhs.into())
            }
        }
    };
    ($ty:ty: until) => {
        impl<R: Into<$crate::grammar::Element>> std::ops::Shr<R> for $ty {
            type Output = $crate::grammar::Group;
            fn shr(self, rhs: R) -> Self::Output {
                $crate::grammar::combinators::until(self.into(), rhs.into())
            }
        }
    };
    ($ty:ty: not) => {
        impl std::ops::Not for $ty {
            type Output = $crate::grammar::Element;
            fn not(self) -> Self::Output {
                $crate::grammar::not(self)
            }
        }
    };
    ($ty:ty: $($op:ident),+) => {
        $(element_ops!($ty: $op);)+
    };
}
pub(crate) use element_ops;

element_ops!(Element: seq, choice, unordered, until, not);
