//! Assignments: grammar wrappers that install matched values into fields of
//! the AST record under construction.

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

use super::{Element, GrammarElement};
use crate::ast::{AstNode, FromValue, Value};
use crate::context::Context;
use crate::cst::CstNode;

/// A field-install operation recorded on a CST node during parsing and
/// executed by the AST build pass.
pub trait Action: fmt::Debug + Send + Sync {
    /// Installs `value` into the targeted field of `record`. Applying an
    /// action to a record of the wrong type, or a value that does not
    /// convert to the field type, is a programmer error and panics.
    fn apply(&self, record: &mut dyn AstNode, value: Value);
}

/// Sets a field of record type `R`: `assign(|r: &mut R| &mut r.field, element)`.
///
/// The wrapped element must produce exactly one CST node (a rule call, a
/// literal, or an ordered choice of those); the action is stamped onto that
/// node and executed against the surrounding record when the AST is built.
pub fn assign<R, V>(bind: fn(&mut R) -> &mut V, element: impl Into<Element>) -> Element
where
    R: AstNode,
    V: FromValue + 'static,
{
    Element::new(Assignment {
        element: element.into(),
        action: Arc::new(Assign { bind }),
    })
}

/// Pushes onto a vector field of record type `R`:
/// `append(|r: &mut R| &mut r.items, element)`.
pub fn append<R, V>(bind: fn(&mut R) -> &mut Vec<V>, element: impl Into<Element>) -> Element
where
    R: AstNode,
    V: FromValue + 'static,
{
    Element::new(Assignment {
        element: element.into(),
        action: Arc::new(Append { bind }),
    })
}

#[derive(Debug)]
struct Assignment {
    element: Element,
    action: Arc<dyn Action>,
}

impl GrammarElement for Assignment {
    fn parse_terminal(&self, _input: &str) -> Option<usize> {
        panic!("an assignment cannot appear inside a terminal rule")
    }

    fn parse_rule<'i>(
        &self,
        input: &'i str,
        parent: &mut CstNode<'i>,
        ctx: &Context,
    ) -> Option<usize> {
        let mark = parent.children.len();
        let len = self.element.parse_rule(input, parent, ctx)?;
        // The assigned element appends its own node first; anything after it
        // must be hidden interleave picked up on the token's right edge. More
        // than one visible node means the element was not assignable (a rule
        // call, a literal, or an ordered choice of those).
        let produced = parent.children[mark..]
            .iter()
            .filter(|node| !node.hidden)
            .count();
        assert!(
            produced == 1,
            "assigned element {:?} produced {produced} CST nodes, expected exactly one (not an assignable element)",
            self.element
        );
        debug_assert!(!parent.children[mark].hidden);
        parent.children[mark].action = Some(Arc::clone(&self.action));
        Some(len)
    }
}

struct Assign<R, V> {
    bind: fn(&mut R) -> &mut V,
}

impl<R, V> Action for Assign<R, V>
where
    R: AstNode,
    V: FromValue + 'static,
{
    fn apply(&self, record: &mut dyn AstNode, value: Value) {
        *(self.bind)(downcast_record(record)) = convert::<V>(value);
    }
}

struct Append<R, V> {
    bind: fn(&mut R) -> &mut Vec<V>,
}

impl<R, V> Action for Append<R, V>
where
    R: AstNode,
    V: FromValue + 'static,
{
    fn apply(&self, record: &mut dyn AstNode, value: Value) {
        (self.bind)(downcast_record(record)).push(convert::<V>(value));
    }
}

fn downcast_record<R: AstNode>(record: &mut dyn AstNode) -> &mut R {
    let record: &mut dyn Any = record;
    record.downcast_mut::<R>().unwrap_or_else(|| {
        panic!(
            "assignment targets a `{}` but the record under construction is of another type",
            type_name::<R>()
        )
    })
}

fn convert<V: FromValue>(value: Value) -> V {
    V::from_value(value).unwrap_or_else(|| {
        panic!(
            "assigned value does not convert to the field type `{}`",
            type_name::<V>()
        )
    })
}

impl<R, V> fmt::Debug for Assign<R, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "assign::<{}, {}>", type_name::<R>(), type_name::<V>())
    }
}

impl<R, V> fmt::Debug for Append<R, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "append::<{}, {}>", type_name::<R>(), type_name::<V>())
    }
}
