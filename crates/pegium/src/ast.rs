//! AST records, value conversion, and the CST-to-AST build pass.
//!
//! Parsing records *actions* on the CST; nothing user-visible is built until
//! the parse succeeds. The build pass then walks the tree once, allocating a
//! record per parser-rule node and executing the actions of its subtree
//! against it.

use std::any::Any;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock};

use crate::cst::CstNode;
use crate::rules::{RuleKind, RuleSlot};

/// Marker for host-defined AST record types.
///
/// Records are plain structs: scalar/string fields, owned nested records
/// (`Option<Box<T>>` for exclusive ownership), vectors, and [`Reference`]
/// cross-links. Implement with `impl AstNode for MyRecord {}`; the type also
/// needs `Default` to be usable as a parser-rule record.
pub trait AstNode: Any + fmt::Debug + Send {}

/// The currency of value conversion between the CST and AST fields.
pub enum Value {
    /// Matched text, and the output of the default converters.
    Str(String),
    /// A record built by a parser rule.
    Node(Box<dyn AstNode>),
    /// Output of a host-supplied converter.
    Data(Box<dyn Any + Send>),
}

impl Value {
    /// Wraps converter output.
    pub fn data<T: Any + Send>(value: T) -> Value {
        Value::Data(Box::new(value))
    }

    /// Extracts the payload if it is a `T`. Works across all three arms.
    pub fn take<T: Any>(self) -> Option<T> {
        let any: Box<dyn Any> = match self {
            Value::Str(s) => Box::new(s),
            Value::Node(node) => node,
            Value::Data(data) => data,
        };
        any.downcast::<T>().ok().map(|boxed| *boxed)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "Str({s:?})"),
            Value::Node(node) => write!(f, "Node({node:?})"),
            Value::Data(_) => f.write_str("Data(..)"),
        }
    }
}

/// Conversion from a [`Value`] into an AST field type.
///
/// Implemented for strings, the primitive scalars, owned records
/// (`Box<T>` / `Option<Box<T>>`) and [`Reference`]s. Hosts implement it for
/// their own field types (typically by matching on the `Value` arms).
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Option<Self>;
}

impl FromValue for String {
    fn from_value(value: Value) -> Option<String> {
        value.take()
    }
}

macro_rules! from_value_scalar {
    ($($ty:ty),+ $(,)?) => {$(
        impl FromValue for $ty {
            fn from_value(value: Value) -> Option<$ty> {
                value.take()
            }
        }
    )+};
}
from_value_scalar!(bool, i8, i16, i32, i64, u8, u16, u32, u64, f32, f64, ());

impl<T: AstNode> FromValue for Box<T> {
    fn from_value(value: Value) -> Option<Box<T>> {
        match value {
            Value::Node(node) => {
                let any: Box<dyn Any> = node;
                any.downcast::<T>().ok()
            }
            _ => None,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Option<Self> {
        T::from_value(value).map(Some)
    }
}

impl<T: AstNode> FromValue for Reference<T> {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Str(key) => Some(Reference::unresolved(key)),
            _ => None,
        }
    }
}

/// Host-supplied lookup used to resolve a [`Reference`] key.
pub type Resolver<T> = Arc<dyn Fn(&str) -> Option<Arc<T>> + Send + Sync>;

/// A lazy, non-owning cross-reference to another AST node.
///
/// Parsing stores only the textual key; the host binds a resolver afterwards.
/// Resolution is cached with single-initialization semantics: once a lookup
/// succeeds, further reads are lock-free; a failed lookup leaves the
/// reference unresolved and the next `get` retries. Cycles between records
/// are expressible only through references, never through ownership.
pub struct Reference<T: AstNode> {
    key: String,
    resolver: Mutex<Option<Resolver<T>>>,
    target: OnceLock<Arc<T>>,
}

impl<T: AstNode> Reference<T> {
    pub(crate) fn unresolved(key: String) -> Self {
        Reference {
            key,
            resolver: Mutex::new(None),
            target: OnceLock::new(),
        }
    }

    /// The textual key captured during parsing.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Installs the lookup used by [`get`](Reference::get).
    pub fn bind(&self, resolver: impl Fn(&str) -> Option<Arc<T>> + Send + Sync + 'static) {
        *self.resolver.lock().expect("reference resolver lock") = Some(Arc::new(resolver));
    }

    /// Resolves the reference, or returns `None` when no resolver is bound
    /// or the key is unknown to it. Resolution failure is silent; retrying
    /// is the host's policy.
    pub fn get(&self) -> Option<Arc<T>> {
        if let Some(target) = self.target.get() {
            return Some(Arc::clone(target));
        }
        let resolver = self.resolver.lock().expect("reference resolver lock").clone()?;
        let value = resolver(&self.key)?;
        Some(Arc::clone(self.target.get_or_init(|| value)))
    }
}

impl<T: AstNode> Default for Reference<T> {
    fn default() -> Self {
        Reference::unresolved(String::new())
    }
}

impl<T: AstNode> fmt::Debug for Reference<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.target.get().is_some() {
            write!(f, "Reference({:?}, resolved)", self.key)
        } else {
            write!(f, "Reference({:?})", self.key)
        }
    }
}

/// Computes the value of a CST node produced by `slot`'s rule.
///
/// Parser rules allocate their record and run the actions of the subtree;
/// data-type and terminal rules run their converter.
pub(crate) fn rule_value(slot: &Arc<RuleSlot>, node: &CstNode<'_>) -> Value {
    match &slot.def().kind {
        RuleKind::Parser { record } => {
            let mut record = record();
            for child in &node.children {
                apply_actions(child, record.as_mut());
            }
            Value::Node(record)
        }
        RuleKind::DataType { convert } | RuleKind::Terminal { convert, .. } => convert(node),
    }
}

/// Executes the actions recorded under `node` against `record`.
///
/// A node carrying an action contributes its value and nothing below it; a
/// rule-produced node without an action is a boundary — a nested parser rule
/// builds (and discards) its own record so its actions cannot leak outward,
/// and data-type/terminal subtrees only yield values on demand.
fn apply_actions(node: &CstNode<'_>, record: &mut dyn AstNode) {
    if let Some(action) = &node.action {
        let value = match &node.rule {
            Some(slot) => rule_value(slot, node),
            None => Value::Str(node.text.to_string()),
        };
        action.apply(record, value);
        return;
    }
    if let Some(slot) = &node.rule {
        if matches!(slot.def().kind, RuleKind::Parser { .. }) {
            drop(rule_value(slot, node));
        }
        return;
    }
    for child in &node.children {
        apply_actions(child, record);
    }
}
