//! The parser facade: rule construction surface and the parse driver.

use std::any::Any;
use std::sync::{Arc, OnceLock, RwLock};

use indexmap::IndexMap;

use crate::ValueError;
use crate::ast::{AstNode, FromValue, Value, rule_value};
use crate::context::Context;
use crate::cst::CstNode;
use crate::grammar::{Element, GrammarElement};
use crate::rules::{Converter, RuleCall, RuleDef, RuleKind, RuleSlot, TerminalKind};

/// A grammar plus its parse entry point.
///
/// Rules are declared by name during construction and are immutable
/// afterwards; [`parse`](Parser::parse) may then be called concurrently from
/// any number of threads. Rules may reference each other in any order via
/// [`call`](Parser::call) — a name only has to be *defined* by the time it is
/// first parsed.
///
/// Misusing the construction surface (defining a name twice, parsing or
/// calling an undefined rule, referencing an ignored terminal from a rule
/// body) is a programmer error and panics on first exercise.
pub struct Parser {
    rules: RwLock<IndexMap<String, Arc<RuleSlot>>>,
}

impl Parser {
    pub fn new() -> Self {
        Parser {
            rules: RwLock::new(IndexMap::new()),
        }
    }

    /// Declares a parser rule producing an AST record of type `T`.
    pub fn rule<T: AstNode + Default>(&self, name: &str, element: impl Into<Element>) {
        self.slot(name).define(RuleDef {
            element: element.into(),
            kind: RuleKind::Parser {
                record: new_record::<T>,
            },
        });
    }

    /// Declares a data-type rule whose value is the concatenation of the
    /// visible leaf text under its subtree.
    pub fn data_rule(&self, name: &str, element: impl Into<Element>) {
        self.define_data_rule(name, element.into(), visible_text_converter());
    }

    /// Declares a data-type rule with a typed value converter over the
    /// matched subtree.
    pub fn data_rule_with<V, F>(&self, name: &str, element: impl Into<Element>, convert: F)
    where
        V: Any + Send,
        F: for<'i> Fn(&CstNode<'i>) -> V + Send + Sync + 'static,
    {
        self.define_data_rule(
            name,
            element.into(),
            Arc::new(move |node: &CstNode<'_>| Value::data(convert(node))),
        );
    }

    /// Declares a terminal rule; its value is its matched text. The returned
    /// handle hides or ignores the terminal.
    pub fn terminal(&self, name: &str, element: impl Into<Element>) -> TerminalHandle {
        self.define_terminal(name, element.into(), visible_text_converter())
    }

    /// Declares a terminal rule with a typed value converter.
    pub fn terminal_with<V, F>(
        &self,
        name: &str,
        element: impl Into<Element>,
        convert: F,
    ) -> TerminalHandle
    where
        V: Any + Send,
        F: for<'i> Fn(&CstNode<'i>) -> V + Send + Sync + 'static,
    {
        self.define_terminal(
            name,
            element.into(),
            Arc::new(move |node: &CstNode<'_>| Value::data(convert(node))),
        )
    }

    /// References the rule `name` as a grammar element. The rule may be
    /// defined later (or earlier); the reference is resolved through the
    /// registry slot at parse time.
    pub fn call(&self, name: &str) -> Element {
        Element::new(RuleCall {
            slot: self.slot(name),
        })
    }

    /// Parses `input` against the rule `name`.
    ///
    /// Hidden terminals are skipped at the left edge and after every token;
    /// the whole input must be consumed for `ok`. A partial match reports
    /// `ok == false` together with the consumed length and the partial CST.
    /// The value is computed only for full matches.
    pub fn parse<'i>(&self, name: &str, input: &'i str) -> ParseResult<'i> {
        let slot = {
            let rules = self.rules.read().expect("rule registry lock");
            rules
                .get(name)
                .cloned()
                .unwrap_or_else(|| panic!("parse of unknown rule `{name}`"))
        };
        let ctx = self.context();
        let def = slot.def();

        let mut root = CstNode::root(input);
        root.rule = Some(Arc::clone(&slot));

        if def.terminal_kind().is_some() {
            root.is_leaf = true;
            let (ok, len) = match def.element.parse_terminal(input) {
                Some(len) => (len == input.len(), len),
                None => (false, 0),
            };
            let value = ok.then(|| rule_value(&slot, &root));
            return ParseResult {
                ok,
                len,
                value,
                root,
            };
        }

        let skipped = ctx.skip_hidden(input, &mut root);
        let (ok, len) = match def.element.parse_rule(&input[skipped..], &mut root, &ctx) {
            Some(len) => (skipped + len == input.len(), skipped + len),
            None => (false, skipped),
        };
        let value = ok.then(|| rule_value(&slot, &root));
        ParseResult {
            ok,
            len,
            value,
            root,
        }
    }

    fn slot(&self, name: &str) -> Arc<RuleSlot> {
        let mut rules = self.rules.write().expect("rule registry lock");
        Arc::clone(
            rules
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(RuleSlot::new(name))),
        )
    }

    fn define_data_rule(&self, name: &str, element: Element, convert: Converter) {
        self.slot(name).define(RuleDef {
            element,
            kind: RuleKind::DataType { convert },
        });
    }

    fn define_terminal(&self, name: &str, element: Element, convert: Converter) -> TerminalHandle {
        let slot = self.slot(name);
        slot.define(RuleDef {
            element,
            kind: RuleKind::Terminal {
                kind: OnceLock::new(),
                convert,
            },
        });
        TerminalHandle { slot }
    }

    /// The hidden/ignored terminal set for one parse, in registry order.
    fn context(&self) -> Context {
        let rules = self.rules.read().expect("rule registry lock");
        let hiddens = rules
            .values()
            .filter(|slot| {
                slot.try_def()
                    .and_then(RuleDef::terminal_kind)
                    .is_some_and(|kind| kind != TerminalKind::Normal)
            })
            .cloned()
            .collect();
        Context::new(hiddens)
    }
}

impl Default for Parser {
    fn default() -> Self {
        Parser::new()
    }
}

fn new_record<T: AstNode + Default>() -> Box<dyn AstNode> {
    Box::new(T::default())
}

fn visible_text_converter() -> Converter {
    static CONVERTER: OnceLock<Converter> = OnceLock::new();
    Arc::clone(
        CONVERTER.get_or_init(|| Arc::new(|node: &CstNode<'_>| Value::Str(node.visible_text()))),
    )
}

/// Post-definition handle for marking a terminal rule hidden or ignored.
pub struct TerminalHandle {
    slot: Arc<RuleSlot>,
}

impl TerminalHandle {
    /// Interleave matches between tokens, keeping them in the CST as hidden
    /// leaves (comments).
    pub fn hide(self) {
        self.set(TerminalKind::Hidden);
    }

    /// Interleave matches between tokens, discarding them entirely
    /// (whitespace).
    pub fn ignore(self) {
        self.set(TerminalKind::Ignored);
    }

    fn set(self, kind: TerminalKind) {
        let RuleKind::Terminal {
            kind: terminal_kind,
            ..
        } = &self.slot.def().kind
        else {
            unreachable!("terminal handle on a non-terminal rule");
        };
        if terminal_kind.set(kind).is_err() {
            panic!(
                "terminal `{}` is already marked hidden or ignored",
                self.slot.name()
            );
        }
    }
}

/// The outcome of a parse: accept/reject flag, consumed length, the concrete
/// syntax tree, and (for full matches) the rule's value.
#[derive(Debug)]
pub struct ParseResult<'i> {
    /// Whether the rule consumed the entire input.
    pub ok: bool,
    /// Bytes consumed from the start of the input.
    pub len: usize,
    /// Root of the concrete syntax tree. On a partial match this holds the
    /// successfully matched prefix.
    pub root: CstNode<'i>,
    /// The rule's value, present only when `ok`: the converter output for
    /// data-type and terminal rules, the built AST record for parser rules.
    pub value: Option<Value>,
}

impl ParseResult<'_> {
    /// Extracts the parse value as a `V`.
    pub fn into_value<V: FromValue>(self) -> Result<V, ValueError> {
        let value = self.value.ok_or(ValueError::NoValue)?;
        V::from_value(value).ok_or(ValueError::WrongType {
            requested: std::any::type_name::<V>(),
        })
    }
}
