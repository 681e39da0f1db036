use crate::{Element, Parser, at_least_one, kw, s};

fn parser_with(body: impl Fn() -> Element) -> Parser {
    let p = Parser::new();
    p.terminal("WS", at_least_one(s())).ignore();
    p.data_rule("RULE", body());
    p.terminal("TERM", body());
    p
}

#[test]
fn sequence() {
    let p = parser_with(|| (kw("A") + kw("B")).into());

    assert!(!p.parse("RULE", "").ok);
    assert!(p.parse("RULE", "  A  B").ok);
    assert!(!p.parse("RULE", "A ").ok);

    assert_eq!(p.parse("RULE", " A   B  ").into_value::<String>().unwrap(), "AB");

    assert!(!p.parse("TERM", "A").ok);
    assert!(p.parse("TERM", "AB").ok);
    assert!(!p.parse("TERM", " AB").ok);

    assert_eq!(p.parse("TERM", "AB").into_value::<String>().unwrap(), "AB");
}

#[test]
fn sequence_chains_stay_flat() {
    let p = parser_with(|| (kw("A") + kw("B") + kw("C")).into());

    let result = p.parse("RULE", "A B C");
    assert!(result.ok);

    insta::assert_snapshot!(result.root.dump(), @r#"
    RULE
      "A"
      "B"
      "C"
    "#);
}

#[test]
fn ordered_choice() {
    let p = parser_with(|| (kw("A") | kw("B")).into());

    assert!(!p.parse("RULE", "").ok);
    assert!(p.parse("RULE", "  A  ").ok);
    assert!(p.parse("RULE", "  B  ").ok);
    assert!(!p.parse("RULE", "A B").ok);

    assert_eq!(p.parse("RULE", " A     ").into_value::<String>().unwrap(), "A");

    assert!(!p.parse("TERM", "").ok);
    assert!(p.parse("TERM", "A").ok);
    assert!(p.parse("TERM", "B").ok);
    assert!(!p.parse("TERM", " A").ok);
    assert!(!p.parse("TERM", "A ").ok);
}

#[test]
fn ordered_choice_with_sequences() {
    let p = parser_with(|| (kw("A") + kw("B") | kw("A") + kw("C")).into());

    assert!(!p.parse("RULE", "").ok);
    assert!(p.parse("RULE", "  A  B").ok);
    assert!(p.parse("RULE", " A C  ").ok);
    assert!(!p.parse("RULE", "A ").ok);

    assert_eq!(p.parse("RULE", " A   B  ").into_value::<String>().unwrap(), "AB");

    assert!(p.parse("TERM", "AB").ok);
    assert!(p.parse("TERM", "AC").ok);
    assert!(!p.parse("TERM", " AB").ok);
    assert!(!p.parse("TERM", "AC ").ok);
}

#[test]
fn choice_commits_to_the_first_success() {
    // PEG choice is committed: once `(` matches, the longer alternative is
    // never reconsidered, so the input tail stays unconsumed.
    let p = Parser::new();
    p.data_rule("SHORT_FIRST", kw("(") | kw("(") + kw(")"));
    p.data_rule("LONG_FIRST", kw("(") + kw(")") | kw("("));

    let committed = p.parse("SHORT_FIRST", "()");
    assert!(!committed.ok);
    assert_eq!(committed.len, 1);

    assert!(p.parse("LONG_FIRST", "()").ok);
}

#[test]
fn unordered_group() {
    let p = parser_with(|| (kw("A") & kw("B") & kw("C")).into());

    assert!(p.parse("RULE", "  A  B C").ok);
    assert!(p.parse("RULE", "  A  C B").ok);
    assert!(p.parse("RULE", "  B  A C").ok);
    assert!(p.parse("RULE", "  B  C A").ok);
    assert!(p.parse("RULE", "  C  A B").ok);
    assert!(p.parse("RULE", "  C  B A").ok);

    assert!(!p.parse("RULE", "A B B").ok);
    assert!(!p.parse("RULE", "A C").ok);

    assert!(p.parse("TERM", "ABC").ok);
    assert!(p.parse("TERM", "ACB").ok);
    assert!(p.parse("TERM", "BAC").ok);
    assert!(p.parse("TERM", "BCA").ok);
    assert!(p.parse("TERM", "CAB").ok);
    assert!(p.parse("TERM", "CBA").ok);

    assert!(!p.parse("TERM", "ABB").ok);
    assert!(!p.parse("TERM", "AC").ok);

    assert_eq!(p.parse("TERM", "ACB").into_value::<String>().unwrap(), "ACB");
}

#[test]
fn unordered_group_records_matched_order() {
    let p = parser_with(|| (kw("A") & kw("B") & kw("C")).into());

    let result = p.parse("RULE", " B  C A");
    assert!(result.ok);
    assert_eq!(result.into_value::<String>().unwrap(), "BCA");

    let result = p.parse("RULE", " B  C A");
    insta::assert_snapshot!(result.root.dump(), @r#"
    RULE
      "B"
      "C"
      "A"
    "#);
}

#[test]
fn unordered_group_failure_rolls_back_partial_matches() {
    let p = parser_with(|| (kw("A") & kw("B")).into());

    let result = p.parse("RULE", "A");
    assert!(!result.ok);
    assert!(result.root.children.is_empty());
}
