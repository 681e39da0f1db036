use crate::{
    Parser, at_least_one, at_least_one_sep, kw, many, many_sep, opt, rep, s,
};

/// Same body installed as a syntactic rule and as a terminal, the pattern
/// every repetition test uses.
fn parser_with(body: impl Fn() -> crate::Element) -> Parser {
    let p = Parser::new();
    p.terminal("WS", at_least_one(s())).ignore();
    p.data_rule("RULE", body());
    p.terminal("TERM", body());
    p
}

#[test]
fn optional() {
    let p = parser_with(|| opt(kw("test")).into());

    assert!(p.parse("RULE", "").ok);
    assert!(p.parse("RULE", " ").ok);
    assert!(p.parse("RULE", "test").ok);
    assert!(!p.parse("RULE", "test test").ok);
    assert!(!p.parse("RULE", "testtest").ok);

    assert_eq!(p.parse("RULE", "    ").into_value::<String>().unwrap(), "");
    assert_eq!(
        p.parse("RULE", "  test  ").into_value::<String>().unwrap(),
        "test"
    );

    assert!(p.parse("TERM", "").ok);
    assert!(p.parse("TERM", "test").ok);
    assert!(!p.parse("TERM", " ").ok);
    assert!(!p.parse("TERM", "test ").ok);
    assert!(!p.parse("TERM", " test").ok);
    assert!(!p.parse("TERM", "testtest").ok);

    assert_eq!(p.parse("TERM", "").into_value::<String>().unwrap(), "");
    assert_eq!(p.parse("TERM", "test").into_value::<String>().unwrap(), "test");
}

#[test]
fn zero_or_more() {
    let p = parser_with(|| many(kw("test")).into());

    assert!(p.parse("RULE", "").ok);
    assert!(p.parse("RULE", "test").ok);
    assert!(p.parse("RULE", "test test").ok);
    assert!(p.parse("RULE", "test test test test test").ok);

    assert_eq!(
        p.parse("RULE", " test  test   ").into_value::<String>().unwrap(),
        "testtest"
    );

    assert!(p.parse("TERM", "").ok);
    assert!(p.parse("TERM", "test").ok);
    assert!(p.parse("TERM", "testtest").ok);
    assert!(p.parse("TERM", "testtesttesttesttest").ok);
    assert!(!p.parse("TERM", " ").ok);
    assert!(!p.parse("TERM", "test ").ok);
    assert!(!p.parse("TERM", " test").ok);
    assert!(!p.parse("TERM", "testtest ").ok);
}

#[test]
fn one_or_more() {
    let p = parser_with(|| at_least_one(kw("test")).into());

    assert!(!p.parse("RULE", "").ok);
    assert!(!p.parse("RULE", "testtest").ok);
    assert!(p.parse("RULE", "test").ok);
    assert!(p.parse("RULE", "test test").ok);
    assert!(p.parse("RULE", "test test test test test").ok);

    assert!(!p.parse("TERM", "").ok);
    assert!(!p.parse("TERM", "test test").ok);
    assert!(p.parse("TERM", "test").ok);
    assert!(p.parse("TERM", "testtest").ok);
    assert!(p.parse("TERM", "testtesttesttesttest").ok);
}

#[test]
fn zero_or_more_separated() {
    let p = parser_with(|| many_sep(kw("."), kw("test")).into());

    assert!(p.parse("RULE", "").ok);
    assert!(!p.parse("RULE", ".").ok);
    assert!(!p.parse("RULE", "test.").ok);
    assert!(p.parse("RULE", "test").ok);
    assert!(p.parse("RULE", " test . test ").ok);
    assert!(p.parse("RULE", "test.test.test. test.test").ok);

    assert_eq!(
        p.parse("RULE", " test  . test   ").into_value::<String>().unwrap(),
        "test.test"
    );

    assert!(p.parse("TERM", "").ok);
    assert!(p.parse("TERM", "test").ok);
    assert!(p.parse("TERM", "test.test").ok);
    assert!(p.parse("TERM", "test.test.test.test.test").ok);
    assert!(!p.parse("TERM", " ").ok);
    assert!(!p.parse("TERM", "test .").ok);
    assert!(!p.parse("TERM", " test.").ok);
    assert!(!p.parse("TERM", "test.test ").ok);
}

#[test]
fn one_or_more_separated() {
    let p = parser_with(|| at_least_one_sep(kw("."), kw("test")).into());

    assert!(!p.parse("RULE", "").ok);
    assert!(!p.parse("RULE", ".").ok);
    assert!(!p.parse("RULE", "test.").ok);
    assert!(p.parse("RULE", "test ").ok);
    assert!(p.parse("RULE", "test .test").ok);
    assert!(p.parse("RULE", "  test.test . test.test.test  ").ok);

    assert_eq!(
        p.parse("RULE", " test  . test   ").into_value::<String>().unwrap(),
        "test.test"
    );

    assert!(!p.parse("TERM", "").ok);
    assert!(!p.parse("TERM", ".").ok);
    assert!(!p.parse("TERM", "test.").ok);
    assert!(!p.parse("TERM", "test .test").ok);
    assert!(p.parse("TERM", "test").ok);
    assert!(p.parse("TERM", "test.test").ok);
    assert!(p.parse("TERM", "test.test.test.test.test").ok);
}

#[test]
fn bounded_repetition() {
    let p = parser_with(|| rep(2, 3, kw("test")).into());

    assert!(!p.parse("RULE", "test").ok);
    assert!(p.parse("RULE", "test test").ok);
    assert!(p.parse("RULE", "test test test").ok);
    assert!(!p.parse("RULE", "test test test test").ok);

    assert_eq!(
        p.parse("RULE", " test   test   ").into_value::<String>().unwrap(),
        "testtest"
    );

    assert!(!p.parse("TERM", "test").ok);
    assert!(p.parse("TERM", "testtest").ok);
    assert!(p.parse("TERM", "testtesttest").ok);
    assert!(!p.parse("TERM", "testtesttesttest").ok);
}

#[test]
fn trailing_separator_never_matches() {
    // Under-min failures and trailing-attempt failures both roll back, so a
    // separated list followed by its separator leaves the separator behind.
    let p = parser_with(|| at_least_one_sep(kw(","), kw("x")).into());

    let result = p.parse("RULE", "x,x,");
    assert!(!result.ok);
    assert_eq!(result.len, 3);
}
