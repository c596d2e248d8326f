use super::*;

#[test]
fn sanitize_strips_punctuation_but_keeps_wildcards_and_phrases() {
    let input = "fn foo{}[bar]^baz~@#qux$%&; \"exact phrase\" trail*";
    let cleaned = sanitize_query(input);
    assert!(!cleaned.contains(['{', '}', '[', ']', '^', '~', '@', '#', '$', '%', '&', ';']));
    assert!(cleaned.contains('"'));
    assert!(cleaned.contains('*'));
}

#[test]
fn sanitize_drops_comment_introducer() {
    let cleaned = sanitize_query("term -- trailing comment\nmore");
    assert!(cleaned.contains("term"));
    assert!(cleaned.contains("more"));
    assert!(!cleaned.contains("trailing"));
}

#[test]
fn sanitize_collapses_whitespace() {
    assert_eq!(sanitize_query("a   b\tc"), "a b c");
}
