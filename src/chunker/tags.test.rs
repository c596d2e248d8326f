use super::*;

#[test]
fn extracts_python_class_and_methods() {
    let source = "class Greeter:\n    def hello(self):\n        return 1\n\n    def bye(self):\n        return 2\n";
    let mut extractor = TagExtractor::new();
    let tags = extractor.extract(source, SupportedLanguage::Python).unwrap();

    let class_tags: Vec<_> = tags.iter().filter(|t| t.kind == TagKind::Class).collect();
    assert_eq!(class_tags.len(), 1);
    assert_eq!(class_tags[0].name, "Greeter");

    let method_tags: Vec<_> = tags.iter().filter(|t| t.kind == TagKind::Function).collect();
    assert_eq!(method_tags.len(), 2);

    let hello = method_tags.iter().find(|t| t.name == "hello").unwrap();
    let container = innermost_container(&tags, hello.start_line, hello.end_line).unwrap();
    assert_eq!(container.name, "Greeter");
}

#[test]
fn extracts_rust_functions() {
    let source = "fn add(a: i32, b: i32) -> i32 {\n    a + b\n}\n";
    let mut extractor = TagExtractor::new();
    let tags = extractor.extract(source, SupportedLanguage::Rust).unwrap();
    assert!(tags.iter().any(|t| t.name == "add" && t.kind == TagKind::Function));
}
