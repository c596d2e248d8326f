use super::*;
use crate::types::SourceFile;

fn source_file(path: &str, language: &str, content: &str) -> SourceFile {
    SourceFile {
        path: path.to_string(),
        language: language.to_string(),
        content: content.to_string(),
        modified_at: 0,
    }
}

#[test]
fn chunk_id_is_pure_function_of_its_inputs() {
    let a = chunk_id("src/a.rs", Level::Method, 1, 3, "deadbeef");
    let b = chunk_id("src/a.rs", Level::Method, 1, 3, "deadbeef");
    let c = chunk_id("src/a.rs", Level::Method, 1, 3, "different");
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn python_class_produces_parent_linked_tree() {
    let content = "class Greeter:\n    def hello(self):\n        return 1\n";
    let file = source_file("src/greeter.py", "python", content);
    let mut chunker = Chunker::new();
    let output = chunker.chunk(1, &file).unwrap();
    assert!(output.skipped.is_none());

    let root = output.chunks.iter().find(|c| c.level == Level::File).unwrap();
    assert!(root.parent_id.is_none());

    let class = output
        .chunks
        .iter()
        .find(|c| c.level == Level::Class)
        .unwrap();
    assert_eq!(class.parent_id.as_deref(), Some(root.id.as_str()));

    let method = output
        .chunks
        .iter()
        .find(|c| c.level == Level::Method)
        .unwrap();
    assert_eq!(method.parent_id.as_deref(), Some(class.id.as_str()));

    for chunk in &output.chunks {
        assert!(chunk.has_valid_span());
    }
}

#[test]
fn every_chunk_span_is_contained_in_its_parent() {
    let content = "class Greeter:\n    def hello(self):\n        return 1\n\n    def bye(self):\n        return 2\n";
    let file = source_file("src/greeter.py", "python", content);
    let mut chunker = Chunker::new();
    let output = chunker.chunk(1, &file).unwrap();

    let by_id: std::collections::HashMap<_, _> =
        output.chunks.iter().map(|c| (c.id.clone(), c.clone())).collect();

    for chunk in &output.chunks {
        if let Some(parent_id) = &chunk.parent_id {
            let parent = by_id.get(parent_id).expect("parent must exist in output");
            assert!(parent.contains_span(chunk));
            assert_eq!(parent.file_id, chunk.file_id);
        }
    }
}

#[test]
fn unsupported_language_falls_back_to_blocks() {
    let long_file: String = (0..450).map(|i| format!("line {i}\n")).collect();
    let file = source_file("data/table.cobol", "cobol", &long_file);
    let mut chunker = Chunker::new();
    let output = chunker.chunk(1, &file).unwrap();

    assert!(output.skipped.is_none());
    let blocks: Vec<_> = output.chunks.iter().filter(|c| c.level == Level::Block).collect();
    assert_eq!(blocks.len(), 3);
    assert_eq!(blocks[0].start_line, 1);
    assert_eq!(blocks[0].end_line, 200);
    assert_eq!(blocks[2].end_line, 450);
}

#[test]
fn short_unsupported_file_is_only_the_root_chunk() {
    let file = source_file("data/table.cobol", "cobol", "one\ntwo\nthree\n");
    let mut chunker = Chunker::new();
    let output = chunker.chunk(1, &file).unwrap();
    assert_eq!(output.chunks.len(), 1);
    assert_eq!(output.chunks[0].level, Level::File);
}

#[test]
fn minified_file_is_skipped_with_no_chunks() {
    let file = source_file("vendor/app.min.js", "javascript", "var a=1;var b=2;");
    let mut chunker = Chunker::new();
    let output = chunker.chunk(1, &file).unwrap();
    assert!(output.chunks.is_empty());
    assert_eq!(output.skipped, Some(SkipReason::Minified));
}

#[test]
fn chunks_within_a_file_are_totally_ordered() {
    let content = "class A:\n    def m1(self):\n        pass\n\nclass B:\n    def m2(self):\n        pass\n";
    let file = source_file("src/ab.py", "python", content);
    let mut chunker = Chunker::new();
    let output = chunker.chunk(1, &file).unwrap();

    let mut prev: Option<(u32, u32)> = None;
    for chunk in &output.chunks {
        let key = (chunk.start_line, chunk.end_line);
        if let Some(p) = prev {
            assert!(p <= key);
        }
        prev = Some(key);
    }
}
