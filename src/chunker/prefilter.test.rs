use super::*;

#[test]
fn normal_source_passes() {
    let content = "fn main() {\n    println!(\"hi\");\n}\n";
    assert_eq!(prefilter("src/main.rs", content), None);
}

#[test]
fn min_js_suffix_is_skipped() {
    assert_eq!(
        prefilter("vendor/jquery.min.js", "var a=1;"),
        Some(SkipReason::Minified)
    );
}

#[test]
fn dot_min_dot_in_filename_is_skipped() {
    assert_eq!(
        prefilter("dist/app.min.something.js", "var a=1;"),
        Some(SkipReason::Minified)
    );
}

#[test]
fn long_single_line_is_skipped() {
    let content = "x".repeat(11 * 1024);
    assert_eq!(prefilter("dist/bundle.js", &content), Some(SkipReason::Minified));
}

#[test]
fn low_whitespace_ratio_over_1kb_is_skipped() {
    let content = "a".repeat(2000);
    assert_eq!(prefilter("data/blob.txt", &content), Some(SkipReason::Minified));
}

#[test]
fn low_whitespace_ratio_under_1kb_is_allowed() {
    let content = "a".repeat(500);
    assert_eq!(prefilter("data/small.txt", &content), None);
}

#[test]
fn nul_byte_is_binary() {
    let content = "hello\0world";
    assert_eq!(prefilter("data/blob.bin", content), Some(SkipReason::Binary));
}

#[test]
fn high_average_line_length_is_minified() {
    let line = "x".repeat(600);
    let content = format!("{line}\n{line}\n");
    assert_eq!(prefilter("src/huge.js", &content), Some(SkipReason::Minified));
}
