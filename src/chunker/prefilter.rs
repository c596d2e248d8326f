//! Binary/minified file detection (SPEC_FULL.md §4.1 step 1).

const SAMPLE_BYTES: usize = 8192;
const MIN_FILE_SIZE_FOR_WHITESPACE_CHECK: usize = 1024;
const MAX_AVG_LINE_LENGTH: f64 = 500.0;
const MAX_SINGLE_LINE_SIZE: usize = 10 * 1024;
const MIN_WHITESPACE_RATIO: f64 = 0.05;

const MINIFIED_SUFFIXES: &[&str] = &[".min.js", ".min.css", ".bundle.js", ".bundle.css"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Binary,
    Minified,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Binary => write!(f, "binary"),
            Self::Minified => write!(f, "minified"),
        }
    }
}

/// Returns why `path`/`content` should be skipped, if at all.
pub fn prefilter(path: &str, content: &str) -> Option<SkipReason> {
    if looks_binary(content) {
        return Some(SkipReason::Binary);
    }

    if MINIFIED_SUFFIXES.iter().any(|suffix| path.ends_with(suffix)) {
        return Some(SkipReason::Minified);
    }

    if path.contains(".min.") {
        return Some(SkipReason::Minified);
    }

    let lines: Vec<&str> = content.lines().collect();
    let num_lines = lines.len().max(1);
    let avg_line_length = content.len() as f64 / num_lines as f64;
    if avg_line_length > MAX_AVG_LINE_LENGTH {
        return Some(SkipReason::Minified);
    }

    if lines.len() <= 1 && content.len() > MAX_SINGLE_LINE_SIZE {
        return Some(SkipReason::Minified);
    }

    if content.len() >= MIN_FILE_SIZE_FOR_WHITESPACE_CHECK {
        let whitespace = content
            .bytes()
            .filter(|b| matches!(b, b' ' | b'\t' | b'\n'))
            .count();
        let ratio = whitespace as f64 / content.len() as f64;
        if ratio < MIN_WHITESPACE_RATIO {
            return Some(SkipReason::Minified);
        }
    }

    None
}

/// Sniffs the first [`SAMPLE_BYTES`] for a NUL byte, the cheapest reliable
/// signal that content is not text.
fn looks_binary(content: &str) -> bool {
    content.as_bytes().iter().take(SAMPLE_BYTES).any(|&b| b == 0)
}

#[cfg(test)]
#[path = "prefilter.test.rs"]
mod tests;
