use super::*;

#[test]
fn resolves_known_tags() {
    assert_eq!(SupportedLanguage::from_tag("python"), Some(SupportedLanguage::Python));
    assert_eq!(SupportedLanguage::from_tag("PY"), Some(SupportedLanguage::Python));
    assert_eq!(SupportedLanguage::from_tag("rust"), Some(SupportedLanguage::Rust));
    assert_eq!(SupportedLanguage::from_tag("go"), Some(SupportedLanguage::Go));
    assert_eq!(SupportedLanguage::from_tag("java"), Some(SupportedLanguage::Java));
}

#[test]
fn unknown_tag_is_none() {
    assert_eq!(SupportedLanguage::from_tag("cobol"), None);
}

#[test]
fn from_path_uses_extension() {
    assert_eq!(
        SupportedLanguage::from_path("src/main.rs"),
        Some(SupportedLanguage::Rust)
    );
    assert_eq!(SupportedLanguage::from_path("README"), None);
}

#[test]
fn require_language_errors_on_unknown() {
    let err = require_language("cobol").unwrap_err();
    assert!(matches!(err, PommelError::Unsupported(_)));
}

#[test]
fn tags_configuration_builds_for_each_supported_language() {
    for lang in [
        SupportedLanguage::Python,
        SupportedLanguage::JavaScript,
        SupportedLanguage::TypeScript,
        SupportedLanguage::Tsx,
        SupportedLanguage::Rust,
        SupportedLanguage::Go,
        SupportedLanguage::Java,
    ] {
        lang.tags_configuration()
            .unwrap_or_else(|e| panic!("{lang:?} tags query should build: {e}"));
    }
}
