use super::*;

#[test]
fn deserializes_minimal_toml_with_defaults() {
    let toml_src = r#"
        [embedding]
        provider = "local"
        model = "nomic-embed-text"
        dimensions = 768
    "#;

    let config: PommelConfig = toml::from_str(toml_src).unwrap();
    assert_eq!(config.cache_capacity, default_cache_capacity());
    assert_eq!(config.fusion.k, 60);
    assert_eq!(config.fusion.fanout, 4);
    assert!(!config.subprojects.auto_detect);
    assert!(config.subprojects.projects.is_empty());
}

#[test]
fn deserializes_explicit_overrides() {
    let toml_src = r#"
        cache_capacity = 500

        [embedding]
        provider = "openai"
        model = "text-embedding-3-small"
        dimensions = 1536

        [fusion]
        k = 30
        fanout = 8

        [subprojects]
        auto_detect = true
        exclude = ["vendor"]

        [[subprojects.projects]]
        id = "frontend"
        path = "packages/frontend"
        name = "Frontend"
    "#;

    let config: PommelConfig = toml::from_str(toml_src).unwrap();
    assert_eq!(config.cache_capacity, 500);
    assert_eq!(config.embedding.dimensions, 1536);
    assert_eq!(config.fusion.k, 30);
    assert_eq!(config.subprojects.projects.len(), 1);
    assert_eq!(config.subprojects.projects[0].path, "packages/frontend");
}
