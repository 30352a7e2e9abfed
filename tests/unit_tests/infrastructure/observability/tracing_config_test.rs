use parley::infrastructure::observability::TracingConfig;

#[test]
fn given_level_when_creating_config_then_filter_covers_crate() {
    let config = TracingConfig::new("Prod", true, "warn");

    assert_eq!(config.environment, "Prod");
    assert!(config.json_format);
    assert_eq!(config.default_filter, "warn,parley=warn");
}

#[test]
fn given_default_config_when_created_then_environment_is_set() {
    let config = TracingConfig::default();

    assert!(!config.environment.is_empty());
    assert_eq!(config.default_filter, "info,parley=debug");
}
