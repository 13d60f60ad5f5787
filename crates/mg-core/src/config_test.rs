use super::*;

#[test]
fn test_parse_minimal_config() {
    let yaml = r#"
datasources:
  main:
    folder: migrations
    connection: postgresql://localhost:5432/app
"#;
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    config.validate().unwrap();
    assert_eq!(config.mode, RunMode::Default);

    let ds = config.datasource("main").unwrap();
    assert_eq!(ds.lock_key, DEFAULT_LOCK_KEY);
    assert!(ds.user.is_empty());
    assert!(ds.password.is_empty());
}

#[test]
fn test_parse_full_config() {
    let yaml = r#"
mode: silent
datasources:
  orders:
    folder: db/orders
    connection: jdbc:postgresql://db:5432/orders
    user: app
    password: secret
    lock_key: 42
  billing:
    folder: /srv/billing
    connection: host=db dbname=billing
"#;
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    assert!(config.mode.is_silent());
    assert_eq!(config.datasource_names(), vec!["billing", "orders"]);

    let orders = config.datasource("orders").unwrap();
    assert_eq!(orders.user, "app");
    assert_eq!(orders.lock_key, 42);
}

#[test]
fn test_unknown_field_rejected() {
    let yaml = r#"
datasources:
  main:
    folder: m
    connection: c
    schema: public
"#;
    assert!(serde_yaml::from_str::<Config>(yaml).is_err());
}

#[test]
fn test_validate_requires_datasource() {
    let config: Config = serde_yaml::from_str("datasources: {}").unwrap();
    let err = config.validate().unwrap_err();
    assert!(matches!(err, CoreError::ConfigInvalid { .. }));
}

#[test]
fn test_validate_empty_connection() {
    let yaml = r#"
datasources:
  main:
    folder: migrations
    connection: "  "
"#;
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("'main'"));
}

#[test]
fn test_unknown_datasource_lists_available() {
    let yaml = r#"
datasources:
  a: { folder: m, connection: c }
  b: { folder: m, connection: c }
"#;
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    let err = config.datasource("c").unwrap_err();
    assert!(err.to_string().contains("a, b"));
}

#[test]
fn test_folder_absolute() {
    let ds = DatasourceConfig {
        folder: "migrations".to_string(),
        connection: "c".to_string(),
        user: String::new(),
        password: String::new(),
        lock_key: DEFAULT_LOCK_KEY,
    };
    let root = PathBuf::from("/srv/app");
    assert_eq!(ds.folder_absolute(&root), root.join("migrations"));

    let abs = DatasourceConfig {
        folder: "/opt/m".to_string(),
        ..ds
    };
    assert_eq!(abs.folder_absolute(&root), PathBuf::from("/opt/m"));
}

#[test]
fn test_load_from_dir_sets_root() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("migrator.yaml"),
        "datasources:\n  main:\n    folder: migrations\n    connection: postgresql://localhost/app\n",
    )
    .unwrap();

    let config = Config::load_from_dir(dir.path()).unwrap();
    assert_eq!(config.root, dir.path());
    let ds = config.datasource("main").unwrap();
    assert_eq!(ds.folder_absolute(&config.root), dir.path().join("migrations"));
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::load_from_dir(dir.path()).unwrap_err();
    assert!(matches!(err, CoreError::ConfigNotFound { .. }));
}

#[test]
fn test_load_invalid_yaml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("migrator.yml");
    std::fs::write(&path, "datasources: [not, a, map]").unwrap();
    let err = Config::load(&path).unwrap_err();
    assert!(matches!(err, CoreError::YamlParse(_)));
}
