use super::*;

#[test]
fn test_normalize_strips_jdbc_prefix() {
    assert_eq!(
        normalize_connection_string("jdbc:postgresql://db:5432/app"),
        "postgresql://db:5432/app"
    );
    assert_eq!(
        normalize_connection_string("  postgresql://db/app "),
        "postgresql://db/app"
    );
    assert_eq!(normalize_connection_string("host=db"), "host=db");
}

#[test]
fn test_redact_url_credentials() {
    assert_eq!(
        redact("postgresql://app:secret@db:5432/app"),
        "postgresql://db:5432/app"
    );
    assert_eq!(redact("postgresql://db/app"), "postgresql://db/app");
    assert_eq!(redact("host=db user=app"), "host=db user=app");
}

#[test]
fn test_to_config_parses_jdbc_url() {
    let settings = ConnectionSettings::new("jdbc:postgresql://db:5432/orders");
    let config = settings.to_config().unwrap();
    assert_eq!(config.get_dbname(), Some("orders"));
}

#[test]
fn test_credentials_override_url() {
    let settings = ConnectionSettings::new("postgresql://someone@db/app")
        .with_credentials("migrator", "secret");
    let config = settings.to_config().unwrap();
    assert_eq!(config.get_user(), Some("migrator"));
    assert_eq!(config.get_password(), Some(&b"secret"[..]));
}

#[test]
fn test_empty_credentials_keep_url_values() {
    let settings = ConnectionSettings::new("postgresql://someone@db/app");
    let config = settings.to_config().unwrap();
    assert_eq!(config.get_user(), Some("someone"));
}

#[test]
fn test_invalid_connection_string() {
    let settings = ConnectionSettings::new("postgresql://db:notaport/app");
    let err = settings.to_config().unwrap_err();
    assert!(matches!(err, DbError::InvalidConnectionString { .. }));
}

#[test]
fn test_display_target_hides_password() {
    let settings = ConnectionSettings::new("jdbc:postgresql://app:hunter2@db/app");
    assert!(!settings.display_target().contains("hunter2"));
}
