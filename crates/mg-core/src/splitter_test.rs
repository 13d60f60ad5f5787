use super::*;

#[test]
fn test_split_two_statements() {
    let stmts = split_statements(
        "CREATE TABLE users (id integer);\nINSERT INTO users VALUES (1);\n",
    )
    .unwrap();
    assert_eq!(
        stmts,
        vec!["CREATE TABLE users (id integer)", "INSERT INTO users VALUES (1)"]
    );
}

#[test]
fn test_split_without_trailing_semicolon() {
    let stmts = split_statements("SELECT 1; SELECT 2").unwrap();
    assert_eq!(stmts, vec!["SELECT 1", "SELECT 2"]);
}

#[test]
fn test_semicolon_inside_string_literal() {
    let stmts = split_statements("INSERT INTO t VALUES ('a;b'); SELECT 1;").unwrap();
    assert_eq!(stmts, vec!["INSERT INTO t VALUES ('a;b')", "SELECT 1"]);
}

#[test]
fn test_escaped_quote_preserved_verbatim() {
    let stmts = split_statements("INSERT INTO t VALUES ('it''s; fine');").unwrap();
    assert_eq!(stmts, vec!["INSERT INTO t VALUES ('it''s; fine')"]);
}

#[test]
fn test_semicolon_inside_dollar_quoted_body() {
    let sql = "CREATE FUNCTION f() RETURNS integer AS $$\nBEGIN\n  RETURN 1;\nEND;\n$$ LANGUAGE plpgsql;\nSELECT f();";
    let stmts = split_statements(sql).unwrap();
    assert_eq!(stmts.len(), 2);
    assert!(stmts[0].starts_with("CREATE FUNCTION f()"));
    assert!(stmts[0].contains("RETURN 1;"));
    assert!(stmts[0].ends_with("LANGUAGE plpgsql"));
    assert_eq!(stmts[1], "SELECT f()");
}

#[test]
fn test_semicolon_inside_comments() {
    let sql = "-- first; still a comment\nCREATE TABLE a (id integer);\n/* block; comment */\nCREATE TABLE b (id integer);";
    let stmts = split_statements(sql).unwrap();
    assert_eq!(stmts.len(), 2);
    assert!(stmts[0].ends_with("CREATE TABLE a (id integer)"));
    assert!(stmts[1].ends_with("CREATE TABLE b (id integer)"));
}

#[test]
fn test_comment_only_fragments_dropped() {
    let stmts = split_statements("SELECT 1;\n-- trailing note\n;\n  ;").unwrap();
    assert_eq!(stmts, vec!["SELECT 1"]);
}

#[test]
fn test_empty_script() {
    assert!(split_statements("").unwrap().is_empty());
    assert!(split_statements("  \n\t").unwrap().is_empty());
}

#[test]
fn test_multibyte_characters_before_separator() {
    let stmts = split_statements("INSERT INTO t VALUES ('héllo'); SELECT 'ü';").unwrap();
    assert_eq!(stmts, vec!["INSERT INTO t VALUES ('héllo')", "SELECT 'ü'"]);
}

#[test]
fn test_unterminated_string_is_error() {
    assert!(split_statements("SELECT 'oops").is_err());
}

#[test]
fn test_line_starts() {
    assert_eq!(line_starts("a\nbc\n"), vec![0, 2, 5]);
}
