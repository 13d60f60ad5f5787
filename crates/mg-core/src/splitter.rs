//! Splitting of SQL scripts into individual statements.
//!
//! Uses the sqlparser tokenizer with the PostgreSQL dialect so that
//! semicolons inside string literals, quoted identifiers, dollar-quoted
//! bodies and comments never split a statement. Statement text is sliced
//! from the original source rather than re-rendered from the AST.

use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::tokenizer::{Location, Token, Tokenizer, TokenizerError};

/// Split `sql` on top-level semicolons.
///
/// Fragments holding only whitespace or comments are dropped; every
/// returned statement is trimmed and has no trailing `;`.
pub fn split_statements(sql: &str) -> Result<Vec<String>, TokenizerError> {
    let dialect = PostgreSqlDialect {};
    let tokens = Tokenizer::new(&dialect, sql).tokenize_with_location()?;
    let line_starts = line_starts(sql);

    let mut statements = Vec::new();
    let mut start = 0;
    let mut has_content = false;

    for token in &tokens {
        match token.token {
            Token::SemiColon => {
                let end = byte_offset(sql, &line_starts, token.span.start).unwrap_or(sql.len());
                if has_content {
                    statements.push(sql[start..end].trim().to_string());
                }
                start = (end + 1).min(sql.len());
                has_content = false;
            }
            Token::Whitespace(_) => {}
            _ => has_content = true,
        }
    }

    if has_content {
        statements.push(sql[start..].trim().to_string());
    }

    Ok(statements)
}

/// Byte offset of the first character of every line.
fn line_starts(sql: &str) -> Vec<usize> {
    std::iter::once(0)
        .chain(sql.match_indices('\n').map(|(i, _)| i + 1))
        .collect()
}

/// Convert a 1-based tokenizer location (column counted in chars) into a
/// byte offset into `sql`.
fn byte_offset(sql: &str, line_starts: &[usize], location: Location) -> Option<usize> {
    let line = usize::try_from(location.line).ok()?.checked_sub(1)?;
    let column = usize::try_from(location.column).ok()?.checked_sub(1)?;
    let line_start = *line_starts.get(line)?;
    sql[line_start..]
        .char_indices()
        .nth(column)
        .map(|(i, _)| line_start + i)
}

#[cfg(test)]
#[path = "splitter_test.rs"]
mod tests;
