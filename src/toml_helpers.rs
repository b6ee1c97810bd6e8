// Helpers for surfacing TOML parse failures with a source position.

/// Look for a "line N ... column M" pattern in a parser error message
/// and return `(line, column)` when both are present.
#[must_use]
pub fn extract_line_col_from_msg(msg: &str) -> Option<(usize, usize)> {
    let after_line = &msg[msg.find("line ")? + 5..];
    let line: usize = after_line
        .chars()
        .take_while(char::is_ascii_digit)
        .collect::<String>()
        .parse()
        .ok()?;
    let after_col = &after_line[after_line.find("column ")? + 7..];
    let col: usize = after_col
        .chars()
        .take_while(char::is_ascii_digit)
        .collect::<String>()
        .parse()
        .ok()?;
    Some((line, col))
}
