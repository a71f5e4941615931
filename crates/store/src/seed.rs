//! Sample-data script handling.
//!
//! The original application ships a semicolon-delimited SQL script that is
//! loaded on first run. Comment lines start with `--`; statements may span
//! multiple lines.

/// Bundled sample data applied on first run when the database is empty.
pub const SAMPLE_DATA: &str = include_str!("../seed/sample_data.sql");

/// Split a script into executable statements.
///
/// Comment lines and blank lines are dropped, the remainder is split on `;`,
/// and empty fragments (e.g. after a trailing semicolon) are discarded.
pub fn statements(script: &str) -> Vec<String> {
    let sql: String = script
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with("--")
        })
        .map(|line| format!("{line}\n"))
        .collect();

    sql.split(';')
        .map(str::trim)
        .filter(|stmt| !stmt.is_empty())
        .map(str::to_string)
        .collect()
}
