//! Cell value matrices and their command-line text forms.
//!
//! A [`ValueMatrix`] is a list of rows, each a list of cell strings, exactly
//! the shape the Sheets API uses for `values` in a value range. Rows may have
//! different lengths; trailing empty cells are simply absent.

use thiserror::Error;

/// Rows of cell values.
pub type ValueMatrix = Vec<Vec<String>>;

/// Errors from parsing command-line cell input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValuesError {
    #[error("no cell values given")]
    Empty,
}

/// Parses CSV-ish command-line input into a [`ValueMatrix`].
///
/// Rows are separated by `;` or newlines, cells by `,`. Blank rows are
/// skipped; cells are kept verbatim (no trimming, no quoting), so
/// `"a, b"` yields the cells `a` and ` b`.
pub fn parse_cells(input: &str) -> Result<ValueMatrix, ValuesError> {
    let rows: ValueMatrix = input
        .split(['\n', ';'])
        .map(|row| row.strip_suffix('\r').unwrap_or(row))
        .filter(|row| !row.is_empty())
        .map(|row| row.split(',').map(str::to_string).collect())
        .collect();

    if rows.is_empty() {
        return Err(ValuesError::Empty);
    }
    Ok(rows)
}

/// Renders rows as tab-separated lines, one row per line.
pub fn render_tsv(values: &ValueMatrix) -> String {
    values
        .iter()
        .map(|row| row.join("\t"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders rows as a JSON array of arrays.
pub fn render_json(values: &ValueMatrix) -> serde_json::Result<String> {
    serde_json::to_string(values)
}

/// Returns the width of the widest row.
pub fn column_count(values: &ValueMatrix) -> usize {
    values.iter().map(Vec::len).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_row() {
        let rows = parse_cells("Name,Major,Year,Score").unwrap();
        assert_eq!(rows, vec![vec!["Name", "Major", "Year", "Score"]]);
    }

    #[test]
    fn rows_split_on_semicolon_and_newline() {
        let rows = parse_cells("a,b;c,d\ne,f\r\n").unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], vec!["c", "d"]);
        assert_eq!(rows[2], vec!["e", "f"]);
    }

    #[test]
    fn cells_are_kept_verbatim() {
        let rows = parse_cells("a, b,,d").unwrap();
        assert_eq!(rows[0], vec!["a", " b", "", "d"]);
    }

    #[test]
    fn empty_input_is_rejected() {
        assert_eq!(parse_cells(""), Err(ValuesError::Empty));
        assert_eq!(parse_cells(";\n;"), Err(ValuesError::Empty));
    }

    #[test]
    fn tsv_rendering() {
        let rows = vec![
            vec!["Alexandra".to_string(), "English".to_string()],
            vec!["Andrew".to_string()],
        ];
        assert_eq!(render_tsv(&rows), "Alexandra\tEnglish\nAndrew");
        assert_eq!(render_tsv(&Vec::new()), "");
    }

    #[test]
    fn json_rendering() {
        let rows = vec![vec!["1".to_string(), "x".to_string()]];
        assert_eq!(render_json(&rows).unwrap(), r#"[["1","x"]]"#);
    }

    #[test]
    fn ragged_rows_column_count() {
        let rows = parse_cells("a;b,c,d;e,f").unwrap();
        assert_eq!(column_count(&rows), 3);
        assert_eq!(column_count(&Vec::new()), 0);
    }
}
