use super::ParsedContacts;
use crate::{Result, SyncError};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use rolodex_core::import::RawContactRow;
use std::io::Cursor;

pub const NO_SHEETS_ERROR: &str = "Excel file has no sheets";

/// Reads the first sheet of an xlsx/xls workbook. The first row holds the
/// headers; every later row is one contact.
pub fn parse_workbook(bytes: &[u8]) -> Result<ParsedContacts> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|err| SyncError::Decode(format!("unreadable workbook: {err}")))?;

    let Some(first_sheet) = workbook.sheet_names().first().cloned() else {
        return Ok(ParsedContacts::file_error(NO_SHEETS_ERROR));
    };
    let range = workbook
        .worksheet_range(&first_sheet)
        .map_err(|err| SyncError::Decode(format!("unreadable sheet {first_sheet}: {err}")))?;

    let rows = range
        .rows()
        .map(|row| row.iter().map(cell_text).collect::<Vec<_>>());
    Ok(parse_table(rows))
}

pub(crate) fn parse_table<I>(rows: I) -> ParsedContacts
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut parsed = ParsedContacts::default();
    let mut rows = rows.into_iter();
    let Some(headers) = rows.next() else {
        return parsed;
    };

    let mut index = 0;
    for cells in rows {
        if cells.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        let row = RawContactRow::from_cells(
            headers
                .iter()
                .map(String::as_str)
                .zip(cells.iter().map(String::as_str)),
        );
        parsed.push_row(&row, index);
        index += 1;
    }
    parsed
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string().trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_table, parse_workbook};
    use crate::SyncError;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|cell| cell.to_string()).collect()
    }

    #[test]
    fn first_row_is_the_header() {
        let parsed = parse_table(vec![
            row(&["Contact Name", "Email Address", "Size"]),
            row(&["Ada", "ada@example.com", "small"]),
            row(&["", "", ""]),
            row(&["", "nobody@example.com", ""]),
        ]);
        assert_eq!(parsed.contacts.len(), 1);
        assert_eq!(parsed.contacts[0].category.as_deref(), Some("small"));
        assert_eq!(parsed.errors, vec!["Row 2: Name is required".to_string()]);
    }

    #[test]
    fn empty_sheet_has_no_rows() {
        let parsed = parse_table(Vec::<Vec<String>>::new());
        assert!(parsed.contacts.is_empty());
        assert!(parsed.errors.is_empty());
    }

    #[test]
    fn garbage_bytes_are_a_decode_failure() {
        let err = parse_workbook(b"definitely not a spreadsheet").expect_err("decode");
        assert!(matches!(err, SyncError::Decode(_)));
    }
}
