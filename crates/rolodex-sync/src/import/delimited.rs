use super::ParsedContacts;
use csv::{ReaderBuilder, StringRecord};
use rolodex_core::import::RawContactRow;

/// Parses CSV text with a header row. Syntax problems become `CSV Parse
/// Error` entries: a record with the wrong number of fields is reported and
/// still validated, a quoted field left open at end of input is reported and
/// dropped. Blank lines are skipped and do not count as rows.
pub fn parse_csv(text: &str) -> ParsedContacts {
    let mut parsed = ParsedContacts::default();
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = match reader.headers() {
        Ok(headers) => headers.iter().map(str::to_string).collect(),
        Err(err) => {
            parsed.errors.push(format!("CSV Parse Error: {err}"));
            return parsed;
        }
    };

    let mut index = 0;
    let mut records = reader.records().peekable();
    while let Some(record) = records.next() {
        let record = match record {
            Ok(record) => record,
            Err(err) => {
                parsed.errors.push(format!("CSV Parse Error: {err}"));
                continue;
            }
        };
        if is_blank_record(&record) {
            continue;
        }
        let row_number = index + 1;
        // An open quote swallows everything after it, so only the last
        // record can carry one.
        if records.peek().is_none() && ends_inside_quotes(text, &record) {
            parsed.errors.push(format!(
                "CSV Parse Error: Quoted field unterminated, row {row_number}"
            ));
            continue;
        }
        if record.len() != headers.len() {
            let direction = if record.len() < headers.len() {
                "few"
            } else {
                "many"
            };
            parsed.errors.push(format!(
                "CSV Parse Error: Too {direction} fields: expected {} fields but parsed {}, row {row_number}",
                headers.len(),
                record.len()
            ));
        }
        // Cells past the end of a short record are absent, not empty.
        let row = RawContactRow::from_cells(
            headers
                .iter()
                .map(String::as_str)
                .zip(record.iter()),
        );
        parsed.push_row(&row, index);
        index += 1;
    }
    parsed
}

fn is_blank_record(record: &StringRecord) -> bool {
    record.iter().all(|cell| cell.trim().is_empty())
}

/// Replays the quoting rules over the raw text of `record` and reports
/// whether input ran out inside a quoted field. Quotes only open a field at
/// its first character; elsewhere they are literal.
fn ends_inside_quotes(text: &str, record: &StringRecord) -> bool {
    let Some(start) = record
        .position()
        .and_then(|position| usize::try_from(position.byte()).ok())
    else {
        return false;
    };
    let Some(raw) = text.get(start..) else {
        return false;
    };

    let mut in_quotes = false;
    let mut field_start = true;
    let mut chars = raw.chars().peekable();
    while let Some(ch) = chars.next() {
        if in_quotes {
            if ch == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            continue;
        }
        match ch {
            '"' if field_start => {
                in_quotes = true;
                field_start = false;
            }
            ',' | '\n' | '\r' => field_start = true,
            _ => field_start = false,
        }
    }
    in_quotes
}
