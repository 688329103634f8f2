//! Plain comma-separated import. The first non-blank line names the columns;
//! later lines map onto them by position. Quoting is not supported: a `"` is
//! an ordinary character and every comma splits.

use crate::api::models::Customer;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CsvError {
    #[error("CSV must have a header and at least one data row (found {found} non-blank lines)")]
    TooFewLines { found: usize },
    #[error("could not read CSV: {0}")]
    Read(#[from] csv::Error),
}

pub type Record = BTreeMap<String, String>;

fn is_blank(record: &csv::StringRecord) -> bool {
    record.iter().all(str::is_empty) && record.len() <= 1
}

/// Parses `text` into header-keyed records. Lines end at `\n`; a trailing
/// `\r` is trimmed with the rest of the whitespace. Fields missing at the end of a
/// line are absent from its record; surplus fields are dropped.
pub fn parse(text: &str) -> Result<Vec<Record>, CsvError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut lines = Vec::new();
    for row in reader.records() {
        let row = row?;
        if !is_blank(&row) {
            lines.push(row);
        }
    }
    if lines.len() < 2 {
        return Err(CsvError::TooFewLines { found: lines.len() });
    }

    let headers: Vec<String> = lines[0].iter().map(str::to_string).collect();
    let records = lines[1..]
        .iter()
        .map(|row| {
            let mut record = Record::new();
            for (idx, header) in headers.iter().enumerate() {
                match row.get(idx) {
                    Some(value) => {
                        record.insert(header.clone(), value.to_string());
                    }
                    None => {
                        record.remove(header);
                    }
                }
            }
            record
        })
        .collect();
    Ok(records)
}

pub fn parse_customers(text: &str) -> Result<Vec<Customer>, CsvError> {
    Ok(parse(text)?.into_iter().map(Customer::from_record).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alice_and_bob() {
        let customers = parse_customers("name,phone\nAlice,555\nBob,556").unwrap();
        assert_eq!(customers.len(), 2);
        assert_eq!(customers[0].name.as_deref(), Some("Alice"));
        assert_eq!(customers[0].phone.as_deref(), Some("555"));
        assert_eq!(customers[0].country_code, None);
        assert_eq!(customers[1].name.as_deref(), Some("Bob"));
        assert_eq!(customers[1].phone.as_deref(), Some("556"));
        assert_eq!(customers[1].country_code, None);
    }

    #[test]
    fn short_lines_leave_trailing_headers_absent() {
        let records = parse("a, b ,c,d\n1,2\n1,2,3,4,5").unwrap();
        assert_eq!(records[0].len(), 2);
        assert_eq!(records[0].get("a").map(String::as_str), Some("1"));
        assert_eq!(records[0].get("b").map(String::as_str), Some("2"));
        assert!(!records[0].contains_key("c"));
        assert!(!records[0].contains_key("d"));
        assert_eq!(records[1].len(), 4);
    }

    #[test]
    fn blank_lines_and_crlf_are_skipped() {
        let records = parse("\n  \nname,phone\r\n\r\nAlice , 555 \r\n\n").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("name").map(String::as_str), Some("Alice"));
        assert_eq!(records[0].get("phone").map(String::as_str), Some("555"));
    }

    #[test]
    fn bare_carriage_return_does_not_split_lines() {
        assert!(matches!(parse("name,phone\rAlice,555"), Err(CsvError::TooFewLines { found: 1 })));
    }

    #[test]
    fn header_only_is_rejected() {
        assert!(matches!(parse("name,phone\n\n"), Err(CsvError::TooFewLines { found: 1 })));
        assert!(matches!(parse(""), Err(CsvError::TooFewLines { found: 0 })));
    }

    #[test]
    fn quotes_are_literal() {
        let records = parse("name,phone\n\"Smith, J\",555").unwrap();
        assert_eq!(records[0].get("name").map(String::as_str), Some("\"Smith"));
        assert_eq!(records[0].get("phone").map(String::as_str), Some("J\""));
    }

    #[test]
    fn extra_columns_are_kept() {
        let customers = parse_customers("name,phone,country_code,tracking_id\nAlice,555,+1,TRK9").unwrap();
        assert_eq!(customers[0].country_code.as_deref(), Some("+1"));
        assert_eq!(customers[0].extra.get("tracking_id").map(String::as_str), Some("TRK9"));
    }
}
