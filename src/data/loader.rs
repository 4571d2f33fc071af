use std::path::Path;

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};

use super::model::RawTable;
use crate::error::LoadError;

// ---------------------------------------------------------------------------
// File format
// ---------------------------------------------------------------------------

/// Delimiter + text encoding convention of one dataset file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CsvFormat {
    pub delimiter: u8,
    pub encoding: &'static Encoding,
}

impl CsvFormat {
    /// Comma separated, UTF-8 (population dataset).
    pub fn utf8_comma() -> Self {
        CsvFormat {
            delimiter: b',',
            encoding: UTF_8,
        }
    }

    /// Semicolon separated, Latin-1 (GDP, inflation and trade datasets).
    /// WHATWG maps the `latin1` label to windows-1252, a superset of ISO-8859-1.
    pub fn latin1_semicolon() -> Self {
        CsvFormat {
            delimiter: b';',
            encoding: WINDOWS_1252,
        }
    }

    /// Build a format from an encoding label such as `"latin1"` or `"utf-8"`.
    pub fn from_label(delimiter: u8, label: &str) -> Result<Self, LoadError> {
        let encoding = Encoding::for_label(label.as_bytes())
            .ok_or_else(|| LoadError::UnknownEncoding(label.to_string()))?;
        Ok(CsvFormat { delimiter, encoding })
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a delimited text file into a [`RawTable`].
///
/// Rows whose field count differs from the header are skipped, as are records
/// the CSV parser rejects. Only a missing/unreadable file or an empty header
/// row fails the whole load.
pub fn load_table(path: &Path, format: CsvFormat) -> Result<RawTable, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(format.delimiter)
        .flexible(true)
        .from_path(path)
        .map_err(|source| LoadError::Open {
            path: path.to_path_buf(),
            source,
        })?;

    let header_record = reader
        .byte_headers()
        .map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?
        .clone();
    if header_record.is_empty() {
        return Err(LoadError::Empty {
            path: path.to_path_buf(),
        });
    }

    let headers: Vec<String> = header_record
        .iter()
        .enumerate()
        .map(|(idx, field)| {
            let name = decode_cell(field, format.encoding);
            if idx == 0 {
                strip_bom(&name).to_string()
            } else {
                name
            }
        })
        .collect();

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    let mut record = csv::ByteRecord::new();

    loop {
        match reader.read_byte_record(&mut record) {
            Ok(false) => break,
            Ok(true) => {
                if record.len() != headers.len() {
                    skipped += 1;
                    log::warn!(
                        "{}: skipping line {} ({} fields, expected {})",
                        path.display(),
                        record.position().map_or(0, |p| p.line()),
                        record.len(),
                        headers.len()
                    );
                    continue;
                }
                rows.push(
                    record
                        .iter()
                        .map(|field| decode_cell(field, format.encoding))
                        .collect(),
                );
            }
            Err(e) if e.is_io_error() => {
                return Err(LoadError::Read {
                    path: path.to_path_buf(),
                    source: e,
                });
            }
            Err(e) => {
                skipped += 1;
                log::warn!("{}: skipping malformed record: {e}", path.display());
            }
        }
    }

    log::info!(
        "Loaded {} rows x {} columns from {} ({skipped} skipped)",
        rows.len(),
        headers.len(),
        path.display()
    );

    Ok(RawTable { headers, rows })
}

/// Index of a required column, or [`LoadError::MissingColumn`].
pub fn require_column(table: &RawTable, path: &Path, column: &str) -> Result<usize, LoadError> {
    table
        .column_index(column)
        .ok_or_else(|| LoadError::MissingColumn {
            path: path.to_path_buf(),
            column: column.to_string(),
        })
}

// -- helpers --

fn decode_cell(bytes: &[u8], encoding: &'static Encoding) -> String {
    let (text, _had_errors) = encoding.decode_without_bom_handling(bytes);
    text.trim().to_string()
}

/// A UTF-8 byte-order mark survives either as U+FEFF or, when the file is
/// read as Latin-1, as the three characters `ï»¿`.
fn strip_bom(header: &str) -> &str {
    header
        .strip_prefix('\u{feff}')
        .or_else(|| header.strip_prefix("\u{ef}\u{bb}\u{bf}"))
        .unwrap_or(header)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_bytes(content: &[u8]) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn skips_rows_with_wrong_field_count() {
        let f = write_bytes(b"country_name;2020;2021\nA;1;2\nB;3\nC;4;5;6\nD;7;8\n");
        let table = load_table(f.path(), CsvFormat::latin1_semicolon()).unwrap();
        assert_eq!(table.headers, vec!["country_name", "2020", "2021"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0][0], "A");
        assert_eq!(table.rows[1][0], "D");
    }

    #[test]
    fn decodes_latin1_cells() {
        let f = write_bytes(b"country_name;2020\nC\xf4te d'Ivoire;1.5\nT\xfcrkiye;2\n");
        let table = load_table(f.path(), CsvFormat::latin1_semicolon()).unwrap();
        assert_eq!(table.rows[0][0], "Côte d'Ivoire");
        assert_eq!(table.rows[1][0], "Türkiye");
    }

    #[test]
    fn strips_byte_order_mark_from_first_header() {
        let f = write_bytes(b"\xef\xbb\xbfcountry_name;indicator_name;2000\nA;x;1\n");
        let table = load_table(f.path(), CsvFormat::latin1_semicolon()).unwrap();
        assert_eq!(table.headers[0], "country_name");

        let f = write_bytes(b"\xef\xbb\xbfCountry/Territory,CCA3\nTestland,TST\n");
        let table = load_table(f.path(), CsvFormat::utf8_comma()).unwrap();
        assert_eq!(table.headers[0], "Country/Territory");
    }

    #[test]
    fn quoted_fields_keep_embedded_delimiters() {
        let f = write_bytes(b"Country/Territory,CCA3,2020 Population\n\"Korea, Rep.\",KOR,51000000\n");
        let table = load_table(f.path(), CsvFormat::utf8_comma()).unwrap();
        assert_eq!(table.rows[0], vec!["Korea, Rep.", "KOR", "51000000"]);
    }

    #[test]
    fn missing_file_is_an_open_error() {
        let err = load_table(Path::new("/definitely/not/here.csv"), CsvFormat::utf8_comma())
            .unwrap_err();
        assert!(matches!(err, LoadError::Open { .. }));
    }

    #[test]
    fn empty_file_is_rejected() {
        let f = write_bytes(b"");
        let err = load_table(f.path(), CsvFormat::utf8_comma()).unwrap_err();
        assert!(matches!(err, LoadError::Empty { .. }));
    }

    #[test]
    fn encoding_labels_resolve() {
        let fmt = CsvFormat::from_label(b';', "latin1").unwrap();
        assert_eq!(fmt, CsvFormat::latin1_semicolon());
        assert!(CsvFormat::from_label(b',', "klingon").is_err());
    }
}
