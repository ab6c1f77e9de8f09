//! Streaming catalog reader
//!
//! Iterates over the rows of a book CSV (`title,author,year,copies`),
//! yielding one `Result<NewBook, LibraryError>` per row. Malformed rows come
//! out as errors tagged with their line number; iteration continues with the
//! next row.
//!
//! ```no_run
//! use library_circulation::io::CatalogReader;
//! use std::path::Path;
//!
//! let reader = CatalogReader::open(Path::new("books.csv")).unwrap();
//! for row in reader {
//!     match row {
//!         Ok(book) => println!("{} by {}", book.title, book.author),
//!         Err(e) => eprintln!("skipped: {}", e),
//!     }
//! }
//! ```

use crate::io::csv_format::{convert_book_record, BookCsvRecord};
use crate::types::{LibraryError, NewBook};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Iterator over catalog rows
#[derive(Debug)]
pub struct CatalogReader<R: Read> {
    reader: csv::Reader<R>,
    headers: Option<StringRecord>,
    record: StringRecord,
    done: bool,
}

impl CatalogReader<File> {
    /// Open a catalog CSV file
    ///
    /// # Errors
    ///
    /// Returns `IoError` if the file cannot be opened.
    pub fn open(path: &Path) -> Result<Self, LibraryError> {
        let file = File::open(path).map_err(|e| LibraryError::IoError {
            message: format!("failed to open '{}': {}", path.display(), e),
        })?;
        Ok(Self::from_reader(file))
    }
}

impl<R: Read> CatalogReader<R> {
    /// Read catalog rows from any byte source
    pub fn from_reader(source: R) -> Self {
        let reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .buffer_capacity(8 * 1024)
            .from_reader(source);

        Self {
            reader,
            headers: None,
            record: StringRecord::new(),
            done: false,
        }
    }

    fn headers(&mut self) -> Result<StringRecord, LibraryError> {
        if let Some(headers) = &self.headers {
            return Ok(headers.clone());
        }
        let headers = self.reader.headers()?.clone();
        self.headers = Some(headers.clone());
        Ok(headers)
    }
}

impl<R: Read> Iterator for CatalogReader<R> {
    type Item = Result<NewBook, LibraryError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let headers = match self.headers() {
            Ok(headers) => headers,
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };

        match self.reader.read_record(&mut self.record) {
            Ok(false) => return None,
            Ok(true) => {}
            Err(e) => return Some(Err(e.into())),
        }

        // Line where the record starts; blank lines and quoted newlines included
        let line = self.record.position().map(|pos| pos.line());

        Some(
            self.record
                .deserialize::<BookCsvRecord>(Some(&headers))
                .map_err(LibraryError::from)
                .and_then(convert_book_record)
                .map_err(|e| match e {
                    LibraryError::ParseError { message, .. } => {
                        LibraryError::ParseError { line, message }
                    }
                    other => LibraryError::ParseError {
                        line,
                        message: other.to_string(),
                    },
                }),
        )
    }
}
