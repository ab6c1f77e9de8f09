//! I/O module
//!
//! Handles CSV parsing and output.
//!
//! # Components
//!
//! - `csv_format` - CSV format handling (catalog row conversion, listing serialization)
//! - `catalog_reader` - Streaming catalog CSV reader with iterator interface

pub mod catalog_reader;
pub mod csv_format;

pub use catalog_reader::CatalogReader;
pub use csv_format::{
    convert_book_record, write_books_csv, write_loan_details_csv, write_loans_csv,
    write_members_csv, BookCsvRecord,
};
