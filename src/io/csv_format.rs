//! CSV format handling for catalog imports and listing output
//!
//! This module centralizes all CSV format concerns:
//! - `BookCsvRecord` for deserializing catalog import rows
//! - Conversion from CSV rows to [`NewBook`]
//! - Serialization of members, books, loans and report rows
//!
//! Writers take any `Write`, so they can target stdout or a buffer.

use crate::types::book::{parse_optional_number, DEFAULT_COPIES};
use crate::types::{Book, LibraryError, Loan, LoanDetail, Member, NewBook};
use chrono::NaiveDate;
use serde::Deserialize;
use std::io::Write;

/// Catalog import row: `title,author,year,copies`
///
/// Numeric columns are read as text so that a malformed value becomes a
/// validation error for that row rather than an opaque parse failure.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct BookCsvRecord {
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub copies: Option<String>,
}

/// Convert a catalog row to a validated `NewBook`
///
/// # Errors
///
/// - `InvalidField` if year or copies is not a number, or title/author is blank
pub fn convert_book_record(record: BookCsvRecord) -> Result<NewBook, LibraryError> {
    let year = parse_optional_number::<i32>("year", record.year.as_deref())?;
    let copies = parse_optional_number::<u32>("copies", record.copies.as_deref())?
        .unwrap_or(DEFAULT_COPIES);

    NewBook {
        title: record.title,
        author: record.author,
        year,
        copies,
    }
    .normalized()
}

fn date_cell(date: Option<NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_default()
}

/// Write members as `id,name,email,national_id`
pub fn write_members_csv(members: &[Member], output: &mut dyn Write) -> Result<(), LibraryError> {
    let mut writer = csv::Writer::from_writer(output);
    writer.write_record(["id", "name", "email", "national_id"])?;

    for member in members {
        writer.write_record(&[
            member.id.to_string(),
            member.name.clone(),
            member.email.clone().unwrap_or_default(),
            member.national_id.clone(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Write books as `id,title,author,year,copies_available`
pub fn write_books_csv(books: &[Book], output: &mut dyn Write) -> Result<(), LibraryError> {
    let mut writer = csv::Writer::from_writer(output);
    writer.write_record(["id", "title", "author", "year", "copies_available"])?;

    for book in books {
        writer.write_record(&[
            book.id.to_string(),
            book.title.clone(),
            book.author.clone(),
            book.year.map(|y| y.to_string()).unwrap_or_default(),
            book.copies_available.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Write loans with their status and overdue flag as of `today`
pub fn write_loans_csv(
    loans: &[Loan],
    today: NaiveDate,
    output: &mut dyn Write,
) -> Result<(), LibraryError> {
    let mut writer = csv::Writer::from_writer(output);
    writer.write_record([
        "id",
        "member_id",
        "book_id",
        "loan_date",
        "due_date",
        "return_date",
        "overdue",
    ])?;

    for loan in loans {
        writer.write_record(&[
            loan.id.to_string(),
            loan.member_id.to_string(),
            loan.book_id.to_string(),
            loan.loan_date.to_string(),
            loan.due_date.to_string(),
            date_cell(loan.return_date),
            loan.is_overdue(today).to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Write loans joined with member name and book title
pub fn write_loan_details_csv(
    loans: &[LoanDetail],
    output: &mut dyn Write,
) -> Result<(), LibraryError> {
    let mut writer = csv::Writer::from_writer(output);
    writer.write_record([
        "id",
        "member",
        "book",
        "loan_date",
        "due_date",
        "return_date",
    ])?;

    for detail in loans {
        writer.write_record(&[
            detail.loan.id.to_string(),
            detail.member_name.clone(),
            detail.book_title.clone(),
            detail.loan.loan_date.to_string(),
            detail.loan.due_date.to_string(),
            date_cell(detail.loan.return_date),
        ])?;
    }

    writer.flush()?;
    Ok(())
}
