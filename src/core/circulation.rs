//! Loan lifecycle
//!
//! Opening and closing a loan each touch two tables: the book's copy counter
//! and the loan row. Both functions here expect to run inside a single write
//! scope (see [`Store::write`](crate::core::store::Store::write)), so either
//! both changes commit or neither does.
//!
//! ```text
//! OPEN --close_loan--> CLOSED
//! ```

use crate::core::{catalog, eligibility};
use crate::types::loan::due_date_for;
use crate::types::{
    BookId, IneligibleReason, LibraryError, Loan, LoanDetail, LoanId, MemberId,
};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};

pub(crate) const LOAN_COLUMNS: &str = "l.id, l.member_id, l.book_id, l.loan_date, l.due_date, l.return_date";

/// Map a `loans` row to a Loan by column name
pub fn loan_from_row(row: &Row<'_>) -> rusqlite::Result<Loan> {
    Ok(Loan {
        id: row.get("id")?,
        member_id: row.get("member_id")?,
        book_id: row.get("book_id")?,
        loan_date: row.get("loan_date")?,
        due_date: row.get("due_date")?,
        return_date: row.get("return_date")?,
    })
}

/// Map a loan row joined with `member_name` and `book_title`
pub fn loan_detail_from_row(row: &Row<'_>) -> rusqlite::Result<LoanDetail> {
    Ok(LoanDetail {
        loan: loan_from_row(row)?,
        member_name: row.get("member_name")?,
        book_title: row.get("book_title")?,
    })
}

/// Open a new loan dated `today`
///
/// Runs the eligibility rules, takes a copy off the shelf and records the
/// loan with `due_date = today + 14 days`.
///
/// # Errors
///
/// - `NotFound` for an unknown member or book
/// - `IneligibleLoan` if a rule fails, including a copy that vanished
///   between the eligibility read and the decrement
pub fn open_loan(
    conn: &Connection,
    member_id: MemberId,
    book_id: BookId,
    today: NaiveDate,
) -> Result<Loan, LibraryError> {
    eligibility::check(conn, member_id, book_id, today)?.into_result(member_id, book_id)?;

    if !catalog::take_copy(conn, book_id)? {
        return Err(LibraryError::ineligible(
            member_id,
            book_id,
            IneligibleReason::NoCopiesAvailable,
        ));
    }

    let due_date = due_date_for(today);
    conn.execute(
        "INSERT INTO loans (member_id, book_id, loan_date, due_date) VALUES (?1, ?2, ?3, ?4)",
        params![member_id, book_id, today, due_date],
    )?;

    Ok(Loan {
        id: conn.last_insert_rowid(),
        member_id,
        book_id,
        loan_date: today,
        due_date,
        return_date: None,
    })
}

/// Close an open loan, returning its copy to the shelf
///
/// # Errors
///
/// - `NotFound` if the loan does not exist
/// - `AlreadyClosed` if it was returned before; the copy counter is untouched
pub fn close_loan(conn: &Connection, loan_id: LoanId, today: NaiveDate) -> Result<Loan, LibraryError> {
    let loan = get(conn, loan_id)?;
    if let Some(returned_on) = loan.return_date {
        return Err(LibraryError::AlreadyClosed {
            loan: loan_id,
            returned_on,
        });
    }

    catalog::return_copy(conn, loan.book_id)?;

    let changed = conn.execute(
        "UPDATE loans SET return_date = ?1 WHERE id = ?2 AND return_date IS NULL",
        params![today, loan_id],
    )?;
    if changed != 1 {
        return Err(LibraryError::storage(&format!(
            "loan {} changed while being closed",
            loan_id
        )));
    }

    Ok(Loan {
        return_date: Some(today),
        ..loan
    })
}

/// Look up a loan, returning `None` if absent
pub fn find(conn: &Connection, id: LoanId) -> Result<Option<Loan>, LibraryError> {
    let loan = conn
        .query_row(
            &format!("SELECT {} FROM loans l WHERE l.id = ?1", LOAN_COLUMNS),
            [id],
            loan_from_row,
        )
        .optional()?;
    Ok(loan)
}

/// Look up a loan, failing with `NotFound` if absent
pub fn get(conn: &Connection, id: LoanId) -> Result<Loan, LibraryError> {
    find(conn, id)?.ok_or_else(|| LibraryError::not_found("Loan", id))
}
