//! Read-only reporting queries
//!
//! Derived views over members, books and loans. Nothing here writes.

use crate::core::catalog::book_from_row;
use crate::core::circulation::{loan_detail_from_row, loan_from_row, LOAN_COLUMNS};
use crate::core::members::{self, member_from_row};
use crate::types::{Book, LibraryError, Loan, LoanDetail, Member, MemberId};
use chrono::NaiveDate;
use rusqlite::{params, Connection};

/// Books currently held by a member (one entry per open loan)
///
/// # Errors
///
/// Returns `NotFound` if the member does not exist.
pub fn books_on_loan_by_member(
    conn: &Connection,
    member_id: MemberId,
) -> Result<Vec<Book>, LibraryError> {
    members::get(conn, member_id)?;

    let mut stmt = conn.prepare(
        "SELECT b.id, b.title, b.author, b.year, b.copies_available
         FROM books b
         JOIN loans l ON l.book_id = b.id
         WHERE l.member_id = ?1 AND l.return_date IS NULL
         ORDER BY l.due_date, l.id",
    )?;
    let books = stmt
        .query_map([member_id], book_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(books)
}

/// Members holding at least one open loan past its due date
pub fn overdue_members(conn: &Connection, today: NaiveDate) -> Result<Vec<Member>, LibraryError> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT m.id, m.name, m.email, m.national_id
         FROM members m
         JOIN loans l ON l.member_id = m.id
         WHERE l.return_date IS NULL AND l.due_date < ?1
         ORDER BY m.name, m.id",
    )?;
    let members = stmt
        .query_map([today], member_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(members)
}

/// Loans started between `start` and `end`, both inclusive
///
/// # Errors
///
/// Returns `InvalidField` if `start` is after `end`.
pub fn loans_in_period(
    conn: &Connection,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<LoanDetail>, LibraryError> {
    if start > end {
        return Err(LibraryError::invalid_field(
            "period",
            &format!("start {} is after end {}", start, end),
        ));
    }

    let mut stmt = conn.prepare(&format!(
        "SELECT {}, m.name AS member_name, b.title AS book_title
         FROM loans l
         JOIN members m ON l.member_id = m.id
         JOIN books b ON l.book_id = b.id
         WHERE l.loan_date BETWEEN ?1 AND ?2
         ORDER BY l.loan_date, l.id",
        LOAN_COLUMNS
    ))?;
    let loans = stmt
        .query_map(params![start, end], loan_detail_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(loans)
}

/// Mean number of loans per month, over months that had at least one loan
///
/// Months with no loans are not data points. Returns 0.0 when there are no
/// loans at all.
pub fn average_loans_per_month(conn: &Connection) -> Result<f64, LibraryError> {
    let mut stmt = conn.prepare(
        "SELECT strftime('%Y-%m', loan_date) AS month, COUNT(*) AS total
         FROM loans
         GROUP BY month",
    )?;
    let counts = stmt
        .query_map([], |row| row.get::<_, i64>("total"))?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(mean(&counts))
}

fn mean(counts: &[i64]) -> f64 {
    if counts.is_empty() {
        return 0.0;
    }
    counts.iter().sum::<i64>() as f64 / counts.len() as f64
}

/// Open loans ordered by due date, optionally for one member
pub fn active_loans(
    conn: &Connection,
    member_id: Option<MemberId>,
) -> Result<Vec<Loan>, LibraryError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {}
         FROM loans l
         WHERE l.return_date IS NULL AND (?1 IS NULL OR l.member_id = ?1)
         ORDER BY l.due_date, l.id",
        LOAN_COLUMNS
    ))?;
    let loans = stmt
        .query_map([member_id], loan_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(loans)
}

/// Open loans with member name and book title, for a return desk listing
pub fn active_loan_details(
    conn: &Connection,
    member_id: Option<MemberId>,
) -> Result<Vec<LoanDetail>, LibraryError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {}, m.name AS member_name, b.title AS book_title
         FROM loans l
         JOIN members m ON l.member_id = m.id
         JOIN books b ON l.book_id = b.id
         WHERE l.return_date IS NULL AND (?1 IS NULL OR l.member_id = ?1)
         ORDER BY l.due_date, l.id",
        LOAN_COLUMNS
    ))?;
    let loans = stmt
        .query_map([member_id], loan_detail_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(loans)
}
