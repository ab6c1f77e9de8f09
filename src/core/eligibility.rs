//! Loan eligibility rules
//!
//! A member may start a new loan only if every rule passes. Rules are
//! evaluated in a fixed order and the first failure is reported:
//!
//! 1. no open loan past its due date
//! 2. fewer than [`MAX_ACTIVE_LOANS`] open loans
//! 3. no open loan of the same book
//! 4. at least one copy of the book on the shelf
//!
//! The decision itself ([`evaluate`]) is pure; [`check`] gathers its inputs
//! from the caller's transaction and never writes.

use crate::core::{catalog, members};
use crate::types::{Book, BookId, IneligibleReason, LibraryError, MemberId};
use chrono::NaiveDate;
use rusqlite::{params, Connection};

/// Maximum number of simultaneously open loans per member
pub const MAX_ACTIVE_LOANS: u32 = 3;

/// Outcome of an eligibility check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    Eligible,
    Ineligible(IneligibleReason),
}

impl Eligibility {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Eligibility::Eligible)
    }

    /// Turn a rejection into an `IneligibleLoan` error
    pub fn into_result(self, member: MemberId, book: BookId) -> Result<(), LibraryError> {
        match self {
            Eligibility::Eligible => Ok(()),
            Eligibility::Ineligible(reason) => Err(LibraryError::ineligible(member, book, reason)),
        }
    }
}

/// A member's open loans, as seen on a given day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OpenLoanSummary {
    /// Open loans with `due_date < today`
    pub overdue: u32,
    /// All open loans
    pub active: u32,
    /// Open loans of the requested book
    pub of_book: u32,
}

/// Apply the rules, in order, to a member's open loans and the requested book
pub fn evaluate(summary: &OpenLoanSummary, book: &Book) -> Eligibility {
    if summary.overdue > 0 {
        return Eligibility::Ineligible(IneligibleReason::OverdueLoans {
            count: summary.overdue,
        });
    }
    if summary.active >= MAX_ACTIVE_LOANS {
        return Eligibility::Ineligible(IneligibleReason::LoanLimitReached {
            active: summary.active,
            limit: MAX_ACTIVE_LOANS,
        });
    }
    if summary.of_book > 0 {
        return Eligibility::Ineligible(IneligibleReason::AlreadyBorrowed);
    }
    if !book.is_available() {
        return Eligibility::Ineligible(IneligibleReason::NoCopiesAvailable);
    }
    Eligibility::Eligible
}

/// Count a member's open loans as of `today`
pub fn open_loan_summary(
    conn: &Connection,
    member_id: MemberId,
    book_id: BookId,
    today: NaiveDate,
) -> Result<OpenLoanSummary, LibraryError> {
    let summary = conn.query_row(
        "SELECT
            COALESCE(SUM(CASE WHEN due_date < ?2 THEN 1 ELSE 0 END), 0) AS overdue,
            COUNT(*) AS active,
            COALESCE(SUM(CASE WHEN book_id = ?3 THEN 1 ELSE 0 END), 0) AS of_book
         FROM loans
         WHERE member_id = ?1 AND return_date IS NULL",
        params![member_id, today, book_id],
        |row| {
            Ok(OpenLoanSummary {
                overdue: row.get("overdue")?,
                active: row.get("active")?,
                of_book: row.get("of_book")?,
            })
        },
    )?;
    Ok(summary)
}

/// Decide whether `member_id` may borrow `book_id` on `today`
///
/// # Errors
///
/// Returns `NotFound` for an unknown member or book; rule failures are an
/// `Ok(Eligibility::Ineligible(..))`, not an error.
pub fn check(
    conn: &Connection,
    member_id: MemberId,
    book_id: BookId,
    today: NaiveDate,
) -> Result<Eligibility, LibraryError> {
    members::get(conn, member_id)?;
    let book = catalog::get(conn, book_id)?;
    let summary = open_loan_summary(conn, member_id, book_id, today)?;
    Ok(evaluate(&summary, &book))
}
